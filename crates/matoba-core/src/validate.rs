//! Validation of administrator submissions.
//!
//! Submissions are checked in full before anything is written. The first
//! problem found is reported; entry numbers in messages are 1-based.

use std::{collections::HashSet, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
  period::{MAX_YEAR, MIN_YEAR},
  results::{MAX_ENTRIES, ResultEntry},
  tournament::NewTournament,
};

const MAX_NAME_CHARS: usize = 50;
const MAX_RANK_TITLE_CHARS: usize = 20;
const MAX_TARGET_SIZE_CHARS: usize = 20;

static LONG_DATE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[0-9]{4}年[0-9]{1,2}月[0-9]{1,2}日$").expect("valid regex"));
static YEAR_LABEL: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[0-9]{4}年$").expect("valid regex"));

/// A rejected submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(String);

impl ValidationError {
  fn new(msg: impl Into<String>) -> Self { Self(msg.into()) }

  fn entry(kind: &str, number: usize, msg: impl std::fmt::Display) -> Self {
    Self(format!("{kind} {number}: {msg}"))
  }

  pub fn message(&self) -> &str { &self.0 }
}

/// An administrator's submission of one month's ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodSubmission {
  pub year:    i32,
  pub month:   u32,
  pub entries: Vec<ResultEntry>,
}

fn chars(s: &str) -> usize { s.chars().count() }

fn check_year(year: i32) -> Result<(), ValidationError> {
  if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
    return Err(ValidationError::new(format!(
      "Year must be between {MIN_YEAR} and {MAX_YEAR}"
    )));
  }
  Ok(())
}

/// Validate a monthly submission.
pub fn validate_period(submission: &PeriodSubmission) -> Result<(), ValidationError> {
  check_year(submission.year)?;

  if !(1..=12).contains(&submission.month) {
    return Err(ValidationError::new("Month must be between 1 and 12"));
  }

  let entries = &submission.entries;
  if entries.is_empty() {
    return Err(ValidationError::new("At least one entry is required"));
  }
  if entries.len() > MAX_ENTRIES {
    return Err(ValidationError::new(format!(
      "Maximum {MAX_ENTRIES} entries allowed"
    )));
  }

  let mut ranks = HashSet::new();
  for (i, entry) in entries.iter().enumerate() {
    let n = i + 1;
    let fail = |msg: &str| Err(ValidationError::entry("Entry", n, msg));

    if entry.id.is_empty() {
      return fail("Invalid ID");
    }
    if !(1..=MAX_ENTRIES as u32).contains(&entry.rank) {
      return fail("Rank must be between 1 and 10");
    }
    if !ranks.insert(entry.rank) {
      return Err(ValidationError::entry(
        "Entry",
        n,
        format_args!("Duplicate rank {}", entry.rank),
      ));
    }
    if entry.name.is_empty() {
      return fail("Name is required");
    }
    if chars(&entry.name) > MAX_NAME_CHARS {
      return fail("Name must be max 50 characters");
    }
    if chars(&entry.rank_title) > MAX_RANK_TITLE_CHARS {
      return fail("Rank title must be max 20 characters");
    }
    if entry.target_size.is_empty() {
      return fail("Target size is required");
    }
    if chars(&entry.target_size) > MAX_TARGET_SIZE_CHARS {
      return fail("Target size must be max 20 characters");
    }
    if !LONG_DATE.is_match(&entry.updated_date) {
      return fail("Invalid date format for updatedDate");
    }
    if !LONG_DATE.is_match(&entry.expiry_date) {
      return fail("Invalid date format for expiryDate");
    }
  }

  Ok(())
}

/// Validate a tournament submission.
pub fn validate_tournament(input: &NewTournament) -> Result<(), ValidationError> {
  check_year(input.year)?;

  if input.name.trim().is_empty() {
    return Err(ValidationError::new("Tournament name is required"));
  }
  if chars(&input.name) > MAX_NAME_CHARS {
    return Err(ValidationError::new("Tournament name must be max 50 characters"));
  }
  if !YEAR_LABEL.is_match(&input.event_date) {
    return Err(ValidationError::new("Event date format must be YYYY年"));
  }
  if input.participants.is_empty() {
    return Err(ValidationError::new("At least one participant is required"));
  }

  let mut ranks = HashSet::new();
  for (i, p) in input.participants.iter().enumerate() {
    let n = i + 1;
    let fail = |msg: &str| Err(ValidationError::entry("Participant", n, msg));

    if p.id.is_empty() {
      return fail("Invalid ID");
    }
    if p.rank < 1 {
      return fail("Rank must be a positive integer");
    }
    if !ranks.insert(p.rank) {
      return Err(ValidationError::entry(
        "Participant",
        n,
        format_args!("Duplicate rank {}", p.rank),
      ));
    }
    if p.name.is_empty() {
      return fail("Name is required");
    }
    if chars(&p.name) > MAX_NAME_CHARS {
      return fail("Name must be max 50 characters");
    }
    if chars(&p.rank_title) > MAX_RANK_TITLE_CHARS {
      return fail("Rank title must be max 20 characters");
    }
    let expected = p.score1.checked_add(p.score2);
    if expected != Some(p.total_score) {
      return Err(ValidationError::entry(
        "Participant",
        n,
        format_args!(
          "Total score mismatch (expected {}, got {})",
          p.score1 as u64 + p.score2 as u64,
          p.total_score
        ),
      ));
    }
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::{entry, participant, tournament};

  fn submission(entries: Vec<ResultEntry>) -> PeriodSubmission {
    PeriodSubmission { year: 2025, month: 1, entries }
  }

  fn err(result: Result<(), ValidationError>) -> String {
    result.unwrap_err().message().to_owned()
  }

  #[test]
  fn valid_period_passes() {
    let s = submission(vec![
      entry(1, "person_001", "山田", "1寸"),
      entry(2, "person_002", "佐藤", "1寸2分"),
    ]);
    assert!(validate_period(&s).is_ok());
  }

  #[test]
  fn period_bounds() {
    let mut s = submission(vec![entry(1, "person_001", "山田", "1寸")]);
    s.year = 1999;
    assert_eq!(err(validate_period(&s)), "Year must be between 2000 and 2100");
    s.year = 2025;
    s.month = 13;
    assert_eq!(err(validate_period(&s)), "Month must be between 1 and 12");
  }

  #[test]
  fn entry_count_limits() {
    assert_eq!(err(validate_period(&submission(vec![]))), "At least one entry is required");
    let eleven = (1..=11).map(|r| entry(r, "x", "x", "1寸")).collect();
    assert_eq!(err(validate_period(&submission(eleven))), "Maximum 10 entries allowed");
  }

  #[test]
  fn duplicate_rank_names_the_entry() {
    let s = submission(vec![
      entry(1, "person_001", "山田", "1寸"),
      entry(1, "person_002", "佐藤", "1寸"),
    ]);
    assert_eq!(err(validate_period(&s)), "Entry 2: Duplicate rank 1");
  }

  #[test]
  fn rank_out_of_range() {
    let s = submission(vec![entry(11, "person_001", "山田", "1寸")]);
    assert_eq!(err(validate_period(&s)), "Entry 1: Rank must be between 1 and 10");
  }

  #[test]
  fn field_lengths_count_characters() {
    let mut e = entry(1, "person_001", &"弓".repeat(50), "1寸");
    assert!(validate_period(&submission(vec![e.clone()])).is_ok());
    e.name.push('弓');
    assert_eq!(
      err(validate_period(&submission(vec![e]))),
      "Entry 1: Name must be max 50 characters"
    );
  }

  #[test]
  fn target_size_required() {
    let s = submission(vec![entry(1, "person_001", "山田", "")]);
    assert_eq!(err(validate_period(&s)), "Entry 1: Target size is required");
  }

  #[test]
  fn date_labels_checked() {
    let mut e = entry(1, "person_001", "山田", "1寸");
    e.updated_date = "2025-01-05".into();
    assert_eq!(
      err(validate_period(&submission(vec![e.clone()]))),
      "Entry 1: Invalid date format for updatedDate"
    );
    e.updated_date = "2025年1月5日".into();
    e.expiry_date = "2025年12月".into();
    assert_eq!(
      err(validate_period(&submission(vec![e]))),
      "Entry 1: Invalid date format for expiryDate"
    );
  }

  #[test]
  fn valid_tournament_passes() {
    let t = tournament(2024, vec![participant(1, "佐藤", 9, 8), participant(2, "田中", 8, 8)]);
    assert!(validate_tournament(&t).is_ok());
  }

  #[test]
  fn tournament_header_checks() {
    let mut t = tournament(2024, vec![participant(1, "佐藤", 9, 8)]);
    t.name = "  ".into();
    assert_eq!(err(validate_tournament(&t)), "Tournament name is required");
    t.name = "大会".into();
    t.event_date = "2024".into();
    assert_eq!(err(validate_tournament(&t)), "Event date format must be YYYY年");
    t.event_date = "2024年".into();
    t.participants.clear();
    assert_eq!(err(validate_tournament(&t)), "At least one participant is required");
  }

  #[test]
  fn tournament_total_must_match() {
    let mut p = participant(1, "佐藤", 9, 8);
    p.total_score = 16;
    let t = tournament(2024, vec![p]);
    assert_eq!(
      err(validate_tournament(&t)),
      "Participant 1: Total score mismatch (expected 17, got 16)"
    );
  }

  #[test]
  fn tournament_ranks_positive_and_unique() {
    let t = tournament(2024, vec![participant(0, "佐藤", 1, 1)]);
    assert_eq!(err(validate_tournament(&t)), "Participant 1: Rank must be a positive integer");
    let t = tournament(2024, vec![participant(3, "佐藤", 1, 1), participant(3, "田中", 1, 1)]);
    assert_eq!(err(validate_tournament(&t)), "Participant 2: Duplicate rank 3");
  }
}
