//! Annual tournament results.
//!
//! Tournaments are keyed by year and participants are identified by display
//! name only; there is no cross-year identity key in this domain.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, period::TournamentYear};

/// One participant's result in a tournament.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentParticipant {
  pub id:          String,
  pub rank:        u32,
  pub name:        String,
  #[serde(default)]
  pub rank_title:  String,
  pub score1:      u32,
  pub score2:      u32,
  /// Always `score1 + score2` for validated submissions.
  pub total_score: u32,
}

/// An administrator's submission for one tournament year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTournament {
  pub year:         i32,
  #[serde(rename = "taikaiName")]
  pub name:         String,
  /// Year label, e.g. `"2025年"`.
  pub event_date:   String,
  pub participants: Vec<TournamentParticipant>,
}

/// A stored tournament.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentRecord {
  pub year:         TournamentYear,
  #[serde(rename = "taikaiName")]
  pub name:         String,
  pub event_date:   String,
  pub participants: Vec<TournamentParticipant>,
  pub published_at: DateTime<Utc>,
  pub updated_at:   DateTime<Utc>,
}

impl TournamentRecord {
  /// The first participant whose name equals `name` exactly.
  pub fn participant_named(&self, name: &ParticipantName) -> Option<&TournamentParticipant> {
    self.participants.iter().find(|p| p.name == name.as_str())
  }

  pub fn archive_entry(&self) -> TournamentArchiveEntry {
    TournamentArchiveEntry {
      year:              self.year,
      name:              self.name.clone(),
      participant_count: self.participants.len(),
      event_date:        self.event_date.clone(),
      published_at:      self.published_at,
    }
  }
}

// ─── Index ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentArchiveEntry {
  pub year:              TournamentYear,
  #[serde(rename = "taikaiName")]
  pub name:              String,
  pub participant_count: usize,
  pub event_date:        String,
  pub published_at:      DateTime<Utc>,
}

/// Directory of stored tournaments, newest year first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentIndex {
  pub archives:     Vec<TournamentArchiveEntry>,
  pub last_updated: DateTime<Utc>,
}

impl TournamentIndex {
  pub fn empty(now: DateTime<Utc>) -> Self {
    Self { archives: Vec::new(), last_updated: now }
  }

  pub fn upsert(&mut self, entry: TournamentArchiveEntry, now: DateTime<Utc>) {
    match self.archives.iter_mut().find(|a| a.year == entry.year) {
      Some(existing) => *existing = entry,
      None => self.archives.push(entry),
    }
    self.archives.sort_by(|a, b| b.year.cmp(&a.year));
    self.last_updated = now;
  }

  pub fn remove(&mut self, year: TournamentYear, now: DateTime<Utc>) -> bool {
    let before = self.archives.len();
    self.archives.retain(|a| a.year != year);
    self.last_updated = now;
    self.archives.len() != before
  }
}

// ─── Identity ────────────────────────────────────────────────────────────────

/// A non-empty participant display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParticipantName(String);

impl ParticipantName {
  /// Names are compared verbatim, so only emptiness is checked.
  pub fn parse(raw: &str) -> Result<Self> {
    if raw.trim().is_empty() {
      return Err(Error::EmptyParticipantName);
    }
    Ok(Self(raw.to_owned()))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn year(y: i32) -> TournamentYear { TournamentYear::new(y).unwrap() }

  fn summary(y: i32) -> TournamentArchiveEntry {
    TournamentArchiveEntry {
      year:              year(y),
      name:              format!("{y}年弓術大会"),
      participant_count: 3,
      event_date:        format!("{y}年"),
      published_at:      Utc.timestamp_opt(0, 0).unwrap(),
    }
  }

  #[test]
  fn index_sorted_newest_first() {
    let now = Utc.timestamp_opt(10, 0).unwrap();
    let mut index = TournamentIndex::empty(now);
    index.upsert(summary(2021), now);
    index.upsert(summary(2024), now);
    index.upsert(summary(2022), now);
    let years: Vec<_> = index.archives.iter().map(|a| a.year.get()).collect();
    assert_eq!(years, [2024, 2022, 2021]);
    assert!(index.remove(year(2022), now));
    assert_eq!(index.archives.len(), 2);
  }

  #[test]
  fn record_json_uses_taikai_name() {
    let json = r#"{
      "year": 2024, "taikaiName": "令和6年弓術大会", "eventDate": "2024年",
      "participants": [
        {"id": "p1", "rank": 1, "name": "佐藤", "rankTitle": "三段",
         "score1": 8, "score2": 7, "totalScore": 15}
      ],
      "publishedAt": "2024-11-03T09:00:00.000Z",
      "updatedAt": "2024-11-03T09:00:00.000Z"
    }"#;
    let record: TournamentRecord = serde_json::from_str(json).unwrap();
    assert_eq!(record.name, "令和6年弓術大会");
    assert_eq!(record.year.get(), 2024);

    let name = ParticipantName::parse("佐藤").unwrap();
    assert_eq!(record.participant_named(&name).map(|p| p.total_score), Some(15));
  }

  #[test]
  fn participant_name_rejects_blank() {
    assert!(matches!(ParticipantName::parse(""), Err(Error::EmptyParticipantName)));
    assert!(ParticipantName::parse(" 田中 ").is_ok());
  }
}
