//! Person-centric history reconstruction.
//!
//! Monthly rankings only list the top ten, so a competitor appears in a
//! sparse, irregular subset of periods. [`person_history`] turns those
//! appearances into a dense month-by-month series from the first appearance
//! to the last, with explicit gap entries for the months in between. The
//! result can be charted without any missing-month handling downstream.
//!
//! Tournament history ([`tournament_history`]) is simpler: tournaments are
//! annual and naturally sparse, so no gaps are synthesised.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
  period::Period,
  results::{PersonId, ResultEntry},
  store::ArchiveStore,
  target::{NO_DATA_LABEL, parse_target_size},
  tournament::ParticipantName,
};

// ─── Monthly history ─────────────────────────────────────────────────────────

/// One calendar month of a reconstructed history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonHistoryEntry {
  pub year:                i32,
  pub month:               u32,
  /// `None` for a gap month.
  pub rank:                Option<u32>,
  pub target_size_label:   String,
  /// `None` for a gap month. A present but unreadable label yields `0.0`.
  pub target_size_numeric: Option<f64>,
  pub rank_title:          String,
}

impl PersonHistoryEntry {
  fn from_entry(period: Period, entry: &ResultEntry) -> Self {
    Self {
      year:                period.year(),
      month:               period.month(),
      rank:                Some(entry.rank),
      target_size_label:   entry.target_size.clone(),
      target_size_numeric: Some(parse_target_size(&entry.target_size).unwrap_or(0.0)),
      rank_title:          entry.rank_title.clone(),
    }
  }

  fn gap(period: Period) -> Self {
    Self {
      year:                period.year(),
      month:               period.month(),
      rank:                None,
      target_size_label:   NO_DATA_LABEL.to_owned(),
      target_size_numeric: None,
      rank_title:          String::new(),
    }
  }

  pub fn is_gap(&self) -> bool { self.rank.is_none() }
}

/// A person's ranking history, oldest month first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonHistory {
  pub person_id: String,
  /// The name on the person's chronologically last appearance.
  pub name:      String,
  pub history:   Vec<PersonHistoryEntry>,
}

/// Reconstruct the monthly history of `person_id`.
///
/// Every indexed period is scanned oldest first. Periods whose record is
/// missing or unreadable are skipped, so index/store drift never aborts the
/// reconstruction. Returns `Ok(None)` when the person appears nowhere; only
/// a failure to read the index itself is an error.
pub async fn person_history<S: ArchiveStore>(
  store: &S,
  person_id: &PersonId,
) -> Result<Option<PersonHistory>, S::Error> {
  let index = store.load_index().await?;

  let mut appearances: BTreeMap<Period, ResultEntry> = BTreeMap::new();
  for period in index.periods_ascending() {
    let record = match store.load_period(period).await {
      Ok(Some(record)) => record,
      Ok(None) => {
        tracing::warn!(%period, "indexed period has no stored record; skipping");
        continue;
      }
      Err(e) => {
        tracing::warn!(%period, error = %e, "failed to load period; skipping");
        continue;
      }
    };

    if let Some(entry) = record.entry_for(person_id) {
      tracing::debug!(%period, name = %entry.name, "found appearance");
      appearances.insert(period, entry.clone());
    }
  }

  let (Some((&first, _)), Some((&last, last_entry))) =
    (appearances.first_key_value(), appearances.last_key_value())
  else {
    tracing::debug!(%person_id, "no appearances");
    return Ok(None);
  };

  let name = last_entry.name.clone();
  let history = first
    .months_through(last)
    .map(|month| match appearances.get(&month) {
      Some(entry) => PersonHistoryEntry::from_entry(month, entry),
      None => PersonHistoryEntry::gap(month),
    })
    .collect();

  Ok(Some(PersonHistory {
    person_id: person_id.as_str().to_owned(),
    name,
    history,
  }))
}

// ─── Tournament history ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonTournamentHistoryEntry {
  pub year:        i32,
  pub taikai_name: String,
  pub rank:        u32,
  pub score1:      u32,
  pub score2:      u32,
  pub total_score: u32,
  pub rank_title:  String,
}

/// A participant's tournament results, newest year first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonTournamentHistory {
  pub name:    String,
  pub history: Vec<PersonTournamentHistoryEntry>,
}

/// Collect every tournament in which a participant named `name` appears.
///
/// Names are matched exactly, so different people sharing a name are
/// conflated. Years without a match are simply absent.
pub async fn tournament_history<S: ArchiveStore>(
  store: &S,
  name: &ParticipantName,
) -> Result<Option<PersonTournamentHistory>, S::Error> {
  let index = store.load_tournament_index().await?;

  let mut history = Vec::new();
  for archive in &index.archives {
    let record = match store.load_tournament(archive.year).await {
      Ok(Some(record)) => record,
      Ok(None) => {
        tracing::warn!(year = %archive.year, "indexed tournament has no stored record; skipping");
        continue;
      }
      Err(e) => {
        tracing::warn!(year = %archive.year, error = %e, "failed to load tournament; skipping");
        continue;
      }
    };

    if let Some(p) = record.participant_named(name) {
      history.push(PersonTournamentHistoryEntry {
        year:        record.year.get(),
        taikai_name: record.name.clone(),
        rank:        p.rank,
        score1:      p.score1,
        score2:      p.score2,
        total_score: p.total_score,
        rank_title:  p.rank_title.clone(),
      });
    }
  }

  if history.is_empty() {
    return Ok(None);
  }

  Ok(Some(PersonTournamentHistory { name: name.as_str().to_owned(), history }))
}
