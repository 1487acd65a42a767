//! Monthly ranking results: entries, period records and the archive index.
//!
//! A [`PeriodRecord`] is the unit an administrator publishes: the full,
//! rank-ordered list of up to ten competitors for one month. The
//! [`ArchiveIndex`] is a denormalised summary of which periods exist.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, period::Period};

/// Maximum number of competitors published for one period.
pub const MAX_ENTRIES: usize = 10;

// ─── Entries ─────────────────────────────────────────────────────────────────

/// One ranked competitor within one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultEntry {
  /// Opaque row id, unique within its period only.
  pub id:           String,
  /// Stable cross-period identity. Absent on legacy rows.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub person_id:    Option<String>,
  /// Disambiguates different people who share a display name.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub person_key:   Option<String>,
  pub rank:         u32,
  pub name:         String,
  #[serde(default)]
  pub rank_title:   String,
  /// Free-text size label, e.g. `"1寸2分"`.
  pub target_size:  String,
  /// Long-form date label, e.g. `"2025年11月26日"`.
  pub updated_date: String,
  pub expiry_date:  String,
  /// Placeholder row padding a short ranking.
  #[serde(default, skip_serializing_if = "std::ops::Not::not")]
  pub is_empty:     bool,
}

impl ResultEntry {
  /// A new entry with a freshly minted row id.
  pub fn new(rank: u32, name: impl Into<String>, target_size: impl Into<String>) -> Self {
    Self {
      id: Uuid::new_v4().to_string(),
      person_id: None,
      person_key: None,
      rank,
      name: name.into(),
      rank_title: String::new(),
      target_size: target_size.into(),
      updated_date: String::new(),
      expiry_date: String::new(),
      is_empty: false,
    }
  }

  pub fn with_person_id(mut self, person_id: impl Into<String>) -> Self {
    self.person_id = Some(person_id.into());
    self
  }

  /// The person id if present and non-empty.
  pub fn person_id(&self) -> Option<&str> {
    self.person_id.as_deref().filter(|id| !id.is_empty())
  }
}

// ─── Period record ───────────────────────────────────────────────────────────

/// All published entries for one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodRecord {
  #[serde(flatten)]
  pub period:       Period,
  pub entries:      Vec<ResultEntry>,
  /// Set on the first save and preserved by every later save.
  pub published_at: DateTime<Utc>,
  /// Refreshed on every save.
  pub updated_at:   DateTime<Utc>,
}

impl PeriodRecord {
  /// The entry belonging to `person_id`, if any.
  pub fn entry_for(&self, person_id: &PersonId) -> Option<&ResultEntry> {
    self
      .entries
      .iter()
      .find(|e| e.person_id() == Some(person_id.as_str()))
  }

  /// The index summary derived from this record.
  pub fn archive_entry(&self) -> ArchiveEntry {
    ArchiveEntry {
      period:       self.period,
      entry_count:  self.entries.len(),
      published_at: self.published_at,
    }
  }
}

// ─── Archive index ───────────────────────────────────────────────────────────

/// Summary of one stored [`PeriodRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveEntry {
  #[serde(flatten)]
  pub period:       Period,
  pub entry_count:  usize,
  pub published_at: DateTime<Utc>,
}

/// Directory of stored periods, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveIndex {
  pub archives:     Vec<ArchiveEntry>,
  pub last_updated: DateTime<Utc>,
}

impl ArchiveIndex {
  pub fn empty(now: DateTime<Utc>) -> Self {
    Self { archives: Vec::new(), last_updated: now }
  }

  /// Insert or replace the summary for `entry.period`, keeping the
  /// collection sorted newest first.
  pub fn upsert(&mut self, entry: ArchiveEntry, now: DateTime<Utc>) {
    match self.archives.iter_mut().find(|a| a.period == entry.period) {
      Some(existing) => *existing = entry,
      None => self.archives.push(entry),
    }
    self.archives.sort_by(|a, b| b.period.cmp(&a.period));
    self.last_updated = now;
  }

  /// Remove the summary for `period`. Returns whether one was present.
  pub fn remove(&mut self, period: Period, now: DateTime<Utc>) -> bool {
    let before = self.archives.len();
    self.archives.retain(|a| a.period != period);
    self.last_updated = now;
    self.archives.len() != before
  }

  /// Indexed periods, oldest first.
  pub fn periods_ascending(&self) -> impl Iterator<Item = Period> + '_ {
    self.archives.iter().rev().map(|a| a.period)
  }
}

// ─── Identity ────────────────────────────────────────────────────────────────

/// A non-empty person identifier, e.g. `person_012`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PersonId(String);

impl PersonId {
  /// Ids are compared verbatim, so only emptiness is checked.
  pub fn parse(raw: &str) -> Result<Self> {
    if raw.trim().is_empty() {
      return Err(Error::EmptyPersonId);
    }
    Ok(Self(raw.to_owned()))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl std::fmt::Display for PersonId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}
