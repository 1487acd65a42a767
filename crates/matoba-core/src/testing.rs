//! In-memory [`ArchiveStore`] and fixtures for unit tests.

use std::{
  collections::{BTreeMap, BTreeSet},
  sync::Mutex,
};

use chrono::Utc;

use crate::{
  period::{Period, TournamentYear},
  person::PersonRegistry,
  results::{ArchiveIndex, PeriodRecord, ResultEntry},
  store::ArchiveStore,
  tournament::{NewTournament, TournamentIndex, TournamentParticipant, TournamentRecord},
};

#[derive(Debug, thiserror::Error)]
#[error("memory store: {0}")]
pub struct MemoryError(String);

#[derive(Default)]
struct Inner {
  index:            Option<ArchiveIndex>,
  periods:          BTreeMap<Period, PeriodRecord>,
  broken:           BTreeSet<Period>,
  tournament_index: Option<TournamentIndex>,
  tournaments:      BTreeMap<TournamentYear, TournamentRecord>,
  registry:         Option<PersonRegistry>,
}

#[derive(Default)]
pub struct MemoryStore {
  inner: Mutex<Inner>,
}

impl MemoryStore {
  fn with<T>(&self, f: impl FnOnce(&mut Inner) -> T) -> T {
    let mut guard = self.inner.lock().unwrap();
    f(&mut guard)
  }

  pub fn put_period(&self, period: Period, entries: Vec<ResultEntry>) {
    self.with(|inner| put_period(inner, period, entries));
  }

  /// Store a record without an index entry.
  pub fn put_unindexed(&self, period: Period, entries: Vec<ResultEntry>) {
    let now = Utc::now();
    let record = PeriodRecord { period, entries, published_at: now, updated_at: now };
    self.with(|inner| {
      inner.periods.insert(period, record);
    });
  }

  /// Remove the record but leave its index entry behind.
  pub fn drop_record(&self, period: Period) {
    self.with(|inner| inner.periods.remove(&period));
  }

  /// Make every load of `period` fail.
  pub fn break_period(&self, period: Period) {
    self.with(|inner| inner.broken.insert(period));
  }

  pub fn put_tournament(&self, input: NewTournament) {
    self.with(|inner| put_tournament(inner, input));
  }

  pub fn drop_tournament(&self, year: TournamentYear) {
    self.with(|inner| inner.tournaments.remove(&year));
  }

  pub fn index(&self) -> ArchiveIndex {
    self.with(|inner| inner.index.clone().unwrap_or_else(|| ArchiveIndex::empty(Utc::now())))
  }
}

fn put_period(inner: &mut Inner, period: Period, entries: Vec<ResultEntry>) -> PeriodRecord {
  let now = Utc::now();
  let published_at = inner.periods.get(&period).map_or(now, |r| r.published_at);
  let record = PeriodRecord { period, entries, published_at, updated_at: now };
  inner
    .index
    .get_or_insert_with(|| ArchiveIndex::empty(now))
    .upsert(record.archive_entry(), now);
  inner.periods.insert(period, record.clone());
  record
}

fn put_tournament(inner: &mut Inner, input: NewTournament) -> TournamentRecord {
  let now = Utc::now();
  let year = TournamentYear::new(input.year).unwrap();
  let published_at = inner.tournaments.get(&year).map_or(now, |r| r.published_at);
  let record = TournamentRecord {
    year,
    name: input.name,
    event_date: input.event_date,
    participants: input.participants,
    published_at,
    updated_at: now,
  };
  inner
    .tournament_index
    .get_or_insert_with(|| TournamentIndex::empty(now))
    .upsert(record.archive_entry(), now);
  inner.tournaments.insert(year, record.clone());
  record
}

impl ArchiveStore for MemoryStore {
  type Error = MemoryError;

  async fn load_index(&self) -> Result<ArchiveIndex, MemoryError> { Ok(self.index()) }

  async fn load_period(&self, period: Period) -> Result<Option<PeriodRecord>, MemoryError> {
    self.with(|inner| {
      if inner.broken.contains(&period) {
        return Err(MemoryError(format!("{period} is unreadable")));
      }
      Ok(inner.periods.get(&period).cloned())
    })
  }

  async fn save_period(
    &self,
    period: Period,
    entries: Vec<ResultEntry>,
  ) -> Result<PeriodRecord, MemoryError> {
    Ok(self.with(|inner| put_period(inner, period, entries)))
  }

  async fn delete_period(&self, period: Period) -> Result<bool, MemoryError> {
    Ok(self.with(|inner| {
      let removed = inner.periods.remove(&period).is_some();
      let unindexed = inner
        .index
        .as_mut()
        .is_some_and(|index| index.remove(period, Utc::now()));
      removed || unindexed
    }))
  }

  async fn scan_periods(&self) -> Result<Vec<Period>, MemoryError> {
    Ok(self.with(|inner| inner.periods.keys().copied().collect()))
  }

  async fn save_index(&self, index: ArchiveIndex) -> Result<(), MemoryError> {
    self.with(|inner| inner.index = Some(index));
    Ok(())
  }

  async fn load_tournament_index(&self) -> Result<TournamentIndex, MemoryError> {
    Ok(self.with(|inner| {
      inner
        .tournament_index
        .clone()
        .unwrap_or_else(|| TournamentIndex::empty(Utc::now()))
    }))
  }

  async fn load_tournament(
    &self,
    year: TournamentYear,
  ) -> Result<Option<TournamentRecord>, MemoryError> {
    Ok(self.with(|inner| inner.tournaments.get(&year).cloned()))
  }

  async fn save_tournament(&self, input: NewTournament) -> Result<TournamentRecord, MemoryError> {
    Ok(self.with(|inner| put_tournament(inner, input)))
  }

  async fn delete_tournament(&self, year: TournamentYear) -> Result<bool, MemoryError> {
    Ok(self.with(|inner| {
      let removed = inner.tournaments.remove(&year).is_some();
      let unindexed = inner
        .tournament_index
        .as_mut()
        .is_some_and(|index| index.remove(year, Utc::now()));
      removed || unindexed
    }))
  }

  async fn load_registry(&self) -> Result<Option<PersonRegistry>, MemoryError> {
    Ok(self.with(|inner| inner.registry.clone()))
  }

  async fn save_registry(&self, registry: PersonRegistry) -> Result<(), MemoryError> {
    self.with(|inner| inner.registry = Some(registry));
    Ok(())
  }
}

// ─── Fixtures ────────────────────────────────────────────────────────────────

pub fn period(year: i32, month: u32) -> Period { Period::new(year, month).unwrap() }

pub fn entry(rank: u32, person_id: &str, name: &str, target_size: &str) -> ResultEntry {
  let mut e = ResultEntry::new(rank, name, target_size).with_person_id(person_id);
  e.rank_title = "初段".into();
  e.updated_date = "2025年1月5日".into();
  e.expiry_date = "2025年4月4日".into();
  e
}

pub fn participant(rank: u32, name: &str, score1: u32, score2: u32) -> TournamentParticipant {
  TournamentParticipant {
    id: format!("p{rank}"),
    rank,
    name: name.into(),
    rank_title: "二段".into(),
    score1,
    score2,
    total_score: score1 + score2,
  }
}

pub fn tournament(year: i32, participants: Vec<TournamentParticipant>) -> NewTournament {
  NewTournament {
    year,
    name: format!("{year}年弓術大会"),
    event_date: format!("{year}年"),
    participants,
  }
}
