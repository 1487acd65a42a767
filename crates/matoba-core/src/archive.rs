//! Read models derived from the archive indexes, plus index repair.

use chrono::Utc;

use crate::{
  period::Period,
  results::{ArchiveIndex, PeriodRecord},
  store::ArchiveStore,
  tournament::TournamentRecord,
};

/// The newest published period, if any.
pub async fn latest_period<S: ArchiveStore>(store: &S) -> Result<Option<PeriodRecord>, S::Error> {
  let index = store.load_index().await?;
  match index.archives.first() {
    Some(latest) => store.load_period(latest.period).await,
    None => Ok(None),
  }
}

/// Every non-empty record of `year`, December first.
///
/// Each month is loaded directly, so a record missing from the index is
/// still listed. A year outside the archive range has no records.
pub async fn year_periods<S: ArchiveStore>(
  store: &S,
  year: i32,
) -> Result<Vec<PeriodRecord>, S::Error> {
  let mut records = Vec::new();
  for month in (1..=12).rev() {
    let Ok(period) = Period::new(year, month) else { return Ok(records) };
    match store.load_period(period).await {
      Ok(Some(record)) if !record.entries.is_empty() => records.push(record),
      Ok(_) => {}
      Err(e) => tracing::warn!(%period, error = %e, "failed to load period; skipping"),
    }
  }
  Ok(records)
}

/// Distinct indexed years, newest first.
pub async fn available_years<S: ArchiveStore>(store: &S) -> Result<Vec<i32>, S::Error> {
  let index = store.load_index().await?;
  let mut years: Vec<i32> = index.archives.iter().map(|a| a.period.year()).collect();
  years.sort_unstable_by(|a, b| b.cmp(a));
  years.dedup();
  Ok(years)
}

/// The newest tournament, if any.
pub async fn latest_tournament<S: ArchiveStore>(
  store: &S,
) -> Result<Option<TournamentRecord>, S::Error> {
  let index = store.load_tournament_index().await?;
  match index.archives.first() {
    Some(latest) => store.load_tournament(latest.year).await,
    None => Ok(None),
  }
}

/// Records found by [`scan_records`].
#[derive(Debug)]
pub struct Scan<E> {
  /// Readable records, oldest first.
  pub records:    Vec<PeriodRecord>,
  /// Periods present in the store whose records failed to load.
  pub unreadable: Vec<(Period, E)>,
}

/// Load every record physically present in the store, independent of the
/// index.
pub async fn scan_records<S: ArchiveStore>(store: &S) -> Result<Scan<S::Error>, S::Error> {
  let mut scan = Scan { records: Vec::new(), unreadable: Vec::new() };
  for period in store.scan_periods().await? {
    match store.load_period(period).await {
      Ok(Some(record)) => scan.records.push(record),
      Ok(None) => {}
      Err(e) => {
        tracing::warn!(%period, error = %e, "unreadable record");
        scan.unreadable.push((period, e));
      }
    }
  }
  Ok(scan)
}

/// Rebuild the archive index from the records actually present in the
/// store, dropping orphaned entries and adding missing ones.
///
/// Unreadable records are left out of the rebuilt index. Returns the
/// rebuilt index.
pub async fn rebuild_index<S: ArchiveStore>(store: &S) -> Result<ArchiveIndex, S::Error> {
  let now = Utc::now();
  let mut index = ArchiveIndex::empty(now);
  for record in scan_records(store).await?.records {
    index.upsert(record.archive_entry(), now);
  }

  store.save_index(index.clone()).await?;
  tracing::info!(entries = index.archives.len(), "archive index rebuilt");
  Ok(index)
}
