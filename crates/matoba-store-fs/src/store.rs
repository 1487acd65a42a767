//! [`FsStore`], the JSON-file implementation of [`ArchiveStore`].

use std::{
  io::ErrorKind,
  path::{Path, PathBuf},
  sync::Arc,
};

use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};
use tokio::{fs, sync::Mutex};
use uuid::Uuid;

use matoba_core::{
  period::{Period, TournamentYear},
  person::PersonRegistry,
  results::{ArchiveIndex, PeriodRecord, ResultEntry},
  store::ArchiveStore,
  tournament::{NewTournament, TournamentIndex, TournamentRecord},
};

use crate::{
  Error, Result,
  layout::{Layout, parse_month_file, parse_year_dir},
};

// ─── File helpers ────────────────────────────────────────────────────────────

/// Read and decode `path`, or `None` if it does not exist.
async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
  let bytes = match fs::read(path).await {
    Ok(bytes) => bytes,
    Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
    Err(e) => return Err(Error::io(path)(e)),
  };
  let value = serde_json::from_slice(&bytes).map_err(Error::json(path))?;
  Ok(Some(value))
}

/// Write `value` as pretty JSON, replacing `path` atomically.
///
/// The bytes go to a temporary sibling first, which is then renamed over
/// the target, so readers see either the old or the new file.
async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
  let parent = path.parent().unwrap_or(Path::new("."));
  fs::create_dir_all(parent).await.map_err(Error::io(parent))?;

  let mut bytes = serde_json::to_vec_pretty(value).map_err(Error::json(path))?;
  bytes.push(b'\n');

  let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("record");
  let tmp = parent.join(format!(".{file_name}.{}.tmp", Uuid::new_v4().simple()));
  fs::write(&tmp, &bytes).await.map_err(Error::io(&tmp))?;
  if let Err(e) = fs::rename(&tmp, path).await {
    let _ = fs::remove_file(&tmp).await;
    return Err(Error::io(path)(e));
  }
  Ok(())
}

/// Remove `path`. Returns whether it existed.
async fn remove_file(path: &Path) -> Result<bool> {
  match fs::remove_file(path).await {
    Ok(()) => Ok(true),
    Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
    Err(e) => Err(Error::io(path)(e)),
  }
}

/// Names of the entries of `dir`, or nothing if it does not exist.
async fn list_dir(dir: &Path) -> Result<Vec<(String, bool)>> {
  let mut read = match fs::read_dir(dir).await {
    Ok(read) => read,
    Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
    Err(e) => return Err(Error::io(dir)(e)),
  };

  let mut names = Vec::new();
  while let Some(entry) = read.next_entry().await.map_err(Error::io(dir))? {
    let is_dir = entry.file_type().await.map_err(Error::io(entry.path()))?.is_dir();
    if let Some(name) = entry.file_name().to_str() {
      names.push((name.to_owned(), is_dir));
    }
  }
  Ok(names)
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Matoba archive stored as JSON files under one directory.
///
/// Cloning is cheap; clones share the write lock. Writes are serialised so
/// that each record write and its index update are not interleaved with
/// another writer in this process. The index is read before the record is
/// touched, so an unreadable index fails the write with nothing changed.
#[derive(Clone)]
pub struct FsStore {
  layout: Layout,
  writes: Arc<Mutex<()>>,
}

impl FsStore {
  /// Open the archive rooted at `root`, creating the directory if needed.
  pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
    let layout = Layout::new(root);
    fs::create_dir_all(layout.root())
      .await
      .map_err(Error::io(layout.root()))?;
    tracing::debug!(root = %layout.root().display(), "opened archive");
    Ok(Self { layout, writes: Arc::new(Mutex::new(())) })
  }

  pub fn root(&self) -> &Path { self.layout.root() }

  /// The stored index, or an empty one if none has been written yet.
  async fn read_index(&self) -> Result<ArchiveIndex> {
    Ok(
      read_json(&self.layout.index())
        .await?
        .unwrap_or_else(|| ArchiveIndex::empty(Utc::now())),
    )
  }

  async fn read_tournament_index(&self) -> Result<TournamentIndex> {
    Ok(
      read_json(&self.layout.tournament_index())
        .await?
        .unwrap_or_else(|| TournamentIndex::empty(Utc::now())),
    )
  }
}

impl ArchiveStore for FsStore {
  type Error = Error;

  // ── Monthly results ───────────────────────────────────────────────────

  async fn load_index(&self) -> Result<ArchiveIndex> { self.read_index().await }

  async fn load_period(&self, period: Period) -> Result<Option<PeriodRecord>> {
    tracing::debug!(%period, "loading period");
    read_json(&self.layout.period(period)).await
  }

  async fn save_period(&self, period: Period, entries: Vec<ResultEntry>) -> Result<PeriodRecord> {
    let _guard = self.writes.lock().await;
    let mut index = self.read_index().await?;
    let path = self.layout.period(period);
    let now = Utc::now();

    let published_at = match read_json::<PeriodRecord>(&path).await {
      Ok(Some(existing)) => existing.published_at,
      Ok(None) => now,
      Err(e) => {
        tracing::warn!(%period, error = %e, "existing record unreadable; treating as new");
        now
      }
    };
    let record = PeriodRecord { period, entries, published_at, updated_at: now };
    write_json(&path, &record).await?;

    index.upsert(record.archive_entry(), now);
    write_json(&self.layout.index(), &index).await?;

    tracing::info!(%period, entries = record.entries.len(), "saved period");
    Ok(record)
  }

  async fn delete_period(&self, period: Period) -> Result<bool> {
    let _guard = self.writes.lock().await;
    let mut index = self.read_index().await?;
    let removed = remove_file(&self.layout.period(period)).await?;

    let unindexed = index.remove(period, Utc::now());
    if unindexed {
      write_json(&self.layout.index(), &index).await?;
    }

    if removed || unindexed {
      tracing::info!(%period, "deleted period");
    }
    Ok(removed || unindexed)
  }

  async fn scan_periods(&self) -> Result<Vec<Period>> {
    let root = self.layout.seiseki_dir();
    let mut periods = Vec::new();

    for (name, is_dir) in list_dir(&root).await? {
      let Some(year) = parse_year_dir(&name).filter(|_| is_dir) else { continue };
      for (file, is_dir) in list_dir(&root.join(&name)).await? {
        if is_dir {
          continue;
        }
        let Some(month) = parse_month_file(&file) else { continue };
        match Period::new(year, month) {
          Ok(period) => periods.push(period),
          Err(e) => tracing::warn!(year = %name, %file, error = %e, "ignoring stray file"),
        }
      }
    }

    periods.sort();
    periods.dedup();
    Ok(periods)
  }

  async fn save_index(&self, index: ArchiveIndex) -> Result<()> {
    let _guard = self.writes.lock().await;
    write_json(&self.layout.index(), &index).await
  }

  // ── Tournaments ───────────────────────────────────────────────────────

  async fn load_tournament_index(&self) -> Result<TournamentIndex> {
    self.read_tournament_index().await
  }

  async fn load_tournament(&self, year: TournamentYear) -> Result<Option<TournamentRecord>> {
    read_json(&self.layout.tournament(year)).await
  }

  async fn save_tournament(&self, input: NewTournament) -> Result<TournamentRecord> {
    let year = TournamentYear::new(input.year)?;
    let _guard = self.writes.lock().await;
    let mut index = self.read_tournament_index().await?;
    let path = self.layout.tournament(year);
    let now = Utc::now();

    let published_at = match read_json::<TournamentRecord>(&path).await {
      Ok(existing) => existing.map_or(now, |r| r.published_at),
      Err(e) => {
        tracing::warn!(%year, error = %e, "existing tournament unreadable; treating as new");
        now
      }
    };
    let record = TournamentRecord {
      year,
      name: input.name,
      event_date: input.event_date,
      participants: input.participants,
      published_at,
      updated_at: now,
    };
    write_json(&path, &record).await?;

    index.upsert(record.archive_entry(), now);
    write_json(&self.layout.tournament_index(), &index).await?;

    tracing::info!(%year, participants = record.participants.len(), "saved tournament");
    Ok(record)
  }

  async fn delete_tournament(&self, year: TournamentYear) -> Result<bool> {
    let _guard = self.writes.lock().await;
    let mut index = self.read_tournament_index().await?;
    let removed = remove_file(&self.layout.tournament(year)).await?;

    let unindexed = index.remove(year, Utc::now());
    if unindexed {
      write_json(&self.layout.tournament_index(), &index).await?;
    }

    if removed || unindexed {
      tracing::info!(%year, "deleted tournament");
    }
    Ok(removed || unindexed)
  }

  // ── Person registry ───────────────────────────────────────────────────

  async fn load_registry(&self) -> Result<Option<PersonRegistry>> {
    read_json(&self.layout.registry()).await
  }

  async fn save_registry(&self, registry: PersonRegistry) -> Result<()> {
    let _guard = self.writes.lock().await;
    write_json(&self.layout.registry(), &registry).await?;
    tracing::info!(persons = registry.persons.len(), "saved person registry");
    Ok(())
  }
}
