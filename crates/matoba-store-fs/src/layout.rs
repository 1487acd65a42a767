//! On-disk paths.
//!
//! ```text
//! <root>/seiseki/index.json
//! <root>/seiseki/<YYYY>/<MM>.json
//! <root>/taikai/index.json
//! <root>/taikai/<YYYY>.json
//! <root>/persons/persons.json
//! ```

use std::path::{Path, PathBuf};

use matoba_core::period::{Period, TournamentYear};

#[derive(Debug, Clone)]
pub(crate) struct Layout {
  root: PathBuf,
}

impl Layout {
  pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

  pub fn root(&self) -> &Path { &self.root }

  pub fn seiseki_dir(&self) -> PathBuf { self.root.join("seiseki") }

  pub fn index(&self) -> PathBuf { self.seiseki_dir().join("index.json") }

  pub fn period(&self, period: Period) -> PathBuf {
    self
      .seiseki_dir()
      .join(period.year().to_string())
      .join(format!("{:02}.json", period.month()))
  }

  pub fn taikai_dir(&self) -> PathBuf { self.root.join("taikai") }

  pub fn tournament_index(&self) -> PathBuf { self.taikai_dir().join("index.json") }

  pub fn tournament(&self, year: TournamentYear) -> PathBuf {
    self.taikai_dir().join(format!("{year}.json"))
  }

  pub fn registry(&self) -> PathBuf { self.root.join("persons").join("persons.json") }
}

/// Parse a year directory name such as `2024`.
pub(crate) fn parse_year_dir(name: &str) -> Option<i32> {
  if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
    return None;
  }
  name.parse().ok()
}

/// Parse a month file name such as `03.json` or `3.json`.
pub(crate) fn parse_month_file(name: &str) -> Option<u32> {
  let stem = name.strip_suffix(".json")?;
  if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
    return None;
  }
  stem.parse().ok()
}
