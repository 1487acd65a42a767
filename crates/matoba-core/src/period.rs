//! Calendar periods: the `(year, month)` key of a published ranking.
//!
//! A [`Period`] can only be constructed through [`Period::new`], which
//! bounds the year and month. The store uses periods to build file paths,
//! so the bounds double as path traversal protection.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Earliest year accepted for monthly results.
pub const MIN_YEAR: i32 = 2000;
/// Latest year accepted for monthly results and tournaments.
pub const MAX_YEAR: i32 = 2100;
/// Earliest year accepted for a stored tournament record.
pub const MIN_TOURNAMENT_YEAR: i32 = 1900;

/// One calendar month. Ordering is chronological.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "RawPeriod")]
pub struct Period {
  year:  i32,
  month: u32,
}

#[derive(Deserialize)]
struct RawPeriod {
  year:  i32,
  month: u32,
}

impl TryFrom<RawPeriod> for Period {
  type Error = Error;

  fn try_from(raw: RawPeriod) -> Result<Self> { Self::new(raw.year, raw.month) }
}

impl Period {
  pub fn new(year: i32, month: u32) -> Result<Self> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
      return Err(Error::InvalidYear(year));
    }
    if !(1..=12).contains(&month) {
      return Err(Error::InvalidMonth(month));
    }
    Ok(Self { year, month })
  }

  pub fn year(&self) -> i32 { self.year }

  pub fn month(&self) -> u32 { self.month }

  /// The following calendar month, rolling December over into January.
  pub fn next(&self) -> Self {
    if self.month == 12 {
      Self { year: self.year + 1, month: 1 }
    } else {
      Self { year: self.year, month: self.month + 1 }
    }
  }

  /// Every month from `self` through `end`, both inclusive.
  ///
  /// Empty when `end` precedes `self`.
  pub fn months_through(self, end: Period) -> MonthsThrough {
    MonthsThrough { next: Some(self).filter(|p| *p <= end), end }
  }
}

impl fmt::Display for Period {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{:02}", self.year, self.month)
  }
}

/// Iterator returned by [`Period::months_through`].
#[derive(Debug, Clone)]
pub struct MonthsThrough {
  next: Option<Period>,
  end:  Period,
}

impl Iterator for MonthsThrough {
  type Item = Period;

  fn next(&mut self) -> Option<Period> {
    let current = self.next?;
    self.next = Some(current.next()).filter(|p| *p <= self.end);
    Some(current)
  }
}

/// A validated tournament year; tournaments are held at most once a year.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "i32", into = "i32")]
pub struct TournamentYear(i32);

impl TryFrom<i32> for TournamentYear {
  type Error = Error;

  fn try_from(year: i32) -> Result<Self> { Self::new(year) }
}

impl From<TournamentYear> for i32 {
  fn from(year: TournamentYear) -> Self { year.0 }
}

impl TournamentYear {
  pub fn new(year: i32) -> Result<Self> {
    if !(MIN_TOURNAMENT_YEAR..=MAX_YEAR).contains(&year) {
      return Err(Error::InvalidYear(year));
    }
    Ok(Self(year))
  }

  pub fn get(&self) -> i32 { self.0 }
}

impl fmt::Display for TournamentYear {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}
