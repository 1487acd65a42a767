//! Path parameter parsing shared by the public and admin routes.
//!
//! Parameters are taken as strings so that malformed values produce the
//! API's JSON error body instead of axum's plain-text rejection.

use matoba_core::period::{Period, TournamentYear};

use crate::ApiError;

/// Parse `{year}/{month}` path segments into a bounded [`Period`].
pub fn period(year: &str, month: &str) -> Result<Period, ApiError> {
  let (Ok(year), Ok(month)) = (year.trim().parse::<i32>(), month.trim().parse::<u32>()) else {
    return Err(ApiError::BadRequest("Invalid year or month".into()));
  };
  Period::new(year, month).map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// Parse a `{year}` path segment naming a tournament.
pub fn tournament_year(year: &str) -> Result<TournamentYear, ApiError> {
  let year = year
    .trim()
    .parse::<i32>()
    .map_err(|_| ApiError::BadRequest("Invalid year parameter".into()))?;
  TournamentYear::new(year).map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// Parse a plain `{year}` path segment.
pub fn year(year: &str) -> Result<i32, ApiError> {
  year
    .trim()
    .parse()
    .map_err(|_| ApiError::BadRequest("Invalid year parameter".into()))
}
