//! Handlers for `/api/admin` endpoints. Every route requires an
//! [`Authenticated`] administrator.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/seiseki` | Body: `{year, month, entries}` |
//! | `DELETE` | `/seiseki/:year/:month` | 204, or 404 if absent |
//! | `POST`   | `/taikai` | Body: `{year, taikaiName, eventDate, participants}` |
//! | `DELETE` | `/taikai/:year` | 204, or 404 if absent |
//! | `GET`    | `/session` | The authenticated username |

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
  http::StatusCode,
};
use matoba_api::params;
use matoba_core::{
  period::Period,
  store::ArchiveStore,
  tournament::NewTournament,
  validate::{PeriodSubmission, validate_period, validate_tournament},
};
use serde::Serialize;

use crate::{AppState, auth::Authenticated, error::Error};

#[derive(Debug, Serialize)]
pub struct Saved {
  pub success: bool,
  pub message: String,
}

impl Saved {
  fn new(message: String) -> Json<Self> { Json(Self { success: true, message }) }
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, Error> {
  payload
    .map(|Json(t)| t)
    .map_err(|e| Error::BadRequest(e.body_text()))
}

// ─── Monthly results ─────────────────────────────────────────────────────────

/// `POST /api/admin/seiseki`
pub async fn save_period<S: ArchiveStore>(
  State(state): State<AppState<S>>,
  admin: Authenticated,
  payload: Result<Json<PeriodSubmission>, JsonRejection>,
) -> Result<Json<Saved>, Error> {
  let submission = body(payload)?;
  validate_period(&submission)?;

  let period = Period::new(submission.year, submission.month)
    .map_err(|e| Error::BadRequest(e.to_string()))?;
  state
    .store
    .save_period(period, submission.entries)
    .await
    .map_err(Error::store)?;

  tracing::info!(%period, admin = %admin.username, "published period");
  Ok(Saved::new(format!(
    "Seiseki data saved for {}/{}",
    period.year(),
    period.month()
  )))
}

/// `DELETE /api/admin/seiseki/:year/:month`
pub async fn delete_period<S: ArchiveStore>(
  State(state): State<AppState<S>>,
  admin: Authenticated,
  Path((year, month)): Path<(String, String)>,
) -> Result<StatusCode, Error> {
  let period = params::period(&year, &month)?;
  let removed = state.store.delete_period(period).await.map_err(Error::store)?;
  if !removed {
    return Err(Error::NotFound(format!("No data for {period}")));
  }
  tracing::info!(%period, admin = %admin.username, "deleted period");
  Ok(StatusCode::NO_CONTENT)
}

// ─── Tournaments ─────────────────────────────────────────────────────────────

/// `POST /api/admin/taikai`
pub async fn save_tournament<S: ArchiveStore>(
  State(state): State<AppState<S>>,
  admin: Authenticated,
  payload: Result<Json<NewTournament>, JsonRejection>,
) -> Result<Json<Saved>, Error> {
  let input = body(payload)?;
  validate_tournament(&input)?;

  let year = input.year;
  state.store.save_tournament(input).await.map_err(Error::store)?;

  tracing::info!(year, admin = %admin.username, "published tournament");
  Ok(Saved::new(format!("Tournament data saved for year {year}")))
}

/// `DELETE /api/admin/taikai/:year`
pub async fn delete_tournament<S: ArchiveStore>(
  State(state): State<AppState<S>>,
  admin: Authenticated,
  Path(year): Path<String>,
) -> Result<StatusCode, Error> {
  let year = params::tournament_year(&year)?;
  let removed = state.store.delete_tournament(year).await.map_err(Error::store)?;
  if !removed {
    return Err(Error::NotFound(format!("No tournament for year {year}")));
  }
  tracing::info!(%year, admin = %admin.username, "deleted tournament");
  Ok(StatusCode::NO_CONTENT)
}

// ─── Session ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct Session {
  pub username: String,
}

/// `GET /api/admin/session`
pub async fn session(admin: Authenticated) -> Json<Session> {
  Json(Session { username: admin.username })
}
