//! Handlers for `/taikai` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/taikai/list` | Tournament index, newest first |
//! | `GET`  | `/taikai/latest` | 404 if none |
//! | `GET`  | `/taikai/:year` | 400 if malformed, 404 if absent |
//! | `GET`  | `/taikai/person/:name` | Exact-name match across years |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use matoba_core::{
  archive,
  history::{PersonTournamentHistory, tournament_history},
  store::ArchiveStore,
  tournament::{ParticipantName, TournamentIndex, TournamentRecord},
};

use crate::{error::ApiError, params};

/// `GET /taikai/list`
pub async fn list<S: ArchiveStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<TournamentIndex>, ApiError> {
  let index = store.load_tournament_index().await.map_err(ApiError::store)?;
  Ok(Json(index))
}

/// `GET /taikai/latest`
pub async fn latest<S: ArchiveStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<TournamentRecord>, ApiError> {
  archive::latest_tournament(store.as_ref())
    .await
    .map_err(ApiError::store)?
    .map(Json)
    .ok_or_else(|| ApiError::NotFound("No published tournaments".into()))
}

/// `GET /taikai/:year`
pub async fn get_one<S: ArchiveStore>(
  State(store): State<Arc<S>>,
  Path(year): Path<String>,
) -> Result<Json<TournamentRecord>, ApiError> {
  let year = params::tournament_year(&year)?;
  store
    .load_tournament(year)
    .await
    .map_err(ApiError::store)?
    .map(Json)
    .ok_or_else(|| ApiError::NotFound(format!("Tournament data not found for year {year}")))
}

/// `GET /taikai/person/:name`
///
/// The router percent-decodes the segment before it reaches the handler.
pub async fn person<S: ArchiveStore>(
  State(store): State<Arc<S>>,
  Path(name): Path<String>,
) -> Result<Json<PersonTournamentHistory>, ApiError> {
  let name = ParticipantName::parse(&name)
    .map_err(|_| ApiError::BadRequest("personName is required".into()))?;
  tournament_history(store.as_ref(), &name)
    .await
    .map_err(ApiError::store)?
    .map(Json)
    .ok_or_else(|| ApiError::NotFound("Person not found".into()))
}
