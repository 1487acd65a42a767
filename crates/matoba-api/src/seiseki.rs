//! Handlers for `/seiseki` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/seiseki/list` | Archive index, newest first |
//! | `GET`  | `/seiseki/latest` | 404 if nothing is published |
//! | `GET`  | `/seiseki/years` | Distinct years, newest first |
//! | `GET`  | `/seiseki/years/:year` | Non-empty records, December first |
//! | `GET`  | `/seiseki/:year/:month` | 400 if out of range, 404 if absent |
//! | `GET`  | `/seiseki/person/:person_id` | Gap-filled history |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use matoba_core::{
  archive,
  history::{PersonHistory, person_history},
  results::{ArchiveIndex, PeriodRecord, PersonId},
  store::ArchiveStore,
};

use crate::{error::ApiError, params};

/// `GET /seiseki/list`
pub async fn list<S: ArchiveStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<ArchiveIndex>, ApiError> {
  let index = store.load_index().await.map_err(ApiError::store)?;
  Ok(Json(index))
}

/// `GET /seiseki/latest`
pub async fn latest<S: ArchiveStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<PeriodRecord>, ApiError> {
  archive::latest_period(store.as_ref())
    .await
    .map_err(ApiError::store)?
    .map(Json)
    .ok_or_else(|| ApiError::NotFound("No published results".into()))
}

/// `GET /seiseki/years`
pub async fn years<S: ArchiveStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<i32>>, ApiError> {
  let years = archive::available_years(store.as_ref())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(years))
}

/// `GET /seiseki/years/:year`
pub async fn year<S: ArchiveStore>(
  State(store): State<Arc<S>>,
  Path(year): Path<String>,
) -> Result<Json<Vec<PeriodRecord>>, ApiError> {
  let year = params::year(&year)?;
  let records = archive::year_periods(store.as_ref(), year)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(records))
}

/// `GET /seiseki/:year/:month`
pub async fn get_one<S: ArchiveStore>(
  State(store): State<Arc<S>>,
  Path((year, month)): Path<(String, String)>,
) -> Result<Json<PeriodRecord>, ApiError> {
  let period = params::period(&year, &month)?;
  store
    .load_period(period)
    .await
    .map_err(ApiError::store)?
    .map(Json)
    .ok_or_else(|| ApiError::NotFound("Data not found".into()))
}

/// `GET /seiseki/person/:person_id`
pub async fn person<S: ArchiveStore>(
  State(store): State<Arc<S>>,
  Path(person_id): Path<String>,
) -> Result<Json<PersonHistory>, ApiError> {
  let person_id =
    PersonId::parse(&person_id).map_err(|_| ApiError::BadRequest("personId is required".into()))?;
  person_history(store.as_ref(), &person_id)
    .await
    .map_err(ApiError::store)?
    .map(Json)
    .ok_or_else(|| ApiError::NotFound("Person not found".into()))
}
