//! Public JSON API for Matoba.
//!
//! Exposes a read-only axum [`Router`] backed by any
//! [`matoba_core::store::ArchiveStore`]. Authentication and the admin write
//! routes live in `matoba-server`.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", matoba_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod params;
pub mod seiseki;
pub mod taikai;

use std::sync::Arc;

use axum::{Router, routing::get};
use matoba_core::store::ArchiveStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: ArchiveStore + 'static,
{
  Router::new()
    // Monthly results
    .route("/seiseki/list", get(seiseki::list::<S>))
    .route("/seiseki/latest", get(seiseki::latest::<S>))
    .route("/seiseki/years", get(seiseki::years::<S>))
    .route("/seiseki/years/{year}", get(seiseki::year::<S>))
    .route("/seiseki/person/{person_id}", get(seiseki::person::<S>))
    .route("/seiseki/{year}/{month}", get(seiseki::get_one::<S>))
    // Tournaments
    .route("/taikai/list", get(taikai::list::<S>))
    .route("/taikai/latest", get(taikai::latest::<S>))
    .route("/taikai/person/{name}", get(taikai::person::<S>))
    .route("/taikai/{year}", get(taikai::get_one::<S>))
    .with_state(store)
}
