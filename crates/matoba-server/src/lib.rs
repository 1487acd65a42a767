//! HTTP server for the Matoba results archive.
//!
//! Serves the public read API from `matoba-api` under `/api` and the
//! authenticated admin write routes under `/api/admin`, backed by any
//! [`ArchiveStore`].

pub mod admin;
pub mod auth;
pub mod error;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{delete, get, post},
};
use matoba_core::store::ArchiveStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::{AdminCredentials, AuthConfig};

// ─── Configuration ────────────────────────────────────────────────────────────

fn default_host() -> String { "127.0.0.1".into() }

fn default_port() -> u16 { 3000 }

/// Runtime server configuration, deserialised from `config.toml` and
/// `MATOBA_*` environment variables.
#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:     String,
  #[serde(default = "default_port")]
  pub port:     u16,
  /// Root of the JSON archive (`seiseki/`, `taikai/`, `persons/`).
  pub data_dir: PathBuf,
  #[serde(default)]
  pub admins:   Vec<AdminCredentials>,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through the admin handlers.
pub struct AppState<S: ArchiveStore> {
  pub store: Arc<S>,
  pub auth:  Arc<AuthConfig>,
}

impl<S: ArchiveStore> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store: Arc::clone(&self.store),
      auth:  Arc::clone(&self.auth),
    }
  }
}

impl<S: ArchiveStore> AppState<S> {
  /// Only `admins` is kept; the listener settings are consumed at startup.
  pub fn new(store: S, config: ServerConfig) -> Self {
    Self {
      store: Arc::new(store),
      auth:  Arc::new(AuthConfig { admins: config.admins }),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the complete application [`Router`].
pub fn router<S>(state: AppState<S>) -> Router
where
  S: ArchiveStore + 'static,
{
  let admin = Router::new()
    .route("/seiseki",                 post(admin::save_period::<S>))
    .route("/seiseki/{year}/{month}",  delete(admin::delete_period::<S>))
    .route("/taikai",                  post(admin::save_tournament::<S>))
    .route("/taikai/{year}",           delete(admin::delete_tournament::<S>))
    .route("/session",                 get(admin::session))
    .with_state(state.clone());

  Router::new()
    .route("/health", get(health))
    .nest("/api/admin", admin)
    .nest("/api", matoba_api::api_router(state.store))
    .layer(TraceLayer::new_for_http())
}

async fn health() -> &'static str { "ok" }
