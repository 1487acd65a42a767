//! HTTP Basic-auth extractor for the admin routes.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use serde::Deserialize;

use crate::{AppState, error::Error};
use matoba_core::store::ArchiveStore;

/// One administrator allowed to publish results.
#[derive(Clone, Debug, Deserialize)]
pub struct AdminCredentials {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

/// The administrators accepted by this server instance.
#[derive(Clone, Debug, Default)]
pub struct AuthConfig {
  pub admins: Vec<AdminCredentials>,
}

/// Present in a handler's arguments means the request came from an admin.
#[derive(Debug)]
pub struct Authenticated {
  pub username: String,
}

/// Check the `Authorization` header against the configured admins.
pub fn verify_auth(headers: &HeaderMap, config: &AuthConfig) -> Result<Authenticated, Error> {
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(Error::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(Error::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| Error::Unauthorized)?;
  let creds   = std::str::from_utf8(&decoded).map_err(|_| Error::Unauthorized)?;

  let (username, password) = creds.split_once(':').ok_or(Error::Unauthorized)?;

  let admin = config
    .admins
    .iter()
    .find(|a| a.username == username)
    .ok_or(Error::Unauthorized)?;

  let parsed_hash = PasswordHash::new(&admin.password_hash).map_err(|e| {
    tracing::error!(username, error = %e, "configured password hash is not a PHC string");
    Error::Unauthorized
  })?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| Error::Unauthorized)?;

  Ok(Authenticated { username: admin.username.clone() })
}

impl<S> FromRequestParts<AppState<S>> for Authenticated
where
  S: ArchiveStore + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let result = verify_auth(&parts.headers, &state.auth);
    if result.is_err() {
      tracing::debug!(uri = %parts.uri, "admin authentication failed");
    }
    result
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::http::{Request, header};

  fn hash(password: &str) -> String {
    use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
    use rand_core::OsRng;
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string()
  }

  fn config() -> AuthConfig {
    AuthConfig {
      admins: vec![
        AdminCredentials { username: "kanri".into(), password_hash: hash("secret") },
        AdminCredentials { username: "second".into(), password_hash: hash("other") },
      ],
    }
  }

  fn headers(value: &str) -> HeaderMap {
    let req = Request::builder()
      .header(header::AUTHORIZATION, value)
      .body(())
      .unwrap();
    req.headers().clone()
  }

  fn basic(user: &str, pass: &str) -> String {
    let encoded = B64.encode(format!("{user}:{pass}"));
    format!("Basic {encoded}")
  }

  #[test]
  fn correct_credentials() {
    let config = config();
    let admin = verify_auth(&headers(&basic("kanri", "secret")), &config).unwrap();
    assert_eq!(admin.username, "kanri");
    let admin = verify_auth(&headers(&basic("second", "other")), &config).unwrap();
    assert_eq!(admin.username, "second");
  }

  #[test]
  fn password_of_another_admin_rejected() {
    let result = verify_auth(&headers(&basic("kanri", "other")), &config());
    assert!(matches!(result, Err(Error::Unauthorized)));
  }

  #[test]
  fn unknown_user_rejected() {
    let result = verify_auth(&headers(&basic("guest", "secret")), &config());
    assert!(matches!(result, Err(Error::Unauthorized)));
  }

  #[test]
  fn missing_header() {
    assert!(matches!(verify_auth(&HeaderMap::new(), &config()), Err(Error::Unauthorized)));
  }

  #[test]
  fn invalid_base64() {
    let result = verify_auth(&headers("Basic !!!not-base64!!!"), &config());
    assert!(matches!(result, Err(Error::Unauthorized)));
  }

  #[test]
  fn no_admins_configured() {
    let result = verify_auth(&headers(&basic("kanri", "secret")), &AuthConfig::default());
    assert!(matches!(result, Err(Error::Unauthorized)));
  }
}
