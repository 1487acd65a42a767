//! Error types for `matoba-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("person id must not be empty")]
  EmptyPersonId,

  #[error("participant name must not be empty")]
  EmptyParticipantName,

  #[error("invalid year: {0}")]
  InvalidYear(i32),

  #[error("invalid month: {0}")]
  InvalidMonth(u32),

  #[error("malformed person id: {0:?}")]
  MalformedPersonId(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
