//! Core types and trait definitions for the Matoba results archive.
//!
//! This crate is deliberately free of HTTP and file-system dependencies.
//! Storage backends implement [`store::ArchiveStore`]; the HTTP and CLI
//! crates depend on that abstraction only.

// We intentionally use native `async fn` in traits.
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod archive;
pub mod error;
pub mod history;
pub mod period;
pub mod person;
pub mod results;
pub mod store;
pub mod target;
pub mod tournament;
pub mod validate;

pub use error::{Error, Result};

#[cfg(test)]
mod testing;
