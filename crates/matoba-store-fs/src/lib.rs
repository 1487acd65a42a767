//! File-system backend for the Matoba results archive.
//!
//! Every record is a pretty-printed JSON file under a single data
//! directory, laid out so existing site data can be served as is. All I/O
//! goes through [`tokio::fs`].

mod layout;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::FsStore;
