//! daybook-core - Core library for daybook
//!
//! This crate contains the shared models, writing statistics, search and
//! export logic, the libSQL storage layer and the async service used by the
//! HTTP API and the CLI.

pub mod db;
pub mod error;
pub mod export;
pub mod models;
pub mod search;
pub mod services;
pub mod stats;
mod util;

pub use error::{Error, Result};
pub use models::{EntryId, JournalEntry, UserId};
pub use services::JournalService;
pub use stats::LocalClock;
