//! Async service boundary shared by the API and the CLI

mod journal;

pub use journal::JournalService;
