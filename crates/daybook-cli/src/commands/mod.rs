pub mod add;
pub mod common;
pub mod completions;
pub mod delete;
pub mod edit;
pub mod export;
pub mod list;
pub mod note;
pub mod search;
pub mod stats;
pub mod tags;
pub mod todo;
