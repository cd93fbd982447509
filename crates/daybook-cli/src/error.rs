use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] daybook_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("No content provided")]
    EmptyContent,
    #[error("Edited content cannot be empty")]
    EmptyEditedContent,
    #[error("ID cannot be empty")]
    EmptyId,
    #[error("No {kind} found for id/prefix: {query}")]
    NotFound { kind: &'static str, query: String },
    #[error("{0}")]
    AmbiguousId(String),
    #[error("Tag not found: {0}")]
    TagNotFound(String),
    #[error("Editor command failed: {0}")]
    EditorFailed(String),
}
