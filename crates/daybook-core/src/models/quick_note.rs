//! Quick note model

use serde::{Deserialize, Serialize};

use super::{QuickNoteId, UserId};

/// A short scratch note, separate from journal entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickNote {
    pub id: QuickNoteId,
    pub user_id: UserId,
    pub content: String,
    pub is_favorite: bool,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
    /// Last update timestamp (Unix ms)
    pub updated_at: i64,
}

impl QuickNote {
    /// Create a new note; `content` is expected to be trimmed already
    #[must_use]
    pub fn new(user_id: UserId, content: impl Into<String>) -> Self {
        let now = crate::util::unix_millis_now();
        Self {
            id: QuickNoteId::new(),
            user_id,
            content: content.into(),
            is_favorite: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Get first line as a preview, truncated to `max_len` characters
    #[must_use]
    pub fn preview(&self, max_len: usize) -> String {
        self.content
            .lines()
            .next()
            .unwrap_or("")
            .chars()
            .take(max_len)
            .collect()
    }
}
