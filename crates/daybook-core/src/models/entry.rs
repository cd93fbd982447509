//! Journal entry model

use serde::{Deserialize, Serialize};

use super::tag::{normalize_tag_names, Tag, TagInput};
use super::{EntryId, Mood, UserId};
use crate::error::Result;
use crate::util::require_text;

/// Reading speed used for reading-time estimates
pub const WORDS_PER_MINUTE: u32 = 200;

/// A journal entry written by a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Unique identifier
    pub id: EntryId,
    /// Owner
    pub user_id: UserId,
    pub title: String,
    /// Body text
    pub content: String,
    pub mood: Option<Mood>,
    pub is_favorite: bool,
    /// Linked tags, sorted by name
    pub tags: Vec<Tag>,
    /// Derived from `content`
    pub word_count: u32,
    /// Derived from `word_count`, in minutes
    pub reading_time: u32,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
    /// Last update timestamp (Unix ms)
    pub updated_at: i64,
}

impl JournalEntry {
    /// Tag names in display order
    #[must_use]
    pub fn tag_names(&self) -> Vec<String> {
        self.tags.iter().map(|tag| tag.name.clone()).collect()
    }

    /// Whether the entry carries a tag with this (lowercase) name
    #[must_use]
    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|tag| tag.name == name)
    }
}

/// Client-supplied fields for creating or replacing an entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryDraft {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub mood: Option<Mood>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub tags: Vec<TagInput>,
}

impl EntryDraft {
    /// Check and normalize the draft for storage
    pub fn validate(self) -> Result<ValidEntry> {
        let title = require_text(&self.title, "Title")?;
        let content = require_text(&self.content, "Content")?;
        let tags = normalize_tag_names(self.tags.into_iter().map(TagInput::into_name))?;
        let word_count = word_count(&content);

        Ok(ValidEntry {
            title,
            content,
            mood: self.mood,
            is_favorite: self.is_favorite,
            tags,
            word_count,
            reading_time: reading_time_minutes(word_count),
        })
    }
}

/// A validated draft, ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidEntry {
    pub title: String,
    pub content: String,
    pub mood: Option<Mood>,
    pub is_favorite: bool,
    /// Normalized, de-duplicated tag names
    pub tags: Vec<String>,
    pub word_count: u32,
    pub reading_time: u32,
}

/// Count whitespace-separated words
#[must_use]
pub fn word_count(text: &str) -> u32 {
    u32::try_from(text.split_whitespace().count()).unwrap_or(u32::MAX)
}

/// Minutes needed to read `words` words, never less than one
#[must_use]
pub const fn reading_time_minutes(words: u32) -> u32 {
    let minutes = words.div_ceil(WORDS_PER_MINUTE);
    if minutes == 0 {
        1
    } else {
        minutes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn draft(title: &str, content: &str) -> EntryDraft {
        EntryDraft {
            title: title.to_string(),
            content: content.to_string(),
            ..EntryDraft::default()
        }
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("   "), 0);
        assert_eq!(word_count("one two\nthree\t four  "), 4);
    }

    #[test]
    fn test_reading_time() {
        assert_eq!(reading_time_minutes(0), 1);
        assert_eq!(reading_time_minutes(1), 1);
        assert_eq!(reading_time_minutes(200), 1);
        assert_eq!(reading_time_minutes(201), 2);
        assert_eq!(reading_time_minutes(1000), 5);
    }

    #[test]
    fn test_validate_trims_and_derives_counts() {
        let valid = draft("  Morning  ", "  woke up early today  ").validate().unwrap();
        assert_eq!(valid.title, "Morning");
        assert_eq!(valid.content, "woke up early today");
        assert_eq!(valid.word_count, 4);
        assert_eq!(valid.reading_time, 1);
    }

    #[test]
    fn test_validate_rejects_blank_fields() {
        assert!(draft(" ", "body").validate().is_err());
        assert!(draft("title", "\n\t").validate().is_err());
    }

    #[test]
    fn test_validate_normalizes_tags() {
        let mut d = draft("t", "c");
        d.tags = vec![
            TagInput::Name("Work".to_string()),
            TagInput::Tagged {
                id: None,
                name: "work".to_string(),
            },
            TagInput::Name("Life".to_string()),
        ];
        let valid = d.validate().unwrap();
        assert_eq!(valid.tags, vec!["work", "life"]);
    }

    #[test]
    fn test_counts_recompute_identically() {
        let text = "a b c ".repeat(150);
        let first = draft("t", &text).validate().unwrap();
        let second = draft("t", &first.content).validate().unwrap();
        assert_eq!(first.word_count, second.word_count);
        assert_eq!(first.reading_time, second.reading_time);
        assert_eq!(first.word_count, 450);
        assert_eq!(first.reading_time, 3);
    }
}
