//! Data models for daybook

mod entry;
mod ids;
mod mood;
mod quick_note;
mod tag;
mod todo;

pub use entry::{
    reading_time_minutes, word_count, EntryDraft, JournalEntry, ValidEntry, WORDS_PER_MINUTE,
};
pub use ids::{EntryId, QuickNoteId, TagId, TodoId, UserId};
pub use mood::Mood;
pub use quick_note::QuickNote;
pub use tag::{
    normalize_tag_name, normalize_tag_names, split_tag_text, Tag, TagInput, TagUsage, MAX_TAGS_PER_ENTRY,
    MAX_TAG_LEN,
};
pub use todo::{DeadlineStatus, Todo};
