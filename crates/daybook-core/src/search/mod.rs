//! Entry filters, to-do queries and tag suggestions
//!
//! Filters run over entries already loaded for one user. The storage layer
//! only scopes by owner; all narrowing happens here.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::models::{JournalEntry, Mood, Tag, Todo};
use crate::stats::LocalClock;

/// Maximum number of tag suggestions returned
pub const MAX_TAG_SUGGESTIONS: usize = 5;

/// Every recognised entry filter. Unset fields do not narrow the result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryFilter {
    /// Case-insensitive substring of title or content
    pub search_term: Option<String>,
    /// Entry matches when it carries any of these (lowercase) tags
    pub tags: Vec<String>,
    /// First local day included
    pub start_date: Option<NaiveDate>,
    /// Last local day included
    pub end_date: Option<NaiveDate>,
    pub favorites_only: bool,
    pub mood: Option<Mood>,
}

impl EntryFilter {
    /// Trim the search term and lowercase tag names
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.search_term = crate::util::normalize_text_option(self.search_term);
        self.tags = self
            .tags
            .iter()
            .map(|tag| tag.trim().trim_start_matches('#').to_lowercase())
            .filter(|tag| !tag.is_empty())
            .collect();
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active_filter_count() == 0
    }

    /// Badge count: search, each tag, the date range once, favorites, mood
    #[must_use]
    pub fn active_filter_count(&self) -> usize {
        usize::from(self.search_term.as_deref().is_some_and(|term| !term.trim().is_empty()))
            + self.tags.len()
            + usize::from(self.start_date.is_some() || self.end_date.is_some())
            + usize::from(self.favorites_only)
            + usize::from(self.mood.is_some())
    }

    /// Whether `entry` passes every active filter; dates are judged in `clock`'s zone
    #[must_use]
    pub fn matches(&self, entry: &JournalEntry, clock: &LocalClock) -> bool {
        if self.favorites_only && !entry.is_favorite {
            return false;
        }
        if self.mood.is_some() && entry.mood != self.mood {
            return false;
        }
        if !self.tags.is_empty() && !self.tags.iter().any(|tag| entry.has_tag(tag)) {
            return false;
        }
        if self.start_date.is_some() || self.end_date.is_some() {
            let Some(day) = clock.day_key(entry.created_at).map(|day| day.date()) else {
                return false;
            };
            if self.start_date.is_some_and(|start| day < start) {
                return false;
            }
            if self.end_date.is_some_and(|end| day > end) {
                return false;
            }
        }
        if let Some(term) = self.search_term.as_deref().map(str::trim) {
            if !term.is_empty() {
                let needle = term.to_lowercase();
                return entry.title.to_lowercase().contains(&needle)
                    || entry.content.to_lowercase().contains(&needle);
            }
        }
        true
    }

    /// Keep the matching entries, preserving order
    #[must_use]
    pub fn apply(&self, entries: Vec<JournalEntry>, clock: &LocalClock) -> Vec<JournalEntry> {
        entries
            .into_iter()
            .filter(|entry| self.matches(entry, clock))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TodoStatus {
    #[default]
    All,
    Completed,
    Pending,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TodoSort {
    /// Most recently created first
    #[default]
    Newest,
    Alphabetical,
    /// Pending before completed
    Completed,
    /// Earliest deadline first, undated last
    Deadline,
}

macro_rules! keyword_enum {
    ($ty:ident, $what:literal, { $($text:literal => $variant:ident),+ $(,)? }) => {
        impl $ty {
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok(Self::$variant),)+
                    other => Err(Error::InvalidInput(format!(concat!("Unknown ", $what, ": {}"), other))),
                }
            }
        }
    };
}

keyword_enum!(TodoStatus, "todo status", { "all" => All, "completed" => Completed, "pending" => Pending });
keyword_enum!(TodoSort, "todo sort", {
    "newest" => Newest,
    "alphabetical" => Alphabetical,
    "completed" => Completed,
    "deadline" => Deadline,
});

/// Filter and ordering for the to-do list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TodoQuery {
    pub status: TodoStatus,
    /// Case-insensitive substring of the task
    pub search: Option<String>,
    /// When false, completed items are hidden regardless of `status`
    pub show_completed: bool,
    pub sort: TodoSort,
}

impl Default for TodoQuery {
    fn default() -> Self {
        Self {
            status: TodoStatus::All,
            search: None,
            show_completed: true,
            sort: TodoSort::Newest,
        }
    }
}

impl TodoQuery {
    #[must_use]
    pub fn matches(&self, todo: &Todo) -> bool {
        let status_ok = match self.status {
            TodoStatus::All => true,
            TodoStatus::Completed => todo.is_completed,
            TodoStatus::Pending => !todo.is_completed,
        };
        if !status_ok || (!self.show_completed && todo.is_completed) {
            return false;
        }
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .is_none_or(|term| todo.task.to_lowercase().contains(&term.to_lowercase()))
    }

    /// Filter then sort. Sorting is stable, so ties keep their input order.
    #[must_use]
    pub fn apply(&self, todos: Vec<Todo>) -> Vec<Todo> {
        let mut todos: Vec<Todo> = todos.into_iter().filter(|todo| self.matches(todo)).collect();
        match self.sort {
            TodoSort::Newest => todos.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            TodoSort::Alphabetical => {
                todos.sort_by(|a, b| {
                    a.task
                        .to_lowercase()
                        .cmp(&b.task.to_lowercase())
                        .then_with(|| a.task.cmp(&b.task))
                });
            }
            TodoSort::Completed => todos.sort_by_key(|todo| todo.is_completed),
            TodoSort::Deadline => todos.sort_by_key(|todo| (todo.deadline.is_none(), todo.deadline)),
        }
        todos
    }
}

/// Up to five tags whose name contains `query`, skipping names in `exclude`
#[must_use]
pub fn suggest_tags<'a>(tags: &'a [Tag], query: &str, exclude: &[String]) -> Vec<&'a Tag> {
    let needle = query.trim().trim_start_matches('#').to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    tags.iter()
        .filter(|tag| tag.name.to_lowercase().contains(&needle))
        .filter(|tag| !exclude.iter().any(|name| name.eq_ignore_ascii_case(&tag.name)))
        .take(MAX_TAG_SUGGESTIONS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntryId, UserId};
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn user() -> UserId {
        UserId::new("user-1").unwrap()
    }

    fn entry(title: &str, content: &str, day: u32, tags: &[&str]) -> JournalEntry {
        let created_at = Utc.with_ymd_and_hms(2024, 2, day, 10, 0, 0).unwrap().timestamp_millis();
        JournalEntry {
            id: EntryId::new(),
            user_id: user(),
            title: title.to_string(),
            content: content.to_string(),
            mood: None,
            is_favorite: false,
            tags: tags.iter().map(|name| Tag::new(user(), *name)).collect(),
            word_count: crate::models::word_count(content),
            reading_time: 1,
            created_at,
            updated_at: created_at,
        }
    }

    fn clock() -> LocalClock {
        LocalClock::utc(Utc.with_ymd_and_hms(2024, 2, 20, 0, 0, 0).unwrap())
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, d).unwrap()
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let filter = EntryFilter::default();
        assert!(filter.is_empty());
        assert!(filter.matches(&entry("a", "b", 1, &[]), &clock()));
    }

    #[test]
    fn test_search_term_case_insensitive() {
        let filter = EntryFilter {
            search_term: Some("  SUNRISE ".to_string()),
            ..EntryFilter::default()
        };
        assert!(filter.matches(&entry("Morning", "Watched the sunrise", 1, &[]), &clock()));
        assert!(filter.matches(&entry("Sunrise walk", "cold", 1, &[]), &clock()));
        assert!(!filter.matches(&entry("Evening", "sunset", 1, &[]), &clock()));
    }

    #[test]
    fn test_tags_match_any() {
        let filter = EntryFilter {
            tags: vec!["#Work".to_string(), "travel".to_string()],
            ..EntryFilter::default()
        }
        .normalized();
        assert_eq!(filter.tags, vec!["work", "travel"]);
        assert!(filter.matches(&entry("a", "b", 1, &["work"]), &clock()));
        assert!(filter.matches(&entry("a", "b", 1, &["life", "travel"]), &clock()));
        assert!(!filter.matches(&entry("a", "b", 1, &["life"]), &clock()));
    }

    #[test]
    fn test_date_range_inclusive() {
        let filter = EntryFilter {
            start_date: Some(date(5)),
            end_date: Some(date(10)),
            ..EntryFilter::default()
        };
        assert!(!filter.matches(&entry("a", "b", 4, &[]), &clock()));
        assert!(filter.matches(&entry("a", "b", 5, &[]), &clock()));
        assert!(filter.matches(&entry("a", "b", 10, &[]), &clock()));
        assert!(!filter.matches(&entry("a", "b", 11, &[]), &clock()));
    }

    #[test]
    fn test_favorites_and_mood() {
        let mut fav = entry("a", "b", 1, &[]);
        fav.is_favorite = true;
        fav.mood = Some(Mood::Calm);
        let plain = entry("a", "b", 1, &[]);

        let filter = EntryFilter {
            favorites_only: true,
            mood: Some(Mood::Calm),
            ..EntryFilter::default()
        };
        let kept = filter.apply(vec![fav.clone(), plain], &clock());
        assert_eq!(kept, vec![fav]);
    }

    #[test]
    fn test_active_filter_count() {
        let filter = EntryFilter {
            search_term: Some("x".to_string()),
            tags: vec!["a".to_string(), "b".to_string()],
            start_date: Some(date(1)),
            end_date: Some(date(2)),
            favorites_only: true,
            mood: Some(Mood::Sad),
        };
        assert_eq!(filter.active_filter_count(), 6);
    }

    fn todo(task: &str, created_at: i64, deadline: Option<NaiveDate>, done: bool) -> Todo {
        let mut todo = Todo::new(user(), task, deadline);
        todo.created_at = created_at;
        todo.is_completed = done;
        todo
    }

    fn tasks(todos: &[Todo]) -> Vec<&str> {
        todos.iter().map(|todo| todo.task.as_str()).collect()
    }

    fn sample_todos() -> Vec<Todo> {
        vec![
            todo("water plants", 1, Some(date(12)), false),
            todo("Buy milk", 3, None, true),
            todo("call mom", 2, Some(date(3)), false),
        ]
    }

    #[test]
    fn test_todo_sorts() {
        let mut query = TodoQuery::default();
        assert_eq!(tasks(&query.apply(sample_todos())), vec!["Buy milk", "call mom", "water plants"]);

        query.sort = TodoSort::Alphabetical;
        assert_eq!(tasks(&query.apply(sample_todos())), vec!["Buy milk", "call mom", "water plants"]);

        query.sort = TodoSort::Completed;
        assert_eq!(tasks(&query.apply(sample_todos())), vec!["water plants", "call mom", "Buy milk"]);

        query.sort = TodoSort::Deadline;
        assert_eq!(tasks(&query.apply(sample_todos())), vec!["call mom", "water plants", "Buy milk"]);
    }

    #[test]
    fn test_todo_filters() {
        let pending = TodoQuery {
            status: TodoStatus::Pending,
            ..TodoQuery::default()
        };
        assert_eq!(pending.apply(sample_todos()).len(), 2);

        let hidden = TodoQuery {
            status: TodoStatus::Completed,
            show_completed: false,
            ..TodoQuery::default()
        };
        assert!(hidden.apply(sample_todos()).is_empty());

        let search = TodoQuery {
            search: Some("MILK".to_string()),
            ..TodoQuery::default()
        };
        assert_eq!(tasks(&search.apply(sample_todos())), vec!["Buy milk"]);
    }

    #[test]
    fn test_parse_keywords() {
        assert_eq!("Pending".parse::<TodoStatus>().unwrap(), TodoStatus::Pending);
        assert_eq!("deadline".parse::<TodoSort>().unwrap(), TodoSort::Deadline);
        assert!("soonest".parse::<TodoSort>().is_err());
    }

    #[test]
    fn test_suggest_tags() {
        let tags: Vec<Tag> = ["work", "workout", "homework", "life", "network", "artwork", "worker"]
            .iter()
            .map(|name| Tag::new(user(), *name))
            .collect();
        let chosen = vec!["work".to_string()];
        let names: Vec<&str> = suggest_tags(&tags, "Work", &chosen)
            .into_iter()
            .map(|tag| tag.name.as_str())
            .collect();
        assert_eq!(names, vec!["workout", "homework", "network", "artwork", "worker"]);
        assert!(suggest_tags(&tags, "  ", &[]).is_empty());
    }
}
