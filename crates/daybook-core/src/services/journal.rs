//! Journal service: the single async entry point over storage and statistics.
//!
//! Repository calls run while holding the database lock; statistics are
//! computed after the lock is released, on data already fetched.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::Mutex;

use crate::db::{
    Database, EntryRepository, LibSqlEntryRepository, LibSqlQuickNoteRepository, LibSqlTagRepository,
    LibSqlTodoRepository, QuickNoteRepository, TagRepository, TodoRepository,
};
use crate::export::{export_entries, ExportFile, ExportOptions};
use crate::models::{
    EntryDraft, EntryId, JournalEntry, QuickNote, QuickNoteId, Tag, TagId, TagUsage, Todo, TodoId, UserId,
};
use crate::search::{EntryFilter, TodoQuery};
use crate::stats::{build_dashboard, mood_report, Dashboard, DashboardOptions, LocalClock, MoodRange, MoodReport, TodoSummary};
use crate::util::require_text;
use crate::Result;

/// Thread-safe service for journal operations.
#[derive(Clone)]
pub struct JournalService {
    db: Arc<Mutex<Database>>,
    db_path: Option<PathBuf>,
}

impl JournalService {
    /// Open a service backed by a database file, creating parent directories.
    pub async fn open_path(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::open(&db_path).await?;
        tracing::info!(path = %db_path.display(), "Journal database ready");
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            db_path: Some(db_path),
        })
    }

    /// Open an in-memory database service (primarily for tests).
    pub async fn open_in_memory() -> Result<Self> {
        let db = Database::open_in_memory().await?;
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            db_path: None,
        })
    }

    /// Path of the backing file, `None` when in memory.
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    // Entries

    pub async fn create_entry(&self, user: &UserId, draft: EntryDraft) -> Result<JournalEntry> {
        let entry = draft.validate()?;
        let db = self.db.lock().await;
        LibSqlEntryRepository::new(db.connection()).create(user, &entry).await
    }

    pub async fn get_entry(&self, user: &UserId, id: &EntryId) -> Result<Option<JournalEntry>> {
        let db = self.db.lock().await;
        LibSqlEntryRepository::new(db.connection()).get(user, id).await
    }

    /// List entries newest-first.
    pub async fn list_entries(&self, user: &UserId, limit: usize, offset: usize) -> Result<Vec<JournalEntry>> {
        let db = self.db.lock().await;
        LibSqlEntryRepository::new(db.connection())
            .list(user, limit, offset)
            .await
    }

    /// Replace an entry's fields and tags.
    pub async fn update_entry(&self, user: &UserId, id: &EntryId, draft: EntryDraft) -> Result<JournalEntry> {
        let entry = draft.validate()?;
        let db = self.db.lock().await;
        LibSqlEntryRepository::new(db.connection())
            .update(user, id, &entry)
            .await
    }

    /// Flip the favorite flag and return the updated entry.
    pub async fn toggle_entry_favorite(&self, user: &UserId, id: &EntryId) -> Result<JournalEntry> {
        let db = self.db.lock().await;
        let repo = LibSqlEntryRepository::new(db.connection());
        let current = repo
            .get(user, id)
            .await?
            .ok_or_else(|| crate::Error::NotFound(format!("entry {id}")))?;
        repo.set_favorite(user, id, !current.is_favorite).await
    }

    pub async fn delete_entry(&self, user: &UserId, id: &EntryId) -> Result<()> {
        let db = self.db.lock().await;
        LibSqlEntryRepository::new(db.connection()).delete(user, id).await
    }

    /// Entries passing `filter`, newest first. Dates are judged in `clock`'s zone.
    pub async fn search_entries(
        &self,
        user: &UserId,
        filter: EntryFilter,
        clock: &LocalClock,
    ) -> Result<Vec<JournalEntry>> {
        let entries = {
            let db = self.db.lock().await;
            LibSqlEntryRepository::new(db.connection()).list_all(user).await?
        };
        let filter = filter.normalized();
        let matched = filter.apply(entries, clock);
        tracing::debug!(
            filters = filter.active_filter_count(),
            matched = matched.len(),
            "Searched entries"
        );
        Ok(matched)
    }

    // Tags

    /// Tags with entry counts, orphans included.
    pub async fn list_tags(&self, user: &UserId) -> Result<Vec<TagUsage>> {
        let db = self.db.lock().await;
        LibSqlTagRepository::new(db.connection())
            .list_with_usage(user)
            .await
    }

    pub async fn create_tag(&self, user: &UserId, name: &str) -> Result<Tag> {
        let db = self.db.lock().await;
        LibSqlTagRepository::new(db.connection()).create(user, name).await
    }

    pub async fn suggest_tags(&self, user: &UserId, query: &str, exclude: &[String]) -> Result<Vec<Tag>> {
        let db = self.db.lock().await;
        LibSqlTagRepository::new(db.connection())
            .suggest(user, query, exclude)
            .await
    }

    /// Explicit delete. Unused tags are never removed otherwise.
    pub async fn delete_tag(&self, user: &UserId, id: &TagId) -> Result<()> {
        let db = self.db.lock().await;
        LibSqlTagRepository::new(db.connection()).delete(user, id).await
    }

    // Quick notes

    pub async fn create_note(&self, user: &UserId, content: &str) -> Result<QuickNote> {
        let content = require_text(content, "Note")?;
        let db = self.db.lock().await;
        LibSqlQuickNoteRepository::new(db.connection())
            .create(user, &content)
            .await
    }

    pub async fn list_notes(&self, user: &UserId, limit: usize) -> Result<Vec<QuickNote>> {
        let db = self.db.lock().await;
        LibSqlQuickNoteRepository::new(db.connection())
            .list_recent(user, limit)
            .await
    }

    pub async fn update_note(&self, user: &UserId, id: &QuickNoteId, content: &str) -> Result<QuickNote> {
        let content = require_text(content, "Note")?;
        let db = self.db.lock().await;
        LibSqlQuickNoteRepository::new(db.connection())
            .update(user, id, &content)
            .await
    }

    pub async fn toggle_note_favorite(&self, user: &UserId, id: &QuickNoteId) -> Result<QuickNote> {
        let db = self.db.lock().await;
        let repo = LibSqlQuickNoteRepository::new(db.connection());
        let current = repo
            .get(user, id)
            .await?
            .ok_or_else(|| crate::Error::NotFound(format!("quick note {id}")))?;
        repo.set_favorite(user, id, !current.is_favorite).await
    }

    pub async fn delete_note(&self, user: &UserId, id: &QuickNoteId) -> Result<()> {
        let db = self.db.lock().await;
        LibSqlQuickNoteRepository::new(db.connection())
            .delete(user, id)
            .await
    }

    // To-dos

    pub async fn create_todo(&self, user: &UserId, task: &str, deadline: Option<NaiveDate>) -> Result<Todo> {
        let task = require_text(task, "Task")?;
        let db = self.db.lock().await;
        LibSqlTodoRepository::new(db.connection())
            .create(user, &task, deadline)
            .await
    }

    /// To-dos filtered and sorted by `query`.
    pub async fn list_todos(&self, user: &UserId, query: &TodoQuery) -> Result<Vec<Todo>> {
        let todos = {
            let db = self.db.lock().await;
            LibSqlTodoRepository::new(db.connection()).list(user).await?
        };
        Ok(query.apply(todos))
    }

    pub async fn update_todo(
        &self,
        user: &UserId,
        id: &TodoId,
        task: &str,
        deadline: Option<NaiveDate>,
    ) -> Result<Todo> {
        let task = require_text(task, "Task")?;
        let db = self.db.lock().await;
        LibSqlTodoRepository::new(db.connection())
            .update(user, id, &task, deadline)
            .await
    }

    /// Flip completion and return the updated item.
    pub async fn toggle_todo(&self, user: &UserId, id: &TodoId) -> Result<Todo> {
        let db = self.db.lock().await;
        let repo = LibSqlTodoRepository::new(db.connection());
        let current = repo
            .get(user, id)
            .await?
            .ok_or_else(|| crate::Error::NotFound(format!("todo {id}")))?;
        repo.set_completed(user, id, !current.is_completed).await
    }

    pub async fn set_todo_completed(&self, user: &UserId, id: &TodoId, is_completed: bool) -> Result<Todo> {
        let db = self.db.lock().await;
        LibSqlTodoRepository::new(db.connection())
            .set_completed(user, id, is_completed)
            .await
    }

    pub async fn delete_todo(&self, user: &UserId, id: &TodoId) -> Result<()> {
        let db = self.db.lock().await;
        LibSqlTodoRepository::new(db.connection()).delete(user, id).await
    }

    pub async fn todo_summary(&self, user: &UserId, clock: &LocalClock) -> Result<TodoSummary> {
        let todos = {
            let db = self.db.lock().await;
            LibSqlTodoRepository::new(db.connection()).list(user).await?
        };
        Ok(TodoSummary::from_todos(&todos, clock.today().date()))
    }

    // Statistics and export

    pub async fn dashboard(
        &self,
        user: &UserId,
        clock: &LocalClock,
        options: DashboardOptions,
    ) -> Result<Dashboard> {
        let options = options.validate()?;
        let records = {
            let db = self.db.lock().await;
            LibSqlEntryRepository::new(db.connection())
                .stat_records(user)
                .await?
        };
        Ok(build_dashboard(&records, clock, options))
    }

    pub async fn mood_report(&self, user: &UserId, range: MoodRange, clock: &LocalClock) -> Result<MoodReport> {
        let records = {
            let db = self.db.lock().await;
            LibSqlEntryRepository::new(db.connection())
                .stat_records(user)
                .await?
        };
        Ok(mood_report(&records, range, clock))
    }

    /// Render an export file. `user_label` is shown in the JSON envelope.
    pub async fn export(
        &self,
        user: &UserId,
        options: &ExportOptions,
        clock: &LocalClock,
        user_label: &str,
    ) -> Result<ExportFile> {
        let entries = {
            let db = self.db.lock().await;
            LibSqlEntryRepository::new(db.connection()).list_all(user).await?
        };
        let file = export_entries(entries, options, clock, user_label)?;
        tracing::info!(
            format = %options.format,
            entries = file.entry_count,
            "Rendered journal export"
        );
        Ok(file)
    }
}
