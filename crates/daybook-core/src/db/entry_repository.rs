//! Journal entry repository implementation

use libsql::{params, Connection, Row, Value};

use super::tag_repository::LibSqlTagRepository;
use super::{finish_transaction, optional_text, parse_id, read_bool, read_optional_text, read_u32, sql_limit};
use crate::error::{Error, Result};
use crate::models::{EntryId, JournalEntry, Mood, UserId, ValidEntry};
use crate::stats::StatRecord;
use crate::util::unix_millis_now;

const ENTRY_COLUMNS: &str =
    "id, user_id, title, content, mood, is_favorite, word_count, reading_time, created_at, updated_at";

/// Trait for journal entry storage operations (async)
#[allow(async_fn_in_trait)]
pub trait EntryRepository {
    /// Create an entry and link its tags
    async fn create(&self, user: &UserId, entry: &ValidEntry) -> Result<JournalEntry>;

    /// Get an entry by ID
    async fn get(&self, user: &UserId, id: &EntryId) -> Result<Option<JournalEntry>>;

    /// List entries, newest first
    async fn list(&self, user: &UserId, limit: usize, offset: usize) -> Result<Vec<JournalEntry>>;

    /// Every entry of the user, newest first
    async fn list_all(&self, user: &UserId) -> Result<Vec<JournalEntry>>;

    /// Replace all fields and all tag links of an entry
    async fn update(&self, user: &UserId, id: &EntryId, entry: &ValidEntry) -> Result<JournalEntry>;

    /// Set the favorite flag
    async fn set_favorite(&self, user: &UserId, id: &EntryId, is_favorite: bool) -> Result<JournalEntry>;

    /// Delete an entry; its tag links go with it, the tags stay
    async fn delete(&self, user: &UserId, id: &EntryId) -> Result<()>;

    /// The columns statistics need, for every entry of the user
    async fn stat_records(&self, user: &UserId) -> Result<Vec<StatRecord>>;
}

/// libSQL implementation of `EntryRepository`
pub struct LibSqlEntryRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlEntryRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    const fn tags(&self) -> LibSqlTagRepository<'a> {
        LibSqlTagRepository::new(self.conn)
    }

    /// Parse an entry (without tags) from a row of `ENTRY_COLUMNS`
    fn parse_entry(row: &Row) -> Result<JournalEntry> {
        let id: String = row.get(0)?;
        let user_id: String = row.get(1)?;
        let mood = read_optional_text(row, 4)?
            .map(|raw| raw.parse::<Mood>())
            .transpose()?;

        Ok(JournalEntry {
            id: parse_id(&id, "entry")?,
            user_id: UserId::new(user_id)?,
            title: row.get(2)?,
            content: row.get(3)?,
            mood,
            is_favorite: read_bool(row, 5)?,
            tags: Vec::new(),
            word_count: read_u32(row, 6)?,
            reading_time: read_u32(row, 7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }

    async fn query_entries(&self, sql: &str, args: Vec<Value>) -> Result<Vec<JournalEntry>> {
        let mut rows = self.conn.query(sql, args).await?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(Self::parse_entry(&row)?);
        }
        Ok(entries)
    }

    /// Fill in tags for entries selected by `entry_filter` (see `tags_by_entry`)
    async fn attach_tags(
        &self,
        user: &UserId,
        mut entries: Vec<JournalEntry>,
        entry_filter: &str,
        args: Vec<Value>,
    ) -> Result<Vec<JournalEntry>> {
        if entries.is_empty() {
            return Ok(entries);
        }
        let mut by_entry = self.tags().tags_by_entry(user, entry_filter, args).await?;
        for entry in &mut entries {
            entry.tags = by_entry.remove(&entry.id.as_str()).unwrap_or_default();
        }
        Ok(entries)
    }

    async fn insert(&self, user: &UserId, entry: &ValidEntry) -> Result<JournalEntry> {
        let id = EntryId::new();
        let now = unix_millis_now();

        self.conn
            .execute(
                &format!("INSERT INTO entries ({ENTRY_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"),
                params![
                    id.as_str(),
                    user.as_str(),
                    entry.title.as_str(),
                    entry.content.as_str(),
                    optional_text(entry.mood.map(Mood::as_str)),
                    i64::from(entry.is_favorite),
                    i64::from(entry.word_count),
                    i64::from(entry.reading_time),
                    now,
                    now
                ],
            )
            .await?;

        let tags = self.tags().replace_entry_tags(user, &id, &entry.tags).await?;

        Ok(JournalEntry {
            id,
            user_id: user.clone(),
            title: entry.title.clone(),
            content: entry.content.clone(),
            mood: entry.mood,
            is_favorite: entry.is_favorite,
            tags,
            word_count: entry.word_count,
            reading_time: entry.reading_time,
            created_at: now,
            updated_at: now,
        })
    }

    async fn replace(&self, user: &UserId, id: &EntryId, entry: &ValidEntry) -> Result<()> {
        let rows = self
            .conn
            .execute(
                "UPDATE entries
                 SET title = ?, content = ?, mood = ?, is_favorite = ?,
                     word_count = ?, reading_time = ?, updated_at = ?
                 WHERE id = ? AND user_id = ?",
                params![
                    entry.title.as_str(),
                    entry.content.as_str(),
                    optional_text(entry.mood.map(Mood::as_str)),
                    i64::from(entry.is_favorite),
                    i64::from(entry.word_count),
                    i64::from(entry.reading_time),
                    unix_millis_now(),
                    id.as_str(),
                    user.as_str()
                ],
            )
            .await?;

        if rows == 0 {
            return Err(Error::NotFound(format!("entry {id}")));
        }

        self.tags().replace_entry_tags(user, id, &entry.tags).await?;
        Ok(())
    }

    async fn require(&self, user: &UserId, id: &EntryId) -> Result<JournalEntry> {
        self.get(user, id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("entry {id}")))
    }
}

impl EntryRepository for LibSqlEntryRepository<'_> {
    async fn create(&self, user: &UserId, entry: &ValidEntry) -> Result<JournalEntry> {
        self.conn.execute("BEGIN TRANSACTION", ()).await?;
        let result = self.insert(user, entry).await;
        let created = finish_transaction(self.conn, result).await?;
        tracing::info!(entry_id = %created.id, tags = created.tags.len(), "Created journal entry");
        Ok(created)
    }

    async fn get(&self, user: &UserId, id: &EntryId) -> Result<Option<JournalEntry>> {
        let entries = self
            .query_entries(
                &format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE id = ? AND user_id = ?"),
                vec![Value::Text(id.as_str()), Value::Text(user.as_str().to_string())],
            )
            .await?;
        let entries = self
            .attach_tags(user, entries, "e.id = ?", vec![Value::Text(id.as_str())])
            .await?;
        Ok(entries.into_iter().next())
    }

    async fn list(&self, user: &UserId, limit: usize, offset: usize) -> Result<Vec<JournalEntry>> {
        let page = || {
            vec![
                Value::Integer(sql_limit(limit)),
                Value::Integer(sql_limit(offset)),
            ]
        };
        let mut args = vec![Value::Text(user.as_str().to_string())];
        args.extend(page());

        let entries = self
            .query_entries(
                &format!(
                    "SELECT {ENTRY_COLUMNS} FROM entries WHERE user_id = ?
                     ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
                ),
                args,
            )
            .await?;

        let mut tag_args = vec![Value::Text(user.as_str().to_string())];
        tag_args.extend(page());
        self.attach_tags(
            user,
            entries,
            "e.id IN (SELECT id FROM entries WHERE user_id = ?
                      ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?)",
            tag_args,
        )
        .await
    }

    async fn list_all(&self, user: &UserId) -> Result<Vec<JournalEntry>> {
        let entries = self
            .query_entries(
                &format!(
                    "SELECT {ENTRY_COLUMNS} FROM entries WHERE user_id = ?
                     ORDER BY created_at DESC, id DESC"
                ),
                vec![Value::Text(user.as_str().to_string())],
            )
            .await?;
        self.attach_tags(user, entries, "1 = 1", Vec::new()).await
    }

    async fn update(&self, user: &UserId, id: &EntryId, entry: &ValidEntry) -> Result<JournalEntry> {
        self.conn.execute("BEGIN TRANSACTION", ()).await?;
        let result = self.replace(user, id, entry).await;
        finish_transaction(self.conn, result).await?;
        tracing::info!(entry_id = %id, "Updated journal entry");
        self.require(user, id).await
    }

    async fn set_favorite(&self, user: &UserId, id: &EntryId, is_favorite: bool) -> Result<JournalEntry> {
        let rows = self
            .conn
            .execute(
                "UPDATE entries SET is_favorite = ?, updated_at = ? WHERE id = ? AND user_id = ?",
                params![
                    i64::from(is_favorite),
                    unix_millis_now(),
                    id.as_str(),
                    user.as_str()
                ],
            )
            .await?;

        if rows == 0 {
            return Err(Error::NotFound(format!("entry {id}")));
        }
        self.require(user, id).await
    }

    async fn delete(&self, user: &UserId, id: &EntryId) -> Result<()> {
        let rows = self
            .conn
            .execute(
                "DELETE FROM entries WHERE id = ? AND user_id = ?",
                [id.as_str(), user.as_str().to_string()],
            )
            .await?;

        if rows == 0 {
            return Err(Error::NotFound(format!("entry {id}")));
        }
        tracing::info!(entry_id = %id, "Deleted journal entry");
        Ok(())
    }

    async fn stat_records(&self, user: &UserId) -> Result<Vec<StatRecord>> {
        let mut rows = self
            .conn
            .query(
                "SELECT created_at, word_count, is_favorite, mood FROM entries WHERE user_id = ?",
                [user.as_str()],
            )
            .await?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(StatRecord {
                created_at: Some(row.get(0)?),
                word_count: Some(read_u32(&row, 1)?),
                is_favorite: Some(read_bool(&row, 2)?),
                mood: read_optional_text(&row, 3)?,
            });
        }
        tracing::debug!(count = records.len(), "Loaded stat records");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Database, LibSqlTagRepository, TagRepository};
    use crate::models::{EntryDraft, TagInput};
    use pretty_assertions::assert_eq;

    async fn setup() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    fn user(name: &str) -> UserId {
        UserId::new(name).unwrap()
    }

    fn valid(title: &str, content: &str, tags: &[&str]) -> ValidEntry {
        EntryDraft {
            title: title.to_string(),
            content: content.to_string(),
            mood: Some(Mood::Calm),
            is_favorite: false,
            tags: tags.iter().map(|t| TagInput::Name((*t).to_string())).collect(),
        }
        .validate()
        .unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_create_and_get() {
        let db = setup().await;
        let repo = LibSqlEntryRepository::new(db.connection());
        let alice = user("alice");

        let created = repo
            .create(&alice, &valid("Morning", "quiet coffee on the porch", &["Home", "coffee"]))
            .await
            .unwrap();
        assert_eq!(created.tag_names(), vec!["coffee", "home"]);
        assert_eq!(created.word_count, 5);

        let fetched = repo.get(&alice, &created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_other_users_rows_are_invisible() {
        let db = setup().await;
        let repo = LibSqlEntryRepository::new(db.connection());
        let entry = repo.create(&user("alice"), &valid("t", "c", &[])).await.unwrap();
        let bob = user("bob");

        assert!(repo.get(&bob, &entry.id).await.unwrap().is_none());
        assert!(matches!(
            repo.set_favorite(&bob, &entry.id, true).await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(repo.delete(&bob, &entry.id).await, Err(Error::NotFound(_))));
        assert!(repo.list_all(&bob).await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_update_replaces_tags_and_keeps_orphans() {
        let db = setup().await;
        let repo = LibSqlEntryRepository::new(db.connection());
        let tags = LibSqlTagRepository::new(db.connection());
        let alice = user("alice");

        let entry = repo.create(&alice, &valid("t", "one", &["old"])).await.unwrap();
        let updated = repo
            .update(&alice, &entry.id, &valid("t2", "one two", &["new"]))
            .await
            .unwrap();

        assert_eq!(updated.title, "t2");
        assert_eq!(updated.word_count, 2);
        assert_eq!(updated.tag_names(), vec!["new"]);
        assert_eq!(updated.created_at, entry.created_at);

        let usage = tags.list_with_usage(&alice).await.unwrap();
        let counts: Vec<(String, u32)> = usage
            .into_iter()
            .map(|u| (u.tag.name, u.entry_count))
            .collect();
        assert_eq!(counts, vec![("new".to_string(), 1), ("old".to_string(), 0)]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_delete_cascades_links() {
        let db = setup().await;
        let repo = LibSqlEntryRepository::new(db.connection());
        let tags = LibSqlTagRepository::new(db.connection());
        let alice = user("alice");

        let entry = repo.create(&alice, &valid("t", "c", &["keep"])).await.unwrap();
        repo.delete(&alice, &entry.id).await.unwrap();

        assert!(repo.get(&alice, &entry.id).await.unwrap().is_none());
        let usage = tags.list_with_usage(&alice).await.unwrap();
        assert_eq!(usage.len(), 1);
        assert_eq!(usage[0].entry_count, 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_list_pages_newest_first() {
        let db = setup().await;
        let repo = LibSqlEntryRepository::new(db.connection());
        let alice = user("alice");

        for (index, title) in ["first", "second", "third"].iter().enumerate() {
            let entry = repo.create(&alice, &valid(title, "body", &["tag"])).await.unwrap();
            db.connection()
                .execute(
                    "UPDATE entries SET created_at = ? WHERE id = ?",
                    params![i64::try_from(index).unwrap() * 1000, entry.id.as_str()],
                )
                .await
                .unwrap();
        }

        let page = repo.list(&alice, 2, 0).await.unwrap();
        let titles: Vec<&str> = page.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["third", "second"]);
        assert!(page.iter().all(|e| e.tag_names() == vec!["tag"]));

        let rest = repo.list(&alice, 2, 2).await.unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].title, "first");
        assert_eq!(rest[0].tag_names(), vec!["tag"]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_stat_records() {
        let db = setup().await;
        let repo = LibSqlEntryRepository::new(db.connection());
        let alice = user("alice");

        let entry = repo.create(&alice, &valid("t", "a b c", &[])).await.unwrap();
        repo.set_favorite(&alice, &entry.id, true).await.unwrap();

        let records = repo.stat_records(&alice).await.unwrap();
        assert_eq!(
            records,
            vec![StatRecord {
                created_at: Some(entry.created_at),
                word_count: Some(3),
                is_favorite: Some(true),
                mood: Some("calm".to_string()),
            }]
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_failed_create_rolls_back() {
        let db = setup().await;
        let repo = LibSqlEntryRepository::new(db.connection());
        let alice = user("alice");

        // Bypass draft validation to force a tag error mid-transaction
        let mut entry = valid("t", "c", &[]);
        entry.tags = vec!["ok".to_string(), "x".repeat(60)];
        assert!(repo.create(&alice, &entry).await.is_err());

        assert!(repo.list_all(&alice).await.unwrap().is_empty());
        let tags = LibSqlTagRepository::new(db.connection());
        assert!(tags.list(&alice).await.unwrap().is_empty());
    }
}
