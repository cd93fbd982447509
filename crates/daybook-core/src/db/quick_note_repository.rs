//! Quick note repository implementation

use libsql::{params, Connection, Row};

use super::{parse_id, read_bool, sql_limit};
use crate::error::{Error, Result};
use crate::models::{QuickNote, QuickNoteId, UserId};
use crate::util::unix_millis_now;

/// How many notes the scratch pad shows by default
pub const DEFAULT_QUICK_NOTE_LIMIT: usize = 10;

/// Trait for quick note storage operations (async)
#[allow(async_fn_in_trait)]
pub trait QuickNoteRepository {
    async fn create(&self, user: &UserId, content: &str) -> Result<QuickNote>;

    async fn get(&self, user: &UserId, id: &QuickNoteId) -> Result<Option<QuickNote>>;

    /// Most recently created notes first
    async fn list_recent(&self, user: &UserId, limit: usize) -> Result<Vec<QuickNote>>;

    async fn update(&self, user: &UserId, id: &QuickNoteId, content: &str) -> Result<QuickNote>;

    async fn set_favorite(&self, user: &UserId, id: &QuickNoteId, is_favorite: bool) -> Result<QuickNote>;

    async fn delete(&self, user: &UserId, id: &QuickNoteId) -> Result<()>;
}

/// libSQL implementation of `QuickNoteRepository`
pub struct LibSqlQuickNoteRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlQuickNoteRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn parse_note(row: &Row) -> Result<QuickNote> {
        let id: String = row.get(0)?;
        let user_id: String = row.get(1)?;
        Ok(QuickNote {
            id: parse_id(&id, "quick note")?,
            user_id: UserId::new(user_id)?,
            content: row.get(2)?,
            is_favorite: read_bool(row, 3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }

    async fn require(&self, user: &UserId, id: &QuickNoteId) -> Result<QuickNote> {
        self.get(user, id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("quick note {id}")))
    }
}

impl QuickNoteRepository for LibSqlQuickNoteRepository<'_> {
    async fn create(&self, user: &UserId, content: &str) -> Result<QuickNote> {
        let note = QuickNote::new(user.clone(), content);

        self.conn
            .execute(
                "INSERT INTO quick_notes (id, user_id, content, is_favorite, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?)",
                params![
                    note.id.as_str(),
                    user.as_str(),
                    note.content.as_str(),
                    i64::from(note.is_favorite),
                    note.created_at,
                    note.updated_at
                ],
            )
            .await?;

        Ok(note)
    }

    async fn get(&self, user: &UserId, id: &QuickNoteId) -> Result<Option<QuickNote>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, user_id, content, is_favorite, created_at, updated_at
                 FROM quick_notes WHERE id = ? AND user_id = ?",
                [id.as_str(), user.as_str().to_string()],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::parse_note(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_recent(&self, user: &UserId, limit: usize) -> Result<Vec<QuickNote>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, user_id, content, is_favorite, created_at, updated_at
                 FROM quick_notes WHERE user_id = ?
                 ORDER BY created_at DESC, id DESC
                 LIMIT ?",
                params![user.as_str(), sql_limit(limit)],
            )
            .await?;

        let mut notes = Vec::new();
        while let Some(row) = rows.next().await? {
            notes.push(Self::parse_note(&row)?);
        }
        Ok(notes)
    }

    async fn update(&self, user: &UserId, id: &QuickNoteId, content: &str) -> Result<QuickNote> {
        let rows = self
            .conn
            .execute(
                "UPDATE quick_notes SET content = ?, updated_at = ? WHERE id = ? AND user_id = ?",
                params![content, unix_millis_now(), id.as_str(), user.as_str()],
            )
            .await?;

        if rows == 0 {
            return Err(Error::NotFound(format!("quick note {id}")));
        }
        self.require(user, id).await
    }

    async fn set_favorite(&self, user: &UserId, id: &QuickNoteId, is_favorite: bool) -> Result<QuickNote> {
        let rows = self
            .conn
            .execute(
                "UPDATE quick_notes SET is_favorite = ?, updated_at = ? WHERE id = ? AND user_id = ?",
                params![
                    i64::from(is_favorite),
                    unix_millis_now(),
                    id.as_str(),
                    user.as_str()
                ],
            )
            .await?;

        if rows == 0 {
            return Err(Error::NotFound(format!("quick note {id}")));
        }
        self.require(user, id).await
    }

    async fn delete(&self, user: &UserId, id: &QuickNoteId) -> Result<()> {
        let rows = self
            .conn
            .execute(
                "DELETE FROM quick_notes WHERE id = ? AND user_id = ?",
                [id.as_str(), user.as_str().to_string()],
            )
            .await?;

        if rows == 0 {
            return Err(Error::NotFound(format!("quick note {id}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use pretty_assertions::assert_eq;

    async fn setup() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    fn user(name: &str) -> UserId {
        UserId::new(name).unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_create_update_favorite_delete() {
        let db = setup().await;
        let repo = LibSqlQuickNoteRepository::new(db.connection());
        let alice = user("alice");

        let note = repo.create(&alice, "call the dentist").await.unwrap();
        let updated = repo.update(&alice, &note.id, "call the dentist at 9").await.unwrap();
        assert_eq!(updated.content, "call the dentist at 9");
        assert!(updated.updated_at >= note.updated_at);

        let starred = repo.set_favorite(&alice, &note.id, true).await.unwrap();
        assert!(starred.is_favorite);

        repo.delete(&alice, &note.id).await.unwrap();
        assert!(repo.get(&alice, &note.id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete(&alice, &note.id).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_list_recent_limits_and_scopes() {
        let db = setup().await;
        let repo = LibSqlQuickNoteRepository::new(db.connection());
        let alice = user("alice");

        for n in 0..12 {
            let note = repo.create(&alice, &format!("note {n}")).await.unwrap();
            db.connection()
                .execute(
                    "UPDATE quick_notes SET created_at = ? WHERE id = ?",
                    params![n, note.id.as_str()],
                )
                .await
                .unwrap();
        }
        repo.create(&user("bob"), "not yours").await.unwrap();

        let notes = repo.list_recent(&alice, DEFAULT_QUICK_NOTE_LIMIT).await.unwrap();
        assert_eq!(notes.len(), 10);
        assert_eq!(notes[0].content, "note 11");
        assert!(notes.iter().all(|n| n.user_id == alice));
    }
}
