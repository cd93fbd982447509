//! To-do repository implementation

use chrono::NaiveDate;
use libsql::{params, Connection, Row};

use super::{optional_text, parse_id, read_bool, read_optional_text};
use crate::error::{Error, Result};
use crate::models::{Todo, TodoId, UserId};
use crate::util::unix_millis_now;

const DEADLINE_FORMAT: &str = "%Y-%m-%d";

/// Trait for to-do storage operations (async)
#[allow(async_fn_in_trait)]
pub trait TodoRepository {
    async fn create(&self, user: &UserId, task: &str, deadline: Option<NaiveDate>) -> Result<Todo>;

    async fn get(&self, user: &UserId, id: &TodoId) -> Result<Option<Todo>>;

    /// All items, newest first
    async fn list(&self, user: &UserId) -> Result<Vec<Todo>>;

    /// Replace the task text and deadline
    async fn update(
        &self,
        user: &UserId,
        id: &TodoId,
        task: &str,
        deadline: Option<NaiveDate>,
    ) -> Result<Todo>;

    async fn set_completed(&self, user: &UserId, id: &TodoId, is_completed: bool) -> Result<Todo>;

    async fn delete(&self, user: &UserId, id: &TodoId) -> Result<()>;
}

/// libSQL implementation of `TodoRepository`
pub struct LibSqlTodoRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlTodoRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn parse_todo(row: &Row) -> Result<Todo> {
        let id: String = row.get(0)?;
        let user_id: String = row.get(1)?;
        let deadline = read_optional_text(row, 3)?
            .map(|raw| {
                NaiveDate::parse_from_str(&raw, DEADLINE_FORMAT)
                    .map_err(|e| Error::Database(format!("Invalid deadline '{raw}': {e}")))
            })
            .transpose()?;

        Ok(Todo {
            id: parse_id(&id, "todo")?,
            user_id: UserId::new(user_id)?,
            task: row.get(2)?,
            deadline,
            is_completed: read_bool(row, 4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    async fn require(&self, user: &UserId, id: &TodoId) -> Result<Todo> {
        self.get(user, id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("todo {id}")))
    }
}

fn deadline_text(deadline: Option<NaiveDate>) -> Option<String> {
    deadline.map(|date| date.format(DEADLINE_FORMAT).to_string())
}

impl TodoRepository for LibSqlTodoRepository<'_> {
    async fn create(&self, user: &UserId, task: &str, deadline: Option<NaiveDate>) -> Result<Todo> {
        let todo = Todo::new(user.clone(), task, deadline);

        self.conn
            .execute(
                "INSERT INTO todos (id, user_id, task, deadline, is_completed, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
                params![
                    todo.id.as_str(),
                    user.as_str(),
                    todo.task.as_str(),
                    optional_text(deadline_text(todo.deadline).as_deref()),
                    i64::from(todo.is_completed),
                    todo.created_at,
                    todo.updated_at
                ],
            )
            .await?;

        tracing::debug!(todo_id = %todo.id, "Created todo");
        Ok(todo)
    }

    async fn get(&self, user: &UserId, id: &TodoId) -> Result<Option<Todo>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, user_id, task, deadline, is_completed, created_at, updated_at
                 FROM todos WHERE id = ? AND user_id = ?",
                [id.as_str(), user.as_str().to_string()],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::parse_todo(&row)?)),
            None => Ok(None),
        }
    }

    async fn list(&self, user: &UserId) -> Result<Vec<Todo>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, user_id, task, deadline, is_completed, created_at, updated_at
                 FROM todos WHERE user_id = ?
                 ORDER BY created_at DESC, id DESC",
                [user.as_str()],
            )
            .await?;

        let mut todos = Vec::new();
        while let Some(row) = rows.next().await? {
            todos.push(Self::parse_todo(&row)?);
        }
        Ok(todos)
    }

    async fn update(
        &self,
        user: &UserId,
        id: &TodoId,
        task: &str,
        deadline: Option<NaiveDate>,
    ) -> Result<Todo> {
        let rows = self
            .conn
            .execute(
                "UPDATE todos SET task = ?, deadline = ?, updated_at = ? WHERE id = ? AND user_id = ?",
                params![
                    task,
                    optional_text(deadline_text(deadline).as_deref()),
                    unix_millis_now(),
                    id.as_str(),
                    user.as_str()
                ],
            )
            .await?;

        if rows == 0 {
            return Err(Error::NotFound(format!("todo {id}")));
        }
        self.require(user, id).await
    }

    async fn set_completed(&self, user: &UserId, id: &TodoId, is_completed: bool) -> Result<Todo> {
        let rows = self
            .conn
            .execute(
                "UPDATE todos SET is_completed = ?, updated_at = ? WHERE id = ? AND user_id = ?",
                params![
                    i64::from(is_completed),
                    unix_millis_now(),
                    id.as_str(),
                    user.as_str()
                ],
            )
            .await?;

        if rows == 0 {
            return Err(Error::NotFound(format!("todo {id}")));
        }
        self.require(user, id).await
    }

    async fn delete(&self, user: &UserId, id: &TodoId) -> Result<()> {
        let rows = self
            .conn
            .execute(
                "DELETE FROM todos WHERE id = ? AND user_id = ?",
                [id.as_str(), user.as_str().to_string()],
            )
            .await?;

        if rows == 0 {
            return Err(Error::NotFound(format!("todo {id}")));
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

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_deadline_round_trips() {
        let db = setup().await;
        let repo = LibSqlTodoRepository::new(db.connection());
        let alice = user("alice");

        let todo = repo
            .create(&alice, "file taxes", Some(date(2024, 4, 15)))
            .await
            .unwrap();
        let fetched = repo.get(&alice, &todo.id).await.unwrap().unwrap();
        assert_eq!(fetched, todo);

        let cleared = repo.update(&alice, &todo.id, "file taxes early", None).await.unwrap();
        assert_eq!(cleared.deadline, None);
        assert_eq!(cleared.task, "file taxes early");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_toggle_and_delete() {
        let db = setup().await;
        let repo = LibSqlTodoRepository::new(db.connection());
        let alice = user("alice");

        let todo = repo.create(&alice, "water plants", None).await.unwrap();
        assert!(repo.set_completed(&alice, &todo.id, true).await.unwrap().is_completed);
        assert!(!repo.set_completed(&alice, &todo.id, false).await.unwrap().is_completed);

        assert!(matches!(
            repo.set_completed(&user("bob"), &todo.id, true).await,
            Err(Error::NotFound(_))
        ));

        repo.delete(&alice, &todo.id).await.unwrap();
        assert!(repo.list(&alice).await.unwrap().is_empty());
    }
}
