//! Database layer for daybook
//!
//! Every repository query is scoped by [`UserId`](crate::models::UserId);
//! rows owned by someone else behave exactly like missing rows.

mod connection;
mod entry_repository;
mod migrations;
mod quick_note_repository;
mod tag_repository;
mod todo_repository;

use libsql::{Connection, Row, Value};

use crate::error::{Error, Result};

pub use connection::Database;
pub use entry_repository::{EntryRepository, LibSqlEntryRepository};
pub use quick_note_repository::{
    LibSqlQuickNoteRepository, QuickNoteRepository, DEFAULT_QUICK_NOTE_LIMIT,
};
pub use tag_repository::{LibSqlTagRepository, TagRepository};
pub use todo_repository::{LibSqlTodoRepository, TodoRepository};

/// Commit when `result` is `Ok`, roll back otherwise.
///
/// Pairs with a preceding `BEGIN TRANSACTION` on the same connection.
async fn finish_transaction<T>(conn: &Connection, result: Result<T>) -> Result<T> {
    match result {
        Ok(value) => {
            if let Err(e) = conn.execute("COMMIT", ()).await {
                conn.execute("ROLLBACK", ()).await.ok();
                return Err(e.into());
            }
            Ok(value)
        }
        Err(error) => {
            conn.execute("ROLLBACK", ()).await.ok();
            Err(error)
        }
    }
}

fn optional_text(value: Option<&str>) -> Value {
    value.map_or(Value::Null, |text| Value::Text(text.to_string()))
}

fn read_optional_text(row: &Row, index: i32) -> Result<Option<String>> {
    match row.get_value(index)? {
        Value::Null => Ok(None),
        Value::Text(text) => Ok(Some(text)),
        other => Err(Error::Database(format!(
            "Expected text in column {index}, found {other:?}"
        ))),
    }
}

fn read_bool(row: &Row, index: i32) -> Result<bool> {
    Ok(row.get::<i64>(index)? != 0)
}

fn read_u32(row: &Row, index: i32) -> Result<u32> {
    let value = row.get::<i64>(index)?;
    u32::try_from(value)
        .map_err(|_| Error::Database(format!("Column {index} out of range: {value}")))
}

fn parse_id<T: std::str::FromStr>(raw: &str, kind: &str) -> Result<T> {
    raw.parse()
        .map_err(|_| Error::Database(format!("Invalid {kind} id in database: {raw}")))
}

fn sql_limit(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
