//! Tag repository implementation

use std::collections::HashMap;

use libsql::{params, Connection, Row};

use super::{parse_id, read_u32};
use crate::error::{Error, Result};
use crate::models::{normalize_tag_name, EntryId, Tag, TagId, TagUsage, UserId};
use crate::search::suggest_tags;

/// Trait for tag storage operations (async)
#[allow(async_fn_in_trait)]
pub trait TagRepository {
    /// Find a tag by name, creating it on first use
    async fn get_or_create(&self, user: &UserId, name: &str) -> Result<Tag>;

    /// Create a tag; `Conflict` if the user already has one with this name
    async fn create(&self, user: &UserId, name: &str) -> Result<Tag>;

    /// Case-insensitive lookup by name
    async fn find_by_name(&self, user: &UserId, name: &str) -> Result<Option<Tag>>;

    /// All of the user's tags, by name
    async fn list(&self, user: &UserId) -> Result<Vec<Tag>>;

    /// All tags with their entry counts, orphans included
    async fn list_with_usage(&self, user: &UserId) -> Result<Vec<TagUsage>>;

    /// Up to five tags matching `query`, skipping `exclude`
    async fn suggest(&self, user: &UserId, query: &str, exclude: &[String]) -> Result<Vec<Tag>>;

    /// Delete a tag and its entry links
    async fn delete(&self, user: &UserId, id: &TagId) -> Result<()>;
}

/// libSQL implementation of `TagRepository`
pub struct LibSqlTagRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlTagRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn parse_tag(row: &Row) -> Result<Tag> {
        let id: String = row.get(0)?;
        let user_id: String = row.get(1)?;
        Ok(Tag {
            id: parse_id(&id, "tag")?,
            user_id: UserId::new(user_id)?,
            name: row.get(2)?,
            created_at: row.get(3)?,
        })
    }

    async fn insert(&self, tag: &Tag) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO tags (id, user_id, name, created_at) VALUES (?, ?, ?, ?)",
                params![
                    tag.id.as_str(),
                    tag.user_id.as_str(),
                    tag.name.as_str(),
                    tag.created_at
                ],
            )
            .await?;
        tracing::debug!(tag = %tag.name, "Created tag");
        Ok(())
    }

    /// Replace every tag link of `entry_id` with `names`, creating tags lazily.
    ///
    /// Tags that lose their last entry are kept.
    pub(super) async fn replace_entry_tags(
        &self,
        user: &UserId,
        entry_id: &EntryId,
        names: &[String],
    ) -> Result<Vec<Tag>> {
        self.conn
            .execute(
                "DELETE FROM entry_tags WHERE entry_id = ?",
                [entry_id.as_str()],
            )
            .await?;

        let mut tags = Vec::with_capacity(names.len());
        for name in names {
            let tag = self.get_or_create(user, name).await?;
            self.conn
                .execute(
                    "INSERT OR IGNORE INTO entry_tags (entry_id, tag_id) VALUES (?, ?)",
                    [entry_id.as_str(), tag.id.as_str()],
                )
                .await?;
            tags.push(tag);
        }
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    /// Tags of the given entries, keyed by entry id and sorted by name.
    ///
    /// `entry_filter` is an SQL condition over `e` (the entries table) bound
    /// with `args` after the user id.
    pub(super) async fn tags_by_entry(
        &self,
        user: &UserId,
        entry_filter: &str,
        args: Vec<libsql::Value>,
    ) -> Result<HashMap<String, Vec<Tag>>> {
        let sql = format!(
            "SELECT et.entry_id, t.id, t.user_id, t.name, t.created_at
             FROM entry_tags et
             JOIN tags t ON t.id = et.tag_id
             JOIN entries e ON e.id = et.entry_id
             WHERE e.user_id = ? AND {entry_filter}
             ORDER BY t.name"
        );
        let mut values = vec![libsql::Value::Text(user.as_str().to_string())];
        values.extend(args);

        let mut rows = self.conn.query(&sql, values).await?;
        let mut by_entry: HashMap<String, Vec<Tag>> = HashMap::new();
        while let Some(row) = rows.next().await? {
            let entry_id: String = row.get(0)?;
            let tag_id: String = row.get(1)?;
            let owner: String = row.get(2)?;
            let tag = Tag {
                id: parse_id(&tag_id, "tag")?,
                user_id: UserId::new(owner)?,
                name: row.get(3)?,
                created_at: row.get(4)?,
            };
            by_entry.entry(entry_id).or_default().push(tag);
        }
        Ok(by_entry)
    }
}

impl TagRepository for LibSqlTagRepository<'_> {
    async fn get_or_create(&self, user: &UserId, name: &str) -> Result<Tag> {
        let name = normalize_tag_name(name)?
            .ok_or_else(|| Error::InvalidInput("Tag name cannot be empty".into()))?;

        if let Some(existing) = self.find_by_name(user, &name).await? {
            return Ok(existing);
        }

        let tag = Tag::new(user.clone(), name);
        self.insert(&tag).await?;
        Ok(tag)
    }

    async fn create(&self, user: &UserId, name: &str) -> Result<Tag> {
        let name = normalize_tag_name(name)?
            .ok_or_else(|| Error::InvalidInput("Tag name cannot be empty".into()))?;

        if self.find_by_name(user, &name).await?.is_some() {
            return Err(Error::Conflict(format!("Tag '{name}' already exists")));
        }

        let tag = Tag::new(user.clone(), name);
        self.insert(&tag).await?;
        Ok(tag)
    }

    async fn find_by_name(&self, user: &UserId, name: &str) -> Result<Option<Tag>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, user_id, name, created_at FROM tags
                 WHERE user_id = ? AND name = ? COLLATE NOCASE",
                [user.as_str(), name.trim()],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::parse_tag(&row)?)),
            None => Ok(None),
        }
    }

    async fn list(&self, user: &UserId) -> Result<Vec<Tag>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, user_id, name, created_at FROM tags WHERE user_id = ? ORDER BY name",
                [user.as_str()],
            )
            .await?;

        let mut tags = Vec::new();
        while let Some(row) = rows.next().await? {
            tags.push(Self::parse_tag(&row)?);
        }
        Ok(tags)
    }

    async fn list_with_usage(&self, user: &UserId) -> Result<Vec<TagUsage>> {
        let mut rows = self
            .conn
            .query(
                "SELECT t.id, t.user_id, t.name, t.created_at, COUNT(et.entry_id)
                 FROM tags t
                 LEFT JOIN entry_tags et ON et.tag_id = t.id
                 WHERE t.user_id = ?
                 GROUP BY t.id
                 ORDER BY t.name",
                [user.as_str()],
            )
            .await?;

        let mut usage = Vec::new();
        while let Some(row) = rows.next().await? {
            usage.push(TagUsage {
                tag: Self::parse_tag(&row)?,
                entry_count: read_u32(&row, 4)?,
            });
        }
        Ok(usage)
    }

    async fn suggest(&self, user: &UserId, query: &str, exclude: &[String]) -> Result<Vec<Tag>> {
        let tags = self.list(user).await?;
        Ok(suggest_tags(&tags, query, exclude).into_iter().cloned().collect())
    }

    async fn delete(&self, user: &UserId, id: &TagId) -> Result<()> {
        let rows = self
            .conn
            .execute(
                "DELETE FROM tags WHERE id = ? AND user_id = ?",
                [id.as_str(), user.as_str().to_string()],
            )
            .await?;

        if rows == 0 {
            return Err(Error::NotFound(format!("tag {id}")));
        }
        tracing::info!(tag_id = %id, "Deleted tag");
        Ok(())
    }
}
