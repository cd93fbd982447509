//! Tag model

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{TagId, UserId};
use crate::error::{Error, Result};

/// Maximum number of tags on a single entry
pub const MAX_TAGS_PER_ENTRY: usize = 10;

/// Maximum length of a tag name, in characters
pub const MAX_TAG_LEN: usize = 50;

static TAG_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,#\s]+").expect("valid tag separator regex"));

/// A user-scoped label for organizing entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Unique identifier
    pub id: TagId,
    /// Owner
    pub user_id: UserId,
    /// Tag name (stored in lowercase)
    pub name: String,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
}

impl Tag {
    /// Create a new tag with the given name
    ///
    /// The name is automatically trimmed and converted to lowercase.
    #[must_use]
    pub fn new(user_id: UserId, name: impl Into<String>) -> Self {
        Self {
            id: TagId::new(),
            user_id,
            name: name.into().trim().to_lowercase(),
            created_at: crate::util::unix_millis_now(),
        }
    }
}

/// A tag together with how many entries reference it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagUsage {
    #[serde(flatten)]
    pub tag: Tag,
    /// Zero for tags no entry references any more
    pub entry_count: u32,
}

/// A tag as it arrives from a client.
///
/// Older clients send bare names while newer ones echo back `{id, name}`
/// objects. Both collapse to a name here so nothing downstream has to care.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagInput {
    Name(String),
    Tagged {
        #[serde(default)]
        id: Option<TagId>,
        name: String,
    },
}

impl TagInput {
    #[must_use]
    pub fn into_name(self) -> String {
        match self {
            Self::Name(name) | Self::Tagged { name, .. } => name,
        }
    }
}

/// Normalize a single tag name: trimmed, lowercase, bounded length.
///
/// Returns `Ok(None)` for blank input.
pub fn normalize_tag_name(raw: &str) -> Result<Option<String>> {
    let name = raw.trim().trim_start_matches('#').trim().to_lowercase();
    if name.is_empty() {
        return Ok(None);
    }
    if name.chars().count() > MAX_TAG_LEN {
        return Err(Error::InvalidInput(format!(
            "Tag '{name}' exceeds {MAX_TAG_LEN} characters"
        )));
    }
    Ok(Some(name))
}

/// Normalize a tag list for one entry.
///
/// Names are normalized, blanks dropped and duplicates removed keeping the
/// first occurrence. More than [`MAX_TAGS_PER_ENTRY`] distinct names is an error.
pub fn normalize_tag_names<I, S>(raw: I) -> Result<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut names = Vec::new();
    for item in raw {
        let Some(name) = normalize_tag_name(item.as_ref())? else {
            continue;
        };
        if seen.insert(name.clone()) {
            names.push(name);
        }
    }
    if names.len() > MAX_TAGS_PER_ENTRY {
        return Err(Error::InvalidInput(format!(
            "Maximum {MAX_TAGS_PER_ENTRY} tags allowed"
        )));
    }
    Ok(names)
}

/// Split free-form tag text such as `"work, #Ideas personal"` into raw names
#[must_use]
pub fn split_tag_text(text: &str) -> Vec<String> {
    TAG_SEPARATORS
        .split(text)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn user() -> UserId {
        UserId::new("user-1").unwrap()
    }

    #[test]
    fn test_tag_new_lowercase() {
        let tag = Tag::new(user(), " Hello ");
        assert_eq!(tag.name, "hello");
    }

    #[test]
    fn test_normalize_tag_names_dedupes_in_order() {
        let names = normalize_tag_names(["Work", "ideas", "WORK", " ", "#travel"]).unwrap();
        assert_eq!(names, vec!["work", "ideas", "travel"]);
    }

    #[test]
    fn test_normalize_tag_names_limits_count() {
        let many: Vec<String> = (0..11).map(|i| format!("t{i}")).collect();
        let err = normalize_tag_names(&many).unwrap_err();
        assert!(err.to_string().contains("Maximum 10 tags"));

        let ten: Vec<String> = (0..10).map(|i| format!("t{i}")).collect();
        assert_eq!(normalize_tag_names(&ten).unwrap().len(), 10);
    }

    #[test]
    fn test_normalize_tag_name_limits_length() {
        let long = "a".repeat(MAX_TAG_LEN + 1);
        assert!(normalize_tag_name(&long).is_err());
        let exact = "a".repeat(MAX_TAG_LEN);
        assert_eq!(normalize_tag_name(&exact).unwrap(), Some(exact));
    }

    #[test]
    fn test_tag_input_accepts_both_shapes() {
        let inputs: Vec<TagInput> = serde_json::from_str(
            r#"["Work", {"id": "0190c2b2-9a55-7cc0-8000-000000000001", "name": "Ideas"}, {"name": "loose"}]"#,
        )
        .unwrap();
        let names: Vec<String> = inputs.into_iter().map(TagInput::into_name).collect();
        assert_eq!(names, vec!["Work", "Ideas", "loose"]);
    }

    #[test]
    fn test_split_tag_text() {
        assert_eq!(
            split_tag_text("work, #Ideas  personal,,"),
            vec!["work", "Ideas", "personal"]
        );
        assert!(split_tag_text("  ").is_empty());
    }
}
