use daybook_core::models::{EntryDraft, TagInput};

use crate::commands::common::{parse_mood, preview, resolve_content, split_tags, Context};
use crate::error::CliError;

const DERIVED_TITLE_CHARS: usize = 60;

pub struct NewEntry {
    pub title: Option<String>,
    pub mood: Option<String>,
    pub tags: Vec<String>,
    pub favorite: bool,
    pub content: Vec<String>,
}

pub async fn run_add(ctx: &Context, new: NewEntry) -> Result<(), CliError> {
    let content = resolve_content(&new.content)?;
    let title = new
        .title
        .unwrap_or_else(|| preview(&content, DERIVED_TITLE_CHARS));

    let draft = EntryDraft {
        title,
        content,
        mood: parse_mood(new.mood.as_deref())?,
        is_favorite: new.favorite,
        tags: split_tags(&new.tags)
            .into_iter()
            .map(TagInput::Name)
            .collect(),
    };
    let entry = ctx.journal.create_entry(&ctx.user, draft).await?;

    println!("{}", entry.id);
    Ok(())
}
