use daybook_core::models::{EntryDraft, TagInput};

use crate::commands::common::{
    capture_editor_input_with_initial, parse_mood, resolve_entry, split_tags, Context,
};
use crate::error::CliError;

/// Field overrides; all `None` means "edit the content in `$EDITOR`"
#[derive(Default)]
pub struct EntryChanges {
    pub title: Option<String>,
    pub mood: Option<String>,
    pub clear_mood: bool,
    pub tags: Option<Vec<String>>,
    pub content: Option<String>,
}

impl EntryChanges {
    const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.mood.is_none()
            && !self.clear_mood
            && self.tags.is_none()
            && self.content.is_none()
    }
}

pub async fn run_edit(ctx: &Context, id: &str, changes: EntryChanges) -> Result<(), CliError> {
    let entry = resolve_entry(ctx, id).await?;

    let content = if changes.is_empty() {
        let Some(edited) = capture_editor_input_with_initial(&entry.content)? else {
            return Err(CliError::EmptyEditedContent);
        };
        if edited == entry.content {
            println!("{}", entry.id);
            return Ok(());
        }
        edited
    } else {
        changes.content.unwrap_or_else(|| entry.content.clone())
    };

    let mood = if changes.clear_mood {
        None
    } else {
        parse_mood(changes.mood.as_deref())?.or(entry.mood)
    };
    let tags = changes
        .tags
        .map_or_else(|| entry.tag_names(), |values| split_tags(&values));

    let draft = EntryDraft {
        title: changes.title.unwrap_or_else(|| entry.title.clone()),
        content,
        mood,
        is_favorite: entry.is_favorite,
        tags: tags.into_iter().map(TagInput::Name).collect(),
    };
    let updated = ctx.journal.update_entry(&ctx.user, &entry.id, draft).await?;
    println!("{}", updated.id);
    Ok(())
}

pub async fn run_favorite(ctx: &Context, id: &str) -> Result<(), CliError> {
    let entry = resolve_entry(ctx, id).await?;
    let updated = ctx
        .journal
        .toggle_entry_favorite(&ctx.user, &entry.id)
        .await?;
    let state = if updated.is_favorite { "starred" } else { "unstarred" };
    println!("{} {state}", updated.id);
    Ok(())
}
