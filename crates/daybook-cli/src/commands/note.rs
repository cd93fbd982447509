use chrono::Utc;

use crate::cli::NoteCommands;
use crate::commands::common::{
    capture_editor_input_with_initial, format_relative_time, normalize_content, preview,
    print_json, resolve_content, resolve_note, short_id, Context,
};
use crate::error::CliError;

pub async fn run_note(ctx: &Context, command: NoteCommands) -> Result<(), CliError> {
    match command {
        NoteCommands::Add { content } => {
            let content = resolve_content(&content)?;
            let note = ctx.journal.create_note(&ctx.user, &content).await?;
            println!("{}", note.id);
        }
        NoteCommands::List { limit, json } => {
            let notes = ctx.journal.list_notes(&ctx.user, limit).await?;
            if json {
                print_json(&notes)?;
            } else {
                let now_ms = Utc::now().timestamp_millis();
                for note in &notes {
                    let star = if note.is_favorite { "*" } else { " " };
                    println!(
                        "{:<13} {star} {:<50}  {}",
                        short_id(&note.id.to_string()),
                        preview(&note.content, 50),
                        format_relative_time(note.created_at, now_ms)
                    );
                }
            }
        }
        NoteCommands::Edit { id, content } => {
            let note = resolve_note(ctx, &id).await?;
            let content = match normalize_content(&content.join(" ")) {
                Some(content) => content,
                None => capture_editor_input_with_initial(&note.content)?
                    .ok_or(CliError::EmptyEditedContent)?,
            };
            let updated = ctx.journal.update_note(&ctx.user, &note.id, &content).await?;
            println!("{}", updated.id);
        }
        NoteCommands::Delete { id } => {
            let note = resolve_note(ctx, &id).await?;
            ctx.journal.delete_note(&ctx.user, &note.id).await?;
            println!("{}", note.id);
        }
        NoteCommands::Favorite { id } => {
            let note = resolve_note(ctx, &id).await?;
            let updated = ctx.journal.toggle_note_favorite(&ctx.user, &note.id).await?;
            let state = if updated.is_favorite { "starred" } else { "unstarred" };
            println!("{} {state}", updated.id);
        }
    }
    Ok(())
}
