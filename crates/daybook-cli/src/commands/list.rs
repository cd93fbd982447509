use chrono::Utc;

use crate::commands::common::{
    entry_to_list_item, format_entry_lines, print_json, render_tags, resolve_entry, Context,
    EntryListItem,
};
use crate::error::CliError;

pub async fn run_list(
    ctx: &Context,
    limit: usize,
    offset: usize,
    as_json: bool,
) -> Result<(), CliError> {
    let entries = ctx.journal.list_entries(&ctx.user, limit, offset).await?;
    let now_ms = Utc::now().timestamp_millis();

    if as_json {
        let items = entries
            .iter()
            .map(|entry| entry_to_list_item(entry, now_ms))
            .collect::<Vec<EntryListItem>>();
        print_json(&items)?;
    } else {
        for line in format_entry_lines(&entries, now_ms) {
            println!("{line}");
        }
    }

    Ok(())
}

pub async fn run_show(ctx: &Context, id: &str, as_json: bool) -> Result<(), CliError> {
    let entry = resolve_entry(ctx, id).await?;
    if as_json {
        return print_json(&entry);
    }

    let written = ctx
        .clock
        .local_time(entry.created_at)
        .map_or_else(String::new, |time| time.format("%A, %B %-d, %Y %H:%M").to_string());

    println!("{}{}", entry.title, if entry.is_favorite { "  *" } else { "" });
    println!("{written}");
    if let Some(mood) = entry.mood {
        println!("Mood: {} {}", mood.emoji(), mood.label());
    }
    let tags = render_tags(&entry.tag_names());
    if !tags.is_empty() {
        println!("Tags: {tags}");
    }
    println!(
        "{} words, {} min read",
        entry.word_count, entry.reading_time
    );
    println!();
    println!("{}", entry.content);
    Ok(())
}
