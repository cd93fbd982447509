use daybook_core::models::normalize_tag_name;

use crate::cli::TagCommands;
use crate::commands::common::{print_json, split_tags, Context};
use crate::error::CliError;

pub async fn run_tags(ctx: &Context, command: Option<TagCommands>) -> Result<(), CliError> {
    match command.unwrap_or(TagCommands::List { json: false }) {
        TagCommands::List { json } => run_list(ctx, json).await,
        TagCommands::Delete { name } => run_delete(ctx, &name).await,
        TagCommands::Suggest { query, exclude } => run_suggest(ctx, &query, &exclude).await,
    }
}

async fn run_list(ctx: &Context, as_json: bool) -> Result<(), CliError> {
    let tags = ctx.journal.list_tags(&ctx.user).await?;
    if as_json {
        return print_json(&tags);
    }
    for usage in &tags {
        println!("#{:<24} {}", usage.tag.name, usage.entry_count);
    }
    Ok(())
}

async fn run_delete(ctx: &Context, name: &str) -> Result<(), CliError> {
    let wanted = normalize_tag_name(name)?.ok_or_else(|| CliError::TagNotFound(name.to_string()))?;
    let tags = ctx.journal.list_tags(&ctx.user).await?;
    let usage = tags
        .iter()
        .find(|usage| usage.tag.name == wanted)
        .ok_or_else(|| CliError::TagNotFound(wanted.clone()))?;

    ctx.journal.delete_tag(&ctx.user, &usage.tag.id).await?;
    println!(
        "Deleted #{} (was on {} entries)",
        usage.tag.name, usage.entry_count
    );
    Ok(())
}

async fn run_suggest(ctx: &Context, query: &str, exclude: &[String]) -> Result<(), CliError> {
    let exclude = split_tags(exclude);
    for tag in ctx.journal.suggest_tags(&ctx.user, query, &exclude).await? {
        println!("{}", tag.name);
    }
    Ok(())
}
