//! Daybook CLI - keep a journal from the terminal
//!
//! Entries, quick notes, to-dos, streaks and exports against a local database.

mod cli;
mod commands;
mod error;


use clap::Parser;
use daybook_core::stats::DashboardOptions;

use crate::cli::{Cli, Commands};
use crate::commands::add::{run_add, NewEntry};
use crate::commands::common::{resolve_db_path, resolve_user, Context};
use crate::commands::completions::run_completions;
use crate::commands::delete::run_delete;
use crate::commands::edit::{run_edit, run_favorite, EntryChanges};
use crate::commands::export::{run_export, ExportArgs};
use crate::commands::list::{run_list, run_show};
use crate::commands::note::run_note;
use crate::commands::search::{run_search, SearchArgs};
use crate::commands::stats::{run_mood, run_stats};
use crate::commands::tags::run_tags;
use crate::commands::todo::run_todo;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    if let Commands::Completions { shell, output } = &cli.command {
        run_completions(*shell, output.as_deref())?;
        return Ok(());
    }

    let db_path = resolve_db_path(cli.db_path);
    let user = resolve_user(cli.user)?;
    tracing::debug!(db = %db_path.display(), "Opening journal");
    let ctx = Context::open(&db_path, user).await?;

    match cli.command {
        Commands::Add {
            title,
            mood,
            tags,
            favorite,
            content,
        } => {
            let new = NewEntry {
                title,
                mood,
                tags,
                favorite,
                content,
            };
            run_add(&ctx, new).await?;
        }
        Commands::List {
            limit,
            offset,
            json,
        } => run_list(&ctx, limit, offset, json).await?,
        Commands::Show { id, json } => run_show(&ctx, &id, json).await?,
        Commands::Edit {
            id,
            title,
            mood,
            clear_mood,
            tags,
            content,
        } => {
            let changes = EntryChanges {
                title,
                mood,
                clear_mood,
                tags,
                content,
            };
            run_edit(&ctx, &id, changes).await?;
        }
        Commands::Delete { id } => run_delete(&ctx, &id).await?,
        Commands::Favorite { id } => run_favorite(&ctx, &id).await?,
        Commands::Search {
            query,
            tags,
            from,
            to,
            mood,
            favorites,
            json,
        } => {
            let args = SearchArgs {
                query,
                tags,
                from,
                to,
                mood,
                favorites,
            };
            run_search(&ctx, args, json).await?;
        }
        Commands::Stats {
            weekly_goal,
            days,
            json,
        } => {
            let options = DashboardOptions {
                weekly_goal,
                window_days: days,
            };
            run_stats(&ctx, options, json).await?;
        }
        Commands::Mood { range, json } => run_mood(&ctx, &range, json).await?,
        Commands::Tags { command } => run_tags(&ctx, command).await?,
        Commands::Note { command } => run_note(&ctx, command).await?,
        Commands::Todo { command } => run_todo(&ctx, command).await?,
        Commands::Export {
            format,
            range,
            from,
            to,
            tags,
            mood,
            no_tags,
            no_mood,
            no_stats,
            output,
        } => {
            let args = ExportArgs {
                format,
                range,
                from,
                to,
                tags,
                mood,
                no_tags,
                no_mood,
                no_stats,
            };
            run_export(&ctx, args, output.as_deref()).await?;
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}

fn init_tracing() {
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    for directive in ["daybook=info", "daybook_core=warn"] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
