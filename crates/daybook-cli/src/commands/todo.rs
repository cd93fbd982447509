use chrono::NaiveDate;
use daybook_core::models::{DeadlineStatus, Todo};
use daybook_core::search::TodoQuery;

use crate::cli::TodoCommands;
use crate::commands::common::{
    normalize_content, print_json, resolve_todo, short_id, Context,
};
use crate::error::CliError;

pub async fn run_todo(ctx: &Context, command: TodoCommands) -> Result<(), CliError> {
    match command {
        TodoCommands::Add { task, due } => {
            let task = normalize_content(&task.join(" ")).ok_or(CliError::EmptyContent)?;
            let todo = ctx.journal.create_todo(&ctx.user, &task, due).await?;
            println!("{}", todo.id);
        }
        TodoCommands::List {
            status,
            sort,
            search,
            hide_completed,
            json,
        } => {
            let query = TodoQuery {
                status: status.parse()?,
                search,
                show_completed: !hide_completed,
                sort: sort.parse()?,
            };
            let todos = ctx.journal.list_todos(&ctx.user, &query).await?;
            if json {
                print_json(&todos)?;
            } else {
                let today = ctx.clock.today().date();
                for line in format_todo_lines(&todos, today) {
                    println!("{line}");
                }
            }
        }
        TodoCommands::Done { id } => {
            let todo = resolve_todo(ctx, &id).await?;
            let updated = ctx.journal.toggle_todo(&ctx.user, &todo.id).await?;
            let state = if updated.is_completed { "done" } else { "reopened" };
            println!("{} {state}", updated.id);
        }
        TodoCommands::Edit {
            id,
            task,
            due,
            no_due,
        } => {
            let todo = resolve_todo(ctx, &id).await?;
            let task = normalize_content(&task.join(" ")).unwrap_or_else(|| todo.task.clone());
            let deadline = if no_due { None } else { due.or(todo.deadline) };
            let updated = ctx
                .journal
                .update_todo(&ctx.user, &todo.id, &task, deadline)
                .await?;
            println!("{}", updated.id);
        }
        TodoCommands::Delete { id } => {
            let todo = resolve_todo(ctx, &id).await?;
            ctx.journal.delete_todo(&ctx.user, &todo.id).await?;
            println!("{}", todo.id);
        }
        TodoCommands::Summary { json } => {
            let summary = ctx.journal.todo_summary(&ctx.user, &ctx.clock).await?;
            if json {
                print_json(&summary)?;
            } else {
                println!(
                    "{} total, {} done, {} pending, {} overdue ({}% complete)",
                    summary.total,
                    summary.completed,
                    summary.pending,
                    summary.overdue,
                    summary.completion_rate
                );
            }
        }
    }
    Ok(())
}

pub fn format_todo_lines(todos: &[Todo], today: NaiveDate) -> Vec<String> {
    todos
        .iter()
        .map(|todo| {
            let check = if todo.is_completed { "[x]" } else { "[ ]" };
            let short_id = short_id(&todo.id.to_string());
            let due = match (todo.deadline, todo.deadline_status(today)) {
                (None, _) => String::new(),
                (Some(_), Some(DeadlineStatus::DueToday)) => "  (due today)".to_string(),
                (Some(date), Some(DeadlineStatus::Overdue)) if !todo.is_completed => {
                    format!("  (overdue since {date})")
                }
                (Some(date), _) => format!("  (due {date})"),
            };
            format!("{short_id:<13} {check} {}{due}", todo.task)
        })
        .collect()
}
