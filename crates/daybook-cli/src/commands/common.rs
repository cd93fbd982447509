use std::env;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use daybook_core::models::{
    split_tag_text, EntryId, JournalEntry, Mood, QuickNote, QuickNoteId, Todo, TodoId, UserId,
};
use daybook_core::search::TodoQuery;
use daybook_core::{JournalService, LocalClock};
use serde::Serialize;

use crate::error::CliError;

const DEFAULT_USER: &str = "local";
const SHORT_ID_LEN: usize = 13;

/// What every command needs: storage, the journal owner and "now" in the local zone.
pub struct Context {
    pub journal: JournalService,
    pub user: UserId,
    pub clock: LocalClock,
}

impl Context {
    pub async fn open(db_path: &Path, user: UserId) -> Result<Self, CliError> {
        Ok(Self {
            journal: JournalService::open_path(db_path).await?,
            user,
            clock: LocalClock::system(),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct EntryListItem {
    pub id: String,
    pub title: String,
    pub preview: String,
    pub mood: Option<Mood>,
    pub is_favorite: bool,
    pub word_count: u32,
    pub tags: Vec<String>,
    pub created_at: i64,
    pub relative_time: String,
}

pub fn entry_to_list_item(entry: &JournalEntry, now_ms: i64) -> EntryListItem {
    EntryListItem {
        id: entry.id.to_string(),
        title: entry.title.clone(),
        preview: preview(&entry.content, 80),
        mood: entry.mood,
        is_favorite: entry.is_favorite,
        word_count: entry.word_count,
        tags: entry.tag_names(),
        created_at: entry.created_at,
        relative_time: format_relative_time(entry.created_at, now_ms),
    }
}

pub fn format_entry_lines(entries: &[JournalEntry], now_ms: i64) -> Vec<String> {
    entries
        .iter()
        .map(|entry| {
            let short_id = short_id(&entry.id.to_string());
            let title = preview(&entry.title, 32);
            let mood = entry.mood.map_or(" ", Mood::emoji);
            let star = if entry.is_favorite { "*" } else { " " };
            let relative_time = format_relative_time(entry.created_at, now_ms);
            let tags = render_tags(&entry.tag_names());

            if tags.is_empty() {
                format!("{short_id:<13} {star} {mood} {title:<32}  {relative_time}")
            } else {
                format!("{short_id:<13} {star} {mood} {title:<32}  {relative_time:<10}  {tags}")
            }
        })
        .collect()
}

pub fn render_tags(names: &[String]) -> String {
    names
        .iter()
        .map(|tag| format!("#{tag}"))
        .collect::<Vec<String>>()
        .join(" ")
}

/// First line with whitespace collapsed, cut to `max_chars` with an ellipsis
pub fn preview(text: &str, max_chars: usize) -> String {
    let first_line = text.lines().next().unwrap_or("").trim();
    let collapsed = first_line.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn short_id(id: &str) -> String {
    id.chars().take(SHORT_ID_LEN).collect()
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn parse_mood(raw: Option<&str>) -> Result<Option<Mood>, CliError> {
    Ok(raw.map(str::parse::<Mood>).transpose()?)
}

/// Flatten repeatable `--tag` values, each of which may hold several names
pub fn split_tags(values: &[String]) -> Vec<String> {
    values.iter().flat_map(|value| split_tag_text(value)).collect()
}

// Lookup by id or unique prefix

pub async fn all_entries(ctx: &Context) -> Result<Vec<JournalEntry>, CliError> {
    const PAGE_SIZE: usize = 500;

    let mut entries = Vec::new();
    let mut offset = 0usize;

    loop {
        let batch = ctx
            .journal
            .list_entries(&ctx.user, PAGE_SIZE, offset)
            .await?;
        let count = batch.len();
        entries.extend(batch);

        if count < PAGE_SIZE {
            break;
        }
        offset += count;
    }

    Ok(entries)
}

pub async fn resolve_entry(ctx: &Context, query: &str) -> Result<JournalEntry, CliError> {
    let query = normalize_identifier(query)?;
    if let Ok(id) = query.parse::<EntryId>() {
        if let Some(entry) = ctx.journal.get_entry(&ctx.user, &id).await? {
            return Ok(entry);
        }
    }

    let entries = all_entries(ctx).await?;
    let entry = resolve_by_prefix(&query, "entry", &entries, |entry| entry.id.to_string())?;
    Ok(entry.clone())
}

pub async fn resolve_note(ctx: &Context, query: &str) -> Result<QuickNote, CliError> {
    let query = normalize_identifier(query)?;
    let notes = ctx.journal.list_notes(&ctx.user, usize::MAX).await?;
    if let Ok(id) = query.parse::<QuickNoteId>() {
        if let Some(note) = notes.iter().find(|note| note.id == id) {
            return Ok(note.clone());
        }
    }
    let note = resolve_by_prefix(&query, "note", &notes, |note| note.id.to_string())?;
    Ok(note.clone())
}

pub async fn resolve_todo(ctx: &Context, query: &str) -> Result<Todo, CliError> {
    let query = normalize_identifier(query)?;
    let todos = ctx
        .journal
        .list_todos(&ctx.user, &TodoQuery::default())
        .await?;
    if let Ok(id) = query.parse::<TodoId>() {
        if let Some(todo) = todos.iter().find(|todo| todo.id == id) {
            return Ok(todo.clone());
        }
    }
    let todo = resolve_by_prefix(&query, "to-do", &todos, |todo| todo.id.to_string())?;
    Ok(todo.clone())
}

/// Pick the single item whose id starts with `query`.
pub fn resolve_by_prefix<'a, T>(
    query: &str,
    kind: &'static str,
    items: &'a [T],
    id_of: impl Fn(&T) -> String,
) -> Result<&'a T, CliError> {
    let query = query.to_ascii_lowercase();
    let matches: Vec<&T> = items
        .iter()
        .filter(|item| id_of(item).starts_with(&query))
        .collect();

    match matches.as_slice() {
        [] => Err(CliError::NotFound {
            kind,
            query: query.clone(),
        }),
        [only] => Ok(*only),
        several => {
            let options = several
                .iter()
                .take(3)
                .map(|item| short_id(&id_of(item)))
                .collect::<Vec<_>>()
                .join(", ");
            Err(CliError::AmbiguousId(format!(
                "ID prefix '{query}' is ambiguous; matches: {options}"
            )))
        }
    }
}

pub fn normalize_identifier(id: &str) -> Result<String, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyId)
    } else {
        Ok(trimmed.to_string())
    }
}

// Text input

/// Text from arguments, else piped stdin, else `$EDITOR`
pub fn resolve_content(content_parts: &[String]) -> Result<String, CliError> {
    if let Some(content) = normalize_content(&content_parts.join(" ")) {
        return Ok(content);
    }

    if let Some(content) = read_piped_stdin()? {
        return Ok(content);
    }

    if let Some(content) = capture_editor_input_with_initial("")? {
        return Ok(content);
    }

    Err(CliError::EmptyContent)
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_content(&buffer))
}

pub fn capture_editor_input_with_initial(
    initial_content: &str,
) -> Result<Option<String>, CliError> {
    let editor = preferred_editor();
    let temp_file = create_temp_file_path();
    std::fs::write(&temp_file, initial_content)?;

    let launch_result = launch_editor(&editor, &temp_file);
    let content = std::fs::read_to_string(&temp_file)?;
    let _ = std::fs::remove_file(&temp_file);

    launch_result?;
    Ok(normalize_content(&content))
}

pub fn launch_editor(editor: &str, file_path: &Path) -> Result<(), CliError> {
    match Command::new(editor).arg(file_path).status() {
        Ok(status) if status.success() => Ok(()),
        Ok(status) => Err(CliError::EditorFailed(format!(
            "`{editor}` exited with status {status}"
        ))),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            // Editor commands with args, e.g. "code --wait"
            let mut parts = editor.split_whitespace();
            let Some(program) = parts.next() else {
                return Err(CliError::EditorFailed("empty EDITOR command".into()));
            };

            let status = Command::new(program).args(parts).arg(file_path).status()?;
            if status.success() {
                Ok(())
            } else {
                Err(CliError::EditorFailed(format!(
                    "`{editor}` exited with status {status}"
                )))
            }
        }
        Err(err) => Err(CliError::Io(err)),
    }
}

pub fn preferred_editor() -> String {
    env::var("VISUAL")
        .or_else(|_| env::var("EDITOR"))
        .unwrap_or_else(|_| default_editor().to_string())
}

pub const fn default_editor() -> &'static str {
    if cfg!(windows) {
        "notepad"
    } else {
        "vi"
    }
}

fn create_temp_file_path() -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_nanos());
    env::temp_dir().join(format!("daybook-{}-{now}.md", std::process::id()))
}

// Global options

pub fn resolve_db_path(cli_db_path: Option<PathBuf>) -> PathBuf {
    cli_db_path
        .or_else(|| env::var_os("DAYBOOK_DB_PATH").map(PathBuf::from))
        .unwrap_or_else(default_db_path)
}

pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("daybook")
        .join("daybook.db")
}

pub fn resolve_user(cli_user: Option<String>) -> Result<UserId, CliError> {
    let name = cli_user
        .or_else(|| env::var("DAYBOOK_USER").ok())
        .and_then(|name| normalize_content(&name))
        .unwrap_or_else(|| DEFAULT_USER.to_string());
    Ok(UserId::new(name)?)
}
