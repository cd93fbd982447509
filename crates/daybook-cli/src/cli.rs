use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "daybook")]
#[command(about = "Keep a journal, track streaks and moods from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the local database file (default: $DAYBOOK_DB_PATH, then the platform data dir)
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Journal owner (default: $DAYBOOK_USER, then "local")
    #[arg(long, global = true, value_name = "NAME")]
    pub user: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a new journal entry
    #[command(alias = "new")]
    Add {
        /// Entry title (default: first line of the content)
        #[arg(short, long)]
        title: Option<String>,
        /// Mood: happy, sad, excited, calm, angry, grateful, anxious, motivated
        #[arg(short, long)]
        mood: Option<String>,
        /// Tags, comma or space separated; repeatable
        #[arg(long = "tag", value_name = "TAGS")]
        tags: Vec<String>,
        /// Mark as favorite
        #[arg(long)]
        favorite: bool,
        /// Entry text (stdin or $EDITOR when omitted)
        content: Vec<String>,
    },
    /// List recent entries
    List {
        /// Number of entries to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
        /// Entries to skip
        #[arg(long, default_value = "0")]
        offset: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one entry in full
    Show {
        /// Entry ID or unique ID prefix
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit an entry; opens $EDITOR on the content when no field flag is given
    Edit {
        /// Entry ID or unique ID prefix
        id: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long, conflicts_with = "clear_mood")]
        mood: Option<String>,
        /// Remove the mood
        #[arg(long)]
        clear_mood: bool,
        /// Replace all tags; repeatable
        #[arg(long = "tag", value_name = "TAGS")]
        tags: Option<Vec<String>>,
        /// Replace the content without opening an editor
        #[arg(long)]
        content: Option<String>,
    },
    /// Delete an entry
    Delete {
        /// Entry ID or unique ID prefix
        id: String,
    },
    /// Toggle an entry's favorite flag
    Favorite {
        /// Entry ID or unique ID prefix
        id: String,
    },
    /// Search entries by text, tags, dates, mood or favorites
    Search {
        /// Text to look for in titles and content
        query: Vec<String>,
        /// Entries carrying any of these tags; repeatable
        #[arg(long = "tag", value_name = "TAGS")]
        tags: Vec<String>,
        /// First day (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        from: Option<NaiveDate>,
        /// Last day, inclusive (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        to: Option<NaiveDate>,
        #[arg(short, long)]
        mood: Option<String>,
        /// Only favorites
        #[arg(long)]
        favorites: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Streaks, weekly goal, totals and recent activity
    Stats {
        /// Days per week to aim for
        #[arg(long, default_value = "3")]
        weekly_goal: u32,
        /// Days shown in the activity strip
        #[arg(long, default_value = "30")]
        days: u32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Mood distribution and trend
    Mood {
        /// week, month or year
        #[arg(short, long, default_value = "week")]
        range: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage tags
    Tags {
        #[command(subcommand)]
        command: Option<TagCommands>,
    },
    /// Quick notes scratch pad
    Note {
        #[command(subcommand)]
        command: NoteCommands,
    },
    /// To-do list
    Todo {
        #[command(subcommand)]
        command: TodoCommands,
    },
    /// Export entries to a file
    Export {
        /// json, txt, markdown, csv or html
        #[arg(short, long, default_value = "json")]
        format: String,
        /// all, week, month, year or custom
        #[arg(long, default_value = "all")]
        range: String,
        /// First day of a custom range (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        from: Option<NaiveDate>,
        /// Last day of a custom range, inclusive (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        to: Option<NaiveDate>,
        /// Only entries carrying any of these tags; repeatable
        #[arg(long = "tag", value_name = "TAGS")]
        tags: Vec<String>,
        /// Only entries with this mood
        #[arg(short, long)]
        mood: Option<String>,
        #[arg(long)]
        no_tags: bool,
        #[arg(long)]
        no_mood: bool,
        /// Leave out word counts, reading time and favorites
        #[arg(long)]
        no_stats: bool,
        /// Output path (default: journal_export_<date>.<ext> in the current directory; "-" for stdout)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// File or directory to write to (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
}

#[derive(Subcommand)]
pub enum TagCommands {
    /// List tags with entry counts
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a tag by name; entries keep their other tags
    Delete { name: String },
    /// Suggest existing tags matching a prefix or fragment
    Suggest {
        query: String,
        /// Names to leave out; repeatable
        #[arg(long = "exclude", value_name = "TAGS")]
        exclude: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum NoteCommands {
    /// Jot a quick note
    Add {
        /// Note text (stdin or $EDITOR when omitted)
        content: Vec<String>,
    },
    /// Most recent notes
    List {
        #[arg(short, long, default_value = "10")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit a note; opens $EDITOR when no text is given
    Edit {
        /// Note ID or unique ID prefix
        id: String,
        content: Vec<String>,
    },
    Delete {
        /// Note ID or unique ID prefix
        id: String,
    },
    /// Toggle a note's favorite flag
    Favorite {
        /// Note ID or unique ID prefix
        id: String,
    },
}

#[derive(Subcommand)]
pub enum TodoCommands {
    /// Add a to-do
    Add {
        task: Vec<String>,
        /// Deadline (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        due: Option<NaiveDate>,
    },
    /// List to-dos
    List {
        /// all, completed or pending
        #[arg(long, default_value = "all")]
        status: String,
        /// newest, alphabetical, completed or deadline
        #[arg(long, default_value = "newest")]
        sort: String,
        /// Text to look for in the task
        #[arg(long)]
        search: Option<String>,
        /// Hide completed items
        #[arg(long)]
        hide_completed: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Toggle completion
    Done {
        /// To-do ID or unique ID prefix
        id: String,
    },
    /// Change the task text or deadline
    Edit {
        /// To-do ID or unique ID prefix
        id: String,
        task: Vec<String>,
        #[arg(long, value_name = "DATE", conflicts_with = "no_due")]
        due: Option<NaiveDate>,
        /// Remove the deadline
        #[arg(long)]
        no_due: bool,
    },
    Delete {
        /// To-do ID or unique ID prefix
        id: String,
    },
    /// Totals, overdue count and completion rate
    Summary {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
