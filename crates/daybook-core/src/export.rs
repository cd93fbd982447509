//! Journal export: entry selection and the file renderers shared by API and CLI.

use std::fmt::{self, Write as _};
use std::str::FromStr;

use chrono::{DateTime, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{EntryId, JournalEntry, Mood};
use crate::stats::LocalClock;

const EXPORT_TITLE: &str = "My Journal Export";

/// Export output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Txt,
    Markdown,
    Csv,
    /// Printable HTML, meant to be saved as PDF from a browser
    #[serde(alias = "pdf")]
    Html,
}

impl ExportFormat {
    pub const ALL: [Self; 5] = [Self::Json, Self::Txt, Self::Markdown, Self::Csv, Self::Html];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Txt => "txt",
            Self::Markdown => "markdown",
            Self::Csv => "csv",
            Self::Html => "html",
        }
    }

    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Txt => "txt",
            Self::Markdown => "md",
            Self::Csv => "csv",
            Self::Html => "html",
        }
    }

    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Txt => "text/plain",
            Self::Markdown => "text/markdown",
            Self::Csv => "text/csv",
            Self::Html => "text/html",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "txt" | "text" => Ok(Self::Txt),
            "markdown" | "md" => Ok(Self::Markdown),
            "csv" => Ok(Self::Csv),
            "html" | "pdf" => Ok(Self::Html),
            other => Err(Error::InvalidInput(format!("Unknown export format: {other}"))),
        }
    }
}

/// Which entries an export covers, by creation time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateRangePreset {
    #[default]
    All,
    Week,
    Month,
    Year,
    /// Uses `start_date` / `end_date`
    Custom,
}

impl FromStr for DateRangePreset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            "custom" => Ok(Self::Custom),
            other => Err(Error::InvalidInput(format!("Unknown date range: {other}"))),
        }
    }
}

/// Every recognised export option, with the defaults a fresh export dialog shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub format: ExportFormat,
    pub date_range: DateRangePreset,
    /// First local day, custom range only
    pub start_date: Option<NaiveDate>,
    /// Last local day (inclusive), custom range only
    pub end_date: Option<NaiveDate>,
    pub include_tags: bool,
    pub include_mood: bool,
    /// Word count, reading time and favorite flag
    pub include_stats: bool,
    /// Keep entries carrying any of these tags; empty keeps all
    pub selected_tags: Vec<String>,
    pub mood_filter: Option<Mood>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Json,
            date_range: DateRangePreset::All,
            start_date: None,
            end_date: None,
            include_tags: true,
            include_mood: true,
            include_stats: true,
            selected_tags: Vec::new(),
            mood_filter: None,
        }
    }
}

impl ExportOptions {
    /// Inclusive `[start, end]` creation-time bounds in Unix ms.
    ///
    /// Presets only bound the start; entries written after `clock` was taken
    /// are still exported.
    #[must_use]
    pub fn time_bounds(&self, clock: &LocalClock) -> (i64, i64) {
        let today = clock.local_now().date_naive();
        let months_back = |months: u32| {
            today
                .checked_sub_months(Months::new(months))
                .map_or(i64::MIN, |day| clock.start_of_day_ms(day))
        };

        match self.date_range {
            DateRangePreset::All => (i64::MIN, i64::MAX),
            DateRangePreset::Week => {
                let start = clock
                    .local_now()
                    .checked_sub_days(Days::new(7))
                    .map_or(i64::MIN, |start| start.timestamp_millis());
                (start, i64::MAX)
            }
            DateRangePreset::Month => (months_back(1), i64::MAX),
            DateRangePreset::Year => (months_back(12), i64::MAX),
            DateRangePreset::Custom => {
                let start = self
                    .start_date
                    .map_or(i64::MIN, |day| clock.start_of_day_ms(day));
                let end = self
                    .end_date
                    .and_then(|day| day.succ_opt())
                    .map_or(i64::MAX, |next| clock.start_of_day_ms(next) - 1);
                (start, end)
            }
        }
    }

    fn keeps(&self, entry: &JournalEntry, bounds: (i64, i64)) -> bool {
        let (start, end) = bounds;
        if entry.created_at < start || entry.created_at > end {
            return false;
        }
        if self.mood_filter.is_some() && entry.mood != self.mood_filter {
            return false;
        }
        self.selected_tags.is_empty()
            || self
                .selected_tags
                .iter()
                .any(|tag| entry.has_tag(&tag.trim().to_lowercase()))
    }
}

/// Apply range, mood and tag filters and order newest first.
///
/// Fails with [`Error::EmptyExport`] when nothing is left.
pub fn select_entries(
    entries: Vec<JournalEntry>,
    options: &ExportOptions,
    clock: &LocalClock,
) -> Result<Vec<JournalEntry>> {
    let bounds = options.time_bounds(clock);
    let mut selected: Vec<JournalEntry> = entries
        .into_iter()
        .filter(|entry| options.keeps(entry, bounds))
        .collect();
    if selected.is_empty() {
        return Err(Error::EmptyExport);
    }
    selected.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(selected)
}

/// A rendered export, ready to be written or downloaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub mime_type: &'static str,
    pub content: String,
    pub entry_count: usize,
}

/// Select, render and name an export in one step
pub fn export_entries(
    entries: Vec<JournalEntry>,
    options: &ExportOptions,
    clock: &LocalClock,
    user_label: &str,
) -> Result<ExportFile> {
    let selected = select_entries(entries, options, clock)?;
    let content = render_export(&selected, options, clock, user_label)?;
    Ok(ExportFile {
        file_name: export_file_name(options.format, clock),
        mime_type: options.format.mime_type(),
        content,
        entry_count: selected.len(),
    })
}

/// Render already selected entries in `options.format`
pub fn render_export(
    entries: &[JournalEntry],
    options: &ExportOptions,
    clock: &LocalClock,
    user_label: &str,
) -> Result<String> {
    match options.format {
        ExportFormat::Json => render_json(entries, options, clock, user_label),
        ExportFormat::Txt => Ok(render_text(entries, options, clock)),
        ExportFormat::Markdown => Ok(render_markdown(entries, options, clock)),
        ExportFormat::Csv => Ok(render_csv(entries, options)),
        ExportFormat::Html => Ok(render_html(entries, options, clock)),
    }
}

/// `journal_export_<local date>.<ext>`
#[must_use]
pub fn export_file_name(format: ExportFormat, clock: &LocalClock) -> String {
    format!("journal_export_{}.{}", clock.today(), format.extension())
}

#[derive(Serialize)]
struct JsonExport<'a> {
    export_date: String,
    total_entries: usize,
    user: &'a str,
    options: &'a ExportOptions,
    entries: Vec<JsonEntry<'a>>,
}

#[derive(Serialize)]
struct JsonEntry<'a> {
    id: &'a EntryId,
    title: &'a str,
    content: &'a str,
    created_at: String,
    updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<Vec<&'a str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mood: Option<Option<Mood>>,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    stats: Option<JsonStats>,
}

#[derive(Serialize)]
struct JsonStats {
    word_count: u32,
    reading_time: u32,
    is_favorite: bool,
}

fn render_json(
    entries: &[JournalEntry],
    options: &ExportOptions,
    clock: &LocalClock,
    user_label: &str,
) -> Result<String> {
    let document = JsonExport {
        export_date: clock.now().to_rfc3339(),
        total_entries: entries.len(),
        user: user_label,
        options,
        entries: entries
            .iter()
            .map(|entry| JsonEntry {
                id: &entry.id,
                title: &entry.title,
                content: &entry.content,
                created_at: rfc3339(entry.created_at),
                updated_at: rfc3339(entry.updated_at),
                tags: options
                    .include_tags
                    .then(|| entry.tags.iter().map(|tag| tag.name.as_str()).collect()),
                mood: options.include_mood.then_some(entry.mood),
                stats: options.include_stats.then_some(JsonStats {
                    word_count: entry.word_count,
                    reading_time: entry.reading_time,
                    is_favorite: entry.is_favorite,
                }),
            })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

fn render_text(entries: &[JournalEntry], options: &ExportOptions, clock: &LocalClock) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{EXPORT_TITLE}");
    let _ = writeln!(out, "Export Date: {}", display_time(clock, clock.now().timestamp_millis()));
    let _ = writeln!(out, "Total Entries: {}", entries.len());
    let _ = writeln!(out, "\n{}\n", "=".repeat(50));

    for (index, entry) in entries.iter().enumerate() {
        let _ = writeln!(out, "Entry {}: {}", index + 1, entry.title);
        let _ = writeln!(out, "Date: {}", display_time(clock, entry.created_at));
        if let Some(mood) = entry.mood.filter(|_| options.include_mood) {
            let _ = writeln!(out, "Mood: {mood}");
        }
        if options.include_tags && !entry.tags.is_empty() {
            let _ = writeln!(out, "Tags: {}", entry.tag_names().join(", "));
        }
        if options.include_stats {
            let _ = writeln!(
                out,
                "Stats: {} words, {} min read",
                entry.word_count, entry.reading_time
            );
        }
        let _ = writeln!(out, "\n{}", entry.content);
        let _ = writeln!(out, "\n{}\n", "-".repeat(30));
    }
    out
}

fn render_markdown(entries: &[JournalEntry], options: &ExportOptions, clock: &LocalClock) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {EXPORT_TITLE}\n");
    let _ = writeln!(
        out,
        "**Export Date:** {}  ",
        display_time(clock, clock.now().timestamp_millis())
    );
    let _ = writeln!(out, "**Total Entries:** {}\n", entries.len());
    let _ = writeln!(out, "---\n");

    for entry in entries {
        let _ = writeln!(out, "## {}\n", entry.title);
        let _ = writeln!(out, "**Date:** {}  ", display_time(clock, entry.created_at));
        if let Some(mood) = entry.mood.filter(|_| options.include_mood) {
            let _ = writeln!(out, "**Mood:** {} {mood}  ", mood.emoji());
        }
        if options.include_tags && !entry.tags.is_empty() {
            let tags: Vec<String> = entry.tags.iter().map(|tag| format!("`{}`", tag.name)).collect();
            let _ = writeln!(out, "**Tags:** {}  ", tags.join(", "));
        }
        if options.include_stats {
            let favorite = if entry.is_favorite { " ★" } else { "" };
            let _ = writeln!(
                out,
                "**Stats:** {} words, {} min read{favorite}  ",
                entry.word_count, entry.reading_time
            );
        }
        let _ = writeln!(out, "\n{}\n", entry.content);
        let _ = writeln!(out, "---\n");
    }
    out
}

fn render_csv(entries: &[JournalEntry], options: &ExportOptions) -> String {
    let mut headers = vec!["ID", "Title", "Content", "Created At", "Updated At"];
    if options.include_tags {
        headers.push("Tags");
    }
    if options.include_mood {
        headers.push("Mood");
    }
    if options.include_stats {
        headers.extend(["Word Count", "Reading Time", "Is Favorite"]);
    }

    let mut out = headers.join(",");
    out.push_str("\r\n");

    for entry in entries {
        let mut row = vec![
            csv_field(&entry.id.to_string()),
            csv_field(&entry.title),
            csv_field(&entry.content),
            csv_field(&rfc3339(entry.created_at)),
            csv_field(&rfc3339(entry.updated_at)),
        ];
        if options.include_tags {
            row.push(csv_field(&entry.tag_names().join("; ")));
        }
        if options.include_mood {
            row.push(csv_field(entry.mood.map_or("", Mood::as_str)));
        }
        if options.include_stats {
            row.push(entry.word_count.to_string());
            row.push(entry.reading_time.to_string());
            row.push(entry.is_favorite.to_string());
        }
        out.push_str(&row.join(","));
        out.push_str("\r\n");
    }
    out
}

fn render_html(entries: &[JournalEntry], options: &ExportOptions, clock: &LocalClock) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "<!DOCTYPE html>");
    let _ = writeln!(out, "<html>\n<head>\n<meta charset=\"utf-8\">");
    let _ = writeln!(out, "<title>{EXPORT_TITLE}</title>");
    out.push_str(HTML_STYLE);
    let _ = writeln!(out, "</head>\n<body>");
    let _ = writeln!(out, "<div class=\"header\">");
    let _ = writeln!(out, "<h1>{EXPORT_TITLE}</h1>");
    let _ = writeln!(
        out,
        "<p>Export Date: {}</p>",
        display_time(clock, clock.now().timestamp_millis())
    );
    let _ = writeln!(out, "<p>Total Entries: {}</p>", entries.len());
    let _ = writeln!(out, "</div>");

    for entry in entries {
        let _ = writeln!(out, "<div class=\"entry\">");
        let _ = writeln!(out, "<h2 class=\"entry-title\">{}</h2>", escape_html(&entry.title));
        let _ = write!(
            out,
            "<div class=\"entry-meta\"><strong>Date:</strong> {}",
            display_time(clock, entry.created_at)
        );
        if let Some(mood) = entry.mood.filter(|_| options.include_mood) {
            let _ = write!(out, "<br><strong>Mood:</strong> {} {}", mood.emoji(), mood.label());
        }
        if options.include_stats {
            let _ = write!(
                out,
                "<br><strong>Stats:</strong> {} words, {} min read",
                entry.word_count, entry.reading_time
            );
        }
        let _ = writeln!(out, "</div>");
        let body = escape_html(&entry.content).replace('\n', "<br>");
        let _ = writeln!(out, "<div class=\"entry-content\">{body}</div>");
        if options.include_tags && !entry.tags.is_empty() {
            let _ = writeln!(
                out,
                "<div class=\"tags\"><strong>Tags:</strong> {}</div>",
                escape_html(&entry.tag_names().join(", "))
            );
        }
        let _ = writeln!(out, "</div>");
    }
    let _ = writeln!(out, "</body>\n</html>");
    out
}

const HTML_STYLE: &str = "<style>
body { font-family: Arial, sans-serif; line-height: 1.6; margin: 40px; }
.header { text-align: center; border-bottom: 2px solid #333; padding-bottom: 20px; margin-bottom: 30px; }
.entry { margin-bottom: 30px; page-break-inside: avoid; }
.entry-title { font-size: 1.5em; color: #333; margin-bottom: 10px; }
.entry-meta { color: #666; font-size: 0.9em; margin-bottom: 15px; }
.entry-content { margin-bottom: 20px; }
.tags { font-style: italic; color: #007acc; }
@media print { body { margin: 20px; } }
</style>
";

fn rfc3339(timestamp_ms: i64) -> String {
    DateTime::from_timestamp_millis(timestamp_ms)
        .map(|instant| instant.to_rfc3339())
        .unwrap_or_default()
}

fn display_time(clock: &LocalClock, timestamp_ms: i64) -> String {
    clock
        .local_time(timestamp_ms)
        .map(|local| local.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

/// Always quote, doubling embedded quotes
fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
