use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use daybook_core::export::ExportOptions;

use crate::commands::common::{parse_mood, split_tags, Context};
use crate::error::CliError;

pub struct ExportArgs {
    pub format: String,
    pub range: String,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub tags: Vec<String>,
    pub mood: Option<String>,
    pub no_tags: bool,
    pub no_mood: bool,
    pub no_stats: bool,
}

impl ExportArgs {
    fn into_options(self) -> Result<ExportOptions, CliError> {
        Ok(ExportOptions {
            format: self.format.parse()?,
            date_range: self.range.parse()?,
            start_date: self.from,
            end_date: self.to,
            include_tags: !self.no_tags,
            include_mood: !self.no_mood,
            include_stats: !self.no_stats,
            selected_tags: split_tags(&self.tags),
            mood_filter: parse_mood(self.mood.as_deref())?,
        })
    }
}

/// Render the export and write it; returns where it went (`None` for stdout).
pub async fn run_export(
    ctx: &Context,
    args: ExportArgs,
    output_path: Option<&Path>,
) -> Result<Option<PathBuf>, CliError> {
    let options = args.into_options()?;
    let file = ctx
        .journal
        .export(&ctx.user, &options, &ctx.clock, ctx.user.as_str())
        .await?;

    match output_path {
        Some(path) if path == Path::new("-") => {
            io::stdout().write_all(file.content.as_bytes())?;
            Ok(None)
        }
        Some(path) => {
            std::fs::write(path, &file.content)?;
            println!("{} ({} entries)", path.display(), file.entry_count);
            Ok(Some(path.to_path_buf()))
        }
        None => {
            let path = PathBuf::from(&file.file_name);
            std::fs::write(&path, &file.content)?;
            println!("{} ({} entries)", path.display(), file.entry_count);
            Ok(Some(path))
        }
    }
}
