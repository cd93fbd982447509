use chrono::{NaiveDate, Utc};
use daybook_core::search::EntryFilter;

use crate::commands::common::{
    entry_to_list_item, format_entry_lines, parse_mood, print_json, split_tags, Context,
    EntryListItem,
};
use crate::error::CliError;

pub struct SearchArgs {
    pub query: Vec<String>,
    pub tags: Vec<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub mood: Option<String>,
    pub favorites: bool,
}

impl SearchArgs {
    fn into_filter(self) -> Result<EntryFilter, CliError> {
        let term = self.query.join(" ");
        Ok(EntryFilter {
            search_term: Some(term),
            tags: split_tags(&self.tags),
            start_date: self.from,
            end_date: self.to,
            favorites_only: self.favorites,
            mood: parse_mood(self.mood.as_deref())?,
        })
    }
}

pub async fn run_search(ctx: &Context, args: SearchArgs, as_json: bool) -> Result<(), CliError> {
    let filter = args.into_filter()?;
    let entries = ctx
        .journal
        .search_entries(&ctx.user, filter, &ctx.clock)
        .await?;
    let now_ms = Utc::now().timestamp_millis();

    if as_json {
        let items = entries
            .iter()
            .map(|entry| entry_to_list_item(entry, now_ms))
            .collect::<Vec<EntryListItem>>();
        print_json(&items)?;
    } else if entries.is_empty() {
        println!("No matching entries");
    } else {
        for line in format_entry_lines(&entries, now_ms) {
            println!("{line}");
        }
    }

    Ok(())
}
