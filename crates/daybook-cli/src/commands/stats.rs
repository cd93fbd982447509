use daybook_core::stats::{leading_padding, DashboardOptions, DayCell, MoodRange, MoodTrend};

use crate::commands::common::{print_json, Context};
use crate::error::CliError;

pub async fn run_stats(
    ctx: &Context,
    options: DashboardOptions,
    as_json: bool,
) -> Result<(), CliError> {
    let dashboard = ctx.journal.dashboard(&ctx.user, &ctx.clock, options).await?;
    if as_json {
        return print_json(&dashboard);
    }

    let streaks = &dashboard.streaks;
    let weekly = &dashboard.weekly;
    let totals = &dashboard.totals;
    println!("Current streak:  {}", plural_days(streaks.current_streak));
    println!("Longest streak:  {}", plural_days(streaks.longest_streak));
    println!("Days written:    {}", streaks.total_days);
    println!(
        "This week:       {}/{} ({}%){}",
        weekly.days_written,
        weekly.goal,
        weekly.percent,
        if weekly.is_met { " goal met" } else { "" }
    );
    println!(
        "Entries:         {} ({} this month, {} favorites)",
        totals.total_entries, totals.entries_this_month, totals.favorite_count
    );
    println!(
        "Words:           {} (avg {} per entry)",
        totals.total_words, totals.average_words
    );
    println!();
    for line in render_calendar(&dashboard.calendar) {
        println!("{line}");
    }
    Ok(())
}

fn plural_days(days: u32) -> String {
    if days == 1 {
        "1 day".to_string()
    } else {
        format!("{days} days")
    }
}

/// Week rows starting on Sunday: `#` written, `.` blank, `@`/`o` for today.
pub fn render_calendar(cells: &[DayCell]) -> Vec<String> {
    let mut lines = vec!["S M T W T F S".to_string()];
    let mut row: Vec<&str> = vec![" "; usize::from(leading_padding(cells))];

    for cell in cells {
        row.push(match (cell.has_entry, cell.is_today) {
            (true, true) => "@",
            (false, true) => "o",
            (true, false) => "#",
            (false, false) => ".",
        });
        if row.len() == 7 {
            lines.push(row.join(" "));
            row.clear();
        }
    }
    if !row.is_empty() {
        lines.push(row.join(" "));
    }
    lines
}

pub async fn run_mood(ctx: &Context, range: &str, as_json: bool) -> Result<(), CliError> {
    let range: MoodRange = range.parse()?;
    let report = ctx.journal.mood_report(&ctx.user, range, &ctx.clock).await?;
    if as_json {
        return print_json(&report);
    }

    if report.total == 0 {
        println!("No moods recorded in the last {range}");
        return Ok(());
    }

    for count in &report.counts {
        println!(
            "{} {:<10} {:>4}  {:>3}%",
            count.mood.emoji(),
            count.mood.label(),
            count.count,
            count.percentage
        );
    }
    println!();
    if let Some(mood) = report.most_frequent {
        println!("Most frequent: {} {}", mood.emoji(), mood.label());
    }
    let trend = match report.trend {
        Some(MoodTrend::Improving) => "improving",
        Some(MoodTrend::Declining) => "declining",
        Some(MoodTrend::Stable) => "stable",
        None => "not enough entries",
    };
    println!("Trend: {trend}");
    Ok(())
}
