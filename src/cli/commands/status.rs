//! Status command - list tracked entries and their freshness

use crate::cache::{EntryState, EntryStatus, TtlCache};
use crate::cli::args::{OutputFormat, StatusArgs};
use crate::error::CacheResult;
use crate::ui::{self, UiContext};
use console::style;

/// Execute the status command
pub async fn execute(args: StatusArgs, cache: &TtlCache) -> CacheResult<()> {
    let entries = cache.entries().await?;

    match args.format {
        OutputFormat::Table => print_table(cache, &entries),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Plain => print_plain(&entries),
    }

    Ok(())
}

fn print_table(cache: &TtlCache, entries: &[EntryStatus]) {
    let ctx = UiContext::detect();
    let (metadata, blobs) = cache.backends();

    ui::intro(&ctx, "Fragment cache");
    ui::key_value(
        &ctx,
        "enabled",
        if cache.is_enabled() { "yes" } else { "no" },
    );
    ui::key_value(&ctx, "metadata", metadata);
    ui::key_value(&ctx, "blobs", blobs);
    ui::key_value(&ctx, "comment region", cache.comment_region().unwrap_or("-"));
    println!();

    if entries.is_empty() {
        ui::step_info(&ctx, "No tracked entries");
        return;
    }

    println!(
        "{:<32} {:<12} {:<8} {:<20} {:>10}",
        style("KEY").bold(),
        style("REGION").bold(),
        style("STATE").bold(),
        style("REFRESHED").bold(),
        style("AGE").bold()
    );
    println!("{}", "-".repeat(86));

    for entry in entries {
        let state = match entry.state {
            EntryState::Fresh => style("fresh").green(),
            EntryState::Stale => style("stale").yellow(),
            EntryState::Absent => style("absent").dim(),
        };

        let refreshed = entry
            .refreshed_at
            .and_then(|ts| chrono::DateTime::from_timestamp(ts, 0))
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());

        let age = entry
            .age_secs
            .map(format_age)
            .unwrap_or_else(|| "-".to_string());

        println!(
            "{:<32} {:<12} {:<8} {:<20} {:>10}",
            entry.key, entry.region, state, refreshed, age
        );
    }

    println!();
    println!("{} entr{}", entries.len(), if entries.len() == 1 { "y" } else { "ies" });
}

fn print_plain(entries: &[EntryStatus]) {
    for entry in entries {
        println!("{}\t{}", entry.key, entry.state);
    }
}

/// Format an age in seconds as the largest whole unit
fn format_age(secs: i64) -> String {
    if secs < 0 {
        return "future".to_string();
    }

    match secs {
        s if s < 60 => format!("{}s", s),
        s if s < 3_600 => format!("{}m", s / 60),
        s if s < 86_400 => format!("{}h", s / 3_600),
        s => format!("{}d", s / 86_400),
    }
}
