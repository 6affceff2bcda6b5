use anyhow::Result;
use bdaycal_core::{BdayCalConfig, CachedResult};
use chrono::NaiveDate;
use owo_colors::OwoColorize;

use super::{orchestrator, today};

pub async fn run(config: &BdayCalConfig, date: Option<NaiveDate>, json: bool) -> Result<()> {
    let reference = date.unwrap_or_else(today);
    let result = orchestrator(config)?.tick(reference).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result.attributes())?);
        return Ok(());
    }

    print_result(&result);
    Ok(())
}

fn print_result(result: &CachedResult) {
    if result.events.is_empty() {
        println!("{}", "No upcoming dates".dimmed());
        return;
    }

    let mut current_label: Option<String> = None;

    for (event, occurrence) in result.events.iter().zip(&result.occurrences) {
        let label = format_date_label(occurrence.days_until, event.start);

        if current_label.as_ref() != Some(&label) {
            if current_label.is_some() {
                println!();
            }
            println!("{}", label.bold());
            current_label = Some(label);
        }

        let kind = format!("[{}]", event.kind);
        println!("  {} {}", event.title, kind.dimmed());
    }

    let hidden = result.tracked_count - result.total_count;
    if hidden > 0 {
        println!("\n{}", format!("{} more beyond the horizon", hidden).dimmed());
    }
}

/// "Today", "Tomorrow", or e.g. "Sat Mar 15 (in 73 days)"
fn format_date_label(days_until: u32, date: NaiveDate) -> String {
    match days_until {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        n => format!("{} (in {} days)", date.format("%a %b %-d"), n),
    }
}
