use std::path::PathBuf;

use anyhow::{Context, Result};
use bdaycal_core::BdayCalConfig;
use bdaycal_core::ics::generate_ics;
use chrono::{NaiveDate, Utc};
use owo_colors::OwoColorize;

use super::{orchestrator, today};

const CALENDAR_NAME: &str = "Birthdays";

pub async fn run(config: &BdayCalConfig, date: Option<NaiveDate>, output: Option<PathBuf>) -> Result<()> {
    let reference = date.unwrap_or_else(today);
    let result = orchestrator(config)?.tick(reference).await?;

    let ics = generate_ics(CALENDAR_NAME, &result.events, Utc::now())?;

    match output {
        Some(path) => {
            std::fs::write(&path, ics)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "{} {} events to {}",
                "Wrote".green(),
                result.events.len(),
                path.display()
            );
        }
        None => print!("{}", ics),
    }

    Ok(())
}
