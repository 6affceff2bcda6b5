use std::time::Duration;

use anyhow::Result;
use bdaycal_core::BdayCalConfig;
use owo_colors::OwoColorize;
use tokio::time::{MissedTickBehavior, interval};
use tracing::info;

use super::{Orchestrator, orchestrator, today};

pub async fn run(config: &BdayCalConfig, every: Option<Duration>) -> Result<()> {
    let every = match every {
        Some(every) => every,
        None => config.update_interval()?,
    };
    let orchestrator = orchestrator(config)?;

    info!(interval = %humantime::format_duration(every), "Watching contacts");

    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        // An interrupt during a fetch drops the pass; the cached result is untouched
        tokio::select! {
            _ = &mut ctrl_c => {
                orchestrator.shutdown();
                println!("\n{}", "Stopped".dimmed());
                return Ok(());
            }
            _ = async {
                ticker.tick().await;
                run_tick(&orchestrator).await;
            } => {}
        }
    }
}

/// One attempt; a failure leaves the previous result in place.
async fn run_tick(orchestrator: &Orchestrator) {
    match orchestrator.tick(today()).await {
        Ok(result) => match result.next_event() {
            Some(event) => println!(
                "{} {} on {}",
                "Next:".bold(),
                event.title,
                event.start.format("%a %b %-d")
            ),
            None => println!("{}", "No upcoming dates".dimmed()),
        },
        Err(err) => {
            let diagnostics = orchestrator.diagnostics();
            let stale = orchestrator
                .snapshot()
                .map(|s| format!(", showing data from {}", s.last_successful_fetch.format("%Y-%m-%d %H:%M UTC")))
                .unwrap_or_default();
            eprintln!(
                "{} {} ({} in a row{})",
                "Refresh failed:".red(),
                err,
                diagnostics.consecutive_failures,
                stale
            );
        }
    }
}
