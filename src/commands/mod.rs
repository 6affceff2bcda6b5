pub mod check;
pub mod export;
pub mod list;
pub mod watch;

use anyhow::{Context, Result};
use bdaycal_core::{BdayCalConfig, RefreshOrchestrator};
use bdaycal_provider_carddav::CardDavClient;
use chrono::NaiveDate;

pub type Orchestrator = RefreshOrchestrator<CardDavClient>;

pub fn orchestrator(config: &BdayCalConfig) -> Result<Orchestrator> {
    let credentials = config
        .credentials()
        .context("Set account_identifier and secret in the config file or BDAYCAL_* environment")?;
    let options = config.refresh_options()?;
    let client = CardDavClient::new()?;

    Ok(RefreshOrchestrator::new(client, credentials, options))
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
