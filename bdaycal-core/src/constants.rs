use std::time::Duration;

/// iCloud contacts; the endpoint most users of this tool point at.
pub const DEFAULT_ENDPOINT_URL: &str = "https://contacts.icloud.com";

pub const DEFAULT_DAYS_AHEAD: u32 = 365;
pub const MIN_DAYS_AHEAD: u32 = 1;
pub const MAX_DAYS_AHEAD: u32 = 730;

pub const DEFAULT_SHOW_AGE: bool = true;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Nominal refresh cadence for the external scheduler.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(3600);

pub const CONFIG_DIR_NAME: &str = "bdaycal";
pub const ENV_PREFIX: &str = "BDAYCAL";
