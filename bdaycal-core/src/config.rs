//! User configuration at ~/.config/bdaycal/config.toml, overlaid by
//! `BDAYCAL_*` environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ::config::builder::DefaultState;
use ::config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;

use crate::constants::{
    CONFIG_DIR_NAME, DEFAULT_DAYS_AHEAD, DEFAULT_ENDPOINT_URL, DEFAULT_SHOW_AGE, DEFAULT_TIMEOUT,
    DEFAULT_UPDATE_INTERVAL, ENV_PREFIX, MAX_DAYS_AHEAD, MIN_DAYS_AHEAD,
};
use crate::credentials::Credentials;
use crate::error::{BdayCalError, BdayCalResult};
use crate::event::{Language, TitleOptions};
use crate::occurrence::LeapDayPolicy;
use crate::refresh::RefreshOptions;

fn default_endpoint_url() -> String {
    DEFAULT_ENDPOINT_URL.to_string()
}

fn default_days_ahead() -> u32 {
    DEFAULT_DAYS_AHEAD
}

fn default_show_age() -> bool {
    DEFAULT_SHOW_AGE
}

/// Everything a refresh needs, as written by the user.
///
/// No `Debug` impl: the struct holds the secret.
#[derive(Deserialize, Clone)]
pub struct BdayCalConfig {
    #[serde(default = "default_endpoint_url")]
    pub endpoint_url: String,

    pub account_identifier: Option<String>,

    pub secret: Option<String>,

    #[serde(default = "default_days_ahead")]
    pub days_ahead: u32,

    #[serde(default = "default_show_age")]
    pub show_age: bool,

    /// Falls back to the process locale
    pub language: Option<Language>,

    #[serde(default)]
    pub leap_day_policy: LeapDayPolicy,

    /// Humantime string, e.g. `30s`
    pub timeout: Option<String>,

    /// Humantime string, e.g. `1h`
    pub update_interval: Option<String>,
}

impl BdayCalConfig {
    pub fn config_path() -> BdayCalResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| BdayCalError::Config("Could not determine config directory".into()))?
            .join(CONFIG_DIR_NAME);

        Ok(config_dir.join("config.toml"))
    }

    /// Load from `path` (or the default location) plus the environment.
    /// A missing file is fine; settings may come from the environment alone.
    pub fn load(path: Option<&Path>) -> BdayCalResult<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::config_path()?,
        };

        let builder = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        Self::from_builder(builder)
    }

    /// Parse a TOML document without touching the filesystem or environment.
    pub fn from_toml_str(toml: &str) -> BdayCalResult<Self> {
        let builder =
            Config::builder().add_source(File::from_str(toml, ::config::FileFormat::Toml));
        Self::from_builder(builder)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> BdayCalResult<Self> {
        let config: BdayCalConfig = builder
            .build()
            .map_err(|e| BdayCalError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| BdayCalError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Range and format checks. Credentials are checked lazily by
    /// [`credentials`](Self::credentials) so that offline commands still work.
    pub fn validate(&self) -> BdayCalResult<()> {
        if !(MIN_DAYS_AHEAD..=MAX_DAYS_AHEAD).contains(&self.days_ahead) {
            return Err(BdayCalError::Config(format!(
                "days_ahead must be between {} and {}, got {}",
                MIN_DAYS_AHEAD, MAX_DAYS_AHEAD, self.days_ahead
            )));
        }

        url_with_scheme(&self.endpoint_url)?;
        self.timeout()?;
        self.update_interval()?;
        Ok(())
    }

    pub fn credentials(&self) -> BdayCalResult<Credentials> {
        let account = non_empty(self.account_identifier.as_deref())
            .ok_or_else(|| BdayCalError::Config("account_identifier is not set".into()))?;
        let secret = non_empty(self.secret.as_deref())
            .ok_or_else(|| BdayCalError::Config("secret is not set".into()))?;

        Ok(Credentials::new(&self.endpoint_url, account, secret))
    }

    pub fn language(&self) -> Language {
        self.language.unwrap_or_else(Language::detect)
    }

    pub fn title_options(&self) -> TitleOptions {
        TitleOptions {
            language: self.language(),
            show_age: self.show_age,
        }
    }

    pub fn timeout(&self) -> BdayCalResult<Duration> {
        parse_duration("timeout", self.timeout.as_deref(), DEFAULT_TIMEOUT)
    }

    pub fn update_interval(&self) -> BdayCalResult<Duration> {
        parse_duration(
            "update_interval",
            self.update_interval.as_deref(),
            DEFAULT_UPDATE_INTERVAL,
        )
    }

    pub fn refresh_options(&self) -> BdayCalResult<RefreshOptions> {
        Ok(RefreshOptions {
            days_ahead: self.days_ahead,
            title: self.title_options(),
            leap_day_policy: self.leap_day_policy,
            timeout: self.timeout()?,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn url_with_scheme(url: &str) -> BdayCalResult<()> {
    if url.starts_with("https://") || url.starts_with("http://") {
        Ok(())
    } else {
        Err(BdayCalError::Config(format!(
            "endpoint_url must start with https:// or http://, got '{}'",
            url
        )))
    }
}

fn parse_duration(field: &str, value: Option<&str>, default: Duration) -> BdayCalResult<Duration> {
    let Some(value) = value else {
        return Ok(default);
    };

    let duration = humantime::parse_duration(value)
        .map_err(|e| BdayCalError::Config(format!("Invalid {}: '{}' ({})", field, value, e)))?;

    if duration.is_zero() {
        return Err(BdayCalError::Config(format!("{} must be greater than zero", field)));
    }
    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BdayCalConfig::from_toml_str("").unwrap();

        assert_eq!(config.endpoint_url, "https://contacts.icloud.com");
        assert_eq!(config.days_ahead, 365);
        assert!(config.show_age);
        assert_eq!(config.leap_day_policy, LeapDayPolicy::Feb28);
        assert_eq!(config.timeout().unwrap(), Duration::from_secs(30));
        assert_eq!(config.update_interval().unwrap(), Duration::from_secs(3600));
    }

    #[test]
    fn test_full_config() {
        let config = BdayCalConfig::from_toml_str(
            r#"
            endpoint_url = "https://dav.example.com"
            account_identifier = "me@example.com"
            secret = "abcd-efgh-ijkl-mnop"
            days_ahead = 30
            show_age = false
            language = "nl"
            leap_day_policy = "mar1"
            timeout = "10s"
            update_interval = "2h"
            "#,
        )
        .unwrap();

        let credentials = config.credentials().unwrap();
        assert_eq!(credentials.endpoint_url, "https://dav.example.com");
        assert_eq!(credentials.account_identifier, "me@example.com");

        let options = config.refresh_options().unwrap();
        assert_eq!(options.days_ahead, 30);
        assert_eq!(options.title.language, Language::Nl);
        assert!(!options.title.show_age);
        assert_eq!(options.leap_day_policy, LeapDayPolicy::Mar1);
        assert_eq!(options.timeout, Duration::from_secs(10));
        assert_eq!(config.update_interval().unwrap(), Duration::from_secs(7200));
    }

    #[test]
    fn test_days_ahead_out_of_range() {
        for days in ["0", "731"] {
            let result = BdayCalConfig::from_toml_str(&format!("days_ahead = {}", days));
            assert!(matches!(result, Err(BdayCalError::Config(_))), "days_ahead = {}", days);
        }
        assert!(BdayCalConfig::from_toml_str("days_ahead = 730").is_ok());
        assert!(BdayCalConfig::from_toml_str("days_ahead = 1").is_ok());
    }

    #[test]
    fn test_missing_credentials_is_config_error() {
        let config = BdayCalConfig::from_toml_str(r#"account_identifier = "me""#).unwrap();
        assert!(matches!(config.credentials(), Err(BdayCalError::Config(_))));

        let blank = BdayCalConfig::from_toml_str(
            r#"
            account_identifier = "me"
            secret = "   "
            "#,
        )
        .unwrap();
        assert!(matches!(blank.credentials(), Err(BdayCalError::Config(_))));
    }

    #[test]
    fn test_invalid_durations() {
        assert!(BdayCalConfig::from_toml_str(r#"timeout = "soon""#).is_err());
        assert!(BdayCalConfig::from_toml_str(r#"timeout = "0s""#).is_err());
    }

    #[test]
    fn test_endpoint_needs_scheme() {
        let result = BdayCalConfig::from_toml_str(r#"endpoint_url = "contacts.icloud.com""#);
        assert!(matches!(result, Err(BdayCalError::Config(_))));
    }

    #[test]
    fn test_unknown_language_rejected() {
        assert!(BdayCalConfig::from_toml_str(r#"language = "fr""#).is_err());
    }
}
