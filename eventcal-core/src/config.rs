//! Run configuration.
//!
//! Every field has a default, so eventcal runs without a config file. When
//! present, `eventcal.toml` (or the file passed on the command line) overrides
//! the defaults, and `EVENTCAL_*` environment variables override both.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Deserializer};

use crate::constants::*;
use crate::error::{HarvestError, HarvestResult};

fn default_listing_url() -> String {
    DEFAULT_LISTING_URL.to_string()
}

fn default_page_param() -> String {
    DEFAULT_PAGE_PARAM.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_max_pages() -> u32 {
    DEFAULT_MAX_PAGES
}

fn default_true() -> bool {
    true
}

fn default_store_path() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_PATH)
}

fn default_calendar_path() -> PathBuf {
    PathBuf::from(DEFAULT_CALENDAR_PATH)
}

fn default_new_events_calendar_path() -> Option<PathBuf> {
    Some(PathBuf::from(DEFAULT_NEW_EVENTS_CALENDAR_PATH))
}

/// An empty path switches the file off.
fn optional_path<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<PathBuf>, D::Error> {
    let path: Option<PathBuf> = Option::deserialize(deserializer)?;
    Ok(path.filter(|p| !p.as_os_str().is_empty()))
}

fn default_prodid() -> String {
    DEFAULT_PRODID.to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct HarvestConfig {
    /// First listing page. Later pages add `?{page_param}=N`.
    #[serde(default = "default_listing_url")]
    pub listing_url: String,

    #[serde(default = "default_page_param")]
    pub page_param: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Upper bound on listing pages fetched in one run.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Fetch detail pages for events whose listing block has no venue.
    #[serde(default = "default_true")]
    pub resolve_locations: bool,

    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    #[serde(default = "default_calendar_path")]
    pub calendar_path: PathBuf,

    /// Calendar holding only the events first seen in this run. Set to ""
    /// to skip it.
    #[serde(
        default = "default_new_events_calendar_path",
        deserialize_with = "optional_path"
    )]
    pub new_events_calendar_path: Option<PathBuf>,

    #[serde(default = "default_prodid")]
    pub prodid: String,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        HarvestConfig {
            listing_url: default_listing_url(),
            page_param: default_page_param(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            max_pages: default_max_pages(),
            resolve_locations: default_true(),
            store_path: default_store_path(),
            calendar_path: default_calendar_path(),
            new_events_calendar_path: default_new_events_calendar_path(),
            prodid: default_prodid(),
        }
    }
}

impl HarvestConfig {
    /// Load configuration from `path` (or `eventcal.toml` in the working
    /// directory). A missing file falls back to the defaults.
    pub fn load(path: Option<&Path>) -> HarvestResult<Self> {
        let config_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        if path.is_some() && !config_path.exists() {
            return Err(HarvestError::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )));
        }

        let config: HarvestConfig = Config::builder()
            .add_source(File::from(config_path).required(false))
            .add_source(Environment::with_prefix("EVENTCAL").try_parsing(true))
            .build()
            .map_err(|e| HarvestError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| HarvestError::Config(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> HarvestResult<()> {
        url::Url::parse(&self.listing_url)
            .map_err(|e| HarvestError::Config(format!("Invalid listing_url: {e}")))?;

        if self.max_pages == 0 {
            return Err(HarvestError::Config("max_pages must be at least 1".into()));
        }

        if self.timeout_secs == 0 {
            return Err(HarvestError::Config("timeout_secs must be at least 1".into()));
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_default_file_uses_defaults() {
        let config = HarvestConfig::default();
        assert_eq!(config.listing_url, DEFAULT_LISTING_URL);
        assert_eq!(config.max_pages, 10);
        assert_eq!(config.timeout(), Duration::from_secs(15));
        assert!(config.resolve_locations);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eventcal.toml");
        std::fs::write(
            &path,
            "listing_url = \"http://localhost:8080/events/\"\nmax_pages = 3\nresolve_locations = false\n",
        )
        .unwrap();

        let config = HarvestConfig::load(Some(&path)).unwrap();
        assert_eq!(config.listing_url, "http://localhost:8080/events/");
        assert_eq!(config.max_pages, 3);
        assert!(!config.resolve_locations);
        assert_eq!(config.store_path, PathBuf::from(DEFAULT_STORE_PATH));
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_empty_new_events_path_disables_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eventcal.toml");
        std::fs::write(&path, "new_events_calendar_path = \"\"\n").unwrap();

        let config = HarvestConfig::load(Some(&path)).unwrap();
        assert_eq!(config.new_events_calendar_path, None);
        assert_eq!(config.calendar_path, PathBuf::from(DEFAULT_CALENDAR_PATH));
    }

    #[test]
    fn test_new_events_path_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eventcal.toml");
        std::fs::write(&path, "new_events_calendar_path = \"out/neu.ics\"\n").unwrap();

        let config = HarvestConfig::load(Some(&path)).unwrap();
        assert_eq!(
            config.new_events_calendar_path,
            Some(PathBuf::from("out/neu.ics"))
        );
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = HarvestConfig::load(Some(&dir.path().join("nope.toml")));
        assert!(matches!(result, Err(HarvestError::Config(_))));
    }

    #[test]
    fn test_zero_pages_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eventcal.toml");
        std::fs::write(&path, "max_pages = 0\n").unwrap();

        assert!(matches!(
            HarvestConfig::load(Some(&path)),
            Err(HarvestError::Config(_))
        ));
    }
}
