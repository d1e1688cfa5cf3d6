// src/config.rs

use std::{env, path::PathBuf, str::FromStr, time::Duration};
use tracing::warn;

use crate::export::WriteMode;

pub const DEFAULT_HOST: &str = "www.city-data.com";
pub const DEFAULT_REGION: &str = "kent-county-mi";
pub const DEFAULT_CITY: &str = "grand-rapids";
pub const FIRST_PAGE: u32 = 1;
pub const LAST_PAGE: u32 = 11;

/// Ordinal of the restaurant `tbody` among all `tbody` elements of a listing
/// page. Assumes the site layout puts seven tables ahead of the listing on
/// every page; re-derive it with the `inspect_page` binary if it moves.
pub const RESTAURANT_TBODY_INDEX: usize = 7;

pub const OUTPUT_FILE_NAME: &str = "RestaurantData.txt";

const ENV_PREFIX: &str = "INSPSCRAPER_";

/// All knobs of one scrape run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScrapeConfig {
    pub scheme: String,
    pub host: String,
    pub region: String,
    pub city: String,
    pub first_page: u32,
    pub last_page: u32,

    pub tbody_index: usize,
    /// CSS selector that names the restaurant table body directly. Takes
    /// precedence over `tbody_index` when set.
    pub table_selector: Option<String>,

    pub timeout: Option<Duration>,
    pub max_retries: u32,
    pub initial_backoff_ms: u64,

    pub out_dir: PathBuf,
    pub write_mode: WriteMode,
    /// Fail the run on any rejected record block instead of skipping it.
    pub strict: bool,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            scheme: "http".into(),
            host: DEFAULT_HOST.into(),
            region: DEFAULT_REGION.into(),
            city: DEFAULT_CITY.into(),
            first_page: FIRST_PAGE,
            last_page: LAST_PAGE,
            tbody_index: RESTAURANT_TBODY_INDEX,
            table_selector: None,
            timeout: Some(Duration::from_secs(30)),
            max_retries: 2,
            initial_backoff_ms: 500,
            out_dir: PathBuf::from("."),
            write_mode: WriteMode::AllRecords,
            strict: true,
        }
    }
}

impl ScrapeConfig {
    /// Defaults overlaid with any `INSPSCRAPER_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().overlay(|key| env::var(format!("{ENV_PREFIX}{key}")).ok())
    }

    /// Apply overrides from `lookup`; unparseable values are logged and ignored.
    pub fn overlay<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("SCHEME") {
            self.scheme = v;
        }
        if let Some(v) = lookup("HOST") {
            self.host = v;
        }
        if let Some(v) = lookup("REGION") {
            self.region = v;
        }
        if let Some(v) = lookup("CITY") {
            self.city = v;
        }
        set_parsed(&lookup, "FIRST_PAGE", &mut self.first_page);
        set_parsed(&lookup, "LAST_PAGE", &mut self.last_page);
        set_parsed(&lookup, "TBODY_INDEX", &mut self.tbody_index);
        if let Some(v) = lookup("TABLE_SELECTOR") {
            self.table_selector = Some(v).filter(|s| !s.trim().is_empty());
        }

        let mut timeout_secs = self.timeout.map(|t| t.as_secs()).unwrap_or(0);
        set_parsed(&lookup, "TIMEOUT_SECS", &mut timeout_secs);
        self.timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs));

        set_parsed(&lookup, "MAX_RETRIES", &mut self.max_retries);
        set_parsed(&lookup, "BACKOFF_MS", &mut self.initial_backoff_ms);
        if let Some(v) = lookup("OUT_DIR") {
            self.out_dir = PathBuf::from(v);
        }
        set_parsed(&lookup, "WRITE_MODE", &mut self.write_mode);
        set_parsed(&lookup, "STRICT", &mut self.strict);
        self
    }

    pub fn pages(&self) -> impl Iterator<Item = u32> {
        self.first_page..=self.last_page
    }
}

fn set_parsed<F, T>(lookup: &F, key: &str, slot: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(raw) = lookup(key) {
        match raw.trim().parse() {
            Ok(v) => *slot = v,
            Err(_) => warn!(key, value = %raw, "ignoring unparseable config override"),
        }
    }
}
