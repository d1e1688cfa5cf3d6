// src/fetch/pages.rs
use reqwest::blocking::Client;
use std::{thread::sleep, time::Duration};
use tracing::{debug, error, warn};
use url::Url;

use crate::config::ScrapeConfig;
use crate::error::{Result, ScrapeError};

/// Where listing-page HTML comes from. The pipeline only sees this trait, so
/// tests can feed synthetic pages.
pub trait PageSource {
    fn fetch_page(&self, page: u32, url: &Url) -> Result<String>;
}

/// Blocking HTTP source: one GET per page, optional timeout, bounded
/// exponential backoff on transport errors and 5xx responses.
pub struct HttpPageSource {
    client: Client,
    max_retries: u32,
    initial_backoff_ms: u64,
}

impl HttpPageSource {
    pub fn new(cfg: &ScrapeConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("inspscraper/", env!("CARGO_PKG_VERSION")))
            .timeout(cfg.timeout)
            .build()
            .map_err(|source| ScrapeError::Network {
                url: "<client builder>".into(),
                source,
            })?;
        Ok(Self::with_client(client, cfg))
    }

    /// Use a prepared client; retry settings still come from `cfg`.
    pub fn with_client(client: Client, cfg: &ScrapeConfig) -> Self {
        Self {
            client,
            max_retries: cfg.max_retries,
            initial_backoff_ms: cfg.initial_backoff_ms,
        }
    }

    fn get_text_core(&self, url: &Url) -> Result<String> {
        debug!(%url, "fetching");
        let resp = self
            .client
            .get(url.clone())
            .send()
            .map_err(|source| ScrapeError::Network {
                url: url.to_string(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ScrapeError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        resp.text().map_err(|source| ScrapeError::Network {
            url: url.to_string(),
            source,
        })
    }
}

/// Delay before retry number `attempt` (1-based): doubles each time and
/// saturates at `u64::MAX` ms.
fn backoff_delay(initial_ms: u64, attempt: u32) -> u64 {
    let factor = 2u64.checked_pow(attempt.saturating_sub(1)).unwrap_or(u64::MAX);
    initial_ms.saturating_mul(factor)
}

fn is_retryable(err: &ScrapeError) -> bool {
    match err {
        ScrapeError::Network { .. } => true,
        ScrapeError::HttpStatus { status, .. } => *status >= 500,
        _ => false,
    }
}

impl PageSource for HttpPageSource {
    fn fetch_page(&self, page: u32, url: &Url) -> Result<String> {
        let mut attempts = 0;
        loop {
            match self.get_text_core(url) {
                Ok(body) => {
                    debug!(page, bytes = body.len(), "fetched");
                    return Ok(body);
                }
                Err(e) if attempts < self.max_retries && is_retryable(&e) => {
                    attempts += 1;
                    let backoff = backoff_delay(self.initial_backoff_ms, attempts);
                    warn!(page, %url, attempt = attempts, delay_ms = backoff, error = %e, "retrying");
                    sleep(Duration::from_millis(backoff));
                }
                Err(e) => {
                    error!(page, %url, error = %e, "giving up");
                    return Err(e);
                }
            }
        }
    }
}
