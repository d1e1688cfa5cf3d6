// src/fetch/urls.rs
use url::Url;

use crate::config::ScrapeConfig;
use crate::error::{Result, ScrapeError};

/// Listing URL for one page:
/// `<scheme>://<host>/<region>-restaurants/index-<city>-<page>.html`.
pub fn page_url(cfg: &ScrapeConfig, page: u32) -> Result<Url> {
    let raw = format!(
        "{}://{}/{}-restaurants/index-{}-{}.html",
        cfg.scheme, cfg.host, cfg.region, cfg.city, page
    );
    Url::parse(&raw).map_err(|e| ScrapeError::Parse(format!("listing URL {raw}: {e}")))
}

/// Every listing URL of the configured page range, in fetch order.
pub fn page_urls(cfg: &ScrapeConfig) -> Result<Vec<(u32, Url)>> {
    cfg.pages()
        .map(|page| page_url(cfg, page).map(|url| (page, url)))
        .collect()
}
