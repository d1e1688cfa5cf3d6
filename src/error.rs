// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Everything that can stop a scrape run.
///
/// Network and structural faults are fatal; the pipeline never turns them
/// into a partially filled table.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("GET {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("GET {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("page {page}: {detail}")]
    StructuralMismatch { page: u32, detail: String },

    #[error("{rejected} of {total} record blocks rejected (first: {first})")]
    RejectedBlocks {
        rejected: usize,
        total: usize,
        first: String,
    },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("arrow: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

impl ScrapeError {
    /// True for the faults that come from the network rather than the page content.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::HttpStatus { .. })
    }

    /// True when the markup or token stream did not have the expected shape.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::StructuralMismatch { .. } | Self::RejectedBlocks { .. }
        )
    }
}

pub type Result<T, E = ScrapeError> = std::result::Result<T, E>;
