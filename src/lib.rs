pub mod config;
pub mod error;
pub mod export;
pub mod fetch;
pub mod pipeline;
pub mod process;
pub mod schema;

pub use config::ScrapeConfig;
pub use error::ScrapeError;
pub use export::WriteMode;
pub use pipeline::{run, scrape, scrape_report, RunOutput, RunReport};
pub use schema::{Record, Table, COLUMNS};
