// src/fetch/mod.rs

pub mod pages;
pub mod urls;

pub use pages::{HttpPageSource, PageSource};
pub use urls::{page_url, page_urls};
