// src/process/mod.rs
pub mod clean;
pub mod extract;
pub mod raw_table;
pub mod shape;
pub mod utils;

pub use clean::{clean_rows, CleanReport, RowOutcome, SkipReason, TokenRow};
pub use extract::{extract_page, filter_data_rows, TableLocator};
pub use raw_table::RawRow;
pub use shape::{repair_fields, shape_flat, shape_rows, RejectedBlock, ShapeError, Shaped};
