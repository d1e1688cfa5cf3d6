pub mod arrow;
pub mod types;

pub use self::arrow::{parse_inspection_date, table_schema, typed_schema};
pub use self::types::{Record, Table, COLUMNS};
