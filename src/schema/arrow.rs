// src/schema/arrow.rs

use arrow::{
    array::{ArrayRef, Date32Builder, Int64Builder, StringArray},
    datatypes::{DataType, Field, Schema, SchemaRef},
    record_batch::RecordBatch,
};
use chrono::NaiveDate;
use std::sync::Arc;

use super::types::{Table, COLUMNS};
use crate::error::Result;
use crate::process::utils::clean_str;

const TEXT_COLUMNS: usize = 3;
const DATE_COLUMN: usize = 3;

/// All seven columns as non-null Utf8, the shape the scrape produces.
pub fn table_schema() -> SchemaRef {
    let fields: Vec<Field> = COLUMNS
        .iter()
        .map(|name| Field::new(*name, DataType::Utf8, false))
        .collect();
    Arc::new(Schema::new(fields))
}

/// Name/Address/City → Utf8, Inspection Date → Date32, counts → Int64.
/// Date and count columns are nullable; cells that fail to parse become null.
pub fn typed_schema() -> SchemaRef {
    let fields: Vec<Field> = COLUMNS
        .iter()
        .enumerate()
        .map(|(i, name)| match i {
            i if i < TEXT_COLUMNS => Field::new(*name, DataType::Utf8, false),
            DATE_COLUMN => Field::new(*name, DataType::Date32, true),
            _ => Field::new(*name, DataType::Int64, true),
        })
        .collect();
    Arc::new(Schema::new(fields))
}

/// Parse `"Mar 1, 2012"` (or `"March 1, 2012"`) into days since the epoch.
pub fn parse_inspection_date(s: &str) -> Option<i32> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?;
    let date = NaiveDate::parse_from_str(clean_str(s).as_str(), "%b %d, %Y").ok()?;
    i32::try_from((date - epoch).num_days()).ok()
}

impl Table {
    fn string_column(&self, idx: usize) -> ArrayRef {
        let values: Vec<&str> = self.iter().map(|r| r.to_fields()[idx]).collect();
        Arc::new(StringArray::from(values)) as ArrayRef
    }

    /// Arrow view of the table, every column as text.
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let cols: Vec<ArrayRef> = (0..COLUMNS.len()).map(|i| self.string_column(i)).collect();
        Ok(RecordBatch::try_new(table_schema(), cols)?)
    }

    /// Arrow view with the date and count columns converted.
    pub fn to_typed_batch(&self) -> Result<RecordBatch> {
        let mut cols: Vec<ArrayRef> = Vec::with_capacity(COLUMNS.len());
        for i in 0..TEXT_COLUMNS {
            cols.push(self.string_column(i));
        }

        let mut dates = Date32Builder::with_capacity(self.len());
        for rec in self {
            dates.append_option(parse_inspection_date(&rec.inspection_date));
        }
        cols.push(Arc::new(dates.finish()) as ArrayRef);

        for i in (DATE_COLUMN + 1)..COLUMNS.len() {
            let mut b = Int64Builder::with_capacity(self.len());
            for rec in self {
                b.append_option(clean_str(rec.to_fields()[i]).parse::<i64>().ok());
            }
            cols.push(Arc::new(b.finish()) as ArrayRef);
        }

        Ok(RecordBatch::try_new(typed_schema(), cols)?)
    }
}
