// src/process/shape.rs
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::process::clean::TokenRow;
use crate::schema::{Record, Table, COLUMNS};

pub const TOKENS_PER_RECORD: usize = COLUMNS.len();

/// Field count of a clean block: the date carries one comma.
const CLEAN_FIELDS: usize = TOKENS_PER_RECORD + 1;
/// Field count when the name carries a comma as well.
const SPLIT_NAME_FIELDS: usize = TOKENS_PER_RECORD + 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("block split into {found} fields, expected {} or {}", CLEAN_FIELDS, SPLIT_NAME_FIELDS)]
    FieldCount { found: usize },

    #[error("{total} tokens is not a multiple of {}", TOKENS_PER_RECORD)]
    TokenCount { total: usize },
}

/// A restaurant block that could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedBlock {
    pub index: usize,
    pub page: Option<u32>,
    pub fields: Vec<String>,
    pub reason: ShapeError,
}

#[derive(Debug, Clone, Default)]
pub struct Shaped {
    pub table: Table,
    pub rejected: Vec<RejectedBlock>,
}

/// Join a block's tokens with `", "` and re-split on every comma.
pub fn split_fields(tokens: &[String]) -> Vec<String> {
    tokens.join(", ").split(',').map(str::to_string).collect()
}

/// Name repair, then date repair.
///
/// A 9-field block had its name split (`"Restaurant, The"`); the two halves
/// become `"The Restaurant"`. Fields 3 and 4 are always the two halves of the
/// inspection date and become `"Mar 1, 2012"`.
pub fn repair_fields(mut fields: Vec<String>) -> Result<Record, ShapeError> {
    let found = fields.len();
    if found != CLEAN_FIELDS && found != SPLIT_NAME_FIELDS {
        return Err(ShapeError::FieldCount { found });
    }

    if found == SPLIT_NAME_FIELDS {
        fields[0] = format!("{} {}", fields[1].trim(), fields[0].trim());
        fields.remove(1);
    }

    fields[3] = format!("{}, {}", fields[3].trim(), fields[4].trim());
    fields.remove(4);

    Record::from_fields(fields).map_err(|found| ShapeError::FieldCount { found })
}

/// One record per cleaned row. Each row is its own restaurant block, so a
/// malformed row is rejected without shifting the rows after it.
#[instrument(level = "info", skip(rows), fields(rows = rows.len()))]
pub fn shape_rows(rows: &[TokenRow]) -> Shaped {
    let mut shaped = Shaped::default();
    for (index, row) in rows.iter().enumerate() {
        let fields = split_fields(&row.tokens);
        match repair_fields(fields.clone()) {
            Ok(record) => shaped.table.push(record),
            Err(reason) => {
                warn!(index, page = row.page, tokens = row.tokens.len(), %reason, "rejecting block");
                shaped.rejected.push(RejectedBlock {
                    index,
                    page: Some(row.page),
                    fields,
                    reason,
                });
            }
        }
    }
    info!(
        records = shaped.table.len(),
        rejected = shaped.rejected.len(),
        "shaped"
    );
    shaped
}

/// Positional shaping of a flat token stream in chunks of seven.
///
/// Without row boundaries a single restaurant with an extra token shifts
/// every later chunk, so a stream whose length is not a multiple of seven is
/// refused outright.
pub fn shape_flat(tokens: &[String]) -> Result<Shaped, ShapeError> {
    if tokens.len() % TOKENS_PER_RECORD != 0 {
        return Err(ShapeError::TokenCount {
            total: tokens.len(),
        });
    }

    let mut shaped = Shaped::default();
    for (index, chunk) in tokens.chunks(TOKENS_PER_RECORD).enumerate() {
        let fields = split_fields(chunk);
        match repair_fields(fields.clone()) {
            Ok(record) => shaped.table.push(record),
            Err(reason) => shaped.rejected.push(RejectedBlock {
                index,
                page: None,
                fields,
                reason,
            }),
        }
    }
    Ok(shaped)
}
