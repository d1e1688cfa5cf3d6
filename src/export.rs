// src/export.rs
use csv::{QuoteStyle, WriterBuilder};
use std::{
    fmt,
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::{info, instrument};

use crate::config::OUTPUT_FILE_NAME;
use crate::error::{Result, ScrapeError};
use crate::schema::{Table, COLUMNS};

/// What goes into the CSV file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Only the column-name row.
    HeaderOnly,
    /// Column-name row followed by every record.
    #[default]
    AllRecords,
}

impl FromStr for WriteMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "header" | "header-only" | "header_only" => Ok(WriteMode::HeaderOnly),
            "all" | "all-records" | "all_records" => Ok(WriteMode::AllRecords),
            other => Err(format!("unknown write mode: {other}")),
        }
    }
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteMode::HeaderOnly => f.write_str("header-only"),
            WriteMode::AllRecords => f.write_str("all-records"),
        }
    }
}

/// Write the table as CSV to any writer, every field quoted.
pub fn write_records<W: Write>(w: W, table: &Table, mode: WriteMode) -> Result<()> {
    let mut wtr = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Always)
        .from_writer(w);

    wtr.write_record(COLUMNS)?;
    if mode == WriteMode::AllRecords {
        for rec in table {
            wtr.serialize(rec)?;
        }
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// The CSV text `write_csv` would produce.
pub fn to_csv_string(table: &Table, mode: WriteMode) -> Result<String> {
    let mut buf: Vec<u8> = Vec::new();
    write_records(&mut buf, table, mode)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> ScrapeError {
    let path = path.to_path_buf();
    move |source| ScrapeError::Io { path, source }
}

/// Write `<dir>/RestaurantData.txt` and return its path. `None` means the
/// current directory.
#[instrument(level = "info", skip(table), fields(records = table.len()))]
pub fn write_csv(table: &Table, dir: Option<&Path>, mode: WriteMode) -> Result<PathBuf> {
    let dir = dir.unwrap_or_else(|| Path::new("."));

    if !dir.as_os_str().is_empty() {
        fs::create_dir_all(dir).map_err(io_err(dir))?;
    }
    let path = dir.join(OUTPUT_FILE_NAME);

    let file = File::create(&path).map_err(io_err(&path))?;
    let mut out = BufWriter::new(file);
    write_records(&mut out, table, mode)?;
    out.flush().map_err(io_err(&path))?;

    info!(path = %path.display(), %mode, "wrote csv");
    Ok(path)
}
