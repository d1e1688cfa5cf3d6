// src/process/clean.rs
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, instrument, warn};

use crate::process::raw_table::RawRow;
use crate::process::utils::decode_entities;

/// Text bracketed by a tag end and the next tag start. `.` does not cross
/// newlines, so text spanning lines never matches.
static BRACKETED: Lazy<Regex> = Lazy::new(|| Regex::new(r">.*?<").unwrap());

/// Adjacent close/open tags with nothing between.
const EMPTY_CELL: &str = "><";
const NOT_AVAILABLE: &str = ">n/a<";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Markup was a lone `<tr>` or `</tr>`.
    BareRowTag,
    /// No `>…<` text anywhere in the row.
    NoMatches,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Tokens(Vec<String>),
    Skipped(SkipReason),
}

/// Tokens of one surviving row, tagged with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRow {
    pub page: u32,
    pub tokens: Vec<String>,
}

#[derive(Debug, Default, Clone)]
pub struct CleanReport {
    pub rows: Vec<TokenRow>,
    pub bare_row_tags: usize,
    pub unmatched: usize,
}

impl CleanReport {
    /// Flat token stream in original row order.
    pub fn tokens(&self) -> Vec<String> {
        self.rows
            .iter()
            .flat_map(|r| r.tokens.iter().cloned())
            .collect()
    }

    pub fn skipped(&self) -> usize {
        self.bare_row_tags + self.unmatched
    }
}

fn is_sentinel(bracketed: &str) -> bool {
    bracketed == EMPTY_CELL || bracketed == NOT_AVAILABLE
}

/// Whitespace between two tags that is not the content of a cell, e.g. the
/// gap in `</td> <td>`. A blank `<td> </td>` is still a value.
fn is_layout_gap(markup: &str, m: &regex::Match<'_>) -> bool {
    m.as_str()[1..m.as_str().len() - 1].trim().is_empty()
        && !markup[m.end()..].starts_with("/td")
}

/// Tokens from one bracketed match list, sentinels removed.
pub fn tokens_from_markup(markup: &str) -> Vec<String> {
    BRACKETED
        .find_iter(markup)
        .filter(|m| !is_sentinel(m.as_str()) && !is_layout_gap(markup, m))
        .map(|m| decode_entities(&m.as_str()[1..m.as_str().len() - 1]))
        .collect()
}

pub fn clean_row(row: &RawRow) -> RowOutcome {
    let markup = row.markup.as_str();
    if markup == "<tr>" || markup == "</tr>" {
        return RowOutcome::Skipped(SkipReason::BareRowTag);
    }
    if !BRACKETED.is_match(markup) {
        warn!(page = row.page, markup = %markup.escape_debug(), "row has no bracketed text");
        return RowOutcome::Skipped(SkipReason::NoMatches);
    }
    RowOutcome::Tokens(tokens_from_markup(markup))
}

/// Clean every row, keeping per-row token groups in order.
#[instrument(level = "info", skip(rows), fields(rows = rows.len()))]
pub fn clean_rows(rows: &[RawRow]) -> CleanReport {
    let mut report = CleanReport::default();
    for row in rows {
        match clean_row(row) {
            RowOutcome::Tokens(tokens) => report.rows.push(TokenRow {
                page: row.page,
                tokens,
            }),
            RowOutcome::Skipped(SkipReason::BareRowTag) => report.bare_row_tags += 1,
            RowOutcome::Skipped(SkipReason::NoMatches) => report.unmatched += 1,
        }
    }
    debug!(
        kept = report.rows.len(),
        bare = report.bare_row_tags,
        unmatched = report.unmatched,
        "cleaned"
    );
    report
}
