// src/process/extract.rs
use scraper::{ElementRef, Html, Node, Selector};
use tracing::{debug, instrument, trace};

use crate::config::ScrapeConfig;
use crate::error::{Result, ScrapeError};
use crate::process::raw_table::RawRow;

/// How the restaurant table body is found on a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableLocator {
    /// N-th `tbody` in document order.
    Ordinal(usize),
    /// First element matching a CSS selector.
    Css(String),
}

impl TableLocator {
    pub fn from_config(cfg: &ScrapeConfig) -> Self {
        match &cfg.table_selector {
            Some(css) => TableLocator::Css(css.clone()),
            None => TableLocator::Ordinal(cfg.tbody_index),
        }
    }
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScrapeError::Parse(format!("selector {css:?}: {e:?}")))
}

/// Every immediate child node of `body`, serialized, in document order.
fn child_rows(body: ElementRef<'_>, page: u32) -> Vec<RawRow> {
    body.children()
        .filter_map(|child| {
            if let Some(el) = ElementRef::wrap(child) {
                return Some(RawRow {
                    page,
                    markup: el.html(),
                    len: el.children().count(),
                });
            }
            match child.value() {
                Node::Text(t) => {
                    let text: &str = &t.text;
                    Some(RawRow {
                        page,
                        markup: text.to_string(),
                        len: text.chars().count(),
                    })
                }
                _ => None,
            }
        })
        .collect()
}

/// Parse one listing page and return the raw rows of its restaurant table,
/// unfiltered.
#[instrument(level = "debug", skip(html, locator), fields(bytes = html.len()))]
pub fn extract_page(html: &str, page: u32, locator: &TableLocator) -> Result<Vec<RawRow>> {
    let doc = Html::parse_document(html);

    let body = match locator {
        TableLocator::Ordinal(index) => {
            let sel = parse_selector("tbody")?;
            let bodies: Vec<ElementRef<'_>> = doc.select(&sel).collect();
            trace!(page, found = bodies.len(), "tbody elements");
            bodies.get(*index).copied().ok_or_else(|| ScrapeError::StructuralMismatch {
                page,
                detail: format!(
                    "expected at least {} tbody elements, found {}",
                    index + 1,
                    bodies.len()
                ),
            })?
        }
        TableLocator::Css(css) => {
            let sel = parse_selector(css)?;
            doc.select(&sel)
                .next()
                .ok_or_else(|| ScrapeError::StructuralMismatch {
                    page,
                    detail: format!("no element matches {css:?}"),
                })?
        }
    };

    let rows = child_rows(body, page);
    debug!(page, rows = rows.len(), "extracted");
    Ok(rows)
}

/// Drop separator rows (length 1). Runs once over the rows of every page.
/// Returns the kept rows and how many were dropped.
pub fn filter_data_rows(rows: Vec<RawRow>) -> (Vec<RawRow>, usize) {
    let total = rows.len();
    let kept: Vec<RawRow> = rows.into_iter().filter(RawRow::is_data).collect();
    let dropped = total - kept.len();
    (kept, dropped)
}

/// Layout of one `tbody`, for diagnosing the table ordinal.
#[derive(Debug, Clone)]
pub struct TbodySummary {
    pub index: usize,
    pub rows: usize,
    pub preview: String,
}

/// Summaries of every `tbody` in the page, in document order.
pub fn describe_tbodies(html: &str) -> Result<Vec<TbodySummary>> {
    let doc = Html::parse_document(html);
    let sel = parse_selector("tbody")?;
    let tr = parse_selector("tr")?;

    Ok(doc
        .select(&sel)
        .enumerate()
        .map(|(index, body)| {
            let preview = body
                .select(&tr)
                .map(|row| row.text().collect::<Vec<_>>().join("|"))
                .find(|t| !t.trim().is_empty())
                .unwrap_or_default()
                .chars()
                .take(80)
                .collect();
            TbodySummary {
                index,
                rows: body.select(&tr).count(),
                preview,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_with_bodies(n: usize, target: usize, target_rows: &str) -> String {
        let mut html = String::from("<html><body>");
        for i in 0..n {
            if i == target {
                html.push_str(&format!("<table><tbody>{target_rows}</tbody></table>"));
            } else {
                html.push_str("<table><tbody><tr><td>nav</td></tr></tbody></table>");
            }
        }
        html.push_str("</body></html>");
        html
    }

    #[test]
    fn picks_the_eighth_tbody() -> anyhow::Result<()> {
        let rows = "<tr><td>A</td><td>B</td></tr><tr><td colspan=\"2\"></td></tr>";
        let html = page_with_bodies(9, 7, rows);
        let out = extract_page(&html, 4, &TableLocator::Ordinal(7))?;
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].page, 4);
        assert_eq!(out[0].len, 2);
        assert!(out[0].markup.starts_with("<tr>"));
        assert!(out[0].markup.contains("<td>A</td>"));
        assert_eq!(out[1].len, 1);
        Ok(())
    }

    #[test]
    fn too_few_tbodies_fails_fast() {
        let html = page_with_bodies(3, 0, "<tr><td>x</td></tr>");
        let err = extract_page(&html, 2, &TableLocator::Ordinal(7)).unwrap_err();
        match err {
            ScrapeError::StructuralMismatch { page, detail } => {
                assert_eq!(page, 2);
                assert!(detail.contains("found 3"), "{detail}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn css_locator_finds_keyed_table() -> anyhow::Result<()> {
        let html = "<table><tbody><tr><td>nav</td></tr></tbody></table>\
                    <table id=\"restaurants\"><tbody><tr><td>A</td><td>B</td><td>C</td></tr></tbody></table>";
        let out = extract_page(html, 1, &TableLocator::Css("#restaurants tbody".into()))?;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].len, 3);

        let missing = extract_page(html, 1, &TableLocator::Css("#nothing".into()));
        assert!(matches!(missing, Err(ScrapeError::StructuralMismatch { .. })));
        Ok(())
    }

    #[test]
    fn whitespace_text_nodes_are_rows_of_their_own() -> anyhow::Result<()> {
        let rows = "<tr><td>A</td><td>B</td></tr>\n<tr><td>C</td><td>D</td></tr>";
        let html = page_with_bodies(1, 0, rows);
        let out = extract_page(&html, 1, &TableLocator::Ordinal(0))?;
        assert_eq!(out.len(), 3);
        assert_eq!(out[1].markup, "\n");
        assert_eq!(out[1].len, 1);
        Ok(())
    }

    #[test]
    fn length_one_rows_are_filtered_after_collection() {
        let rows = vec![
            RawRow { page: 1, markup: "<tr><td>a</td><td>b</td></tr>".into(), len: 2 },
            RawRow { page: 1, markup: "\n".into(), len: 1 },
            RawRow { page: 2, markup: "<tr><td>only</td></tr>".into(), len: 1 },
            RawRow { page: 2, markup: "<tr><td>c</td><td>d</td></tr>".into(), len: 2 },
        ];
        let (kept, dropped) = filter_data_rows(rows);
        assert_eq!(dropped, 2);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].page, 1);
        assert_eq!(kept[1].page, 2);
    }

    #[test]
    fn describe_lists_every_tbody() -> anyhow::Result<()> {
        let html = page_with_bodies(3, 1, "<tr><td>Diner</td><td>Main St</td></tr>");
        let summary = describe_tbodies(&html)?;
        assert_eq!(summary.len(), 3);
        assert_eq!(summary[1].rows, 1);
        assert_eq!(summary[1].preview, "Diner|Main St");
        Ok(())
    }
}
