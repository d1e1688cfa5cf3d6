// src/pipeline.rs
use std::{path::PathBuf, time::Instant};
use tracing::{info, instrument, warn};

use crate::config::ScrapeConfig;
use crate::error::{Result, ScrapeError};
use crate::export::write_csv;
use crate::fetch::{page_urls, HttpPageSource, PageSource};
use crate::process::{
    clean_rows, extract_page, filter_data_rows, shape_rows, RejectedBlock, TableLocator,
};
use crate::schema::Table;

/// Counts from every stage of one run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub pages: usize,
    pub rows_extracted: usize,
    pub rows_dropped: usize,
    pub rows_skipped: usize,
    pub records: usize,
    pub rejected: Vec<RejectedBlock>,
}

pub struct RunOutput {
    pub table: Table,
    pub report: RunReport,
    pub csv_path: PathBuf,
}

/// Fetch, extract, clean and shape every configured page.
///
/// Pages are fetched one at a time, each parsed before the next request.
/// Separator rows are filtered once all pages are in.
#[instrument(level = "info", skip_all, fields(host = %cfg.host, first = cfg.first_page, last = cfg.last_page))]
pub fn scrape_report<S>(cfg: &ScrapeConfig, source: &S) -> Result<(Table, RunReport)>
where
    S: PageSource + ?Sized,
{
    let start = Instant::now();
    let locator = TableLocator::from_config(cfg);
    let mut report = RunReport::default();

    let mut all_rows = Vec::new();
    for (page, url) in page_urls(cfg)? {
        let html = source.fetch_page(page, &url)?;
        let rows = extract_page(&html, page, &locator)?;
        info!(page, rows = rows.len(), "page done");
        all_rows.extend(rows);
        report.pages += 1;
    }
    report.rows_extracted = all_rows.len();

    let (data_rows, dropped) = filter_data_rows(all_rows);
    report.rows_dropped = dropped;

    let cleaned = clean_rows(&data_rows);
    report.rows_skipped = cleaned.skipped();

    let shaped = shape_rows(&cleaned.rows);
    report.records = shaped.table.len();
    report.rejected = shaped.rejected;

    if !report.rejected.is_empty() {
        if cfg.strict {
            let first = &report.rejected[0];
            return Err(ScrapeError::RejectedBlocks {
                rejected: report.rejected.len(),
                total: report.records + report.rejected.len(),
                first: format!(
                    "block {} on page {}: {}",
                    first.index,
                    first.page.map_or_else(|| "?".to_string(), |p| p.to_string()),
                    first.reason
                ),
            });
        }
        warn!(
            rejected = report.rejected.len(),
            "skipping rejected blocks (lenient mode)"
        );
    }

    if shaped.table.is_empty() {
        warn!("no records scraped");
    }
    info!(records = report.records, elapsed = ?start.elapsed(), "scrape complete");
    Ok((shaped.table, report))
}

pub fn scrape<S>(cfg: &ScrapeConfig, source: &S) -> Result<Table>
where
    S: PageSource + ?Sized,
{
    scrape_report(cfg, source).map(|(table, _)| table)
}

/// Scrape over HTTP and write the CSV file.
pub fn run(cfg: &ScrapeConfig) -> Result<RunOutput> {
    let source = HttpPageSource::new(cfg)?;
    let (table, report) = scrape_report(cfg, &source)?;
    let csv_path = write_csv(&table, Some(cfg.out_dir.as_path()), cfg.write_mode)?;
    Ok(RunOutput {
        table,
        report,
        csv_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, collections::HashMap};
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    use url::Url;

    fn init_tracing() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    /// Serves canned pages and remembers the fetch order.
    struct MemorySource {
        pages: HashMap<u32, String>,
        seen: RefCell<Vec<u32>>,
    }

    impl MemorySource {
        fn new(pages: Vec<(u32, String)>) -> Self {
            Self {
                pages: pages.into_iter().collect(),
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl PageSource for MemorySource {
        fn fetch_page(&self, page: u32, url: &Url) -> Result<String> {
            self.seen.borrow_mut().push(page);
            self.pages
                .get(&page)
                .cloned()
                .ok_or_else(|| ScrapeError::HttpStatus {
                    url: url.to_string(),
                    status: 404,
                })
        }
    }

    fn restaurant_row(name: &str, date: &str) -> String {
        let cells = [name, "12 Main St", "Grand Rapids", date, "92", "0", "2"];
        let tds: String = cells.iter().map(|c| format!("<td>{c}</td>")).collect();
        format!("<tr>{tds}</tr>")
    }

    /// Seven navigation tables, then the listing, then a footer table.
    fn listing_page(rows: &[String]) -> String {
        let mut html = String::from("<html><body>");
        for _ in 0..7 {
            html.push_str("<table><tbody><tr><td>nav</td><td>x</td></tr></tbody></table>");
        }
        html.push_str("<table><tbody>\n<tr><th colspan=\"7\">Restaurants</th></tr>\n");
        for r in rows {
            html.push_str(r);
            html.push('\n');
        }
        html.push_str("</tbody></table>");
        html.push_str("<table><tbody><tr><td>footer</td><td>y</td></tr></tbody></table>");
        html.push_str("</body></html>");
        html
    }

    fn two_page_cfg() -> ScrapeConfig {
        ScrapeConfig {
            first_page: 1,
            last_page: 2,
            ..ScrapeConfig::default()
        }
    }

    #[test]
    fn two_pages_give_four_records_in_order() -> anyhow::Result<()> {
        init_tracing();
        let source = MemorySource::new(vec![
            (
                1,
                listing_page(&[
                    restaurant_row("Diner", "Mar 1, 2012"),
                    restaurant_row("Cafe", "Mar 2, 2012"),
                ]),
            ),
            (
                2,
                listing_page(&[
                    restaurant_row("Restaurant, The", "Apr 3, 2012"),
                    restaurant_row("Grill", "Apr 4, 2012"),
                ]),
            ),
        ]);

        let (table, report) = scrape_report(&two_page_cfg(), &source)?;

        assert_eq!(*source.seen.borrow(), vec![1, 2]);
        assert_eq!(table.len(), 4);
        assert_eq!(table.columns().len(), 7);
        assert_eq!(
            table.column("Name"),
            Some(vec!["Diner", "Cafe", "The Restaurant", "Grill"])
        );
        assert_eq!(table.records()[2].inspection_date, "Apr 3, 2012");
        for rec in &table {
            assert!(rec.to_fields().iter().all(|f| !f.is_empty()));
        }

        assert_eq!(report.pages, 2);
        // per page: 4 whitespace nodes, the heading row, 2 restaurants
        assert_eq!(report.rows_extracted, 14);
        assert_eq!(report.rows_dropped, 10);
        assert_eq!(report.records, 4);
        assert!(report.rejected.is_empty());

        let batch = table.to_record_batch()?;
        assert_eq!(batch.num_rows(), 4);
        Ok(())
    }

    fn page_with_broken_row() -> MemorySource {
        // the date cell is "n/a", so the row loses a token
        let broken = restaurant_row("Pizzeria", "n/a");
        MemorySource::new(vec![
            (1, listing_page(&[restaurant_row("Diner", "Mar 1, 2012"), broken])),
            (2, listing_page(&[restaurant_row("Grill", "Apr 4, 2012")])),
        ])
    }

    #[test]
    fn strict_mode_rejects_malformed_runs() {
        let err = scrape(&two_page_cfg(), &page_with_broken_row()).unwrap_err();
        assert!(err.is_structural());
        match err {
            ScrapeError::RejectedBlocks { rejected, total, first } => {
                assert_eq!(rejected, 1);
                assert_eq!(total, 3);
                assert!(first.contains("page 1"), "{first}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn lenient_mode_keeps_good_rows_aligned() -> anyhow::Result<()> {
        let cfg = ScrapeConfig {
            strict: false,
            ..two_page_cfg()
        };
        let (table, report) = scrape_report(&cfg, &page_with_broken_row())?;
        assert_eq!(table.column("Name"), Some(vec!["Diner", "Grill"]));
        assert_eq!(table.records()[1].address, "12 Main St");
        assert_eq!(report.rejected.len(), 1);
        Ok(())
    }

    #[test]
    fn blank_cell_becomes_an_empty_field() -> anyhow::Result<()> {
        let blank = "<tr><td>Diner</td><td>12 Main St</td><td>Grand Rapids</td>\
                     <td>Mar 1, 2012</td><td>92</td><td> </td><td>2</td></tr>"
            .to_string();
        let source = MemorySource::new(vec![(1, listing_page(&[blank]))]);
        let cfg = ScrapeConfig {
            last_page: 1,
            ..ScrapeConfig::default()
        };
        let (table, report) = scrape_report(&cfg, &source)?;
        assert!(report.rejected.is_empty());
        assert_eq!(table.len(), 1);
        let rec = &table.records()[0];
        assert_eq!(rec.inspection_score, "92");
        assert_eq!(rec.critical_violations, "");
        assert_eq!(rec.total_violations, "2");
        Ok(())
    }

    #[test]
    fn network_fault_aborts_the_run() {
        let source = MemorySource::new(vec![(1, listing_page(&[restaurant_row("Diner", "Mar 1, 2012")]))]);
        let cfg = ScrapeConfig {
            last_page: 3,
            ..two_page_cfg()
        };
        let err = scrape(&cfg, &source).unwrap_err();
        assert!(err.is_network());
        assert_eq!(*source.seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn missing_listing_table_is_structural() {
        let source = MemorySource::new(vec![
            (1, "<html><table><tbody><tr><td>a</td></tr></tbody></table></html>".to_string()),
        ]);
        let cfg = ScrapeConfig {
            last_page: 1,
            ..ScrapeConfig::default()
        };
        let err = scrape(&cfg, &source).unwrap_err();
        assert!(matches!(err, ScrapeError::StructuralMismatch { page: 1, .. }));
    }
}
