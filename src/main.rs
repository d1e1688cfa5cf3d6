use anyhow::{Context, Result};
use inspscraper::{pipeline, ScrapeConfig, COLUMNS};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

const PREVIEW_ROWS: usize = 5;

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    std::panic::set_hook(Box::new(|info| {
        eprintln!("panic: {:?}", info);
    }));

    // ─── 2) configure ────────────────────────────────────────────────
    let cfg = ScrapeConfig::from_env();
    info!(
        host = %cfg.host,
        first_page = cfg.first_page,
        last_page = cfg.last_page,
        out_dir = %cfg.out_dir.display(),
        mode = %cfg.write_mode,
        strict = cfg.strict,
        "config"
    );

    // ─── 3) scrape + export ──────────────────────────────────────────
    let out = pipeline::run(&cfg).context("scrape run failed")?;

    let report = &out.report;
    info!(
        pages = report.pages,
        extracted = report.rows_extracted,
        dropped = report.rows_dropped,
        skipped = report.rows_skipped,
        records = report.records,
        rejected = report.rejected.len(),
        "run summary"
    );
    for block in &report.rejected {
        warn!(index = block.index, page = ?block.page, fields = ?block.fields, reason = %block.reason, "rejected");
    }

    // ─── 4) preview ──────────────────────────────────────────────────
    println!("{}", COLUMNS.join(" | "));
    for rec in out.table.iter().take(PREVIEW_ROWS) {
        println!("{}", rec.to_fields().join(" | "));
    }
    if out.table.len() > PREVIEW_ROWS {
        println!("… {} more", out.table.len() - PREVIEW_ROWS);
    }
    println!("Wrote {}", out.csv_path.display());

    info!("all done");
    Ok(())
}
