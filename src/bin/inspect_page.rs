use inspscraper::{
    fetch::{page_url, HttpPageSource, PageSource},
    process::{
        clean::tokens_from_markup,
        extract::{describe_tbodies, extract_page, TableLocator},
    },
    ScrapeConfig,
};
use std::{env, fs, path::Path, process::exit};

fn main() {
    // Expect exactly one CLI argument: a page number or a saved HTML file.
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("{}", usage(&args));
        exit(1);
    }
    if let Err(e) = inspect_page(&args[1]) {
        eprintln!("Error: {}", e);
        exit(1);
    }
}

fn usage(args: &[String]) -> String {
    let bin = args.first().map_or("inspect_page", String::as_str);
    format!("Usage: {} <PAGE_NUMBER | HTML_FILE>", bin)
}

/// Load the page, list every tbody, and show what the configured locator picks.
fn inspect_page(arg: &str) -> Result<(), Box<dyn std::error::Error>> {
    let cfg = ScrapeConfig::from_env();

    // 1) Fetch from the site or read from disk.
    let (page, html) = match arg.parse::<u32>() {
        Ok(page) => {
            let url = page_url(&cfg, page)?;
            println!("=== Page {}: {} ===", page, url);
            (page, HttpPageSource::new(&cfg)?.fetch_page(page, &url)?)
        }
        Err(_) => {
            println!("=== File: {} ===", arg);
            (0, fs::read_to_string(Path::new(arg))?)
        }
    };
    println!("Size:                 {} bytes", html.len());
    println!();

    // 2) Every tbody in document order.
    println!("=== Table bodies ===");
    for t in describe_tbodies(&html)? {
        let marker = if t.index == cfg.tbody_index { "*" } else { " " };
        println!("{} #{:<3} rows: {:<4} | {}", marker, t.index, t.rows, t.preview);
    }
    println!();

    // 3) What the pipeline would extract.
    let locator = TableLocator::from_config(&cfg);
    println!("=== Selected ({:?}) ===", locator);
    let rows = extract_page(&html, page, &locator)?;
    for row in rows.iter().filter(|r| r.is_data()).take(5) {
        let tokens = tokens_from_markup(&row.markup);
        println!("- {:>2} tokens | {}", tokens.len(), tokens.join(" | "));
    }
    Ok(())
}
