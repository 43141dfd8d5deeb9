use anyhow::Result;
use mfscraper::{
    config::{input_path, read_json, ScrapeConfig, SCRAPE_INPUT_ENV},
    output::{target_path, write_json},
    scrape::{all_records, scrape_targets},
    ExtractorOptions, HttpFetcher, TableExtractor,
};
use tokio::time::Instant;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();
    info!("startup");

    // ─── 2) read targets ─────────────────────────────────────────────
    let input = input_path(SCRAPE_INPUT_ENV, "input.json");
    let cfg: ScrapeConfig = read_json(&input)?;
    info!(
        targets = cfg.fetch_data_from.len(),
        policy = ?cfg.row_policy,
        concurrency = cfg.concurrency,
        "loaded {}",
        input.display()
    );

    // ─── 3) scrape every target ──────────────────────────────────────
    let fetcher = HttpFetcher::new(cfg.timeout())?;
    let opts = ExtractorOptions {
        row_policy: cfg.row_policy,
        ..ExtractorOptions::default()
    };
    let extractor = TableExtractor::new(fetcher, opts);
    let start = Instant::now();
    let outputs = scrape_targets(&extractor, cfg.fetch_data_from.clone(), cfg.concurrency).await;

    // ─── 4) write per-target files ───────────────────────────────────
    let mut failed = 0usize;
    for out in &outputs {
        match &out.tables {
            Ok(tables) => {
                let path = target_path(&cfg.output_dir, &out.target.name);
                if let Err(e) = write_json(&path, tables) {
                    error!(name = %out.target.name, "saving failed: {:#}", e);
                }
            }
            Err(_) => failed += 1,
        }
    }

    // ─── 5) write the aggregate ──────────────────────────────────────
    let records = all_records(&outputs);
    write_json(&cfg.output_dir.join("all_mutual_funds.json"), &records)?;

    info!(
        records = records.len(),
        failed_targets = failed,
        elapsed = ?start.elapsed(),
        "all done"
    );
    Ok(())
}
