// src/scrape.rs

use futures::{stream, StreamExt};
use tokio::time::Instant;
use tracing::{error, info, instrument, warn};
use url::Url;

use crate::{
    error::Result,
    extract::TableExtractor,
    fetch::PageFetcher,
    record::{Record, Table, Target},
};

/// What came of scraping one target.
#[derive(Debug)]
pub struct TargetOutput {
    pub target: Target,
    pub tables: Result<Vec<Table>>,
}

/// Fetch and extract a single target page.
#[instrument(level = "info", skip(extractor), fields(name = %target.name))]
pub async fn scrape_target<F: PageFetcher>(
    extractor: &TableExtractor<F>,
    target: &Target,
) -> Result<Vec<Table>> {
    info!(link = %target.link, "processing");
    let start = Instant::now();
    let html = extractor.fetcher().fetch(&target.link).await?;
    let page_url = match Url::parse(&target.link) {
        Ok(u) => Some(u),
        Err(e) => {
            warn!(error = %e, "target link is not absolute; relative links will not be followed");
            None
        }
    };
    let tables = extractor.extract_tables(&html, page_url.as_ref()).await;
    info!(
        tables = tables.len(),
        rows = tables.iter().map(Vec::len).sum::<usize>(),
        elapsed = ?start.elapsed(),
        "extracted"
    );
    Ok(tables)
}

/// Scrape every target, at most `concurrency` at a time. Results come back
/// in input order and a failing target never affects the others.
pub async fn scrape_targets<F: PageFetcher>(
    extractor: &TableExtractor<F>,
    targets: Vec<Target>,
    concurrency: usize,
) -> Vec<TargetOutput> {
    stream::iter(targets)
        .map(|target| async move {
            let tables = scrape_target(extractor, &target).await;
            if let Err(e) = &tables {
                error!(name = %target.name, link = %target.link, error = %e, "target failed");
            }
            TargetOutput { target, tables }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await
}

/// Every row of every successfully scraped table, flattened in order.
/// Holdings stay embedded in their rows.
pub fn all_records(outputs: &[TargetOutput]) -> Vec<Record> {
    outputs
        .iter()
        .filter_map(|o| o.tables.as_ref().ok())
        .flatten()
        .flatten()
        .cloned()
        .collect()
}
