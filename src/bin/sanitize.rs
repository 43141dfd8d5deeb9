//! sanitize.rs
//!
//! Reconciles scraped records against the scheme registry and writes the
//! four partitions under the output folder:
//!  • `confirmed_data.json`   – exact normalized-name matches
//!  • `unconfirmed_data.json` – best fuzzy matches, ties included
//!  • `not_found.json`        – nothing scored above zero
//!  • `all_data.json`         – confirmed and unconfirmed, input order

use anyhow::Result;
use mfscraper::{
    config::{input_path, read_json, SanitizeConfig, SANITIZE_INPUT_ENV},
    output::write_json,
    scheme::StopWords,
    Reconciler, Record, ReferenceEntry,
};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let input = input_path(SANITIZE_INPUT_ENV, "sanitizeInput.json");
    let cfg: SanitizeConfig = read_json(&input)?;
    let source = cfg.source()?;

    let references: Vec<ReferenceEntry> = read_json(&source.file_location1)?;
    let candidates: Vec<Record> = read_json(&source.file_location2)?;
    info!(
        references = references.len(),
        candidates = candidates.len(),
        "loaded inputs"
    );

    let reconciler = Reconciler::new(&references, StopWords::default());
    let result = reconciler.reconcile(candidates);

    let out = &cfg.output_folder;
    write_json(&out.join("confirmed_data.json"), &result.confirmed().collect::<Vec<_>>())?;
    write_json(&out.join("unconfirmed_data.json"), &result.unconfirmed().collect::<Vec<_>>())?;
    write_json(&out.join("not_found.json"), &result.not_found().collect::<Vec<_>>())?;
    write_json(&out.join("all_data.json"), &result.all_matched().collect::<Vec<_>>())?;

    let s = result.summary();
    info!("Total schemes processed: {}", s.total);
    info!("Confirmed matches: {}", s.confirmed);
    info!("Unconfirmed matches: {}", s.unconfirmed);
    info!("Not found matches: {}", s.not_found);
    Ok(())
}
