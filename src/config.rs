// src/config.rs

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Deserialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{extract::RowPolicy, record::Target};

/// Environment variable overriding the scrape input file.
pub const SCRAPE_INPUT_ENV: &str = "MF_INPUT";
/// Environment variable overriding the sanitize input file.
pub const SANITIZE_INPUT_ENV: &str = "MF_SANITIZE_INPUT";

fn default_output_dir() -> PathBuf {
    PathBuf::from("outputs")
}

fn default_sanitize_dir() -> PathBuf {
    PathBuf::from("sanitized_data")
}

fn default_concurrency() -> usize {
    1
}

fn default_timeout_secs() -> u64 {
    30
}

/// Contents of `input.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct ScrapeConfig {
    pub fetch_data_from: Vec<Target>,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub row_policy: RowPolicy,
    /// Targets in flight at once. 1 processes them strictly in sequence.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ScrapeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// One registry/records pair to reconcile.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SanitizeSource {
    /// Reference registry (`[{schemeCode, schemeName}]`).
    pub file_location1: PathBuf,
    /// Scraped records (`all_mutual_funds.json`).
    pub file_location2: PathBuf,
}

/// Contents of `sanitizeInput.json`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SanitizeConfig {
    pub sanitize_data: Vec<SanitizeSource>,
    #[serde(default = "default_sanitize_dir")]
    pub output_folder: PathBuf,
}

impl SanitizeConfig {
    /// The first configured source; later entries are not used.
    pub fn source(&self) -> Result<&SanitizeSource> {
        self.sanitize_data
            .first()
            .context("sanitizeData must list at least one source")
    }
}

/// `$var` if set, else `default`.
pub fn input_path(var: &str, default: &str) -> PathBuf {
    env::var_os(var)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

/// Read and parse a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn scrape_config_defaults() {
        let cfg: ScrapeConfig = serde_json::from_str(
            r#"{"fetch_data_from": [{"name": "Large Cap", "link": "https://mc.test/lc"}]}"#,
        )
        .unwrap();
        assert_eq!(cfg.fetch_data_from.len(), 1);
        assert_eq!(cfg.output_dir, PathBuf::from("outputs"));
        assert_eq!(cfg.row_policy, RowPolicy::RetainAll);
        assert_eq!(cfg.concurrency, 1);
        assert_eq!(cfg.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn scrape_config_overrides() {
        let cfg: ScrapeConfig = serde_json::from_value(serde_json::json!({
            "fetch_data_from": [],
            "row_policy": "require_holdings",
            "concurrency": 3,
            "output_dir": "out"
        }))
        .unwrap();
        assert_eq!(cfg.row_policy, RowPolicy::RequireHoldings);
        assert_eq!(cfg.concurrency, 3);
        assert_eq!(cfg.output_dir, PathBuf::from("out"));
    }

    #[test]
    fn sanitize_config_reads_from_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sanitizeInput.json");
        let mut f = fs::File::create(&path).unwrap();
        write!(
            f,
            r#"{{"sanitizeData": [{{
                "fileLocation1": "./all_mf_scheme.json",
                "fileLocation2": "./outputs/all_mutual_funds.json"
            }}]}}"#
        )
        .unwrap();

        let cfg: SanitizeConfig = read_json(&path).unwrap();
        let src = cfg.source().unwrap();
        assert_eq!(src.file_location1, PathBuf::from("./all_mf_scheme.json"));
        assert_eq!(cfg.output_folder, PathBuf::from("sanitized_data"));
    }

    #[test]
    fn empty_sanitize_sources_are_rejected() {
        let cfg: SanitizeConfig = serde_json::from_str(r#"{"sanitizeData": []}"#).unwrap();
        assert!(cfg.source().is_err());
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = read_json::<ScrapeConfig>(Path::new("/nonexistent/input.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/input.json"));
    }
}
