// src/output.rs

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};
use tracing::info;

static UNSAFE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_\s]").expect("unsafe chars regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// File stem for a target name: `"Large & Mid Cap"` → `"Large_Mid_Cap"`.
pub fn safe_file_name(name: &str) -> String {
    let kept = UNSAFE_CHARS.replace_all(name, "");
    WHITESPACE.replace_all(&kept, "_").into_owned()
}

/// Where a target's tables are written.
pub fn target_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.json", safe_file_name(name)))
}

/// Write `value` as pretty JSON, creating parent directories as needed.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut w = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut w, value)
        .with_context(|| format!("serializing {}", path.display()))?;
    w.flush().with_context(|| format!("flushing {}", path.display()))?;
    info!(path = %path.display(), "wrote");
    Ok(())
}
