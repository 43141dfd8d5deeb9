// src/error.rs

use thiserror::Error;

/// Failures the scraping core can report. None of them abort a run: the
/// runner logs target-level errors and the extractor turns row-level
/// errors into `Holdings::Unavailable`.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Network, DNS, timeout or non-2xx response.
    #[error("fetching {url} failed: {reason}")]
    Fetch { url: String, reason: String },

    /// The page loaded but the expected element was not in it.
    #[error("table with id \"{0}\" not found")]
    TableNotFound(String),

    /// A link could not be parsed into an absolute URL.
    #[error("cannot rewrite link {link}: {source}")]
    LinkTransform {
        link: String,
        #[source]
        source: url::ParseError,
    },
}

pub type Result<T, E = ScrapeError> = std::result::Result<T, E>;
