pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod html;
pub mod link;
pub mod matching;
pub mod output;
pub mod reconcile;
pub mod record;
pub mod scheme;
pub mod scrape;
pub mod text;

pub use error::ScrapeError;
pub use extract::{ExtractorOptions, RowPolicy, TableExtractor};
pub use fetch::{HttpFetcher, PageFetcher};
pub use reconcile::{MatchOutcome, Reconciler, Reconciliation, ReferenceEntry};
pub use record::{Cell, Holdings, Record, Table, Target};
