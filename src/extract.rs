// src/extract.rs

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::{
    error::{Result, ScrapeError},
    fetch::PageFetcher,
    html::{self, RawCell, RawTable},
    link::{same_page, LinkRewrite},
    record::{Cell, Holdings, Record, Table, HOLDINGS_KEY},
    text::{clean_text, HeaderAliases},
};

/// Which rows survive extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowPolicy {
    /// Keep every row that is not an ad; emit every table, even empty ones.
    #[default]
    RetainAll,
    /// Drop rows whose holdings fetch came back empty-handed, and tables
    /// left with no rows.
    RequireHoldings,
}

#[derive(Debug, Clone)]
pub struct ExtractorOptions {
    pub aliases: HeaderAliases,
    pub link_rewrite: LinkRewrite,
    pub row_policy: RowPolicy,
    /// Rows with a link containing this are ads.
    pub ad_marker: String,
    /// Column whose links are dropped in favour of the anchor text.
    pub scheme_name_key: String,
    pub holdings_table_id: String,
}

impl Default for ExtractorOptions {
    fn default() -> Self {
        Self {
            aliases: HeaderAliases::default(),
            link_rewrite: LinkRewrite::default(),
            row_policy: RowPolicy::default(),
            ad_marker: "pubads".to_string(),
            scheme_name_key: "scheme_name".to_string(),
            holdings_table_id: "equityCompleteHoldingTable".to_string(),
        }
    }
}

pub struct TableExtractor<F> {
    fetcher: F,
    opts: ExtractorOptions,
}

impl<F: PageFetcher> TableExtractor<F> {
    pub fn new(fetcher: F, opts: ExtractorOptions) -> Self {
        Self { fetcher, opts }
    }

    pub fn options(&self) -> &ExtractorOptions {
        &self.opts
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Extract every table of a listing page. `page_url`, when known, is
    /// used to resolve relative links before they are followed.
    #[instrument(level = "debug", skip(self, html), fields(html_len = html.len()))]
    pub async fn extract_tables(&self, html: &str, page_url: Option<&Url>) -> Vec<Table> {
        let raw_tables = html::tables(html);
        debug!(tables = raw_tables.len(), "parsed page");

        let mut out = Vec::with_capacity(raw_tables.len());
        for (idx, raw) in raw_tables.iter().enumerate() {
            let keys = self.column_keys(raw);
            let mut table = Table::new();

            for cells in &raw.rows {
                let Some(record) = self.extract_row(&keys, cells, page_url).await else {
                    continue;
                };
                if self.opts.row_policy == RowPolicy::RequireHoldings
                    && record.holdings == Holdings::Unavailable
                {
                    debug!(table = idx, "dropping row without holdings");
                    continue;
                }
                table.push(record);
            }

            if table.is_empty() && self.opts.row_policy == RowPolicy::RequireHoldings {
                continue;
            }
            debug!(table = idx, rows = table.len(), "extracted table");
            out.push(table);
        }
        out
    }

    /// Read the holdings table out of a detail page. Holdings are leaf
    /// data: links are not followed and ads are not filtered.
    pub fn extract_nested_table(&self, html: &str) -> Result<Vec<Record>> {
        let id = &self.opts.holdings_table_id;
        let raw =
            html::table_by_id(html, id).ok_or_else(|| ScrapeError::TableNotFound(id.clone()))?;
        let keys = self.column_keys(&raw);

        Ok(raw
            .rows
            .iter()
            .map(|cells| {
                let mut record = Record::new();
                for (k, cell) in cells.iter().enumerate() {
                    record.insert(column_key(&keys, k), Cell::Plain(clean_text(&cell.text)));
                }
                record
            })
            .collect())
    }

    /// Fetch a holdings page and extract its table. Never fails: any
    /// problem is logged and reported as `Unavailable`.
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch_holdings(&self, url: &str) -> Holdings {
        let result = match self.fetcher.fetch(url).await {
            Ok(body) => self.extract_nested_table(&body),
            Err(e) => Err(e),
        };
        match result {
            Ok(rows) => {
                debug!(rows = rows.len(), "holdings extracted");
                Holdings::Found(rows)
            }
            Err(e) => {
                warn!(%url, error = %e, "no holdings for row");
                Holdings::Unavailable
            }
        }
    }

    fn column_keys(&self, raw: &RawTable) -> Vec<String> {
        raw.headers
            .iter()
            .map(|h| self.opts.aliases.header_key(h))
            .collect()
    }

    fn is_ad(&self, cells: &[RawCell]) -> bool {
        cells.iter().any(|c| {
            c.link
                .as_ref()
                .and_then(|l| l.href.as_deref())
                .is_some_and(|href| href.contains(&self.opts.ad_marker))
        })
    }

    /// Build one record, or `None` for an ad row.
    async fn extract_row(
        &self,
        keys: &[String],
        cells: &[RawCell],
        page_url: Option<&Url>,
    ) -> Option<Record> {
        if self.is_ad(cells) {
            info!("ad detected, skipping row");
            return None;
        }

        let mut record = Record::new();
        for (k, cell) in cells.iter().enumerate() {
            let key = column_key(keys, k);
            let link = cell
                .link
                .as_ref()
                .and_then(|l| l.href.as_deref().map(|href| (href, l.text.as_str())));

            let Some((href, anchor_text)) = link else {
                let text = match &cell.link {
                    Some(l) => clean_text(&l.text),
                    None => clean_text(&cell.text),
                };
                record.insert(key, Cell::Plain(text));
                continue;
            };

            match self.opts.link_rewrite.resolve_and_modify(href, page_url) {
                Ok(target) if page_url.is_some_and(|page| same_page(&target, page)) => {
                    debug!(text = anchor_text, href, "link points back at the listing");
                    record.holdings = Holdings::Unavailable;
                }
                Ok(target) => {
                    debug!(text = anchor_text, %target, "following link");
                    record.holdings = self.fetch_holdings(&target).await;
                }
                Err(e) => {
                    warn!(error = %e, "not following link");
                    record.holdings = Holdings::Unavailable;
                }
            }

            let text = clean_text(anchor_text);
            if key == self.opts.scheme_name_key {
                record.insert(key, Cell::Plain(text));
            } else {
                record.insert(
                    key,
                    Cell::Linked {
                        text,
                        link: href.to_string(),
                    },
                );
            }
        }
        Some(record)
    }
}

/// Header key at `idx`, or `column{idx + 1}` when there is none. A header
/// named like the holdings key gets the column number appended so it cannot
/// shadow the nested holdings.
fn column_key(keys: &[String], idx: usize) -> String {
    match keys.get(idx) {
        Some(k) if k == HOLDINGS_KEY => format!("{}_column{}", k, idx + 1),
        Some(k) if !k.is_empty() => k.clone(),
        _ => format!("column{}", idx + 1),
    }
}
