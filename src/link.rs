// src/link.rs

use tracing::trace;
use url::Url;

use crate::error::{Result, ScrapeError};

/// Rewrites a NAV detail link into the matching portfolio-holdings link:
/// `https://h/mutual-funds/nav/<slug>/<code>` →
/// `https://h/mutual-funds/<slug>/portfolio-holdings/<code>`.
#[derive(Debug, Clone)]
pub struct LinkRewrite {
    /// Path prefix a link must start with to be rewritten.
    pub prefix: String,
    /// Sub-segment removed from the path.
    pub strip: String,
    /// Segment inserted in front of the entity code.
    pub marker: String,
}

impl Default for LinkRewrite {
    fn default() -> Self {
        Self {
            prefix: "/mutual-funds/nav/".to_string(),
            strip: "/nav/".to_string(),
            marker: "portfolio-holdings".to_string(),
        }
    }
}

impl LinkRewrite {
    /// Rewrite `link`, or hand it back unchanged when its path does not
    /// start with the prefix. Query and fragment are dropped on rewrite.
    pub fn modify_link(&self, link: &str) -> Result<String> {
        let url = Url::parse(link).map_err(|source| ScrapeError::LinkTransform {
            link: link.to_string(),
            source,
        })?;

        if !url.path().starts_with(&self.prefix) {
            return Ok(link.to_string());
        }

        let stripped = url.path().replacen(&self.strip, "/", 1);
        let mut segments: Vec<&str> = stripped.split('/').filter(|s| !s.is_empty()).collect();
        let code = segments.pop();
        segments.push(&self.marker);
        segments.extend(code);

        let mut rewritten = url.clone();
        rewritten.set_path(&format!("/{}", segments.join("/")));
        rewritten.set_query(None);
        rewritten.set_fragment(None);
        trace!(from = %link, to = %rewritten, "rewrote link");
        Ok(rewritten.into())
    }

    /// Resolve `href` against `base` (when given) and rewrite it.
    pub fn resolve_and_modify(&self, href: &str, base: Option<&Url>) -> Result<String> {
        match base {
            Some(base) => {
                let absolute = base.join(href).map_err(|source| ScrapeError::LinkTransform {
                    link: href.to_string(),
                    source,
                })?;
                self.modify_link(absolute.as_str())
            }
            None => self.modify_link(href),
        }
    }
}

/// Whether `target` is `page` itself once fragments are ignored, as with
/// `href="#"` or `href=""`.
pub fn same_page(target: &str, page: &Url) -> bool {
    let Ok(mut target) = Url::parse(target) else {
        return false;
    };
    let mut page = page.clone();
    target.set_fragment(None);
    page.set_fragment(None);
    target == page
}
