//! Page fetching and parsing. Shared client, page-source trait, site URLs, and the Aozora parsers.

mod client;
mod error;

pub mod aozora;
pub mod fingerprint;

pub use client::{
    decode_body, encoding_for_label, ArchiveClient, ArchiveClientBuilder, DEFAULT_ENCODING,
};
pub use error::ScraperError;
pub use fingerprint::{Fingerprint, AOZORA};

use reqwest::Url;

pub const DEFAULT_ROOT: &str = "http://www.aozora.gr.jp/";

/// Column index keys, one per kana row, in crawl order.
pub const COLUMN_KEYS: [&str; 10] = ["a", "ka", "sa", "ta", "na", "ha", "ma", "ya", "ra", "wa"];

/// Anything that can return the decoded HTML of a page.
///
/// `context` names the crawl stage ("column page", "author page", "book page") for error reports.
pub trait PageSource {
    fn fetch(&mut self, url: &str, context: &str) -> Result<String, ScraperError>;
}

/// Site root (always ending in `/`) and the URL families derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteRoot {
    root: String,
}

impl SiteRoot {
    /// Validate an absolute http(s) root URL. A missing trailing slash is added.
    pub fn parse(input: &str) -> Result<Self, ScraperError> {
        let url = Url::parse(input).map_err(|e| ScraperError::InvalidUrl {
            input: input.to_string(),
            reason: e.to_string(),
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ScraperError::InvalidUrl {
                input: input.to_string(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }
        let mut root = url.to_string();
        if !root.ends_with('/') {
            root.push('/');
        }
        Ok(Self { root })
    }

    pub fn as_str(&self) -> &str {
        &self.root
    }

    /// `{root}index_pages/person_{key}.html`
    pub fn column_url(&self, key: &str) -> String {
        format!("{}index_pages/person_{}.html", self.root, key)
    }

    /// Directory that column-page author hrefs are relative to.
    pub fn author_index_base(&self) -> String {
        format!("{}index_pages/", self.root)
    }
}

impl Default for SiteRoot {
    fn default() -> Self {
        Self {
            root: DEFAULT_ROOT.to_string(),
        }
    }
}

/// True if `key` is one of [COLUMN_KEYS].
pub fn is_column_key(key: &str) -> bool {
    COLUMN_KEYS.contains(&key)
}
