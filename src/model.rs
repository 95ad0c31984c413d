//! Records produced by a crawl and written to the JSON output.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Orthographic convention of a digitized text. Exactly one applies to every book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KanaUsage {
    /// Modern kanji, modern kana.
    #[serde(rename = "新字新仮名")]
    Modern,
    /// Modern kanji, historical kana.
    #[serde(rename = "新字旧仮名")]
    SemiModern,
    /// Historical kanji, historical kana. Fallback when no other marker is present.
    #[serde(rename = "旧字旧仮名")]
    Historical,
}

impl KanaUsage {
    pub fn label(self) -> &'static str {
        match self {
            KanaUsage::Modern => "新字新仮名",
            KanaUsage::SemiModern => "新字旧仮名",
            KanaUsage::Historical => "旧字旧仮名",
        }
    }
}

impl fmt::Display for KanaUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Metadata for one work, taken from its book-detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    pub title: String,
    /// Empty when the page has no subtitle row.
    pub subtitle: String,
    pub kana_usage: KanaUsage,
    /// True while the work is still under copyright.
    pub copyright: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_file: Option<String>,
}

/// Author name and the book-detail URLs listed on their page, in page order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorPage {
    pub name: String,
    pub book_urls: Vec<String>,
}

/// Books keyed by author display name. A later author with the same name replaces an earlier one.
pub type CrawlResult = BTreeMap<String, Vec<BookRecord>>;
