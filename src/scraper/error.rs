//! Shared error type for fetching and parsing archive pages.

use thiserror::Error;

/// Every failure while crawling is fatal for the run; variants only classify the cause.
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("Invalid URL: {input}: {reason}")]
    InvalidUrl { input: String, reason: String },

    // Transport
    #[error("Failed to create HTTP client: {source}")]
    ClientBuild { source: reqwest::Error },

    #[error("Network error: could not reach {url}: {source}")]
    Network { url: String, source: reqwest::Error },

    #[error("HTTP {status} when fetching: {url}")]
    HttpStatus {
        status: u16,
        url: String,
        /// Which crawl stage issued the request ("column page", "author page", "book page").
        context: Option<String>,
    },

    #[error("Failed to read response body from {url}: {source}")]
    BodyRead { url: String, source: reqwest::Error },

    // Encoding
    #[error("Unknown character encoding label '{label}'.")]
    UnknownEncoding { label: String },

    #[error("Invalid {encoding} byte sequence in page at {url}")]
    Encoding { url: String, encoding: String },

    // Parsing
    #[error("Could not parse {page} at {url}: {message}")]
    ParsePage {
        page: &'static str,
        url: String,
        message: String,
    },
}

impl ScraperError {
    pub(crate) fn parse(page: &'static str, url: &str, message: impl Into<String>) -> Self {
        ScraperError::ParsePage {
            page,
            url: url.to_string(),
            message: message.into(),
        }
    }
}
