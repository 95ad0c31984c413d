//! Blocking HTTP client that fetches archive pages and decodes them from the site's legacy encoding.

use crate::scraper::error::ScraperError;
use crate::scraper::PageSource;
use encoding_rs::Encoding;
use std::time::Duration;

const DEFAULT_USER_AGENT: &str = "aozorascrape/0.1";
/// The archive serves Shift_JIS regardless of the declared content type.
pub const DEFAULT_ENCODING: &str = "Shift_JIS";

/// Blocking HTTP client: one GET per page, no retry. Pacing is the crawler's job.
#[derive(Debug)]
pub struct ArchiveClient {
    inner: reqwest::blocking::Client,
    encoding: &'static Encoding,
}

impl ArchiveClient {
    /// Build a client with default User-Agent, library-default timeout, and Shift_JIS decoding.
    pub fn new() -> Result<Self, ScraperError> {
        Self::builder().build()
    }

    pub fn builder() -> ArchiveClientBuilder {
        ArchiveClientBuilder::default()
    }

    /// GET `url` and return the decoded body. `context` names the crawl stage for error reports.
    pub fn get_page(&self, url: &str, context: Option<&str>) -> Result<String, ScraperError> {
        tracing::debug!(url, "GET");
        let response = self
            .inner
            .get(url)
            .send()
            .map_err(|e| ScraperError::Network {
                url: url.to_string(),
                source: e,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
                context: context.map(String::from),
            });
        }
        let bytes = response.bytes().map_err(|e| ScraperError::BodyRead {
            url: url.to_string(),
            source: e,
        })?;
        decode_body(&bytes, self.encoding, url)
    }
}

impl PageSource for ArchiveClient {
    fn fetch(&mut self, url: &str, context: &str) -> Result<String, ScraperError> {
        self.get_page(url, Some(context))
    }
}

/// Decode a page body strictly: malformed sequences are an error, not replacement characters.
pub fn decode_body(
    bytes: &[u8],
    encoding: &'static Encoding,
    url: &str,
) -> Result<String, ScraperError> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
        .ok_or_else(|| ScraperError::Encoding {
            url: url.to_string(),
            encoding: encoding.name().to_string(),
        })
}

/// Resolve an encoding label such as `shift_jis` or `euc-jp`.
pub fn encoding_for_label(label: &str) -> Result<&'static Encoding, ScraperError> {
    Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| {
        ScraperError::UnknownEncoding {
            label: label.to_string(),
        }
    })
}

/// Builder for ArchiveClient with optional User-Agent, timeout, and page encoding.
#[derive(Debug, Default)]
pub struct ArchiveClientBuilder {
    user_agent: Option<String>,
    timeout_secs: Option<u64>,
    encoding: Option<String>,
}

impl ArchiveClientBuilder {
    /// Set a custom User-Agent.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Set request timeout in seconds. Unset keeps reqwest's default.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Set the encoding label pages are decoded with. Default Shift_JIS.
    pub fn encoding(mut self, label: impl Into<String>) -> Self {
        self.encoding = Some(label.into());
        self
    }

    pub fn build(self) -> Result<ArchiveClient, ScraperError> {
        let encoding =
            encoding_for_label(self.encoding.as_deref().unwrap_or(DEFAULT_ENCODING))?;
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let mut builder = reqwest::blocking::Client::builder()
            .cookie_store(true)
            .user_agent(user_agent);
        if let Some(secs) = self.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let inner = builder
            .build()
            .map_err(|e| ScraperError::ClientBuild { source: e })?;
        Ok(ArchiveClient { inner, encoding })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_shift_jis_body() -> Result<(), ScraperError> {
        let (bytes, _, had_errors) = encoding_rs::SHIFT_JIS.encode("羅生門　芥川 竜之介");
        assert!(!had_errors);
        let text = decode_body(&bytes, encoding_rs::SHIFT_JIS, "http://example/")?;
        assert_eq!(text, "羅生門　芥川 竜之介");
        Ok(())
    }

    #[test]
    fn malformed_bytes_are_an_encoding_error() {
        // 0x82 is a Shift_JIS lead byte; 0x20 is not a valid trail byte.
        let result = decode_body(&[0x82, 0x20], encoding_rs::SHIFT_JIS, "http://example/a");
        match result {
            Err(ScraperError::Encoding { url, encoding }) => {
                assert_eq!(url, "http://example/a");
                assert_eq!(encoding, "Shift_JIS");
            }
            other => panic!("expected Encoding error, got {:?}", other),
        }
    }

    #[test]
    fn encoding_labels_resolve() -> Result<(), ScraperError> {
        assert_eq!(encoding_for_label("shift_jis")?, encoding_rs::SHIFT_JIS);
        assert_eq!(encoding_for_label(" sjis ")?, encoding_rs::SHIFT_JIS);
        assert_eq!(encoding_for_label("euc-jp")?, encoding_rs::EUC_JP);
        assert!(matches!(
            encoding_for_label("klingon"),
            Err(ScraperError::UnknownEncoding { .. })
        ));
        Ok(())
    }

    #[test]
    fn builder_rejects_unknown_encoding() {
        let result = ArchiveClient::builder().encoding("not-an-encoding").build();
        assert!(matches!(result, Err(ScraperError::UnknownEncoding { .. })));
    }

    #[test]
    fn builder_accepts_custom_settings() {
        let client = ArchiveClient::builder()
            .user_agent("test/1.0")
            .timeout_secs(5)
            .encoding("euc-jp")
            .build();
        assert!(client.is_ok());
    }
}
