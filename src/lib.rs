//! aozorascrape: crawls Aozora Bunko index, author, and book pages into a JSON metadata file.

pub mod cli;
pub mod config;
pub mod crawl;
pub mod model;
pub mod output;
pub mod rate_limit;
pub mod scraper;

// Re-exports for CLI and consumers.
pub use crawl::{CrawlEvent, CrawlOptions, Crawler};
pub use model::{AuthorPage, BookRecord, CrawlResult, KanaUsage};
pub use output::{read_json, write_json, OutputError};
pub use rate_limit::RateLimiter;
pub use scraper::{ArchiveClient, ArchiveClientBuilder, PageSource, ScraperError, SiteRoot};
