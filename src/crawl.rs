//! Crawl orchestration: columns → authors → books, in discovery order.

use crate::model::{AuthorPage, BookRecord, CrawlResult};
use crate::rate_limit::RateLimiter;
use crate::scraper::aozora::{parse_author_page, parse_book_page, parse_column_page};
use crate::scraper::{Fingerprint, PageSource, ScraperError, SiteRoot, COLUMN_KEYS};
use std::time::Instant;

/// Progress notifications, emitted in crawl order.
#[derive(Debug)]
pub enum CrawlEvent<'a> {
    /// About to fetch a column page. `position` is 1-based.
    Column {
        key: &'a str,
        position: usize,
        total: usize,
    },
    /// Author page parsed; `books` book pages follow.
    Author { name: &'a str, books: usize },
    /// One book recorded under `author`.
    Book {
        author: &'a str,
        record: &'a BookRecord,
    },
}

/// What to crawl and how fast.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Column keys in crawl order.
    pub columns: Vec<String>,
    pub root: SiteRoot,
    pub fingerprint: Fingerprint,
    /// Gates book-detail fetches only.
    pub rate_limiter: RateLimiter,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            columns: COLUMN_KEYS.iter().map(|k| k.to_string()).collect(),
            root: SiteRoot::default(),
            fingerprint: Fingerprint::default(),
            rate_limiter: RateLimiter::default(),
        }
    }
}

/// Sequential crawler over a [PageSource]. Holds no state between runs.
pub struct Crawler<'a, S: PageSource> {
    source: &'a mut S,
    options: CrawlOptions,
}

impl<'a, S: PageSource> Crawler<'a, S> {
    pub fn new(source: &'a mut S, options: CrawlOptions) -> Self {
        Self { source, options }
    }

    /// Author page URLs listed on one column page.
    pub fn author_links(&mut self, column_url: &str) -> Result<Vec<String>, ScraperError> {
        let html = self.source.fetch(column_url, "column page")?;
        parse_column_page(&html, column_url, &self.options.root.author_index_base())
    }

    /// Author name and book URLs from one author page.
    pub fn author_page(&mut self, author_url: &str) -> Result<AuthorPage, ScraperError> {
        let html = self.source.fetch(author_url, "author page")?;
        parse_author_page(
            &html,
            author_url,
            self.options.root.as_str(),
            &self.options.fingerprint,
        )
    }

    /// Metadata from one book-detail page.
    pub fn book_detail(&mut self, book_url: &str) -> Result<BookRecord, ScraperError> {
        let html = self.source.fetch(book_url, "book page")?;
        parse_book_page(&html, book_url, &self.options.fingerprint)
    }

    /// Run the whole crawl. The first error aborts it and nothing collected so far is returned.
    pub fn crawl(
        &mut self,
        progress: Option<&dyn Fn(&CrawlEvent<'_>)>,
    ) -> Result<CrawlResult, ScraperError> {
        let mut result = CrawlResult::new();
        let columns = self.options.columns.clone();
        let total = columns.len();

        for (i, key) in columns.iter().enumerate() {
            if let Some(p) = progress {
                p(&CrawlEvent::Column {
                    key,
                    position: i + 1,
                    total,
                });
            }
            let column_url = self.options.root.column_url(key);
            let authors = self.author_links(&column_url)?;
            tracing::info!(column = %key, authors = authors.len(), "column parsed");

            for author_url in authors {
                let author = self.author_page(&author_url)?;
                if let Some(p) = progress {
                    p(&CrawlEvent::Author {
                        name: &author.name,
                        books: author.book_urls.len(),
                    });
                }
                if result.contains_key(&author.name) {
                    tracing::warn!(
                        author = %author.name,
                        url = %author_url,
                        "author name seen before; replacing earlier books"
                    );
                }
                let mut books = Vec::with_capacity(author.book_urls.len());

                for book_url in &author.book_urls {
                    let start = Instant::now();
                    let record = self.book_detail(book_url)?;
                    let elapsed = start.elapsed();
                    books.push(record);
                    self.options.rate_limiter.wait(elapsed);
                    if let (Some(p), Some(record)) = (progress, books.last()) {
                        p(&CrawlEvent::Book {
                            author: &author.name,
                            record,
                        });
                    }
                }
                result.insert(author.name, books);
            }
        }

        Ok(result)
    }
}
