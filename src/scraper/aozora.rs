//! Aozora Bunko page parsers: column index → author links, author page → book URLs,
//! book card → [BookRecord](crate::model::BookRecord).
//!
//! Each function is pure over the decoded HTML, the page URL, and a [Fingerprint].
//! A missing structural element is a [ScraperError::ParsePage]; the caller aborts the run.

use crate::model::{AuthorPage, BookRecord, KanaUsage};
use crate::scraper::error::ScraperError;
use crate::scraper::fingerprint::Fingerprint;
use scraper::{ElementRef, Html, Selector};

const COLUMN_PAGE: &str = "column page";
const AUTHOR_PAGE: &str = "author page";
const BOOK_PAGE: &str = "book page";

/// Parse a CSS selector or return a parse error (avoids panics from Selector::parse).
fn parse_selector(sel: &str, page: &'static str, url: &str) -> Result<Selector, ScraperError> {
    Selector::parse(sel)
        .map_err(|e| ScraperError::parse(page, url, format!("invalid selector {:?}: {}", sel, e)))
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Author page URLs from every list item of every ordered list on a column page.
///
/// `index_base` is the directory the relative hrefs resolve against (`{root}index_pages/`).
/// Order follows the page; duplicates are kept.
pub fn parse_column_page(
    html: &str,
    url: &str,
    index_base: &str,
) -> Result<Vec<String>, ScraperError> {
    let doc = Html::parse_document(html);
    let ol_sel = parse_selector("ol", COLUMN_PAGE, url)?;
    let li_sel = parse_selector("li", COLUMN_PAGE, url)?;
    let a_sel = parse_selector("a", COLUMN_PAGE, url)?;

    let mut links = Vec::new();
    for list in doc.select(&ol_sel) {
        for item in list.select(&li_sel) {
            let href = item
                .select(&a_sel)
                .next()
                .and_then(|a| a.value().attr("href"))
                .ok_or_else(|| {
                    ScraperError::parse(
                        COLUMN_PAGE,
                        url,
                        format!("list item without author link: {:?}", element_text(item)),
                    )
                })?;
            links.push(format!("{}{}", index_base, href));
        }
    }
    Ok(links)
}

/// Author display name and book-detail URLs from an author page.
///
/// Book links come from the first ordered list only. Items without an anchor href are skipped.
pub fn parse_author_page(
    html: &str,
    url: &str,
    root: &str,
    fp: &Fingerprint,
) -> Result<AuthorPage, ScraperError> {
    let doc = Html::parse_document(html);
    let name_sel = parse_selector(fp.large_text, AUTHOR_PAGE, url)?;
    let ol_sel = parse_selector("ol", AUTHOR_PAGE, url)?;
    let li_sel = parse_selector("li", AUTHOR_PAGE, url)?;
    let a_sel = parse_selector("a", AUTHOR_PAGE, url)?;

    let name = doc
        .select(&name_sel)
        .next()
        .map(element_text)
        .ok_or_else(|| ScraperError::parse(AUTHOR_PAGE, url, "author name not found"))?;

    let list = doc
        .select(&ol_sel)
        .next()
        .ok_or_else(|| ScraperError::parse(AUTHOR_PAGE, url, "book list not found"))?;

    let book_urls = list
        .select(&li_sel)
        .filter_map(|item| {
            item.select(&a_sel)
                .next()
                .and_then(|a| a.value().attr("href"))
        })
        .filter_map(|href| href.get(fp.book_href_skip..))
        .filter(|rest| !rest.is_empty())
        .map(|rest| format!("{}{}", root, rest))
        .collect();

    Ok(AuthorPage { name, book_urls })
}

/// Book metadata from a book-detail (card) page.
pub fn parse_book_page(
    html: &str,
    book_url: &str,
    fp: &Fingerprint,
) -> Result<BookRecord, ScraperError> {
    let doc = Html::parse_document(html);
    let title_block_sel = parse_selector(fp.title_block, BOOK_PAGE, book_url)?;
    let work_block_sel = parse_selector(fp.work_block, BOOK_PAGE, book_url)?;
    let file_row_sel = parse_selector(fp.file_rows, BOOK_PAGE, book_url)?;
    let large_sel = parse_selector(fp.large_text, BOOK_PAGE, book_url)?;
    let tr_sel = parse_selector("tr", BOOK_PAGE, book_url)?;
    let td_sel = parse_selector("td", BOOK_PAGE, book_url)?;
    let a_sel = parse_selector("a", BOOK_PAGE, book_url)?;

    let title_block = doc
        .select(&title_block_sel)
        .next()
        .ok_or_else(|| ScraperError::parse(BOOK_PAGE, book_url, "title data block not found"))?;
    let work_block = doc
        .select(&work_block_sel)
        .next()
        .ok_or_else(|| ScraperError::parse(BOOK_PAGE, book_url, "work data block not found"))?;

    let title = title_block
        .select(&large_sel)
        .next()
        .map(element_text)
        .ok_or_else(|| ScraperError::parse(BOOK_PAGE, book_url, "title not found"))?;

    // Last matching row wins.
    let mut subtitle = String::new();
    for row in title_block.select(&tr_sel) {
        if row.text().collect::<String>().contains(fp.subtitle_label) {
            subtitle = row.select(&td_sel).last().map(element_text).unwrap_or_default();
        }
    }

    let kana_usage = classify_kana_usage(&work_block.text().collect::<String>(), fp);

    let mut html_file = None;
    let mut zip_file = None;
    for row in doc.select(&file_row_sel) {
        let name = row
            .select(&a_sel)
            .next()
            .map(element_text)
            .ok_or_else(|| ScraperError::parse(BOOK_PAGE, book_url, "file row without link"))?;
        let url = file_url(book_url, &name, fp);
        match file_extension(&url) {
            Some("html") => html_file = Some(url),
            Some("zip") => zip_file = Some(url),
            _ => {}
        }
    }

    let copyright = doc
        .root_element()
        .text()
        .collect::<String>()
        .contains(fp.copyright);

    Ok(BookRecord {
        title,
        subtitle,
        kana_usage,
        copyright,
        html_file,
        zip_file,
    })
}

/// Classify by marker precedence: modern, then semi-modern, else historical.
pub fn classify_kana_usage(text: &str, fp: &Fingerprint) -> KanaUsage {
    if text.contains(fp.modern_kana) {
        KanaUsage::Modern
    } else if text.contains(fp.semi_modern_kana) {
        KanaUsage::SemiModern
    } else {
        KanaUsage::Historical
    }
}

/// Download URL for a file listed on a book page: the page's directory, the files segment, the name.
pub fn file_url(book_url: &str, file_name: &str, fp: &Fingerprint) -> String {
    let dir = book_url
        .rsplit_once('/')
        .map(|(dir, _)| dir)
        .unwrap_or(book_url);
    format!("{}/{}{}", dir, fp.files_segment, file_name)
}

/// Extension of the last path segment, without the dot. Dotfiles have none.
fn file_extension(url: &str) -> Option<&str> {
    let name = url.rsplit('/').next()?;
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.trim_start_matches('.').is_empty() => Some(ext),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scraper::fingerprint::AOZORA;

    const ROOT: &str = "http://www.aozora.gr.jp/";
    const INDEX_BASE: &str = "http://www.aozora.gr.jp/index_pages/";
    const BOOK_URL: &str = "http://www.aozora.gr.jp/cards/000879/card127.html";

    fn book_page(work_data: &str, subtitle_row: bool, files: &[&str], extra: &str) -> String {
        let subtitle = if subtitle_row {
            r#"<tr><td class="header">副題：</td><td>ある短編</td></tr>"#
        } else {
            ""
        };
        let rows: String = files
            .iter()
            .map(|f| {
                format!(
                    r#"<tr bgcolor="white"><td><a href="./files/{0}">{0}</a></td><td>1</td></tr>"#,
                    f
                )
            })
            .collect();
        format!(
            r##"<html><body>
<table summary="タイトルデータ">
<tr><td class="header">作品名：</td><td><font size="+2">羅生門</font></td></tr>
{subtitle}
<tr><td class="header">著者名：</td><td><a href="../../index_pages/person879.html">芥川 竜之介</a></td></tr>
</table>
<table summary="作品データ"><tr><td>文字遣い種別：</td><td>{work_data}</td></tr></table>
<table summary="ダウンロードデータ">
<tr bgcolor="#dddddd"><th>ファイル</th><th>改訂回数</th></tr>
{rows}
</table>
{extra}
</body></html>"##
        )
    }

    #[test]
    fn column_page_collects_every_item_of_every_list() -> Result<(), ScraperError> {
        let html = r#"<html><body>
<h2>わ</h2>
<ol><li><a href="person1.html#sakuhin_list_1">若山 牧水</a> (公開中：10)</li>
<li><a href="person2.html#sakuhin_list_1">和辻 哲郎</a></li></ol>
<h2>を</h2>
<ol><li><a href="person1.html#sakuhin_list_1">若山 牧水</a></li></ol>
</body></html>"#;
        let links = parse_column_page(html, "http://example/person_wa.html", INDEX_BASE)?;
        assert_eq!(
            links,
            vec![
                "http://www.aozora.gr.jp/index_pages/person1.html#sakuhin_list_1",
                "http://www.aozora.gr.jp/index_pages/person2.html#sakuhin_list_1",
                "http://www.aozora.gr.jp/index_pages/person1.html#sakuhin_list_1",
            ]
        );
        Ok(())
    }

    #[test]
    fn column_page_item_without_link_is_an_error() {
        let html = "<ol><li>準備中</li></ol>";
        let result = parse_column_page(html, "http://example/person_wa.html", INDEX_BASE);
        assert!(matches!(result, Err(ScraperError::ParsePage { page: COLUMN_PAGE, .. })));
    }

    #[test]
    fn column_page_without_lists_is_empty() -> Result<(), ScraperError> {
        let links = parse_column_page("<p>none</p>", "http://example/", INDEX_BASE)?;
        assert!(links.is_empty());
        Ok(())
    }

    #[test]
    fn author_page_reads_name_and_first_list_only() -> Result<(), ScraperError> {
        let html = r#"<html><body>
<table><tr><td><font size="+2">芥川 竜之介</font></td></tr></table>
<ol>
<li><a href="../cards/000879/card127.html">羅生門</a></li>
<li>作業中の作品（リンクなし）</li>
<li><a href="../cards/000879/card42.html">鼻</a></li>
</ol>
<ol><li><a href="../cards/000879/card99.html">other list</a></li></ol>
</body></html>"#;
        let page = parse_author_page(html, "http://example/person879.html", ROOT, &AOZORA)?;
        assert_eq!(page.name, "芥川 竜之介");
        assert_eq!(
            page.book_urls,
            vec![
                "http://www.aozora.gr.jp/cards/000879/card127.html",
                "http://www.aozora.gr.jp/cards/000879/card42.html",
            ]
        );
        Ok(())
    }

    #[test]
    fn author_page_book_count_matches_items_with_anchor() -> Result<(), ScraperError> {
        let html = r#"<font size="+2">某</font><ol>
<li><a href="../cards/1/card1.html">a</a></li>
<li>no link</li>
<li><a href="../cards/1/card2.html">b</a></li>
<li><span>no link</span></li>
<li><a href="../cards/1/card3.html">c</a></li>
</ol>"#;
        let page = parse_author_page(html, "http://example/", ROOT, &AOZORA)?;
        assert_eq!(page.book_urls.len(), 3);
        Ok(())
    }

    #[test]
    fn author_page_missing_name_or_list_is_an_error() {
        let no_name = r#"<ol><li><a href="../cards/1/card1.html">a</a></li></ol>"#;
        assert!(parse_author_page(no_name, "http://example/", ROOT, &AOZORA).is_err());
        let no_list = r#"<font size="+2">某</font>"#;
        assert!(parse_author_page(no_list, "http://example/", ROOT, &AOZORA).is_err());
    }

    #[test]
    fn book_page_extracts_all_fields() -> Result<(), ScraperError> {
        let html = book_page(
            "新字新仮名",
            true,
            &["127_ruby_150.zip", "127_15260.html"],
            "",
        );
        let book = parse_book_page(&html, BOOK_URL, &AOZORA)?;
        assert_eq!(book.title, "羅生門");
        assert_eq!(book.subtitle, "ある短編");
        assert_eq!(book.kana_usage, KanaUsage::Modern);
        assert!(!book.copyright);
        assert_eq!(
            book.zip_file.as_deref(),
            Some("http://www.aozora.gr.jp/cards/000879/files/127_ruby_150.zip")
        );
        assert_eq!(
            book.html_file.as_deref(),
            Some("http://www.aozora.gr.jp/cards/000879/files/127_15260.html")
        );
        Ok(())
    }

    #[test]
    fn book_page_without_subtitle_row_has_empty_subtitle() -> Result<(), ScraperError> {
        let html = book_page("旧字旧仮名", false, &[], "");
        let book = parse_book_page(&html, BOOK_URL, &AOZORA)?;
        assert_eq!(book.subtitle, "");
        assert_eq!(book.kana_usage, KanaUsage::Historical);
        Ok(())
    }

    #[test]
    fn modern_marker_takes_precedence() -> Result<(), ScraperError> {
        let html = book_page("新字旧仮名 旧字旧仮名 新字新仮名", false, &[], "");
        let book = parse_book_page(&html, BOOK_URL, &AOZORA)?;
        assert_eq!(book.kana_usage, KanaUsage::Modern);
        Ok(())
    }

    #[test]
    fn kana_markers_outside_work_block_are_ignored() -> Result<(), ScraperError> {
        let html = book_page("新字旧仮名", false, &[], "<p>新字新仮名</p>");
        let book = parse_book_page(&html, BOOK_URL, &AOZORA)?;
        assert_eq!(book.kana_usage, KanaUsage::SemiModern);
        Ok(())
    }

    #[test]
    fn classify_kana_usage_precedence() {
        assert_eq!(classify_kana_usage("新字新仮名", &AOZORA), KanaUsage::Modern);
        assert_eq!(
            classify_kana_usage("新字旧仮名、新字新仮名", &AOZORA),
            KanaUsage::Modern
        );
        assert_eq!(classify_kana_usage("新字旧仮名", &AOZORA), KanaUsage::SemiModern);
        assert_eq!(classify_kana_usage("旧字旧仮名", &AOZORA), KanaUsage::Historical);
        assert_eq!(classify_kana_usage("", &AOZORA), KanaUsage::Historical);
    }

    #[test]
    fn copyright_marker_anywhere_on_page() -> Result<(), ScraperError> {
        let html = book_page("新字新仮名", false, &[], "<div>＊著作権存続＊</div>");
        let book = parse_book_page(&html, BOOK_URL, &AOZORA)?;
        assert!(book.copyright);
        Ok(())
    }

    #[test]
    fn unknown_file_extensions_are_dropped() -> Result<(), Box<dyn std::error::Error>> {
        let html = book_page("新字新仮名", false, &["127.txt", "127.epub", "README"], "");
        let book = parse_book_page(&html, BOOK_URL, &AOZORA)?;
        assert!(book.html_file.is_none());
        assert!(book.zip_file.is_none());
        let value = serde_json::to_value(&book)?;
        assert!(value.get("html_file").is_none());
        assert!(value.get("zip_file").is_none());
        Ok(())
    }

    #[test]
    fn book_page_missing_blocks_is_an_error() {
        let html = r#"<table summary="タイトルデータ"><tr><td><font size="+2">t</font></td></tr></table>"#;
        let result = parse_book_page(html, BOOK_URL, &AOZORA);
        match result {
            Err(ScraperError::ParsePage { message, .. }) => {
                assert!(message.contains("work data"))
            }
            other => panic!("expected ParsePage, got {:?}", other),
        }
        assert!(parse_book_page("<p></p>", BOOK_URL, &AOZORA).is_err());
    }

    #[test]
    fn file_url_uses_book_page_directory() {
        assert_eq!(
            file_url(BOOK_URL, "127_ruby_150.zip", &AOZORA),
            "http://www.aozora.gr.jp/cards/000879/files/127_ruby_150.zip"
        );
    }

    #[test]
    fn file_extension_of_last_segment() {
        assert_eq!(file_extension("http://h/cards/1/files/a.zip"), Some("zip"));
        assert_eq!(file_extension("http://h/cards/1/files/a.b.html"), Some("html"));
        assert_eq!(file_extension("http://h/cards/1.x/files/README"), None);
        assert_eq!(file_extension("http://h/cards/1/files/.zip"), None);
    }
}
