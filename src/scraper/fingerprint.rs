//! Structural markers used to locate data on archive pages.
//!
//! The pages carry no stable classes or ids, so every element is found by an attribute
//! value or a literal marker string. All of them live here; the parse functions in
//! [`aozora`](super::aozora) take a `&Fingerprint` and nothing else site-specific.

/// Attribute values and marker substrings for one archive layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    /// Selector for the "large" font-size element holding author names and book titles.
    pub large_text: &'static str,
    /// Selector for the title data table on a book page.
    pub title_block: &'static str,
    /// Selector for the work data table on a book page.
    pub work_block: &'static str,
    /// Selector for downloadable file rows on a book page.
    pub file_rows: &'static str,
    /// Label text of the subtitle row inside the title block.
    pub subtitle_label: &'static str,
    pub modern_kana: &'static str,
    pub semi_modern_kana: &'static str,
    pub historical_kana: &'static str,
    /// Present anywhere on a book page when the work is still under copyright.
    pub copyright: &'static str,
    /// Path segment between a book page's directory and a file name.
    pub files_segment: &'static str,
    /// Leading characters (`../`) dropped from an author page's book href before joining the root.
    pub book_href_skip: usize,
}

/// Aozora Bunko index and card pages.
pub const AOZORA: Fingerprint = Fingerprint {
    large_text: r#"[size="+2"]"#,
    title_block: r#"[summary="タイトルデータ"]"#,
    work_block: r#"[summary="作品データ"]"#,
    file_rows: r#"[bgcolor="white"]"#,
    subtitle_label: "副題：",
    modern_kana: "新字新仮名",
    semi_modern_kana: "新字旧仮名",
    historical_kana: "旧字旧仮名",
    copyright: "＊著作権存続＊",
    files_segment: "files/",
    book_href_skip: 3,
};

impl Default for Fingerprint {
    fn default() -> Self {
        AOZORA
    }
}
