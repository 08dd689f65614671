//! Compiled heuristic patterns.
//!
//! Class names, ids, link text and URL shapes drive most of the extraction
//! decisions. Every pattern is compiled once and shared.

use std::sync::LazyLock;

use regex::Regex;

/// Class/id fragments that mark a block as probably not article content.
pub static UNLIKELY_CANDIDATES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)combx|comment|community|disqus|extra|foot|header|menu|remark|rss|shoutbox|sidebar|sponsor|ad-break|agegate|pagination|pager|popup|tweet|twitter|aside|nocontent",
    )
    .unwrap()
});

/// Overrides [`UNLIKELY_CANDIDATES`]: fragments that rescue a block.
pub static OK_MAYBE_CANDIDATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)and|article|body|column|main|shadow|canvas|svg").unwrap());

/// Class/id fragments that raise a block's weight.
pub static POSITIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)article|body|content|entry|hentry|main|page|pagination|post|text|blog|story|code|svg|canvas")
        .unwrap()
});

/// Class/id fragments that lower a block's weight.
pub static NEGATIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)combx|comment|com-|contact|header|foot|footer|footnote|masthead|meta|outbrain|promo|related|scroll|shoutbox|sidebar|sponsor|shopping|tags|tool|widget|nocontent|share|bookmark",
    )
    .unwrap()
});

/// Link text pointing at non-content chrome (print, share, login, ...).
pub static EXTRANEOUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)print|archive|comment|discuss|e[-]?mail|share|reply|all|login|sign|single").unwrap());

/// Embed sources that are kept during conditional cleaning.
pub static VIDEOS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)http://(www\.)?(youtube|vimeo)\.com").unwrap());

/// Link text that should never become a footnote (bare numbers, edit links).
pub static SKIP_FOOTNOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(\[?[a-z0-9]{1,2}\]?|^|edit|citation needed)\s*$").unwrap());

/// Link text suggesting a forward page link.
pub static NEXT_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(next|weiter|continue|>([^\|]|$)|»([^\|]|$))").unwrap());

/// Link text suggesting a backward page link.
pub static PREV_LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)(prev|earl|old|new|<|«)").unwrap());

/// Class/id fragments naming a pagination container.
pub static PAGE_HINT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)pag(e|ing|inat)").unwrap());

/// "first"/"last" markers on pagination links.
pub static FIRST_LAST: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)(first|last)").unwrap());

/// URLs that look like a numbered page within a series.
pub static PAGINATED_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)p(a|g|ag)?(e|ing|ination)?(=|/)[0-9]{1,2}").unwrap());

/// Looser page-word match applied to whole URLs.
pub static PAGE_IN_URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)(page|paging)").unwrap());

/// Trailing URL path segment that is page-number noise ("p2", "-12", "_p3").
pub static PAGE_NUMBER_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)((_|-)?p[a-z]*|(_|-))[0-9]{1,2}$").unwrap());

/// A path segment that is nothing but one or two digits.
pub static PURELY_NUMERIC_SEGMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{1,2}$").unwrap());

/// Sentence-terminal period, used when judging short trailing paragraphs.
pub static SENTENCE_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.( |$)").unwrap());

/// Word boundary matcher used for word counts.
pub static WORDS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[\w'-]+\b").unwrap());

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlikely_rescued_by_maybe() {
        assert!(UNLIKELY_CANDIDATES.is_match("sidebar-widget"));
        assert!(OK_MAYBE_CANDIDATE.is_match("main-sidebar"));
        assert!(!OK_MAYBE_CANDIDATE.is_match("sidebar-widget"));
    }

    #[test]
    fn test_positive_and_negative_weights() {
        assert!(POSITIVE.is_match("article-body"));
        assert!(NEGATIVE.is_match("comment-footer"));
        assert!(!POSITIVE.is_match("nav-menu"));
    }

    #[test]
    fn test_next_link_bar_exclusion() {
        assert!(NEXT_LINK.is_match("Next page"));
        assert!(NEXT_LINK.is_match("»"));
        assert!(!NEXT_LINK.is_match(">|"));
    }

    #[test]
    fn test_skip_footnote() {
        assert!(SKIP_FOOTNOTE.is_match("12"));
        assert!(SKIP_FOOTNOTE.is_match("[3]"));
        assert!(SKIP_FOOTNOTE.is_match("edit"));
        assert!(!SKIP_FOOTNOTE.is_match("read the full study"));
    }

    #[test]
    fn test_paginated_url() {
        assert!(PAGINATED_URL.is_match("https://example.com/story?page=2"));
        assert!(PAGINATED_URL.is_match("https://example.com/story/p/2"));
        // digits must follow a separator, not the keyword directly
        assert!(!PAGINATED_URL.is_match("https://example.com/story/p2"));
        assert!(!PAGINATED_URL.is_match("https://example.com/story"));
    }

    #[test]
    fn test_page_number_segment() {
        assert!(PAGE_NUMBER_SEGMENT.is_match("p2"));
        assert!(PAGE_NUMBER_SEGMENT.is_match("article-12"));
        assert!(PAGE_NUMBER_SEGMENT.is_match("_page3"));
        assert!(!PAGE_NUMBER_SEGMENT.is_match("chapter"));
    }
}
