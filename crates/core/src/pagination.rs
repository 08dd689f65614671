//! Next-page discovery for paginated articles.
//!
//! A [`Session`] tracks everything that spans pages of one article: the
//! page-one location, the derived base URL, which URLs and ETags have been
//! seen, and the current page number. Candidate links are scored with a
//! pile of small hints; only a candidate reaching 50 is trusted.

use std::collections::HashSet;

use tracing::{debug, info};
use url::Url;

use crate::patterns;
use crate::text::{edit_distance, inner_text};
use crate::tree::{NodeId, Tree};

/// Pages fetched beyond this many are linked instead of inlined.
pub const DEFAULT_MAX_PAGES: usize = 10;

/// Minimum score for a link to be accepted as the next page.
const ACCEPT_SCORE: f64 = 50.0;

/// Candidate URLs whose edit distance from the base exceeds this are noise.
const MAX_URL_DISTANCE: usize = 15;

/// Per-article pagination state.
#[derive(Debug)]
pub struct Session {
    location: Url,
    location_href: String,
    base_url: String,
    parsed_pages: HashSet<String>,
    page_etags: HashSet<String>,
    cur_page_num: usize,
    max_pages: usize,
}

#[derive(Debug)]
struct Candidate {
    href: String,
    link_text: String,
    score: f64,
}

impl Session {
    pub fn new(location: Url, max_pages: usize) -> Self {
        let location_href = location.as_str().to_string();
        let base_url = find_base_url(&location);
        let mut parsed_pages = HashSet::new();
        parsed_pages.insert(clean_href(&location));

        Self {
            location,
            location_href,
            base_url,
            parsed_pages,
            page_etags: HashSet::new(),
            cur_page_num: 1,
            max_pages,
        }
    }

    /// Location of the article's first page.
    pub fn location(&self) -> &Url {
        &self.location
    }

    /// The cleaned base article URL shared by all pages of the series.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Number of the page currently being assembled, starting at 1.
    pub fn page_number(&self) -> usize {
        self.cur_page_num
    }

    /// Advances to the next page number and reports whether that page is
    /// still within the inline limit.
    pub fn advance_page(&mut self) -> bool {
        self.cur_page_num += 1;
        self.cur_page_num <= self.max_pages
    }

    /// Records an ETag, returning `false` when it was already seen. A
    /// repeated ETag means the server handed back a page we already have.
    pub fn register_etag(&mut self, etag: &str) -> bool {
        self.page_etags.insert(etag.to_string())
    }

    /// Marks a URL as consumed so later pages cannot loop back to it.
    pub fn mark_parsed(&mut self, href: &str) {
        self.parsed_pages.insert(href.trim_end_matches('/').to_string());
    }

    /// Scores every link under `root` and returns the best next-page URL,
    /// if any clears the acceptance threshold. The winner is recorded as
    /// parsed immediately.
    pub fn find_next_page_link(&mut self, tree: &Tree, root: NodeId) -> Option<String> {
        let mut candidates: Vec<Candidate> = Vec::new();

        for link in tree.elements_by_tag(root, "a") {
            let Some(raw_href) = tree.attr(link, "href") else { continue };
            let Ok(resolved) = self.location.join(raw_href) else { continue };
            let link_href = clean_href(&resolved);

            if link_href.is_empty()
                || link_href == self.base_url
                || link_href == self.location_href
                || self.parsed_pages.contains(&link_href)
            {
                continue;
            }
            if resolved.host_str() != self.location.host_str() {
                continue;
            }

            let link_text = inner_text(tree, link);
            if patterns::EXTRANEOUS.is_match(&link_text) || link_text.chars().count() > 25 {
                continue;
            }

            let leftover = link_href.replacen(&self.base_url, "", 1);
            if !leftover.chars().any(|c| c.is_ascii_digit()) {
                continue;
            }
            if edit_distance(&link_href, &self.base_url) > MAX_URL_DISTANCE {
                continue;
            }

            let index = match candidates.iter().position(|c| c.href == link_href) {
                Some(i) => {
                    let joined = format!("{} | {}", candidates[i].link_text, link_text);
                    candidates[i].link_text = joined;
                    i
                }
                None => {
                    candidates.push(Candidate { href: link_href.clone(), link_text: link_text.clone(), score: 0.0 });
                    candidates.len() - 1
                }
            };
            let candidate = &mut candidates[index];

            if !link_href.starts_with(&self.base_url) {
                candidate.score -= 25.0;
            }

            let link_data = format!("{} {} {}", link_text, tree.class_name(link), tree.element_id(link));
            if patterns::NEXT_LINK.is_match(&link_data) {
                candidate.score += 50.0;
            }
            if patterns::PAGE_HINT.is_match(&link_data) {
                candidate.score += 25.0;
            }
            if patterns::FIRST_LAST.is_match(&link_data) && !patterns::NEXT_LINK.is_match(&candidate.link_text) {
                candidate.score -= 65.0;
            }
            if patterns::NEGATIVE.is_match(&link_data) || patterns::EXTRANEOUS.is_match(&link_data) {
                candidate.score -= 50.0;
            }
            if patterns::PREV_LINK.is_match(&link_data) {
                candidate.score -= 200.0;
            }

            candidate.score += ancestor_hint_score(tree, link);

            if patterns::PAGINATED_URL.is_match(&link_href) || patterns::PAGE_IN_URL.is_match(&link_href) {
                candidate.score += 25.0;
            }
            if patterns::EXTRANEOUS.is_match(&link_href) {
                candidate.score -= 15.0;
            }

            if let Some(number) = leading_number(&link_text) {
                if number == 1 {
                    candidate.score -= 10.0;
                } else {
                    candidate.score += (10.0 - number as f64).max(0.0);
                }
            }

            debug!(href = %candidates[index].href, score = candidates[index].score, "scored next-page candidate");
        }

        let top = candidates
            .iter()
            .filter(|c| c.score >= ACCEPT_SCORE)
            .fold(None::<&Candidate>, |best, c| match best {
                Some(b) if b.score >= c.score => Some(b),
                _ => Some(c),
            })?;

        let next_href = top.href.trim_end_matches('/').to_string();
        info!(href = %next_href, "found next page link");
        self.parsed_pages.insert(next_href.clone());
        Some(next_href)
    }
}

/// Walks the link's ancestors once, awarding +25 for the first pagination
/// container and -25 for the first chrome container that has no redeeming
/// positive marker.
fn ancestor_hint_score(tree: &Tree, link: NodeId) -> f64 {
    let mut score = 0.0;
    let mut positive_seen = false;
    let mut negative_seen = false;

    let mut current = tree.parent(link);
    while let Some(node) = current {
        let class_and_id = format!("{} {}", tree.class_name(node), tree.element_id(node));
        if class_and_id.trim().len() > 0 {
            if !positive_seen && patterns::PAGE_HINT.is_match(&class_and_id) {
                positive_seen = true;
                score += 25.0;
            }
            if !negative_seen
                && patterns::NEGATIVE.is_match(&class_and_id)
                && !patterns::POSITIVE.is_match(&class_and_id)
            {
                negative_seen = true;
                score -= 25.0;
            }
        }
        current = tree.parent(node);
    }

    score
}

/// Strips the fragment and any trailing slash from a URL.
fn clean_href(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);
    url.as_str().trim_end_matches('/').to_string()
}

/// Leading-digits parse of link text, `None` when it does not start with a
/// number.
fn leading_number(text: &str) -> Option<u32> {
    let digits: String = text.trim_start().chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok().filter(|&n| n >= 1)
}

/// Derives the base article URL shared by all pages of a series.
///
/// The path is examined segment by segment from the end: trailing page
/// numbers, bare numeric segments and "index" are dropped, and an
/// alpha-only extension is split off the final segment.
pub fn find_base_url(location: &Url) -> String {
    let path = location.path();
    let mut segments: Vec<String> = path.split('/').map(str::to_string).collect();
    segments.reverse();

    let last_segment_has_alpha = segments
        .first()
        .is_some_and(|s| s.chars().any(|c| c.is_ascii_alphabetic()));

    let mut cleaned: Vec<String> = Vec::new();
    for (i, segment) in segments.iter().enumerate() {
        let mut segment = segment.clone();

        // Split off anything that looks like a file type, keeping the stem
        // only when the extension is alpha-only.
        if let Some(dot) = segment.find('.') {
            let possible_type = &segment[dot + 1..];
            if !possible_type.is_empty() && possible_type.chars().all(|c| c.is_ascii_alphabetic()) {
                segment = segment[..dot].to_string();
            }
        }

        // EW-CMS style ",00" suffixes.
        if segment.contains(",00") {
            segment = segment.replacen(",00", "", 1);
        }

        if i < 2 && patterns::PAGE_NUMBER_SEGMENT.is_match(&segment) {
            segment = patterns::PAGE_NUMBER_SEGMENT.replace(&segment, "").into_owned();
        }

        let mut drop = false;
        if i < 2 && patterns::PURELY_NUMERIC_SEGMENT.is_match(&segment) {
            drop = true;
        }
        if i == 0 && segment.eq_ignore_ascii_case("index") {
            drop = true;
        }
        if i < 2 && segment.chars().count() < 3 && !last_segment_has_alpha {
            drop = true;
        }

        if !drop {
            cleaned.push(segment);
        }
    }

    cleaned.reverse();
    let host = location.host_str().unwrap_or("");
    let port = location.port().map(|p| format!(":{}", p)).unwrap_or_default();
    format!("{}://{}{}{}", location.scheme(), host, port, cleaned.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(url: &str) -> Session {
        Session::new(Url::parse(url).unwrap(), DEFAULT_MAX_PAGES)
    }

    #[test]
    fn test_find_base_url_strips_page_number() {
        let url = Url::parse("https://example.com/articles/my-story/2").unwrap();
        assert_eq!(find_base_url(&url), "https://example.com/articles/my-story");
    }

    #[test]
    fn test_find_base_url_strips_page_suffix_and_extension() {
        let url = Url::parse("https://example.com/story/Page2.html").unwrap();
        assert_eq!(find_base_url(&url), "https://example.com/story/");
    }

    #[test]
    fn test_find_base_url_drops_index() {
        let url = Url::parse("https://example.com/story/index.html").unwrap();
        assert_eq!(find_base_url(&url), "https://example.com/story");
    }

    #[test]
    fn test_find_base_url_plain() {
        let url = Url::parse("https://example.com/articles/my-story").unwrap();
        assert_eq!(find_base_url(&url), "https://example.com/articles/my-story");
    }

    #[test]
    fn test_finds_next_link() {
        let tree = Tree::parse(
            r#"<html><body>
                <div class="pagination"><a href="/articles/my-story/2">Next page</a></div>
            </body></html>"#,
        )
        .unwrap();
        let mut session = session("https://example.com/articles/my-story");
        let next = session.find_next_page_link(&tree, tree.root());
        assert_eq!(next.as_deref(), Some("https://example.com/articles/my-story/2"));
    }

    #[test]
    fn test_rejects_previous_link() {
        let tree = Tree::parse(
            r#"<html><body><a href="/articles/my-story/0">Previous page</a></body></html>"#,
        )
        .unwrap();
        let mut session = session("https://example.com/articles/my-story/1");
        assert_eq!(session.find_next_page_link(&tree, tree.root()), None);
    }

    #[test]
    fn test_rejects_cross_domain() {
        let tree = Tree::parse(
            r#"<html><body><a href="https://other.com/articles/my-story/2">Next</a></body></html>"#,
        )
        .unwrap();
        let mut session = session("https://example.com/articles/my-story");
        assert_eq!(session.find_next_page_link(&tree, tree.root()), None);
    }

    #[test]
    fn test_rejects_already_parsed() {
        let tree = Tree::parse(
            r#"<html><body><a href="/articles/my-story/2">Next</a></body></html>"#,
        )
        .unwrap();
        let mut session = session("https://example.com/articles/my-story");
        session.mark_parsed("https://example.com/articles/my-story/2");
        assert_eq!(session.find_next_page_link(&tree, tree.root()), None);
    }

    #[test]
    fn test_numbered_pages_prefer_page_two() {
        let tree = Tree::parse(
            r#"<html><body><div class="pagination">
                <a href="/story?page=4">4</a>
                <a href="/story?page=3">3</a>
                <a href="/story?page=2">2</a>
            </div></body></html>"#,
        )
        .unwrap();
        let mut session = session("https://example.com/story");
        let next = session.find_next_page_link(&tree, tree.root());
        assert_eq!(next.as_deref(), Some("https://example.com/story?page=2"));
    }

    #[test]
    fn test_winner_is_marked_parsed() {
        let tree = Tree::parse(
            r#"<html><body><div class="pager"><a href="/story/2">Next page</a></div></body></html>"#,
        )
        .unwrap();
        let mut session = session("https://example.com/story");
        let first = session.find_next_page_link(&tree, tree.root());
        assert!(first.is_some());
        let again = session.find_next_page_link(&tree, tree.root());
        assert_eq!(again, None);
    }

    #[test]
    fn test_etag_dedup() {
        let mut session = session("https://example.com/story");
        assert!(session.register_etag("abc123"));
        assert!(!session.register_etag("abc123"));
        assert!(session.register_etag("def456"));
    }

    #[test]
    fn test_advance_page_respects_limit() {
        let mut session = Session::new(Url::parse("https://example.com/story").unwrap(), 2);
        assert!(session.advance_page());
        assert!(!session.advance_page());
        assert_eq!(session.page_number(), 3);
    }
}
