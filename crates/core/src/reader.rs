//! High-level extraction API.
//!
//! [`Reader`] ties the pieces together: parse a working tree, derive the
//! title, find the next-page link before extraction disturbs the page,
//! grab and clean the article, rewrite footnotes, and assemble the pages.

use tracing::{debug, info};
use url::Url;

use crate::article::{Article, ArticleBuilder, derive_title};
use crate::extract::{self, MIN_BASELINE};
use crate::fetch::{FetchConfig, PageResponse};
use crate::footnotes::FootnoteRewriter;
use crate::pagination::{DEFAULT_MAX_PAGES, Session};
use crate::score::Flags;
use crate::text::inner_text;
use crate::tree::Tree;
use crate::{LensError, Result};

/// Configuration for [`Reader`].
///
/// # Example
///
/// ```rust
/// use lens_core::ReaderConfig;
///
/// let config = ReaderConfig::new().max_pages(3).footnotes(false);
/// ```
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Extraction behavior switches.
    pub flags: Flags,
    /// Follow next-page links and inline their content.
    pub follow_pagination: bool,
    /// Pages fetched beyond this are linked instead of inlined.
    pub max_pages: usize,
    /// Rewrite article links into numbered footnotes.
    pub footnotes: bool,
    /// HTTP settings for fetching.
    pub fetch: FetchConfig,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            flags: Flags::default(),
            follow_pagination: true,
            max_pages: DEFAULT_MAX_PAGES,
            footnotes: true,
            fetch: FetchConfig::default(),
        }
    }
}

impl ReaderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Disables next-page following entirely.
    pub fn single_page(mut self) -> Self {
        self.follow_pagination = false;
        self
    }

    pub fn footnotes(mut self, footnotes: bool) -> Self {
        self.footnotes = footnotes;
        self
    }

    pub fn flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    pub fn timeout(mut self, seconds: u64) -> Self {
        self.fetch.timeout = seconds;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.fetch.user_agent = user_agent.into();
        self
    }
}

/// Article extractor.
#[derive(Debug, Default)]
pub struct Reader {
    config: ReaderConfig,
}

/// What happened to one fetched follow-up page.
#[derive(Debug)]
enum PageOutcome {
    /// Content appended; carries the next page URL if one was found.
    Appended(Option<String>),
    /// The server handed back a page we already had. Stop following.
    Duplicate,
    /// Nothing usable on the page. Stop following.
    Empty,
}

impl Reader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ReaderConfig) -> Self {
        Self { config }
    }

    /// Extracts an article from an HTML string with no URL context.
    /// Footnote hrefs stay as written and pagination is not followed.
    ///
    /// # Errors
    ///
    /// Returns [`LensError::NoContent`] when the page has no extractable
    /// article.
    pub fn parse(&self, html: &str) -> Result<Article> {
        let mut tree = Tree::parse(html)?;
        let title = derive_title(&tree);
        let extraction = extract::grab_article(&mut tree, self.config.flags)?;

        let mut builder = ArticleBuilder::new(title, None);
        let mut rewriter = FootnoteRewriter::new();
        if self.config.footnotes {
            rewriter.apply(&mut tree, extraction.content, None);
        }
        builder.push_page(&tree.inner_html(extraction.content), inner_text(&tree, extraction.content));
        if let Some(block) = rewriter.render() {
            builder.set_footnotes(block);
        }

        let article = builder.build();
        info!(length = article.length, "extracted article");
        Ok(article)
    }

    /// Extracts an article from HTML known to live at `url`. Relative links
    /// resolve against the URL and the next-page link, if present, is
    /// reported on the article without being fetched.
    pub fn parse_with_url(&self, html: &str, url: &Url) -> Result<Article> {
        let mut tree = Tree::parse(html)?;
        let title = derive_title(&tree);

        let mut session = Session::new(url.clone(), self.config.max_pages);
        let next = session.find_next_page_link(&tree, tree.root());

        let extraction = extract::grab_article(&mut tree, self.config.flags)?;

        let mut builder = ArticleBuilder::new(title, Some(url.as_str().to_string()));
        let mut rewriter = FootnoteRewriter::new();
        if self.config.footnotes {
            rewriter.apply(&mut tree, extraction.content, Some(url));
        }
        builder.push_page(&tree.inner_html(extraction.content), inner_text(&tree, extraction.content));
        if let Some(next) = next {
            builder.set_next_page_url(&next);
        }
        if let Some(block) = rewriter.render() {
            builder.set_footnotes(block);
        }

        let article = builder.build();
        info!(length = article.length, next_page = article.next_page_url.is_some(), "extracted article");
        Ok(article)
    }

    /// Fetches `url`, extracts the article and follows next-page links up
    /// to the configured limit, merging every page into one article.
    ///
    /// # Errors
    ///
    /// Besides the fetch errors, returns [`LensError::NoContent`] when the
    /// first page has no extractable article. Failures on follow-up pages
    /// end the series but keep what was already assembled.
    #[cfg(feature = "fetch")]
    pub async fn fetch_and_parse(&self, url: &str) -> Result<Article> {
        let location = Url::parse(url).map_err(|_| LensError::InvalidUrl(url.to_string()))?;
        let html = crate::fetch::fetch_html(url, &self.config.fetch).await?;

        let mut tree = Tree::parse(&html)?;
        let title = derive_title(&tree);

        let mut session = Session::new(location.clone(), self.config.max_pages);
        let mut next = if self.config.follow_pagination {
            session.find_next_page_link(&tree, tree.root())
        } else {
            None
        };

        let extraction = extract::grab_article(&mut tree, self.config.flags)?;

        let mut builder = ArticleBuilder::new(title, Some(url.to_string()));
        let mut rewriter = FootnoteRewriter::new();
        if self.config.footnotes {
            rewriter.apply(&mut tree, extraction.content, Some(&location));
        }
        builder.push_page(&tree.inner_html(extraction.content), inner_text(&tree, extraction.content));

        while let Some(next_url) = next.take() {
            if !session.advance_page() {
                debug!(url = %next_url, "page limit reached, leaving pointer");
                builder.push_next_page_pointer(&next_url);
                break;
            }

            let Ok(response) = crate::fetch::fetch_page(&next_url, &self.config.fetch).await else {
                debug!(url = %next_url, "next page fetch failed, stopping");
                break;
            };

            match self.absorb_page(&mut session, &mut builder, &mut rewriter, &response) {
                PageOutcome::Appended(found) => next = found,
                PageOutcome::Duplicate | PageOutcome::Empty => break,
            }
        }

        if let Some(block) = rewriter.render() {
            builder.set_footnotes(block);
        }

        let article = builder.build();
        info!(length = article.length, pages = article.page_count, "extracted article");
        Ok(article)
    }

    /// Folds one fetched follow-up page into the article being assembled.
    fn absorb_page(
        &self,
        session: &mut Session,
        builder: &mut ArticleBuilder,
        rewriter: &mut FootnoteRewriter,
        response: &PageResponse,
    ) -> PageOutcome {
        if !response.is_success() {
            return PageOutcome::Empty;
        }

        if let Some(etag) = &response.etag {
            if !session.register_etag(etag) {
                debug!(etag, "duplicate page detected via ETag");
                builder.push_duplicate_page();
                return PageOutcome::Duplicate;
            }
        }

        let Ok(mut tree) = Tree::parse(&response.body) else {
            return PageOutcome::Empty;
        };

        let next = session.find_next_page_link(&tree, tree.root());

        match extract::grab_article(&mut tree, self.config.flags) {
            Ok(extraction) => {
                if self.config.footnotes {
                    rewriter.apply(&mut tree, extraction.content, Some(session.location()));
                }
                builder.push_page(&tree.inner_html(extraction.content), inner_text(&tree, extraction.content));
                PageOutcome::Appended(next)
            }
            Err(_) => {
                debug!("no content found in follow-up page");
                PageOutcome::Empty
            }
        }
    }
}

/// Quick check that a page has enough paragraph text to bother extracting.
pub fn is_probably_readable(html: &str) -> bool {
    match Tree::parse(html) {
        Ok(tree) => extract::content_text_length(&tree, tree.root()) >= MIN_BASELINE,
        Err(_) => false,
    }
}

/// Extracts an article from an HTML string using the default configuration.
pub fn parse(html: &str) -> Result<Article> {
    Reader::new().parse(html)
}

/// Extracts an article from HTML fetched from `url`'s location.
pub fn parse_with_url(html: &str, url: &Url) -> Result<Article> {
    Reader::new().parse_with_url(html, url)
}

/// Fetches a URL and extracts its article, following pagination.
#[cfg(feature = "fetch")]
pub async fn fetch_and_parse(url: &str) -> Result<Article> {
    Reader::new().fetch_and_parse(url).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article_page(extra: &str) -> String {
        let para = "A rather long paragraph, full of clauses, commas, and enough words to score well on any reasonable metric of textual density. ";
        format!(
            r#"<html><head><title>The Grand Experiment of Modern Times | Example Journal</title></head><body>
                <div class="sidebar"><ul><li><a href="/nav1">Navigation</a></li></ul></div>
                <div class="article-body"><p>{}</p><p>{}</p><p>{}</p>{}</div>
            </body></html>"#,
            para.repeat(2),
            para.repeat(2),
            para.repeat(2),
            extra
        )
    }

    #[test]
    fn test_parse_extracts_title_and_content() {
        let article = parse(&article_page("")).unwrap();
        assert_eq!(article.title.as_deref(), Some("The Grand Experiment of Modern Times"));
        assert!(article.text_content.contains("textual density"));
        assert!(!article.text_content.contains("Navigation"));
        assert!(article.content.contains(r#"id="lens-page-1""#));
        assert_eq!(article.page_count, 1);
    }

    #[test]
    fn test_parse_flat_page_wraps_body() {
        let para = "A rather long paragraph, full of clauses, commas, and enough words to score well on any reasonable metric of textual density. ";
        let html =
            format!("<html><body><p>{0}</p><p>{0}</p><p>{0}</p></body></html>", para.repeat(2));
        let article = parse(&html).unwrap();
        assert_eq!(article.page_count, 1);
        assert!(article.text_content.contains("textual density"));
    }

    #[test]
    fn test_parse_rejects_empty_page() {
        let err = parse("<html><body><p>Nothing here.</p></body></html>").unwrap_err();
        assert!(matches!(err, LensError::NoContent));
    }

    #[test]
    fn test_parse_with_url_reports_next_page() {
        let html = article_page(r#"<div class="pagination"><a href="/story/2">Next page</a></div>"#);
        let url = Url::parse("https://example.com/story").unwrap();
        let article = parse_with_url(&html, &url).unwrap();
        assert_eq!(article.next_page_url.as_deref(), Some("https://example.com/story/2"));
        assert_eq!(article.source_url.as_deref(), Some("https://example.com/story"));
    }

    #[test]
    fn test_parse_footnotes_rewrite_links() {
        let html = article_page(r#"<p>Based on <a href="/research/full-study">the original study</a>, among other sources and documents.</p>"#);
        let url = Url::parse("https://example.com/story").unwrap();
        let article = parse_with_url(&html, &url).unwrap();
        assert!(article.content.contains("lens-footnotes"));
        assert!(article.content.contains("https://example.com/research/full-study"));
    }

    #[test]
    fn test_parse_footnotes_can_be_disabled() {
        let html = article_page(r#"<p>Based on <a href="/research/full-study">the original study</a>, among other sources and documents.</p>"#);
        let reader = Reader::with_config(ReaderConfig::new().footnotes(false));
        let article = reader.parse(&html).unwrap();
        assert!(!article.content.contains("lens-footnotes"));
    }

    #[test]
    fn test_absorb_page_appends_content() {
        let reader = Reader::new();
        let mut session = Session::new(Url::parse("https://example.com/story").unwrap(), 10);
        let mut builder = ArticleBuilder::new(None, None);
        let mut rewriter = FootnoteRewriter::new();

        let response = PageResponse { status: 200, etag: Some("tag-a".to_string()), body: article_page("") };
        let outcome = reader.absorb_page(&mut session, &mut builder, &mut rewriter, &response);
        assert!(matches!(outcome, PageOutcome::Appended(None)));
        assert_eq!(builder.content_pages(), 1);
    }

    #[test]
    fn test_absorb_page_etag_duplicate() {
        let reader = Reader::new();
        let mut session = Session::new(Url::parse("https://example.com/story").unwrap(), 10);
        let mut builder = ArticleBuilder::new(None, None);
        let mut rewriter = FootnoteRewriter::new();

        let response = PageResponse { status: 200, etag: Some("tag-a".to_string()), body: article_page("") };
        let first = reader.absorb_page(&mut session, &mut builder, &mut rewriter, &response);
        assert!(matches!(first, PageOutcome::Appended(_)));

        let second = reader.absorb_page(&mut session, &mut builder, &mut rewriter, &response);
        assert!(matches!(second, PageOutcome::Duplicate));
        assert_eq!(builder.content_pages(), 1);
    }

    #[test]
    fn test_absorb_page_failure_status() {
        let reader = Reader::new();
        let mut session = Session::new(Url::parse("https://example.com/story").unwrap(), 10);
        let mut builder = ArticleBuilder::new(None, None);
        let mut rewriter = FootnoteRewriter::new();

        let response = PageResponse { status: 500, etag: None, body: String::new() };
        let outcome = reader.absorb_page(&mut session, &mut builder, &mut rewriter, &response);
        assert!(matches!(outcome, PageOutcome::Empty));
    }

    #[test]
    fn test_is_probably_readable() {
        assert!(is_probably_readable(&article_page("")));
        assert!(!is_probably_readable("<html><body><p>hi</p></body></html>"));
    }
}
