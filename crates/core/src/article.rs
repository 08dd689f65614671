//! Extracted article representation and assembly.

use serde::Serialize;

use crate::text::inner_text;
use crate::tree::Tree;
use crate::{Result, patterns};

/// Words per minute used for the reading time estimate.
const READING_SPEED: usize = 200;

/// An extracted article with its content and metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Article {
    /// Article title derived from the page title and headings.
    pub title: Option<String>,
    /// Cleaned HTML of the article, one `.page` wrapper per source page.
    pub content: String,
    /// Plain text of the article.
    pub text_content: String,
    /// Character count of the plain text.
    pub length: usize,
    /// Word count of the plain text.
    pub word_count: usize,
    /// Estimated reading time in minutes.
    pub reading_time: usize,
    /// Number of source pages that contributed content.
    pub page_count: usize,
    /// Next page past the inline limit, when the article kept going.
    pub next_page_url: Option<String>,
    /// URL the article was fetched from, if any.
    pub source_url: Option<String>,
}

impl Article {
    pub fn count_words(text: &str) -> usize {
        patterns::WORDS.find_iter(text).count()
    }

    /// Serializes the article and its metadata to a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`crate::LensError::SerializationError`] if serialization
    /// fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Derives a display title from the document title, splitting off site
/// names around `|`, `-` and `:` separators and falling back to a lone
/// `<h1>` when the raw title is unusably short or long.
pub fn derive_title(tree: &Tree) -> Option<String> {
    let orig = tree.title().unwrap_or("").to_string();
    let mut title = orig.clone();

    if title.contains(" | ") || title.contains(" - ") {
        title = before_last_separator(&orig, &['|', '-']);
        if word_count(&title) < 3 {
            title = after_first_separator(&orig, &['|', '-']);
        }
    } else if title.contains(": ") {
        title = orig.rsplit(':').next().unwrap_or("").to_string();
        if word_count(&title) < 3 {
            title = orig.splitn(2, ':').nth(1).unwrap_or("").to_string();
        }
    } else if title.chars().count() > 150 || title.chars().count() < 15 {
        let h1s = tree.elements_by_tag(tree.root(), "h1");
        if h1s.len() == 1 {
            title = inner_text(tree, h1s[0]);
        }
    }

    title = title.trim().to_string();
    if word_count(&title) <= 4 {
        title = orig;
    }

    let title = title.trim().to_string();
    if title.is_empty() { None } else { Some(title) }
}

fn word_count(s: &str) -> usize {
    s.split(' ').count()
}

// Separator means the character followed by a space, so hyphens inside
// words do not split the title.
fn before_last_separator(s: &str, separators: &[char]) -> String {
    let pos = separators
        .iter()
        .filter_map(|&c| s.rfind(&format!("{} ", c)))
        .max();
    match pos {
        Some(pos) => s[..pos].to_string(),
        None => s.to_string(),
    }
}

fn after_first_separator(s: &str, separators: &[char]) -> String {
    match s.find(|c| separators.contains(&c)) {
        Some(pos) => s[pos + 1..].to_string(),
        None => s.to_string(),
    }
}

/// Assembles article pages into the final [`Article`].
///
/// Each contributed page lands in its own numbered `.page` wrapper so the
/// seams between source pages stay visible in the output.
#[derive(Debug)]
pub struct ArticleBuilder {
    title: Option<String>,
    source_url: Option<String>,
    pages: Vec<String>,
    texts: Vec<String>,
    content_pages: usize,
    next_page_url: Option<String>,
    footnotes: Option<String>,
}

impl ArticleBuilder {
    pub fn new(title: Option<String>, source_url: Option<String>) -> Self {
        Self {
            title,
            source_url,
            pages: Vec::new(),
            texts: Vec::new(),
            content_pages: 0,
            next_page_url: None,
            footnotes: None,
        }
    }

    fn wrap_page(&self, body: &str, hidden: bool) -> String {
        let number = self.pages.len() + 1;
        let style = if hidden { r#" style="display: none""# } else { "" };
        format!(r#"<div id="lens-page-{}" class="page"{}>{}</div>"#, number, style, body)
    }

    /// Adds a page of extracted content.
    pub fn push_page(&mut self, html: &str, text: String) {
        let wrapped = self.wrap_page(html, false);
        self.pages.push(wrapped);
        self.texts.push(text);
        self.content_pages += 1;
    }

    /// Adds an empty, hidden page slot for a duplicate the ETag check
    /// caught. Numbering stays aligned with the fetch sequence.
    pub fn push_duplicate_page(&mut self) {
        let wrapped = self.wrap_page("", true);
        self.pages.push(wrapped);
    }

    /// Records that more pages exist past the inline limit and leaves a
    /// visible pointer to them.
    pub fn push_next_page_pointer(&mut self, url: &str) {
        let body = format!(r#"<div style="text-align: center"><a href="{}">View Next Page</a></div>"#, url);
        let wrapped = self.wrap_page(&body, false);
        self.pages.push(wrapped);
        self.next_page_url = Some(url.to_string());
    }

    pub fn set_footnotes(&mut self, block: String) {
        self.footnotes = Some(block);
    }

    /// Records a next-page URL without leaving a pointer in the content.
    pub fn set_next_page_url(&mut self, url: &str) {
        self.next_page_url = Some(url.to_string());
    }

    /// Number of pages that contributed actual content.
    pub fn content_pages(&self) -> usize {
        self.content_pages
    }

    pub fn build(self) -> Article {
        let mut content = self.pages.concat();
        if let Some(block) = &self.footnotes {
            content.push_str(block);
        }

        let text_content = self.texts.join("\n\n");
        let length = text_content.chars().count();
        let word_count = Article::count_words(&text_content);
        let reading_time = word_count.div_ceil(READING_SPEED);

        Article {
            title: self.title,
            content,
            text_content,
            length,
            word_count,
            reading_time,
            page_count: self.content_pages,
            next_page_url: self.next_page_url,
            source_url: self.source_url,
        }
    }
}
