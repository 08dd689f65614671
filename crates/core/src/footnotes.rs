//! Link-to-footnote rewriting.
//!
//! Every qualifying link in the article gets a numbered superscript
//! reference, and a matching entry is collected into a references block the
//! caller can append after the article. Numbering is continuous across
//! pages of a multi-page article, so the rewriter is kept alive for the
//! whole assembly.

use url::Url;

use crate::patterns;
use crate::text::inner_text;
use crate::tree::{NodeId, Tree};

/// Class marking links the rewriter must leave alone (its own superscripts).
const NO_FOOTNOTE_CLASS: &str = "lens-no-footnote";

#[derive(Debug)]
struct Entry {
    number: usize,
    href: String,
    label: String,
    domain: String,
}

/// Accumulates footnotes across one article's pages.
#[derive(Debug, Default)]
pub struct FootnoteRewriter {
    entries: Vec<Entry>,
}

impl FootnoteRewriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rewrites the links under `content`, numbering on from previous calls.
    /// `base_url` resolves relative hrefs and supplies the fallback domain.
    pub fn apply(&mut self, tree: &mut Tree, content: NodeId, base_url: Option<&Url>) {
        for link in tree.elements_by_tag(content, "a") {
            if tree.class_name(link).contains(NO_FOOTNOTE_CLASS) {
                continue;
            }
            let link_text = inner_text(tree, link);
            if patterns::SKIP_FOOTNOTE.is_match(&link_text) {
                continue;
            }

            let number = self.entries.len() + 1;
            let href = tree.attr(link, "href").unwrap_or("").to_string();
            let resolved = base_url.and_then(|base| base.join(&href).ok());
            let domain = resolved
                .as_ref()
                .and_then(|u| u.host_str())
                .or_else(|| base_url.and_then(|u| u.host_str()))
                .unwrap_or("")
                .to_string();
            let label = tree
                .attr(link, "title")
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .unwrap_or(link_text);

            tree.set_attr(link, "id", &format!("lens-link-{}", number));
            let marker = build_marker(tree, number);
            tree.insert_after(link, marker);

            let href = resolved.map(|u| u.to_string()).unwrap_or(href);
            self.entries.push(Entry { number, href, label, domain });
        }
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// The references block, or `None` when no footnotes were collected.
    pub fn render(&self) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }

        let mut tree = Tree::with_root("div");
        let root = tree.root();
        tree.set_attr(root, "id", "lens-footnotes");

        let heading = tree.create_element("h3");
        let heading_text = tree.create_text("References");
        tree.append(heading, heading_text);
        tree.append(root, heading);

        let list = tree.create_element("ol");
        tree.set_attr(list, "id", "lens-footnotes-list");
        for entry in &self.entries {
            let item = tree.create_element("li");

            let back = build_back_reference(&mut tree, entry.number);
            tree.append(item, back);
            let space = tree.create_text(" ");
            tree.append(item, space);

            let link = tree.create_element("a");
            tree.set_attr(link, "href", &entry.href);
            tree.set_attr(link, "id", &format!("lens-footnote-{}", entry.number));
            let label = tree.create_text(&entry.label);
            tree.append(link, label);
            tree.append(item, link);

            let small = tree.create_element("small");
            let domain = tree.create_text(&format!(" ({})", entry.domain));
            tree.append(small, domain);
            tree.append(item, small);

            tree.append(list, item);
        }
        tree.append(root, list);

        Some(tree.outer_html(root))
    }
}

/// `<a class="lens-no-footnote" href="#lens-footnote-N"><small><sup>[N]</sup></small></a>`
fn build_marker(tree: &mut Tree, number: usize) -> NodeId {
    let marker = tree.create_element("a");
    tree.set_attr(marker, "class", NO_FOOTNOTE_CLASS);
    tree.set_attr(marker, "href", &format!("#lens-footnote-{}", number));
    let small = tree.create_element("small");
    let sup = tree.create_element("sup");
    let text = tree.create_text(&format!("[{}]", number));
    tree.append(sup, text);
    tree.append(small, sup);
    tree.append(marker, small);
    marker
}

/// `<small><sup><a href="#lens-link-N">^</a></sup></small>` for jumping back.
fn build_back_reference(tree: &mut Tree, number: usize) -> NodeId {
    let small = tree.create_element("small");
    let sup = tree.create_element("sup");
    let link = tree.create_element("a");
    tree.set_attr(link, "href", &format!("#lens-link-{}", number));
    tree.set_attr(link, "title", "Jump to Link in Article");
    let caret = tree.create_text("^");
    tree.append(link, caret);
    tree.append(sup, link);
    tree.append(small, sup);
    small
}
