//! Text metrics over the working tree.
//!
//! All of the scoring heuristics reduce to a handful of measurements on the
//! visible text of a subtree: normalized inner text, character counts, the
//! share of text sitting inside links, and a cheap edit distance used when
//! comparing candidate next-page URLs.

use std::sync::LazyLock;

use regex::Regex;

use crate::tree::{NodeId, Tree};

static WHITESPACE_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}").unwrap());

/// Concatenated text of all text nodes under `id`, in document order,
/// trimmed and with whitespace runs collapsed to single spaces.
pub fn inner_text(tree: &Tree, id: NodeId) -> String {
    let raw = raw_text(tree, id);
    WHITESPACE_RUNS.replace_all(raw.trim(), " ").into_owned()
}

/// Concatenated text without any whitespace normalization.
pub fn raw_text(tree: &Tree, id: NodeId) -> String {
    let mut out = String::new();
    collect_text(tree, id, &mut out);
    out
}

fn collect_text(tree: &Tree, id: NodeId, out: &mut String) {
    if let Some(text) = tree.text_value(id) {
        out.push_str(text);
        return;
    }
    for &child in tree.children(id) {
        collect_text(tree, child, out);
    }
}

/// Character count of the normalized inner text.
pub fn text_length(tree: &Tree, id: NodeId) -> usize {
    inner_text(tree, id).chars().count()
}

/// Number of commas in the normalized inner text.
pub fn comma_count(tree: &Tree, id: NodeId) -> usize {
    inner_text(tree, id).matches(',').count()
}

/// Share of the subtree's text that sits inside `<a>` descendants.
///
/// An empty subtree counts as fully linked: a node with no text at all
/// carries no content worth keeping, so it takes the maximum discount.
pub fn link_density(tree: &Tree, id: NodeId) -> f64 {
    let total = text_length(tree, id);
    if total == 0 {
        return 1.0;
    }
    let linked: usize = tree
        .elements_by_tag(id, "a")
        .iter()
        .map(|&a| text_length(tree, a))
        .sum();
    linked as f64 / total as f64
}

/// Distance between two strings: the length difference plus the number of
/// mismatched positions over the shorter string's length. Used to reject
/// next-page candidates that diverge wildly from the current location.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let common = a.len().min(b.len());
    let mismatches = (0..common).filter(|&i| a[i] != b[i]).count();
    a.len().abs_diff(b.len()) + mismatches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> Tree {
        Tree::parse(
            r#"<html><body>
                <div id="box">
                    <p>Hello,   world, again</p>
                    <p>Visit <a href="/x">this link</a> now</p>
                </div>
            </body></html>"#,
        )
        .unwrap()
    }

    #[test]
    fn test_inner_text_normalizes_whitespace() {
        let tree = sample_tree();
        let div = tree.elements_by_tag(tree.root(), "div")[0];
        assert_eq!(inner_text(&tree, div), "Hello, world, again Visit this link now");
    }

    #[test]
    fn test_comma_count() {
        let tree = sample_tree();
        let div = tree.elements_by_tag(tree.root(), "div")[0];
        assert_eq!(comma_count(&tree, div), 2);
    }

    #[test]
    fn test_link_density_partial() {
        let tree = sample_tree();
        let ps = tree.elements_by_tag(tree.root(), "p");
        let density = link_density(&tree, ps[1]);
        // "Visit this link now" = 19 chars, "this link" = 9 linked
        assert!((density - 9.0 / 19.0).abs() < 1e-9);
    }

    #[test]
    fn test_link_density_empty_is_one() {
        let mut tree = Tree::with_root("div");
        let root = tree.root();
        let empty = tree.create_element("p");
        tree.append(root, empty);
        assert_eq!(link_density(&tree, empty), 1.0);
    }

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("abc", "abc"), 0);
        assert_eq!(edit_distance("abc", "abd"), 1);
        assert_eq!(edit_distance("abc", "abcdef"), 3);
        assert_eq!(edit_distance("xbc", "abcdef"), 4);
        assert_eq!(edit_distance("", "abc"), 3);
    }
}
