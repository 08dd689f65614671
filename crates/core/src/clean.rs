//! Post-extraction cleanup of the assembled article.
//!
//! After the grab, the container still carries forms, junk tables, empty
//! paragraphs and other debris that rode in with the winning block. The
//! passes here run in a fixed order; the conditional ones vote on a set of
//! "fishiness" signals rather than any single measure.

use tracing::debug;

use crate::patterns;
use crate::score::{Flags, ScoreMap, class_id_weight};
use crate::text::{inner_text, link_density, raw_text};
use crate::tree::{NodeId, Tree};

/// Runs all cleanup passes over the article container.
pub fn prep_article(tree: &mut Tree, content: NodeId, scores: &ScoreMap, flags: Flags) {
    clean_conditionally(tree, content, "form", scores, flags);
    clean(tree, content, "object");
    clean(tree, content, "h1");
    clean_headers(tree, content, flags);

    // Run these after the above so already-removed junk cannot skew the votes.
    clean_conditionally(tree, content, "table", scores, flags);
    clean_conditionally(tree, content, "ul", scores, flags);
    clean_conditionally(tree, content, "div", scores, flags);

    remove_empty_paragraphs(tree, content);
    remove_breaks_before_paragraphs(tree, content);
}

/// Removes every element of `tag` under `content`. Embeds hosting a known
/// video service survive.
pub fn clean(tree: &mut Tree, content: NodeId, tag: &str) {
    let is_embed = matches!(tag, "object" | "embed" | "iframe");

    for target in tree.elements_by_tag(content, tag) {
        if is_embed && hosts_video(tree, target) {
            continue;
        }
        tree.detach(target);
    }
}

fn hosts_video(tree: &Tree, id: NodeId) -> bool {
    let attr_values = match tree.tag(id) {
        Some(_) => {
            let mut joined = String::new();
            for name in ["src", "data", "href", "value"] {
                if let Some(v) = tree.attr(id, name) {
                    joined.push_str(v);
                    joined.push('|');
                }
            }
            joined
        }
        None => String::new(),
    };
    patterns::VIDEOS.is_match(&attr_values) || patterns::VIDEOS.is_match(&tree.inner_html(id))
}

/// Removes elements of `tag` that look fishy: hostile class weight, too many
/// images or list items relative to paragraphs, heavy link density, or
/// stray embeds.
pub fn clean_conditionally(tree: &mut Tree, content: NodeId, tag: &str, scores: &ScoreMap, flags: Flags) {
    if !flags.clean_conditionally {
        return;
    }

    for target in tree.elements_by_tag(content, tag) {
        let weight = if flags.weight_classes { class_id_weight(tree, target) } else { 0 };
        let content_score = scores.get(target).unwrap_or(0.0);

        if f64::from(weight) + content_score + 2.0 < 0.0 {
            debug!(tag, weight, content_score, "removing negatively weighted block");
            tree.detach(target);
            continue;
        }

        let text = inner_text(tree, target);
        if text.matches(',').count() >= 10 {
            continue;
        }

        let p = tree.elements_by_tag(target, "p").len() as i64;
        let img = tree.elements_by_tag(target, "img").len() as i64;
        let li = tree.elements_by_tag(target, "li").len() as i64 - 100;
        let input = tree.elements_by_tag(target, "input").len() as i64;

        let embed_count = tree
            .elements_by_tag(target, "embed")
            .iter()
            .filter(|&&e| !tree.attr(e, "src").is_some_and(|src| patterns::VIDEOS.is_match(src)))
            .count() as i64;

        let density = link_density(tree, target);
        let content_length = text.chars().count();

        let fishy = (img > p && img > 1)
            || (li > p && tag != "ul" && tag != "ol")
            || (input > p / 3)
            || (content_length < 25 && (img == 0 || img > 2))
            || (weight < 25 && density > 0.2)
            || (weight >= 25 && density > 0.5)
            || (embed_count == 1 && content_length < 75)
            || embed_count > 1;

        if fishy {
            debug!(tag, content_length, density, "removing fishy block");
            tree.detach(target);
        }
    }
}

/// Removes `<h1>`/`<h2>` headers with hostile class weight or heavy links.
pub fn clean_headers(tree: &mut Tree, content: NodeId, flags: Flags) {
    for level in ["h1", "h2"] {
        for header in tree.elements_by_tag(content, level) {
            let weight = if flags.weight_classes { class_id_weight(tree, header) } else { 0 };
            if weight < 0 || link_density(tree, header) > 0.33 {
                tree.detach(header);
            }
        }
    }
}

/// Paragraphs with no text and no media are leftovers from earlier removals.
fn remove_empty_paragraphs(tree: &mut Tree, content: NodeId) {
    for p in tree.elements_by_tag(content, "p") {
        let has_media = ["img", "embed", "object"]
            .iter()
            .any(|t| !tree.elements_by_tag(p, t).is_empty());
        if !has_media && raw_text(tree, p).trim().is_empty() {
            tree.detach(p);
        }
    }
}

/// A `<br>` directly before a paragraph adds nothing once blocks render.
fn remove_breaks_before_paragraphs(tree: &mut Tree, content: NodeId) {
    for br in tree.elements_by_tag(content, "br") {
        let Some(parent) = tree.parent(br) else { continue };
        let siblings = tree.children(parent).to_vec();
        let Some(pos) = siblings.iter().position(|&s| s == br) else { continue };

        let next_meaningful = siblings[pos + 1..].iter().copied().find(|&s| {
            tree.is_element(s) || tree.text_value(s).is_some_and(|t| !t.trim().is_empty())
        });
        if next_meaningful.is_some_and(|n| tree.tag(n) == Some("p")) {
            tree.detach(br);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text;

    fn parse(body: &str) -> Tree {
        Tree::parse(&format!("<html><body><div id=\"wrap\">{}</div></body></html>", body)).unwrap()
    }

    fn wrap(tree: &Tree) -> NodeId {
        tree.elements_by_tag(tree.root(), "div")[0]
    }

    #[test]
    fn test_clean_removes_all_of_tag() {
        let mut tree = parse("<h1>Header</h1><p>Body text</p><h1>Another</h1>");
        let content = wrap(&tree);
        clean(&mut tree, content, "h1");
        assert!(tree.elements_by_tag(content, "h1").is_empty());
        assert_eq!(tree.elements_by_tag(content, "p").len(), 1);
    }

    #[test]
    fn test_clean_spares_video_embeds() {
        let mut tree = parse(
            r#"<object data="http://www.youtube.com/v/abc"></object><object data="http://ads.example.com/x"></object>"#,
        );
        let content = wrap(&tree);
        clean(&mut tree, content, "object");
        let remaining = tree.elements_by_tag(content, "object");
        assert_eq!(remaining.len(), 1);
        assert!(tree.attr(remaining[0], "data").unwrap().contains("youtube"));
    }

    #[test]
    fn test_conditional_removes_link_heavy_div() {
        let mut tree = parse(
            r#"<div><a href="/a">one link</a> <a href="/b">two link</a> <a href="/c">three link</a> tiny</div>"#,
        );
        let content = wrap(&tree);
        clean_conditionally(&mut tree, content, "div", &ScoreMap::new(), Flags::default());
        assert!(tree.elements_by_tag(content, "div").is_empty());
    }

    #[test]
    fn test_conditional_keeps_comma_rich_block() {
        let mut tree = parse(
            r#"<div><a href="/a">x</a> one, two, three, four, five, six, seven, eight, nine, ten, eleven words</div>"#,
        );
        let content = wrap(&tree);
        clean_conditionally(&mut tree, content, "div", &ScoreMap::new(), Flags::default());
        assert_eq!(tree.elements_by_tag(content, "div").len(), 1);
    }

    #[test]
    fn test_conditional_respects_flag() {
        let mut tree = parse(r#"<div><a href="/a">only a link</a></div>"#);
        let content = wrap(&tree);
        let flags = Flags { clean_conditionally: false, ..Flags::default() };
        clean_conditionally(&mut tree, content, "div", &ScoreMap::new(), flags);
        assert_eq!(tree.elements_by_tag(content, "div").len(), 1);
    }

    #[test]
    fn test_conditional_negative_weight_removal() {
        let mut tree = parse(r#"<table class="sidebar"><tr><td>Links and links, lots of chrome here.</td></tr></table>"#);
        let content = wrap(&tree);
        clean_conditionally(&mut tree, content, "table", &ScoreMap::new(), Flags::default());
        assert!(tree.elements_by_tag(content, "table").is_empty());
    }

    #[test]
    fn test_clean_headers_weight_and_density() {
        let mut tree = parse(
            r#"<h2 class="footer-note">Bad header</h2>
               <h2>Good header staying put</h2>
               <h2><a href="/x">linked header text</a></h2>"#,
        );
        let content = wrap(&tree);
        clean_headers(&mut tree, content, Flags::default());
        let headers = tree.elements_by_tag(content, "h2");
        assert_eq!(headers.len(), 1);
        assert!(text::inner_text(&tree, headers[0]).contains("Good header"));
    }

    #[test]
    fn test_remove_empty_paragraphs_keeps_images() {
        let mut tree = parse(r#"<p>   </p><p><img src="x.png"></p><p>text</p>"#);
        let content = wrap(&tree);
        remove_empty_paragraphs(&mut tree, content);
        assert_eq!(tree.elements_by_tag(content, "p").len(), 2);
    }

    #[test]
    fn test_remove_break_before_paragraph() {
        let mut tree = parse("<p>one</p><br><p>two</p><br><span>span</span>");
        let content = wrap(&tree);
        remove_breaks_before_paragraphs(&mut tree, content);
        assert_eq!(tree.elements_by_tag(content, "br").len(), 1);
    }
}
