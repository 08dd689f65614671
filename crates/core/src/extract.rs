//! Candidate scoring and article grabbing.
//!
//! The pipeline mirrors the classic three-phase shape: normalize the tree
//! (strip unlikely blocks, promote childless divs to paragraphs), score
//! paragraph-like nodes into their ancestors, then pick the best-scoring
//! ancestor and pull in any siblings that look like they belong.
//!
//! Everything operates on an owned working tree. On failure the caller just
//! drops the tree; there is nothing to roll back.

use tracing::debug;

use crate::clean;
use crate::score::{Flags, ScoreMap};
use crate::text::{inner_text, link_density, raw_text, text_length};
use crate::tree::{NodeId, Tree};
use crate::{LensError, Result, patterns};

/// Minimum page text for a document to be considered readable at all.
pub const MIN_BASELINE: usize = 300;

/// Minimum extracted text for the result to be kept.
pub const MIN_ARTICLE: usize = 250;

/// Alternative acceptance: extracted text as a share of the page baseline.
pub const MIN_YIELD_RATIO: f64 = 0.65;

/// Paragraph-like text shorter than this contributes no score.
const MIN_SCORABLE: usize = 25;

/// Tags whose presence inside a `<div>` blocks its promotion to `<p>`.
const BLOCKING_TAGS: &[&str] = &["a", "blockquote", "dl", "div", "img", "ol", "p", "pre", "table", "ul"];

/// Outcome of a successful grab.
#[derive(Debug)]
pub struct Extraction {
    /// Container element holding the assembled article.
    pub content: NodeId,
    /// Combined paragraph text of the page, measured after normalization.
    pub baseline: usize,
    /// Scores accumulated during the grab, for later cleaning decisions.
    pub scores: ScoreMap,
}

/// Runs the full grab over a working tree.
///
/// # Errors
///
/// Returns [`LensError::NoContent`] when the page text is below the
/// readability baseline, no candidate scores, or the assembled article
/// fails the yield check.
pub fn grab_article(tree: &mut Tree, flags: Flags) -> Result<Extraction> {
    let scorable = normalize(tree, flags);

    let baseline = content_text_length(tree, tree.root());
    if baseline < MIN_BASELINE {
        debug!(baseline, "page text below readability baseline");
        return Err(LensError::NoContent);
    }

    let mut scores = ScoreMap::new();
    score_candidates(tree, &scorable, &mut scores, flags);

    let (top, top_score) = select_top(tree, &mut scores, flags);
    debug!(top_score, "selected top candidate");

    let content = collect_siblings(tree, top, top_score, &scores);
    clean::prep_article(tree, content, &scores, flags);

    let yield_len = content_text_length(tree, content);
    let ratio = yield_len as f64 / baseline as f64;
    if yield_len < MIN_ARTICLE || ratio < MIN_YIELD_RATIO {
        debug!(yield_len, ratio, "extraction below yield threshold");
        return Err(LensError::NoContent);
    }

    Ok(Extraction { content, baseline, scores })
}

/// Total text carried by the `p`, `td` and `pre` descendants of `root`.
/// This is the measure both the readability baseline and the post-clean
/// yield check are taken over.
pub fn content_text_length(tree: &Tree, root: NodeId) -> usize {
    tree.elements_by_tags(root, &["p", "td", "pre"])
        .iter()
        .map(|&n| raw_text(tree, n).chars().count())
        .sum()
}

/// First pass: drop chrome-looking blocks and promote text-only divs to
/// paragraphs. Returns the paragraph-like nodes worth scoring.
fn normalize(tree: &mut Tree, flags: Flags) -> Vec<NodeId> {
    let mut scorable = Vec::new();
    visit(tree, tree.root(), flags, &mut scorable);
    scorable
}

fn visit(tree: &mut Tree, parent: NodeId, flags: Flags, scorable: &mut Vec<NodeId>) {
    let children: Vec<NodeId> = tree.children(parent).to_vec();
    for child in children {
        let Some(tag) = tree.tag(child).map(str::to_string) else {
            continue;
        };

        if flags.strip_unlikely {
            let match_string = format!("{} {}", tree.class_name(child), tree.element_id(child));
            if patterns::UNLIKELY_CANDIDATES.is_match(&match_string)
                && !patterns::OK_MAYBE_CANDIDATE.is_match(&match_string)
                && tag != "body"
                && !within_code_block(tree, child)
            {
                debug!(tag, match_string, "removing unlikely candidate");
                tree.detach(child);
                continue;
            }
        }

        match tag.as_str() {
            "p" | "td" | "pre" => scorable.push(child),
            "div" => {
                if !has_blocking_descendant(tree, child) {
                    tree.set_tag(child, "p");
                    scorable.push(child);
                }
            }
            _ => {}
        }

        visit(tree, child, flags, scorable);
    }
}

fn has_blocking_descendant(tree: &Tree, id: NodeId) -> bool {
    tree.descendants(id)
        .iter()
        .any(|&d| tree.tag(d).is_some_and(|t| BLOCKING_TAGS.contains(&t)))
}

/// Whether the node sits inside a `<code>` or `<pre>` ancestor, looking at
/// most ten levels up.
fn within_code_block(tree: &Tree, id: NodeId) -> bool {
    let mut current = tree.parent(id);
    for _ in 0..10 {
        let Some(node) = current else { return false };
        if matches!(tree.tag(node), Some("code") | Some("pre")) {
            return true;
        }
        current = tree.parent(node);
    }
    false
}

/// Second pass: each paragraph-like node feeds its parent and grandparent.
fn score_candidates(tree: &Tree, scorable: &[NodeId], scores: &mut ScoreMap, flags: Flags) {
    for &node in scorable {
        let Some(parent) = tree.parent(node) else { continue };
        let text = inner_text(tree, node);
        let len = text.chars().count();
        if len < MIN_SCORABLE {
            continue;
        }

        let mut delta = 1.0;
        delta += (text.matches(',').count() + 1) as f64;
        delta += (len / 100).min(3) as f64;

        scores.initialize(tree, parent, flags);
        scores.add(parent, delta);

        if let Some(grandparent) = tree.parent(parent) {
            scores.initialize(tree, grandparent, flags);
            scores.add(grandparent, delta / 2.0);
        }
    }
}

/// Third pass: discount candidates by link density and pick the winner in
/// document order. Falls back to wrapping the whole body when nothing
/// scored, so a flat page still yields its full text.
fn select_top(tree: &mut Tree, scores: &mut ScoreMap, flags: Flags) -> (NodeId, f64) {
    let mut top: Option<(NodeId, f64)> = None;

    let root = tree.root();
    let mut order = vec![root];
    order.extend(tree.descendants(root));
    for id in order {
        let Some(score) = scores.get(id) else { continue };
        let adjusted = score * (1.0 - link_density(tree, id));
        scores.set(id, adjusted);
        match top {
            Some((_, best)) if adjusted <= best => {}
            _ => top = Some((id, adjusted)),
        }
    }

    match top {
        Some((id, score)) if id != root => (id, score),
        _ => {
            let wrapper = tree.create_element("div");
            let children: Vec<NodeId> = tree.children(root).to_vec();
            for child in children {
                tree.append(wrapper, child);
            }
            tree.append(root, wrapper);
            scores.initialize(tree, wrapper, flags);
            let score = scores.get(wrapper).unwrap_or(0.0);
            (wrapper, score)
        }
    }
}

/// Fourth pass: gather the winner and any siblings that clear the threshold
/// into a fresh detached container.
fn collect_siblings(tree: &mut Tree, top: NodeId, top_score: f64, scores: &ScoreMap) -> NodeId {
    let content = tree.create_element("div");
    tree.set_attr(content, "id", "lens-content");

    let threshold = (top_score * 0.2).max(10.0);
    let top_class = tree.class_name(top).to_string();

    let siblings: Vec<NodeId> = match tree.parent(top) {
        Some(parent) => tree.children(parent).to_vec(),
        None => vec![top],
    };

    for sibling in siblings {
        let mut keep = sibling == top;

        if !keep {
            let mut bonus = 0.0;
            if !top_class.is_empty() && tree.class_name(sibling) == top_class {
                bonus = top_score * 0.2;
            }
            if let Some(score) = scores.get(sibling) {
                if score + bonus >= threshold {
                    keep = true;
                }
            }
        }

        if !keep && tree.tag(sibling) == Some("p") {
            let len = text_length(tree, sibling);
            let density = link_density(tree, sibling);
            if len > 80 && density < 0.25 {
                keep = true;
            } else if len <= 80 && density == 0.0 && patterns::SENTENCE_END.is_match(&inner_text(tree, sibling)) {
                keep = true;
            }
        }

        if keep {
            if !matches!(tree.tag(sibling), Some("div") | Some("p")) {
                tree.set_tag(sibling, "div");
            }
            // Appended nodes shed their classname so they cannot drag site
            // style hooks into the article.
            tree.remove_attr(sibling, "class");
            tree.append(content, sibling);
        }
    }

    content
}
