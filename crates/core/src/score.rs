//! Content scoring primitives.
//!
//! Scores live in a side-table keyed by node id rather than on the nodes
//! themselves, so a scoring pass never dirties the markup it measures.

use std::collections::HashMap;

use crate::patterns;
use crate::tree::{NodeId, Tree};

/// Tunable behavior switches for a single extraction attempt.
///
/// All three default to on. When extraction of a fetched page comes back
/// empty the switches are restored to this state before the next page, so a
/// hostile page layout cannot poison the rest of the series.
#[derive(Debug, Clone, Copy)]
pub struct Flags {
    /// Remove blocks whose class/id look like chrome before scoring.
    pub strip_unlikely: bool,
    /// Let class/id fragments raise or lower block scores.
    pub weight_classes: bool,
    /// Run the fishiness vote over tables, lists and divs after extraction.
    pub clean_conditionally: bool,
}

impl Default for Flags {
    fn default() -> Self {
        Self { strip_unlikely: true, weight_classes: true, clean_conditionally: true }
    }
}

/// Side-table of content scores, keyed by node id.
#[derive(Debug, Default)]
pub struct ScoreMap {
    scores: HashMap<NodeId, f64>,
}

impl ScoreMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the node has been initialized as a candidate.
    pub fn contains(&self, id: NodeId) -> bool {
        self.scores.contains_key(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<f64> {
        self.scores.get(&id).copied()
    }

    pub fn add(&mut self, id: NodeId, delta: f64) {
        if let Some(score) = self.scores.get_mut(&id) {
            *score += delta;
        }
    }

    pub fn set(&mut self, id: NodeId, score: f64) {
        self.scores.insert(id, score);
    }

    /// Registers a node as a candidate, seeding it with its tag's base score
    /// plus its class/id weight. Repeat calls are no-ops so that a node's
    /// accumulated score survives being visited from several children.
    pub fn initialize(&mut self, tree: &Tree, id: NodeId, flags: Flags) {
        if self.contains(id) {
            return;
        }
        let base = tag_score(tree.tag(id).unwrap_or(""));
        let weight = if flags.weight_classes { class_id_weight(tree, id) } else { 0 };
        self.scores.insert(id, base + f64::from(weight));
    }
}

/// Base score contributed by an element's tag.
fn tag_score(tag: &str) -> f64 {
    match tag {
        "div" => 5.0,
        "pre" | "td" | "blockquote" => 3.0,
        "address" | "ol" | "ul" | "dl" | "dd" | "dt" | "li" | "form" => -3.0,
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "th" => -5.0,
        _ => 0.0,
    }
}

/// Weight derived from an element's class and id attributes.
///
/// The class and the id each contribute ±25, judged independently against
/// the negative and positive fragment lists.
pub fn class_id_weight(tree: &Tree, id: NodeId) -> i32 {
    let mut weight = 0;

    let class = tree.class_name(id);
    if !class.is_empty() {
        if patterns::NEGATIVE.is_match(class) {
            weight -= 25;
        }
        if patterns::POSITIVE.is_match(class) {
            weight += 25;
        }
    }

    let elem_id = tree.element_id(id);
    if !elem_id.is_empty() {
        if patterns::NEGATIVE.is_match(elem_id) {
            weight -= 25;
        }
        if patterns::POSITIVE.is_match(elem_id) {
            weight += 25;
        }
    }

    weight
}
