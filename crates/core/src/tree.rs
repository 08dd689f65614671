//! Owned, mutable markup tree.
//!
//! HTML is parsed once with `scraper` and then lifted into an arena of
//! index-addressed nodes. Every later pass (normalizing, scoring, sibling
//! collection, cleaning, footnotes) mutates this owned tree; the caller's
//! input string and the parsed `scraper` document are never touched.
//!
//! Node identity is a plain index ([`NodeId`]), which makes it usable as a
//! key in side-tables such as the score map. Detached nodes stay in the
//! arena (ids remain valid) but are no longer reachable from the root.

use scraper::{Html, Selector};

use crate::{LensError, Result};

/// Identity of a node within its [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Payload of a tree node: an element with tag and attributes, or a text run.
#[derive(Debug, Clone)]
pub enum NodeData {
    Element { tag: String, attrs: Vec<(String, String)> },
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An owned markup tree rooted at the document body.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
    title: Option<String>,
}

/// Elements that never carry children and serialize without a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source", "track", "wbr",
];

/// Elements dropped entirely while lifting the parsed document into the arena.
/// Scripts and styles carry no readable content and would distort text metrics.
const DROPPED_ELEMENTS: &[&str] = &["script", "style", "link", "noscript"];

impl Tree {
    /// Parses an HTML document into an owned tree rooted at its `<body>`.
    ///
    /// `script`, `style`, `link` and `noscript` subtrees are dropped during
    /// the lift. The document `<title>` text is captured separately.
    ///
    /// # Errors
    ///
    /// Returns [`LensError::HtmlParseError`] if the parsed document exposes
    /// no root element to build from.
    pub fn parse(html: &str) -> Result<Self> {
        let doc = Html::parse_document(html);

        let title_sel =
            Selector::parse("title").map_err(|e| LensError::HtmlParseError(format!("invalid selector: {}", e)))?;
        let title = doc
            .select(&title_sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty());

        let body_sel =
            Selector::parse("body").map_err(|e| LensError::HtmlParseError(format!("invalid selector: {}", e)))?;
        let body = doc.select(&body_sel).next().unwrap_or_else(|| doc.root_element());

        let mut tree = Self { nodes: Vec::new(), root: NodeId(0), title };
        let root = tree.lift_element(body.value());
        tree.root = root;
        for child in body.children() {
            tree.lift_node(child, root);
        }

        Ok(tree)
    }

    /// Creates an empty tree holding a single detached-style root element.
    /// Used by tests and by callers assembling synthetic containers.
    pub fn with_root(tag: &str) -> Self {
        let mut tree = Self { nodes: Vec::new(), root: NodeId(0), title: None };
        let root = tree.create_element(tag);
        tree.root = root;
        tree
    }

    fn lift_element(&mut self, el: &scraper::node::Element) -> NodeId {
        let attrs = el.attrs().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        self.push(Node {
            data: NodeData::Element { tag: el.name().to_lowercase(), attrs },
            parent: None,
            children: Vec::new(),
        })
    }

    fn lift_node(&mut self, node_ref: ego_tree::NodeRef<'_, scraper::Node>, parent: NodeId) {
        match node_ref.value() {
            scraper::Node::Element(el) => {
                let tag = el.name().to_lowercase();
                if DROPPED_ELEMENTS.contains(&tag.as_str()) {
                    return;
                }
                let id = self.lift_element(el);
                self.attach(parent, id);
                for child in node_ref.children() {
                    self.lift_node(child, id);
                }
            }
            scraper::Node::Text(text) => {
                let id = self.create_text(text);
                self.attach(parent, id);
            }
            _ => {}
        }
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// The working root (the document body, or the synthetic root).
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The document `<title>` text, if one was present.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Number of nodes ever created in the arena (detached nodes included).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Tag name for element nodes, `None` for text nodes.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].data {
            NodeData::Element { tag, .. } => Some(tag.as_str()),
            NodeData::Text(_) => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.0].data, NodeData::Element { .. })
    }

    /// The text run of a text node, `None` for elements.
    pub fn text_value(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].data {
            NodeData::Text(t) => Some(t.as_str()),
            NodeData::Element { .. } => None,
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[id.0].data {
            NodeData::Element { attrs, .. } => attrs.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str()),
            NodeData::Text(_) => None,
        }
    }

    /// Sets (or replaces) an attribute on an element node.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let NodeData::Element { attrs, .. } = &mut self.nodes[id.0].data {
            if let Some(entry) = attrs.iter_mut().find(|(k, _)| k == name) {
                entry.1 = value.to_string();
            } else {
                attrs.push((name.to_string(), value.to_string()));
            }
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let NodeData::Element { attrs, .. } = &mut self.nodes[id.0].data {
            attrs.retain(|(k, _)| k != name);
        }
    }

    /// The element's class attribute, or `""` when absent.
    pub fn class_name(&self, id: NodeId) -> &str {
        self.attr(id, "class").unwrap_or("")
    }

    /// The element's id attribute, or `""` when absent.
    pub fn element_id(&self, id: NodeId) -> &str {
        self.attr(id, "id").unwrap_or("")
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Creates a new detached element node.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(Node {
            data: NodeData::Element { tag: tag.to_string(), attrs: Vec::new() },
            parent: None,
            children: Vec::new(),
        })
    }

    /// Creates a new detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(Node { data: NodeData::Text(text.to_string()), parent: None, children: Vec::new() })
    }

    /// Renames an element in place, keeping attributes and children.
    pub fn set_tag(&mut self, id: NodeId, new_tag: &str) {
        if let NodeData::Element { tag, .. } = &mut self.nodes[id.0].data {
            *tag = new_tag.to_string();
        }
    }

    /// Detaches a node from its parent. The node stays in the arena but is
    /// no longer reachable from the root.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != id);
        }
    }

    /// Appends `child` as the last child of `parent`, detaching it from any
    /// previous parent first. A node belongs to exactly one parent at a time.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.attach(parent, child);
    }

    /// Inserts `node` immediately after `anchor` in the anchor's parent.
    /// When the anchor is the last child this appends, so the insertion is
    /// total for any attached anchor; a detached anchor is a no-op.
    pub fn insert_after(&mut self, anchor: NodeId, node: NodeId) {
        let Some(parent) = self.nodes[anchor.0].parent else {
            return;
        };
        self.detach(node);
        let pos = self.nodes[parent.0].children.iter().position(|&c| c == anchor);
        match pos {
            Some(i) => self.nodes[parent.0].children.insert(i + 1, node),
            None => self.nodes[parent.0].children.push(node),
        }
        self.nodes[node.0].parent = Some(parent);
    }

    /// Deep-copies a subtree, returning the detached copy's root.
    pub fn clone_subtree(&mut self, id: NodeId) -> NodeId {
        let data = self.nodes[id.0].data.clone();
        let copy = self.push(Node { data, parent: None, children: Vec::new() });
        let children = self.nodes[id.0].children.clone();
        for child in children {
            let child_copy = self.clone_subtree(child);
            self.attach(copy, child_copy);
        }
        copy
    }

    /// All descendants of `id` in document (pre) order, excluding `id`.
    /// Returns a snapshot so callers may mutate the tree while iterating.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_descendants(id, &mut out);
        out
    }

    fn collect_descendants(&self, id: NodeId, out: &mut Vec<NodeId>) {
        for &child in &self.nodes[id.0].children {
            out.push(child);
            self.collect_descendants(child, out);
        }
    }

    /// Descendant elements with the given tag, in document order.
    pub fn elements_by_tag(&self, root: NodeId, tag: &str) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|&d| self.tag(d) == Some(tag))
            .collect()
    }

    /// Descendant elements matching any of the given tags, in document order.
    pub fn elements_by_tags(&self, root: NodeId, tags: &[&str]) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|&d| self.tag(d).is_some_and(|t| tags.contains(&t)))
            .collect()
    }

    /// Serialized markup of the node's children.
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in &self.nodes[id.0].children {
            self.write_node(child, &mut out);
        }
        out
    }

    /// Serialized markup of the node itself, children included.
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id.0].data {
            NodeData::Text(t) => out.push_str(&escape_text(t)),
            NodeData::Element { tag, attrs } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(value));
                    out.push('"');
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&tag.as_str()) {
                    return;
                }
                for &child in &self.nodes[id.0].children {
                    self.write_node(child, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;").replace('"', "&quot;").replace('<', "&lt;").replace('>', "&gt;")
}
