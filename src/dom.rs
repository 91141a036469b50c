//! Lightweight document tree for rendered sections.
//!
//! The canvas renders each placed section into a subtree of this arena. Nodes
//! are addressed by stable [`NodeId`] handles so the inline-edit overlay and
//! the override projector can both hold references to live elements without
//! fighting over ownership of the tree itself.

use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Stable handle to a node in a [`Dom`] arena.
///
/// Ids are never reused within one arena, so a stored id either resolves to
/// the node it was created for or to nothing at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Node payload: an element with attributes, or a bare text run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// An element such as `<h1>` or `<section>`.
    Element {
        /// Lowercase tag name.
        tag: String,
        /// CSS classes, kept in application order.
        classes: Vec<String>,
        /// Inline style declarations, sorted by property for stable output.
        styles: BTreeMap<String, String>,
    },
    /// A text run.
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    children: Vec<NodeId>,
}

/// Arena-backed document tree.
///
/// Roots are owned by the caller; the arena itself only stores nodes and
/// parent/child edges. Detached subtrees stay in the arena (there is no
/// garbage collection), which is fine for a canvas that is re-rendered
/// wholesale on structural changes.
#[derive(Debug, Clone, Default)]
pub struct Dom {
    nodes: Vec<NodeData>,
}

impl Dom {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an element node with the given tag.
    pub fn create_element(&mut self, tag: impl Into<String>) -> NodeId {
        self.push(NodeKind::Element {
            tag: tag.into().to_lowercase(),
            classes: Vec::new(),
            styles: BTreeMap::new(),
        })
    }

    /// Creates a text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::Text(text.into()))
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            children: Vec::new(),
        });
        id
    }

    /// Appends `child` to `parent`'s child list.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.0].children.push(child);
    }

    /// Returns the tag name of an element node, or `None` for text nodes.
    #[must_use]
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Element { tag, .. } => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    /// Returns the children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Finds the first element with the given tag in depth-first order,
    /// starting at (and including) `root`.
    ///
    /// This is the lookup behind tag-keyed text overrides: only the first
    /// match per section is ever addressed.
    #[must_use]
    pub fn first_by_tag(&self, root: NodeId, tag: &str) -> Option<NodeId> {
        let tag = tag.to_lowercase();
        self.first_by_tag_inner(root, &tag)
    }

    fn first_by_tag_inner(&self, node: NodeId, tag: &str) -> Option<NodeId> {
        if self.tag(node) == Some(tag) {
            return Some(node);
        }
        for child in &self.nodes[node.0].children {
            if let Some(found) = self.first_by_tag_inner(*child, tag) {
                return Some(found);
            }
        }
        None
    }

    /// True when `node` lives in the subtree rooted at `root` (inclusive).
    #[must_use]
    pub fn contains(&self, root: NodeId, node: NodeId) -> bool {
        if root == node {
            return true;
        }
        self.nodes[root.0]
            .children
            .iter()
            .any(|child| self.contains(*child, node))
    }

    /// Concatenated content of an element's direct text-node children.
    ///
    /// Element children (icons, nested spans) do not contribute; they are
    /// opaque to inline editing.
    #[must_use]
    pub fn direct_text(&self, id: NodeId) -> String {
        let mut out = String::new();
        for child in &self.nodes[id.0].children {
            if let NodeKind::Text(text) = &self.nodes[child.0].kind {
                out.push_str(text);
            }
        }
        out
    }

    /// Replaces the textual content of an element while preserving element
    /// children.
    ///
    /// The first text-node child receives the new text and any further
    /// text-node children are removed. An element with no text-node child
    /// (e.g. a button holding only an icon) gets the text appended as a new
    /// trailing text node; nothing else is touched.
    pub fn set_direct_text(&mut self, id: NodeId, text: &str) {
        let text_children: Vec<NodeId> = self.nodes[id.0]
            .children
            .iter()
            .copied()
            .filter(|c| matches!(self.nodes[c.0].kind, NodeKind::Text(_)))
            .collect();

        match text_children.split_first() {
            Some((first, rest)) => {
                self.nodes[first.0].kind = NodeKind::Text(text.to_string());
                let rest: Vec<NodeId> = rest.to_vec();
                self.nodes[id.0].children.retain(|c| !rest.contains(c));
            }
            None => {
                let node = self.create_text(text);
                self.append_child(id, node);
            }
        }
    }

    /// Returns the classes of an element node.
    #[must_use]
    pub fn classes(&self, id: NodeId) -> &[String] {
        match &self.nodes[id.0].kind {
            NodeKind::Element { classes, .. } => classes,
            NodeKind::Text(_) => &[],
        }
    }

    /// Adds a class if not already present. No-op on text nodes.
    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if let NodeKind::Element { classes, .. } = &mut self.nodes[id.0].kind {
            if !classes.iter().any(|c| c == class) {
                classes.push(class.to_string());
            }
        }
    }

    /// Removes a class if present.
    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        if let NodeKind::Element { classes, .. } = &mut self.nodes[id.0].kind {
            classes.retain(|c| c != class);
        }
    }

    /// Replaces the entire class list of an element.
    pub fn set_classes(&mut self, id: NodeId, new_classes: &[String]) {
        if let NodeKind::Element { classes, .. } = &mut self.nodes[id.0].kind {
            *classes = new_classes.to_vec();
        }
    }

    /// Sets an inline style declaration.
    pub fn set_style(&mut self, id: NodeId, property: &str, value: &str) {
        if let NodeKind::Element { styles, .. } = &mut self.nodes[id.0].kind {
            styles.insert(property.to_string(), value.to_string());
        }
    }

    /// Removes an inline style declaration.
    pub fn remove_style(&mut self, id: NodeId, property: &str) {
        if let NodeKind::Element { styles, .. } = &mut self.nodes[id.0].kind {
            styles.remove(property);
        }
    }

    /// Returns an inline style value, if set.
    #[must_use]
    pub fn style(&self, id: NodeId, property: &str) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Element { styles, .. } => styles.get(property).map(String::as_str),
            NodeKind::Text(_) => None,
        }
    }

    /// Serializes a subtree to HTML.
    ///
    /// Output is deterministic: classes in application order, styles sorted
    /// by property name. Used by the preview surface and by tests asserting
    /// projector idempotence.
    #[must_use]
    pub fn to_html(&self, root: NodeId) -> String {
        let mut out = String::new();
        self.write_html(root, &mut out);
        out
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id.0].kind {
            NodeKind::Text(text) => out.push_str(&escape_text(text)),
            NodeKind::Element {
                tag,
                classes,
                styles,
            } => {
                let _ = write!(out, "<{tag}");
                if !classes.is_empty() {
                    let _ = write!(out, " class=\"{}\"", escape_attr(&classes.join(" ")));
                }
                if !styles.is_empty() {
                    let style: Vec<String> =
                        styles.iter().map(|(k, v)| format!("{k}: {v}")).collect();
                    let _ = write!(out, " style=\"{}\"", escape_attr(&style.join("; ")));
                }
                out.push('>');
                for child in &self.nodes[id.0].children {
                    self.write_html(*child, out);
                }
                let _ = write!(out, "</{tag}>");
            }
        }
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(text: &str) -> String {
    escape_text(text).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(dom: &mut Dom) -> NodeId {
        let section = dom.create_element("section");
        let h1 = dom.create_element("h1");
        let text = dom.create_text("Hello");
        dom.append_child(h1, text);
        dom.append_child(section, h1);
        section
    }

    #[test]
    fn test_first_by_tag_depth_first() {
        let mut dom = Dom::new();
        let root = dom.create_element("div");
        let outer_p = dom.create_element("p");
        let inner = dom.create_element("div");
        let inner_p = dom.create_element("p");
        dom.append_child(inner, inner_p);
        dom.append_child(root, inner);
        dom.append_child(root, outer_p);

        // inner div comes first in document order, so its p wins
        assert_eq!(dom.first_by_tag(root, "p"), Some(inner_p));
        assert_eq!(dom.first_by_tag(root, "h1"), None);
    }

    #[test]
    fn test_first_by_tag_matches_root() {
        let mut dom = Dom::new();
        let root = sample(&mut dom);
        assert_eq!(dom.first_by_tag(root, "section"), Some(root));
    }

    #[test]
    fn test_direct_text_ignores_element_children() {
        let mut dom = Dom::new();
        let button = dom.create_element("button");
        let icon = dom.create_element("svg");
        let label = dom.create_text("Get Started");
        dom.append_child(button, icon);
        dom.append_child(button, label);

        assert_eq!(dom.direct_text(button), "Get Started");
    }

    #[test]
    fn test_set_direct_text_preserves_icon_children() {
        let mut dom = Dom::new();
        let button = dom.create_element("button");
        let icon = dom.create_element("svg");
        let label = dom.create_text("Get Started");
        dom.append_child(button, icon);
        dom.append_child(button, label);

        dom.set_direct_text(button, "Sign Up");

        assert_eq!(dom.direct_text(button), "Sign Up");
        // Icon survives
        assert_eq!(dom.children(button).len(), 2);
        assert_eq!(dom.tag(dom.children(button)[0]), Some("svg"));
    }

    #[test]
    fn test_set_direct_text_appends_when_no_text_child() {
        let mut dom = Dom::new();
        let button = dom.create_element("button");
        let icon = dom.create_element("svg");
        dom.append_child(button, icon);

        dom.set_direct_text(button, "Download");

        // Appended as a new trailing text node, no leading space, icon intact
        assert_eq!(dom.direct_text(button), "Download");
        assert_eq!(dom.children(button).len(), 2);
        assert_eq!(dom.tag(dom.children(button)[0]), Some("svg"));
    }

    #[test]
    fn test_set_direct_text_collapses_multiple_text_children() {
        let mut dom = Dom::new();
        let p = dom.create_element("p");
        let a = dom.create_text("Hello ");
        let b = dom.create_text("world");
        dom.append_child(p, a);
        dom.append_child(p, b);

        dom.set_direct_text(p, "Goodbye");

        assert_eq!(dom.direct_text(p), "Goodbye");
        assert_eq!(dom.children(p).len(), 1);
    }

    #[test]
    fn test_class_add_remove_idempotent() {
        let mut dom = Dom::new();
        let root = sample(&mut dom);

        dom.add_class(root, "ring-2");
        dom.add_class(root, "ring-2");
        assert_eq!(dom.classes(root), ["ring-2".to_string()]);

        dom.remove_class(root, "ring-2");
        assert!(dom.classes(root).is_empty());
        dom.remove_class(root, "ring-2");
        assert!(dom.classes(root).is_empty());
    }

    #[test]
    fn test_to_html_deterministic() {
        let mut dom = Dom::new();
        let root = sample(&mut dom);
        dom.add_class(root, "py-8");
        dom.set_style(root, "background-size", "cover");
        dom.set_style(root, "background-image", "url('/uploads/a.png')");

        let html = dom.to_html(root);
        assert_eq!(
            html,
            "<section class=\"py-8\" style=\"background-image: url('/uploads/a.png'); \
             background-size: cover\"><h1>Hello</h1></section>"
        );
        // Re-serialization of unchanged state is identical
        assert_eq!(dom.to_html(root), html);
    }

    #[test]
    fn test_to_html_escapes_text() {
        let mut dom = Dom::new();
        let p = dom.create_element("p");
        let t = dom.create_text("a < b & c");
        dom.append_child(p, t);
        assert_eq!(dom.to_html(p), "<p>a &lt; b &amp; c</p>");
    }
}
