//! Document-level types.

use serde::{Deserialize, Serialize};

use super::{Node, NodeKind};

/// A parsed note: the validated content of `doc.content`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Top-level nodes in document order
    pub content: Vec<Node>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document from top-level nodes.
    pub fn with_content(content: Vec<Node>) -> Self {
        Self { content }
    }

    /// Add a top-level node.
    pub fn push(&mut self, node: Node) {
        self.content.push(node);
    }

    /// Check if the document has no content.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Iterate over every node, depth-first in document order.
    pub fn nodes(&self) -> Nodes<'_> {
        Nodes {
            stack: self.content.iter().rev().map(|n| (n, 1)).collect(),
        }
    }

    /// Total number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        self.nodes().count()
    }

    /// Deepest nesting level (top-level nodes are depth 1).
    pub fn max_depth(&self) -> usize {
        self.nodes().depths().max().unwrap_or(0)
    }

    /// Count nodes outside the renderer's catalog.
    pub fn unknown_node_count(&self) -> usize {
        self.nodes().filter(|n| n.kind.is_unknown()).count()
    }

    /// Count nodes of the given kind.
    pub fn count_kind(&self, kind: &NodeKind) -> usize {
        self.nodes().filter(|n| &n.kind == kind).count()
    }

    /// Concatenated text of all text nodes.
    pub fn plain_text(&self) -> String {
        self.nodes()
            .filter(|n| n.kind == NodeKind::Text)
            .map(Node::text_str)
            .collect()
    }
}

/// Depth-first iterator over a document tree, driven by an explicit stack.
pub struct Nodes<'a> {
    stack: Vec<(&'a Node, usize)>,
}

impl<'a> Nodes<'a> {
    fn next_with_depth(&mut self) -> Option<(&'a Node, usize)> {
        let (node, depth) = self.stack.pop()?;
        self.stack
            .extend(node.content.iter().rev().map(|child| (child, depth + 1)));
        Some((node, depth))
    }

    /// Consume the iterator yielding the depth of each node instead.
    pub fn depths(mut self) -> impl Iterator<Item = usize> + 'a {
        std::iter::from_fn(move || self.next_with_depth().map(|(_, d)| d))
    }
}

impl<'a> Iterator for Nodes<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_with_depth().map(|(node, _)| node)
    }
}
