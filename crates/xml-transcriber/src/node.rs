/*
 * node.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Node storage for the document arena.
//!
//! Nodes live in a `Vec<NodeData>` owned by the [`Document`](crate::Document)
//! and are addressed by [`NodeId`]. Parent links are plain ids, so a subtree
//! never owns its ancestors and dropping the document frees everything at once.

use crate::Attribute;

/// A typed index into a document's node arena.
///
/// Ids are only meaningful for the document that created them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index)
    }

    pub(crate) fn index(self) -> usize {
        self.0
    }
}

/// The owner of an attached node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parent {
    /// The node is the document's root.
    Document,
    /// The node is a child of another element.
    Node(NodeId),
}

/// What an element holds: text or child elements, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeContent {
    /// Scalar text content.
    Leaf(String),
    /// Ordered child elements. An empty container reads like an empty leaf.
    Container(Vec<NodeId>),
}

impl Default for NodeContent {
    fn default() -> Self {
        NodeContent::Leaf(String::new())
    }
}

/// Storage for one element in the arena.
#[derive(Debug, Clone)]
pub struct NodeData {
    pub(crate) name: String,
    pub(crate) attributes: Vec<Attribute>,
    pub(crate) content: NodeContent,
    pub(crate) parent: Option<Parent>,
}

impl NodeData {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            content: NodeContent::default(),
            parent: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn content(&self) -> &NodeContent {
        &self.content
    }

    pub fn parent(&self) -> Option<Parent> {
        self.parent
    }

    /// Child ids in order; empty for a leaf.
    pub fn children(&self) -> &[NodeId] {
        match &self.content {
            NodeContent::Leaf(_) => &[],
            NodeContent::Container(children) => children,
        }
    }

    /// True when the node has no children and therefore reports a value.
    pub fn is_leaf(&self) -> bool {
        self.children().is_empty()
    }

    /// The scalar value, present only while the node has no children.
    pub fn value(&self) -> Option<&str> {
        match &self.content {
            NodeContent::Leaf(value) => Some(value),
            NodeContent::Container(children) if children.is_empty() => Some(""),
            NodeContent::Container(_) => None,
        }
    }

    pub(crate) fn attribute_position(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a.name() == name)
    }

    /// Insert `child` at `index`. A leaf loses its value and becomes a
    /// container holding only `child`. Callers range-check `index` against
    /// the current child list, which is empty for a leaf.
    pub(crate) fn insert_child(&mut self, index: usize, child: NodeId) {
        match &mut self.content {
            NodeContent::Container(children) => children.insert(index, child),
            NodeContent::Leaf(_) => self.content = NodeContent::Container(vec![child]),
        }
    }
}
