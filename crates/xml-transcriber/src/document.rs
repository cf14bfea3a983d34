/*
 * document.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The document: declaration metadata plus an arena of element nodes.
//!
//! Every tree operation goes through the [`Document`]: `&Document` for
//! navigation, `&mut Document` for mutation. Nodes are created detached with
//! [`Document::create_node`] and attached with one of the insertion methods.
//! All insertions reduce to [`Document::insert_at`], which detaches the node
//! from its previous owner before attaching it, so a node can never appear in
//! two child lists at once.

use crate::node::{NodeContent, NodeData, NodeId, Parent};
use crate::transcriber::Transcriber;
use crate::{Attribute, Error, Result};
use serde::Serialize;
use std::io::{Cursor, Write};
use std::path::Path;

/// Metadata from the XML declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Declaration {
    encoding: String,
    version: String,
    system_id: String,
    standalone: bool,
}

impl Default for Declaration {
    fn default() -> Self {
        Self {
            encoding: "UTF-8".to_string(),
            version: "1.0".to_string(),
            system_id: String::new(),
            standalone: false,
        }
    }
}

impl Declaration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_system_id(mut self, system_id: impl Into<String>) -> Self {
        self.system_id = system_id.into();
        self
    }

    pub fn with_standalone(mut self, standalone: bool) -> Self {
        self.standalone = standalone;
        self
    }

    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn system_id(&self) -> &str {
        &self.system_id
    }

    pub fn is_standalone(&self) -> bool {
        self.standalone
    }
}

/// An XML document owning its element tree.
///
/// # Example
///
/// ```rust
/// use xml_transcriber::Document;
///
/// let mut doc = Document::new();
/// let root = doc.create_node("root").unwrap();
/// let item = doc.create_leaf("item", "1").unwrap();
/// doc.append(root, item).unwrap();
/// doc.set_root(root);
///
/// assert_eq!(doc.root().unwrap(), root);
/// assert_eq!(doc.value(item), Some("1"));
/// assert_eq!(doc.value(root), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Document {
    declaration: Declaration,
    nodes: Vec<NodeData>,
    root: Option<NodeId>,
}

impl Document {
    /// Create an empty document with the default declaration
    /// (`UTF-8`, `1.0`, no system id, not standalone).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_declaration(declaration: Declaration) -> Self {
        Self {
            declaration,
            nodes: Vec::new(),
            root: None,
        }
    }

    pub fn declaration(&self) -> &Declaration {
        &self.declaration
    }

    pub fn encoding(&self) -> &str {
        self.declaration.encoding()
    }

    pub fn version(&self) -> &str {
        self.declaration.version()
    }

    pub fn system_id(&self) -> &str {
        self.declaration.system_id()
    }

    pub fn is_standalone(&self) -> bool {
        self.declaration.is_standalone()
    }

    // ==================== Nodes ====================

    /// Create a detached element with an empty value.
    ///
    /// The arena only grows. A node that is later detached and never
    /// reattached keeps its slot until the `Document` is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `name` is empty.
    pub fn create_node(&mut self, name: impl Into<String>) -> Result<NodeId> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::invalid_argument("element name cannot be empty"));
        }
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(NodeData::new(name));
        Ok(id)
    }

    /// Create a detached element holding `value`.
    pub fn create_leaf(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<NodeId> {
        let id = self.create_node(name)?;
        self.node_mut(id).content = NodeContent::Leaf(value.into());
        Ok(id)
    }

    /// Access the stored node.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not created by this document.
    pub fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.index()]
    }

    /// Number of nodes ever created in this document, attached or not.
    ///
    /// Slots are never reclaimed, so this never decreases; compare with
    /// [`element_count`](Self::element_count) for the nodes reachable from
    /// the root.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn name(&self, id: NodeId) -> &str {
        self.node(id).name()
    }

    pub fn parent(&self, id: NodeId) -> Option<Parent> {
        self.node(id).parent()
    }

    // ==================== Root ====================

    /// The root element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if no root has been set.
    pub fn root(&self) -> Result<NodeId> {
        self.root
            .ok_or_else(|| Error::invalid_state("document has no root element"))
    }

    pub fn has_root(&self) -> bool {
        self.root.is_some()
    }

    /// Make `node` the root element, returning the previous root.
    ///
    /// The node is first detached from wherever it was attached. The previous
    /// root, if different, ends up fully detached.
    pub fn set_root(&mut self, node: NodeId) -> Option<NodeId> {
        if self.root == Some(node) {
            return None;
        }
        self.detach(node);
        let previous = self.root.take();
        if let Some(old) = previous {
            self.node_mut(old).parent = None;
        }
        self.root = Some(node);
        self.node_mut(node).parent = Some(Parent::Document);
        previous
    }

    // ==================== Children ====================

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).children()
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.children(id).len()
    }

    pub fn has_children(&self, id: NodeId) -> bool {
        !self.children(id).is_empty()
    }

    /// The child at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if `index >= child_count(id)`.
    pub fn child_at(&self, id: NodeId, index: usize) -> Result<NodeId> {
        let children = self.children(id);
        children.get(index).copied().ok_or(Error::OutOfRange {
            index,
            max: children.len().saturating_sub(1),
        })
    }

    pub fn child_index(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.children(parent).iter().position(|c| *c == child)
    }

    pub fn contains_child(&self, parent: NodeId, child: NodeId) -> bool {
        self.child_index(parent, child).is_some()
    }

    pub fn first_child_named(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|c| self.name(*c) == name)
    }

    pub fn has_child_named(&self, id: NodeId, name: &str) -> bool {
        self.first_child_named(id, name).is_some()
    }

    /// Direct children named `name`, in order.
    pub fn elements_by_name(&self, id: NodeId, name: &str) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|c| self.name(*c) == name)
            .collect()
    }

    /// Direct children whose current value equals `value`, in order.
    /// Containers never match.
    pub fn elements_by_value(&self, id: NodeId, value: &str) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|c| self.value(*c) == Some(value))
            .collect()
    }

    /// Insert `child` into `parent`'s child list at `index`.
    ///
    /// `index` is checked against the list as it is before the call. If
    /// `child` is already attached somewhere (including `parent` itself) it is
    /// detached first. When `child` already sits in `parent` at a position
    /// before `index`, its final position is `index - 1`: it lands in the gap
    /// that `index` named before it was taken out. So moving the first of
    /// `[a, b, c]` with `index` 2 gives `[b, a, c]`, and with `index` 3 gives
    /// `[b, c, a]`. Inserting discards `parent`'s value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if `index > child_count(parent)`, and
    /// [`Error::InvalidArgument`] if `child` is `parent` or one of its
    /// ancestors. The tree is unchanged on error.
    pub fn insert_at(&mut self, parent: NodeId, child: NodeId, index: usize) -> Result<()> {
        let count = self.child_count(parent);
        if index > count {
            return Err(Error::OutOfRange { index, max: count });
        }
        if child == parent || self.is_ancestor(child, parent) {
            return Err(Error::invalid_argument(format!(
                "cannot insert <{}> into itself or one of its descendants",
                self.name(child)
            )));
        }

        let mut index = index;
        if self.parent(child) == Some(Parent::Node(parent)) {
            if let Some(current) = self.child_index(parent, child) {
                if current < index {
                    index -= 1;
                }
            }
        }

        self.detach(child);
        self.node_mut(parent).insert_child(index, child);
        self.node_mut(child).parent = Some(Parent::Node(parent));
        Ok(())
    }

    pub fn append(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let count = self.child_count(parent);
        self.insert_at(parent, child, count)
    }

    pub fn prepend(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.insert_at(parent, child, 0)
    }

    /// Insert `child` right after `relative`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `relative` is not a child of `parent`.
    pub fn insert_after(&mut self, parent: NodeId, child: NodeId, relative: NodeId) -> Result<()> {
        let position = self.relative_position(parent, relative)?;
        self.insert_at(parent, child, position + 1)
    }

    /// Insert `child` right before `relative`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `relative` is not a child of `parent`.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        relative: NodeId,
    ) -> Result<()> {
        let position = self.relative_position(parent, relative)?;
        self.insert_at(parent, child, position)
    }

    fn relative_position(&self, parent: NodeId, relative: NodeId) -> Result<usize> {
        self.child_index(parent, relative).ok_or_else(|| {
            Error::not_found(format!(
                "<{}> is not a child of <{}>",
                self.name(relative),
                self.name(parent)
            ))
        })
    }

    /// Detach `child` from `parent` and hand it back for reuse.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `child` is not a direct child of
    /// `parent`; neither tree is modified in that case.
    pub fn remove(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId> {
        if !self.contains_child(parent, child) {
            return Err(Error::not_found(format!(
                "<{}> is not a child of <{}>",
                self.name(child),
                self.name(parent)
            )));
        }
        self.detach(child);
        Ok(child)
    }

    /// Detach the child at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if `index >= child_count(parent)`.
    pub fn remove_at(&mut self, parent: NodeId, index: usize) -> Result<NodeId> {
        let child = self.child_at(parent, index)?;
        self.detach(child);
        Ok(child)
    }

    /// Detach every child of `parent`, returning them in their former order.
    ///
    /// The node is left as an empty container; no value is restored.
    pub fn remove_all(&mut self, parent: NodeId) -> Vec<NodeId> {
        let removed = match &mut self.node_mut(parent).content {
            NodeContent::Container(children) => std::mem::take(children),
            NodeContent::Leaf(_) => Vec::new(),
        };
        for child in &removed {
            self.node_mut(*child).parent = None;
        }
        removed
    }

    /// Detach `id` from its current owner, if any.
    fn detach(&mut self, id: NodeId) {
        match self.parent(id) {
            Some(Parent::Node(owner)) => {
                if let NodeContent::Container(children) = &mut self.node_mut(owner).content {
                    children.retain(|c| *c != id);
                }
            }
            Some(Parent::Document) => {
                if self.root == Some(id) {
                    self.root = None;
                }
            }
            None => {}
        }
        self.node_mut(id).parent = None;
    }

    /// True if `ancestor` is found walking up from `id` (excluding `id`).
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = self.parent(id);
        while let Some(Parent::Node(p)) = current {
            if p == ancestor {
                return true;
            }
            current = self.parent(p);
        }
        false
    }

    // ==================== Values ====================

    /// Replace the node's content with `value`; existing children are detached.
    pub fn set_value(&mut self, id: NodeId, value: impl Into<String>) {
        let previous =
            std::mem::replace(&mut self.node_mut(id).content, NodeContent::Leaf(value.into()));
        if let NodeContent::Container(children) = previous {
            for child in children {
                self.node_mut(child).parent = None;
            }
        }
    }

    /// The scalar value, present only while the node has no children.
    pub fn value(&self, id: NodeId) -> Option<&str> {
        self.node(id).value()
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.node(id).is_leaf()
    }

    // ==================== Attributes ====================

    pub fn attributes(&self, id: NodeId) -> &[Attribute] {
        self.node(id).attributes()
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attributes(id)
            .iter()
            .find(|a| a.name() == name)
            .map(Attribute::value)
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.node(id).attribute_position(name).is_some()
    }

    /// Set an attribute, replacing an existing one of the same name in place.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `name` is empty.
    pub fn set_attribute(
        &mut self,
        id: NodeId,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<()> {
        let attribute = Attribute::new(name, value)?;
        self.put_attribute(id, attribute);
        Ok(())
    }

    /// Store `attribute`, replacing an existing one of the same name in place.
    pub fn put_attribute(&mut self, id: NodeId, attribute: Attribute) {
        let node = self.node_mut(id);
        match node.attribute_position(attribute.name()) {
            Some(position) => node.attributes[position] = attribute,
            None => node.attributes.push(attribute),
        }
    }

    /// Remove and return the attribute called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the node has no such attribute.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<Attribute> {
        let node = self.node_mut(id);
        match node.attribute_position(name) {
            Some(position) => Ok(node.attributes.remove(position)),
            None => Err(Error::not_found(format!(
                "attribute '{}' on <{}>",
                name, node.name
            ))),
        }
    }

    // ==================== Statistics ====================

    /// Number of elements in the subtree rooted at `id`, including `id`.
    pub fn subtree_size(&self, id: NodeId) -> usize {
        let mut count = 0;
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend_from_slice(self.children(node));
        }
        count
    }

    /// Number of elements reachable from the root (0 without a root).
    pub fn element_count(&self) -> usize {
        self.root.map_or(0, |root| self.subtree_size(root))
    }

    /// Nesting depth of the tree; a lone root has depth 1.
    pub fn depth(&self) -> usize {
        let Some(root) = self.root else {
            return 0;
        };
        let mut deepest = 0;
        let mut stack = vec![(root, 1)];
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(self.children(node).iter().map(|c| (*c, depth + 1)));
        }
        deepest
    }

    // ==================== Output ====================

    /// Compose the document with the default transcriber settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if the document has no root.
    pub fn to_xml_string(&self) -> Result<String> {
        Transcriber::new().compose(self)
    }

    /// Write the composed document to `writer`, encoded as the declaration
    /// says.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encoding`] if the text cannot be written in the
    /// declared encoding; nothing is written in that case.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        let bytes = Transcriber::new().compose_bytes(self)?;
        writer.write_all(&bytes)?;
        Ok(())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        Transcriber::new().write_file(self, path)
    }

    /// The encoded document as an in-memory byte stream.
    pub fn reader(&self) -> Result<Cursor<Vec<u8>>> {
        Ok(Cursor::new(Transcriber::new().compose_bytes(self)?))
    }
}
