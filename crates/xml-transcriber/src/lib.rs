//! In-memory XML element trees and a transcriber between trees and text.
//!
//! This crate models a constrained XML document: every element carries a
//! name, an ordered set of attributes and either a text value or a list of
//! child elements, never both. A [`Document`] owns all of its elements in an
//! arena and hands out [`NodeId`]s; structural edits go through the document
//! so each element always has at most one parent and the tree stays acyclic.
//!
//! # Overview
//!
//! - [`Document`]: declaration metadata, the root element and the node arena
//! - [`Attribute`]: a name/value pair attached to an element
//! - [`Transcriber`]: builds a document from an [`EventSource`] and composes
//!   a document back into indented XML text
//! - [`QuickXmlSource`]: an [`EventSource`] over [`quick-xml`](quick_xml)
//!
//! Byte input is decoded in the encoding its declaration names, and
//! [`Transcriber::write_file`] and [`Document::save`] write bytes in that same
//! encoding. Nesting depth is limited only by memory.
//!
//! # Example
//!
//! ```rust
//! use xml_transcriber::{compose, parse_str};
//!
//! let mut doc = parse_str("<config><name>demo</name></config>").unwrap();
//! let root = doc.root().unwrap();
//! let port = doc.create_leaf("port", "8080").unwrap();
//! doc.append(root, port).unwrap();
//!
//! assert_eq!(doc.child_count(root), 2);
//! assert_eq!(
//!     compose(&doc).unwrap(),
//!     "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>\n\
//!      <config>\n    <name>demo</name>\n    <port>8080</port>\n</config>"
//! );
//! ```
//!
//! # Building trees by hand
//!
//! ```rust
//! use xml_transcriber::Document;
//!
//! let mut doc = Document::new();
//! let list = doc.create_node("list").unwrap();
//! doc.set_root(list);
//! for value in ["a", "b"] {
//!     let item = doc.create_leaf("item", value).unwrap();
//!     doc.append(list, item).unwrap();
//! }
//! assert_eq!(doc.elements_by_name(list, "item").len(), 2);
//! ```

pub mod attribute;
mod composer;
pub mod document;
pub mod error;
pub mod events;
pub mod node;
mod parser;
pub mod reader;
pub mod transcriber;

// Re-export main types
pub use attribute::Attribute;
pub use document::{Declaration, Document};
pub use error::{Error, ParseError, Result};
pub use events::{EventBuffer, EventSource, XmlEvent};
pub use node::{NodeContent, NodeData, NodeId, Parent};
pub use reader::QuickXmlSource;
pub use transcriber::{ComposeOptions, ParseOptions, Transcriber, compose, parse, parse_str};
