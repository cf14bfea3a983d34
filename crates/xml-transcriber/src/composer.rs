/*
 * composer.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Renders a [`Document`] as indented XML text.
//!
//! The layout is line oriented: a leaf is written on one line as
//! `<name attrs>value</name>`, a container puts its opening and closing tags
//! on their own lines and indents its children one level deeper. With
//! `group_runs` on, a blank line separates a run of leaves from a following
//! run of containers (and the other way round) among siblings.
//!
//! [`encode_text`] turns the composed text into bytes in the charset the
//! declaration names.
//!
//! Containers still being written are kept on an explicit stack, so deep
//! trees do not grow the call stack.

use crate::transcriber::ComposeOptions;
use crate::{Document, Error, NodeId, Result};
use encoding_rs::{Encoding, UTF_8};
use quick_xml::escape::{escape, partial_escape};

pub(crate) fn compose_document(document: &Document, options: &ComposeOptions) -> Result<String> {
    let root = document.root()?;
    let declaration = document.declaration();

    let mut xml = format!(
        "<?xml version=\"{}\" encoding=\"{}\" standalone=\"{}\"?>\n",
        declaration.version(),
        declaration.encoding(),
        if declaration.is_standalone() { "yes" } else { "no" }
    );
    compose_tree(&mut xml, document, root, options);

    tracing::debug!(
        root = %document.name(root),
        bytes = xml.len(),
        "Composed XML document"
    );
    Ok(xml.trim_end().to_string())
}

/// Encode composed text in the charset named by `label`.
///
/// Fails when `label` is not a known encoding, when the encoding cannot be
/// produced as output (UTF-16 and the `replacement` encoding write UTF-8
/// instead), and when the text holds characters the charset cannot represent.
pub(crate) fn encode_text(xml: &str, label: &str) -> Result<Vec<u8>> {
    let encoding = Encoding::for_label(label.as_bytes())
        .ok_or_else(|| Error::encoding(format!("unsupported encoding {:?}", label)))?;
    if encoding == UTF_8 {
        return Ok(xml.as_bytes().to_vec());
    }

    let (bytes, used, unmappable) = encoding.encode(xml);
    if used != encoding {
        return Err(Error::encoding(format!(
            "cannot write output as {}",
            encoding.name()
        )));
    }
    if unmappable {
        return Err(Error::encoding(format!(
            "text contains characters that {} cannot represent",
            encoding.name()
        )));
    }
    Ok(bytes.into_owned())
}

/// A sibling list being written, plus the container that owns it.
struct Frame<'d> {
    children: &'d [NodeId],
    next: usize,
    layer: usize,
    previous_leaf: Option<bool>,
    /// Container whose closing tag follows the list, with its own layer.
    owner: Option<(NodeId, usize)>,
}

fn compose_tree(xml: &mut String, document: &Document, root: NodeId, options: &ComposeOptions) {
    let roots = [root];
    let mut stack = vec![Frame {
        children: &roots,
        next: 0,
        layer: 0,
        previous_leaf: None,
        owner: None,
    }];

    while let Some(frame) = stack.last_mut() {
        let Some(&child) = frame.children.get(frame.next) else {
            if let Some((owner, layer)) = frame.owner {
                push_indent(xml, layer, options);
                push_close_tag(xml, document, owner);
            }
            stack.pop();
            continue;
        };
        frame.next += 1;

        let leaf = document.is_leaf(child);
        if options.group_runs && frame.previous_leaf.is_some_and(|previous| previous != leaf) {
            xml.push('\n');
        }
        frame.previous_leaf = Some(leaf);
        let layer = frame.layer;

        push_indent(xml, layer, options);
        push_open_tag(xml, document, child, options);
        if leaf {
            let value = document.value(child).unwrap_or_default();
            if options.escape {
                xml.push_str(&partial_escape(value));
            } else {
                xml.push_str(value);
            }
            push_close_tag(xml, document, child);
        } else {
            xml.push('\n');
            stack.push(Frame {
                children: document.children(child),
                next: 0,
                layer: layer + 1,
                previous_leaf: None,
                owner: Some((child, layer)),
            });
        }
    }
}

fn push_indent(xml: &mut String, layer: usize, options: &ComposeOptions) {
    for _ in 0..layer {
        xml.push_str(&options.indent);
    }
}

fn push_close_tag(xml: &mut String, document: &Document, node: NodeId) {
    xml.push_str("</");
    xml.push_str(document.name(node));
    xml.push_str(">\n");
}

fn push_open_tag(xml: &mut String, document: &Document, node: NodeId, options: &ComposeOptions) {
    xml.push('<');
    xml.push_str(document.name(node));
    for attribute in document.attributes(node) {
        xml.push(' ');
        xml.push_str(attribute.name());
        xml.push_str("=\"");
        if options.escape {
            xml.push_str(&escape(attribute.value()));
        } else {
            xml.push_str(attribute.value());
        }
        xml.push('"');
    }
    xml.push('>');
}
