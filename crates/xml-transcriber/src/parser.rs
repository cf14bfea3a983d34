/*
 * parser.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Builds a [`Document`] from an [`EventSource`].
//!
//! Open elements live on an explicit stack of frames, so nesting depth is
//! bounded by memory rather than by the call stack. Character data is
//! collected on the innermost open frame. When the frame closes without
//! having seen a child it becomes a leaf holding that text; otherwise the
//! text sat next to child elements and is dropped (or rejected). A closed
//! element is appended to the frame below it, or becomes the root. Anything
//! out of place is a [`ParseError`]; no partial document is ever returned.

use crate::events::{EventSource, XmlEvent};
use crate::transcriber::ParseOptions;
use crate::{Declaration, Document, NodeId, ParseError, Result};

pub(crate) fn parse_events<S: EventSource>(mut source: S, options: &ParseOptions) -> Result<Document> {
    let declaration = if matches!(source.peek_event()?, Some(XmlEvent::StartDocument(_))) {
        match source.next_event()? {
            Some(XmlEvent::StartDocument(declaration)) => declaration,
            _ => Declaration::default(),
        }
    } else {
        Declaration::default()
    };

    let builder = TreeBuilder {
        document: Document::with_declaration(declaration),
        options,
        stack: Vec::new(),
    };
    builder.build(&mut source)
}

/// An element whose end tag has not been seen yet.
struct OpenElement {
    node: NodeId,
    name: String,
    /// Character data collected since the start tag or the last child.
    text: String,
    has_children: bool,
}

/// Parser state: the document under construction and its open elements.
struct TreeBuilder<'o> {
    document: Document,
    options: &'o ParseOptions,
    stack: Vec<OpenElement>,
}

impl TreeBuilder<'_> {
    fn build<S: EventSource>(mut self, source: &mut S) -> Result<Document> {
        loop {
            match source.next_event()? {
                None | Some(XmlEvent::EndDocument) => {
                    if let Some(open) = self.stack.last() {
                        return Err(ParseError::UnexpectedEof {
                            expected: format!("closing tag </{}>", open.name),
                        }
                        .into());
                    }
                    break;
                }
                Some(XmlEvent::StartElement { name, attributes }) => {
                    self.start_element(name, attributes)?;
                }
                Some(XmlEvent::Characters(text)) => match self.stack.last_mut() {
                    Some(open) => open.text.push_str(&text),
                    None if text.trim().is_empty() => {}
                    None => return Err(unexpected("a root element", &XmlEvent::Characters(text))),
                },
                Some(XmlEvent::EndElement { name }) => self.end_element(name)?,
                Some(other) => {
                    let expected = match self.stack.last() {
                        Some(open) => format!("content of <{}>", open.name),
                        None => "a root element".to_string(),
                    };
                    return Err(unexpected(&expected, &other));
                }
            }
        }

        let root = self.document.root().map_err(|_| ParseError::EmptyDocument)?;
        tracing::debug!(
            root = %self.document.name(root),
            elements = self.document.element_count(),
            "Parsed XML document"
        );
        Ok(self.document)
    }

    fn start_element(&mut self, name: String, attributes: Vec<(String, String)>) -> Result<()> {
        tracing::trace!(element = %name, depth = self.stack.len(), "Start element");

        // The enclosing element is now a container; its pending text is mixed content.
        if let Some(parent) = self.stack.last_mut() {
            parent.has_children = true;
            let text = std::mem::take(&mut parent.text);
            let parent_name = parent.name.clone();
            self.discard_text(&parent_name, &text)?;
        }

        let node = self.document.create_node(name.as_str())?;
        for (key, value) in attributes {
            self.document.set_attribute(node, key, value)?;
        }
        self.stack.push(OpenElement {
            node,
            name,
            text: String::new(),
            has_children: false,
        });
        Ok(())
    }

    fn end_element(&mut self, name: String) -> Result<()> {
        let Some(open) = self.stack.pop() else {
            return Err(unexpected("a root element", &XmlEvent::EndElement { name }));
        };
        if open.name != name {
            return Err(ParseError::MismatchedEndTag {
                expected: open.name,
                found: name,
            }
            .into());
        }

        if open.has_children {
            self.discard_text(&open.name, &open.text)?;
        } else {
            let value = if self.options.trim_text {
                open.text.trim().to_string()
            } else {
                open.text
            };
            self.document.set_value(open.node, value);
        }

        match self.stack.last() {
            Some(parent) => self.document.append(parent.node, open.node),
            None => {
                if self.document.has_root() {
                    return Err(ParseError::MultipleRoots { name: open.name }.into());
                }
                self.document.set_root(open.node);
                Ok(())
            }
        }
    }

    /// Text next to child elements is never attached to the tree.
    fn discard_text(&self, element: &str, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Ok(());
        }
        if self.options.reject_mixed_content {
            return Err(ParseError::MixedContent {
                element: element.to_string(),
                text: text.to_string(),
            }
            .into());
        }
        tracing::warn!(
            element = %element,
            text = ?text,
            "Dropping character data next to child elements"
        );
        Ok(())
    }
}

fn unexpected(expected: &str, found: &XmlEvent) -> crate::Error {
    ParseError::UnexpectedEvent {
        expected: expected.to_string(),
        found: found.describe(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBuffer;
    use crate::Error;

    fn parse(events: Vec<XmlEvent>) -> Result<Document> {
        parse_events(EventBuffer::from(events), &ParseOptions::default())
    }

    fn start_with(name: &str, attributes: &[(&str, &str)]) -> XmlEvent {
        XmlEvent::StartElement {
            name: name.to_string(),
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_leaf_and_container() {
        let doc = parse(vec![
            XmlEvent::start_element("root"),
            XmlEvent::start_element("a"),
            XmlEvent::characters("1"),
            XmlEvent::end_element("a"),
            XmlEvent::start_element("b"),
            XmlEvent::end_element("b"),
            XmlEvent::end_element("root"),
            XmlEvent::EndDocument,
        ])
        .unwrap();

        let root = doc.root().unwrap();
        assert_eq!(doc.name(root), "root");
        let children = doc.children(root);
        assert_eq!(children.len(), 2);
        assert_eq!(doc.value(children[0]), Some("1"));
        assert_eq!(doc.value(children[1]), Some(""));
    }

    #[test]
    fn test_missing_start_document_uses_defaults() {
        let doc = parse(vec![
            XmlEvent::start_element("root"),
            XmlEvent::end_element("root"),
        ])
        .unwrap();
        assert_eq!(doc.declaration(), &Declaration::default());
    }

    #[test]
    fn test_start_document_sets_declaration() {
        let declaration = Declaration::default()
            .with_encoding("ASCII")
            .with_system_id("urn:test")
            .with_standalone(true);
        let doc = parse(vec![
            XmlEvent::StartDocument(declaration.clone()),
            XmlEvent::start_element("root"),
            XmlEvent::end_element("root"),
            XmlEvent::EndDocument,
        ])
        .unwrap();
        assert_eq!(doc.declaration(), &declaration);
    }

    #[test]
    fn test_split_characters_are_coalesced() {
        let doc = parse(vec![
            XmlEvent::start_element("root"),
            XmlEvent::characters("Hello, "),
            XmlEvent::characters("world"),
            XmlEvent::end_element("root"),
        ])
        .unwrap();
        assert_eq!(doc.value(doc.root().unwrap()), Some("Hello, world"));
    }

    #[test]
    fn test_attributes_in_source_order_with_duplicates_replaced() {
        let doc = parse(vec![
            start_with("root", &[("b", "1"), ("a", "2"), ("b", "3")]),
            XmlEvent::end_element("root"),
        ])
        .unwrap();
        let root = doc.root().unwrap();
        let attrs: Vec<String> = doc.attributes(root).iter().map(|a| a.to_string()).collect();
        assert_eq!(attrs, [r#"b="3""#, r#"a="2""#]);
    }

    #[test]
    fn test_whitespace_between_children_is_ignored() {
        let doc = parse(vec![
            XmlEvent::start_element("root"),
            XmlEvent::characters("\n  "),
            XmlEvent::start_element("a"),
            XmlEvent::end_element("a"),
            XmlEvent::characters("\n"),
            XmlEvent::end_element("root"),
        ])
        .unwrap();
        assert_eq!(doc.child_count(doc.root().unwrap()), 1);
    }

    #[test]
    fn test_whitespace_leaf_value_is_kept_unless_trimmed() {
        let events = vec![
            XmlEvent::start_element("root"),
            XmlEvent::characters("  padded  "),
            XmlEvent::end_element("root"),
        ];
        let doc = parse(events.clone()).unwrap();
        assert_eq!(doc.value(doc.root().unwrap()), Some("  padded  "));

        let trimmed = parse_events(
            EventBuffer::from(events),
            &ParseOptions::default().with_trim_text(true),
        )
        .unwrap();
        assert_eq!(trimmed.value(trimmed.root().unwrap()), Some("padded"));
    }

    #[test]
    fn test_mixed_content_text_is_dropped() {
        let doc = parse(vec![
            XmlEvent::start_element("p"),
            XmlEvent::characters("before"),
            XmlEvent::start_element("b"),
            XmlEvent::characters("bold"),
            XmlEvent::end_element("b"),
            XmlEvent::characters("after"),
            XmlEvent::end_element("p"),
        ])
        .unwrap();
        let root = doc.root().unwrap();
        assert_eq!(doc.value(root), None);
        assert_eq!(doc.child_count(root), 1);
        assert_eq!(doc.value(doc.children(root)[0]), Some("bold"));
    }

    #[test]
    fn test_mixed_content_rejected_when_strict() {
        let result = parse_events(
            EventBuffer::from(vec![
                XmlEvent::start_element("p"),
                XmlEvent::characters("before"),
                XmlEvent::start_element("b"),
                XmlEvent::end_element("b"),
                XmlEvent::end_element("p"),
            ]),
            &ParseOptions::default().with_reject_mixed_content(true),
        );
        assert!(matches!(
            result,
            Err(Error::Parse(ParseError::MixedContent { .. }))
        ));
    }

    #[test]
    fn test_empty_stream_is_empty_document() {
        let result = parse(vec![XmlEvent::EndDocument]);
        assert!(matches!(result, Err(Error::Parse(ParseError::EmptyDocument))));
    }

    #[test]
    fn test_multiple_roots_rejected() {
        let result = parse(vec![
            XmlEvent::start_element("a"),
            XmlEvent::end_element("a"),
            XmlEvent::start_element("b"),
            XmlEvent::end_element("b"),
        ]);
        assert!(matches!(
            result,
            Err(Error::Parse(ParseError::MultipleRoots { name })) if name == "b"
        ));
    }

    #[test]
    fn test_unclosed_element_is_unexpected_eof() {
        let result = parse(vec![
            XmlEvent::start_element("root"),
            XmlEvent::start_element("a"),
            XmlEvent::end_element("a"),
        ]);
        assert!(matches!(
            result,
            Err(Error::Parse(ParseError::UnexpectedEof { .. }))
        ));
    }

    #[test]
    fn test_mismatched_end_tag() {
        let result = parse(vec![
            XmlEvent::start_element("root"),
            XmlEvent::end_element("other"),
        ]);
        assert!(matches!(
            result,
            Err(Error::Parse(ParseError::MismatchedEndTag { .. }))
        ));
    }

    #[test]
    fn test_malformed_nesting_is_an_error() {
        let result = parse(vec![
            XmlEvent::start_element("root"),
            XmlEvent::StartDocument(Declaration::default()),
            XmlEvent::end_element("root"),
        ]);
        assert!(matches!(
            result,
            Err(Error::Parse(ParseError::UnexpectedEvent { .. }))
        ));
    }

    #[test]
    fn test_deep_nesting_does_not_exhaust_the_stack() {
        const DEPTH: usize = 100_000;
        let mut events = Vec::with_capacity(2 * DEPTH + 1);
        events.extend((0..DEPTH).map(|_| XmlEvent::start_element("n")));
        events.push(XmlEvent::characters("bottom"));
        events.extend((0..DEPTH).map(|_| XmlEvent::end_element("n")));

        let doc = parse(events).unwrap();
        assert_eq!(doc.depth(), DEPTH);
        assert_eq!(doc.element_count(), DEPTH);

        let mut node = doc.root().unwrap();
        while let Ok(child) = doc.child_at(node, 0) {
            node = child;
        }
        assert_eq!(doc.value(node), Some("bottom"));
    }

    #[test]
    fn test_unclosed_deep_element_names_innermost_tag() {
        let result = parse(vec![
            XmlEvent::start_element("outer"),
            XmlEvent::start_element("inner"),
        ]);
        assert!(matches!(
            result,
            Err(Error::Parse(ParseError::UnexpectedEof { expected })) if expected == "closing tag </inner>"
        ));
    }

    #[test]
    fn test_stray_end_tag_at_top_level() {
        let result = parse(vec![XmlEvent::end_element("root")]);
        assert!(matches!(
            result,
            Err(Error::Parse(ParseError::UnexpectedEvent { .. }))
        ));
    }
}
