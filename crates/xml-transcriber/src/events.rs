/*
 * events.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The event model consumed by the parser.
//!
//! A tokenizer turns bytes into a flat sequence of [`XmlEvent`]s and exposes
//! them through the [`EventSource`] pull interface. The parser only ever looks
//! one event ahead.

use crate::{Declaration, Result};
use std::collections::VecDeque;

/// One tokenizer event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEvent {
    /// The XML declaration (or its defaults when the input has none).
    StartDocument(Declaration),

    /// An opening tag with its attributes in source order.
    StartElement {
        /// Local name of the element.
        name: String,
        /// `(local name, unescaped value)` pairs.
        attributes: Vec<(String, String)>,
    },

    /// A run of character data. Consecutive runs may be split arbitrarily.
    Characters(String),

    /// A closing tag.
    EndElement {
        /// Local name of the element being closed.
        name: String,
    },

    /// End of input.
    EndDocument,
}

impl XmlEvent {
    pub fn start_element(name: impl Into<String>) -> Self {
        XmlEvent::StartElement {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    pub fn end_element(name: impl Into<String>) -> Self {
        XmlEvent::EndElement { name: name.into() }
    }

    pub fn characters(data: impl Into<String>) -> Self {
        XmlEvent::Characters(data.into())
    }

    /// Short human-readable description used in error messages.
    pub fn describe(&self) -> String {
        match self {
            XmlEvent::StartDocument(_) => "XML declaration".to_string(),
            XmlEvent::StartElement { name, .. } => format!("start tag <{}>", name),
            XmlEvent::Characters(_) => "character data".to_string(),
            XmlEvent::EndElement { name } => format!("end tag </{}>", name),
            XmlEvent::EndDocument => "end of document".to_string(),
        }
    }
}

/// A pull-based stream of [`XmlEvent`]s with one event of lookahead.
pub trait EventSource {
    /// Look at the next event without consuming it.
    fn peek_event(&mut self) -> Result<Option<&XmlEvent>>;

    /// Consume and return the next event.
    fn next_event(&mut self) -> Result<Option<XmlEvent>>;

    fn has_next(&mut self) -> Result<bool> {
        Ok(self.peek_event()?.is_some())
    }
}

impl<S: EventSource + ?Sized> EventSource for &mut S {
    fn peek_event(&mut self) -> Result<Option<&XmlEvent>> {
        (**self).peek_event()
    }

    fn next_event(&mut self) -> Result<Option<XmlEvent>> {
        (**self).next_event()
    }
}

/// An in-memory, already tokenized event stream.
#[derive(Debug, Clone, Default)]
pub struct EventBuffer {
    events: VecDeque<XmlEvent>,
}

impl EventBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: XmlEvent) {
        self.events.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl From<Vec<XmlEvent>> for EventBuffer {
    fn from(events: Vec<XmlEvent>) -> Self {
        Self {
            events: events.into(),
        }
    }
}

impl FromIterator<XmlEvent> for EventBuffer {
    fn from_iter<I: IntoIterator<Item = XmlEvent>>(iter: I) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}

impl EventSource for EventBuffer {
    fn peek_event(&mut self) -> Result<Option<&XmlEvent>> {
        Ok(self.events.front())
    }

    fn next_event(&mut self) -> Result<Option<XmlEvent>> {
        Ok(self.events.pop_front())
    }
}
