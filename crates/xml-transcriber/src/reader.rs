/*
 * reader.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! [`EventSource`] backed by the quick-xml streaming reader.
//!
//! The adapter always starts the stream with a `StartDocument` event, built
//! from the XML declaration when the input has one and from the defaults
//! otherwise, and ends it with `EndDocument`. Comments, processing
//! instructions and DOCTYPE declarations are skipped; CDATA sections are
//! reported as character data; namespace declarations (`xmlns`, `xmlns:*`)
//! are not reported as attributes.
//!
//! Byte input is decoded using the encoding named by a byte order mark or by
//! the XML declaration, falling back to UTF-8. String input is already UTF-8
//! whatever the declaration says.

use crate::events::{EventSource, XmlEvent};
use crate::{Declaration, ParseError, Result};
use quick_xml::{Decoder, Reader};
use quick_xml::events::{BytesDecl, BytesStart, Event};
use std::collections::VecDeque;
use std::io::BufRead;

/// Pull events from a quick-xml [`Reader`].
pub struct QuickXmlSource<R> {
    reader: Reader<R>,
    buf: Vec<u8>,
    system_id: String,
    pending: VecDeque<XmlEvent>,
    started: bool,
    finished: bool,
}

/// What one quick-xml event turns into.
enum Token {
    Declaration(Declaration),
    Events(Vec<XmlEvent>),
    Eof,
}

impl<'a> QuickXmlSource<&'a [u8]> {
    /// Tokenize an in-memory string.
    pub fn from_text(content: &'a str) -> Self {
        Self::with_reader(Reader::from_str(content))
    }
}

impl<R: BufRead> QuickXmlSource<R> {
    /// Tokenize any buffered byte stream.
    ///
    /// The encoding is detected from a byte order mark and refined by the
    /// `encoding` attribute of the XML declaration; without either the input
    /// is read as UTF-8.
    pub fn from_reader(reader: R) -> Self {
        Self::with_reader(Reader::from_reader(reader))
    }

    fn with_reader(mut reader: Reader<R>) -> Self {
        let config = reader.config_mut();
        config.trim_text_start = false;
        config.trim_text_end = false;
        config.expand_empty_elements = true;
        config.check_end_names = true;

        Self {
            reader,
            buf: Vec::new(),
            system_id: String::new(),
            pending: VecDeque::new(),
            started: false,
            finished: false,
        }
    }

    /// Report `system_id` (usually the path or URI of the input) in the
    /// `StartDocument` event.
    pub fn with_system_id(mut self, system_id: impl Into<String>) -> Self {
        self.system_id = system_id.into();
        self
    }

    fn fill(&mut self) -> Result<()> {
        while self.pending.is_empty() && !self.finished {
            self.read_next()?;
        }
        Ok(())
    }

    fn read_next(&mut self) -> Result<()> {
        self.buf.clear();
        let position = self.reader.buffer_position();
        let token = match self.reader.read_event_into(&mut self.buf) {
            Ok(event) => to_token(event, self.reader.decoder(), position)?,
            Err(err) => {
                return Err(ParseError::syntax(
                    err.to_string(),
                    Some(self.reader.error_position()),
                )
                .into());
            }
        };

        match token {
            Token::Declaration(declaration) => {
                if !self.started {
                    self.started = true;
                    let declaration = declaration.with_system_id(self.system_id.clone());
                    self.pending.push_back(XmlEvent::StartDocument(declaration));
                }
            }
            Token::Events(events) => {
                for event in events {
                    // Whitespace before the declaration does not start the document.
                    if !self.started
                        && matches!(&event, XmlEvent::Characters(text) if text.trim().is_empty())
                    {
                        continue;
                    }
                    self.ensure_started();
                    self.pending.push_back(event);
                }
            }
            Token::Eof => {
                self.ensure_started();
                self.pending.push_back(XmlEvent::EndDocument);
                self.finished = true;
            }
        }
        Ok(())
    }

    fn ensure_started(&mut self) {
        if !self.started {
            self.started = true;
            let declaration = Declaration::default().with_system_id(self.system_id.clone());
            self.pending.push_back(XmlEvent::StartDocument(declaration));
        }
    }
}

impl<R: BufRead> EventSource for QuickXmlSource<R> {
    fn peek_event(&mut self) -> Result<Option<&XmlEvent>> {
        self.fill()?;
        Ok(self.pending.front())
    }

    fn next_event(&mut self) -> Result<Option<XmlEvent>> {
        self.fill()?;
        Ok(self.pending.pop_front())
    }
}

fn to_token(event: Event<'_>, decoder: Decoder, position: u64) -> Result<Token> {
    let token = match event {
        Event::Decl(decl) => Token::Declaration(declaration(&decl, position)?),
        Event::Start(e) => Token::Events(vec![start_element(&e, decoder, position)?]),
        Event::Empty(e) => {
            let start = start_element(&e, decoder, position)?;
            let end = XmlEvent::end_element(local_name(decoder, e.local_name().as_ref(), position)?);
            Token::Events(vec![start, end])
        }
        Event::End(e) => {
            let name = local_name(decoder, e.local_name().as_ref(), position)?;
            Token::Events(vec![XmlEvent::end_element(name)])
        }
        Event::Text(e) => {
            let text = e.unescape().map_err(|err| {
                ParseError::syntax(format!("Invalid text content: {}", err), Some(position))
            })?;
            Token::Events(vec![XmlEvent::Characters(text.into_owned())])
        }
        Event::CData(e) => {
            let text = e.decode().map_err(|err| {
                ParseError::syntax(format!("Invalid CDATA content: {}", err), Some(position))
            })?;
            Token::Events(vec![XmlEvent::Characters(text.into_owned())])
        }
        Event::Comment(_) | Event::PI(_) | Event::DocType(_) => Token::Events(Vec::new()),
        Event::Eof => Token::Eof,
    };
    Ok(token)
}

fn local_name(decoder: Decoder, bytes: &[u8], position: u64) -> Result<String> {
    decoder
        .decode(bytes)
        .map(|name| name.into_owned())
        .map_err(|err| {
            ParseError::syntax(format!("Invalid element or attribute name: {}", err), Some(position))
                .into()
        })
}

fn start_element(e: &BytesStart<'_>, decoder: Decoder, position: u64) -> Result<XmlEvent> {
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(ParseError::from)?;
        let key = attr.key.as_ref();
        if key == b"xmlns" || key.starts_with(b"xmlns:") {
            continue;
        }
        let value = attr.decode_and_unescape_value(decoder).map_err(|err| {
            ParseError::syntax(format!("Invalid attribute value: {}", err), Some(position))
        })?;
        attributes.push((
            local_name(decoder, attr.key.local_name().as_ref(), position)?,
            value.into_owned(),
        ));
    }

    Ok(XmlEvent::StartElement {
        name: local_name(decoder, e.local_name().as_ref(), position)?,
        attributes,
    })
}

fn declaration(decl: &BytesDecl<'_>, position: u64) -> Result<Declaration> {
    let syntax = |err: &dyn std::fmt::Display| {
        ParseError::syntax(format!("Invalid XML declaration: {}", err), Some(position))
    };

    let version = decl.version().map_err(|err| syntax(&err))?;
    let mut declaration =
        Declaration::default().with_version(String::from_utf8_lossy(&version).into_owned());

    if let Some(encoding) = decl.encoding() {
        let encoding = encoding.map_err(|err| syntax(&err))?;
        declaration = declaration.with_encoding(String::from_utf8_lossy(&encoding).into_owned());
    }

    if let Some(standalone) = decl.standalone() {
        let standalone = standalone.map_err(|err| syntax(&err))?;
        declaration = declaration.with_standalone(&*standalone == b"yes");
    }

    Ok(declaration)
}
