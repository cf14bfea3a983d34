/*
 * transcriber.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Conversion between XML text and [`Document`] trees.

use crate::composer::{compose_document, encode_text};
use crate::events::EventSource;
use crate::parser::parse_events;
use crate::reader::QuickXmlSource;
use crate::{Document, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Settings applied while building a tree from events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Trim surrounding whitespace from leaf values.
    pub trim_text: bool,
    /// Fail instead of dropping non-whitespace text that sits next to child
    /// elements.
    pub reject_mixed_content: bool,
}

impl ParseOptions {
    pub fn with_trim_text(mut self, trim_text: bool) -> Self {
        self.trim_text = trim_text;
        self
    }

    pub fn with_reject_mixed_content(mut self, reject: bool) -> Self {
        self.reject_mixed_content = reject;
        self
    }
}

/// Settings applied while writing a tree as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeOptions {
    /// One level of indentation.
    pub indent: String,
    /// Escape markup characters in values and attribute values.
    pub escape: bool,
    /// Separate runs of leaf siblings from runs of container siblings with a
    /// blank line.
    pub group_runs: bool,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            indent: "    ".to_string(),
            escape: true,
            group_runs: true,
        }
    }
}

impl ComposeOptions {
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    pub fn with_escape(mut self, escape: bool) -> Self {
        self.escape = escape;
        self
    }

    pub fn with_group_runs(mut self, group_runs: bool) -> Self {
        self.group_runs = group_runs;
        self
    }
}

/// Parses event streams into documents and composes documents into text.
///
/// A transcriber holds no state besides its options, so one instance can be
/// shared for any number of documents.
///
/// # Example
///
/// ```
/// use xml_transcriber::{ComposeOptions, Transcriber};
///
/// let transcriber = Transcriber::new()
///     .with_compose_options(ComposeOptions::default().with_indent("  "));
/// let doc = transcriber.parse_str("<list><item>1</item></list>").unwrap();
/// let xml = transcriber.compose(&doc).unwrap();
/// assert!(xml.ends_with("<list>\n  <item>1</item>\n</list>"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Transcriber {
    parse: ParseOptions,
    compose: ComposeOptions,
}

impl Transcriber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse = options;
        self
    }

    pub fn with_compose_options(mut self, options: ComposeOptions) -> Self {
        self.compose = options;
        self
    }

    pub fn parse_options(&self) -> &ParseOptions {
        &self.parse
    }

    pub fn compose_options(&self) -> &ComposeOptions {
        &self.compose
    }

    /// Build a document from an event stream.
    ///
    /// The stream is consumed up to `EndDocument`. Any structural problem
    /// aborts the parse with a [`ParseError`](crate::ParseError).
    pub fn parse<S: EventSource>(&self, source: S) -> Result<Document> {
        parse_events(source, &self.parse)
    }

    /// Parse XML text.
    pub fn parse_str(&self, content: &str) -> Result<Document> {
        self.parse(QuickXmlSource::from_text(content))
    }

    /// Parse XML from a buffered byte stream, decoding it as its byte order
    /// mark or XML declaration says.
    pub fn parse_reader<R: BufRead>(&self, reader: R) -> Result<Document> {
        self.parse(QuickXmlSource::from_reader(reader))
    }

    /// Parse an XML file. The path becomes the document's system id.
    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<Document> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "Reading XML file");
        let file = File::open(path)?;
        let source =
            QuickXmlSource::from_reader(BufReader::new(file)).with_system_id(path.display().to_string());
        self.parse(source)
    }

    /// Compose the document as XML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`](crate::Error::InvalidState) if the
    /// document has no root.
    pub fn compose(&self, document: &Document) -> Result<String> {
        compose_document(document, &self.compose)
    }

    /// Compose the document and encode it in the charset its declaration
    /// names.
    ///
    /// # Errors
    ///
    /// Besides the [`compose`](Self::compose) errors, returns
    /// [`Error::Encoding`](crate::Error::Encoding) if the declared encoding is
    /// unknown, cannot be written, or cannot represent some of the text.
    pub fn compose_bytes(&self, document: &Document) -> Result<Vec<u8>> {
        let xml = self.compose(document)?;
        encode_text(&xml, document.encoding())
    }

    /// Compose the document and write it to `path` in its declared encoding,
    /// replacing any existing file. Nothing is written if encoding fails.
    pub fn write_file(&self, document: &Document, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.compose_bytes(document)?;
        std::fs::write(path, bytes)?;
        tracing::debug!(path = %path.display(), "Wrote XML file");
        Ok(())
    }
}

/// Build a document from an event stream with the default options.
pub fn parse<S: EventSource>(source: S) -> Result<Document> {
    Transcriber::new().parse(source)
}

/// Parse XML text with the default options.
pub fn parse_str(content: &str) -> Result<Document> {
    Transcriber::new().parse_str(content)
}

/// Compose a document with the default options.
pub fn compose(document: &Document) -> Result<String> {
    Transcriber::new().compose(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, ParseError};
    use pretty_assertions::assert_eq;

    const NESTED: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>
<catalog version="2">
    <title>Books</title>

    <book id="b1">
        <author>Ann</author>
        <year>2001</year>
    </book>
    <book id="b2">
        <author>Bo</author>
    </book>
</catalog>"#;

    #[test]
    fn test_canonical_text_round_trips() {
        let doc = parse_str(NESTED).unwrap();
        assert_eq!(compose(&doc).unwrap(), NESTED);
    }

    #[test]
    fn test_parse_reader() {
        let doc = Transcriber::new()
            .parse_reader(NESTED.as_bytes())
            .unwrap();
        let root = doc.root().unwrap();
        assert_eq!(doc.name(root), "catalog");
        assert_eq!(doc.elements_by_name(root, "book").len(), 2);
    }

    #[test]
    fn test_parse_options_are_applied() {
        let transcriber = Transcriber::new().with_parse_options(
            ParseOptions::default()
                .with_trim_text(true)
                .with_reject_mixed_content(true),
        );
        let doc = transcriber.parse_str("<a>  x  </a>").unwrap();
        assert_eq!(doc.value(doc.root().unwrap()), Some("x"));

        let err = transcriber.parse_str("<a>x<b/></a>").unwrap_err();
        assert!(matches!(err, Error::Parse(ParseError::MixedContent { .. })));
    }

    #[test]
    fn test_empty_input_is_empty_document() {
        let err = parse_str("  <!-- nothing -->  ").unwrap_err();
        assert!(matches!(err, Error::Parse(ParseError::EmptyDocument)));
    }

    #[test]
    fn test_file_round_trip_records_system_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.xml");

        let transcriber = Transcriber::new();
        let doc = transcriber.parse_str(NESTED).unwrap();
        transcriber.write_file(&doc, &path).unwrap();

        let reread = transcriber.read_file(&path).unwrap();
        assert_eq!(reread.system_id(), path.display().to_string());
        assert_eq!(transcriber.compose(&reread).unwrap(), NESTED);
    }

    const LATIN1: &[u8] =
        b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\" standalone=\"no\"?><menu><dish note=\"cr\xe8me\">cr\xeape</dish></menu>";

    #[test]
    fn test_parse_reader_decodes_declared_encoding() {
        let doc = Transcriber::new().parse_reader(LATIN1).unwrap();
        let dish = doc.child_at(doc.root().unwrap(), 0).unwrap();
        assert_eq!(doc.encoding(), "ISO-8859-1");
        assert_eq!(doc.value(dish), Some("cr\u{ea}pe"));
        assert_eq!(doc.attribute(dish, "note"), Some("cr\u{e8}me"));
    }

    #[test]
    fn test_write_file_encodes_in_declared_charset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("menu.xml");

        let transcriber = Transcriber::new();
        let doc = transcriber.parse_reader(LATIN1).unwrap();
        transcriber.write_file(&doc, &path).unwrap();

        let written = std::fs::read(&path).unwrap();
        assert!(written.windows(5).any(|w| w == b"cr\xeape"));
        assert!(!written.windows(2).any(|w| w == "\u{ea}".as_bytes()));

        let reread = transcriber.read_file(&path).unwrap();
        let dish = reread.child_at(reread.root().unwrap(), 0).unwrap();
        assert_eq!(reread.value(dish), Some("cr\u{ea}pe"));
        assert_eq!(reread.attribute(dish, "note"), Some("cr\u{e8}me"));
    }

    #[test]
    fn test_write_file_refuses_unrepresentable_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("menu.xml");

        let transcriber = Transcriber::new();
        let mut doc = transcriber.parse_reader(LATIN1).unwrap();
        let dish = doc.child_at(doc.root().unwrap(), 0).unwrap();
        doc.set_value(dish, "\u{5bff}\u{53f8}");

        let err = transcriber.write_file(&doc, &path).unwrap_err();
        assert!(matches!(err, Error::Encoding { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_compose_bytes_utf8_matches_text() {
        let transcriber = Transcriber::new();
        let doc = transcriber.parse_str(NESTED).unwrap();
        assert_eq!(
            transcriber.compose_bytes(&doc).unwrap(),
            transcriber.compose(&doc).unwrap().into_bytes()
        );
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Transcriber::new()
            .read_file(dir.path().join("missing.xml"))
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
