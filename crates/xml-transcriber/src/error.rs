/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for tree mutation and XML transcription.

use thiserror::Error;

/// Result type alias for xml-transcriber operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by tree operations, parsing and composing.
#[derive(Debug, Error)]
pub enum Error {
    /// An argument was rejected (empty name, cyclic insertion, ...).
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// A child index was outside the valid range.
    #[error("Index {index} out of range (valid range is 0..={max})")]
    OutOfRange { index: usize, max: usize },

    /// An element or attribute was not found where it was expected.
    #[error("Not found: {what}")]
    NotFound { what: String },

    /// The document is not in a state that allows the operation.
    #[error("Invalid state: {message}")]
    InvalidState { message: String },

    /// Composed text cannot be written in the declared encoding.
    #[error("Encoding error: {message}")]
    Encoding { message: String },

    /// The event stream did not describe a well-formed document.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Reading or writing a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument {
            message: message.into(),
        }
    }

    pub(crate) fn not_found(what: impl Into<String>) -> Self {
        Error::NotFound { what: what.into() }
    }

    pub(crate) fn invalid_state(message: impl Into<String>) -> Self {
        Error::InvalidState {
            message: message.into(),
        }
    }

    pub(crate) fn encoding(message: impl Into<String>) -> Self {
        Error::Encoding {
            message: message.into(),
        }
    }
}

/// Malformed-input conditions reported while building a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Syntax error reported by the tokenizer.
    #[error("XML syntax error: {message}{}", .position.map(|p| format!(" at byte {}", p)).unwrap_or_default())]
    XmlSyntax {
        message: String,
        /// Byte offset where the error occurred, when the tokenizer knows it.
        position: Option<u64>,
    },

    /// An event appeared where the document structure does not allow it.
    #[error("Unexpected {found}, expected {expected}")]
    UnexpectedEvent { expected: String, found: String },

    /// The stream ended inside an element.
    #[error("Unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String },

    /// A closing tag did not match the open element.
    #[error("Mismatched end tag: expected </{expected}>, found </{found}>")]
    MismatchedEndTag { expected: String, found: String },

    /// Text was found next to child elements while mixed content is rejected.
    #[error("Mixed content in <{element}>: text {text:?} next to child elements")]
    MixedContent { element: String, text: String },

    /// The stream contained no element at all.
    #[error("Empty XML document: no root element found")]
    EmptyDocument,

    /// A second top-level element followed the root.
    #[error("Invalid XML: multiple root elements (second root <{name}>)")]
    MultipleRoots { name: String },
}

impl ParseError {
    pub(crate) fn syntax(message: impl Into<String>, position: Option<u64>) -> Self {
        ParseError::XmlSyntax {
            message: message.into(),
            position,
        }
    }
}

impl From<quick_xml::Error> for ParseError {
    fn from(err: quick_xml::Error) -> Self {
        ParseError::syntax(err.to_string(), None)
    }
}

impl From<quick_xml::events::attributes::AttrError> for ParseError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        ParseError::syntax(format!("Attribute error: {}", err), None)
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Parse(err.into())
    }
}
