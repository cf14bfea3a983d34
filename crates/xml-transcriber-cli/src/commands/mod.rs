//! Command implementations for the xmlt CLI
//!
//! Each command module handles the CLI interface and delegates to
//! xml-transcriber for the actual parsing and composing.

pub mod check;
pub mod fmt;
