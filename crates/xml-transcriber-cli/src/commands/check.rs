/*
 * check.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Check command implementation
 */

//! Check command implementation.
//!
//! Parses a file and reports the shape of its tree. A malformed file makes
//! the command fail with the parse error.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;
use xml_transcriber::{Declaration, Document, Transcriber};

/// Arguments for the check command
#[derive(Debug)]
pub struct CheckArgs {
    pub input: PathBuf,
    /// Print the summary as JSON
    pub json: bool,
    pub transcriber: Transcriber,
}

/// What `xmlt check` reports about a document.
#[derive(Debug, Serialize)]
pub struct Summary {
    pub root: String,
    pub elements: usize,
    pub depth: usize,
    pub declaration: Declaration,
}

impl Summary {
    pub fn of(document: &Document) -> Result<Self> {
        let root = document.root()?;
        Ok(Self {
            root: document.name(root).to_string(),
            elements: document.element_count(),
            depth: document.depth(),
            declaration: document.declaration().clone(),
        })
    }
}

/// Execute the check command
pub fn execute(args: CheckArgs) -> Result<()> {
    let document = args
        .transcriber
        .read_file(&args.input)
        .with_context(|| format!("Failed to parse {:?}", args.input))?;
    let summary = Summary::of(&document)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("root:       <{}>", summary.root);
        println!("elements:   {}", summary.elements);
        println!("depth:      {}", summary.depth);
        println!("version:    {}", summary.declaration.version());
        println!("encoding:   {}", summary.declaration.encoding());
        println!("standalone: {}", summary.declaration.is_standalone());
    }

    Ok(())
}
