/*
 * fmt.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Fmt command implementation
 */

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;
use xml_transcriber::Transcriber;

/// Arguments for the fmt command
#[derive(Debug)]
pub struct FmtArgs {
    pub input: PathBuf,
    /// Output file; stdout when absent
    pub output: Option<PathBuf>,
    pub transcriber: Transcriber,
}

/// Execute the fmt command
pub fn execute(args: FmtArgs) -> Result<()> {
    if let Some(output) = &args.output {
        ensure_xml_extension(output)?;
    }

    let document = args
        .transcriber
        .read_file(&args.input)
        .with_context(|| format!("Failed to parse {:?}", args.input))?;

    match &args.output {
        Some(output) => {
            args.transcriber
                .write_file(&document, output)
                .with_context(|| format!("Failed to write {:?}", output))?;
            info!(input = %args.input.display(), output = %output.display(), "Formatted");
        }
        None => {
            let bytes = args
                .transcriber
                .compose_bytes(&document)
                .with_context(|| format!("Failed to compose {:?}", args.input))?;
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(&bytes)
                .and_then(|()| stdout.write_all(b"\n"))
                .context("Failed to write to stdout")?;
        }
    }

    Ok(())
}

/// Output files must carry an `.xml` extension.
fn ensure_xml_extension(path: &Path) -> Result<()> {
    let is_xml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"));
    if !is_xml {
        anyhow::bail!("Output path must have an .xml extension: {:?}", path);
    }
    Ok(())
}
