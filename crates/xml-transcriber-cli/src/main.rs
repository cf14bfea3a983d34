//! xmlt - format and inspect XML files

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use xml_transcriber::{ComposeOptions, ParseOptions, Transcriber};

mod commands;

#[derive(Parser)]
#[command(name = "xmlt")]
#[command(version)]
#[command(about = "Format and inspect XML element trees", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a file and write it back in canonical layout
    Fmt {
        /// Input XML file
        input: PathBuf,

        /// Write to this .xml file instead of stdout
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        #[command(flatten)]
        options: TranscribeFlags,
    },

    /// Parse a file and print a summary of its tree
    Check {
        /// Input XML file
        input: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        options: TranscribeFlags,
    },
}

/// Flags shared by every command that parses or composes.
#[derive(Args, Debug, Clone)]
struct TranscribeFlags {
    /// Spaces per indentation level
    #[arg(long, default_value_t = 4)]
    indent: usize,

    /// Write values without escaping markup characters
    #[arg(long)]
    raw: bool,

    /// Trim whitespace around leaf values
    #[arg(long)]
    trim: bool,

    /// Fail on text mixed with child elements instead of dropping it
    #[arg(long)]
    strict: bool,
}

impl TranscribeFlags {
    fn transcriber(&self) -> Transcriber {
        Transcriber::new()
            .with_parse_options(
                ParseOptions::default()
                    .with_trim_text(self.trim)
                    .with_reject_mixed_content(self.strict),
            )
            .with_compose_options(
                ComposeOptions::default()
                    .with_indent(" ".repeat(self.indent))
                    .with_escape(!self.raw),
            )
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "xmlt=info,xml_transcriber=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fmt {
            input,
            output,
            options,
        } => commands::fmt::execute(commands::fmt::FmtArgs {
            input,
            output,
            transcriber: options.transcriber(),
        }),
        Commands::Check {
            input,
            json,
            options,
        } => commands::check::execute(commands::check::CheckArgs {
            input,
            json,
            transcriber: options.transcriber(),
        }),
    }
}
