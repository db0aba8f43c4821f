//! Veles CLI - decode and re-encode .NET Binary XML traffic.
//!
//! This is the main entry point for the Veles command-line application.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use veles::prelude::*;

/// Veles - .NET Binary XML protocol analysis tool
#[derive(Parser)]
#[command(name = "veles")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a captured binary frame to XML text
    Decode {
        /// Input file with the raw binary frame
        #[arg(short, long)]
        input: PathBuf,

        /// Output XML file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Encode XML text to a binary frame
    Encode {
        /// Input XML file
        #[arg(short, long)]
        input: PathBuf,

        /// Output file for the binary frame
        #[arg(short, long)]
        output: PathBuf,

        /// Emit the session form with an in-band dictionary blob
        #[arg(long)]
        session: bool,

        /// Omit the in-band blob's leading length varint
        #[arg(long, requires = "session")]
        no_size_prefix: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Decode { input, output } => cmd_decode(&input, output.as_deref())?,
        Commands::Encode {
            input,
            output,
            session,
            no_size_prefix,
        } => cmd_encode(&input, &output, session, no_size_prefix)?,
    }

    Ok(())
}

fn cmd_decode(input: &PathBuf, output: Option<&std::path::Path>) -> Result<()> {
    let data = fs::read(input).context("Failed to read input file")?;

    let xml = decode(&data).map_err(coarse)?;

    match output {
        Some(path) => {
            fs::write(path, &xml).context("Failed to write output file")?;
            println!("Decoded {} bytes to {}", data.len(), path.display());
        }
        None => println!("{xml}"),
    }

    Ok(())
}

fn cmd_encode(input: &PathBuf, output: &PathBuf, session: bool, no_size_prefix: bool) -> Result<()> {
    let xml = fs::read_to_string(input).context("Failed to read input file")?;

    let bytes = if session {
        encode_with_inband_dictionary(&xml, no_size_prefix).map_err(coarse)?
    } else {
        encode_canonical(&xml).map_err(coarse)?
    };

    fs::write(output, &bytes).context("Failed to write output file")?;
    println!("Encoded {} bytes to {}", bytes.len(), output.display());

    Ok(())
}

/// Present codec failures as a coarse parse-failure message while keeping
/// the full error as the cause in the chain.
fn coarse(e: veles::nbfx::Error) -> anyhow::Error {
    match e.offset() {
        Some(offset) => anyhow::Error::new(e).context(format!("parse failure near offset {offset}")),
        None => anyhow::Error::new(e),
    }
}
