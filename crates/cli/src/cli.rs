use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Structure-aware chunking for paged service manuals.
///
/// Reads cleaned page text, detects the manual's hierarchy with a profile,
/// and writes a manifest plus retrieval chunks.
#[derive(Parser, Debug)]
#[command(name = "manual-chunker", version, about = "Structure-aware chunking for service manuals")]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Detect structure, assemble chunks, write output and run QA
    Process {
        /// Profile name (looked up in the profile dir) or path to a YAML file
        #[arg(long, env = "MANUAL_PROFILE")]
        profile: String,

        /// Form-feed separated text file, or a directory of page files
        #[arg(long)]
        input: PathBuf,

        /// Output root (default: MANUAL_OUTPUT_DIR or ./output)
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Detect and filter boundaries, build the manifest, report counts
    Validate {
        #[arg(long, env = "MANUAL_PROFILE")]
        profile: String,

        #[arg(long)]
        input: PathBuf,

        /// Also print per-level counts and suspected false positives
        #[arg(long)]
        diagnostics: bool,
    },

    /// Run the QA suite over a saved chunks.jsonl
    ValidateChunks {
        #[arg(long, env = "MANUAL_PROFILE")]
        profile: String,

        #[arg(long)]
        chunks: PathBuf,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate one profile file, or every profile in a directory
    CheckProfile {
        #[arg(long)]
        profile: PathBuf,
    },
}
