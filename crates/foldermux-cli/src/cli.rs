//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "foldermux")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Split a decompressed folder stream into files
    Split(SplitArgs),
    /// Check folder checksums without writing files
    Verify(VerifyArgs),
    /// List the files described by a manifest
    List(ListArgs),
    /// Generate shell completions
    Completion(CompletionArgs),
}

#[derive(clap::Args)]
pub struct SplitArgs {
    /// Path to the folder manifest (JSON)
    #[arg(value_name = "MANIFEST")]
    pub manifest: PathBuf,

    /// Path to the decompressed folder stream
    #[arg(value_name = "STREAM")]
    pub stream: PathBuf,

    /// Output directory (default: current directory)
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Skip the file with this manifest index (can be repeated)
    #[arg(long = "skip", value_name = "INDEX")]
    pub skip: Vec<u32>,

    /// Keep files whose checksum or data is bad
    #[arg(long)]
    pub keep_corrupted: bool,

    /// Discard bytes past the last file instead of failing
    #[arg(long)]
    pub ignore_trailing: bool,
}

#[derive(clap::Args)]
pub struct VerifyArgs {
    /// Path to the folder manifest (JSON)
    #[arg(value_name = "MANIFEST")]
    pub manifest: PathBuf,

    /// Path to the decompressed folder stream
    #[arg(value_name = "STREAM")]
    pub stream: PathBuf,

    /// Discard bytes past the last file instead of failing
    #[arg(long)]
    pub ignore_trailing: bool,
}

#[derive(clap::Args)]
pub struct ListArgs {
    /// Path to the folder manifest (JSON)
    #[arg(value_name = "MANIFEST")]
    pub manifest: PathBuf,
}

#[derive(clap::Args)]
pub struct CompletionArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}
