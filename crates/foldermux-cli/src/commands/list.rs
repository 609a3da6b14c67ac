//! List command implementation

use crate::cli::ListArgs;
use crate::manifest::Manifest;
use crate::output::OutputFormatter;
use anyhow::Result;

pub fn execute(args: &ListArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let manifest = Manifest::load(&args.manifest)?;
    formatter.format_manifest(&manifest)
}
