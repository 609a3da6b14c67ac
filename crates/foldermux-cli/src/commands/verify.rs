//! Verify command implementation

use super::warn_incomplete;
use crate::cli::VerifyArgs;
use crate::error::add_stream_context;
use crate::manifest::Manifest;
use crate::output::OutputFormatter;
use crate::progress::CliProgress;
use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use foldermux_core::DemuxConfig;
use foldermux_core::FolderTable;
use foldermux_core::PrematureWritePolicy;
use foldermux_core::callbacks::MemoryCallback;
use foldermux_core::extract_folder;
use std::fs::File;
use std::io::BufReader;
use std::io::Read;

pub fn execute(
    args: &VerifyArgs,
    formatter: &dyn OutputFormatter,
    show_progress: bool,
) -> Result<()> {
    let manifest = Manifest::load(&args.manifest)?;

    // test mode: every file is checked, nothing is stored
    let files = manifest.descriptors();
    let wanted = vec![true; manifest.folder_len()];
    let table = add_stream_context(
        FolderTable::new(&files, manifest.start_index, &wanted, true)
            .and_then(|t| t.with_ref2_offset(manifest.ref2_offset)),
        &args.stream,
    )?;

    let mut config = DemuxConfig::default();
    if args.ignore_trailing {
        config = config.with_premature_writes(PrematureWritePolicy::Ignore);
    }

    let stream = File::open(&args.stream)
        .with_context(|| format!("Failed to open stream '{}'", args.stream.display()))?;
    let mut reader: Box<dyn Read> = Box::new(BufReader::new(stream));
    let progress = (show_progress && CliProgress::should_show())
        .then(|| CliProgress::new(manifest.folder_bytes(), "Verifying"));
    if let Some(progress) = &progress {
        reader = Box::new(progress.wrap(reader));
    }

    let mut callback = MemoryCallback::new();
    let summary = add_stream_context(
        extract_folder(&mut reader, table, &mut callback, &config),
        &args.stream,
    )?;
    drop(progress);

    warn_incomplete(formatter, &manifest, &summary);
    formatter.format_verify_result(&manifest, &summary, callback.report())?;

    if !summary.is_complete() || !callback.report().all_ok() {
        bail!("Folder verification failed for '{}'", args.stream.display());
    }
    Ok(())
}
