//! Split command implementation

use super::warn_incomplete;
use crate::cli::SplitArgs;
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
use foldermux_core::callbacks::DirectoryCallback;
use foldermux_core::extract_folder;
use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::path::PathBuf;

pub fn execute(
    args: &SplitArgs,
    formatter: &dyn OutputFormatter,
    show_progress: bool,
) -> Result<()> {
    let manifest = Manifest::load(&args.manifest)?;
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&output_dir).with_context(|| {
        format!(
            "Failed to create output directory '{}'",
            output_dir.display()
        )
    })?;

    let files = manifest.descriptors();
    let wanted = manifest.wanted(&args.skip)?;
    let table = add_stream_context(
        FolderTable::new(&files, manifest.start_index, &wanted, false)
            .and_then(|t| t.with_ref2_offset(manifest.ref2_offset)),
        &args.stream,
    )?;

    let mut callback = add_stream_context(
        DirectoryCallback::new(&output_dir, manifest.output_entries()),
        &args.stream,
    )?
    .with_index_offset(manifest.ref2_offset)
    .keep_corrupted(args.keep_corrupted);

    let mut config = DemuxConfig::default();
    if args.ignore_trailing {
        config = config.with_premature_writes(PrematureWritePolicy::Ignore);
    }

    let stream = File::open(&args.stream)
        .with_context(|| format!("Failed to open stream '{}'", args.stream.display()))?;
    let mut reader: Box<dyn Read> = Box::new(BufReader::new(stream));
    let progress = (show_progress && CliProgress::should_show())
        .then(|| CliProgress::new(manifest.folder_bytes(), "Splitting"));
    if let Some(progress) = &progress {
        reader = Box::new(progress.wrap(reader));
    }

    let summary = add_stream_context(
        extract_folder(&mut reader, table, &mut callback, &config),
        &args.stream,
    )?;
    drop(progress);

    let report = callback.into_report();
    warn_incomplete(formatter, &manifest, &summary);
    formatter.format_split_result(&output_dir, &manifest, &summary, &report)?;

    let failed = report.failed_indices();
    if !failed.is_empty() {
        bail!(
            "{} of {} files in '{}' failed",
            failed.len(),
            summary.files,
            args.stream.display()
        );
    }
    Ok(())
}
