//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use super::formatter::folder_ok;
use crate::manifest::Manifest;
use anyhow::Result;
use foldermux_core::FolderReport;
use foldermux_core::FolderSummary;
use serde::Serialize;
use std::io::Write;
use std::io::{self};
use std::path::Path;

pub struct JsonFormatter;

#[derive(Debug, Serialize)]
struct FileOutput<'a> {
    index: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    mode: &'static str,
    result: &'static str,
    bytes: u64,
}

#[derive(Debug, Serialize)]
struct FolderOutput<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    output_dir: Option<String>,
    status: String,
    files: u32,
    bytes_consumed: u64,
    bytes_forwarded: u64,
    files_extracted: usize,
    files_tested: usize,
    files_skipped: usize,
    checksum_mismatches: usize,
    forced_failures: usize,
    results: Vec<FileOutput<'a>>,
}

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }

    fn folder_output<'a>(
        output_dir: Option<&Path>,
        manifest: &'a Manifest,
        summary: &FolderSummary,
        report: &FolderReport,
    ) -> FolderOutput<'a> {
        FolderOutput {
            output_dir: output_dir.map(|p| p.display().to_string()),
            status: summary.status.to_string(),
            files: summary.files,
            bytes_consumed: summary.bytes_consumed,
            bytes_forwarded: summary.bytes_forwarded,
            files_extracted: report.files_extracted(),
            files_tested: report.files_tested(),
            files_skipped: report.files_skipped(),
            checksum_mismatches: report.checksum_mismatches(),
            forced_failures: report.forced_failures(),
            results: report
                .records()
                .iter()
                .map(|r| FileOutput {
                    index: r.index,
                    name: manifest.name_of(r.index),
                    mode: r.mode.as_str(),
                    result: r.result.as_str(),
                    bytes: r.bytes,
                })
                .collect(),
        }
    }

    fn output_folder(
        operation: &str,
        data: FolderOutput<'_>,
        summary: &FolderSummary,
        report: &FolderReport,
    ) -> Result<()> {
        if folder_ok(summary, report) {
            return Self::output(&JsonOutput::success(operation, data));
        }
        let error = summary.error.clone().unwrap_or_else(|| {
            format!(
                "{} of {} files failed",
                report.failed_indices().len(),
                summary.files
            )
        });
        Self::output(&JsonOutput::failure(operation, data, error))
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_split_result(
        &self,
        output_dir: &Path,
        manifest: &Manifest,
        summary: &FolderSummary,
        report: &FolderReport,
    ) -> Result<()> {
        let data = Self::folder_output(Some(output_dir), manifest, summary, report);
        Self::output_folder("split", data, summary, report)
    }

    fn format_verify_result(
        &self,
        manifest: &Manifest,
        summary: &FolderSummary,
        report: &FolderReport,
    ) -> Result<()> {
        let data = Self::folder_output(None, manifest, summary, report);
        Self::output_folder("verify", data, summary, report)
    }

    fn format_manifest(&self, manifest: &Manifest) -> Result<()> {
        #[derive(Serialize)]
        struct EntryOutput<'a> {
            index: usize,
            name: &'a str,
            kind: &'static str,
            size: u64,
            #[serde(skip_serializing_if = "Option::is_none")]
            crc: Option<String>,
            in_folder: bool,
        }

        #[derive(Serialize)]
        struct ManifestOutput<'a> {
            start_index: u32,
            ref2_offset: u32,
            folder_files: usize,
            folder_bytes: u64,
            files: Vec<EntryOutput<'a>>,
        }

        let range = manifest.folder_range();
        let data = ManifestOutput {
            start_index: manifest.start_index,
            ref2_offset: manifest.ref2_offset,
            folder_files: manifest.folder_len(),
            folder_bytes: manifest.folder_bytes(),
            files: manifest
                .files
                .iter()
                .enumerate()
                .map(|(index, f)| EntryOutput {
                    index,
                    name: &f.name,
                    kind: f.kind(),
                    size: f.size,
                    crc: f.crc.map(|c| format!("{c:08x}")),
                    in_folder: range.contains(&index),
                })
                .collect(),
        };

        Self::output(&JsonOutput::success("list", data))
    }

    fn format_warning(&self, _message: &str) {
        // warnings are folded into the result document's status
    }
}
