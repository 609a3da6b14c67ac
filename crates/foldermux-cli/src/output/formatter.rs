//! Output formatter trait for CLI results.

use crate::manifest::Manifest;
use anyhow::Result;
use foldermux_core::FolderReport;
use foldermux_core::FolderSummary;
use serde::Serialize;
use std::path::Path;

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format the result of splitting a folder into `output_dir`
    fn format_split_result(
        &self,
        output_dir: &Path,
        manifest: &Manifest,
        summary: &FolderSummary,
        report: &FolderReport,
    ) -> Result<()>;

    /// Format the result of verifying a folder
    fn format_verify_result(
        &self,
        manifest: &Manifest,
        summary: &FolderSummary,
        report: &FolderReport,
    ) -> Result<()>;

    /// Format the file table of a manifest
    fn format_manifest(&self, manifest: &Manifest) -> Result<()>;

    /// Format warning message
    fn format_warning(&self, message: &str);
}

/// Returns `true` when the folder was fully read and every file is `Ok`.
pub fn folder_ok(summary: &FolderSummary, report: &FolderReport) -> bool {
    summary.is_complete() && report.all_ok()
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(operation: impl Into<String>, data: T, error: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Error,
            data: Some(data),
            error: Some(error.into()),
        }
    }
}
