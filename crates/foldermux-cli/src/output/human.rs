//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use super::formatter::folder_ok;
use crate::manifest::Manifest;
use crate::progress::humanize_bytes;
use anyhow::Result;
use console::Term;
use console::style;
use foldermux_core::FolderReport;
use foldermux_core::FolderSummary;
use std::path::Path;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    fn headline(&self, ok: bool, message: &str) {
        let line = match (self.use_colors, ok) {
            (true, true) => format!("{} {message}", style("✓").green().bold()),
            (true, false) => format!("{} {message}", style("✗").red().bold()),
            (false, _) => message.to_string(),
        };
        let _ = self.term.write_line(&line);
    }

    fn file_lines(&self, manifest: &Manifest, report: &FolderReport) {
        let failed = report.failed_indices();
        if !failed.is_empty() {
            let _ = self.term.write_line("  Failed files:");
        }
        for record in report.records() {
            let is_failed = failed.contains(&record.index);
            if !is_failed && !self.verbose {
                continue;
            }
            let name = manifest.name_of(record.index).unwrap_or("?");
            let result = if is_failed && self.use_colors {
                style(record.result.to_string()).red().to_string()
            } else {
                record.result.to_string()
            };
            let _ = self.term.write_line(&format!(
                "    #{:<5} {:<7} {:<10} {name}: {result}",
                record.index,
                record.mode.as_str(),
                humanize_bytes(record.bytes),
            ));
        }
    }

    fn totals(&self, summary: &FolderSummary, report: &FolderReport) {
        let _ = self
            .term
            .write_line(&format!("  Files:          {}", summary.files));
        if report.files_extracted() > 0 {
            let _ = self
                .term
                .write_line(&format!("  Extracted:      {}", report.files_extracted()));
        }
        if report.files_tested() > 0 {
            let _ = self
                .term
                .write_line(&format!("  Tested:         {}", report.files_tested()));
        }
        if report.files_skipped() > 0 {
            let _ = self
                .term
                .write_line(&format!("  Skipped:        {}", report.files_skipped()));
        }
        let _ = self.term.write_line(&format!(
            "  Stream read:    {}",
            humanize_bytes(summary.bytes_consumed)
        ));
        if self.verbose {
            let _ = self.term.write_line(&format!(
                "  Written:        {}",
                humanize_bytes(summary.bytes_forwarded)
            ));
            let _ = self
                .term
                .write_line(&format!("  Status:         {}", summary.status));
        }
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_split_result(
        &self,
        output_dir: &Path,
        manifest: &Manifest,
        summary: &FolderSummary,
        report: &FolderReport,
    ) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        let ok = folder_ok(summary, report);
        let headline = if ok {
            format!("Split complete: {}", output_dir.display())
        } else {
            format!(
                "Split finished with {} failed file(s): {}",
                report.failed_indices().len(),
                output_dir.display()
            )
        };
        self.headline(ok, &headline);
        self.totals(summary, report);
        self.file_lines(manifest, report);
        Ok(())
    }

    fn format_verify_result(
        &self,
        manifest: &Manifest,
        summary: &FolderSummary,
        report: &FolderReport,
    ) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        let ok = folder_ok(summary, report);
        self.headline(
            ok,
            if ok {
                "Verification passed"
            } else {
                "Verification failed"
            },
        );
        self.totals(summary, report);
        if report.checksum_mismatches() > 0 {
            let _ = self.term.write_line(&format!(
                "  CRC mismatches: {}",
                report.checksum_mismatches()
            ));
        }
        self.file_lines(manifest, report);
        Ok(())
    }

    fn format_manifest(&self, manifest: &Manifest) -> Result<()> {
        let range = manifest.folder_range();
        for (index, file) in manifest.files.iter().enumerate() {
            let marker = if range.contains(&index) { '*' } else { ' ' };
            let crc = file
                .crc
                .map_or_else(|| "-".repeat(8), |c| format!("{c:08x}"));
            if self.verbose {
                let _ = self.term.write_line(&format!(
                    "{marker} {index:>5}  {:<4}  {:>12}  {crc}  {}",
                    file.kind(),
                    file.size,
                    file.name
                ));
            } else {
                let _ = self.term.write_line(&format!(
                    "{marker} {index:>5}  {:>10}  {crc}  {}",
                    humanize_bytes(file.size),
                    file.name
                ));
            }
        }

        if !self.quiet {
            let _ = self.term.write_line("");
            let _ = self.term.write_line(&format!(
                "Folder: {} file(s) from index {}, {}",
                manifest.folder_len(),
                manifest.start_index,
                humanize_bytes(manifest.folder_bytes())
            ));
        }
        Ok(())
    }

    fn format_warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {message}", style("WARNING:").yellow().bold()));
        } else {
            let _ = self.term.write_line(&format!("WARNING: {message}"));
        }
    }
}
