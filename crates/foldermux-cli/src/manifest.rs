//! Folder manifest loading.
//!
//! A manifest is the JSON description of the files packed into one folder
//! stream, in stream order.

use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use foldermux_core::FileDescriptor;
use foldermux_core::callbacks::OutputEntry;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// One file of the manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestFile {
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub crc: Option<u32>,
    #[serde(default)]
    pub directory: bool,
    #[serde(default)]
    pub anti: bool,
}

impl ManifestFile {
    pub fn descriptor(&self) -> FileDescriptor {
        FileDescriptor {
            size: self.size,
            is_directory: self.directory,
            is_anti: self.anti,
            crc: self.crc,
        }
    }

    pub fn kind(&self) -> &'static str {
        if self.anti {
            "anti"
        } else if self.directory {
            "dir"
        } else {
            "file"
        }
    }
}

/// Files of an archive plus the folder range to process.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub start_index: u32,
    #[serde(default)]
    pub ref2_offset: u32,
    #[serde(default)]
    pub count: Option<u32>,
    pub files: Vec<ManifestFile>,
}

impl Manifest {
    /// Reads and validates a manifest file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest '{}'", path.display()))?;
        let manifest: Self = serde_json::from_str(&text)
            .with_context(|| format!("Invalid manifest '{}'", path.display()))?;
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> Result<()> {
        if self.start_index as usize > self.files.len() {
            bail!(
                "start_index {} is past the {} manifest files",
                self.start_index,
                self.files.len()
            );
        }
        if let Some(file) = self.files.iter().find(|f| f.directory && f.anti) {
            bail!("entry '{}' cannot be both a directory and an anti-item", file.name);
        }
        Ok(())
    }

    /// Number of files in the folder.
    pub fn folder_len(&self) -> usize {
        let remaining = self.files.len() - self.start_index as usize;
        self.count.map_or(remaining, |c| c as usize)
    }

    /// Manifest indices covered by the folder.
    pub fn folder_range(&self) -> std::ops::Range<usize> {
        let start = self.start_index as usize;
        start..start + self.folder_len()
    }

    pub fn descriptors(&self) -> Vec<FileDescriptor> {
        self.files.iter().map(ManifestFile::descriptor).collect()
    }

    /// Output entries for every manifest file, indexed like the manifest.
    pub fn output_entries(&self) -> Vec<OutputEntry> {
        self.files
            .iter()
            .map(|f| OutputEntry::new(f.name.clone(), &f.descriptor()))
            .collect()
    }

    /// Selection flags for the folder, excluding the given manifest indices.
    pub fn wanted(&self, skip: &[u32]) -> Result<Vec<bool>> {
        let range = self.folder_range();
        if let Some(index) = skip.iter().find(|&&s| !range.contains(&(s as usize))) {
            bail!(
                "skip index {index} is outside the folder (valid: {}..{})",
                range.start,
                range.end
            );
        }
        Ok(range
            .map(|i| !skip.iter().any(|&s| s as usize == i))
            .collect())
    }

    /// Name of the file a callback index refers to.
    pub fn name_of(&self, global_index: u32) -> Option<&str> {
        global_index
            .checked_sub(self.ref2_offset)
            .and_then(|i| self.files.get(i as usize))
            .map(|f| f.name.as_str())
    }

    /// Declared bytes of the folder.
    pub fn folder_bytes(&self) -> u64 {
        self.files.get(self.folder_range()).map_or(0, |files| {
            files
                .iter()
                .filter(|f| f.descriptor().expects_data())
                .map(|f| f.size)
                .sum()
        })
    }
}
