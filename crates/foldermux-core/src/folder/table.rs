//! Read-only view of the files packed into one folder.

use crate::DemuxError;
use crate::Result;
use crate::types::ExtractMode;
use crate::types::FileDescriptor;

/// The contiguous run of archive files a folder unpacks into, with the
/// decision for each of them.
///
/// Local indices run from `0` to `len() - 1`. The callback sees global
/// indices: `ref2_offset + start_index + local`.
///
/// # Examples
///
/// ```
/// use foldermux_core::ExtractMode;
/// use foldermux_core::FileDescriptor;
/// use foldermux_core::FolderTable;
///
/// # fn main() -> foldermux_core::Result<()> {
/// let files = [
///     FileDescriptor::file(10, None),
///     FileDescriptor::file(0, None),
///     FileDescriptor::file(5, None),
/// ];
/// let table = FolderTable::new(&files, 1, &[true, false], false)?.with_ref2_offset(100)?;
///
/// assert_eq!(table.len(), 2);
/// assert_eq!(table.global_index(0), 101);
/// assert_eq!(table.mode(1), ExtractMode::Skip);
/// assert_eq!(table.declared_bytes(), 5);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FolderTable<'a> {
    files: &'a [FileDescriptor],
    start_index: u32,
    ref2_offset: u32,
    modes: Vec<ExtractMode>,
}

impl<'a> FolderTable<'a> {
    /// Builds the table from the caller's selection.
    ///
    /// `wanted[i]` selects file `start_index + i`; the folder spans exactly
    /// `wanted.len()` files. Each selected file is extracted, or tested when
    /// `test_mode` is set; unselected files are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`DemuxError::InvalidFolder`] if the range does not fit in
    /// `files` or overflows the `u32` index space.
    pub fn new(
        files: &'a [FileDescriptor],
        start_index: u32,
        wanted: &[bool],
        test_mode: bool,
    ) -> Result<Self> {
        let modes = wanted
            .iter()
            .map(|&w| ExtractMode::select(w, test_mode))
            .collect();
        Self::with_modes(files, start_index, modes)
    }

    /// Builds the table from explicit per-file modes.
    ///
    /// # Errors
    ///
    /// Returns [`DemuxError::InvalidFolder`] under the same conditions as
    /// [`FolderTable::new`].
    pub fn with_modes(
        files: &'a [FileDescriptor],
        start_index: u32,
        modes: Vec<ExtractMode>,
    ) -> Result<Self> {
        let count = u32::try_from(modes.len())
            .map_err(|_| DemuxError::InvalidFolder(format!("{} files in one folder", modes.len())))?;
        let end = start_index.checked_add(count).ok_or_else(|| {
            DemuxError::InvalidFolder(format!("index overflow: {start_index} + {count}"))
        })?;
        if end as usize > files.len() {
            return Err(DemuxError::InvalidFolder(format!(
                "files {start_index}..{end} out of range, archive has {}",
                files.len()
            )));
        }

        Ok(Self {
            files,
            start_index,
            ref2_offset: 0,
            modes,
        })
    }

    /// Sets the offset added to every index the callback sees.
    ///
    /// # Errors
    ///
    /// Returns [`DemuxError::InvalidFolder`] if the last global index would
    /// overflow `u32`.
    pub fn with_ref2_offset(mut self, ref2_offset: u32) -> Result<Self> {
        ref2_offset
            .checked_add(self.start_index)
            .and_then(|base| base.checked_add(self.len()))
            .ok_or_else(|| {
                DemuxError::InvalidFolder(format!("global index overflow with offset {ref2_offset}"))
            })?;
        self.ref2_offset = ref2_offset;
        Ok(self)
    }

    /// Number of files in the folder.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn len(&self) -> u32 {
        // checked at construction
        self.modes.len() as u32
    }

    /// Returns `true` if the folder has no files.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }

    /// Index of the folder's first file in the archive.
    #[must_use]
    pub fn start_index(&self) -> u32 {
        self.start_index
    }

    /// Offset added to archive indices to form callback indices.
    #[must_use]
    pub fn ref2_offset(&self) -> u32 {
        self.ref2_offset
    }

    /// Descriptor of the file at local index `local`.
    ///
    /// # Panics
    ///
    /// Panics if `local >= len()`.
    #[must_use]
    pub fn descriptor(&self, local: u32) -> &'a FileDescriptor {
        &self.files[(self.start_index + local) as usize]
    }

    /// Decision for the file at local index `local`.
    ///
    /// # Panics
    ///
    /// Panics if `local >= len()`.
    #[must_use]
    pub fn mode(&self, local: u32) -> ExtractMode {
        self.modes[local as usize]
    }

    /// Global (callback) index of the file at local index `local`.
    #[must_use]
    pub fn global_index(&self, local: u32) -> u32 {
        self.ref2_offset + self.start_index + local
    }

    /// Total bytes the folder stream must deliver.
    #[must_use]
    pub fn declared_bytes(&self) -> u64 {
        self.descriptors()
            .filter(|d| d.expects_data())
            .map(|d| d.size)
            .sum()
    }

    /// Iterates over `(global_index, descriptor, mode)` in folder order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &'a FileDescriptor, ExtractMode)> + '_ {
        self.descriptors()
            .zip(&self.modes)
            .enumerate()
            .map(|(local, (desc, &mode))| {
                #[allow(clippy::cast_possible_truncation)]
                let local = local as u32;
                (self.global_index(local), desc, mode)
            })
    }

    fn descriptors(&self) -> impl Iterator<Item = &'a FileDescriptor> + use<'a> {
        let start = self.start_index as usize;
        self.files[start..start + self.modes.len()].iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> Vec<FileDescriptor> {
        vec![
            FileDescriptor::file(3, None),
            FileDescriptor::directory(),
            FileDescriptor::file(0, None),
            FileDescriptor::file(7, Some(1)),
        ]
    }

    #[test]
    fn test_modes_from_selection() {
        let files = sample();
        let table = FolderTable::new(&files, 0, &[true, false, true, true], true).unwrap();
        assert_eq!(table.mode(0), ExtractMode::Test);
        assert_eq!(table.mode(1), ExtractMode::Skip);
        assert_eq!(table.mode(3), ExtractMode::Test);
    }

    #[test]
    fn test_range_out_of_bounds() {
        let files = sample();
        let err = FolderTable::new(&files, 2, &[true; 3], false).unwrap_err();
        assert!(matches!(err, DemuxError::InvalidFolder(_)));
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_start_index_overflow() {
        let files = sample();
        let err = FolderTable::new(&files, u32::MAX, &[true], false).unwrap_err();
        assert!(err.to_string().contains("overflow"));
    }

    #[test]
    fn test_ref2_offset_overflow() {
        let files = sample();
        let table = FolderTable::new(&files, 1, &[true, true], false).unwrap();
        assert!(table.clone().with_ref2_offset(u32::MAX - 3).is_ok());
        assert!(table.with_ref2_offset(u32::MAX - 2).is_err());
    }

    #[test]
    fn test_global_indices_and_iter() {
        let files = sample();
        let table = FolderTable::new(&files, 1, &[true, true, false], false)
            .unwrap()
            .with_ref2_offset(10)
            .unwrap();

        let entries: Vec<_> = table.iter().map(|(i, d, m)| (i, d.size, m)).collect();
        assert_eq!(
            entries,
            vec![
                (11, 0, ExtractMode::Extract),
                (12, 0, ExtractMode::Extract),
                (13, 7, ExtractMode::Skip),
            ]
        );
        assert_eq!(table.descriptor(2).crc, Some(1));
    }

    #[test]
    fn test_declared_bytes_ignores_directories() {
        let mut files = sample();
        files[1].size = 4096;
        let table = FolderTable::new(&files, 0, &[true; 4], false).unwrap();
        assert_eq!(table.declared_bytes(), 10);
    }

    #[test]
    fn test_empty_folder() {
        let files = sample();
        let table = FolderTable::new(&files, 4, &[], false).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.declared_bytes(), 0);
    }
}
