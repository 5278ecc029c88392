use std::{fs, path::{Path, PathBuf}};

use crate::{Error, Result};

/// Name of a directory child and whether it is itself a directory.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct DirEntryInfo {
    pub name: String,
    pub is_directory: bool,
}

/// The filesystem operations the packer relies on.
pub trait FileSystem {
    fn path_exists(&self, path: &Path) -> bool;

    fn is_directory(&self, path: &Path) -> bool;

    /// Children of `path`, sorted by name.
    fn list_directory_entries(&self, path: &Path) -> Result<Vec<DirEntryInfo>>;

    fn read_file_bytes(&self, path: &Path) -> Result<Vec<u8>>;

    fn write_file_bytes(&self, path: &Path, data: &[u8]) -> Result<()>;

    fn create_directory_recursive(&self, path: &Path) -> Result<()>;

    /// Resolved form of `path`, used to detect directory cycles while walking.
    fn canonical_path(&self, path: &Path) -> Result<PathBuf> {
        Ok(path.to_path_buf())
    }
}

/// [`FileSystem`] backed by `std::fs`. Symbolic links are followed, except
/// that the packer skips links back into a directory being walked; other
/// special files are skipped.
#[derive(Clone, Copy, Default, Debug)]
pub struct LocalFileSystem;

impl FileSystem for LocalFileSystem {
    fn path_exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_directory(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_directory_entries(&self, path: &Path) -> Result<Vec<DirEntryInfo>> {
        let mut entries = Vec::new();

        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let entry_path = entry.path();

            let name = entry.file_name().into_string()
                .map_err(|_| Error::InvalidPath(entry_path.clone()))?;

            let metadata = fs::metadata(&entry_path)?;
            if metadata.is_dir() {
                entries.push(DirEntryInfo { name, is_directory: true });
            } else if metadata.is_file() {
                entries.push(DirEntryInfo { name, is_directory: false });
            } else {
                log::warn!("skipping {}: not a regular file or directory", entry_path.display());
            }
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn read_file_bytes(&self, path: &Path) -> Result<Vec<u8>> {
        Ok(fs::read(path)?)
    }

    fn write_file_bytes(&self, path: &Path, data: &[u8]) -> Result<()> {
        Ok(fs::write(path, data)?)
    }

    fn create_directory_recursive(&self, path: &Path) -> Result<()> {
        Ok(fs::create_dir_all(path)?)
    }

    fn canonical_path(&self, path: &Path) -> Result<PathBuf> {
        Ok(fs::canonicalize(path)?)
    }
}
