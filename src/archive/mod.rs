//! Flattens files and directory trees into one entry stream and restores them.
//!
//! Entries are emitted in pre-order, so a directory always precedes its
//! descendants. Paths are relative, `/`-separated and rooted at each
//! source's own name.

mod entry;
mod filesystem;

use std::{collections::HashSet, path::{Component, Path, PathBuf}};

use serde::Serialize;

use crate::{bitstreams::BinaryWriterBuilder, progress::{self, ProgressListener}, Error, Result};

pub use entry::{read_entries, ArchiveEntry, EntryKind, MAX_PATH_LEN};
pub use filesystem::{DirEntryInfo, FileSystem, LocalFileSystem};

/// What a pack or unpack call went through.
#[derive(Clone, Copy, Default, Eq, PartialEq, Serialize, Debug)]
pub struct EntryCounts {
    pub files: usize,
    pub directories: usize,
    /// Total size of the file contents.
    pub bytes: u64,
}

struct PackItem {
    relative_path: String,
    source: PathBuf,
    is_directory: bool,
}

pub struct Packer<F = LocalFileSystem> {
    fs: F,
}

impl Default for Packer<LocalFileSystem> {
    fn default() -> Self {
        Self { fs: LocalFileSystem }
    }
}

impl Packer<LocalFileSystem> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<F: FileSystem> Packer<F> {
    pub fn with_file_system(fs: F) -> Self {
        Self { fs }
    }

    pub fn file_system(&self) -> &F {
        &self.fs
    }

    /// Serializes `sources` into an uncompressed entry stream terminated by
    /// the end-of-stream sentinel.
    pub fn pack<P: AsRef<Path>>(&self, sources: &[P], progress: Option<&mut dyn ProgressListener>) -> Result<Vec<u8>> {
        self.pack_counted(sources, progress).map(|(blob, _)| blob)
    }

    pub fn pack_counted<P: AsRef<Path>>(
        &self,
        sources: &[P],
        mut progress: Option<&mut dyn ProgressListener>,
    ) -> Result<(Vec<u8>, EntryCounts)> {
        let items = self.plan(sources)?;
        let total = items.len();

        let mut writer = BinaryWriterBuilder::new();
        let mut counts = EntryCounts::default();

        for (i, item) in items.into_iter().enumerate() {
            let entry = if item.is_directory {
                counts.directories += 1;
                ArchiveEntry::Directory { path: item.relative_path }
            } else {
                let data = self.fs.read_file_bytes(&item.source)?;
                counts.files += 1;
                counts.bytes += data.len() as u64;
                ArchiveEntry::File { path: item.relative_path, data }
            };

            entry.write(&mut writer)?;

            let path = entry.path().unwrap_or_default();
            log::trace!("packed {:?} {}", entry.kind(), path);
            progress::report(&mut progress, path, i + 1, total);
        }

        ArchiveEntry::End.write(&mut writer)?;

        Ok((writer.build().os.into_vec(), counts))
    }

    /// Lists everything to pack without reading file contents, so missing
    /// sources and oversized paths fail before any I/O on file data.
    fn plan<P: AsRef<Path>>(&self, sources: &[P]) -> Result<Vec<PackItem>> {
        for source in sources {
            let source = source.as_ref();
            if !self.fs.path_exists(source) {
                return Err(Error::PathNotFound(source.to_path_buf()));
            }
        }

        let mut items = Vec::new();
        let mut names = HashSet::new();

        for source in sources {
            let source = source.as_ref();
            let name = source.file_name()
                .and_then(|name| name.to_str())
                .ok_or_else(|| Error::InvalidPath(source.to_path_buf()))?;

            // Top-level names must be unique within one archive.
            if !names.insert(name) {
                return Err(Error::InvalidPath(source.to_path_buf()));
            }

            let is_directory = self.fs.is_directory(source);
            Self::push_item(&mut items, name.to_owned(), source.to_path_buf(), is_directory)?;

            if is_directory {
                let mut ancestors = vec![self.fs.canonical_path(source)?];
                self.walk(source, name, &mut ancestors, &mut items)?;
            }
        }

        Ok(items)
    }

    /// `ancestors` holds the canonical paths of the directories being walked,
    /// so a link back into one of them is skipped instead of recursing forever.
    fn walk(&self, dir: &Path, relative: &str, ancestors: &mut Vec<PathBuf>, items: &mut Vec<PackItem>) -> Result<()> {
        for child in self.fs.list_directory_entries(dir)? {
            let relative_path = format!("{}/{}", relative, child.name);
            let source = dir.join(&child.name);

            if !child.is_directory {
                Self::push_item(items, relative_path, source, false)?;
                continue;
            }

            let canonical = self.fs.canonical_path(&source)?;
            if ancestors.contains(&canonical) {
                log::warn!("skipping {}: links back to {}", source.display(), canonical.display());
                continue;
            }

            Self::push_item(items, relative_path.clone(), source.clone(), true)?;

            ancestors.push(canonical);
            self.walk(&source, &relative_path, ancestors, items)?;
            ancestors.pop();
        }

        Ok(())
    }

    fn push_item(items: &mut Vec<PackItem>, relative_path: String, source: PathBuf, is_directory: bool) -> Result<()> {
        if relative_path.len() > MAX_PATH_LEN {
            return Err(Error::PathTooLong(relative_path.len()));
        }

        items.push(PackItem { relative_path, source, is_directory });
        Ok(())
    }

    /// Restores an entry stream below `output_root`. The whole stream is
    /// parsed and every path checked before anything is created.
    pub fn unpack(
        &self,
        blob: &[u8],
        output_root: &Path,
        mut progress: Option<&mut dyn ProgressListener>,
    ) -> Result<EntryCounts> {
        let entries = read_entries(blob)?;

        let targets = entries.iter()
            .map(|entry| resolve(output_root, entry.path().unwrap_or_default()))
            .collect::<Result<Vec<_>>>()?;

        if !self.fs.is_directory(output_root) {
            self.fs.create_directory_recursive(output_root)?;
        }

        let total = entries.len();
        let mut counts = EntryCounts::default();

        for (i, (entry, target)) in entries.iter().zip(targets).enumerate() {
            match entry {
                ArchiveEntry::Directory { .. } => {
                    self.fs.create_directory_recursive(&target)?;
                    counts.directories += 1;
                }
                ArchiveEntry::File { path, data } => {
                    if let Some(parent) = target.parent() {
                        if !self.fs.is_directory(parent) {
                            log::warn!("no directory entry precedes {}, creating its parent", path);
                            self.fs.create_directory_recursive(parent)?;
                        }
                    }

                    self.fs.write_file_bytes(&target, data)?;
                    counts.files += 1;
                    counts.bytes += data.len() as u64;
                }
                ArchiveEntry::End => {}
            }

            let path = entry.path().unwrap_or_default();
            log::trace!("unpacked {:?} {}", entry.kind(), path);
            progress::report(&mut progress, path, i + 1, total);
        }

        Ok(counts)
    }
}

/// Joins a stored relative path onto `output_root`, refusing anything that
/// is empty, absolute, or steps outside the root.
fn resolve(output_root: &Path, relative: &str) -> Result<PathBuf> {
    let invalid = || Error::InvalidPath(PathBuf::from(relative));

    if relative.is_empty() {
        return Err(invalid());
    }

    let mut target = output_root.to_path_buf();

    for part in relative.split('/') {
        let mut components = Path::new(part).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(part)), None) => target.push(part),
            _ => return Err(invalid()),
        }
    }

    Ok(target)
}
