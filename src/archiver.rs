//! Ties the packer and the codec together: a set of paths becomes one
//! compressed archive, and an archive becomes files on disk again.

use std::{fmt, path::{Path, PathBuf}, time::Duration};

use serde::Serialize;

use crate::{
    archive::{EntryCounts, FileSystem, LocalFileSystem, Packer},
    codec::Codec,
    progress::ProgressListener,
    properties::Properties,
    utils::{compression_ratio, Timer},
    Error, Result,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const FILE_EXTENSION: &str = ".huff";

/// Packs `sources` and compresses the resulting entry stream into one archive.
pub fn compress_paths<P: AsRef<Path>>(sources: &[P], progress: Option<&mut dyn ProgressListener>) -> Result<Vec<u8>> {
    let blob = Packer::new().pack(sources, progress)?;
    Codec::new().compress(&blob)
}

/// Decompresses `archive` and materializes its entries below `output_root`.
pub fn decompress_archive(archive: &[u8], output_root: &Path, progress: Option<&mut dyn ProgressListener>) -> Result<()> {
    let blob = Codec::new().decompress(archive)?;
    Packer::new().unpack(&blob, output_root, progress)?;
    Ok(())
}

#[derive(Clone, Default, PartialEq, Serialize, Debug)]
pub struct ArchiveStats {
    pub source_path: String,
    pub output_path: String,
    pub total_files: usize,
    pub total_directories: usize,
    /// Bytes of file content going in or coming out.
    pub original_size: u64,
    /// Size of the archive file.
    pub compressed_size: u64,
    pub compression_ratio: f64,
    pub compression_percentage: f64,
    pub duration: Duration,
}

impl ArchiveStats {
    fn new(source_path: String, output_path: String, counts: EntryCounts, compressed_size: u64, duration: Duration) -> Self {
        let (compression_ratio, compression_percentage) = compression_ratio(counts.bytes, compressed_size);

        Self {
            source_path,
            output_path,
            total_files: counts.files,
            total_directories: counts.directories,
            original_size: counts.bytes,
            compressed_size,
            compression_ratio,
            compression_percentage,
            duration,
        }
    }
}

impl fmt::Display for ArchiveStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const MB: f64 = 1024.0 * 1024.0;

        writeln!(f, "source:          {}", self.source_path)?;
        writeln!(f, "output:          {}", self.output_path)?;
        writeln!(f, "files:           {}", self.total_files)?;
        writeln!(f, "directories:     {}", self.total_directories)?;
        writeln!(f, "original size:   {} bytes ({:.2} MB)", self.original_size, self.original_size as f64 / MB)?;
        writeln!(f, "archive size:    {} bytes ({:.2} MB)", self.compressed_size, self.compressed_size as f64 / MB)?;
        writeln!(f, "ratio:           {:.2}", self.compression_ratio)?;
        writeln!(f, "space saved:     {:.2}%", self.compression_percentage)?;
        write!(f, "time:            {} ms", self.duration.as_millis())
    }
}

/// File-level front end: reads and writes archive files and keeps the
/// statistics of the last call.
pub struct Archiver<F: FileSystem = LocalFileSystem> {
    packer: Packer<F>,
    codec: Codec,
    properties: Properties,
    stats: ArchiveStats,
}

impl Archiver<LocalFileSystem> {
    pub fn new(properties: Properties) -> Self {
        Self::with_file_system(LocalFileSystem, properties)
    }
}

impl<F: FileSystem> Archiver<F> {
    pub fn with_file_system(fs: F, properties: Properties) -> Self {
        Self {
            packer: Packer::with_file_system(fs),
            codec: Codec::new(),
            properties,
            stats: ArchiveStats::default(),
        }
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn stats(&self) -> &ArchiveStats {
        &self.stats
    }

    /// `<source><extension>` for the first source, ignoring trailing separators.
    pub fn default_archive_path(&self, source: &Path) -> PathBuf {
        let mut name = source.components().as_path().as_os_str().to_owned();
        name.push(&self.properties.extension);
        PathBuf::from(name)
    }

    /// The archive path without its extension, or with `_extracted` appended
    /// when it has a different one.
    pub fn default_output_root(&self, archive: &Path) -> PathBuf {
        let name = archive.to_string_lossy();

        match name.strip_suffix(self.properties.extension.as_str()) {
            Some(stem) if !stem.is_empty() && !stem.ends_with('/') => PathBuf::from(stem),
            _ => {
                let mut name = archive.as_os_str().to_owned();
                name.push("_extracted");
                PathBuf::from(name)
            }
        }
    }

    pub fn compress_to_file<P: AsRef<Path>>(
        &mut self,
        sources: &[P],
        output: Option<&Path>,
        progress: Option<&mut dyn ProgressListener>,
    ) -> Result<&ArchiveStats> {
        let mut timer = Timer::new();

        let first = sources.first()
            .ok_or_else(|| Error::InvalidPath(PathBuf::new()))?
            .as_ref();
        let output = output.map_or_else(|| self.default_archive_path(first), Path::to_path_buf);

        let fs = self.packer.file_system();
        if fs.path_exists(&output) {
            if !self.properties.overwrite || fs.is_directory(&output) {
                return Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    format!("{} already exists", output.display()),
                )));
            }
            log::warn!("overwriting {}", output.display());
        }

        let (blob, counts) = self.packer.pack_counted(sources, progress)?;
        let archive = self.codec.compress(&blob)?;
        self.packer.file_system().write_file_bytes(&output, &archive)?;

        let source_path = sources.iter()
            .map(|source| source.as_ref().display().to_string())
            .collect::<Vec<_>>()
            .join(", ");

        self.stats = ArchiveStats::new(source_path, output.display().to_string(), counts, archive.len() as u64, timer.stop());
        log::info!("wrote {} ({} files, {} directories)", output.display(), counts.files, counts.directories);

        Ok(&self.stats)
    }

    pub fn extract_file(
        &mut self,
        archive_path: &Path,
        output_root: Option<&Path>,
        progress: Option<&mut dyn ProgressListener>,
    ) -> Result<&ArchiveStats> {
        let mut timer = Timer::new();

        let fs = self.packer.file_system();
        if !fs.path_exists(archive_path) {
            return Err(Error::PathNotFound(archive_path.to_path_buf()));
        }

        let output_root = output_root.map_or_else(|| self.default_output_root(archive_path), Path::to_path_buf);
        if fs.path_exists(&output_root) {
            log::warn!("extracting into existing {}", output_root.display());
        }

        let archive = fs.read_file_bytes(archive_path)?;
        let blob = self.codec.decompress(&archive)?;
        let counts = self.packer.unpack(&blob, &output_root, progress)?;

        self.stats = ArchiveStats::new(
            archive_path.display().to_string(),
            output_root.display().to_string(),
            counts,
            archive.len() as u64,
            timer.stop(),
        );
        log::info!("extracted {} into {}", archive_path.display(), output_root.display());

        Ok(&self.stats)
    }
}

#[cfg(test)]
mod tests;
