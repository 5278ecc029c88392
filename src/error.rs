use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors returned by the codec, the packer and the archiver front end.
#[derive(Debug, Error)]
pub enum Error {
    /// Compression was requested on a zero-length buffer.
    #[error("cannot compress empty input")]
    EmptyInput,
    /// Bad magic number, size fields exceeding the buffer, or a truncated tree or entry stream.
    #[error("invalid archive: {0}")]
    InvalidArchive(String),
    /// The bit payload ran out before the declared original size was decoded.
    #[error("truncated payload: decoded {decoded} of {expected} bytes")]
    TruncatedPayload { expected: u64, decoded: u64 },
    /// A requested source does not exist.
    #[error("path not found: {}", .0.display())]
    PathNotFound(PathBuf),
    /// A relative path does not fit the 2-byte length prefix.
    #[error("path of {0} bytes exceeds the 65535 byte limit")]
    PathTooLong(usize),
    /// A path that cannot be stored in, or restored from, an archive.
    #[error("invalid path: {}", .0.display())]
    InvalidPath(PathBuf),
    /// The bit reader ran past the end of its buffer.
    #[error("read past the end of the bit stream")]
    OutOfRange,
    /// Malformed configuration value.
    #[error("configuration: {0}")]
    Config(String),
    /// Failure surfaced from the filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
