//! Huffman archiver: packs files and directory trees into one
//! self-describing, Huffman-compressed archive and restores them.
//!
//! ```no_run
//! use std::path::Path;
//!
//! let archive = huffman_archiver::compress_paths(&["docs", "notes.txt"], None)?;
//! huffman_archiver::decompress_archive(&archive, Path::new("restored"), None)?;
//! # Ok::<(), huffman_archiver::Error>(())
//! ```

pub mod archive;
pub mod archiver;
pub mod bitstreams;
pub mod codec;
pub mod error;
pub mod huffman;
pub mod progress;
pub mod properties;
pub mod utils;

pub use archiver::{compress_paths, decompress_archive, ArchiveStats, Archiver, FILE_EXTENSION, VERSION};
pub use error::{Error, Result};
pub use progress::ProgressListener;
pub use properties::{Properties, StatsFormat};
