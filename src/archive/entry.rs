use serde::Serialize;

use crate::{bitstreams::{BinaryReader, BinaryWriterBuilder}, Error, Result};

/// Longest relative path the 2-byte length prefix can describe.
pub const MAX_PATH_LEN: usize = u16::MAX as usize;

#[repr(u8)]
#[derive(Clone, Copy, Eq, PartialEq, Serialize, Debug)]
pub enum EntryKind {
    End = 0,
    File = 1,
    Directory = 2,
}

impl TryFrom<u8> for EntryKind {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(EntryKind::End),
            1 => Ok(EntryKind::File),
            2 => Ok(EntryKind::Directory),
            _ => Err(Error::InvalidArchive(format!("unknown entry kind {}", value))),
        }
    }
}

/// One record of the uncompressed entry stream:
///
/// ```text
/// 1 byte   kind (0 = end, 1 = file, 2 = directory)
/// 2 bytes  path length          (file and directory only)
/// N bytes  path, '/'-separated
/// 8 bytes  content length       (file only)
/// M bytes  content
/// ```
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum ArchiveEntry {
    End,
    File { path: String, data: Vec<u8> },
    Directory { path: String },
}

impl ArchiveEntry {
    pub fn kind(&self) -> EntryKind {
        match self {
            ArchiveEntry::End => EntryKind::End,
            ArchiveEntry::File { .. } => EntryKind::File,
            ArchiveEntry::Directory { .. } => EntryKind::Directory,
        }
    }

    pub fn path(&self) -> Option<&str> {
        match self {
            ArchiveEntry::End => None,
            ArchiveEntry::File { path, .. } | ArchiveEntry::Directory { path } => Some(path.as_str()),
        }
    }

    /// Appends the entry to `writer`. Paths longer than [`MAX_PATH_LEN`]
    /// fail before anything is written.
    pub fn write(&self, writer: &mut BinaryWriterBuilder) -> Result<()> {
        if let Some(path) = self.path() {
            if path.len() > MAX_PATH_LEN {
                return Err(Error::PathTooLong(path.len()));
            }
        }

        writer.write_byte(self.kind() as u8);

        if let Some(path) = self.path() {
            writer.push_int(path.len() as u16);
            writer.write_bytes(path.as_bytes());
        }

        if let ArchiveEntry::File { data, .. } = self {
            writer.push_int(data.len() as u64);
            writer.write_bytes(data);
        }

        Ok(())
    }

    pub fn read(reader: &mut BinaryReader) -> Result<Self> {
        Self::read_fields(reader).map_err(|e| match e {
            Error::OutOfRange => Error::InvalidArchive("truncated entry stream".into()),
            e => e,
        })
    }

    fn read_fields(reader: &mut BinaryReader) -> Result<Self> {
        let kind = EntryKind::try_from(reader.read_byte()?)?;

        if kind == EntryKind::End {
            return Ok(ArchiveEntry::End);
        }

        let path_len: u16 = reader.read_be()?;
        let path = String::from_utf8(reader.read_bytes(path_len as usize)?)
            .map_err(|_| Error::InvalidArchive("entry path is not valid UTF-8".into()))?;

        if kind == EntryKind::Directory {
            return Ok(ArchiveEntry::Directory { path });
        }

        let data_len: u64 = reader.read_be()?;
        let data_len = usize::try_from(data_len).map_err(|_| Error::OutOfRange)?;
        let data = reader.read_bytes(data_len)?;

        Ok(ArchiveEntry::File { path, data })
    }
}

/// Reads entries up to, and not including, the end-of-stream sentinel.
pub fn read_entries(blob: &[u8]) -> Result<Vec<ArchiveEntry>> {
    let mut reader = BinaryReader::new(blob);
    let mut entries = Vec::new();

    loop {
        if !reader.has_more_bits() {
            return Err(Error::InvalidArchive("entry stream ends without a terminator".into()));
        }

        match ArchiveEntry::read(&mut reader)? {
            ArchiveEntry::End => break,
            entry => entries.push(entry),
        }
    }

    Ok(entries)
}
