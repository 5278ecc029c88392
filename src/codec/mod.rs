//! Single-buffer Huffman codec.
//!
//! A compressed blob is laid out as (integers big-endian):
//!
//! | offset          | size      | field                    |
//! |-----------------|-----------|--------------------------|
//! | 0               | 4         | magic number (`HUFF`)    |
//! | 4               | 2         | flags, reserved, 0       |
//! | 6               | 2         | serialized tree size     |
//! | 8               | 8         | original size            |
//! | 16              | 8         | bit payload size         |
//! | 24              | tree size | serialized Huffman tree  |
//! | 24 + tree size  | payload   | MSB-first code bits      |

use std::{fmt, time::Duration};

use serde::Serialize;

use crate::{
    bitstreams::{BinaryReader, BinaryWriterBuilder},
    huffman::HuffmanTree,
    utils::{compression_ratio, Timer},
    Error, Result,
};

pub const MAGIC_NUMBER: u32 = 0x48554646;
pub const HEADER_SIZE: usize = 24;

#[derive(Clone, Copy, Eq, PartialEq, Serialize, Debug)]
pub struct Header {
    pub magic_number: u32,
    pub flags: u16,
    pub tree_size: u16,
    pub original_size: u64,
    pub compressed_size: u64,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            magic_number: MAGIC_NUMBER,
            flags: 0,
            tree_size: 0,
            original_size: 0,
            compressed_size: 0,
        }
    }
}

impl Header {
    pub fn write(&self, writer: &mut BinaryWriterBuilder) {
        writer.push_int(self.magic_number);
        writer.push_int(self.flags);
        writer.push_int(self.tree_size);
        writer.push_int(self.original_size);
        writer.push_int(self.compressed_size);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = BinaryWriterBuilder::with_capacity(HEADER_SIZE);
        self.write(&mut writer);
        writer.build().os.into_vec()
    }

    /// Parses the fixed-size header at the start of `data` and checks the magic number.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(Error::InvalidArchive(format!(
                "{} bytes is shorter than the {} byte header", data.len(), HEADER_SIZE
            )));
        }

        let mut reader = BinaryReader::new(&data[..HEADER_SIZE]);
        let header = Header {
            magic_number: reader.read_be()?,
            flags: reader.read_be()?,
            tree_size: reader.read_be()?,
            original_size: reader.read_be()?,
            compressed_size: reader.read_be()?,
        };

        if header.magic_number != MAGIC_NUMBER {
            return Err(Error::InvalidArchive(format!("bad magic number {:#010x}", header.magic_number)));
        }

        Ok(header)
    }
}

#[derive(Clone, Default, PartialEq, Serialize, Debug)]
pub struct CompressionStats {
    pub original_size: u64,
    pub compressed_size: u64,
    pub tree_size: u64,
    pub compression_ratio: f64,
    pub compression_percentage: f64,
    pub duration: Duration,
}

impl CompressionStats {
    pub fn new(original_size: u64, compressed_size: u64, tree_size: u64, duration: Duration) -> Self {
        let (compression_ratio, compression_percentage) = compression_ratio(original_size, compressed_size);

        Self {
            original_size,
            compressed_size,
            tree_size,
            compression_ratio,
            compression_percentage,
            duration,
        }
    }
}

impl fmt::Display for CompressionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "original size:     {} bytes", self.original_size)?;
        writeln!(f, "compressed size:   {} bytes", self.compressed_size)?;
        writeln!(f, "Huffman tree size: {} bytes", self.tree_size)?;
        writeln!(f, "ratio:             {:.2}", self.compression_ratio)?;
        writeln!(f, "space saved:       {:.2}%", self.compression_percentage)?;
        write!(f, "time:              {} ms", self.duration.as_millis())
    }
}

/// Compresses and decompresses whole buffers, keeping the tree and the
/// statistics of the last call until [`Codec::clear`].
#[derive(Default, Debug)]
pub struct Codec {
    tree: HuffmanTree,
    stats: CompressionStats,
}

impl Codec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compress(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        let mut timer = Timer::new();

        if data.is_empty() {
            return Err(Error::EmptyInput);
        }

        self.tree = HuffmanTree::from_data(data)?;
        let tree_data = self.tree.serialize()?;

        let mut payload = BinaryWriterBuilder::with_capacity(data.len() / 2);
        self.tree.encode(data, &mut payload);
        let payload = payload.build().os;

        let header = Header {
            tree_size: u16::try_from(tree_data.len())
                .map_err(|_| Error::InvalidArchive(format!("tree of {} bytes does not fit the header", tree_data.len())))?,
            original_size: data.len() as u64,
            compressed_size: payload.len() as u64,
            ..Default::default()
        };

        let mut writer = BinaryWriterBuilder::with_capacity(HEADER_SIZE + tree_data.len() + payload.len());
        header.write(&mut writer);
        writer.write_bytes(&tree_data);
        writer.write_bytes(&payload);
        let blob = writer.build().os.into_vec();

        self.stats = CompressionStats::new(header.original_size, blob.len() as u64, tree_data.len() as u64, timer.stop());
        log::debug!(
            "compressed {} bytes into {} ({} symbols, tree {} bytes)",
            data.len(), blob.len(), self.tree.symbol_count(), tree_data.len()
        );

        Ok(blob)
    }

    pub fn decompress(&mut self, blob: &[u8]) -> Result<Vec<u8>> {
        let mut timer = Timer::new();

        let header = Header::from_bytes(blob)?;

        let tree_end = HEADER_SIZE + header.tree_size as usize;
        let payload_end = (tree_end as u64)
            .checked_add(header.compressed_size)
            .filter(|&end| end <= blob.len() as u64)
            .ok_or_else(|| Error::InvalidArchive(format!(
                "header declares {} tree bytes and {} payload bytes but only {} follow it",
                header.tree_size, header.compressed_size, blob.len() - HEADER_SIZE
            )))? as usize;

        self.tree = HuffmanTree::deserialize(&blob[HEADER_SIZE..tree_end])?;

        let mut reader = BinaryReader::new(&blob[tree_end..payload_end]);
        let output = self.tree.decode(&mut reader, header.original_size)?;

        self.stats = CompressionStats::new(header.original_size, blob.len() as u64, header.tree_size as u64, timer.stop());
        log::debug!("decompressed {} bytes into {}", blob.len(), output.len());

        Ok(output)
    }

    pub fn stats(&self) -> &CompressionStats {
        &self.stats
    }

    pub fn tree(&self) -> &HuffmanTree {
        &self.tree
    }

    pub fn clear(&mut self) {
        self.tree.clear();
        self.stats = CompressionStats::default();
    }
}

pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    Codec::new().compress(data)
}

pub fn decompress(blob: &[u8]) -> Result<Vec<u8>> {
    Codec::new().decompress(blob)
}
