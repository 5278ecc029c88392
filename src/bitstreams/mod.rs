use num_traits::{FromPrimitive, PrimInt, Unsigned};

use crate::{Error, Result};

/// The flushed output of a [`BinaryWriterBuilder`].
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct BinaryWriter {
    pub os: Box<[u8]>,
}

/// Accumulates bits MSB-first: the first bit pushed becomes the most
/// significant bit of the first byte.
pub struct BinaryWriterBuilder {
    os: Vec<u8>,
    pub written_bits: usize,
    current: u64,
    free: usize,
}

impl Default for BinaryWriterBuilder {
    fn default() -> Self {
        BinaryWriterBuilder {
            os: Vec::default(),
            written_bits: 0,
            current: 0,
            free: 8,
        }
    }
}

impl BinaryWriterBuilder {
    /// Pads the last partial byte with zero bits and hands out the buffer.
    /// Consuming `self` makes this the one and only flush.
    pub fn build(mut self) -> BinaryWriter {
        if self.free != 8 {
            self.write(self.current);
        }

        BinaryWriter {
            os: self.os.into_boxed_slice()
        }
    }

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bytes: usize) -> Self {
        Self { os: Vec::with_capacity(bytes), ..Default::default() }
    }

    #[inline(always)]
    fn write(&mut self, b: u64) {
        self.os.push(b as u8);
    }

    #[inline(always)]
    fn write_in_current(&mut self, b: u64, len: u64) -> u64 {
        debug_assert!(len as usize <= self.free);

        self.free -= len as usize;
        self.current |= (b & ((1 << len) - 1)) << self.free;

        if self.free == 0 {
            self.write(self.current);
            self.free = 8;
            self.current = 0;
        }

        self.written_bits += len as usize;
        len
    }

    /// Writes the lowest `len` bits of `x`, most significant first.
    #[inline(always)]
    pub fn push_bits(&mut self, x: u64, len: u64) -> u64 {
        assert!(len <= 64, "Cannot write {} bits from an integer", len);

        let mut remaining = len;
        while remaining != 0 {
            let take = remaining.min(self.free as u64);
            remaining -= take;
            self.write_in_current(x >> remaining, take);
        }

        len
    }

    #[inline(always)]
    pub fn write_bit(&mut self, bit: bool) {
        self.write_in_current(bit as u64, 1);
    }

    pub fn write_bits(&mut self, bits: &[bool]) {
        for &bit in bits {
            self.write_bit(bit);
        }
    }

    #[inline(always)]
    pub fn write_byte(&mut self, byte: u8) {
        self.push_bits(byte as u64, 8);
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        if self.free == 8 {
            self.os.extend_from_slice(bytes);
            self.written_bits += bytes.len() << 3;
            return;
        }

        for &byte in bytes {
            self.write_byte(byte);
        }
    }

    /// Writes an unsigned integer big-endian, using its full width.
    pub fn push_int<T>(&mut self, x: T) -> u64
    where
        T: PrimInt + Unsigned + Into<u64>,
    {
        let bits = T::zero().count_zeros() as u64;
        self.push_bits(x.into(), bits)
    }

    /// Whole bytes emitted so far, not counting a pending partial byte.
    pub fn len(&self) -> usize {
        self.os.len()
    }

    pub fn is_empty(&self) -> bool {
        self.written_bits == 0
    }
}

/// Consumes a byte buffer bit by bit in the order [`BinaryWriterBuilder`] produced it.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct BinaryReader<'a> {
    is: &'a [u8],
    pub position: usize,
    pub read_bits: usize,
    current: u64,
    fill: usize,
}

impl<'a> BinaryReader<'a> {
    pub fn new(input_stream: &'a [u8]) -> Self {
        BinaryReader {
            is: input_stream,
            position: 0,
            read_bits: 0,
            current: 0,
            fill: 0
        }
    }

    #[inline(always)]
    fn read(&mut self) -> Result<u64> {
        if self.position >= self.is.len() {
            return Err(Error::OutOfRange);
        }

        self.position += 1;
        Ok(self.is[self.position - 1] as u64)
    }

    #[inline(always)]
    fn read_from_current(&mut self, len: u64) -> Result<u64> {
        if len == 0 {
            return Ok(0);
        }

        if self.fill == 0 {
            self.current = self.read()?;
            self.fill = 8;
        }

        debug_assert!(len as usize <= self.fill);

        self.read_bits += len as usize;

        self.fill -= len as usize;
        Ok(self.current >> self.fill & ((1 << len) - 1))
    }

    /// Reads `len` bits as an integer, most significant first. Fails
    /// without consuming anything if fewer than `len` bits are left.
    #[inline(always)]
    pub fn read_int(&mut self, len: u64) -> Result<u64> {
        assert!(len <= 64, "Cannot read {} bits into an integer", len);

        if len as usize > self.remaining_bits() {
            return Err(Error::OutOfRange);
        }

        let mut x = 0;
        let mut remaining = len;

        while remaining != 0 {
            if self.fill == 0 {
                self.current = self.read()?;
                self.fill = 8;
            }

            let take = remaining.min(self.fill as u64);
            x = (x << take) | self.read_from_current(take)?;
            remaining -= take;
        }

        Ok(x)
    }

    #[inline(always)]
    pub fn read_bit(&mut self) -> Result<bool> {
        Ok(self.read_from_current(1)? == 1)
    }

    /// Reads the next eight bits. When the cursor sits inside a byte, the
    /// result splices the low bits of the current byte with the high bits
    /// of the following one.
    #[inline(always)]
    pub fn read_byte(&mut self) -> Result<u8> {
        Ok(self.read_int(8)? as u8)
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>> {
        if count > self.remaining_bits() >> 3 {
            return Err(Error::OutOfRange);
        }

        if self.fill == 0 {
            let bytes = self.is[self.position..self.position + count].to_vec();
            self.position += count;
            self.read_bits += count << 3;
            return Ok(bytes);
        }

        (0..count).map(|_| self.read_byte()).collect()
    }

    /// Reads an unsigned big-endian integer of the full width of `T`.
    pub fn read_be<T>(&mut self) -> Result<T>
    where
        T: PrimInt + Unsigned + FromPrimitive,
    {
        let bits = T::zero().count_zeros() as u64;
        T::from_u64(self.read_int(bits)?).ok_or(Error::OutOfRange)
    }

    pub fn has_more_bits(&self) -> bool {
        self.remaining_bits() > 0
    }

    pub fn remaining_bits(&self) -> usize {
        ((self.is.len() - self.position) << 3) + self.fill
    }

    /// Size of the underlying buffer in bytes.
    pub fn len(&self) -> usize {
        self.is.len()
    }

    pub fn is_empty(&self) -> bool {
        self.is.is_empty()
    }
}
