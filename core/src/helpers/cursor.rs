// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Bounds-checked reader over received transaction bytes

use byteorder::{BigEndian, ByteOrder};

/// Error returned when a read runs past the end of the buffer
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Exhausted;

/// Cursor over a byte slice, every read is bounds checked and
/// fails with [Exhausted] instead of reading out of bounds.
#[derive(Clone, Debug)]
pub struct Cursor<'a> {
    buff: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    /// Create a new cursor over the provided buffer
    pub const fn new(buff: &'a [u8]) -> Self {
        Self { buff, offset: 0 }
    }

    /// Number of bytes consumed
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of bytes remaining
    pub fn remaining(&self) -> usize {
        self.buff.len() - self.offset
    }

    /// Peek at the next byte without consuming it
    pub fn peek_u8(&self) -> Result<u8, Exhausted> {
        self.buff.get(self.offset).copied().ok_or(Exhausted)
    }

    /// Read a slice of `n` bytes
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], Exhausted> {
        if self.remaining() < n {
            return Err(Exhausted);
        }

        let b = &self.buff[self.offset..][..n];
        self.offset += n;

        Ok(b)
    }

    /// Read a fixed-size array
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], Exhausted> {
        let mut d = [0u8; N];
        d.copy_from_slice(self.read_bytes(N)?);
        Ok(d)
    }

    pub fn read_u8(&mut self) -> Result<u8, Exhausted> {
        self.read_bytes(1).map(|b| b[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, Exhausted> {
        self.read_bytes(2).map(BigEndian::read_u16)
    }

    pub fn read_u32(&mut self) -> Result<u32, Exhausted> {
        self.read_bytes(4).map(BigEndian::read_u32)
    }

    pub fn read_i64(&mut self) -> Result<i64, Exhausted> {
        self.read_bytes(8).map(BigEndian::read_i64)
    }
}
