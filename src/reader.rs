// SPDX-License-Identifier: MIT
//! TLV reader for iterating over asset buffers
//!
//! The reader is a non-owning view over a buffer of back-to-back records.
//! Nothing is validated up front: every record is bounds checked when it is
//! dereferenced, and advancing re-derives the record size the same way, so a
//! malformed record can never cause an out-of-bounds read.

use crate::entry::TlvEntry;
use crate::error::ReadError;
use crate::format::{read_u32, TlvType, HEADER_SIZE, TAG_SIZE};
use std::iter::FusedIterator;
use tracing::debug;

/// Non-owning reader over a buffer of TLV records
#[derive(Debug, Clone, Copy)]
pub struct TlvReader<'a> {
    buffer: &'a [u8],
}

impl<'a> TlvReader<'a> {
    /// Create a reader over borrowed data
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer }
    }

    /// The buffer being read
    pub fn as_bytes(&self) -> &'a [u8] {
        self.buffer
    }

    /// Cursor positioned at the first record
    pub fn begin(&self) -> Cursor<'a> {
        Cursor {
            remaining: self.buffer,
            offset: 0,
        }
    }

    /// Sentinel cursor: an empty slice at the very end of the buffer
    pub fn end(&self) -> Cursor<'a> {
        let len = self.buffer.len();
        Cursor {
            remaining: &self.buffer[len..],
            offset: len,
        }
    }

    /// Iterate over the records in order
    pub fn iter(&self) -> Iter<'a> {
        Iter {
            cursor: self.begin(),
            end: self.end(),
            failed: false,
        }
    }

    /// Check the buffer is well-formed and return its record count
    ///
    /// Only the top-level framing is checked; composite values are decoded
    /// lazily by their getters.
    pub fn validate(&self) -> Result<usize, ReadError> {
        let mut count = 0;
        for entry in self.iter() {
            entry?;
            count += 1;
        }
        Ok(count)
    }

    /// Find the first texture description with the given name
    ///
    /// Records are matched by name alone; pixel data of other textures is
    /// never decoded.
    pub fn find_texture(&self, name: &str) -> Result<Option<TlvEntry<'a>>, ReadError> {
        for entry in self.iter() {
            let entry = entry?;
            if entry.is_texture_named(name)? {
                return Ok(Some(entry));
            }
        }
        Ok(None)
    }

    /// Find the first mesh with the given name
    pub fn find_mesh(&self, name: &str) -> Result<Option<TlvEntry<'a>>, ReadError> {
        for entry in self.iter() {
            let entry = entry?;
            if entry.is_mesh_named(name)? {
                return Ok(Some(entry));
            }
        }
        Ok(None)
    }
}

impl<'a> IntoIterator for &TlvReader<'a> {
    type Item = Result<TlvEntry<'a>, ReadError>;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a> IntoIterator for TlvReader<'a> {
    type Item = Result<TlvEntry<'a>, ReadError>;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Forward cursor over the records of a [`TlvReader`]
///
/// Two cursors are equal when they view the same remaining bytes: same
/// start address and same length. Only a cursor that consumed exactly up to
/// the end of the buffer compares equal to [`TlvReader::end`].
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    remaining: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    /// Byte offset of the cursor from the start of the buffer
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes left from the cursor to the end of the buffer
    pub fn remaining(&self) -> &'a [u8] {
        self.remaining
    }

    /// Decode the record under the cursor
    pub fn get(&self) -> Result<TlvEntry<'a>, ReadError> {
        let available = self.remaining.len();

        let (Some(raw_tag), Some(length)) = (
            read_u32(self.remaining, 0),
            read_u32(self.remaining, TAG_SIZE),
        ) else {
            return Err(ReadError::TruncatedHeader {
                offset: self.offset,
                available,
            });
        };

        let value_available = available - HEADER_SIZE;
        if length as usize > value_available {
            return Err(ReadError::TruncatedValue {
                offset: self.offset,
                declared: length,
                available: value_available,
            });
        }

        let tag = TlvType::from_u32(raw_tag).ok_or(ReadError::UnknownTag {
            offset: self.offset,
            tag: raw_tag,
        })?;

        let value = &self.remaining[HEADER_SIZE..HEADER_SIZE + length as usize];
        Ok(TlvEntry::new(tag, value))
    }

    /// Move past the record under the cursor
    pub fn advance(&mut self) -> Result<(), ReadError> {
        let size = self.get()?.size();
        self.skip(size);
        Ok(())
    }

    #[inline]
    fn skip(&mut self, size: usize) {
        self.remaining = &self.remaining[size..];
        self.offset += size;
    }
}

impl PartialEq for Cursor<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.remaining.as_ptr(), other.remaining.as_ptr())
            && self.remaining.len() == other.remaining.len()
    }
}

impl Eq for Cursor<'_> {}

/// Iterator over the records of a [`TlvReader`]
///
/// Yields records until the cursor reaches the end of the buffer. A
/// malformed record is yielded once as an error, after which the iterator
/// is exhausted.
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    cursor: Cursor<'a>,
    end: Cursor<'a>,
    failed: bool,
}

impl<'a> Iter<'a> {
    /// Position of the next record
    pub fn cursor(&self) -> Cursor<'a> {
        self.cursor
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = Result<TlvEntry<'a>, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.cursor == self.end {
            return None;
        }

        match self.cursor.get() {
            Ok(entry) => {
                self.cursor.skip(entry.size());
                Some(Ok(entry))
            }
            Err(err) => {
                debug!(offset = self.cursor.offset(), error = %err, "malformed TLV record");
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

impl FusedIterator for Iter<'_> {}
