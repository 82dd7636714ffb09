// SPDX-License-Identifier: MIT
//! TLV record layout and tag catalogue
//!
//! Every record is a fixed 8-byte header followed by its value:
//!
//! ```text
//! +--------+ -.
//! |  Tag   |  | 4 bytes (u32, little-endian)
//! +--------+ -+
//! | Length |  | 4 bytes (u32, little-endian)
//! +--------+ -+
//! | Value  |  | Length bytes
//! |  ...   |  |
//! +--------+ -'
//! ```
//!
//! A buffer is zero or more records back to back with no padding.

use std::fmt;

/// Size of the tag field in bytes
pub const TAG_SIZE: usize = 4;

/// Size of the length field in bytes
pub const LENGTH_SIZE: usize = 4;

/// Size of a record header (tag + length) in bytes
pub const HEADER_SIZE: usize = TAG_SIZE + LENGTH_SIZE;

/// Record tags. The discriminants are the on-disk values and must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum TlvType {
    Uint32 = 0,
    Uint32Array = 1,
    String = 2,
    ByteArray = 3,
    TextureFormat = 4,
    TextureUsage = 5,
    VertexData = 6,
    VertexDataArray = 7,

    // composite types
    TextureDescription = 8,
    MeshData = 9,
}

impl TlvType {
    /// Get all tags in discriminant order
    pub fn all() -> &'static [TlvType] {
        &[
            TlvType::Uint32,
            TlvType::Uint32Array,
            TlvType::String,
            TlvType::ByteArray,
            TlvType::TextureFormat,
            TlvType::TextureUsage,
            TlvType::VertexData,
            TlvType::VertexDataArray,
            TlvType::TextureDescription,
            TlvType::MeshData,
        ]
    }

    /// Decode a raw tag value, `None` if it is not in the catalogue
    #[inline]
    pub fn from_u32(value: u32) -> Option<Self> {
        Self::all().get(value as usize).copied()
    }

    /// The on-disk tag value
    #[inline]
    pub fn as_u32(self) -> u32 {
        self as u32
    }

    /// Whether the value of this record is itself a nested TLV buffer
    pub fn is_composite(self) -> bool {
        matches!(self, TlvType::TextureDescription | TlvType::MeshData)
    }

    /// Get the name of the tag
    pub fn name(&self) -> &'static str {
        match self {
            TlvType::Uint32 => "UINT32",
            TlvType::Uint32Array => "UINT32_ARRAY",
            TlvType::String => "STRING",
            TlvType::ByteArray => "BYTE_ARRAY",
            TlvType::TextureFormat => "TEXTURE_FORMAT",
            TlvType::TextureUsage => "TEXTURE_USAGE",
            TlvType::VertexData => "VERTEX_DATA",
            TlvType::VertexDataArray => "VERTEX_DATA_ARRAY",
            TlvType::TextureDescription => "TEXTURE_DESCRIPTION",
            TlvType::MeshData => "MESH_DATA",
        }
    }
}

impl fmt::Display for TlvType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Read a little-endian u32 at `offset`, `None` if fewer than 4 bytes remain
#[inline]
pub(crate) fn read_u32(bytes: &[u8], offset: usize) -> Option<u32> {
    let end = offset.checked_add(4)?;
    let raw: [u8; 4] = bytes.get(offset..end)?.try_into().ok()?;
    Some(u32::from_le_bytes(raw))
}

/// Read a little-endian f32 at `offset`, `None` if fewer than 4 bytes remain
#[inline]
pub(crate) fn read_f32(bytes: &[u8], offset: usize) -> Option<f32> {
    read_u32(bytes, offset).map(f32::from_bits)
}

/// Append a record header to `buffer`
#[inline]
pub(crate) fn write_header(buffer: &mut Vec<u8>, tag: TlvType, length: u32) {
    buffer.extend_from_slice(&tag.as_u32().to_le_bytes());
    buffer.extend_from_slice(&length.to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_values_are_stable() {
        assert_eq!(TlvType::Uint32.as_u32(), 0);
        assert_eq!(TlvType::Uint32Array.as_u32(), 1);
        assert_eq!(TlvType::String.as_u32(), 2);
        assert_eq!(TlvType::ByteArray.as_u32(), 3);
        assert_eq!(TlvType::TextureFormat.as_u32(), 4);
        assert_eq!(TlvType::TextureUsage.as_u32(), 5);
        assert_eq!(TlvType::VertexData.as_u32(), 6);
        assert_eq!(TlvType::VertexDataArray.as_u32(), 7);
        assert_eq!(TlvType::TextureDescription.as_u32(), 8);
        assert_eq!(TlvType::MeshData.as_u32(), 9);
    }

    #[test]
    fn test_from_u32() {
        for &tag in TlvType::all() {
            assert_eq!(TlvType::from_u32(tag.as_u32()), Some(tag));
        }
        assert_eq!(TlvType::from_u32(10), None);
        assert_eq!(TlvType::from_u32(u32::MAX), None);
    }

    #[test]
    fn test_is_composite() {
        assert!(TlvType::TextureDescription.is_composite());
        assert!(TlvType::MeshData.is_composite());
        assert!(!TlvType::ByteArray.is_composite());
        assert!(!TlvType::VertexDataArray.is_composite());
    }

    #[test]
    fn test_tag_display() {
        assert_eq!(TlvType::Uint32.to_string(), "UINT32");
        assert_eq!(TlvType::VertexDataArray.to_string(), "VERTEX_DATA_ARRAY");
        assert_eq!(TlvType::MeshData.to_string(), "MESH_DATA");
    }

    #[test]
    fn test_write_header() {
        let mut buffer = Vec::new();
        write_header(&mut buffer, TlvType::String, 2);
        assert_eq!(buffer, [2, 0, 0, 0, 2, 0, 0, 0]);
        assert_eq!(buffer.len(), HEADER_SIZE);
    }

    #[test]
    fn test_read_u32_bounds() {
        let bytes = [0xdd, 0xcc, 0xbb, 0xaa, 0x01];
        assert_eq!(read_u32(&bytes, 0), Some(0xaabbccdd));
        assert_eq!(read_u32(&bytes, 2), None);
        assert_eq!(read_u32(&bytes, usize::MAX), None);
    }
}
