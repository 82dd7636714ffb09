// SPDX-License-Identifier: MIT
//! Decoded view of a single TLV record
//!
//! A [`TlvEntry`] is a tag plus a borrowed value slice. Typed getters check
//! the tag (and the size, for fixed-size values) before touching the bytes.
//! Composite values are decoded by walking a nested [`TlvReader`] over the
//! value in schema order.

use crate::asset::{MeshData, TextureDescription, TextureFormat, TextureUsage, Vertex};
use crate::error::ReadError;
use crate::format::{read_u32, TlvType, HEADER_SIZE};
use crate::reader::{Iter, TlvReader};
use tracing::trace;

/// A non-owning view of one Type-Length-Value record
///
/// It is assumed records contain user controlled data, so every getter has a
/// wide contract and reports mismatches as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlvEntry<'a> {
    tag: TlvType,
    value: &'a [u8],
}

impl<'a> TlvEntry<'a> {
    /// Create an entry from a tag and its value bytes
    pub fn new(tag: TlvType, value: &'a [u8]) -> Self {
        Self { tag, value }
    }

    /// The tag of the entry
    pub fn tag(&self) -> TlvType {
        self.tag
    }

    /// Raw value bytes
    pub fn value(&self) -> &'a [u8] {
        self.value
    }

    /// Size of the whole record: tag + length + value
    pub fn size(&self) -> usize {
        HEADER_SIZE + self.value.len()
    }

    #[inline]
    fn expect_tag(&self, expected: TlvType) -> Result<(), ReadError> {
        if self.tag != expected {
            return Err(ReadError::TagMismatch {
                expected,
                actual: self.tag,
            });
        }
        Ok(())
    }

    #[inline]
    fn expect_size(&self, expected: usize) -> Result<(), ReadError> {
        if self.value.len() != expected {
            return Err(ReadError::SizeMismatch {
                tag: self.tag,
                expected,
                actual: self.value.len(),
            });
        }
        Ok(())
    }

    #[inline]
    fn expect_aligned(&self, element_size: usize) -> Result<(), ReadError> {
        if self.value.len() % element_size != 0 {
            return Err(ReadError::MisalignedArray {
                tag: self.tag,
                element_size,
                length: self.value.len(),
            });
        }
        Ok(())
    }

    /// Tag and size checked u32 payload shared by the scalar getters
    #[inline]
    fn scalar(&self, tag: TlvType) -> Result<u32, ReadError> {
        self.expect_tag(tag)?;
        self.expect_size(4)?;
        read_u32(self.value, 0).ok_or(ReadError::SizeMismatch {
            tag,
            expected: 4,
            actual: self.value.len(),
        })
    }

    /// Get the value as a u32
    pub fn as_u32(&self) -> Result<u32, ReadError> {
        self.scalar(TlvType::Uint32)
    }

    /// Get a copy of the value as a u32 array
    pub fn as_u32_array(&self) -> Result<Vec<u32>, ReadError> {
        self.expect_tag(TlvType::Uint32Array)?;
        self.expect_aligned(4)?;

        Ok(self
            .value
            .chunks_exact(4)
            .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect())
    }

    /// Borrow the value as a string
    pub fn as_str(&self) -> Result<&'a str, ReadError> {
        self.expect_tag(TlvType::String)?;
        Ok(std::str::from_utf8(self.value)?)
    }

    /// Get a copy of the value as a string
    pub fn as_string(&self) -> Result<String, ReadError> {
        self.as_str().map(str::to_owned)
    }

    /// Borrow the value as a byte array
    pub fn as_byte_array(&self) -> Result<&'a [u8], ReadError> {
        self.expect_tag(TlvType::ByteArray)?;
        Ok(self.value)
    }

    /// Get the value as a texture format
    pub fn as_texture_format(&self) -> Result<TextureFormat, ReadError> {
        let tag = TlvType::TextureFormat;
        let value = self.scalar(tag)?;
        TextureFormat::from_u32(value).ok_or(ReadError::InvalidEnumValue { tag, value })
    }

    /// Get the value as a texture usage
    pub fn as_texture_usage(&self) -> Result<TextureUsage, ReadError> {
        let tag = TlvType::TextureUsage;
        let value = self.scalar(tag)?;
        TextureUsage::from_u32(value).ok_or(ReadError::InvalidEnumValue { tag, value })
    }

    /// Get the value as a vertex
    pub fn as_vertex(&self) -> Result<Vertex, ReadError> {
        self.expect_tag(TlvType::VertexData)?;
        self.expect_size(Vertex::SIZE)?;
        Vertex::from_bytes(self.value).ok_or(ReadError::SizeMismatch {
            tag: self.tag,
            expected: Vertex::SIZE,
            actual: self.value.len(),
        })
    }

    /// Get a copy of the value as a vertex array
    pub fn as_vertex_array(&self) -> Result<Vec<Vertex>, ReadError> {
        self.expect_tag(TlvType::VertexDataArray)?;
        self.expect_aligned(Vertex::SIZE)?;

        self.value
            .chunks_exact(Vertex::SIZE)
            .map(|chunk| {
                Vertex::from_bytes(chunk).ok_or(ReadError::MisalignedArray {
                    tag: self.tag,
                    element_size: Vertex::SIZE,
                    length: self.value.len(),
                })
            })
            .collect()
    }

    /// Get a copy of the value as a texture description
    pub fn as_texture_description(&self) -> Result<TextureDescription, ReadError> {
        let composite = TlvType::TextureDescription;
        self.expect_tag(composite)?;

        let mut fields = Fields::new(composite, self.value);
        let name = fields.next_field("name")?.as_string()?;
        let width = fields.next_field("width")?.as_u32()?;
        let height = fields.next_field("height")?.as_u32()?;
        let format = fields.next_field("format")?.as_texture_format()?;
        let usage = fields.next_field("usage")?.as_texture_usage()?;
        let data = fields.next_field("data")?.as_byte_array()?.to_vec();
        fields.finish()?;

        if !usage.is_packable() {
            return Err(ReadError::InvalidTextureUsage { usage });
        }

        Ok(TextureDescription {
            name,
            width,
            height,
            format,
            usage,
            data,
        })
    }

    /// Get a copy of the value as mesh data
    pub fn as_mesh_data(&self) -> Result<MeshData, ReadError> {
        let composite = TlvType::MeshData;
        self.expect_tag(composite)?;

        let mut fields = Fields::new(composite, self.value);
        let name = fields.next_field("name")?.as_string()?;
        let vertices = fields.next_field("vertices")?.as_vertex_array()?;
        let indices = fields.next_field("indices")?.as_u32_array()?;
        fields.finish()?;

        Ok(MeshData {
            name,
            vertices,
            indices,
        })
    }

    /// Check if the entry is a texture description with the given name
    ///
    /// Only the name field is decoded. Returns `false` for other tags.
    pub fn is_texture_named(&self, name: &str) -> Result<bool, ReadError> {
        self.is_composite_named(TlvType::TextureDescription, name)
    }

    /// Check if the entry is mesh data with the given name
    ///
    /// Only the name field is decoded. Returns `false` for other tags.
    pub fn is_mesh_named(&self, name: &str) -> Result<bool, ReadError> {
        self.is_composite_named(TlvType::MeshData, name)
    }

    fn is_composite_named(&self, composite: TlvType, name: &str) -> Result<bool, ReadError> {
        if self.tag != composite {
            return Ok(false);
        }

        let field = Fields::new(composite, self.value).next_field("name")?;
        field.expect_tag(TlvType::String)?;

        let matched = field.value == name.as_bytes();
        if !matched {
            trace!(%composite, name, "name probe rejected record");
        }
        Ok(matched)
    }
}

/// Walks the fields of a composite value in schema order
struct Fields<'a> {
    composite: TlvType,
    iter: Iter<'a>,
}

impl<'a> Fields<'a> {
    fn new(composite: TlvType, value: &'a [u8]) -> Self {
        Self {
            composite,
            iter: TlvReader::new(value).iter(),
        }
    }

    fn next_field(&mut self, field: &'static str) -> Result<TlvEntry<'a>, ReadError> {
        self.iter.next().unwrap_or_else(|| {
            Err(ReadError::MissingField {
                composite: self.composite,
                field,
            })
        })
    }

    fn finish(mut self) -> Result<(), ReadError> {
        match self.iter.next() {
            None => Ok(()),
            Some(_) => Err(ReadError::TrailingData {
                composite: self.composite,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::TlvWriter;

    #[test]
    fn test_ctor() {
        let entry = TlvEntry::new(TlvType::Uint32, &[]);
        assert_eq!(entry.tag(), TlvType::Uint32);
        assert_eq!(entry.size(), HEADER_SIZE);
    }

    #[test]
    fn test_u32_value_valid() {
        let bytes = [0xdd, 0xcc, 0xbb, 0xaa];
        let entry = TlvEntry::new(TlvType::Uint32, &bytes);

        assert_eq!(entry.as_u32().unwrap(), 0xaabbccdd);
    }

    #[test]
    fn test_u32_value_invalid_size() {
        let bytes = [0xdd, 0xcc, 0xbb];
        let entry = TlvEntry::new(TlvType::Uint32, &bytes);

        assert_eq!(
            entry.as_u32(),
            Err(ReadError::SizeMismatch {
                tag: TlvType::Uint32,
                expected: 4,
                actual: 3
            })
        );
    }

    #[test]
    fn test_string_value_valid() {
        let entry = TlvEntry::new(TlvType::String, b"hi");
        assert_eq!(entry.as_string().unwrap(), "hi");
    }

    #[test]
    fn test_string_value_invalid_type() {
        let entry = TlvEntry::new(TlvType::Uint32, b"hi");

        assert_eq!(
            entry.as_string(),
            Err(ReadError::TagMismatch {
                expected: TlvType::String,
                actual: TlvType::Uint32
            })
        );
    }

    #[test]
    fn test_string_value_invalid_utf8() {
        let entry = TlvEntry::new(TlvType::String, &[0xff, 0xfe]);
        assert!(matches!(entry.as_str(), Err(ReadError::InvalidUtf8 { .. })));
    }

    #[test]
    fn test_byte_array_value_valid() {
        let bytes = [0xaa, 0xbb, 0xcc];
        let entry = TlvEntry::new(TlvType::ByteArray, &bytes);

        assert_eq!(entry.as_byte_array().unwrap(), &bytes);
    }

    #[test]
    fn test_byte_array_value_invalid_type() {
        let entry = TlvEntry::new(TlvType::Uint32, b"hi");
        assert!(entry.as_byte_array().is_err());
    }

    #[test]
    fn test_u32_array_misaligned() {
        let entry = TlvEntry::new(TlvType::Uint32Array, &[1, 0, 0, 0, 2, 0]);

        assert_eq!(
            entry.as_u32_array(),
            Err(ReadError::MisalignedArray {
                tag: TlvType::Uint32Array,
                element_size: 4,
                length: 6
            })
        );
    }

    #[test]
    fn test_vertex_array_misaligned() {
        let bytes = [0u8; 45];
        let entry = TlvEntry::new(TlvType::VertexDataArray, &bytes);

        assert!(matches!(
            entry.as_vertex_array(),
            Err(ReadError::MisalignedArray { element_size: 44, .. })
        ));
    }

    #[test]
    fn test_vertex_invalid_size() {
        let bytes = [0u8; 40];
        let entry = TlvEntry::new(TlvType::VertexData, &bytes);

        assert!(matches!(
            entry.as_vertex(),
            Err(ReadError::SizeMismatch { expected: 44, actual: 40, .. })
        ));
    }

    #[test]
    fn test_texture_format_out_of_range() {
        let bytes = 7u32.to_le_bytes();
        let entry = TlvEntry::new(TlvType::TextureFormat, &bytes);

        assert_eq!(
            entry.as_texture_format(),
            Err(ReadError::InvalidEnumValue {
                tag: TlvType::TextureFormat,
                value: 7
            })
        );
    }

    #[test]
    fn test_texture_usage_valid() {
        let bytes = 1u32.to_le_bytes();
        let entry = TlvEntry::new(TlvType::TextureUsage, &bytes);

        assert_eq!(entry.as_texture_usage().unwrap(), TextureUsage::Depth);
    }

    #[test]
    fn test_texture_description_missing_field() {
        let mut inner = TlvWriter::new();
        inner.write_string("tex");
        inner.write_u32(2);
        let nested = inner.yield_buffer();
        let entry = TlvEntry::new(TlvType::TextureDescription, &nested);

        assert_eq!(
            entry.as_texture_description(),
            Err(ReadError::MissingField {
                composite: TlvType::TextureDescription,
                field: "height"
            })
        );
    }

    #[test]
    fn test_texture_description_wrong_field_order() {
        let mut inner = TlvWriter::new();
        inner.write_string("tex");
        inner.write_u32(2);
        inner.write_u32(2);
        inner.write_texture_usage(TextureUsage::Srgb);
        let nested = inner.yield_buffer();
        let entry = TlvEntry::new(TlvType::TextureDescription, &nested);

        assert_eq!(
            entry.as_texture_description(),
            Err(ReadError::TagMismatch {
                expected: TlvType::TextureFormat,
                actual: TlvType::TextureUsage
            })
        );
    }

    #[test]
    fn test_texture_description_runtime_usage_rejected() {
        let mut writer = TlvWriter::new();
        writer.write_texture_description(
            "shadow",
            4,
            4,
            TextureFormat::Rgba,
            TextureUsage::Depth,
            &[],
        );
        let buffer = writer.yield_buffer();
        let entry = TlvReader::new(&buffer).begin().get().unwrap();

        assert_eq!(
            entry.as_texture_description(),
            Err(ReadError::InvalidTextureUsage {
                usage: TextureUsage::Depth
            })
        );
    }

    #[test]
    fn test_mesh_data_trailing_data() {
        let mut inner = TlvWriter::new();
        inner.write_string("mesh");
        inner.write_vertex_array(&[]);
        inner.write_u32_array(&[]);
        inner.write_u32(0);
        let nested = inner.yield_buffer();
        let entry = TlvEntry::new(TlvType::MeshData, &nested);

        assert_eq!(
            entry.as_mesh_data(),
            Err(ReadError::TrailingData {
                composite: TlvType::MeshData
            })
        );
    }

    #[test]
    fn test_is_named_other_tag() {
        let entry = TlvEntry::new(TlvType::String, b"cube");

        assert!(!entry.is_mesh_named("cube").unwrap());
        assert!(!entry.is_texture_named("cube").unwrap());
    }

    #[test]
    fn test_is_named_empty_composite() {
        let entry = TlvEntry::new(TlvType::MeshData, &[]);

        assert_eq!(
            entry.is_mesh_named("cube"),
            Err(ReadError::MissingField {
                composite: TlvType::MeshData,
                field: "name"
            })
        );
    }

    #[test]
    fn test_is_named_ignores_payload() {
        // name followed by a vertex array whose declared length overruns
        let mut inner = TlvWriter::new();
        inner.write_string("cube");
        let mut nested = inner.yield_buffer();
        nested.extend_from_slice(&7u32.to_le_bytes());
        nested.extend_from_slice(&1000u32.to_le_bytes());
        let entry = TlvEntry::new(TlvType::MeshData, &nested);

        assert!(entry.is_mesh_named("cube").unwrap());
        assert!(!entry.is_mesh_named("sphere").unwrap());
        assert!(entry.as_mesh_data().is_err());
    }
}
