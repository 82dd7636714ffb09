// SPDX-License-Identifier: MIT
//! TLV writer for building asset buffers
//!
//! Values are appended one record at a time. Once everything has been
//! written the buffer is taken out with [`TlvWriter::yield_buffer`], which
//! leaves the writer empty and ready for reuse.

use crate::asset::{MeshData, TextureDescription, TextureFormat, TextureUsage, Vertex};
use crate::format::{write_header, TlvType, HEADER_SIZE};
use tracing::trace;

/// Append-only builder for TLV buffers
#[derive(Debug, Default, Clone)]
pub struct TlvWriter {
    buffer: Vec<u8>,
}

/// Length field for a value of `len` bytes
///
/// # Panics
/// Panics if the value is longer than `u32::MAX` bytes, which the format
/// cannot frame.
#[inline]
fn frame_length(tag: TlvType, len: usize) -> u32 {
    match u32::try_from(len) {
        Ok(length) => length,
        Err(_) => panic!("{tag} value of {len} bytes exceeds the maximum record length"),
    }
}

impl TlvWriter {
    /// Create a new empty writer
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Create a writer with room for `capacity` bytes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Number of bytes written so far
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Bytes written so far
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Take the buffer, leaving the writer as if newly constructed
    pub fn yield_buffer(&mut self) -> Vec<u8> {
        let buffer = std::mem::take(&mut self.buffer);
        trace!(bytes = buffer.len(), "yielded TLV buffer");
        buffer
    }

    /// Append a record whose value is already encoded
    #[inline]
    fn write_entry(&mut self, tag: TlvType, value: &[u8]) {
        let length = frame_length(tag, value.len());
        self.buffer.reserve(HEADER_SIZE + value.len());
        write_header(&mut self.buffer, tag, length);
        self.buffer.extend_from_slice(value);
        trace!(%tag, length, "wrote record");
    }

    /// Write a u32
    pub fn write_u32(&mut self, value: u32) {
        self.write_entry(TlvType::Uint32, &value.to_le_bytes());
    }

    /// Write an array of u32
    pub fn write_u32_array(&mut self, values: &[u32]) {
        let tag = TlvType::Uint32Array;
        let length = frame_length(tag, values.len().saturating_mul(4));

        self.buffer.reserve(HEADER_SIZE + length as usize);
        write_header(&mut self.buffer, tag, length);
        for value in values {
            self.buffer.extend_from_slice(&value.to_le_bytes());
        }
        trace!(%tag, length, "wrote record");
    }

    /// Write a string (UTF-8, no terminator)
    pub fn write_string(&mut self, value: &str) {
        self.write_entry(TlvType::String, value.as_bytes());
    }

    /// Write a byte array
    pub fn write_byte_array(&mut self, value: &[u8]) {
        self.write_entry(TlvType::ByteArray, value);
    }

    /// Write a texture format
    pub fn write_texture_format(&mut self, value: TextureFormat) {
        self.write_entry(TlvType::TextureFormat, &(value as u32).to_le_bytes());
    }

    /// Write a texture usage
    pub fn write_texture_usage(&mut self, value: TextureUsage) {
        self.write_entry(TlvType::TextureUsage, &(value as u32).to_le_bytes());
    }

    /// Write a single vertex
    pub fn write_vertex(&mut self, value: &Vertex) {
        let tag = TlvType::VertexData;
        self.buffer.reserve(HEADER_SIZE + Vertex::SIZE);
        write_header(&mut self.buffer, tag, Vertex::SIZE as u32);
        value.write_to_buffer(&mut self.buffer);
        trace!(%tag, length = Vertex::SIZE, "wrote record");
    }

    /// Write an array of vertices
    pub fn write_vertex_array(&mut self, values: &[Vertex]) {
        let tag = TlvType::VertexDataArray;
        let length = frame_length(tag, values.len().saturating_mul(Vertex::SIZE));

        self.buffer.reserve(HEADER_SIZE + length as usize);
        write_header(&mut self.buffer, tag, length);
        for vertex in values {
            vertex.write_to_buffer(&mut self.buffer);
        }
        trace!(%tag, length, "wrote record");
    }

    /// Write a texture description
    ///
    /// The value is a nested TLV buffer holding, in order: name, width,
    /// height, format, usage and pixel data.
    ///
    /// Any usage is written as given, but only packable usages (`SRGB`,
    /// `DATA`) read back: `TlvEntry::as_texture_description` rejects
    /// `FRAMEBUFFER` and `DEPTH` with `ReadError::InvalidTextureUsage`.
    pub fn write_texture_description(
        &mut self,
        name: &str,
        width: u32,
        height: u32,
        format: TextureFormat,
        usage: TextureUsage,
        data: &[u8],
    ) {
        let mut writer = TlvWriter::with_capacity(6 * HEADER_SIZE + name.len() + 16 + data.len());

        writer.write_string(name);
        writer.write_u32(width);
        writer.write_u32(height);
        writer.write_texture_format(format);
        writer.write_texture_usage(usage);
        writer.write_byte_array(data);

        let value = writer.yield_buffer();
        self.write_entry(TlvType::TextureDescription, &value);
    }

    /// Write a texture description from its decoded form
    pub fn write_texture(&mut self, texture: &TextureDescription) {
        self.write_texture_description(
            &texture.name,
            texture.width,
            texture.height,
            texture.format,
            texture.usage,
            &texture.data,
        );
    }

    /// Write mesh data
    ///
    /// The value is a nested TLV buffer holding, in order: name, vertices
    /// and indices.
    pub fn write_mesh_data(&mut self, name: &str, vertices: &[Vertex], indices: &[u32]) {
        let mut writer = TlvWriter::with_capacity(
            3 * HEADER_SIZE + name.len() + vertices.len() * Vertex::SIZE + indices.len() * 4,
        );

        writer.write_string(name);
        writer.write_vertex_array(vertices);
        writer.write_u32_array(indices);

        let value = writer.yield_buffer();
        self.write_entry(TlvType::MeshData, &value);
    }

    /// Write mesh data from its decoded form
    pub fn write_mesh(&mut self, mesh: &MeshData) {
        self.write_mesh_data(&mesh.name, &mesh.vertices, &mesh.indices);
    }
}
