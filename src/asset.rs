// SPDX-License-Identifier: MIT
//! Asset types carried by TLV records
//!
//! These are the decoded forms handed to the renderer: vertices, texture
//! enums and the two composite descriptions.

use crate::format::read_f32;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Possible texture formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum TextureFormat {
    Rgb = 0,
    Rgba = 1,
}

impl TextureFormat {
    /// Decode an on-disk value
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(TextureFormat::Rgb),
            1 => Some(TextureFormat::Rgba),
            _ => None,
        }
    }

    /// Number of bytes per pixel
    pub fn channels(self) -> u32 {
        match self {
            TextureFormat::Rgb => 3,
            TextureFormat::Rgba => 4,
        }
    }
}

impl fmt::Display for TextureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TextureFormat::Rgb => "RGB",
            TextureFormat::Rgba => "RGBA",
        })
    }
}

/// Possible texture usages
///
/// Only [`TextureUsage::Srgb`] and [`TextureUsage::Data`] describe packed
/// textures; the other two are created at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum TextureUsage {
    Framebuffer = 0,
    Depth = 1,
    Srgb = 2,
    Data = 3,
}

impl TextureUsage {
    /// Decode an on-disk value
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(TextureUsage::Framebuffer),
            1 => Some(TextureUsage::Depth),
            2 => Some(TextureUsage::Srgb),
            3 => Some(TextureUsage::Data),
            _ => None,
        }
    }

    /// Whether a packed texture description may carry this usage
    pub fn is_packable(self) -> bool {
        matches!(self, TextureUsage::Srgb | TextureUsage::Data)
    }
}

impl fmt::Display for TextureUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TextureUsage::Framebuffer => "FRAMEBUFFER",
            TextureUsage::Depth => "DEPTH",
            TextureUsage::Srgb => "SRGB",
            TextureUsage::Data => "DATA",
        })
    }
}

/// Vertex data (44 bytes) - position + normal + tangent + uv
///
/// Layout (little-endian f32):
/// - position: [f32; 3] @ 0
/// - normal: [f32; 3]   @ 12
/// - tangent: [f32; 3]  @ 24
/// - uv: [f32; 2]       @ 36
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tangent: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    /// Encoded size in bytes
    pub const SIZE: usize = 44;

    pub fn new(position: [f32; 3], normal: [f32; 3], tangent: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            tangent,
            uv,
        }
    }

    /// Append the encoded vertex to `buffer`
    #[inline]
    pub fn write_to_buffer(&self, buffer: &mut Vec<u8>) {
        buffer.reserve(Self::SIZE);

        let components = self
            .position
            .iter()
            .chain(&self.normal)
            .chain(&self.tangent)
            .chain(&self.uv);
        for component in components {
            buffer.extend_from_slice(&component.to_le_bytes());
        }
    }

    /// Decode a vertex from exactly [`Vertex::SIZE`] bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != Self::SIZE {
            return None;
        }

        let mut floats = [0.0f32; 11];
        for (index, float) in floats.iter_mut().enumerate() {
            *float = read_f32(bytes, index * 4)?;
        }

        Some(Self {
            position: [floats[0], floats[1], floats[2]],
            normal: [floats[3], floats[4], floats[5]],
            tangent: [floats[6], floats[7], floats[8]],
            uv: [floats[9], floats[10]],
        })
    }
}

/// A description of a texture to load
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureDescription {
    /// Name the texture is looked up by
    pub name: String,

    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub usage: TextureUsage,

    /// The raw pixel data of the texture
    pub data: Vec<u8>,
}

/// Mesh geometry: vertices and triangle indices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    pub name: String,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}
