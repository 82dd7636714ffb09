// SPDX-License-Identifier: MIT
//! # Asset TLV
//!
//! A compact Type-Length-Value record format for packing game assets
//! (numbers, strings, byte blobs, textures and meshes) into one contiguous
//! buffer, and for parsing that buffer back without copying it.
//!
//! ## Format Overview
//!
//! ```text
//! record := tag:u32  length:u32  value:byte[length]
//! buffer := record*
//! ```
//!
//! All integers and floats are little-endian. Two tags are composite:
//! `TEXTURE_DESCRIPTION` and `MESH_DATA` carry a complete nested buffer as
//! their value, with fields in a fixed order:
//!
//! - texture: name, width, height, format, usage, pixel data
//! - mesh: name, vertices, indices
//!
//! ## Key Features
//!
//! - **Zero-copy reading**: [`TlvReader`] and [`TlvEntry`] borrow the buffer
//! - **Fail on access**: every record is bounds checked when it is decoded
//! - **Name probes**: find a texture or mesh by name without decoding its
//!   pixels or vertices
//!
//! ## Usage
//!
//! ```rust
//! use asset_tlv::{TextureFormat, TextureUsage, TlvReader, TlvWriter};
//!
//! let mut writer = TlvWriter::new();
//! writer.write_u32(42);
//! writer.write_texture_description(
//!     "tex",
//!     1,
//!     1,
//!     TextureFormat::Rgb,
//!     TextureUsage::Srgb,
//!     &[0xff, 0xff, 0xff],
//! );
//! let buffer = writer.yield_buffer();
//!
//! let reader = TlvReader::new(&buffer);
//! let texture = reader.find_texture("tex").unwrap().unwrap();
//! assert_eq!(texture.as_texture_description().unwrap().width, 1);
//! ```

pub mod asset;
pub mod entry;
pub mod error;
pub mod format;
pub mod reader;
pub mod writer;

// Re-export main types
pub use asset::{MeshData, TextureDescription, TextureFormat, TextureUsage, Vertex};
pub use entry::TlvEntry;
pub use error::ReadError;
pub use format::{TlvType, HEADER_SIZE};
pub use reader::{Cursor, Iter, TlvReader};
pub use writer::TlvWriter;
