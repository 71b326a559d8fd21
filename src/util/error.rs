//! Error types for the VEC3 library.

use std::path::PathBuf;
use thiserror::Error;

use crate::model::VertexAttributeType;

/// Main error type for VEC3 operations.
#[derive(Error, Debug)]
pub enum Error {
    /// File does not exist or cannot be accessed
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Invalid magic bytes at start of file
    #[error("Invalid header: expected VEC3 magic bytes, got {0:02x?}")]
    InvalidMagic([u8; 8]),

    /// Unsupported container version
    #[error("Invalid header: unsupported VEC3 version {0}")]
    UnsupportedVersion(u16),

    /// Stream ended before the requested number of bytes
    #[error("Unexpected end of input at position {0}")]
    UnexpectedEof(u64),

    /// Decompressed block does not have the declared size
    #[error("Corrupt data: decompressed size {actual} does not match declared size {expected}")]
    CorruptData { expected: usize, actual: usize },

    /// Compressed block is not a valid gzip stream
    #[error("Corrupt data: {0}")]
    Decompress(String),

    /// Vertex attribute type byte is not a known type
    #[error("Unknown vertex attribute type: {0}")]
    UnknownAttributeType(u8),

    /// Meshes of one model disagree on attribute types or order
    #[error("Attribute schema mismatch in model '{model}', mesh {mesh}: expected {expected:?}, got {actual:?}")]
    AttributeSchemaMismatch {
        model: String,
        mesh: usize,
        expected: Vec<VertexAttributeType>,
        actual: Vec<VertexAttributeType>,
    },

    /// Required vertex attribute is absent
    #[error("Model '{model}' has no {attribute:?} attribute")]
    MissingAttribute {
        model: String,
        attribute: VertexAttributeType,
    },

    /// Invalid data structure in file
    #[error("Invalid file structure: {0}")]
    InvalidStructure(String),

    /// Bad packed format string or value list
    #[error("Invalid packed format: {0}")]
    InvalidFormat(String),

    /// Export input violates a precondition
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    /// Index value does not fit the selected element width
    #[error("Index {value} does not fit in {width}-byte index element")]
    IndexOverflow { value: u32, width: usize },

    /// Element count does not fit its on-disk field
    #[error("Too many {what}: {count} (max {max})")]
    CountOverflow { what: &'static str, count: usize, max: usize },

    /// Names are stored as ASCII
    #[error("Name is not ASCII: {0:?}")]
    NonAsciiName(String),

    /// Memory mapping failed
    #[error("Memory mapping failed: {0}")]
    MmapFailed(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid structure error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidStructure(msg.into())
    }

    /// Create an invalid mesh error.
    pub fn invalid_mesh(msg: impl Into<String>) -> Self {
        Self::InvalidMesh(msg.into())
    }

    /// True for errors raised while validating the container header.
    pub fn is_invalid_header(&self) -> bool {
        matches!(self, Self::InvalidMagic(_) | Self::UnsupportedVersion(_))
    }

    /// True for errors raised by a compressed block that failed verification.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::CorruptData { .. } | Self::Decompress(_))
    }
}

/// Result type alias for VEC3 operations.
pub type Result<T> = std::result::Result<T, Error>;
