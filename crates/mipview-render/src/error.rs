//! Error types for the render crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while turning an image file into pixels.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file format is not supported by the decoder.
    #[error("unsupported image format: {0}")]
    Unsupported(String),

    /// The file was recognised but its contents are invalid.
    #[error("corrupt image data: {0}")]
    Corrupt(String),

    /// The image is too large to be represented in memory.
    #[error("image too large: {width}x{height}")]
    TooLarge { width: u32, height: u32 },
}

/// Errors that can occur during pixel and pyramid operations.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Decoding the source image failed.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// A pixel buffer could not be allocated.
    #[error("failed to allocate a {width}x{height} pixel buffer")]
    Allocation { width: u32, height: u32 },

    /// Invalid buffer dimensions (zero width or height).
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Raw pixel data did not match the requested dimensions.
    #[error("invalid buffer size: expected {expected} pixels, got {actual}")]
    BufferSize { expected: usize, actual: usize },
}

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;
