//! Error types for the canvas.

use mipview_render::{DecodeError, RenderError};
use thiserror::Error;

/// Errors reported by [`Canvas`](crate::Canvas) load operations.
///
/// None of these are fatal: the canvas falls back to an empty or error
/// state, or keeps showing the previous image.
#[derive(Error, Debug)]
pub enum CanvasError {
    /// The file could not be read, is in an unsupported format, or is corrupt.
    #[error("failed to decode image: {0}")]
    DecodeFailure(#[source] DecodeError),

    /// A pixel buffer or pyramid level could not be allocated, including
    /// images whose header exceeds the decoder's allocation cap.
    #[error("failed to allocate a {width}x{height} image buffer")]
    AllocationFailure { width: u32, height: u32 },

    /// Reload was requested before any image path was set.
    #[error("no image path has been set")]
    NoImagePath,
}

impl From<RenderError> for CanvasError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Decode(DecodeError::TooLarge { width, height }) => {
                Self::AllocationFailure { width, height }
            }
            RenderError::Decode(decode) => Self::DecodeFailure(decode),
            RenderError::Allocation { width, height }
            | RenderError::InvalidDimensions { width, height } => {
                Self::AllocationFailure { width, height }
            }
            RenderError::BufferSize { expected, .. } => Self::AllocationFailure {
                width: u32::try_from(expected).unwrap_or(u32::MAX),
                height: 1,
            },
        }
    }
}

/// Result type for canvas operations.
pub type CanvasResult<T> = Result<T, CanvasError>;

/// Errors from parsing or validating a [`CanvasConfig`](crate::CanvasConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The TOML text is malformed or has a field of the wrong type, including
    /// colors that are not `#RRGGBB`.
    #[error("invalid canvas configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration could not be serialized.
    #[error("failed to serialize canvas configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A field is outside its allowed range.
    #[error("invalid value for `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_error_mapping() {
        let err: CanvasError = RenderError::Allocation {
            width: 10,
            height: 20,
        }
        .into();
        assert!(matches!(
            err,
            CanvasError::AllocationFailure {
                width: 10,
                height: 20
            }
        ));

        let err: CanvasError = RenderError::Decode(DecodeError::Corrupt("bad".into())).into();
        assert!(matches!(err, CanvasError::DecodeFailure(DecodeError::Corrupt(_))));
        assert_eq!(err.to_string(), "failed to decode image: corrupt image data: bad");
    }

    #[test]
    fn test_oversized_decode_is_allocation_failure() {
        let err: CanvasError = RenderError::Decode(DecodeError::TooLarge {
            width: 20000,
            height: 20000,
        })
        .into();
        assert!(matches!(
            err,
            CanvasError::AllocationFailure {
                width: 20000,
                height: 20000
            }
        ));
    }
}
