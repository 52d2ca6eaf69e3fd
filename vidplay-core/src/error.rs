//! Error types shared by the playback core.

use crate::chroma::FourCc;
use thiserror::Error;

/// Errors raised by the core format layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Decoded dimensions are zero, above the 8192 limit, or smaller than
    /// the visible region.
    #[error("invalid display size {width}x{height}")]
    InvalidDisplaySize { width: i32, height: i32 },

    /// No layout description exists for the chroma tag.
    #[error("unknown chroma {0}")]
    UnknownChroma(FourCc),

    /// The pixel format has no usable descriptor.
    #[error("invalid pixel format")]
    InvalidPixelFormat,
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::InvalidDisplaySize {
            width: 0,
            height: 1080,
        };
        assert_eq!(err.to_string(), "invalid display size 0x1080");
    }
}
