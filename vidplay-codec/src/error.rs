//! Error types for the decode stage.

use thiserror::Error;
use vidplay_core::error::CoreError;

/// Errors surfaced by the decoder and the codec-engine boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Codec not found, context allocation failed, or open failed.
    #[error("decoder init failed: {0}")]
    DecoderInitFailed(String),

    /// No viable pixel format could be negotiated.
    #[error("format negotiation failed: {0}")]
    FormatNegotiationFailed(String),

    /// Every hardware candidate refused; recovered locally by software
    /// fallback.
    #[error("hardware acceleration unavailable")]
    HwAccelUnavailable,

    /// End of the stream reached; the engine was flushed.
    #[error("end of stream")]
    EndOfStream,

    /// No frame is available yet; feed more packets.
    #[error("no frame available")]
    TryAgain,

    /// Engine reported a recoverable error; no decoder state changed.
    #[error("codec error: {0}")]
    Transient(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl CodecError {
    #[must_use]
    pub fn is_eof(&self) -> bool {
        matches!(self, CodecError::EndOfStream)
    }

    #[must_use]
    pub fn is_again(&self) -> bool {
        matches!(self, CodecError::TryAgain)
    }
}

pub type Result<T> = std::result::Result<T, CodecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicates() {
        assert!(CodecError::EndOfStream.is_eof());
        assert!(!CodecError::EndOfStream.is_again());
        assert!(CodecError::TryAgain.is_again());
    }

    #[test]
    fn test_core_error_wraps() {
        let err: CodecError = CoreError::InvalidDisplaySize {
            width: 0,
            height: 0,
        }
        .into();
        assert_eq!(err.to_string(), "invalid display size 0x0");
    }
}
