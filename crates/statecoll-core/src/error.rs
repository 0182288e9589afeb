//! Error types for statecoll encoders.

use thiserror::Error;

/// Errors produced while encoding or decoding keys and values.
///
/// Decode errors on bytes read back from a store indicate corruption: the
/// store only ever contains bytes written by the matching encoder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("{encoder}: need {expected} bytes, got {actual}")]
    Truncated {
        encoder: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{encoder}: invalid utf-8 at byte {valid_up_to}")]
    InvalidUtf8 {
        encoder: &'static str,
        valid_up_to: usize,
    },

    #[error("{encoder}: missing key terminator")]
    Unterminated { encoder: &'static str },

    #[error("{encoder}: invalid escape byte {byte:#04x} at offset {offset}")]
    InvalidEscape {
        encoder: &'static str,
        byte: u8,
        offset: usize,
    },

    #[error("{encoder}: expected exactly {expected} bytes, got {actual}")]
    LengthMismatch {
        encoder: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{encoder}: {extra} bytes left after the value")]
    TrailingBytes { encoder: &'static str, extra: usize },

    #[error("cbor error: {0}")]
    Cbor(String),
}

/// Result type for encoder operations.
pub type Result<T> = std::result::Result<T, EncodingError>;
