//! Errors surfaced by the payload codec.

use thiserror::Error;

/// Failure modes of [`encode`](super::encode) and [`decode`](super::decode).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    /// The leading format tag named a version this build does not support.
    #[error("unsupported payload version {found}, expected {expected}")]
    UnsupportedVersion {
        /// Version byte found at the head of the buffer.
        found: u8,
        /// Version this build encodes and decodes.
        expected: u8,
    },
    /// Field boundaries are inconsistent with the buffer contents.
    #[error("malformed payload: {0}")]
    Malformed(&'static str),
    /// The trailer checksum does not match the body bytes.
    #[error("payload checksum mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    ChecksumMismatch {
        /// Checksum read from the trailer.
        stored: u32,
        /// Checksum computed over the body.
        computed: u32,
    },
    /// A variable-length field exceeds its wire-format length prefix.
    #[error("{field} exceeds the wire format's length limit")]
    FieldTooLong {
        /// Name of the offending field.
        field: &'static str,
    },
}
