//! Error types for frame encoding and decoding.

use std::io;

/// Alias for `Result<T, tzr_proto::Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while building or parsing frames.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The message could not be serialized.
    #[error("failed to encode message: {0}")]
    Encode(#[from] prost::EncodeError),

    /// The payload does not fit the header's length field or the frame limit.
    #[error("payload of {0} bytes exceeds the frame limit")]
    TooLarge(usize),

    /// The frame does not start with the protocol magic.
    #[error("bad frame magic {0:02x?}")]
    BadMagic([u8; 2]),

    /// Fewer bytes than a frame header.
    #[error("frame header needs 8 bytes, got {0}")]
    ShortHeader(usize),

    /// The declared payload length disagrees with the bytes present.
    #[error("frame declares {declared} payload bytes but carries {actual}")]
    LengthMismatch {
        /// Length from the header.
        declared: u32,
        /// Bytes actually following the header.
        actual: usize,
    },

    /// An I/O error from the underlying stream.
    #[error(transparent)]
    Io(#[from] io::Error),
}
