//! Error types for session operations.

use std::io;

/// Alias for `Result<T, tzr::Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Local failures of a session round trip.
///
/// Device replies, including `Failure` messages, are never errors; they
/// arrive as a [`Response`](crate::Response).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The request could not be serialized; nothing was written.
    #[error("failed to marshal request: {0}")]
    Marshal(#[source] tzr_proto::Error),

    /// The transport rejected the outbound frame.
    #[error("failed to write frame: {0}")]
    Write(#[source] io::Error),

    /// The transport failed while waiting for a reply.
    #[error("failed to read frame: {0}")]
    Read(#[source] io::Error),

    /// The transport returned without any frame.
    #[error("device returned no data")]
    NoData,

    /// The transport could not be configured on attach.
    #[error("failed to configure transport: {0}")]
    Attach(#[source] io::Error),

    /// A derivation path string could not be parsed.
    #[error("invalid derivation path: {0}")]
    InvalidPath(String),
}
