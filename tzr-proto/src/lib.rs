//! Wire protocol for Trezor-style hardware wallets.
//!
//! Messages are protobuf payloads framed with the `##` magic, a 2-byte
//! big-endian type tag, and a 4-byte big-endian payload length. The tag
//! selects the payload schema; see [`MessageType`].

mod codec;
mod error;
mod message;

pub use codec::{
    Frame, FrameReader, HEADER_LEN, MAGIC, MAX_FRAME, decode_frame, encode, encode_frame, header,
    read_frame,
};
pub use error::{Error, Result};
pub use message::{
    Address, BITCOIN, Failure, GetAddress, Initialize, MessageType, Ping, PinMatrixAck,
    PinMatrixRequest, Success, TypedMessage,
};
