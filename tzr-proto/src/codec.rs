//! Type-tagged frame codec.
//!
//! Each frame is: `[b"##"][u16 BE type tag][u32 BE length][protobuf payload]`.

use std::io::{self, Read};

use crate::{Error, Result, TypedMessage};

/// Two bytes opening every frame.
pub const MAGIC: [u8; 2] = *b"##";

/// Magic, tag, and length.
pub const HEADER_LEN: usize = 8;

/// Maximum payload accepted from a stream (16 MiB).
pub const MAX_FRAME: u32 = 16 * 1024 * 1024;

/// One decoded frame: a type tag and its raw payload.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct Frame {
    /// Wire tag selecting the payload schema.
    pub tag: u16,
    /// Serialized message bytes.
    pub payload: Vec<u8>,
}

impl Frame {
    /// Creates a frame from a tag and payload.
    pub fn new(tag: impl Into<u16>, payload: Vec<u8>) -> Self {
        Self {
            tag: tag.into(),
            payload,
        }
    }

    /// Serializes `msg` into a frame under its own tag.
    pub fn from_message<M: TypedMessage>(msg: &M) -> Self {
        Self::new(M::TYPE, msg.encode_to_vec())
    }

    /// Encodes the frame to wire bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        encode_frame(self.tag, &self.payload)
    }
}

/// Builds the 8-byte header for a payload of `len` bytes.
pub fn header(tag: u16, len: u32) -> [u8; HEADER_LEN] {
    let mut out = [0u8; HEADER_LEN];
    out[..2].copy_from_slice(&MAGIC);
    out[2..4].copy_from_slice(&tag.to_be_bytes());
    out[4..].copy_from_slice(&len.to_be_bytes());
    out
}

/// Frames an already serialized payload.
///
/// The length field is always derived from `payload`.
pub fn encode_frame(tag: u16, payload: &[u8]) -> Result<Vec<u8>> {
    let len = u32::try_from(payload.len()).map_err(|_| Error::TooLarge(payload.len()))?;
    let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
    out.extend_from_slice(&header(tag, len));
    out.extend_from_slice(payload);
    Ok(out)
}

/// Serializes `msg` and frames it under its own tag.
///
/// Fails without producing partial output.
pub fn encode<M: TypedMessage>(msg: &M) -> Result<Vec<u8>> {
    let size = msg.encoded_len();
    let len = u32::try_from(size).map_err(|_| Error::TooLarge(size))?;
    let mut out = Vec::with_capacity(HEADER_LEN + size);
    out.extend_from_slice(&header(M::TYPE.tag(), len));
    msg.encode(&mut out)?;
    Ok(out)
}

/// Parses a complete frame from `bytes`.
pub fn decode_frame(bytes: &[u8]) -> Result<Frame> {
    let (head, payload) = bytes
        .split_first_chunk::<HEADER_LEN>()
        .ok_or(Error::ShortHeader(bytes.len()))?;
    let (tag, declared) = parse_header(head)?;
    if payload.len() != declared as usize {
        return Err(Error::LengthMismatch {
            declared,
            actual: payload.len(),
        });
    }
    Ok(Frame::new(tag, payload.to_vec()))
}

/// Reads one frame from `r`.
///
/// Returns `Ok(None)` on a clean end of stream before the first header
/// byte; an end of stream anywhere later is an error. Bytes already
/// consumed are lost if `r` fails midway; use [`FrameReader`] on streams
/// with a read timeout.
pub fn read_frame<R: Read>(r: &mut R) -> Result<Option<Frame>> {
    FrameReader::new().read_from(r)
}

/// Incremental frame reader that survives interrupted reads.
///
/// Bytes of a frame received before a read error (typically a timeout)
/// stay buffered, and the next [`FrameReader::read_from`] resumes where
/// the previous one stopped.
#[derive(Debug, Default)]
pub struct FrameReader {
    /// Header and payload bytes of the frame in progress.
    buf: Vec<u8>,
}

impl FrameReader {
    /// Creates a reader with nothing buffered.
    pub const fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Number of bytes held from a partially received frame.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Reads the rest of the current frame from `r`.
    ///
    /// On an I/O error the partial frame is kept for the next call. A bad
    /// header discards it.
    pub fn read_from<R: Read>(&mut self, r: &mut R) -> Result<Option<Frame>> {
        if !self.fill(r, HEADER_LEN)? {
            return Ok(None);
        }
        let mut head = [0u8; HEADER_LEN];
        head.copy_from_slice(&self.buf[..HEADER_LEN]);
        let (tag, len) = match parse_header(&head) {
            Ok((_, len)) if len > MAX_FRAME => Err(Error::TooLarge(len as usize)),
            other => other,
        }
        .inspect_err(|_| self.buf.clear())?;

        self.fill(r, HEADER_LEN + len as usize)?;
        let payload = self.buf.split_off(HEADER_LEN);
        self.buf.clear();
        Ok(Some(Frame::new(tag, payload)))
    }

    /// Reads until `upto` bytes are buffered.
    ///
    /// Returns `false` on a clean end of stream with nothing buffered.
    fn fill<R: Read>(&mut self, r: &mut R, upto: usize) -> Result<bool> {
        let mut chunk = [0u8; 4096];
        while self.buf.len() < upto {
            let want = (upto - self.buf.len()).min(chunk.len());
            match r.read(&mut chunk[..want]) {
                Ok(0) if self.buf.is_empty() => return Ok(false),
                Ok(0) => return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into()),
                Ok(n) => self.buf.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(true)
    }
}

/// Checks the magic and splits out tag and length.
fn parse_header(head: &[u8; HEADER_LEN]) -> Result<(u16, u32)> {
    let [m0, m1, t0, t1, l0, l1, l2, l3] = *head;
    if [m0, m1] != MAGIC {
        return Err(Error::BadMagic([m0, m1]));
    }
    Ok((u16::from_be_bytes([t0, t1]), u32::from_be_bytes([l0, l1, l2, l3])))
}
