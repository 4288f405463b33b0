//! Response routing: inbound frames to typed replies.
//!
//! The frame's tag selects the payload schema. Only the replies a client
//! session acts on are decoded; any other tag is surfaced as
//! [`Response::Unrecognized`] rather than dropped.

use serde::Serialize;
use tracing::warn;
use tzr_proto::{Address, Failure, Frame, MessageType, PinMatrixRequest, Success, TypedMessage};

use crate::{Error, Result};

/// Prompt shown when the device asks for its PIN.
pub const PIN_PROMPT: &str = "Please enter current PIN:";

/// Tag used by [`DecodedResult`] for local failures.
///
/// Only the flattened form uses it; [`Error`] keeps local failures apart
/// from device tags.
pub const LOCAL_ERROR_TAG: u16 = 999;

/// A decoded device reply.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum Response {
    /// The command succeeded.
    Success(Success),
    /// The device refused or failed the command.
    Failure(Failure),
    /// The device wants a PIN before continuing; answer with
    /// [`Session::pin_matrix_ack`](crate::Session::pin_matrix_ack).
    PinMatrixRequest(PinMatrixRequest),
    /// A derived address.
    Address(Address),
    /// A reply whose tag this client does not decode.
    Unrecognized(Frame),
    /// A known tag whose payload failed to decode.
    Malformed {
        /// The reply category that arrived.
        ty: MessageType,
        /// Why the payload was rejected.
        error: prost::DecodeError,
    },
}

impl Response {
    /// Wire tag of the reply.
    pub const fn tag(&self) -> u16 {
        match self {
            Self::Success(_) => MessageType::Success.tag(),
            Self::Failure(_) => MessageType::Failure.tag(),
            Self::PinMatrixRequest(_) => MessageType::PinMatrixRequest.tag(),
            Self::Address(_) => MessageType::Address.tag(),
            Self::Unrecognized(frame) => frame.tag,
            Self::Malformed { ty, .. } => ty.tag(),
        }
    }

    /// Human-readable summary of the reply.
    pub fn message(&self) -> String {
        match self {
            Self::Success(m) => m.message.clone().unwrap_or_default(),
            Self::Failure(m) => m.message.clone().unwrap_or_default(),
            Self::PinMatrixRequest(_) => PIN_PROMPT.to_owned(),
            Self::Address(m) => m.address.clone(),
            Self::Unrecognized(frame) => format!("Uncaught message type {}", frame.tag),
            Self::Malformed { ty, .. } => format!("Error unmarshalling ({})", ty.tag()),
        }
    }

    /// Whether the caller must send a PIN before the command can finish.
    pub const fn needs_pin(&self) -> bool {
        matches!(self, Self::PinMatrixRequest(_))
    }
}

/// Decodes an inbound frame according to its tag.
pub fn dispatch(frame: Frame) -> Response {
    match MessageType::from_tag(frame.tag) {
        Some(MessageType::Success) => decode(&frame, Response::Success),
        Some(MessageType::Failure) => decode(&frame, Response::Failure),
        Some(MessageType::PinMatrixRequest) => decode(&frame, Response::PinMatrixRequest),
        Some(MessageType::Address) => decode(&frame, Response::Address),
        _ => {
            warn!(tag = frame.tag, len = frame.payload.len(), "unhandled message type");
            Response::Unrecognized(frame)
        }
    }
}

/// Decodes the payload as `M`, or reports it malformed under `M`'s tag.
fn decode<M: TypedMessage>(frame: &Frame, wrap: impl FnOnce(M) -> Response) -> Response {
    match M::decode(frame.payload.as_slice()) {
        Ok(msg) => wrap(msg),
        Err(error) => {
            let ty = M::TYPE;
            warn!(%ty, %error, "malformed payload");
            Response::Malformed { ty, error }
        }
    }
}

/// A reply flattened to a message and a tag, for display layers.
///
/// Local failures map to [`LOCAL_ERROR_TAG`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub struct DecodedResult {
    /// Human-readable summary.
    pub message: String,
    /// Device tag, or [`LOCAL_ERROR_TAG`].
    pub tag: u16,
}

impl DecodedResult {
    /// Creates a result from its parts.
    pub fn new(message: impl Into<String>, tag: u16) -> Self {
        Self {
            message: message.into(),
            tag,
        }
    }
}

impl From<&Response> for DecodedResult {
    fn from(resp: &Response) -> Self {
        Self::new(resp.message(), resp.tag())
    }
}

impl From<&Result<Response>> for DecodedResult {
    fn from(result: &Result<Response>) -> Self {
        let message = match result {
            Ok(resp) => return resp.into(),
            Err(Error::Marshal(_)) => "ERROR Marshalling".to_owned(),
            Err(Error::Read(_)) => "Error reading".to_owned(),
            Err(Error::NoData) => String::new(),
            Err(e @ (Error::Write(_) | Error::Attach(_) | Error::InvalidPath(_))) => e.to_string(),
        };
        Self::new(message, LOCAL_ERROR_TAG)
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use prost::Message;

    use super::*;

    fn reply(ty: MessageType, payload: Vec<u8>) -> DecodedResult {
        (&dispatch(Frame::new(ty, payload))).into()
    }

    #[test]
    fn success_message() {
        let payload = Success {
            message: Some("ok".into()),
        }
        .encode_to_vec();
        assert_eq!(reply(MessageType::Success, payload), DecodedResult::new("ok", 2));
    }

    #[test]
    fn failure_message() {
        let payload = Failure {
            code: Some(4),
            message: Some("denied".into()),
        }
        .encode_to_vec();
        assert_eq!(
            reply(MessageType::Failure, payload),
            DecodedResult::new("denied", 3)
        );
    }

    #[test]
    fn pin_request_prompts() {
        let resp = dispatch(Frame::new(MessageType::PinMatrixRequest, Vec::new()));
        assert!(resp.needs_pin());
        assert_eq!(
            DecodedResult::from(&resp),
            DecodedResult::new("Please enter current PIN:", 18)
        );

        let payload = PinMatrixRequest { r#type: Some(1) }.encode_to_vec();
        assert_eq!(
            reply(MessageType::PinMatrixRequest, payload),
            DecodedResult::new(PIN_PROMPT, 18)
        );
    }

    #[test]
    fn address_message() {
        let payload = Address {
            address: "1A2b...".into(),
        }
        .encode_to_vec();
        assert_eq!(
            reply(MessageType::Address, payload),
            DecodedResult::new("1A2b...", 30)
        );
    }

    #[test]
    fn unknown_tag_is_surfaced() {
        let resp = dispatch(Frame::new(99u16, vec![1, 2, 3]));
        assert!(!resp.needs_pin());
        assert_eq!(
            DecodedResult::from(&resp),
            DecodedResult::new("Uncaught message type 99", 99)
        );
        match resp {
            Response::Unrecognized(frame) => assert_eq!(frame.payload, [1, 2, 3]),
            other => panic!("expected Unrecognized, got {other:?}"),
        }
    }

    #[test]
    fn known_but_undecoded_tag_is_surfaced() {
        let resp = dispatch(Frame::new(MessageType::Features, Vec::new()));
        assert_eq!(resp.message(), "Uncaught message type 17");
        assert_eq!(resp.tag(), 17);
    }

    #[test]
    fn malformed_payload_keeps_real_tag() {
        // Length-delimited field claiming 5 bytes, only 1 present.
        let garbage = vec![0x0a, 0x05, b'h'];
        for (ty, tag) in [
            (MessageType::Success, 2),
            (MessageType::Failure, 3),
            (MessageType::PinMatrixRequest, 18),
            (MessageType::Address, 30),
        ] {
            let resp = dispatch(Frame::new(ty, garbage.clone()));
            assert!(matches!(resp, Response::Malformed { .. }));
            assert_eq!(
                DecodedResult::from(&resp),
                DecodedResult::new(format!("Error unmarshalling ({tag})"), tag)
            );
        }
    }

    #[test]
    fn local_failures_flatten_to_reserved_tag() {
        let read: Result<Response> = Err(Error::Read(io::Error::other("unplugged")));
        assert_eq!(
            DecodedResult::from(&read),
            DecodedResult::new("Error reading", LOCAL_ERROR_TAG)
        );

        let empty: Result<Response> = Err(Error::NoData);
        assert_eq!(DecodedResult::from(&empty), DecodedResult::new("", 999));

        let marshal: Result<Response> = Err(Error::Marshal(tzr_proto::Error::TooLarge(usize::MAX)));
        assert_eq!(
            DecodedResult::from(&marshal),
            DecodedResult::new("ERROR Marshalling", 999)
        );
    }
}
