//! Message-type table and protobuf schemas for the device protocol.
//!
//! Only the messages the client speaks are modelled here. Field numbers
//! follow the device's `messages.proto`, so payloads interoperate with
//! real firmware.

use std::fmt;

/// Coin name used by [`GetAddress::bitcoin`].
pub const BITCOIN: &str = "Bitcoin";

/// Numeric discriminator selecting a message's schema.
///
/// Inbound and outbound messages share one namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
#[non_exhaustive]
pub enum MessageType {
    /// Session reset / device identification request.
    Initialize = 0,
    /// Echo request.
    Ping = 1,
    /// Generic success reply.
    Success = 2,
    /// Generic failure reply.
    Failure = 3,
    /// Device description, the usual reply to [`MessageType::Initialize`].
    Features = 17,
    /// Device asks the host for the scrambled PIN.
    PinMatrixRequest = 18,
    /// Host answers a PIN matrix request.
    PinMatrixAck = 19,
    /// Address derivation request.
    GetAddress = 29,
    /// Address reply.
    Address = 30,
}

impl MessageType {
    /// Looks up a known message type by its wire tag.
    pub const fn from_tag(tag: u16) -> Option<Self> {
        Some(match tag {
            0 => Self::Initialize,
            1 => Self::Ping,
            2 => Self::Success,
            3 => Self::Failure,
            17 => Self::Features,
            18 => Self::PinMatrixRequest,
            19 => Self::PinMatrixAck,
            29 => Self::GetAddress,
            30 => Self::Address,
            _ => return None,
        })
    }

    /// Returns the wire tag.
    pub const fn tag(self) -> u16 {
        self as u16
    }

    /// Returns the protocol name of the message.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Initialize => "Initialize",
            Self::Ping => "Ping",
            Self::Success => "Success",
            Self::Failure => "Failure",
            Self::Features => "Features",
            Self::PinMatrixRequest => "PinMatrixRequest",
            Self::PinMatrixAck => "PinMatrixAck",
            Self::GetAddress => "GetAddress",
            Self::Address => "Address",
        }
    }
}

impl From<MessageType> for u16 {
    fn from(ty: MessageType) -> Self {
        ty.tag()
    }
}

impl TryFrom<u16> for MessageType {
    type Error = u16;

    fn try_from(tag: u16) -> Result<Self, Self::Error> {
        Self::from_tag(tag).ok_or(tag)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A protobuf schema bound to exactly one [`MessageType`].
pub trait TypedMessage: prost::Message + Default {
    /// Wire tag this schema is framed under.
    const TYPE: MessageType;
}

/// Binds each schema to the message type of the same name.
macro_rules! typed {
    ($($ty:ident),* $(,)?) => {
        $(impl TypedMessage for $ty {
            const TYPE: MessageType = MessageType::$ty;
        })*
    };
}

typed!(
    Initialize,
    Ping,
    Success,
    Failure,
    PinMatrixRequest,
    PinMatrixAck,
    GetAddress,
    Address,
);

/// Resets the device session.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Initialize {
    /// Session to resume, if any.
    #[prost(bytes = "vec", optional, tag = "1")]
    pub session_id: Option<Vec<u8>>,
}

/// Asks the device to echo a message back in a [`Success`].
#[derive(Clone, PartialEq, prost::Message)]
pub struct Ping {
    /// Text to echo.
    #[prost(string, optional, tag = "1")]
    pub message: Option<String>,
    /// Require a button press before answering.
    #[prost(bool, optional, tag = "2")]
    pub button_protection: Option<bool>,
    /// Require PIN entry before answering.
    #[prost(bool, optional, tag = "3")]
    pub pin_protection: Option<bool>,
    /// Require passphrase entry before answering.
    #[prost(bool, optional, tag = "4")]
    pub passphrase_protection: Option<bool>,
}

impl Ping {
    /// Builds an ungated ping: every protection flag is explicitly `false`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            button_protection: Some(false),
            pin_protection: Some(false),
            passphrase_protection: Some(false),
        }
    }
}

/// Generic success reply.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Success {
    /// Human-readable detail.
    #[prost(string, optional, tag = "1")]
    pub message: Option<String>,
}

/// Generic failure reply.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Failure {
    /// Firmware failure code.
    #[prost(int32, optional, tag = "1")]
    pub code: Option<i32>,
    /// Human-readable reason.
    #[prost(string, optional, tag = "2")]
    pub message: Option<String>,
}

/// Device asks for the PIN, shown as a scrambled matrix on its screen.
#[derive(Clone, PartialEq, prost::Message)]
pub struct PinMatrixRequest {
    /// Which PIN is requested (current, new, or confirmation).
    #[prost(int32, optional, tag = "1")]
    pub r#type: Option<i32>,
}

/// Host reply carrying the PIN as matrix positions.
#[derive(Clone, PartialEq, prost::Message)]
pub struct PinMatrixAck {
    /// Matrix positions typed by the user.
    #[prost(string, required, tag = "1")]
    pub pin: String,
}

impl PinMatrixAck {
    /// Builds the acknowledgement for a pending PIN matrix request.
    pub fn new(pin: impl Into<String>) -> Self {
        Self { pin: pin.into() }
    }
}

/// Requests the address at a derivation path.
#[derive(Clone, PartialEq, prost::Message)]
pub struct GetAddress {
    /// BIP-32 path components (hardened ones have the top bit set).
    #[prost(uint32, repeated, packed = "false", tag = "1")]
    pub address_n: Vec<u32>,
    /// Coin whose address format to use.
    #[prost(string, optional, tag = "2")]
    pub coin_name: Option<String>,
    /// Show the address on the device screen for confirmation.
    #[prost(bool, optional, tag = "3")]
    pub show_display: Option<bool>,
}

impl GetAddress {
    /// Builds a fully specified address request.
    pub fn new(coin: impl Into<String>, address_n: Vec<u32>, show_display: bool) -> Self {
        Self {
            address_n,
            coin_name: Some(coin.into()),
            show_display: Some(show_display),
        }
    }

    /// Builds a Bitcoin address request that is confirmed on screen.
    pub fn bitcoin(address_n: Vec<u32>) -> Self {
        Self::new(BITCOIN, address_n, true)
    }
}

/// Address reply.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Address {
    /// Encoded address string.
    #[prost(string, required, tag = "1")]
    pub address: String,
}

#[cfg(test)]
mod tests {
    use prost::Message;

    use super::*;

    #[test]
    fn tag_table_is_closed() {
        for tag in 0..=u16::MAX {
            if let Some(ty) = MessageType::from_tag(tag) {
                assert_eq!(ty.tag(), tag);
            }
        }
        assert_eq!(MessageType::from_tag(99), None);
        assert_eq!(MessageType::try_from(18u16), Ok(MessageType::PinMatrixRequest));
        assert_eq!(MessageType::try_from(999u16), Err(999));
    }

    #[test]
    fn schemas_bind_their_tags() {
        assert_eq!(Initialize::TYPE.tag(), 0);
        assert_eq!(Ping::TYPE.tag(), 1);
        assert_eq!(PinMatrixAck::TYPE.tag(), 19);
        assert_eq!(GetAddress::TYPE.tag(), 29);
        assert_eq!(Address::TYPE.to_string(), "Address");
    }

    #[test]
    fn ping_sends_explicit_false_flags() {
        let bytes = Ping::new("hi").encode_to_vec();
        assert_eq!(
            bytes,
            [0x0a, 0x02, b'h', b'i', 0x10, 0x00, 0x18, 0x00, 0x20, 0x00]
        );
    }

    #[test]
    fn bitcoin_address_request() {
        let req = GetAddress::bitcoin(vec![0x8000_002c, 0]);
        assert_eq!(req.coin_name.as_deref(), Some("Bitcoin"));
        assert_eq!(req.show_display, Some(true));

        let decoded = GetAddress::decode(req.encode_to_vec().as_slice()).unwrap();
        assert_eq!(decoded.address_n, vec![0x8000_002c, 0]);
    }

    #[test]
    fn failure_decodes_code_and_message() {
        let bytes = Failure {
            code: Some(7),
            message: Some("PIN invalid".into()),
        }
        .encode_to_vec();
        let msg = Failure::decode(bytes.as_slice()).unwrap();
        assert_eq!(msg.code, Some(7));
        assert_eq!(msg.message.as_deref(), Some("PIN invalid"));
    }
}
