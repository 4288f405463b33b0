//! Blocking client for Trezor-style hardware wallets.
//!
//! `tzr` sends typed requests framed by [`tzr_proto`] over a [`Transport`]
//! and routes each reply to a [`Response`] by its message-type tag.
//!
//! # Quick start — fetch an address
//!
//! ```no_run
//! use tzr::{DerivationPath, Session, SessionConfig, StreamTransport};
//!
//! let transport = StreamTransport::connect_tcp("127.0.0.1:21324")?;
//! let mut session = Session::attach(transport, &SessionConfig::default())?;
//! session.initialize()?;
//!
//! let path: DerivationPath = "m/44'/0'/0'/0/0".parse()?;
//! let mut resp = session.get_address(&path)?;
//! while resp.needs_pin() {
//!     resp = session.pin_matrix_ack("1234")?;
//! }
//! println!("{}", resp.message());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod config;
mod dispatch;
mod error;
mod path;
mod session;
mod transport;

pub use config::SessionConfig;
pub use dispatch::{DecodedResult, LOCAL_ERROR_TAG, PIN_PROMPT, Response, dispatch};
pub use error::{Error, Result};
pub use path::{DerivationPath, HARDENED};
pub use session::Session;
pub use transport::{Stream, StreamTransport, Transport};
pub use tzr_proto::{self as proto, Frame, MessageType};
