//! Client session: one request/reply round trip per command.
//!
//! A session owns its transport exclusively and keeps no protocol state
//! between calls. The PIN sub-protocol is driven by the caller: when a
//! command returns [`Response::PinMatrixRequest`], answer it with
//! [`Session::pin_matrix_ack`], whose reply completes the original command.

use tracing::debug;
use tzr_proto::{GetAddress, HEADER_LEN, Initialize, Ping, PinMatrixAck, TypedMessage};

use crate::dispatch::{Response, dispatch};
use crate::{DerivationPath, Error, Result, SessionConfig, Transport};

/// A client session over one device transport.
#[derive(Debug)]
pub struct Session<T> {
    /// The attached device link.
    transport: T,
}

impl<T: Transport> Session<T> {
    /// Attaches to a transport, applying `config` to it.
    pub fn attach(mut transport: T, config: &SessionConfig) -> Result<Self> {
        transport
            .set_read_timeout(config.read_timeout())
            .map_err(Error::Attach)?;
        Ok(Self { transport })
    }

    /// Detaches and returns the transport. Dropping it closes the link.
    pub fn detach(self) -> T {
        self.transport
    }

    /// Resets the device session and asks it to identify itself.
    pub fn initialize(&mut self) -> Result<Response> {
        self.call(&Initialize::default())
    }

    /// Asks the device to echo `text`, with every confirmation gate off.
    pub fn ping(&mut self, text: &str) -> Result<Response> {
        self.call(&Ping::new(text))
    }

    /// Answers a pending PIN matrix request.
    pub fn pin_matrix_ack(&mut self, pin: &str) -> Result<Response> {
        self.call(&PinMatrixAck::new(pin))
    }

    /// Requests the Bitcoin address at `path`, confirmed on the device screen.
    pub fn get_address(&mut self, path: &DerivationPath) -> Result<Response> {
        self.call(&GetAddress::bitcoin(path.as_slice().to_vec()))
    }

    /// Sends any typed request and waits for its reply.
    ///
    /// Nothing is written if `msg` fails to serialize.
    pub fn call<M: TypedMessage>(&mut self, msg: &M) -> Result<Response> {
        let frame = tzr_proto::encode(msg).map_err(Error::Marshal)?;
        let ty = M::TYPE;
        debug!(%ty, len = frame.len() - HEADER_LEN, "sending frame");
        self.transport.write(&frame).map_err(Error::Write)?;
        self.read()
    }

    /// Waits for the next reply and decodes it.
    pub fn read(&mut self) -> Result<Response> {
        let frame = self
            .transport
            .read()
            .map_err(Error::Read)?
            .ok_or(Error::NoData)?;
        debug!(tag = frame.tag, len = frame.payload.len(), "received frame");
        Ok(dispatch(frame))
    }
}
