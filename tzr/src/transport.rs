//! Byte-channel seam between a session and the physical device link.
//!
//! A [`Transport`] moves whole frames. Device-specific links (HID report
//! chunking, enumeration) implement it outside this crate; the
//! [`StreamTransport`] here frames over any connected byte stream.

use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
#[cfg(unix)]
use std::os::unix::net::UnixStream;
#[cfg(unix)]
use std::path::Path;
use std::time::Duration;

use tzr_proto::{Frame, FrameReader};

/// A half-duplex frame channel to one device.
pub trait Transport {
    /// Writes one complete frame (header and payload).
    fn write(&mut self, frame: &[u8]) -> io::Result<()>;

    /// Blocks for the next frame.
    ///
    /// `Ok(None)` means the device produced no data.
    fn read(&mut self) -> io::Result<Option<Frame>>;

    /// Bounds how long [`Transport::read`] may block.
    ///
    /// Transports without a notion of time ignore it.
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        let _ = timeout;
        Ok(())
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn write(&mut self, frame: &[u8]) -> io::Result<()> {
        (**self).write(frame)
    }

    fn read(&mut self) -> io::Result<Option<Frame>> {
        (**self).read()
    }

    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        (**self).set_read_timeout(timeout)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write(&mut self, frame: &[u8]) -> io::Result<()> {
        (**self).write(frame)
    }

    fn read(&mut self) -> io::Result<Option<Frame>> {
        (**self).read()
    }

    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        (**self).set_read_timeout(timeout)
    }
}

/// A connected byte stream that supports read timeouts.
pub trait Stream: Read + Write {
    /// Sets the stream's read timeout.
    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()>;
}

impl Stream for TcpStream {
    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        Self::set_read_timeout(self, timeout)
    }
}

#[cfg(unix)]
impl Stream for UnixStream {
    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        Self::set_read_timeout(self, timeout)
    }
}

/// Frames written and read directly on a byte stream.
///
/// A read cut short by the stream's timeout keeps the bytes received so
/// far, so the next [`Transport::read`] picks up the same frame.
#[derive(Debug)]
pub struct StreamTransport<S> {
    /// The underlying connected stream.
    stream: S,
    /// Partial frame left by a timed-out read.
    reader: FrameReader,
}

impl<S: Stream> StreamTransport<S> {
    /// Wraps an already connected stream.
    pub const fn new(stream: S) -> Self {
        Self {
            stream,
            reader: FrameReader::new(),
        }
    }

    /// Returns the underlying stream.
    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl StreamTransport<TcpStream> {
    /// Connects over TCP.
    pub fn connect_tcp(addr: impl ToSocketAddrs) -> io::Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        Ok(Self::new(stream))
    }
}

#[cfg(unix)]
impl StreamTransport<UnixStream> {
    /// Connects to a Unix domain socket.
    pub fn connect_unix(path: impl AsRef<Path>) -> io::Result<Self> {
        UnixStream::connect(path).map(Self::new)
    }
}

impl<S: Stream> Transport for StreamTransport<S> {
    fn write(&mut self, frame: &[u8]) -> io::Result<()> {
        self.stream.write_all(frame)?;
        self.stream.flush()
    }

    fn read(&mut self) -> io::Result<Option<Frame>> {
        self.reader.read_from(&mut self.stream).map_err(|e| match e {
            tzr_proto::Error::Io(err) => err,
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        })
    }

    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        self.stream.set_read_timeout(timeout)
    }
}
