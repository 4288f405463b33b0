//! Device endpoints and session setup.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use tzr::{Session, SessionConfig, StreamTransport, Transport};

/// Where the device link is reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// `tcp:HOST:PORT`
    Tcp(String),
    /// `unix:PATH`
    Unix(PathBuf),
}

impl FromStr for Endpoint {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.split_once(':') {
            Some(("tcp", addr)) if addr.contains(':') => Ok(Self::Tcp(addr.to_owned())),
            Some(("unix", path)) if !path.is_empty() => Ok(Self::Unix(PathBuf::from(path))),
            _ => Err(format!(
                "invalid endpoint {s:?} (expected tcp:HOST:PORT or unix:PATH)"
            )),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp(addr) => write!(f, "tcp:{addr}"),
            Self::Unix(path) => write!(f, "unix:{}", path.display()),
        }
    }
}

impl Endpoint {
    /// Connects and attaches a session.
    pub fn open(&self, config: &SessionConfig) -> Result<Session<Box<dyn Transport>>> {
        let transport: Box<dyn Transport> = match self {
            Self::Tcp(addr) => Box::new(StreamTransport::connect_tcp(addr.as_str())?),
            Self::Unix(path) => unix(path)?,
        };
        Session::attach(transport, config).with_context(|| format!("attach to {self}"))
    }
}

#[cfg(unix)]
fn unix(path: &Path) -> Result<Box<dyn Transport>> {
    Ok(Box::new(StreamTransport::connect_unix(path)?))
}

#[cfg(not(unix))]
fn unix(_path: &Path) -> Result<Box<dyn Transport>> {
    anyhow::bail!("Unix sockets are not supported on this platform")
}

/// Resolves session configuration from an optional file and a flag override.
pub fn config(file: Option<&Path>, timeout_ms: Option<u64>) -> Result<SessionConfig> {
    let base = match file {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => SessionConfig::default(),
    };
    Ok(match timeout_ms {
        Some(ms) => base.with_read_timeout_ms(Some(ms)),
        None => base,
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn parse_endpoints() {
        assert_eq!(
            "tcp:127.0.0.1:9000".parse::<Endpoint>().unwrap(),
            Endpoint::Tcp("127.0.0.1:9000".into())
        );
        assert_eq!(
            "unix:/run/wallet.sock".parse::<Endpoint>().unwrap(),
            Endpoint::Unix("/run/wallet.sock".into())
        );
        assert!("tcp:localhost".parse::<Endpoint>().is_err());
        assert!("unix:".parse::<Endpoint>().is_err());
        assert!("usb:0".parse::<Endpoint>().is_err());
    }

    #[test]
    fn display_roundtrip() {
        for s in ["tcp:[::1]:21325", "unix:/tmp/dev.sock"] {
            assert_eq!(s.parse::<Endpoint>().unwrap().to_string(), s);
        }
    }

    #[test]
    fn flag_overrides_default() {
        let cfg = config(None, Some(250)).unwrap();
        assert_eq!(cfg.read_timeout(), Some(Duration::from_millis(250)));
        assert_eq!(config(None, None).unwrap(), SessionConfig::default());
    }
}
