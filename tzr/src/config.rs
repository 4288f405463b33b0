//! Session configuration and JSON loading.

use std::path::Path;
use std::time::Duration;
use std::{fs, io};

use serde::{Deserialize, Serialize};

/// Tunables applied to the transport when a session attaches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
#[non_exhaustive]
pub struct SessionConfig {
    /// How long a read may block, in milliseconds. `None` or `0` blocks
    /// until the device answers.
    pub read_timeout_ms: Option<u64>,
}

impl SessionConfig {
    /// Loads configuration from a JSON file.
    pub fn load(path: &Path) -> io::Result<Self> {
        let data = fs::read_to_string(path)?;
        serde_json::from_str(&data).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Replaces the read timeout.
    #[must_use]
    pub const fn with_read_timeout_ms(mut self, ms: Option<u64>) -> Self {
        self.read_timeout_ms = ms;
        self
    }

    /// Effective read timeout.
    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_ms
            .filter(|&ms| ms > 0)
            .map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn default_blocks() {
        assert_eq!(SessionConfig::default().read_timeout(), None);
        assert_eq!(
            SessionConfig::default()
                .with_read_timeout_ms(Some(0))
                .read_timeout(),
            None
        );
    }

    #[test]
    fn load_from_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{ "read_timeout_ms": 2500 }"#).unwrap();

        let cfg = SessionConfig::load(file.path()).unwrap();
        assert_eq!(cfg.read_timeout(), Some(Duration::from_millis(2500)));
    }

    #[test]
    fn empty_object_is_default() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{}").unwrap();
        assert_eq!(
            SessionConfig::load(file.path()).unwrap(),
            SessionConfig::default()
        );
    }

    #[test]
    fn rejects_unknown_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{ "timeout": 5 }"#).unwrap();
        let err = SessionConfig::load(file.path()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
