//! BIP-32 derivation path parsing.
//!
//! Handles the usual textual forms:
//! - `m/44'/0'/0'/0/0` → hardened components carry the top bit
//! - `m/44h/0h` → `h` (or `H`) is accepted in place of `'`
//! - `m` → the empty (root) path

use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Bit marking a hardened path component.
pub const HARDENED: u32 = 0x8000_0000;

/// A parsed derivation path, as sent in `GetAddress.address_n`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DerivationPath(Vec<u32>);

impl DerivationPath {
    /// Parses a derivation path string.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let rest = match trimmed {
            "m" | "M" => return Ok(Self::default()),
            _ => trimmed
                .strip_prefix("m/")
                .or_else(|| trimmed.strip_prefix("M/"))
                .unwrap_or(trimmed),
        };
        if rest.is_empty() {
            return Err(Error::InvalidPath("empty path".into()));
        }
        rest.split('/').map(component).collect::<Result<_>>().map(Self)
    }

    /// Path components.
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    /// Consumes the path into its components.
    pub fn into_vec(self) -> Vec<u32> {
        self.0
    }
}

/// Parses one `/`-separated component.
fn component(raw: &str) -> Result<u32> {
    let (digits, hardened) = match raw.strip_suffix(['\'', 'h', 'H']) {
        Some(d) => (d, true),
        None => (raw, false),
    };
    let index: u32 = digits
        .parse()
        .map_err(|_| Error::InvalidPath(format!("bad component: {raw:?}")))?;
    if index >= HARDENED {
        return Err(Error::InvalidPath(format!("index out of range: {raw}")));
    }
    Ok(if hardened { index | HARDENED } else { index })
}

impl From<Vec<u32>> for DerivationPath {
    fn from(components: Vec<u32>) -> Self {
        Self(components)
    }
}

impl FromStr for DerivationPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for &c in &self.0 {
            if c & HARDENED == 0 {
                write!(f, "/{c}")?;
            } else {
                write!(f, "/{}'", c & !HARDENED)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bip44() {
        let p = DerivationPath::parse("m/44'/0'/0'/0/0").unwrap();
        assert_eq!(
            p.as_slice(),
            &[44 | HARDENED, HARDENED, HARDENED, 0, 0]
        );
    }

    #[test]
    fn parse_h_suffix_and_no_prefix() {
        let p = DerivationPath::parse("49h/0H/1").unwrap();
        assert_eq!(p.into_vec(), vec![49 | HARDENED, HARDENED, 1]);
    }

    #[test]
    fn parse_root() {
        assert!(DerivationPath::parse("m").unwrap().as_slice().is_empty());
    }

    #[test]
    fn rejects_garbage() {
        assert!(DerivationPath::parse("").is_err());
        assert!(DerivationPath::parse("m/").is_err());
        assert!(DerivationPath::parse("m/44'/x").is_err());
        assert!(DerivationPath::parse("m/2147483648").is_err());
        assert!(DerivationPath::parse("m//0").is_err());
    }

    #[test]
    fn display_roundtrip() {
        let p: DerivationPath = "m/84'/0'/0'/1/7".parse().unwrap();
        assert_eq!(p.to_string(), "m/84'/0'/0'/1/7");
        assert_eq!(DerivationPath::default().to_string(), "m");
    }
}
