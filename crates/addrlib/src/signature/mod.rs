//! Wildcard byte signatures
//!
//! A signature is written as space-separated tokens, each either a two-digit
//! hex byte or `?` for a single-byte wildcard: `40 53 ? 83`.

mod list;
mod scanner;

pub use list::{
    SignatureEntry, UNAVAILABLE_SIGNATURE, format_generation_list, load_signature_list,
    parse_signature_list, verify_signatures,
};

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Parsed signature: `Some(byte)` must match exactly, `None` matches anything
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SignaturePattern {
    bytes: Vec<Option<u8>>,
}

impl SignaturePattern {
    pub fn parse(pattern: &str) -> Result<Self> {
        let bytes = pattern
            .split(' ')
            .filter(|token| !token.is_empty())
            .map(parse_token)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { bytes })
    }

    pub fn from_bytes(bytes: Vec<Option<u8>>) -> Self {
        Self { bytes }
    }

    pub fn bytes(&self) -> &[Option<u8>] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

fn parse_token(token: &str) -> Result<Option<u8>> {
    if token == "?" {
        return Ok(None);
    }

    if token.len() != 2 || !token.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::PatternFormat(format!(
            "Invalid signature token '{}'",
            token
        )));
    }

    u8::from_str_radix(token, 16)
        .map(Some)
        .map_err(|e| Error::PatternFormat(format!("Invalid signature token '{}': {}", token, e)))
}

impl FromStr for SignaturePattern {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for SignaturePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatted = self
            .bytes
            .iter()
            .map(|b| match b {
                Some(value) => format!("{:02X}", value),
                None => "?".to_string(),
            })
            .collect::<Vec<_>>()
            .join(" ");
        f.write_str(&formatted)
    }
}
