//! Generated signature lists
//!
//! An external signature generator is fed one `0x{ADDR}` line per address and
//! answers with lines such as:
//!
//! ```text
//! 0xF7210: Unable to find a valid signature for given length
//! 0xF9E90: 40 57 41 54 41
//! 0xFCFE0: 40 53 48 83 EC 20 83 3D ? ? ? ? ? 74
//! ```

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use super::SignaturePattern;
use crate::error::{Error, Result};

/// Generator output for addresses it could not sign
pub const UNAVAILABLE_SIGNATURE: &str = "Unable to find a valid signature for given length";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureEntry {
    pub address: u64,
    /// Signature text as written by the generator
    pub signature: String,
}

pub fn load_signature_list<P: AsRef<Path>>(path: P) -> Result<Vec<SignatureEntry>> {
    let content = fs::read_to_string(path)?;
    parse_signature_list(&content)
}

pub fn parse_signature_list(content: &str) -> Result<Vec<SignatureEntry>> {
    let mut entries = Vec::new();

    for line in content.lines().filter(|line| !line.trim().is_empty()) {
        let (address_part, signature_part) = line
            .split_once(':')
            .ok_or_else(|| Error::InvalidData(format!("Missing ':' in line '{}'", line)))?;

        let address_part = address_part.trim();
        let digits = address_part
            .strip_prefix("0x")
            .or_else(|| address_part.strip_prefix("0X"))
            .unwrap_or(address_part);
        let address = u64::from_str_radix(digits, 16).map_err(|e| {
            Error::InvalidData(format!("Invalid address '{}': {}", address_part, e))
        })?;

        let signature = signature_part.trim();
        if signature.eq_ignore_ascii_case(UNAVAILABLE_SIGNATURE) {
            debug!("No signature available for 0x{:X}", address);
            continue;
        }

        entries.push(SignatureEntry {
            address,
            signature: signature.to_string(),
        });
    }

    Ok(entries)
}

/// Generator input: one `0x{ADDR}` line per address
pub fn format_generation_list(addresses: &[u64]) -> String {
    addresses
        .iter()
        .map(|address| format!("0x{:X}\n", address))
        .collect()
}

impl SignatureEntry {
    /// Whether the signature occurs somewhere in `image`.
    ///
    /// A malformed signature never matches.
    pub fn matches(&self, image: &[u8]) -> bool {
        debug!("Scanning for '{}'", self.signature);
        match SignaturePattern::parse(&self.signature) {
            Ok(pattern) => pattern.matches_any(image),
            Err(e) => {
                warn!("Skipping signature for 0x{:X}: {}", self.address, e);
                false
            }
        }
    }
}

/// Keep the entries whose signature matches somewhere in `image`.
///
/// A malformed signature only drops its own entry.
pub fn verify_signatures(entries: &[SignatureEntry], image: &[u8]) -> Vec<SignatureEntry> {
    entries
        .iter()
        .filter(|entry| entry.matches(image))
        .cloned()
        .collect()
}
