//! Database preamble

use std::io::Read;

use serde::Serialize;
use tracing::debug;

use super::io::ReadLe;
use crate::error::{Error, Result};

/// The only format tag this reader understands
pub const SUPPORTED_FORMAT: i32 = 1;

/// Upper bound on the executable name length, in bytes
pub const MAX_NAME_LENGTH: i32 = 10000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    pub format: i32,
    pub version: [i32; 4],
    pub executable_name: String,
}

impl Header {
    /// Read and validate the header, leaving `reader` just past the name bytes.
    ///
    /// The format tag is checked before anything else is consumed, and the
    /// name length is checked before any name bytes are read.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let format = reader.read_i32()?;
        if format != SUPPORTED_FORMAT {
            return Err(Error::UnsupportedFormat(format));
        }

        let mut version = [0i32; 4];
        for component in &mut version {
            *component = reader.read_i32()?;
        }

        let name_len = reader.read_i32()?;
        if !(0..=MAX_NAME_LENGTH).contains(&name_len) {
            return Err(Error::InvalidData(format!(
                "Executable name length {} is outside 0..={}",
                name_len, MAX_NAME_LENGTH
            )));
        }

        let name_bytes = reader.read_vec(name_len as usize)?;
        let executable_name = String::from_utf8(name_bytes)
            .map_err(|e| Error::InvalidData(format!("Executable name is not UTF-8: {}", e)))?;

        debug!(
            "Header: format={}, version={:?}, executable={:?}",
            format, version, executable_name
        );

        Ok(Self {
            format,
            version,
            executable_name,
        })
    }

    /// Version rendered the way database files are named, e.g. `1-5-97-0`
    pub fn version_string(&self) -> String {
        self.version
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join("-")
    }
}
