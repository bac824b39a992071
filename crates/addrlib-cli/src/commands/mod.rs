//! CLI command implementations.
//!
//! This module contains the implementation of each CLI command.

pub mod dump;
pub mod hex_utils;
pub mod info;
pub mod lookup;
pub mod markers;
pub mod remap;
pub mod report;
pub mod scan;
pub mod verify;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

/// Read a whole executable image into memory
pub fn read_image(path: &Path) -> Result<Vec<u8>> {
    let image =
        fs::read(path).with_context(|| format!("Failed to read image {}", path.display()))?;
    debug!("Read {} bytes from {}", image.len(), path.display());
    Ok(image)
}
