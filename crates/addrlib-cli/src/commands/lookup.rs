//! Lookup command implementation.

use std::path::Path;

use addrlib::AddressLibrary;
use anyhow::{Result, bail};

use super::hex_utils::format_hex_address;
use crate::cli::LookupKey;

/// Run the lookup command
pub fn run(database: &Path, key: &LookupKey, image_base: u64) -> Result<()> {
    let library = AddressLibrary::load(database)?;

    let (id, offset) = match (key.id, key.address) {
        (Some(id), _) => (id, library.address_of(id)?),
        (None, Some(address)) => (library.id_of(address)?, address),
        (None, None) => bail!("No lookup key given. Use --id or --address"),
    };

    println!("ID:      {}", id);
    println!("Offset:  {}", format_hex_address(offset));
    println!(
        "Address: {}",
        format_hex_address(offset.wrapping_add(image_base))
    );

    Ok(())
}
