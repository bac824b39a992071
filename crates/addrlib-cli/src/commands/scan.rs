//! Scan command implementation.

use std::path::Path;

use addrlib::SignaturePattern;
use anyhow::Result;
use owo_colors::OwoColorize;

use super::hex_utils::format_hex_address;
use super::read_image;

/// Run the scan command
pub fn run(executable: &Path, pattern: &str) -> Result<()> {
    let pattern = SignaturePattern::parse(pattern)?;
    let image = read_image(executable)?;

    println!(
        "Scanning {} ({} bytes) for: {}",
        executable.display(),
        image.len(),
        pattern
    );

    match pattern.find_first(&image) {
        Some(offset) => println!(
            "{} first match at file offset {}",
            "FOUND".green().bold(),
            format_hex_address(offset as u64)
        ),
        None => println!("{} no match", "MISSING".red().bold()),
    }

    Ok(())
}
