//! Verify command implementation.

use std::path::Path;

use addrlib::{SignatureEntry, load_signature_list};
use anyhow::Result;
use owo_colors::OwoColorize;
use tracing::info;

use super::read_image;

/// Match status of every entry, in list order
fn check_entries<'a>(
    entries: &'a [SignatureEntry],
    image: &[u8],
) -> Vec<(&'a SignatureEntry, bool)> {
    entries
        .iter()
        .map(|entry| (entry, entry.matches(image)))
        .collect()
}

/// Load a signature list and keep the entries that match `executable`
pub fn verified_entries(executable: &Path, signatures: &Path) -> Result<Vec<SignatureEntry>> {
    let entries = load_signature_list(signatures)?;
    let image = read_image(executable)?;

    info!(
        "Verifying {} signatures against {}",
        entries.len(),
        executable.display()
    );
    let checked = check_entries(&entries, &image);

    for (entry, matched) in &checked {
        if *matched {
            println!("  {} 0x{:X}: {}", "✓".green(), entry.address, entry.signature);
        } else {
            println!("  {} 0x{:X}: {}", "✗".red(), entry.address, entry.signature);
        }
    }

    let verified: Vec<SignatureEntry> = checked
        .into_iter()
        .filter(|(_, matched)| *matched)
        .map(|(entry, _)| entry.clone())
        .collect();

    println!();
    println!("Verified {}/{} signatures", verified.len(), entries.len());
    Ok(verified)
}

/// Run the verify command
pub fn run(executable: &Path, signatures: &Path) -> Result<()> {
    verified_entries(executable, signatures)?;
    Ok(())
}
