//! Markers command implementation.

use std::fs;
use std::path::Path;

use addrlib::{
    AddressLibrary, MarkerKind, ResolvedMarker, format_generation_list, resolve_markers,
    scan_source_tree,
};
use anyhow::Result;

use super::hex_utils::format_hex_address;

/// Scan `source_dir` and resolve every marker against the database
pub fn collect(source_dir: &Path, database: &Path) -> Result<Vec<ResolvedMarker>> {
    let library = AddressLibrary::load(database)?;
    let markers = scan_source_tree(source_dir)?;
    let resolved = resolve_markers(&markers, &library);

    println!(
        "Found {} markers in {}, resolved {}",
        markers.len(),
        source_dir.display(),
        resolved.len()
    );

    Ok(resolved)
}

/// Distinct addresses in ascending order
pub fn unique_addresses(markers: &[ResolvedMarker]) -> Vec<u64> {
    let mut addresses: Vec<u64> = markers.iter().map(|m| m.address).collect();
    addresses.sort_unstable();
    addresses.dedup();
    addresses
}

/// Run the markers command
pub fn run(source_dir: &Path, database: &Path, generation_file: Option<&Path>) -> Result<()> {
    let resolved = collect(source_dir, database)?;

    println!();
    for marker in &resolved {
        let literal = match marker.kind {
            MarkerKind::Id => marker.id.to_string(),
            MarkerKind::Offset => format_hex_address(marker.address),
        };
        println!(
            "  {}({}) -> id={}, offset={}",
            marker.kind,
            literal,
            marker.id,
            format_hex_address(marker.address)
        );
    }

    if let Some(path) = generation_file {
        let addresses = unique_addresses(&resolved);
        fs::write(path, format_generation_list(&addresses))?;
        println!();
        println!(
            "Signature generation file written ({} addresses): {}",
            addresses.len(),
            path.display()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_addresses() {
        let markers = [
            ResolvedMarker {
                kind: MarkerKind::Id,
                id: 2,
                address: 0x200,
            },
            ResolvedMarker {
                kind: MarkerKind::Offset,
                id: 1,
                address: 0x100,
            },
            ResolvedMarker {
                kind: MarkerKind::Id,
                id: 2,
                address: 0x200,
            },
        ];
        assert_eq!(unique_addresses(&markers), vec![0x100, 0x200]);
    }
}
