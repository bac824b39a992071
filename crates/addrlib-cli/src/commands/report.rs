//! Report command implementation.

use std::path::Path;

use addrlib::{build_report, write_report};
use anyhow::Result;

use super::{markers, verify};

/// Inputs of the report command, resolved from arguments and config
pub struct ReportInputs<'a> {
    pub source_dir: &'a Path,
    pub database: &'a Path,
    /// Signature list and the image to verify it against
    pub signatures: Option<(&'a Path, &'a Path)>,
    pub image_base: u64,
    pub output: &'a Path,
}

/// Run the report command
pub fn run(inputs: &ReportInputs) -> Result<()> {
    let resolved = markers::collect(inputs.source_dir, inputs.database)?;

    let signatures = match inputs.signatures {
        Some((list, executable)) => verify::verified_entries(executable, list)?,
        None => Vec::new(),
    };

    let rows = build_report(&resolved, &signatures, inputs.image_base);
    write_report(inputs.output, &rows)?;

    let signed = rows.iter().filter(|row| !row.signature.is_empty()).count();
    println!();
    println!(
        "Finalized CSV written ({} rows, {} with signatures): {}",
        rows.len(),
        signed,
        inputs.output.display()
    );

    Ok(())
}
