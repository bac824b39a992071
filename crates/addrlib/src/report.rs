//! Finalized CSV report
//!
//! One row per resolved marker, ordered by address:
//!
//! ```text
//! OldRELID,OldRVA,OldAddress,Signature,NewAddress
//! 11045,0xFCFE0,0x1400FCFE0,40 53 48 83 EC 20 83 3D ? ? ? ? ? 74,
//! ```
//!
//! The trailing column is left empty for the new build's address. Once it
//! has been filled in, the report is read back to remap the source tree; a
//! `//`-prefixed new address marks a function that no longer exists and maps
//! to offset zero.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::markers::ResolvedMarker;
use crate::signature::SignatureEntry;

/// Preferred load address of 64-bit executables
pub const DEFAULT_IMAGE_BASE: u64 = 0x1_4000_0000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub id: u64,
    pub address: u64,
    pub image_base: u64,
    /// Verified signature, empty when none is known
    pub signature: String,
    /// Address in the new build, once known
    pub new_address: Option<u64>,
}

const CSV_COLUMNS: usize = 5;

impl ReportRow {
    pub fn to_csv_line(&self) -> String {
        let new_address = self
            .new_address
            .map(|address| format!("0x{:X}", address))
            .unwrap_or_default();

        format!(
            "{},0x{:X},0x{:X},{},{}",
            self.id,
            self.address,
            self.address.wrapping_add(self.image_base),
            self.signature,
            new_address
        )
    }

    /// Parse one `OldRELID,OldRVA,OldAddress,Signature,NewAddress` line.
    ///
    /// Hex columns accept an optional `0x` prefix. An empty new address stays
    /// unknown; one starting with `//` is zero.
    pub fn from_csv_line(line: &str, image_base: u64) -> Result<Self> {
        let columns: Vec<&str> = line.split(',').map(str::trim).collect();
        if columns.len() != CSV_COLUMNS {
            return Err(Error::InvalidData(format!(
                "Expected {} columns (OldRELID,OldRVA,OldAddress,Signature,NewAddress), got {}: '{}'",
                CSV_COLUMNS,
                columns.len(),
                line
            )));
        }

        let id = columns[0]
            .parse::<u64>()
            .map_err(|e| Error::InvalidData(format!("Invalid OldRELID '{}': {}", columns[0], e)))?;
        let address = parse_hex_column("OldRVA", columns[1])?;
        parse_hex_column("OldAddress", columns[2])?;

        let new_address = match columns[4] {
            "" => None,
            text if text.starts_with("//") => Some(0),
            text => Some(parse_hex_column("NewAddress", text)?),
        };

        Ok(Self {
            id,
            address,
            image_base,
            signature: columns[3].to_string(),
            new_address,
        })
    }

    /// Module-relative offset in the new build.
    ///
    /// A zero new address stays zero instead of underflowing the image base.
    pub fn new_offset(&self) -> Option<u64> {
        self.new_address.map(|address| match address {
            0 => 0,
            address => address.wrapping_sub(self.image_base),
        })
    }
}

fn parse_hex_column(name: &str, text: &str) -> Result<u64> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    u64::from_str_radix(digits, 16)
        .map_err(|e| Error::InvalidData(format!("Invalid {} '{}': {}", name, text, e)))
}

/// Build rows for every distinct marker, attaching verified signatures by address
pub fn build_report(
    markers: &[ResolvedMarker],
    signatures: &[SignatureEntry],
    image_base: u64,
) -> Vec<ReportRow> {
    let by_address: HashMap<u64, &str> = signatures
        .iter()
        .map(|entry| (entry.address, entry.signature.as_str()))
        .collect();

    let mut pairs: Vec<(u64, u64)> = markers.iter().map(|m| (m.address, m.id)).collect();
    pairs.sort_unstable();
    pairs.dedup();

    pairs
        .into_iter()
        .map(|(address, id)| ReportRow {
            id,
            address,
            image_base,
            signature: by_address
                .get(&address)
                .map(|s| s.to_string())
                .unwrap_or_default(),
            new_address: None,
        })
        .collect()
}

pub fn format_report(rows: &[ReportRow]) -> String {
    rows.iter()
        .map(|row| format!("{}\n", row.to_csv_line()))
        .collect()
}

pub fn write_report<P: AsRef<Path>>(path: P, rows: &[ReportRow]) -> Result<()> {
    fs::write(&path, format_report(rows))?;
    info!(
        "Wrote {} report rows to {}",
        rows.len(),
        path.as_ref().display()
    );
    Ok(())
}

/// Parse a finalized report. Blank lines and an `OldRELID` header are skipped.
pub fn parse_report(content: &str, image_base: u64) -> Result<Vec<ReportRow>> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty() && !line.starts_with("OldRELID"))
        .map(|line| ReportRow::from_csv_line(line, image_base))
        .collect()
}

pub fn load_report<P: AsRef<Path>>(path: P, image_base: u64) -> Result<Vec<ReportRow>> {
    let content = fs::read_to_string(&path)?;
    let rows = parse_report(&content, image_base)?;
    debug!(
        "Loaded {} report rows from {}",
        rows.len(),
        path.as_ref().display()
    );
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::MarkerKind;

    fn resolved(id: u64, address: u64) -> ResolvedMarker {
        ResolvedMarker {
            kind: MarkerKind::Id,
            id,
            address,
        }
    }

    #[test]
    fn test_csv_line() {
        let row = ReportRow {
            id: 11045,
            address: 0xFCFE0,
            image_base: DEFAULT_IMAGE_BASE,
            signature: "40 53 48 83 EC 20 83 3D ? ? ? ? ? 74".to_string(),
            new_address: None,
        };
        assert_eq!(
            row.to_csv_line(),
            "11045,0xFCFE0,0x1400FCFE0,40 53 48 83 EC 20 83 3D ? ? ? ? ? 74,"
        );
    }

    #[test]
    fn test_build_report_sorted_and_deduplicated() {
        let markers = [resolved(2, 0x2000), resolved(1, 0x1000), resolved(2, 0x2000)];
        let signatures = [SignatureEntry {
            address: 0x2000,
            signature: "48 8B ?".to_string(),
        }];

        let rows = build_report(&markers, &signatures, DEFAULT_IMAGE_BASE);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, 1);
        assert_eq!(rows[0].signature, "");
        assert_eq!(rows[1].id, 2);
        assert_eq!(rows[1].signature, "48 8B ?");

        assert_eq!(
            format_report(&rows),
            "1,0x1000,0x140001000,,\n2,0x2000,0x140002000,48 8B ?,\n"
        );
    }

    #[test]
    fn test_write_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("finalized.csv");
        let rows = build_report(&[resolved(7, 0x70)], &[], 0);

        write_report(&path, &rows).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "7,0x70,0x70,,\n");
    }

    #[test]
    fn test_from_csv_line() {
        let row = ReportRow::from_csv_line(
            "11045,0xFCFE0,0x1400FCFE0,40 53 48 83 EC 20 83 3D ? ? ? ? ? 74,0x140106EC0",
            DEFAULT_IMAGE_BASE,
        )
        .unwrap();

        assert_eq!(row.id, 11045);
        assert_eq!(row.address, 0xFCFE0);
        assert_eq!(row.signature, "40 53 48 83 EC 20 83 3D ? ? ? ? ? 74");
        assert_eq!(row.new_address, Some(0x1_4010_6EC0));
        assert_eq!(row.new_offset(), Some(0x106EC0));

        // Unprefixed hex columns
        let row = ReportRow::from_csv_line("1,FCFE0,1400FCFE0,,140106EC0", DEFAULT_IMAGE_BASE)
            .unwrap();
        assert_eq!(row.address, 0xFCFE0);
        assert_eq!(row.new_offset(), Some(0x106EC0));
    }

    #[test]
    fn test_from_csv_line_new_address_states() {
        let row = ReportRow::from_csv_line("1,0x10,0x140000010,,", DEFAULT_IMAGE_BASE).unwrap();
        assert_eq!(row.new_address, None);
        assert_eq!(row.new_offset(), None);

        let row = ReportRow::from_csv_line("1,0x10,0x140000010,,// removed", DEFAULT_IMAGE_BASE)
            .unwrap();
        assert_eq!(row.new_address, Some(0));
        assert_eq!(row.new_offset(), Some(0));
    }

    #[test]
    fn test_from_csv_line_column_count() {
        for line in ["1,0x10,0x140000010,", "1,0x10,0x140000010,48 8B,,extra"] {
            let err = ReportRow::from_csv_line(line, DEFAULT_IMAGE_BASE).unwrap_err();
            assert!(matches!(err, Error::InvalidData(_)));
        }

        for line in ["x,0x10,0x140000010,,", "1,0x10,0x140000010,,0xZZ"] {
            let err = ReportRow::from_csv_line(line, DEFAULT_IMAGE_BASE).unwrap_err();
            assert!(matches!(err, Error::InvalidData(_)));
        }
    }

    #[test]
    fn test_report_reads_back() {
        let markers = [resolved(1, 0x1000), resolved(2, 0x2000)];
        let mut rows = build_report(&markers, &[], DEFAULT_IMAGE_BASE);
        rows[1].new_address = Some(0x1_4000_3000);

        let content = format!(
            "OldRELID,OldRVA,OldAddress,Signature,NewAddress\n{}",
            format_report(&rows)
        );
        assert_eq!(parse_report(&content, DEFAULT_IMAGE_BASE).unwrap(), rows);
    }

    #[test]
    fn test_load_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("finalized.csv");
        fs::write(&path, "7,0x70,0x140000070,,0x140000090\n\n").unwrap();

        let rows = load_report(&path, DEFAULT_IMAGE_BASE).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].new_offset(), Some(0x90));
    }
}
