//! Relocation markers in C++ source trees
//!
//! Matches lines such as:
//!
//! ```text
//! REL::Relocation<const Setting*> fSafeZoneXWide{ REL::ID(512509) };
//! inline constexpr REL::ID AddMessage(static_cast<std::uint64_t>(13530));
//! REL::Relocation<func_t> func{ REL::Offset(0xC4F2E0) };
//! ```

use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use serde::Serialize;
use strum::Display;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::database::AddressLibrary;
use crate::error::{Error, Result};

/// Generated offset tables that are never rewritten by hand
const SKIPPED_FILES: &[&str] = &["Offsets_NiRTTI.h", "Offsets_RTTI.h"];

const SOURCE_EXTENSIONS: &[&str] = &["h", "cpp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
pub enum MarkerKind {
    #[strum(serialize = "REL::ID")]
    Id,
    #[strum(serialize = "REL::Offset")]
    Offset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Marker {
    pub kind: MarkerKind,
    pub value: u64,
}

/// A marker resolved against a database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ResolvedMarker {
    pub kind: MarkerKind,
    pub id: u64,
    pub address: u64,
}

/// Byte range of the trimmed text between the last `(` of `line` and the
/// `)` after it
pub(crate) fn parenthesized_span(line: &str) -> Result<Range<usize>> {
    let open = line
        .rfind('(')
        .ok_or_else(|| Error::InvalidData(format!("No opening parenthesis in '{}'", line)))?;
    let close = line[open..].find(')').ok_or_else(|| {
        Error::InvalidData(format!("No closing parenthesis after opening in '{}'", line))
    })?;

    let inner = &line[open + 1..open + close];
    let start = open + 1 + (inner.len() - inner.trim_start().len());
    let end = start + inner.trim().len();
    Ok(start..end)
}

/// Parse the number between the last `(` of `line` and the `)` after it.
///
/// Decimal and `0x`-prefixed hex literals are accepted. Empty or non-numeric
/// content yields `None`.
pub fn extract_parenthesized_number(line: &str) -> Result<Option<u64>> {
    let literal = &line[parenthesized_span(line)?];
    if literal.is_empty() {
        return Ok(None);
    }

    let parsed = match literal
        .strip_prefix("0x")
        .or_else(|| literal.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => literal.parse::<u64>(),
    };
    Ok(parsed.ok())
}

/// Marker carried by a single source line, if any
pub fn scan_line(line: &str) -> Option<Marker> {
    let kind = if line.contains("REL::ID") {
        MarkerKind::Id
    } else if line.contains("REL::Offset") {
        MarkerKind::Offset
    } else {
        return None;
    };

    match extract_parenthesized_number(line) {
        Ok(Some(value)) => Some(Marker { kind, value }),
        Ok(None) => None,
        Err(e) => {
            debug!("Ignoring {} line without literal: {}", kind, e);
            None
        }
    }
}

fn is_source_file(path: &Path) -> bool {
    let is_source = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SOURCE_EXTENSIONS
                .iter()
                .any(|wanted| ext.eq_ignore_ascii_case(wanted))
        });

    let is_skipped = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| SKIPPED_FILES.contains(&name));

    is_source && !is_skipped
}

/// Source files under `dir` in file-name order. Symlinks are not followed.
pub(crate) fn collect_source_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_file() && is_source_file(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Every marker under `dir`, in path order then line order
pub fn scan_source_tree<P: AsRef<Path>>(dir: P) -> Result<Vec<Marker>> {
    let files = collect_source_files(dir.as_ref())?;

    let mut markers = Vec::new();
    for file in &files {
        let content = fs::read_to_string(file)?;
        let before = markers.len();
        markers.extend(content.lines().filter_map(scan_line));
        if markers.len() > before {
            debug!("{}: {} markers", file.display(), markers.len() - before);
        }
    }

    debug!(
        "Scanned {} source files, found {} markers",
        files.len(),
        markers.len()
    );
    Ok(markers)
}

/// Pair each marker with its identifier and address.
///
/// `REL::ID` markers look up their address, `REL::Offset` markers look up
/// their identifier. Markers missing from the database are skipped.
pub fn resolve_markers(markers: &[Marker], library: &AddressLibrary) -> Vec<ResolvedMarker> {
    markers
        .iter()
        .filter_map(|marker| {
            let resolved = match marker.kind {
                MarkerKind::Id => library
                    .address_of(marker.value)
                    .map(|address| (marker.value, address)),
                MarkerKind::Offset => library.id_of(marker.value).map(|id| (id, marker.value)),
            };

            match resolved {
                Ok((id, address)) => Some(ResolvedMarker {
                    kind: marker.kind,
                    id,
                    address,
                }),
                Err(e) => {
                    warn!("Unresolved {}({}): {}", marker.kind, marker.value, e);
                    None
                }
            }
        })
        .collect()
}
