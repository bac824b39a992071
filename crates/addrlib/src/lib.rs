//! # addrlib
//!
//! Address library databases and executable signatures.
//!
//! This crate provides:
//! - Decoding of address library `.bin` databases into a two-way
//!   identifier/address index
//! - Wildcard byte signatures and positional scanning over raw images
//! - Relocation marker extraction from C++ source trees
//! - The finalized CSV report tying markers, addresses and signatures together
//! - Remapping source trees to the offsets of a new build from that report

pub mod database;
pub mod error;
pub mod markers;
pub mod remap;
pub mod report;
pub mod signature;

pub use database::{AddressIndex, AddressLibrary, AddressRecord, Header};
pub use error::{Error, Result};
pub use markers::{
    Marker, MarkerKind, ResolvedMarker, extract_parenthesized_number, resolve_markers,
    scan_line, scan_source_tree,
};
pub use remap::{LineChange, RemapTable, RemappedFile, remap_source, remap_source_tree};
pub use report::{
    DEFAULT_IMAGE_BASE, ReportRow, build_report, format_report, load_report, parse_report,
    write_report,
};
pub use signature::{
    SignatureEntry, SignaturePattern, format_generation_list, load_signature_list,
    parse_signature_list, verify_signatures,
};
