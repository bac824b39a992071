//! Rewriting source trees for a new executable build
//!
//! A finalized report with its new address column filled in maps every old
//! identifier and old offset to an offset in the new build. Marker literals
//! are replaced by that offset and `REL::ID` becomes `REL::Offset`:
//!
//! ```text
//! REL::Relocation<func_t> func{ REL::ID(11045) };
//! REL::Relocation<func_t> func{ REL::Offset(0x106EC0) };
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::markers::{MarkerKind, collect_source_files, parenthesized_span, scan_line};
use crate::report::ReportRow;

/// Old identifier and old offset lookups into new offsets
#[derive(Debug, Clone, Default)]
pub struct RemapTable {
    by_id: HashMap<u64, u64>,
    by_offset: HashMap<u64, u64>,
}

impl RemapTable {
    /// Build from report rows. The first row for a key wins; rows without a
    /// new address are left out.
    pub fn from_rows(rows: &[ReportRow]) -> Self {
        let mut table = Self::default();
        for row in rows {
            let Some(new_offset) = row.new_offset() else {
                debug!("No new address for {} (0x{:X})", row.id, row.address);
                continue;
            };
            table.by_id.entry(row.id).or_insert(new_offset);
            table.by_offset.entry(row.address).or_insert(new_offset);
        }
        table
    }

    pub fn new_offset_for_id(&self, id: u64) -> Option<u64> {
        self.by_id.get(&id).copied()
    }

    pub fn new_offset_for_offset(&self, offset: u64) -> Option<u64> {
        self.by_offset.get(&offset).copied()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Rewritten line, or `None` when the line carries no known marker
    pub fn remap_line(&self, line: &str) -> Option<String> {
        let marker = scan_line(line)?;
        let new_offset = match marker.kind {
            MarkerKind::Id => self.new_offset_for_id(marker.value),
            MarkerKind::Offset => self.new_offset_for_offset(marker.value),
        };
        let Some(new_offset) = new_offset else {
            warn!("No new offset for {}({})", marker.kind, marker.value);
            return None;
        };

        let span = parenthesized_span(line).ok()?;
        let rewritten = format!(
            "{}0x{:X}{}",
            &line[..span.start],
            new_offset,
            &line[span.end..]
        )
        .replace("REL::ID", "REL::Offset");

        (rewritten != line).then_some(rewritten)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineChange {
    /// 1-based
    pub line_number: usize,
    pub before: String,
    pub after: String,
}

/// A source file with at least one rewritten line
#[derive(Debug, Clone)]
pub struct RemappedFile {
    pub path: PathBuf,
    pub content: String,
    pub changes: Vec<LineChange>,
}

impl RemappedFile {
    /// Write the rewritten content to `path`, creating parent directories
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, &self.content)?;
        Ok(())
    }
}

/// Rewrite every marker line of `content`, keeping line endings intact
pub fn remap_source(content: &str, table: &RemapTable) -> (String, Vec<LineChange>) {
    let mut output = String::with_capacity(content.len());
    let mut changes = Vec::new();

    for (index, chunk) in content.split_inclusive('\n').enumerate() {
        let line = chunk.trim_end_matches(['\r', '\n']);
        let ending = &chunk[line.len()..];

        match table.remap_line(line) {
            Some(rewritten) => {
                output.push_str(&rewritten);
                changes.push(LineChange {
                    line_number: index + 1,
                    before: line.to_string(),
                    after: rewritten,
                });
            }
            None => output.push_str(line),
        }
        output.push_str(ending);
    }

    (output, changes)
}

/// Remap every source file under `dir`. Only files that change are returned;
/// nothing is written.
pub fn remap_source_tree<P: AsRef<Path>>(
    dir: P,
    table: &RemapTable,
) -> Result<Vec<RemappedFile>> {
    let files = collect_source_files(dir.as_ref())?;

    let mut remapped = Vec::new();
    for path in files {
        let source = fs::read_to_string(&path)?;
        let (content, changes) = remap_source(&source, table);
        if changes.is_empty() {
            continue;
        }

        debug!("{}: {} lines remapped", path.display(), changes.len());
        remapped.push(RemappedFile {
            path,
            content,
            changes,
        });
    }

    info!(
        "Remapped {} lines in {} files",
        remapped.iter().map(|f| f.changes.len()).sum::<usize>(),
        remapped.len()
    );
    Ok(remapped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{DEFAULT_IMAGE_BASE, parse_report};

    const FINALIZED: &str = "\
11045,0xFCFE0,0x1400FCFE0,40 53 48 83 EC 20 83 3D ? ? ? ? ? 74,0x140106EC0
13530,0x1A0,0x1400001A0,,// gone
20000,0x2000,0x140002000,48 8B ?,
11045,0x3000,0x140003000,,0x140009000
";

    fn table() -> RemapTable {
        RemapTable::from_rows(&parse_report(FINALIZED, DEFAULT_IMAGE_BASE).unwrap())
    }

    #[test]
    fn test_table_from_rows() {
        let table = table();
        assert_eq!(table.len(), 2);
        assert_eq!(table.new_offset_for_id(11045), Some(0x106EC0));
        assert_eq!(table.new_offset_for_id(13530), Some(0));
        assert_eq!(table.new_offset_for_id(20000), None);
        assert_eq!(table.new_offset_for_offset(0xFCFE0), Some(0x106EC0));
        assert_eq!(table.new_offset_for_offset(0x3000), Some(0x9000));
    }

    #[test]
    fn test_remap_id_line() {
        let table = table();
        assert_eq!(
            table.remap_line("REL::Relocation<func_t> func{ REL::ID(11045) };"),
            Some("REL::Relocation<func_t> func{ REL::Offset(0x106EC0) };".to_string())
        );
        assert_eq!(
            table.remap_line("inline constexpr REL::ID AddMessage(static_cast<std::uint64_t>(13530));"),
            Some(
                "inline constexpr REL::Offset AddMessage(static_cast<std::uint64_t>(0x0));"
                    .to_string()
            )
        );
    }

    #[test]
    fn test_remap_replaces_only_the_literal() {
        let table = table();
        assert_eq!(
            table.remap_line("REL::Relocation<func_t> func11045{ REL::ID(11045) };"),
            Some("REL::Relocation<func_t> func11045{ REL::Offset(0x106EC0) };".to_string())
        );
    }

    #[test]
    fn test_remap_offset_line() {
        let table = table();
        assert_eq!(
            table.remap_line("REL::Relocation<func_t> func{ REL::Offset(0x3000) };"),
            Some("REL::Relocation<func_t> func{ REL::Offset(0x9000) };".to_string())
        );
    }

    #[test]
    fn test_remap_unknown_or_unrelated_lines() {
        let table = table();
        assert_eq!(table.remap_line("REL::ID(20000)"), None);
        assert_eq!(table.remap_line("REL::ID(99)"), None);
        assert_eq!(table.remap_line("using REL::ID;"), None);
        assert_eq!(table.remap_line("int x = foo(11045);"), None);
    }

    #[test]
    fn test_remap_source_keeps_line_endings() {
        let source = "#pragma once\r\nREL::ID(11045);\r\nint y;";
        let (content, changes) = remap_source(source, &table());

        assert_eq!(content, "#pragma once\r\nREL::Offset(0x106EC0);\r\nint y;");
        assert_eq!(
            changes,
            vec![LineChange {
                line_number: 2,
                before: "REL::ID(11045);".to_string(),
                after: "REL::Offset(0x106EC0);".to_string(),
            }]
        );
    }

    #[test]
    fn test_remap_source_tree() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.cpp"), "REL::ID(11045)\n").unwrap();
        fs::write(dir.path().join("b.h"), "REL::ID(20000)\n").unwrap();
        fs::write(dir.path().join("Offsets_RTTI.h"), "REL::ID(11045)\n").unwrap();

        let remapped = remap_source_tree(dir.path(), &table()).unwrap();
        assert_eq!(remapped.len(), 1);
        assert_eq!(remapped[0].path, dir.path().join("a.cpp"));
        assert_eq!(remapped[0].content, "REL::Offset(0x106EC0)\n");

        // Nothing is written until asked
        assert_eq!(
            fs::read_to_string(dir.path().join("a.cpp")).unwrap(),
            "REL::ID(11045)\n"
        );

        let out = dir.path().join("out/nested/a.cpp");
        remapped[0].write_to(&out).unwrap();
        assert_eq!(fs::read_to_string(out).unwrap(), "REL::Offset(0x106EC0)\n");
    }
}
