//! Remap command implementation.

use std::path::{Path, PathBuf};

use addrlib::{RemapTable, RemappedFile, load_report, remap_source_tree};
use anyhow::{Context, Result};
use owo_colors::OwoColorize;

/// Where rewritten sources go
pub enum RemapOutput<'a> {
    /// List the changed lines only
    Preview,
    /// Mirror the changed files under another directory
    Directory(&'a Path),
    /// Overwrite the scanned files
    InPlace,
}

/// Destination of `file` when `source_dir` is mirrored into `output_dir`
fn mirrored_path(file: &RemappedFile, source_dir: &Path, output_dir: &Path) -> Result<PathBuf> {
    let relative = file
        .path
        .strip_prefix(source_dir)
        .with_context(|| format!("{} is outside {}", file.path.display(), source_dir.display()))?;
    Ok(output_dir.join(relative))
}

/// Run the remap command
pub fn run(
    source_dir: &Path,
    finalized: &Path,
    image_base: u64,
    output: RemapOutput,
) -> Result<()> {
    let rows = load_report(finalized, image_base)
        .with_context(|| format!("Failed to read {}", finalized.display()))?;
    let table = RemapTable::from_rows(&rows);
    println!(
        "Loaded {} rows from {}, {} identifiers with a new address",
        rows.len(),
        finalized.display(),
        table.len()
    );

    let remapped = remap_source_tree(source_dir, &table)?;

    for file in &remapped {
        println!();
        println!("{}", file.path.display().bold());
        for change in &file.changes {
            println!("  {:>5} {} {}", change.line_number, "-".red(), change.before.trim());
            println!("  {:>5} {} {}", "", "+".green(), change.after.trim());
        }
    }

    let lines: usize = remapped.iter().map(|f| f.changes.len()).sum();
    println!();
    match output {
        RemapOutput::Preview => {
            println!(
                "{} lines in {} files would change (use --output or --in-place to write)",
                lines,
                remapped.len()
            );
        }
        RemapOutput::Directory(output_dir) => {
            for file in &remapped {
                file.write_to(mirrored_path(file, source_dir, output_dir)?)?;
            }
            println!(
                "Wrote {} remapped files ({} lines) to {}",
                remapped.len(),
                lines,
                output_dir.display()
            );
        }
        RemapOutput::InPlace => {
            for file in &remapped {
                file.write_to(&file.path)?;
            }
            println!("Rewrote {} lines in {} files", lines, remapped.len());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const FINALIZED: &str = "11045,0xFCFE0,0x1400FCFE0,40 53 ?,0x140106EC0\n";

    fn setup() -> (tempfile::TempDir, PathBuf, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("src");
        fs::create_dir_all(source.join("RE")).unwrap();
        fs::write(source.join("RE/Actor.cpp"), "REL::ID(11045);\n").unwrap();

        let finalized = dir.path().join("finalized.csv");
        fs::write(&finalized, FINALIZED).unwrap();
        (dir, source, finalized)
    }

    #[test]
    fn test_preview_writes_nothing() {
        let (_dir, source, finalized) = setup();
        run(&source, &finalized, 0x1_4000_0000, RemapOutput::Preview).unwrap();
        assert_eq!(
            fs::read_to_string(source.join("RE/Actor.cpp")).unwrap(),
            "REL::ID(11045);\n"
        );
    }

    #[test]
    fn test_output_directory_mirrors_tree() {
        let (dir, source, finalized) = setup();
        let out = dir.path().join("out");
        run(&source, &finalized, 0x1_4000_0000, RemapOutput::Directory(&out)).unwrap();

        assert_eq!(
            fs::read_to_string(out.join("RE/Actor.cpp")).unwrap(),
            "REL::Offset(0x106EC0);\n"
        );
        assert_eq!(
            fs::read_to_string(source.join("RE/Actor.cpp")).unwrap(),
            "REL::ID(11045);\n"
        );
    }

    #[test]
    fn test_in_place() {
        let (_dir, source, finalized) = setup();
        run(&source, &finalized, 0x1_4000_0000, RemapOutput::InPlace).unwrap();
        assert_eq!(
            fs::read_to_string(source.join("RE/Actor.cpp")).unwrap(),
            "REL::Offset(0x106EC0);\n"
        );
    }

    #[test]
    fn test_malformed_report_fails() {
        let (dir, source, _) = setup();
        let finalized = dir.path().join("bad.csv");
        fs::write(&finalized, "11045,0xFCFE0\n").unwrap();
        assert!(run(&source, &finalized, 0x1_4000_0000, RemapOutput::Preview).is_err());
    }
}
