//! Dump command implementation.

use std::fs;
use std::path::Path;

use addrlib::{AddressLibrary, AddressRecord, Header};
use anyhow::Result;
use serde::Serialize;

#[derive(Serialize)]
struct DatabaseDump<'a> {
    header: &'a Header,
    pointer_size: u32,
    records: Vec<AddressRecord>,
}

/// Run the dump command
pub fn run(database: &Path, output: Option<&Path>) -> Result<()> {
    let library = AddressLibrary::load(database)?;

    let dump = DatabaseDump {
        header: &library.header,
        pointer_size: library.pointer_size,
        records: library.index().records(),
    };
    let json = serde_json::to_string_pretty(&dump)?;

    if let Some(output_path) = output {
        fs::write(output_path, json)?;
        println!(
            "Dumped {} records to: {}",
            dump.records.len(),
            output_path.display()
        );
    } else {
        println!("{}", json);
    }

    Ok(())
}
