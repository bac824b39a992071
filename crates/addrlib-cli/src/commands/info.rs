//! Info command implementation.

use std::path::Path;

use addrlib::AddressLibrary;
use anyhow::Result;

/// Run the info command
pub fn run(database: &Path) -> Result<()> {
    let library = AddressLibrary::load(database)?;
    let header = &library.header;

    println!("Database:     {}", database.display());
    println!("Format:       {}", header.format);
    println!("Version:      {}", header.version_string());
    println!("Executable:   {}", header.executable_name);
    println!("Pointer size: {}", library.pointer_size);
    println!("Identifiers:  {}", library.index().len());

    Ok(())
}
