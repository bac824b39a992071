//! Address library database files
//!
//! A database maps build-independent identifiers to module-relative offsets
//! for one specific executable build. Loading is all-or-nothing: any header
//! or record error fails the whole load.

mod codec;
mod header;
mod index;
mod io;

#[cfg(test)]
pub mod mock;

pub use codec::{DecoderState, DeltaEncoding, RecordSection, RecordTag, read_records};
pub use header::{Header, MAX_NAME_LENGTH, SUPPORTED_FORMAT};
pub use index::{AddressIndex, AddressRecord};

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::info;

use crate::error::Result;

/// A fully decoded database
#[derive(Debug, Clone)]
pub struct AddressLibrary {
    pub header: Header,
    pub pointer_size: u32,
    index: AddressIndex,
}

impl AddressLibrary {
    /// Load a database file from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = BufReader::new(File::open(path)?);
        let library = Self::from_reader(&mut reader)?;

        info!(
            "Loaded {} ({} v{}, {} identifiers)",
            path.display(),
            library.header.executable_name,
            library.header.version_string(),
            library.index.len()
        );
        Ok(library)
    }

    /// Decode a database from any byte stream
    pub fn from_reader<R: Read>(reader: &mut R) -> Result<Self> {
        let header = Header::read(reader)?;
        let RecordSection {
            pointer_size,
            index,
        } = read_records(reader)?;

        Ok(Self {
            header,
            pointer_size,
            index,
        })
    }

    pub fn index(&self) -> &AddressIndex {
        &self.index
    }

    pub fn address_of(&self, id: u64) -> Result<u64> {
        self.index.address_of(id)
    }

    pub fn id_of(&self, address: u64) -> Result<u64> {
        self.index.id_of(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use super::mock::DatabaseBuilder;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    fn sample_database() -> Vec<u8> {
        DatabaseBuilder::new()
            .header([1, 0, 0, 0], "test")
            .records(8, 1)
            .u8(0x00)
            .u64(42)
            .u64(1000)
            .build()
    }

    #[test]
    fn test_end_to_end_single_record() {
        let library = AddressLibrary::from_reader(&mut Cursor::new(sample_database())).unwrap();

        assert_eq!(library.header.executable_name, "test");
        assert_eq!(library.header.version, [1, 0, 0, 0]);
        assert_eq!(library.pointer_size, 8);
        assert_eq!(library.address_of(42).unwrap(), 1000);
        assert_eq!(library.id_of(1000).unwrap(), 42);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&sample_database()).unwrap();
        file.flush().unwrap();

        let library = AddressLibrary::load(file.path()).unwrap();
        assert_eq!(library.index().len(), 1);
        assert_eq!(library.address_of(42).unwrap(), 1000);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = AddressLibrary::load(dir.path().join("version-1-5-97-0.bin")).unwrap_err();
        assert!(matches!(err, Error::Io(ref e) if e.kind() == std::io::ErrorKind::NotFound));
    }

    #[test]
    fn test_record_error_fails_whole_load() {
        let bytes = DatabaseBuilder::new()
            .header([1, 0, 0, 0], "test")
            .records(8, 3)
            .u8(0x00)
            .u64(42)
            .u64(1000)
            .u8(0x11)
            .u8(0x0A)
            .build();

        let err = AddressLibrary::from_reader(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, Error::UnknownEncoding { selector: 10, .. }));
    }

    #[test]
    fn test_unsupported_format_fails_load() {
        let bytes = DatabaseBuilder::new().i32(2).build();
        let err = AddressLibrary::from_reader(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(2)));
    }
}
