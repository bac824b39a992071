//! Byte stream builder for database tests

use super::header::SUPPORTED_FORMAT;

/// Assembles a database image byte by byte.
#[derive(Debug, Default)]
pub struct DatabaseBuilder {
    bytes: Vec<u8>,
}

impl DatabaseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Standard header: supported format, given version and name
    pub fn header(self, version: [i32; 4], name: &str) -> Self {
        let mut builder = self.i32(SUPPORTED_FORMAT);
        for component in version {
            builder = builder.i32(component);
        }
        builder.i32(name.len() as i32).raw(name.as_bytes())
    }

    /// Pointer size and record count preamble of the record section
    pub fn records(self, pointer_size: i32, count: i32) -> Self {
        self.i32(pointer_size).i32(count)
    }

    pub fn u8(mut self, value: u8) -> Self {
        self.bytes.push(value);
        self
    }

    pub fn u16(self, value: u16) -> Self {
        self.raw(&value.to_le_bytes())
    }

    pub fn u32(self, value: u32) -> Self {
        self.raw(&value.to_le_bytes())
    }

    pub fn i32(self, value: i32) -> Self {
        self.raw(&value.to_le_bytes())
    }

    pub fn u64(self, value: u64) -> Self {
        self.raw(&value.to_le_bytes())
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}
