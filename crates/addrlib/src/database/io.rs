//! Little-endian primitive reads over any byte stream

use std::io::Read;

use crate::error::Result;

/// Fixed-width little-endian reads used by the header and record decoders.
///
/// A short stream surfaces as an `UnexpectedEof` I/O error.
pub trait ReadLe: Read {
    fn read_u8(&mut self) -> Result<u8> {
        Ok(u8::from_le_bytes(self.read_le_bytes()?))
    }

    fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_le_bytes()?))
    }

    fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_le_bytes()?))
    }

    fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_le_bytes()?))
    }

    fn read_u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_le_bytes()?))
    }

    fn read_le_bytes<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn read_vec(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }
}

impl<R: Read + ?Sized> ReadLe for R {}
