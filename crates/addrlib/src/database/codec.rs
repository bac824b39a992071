//! Delta-compressed identifier/address records
//!
//! Each record starts with a tag byte:
//!
//! ```text
//!  7   6 5 4   3 2 1 0
//! [S] [ addr ] [  id   ]
//! ```
//!
//! The low nibble selects how the identifier is encoded relative to the
//! previous identifier. Bits 4-6 select the address encoding and bit 7 (`S`)
//! marks the address delta as counted in pointer-sized units. Payload bytes
//! for the identifier precede those for the address.

use std::io::Read;

use strum::FromRepr;
use tracing::debug;

use super::index::{AddressIndex, AddressRecord};
use super::io::ReadLe;
use crate::error::{Error, Result};

/// Upper bound for up-front map allocation; larger tables grow on demand.
/// The record count is untrusted until the records have actually been read.
const MAX_PREALLOCATED_RECORDS: usize = 1 << 12;

/// How a single value is stored relative to its delta base
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
#[repr(u8)]
pub enum DeltaEncoding {
    /// Raw u64, ignores the base
    Absolute64 = 0,
    /// base + 1, no payload
    Increment = 1,
    AddByte = 2,
    SubByte = 3,
    AddWord = 4,
    SubWord = 5,
    /// Raw u16, ignores the base
    Absolute16 = 6,
    /// Raw u32, ignores the base
    Absolute32 = 7,
}

impl DeltaEncoding {
    /// Read this encoding's payload and apply it to `base`.
    ///
    /// Arithmetic wraps, as unsigned 64-bit machine arithmetic does.
    pub fn decode<R: Read>(self, reader: &mut R, base: u64) -> Result<u64> {
        let value = match self {
            Self::Absolute64 => reader.read_u64()?,
            Self::Increment => base.wrapping_add(1),
            Self::AddByte => base.wrapping_add(u64::from(reader.read_u8()?)),
            Self::SubByte => base.wrapping_sub(u64::from(reader.read_u8()?)),
            Self::AddWord => base.wrapping_add(u64::from(reader.read_u16()?)),
            Self::SubWord => base.wrapping_sub(u64::from(reader.read_u16()?)),
            Self::Absolute16 => u64::from(reader.read_u16()?),
            Self::Absolute32 => u64::from(reader.read_u32()?),
        };
        Ok(value)
    }

    /// Number of payload bytes following the tag for this encoding
    pub fn payload_len(self) -> usize {
        match self {
            Self::Absolute64 => 8,
            Self::Increment => 0,
            Self::AddByte | Self::SubByte => 1,
            Self::AddWord | Self::SubWord | Self::Absolute16 => 2,
            Self::Absolute32 => 4,
        }
    }
}

/// Decoded record tag byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordTag {
    pub id: DeltaEncoding,
    pub address: DeltaEncoding,
    pub scaled: bool,
}

impl RecordTag {
    const SCALED_FLAG: u8 = 0x8;

    pub fn parse(byte: u8) -> Result<Self> {
        let low = byte & 0x0F;
        let high = byte >> 4;

        let id = DeltaEncoding::from_repr(low).ok_or(Error::UnknownEncoding {
            field: "identifier",
            selector: low,
        })?;
        let address_selector = high & 0x7;
        let address = DeltaEncoding::from_repr(address_selector).ok_or(Error::UnknownEncoding {
            field: "address",
            selector: address_selector,
        })?;

        Ok(Self {
            id,
            address,
            scaled: high & Self::SCALED_FLAG != 0,
        })
    }
}

/// Delta base carried from one record to the next
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderState {
    pub previous_id: u64,
    pub previous_address: u64,
}

impl DecoderState {
    /// Decode the record that follows this state in the stream.
    pub fn decode_next<R: Read>(self, reader: &mut R, pointer_size: u64) -> Result<AddressRecord> {
        let tag = RecordTag::parse(reader.read_u8()?)?;

        let id = tag.id.decode(reader, self.previous_id)?;

        let base = if tag.scaled {
            self.previous_address / pointer_size
        } else {
            self.previous_address
        };
        let mut address = tag.address.decode(reader, base)?;
        if tag.scaled {
            address = address.wrapping_mul(pointer_size);
        }

        Ok(AddressRecord::new(id, address))
    }
}

impl From<AddressRecord> for DecoderState {
    fn from(record: AddressRecord) -> Self {
        Self {
            previous_id: record.id,
            previous_address: record.address,
        }
    }
}

/// Everything that follows the header
#[derive(Debug, Clone)]
pub struct RecordSection {
    pub pointer_size: u32,
    pub index: AddressIndex,
}

/// Read the pointer size, record count and every record into an index.
///
/// Records are folded strictly in stream order; the first malformed tag or
/// short read aborts the whole section.
fn initial_capacity(count: usize) -> usize {
    count.min(MAX_PREALLOCATED_RECORDS)
}

pub fn read_records<R: Read>(reader: &mut R) -> Result<RecordSection> {
    let pointer_size = reader.read_i32()?;
    if pointer_size <= 0 {
        return Err(Error::InvalidData(format!(
            "Pointer size must be positive, got {}",
            pointer_size
        )));
    }

    let count = reader.read_i32()?;
    if count < 0 {
        return Err(Error::InvalidData(format!(
            "Record count must not be negative, got {}",
            count
        )));
    }

    debug!("Decoding {} records (pointer size {})", count, pointer_size);

    let pointer_size = pointer_size as u32;
    let count = count as usize;
    let initial = (
        DecoderState::default(),
        AddressIndex::with_capacity(initial_capacity(count)),
    );

    let (_, index) = (0..count).try_fold(initial, |(state, mut index), _| {
        let record = state.decode_next(reader, u64::from(pointer_size))?;
        index.insert(record);
        Ok::<_, Error>((DecoderState::from(record), index))
    })?;

    debug!("Decoded {} distinct identifiers", index.len());

    Ok(RecordSection {
        pointer_size,
        index,
    })
}
