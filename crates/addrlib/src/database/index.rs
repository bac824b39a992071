use std::collections::HashMap;

use serde::Serialize;

use crate::error::{Error, Result};

/// One decoded identifier/address pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct AddressRecord {
    pub id: u64,
    pub address: u64,
}

impl AddressRecord {
    pub fn new(id: u64, address: u64) -> Self {
        Self { id, address }
    }
}

/// Identifier-to-address and address-to-identifier lookup tables.
///
/// Filled once while the database is decoded. When two records share a key
/// in either direction, the later record overwrites the earlier one.
#[derive(Debug, Clone, Default)]
pub struct AddressIndex {
    id_to_address: HashMap<u64, u64>,
    address_to_id: HashMap<u64, u64>,
}

impl AddressIndex {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            id_to_address: HashMap::with_capacity(capacity),
            address_to_id: HashMap::with_capacity(capacity),
        }
    }

    pub(crate) fn insert(&mut self, record: AddressRecord) {
        self.id_to_address.insert(record.id, record.address);
        self.address_to_id.insert(record.address, record.id);
    }

    pub fn address_of(&self, id: u64) -> Result<u64> {
        self.id_to_address
            .get(&id)
            .copied()
            .ok_or(Error::IdNotFound(id))
    }

    pub fn id_of(&self, address: u64) -> Result<u64> {
        self.address_to_id
            .get(&address)
            .copied()
            .ok_or(Error::AddressNotFound(address))
    }

    /// Number of distinct identifiers
    pub fn len(&self) -> usize {
        self.id_to_address.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_address.is_empty()
    }

    /// All identifier-keyed records, ordered by identifier
    pub fn records(&self) -> Vec<AddressRecord> {
        let mut records: Vec<AddressRecord> = self
            .id_to_address
            .iter()
            .map(|(&id, &address)| AddressRecord::new(id, address))
            .collect();
        records.sort_unstable_by_key(|r| r.id);
        records
    }
}
