use crate::types::Type;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Size record of one converted type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DlEntry {
    /// Allocation size, padding included.
    pub byte_size: u64,
    pub bit_size: u64,
    pub abi_align: u64,
}

impl DlEntry {
    pub fn new(byte_size: u64, bit_size: u64, abi_align: u64) -> Self {
        Self {
            byte_size,
            bit_size,
            abi_align,
        }
    }
}

impl fmt::Display for DlEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ {}, {} ]", self.byte_size, self.bit_size)
    }
}

/// Layout entries keyed by structural type equality, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataLayoutBlueprint {
    entries: IndexMap<Type, DlEntry>,
}

impl DataLayoutBlueprint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `entry` unless the type already has one. Returns true if inserted.
    pub fn try_emplace(&mut self, ty: Type, entry: DlEntry) -> bool {
        if self.entries.contains_key(&ty) {
            return false;
        }
        self.entries.insert(ty, entry);
        true
    }

    pub fn get(&self, ty: &Type) -> Option<&DlEntry> {
        self.entries.get(ty)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Type, &DlEntry)> {
        self.entries.iter()
    }
}

impl fmt::Display for DataLayoutBlueprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (ty, entry) in &self.entries {
            writeln!(f, "{} -> {}", ty, entry)?;
        }
        Ok(())
    }
}
