use crate::types::Type;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ValueId(pub u32);

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// An SSA value: an operation result or a block argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Value {
    pub id: ValueId,
    pub ty: Type,
}

impl Value {
    pub fn new(id: ValueId, ty: Type) -> Self {
        Self { id, ty }
    }
}

/// Hands out module-unique value ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueAllocator {
    next: u32,
}

impl ValueAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fresh(&mut self, ty: Type) -> Value {
        let id = ValueId(self.next);
        self.next += 1;
        Value::new(id, ty)
    }

    pub fn allocated(&self) -> u32 {
        self.next
    }
}
