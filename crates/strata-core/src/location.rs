use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque source position carried through lowering for diagnostics.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    #[default]
    Unknown,
    File { file_id: u32, line: u32, column: u32 },
    /// Location fused from an operation that was rewritten into several.
    Derived { file_id: u32, line: u32 },
}

impl Location {
    pub fn new(file_id: u32, line: u32, column: u32) -> Self {
        Location::File {
            file_id,
            line,
            column,
        }
    }

    #[inline]
    pub fn is_known(&self) -> bool {
        !matches!(self, Location::Unknown)
    }

    /// The location given to operations synthesized while rewriting one at `self`.
    pub fn derived(&self) -> Self {
        match *self {
            Location::File { file_id, line, .. } | Location::Derived { file_id, line } => {
                Location::Derived { file_id, line }
            }
            Location::Unknown => Location::Unknown,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Unknown => write!(f, "loc(unknown)"),
            Location::File {
                file_id,
                line,
                column,
            } => write!(f, "loc({}:{}:{})", file_id, line, column),
            Location::Derived { file_id, line } => write!(f, "loc({}:{}:*)", file_id, line),
        }
    }
}
