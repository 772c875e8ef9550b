mod dce;
mod elaborated;
mod hlbi;
mod lower_types;
mod splice_scopes;
mod typedefs;
mod ude;

pub use dce::DeadCodeElimination;
pub use elaborated::LowerElaboratedTypes;
pub use hlbi::HlToHlbi;
pub use lower_types::{lower_type, HlLowerTypes};
pub use splice_scopes::SpliceTrailingScopes;
pub use typedefs::LowerTypedefs;
pub use ude::UnusedDeclElimination;
