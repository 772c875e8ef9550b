/*! High-level dialect passes.
 *
 * These passes keep the program in the `hl` dialect but remove the forms later stages refuse to
 * see: trailing scopes, dead code after early exits, unused declarations, typedef and elaborated
 * aliases, and finally the C scalar types themselves.
 */

pub mod passes;
pub mod pipeline;

pub use passes::{
    DeadCodeElimination, HlLowerTypes, HlToHlbi, LowerElaboratedTypes, LowerTypedefs,
    SpliceTrailingScopes, UnusedDeclElimination,
};
