/*! Conversion from the high-level dialect to the low-level one.
 *
 * [`LlvmTypeConverter`] maps every type a lowered program may still carry to its llvm form. The
 * passes in [`passes`] use it while they replace structured `hl` operations by `ll` primitives:
 * functions, variables, control flow, address computations, and value categories.
 */

pub mod converter;
pub mod passes;
pub mod pipeline;

pub use converter::{ConversionFn, LlvmTypeConverter, SignatureConversion};
pub use passes::{
    EmitLazyRegions, FnArgsToAlloca, HlToLlArith, HlToLlCf, HlToLlFunc, HlToLlGeps, HlToLlVars,
    LowerValueCategories,
};

use strata_core::types::Type;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    #[error("cannot convert type `{0}`")]
    Type(Type),
    #[error("cannot convert signature of function `{0}`")]
    Signature(String),
    #[error("unknown record `{0}`")]
    UnknownRecord(String),
    #[error("record `{record}` has no field `{field}`")]
    UnknownField { record: String, field: String },
    #[error("`{0}` outside of a loop")]
    OutsideLoop(&'static str),
}
