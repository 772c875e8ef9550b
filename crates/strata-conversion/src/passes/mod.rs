//! Passes of the `to-ll` pipeline.

pub mod arith;
pub mod cf;
pub mod fn_args;
pub mod func;
pub mod geps;
pub mod lazy;
pub mod value_categories;
pub mod vars;

pub use arith::HlToLlArith;
pub use cf::HlToLlCf;
pub use fn_args::FnArgsToAlloca;
pub use func::HlToLlFunc;
pub use geps::HlToLlGeps;
pub use lazy::EmitLazyRegions;
pub use value_categories::LowerValueCategories;
pub use vars::HlToLlVars;

use strata_core::builder::{CodegenContext, RecordDecl};
use strata_core::ir::Module;
use strata_core::symbols::SymbolTable;

/// Record declarations of `module`, detached so the module can be mutated while converting.
pub(crate) fn record_table(module: &Module) -> SymbolTable<RecordDecl> {
    CodegenContext::from_module(module).records
}
