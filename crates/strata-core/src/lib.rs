/*! Core IR types, builders and pipeline machinery for multi-level lowering.
 *
 * Lowering C-like programs toward machine form goes through several dialects, each closer to the
 * target than the last. This crate holds what every stage shares: one type system spanning all
 * dialects, the operation tree, declaration tables, diagnostics, and the step graph that turns
 * named pipelines into an ordered list of passes.
 */

pub mod builder;
pub mod data_layout;
pub mod diagnostics;
pub mod ir;
pub mod location;
pub mod maybe;
pub mod pass;
pub mod persist;
pub mod symbols;
pub mod type_context;
pub mod types;

pub use builder::{CodegenContext, InsertionGuard, OpBuilder, RecordDecl};
pub use data_layout::{DataLayoutBlueprint, DlEntry};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use ir::{Block, BlockId, Module, OpKind, Operation, Region, Value, ValueId};
pub use location::Location;
pub use maybe::{FromMaybe, Maybe};
pub use pass::{
    compose, pass, ConverterProfile, FailurePolicy, Pass, PassContext, PassManager, PassPlan,
    PipelineError, PipelineOptions, PipelineStep, StepBuilder, TargetInfo,
};
pub use symbols::{AlreadyDeclared, SymbolTable};
pub use type_context::{StructBody, TypeContext};
pub use types::{Dialect, FunctionType, Type, TypeKind};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IrError {
    #[error("Type error: {0}")]
    TypeError(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, IrError>;

#[cfg(test)]
mod tests;
