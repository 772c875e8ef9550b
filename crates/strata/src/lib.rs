/*! Unified interface for multi-level lowering.
 *
 * Single import for building modules, running named pipelines over them, and printing the result.
 * The [`Driver`] picks the pipelines that reach a requested [`TargetDialect`] and reports what ran
 * and what went wrong.
 */

pub mod driver;
pub mod registry;
pub mod target;

pub use strata_conversion as conversion;
pub use strata_core as core;
pub use strata_emit as emit;
pub use strata_hl as hl;

pub use strata_core::{
    builder::OpBuilder,
    diagnostics::{Diagnostic, Diagnostics, Severity},
    ir::{Block, BlockId, Module, OpKind, Operation, Region, Value, ValueId},
    location::Location,
    pass::{FailurePolicy, PipelineError, PipelineOptions},
    types::{FunctionType, Type},
};

pub use strata_conversion::LlvmTypeConverter;
pub use strata_emit::{EmitterConfig, ModulePrinter};

pub use driver::{Driver, PipelineReport};
pub use registry::PipelineRegistry;
pub use target::TargetDialect;
