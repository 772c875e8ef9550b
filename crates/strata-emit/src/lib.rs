/*! Turn modules back into readable text.
 *
 * Every stage of a lowering is easier to check by reading it. The printer renders a module in an
 * MLIR-like generic form: one operation per line, nested regions indented, block labels and value
 * names shown the same way in every dialect.
 */

pub mod config;
pub mod emitter;
pub mod printer;

pub use config::{EmitterConfig, IndentStyle};
pub use emitter::{EmitContext, EmitHelper, EmitResult, Emitter};
pub use printer::ModulePrinter;
