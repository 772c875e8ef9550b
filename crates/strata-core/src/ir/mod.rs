/*! The operation tree shared by every dialect.
 *
 * A module is a block of top-level operations. Operations own regions, regions own blocks, blocks
 * own operations; values are plain ids with a type recorded at their definition. Passes rewrite this
 * tree in place.
 */

pub mod module;
pub mod operation;
pub mod region;
pub mod value;

pub use module::Module;
pub use operation::{
    ArithOp, CastKind, Constant, FieldDecl, FuncAttrs, Linkage, OpKind, Operation, Predicate,
};
pub use region::{Block, BlockId, Region};
pub use value::{Value, ValueAllocator, ValueId};
