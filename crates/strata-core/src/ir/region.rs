use super::operation::Operation;
use super::value::{Value, ValueId};
use crate::types::Type;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(pub u32);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "^bb{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    pub args: Vec<Value>,
    pub ops: Vec<Operation>,
}

impl Block {
    pub fn new(id: BlockId) -> Self {
        Self {
            id,
            args: Vec::new(),
            ops: Vec::new(),
        }
    }

    pub fn with_args(id: BlockId, args: Vec<Value>) -> Self {
        Self {
            id,
            args,
            ops: Vec::new(),
        }
    }

    pub fn push(&mut self, op: Operation) {
        self.ops.push(op);
    }

    pub fn terminator(&self) -> Option<&Operation> {
        self.ops.last().filter(|op| op.is_terminator())
    }

    pub fn is_terminated(&self) -> bool {
        self.terminator().is_some()
    }

    pub fn walk<F: FnMut(&Operation)>(&self, f: &mut F) {
        for op in &self.ops {
            op.walk(f);
        }
    }

    pub fn walk_mut<F: FnMut(&mut Operation)>(&mut self, f: &mut F) {
        for op in &mut self.ops {
            op.walk_mut(f);
        }
    }

    pub fn for_each_type_mut<F: FnMut(&mut Type)>(&mut self, f: &mut F) {
        for arg in &mut self.args {
            f(&mut arg.ty);
        }
        for op in &mut self.ops {
            op.for_each_type_mut(f);
        }
    }

    pub fn for_each_type<F: FnMut(&Type)>(&self, f: &mut F) {
        for arg in &self.args {
            f(&arg.ty);
        }
        for op in &self.ops {
            op.for_each_type(f);
        }
    }

    /// Applies `f` to every block of every region nested in this block, then to this block.
    pub fn visit_blocks_mut<F: FnMut(&mut Block)>(&mut self, f: &mut F) {
        for op in &mut self.ops {
            for region in &mut op.regions {
                for block in &mut region.blocks {
                    block.visit_blocks_mut(f);
                }
            }
        }
        f(self);
    }

    /// Rewrites operands through `substitutions`, following chains of replaced values.
    pub fn replace_all_uses(&mut self, substitutions: &FxHashMap<ValueId, ValueId>) {
        if substitutions.is_empty() {
            return;
        }
        self.walk_mut(&mut |op| {
            for operand in &mut op.operands {
                while let Some(replacement) = substitutions.get(operand) {
                    if replacement == operand {
                        break;
                    }
                    *operand = *replacement;
                }
            }
        });
    }

    /// Types of every value defined in this block and below.
    pub fn value_types(&self) -> FxHashMap<ValueId, Type> {
        let mut types = FxHashMap::default();
        self.collect_value_types(&mut types);
        types
    }

    fn collect_value_types(&self, types: &mut FxHashMap<ValueId, Type>) {
        for arg in &self.args {
            types.insert(arg.id, arg.ty.clone());
        }
        for op in &self.ops {
            for result in &op.results {
                types.insert(result.id, result.ty.clone());
            }
            for region in &op.regions {
                for block in &region.blocks {
                    block.collect_value_types(types);
                }
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub blocks: Vec<Block>,
}

impl Region {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(block: Block) -> Self {
        Self {
            blocks: vec![block],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn entry(&self) -> Option<&Block> {
        self.blocks.first()
    }

    pub fn entry_mut(&mut self) -> Option<&mut Block> {
        self.blocks.first_mut()
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn next_block_id(&self) -> BlockId {
        BlockId(self.blocks.iter().map(|b| b.id.0 + 1).max().unwrap_or(0))
    }

    pub fn walk<F: FnMut(&Operation)>(&self, f: &mut F) {
        for block in &self.blocks {
            block.walk(f);
        }
    }

    pub fn walk_mut<F: FnMut(&mut Operation)>(&mut self, f: &mut F) {
        for block in &mut self.blocks {
            block.walk_mut(f);
        }
    }

    pub fn for_each_type_mut<F: FnMut(&mut Type)>(&mut self, f: &mut F) {
        for block in &mut self.blocks {
            block.for_each_type_mut(f);
        }
    }

    pub fn for_each_type<F: FnMut(&Type)>(&self, f: &mut F) {
        for block in &self.blocks {
            block.for_each_type(f);
        }
    }

    /// Detaches the operations of a single-block region.
    pub fn take_ops(&mut self) -> Vec<Operation> {
        match self.blocks.first_mut() {
            Some(block) => std::mem::take(&mut block.ops),
            None => Vec::new(),
        }
    }
}
