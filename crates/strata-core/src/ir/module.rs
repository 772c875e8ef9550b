use super::operation::{OpKind, Operation};
use super::region::{Block, BlockId};
use super::value::{ValueAllocator, ValueId};
use crate::types::Type;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A translation unit: top-level declarations and functions, plus the value id space they share.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    pub body: Block,
    pub values: ValueAllocator,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: Block::new(BlockId(0)),
            values: ValueAllocator::new(),
        }
    }

    pub fn push(&mut self, op: Operation) {
        self.body.push(op);
    }

    pub fn ops(&self) -> &[Operation] {
        &self.body.ops
    }

    pub fn functions(&self) -> impl Iterator<Item = &Operation> {
        self.body.ops.iter().filter(|op| op.kind.is_function())
    }

    pub fn functions_mut(&mut self) -> impl Iterator<Item = &mut Operation> {
        self.body.ops.iter_mut().filter(|op| op.kind.is_function())
    }

    pub fn function(&self, name: &str) -> Option<&Operation> {
        self.functions()
            .find(|op| op.kind.func_attrs().is_some_and(|attrs| attrs.name == name))
    }

    pub fn walk<F: FnMut(&Operation)>(&self, f: &mut F) {
        self.body.walk(f);
    }

    pub fn walk_mut<F: FnMut(&mut Operation)>(&mut self, f: &mut F) {
        self.body.walk_mut(f);
    }

    pub fn for_each_type_mut<F: FnMut(&mut Type)>(&mut self, f: &mut F) {
        self.body.for_each_type_mut(f);
    }

    pub fn for_each_type<F: FnMut(&Type)>(&self, f: &mut F) {
        self.body.for_each_type(f);
    }

    /// Rewrites every type slot in the module through [`Type::rewrite`].
    pub fn rewrite_types<F>(&mut self, mut f: F)
    where
        F: FnMut(&Type) -> Option<Type>,
    {
        self.body.for_each_type_mut(&mut |ty| {
            *ty = ty.rewrite(&mut f);
        });
    }

    /// True if any type slot in the module contains a type matching `pred`.
    pub fn any_type<P: Fn(&Type) -> bool>(&self, pred: P) -> bool {
        let mut found = false;
        self.for_each_type(&mut |ty| found = found || ty.any(&pred));
        found
    }

    pub fn replace_all_uses(&mut self, substitutions: &FxHashMap<ValueId, ValueId>) {
        self.body.replace_all_uses(substitutions);
    }

    pub fn value_types(&self) -> FxHashMap<ValueId, Type> {
        self.body.value_types()
    }

    pub fn count_ops(&self, pred: impl Fn(&OpKind) -> bool) -> usize {
        let mut count = 0;
        self.walk(&mut |op| {
            if pred(&op.kind) {
                count += 1;
            }
        });
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{FuncAttrs, Linkage, Region};
    use crate::location::Location;

    fn sample() -> Module {
        let mut module = Module::new("m");
        let arg = module.values.fresh(Type::lvalue(Type::int()));
        let entry = Block::with_args(BlockId(0), vec![arg]);
        module.push(
            Operation::new(
                OpKind::HlFunc(FuncAttrs {
                    name: "f".to_string(),
                    ty: Type::function(vec![Type::lvalue(Type::int())], vec![]),
                    linkage: Linkage::External,
                }),
                Location::Unknown,
            )
            .with_regions(vec![Region::single(entry)]),
        );
        module
    }

    #[test]
    fn test_function_lookup() {
        let module = sample();
        assert!(module.function("f").is_some());
        assert!(module.function("g").is_none());
    }

    #[test]
    fn test_rewrite_types_reaches_attrs_and_block_args() {
        let mut module = sample();
        module.rewrite_types(|ty| match ty {
            Type::Integral { .. } => Some(Type::Integer(32)),
            _ => None,
        });
        assert!(!module.any_type(|t| matches!(t, Type::Integral { .. })));
        let types = module.value_types();
        assert_eq!(types[&ValueId(0)], Type::lvalue(Type::Integer(32)));
    }
}
