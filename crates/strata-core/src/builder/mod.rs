/*! Construct IR without wiring ids and regions by hand.
 *
 * `OpBuilder` keeps an insertion stack: operations land in the innermost block under construction,
 * or at module top level when nothing is open. Regions are built inside closures; the insertion
 * point is saved by an `InsertionGuard` and restored when the guard goes away, whichever way the
 * closure exits.
 */

mod context;

pub use context::{CodegenContext, EnumDecl, RecordDecl};

use crate::ir::{
    ArithOp, Block, BlockId, CastKind, Constant, FieldDecl, FuncAttrs, Linkage, Module, OpKind,
    Operation, Predicate, Region, Value, ValueId,
};
use crate::location::Location;
use crate::types::{FunctionType, Type};
use std::ops::{Deref, DerefMut};

pub struct OpBuilder<'m> {
    module: &'m mut Module,
    stack: Vec<Block>,
    location: Location,
    context: CodegenContext,
}

/// Saved insertion point. Dropping it discards whatever was opened after it.
pub struct InsertionGuard<'b, 'm> {
    builder: &'b mut OpBuilder<'m>,
    depth: usize,
}

impl<'b, 'm> InsertionGuard<'b, 'm> {
    /// Closes the block opened by this guard and hands it back.
    pub fn finish(self) -> Block {
        let depth = self.depth;
        self.builder.stack.truncate(depth + 1);
        self.builder
            .stack
            .pop()
            .unwrap_or_else(|| Block::new(BlockId(0)))
    }
}

impl<'b, 'm> Deref for InsertionGuard<'b, 'm> {
    type Target = OpBuilder<'m>;

    fn deref(&self) -> &Self::Target {
        self.builder
    }
}

impl<'b, 'm> DerefMut for InsertionGuard<'b, 'm> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.builder
    }
}

impl Drop for InsertionGuard<'_, '_> {
    fn drop(&mut self) {
        self.builder.stack.truncate(self.depth);
    }
}

impl<'m> OpBuilder<'m> {
    pub fn new(module: &'m mut Module) -> Self {
        Self {
            module,
            stack: Vec::new(),
            location: Location::Unknown,
            context: CodegenContext::new(),
        }
    }

    pub fn set_location(&mut self, location: Location) {
        self.location = location;
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn context(&self) -> &CodegenContext {
        &self.context
    }

    pub fn into_context(self) -> CodegenContext {
        self.context
    }

    pub fn fresh(&mut self, ty: Type) -> Value {
        self.module.values.fresh(ty)
    }

    /// Number of blocks currently open.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn insert(&mut self, op: Operation) -> Option<ValueId> {
        let result = op.result_id();
        match self.stack.last_mut() {
            Some(block) => block.push(op),
            None => self.module.push(op),
        }
        result
    }

    /// Opens a new block with arguments of the given types.
    pub fn save_insertion_point(&mut self, arg_types: Vec<Type>) -> InsertionGuard<'_, 'm> {
        let args = arg_types.into_iter().map(|ty| self.fresh(ty)).collect();
        let depth = self.stack.len();
        self.stack.push(Block::with_args(BlockId(0), args));
        InsertionGuard {
            builder: self,
            depth,
        }
    }

    pub fn build_region<F>(&mut self, arg_types: Vec<Type>, body: F) -> Region
    where
        F: FnOnce(&mut OpBuilder<'m>, &[ValueId]),
    {
        let mut guard = self.save_insertion_point(arg_types);
        let args: Vec<ValueId> = guard
            .stack
            .last()
            .map(|b| b.args.iter().map(|a| a.id).collect())
            .unwrap_or_default();
        body(&mut *guard, &args);
        Region::single(guard.finish())
    }

    fn op(&self, kind: OpKind) -> Operation {
        Operation::new(kind, self.location)
    }

    fn insert_with_result(&mut self, kind: OpKind, operands: Vec<ValueId>, ty: Type) -> ValueId {
        let result = self.fresh(ty);
        let id = result.id;
        let op = self.op(kind).with_operands(operands).with_results(vec![result]);
        self.insert(op);
        id
    }

    fn insert_void(&mut self, kind: OpKind, operands: Vec<ValueId>) {
        let op = self.op(kind).with_operands(operands);
        self.insert(op);
    }

    // declarations

    /// Emits `hl.func`. Entry block arguments take the function's input types.
    pub fn func<F>(&mut self, name: &str, ty: FunctionType, body: F)
    where
        F: FnOnce(&mut OpBuilder<'m>, &[ValueId]),
    {
        let region = self.build_region(ty.inputs.clone(), body);
        let op = self
            .op(OpKind::HlFunc(FuncAttrs {
                name: name.to_string(),
                ty: Type::Function(ty),
                linkage: Linkage::External,
            }))
            .with_regions(vec![region]);
        self.insert(op);
    }

    /// Emits a body-less `hl.func` declaration.
    pub fn func_decl(&mut self, name: &str, ty: FunctionType) {
        let op = self.op(OpKind::HlFunc(FuncAttrs {
            name: name.to_string(),
            ty: Type::Function(ty),
            linkage: Linkage::External,
        }));
        self.insert(op);
    }

    /// Emits an uninitialized `hl.var` of type `lvalue<ty>`.
    pub fn var(&mut self, name: &str, ty: Type) -> ValueId {
        self.emit_var(name, ty, Vec::new())
    }

    /// Emits `hl.var` with an initializer region; `init` must end in `hl.value.yield`.
    pub fn var_init<F>(&mut self, name: &str, ty: Type, init: F) -> ValueId
    where
        F: FnOnce(&mut OpBuilder<'m>),
    {
        let region = self.build_region(Vec::new(), |b, _| init(b));
        self.emit_var(name, ty, vec![region])
    }

    fn emit_var(&mut self, name: &str, ty: Type, regions: Vec<Region>) -> ValueId {
        let result = self.fresh(Type::lvalue(ty));
        let id = result.id;
        let op = self
            .op(OpKind::Var {
                name: name.to_string(),
            })
            .with_results(vec![result])
            .with_regions(regions);
        self.insert(op);
        id
    }

    /// Emits `hl.type` unless the name is already declared.
    pub fn declare_type(&mut self, name: &str) -> bool {
        if self.context.type_decls.contains(name) {
            return false;
        }
        if self.context.type_decls.declare(name, self.location).is_err() {
            self.context.diagnostics.error(
                self.location,
                format!("multiple type declarations with the same name `{}`", name),
            );
            return false;
        }
        let op = self.op(OpKind::TypeDecl {
            name: name.to_string(),
        });
        self.insert(op);
        true
    }

    /// Emits `hl.typedef`; a conflicting redefinition is reported and the first one wins.
    pub fn define_type(&mut self, name: &str, ty: Type) -> bool {
        let loc = self.location;
        if !self.context.register_type_def(loc, name, &ty) {
            return false;
        }
        let op = self.op(OpKind::TypeDef {
            name: name.to_string(),
            ty,
        });
        self.insert(op);
        true
    }

    /// Emits `hl.struct`; a conflicting redefinition is reported and the first one wins.
    pub fn declare_record(&mut self, name: &str, fields: Vec<FieldDecl>) -> bool {
        let loc = self.location;
        if !self.context.register_record(loc, name, &fields) {
            return false;
        }
        let op = self.op(OpKind::RecordDef {
            name: name.to_string(),
            fields,
        });
        self.insert(op);
        true
    }

    /// Emits `hl.enum` with its constants. The operation is emitted even when the name clashes.
    pub fn declare_enum(&mut self, name: &str, ty: Type, constants: &[(&str, i64)]) {
        let loc = self.location;
        self.context.register_enum(loc, name, &ty);
        let region = self.build_region(Vec::new(), |b, _| {
            for (constant, value) in constants {
                b.declare_enum_constant(constant, *value);
            }
        });
        let op = self
            .op(OpKind::EnumDecl {
                name: name.to_string(),
                ty,
            })
            .with_regions(vec![region]);
        self.insert(op);
    }

    pub fn declare_enum_constant(&mut self, name: &str, value: i64) -> bool {
        let loc = self.location;
        if !self.context.register_enum_constant(loc, name, value) {
            return false;
        }
        let op = self.op(OpKind::EnumConstant {
            name: name.to_string(),
            value,
        });
        self.insert(op);
        true
    }

    // expressions

    pub fn constant(&mut self, value: Constant, ty: Type) -> ValueId {
        self.insert_with_result(OpKind::Const(value), Vec::new(), ty)
    }

    pub fn int(&mut self, value: i128, ty: Type) -> ValueId {
        self.constant(Constant::Int(value), ty)
    }

    pub fn implicit_cast(&mut self, value: ValueId, kind: CastKind, ty: Type) -> ValueId {
        self.insert_with_result(OpKind::ImplicitCast(kind), vec![value], ty)
    }

    pub fn cstyle_cast(&mut self, value: ValueId, kind: CastKind, ty: Type) -> ValueId {
        self.insert_with_result(OpKind::CStyleCast(kind), vec![value], ty)
    }

    /// Loads the value stored in an lvalue.
    pub fn rvalue(&mut self, lvalue: ValueId, ty: Type) -> ValueId {
        self.implicit_cast(lvalue, CastKind::LValueToRValue, ty)
    }

    pub fn arith(&mut self, op: ArithOp, lhs: ValueId, rhs: ValueId, ty: Type) -> ValueId {
        self.insert_with_result(OpKind::Arith(op), vec![lhs, rhs], ty)
    }

    pub fn cmp(&mut self, pred: Predicate, lhs: ValueId, rhs: ValueId, ty: Type) -> ValueId {
        self.insert_with_result(OpKind::Cmp(pred), vec![lhs, rhs], ty)
    }

    pub fn assign(&mut self, value: ValueId, dst: ValueId) {
        self.insert_void(OpKind::Assign, vec![value, dst]);
    }

    pub fn deref(&mut self, pointer: ValueId, ty: Type) -> ValueId {
        self.insert_with_result(OpKind::Deref, vec![pointer], ty)
    }

    pub fn address_of(&mut self, lvalue: ValueId, ty: Type) -> ValueId {
        self.insert_with_result(OpKind::AddressOf, vec![lvalue], ty)
    }

    pub fn member(&mut self, record: ValueId, field: &str, ty: Type) -> ValueId {
        self.insert_with_result(
            OpKind::Member {
                name: field.to_string(),
            },
            vec![record],
            ty,
        )
    }

    pub fn subscript(&mut self, array: ValueId, index: ValueId, ty: Type) -> ValueId {
        self.insert_with_result(OpKind::Subscript, vec![array, index], ty)
    }

    pub fn call(&mut self, callee: &str, args: Vec<ValueId>, results: Vec<Type>) -> Vec<ValueId> {
        let results: Vec<Value> = results.into_iter().map(|ty| self.fresh(ty)).collect();
        let ids = results.iter().map(|v| v.id).collect();
        let op = self
            .op(OpKind::Call {
                callee: callee.to_string(),
            })
            .with_operands(args)
            .with_results(results);
        self.insert(op);
        ids
    }

    /// Emits `hl.bin.land` / `hl.bin.lor` with one region per side.
    pub fn logical<L, R>(&mut self, and: bool, ty: Type, lhs: L, rhs: R) -> ValueId
    where
        L: FnOnce(&mut OpBuilder<'m>),
        R: FnOnce(&mut OpBuilder<'m>),
    {
        let lhs = self.build_region(Vec::new(), |b, _| lhs(b));
        let rhs = self.build_region(Vec::new(), |b, _| rhs(b));
        let result = self.fresh(ty);
        let id = result.id;
        let kind = if and {
            OpKind::LogicalAnd
        } else {
            OpKind::LogicalOr
        };
        let op = self
            .op(kind)
            .with_results(vec![result])
            .with_regions(vec![lhs, rhs]);
        self.insert(op);
        id
    }

    pub fn value_yield(&mut self, value: ValueId) {
        self.insert_void(OpKind::ValueYield, vec![value]);
    }

    pub fn cond_yield(&mut self, value: ValueId) {
        self.insert_void(OpKind::CondYield, vec![value]);
    }

    // statements

    pub fn ret(&mut self, value: Option<ValueId>) {
        self.insert_void(OpKind::Return, value.into_iter().collect());
    }

    pub fn scope<F>(&mut self, body: F)
    where
        F: FnOnce(&mut OpBuilder<'m>),
    {
        let region = self.build_region(Vec::new(), |b, _| body(b));
        let op = self.op(OpKind::Scope).with_regions(vec![region]);
        self.insert(op);
    }

    /// Emits `hl.if` without an else region. The condition region must end in `hl.cond.yield`.
    pub fn if_<C, T>(&mut self, cond: C, then: T)
    where
        C: FnOnce(&mut OpBuilder<'m>),
        T: FnOnce(&mut OpBuilder<'m>),
    {
        let regions = vec![
            self.build_region(Vec::new(), |b, _| cond(b)),
            self.build_region(Vec::new(), |b, _| then(b)),
        ];
        let op = self.op(OpKind::If).with_regions(regions);
        self.insert(op);
    }

    pub fn if_else<C, T, E>(&mut self, cond: C, then: T, otherwise: E)
    where
        C: FnOnce(&mut OpBuilder<'m>),
        T: FnOnce(&mut OpBuilder<'m>),
        E: FnOnce(&mut OpBuilder<'m>),
    {
        let regions = vec![
            self.build_region(Vec::new(), |b, _| cond(b)),
            self.build_region(Vec::new(), |b, _| then(b)),
            self.build_region(Vec::new(), |b, _| otherwise(b)),
        ];
        let op = self.op(OpKind::If).with_regions(regions);
        self.insert(op);
    }

    /// Emits `hl.while`. The condition region must end in `hl.cond.yield`.
    pub fn while_<C, B>(&mut self, cond: C, body: B)
    where
        C: FnOnce(&mut OpBuilder<'m>),
        B: FnOnce(&mut OpBuilder<'m>),
    {
        let regions = vec![
            self.build_region(Vec::new(), |b, _| cond(b)),
            self.build_region(Vec::new(), |b, _| body(b)),
        ];
        let op = self.op(OpKind::While).with_regions(regions);
        self.insert(op);
    }

    pub fn break_(&mut self) {
        self.insert_void(OpKind::Break, Vec::new());
    }

    pub fn continue_(&mut self) {
        self.insert_void(OpKind::Continue, Vec::new());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_body_lands_in_entry_block() {
        let mut module = Module::new("m");
        let mut b = OpBuilder::new(&mut module);
        b.func(
            "f",
            FunctionType::new(vec![Type::lvalue(Type::int())], vec![]),
            |b, args| {
                let v = b.rvalue(args[0], Type::int());
                b.ret(Some(v));
            },
        );
        assert_eq!(b.depth(), 0);
        drop(b);

        let func = module.function("f").unwrap();
        let entry = func.regions[0].entry().unwrap();
        assert_eq!(entry.args.len(), 1);
        assert_eq!(entry.ops.len(), 2);
        assert!(entry.is_terminated());
    }

    #[test]
    fn test_guard_restores_insertion_point_on_early_exit() {
        let mut module = Module::new("m");
        let mut b = OpBuilder::new(&mut module);

        fn build(b: &mut OpBuilder<'_>) -> Result<Block, ()> {
            let mut guard = b.save_insertion_point(Vec::new());
            guard.int(1, Type::int());
            let _nested = guard.save_insertion_point(Vec::new());
            Err(())
        }
        assert!(build(&mut b).is_err());
        assert_eq!(b.depth(), 0);

        b.int(2, Type::int());
        drop(b);
        assert_eq!(module.ops().len(), 1);
    }

    #[test]
    fn test_declare_type_is_lookup_first() {
        let mut module = Module::new("m");
        let mut b = OpBuilder::new(&mut module);
        assert!(b.declare_type("S"));
        assert!(!b.declare_type("S"));
        let ctx = b.into_context();
        assert!(ctx.diagnostics.is_empty());
        assert_eq!(module.ops().len(), 1);
    }

    #[test]
    fn test_enum_redeclaration_reports_but_emits() {
        let mut module = Module::new("m");
        let mut b = OpBuilder::new(&mut module);
        b.declare_enum("color", Type::int(), &[("RED", 0), ("GREEN", 1)]);
        b.declare_enum("color", Type::int(), &[("RED", 0)]);
        let ctx = b.into_context();
        assert_eq!(ctx.diagnostics.error_count(), 1);
        assert_eq!(module.ops().len(), 2);
        assert_eq!(ctx.enum_constants.lookup("GREEN"), Some(&1));
    }
}
