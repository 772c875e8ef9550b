use crate::builder::OpBuilder;
use crate::ir::{ArithOp, CastKind, FieldDecl, Module, OpKind, Predicate};
use crate::location::Location;
use crate::types::{FunctionType, Type};
use pretty_assertions::assert_eq;

fn names(ops: &[crate::ir::Operation]) -> Vec<String> {
    ops.iter().map(|op| op.name()).collect()
}

#[test]
fn test_multiply_function_shape() {
    let mut module = Module::new("mul");
    let mut b = OpBuilder::new(&mut module);
    b.set_location(Location::new(1, 1, 1));
    let int = Type::int();
    b.func(
        "plus",
        FunctionType::new(vec![Type::lvalue(int.clone()), Type::lvalue(int.clone())], vec![]),
        |b, args| {
            let (lhs, rhs) = (args[0], args[1]);
            b.var_init("res", int.clone(), |b| {
                let l = b.rvalue(lhs, int.clone());
                let r = b.rvalue(rhs, int.clone());
                let product = b.arith(ArithOp::Mul, l, r, int.clone());
                b.value_yield(product);
            });
        },
    );
    drop(b);

    let func = module.function("plus").unwrap();
    let entry = func.regions[0].entry().unwrap();
    assert_eq!(names(&entry.ops), vec!["hl.var"]);

    let init = entry.ops[0].regions[0].entry().unwrap();
    assert_eq!(
        names(&init.ops),
        vec![
            "hl.implicit_cast",
            "hl.implicit_cast",
            "hl.mul",
            "hl.value.yield"
        ]
    );
    assert_eq!(entry.ops[0].results[0].ty, Type::lvalue(int));
    assert_eq!(entry.ops[0].location, Location::new(1, 1, 1));
}

#[test]
fn test_control_flow_regions() {
    let mut module = Module::new("cf");
    let mut b = OpBuilder::new(&mut module);
    b.func("loop", FunctionType::new(vec![], vec![]), |b, _| {
        let i = b.var("i", Type::int());
        b.while_(
            |b| {
                let v = b.rvalue(i, Type::int());
                let zero = b.int(0, Type::int());
                let c = b.cmp(Predicate::Ne, v, zero, Type::Bool);
                b.cond_yield(c);
            },
            |b| {
                b.if_else(
                    |b| {
                        let t = b.constant(crate::ir::Constant::Bool(true), Type::Bool);
                        b.cond_yield(t);
                    },
                    |b| b.break_(),
                    |b| b.continue_(),
                );
            },
        );
        b.ret(None);
    });
    drop(b);

    let body = module.function("loop").unwrap().regions[0].entry().unwrap();
    assert_eq!(names(&body.ops), vec!["hl.var", "hl.while", "hl.return"]);
    let while_op = &body.ops[1];
    assert_eq!(while_op.regions.len(), 2);
    let if_op = &while_op.regions[1].entry().unwrap().ops[0];
    assert_eq!(if_op.kind, OpKind::If);
    assert_eq!(if_op.regions.len(), 3);
}

#[test]
fn test_declarations_reported_once() {
    let mut module = Module::new("decls");
    let mut b = OpBuilder::new(&mut module);
    let fields = vec![FieldDecl {
        name: "x".to_string(),
        ty: Type::int(),
    }];
    assert!(b.declare_record("point", fields.clone()));
    assert!(!b.declare_record("point", fields));
    assert!(!b.declare_record(
        "point",
        vec![FieldDecl {
            name: "y".to_string(),
            ty: Type::Bool,
        }]
    ));
    assert!(b.define_type("size_t", Type::Integer(64)));
    assert!(!b.define_type("size_t", Type::Integer(32)));
    let ctx = b.into_context();

    let messages: Vec<_> = ctx.diagnostics.iter().map(|d| d.message.clone()).collect();
    assert_eq!(
        messages,
        vec![
            "multiple record definitions with the same name `point`".to_string(),
            "multiple type definitions with the same name `size_t`".to_string(),
        ]
    );
    assert_eq!(module.ops().len(), 2);
}

#[test]
fn test_context_rebuilt_from_module() {
    let mut module = Module::new("decls");
    let mut b = OpBuilder::new(&mut module);
    b.define_type("word", Type::Integer(32));
    b.declare_enum("flags", Type::int(), &[("A", 1), ("B", 2)]);
    drop(b);

    let ctx = crate::builder::CodegenContext::from_module(&module);
    assert_eq!(ctx.type_defs.lookup("word"), Some(&Type::Integer(32)));
    assert_eq!(ctx.enum_constants.lookup("B"), Some(&2));
    assert!(ctx.diagnostics.is_empty());
}

#[test]
fn test_value_ids_are_module_unique() {
    let mut module = Module::new("ids");
    let mut b = OpBuilder::new(&mut module);
    b.func(
        "f",
        FunctionType::new(vec![Type::lvalue(Type::int())], vec![Type::int()]),
        |b, args| {
            let v = b.rvalue(args[0], Type::int());
            let w = b.implicit_cast(v, CastKind::IntegralCast, Type::int());
            b.ret(Some(w));
        },
    );
    b.func("g", FunctionType::new(vec![], vec![]), |b, _| {
        b.int(7, Type::int());
    });
    drop(b);

    let types = module.value_types();
    assert_eq!(types.len(), 4);
    assert_eq!(module.values.allocated(), 4);
}
