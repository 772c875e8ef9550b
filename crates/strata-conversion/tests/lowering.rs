use pretty_assertions::assert_eq;
use strata_core::builder::OpBuilder;
use strata_core::ir::{ArithOp, FieldDecl, Module, OpKind, Operation, Predicate};
use strata_core::location::Location;
use strata_core::pass::{
    ConverterProfile, PassContext, PassManager, PassPlan, PipelineOptions, StepBuilder,
};
use strata_core::types::{Dialect, FunctionType, Type};
use strata_conversion::pipeline::to_ll;
use strata_hl::pipeline::simplify;

fn run(module: &mut Module, steps: &[StepBuilder], options: PipelineOptions) -> PassContext {
    let mut plan = PassPlan::new();
    for step in steps {
        plan.add(&step()).unwrap();
    }
    let mut ctx = PassContext::new(options);
    PassManager::new(plan).run(module, &mut ctx).unwrap();
    ctx
}

/// `void f(int a, int b) { int r = a * b; }`
fn multiply() -> Module {
    let mut module = Module::new("mul.c");
    let mut b = OpBuilder::new(&mut module);
    b.func(
        "f",
        FunctionType::new(vec![Type::lvalue(Type::int()), Type::lvalue(Type::int())], vec![]),
        |b, args| {
            let (a, rhs) = (args[0], args[1]);
            b.scope(|b| {
                b.var_init("r", Type::int(), |b| {
                    let lhs = b.rvalue(a, Type::int());
                    let rhs = b.rvalue(rhs, Type::int());
                    let product = b.arith(ArithOp::Mul, lhs, rhs, Type::int());
                    b.value_yield(product);
                });
            });
        },
    );
    drop(b);
    module
}

#[test]
fn test_multiply_lowers_to_ll() {
    let mut module = multiply();
    let ctx = run(&mut module, &[simplify, to_ll], PipelineOptions::default());
    assert!(ctx.diagnostics.is_empty());

    let f = module.function("f").unwrap();
    assert_eq!(f.name(), "ll.func");
    assert_eq!(
        f.kind.func_attrs().unwrap().ty,
        Type::LlvmFunction {
            result: Box::new(Type::LlvmVoid),
            params: vec![Type::Integer(32), Type::Integer(32)],
            variadic: false,
        }
    );

    let entry = f.regions[0].entry().unwrap();
    let names: Vec<String> = entry.ops.iter().map(|op| op.name()).collect();
    assert_eq!(
        names,
        vec![
            "ll.arg_alloca",
            "ll.arg_alloca",
            "ll.uninitialized_var",
            "ll.load",
            "ll.load",
            "ll.mul",
            "ll.store",
            "ll.return",
        ]
    );

    let r = &entry.ops[2];
    assert_eq!(r.results[0].ty, Type::llvm_ptr(Type::Integer(32)));
    assert_eq!(entry.ops[3].operands, vec![entry.ops[0].result_id().unwrap()]);
    assert_eq!(entry.ops[4].operands, vec![entry.ops[1].result_id().unwrap()]);
    assert_eq!(
        entry.ops[6].operands,
        vec![entry.ops[5].result_id().unwrap(), r.result_id().unwrap()]
    );

    assert!(!module.any_type(|t| matches!(t, Type::LValue(_) | Type::Decayed(_))));
    assert!(!module.any_type(Type::is_high_level));
}

#[test]
fn test_every_function_operation_leaves_hl() {
    let mut module = Module::new("loop.c");
    let mut b = OpBuilder::new(&mut module);
    b.func(
        "count",
        FunctionType::new(vec![Type::lvalue(Type::int())], vec![Type::int()]),
        |b, args| {
            let n = args[0];
            b.while_(
                |b| {
                    let current = b.rvalue(n, Type::int());
                    let zero = b.int(0, Type::int());
                    let more = b.cmp(Predicate::Sgt, current, zero, Type::Bool);
                    b.cond_yield(more);
                },
                |b| {
                    let current = b.rvalue(n, Type::int());
                    let one = b.int(1, Type::int());
                    let next = b.arith(ArithOp::Sub, current, one, Type::int());
                    b.assign(next, n);
                },
            );
            let done = b.rvalue(n, Type::int());
            b.ret(Some(done));
        },
    );
    drop(b);

    let ctx = run(&mut module, &[simplify, to_ll], PipelineOptions::default());
    assert!(ctx.diagnostics.is_empty());

    let region = &module.function("count").unwrap().regions[0];
    assert_eq!(region.blocks.len(), 4);
    let mut leftovers = Vec::new();
    for block in &region.blocks {
        for op in &block.ops {
            if op.kind.dialect() == Dialect::HighLevel && !matches!(op.kind, OpKind::Const(_)) {
                leftovers.push(op.name());
            }
        }
    }
    assert!(leftovers.is_empty(), "{:?}", leftovers);
    assert_eq!(module.count_ops(|k| matches!(k, OpKind::Store)), 1);
    assert_eq!(module.count_ops(|k| matches!(k, OpKind::LlReturn)), 1);
}

#[test]
fn test_member_access_uses_identified_struct_layout() {
    let mut module = Module::new("point.c");
    let mut b = OpBuilder::new(&mut module);
    b.declare_record(
        "point",
        vec![
            FieldDecl {
                name: "x".to_string(),
                ty: Type::int(),
            },
            FieldDecl {
                name: "y".to_string(),
                ty: Type::int(),
            },
        ],
    );
    let point = Type::Record("point".to_string());
    b.func(
        "get_y",
        FunctionType::new(vec![Type::lvalue(point)], vec![Type::int()]),
        |b, args| {
            let y = b.member(args[0], "y", Type::lvalue(Type::int()));
            let value = b.rvalue(y, Type::int());
            b.ret(Some(value));
        },
    );
    drop(b);

    let ctx = run(&mut module, &[to_ll], PipelineOptions::default());
    assert!(ctx.diagnostics.is_empty());

    let entry = module.function("get_y").unwrap().regions[0].entry().unwrap();
    assert_eq!(entry.args[0].ty, Type::LlvmStruct("point".to_string()));
    assert!(entry.ops.iter().any(|op| op.kind
        == OpKind::Gep {
            record: "point".to_string(),
            field: 1,
            offset: 4,
        }));
    let layout = ctx.types.layout_of(&Type::LlvmStruct("point".to_string()));
    assert_eq!(layout.unwrap().byte_size, 8);
}

#[test]
fn test_default_profile_reports_records_and_continues() {
    let mut module = Module::new("opaque.c");
    let mut b = OpBuilder::new(&mut module);
    b.declare_record("s", vec![]);
    let record = Type::lvalue(Type::Record("s".to_string()));
    b.func("uses_record", FunctionType::new(vec![record], vec![]), |_, _| {});
    b.func(
        "plain",
        FunctionType::new(vec![Type::lvalue(Type::int())], vec![]),
        |_, _| {},
    );
    drop(b);

    let options = PipelineOptions::default().with_profile(ConverterProfile::Default);
    let ctx = run(&mut module, &[to_ll], options);

    assert!(ctx.diagnostics.has_errors());
    assert_eq!(module.function("uses_record").unwrap().name(), "hl.func");
    assert_eq!(module.function("plain").unwrap().name(), "ll.func");
}

#[test]
fn test_redefined_record_is_reported_once() {
    let mut module = Module::new("redef.c");
    for ty in [Type::int(), Type::Bool] {
        module.push(Operation::new(
            OpKind::RecordDef {
                name: "S".to_string(),
                fields: vec![FieldDecl {
                    name: "v".to_string(),
                    ty,
                }],
            },
            Location::Unknown,
        ));
    }

    let ctx = run(&mut module, &[to_ll], PipelineOptions::default());
    let redefinitions: Vec<_> = ctx
        .diagnostics
        .iter()
        .filter(|d| d.message == "multiple record definitions with the same name `S`")
        .collect();
    assert_eq!(redefinitions.len(), 1);
    assert!(ctx.diagnostics.has_errors());
}
