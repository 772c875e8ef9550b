use pretty_assertions::assert_eq;
use strata::core::ir::{ArithOp, FieldDecl};
use strata::core::pass::{compose, ConverterProfile, PipelineStep};
use strata::core::types::IntegralKind;
use strata::core::persist::{load_module, save_module};
use strata::{
    Driver, EmitterConfig, FailurePolicy, FunctionType, Module, ModulePrinter, OpBuilder,
    PipelineError, PipelineOptions, PipelineRegistry, TargetDialect, Type,
};

/// `void f(int a, int b) { int r = a * b; }`
fn multiply() -> Module {
    let mut module = Module::new("mul.c");
    let mut b = OpBuilder::new(&mut module);
    b.func(
        "f",
        FunctionType::new(vec![Type::lvalue(Type::int()), Type::lvalue(Type::int())], vec![]),
        |b, args| {
            let (lhs, rhs) = (args[0], args[1]);
            b.var_init("r", Type::int(), |b| {
                let lhs = b.rvalue(lhs, Type::int());
                let rhs = b.rvalue(rhs, Type::int());
                let product = b.arith(ArithOp::Mul, lhs, rhs, Type::int());
                b.value_yield(product);
            });
        },
    );
    drop(b);
    module
}

fn with_record_argument() -> Module {
    let mut module = Module::new("record.c");
    let mut b = OpBuilder::new(&mut module);
    b.declare_record("s", vec![]);
    let record = Type::lvalue(Type::Record("s".to_string()));
    b.func("takes_s", FunctionType::new(vec![record], vec![]), |_, _| {});
    drop(b);
    module
}

#[test]
fn test_lower_to_llvm() {
    let mut module = multiply();
    let report = Driver::default()
        .lower_to(&mut module, TargetDialect::Llvm)
        .unwrap();
    assert!(report.is_success());

    let text = ModulePrinter::new(EmitterConfig::plain()).print(&module).unwrap();
    assert!(text.contains("ll.func @f : !llvm.func<!llvm.void (i32, i32)>"));
    assert!(text.contains("= ll.mul"));
    assert!(!text.contains("hl."));
}

#[test]
fn test_lower_to_std_keeps_hl_operations() {
    let mut module = multiply();
    let report = Driver::default()
        .lower_to(&mut module, TargetDialect::Std)
        .unwrap();
    assert!(report.is_success());
    assert_eq!(report.passes_run.last(), Some(&"hl-lower-types"));
    assert_eq!(module.function("f").unwrap().name(), "hl.func");
    assert!(!module.any_type(|t| matches!(t, Type::Integral { .. })));
}

#[test]
fn test_each_pass_runs_at_most_once() {
    let mut module = multiply();
    let report = Driver::default()
        .run_pipelines(&mut module, &["desugar", "stdtypes", "simplify", "to-ll", "stdtypes"])
        .unwrap();

    let mut seen = std::collections::HashSet::new();
    for name in &report.passes_run {
        assert!(seen.insert(*name), "{} ran twice", name);
    }
    let position = |name: &str| report.passes_run.iter().position(|p| *p == name).unwrap();
    assert!(position("lower-typedefs") < position("hl-lower-types"));
    assert!(position("hl-lower-types") < position("hl-to-ll-func"));
}

#[test]
fn test_unsupported_targets() {
    let mut module = multiply();
    for target in [TargetDialect::Cir, TargetDialect::Abi] {
        let err = Driver::default().lower_to(&mut module, target).unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedTarget(_)));
    }
    assert_eq!(module, multiply());
}

fn loop_a() -> PipelineStep {
    compose("loop-a", &[]).depends_on(loop_b)
}

fn loop_b() -> PipelineStep {
    compose("loop-b", &[]).depends_on(loop_a)
}

#[test]
fn test_cycle_is_reported_before_running() {
    let mut registry = PipelineRegistry::with_defaults();
    registry.register("loop", loop_a);
    let driver = Driver::with_registry(PipelineOptions::default(), registry);

    let mut module = multiply();
    let err = driver.run_pipelines(&mut module, &["simplify", "loop"]).unwrap_err();
    assert!(matches!(err, PipelineError::Cycle(_)));
    assert_eq!(module, multiply());
}

#[test]
fn test_halt_on_error_stops_after_failing_pass() {
    let options = PipelineOptions::default()
        .with_profile(ConverterProfile::Default)
        .with_policy(FailurePolicy::HaltOnError);
    let mut module = with_record_argument();
    let report = Driver::new(options).run_named(&mut module, "to-ll").unwrap();

    assert_eq!(report.halted_after, Some("hl-to-ll-func"));
    assert_eq!(report.passes_run.last(), Some(&"hl-to-ll-func"));
    assert!(!report.is_success());
}

#[test]
fn test_continue_runs_every_pass() {
    let options = PipelineOptions::default().with_profile(ConverterProfile::Default);
    let mut module = with_record_argument();
    let report = Driver::new(options).run_named(&mut module, "to-ll").unwrap();

    assert!(!report.halted());
    assert_eq!(report.passes_run.len(), 11);
    assert!(report.diagnostics.has_errors());
}

#[test]
fn test_statistics_follow_options() {
    let options = PipelineOptions::from_json(r#"{ "statistics": true }"#).unwrap();
    let mut module = multiply();
    let report = Driver::new(options)
        .lower_to(&mut module, TargetDialect::Llvm)
        .unwrap();
    assert_eq!(report.statistics.len(), report.passes_run.len());
    assert_eq!(report.statistics[0].name, report.passes_run[0]);

    let mut module = multiply();
    let report = Driver::default().run_named(&mut module, "simplify").unwrap();
    assert!(report.statistics.is_empty());
}

#[test]
fn test_report_carries_field_layouts() {
    let mut module = Module::new("point.c");
    let mut b = OpBuilder::new(&mut module);
    b.declare_record(
        "point",
        vec![
            FieldDecl {
                name: "x".to_string(),
                ty: Type::integral(IntegralKind::Short, false),
            },
            FieldDecl {
                name: "y".to_string(),
                ty: Type::int(),
            },
        ],
    );
    let point = Type::lvalue(Type::Record("point".to_string()));
    b.func("y", FunctionType::new(vec![point], vec![]), |b, args| {
        b.member(args[0], "y", Type::lvalue(Type::int()));
    });
    drop(b);

    let report = Driver::default()
        .lower_to(&mut module, TargetDialect::Llvm)
        .unwrap();
    assert!(report.is_success());
    assert_eq!(report.layout.get(&Type::Integer(16)).unwrap().byte_size, 2);
    assert_eq!(report.layout.get(&Type::Integer(32)).unwrap().abi_align, 4);
}

#[test]
fn test_saved_module_lowers_like_the_original() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mul.json");
    save_module(&multiply(), &path).unwrap();

    let mut original = multiply();
    let mut loaded = load_module(&path).unwrap();
    let driver = Driver::default();
    driver.lower_to(&mut original, TargetDialect::Llvm).unwrap();
    driver.lower_to(&mut loaded, TargetDialect::Llvm).unwrap();
    assert_eq!(loaded, original);
}
