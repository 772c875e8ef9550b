use pretty_assertions::assert_eq;
use strata_core::ir::{Block, BlockId, FuncAttrs, Linkage, Module, OpKind, Operation, Region};
use strata_core::location::Location;
use strata_core::types::Type;
use strata_emit::{EmitterConfig, Emitter, ModulePrinter};

fn branchy() -> Module {
    let mut module = Module::new("cf.c");
    let cond = module.values.fresh(Type::Integer(1));
    let cond_id = cond.id;

    let mut entry = Block::with_args(BlockId(0), vec![cond]);
    entry.push(
        Operation::new(
            OpKind::CondBr {
                then_dest: BlockId(1),
                else_dest: BlockId(2),
            },
            Location::new(0, 3, 5),
        )
        .with_operands(vec![cond_id]),
    );
    let mut then_block = Block::new(BlockId(1));
    then_block.push(Operation::new(OpKind::Br { dest: BlockId(2) }, Location::Unknown));
    let mut exit = Block::new(BlockId(2));
    exit.push(Operation::new(OpKind::LlReturn, Location::Unknown));

    module.push(
        Operation::new(
            OpKind::LlFunc(FuncAttrs {
                name: "g".to_string(),
                ty: Type::LlvmFunction {
                    result: Box::new(Type::LlvmVoid),
                    params: vec![Type::Integer(1)],
                    variadic: false,
                },
                linkage: Linkage::Internal,
            }),
            Location::Unknown,
        )
        .with_regions(vec![Region {
            blocks: vec![entry, then_block, exit],
        }]),
    );
    module
}

#[test]
fn test_multi_block_region_has_labels() {
    let text = ModulePrinter::new(EmitterConfig::plain())
        .print(&branchy())
        .unwrap();
    let expected = [
        "module @\"cf.c\" {",
        "    ll.func @g : !llvm.func<!llvm.void (i1)> {",
        "    ^bb0(%0: i1):",
        "        ll.cond_br %0, ^bb1, ^bb2",
        "    ^bb1:",
        "        ll.br ^bb2",
        "    ^bb2:",
        "        ll.return",
        "    }",
        "}",
        "",
    ]
    .join("\n");
    assert_eq!(text, expected);
}

#[test]
fn test_locations_on_request() {
    let config = EmitterConfig {
        include_locations: true,
        ..EmitterConfig::plain()
    };
    let text = ModulePrinter::new(config).print(&branchy()).unwrap();
    assert!(text.contains("ll.cond_br %0, ^bb1, ^bb2 loc(0:3:5)"));
    assert!(!text.contains("loc(unknown)"));
}

#[test]
fn test_colored_output_keeps_text() {
    let printer = ModulePrinter::default();
    let text = printer.emit_to_string(&branchy()).unwrap();
    assert!(text.contains("ll.cond_br"));
    assert!(text.contains("^bb2"));
}
