use strata_core::ir::{Block, Module, OpKind, Operation, ValueAllocator};
use strata_core::pass::{Pass, PassContext};

/// Materializes the operands of short-circuiting logical operators as lazy regions.
///
/// `hl.bin.land` and `hl.bin.lor` each become two `core.lazy.op`, one per operand region, whose
/// results feed `core.bin.land` / `core.bin.lor`. The logical result value is kept.
pub struct EmitLazyRegions;

fn lazy_kind(kind: &OpKind) -> Option<OpKind> {
    match kind {
        OpKind::LogicalAnd => Some(OpKind::LazyAnd),
        OpKind::LogicalOr => Some(OpKind::LazyOr),
        _ => None,
    }
}

fn emit_lazy(block: &mut Block, values: &mut ValueAllocator) -> usize {
    if !block.ops.iter().any(|op| lazy_kind(&op.kind).is_some()) {
        return 0;
    }
    let mut emitted = 0;
    let ops = std::mem::take(&mut block.ops);
    for mut op in ops {
        let Some(kind) = lazy_kind(&op.kind) else {
            block.ops.push(op);
            continue;
        };
        let Some(result) = op.results.first().cloned() else {
            block.ops.push(op);
            continue;
        };

        let mut operands = Vec::with_capacity(op.regions.len());
        for region in std::mem::take(&mut op.regions) {
            let value = values.fresh(result.ty.clone());
            operands.push(value.id);
            block.ops.push(
                Operation::new(OpKind::LazyOp, op.location)
                    .with_results(vec![value])
                    .with_regions(vec![region]),
            );
        }
        block.ops.push(
            Operation::new(kind, op.location)
                .with_operands(operands)
                .with_results(vec![result]),
        );
        emitted += 1;
    }
    emitted
}

impl Pass for EmitLazyRegions {
    fn name(&self) -> &'static str {
        "emit-lazy-regions"
    }

    fn description(&self) -> &'static str {
        "Turn operands of logical operators into lazily evaluated regions"
    }

    fn run_on_module(&mut self, module: &mut Module, _ctx: &mut PassContext) -> anyhow::Result<()> {
        let Module { body, values, .. } = module;
        let mut emitted = 0;
        body.visit_blocks_mut(&mut |block| emitted += emit_lazy(block, values));
        tracing::debug!(emitted, "emitted lazy logical operators");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use strata_core::builder::OpBuilder;
    use strata_core::types::{FunctionType, Type};

    #[test]
    fn test_logical_and_gets_two_lazy_operands() {
        let mut module = Module::new("m");
        let mut b = OpBuilder::new(&mut module);
        let mut land = None;
        b.func("f", FunctionType::new(vec![], vec![]), |b, _| {
            land = Some(b.logical(
                true,
                Type::Integer(1),
                |b| {
                    let t = b.int(1, Type::Integer(1));
                    b.value_yield(t);
                },
                |b| {
                    let f = b.int(0, Type::Integer(1));
                    b.value_yield(f);
                },
            ));
        });
        drop(b);

        EmitLazyRegions
            .run_on_module(&mut module, &mut PassContext::default())
            .unwrap();

        let body = module.function("f").unwrap().regions[0].entry().unwrap();
        let names: Vec<String> = body.ops.iter().map(|op| op.name()).collect();
        assert_eq!(names, vec!["core.lazy.op", "core.lazy.op", "core.bin.land"]);

        let lazy: Vec<_> = body.ops[..2].iter().map(|op| op.result_id().unwrap()).collect();
        assert_eq!(body.ops[2].operands, lazy);
        assert_eq!(body.ops[2].result_id(), land);
        assert_eq!(body.ops[0].regions[0].entry().unwrap().ops.len(), 2);
    }
}
