use strata_core::ir::{Module, OpKind};
use strata_core::pass::{Pass, PassContext};

/// Replaces `hl` arithmetic and comparisons by their `ll` counterparts.
pub struct HlToLlArith;

impl Pass for HlToLlArith {
    fn name(&self) -> &'static str {
        "hl-to-ll-arith"
    }

    fn description(&self) -> &'static str {
        "Lower arithmetic and comparison operations"
    }

    fn run_on_module(&mut self, module: &mut Module, _ctx: &mut PassContext) -> anyhow::Result<()> {
        let mut lowered = 0;
        module.walk_mut(&mut |op| {
            let kind = match op.kind {
                OpKind::Arith(arith) => OpKind::LlArith(arith),
                OpKind::Cmp(pred) => OpKind::LlCmp(pred),
                _ => return,
            };
            op.kind = kind;
            lowered += 1;
        });
        tracing::debug!(lowered, "lowered arithmetic");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use strata_core::builder::OpBuilder;
    use strata_core::ir::{ArithOp, Predicate};
    use strata_core::types::{FunctionType, Type};

    #[test]
    fn test_operands_and_results_are_kept() {
        let mut module = Module::new("m");
        let mut b = OpBuilder::new(&mut module);
        b.func("f", FunctionType::new(vec![], vec![]), |b, _| {
            let x = b.int(6, Type::Integer(32));
            let y = b.int(7, Type::Integer(32));
            let sum = b.arith(ArithOp::Add, x, y, Type::Integer(32));
            b.cmp(Predicate::Slt, sum, x, Type::Integer(1));
        });
        drop(b);

        HlToLlArith
            .run_on_module(&mut module, &mut PassContext::default())
            .unwrap();

        let body = module.function("f").unwrap().regions[0].entry().unwrap();
        let names: Vec<String> = body.ops.iter().map(|op| op.name()).collect();
        assert_eq!(names, vec!["hl.const", "hl.const", "ll.add", "ll.cmp"]);
        assert_eq!(body.ops[3].operands[0], body.ops[2].result_id().unwrap());
    }
}
