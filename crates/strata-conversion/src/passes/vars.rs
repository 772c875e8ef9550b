use strata_core::ir::{Block, Module, OpKind, Operation};
use strata_core::pass::{Pass, PassContext};

/// Splits `hl.var` into `ll.uninitialized_var` followed by the initializer and `ll.initialize`.
///
/// The variable keeps its result value, so uses need no rewriting. The initializer operations are
/// inlined in place and the value they yield is stored through `ll.initialize`.
pub struct HlToLlVars;

fn lower_var(mut op: Operation, out: &mut Vec<Operation>) {
    let OpKind::Var { name } = &op.kind else {
        out.push(op);
        return;
    };
    let name = name.clone();
    let location = op.location;
    let mut init = op.regions.first_mut().map(|r| r.take_ops()).unwrap_or_default();
    let var = op.result_id();

    let yielded = match init.last() {
        Some(last) if matches!(last.kind, OpKind::ValueYield) => {
            init.pop().and_then(|y| y.operands.first().copied())
        }
        _ => None,
    };

    out.push(Operation::new(OpKind::UninitializedVar { name }, location).with_results(op.results));
    out.extend(init);
    if let (Some(var), Some(value)) = (var, yielded) {
        out.push(Operation::new(OpKind::Initialize, location).with_operands(vec![var, value]));
    }
}

impl Pass for HlToLlVars {
    fn name(&self) -> &'static str {
        "hl-to-ll-vars"
    }

    fn description(&self) -> &'static str {
        "Split variable declarations into allocation and initialization"
    }

    fn run_on_module(&mut self, module: &mut Module, _ctx: &mut PassContext) -> anyhow::Result<()> {
        let mut lowered = 0;
        module.body.visit_blocks_mut(&mut |block: &mut Block| {
            if !block.ops.iter().any(|op| matches!(op.kind, OpKind::Var { .. })) {
                return;
            }
            let ops = std::mem::take(&mut block.ops);
            let mut out = Vec::with_capacity(ops.len());
            for op in ops {
                if matches!(op.kind, OpKind::Var { .. }) {
                    lowered += 1;
                }
                lower_var(op, &mut out);
            }
            block.ops = out;
        });
        tracing::debug!(lowered, "lowered variables");
        Ok(())
    }
}
