use strata_core::ir::{Block, Module, OpKind};
use strata_core::pass::{Pass, PassContext};

/// Removes operations that follow a `hl.return`, `hl.break` or `hl.continue` in the same block.
pub struct DeadCodeElimination;

fn ends_control(kind: &OpKind) -> bool {
    matches!(kind, OpKind::Return | OpKind::Break | OpKind::Continue)
}

fn prune(block: &mut Block) -> usize {
    match block.ops.iter().position(|op| ends_control(&op.kind)) {
        Some(index) => {
            let removed = block.ops.len() - index - 1;
            block.ops.truncate(index + 1);
            removed
        }
        None => 0,
    }
}

impl Pass for DeadCodeElimination {
    fn name(&self) -> &'static str {
        "dce"
    }

    fn description(&self) -> &'static str {
        "Remove unreachable operations after early exits"
    }

    fn run_on_module(&mut self, module: &mut Module, _ctx: &mut PassContext) -> anyhow::Result<()> {
        let mut removed = 0;
        module
            .body
            .visit_blocks_mut(&mut |block| removed += prune(block));
        tracing::debug!(removed, "eliminated dead operations");
        Ok(())
    }
}
