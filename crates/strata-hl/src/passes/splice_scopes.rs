use strata_core::ir::{Block, Module, OpKind};
use strata_core::pass::{Pass, PassContext};

/// Replaces a `hl.scope` that ends a block by the operations of its body.
///
/// Values are ids, not names, so dropping the scope boundary cannot change what an operand
/// refers to.
pub struct SpliceTrailingScopes;

impl SpliceTrailingScopes {
    fn splice(block: &mut Block) -> usize {
        let mut spliced = 0;
        while block
            .ops
            .last()
            .is_some_and(|op| op.kind == OpKind::Scope)
        {
            let Some(mut scope) = block.ops.pop() else {
                break;
            };
            for region in &mut scope.regions {
                block.ops.extend(region.take_ops());
            }
            spliced += 1;
        }
        spliced
    }
}

impl Pass for SpliceTrailingScopes {
    fn name(&self) -> &'static str {
        "splice-trailing-scopes"
    }

    fn description(&self) -> &'static str {
        "Inline scopes that end their enclosing block"
    }

    fn run_on_module(&mut self, module: &mut Module, _ctx: &mut PassContext) -> anyhow::Result<()> {
        let mut spliced = 0;
        module
            .body
            .visit_blocks_mut(&mut |block| spliced += Self::splice(block));
        tracing::debug!(spliced, "spliced trailing scopes");
        Ok(())
    }
}
