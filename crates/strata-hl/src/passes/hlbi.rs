use strata_core::ir::{Module, OpKind};
use strata_core::pass::{Pass, PassContext};

const BUILTIN_PREFIX: &str = "__builtin_";

/// Moves calls of compiler builtins into the `hlbi` dialect.
pub struct HlToHlbi;

impl Pass for HlToHlbi {
    fn name(&self) -> &'static str {
        "hl-to-hlbi"
    }

    fn description(&self) -> &'static str {
        "Turn calls of __builtin_* functions into hlbi operations"
    }

    fn run_on_module(&mut self, module: &mut Module, _ctx: &mut PassContext) -> anyhow::Result<()> {
        let mut converted = 0;
        module.walk_mut(&mut |op| {
            if let OpKind::Call { callee } = &op.kind {
                if callee.starts_with(BUILTIN_PREFIX) {
                    op.kind = OpKind::BuiltinCall {
                        name: callee.clone(),
                    };
                    converted += 1;
                }
            }
        });
        tracing::debug!(converted, "lowered builtin calls");
        Ok(())
    }
}
