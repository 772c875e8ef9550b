use strata_core::ir::Module;
use strata_core::pass::{Pass, PassContext};
use strata_core::types::Type;

/// Strips `hl.elaborated` wrappers everywhere, leaving the named type they qualify.
pub struct LowerElaboratedTypes;

impl Pass for LowerElaboratedTypes {
    fn name(&self) -> &'static str {
        "lower-elaborated-types"
    }

    fn description(&self) -> &'static str {
        "Replace elaborated types by the types they name"
    }

    fn run_on_module(&mut self, module: &mut Module, _ctx: &mut PassContext) -> anyhow::Result<()> {
        module.rewrite_types(|ty| match ty {
            Type::Elaborated(inner) => Some((**inner).clone()),
            _ => None,
        });
        Ok(())
    }
}
