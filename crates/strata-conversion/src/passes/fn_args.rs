use rustc_hash::FxHashMap;
use strata_core::ir::{Module, OpKind, Operation};
use strata_core::pass::{Pass, PassContext};

/// Gives every lvalue function argument its own storage.
///
/// The argument is passed by value; an `ll.arg_alloca` at the top of the entry block takes the
/// argument and yields the lvalue every former use now refers to.
pub struct FnArgsToAlloca;

impl Pass for FnArgsToAlloca {
    fn name(&self) -> &'static str {
        "fn-args-to-alloca"
    }

    fn description(&self) -> &'static str {
        "Spill lvalue function arguments to local storage"
    }

    fn run_on_module(&mut self, module: &mut Module, _ctx: &mut PassContext) -> anyhow::Result<()> {
        let Module { body, values, .. } = module;
        let mut spilled = 0;

        for func in body.ops.iter_mut().filter(|op| op.kind.is_function()) {
            let location = func.location;
            let Some(region) = func.regions.first_mut() else {
                continue;
            };
            let Some(entry) = region.entry_mut() else {
                continue;
            };

            let mut substitutions = FxHashMap::default();
            let mut allocas = Vec::new();
            for arg in entry.args.iter_mut().filter(|arg| arg.ty.is_lvalue()) {
                let storage = values.fresh(arg.ty.clone());
                if let Some(element) = arg.ty.element_type() {
                    arg.ty = element.clone();
                }
                substitutions.insert(arg.id, storage.id);
                allocas.push(
                    Operation::new(OpKind::ArgAlloca, location)
                        .with_operands(vec![arg.id])
                        .with_results(vec![storage]),
                );
            }
            if allocas.is_empty() {
                continue;
            }
            spilled += allocas.len();

            for block in &mut region.blocks {
                block.replace_all_uses(&substitutions);
            }
            if let Some(entry) = region.entry_mut() {
                entry.ops.splice(0..0, allocas);
            }
        }
        tracing::debug!(spilled, "spilled arguments");
        Ok(())
    }
}
