use rustc_hash::FxHashSet;
use strata_core::ir::{Module, OpKind, Operation};
use strata_core::pass::{Pass, PassContext};
use strata_core::types::Type;

/// Unused declaration elimination.
///
/// Drops top-level typedefs, type declarations and records no type refers to, and body-less
/// function declarations nothing calls. Runs to a fixpoint: removing a typedef may leave the
/// record it named unused.
pub struct UnusedDeclElimination;

fn collect_names(ty: &Type, names: &mut FxHashSet<String>) {
    match ty {
        Type::Record(name) | Type::Typedef(name) => {
            names.insert(name.clone());
        }
        Type::Function(ft) => {
            for t in ft.inputs.iter().chain(&ft.results) {
                collect_names(t, names);
            }
        }
        other => {
            if let Some(inner) = other.element_type() {
                collect_names(inner, names);
            }
        }
    }
}

fn declared_name(op: &Operation) -> Option<&str> {
    match &op.kind {
        OpKind::TypeDecl { name } | OpKind::TypeDef { name, .. } | OpKind::RecordDef { name, .. } => {
            Some(name)
        }
        _ => None,
    }
}

fn is_declaration_only(op: &Operation) -> bool {
    matches!(op.kind, OpKind::HlFunc(_)) && op.regions.iter().all(|r| r.is_empty())
}

/// Type names and callees referenced by `op`, ignoring references a declaration makes to itself.
fn uses_of(op: &Operation, types: &mut FxHashSet<String>, callees: &mut FxHashSet<String>) {
    let mut names = FxHashSet::default();
    op.for_each_type(&mut |ty| collect_names(ty, &mut names));
    if let Some(own) = declared_name(op) {
        names.remove(own);
    }
    types.extend(names);

    op.walk(&mut |nested| {
        if let OpKind::Call { callee } | OpKind::BuiltinCall { name: callee } = &nested.kind {
            callees.insert(callee.clone());
        }
    });
}

impl Pass for UnusedDeclElimination {
    fn name(&self) -> &'static str {
        "ude"
    }

    fn description(&self) -> &'static str {
        "Remove declarations nothing refers to"
    }

    fn run_on_module(&mut self, module: &mut Module, _ctx: &mut PassContext) -> anyhow::Result<()> {
        let mut removed = 0;
        loop {
            let mut types = FxHashSet::default();
            let mut callees = FxHashSet::default();
            for op in module.ops() {
                uses_of(op, &mut types, &mut callees);
            }

            let before = module.body.ops.len();
            module.body.ops.retain(|op| {
                if let Some(name) = declared_name(op) {
                    return types.contains(name);
                }
                if is_declaration_only(op) {
                    return op
                        .kind
                        .func_attrs()
                        .is_some_and(|attrs| callees.contains(&attrs.name));
                }
                true
            });

            let round = before - module.body.ops.len();
            if round == 0 {
                break;
            }
            removed += round;
        }
        tracing::debug!(removed, "eliminated unused declarations");
        Ok(())
    }
}
