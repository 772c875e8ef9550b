use anyhow::{bail, Result};
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use strata_core::ir::{Module, OpKind};
use strata_core::pass::{Pass, PassContext};
use strata_core::types::Type;
use strata_core::IrError;

/// Replaces every named typedef by the type it aliases and drops the `hl.typedef` operations.
pub struct LowerTypedefs;

/// Resolves typedef names through chains of aliases.
struct TypedefResolver {
    definitions: IndexMap<String, Type>,
    resolved: IndexMap<String, Type>,
}

impl TypedefResolver {
    fn collect(module: &Module) -> Self {
        let mut definitions = IndexMap::new();
        module.walk(&mut |op| {
            if let OpKind::TypeDef { name, ty } = &op.kind {
                definitions.entry(name.clone()).or_insert_with(|| ty.clone());
            }
        });
        Self {
            definitions,
            resolved: IndexMap::new(),
        }
    }

    fn resolve(&mut self, name: &str, visiting: &mut FxHashSet<String>) -> Result<Type> {
        if let Some(ty) = self.resolved.get(name) {
            return Ok(ty.clone());
        }
        let Some(definition) = self.definitions.get(name).cloned() else {
            return Err(IrError::TypeError(format!("unknown typedef `{}`", name)).into());
        };
        if !visiting.insert(name.to_string()) {
            bail!(IrError::TypeError(format!(
                "typedef `{}` refers to itself",
                name
            )));
        }

        let mut error = None;
        let ty = definition.rewrite(&mut |t| match t {
            Type::Typedef(inner) if error.is_none() => match self.resolve(inner, visiting) {
                Ok(resolved) => Some(resolved),
                Err(err) => {
                    error = Some(err);
                    None
                }
            },
            _ => None,
        });
        visiting.remove(name);
        if let Some(err) = error {
            return Err(err);
        }

        self.resolved.insert(name.to_string(), ty.clone());
        Ok(ty)
    }

    fn resolve_all(mut self) -> Result<IndexMap<String, Type>> {
        let names: Vec<String> = self.definitions.keys().cloned().collect();
        for name in names {
            self.resolve(&name, &mut FxHashSet::default())?;
        }
        Ok(self.resolved)
    }
}

impl Pass for LowerTypedefs {
    fn name(&self) -> &'static str {
        "lower-typedefs"
    }

    fn description(&self) -> &'static str {
        "Replace typedef names by the types they alias"
    }

    fn run_on_module(&mut self, module: &mut Module, _ctx: &mut PassContext) -> Result<()> {
        let resolved = TypedefResolver::collect(module).resolve_all()?;

        let mut unknown = None;
        module.rewrite_types(|ty| match ty {
            Type::Typedef(name) => match resolved.get(name) {
                Some(target) => Some(target.clone()),
                None => {
                    unknown.get_or_insert_with(|| name.clone());
                    None
                }
            },
            _ => None,
        });
        if let Some(name) = unknown {
            bail!(IrError::TypeError(format!("unknown typedef `{}`", name)));
        }

        module
            .body
            .visit_blocks_mut(&mut |block| {
                block.ops.retain(|op| !matches!(op.kind, OpKind::TypeDef { .. }))
            });
        tracing::debug!(typedefs = resolved.len(), "lowered typedefs");
        Ok(())
    }
}
