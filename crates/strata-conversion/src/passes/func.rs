use crate::converter::LlvmTypeConverter;
use crate::ConversionError;
use strata_core::builder::CodegenContext;
use strata_core::ir::{Module, OpKind};
use strata_core::pass::{Pass, PassContext};
use strata_core::types::Type;

/// Turns `hl.func` into `ll.func` with an llvm function type.
///
/// A function whose signature does not convert keeps its `hl` form and is reported. Conflicting
/// declarations in the module are reported here too, since this is the first pass that reads them.
pub struct HlToLlFunc;

impl Pass for HlToLlFunc {
    fn name(&self) -> &'static str {
        "hl-to-ll-func"
    }

    fn description(&self) -> &'static str {
        "Lower function operations and their signatures"
    }

    fn run_on_module(&mut self, module: &mut Module, ctx: &mut PassContext) -> anyhow::Result<()> {
        let declarations = CodegenContext::from_module(module);
        ctx.diagnostics.extend(declarations.diagnostics);
        let records = declarations.records;
        let converter = LlvmTypeConverter::for_profile(ctx.options.profile, &ctx.types, &records);
        let diagnostics = &mut ctx.diagnostics;

        let mut lowered = 0;
        for op in module.body.ops.iter_mut() {
            let OpKind::HlFunc(attrs) = &op.kind else {
                continue;
            };
            let signature_error = ConversionError::Signature(attrs.name.clone()).to_string();
            let Type::Function(ft) = &attrs.ty else {
                diagnostics.error(op.location, signature_error);
                continue;
            };
            match converter.convert_fn_t(ft).into_option() {
                Some(ty) => {
                    let mut attrs = attrs.clone();
                    attrs.ty = ty;
                    op.kind = OpKind::LlFunc(attrs);
                    lowered += 1;
                }
                None => {
                    tracing::debug!(function = %attrs.name, "signature does not convert");
                    diagnostics.error(op.location, signature_error);
                }
            }
        }
        tracing::debug!(lowered, "lowered functions");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use strata_core::builder::OpBuilder;
    use strata_core::ir::{FieldDecl, Operation};
    use strata_core::location::Location;
    use strata_core::types::FunctionType;

    #[test]
    fn test_signature_becomes_llvm_function() {
        let mut module = Module::new("m");
        let mut b = OpBuilder::new(&mut module);
        b.func_decl(
            "f",
            FunctionType::new(vec![Type::lvalue(Type::Integer(32))], vec![Type::Integer(64)]),
        );
        b.func_decl("g", FunctionType::new(vec![Type::memref(Type::Integer(8), None)], vec![]));
        drop(b);

        let mut ctx = PassContext::default();
        HlToLlFunc.run_on_module(&mut module, &mut ctx).unwrap();

        let f = module.function("f").unwrap();
        assert_eq!(f.name(), "ll.func");
        assert_eq!(
            f.kind.func_attrs().unwrap().ty,
            Type::LlvmFunction {
                result: Box::new(Type::Integer(64)),
                params: vec![Type::Integer(32)],
                variadic: false,
            }
        );

        assert_eq!(module.function("g").unwrap().name(), "hl.func");
        assert_eq!(ctx.diagnostics.error_count(), 1);
        assert_eq!(
            ctx.diagnostics.iter().next().unwrap().message,
            "cannot convert signature of function `g`"
        );
    }

    #[test]
    fn test_conflicting_record_definitions_are_reported() {
        let mut module = Module::new("m");
        let field = |ty| FieldDecl {
            name: "v".to_string(),
            ty,
        };
        module.push(Operation::new(
            OpKind::RecordDef {
                name: "S".to_string(),
                fields: vec![field(Type::Integer(32))],
            },
            Location::Unknown,
        ));
        module.push(Operation::new(
            OpKind::RecordDef {
                name: "S".to_string(),
                fields: vec![field(Type::Integer(1))],
            },
            Location::Unknown,
        ));
        let mut b = OpBuilder::new(&mut module);
        b.func_decl("f", FunctionType::new(vec![Type::Integer(32)], vec![]));
        drop(b);

        let mut ctx = PassContext::default();
        HlToLlFunc.run_on_module(&mut module, &mut ctx).unwrap();

        assert_eq!(ctx.diagnostics.error_count(), 1);
        assert_eq!(
            ctx.diagnostics.iter().next().unwrap().message,
            "multiple record definitions with the same name `S`"
        );
        assert_eq!(module.function("f").unwrap().name(), "ll.func");
    }
}
