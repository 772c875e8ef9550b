use strata_core::ir::Module;
use strata_core::pass::{Pass, PassContext, TargetInfo};
use strata_core::types::{FloatKind, FloatingKind, IntegralKind, MemRefType, Type};

/// Lowers `hl` scalar and array types to builtin types for the configured target.
///
/// Integers become signless `iN`, floating types become `fN`, `hl.void` becomes `none`. Directly
/// nested arrays fold into one multi-dimensional memref, outermost dimension first; an array of
/// unknown bound at any level makes the whole memref unranked.
pub struct HlLowerTypes;

pub fn lower_type(ty: &Type, target: &TargetInfo) -> Type {
    ty.rewrite(&mut |t| lower_one(t, target))
}

fn integer_width(kind: IntegralKind, target: &TargetInfo) -> u16 {
    match kind {
        IntegralKind::Char => target.char_width,
        IntegralKind::Short => target.short_width,
        IntegralKind::Int => target.int_width,
        IntegralKind::Long => target.long_width,
        IntegralKind::LongLong => target.long_long_width,
        IntegralKind::Int128 => target.int128_width,
    }
}

fn lower_one(ty: &Type, target: &TargetInfo) -> Option<Type> {
    match ty {
        Type::Void => Some(Type::None),
        Type::Bool => Some(Type::Integer(1)),
        Type::Integral { kind, .. } => Some(Type::Integer(integer_width(*kind, target))),
        Type::Floating(kind) => Some(Type::Float(match kind {
            FloatingKind::Half => FloatKind::F16,
            FloatingKind::Float => FloatKind::F32,
            FloatingKind::Double => FloatKind::F64,
            FloatingKind::LongDouble => target.long_double,
        })),
        Type::Array { element, size } => Some(match (&**element, size) {
            (Type::MemRef(inner), Some(size)) => Type::MemRef(MemRefType {
                element: inner.element.clone(),
                shape: inner.shape.as_ref().map(|shape| {
                    let mut dims = Vec::with_capacity(shape.len() + 1);
                    dims.push(*size);
                    dims.extend_from_slice(shape);
                    dims
                }),
            }),
            (Type::MemRef(inner), None) => Type::memref((*inner.element).clone(), None),
            (element, size) => Type::memref(element.clone(), size.map(|n| vec![n])),
        }),
        _ => None,
    }
}

impl Pass for HlLowerTypes {
    fn name(&self) -> &'static str {
        "hl-lower-types"
    }

    fn description(&self) -> &'static str {
        "Lower high-level scalar and array types to builtin types"
    }

    fn run_on_module(&mut self, module: &mut Module, ctx: &mut PassContext) -> anyhow::Result<()> {
        let target = ctx.options.target;
        module.rewrite_types(|t| lower_one(t, &target));
        Ok(())
    }
}
