use crate::converter::LlvmTypeConverter;
use crate::passes::record_table;
use crate::ConversionError;
use rustc_hash::{FxHashMap, FxHashSet};
use strata_core::diagnostics::Diagnostics;
use strata_core::ir::{Block, CastKind, Module, OpKind, Operation, ValueId};
use strata_core::location::Location;
use strata_core::pass::{Pass, PassContext};
use strata_core::types::Type;

/// Makes memory accesses explicit and retypes every value to the llvm type system.
///
/// Reading an lvalue becomes `ll.load`, assignment and initialization become `ll.store`. Since an
/// lvalue and a pointer to the same type convert to the same llvm pointer, `hl.deref` and
/// `hl.addressof` vanish and their results are replaced by their operands. Every block argument,
/// result and declared type is then converted; each type that does not convert is reported once.
pub struct LowerValueCategories;

fn lower_memory_ops(block: &mut Block, substitutions: &mut FxHashMap<ValueId, ValueId>) {
    block.ops.retain_mut(|op| {
        match op.kind {
            OpKind::ImplicitCast(CastKind::LValueToRValue)
            | OpKind::CStyleCast(CastKind::LValueToRValue) => op.kind = OpKind::Load,
            OpKind::Assign => op.kind = OpKind::Store,
            OpKind::Initialize => {
                op.kind = OpKind::Store;
                op.operands.reverse();
            }
            OpKind::Deref | OpKind::AddressOf => {
                if let (Some(result), Some(&operand)) = (op.result_id(), op.operands.first()) {
                    substitutions.insert(result, operand);
                    return false;
                }
            }
            _ => {}
        }
        true
    });
}

struct TypeLowering<'c, 'a> {
    converter: &'c LlvmTypeConverter<'a>,
    reported: FxHashSet<Type>,
    diagnostics: &'c mut Diagnostics,
}

impl TypeLowering<'_, '_> {
    fn convert(&mut self, ty: &mut Type, location: Location) {
        match self.converter.convert_type_to_type(ty) {
            Some(converted) => *ty = converted,
            None => {
                if self.reported.insert(ty.clone()) {
                    let error = ConversionError::Type(ty.clone());
                    self.diagnostics.error(location, error.to_string());
                }
            }
        }
    }

    fn convert_op(&mut self, op: &mut Operation) {
        let location = op.location;
        match &mut op.kind {
            OpKind::HlFunc(attrs) | OpKind::LlFunc(attrs) => self.convert(&mut attrs.ty, location),
            OpKind::RecordDef { fields, .. } => {
                for field in fields {
                    self.convert(&mut field.ty, location);
                }
            }
            OpKind::TypeDef { ty, .. } | OpKind::EnumDecl { ty, .. } => self.convert(ty, location),
            _ => {}
        }
        for result in &mut op.results {
            self.convert(&mut result.ty, location);
        }
        for region in &mut op.regions {
            for block in &mut region.blocks {
                self.convert_block(block, location);
            }
        }
    }

    fn convert_block(&mut self, block: &mut Block, location: Location) {
        for arg in &mut block.args {
            self.convert(&mut arg.ty, location);
        }
        for op in &mut block.ops {
            self.convert_op(op);
        }
    }
}

impl Pass for LowerValueCategories {
    fn name(&self) -> &'static str {
        "lower-value-categories"
    }

    fn description(&self) -> &'static str {
        "Lower lvalue reads and writes to loads and stores and convert all types"
    }

    fn run_on_module(&mut self, module: &mut Module, ctx: &mut PassContext) -> anyhow::Result<()> {
        let mut substitutions = FxHashMap::default();
        module
            .body
            .visit_blocks_mut(&mut |block| lower_memory_ops(block, &mut substitutions));
        module.replace_all_uses(&substitutions);

        let records = record_table(module);
        let converter = LlvmTypeConverter::for_profile(ctx.options.profile, &ctx.types, &records);
        let mut lowering = TypeLowering {
            converter: &converter,
            reported: FxHashSet::default(),
            diagnostics: &mut ctx.diagnostics,
        };
        for op in &mut module.body.ops {
            lowering.convert_op(op);
        }
        tracing::debug!(
            erased = substitutions.len(),
            unconverted = lowering.reported.len(),
            "lowered value categories"
        );
        Ok(())
    }
}
