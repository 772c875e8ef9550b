use crate::converter::LlvmTypeConverter;
use crate::passes::record_table;
use crate::ConversionError;
use strata_core::ir::{Module, OpKind};
use strata_core::location::Location;
use strata_core::pass::{Pass, PassContext};
use strata_core::types::Type;

/// Lowers member access and array subscripts to address computations.
///
/// `hl.member` becomes `ll.gep` carrying the field index and its byte offset in the converted
/// struct; `hl.subscript` becomes `ll.element_gep`. Result types are left to the value category
/// lowering.
pub struct HlToLlGeps;

impl Pass for HlToLlGeps {
    fn name(&self) -> &'static str {
        "hl-to-ll-geps"
    }

    fn description(&self) -> &'static str {
        "Lower member and subscript operations to address computations"
    }

    fn run_on_module(&mut self, module: &mut Module, ctx: &mut PassContext) -> anyhow::Result<()> {
        let records = record_table(module);
        let converter = LlvmTypeConverter::for_profile(ctx.options.profile, &ctx.types, &records);
        let value_types = module.value_types();
        let mut errors: Vec<(Location, ConversionError)> = Vec::new();

        module.walk_mut(&mut |op| {
            match &op.kind {
                OpKind::Subscript => {
                    op.kind = OpKind::ElementGep;
                    return;
                }
                OpKind::Member { .. } => {}
                _ => return,
            }
            let OpKind::Member { name: field } = &op.kind else {
                return;
            };
            let base = op.operands.first().and_then(|v| value_types.get(v));
            let record = match base.map(Type::rvalue) {
                Some(Type::Record(record)) => record.clone(),
                Some(other) => {
                    errors.push((op.location, ConversionError::Type(other.clone())));
                    return;
                }
                None => {
                    errors.push((op.location, ConversionError::UnknownRecord(field.clone())));
                    return;
                }
            };

            let Some(decl) = records.lookup(&record) else {
                errors.push((op.location, ConversionError::UnknownRecord(record)));
                return;
            };
            let Some(index) = decl.field_index(field) else {
                errors.push((
                    op.location,
                    ConversionError::UnknownField {
                        record,
                        field: field.clone(),
                    },
                ));
                return;
            };

            let record_ty = Type::Record(record);
            let identified = match converter.convert_type_to_type(&record_ty) {
                Some(Type::LlvmStruct(name)) => name,
                _ => {
                    errors.push((op.location, ConversionError::Type(record_ty)));
                    return;
                }
            };
            let Some(offset) = converter.types().field_offset(&identified, index) else {
                errors.push((op.location, ConversionError::Type(Type::LlvmStruct(identified))));
                return;
            };

            op.kind = OpKind::Gep {
                record: identified,
                field: index,
                offset,
            };
        });

        for (location, error) in errors {
            ctx.diagnostics.error(location, error.to_string());
        }
        Ok(())
    }
}
