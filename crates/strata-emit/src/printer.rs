use crate::config::EmitterConfig;
use crate::emitter::{EmitContext, EmitHelper, EmitResult, Emitter};
use colored::Color;
use std::io::Write;
use strata_core::ir::{Block, Constant, Module, OpKind, Operation, Region, ValueId};

/// Prints a module in generic operation form.
///
/// ```text
/// module @"mul.c" {
///     ll.func @f : !llvm.func<!llvm.void (i32, i32)> {
///     ^bb0(%0: i32, %1: i32):
///         %4 = ll.arg_alloca %0 : !llvm.ptr<i32>
///     }
/// }
/// ```
pub struct ModulePrinter {
    config: EmitterConfig,
}

impl ModulePrinter {
    pub fn new(config: EmitterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    /// Renders `module` with this printer's configuration.
    pub fn print(&self, module: &Module) -> anyhow::Result<String> {
        let mut buffer = Vec::new();
        let mut context = EmitContext::from_config(&self.config);
        self.emit(module, &mut buffer, &mut context)?;
        Ok(String::from_utf8(buffer)?)
    }

    fn emit_region<W: Write>(
        &self,
        region: &Region,
        writer: &mut W,
        context: &mut EmitContext,
    ) -> EmitResult {
        let labelled = region.blocks.len() > 1;
        for block in &region.blocks {
            if labelled || !block.args.is_empty() {
                context.dedent();
                let label = self.block_label(block, context);
                EmitHelper::write_line(writer, context, &label)?;
                context.indent();
            }
            for op in &block.ops {
                self.emit_op(op, writer, context)?;
            }
        }
        Ok(())
    }

    fn block_label(&self, block: &Block, context: &EmitContext) -> String {
        let args: Vec<String> = block
            .args
            .iter()
            .map(|arg| format!("{}: {}", arg.id, self.paint_type(&arg.ty.to_string(), context)))
            .collect();
        let id = context.paint(&block.id.to_string(), Color::Magenta);
        if args.is_empty() {
            format!("{}:", id)
        } else {
            format!("{}({}):", id, args.join(", "))
        }
    }

    fn paint_type(&self, text: &str, context: &EmitContext) -> String {
        context.paint(text, Color::Yellow)
    }

    fn emit_op<W: Write>(
        &self,
        op: &Operation,
        writer: &mut W,
        context: &mut EmitContext,
    ) -> EmitResult {
        let mut line = String::new();
        if !op.results.is_empty() {
            line.push_str(&join_values(op.results.iter().map(|r| r.id)));
            line.push_str(" = ");
        }
        line.push_str(&context.paint(&op.name(), Color::Cyan));
        line.push_str(&self.attributes(&op.kind, context));
        if !op.operands.is_empty() {
            line.push(' ');
            line.push_str(&join_values(op.operands.iter().copied()));
        }
        line.push_str(&successors(&op.kind));

        if self.config.include_types && !op.results.is_empty() {
            let types: Vec<String> = op.results.iter().map(|r| r.ty.to_string()).collect();
            line.push_str(" : ");
            line.push_str(&self.paint_type(&types.join(", "), context));
        }
        if self.config.include_locations && op.location.is_known() {
            line.push(' ');
            line.push_str(&op.location.to_string());
        }

        if let OpKind::RecordDef { fields, .. } = &op.kind {
            if fields.is_empty() {
                return EmitHelper::write_line(writer, context, &line);
            }
            return EmitHelper::write_block(writer, context, &line, |w, c| {
                for field in fields {
                    let text = format!("{} : {}", field.name, self.paint_type(&field.ty.to_string(), c));
                    EmitHelper::write_line(w, c, &text)?;
                }
                Ok(())
            });
        }

        match op.regions.as_slice() {
            [] => EmitHelper::write_line(writer, context, &line),
            [region] => EmitHelper::write_block(writer, context, &line, |w, c| {
                self.emit_region(region, w, c)
            }),
            regions => {
                EmitHelper::write_line(writer, context, &format!("{} {{", line))?;
                for (i, region) in regions.iter().enumerate() {
                    context.indent();
                    self.emit_region(region, writer, context)?;
                    context.dedent();
                    let close = if i + 1 == regions.len() { "}" } else { "} {" };
                    EmitHelper::write_line(writer, context, close)?;
                }
                Ok(())
            }
        }
    }

    fn attributes(&self, kind: &OpKind, context: &EmitContext) -> String {
        let symbol = |name: &str| format!(" @{}", context.paint(name, Color::BrightBlue));
        match kind {
            OpKind::HlFunc(attrs) | OpKind::LlFunc(attrs) => format!(
                "{} : {}",
                symbol(&attrs.name),
                self.paint_type(&attrs.ty.to_string(), context)
            ),
            OpKind::Var { name }
            | OpKind::UninitializedVar { name }
            | OpKind::TypeDecl { name }
            | OpKind::RecordDef { name, .. } => symbol(name),
            OpKind::TypeDef { name, ty } => {
                format!("{} = {}", symbol(name), self.paint_type(&ty.to_string(), context))
            }
            OpKind::EnumDecl { name, ty } => {
                format!("{} : {}", symbol(name), self.paint_type(&ty.to_string(), context))
            }
            OpKind::EnumConstant { name, value } => format!("{} = {}", symbol(name), value),
            OpKind::Const(constant) => format!(" {}", format_constant(constant)),
            OpKind::ImplicitCast(cast) | OpKind::CStyleCast(cast) => format!(" {:?}", cast),
            OpKind::Cmp(pred) | OpKind::LlCmp(pred) => format!(" {}", pred.mnemonic()),
            OpKind::Member { name } => format!(" \"{}\"", name),
            OpKind::Call { callee } | OpKind::BuiltinCall { name: callee } => symbol(callee),
            OpKind::Gep {
                record,
                field,
                offset,
            } => format!("{}[{}] +{}", symbol(record), field, offset),
            _ => String::new(),
        }
    }
}

impl Default for ModulePrinter {
    fn default() -> Self {
        Self::new(EmitterConfig::default())
    }
}

impl Emitter for ModulePrinter {
    type Item = Module;

    fn emit<W: Write>(
        &self,
        module: &Module,
        writer: &mut W,
        context: &mut EmitContext,
    ) -> EmitResult {
        let header = format!("module @\"{}\"", module.name);
        EmitHelper::write_block(writer, context, &header, |w, c| {
            for op in module.ops() {
                self.emit_op(op, w, c)?;
            }
            Ok(())
        })
    }
}

fn join_values(values: impl Iterator<Item = ValueId>) -> String {
    values.map(|v| v.to_string()).collect::<Vec<_>>().join(", ")
}

fn successors(kind: &OpKind) -> String {
    match kind {
        OpKind::Br { dest } => format!(" {}", dest),
        OpKind::CondBr {
            then_dest,
            else_dest,
        } => format!(", {}, {}", then_dest, else_dest),
        _ => String::new(),
    }
}

fn format_constant(constant: &Constant) -> String {
    match constant {
        Constant::Int(v) => v.to_string(),
        Constant::Float(v) => format!("{:?}", v),
        Constant::Bool(v) => v.to_string(),
        Constant::String(s) => format!("{:?}", s),
    }
}
