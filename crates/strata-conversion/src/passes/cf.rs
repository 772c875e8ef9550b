use crate::ConversionError;
use strata_core::ir::{Block, BlockId, Module, OpKind, Operation, Region, ValueId};
use strata_core::location::Location;
use strata_core::pass::{Pass, PassContext};
use strata_core::types::Type;

/// Flattens structured control flow of function bodies into blocks and branches.
///
/// `hl.scope` bodies are inlined, `hl.if` and `hl.while` become conditional branches between new
/// blocks, `hl.break` and `hl.continue` jump to the exit and condition blocks of the innermost
/// loop, and `hl.return` becomes `ll.return`. A block left open at the end of a function returns
/// when the function returns nothing and is marked unreachable otherwise.
///
/// A function using `hl.break` or `hl.continue` outside of a loop is reported and left as it was.
pub struct HlToLlCf;

#[derive(Clone, Copy)]
struct LoopTargets {
    condition: BlockId,
    exit: BlockId,
}

struct Flattener {
    done: Vec<Block>,
    current: Block,
    next_id: u32,
    loops: Vec<LoopTargets>,
    /// Location of the operation that made lowering fail.
    fault: Location,
}

impl Flattener {
    fn new(entry: Block) -> Self {
        Self {
            done: Vec::new(),
            current: Block::with_args(BlockId(0), entry.args),
            next_id: 1,
            loops: Vec::new(),
            fault: Location::Unknown,
        }
    }

    fn reserve(&mut self) -> BlockId {
        let id = BlockId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Closes the current block and continues in a fresh block with the given id.
    fn switch_to(&mut self, id: BlockId) {
        let finished = std::mem::replace(&mut self.current, Block::new(id));
        self.done.push(finished);
    }

    fn branch(&mut self, dest: BlockId, location: Location) {
        if !self.current.is_terminated() {
            self.current
                .push(Operation::new(OpKind::Br { dest }, location));
        }
    }

    fn emit(&mut self, op: Operation) {
        if self.current.is_terminated() {
            let id = self.reserve();
            self.switch_to(id);
        }
        self.current.push(op);
    }

    fn lower_ops(&mut self, ops: Vec<Operation>) -> Result<(), ConversionError> {
        for op in ops {
            self.lower_op(op)?;
        }
        Ok(())
    }

    /// Lowers a condition region into the current block and returns the yielded condition.
    fn lower_condition(&mut self, region: Option<Region>) -> Result<Option<ValueId>, ConversionError> {
        let mut ops = region.map(|mut r| r.take_ops()).unwrap_or_default();
        let cond = match ops.last() {
            Some(last) if matches!(last.kind, OpKind::CondYield) => {
                ops.pop().and_then(|y| y.operands.first().copied())
            }
            _ => None,
        };
        self.lower_ops(ops)?;
        Ok(cond)
    }

    fn lower_op(&mut self, mut op: Operation) -> Result<(), ConversionError> {
        let location = op.location;
        match op.kind {
            OpKind::Scope => {
                let body = op.regions.first_mut().map(Region::take_ops).unwrap_or_default();
                self.lower_ops(body)
            }
            OpKind::If => {
                let mut regions = std::mem::take(&mut op.regions).into_iter();
                let cond = self.lower_condition(regions.next())?;
                let then_region = regions.next();
                let else_region = regions.next();

                let then_dest = self.reserve();
                let else_dest = else_region.as_ref().map(|_| self.reserve());
                let merge = self.reserve();
                self.emit(
                    Operation::new(
                        OpKind::CondBr {
                            then_dest,
                            else_dest: else_dest.unwrap_or(merge),
                        },
                        location,
                    )
                    .with_operands(cond.into_iter().collect()),
                );

                self.switch_to(then_dest);
                self.lower_ops(then_region.map(|mut r| r.take_ops()).unwrap_or_default())?;
                self.branch(merge, location);

                if let (Some(dest), Some(mut region)) = (else_dest, else_region) {
                    self.switch_to(dest);
                    self.lower_ops(region.take_ops())?;
                    self.branch(merge, location);
                }
                self.switch_to(merge);
                Ok(())
            }
            OpKind::While => {
                let mut regions = std::mem::take(&mut op.regions).into_iter();
                let cond_region = regions.next();
                let body_region = regions.next();

                let condition = self.reserve();
                let body = self.reserve();
                let exit = self.reserve();

                self.branch(condition, location);
                self.switch_to(condition);
                let cond = self.lower_condition(cond_region)?;
                self.current.push(
                    Operation::new(
                        OpKind::CondBr {
                            then_dest: body,
                            else_dest: exit,
                        },
                        location,
                    )
                    .with_operands(cond.into_iter().collect()),
                );

                self.switch_to(body);
                self.loops.push(LoopTargets { condition, exit });
                let lowered = self.lower_ops(body_region.map(|mut r| r.take_ops()).unwrap_or_default());
                self.loops.pop();
                lowered?;
                self.branch(condition, location);
                self.switch_to(exit);
                Ok(())
            }
            OpKind::Break => {
                let Some(target) = self.loops.last() else {
                    self.fault = location;
                    return Err(ConversionError::OutsideLoop("hl.break"));
                };
                let dest = target.exit;
                self.emit(Operation::new(OpKind::Br { dest }, location));
                Ok(())
            }
            OpKind::Continue => {
                let Some(target) = self.loops.last() else {
                    self.fault = location;
                    return Err(ConversionError::OutsideLoop("hl.continue"));
                };
                let dest = target.condition;
                self.emit(Operation::new(OpKind::Br { dest }, location));
                Ok(())
            }
            OpKind::Return => {
                op.kind = OpKind::LlReturn;
                self.emit(op);
                Ok(())
            }
            _ => {
                self.emit(op);
                Ok(())
            }
        }
    }

    fn finish(mut self, returns_void: bool, location: Location) -> Region {
        if !self.current.is_terminated() {
            let kind = if returns_void {
                OpKind::LlReturn
            } else {
                OpKind::Unreachable
            };
            self.current.push(Operation::new(kind, location));
        }
        self.done.push(self.current);
        Region {
            blocks: self.done,
        }
    }
}

fn returns_void(ty: &Type) -> bool {
    match ty {
        Type::LlvmFunction { result, .. } => result.is_void_like(),
        Type::Function(ft) => ft.results.iter().all(Type::is_void_like),
        _ => true,
    }
}

impl Pass for HlToLlCf {
    fn name(&self) -> &'static str {
        "hl-to-ll-cf"
    }

    fn description(&self) -> &'static str {
        "Flatten structured control flow into branches between blocks"
    }

    fn run_on_module(&mut self, module: &mut Module, ctx: &mut PassContext) -> anyhow::Result<()> {
        for func in module.functions_mut() {
            let Some(attrs) = func.kind.func_attrs() else {
                continue;
            };
            let void = returns_void(&attrs.ty);
            let name = attrs.name.clone();
            let Some(region) = func.regions.first_mut() else {
                continue;
            };
            let [entry] = region.blocks.as_slice() else {
                continue;
            };

            let mut entry = entry.clone();
            let ops = std::mem::take(&mut entry.ops);
            let mut flattener = Flattener::new(entry);
            if let Err(err) = flattener.lower_ops(ops) {
                tracing::debug!(function = %name, "control flow left structured");
                ctx.diagnostics.error(flattener.fault, err.to_string());
                continue;
            }
            *region = flattener.finish(void, func.location);
            tracing::debug!(function = %name, blocks = region.blocks.len(), "flattened control flow");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use strata_core::builder::OpBuilder;
    use strata_core::ir::Predicate;
    use strata_core::types::FunctionType;

    fn block_names(block: &Block) -> Vec<String> {
        block.ops.iter().map(|op| op.name()).collect()
    }

    fn lower(module: &mut Module) -> anyhow::Result<()> {
        HlToLlCf.run_on_module(module, &mut PassContext::default())
    }

    #[test]
    fn test_void_function_gets_trailing_return() {
        let mut module = Module::new("m");
        let mut b = OpBuilder::new(&mut module);
        b.func("f", FunctionType::new(vec![Type::Integer(32)], vec![]), |b, _| {
            b.scope(|b| {
                b.int(1, Type::Integer(32));
            });
        });
        drop(b);
        lower(&mut module).unwrap();

        let region = &module.function("f").unwrap().regions[0];
        assert_eq!(region.blocks.len(), 1);
        assert_eq!(region.blocks[0].args.len(), 1);
        assert_eq!(block_names(&region.blocks[0]), vec!["hl.const", "ll.return"]);
    }

    #[test]
    fn test_non_void_function_ends_unreachable() {
        let mut module = Module::new("m");
        let mut b = OpBuilder::new(&mut module);
        b.func("f", FunctionType::new(vec![], vec![Type::Integer(32)]), |b, _| {
            b.int(1, Type::Integer(32));
        });
        drop(b);
        lower(&mut module).unwrap();

        let entry = module.function("f").unwrap().regions[0].entry().unwrap();
        assert_eq!(block_names(entry), vec!["hl.const", "ll.unreachable"]);
    }

    #[test]
    fn test_if_else_branches_to_merge() {
        let mut module = Module::new("m");
        let mut b = OpBuilder::new(&mut module);
        b.func("f", FunctionType::new(vec![], vec![Type::Integer(32)]), |b, _| {
            let one = b.int(1, Type::Integer(32));
            b.if_else(
                |b| {
                    let c = b.cmp(Predicate::Eq, one, one, Type::Integer(1));
                    b.cond_yield(c);
                },
                |b| b.ret(Some(one)),
                |b| {
                    b.int(2, Type::Integer(32));
                },
            );
            b.ret(Some(one));
        });
        drop(b);
        lower(&mut module).unwrap();

        let region = &module.function("f").unwrap().regions[0];
        let ids: Vec<u32> = region.blocks.iter().map(|b| b.id.0).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        assert_eq!(block_names(&region.blocks[0]), vec!["hl.const", "hl.cmp", "ll.cond_br"]);
        assert_eq!(
            region.blocks[0].ops[2].kind,
            OpKind::CondBr {
                then_dest: BlockId(1),
                else_dest: BlockId(2)
            }
        );
        assert_eq!(block_names(&region.blocks[1]), vec!["ll.return"]);
        assert_eq!(block_names(&region.blocks[2]), vec!["hl.const", "ll.br"]);
        assert_eq!(block_names(&region.blocks[3]), vec!["ll.return"]);
    }

    #[test]
    fn test_loop_with_break_and_continue() {
        let mut module = Module::new("m");
        let mut b = OpBuilder::new(&mut module);
        b.func("f", FunctionType::new(vec![], vec![]), |b, _| {
            b.while_(
                |b| {
                    let t = b.int(1, Type::Integer(1));
                    b.cond_yield(t);
                },
                |b| {
                    b.if_(
                        |b| {
                            let t = b.int(0, Type::Integer(1));
                            b.cond_yield(t);
                        },
                        |b| b.break_(),
                    );
                    b.continue_();
                },
            );
        });
        drop(b);
        lower(&mut module).unwrap();

        let region = &module.function("f").unwrap().regions[0];
        // entry, cond, body, if-then, if-merge, exit
        let kinds: Vec<Vec<String>> = region.blocks.iter().map(block_names).collect();
        assert_eq!(
            kinds,
            vec![
                vec!["ll.br"],
                vec!["hl.const", "ll.cond_br"],
                vec!["hl.const", "ll.cond_br"],
                vec!["ll.br"],
                vec!["ll.br"],
                vec!["ll.return"],
            ]
        );
        let exit = region.blocks[5].id;
        let cond = region.blocks[1].id;
        assert_eq!(region.blocks[3].ops[0].kind, OpKind::Br { dest: exit });
        assert_eq!(region.blocks[4].ops[0].kind, OpKind::Br { dest: cond });
        assert_eq!(module.count_ops(|k| matches!(k, OpKind::While | OpKind::If)), 0);
    }

    #[test]
    fn test_break_outside_loop_is_reported_and_body_kept() {
        let mut module = Module::new("m");
        let mut b = OpBuilder::new(&mut module);
        b.func("f", FunctionType::new(vec![], vec![]), |b, _| {
            b.int(1, Type::Integer(32));
            b.break_();
        });
        b.func("g", FunctionType::new(vec![], vec![]), |b, _| {
            b.scope(|b| b.continue_());
        });
        b.func("h", FunctionType::new(vec![], vec![]), |b, _| {
            b.int(2, Type::Integer(32));
        });
        drop(b);

        let mut ctx = PassContext::default();
        HlToLlCf.run_on_module(&mut module, &mut ctx).unwrap();

        let messages: Vec<&str> = ctx.diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(
            messages,
            vec!["`hl.break` outside of a loop", "`hl.continue` outside of a loop"]
        );

        let f = &module.function("f").unwrap().regions[0];
        assert_eq!(f.blocks.len(), 1);
        assert_eq!(block_names(&f.blocks[0]), vec!["hl.const", "hl.break"]);
        let g = module.function("g").unwrap().regions[0].entry().unwrap();
        assert_eq!(block_names(g), vec!["hl.scope"]);

        let h = module.function("h").unwrap().regions[0].entry().unwrap();
        assert_eq!(block_names(h), vec!["hl.const", "ll.return"]);
    }
}
