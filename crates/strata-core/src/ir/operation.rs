use super::region::{BlockId, Region};
use super::value::{Value, ValueId};
use crate::location::Location;
use crate::types::{Dialect, Type};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Linkage {
    External,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FuncAttrs {
    pub name: String,
    /// `Type::Function` in `hl`, `Type::LlvmFunction` once lowered.
    pub ty: Type,
    pub linkage: Linkage,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    pub ty: Type,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CastKind {
    LValueToRValue,
    IntegralCast,
    IntegralToBoolean,
    IntegralToFloating,
    FloatingToIntegral,
    FloatingCast,
    ArrayToPointerDecay,
    FunctionToPointerDecay,
    NullToPointer,
    BitCast,
    NoOp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    SDiv,
    UDiv,
    SRem,
    URem,
    And,
    Or,
    Xor,
    Shl,
    AShr,
    LShr,
    FAdd,
    FSub,
    FMul,
    FDiv,
}

impl ArithOp {
    pub fn mnemonic(self) -> &'static str {
        match self {
            ArithOp::Add => "add",
            ArithOp::Sub => "sub",
            ArithOp::Mul => "mul",
            ArithOp::SDiv => "sdiv",
            ArithOp::UDiv => "udiv",
            ArithOp::SRem => "srem",
            ArithOp::URem => "urem",
            ArithOp::And => "and",
            ArithOp::Or => "or",
            ArithOp::Xor => "xor",
            ArithOp::Shl => "shl",
            ArithOp::AShr => "ashr",
            ArithOp::LShr => "lshr",
            ArithOp::FAdd => "fadd",
            ArithOp::FSub => "fsub",
            ArithOp::FMul => "fmul",
            ArithOp::FDiv => "fdiv",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Predicate {
    Eq,
    Ne,
    Slt,
    Sle,
    Sgt,
    Sge,
    Ult,
    Ule,
    Ugt,
    Uge,
}

impl Predicate {
    pub fn mnemonic(self) -> &'static str {
        match self {
            Predicate::Eq => "eq",
            Predicate::Ne => "ne",
            Predicate::Slt => "slt",
            Predicate::Sle => "sle",
            Predicate::Sgt => "sgt",
            Predicate::Sge => "sge",
            Predicate::Ult => "ult",
            Predicate::Ule => "ule",
            Predicate::Ugt => "ugt",
            Predicate::Uge => "uge",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Constant {
    Int(i128),
    Float(f64),
    Bool(bool),
    String(String),
}

/// Every operation of every dialect, with its attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OpKind {
    // hl declarations
    HlFunc(FuncAttrs),
    Var { name: String },
    TypeDecl { name: String },
    TypeDef { name: String, ty: Type },
    RecordDef { name: String, fields: Vec<FieldDecl> },
    EnumDecl { name: String, ty: Type },
    EnumConstant { name: String, value: i64 },

    // hl expressions
    Const(Constant),
    ImplicitCast(CastKind),
    CStyleCast(CastKind),
    Arith(ArithOp),
    Cmp(Predicate),
    Assign,
    Deref,
    AddressOf,
    Member { name: String },
    Subscript,
    Call { callee: String },
    LogicalAnd,
    LogicalOr,
    ValueYield,
    CondYield,

    // hl statements
    Return,
    Scope,
    If,
    While,
    Break,
    Continue,

    // hlbi
    BuiltinCall { name: String },

    // core
    LazyOp,
    LazyAnd,
    LazyOr,

    // ll
    LlFunc(FuncAttrs),
    UninitializedVar { name: String },
    Initialize,
    ArgAlloca,
    Load,
    Store,
    Gep { record: String, field: usize, offset: u64 },
    ElementGep,
    LlArith(ArithOp),
    LlCmp(Predicate),
    Br { dest: BlockId },
    CondBr { then_dest: BlockId, else_dest: BlockId },
    LlReturn,
    Unreachable,
}

impl OpKind {
    pub fn dialect(&self) -> Dialect {
        match self {
            OpKind::BuiltinCall { .. } => Dialect::HighLevelBuiltin,
            OpKind::LazyOp | OpKind::LazyAnd | OpKind::LazyOr => Dialect::Core,
            OpKind::LlFunc(_)
            | OpKind::UninitializedVar { .. }
            | OpKind::Initialize
            | OpKind::ArgAlloca
            | OpKind::Load
            | OpKind::Store
            | OpKind::Gep { .. }
            | OpKind::ElementGep
            | OpKind::LlArith(_)
            | OpKind::LlCmp(_)
            | OpKind::Br { .. }
            | OpKind::CondBr { .. }
            | OpKind::LlReturn
            | OpKind::Unreachable => Dialect::LowLevel,
            _ => Dialect::HighLevel,
        }
    }

    /// Fully qualified operation name, e.g. `hl.mul`.
    pub fn name(&self) -> String {
        let short = match self {
            OpKind::HlFunc(_) | OpKind::LlFunc(_) => "func",
            OpKind::Var { .. } => "var",
            OpKind::TypeDecl { .. } => "type",
            OpKind::TypeDef { .. } => "typedef",
            OpKind::RecordDef { .. } => "struct",
            OpKind::EnumDecl { .. } => "enum",
            OpKind::EnumConstant { .. } => "enum.const",
            OpKind::Const(_) => "const",
            OpKind::ImplicitCast(_) => "implicit_cast",
            OpKind::CStyleCast(_) => "cstyle_cast",
            OpKind::Arith(op) | OpKind::LlArith(op) => op.mnemonic(),
            OpKind::Cmp(_) | OpKind::LlCmp(_) => "cmp",
            OpKind::Assign => "assign",
            OpKind::Deref => "deref",
            OpKind::AddressOf => "addressof",
            OpKind::Member { .. } => "member",
            OpKind::Subscript => "subscript",
            OpKind::Call { .. } | OpKind::BuiltinCall { .. } => "call",
            OpKind::LogicalAnd | OpKind::LazyAnd => "bin.land",
            OpKind::LogicalOr | OpKind::LazyOr => "bin.lor",
            OpKind::ValueYield => "value.yield",
            OpKind::CondYield => "cond.yield",
            OpKind::Return | OpKind::LlReturn => "return",
            OpKind::Scope => "scope",
            OpKind::If => "if",
            OpKind::While => "while",
            OpKind::Break => "break",
            OpKind::Continue => "continue",
            OpKind::LazyOp => "lazy.op",
            OpKind::UninitializedVar { .. } => "uninitialized_var",
            OpKind::Initialize => "initialize",
            OpKind::ArgAlloca => "arg_alloca",
            OpKind::Load => "load",
            OpKind::Store => "store",
            OpKind::Gep { .. } => "gep",
            OpKind::ElementGep => "element_gep",
            OpKind::Br { .. } => "br",
            OpKind::CondBr { .. } => "cond_br",
            OpKind::Unreachable => "unreachable",
        };
        format!("{}.{}", self.dialect(), short)
    }

    /// Operations after which nothing in the same block can execute.
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            OpKind::Return
                | OpKind::Break
                | OpKind::Continue
                | OpKind::LlReturn
                | OpKind::Br { .. }
                | OpKind::CondBr { .. }
                | OpKind::Unreachable
        )
    }

    pub fn is_function(&self) -> bool {
        matches!(self, OpKind::HlFunc(_) | OpKind::LlFunc(_))
    }

    pub fn func_attrs(&self) -> Option<&FuncAttrs> {
        match self {
            OpKind::HlFunc(attrs) | OpKind::LlFunc(attrs) => Some(attrs),
            _ => None,
        }
    }

    fn for_each_type_mut<F: FnMut(&mut Type)>(&mut self, f: &mut F) {
        match self {
            OpKind::HlFunc(attrs) | OpKind::LlFunc(attrs) => f(&mut attrs.ty),
            OpKind::TypeDef { ty, .. } | OpKind::EnumDecl { ty, .. } => f(ty),
            OpKind::RecordDef { fields, .. } => fields.iter_mut().for_each(|field| f(&mut field.ty)),
            _ => {}
        }
    }

    fn for_each_type<F: FnMut(&Type)>(&self, f: &mut F) {
        match self {
            OpKind::HlFunc(attrs) | OpKind::LlFunc(attrs) => f(&attrs.ty),
            OpKind::TypeDef { ty, .. } | OpKind::EnumDecl { ty, .. } => f(ty),
            OpKind::RecordDef { fields, .. } => fields.iter().for_each(|field| f(&field.ty)),
            _ => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub kind: OpKind,
    pub operands: Vec<ValueId>,
    pub results: Vec<Value>,
    pub regions: Vec<Region>,
    pub location: Location,
}

impl Operation {
    pub fn new(kind: OpKind, location: Location) -> Self {
        Self {
            kind,
            operands: Vec::new(),
            results: Vec::new(),
            regions: Vec::new(),
            location,
        }
    }

    pub fn with_operands(mut self, operands: Vec<ValueId>) -> Self {
        self.operands = operands;
        self
    }

    pub fn with_results(mut self, results: Vec<Value>) -> Self {
        self.results = results;
        self
    }

    pub fn with_regions(mut self, regions: Vec<Region>) -> Self {
        self.regions = regions;
        self
    }

    pub fn name(&self) -> String {
        self.kind.name()
    }

    pub fn result(&self) -> Option<&Value> {
        self.results.first()
    }

    pub fn result_id(&self) -> Option<ValueId> {
        self.results.first().map(|v| v.id)
    }

    pub fn is_terminator(&self) -> bool {
        self.kind.is_terminator()
    }

    /// Pre-order walk over this operation and every operation nested in its regions.
    pub fn walk<F: FnMut(&Operation)>(&self, f: &mut F) {
        f(self);
        for region in &self.regions {
            region.walk(f);
        }
    }

    /// Post-order mutable walk: nested operations are visited before their parent.
    pub fn walk_mut<F: FnMut(&mut Operation)>(&mut self, f: &mut F) {
        for region in &mut self.regions {
            region.walk_mut(f);
        }
        f(self);
    }

    /// Visits every type slot of this operation and its regions.
    pub fn for_each_type_mut<F: FnMut(&mut Type)>(&mut self, f: &mut F) {
        self.kind.for_each_type_mut(f);
        for result in &mut self.results {
            f(&mut result.ty);
        }
        for region in &mut self.regions {
            region.for_each_type_mut(f);
        }
    }

    pub fn for_each_type<F: FnMut(&Type)>(&self, f: &mut F) {
        self.kind.for_each_type(f);
        for result in &self.results {
            f(&result.ty);
        }
        for region in &self.regions {
            region.for_each_type(f);
        }
    }
}
