use cranelift_codegen::ir::types as clif_types;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dialect that owns a type or operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dialect {
    Builtin,
    HighLevel,
    HighLevelBuiltin,
    Core,
    LowLevel,
    Llvm,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dialect::Builtin => "builtin",
            Dialect::HighLevel => "hl",
            Dialect::HighLevelBuiltin => "hlbi",
            Dialect::Core => "core",
            Dialect::LowLevel => "ll",
            Dialect::Llvm => "llvm",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FloatKind {
    F16,
    BF16,
    F32,
    F64,
    F80,
    F128,
}

impl FloatKind {
    pub fn bits(self) -> u64 {
        match self {
            FloatKind::F16 | FloatKind::BF16 => 16,
            FloatKind::F32 => 32,
            FloatKind::F64 => 64,
            FloatKind::F80 => 80,
            FloatKind::F128 => 128,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntegralKind {
    Char,
    Short,
    Int,
    Long,
    LongLong,
    Int128,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FloatingKind {
    Half,
    Float,
    Double,
    LongDouble,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionType {
    pub inputs: Vec<Type>,
    pub results: Vec<Type>,
    pub variadic: bool,
}

impl FunctionType {
    pub fn new(inputs: Vec<Type>, results: Vec<Type>) -> Self {
        Self {
            inputs,
            results,
            variadic: false,
        }
    }

    pub fn variadic(mut self, variadic: bool) -> Self {
        self.variadic = variadic;
        self
    }
}

/// Multi-dimensional memory region. A `None` shape is unranked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemRefType {
    pub element: Box<Type>,
    pub shape: Option<Vec<u64>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    // builtin
    None,
    Integer(u16),
    Float(FloatKind),
    MemRef(MemRefType),
    Function(FunctionType),

    // hl
    Void,
    Bool,
    Integral { kind: IntegralKind, unsigned: bool },
    Floating(FloatingKind),
    Label,
    Decayed(Box<Type>),
    LValue(Box<Type>),
    Pointer(Box<Type>),
    Array { element: Box<Type>, size: Option<u64> },
    Record(String),
    Elaborated(Box<Type>),
    Typedef(String),

    // llvm
    LlvmVoid,
    LlvmPointer(Box<Type>),
    LlvmArray(Box<Type>, u64),
    LlvmStruct(String),
    LlvmFunction {
        result: Box<Type>,
        params: Vec<Type>,
        variadic: bool,
    },
}

/// Structural discriminant of [`Type`], the registry key of type converters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TypeKind {
    None,
    Integer,
    Float,
    MemRef,
    UnrankedMemRef,
    Function,
    Void,
    Bool,
    Integral,
    Floating,
    Label,
    Decayed,
    LValue,
    Pointer,
    Array,
    Record,
    Elaborated,
    Typedef,
    LlvmVoid,
    LlvmPointer,
    LlvmArray,
    LlvmStruct,
    LlvmFunction,
}

impl Type {
    pub fn int() -> Self {
        Type::Integral {
            kind: IntegralKind::Int,
            unsigned: false,
        }
    }

    pub fn integral(kind: IntegralKind, unsigned: bool) -> Self {
        Type::Integral { kind, unsigned }
    }

    pub fn lvalue(inner: Type) -> Self {
        Type::LValue(Box::new(inner))
    }

    pub fn pointer(inner: Type) -> Self {
        Type::Pointer(Box::new(inner))
    }

    pub fn decayed(inner: Type) -> Self {
        Type::Decayed(Box::new(inner))
    }

    pub fn elaborated(inner: Type) -> Self {
        Type::Elaborated(Box::new(inner))
    }

    pub fn array(element: Type, size: Option<u64>) -> Self {
        Type::Array {
            element: Box::new(element),
            size,
        }
    }

    pub fn memref(element: Type, shape: Option<Vec<u64>>) -> Self {
        Type::MemRef(MemRefType {
            element: Box::new(element),
            shape,
        })
    }

    pub fn function(inputs: Vec<Type>, results: Vec<Type>) -> Self {
        Type::Function(FunctionType::new(inputs, results))
    }

    pub fn llvm_ptr(inner: Type) -> Self {
        Type::LlvmPointer(Box::new(inner))
    }

    pub fn llvm_array(element: Type, size: u64) -> Self {
        Type::LlvmArray(Box::new(element), size)
    }

    pub fn kind(&self) -> TypeKind {
        match self {
            Type::None => TypeKind::None,
            Type::Integer(_) => TypeKind::Integer,
            Type::Float(_) => TypeKind::Float,
            Type::MemRef(m) if m.shape.is_some() => TypeKind::MemRef,
            Type::MemRef(_) => TypeKind::UnrankedMemRef,
            Type::Function(_) => TypeKind::Function,
            Type::Void => TypeKind::Void,
            Type::Bool => TypeKind::Bool,
            Type::Integral { .. } => TypeKind::Integral,
            Type::Floating(_) => TypeKind::Floating,
            Type::Label => TypeKind::Label,
            Type::Decayed(_) => TypeKind::Decayed,
            Type::LValue(_) => TypeKind::LValue,
            Type::Pointer(_) => TypeKind::Pointer,
            Type::Array { .. } => TypeKind::Array,
            Type::Record(_) => TypeKind::Record,
            Type::Elaborated(_) => TypeKind::Elaborated,
            Type::Typedef(_) => TypeKind::Typedef,
            Type::LlvmVoid => TypeKind::LlvmVoid,
            Type::LlvmPointer(_) => TypeKind::LlvmPointer,
            Type::LlvmArray(..) => TypeKind::LlvmArray,
            Type::LlvmStruct(_) => TypeKind::LlvmStruct,
            Type::LlvmFunction { .. } => TypeKind::LlvmFunction,
        }
    }

    pub fn dialect(&self) -> Dialect {
        match self.kind() {
            TypeKind::None
            | TypeKind::Integer
            | TypeKind::Float
            | TypeKind::MemRef
            | TypeKind::UnrankedMemRef
            | TypeKind::Function => Dialect::Builtin,
            TypeKind::LlvmVoid
            | TypeKind::LlvmPointer
            | TypeKind::LlvmArray
            | TypeKind::LlvmStruct
            | TypeKind::LlvmFunction => Dialect::Llvm,
            _ => Dialect::HighLevel,
        }
    }

    /// Inner type of single-element wrappers (lvalue, pointer, decayed, elaborated, arrays).
    pub fn element_type(&self) -> Option<&Type> {
        match self {
            Type::Decayed(inner)
            | Type::LValue(inner)
            | Type::Pointer(inner)
            | Type::Elaborated(inner)
            | Type::LlvmPointer(inner)
            | Type::LlvmArray(inner, _) => Some(inner),
            Type::Array { element, .. } => Some(element),
            Type::MemRef(m) => Some(&m.element),
            _ => None,
        }
    }

    pub fn is_lvalue(&self) -> bool {
        matches!(self, Type::LValue(_))
    }

    pub fn is_void_like(&self) -> bool {
        matches!(self, Type::None | Type::Void | Type::LlvmVoid)
    }

    pub fn is_high_level(&self) -> bool {
        self.dialect() == Dialect::HighLevel
    }

    /// Unwraps an lvalue to the type of the stored value.
    pub fn rvalue(&self) -> &Type {
        match self {
            Type::LValue(inner) => inner,
            other => other,
        }
    }

    /// Rebuilds the type bottom-up; `f` may replace any rebuilt node.
    pub fn rewrite<F>(&self, f: &mut F) -> Type
    where
        F: FnMut(&Type) -> Option<Type>,
    {
        let rebuilt = match self {
            Type::MemRef(m) => Type::MemRef(MemRefType {
                element: Box::new(m.element.rewrite(f)),
                shape: m.shape.clone(),
            }),
            Type::Function(ft) => Type::Function(FunctionType {
                inputs: ft.inputs.iter().map(|t| t.rewrite(f)).collect(),
                results: ft.results.iter().map(|t| t.rewrite(f)).collect(),
                variadic: ft.variadic,
            }),
            Type::Decayed(inner) => Type::Decayed(Box::new(inner.rewrite(f))),
            Type::LValue(inner) => Type::LValue(Box::new(inner.rewrite(f))),
            Type::Pointer(inner) => Type::Pointer(Box::new(inner.rewrite(f))),
            Type::Elaborated(inner) => Type::Elaborated(Box::new(inner.rewrite(f))),
            Type::Array { element, size } => Type::Array {
                element: Box::new(element.rewrite(f)),
                size: *size,
            },
            Type::LlvmPointer(inner) => Type::LlvmPointer(Box::new(inner.rewrite(f))),
            Type::LlvmArray(inner, n) => Type::LlvmArray(Box::new(inner.rewrite(f)), *n),
            Type::LlvmFunction {
                result,
                params,
                variadic,
            } => Type::LlvmFunction {
                result: Box::new(result.rewrite(f)),
                params: params.iter().map(|t| t.rewrite(f)).collect(),
                variadic: *variadic,
            },
            leaf => leaf.clone(),
        };
        f(&rebuilt).unwrap_or(rebuilt)
    }

    /// True if `pred` holds for this type or any type nested in it.
    pub fn any<P>(&self, pred: &P) -> bool
    where
        P: Fn(&Type) -> bool,
    {
        if pred(self) {
            return true;
        }
        match self {
            Type::Function(ft) => ft
                .inputs
                .iter()
                .chain(ft.results.iter())
                .any(|t| t.any(pred)),
            Type::LlvmFunction { result, params, .. } => {
                result.any(pred) || params.iter().any(|t| t.any(pred))
            }
            other => other.element_type().is_some_and(|t| t.any(pred)),
        }
    }

    /// Machine scalar for low-level scalar types; pointers are 64-bit.
    pub fn to_cranelift(&self) -> Option<clif_types::Type> {
        match self {
            Type::Integer(1) | Type::Integer(8) => Some(clif_types::I8),
            Type::Integer(16) => Some(clif_types::I16),
            Type::Integer(32) => Some(clif_types::I32),
            Type::Integer(64) => Some(clif_types::I64),
            Type::Integer(128) => Some(clif_types::I128),
            Type::Float(FloatKind::F32) => Some(clif_types::F32),
            Type::Float(FloatKind::F64) => Some(clif_types::F64),
            Type::LlvmPointer(_) => Some(clif_types::I64),
            _ => None,
        }
    }
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", join(&self.inputs))?;
        if self.variadic {
            f.write_str(if self.inputs.is_empty() { "..." } else { ", ..." })?;
        }
        write!(f, ") -> ({})", join(&self.results))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::None => write!(f, "none"),
            Type::Integer(width) => write!(f, "i{}", width),
            Type::Float(kind) => match kind {
                FloatKind::BF16 => write!(f, "bf16"),
                other => write!(f, "f{}", other.bits()),
            },
            Type::MemRef(m) => match &m.shape {
                Some(shape) => {
                    write!(f, "memref<")?;
                    for dim in shape {
                        write!(f, "{}x", dim)?;
                    }
                    write!(f, "{}>", m.element)
                }
                None => write!(f, "memref<*x{}>", m.element),
            },
            Type::Function(ft) => write!(f, "{}", ft),
            Type::Void => write!(f, "!hl.void"),
            Type::Bool => write!(f, "!hl.bool"),
            Type::Integral { kind, unsigned } => {
                let name = match kind {
                    IntegralKind::Char => "char",
                    IntegralKind::Short => "short",
                    IntegralKind::Int => "int",
                    IntegralKind::Long => "long",
                    IntegralKind::LongLong => "longlong",
                    IntegralKind::Int128 => "int128",
                };
                if *unsigned {
                    write!(f, "!hl.{}<unsigned>", name)
                } else {
                    write!(f, "!hl.{}", name)
                }
            }
            Type::Floating(kind) => {
                let name = match kind {
                    FloatingKind::Half => "half",
                    FloatingKind::Float => "float",
                    FloatingKind::Double => "double",
                    FloatingKind::LongDouble => "longdouble",
                };
                write!(f, "!hl.{}", name)
            }
            Type::Label => write!(f, "!hl.label"),
            Type::Decayed(inner) => write!(f, "!hl.decayed<{}>", inner),
            Type::LValue(inner) => write!(f, "!hl.lvalue<{}>", inner),
            Type::Pointer(inner) => write!(f, "!hl.ptr<{}>", inner),
            Type::Array { element, size } => match size {
                Some(n) => write!(f, "!hl.array<{}, {}>", n, element),
                None => write!(f, "!hl.array<?, {}>", element),
            },
            Type::Record(name) => write!(f, "!hl.record<\"{}\">", name),
            Type::Elaborated(inner) => write!(f, "!hl.elaborated<{}>", inner),
            Type::Typedef(name) => write!(f, "!hl.typedef<\"{}\">", name),
            Type::LlvmVoid => write!(f, "!llvm.void"),
            Type::LlvmPointer(inner) => write!(f, "!llvm.ptr<{}>", inner),
            Type::LlvmArray(inner, n) => write!(f, "!llvm.array<{} x {}>", n, inner),
            Type::LlvmStruct(name) => write!(f, "!llvm.struct<\"{}\">", name),
            Type::LlvmFunction {
                result,
                params,
                variadic,
            } => {
                write!(f, "!llvm.func<{} ({}", result, join(params))?;
                if *variadic {
                    f.write_str(if params.is_empty() { "..." } else { ", ..." })?;
                }
                write!(f, ")>")
            }
        }
    }
}

fn join(types: &[Type]) -> String {
    types
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
