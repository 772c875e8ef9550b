/*! Type conversion from the high-level and builtin type systems to the llvm one.
 *
 * The converter is a registry of per-variant handlers keyed by [`TypeKind`]. Every handler returns
 * a [`Maybe`] sequence of types; a variant with no registered handler converts to nothing, and
 * nothing propagates through every composite conversion that needed it.
 *
 * Two profiles exist. The default one leaves records and elaborated types unconverted; the full one
 * commits to mapping every named record to an identified llvm struct.
 */

use indexmap::IndexMap;
use strata_core::builder::RecordDecl;
use strata_core::data_layout::DlEntry;
use strata_core::maybe::Maybe;
use strata_core::pass::ConverterProfile;
use strata_core::symbols::SymbolTable;
use strata_core::type_context::{StructBody, TypeContext};
use strata_core::types::{FunctionType, Type, TypeKind};

pub type ConversionFn = Box<dyn Fn(&LlvmTypeConverter<'_>, &Type) -> Maybe<Vec<Type>>>;

/// Converted types of each function argument, by argument index.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SignatureConversion {
    inputs: Vec<Vec<Type>>,
}

impl SignatureConversion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_inputs(&mut self, index: usize, types: Vec<Type>) {
        if self.inputs.len() <= index {
            self.inputs.resize(index + 1, Vec::new());
        }
        self.inputs[index] = types;
    }

    pub fn inputs(&self, index: usize) -> &[Type] {
        self.inputs.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// All converted argument types, flattened in argument order.
    pub fn converted_types(&self) -> Vec<Type> {
        self.inputs.iter().flatten().cloned().collect()
    }
}

/// Per-lowering type converter.
///
/// Holds borrowed handles on the module's identified structs and record declarations, so one
/// converter never outlives the pass that created it and is never shared between runs.
pub struct LlvmTypeConverter<'a> {
    conversions: IndexMap<TypeKind, ConversionFn>,
    types: &'a TypeContext,
    records: Option<&'a SymbolTable<RecordDecl>>,
    profile: ConverterProfile,
}

impl<'a> LlvmTypeConverter<'a> {
    /// Converter with the default profile: records and elaborated types do not convert.
    pub fn new(types: &'a TypeContext) -> Self {
        let mut converter = Self {
            conversions: IndexMap::new(),
            types,
            records: None,
            profile: ConverterProfile::Default,
        };
        converter.register_defaults();
        converter
    }

    /// Converter that also maps records, declared in `records`, to identified structs.
    pub fn full(types: &'a TypeContext, records: &'a SymbolTable<RecordDecl>) -> Self {
        let mut converter = Self::new(types);
        converter.records = Some(records);
        converter.profile = ConverterProfile::Full;
        converter.add_conversion(TypeKind::Record, convert_record);
        converter.add_conversion(TypeKind::Elaborated, convert_elaborated);
        converter
    }

    pub fn for_profile(
        profile: ConverterProfile,
        types: &'a TypeContext,
        records: &'a SymbolTable<RecordDecl>,
    ) -> Self {
        match profile {
            ConverterProfile::Default => Self::new(types),
            ConverterProfile::Full => Self::full(types, records),
        }
    }

    fn register_defaults(&mut self) {
        for kind in [
            TypeKind::Integer,
            TypeKind::Float,
            TypeKind::Label,
            TypeKind::LlvmVoid,
            TypeKind::LlvmPointer,
            TypeKind::LlvmArray,
            TypeKind::LlvmStruct,
            TypeKind::LlvmFunction,
        ] {
            self.add_conversion(kind, |_, t| Maybe::some(vec![t.clone()]));
        }
        self.add_conversion(TypeKind::None, |_, _| Maybe::some(vec![Type::LlvmVoid]));
        self.add_conversion(TypeKind::Decayed, convert_decayed);
        self.add_conversion(TypeKind::LValue, convert_pointer_like);
        self.add_conversion(TypeKind::Pointer, convert_pointer_like);
        self.add_conversion(TypeKind::MemRef, convert_memref);
        self.add_conversion(TypeKind::UnrankedMemRef, |_, _| Maybe::none());
        self.add_conversion(TypeKind::Function, |conv, t| match t {
            Type::Function(ft) => conv.convert_fn_t(ft).map(|t| vec![t]),
            _ => Maybe::none(),
        });
    }

    /// Registers `handler` for `kind`, replacing any earlier one.
    pub fn add_conversion<F>(&mut self, kind: TypeKind, handler: F)
    where
        F: Fn(&LlvmTypeConverter<'_>, &Type) -> Maybe<Vec<Type>> + 'static,
    {
        self.conversions.insert(kind, Box::new(handler));
    }

    pub fn profile(&self) -> ConverterProfile {
        self.profile
    }

    pub fn handles(&self, kind: TypeKind) -> bool {
        self.conversions.contains_key(&kind)
    }

    pub fn types(&self) -> &'a TypeContext {
        self.types
    }

    /// Dispatches on the variant of `ty`. Unregistered variants convert to nothing.
    pub fn convert(&self, ty: &Type) -> Maybe<Vec<Type>> {
        match self.conversions.get(&ty.kind()) {
            Some(handler) => handler(self, ty),
            None => {
                tracing::trace!(%ty, "no conversion registered");
                Maybe::none()
            }
        }
    }

    /// Converts a type that must map to exactly one type.
    pub fn convert_type_to_type(&self, ty: &Type) -> Option<Type> {
        self.convert(ty).unwrap().take_wrapped()
    }

    pub fn convert_type_to_types(&self, ty: &Type) -> Option<Vec<Type>> {
        self.convert(ty).take_wrapped()
    }

    /// Converts an argument type. An lvalue argument is passed as its value.
    pub fn convert_arg_t(&self, ty: &Type) -> Option<Vec<Type>> {
        self.convert_type_to_types(ty.rvalue())
    }

    /// Converts a result type. An lvalue result is returned as its value.
    pub fn convert_ret_t(&self, ty: &Type) -> Option<Vec<Type>> {
        self.convert_type_to_types(ty.rvalue())
    }

    fn on_types<F>(&self, types: &[Type], convert: F) -> Maybe<Vec<Type>>
    where
        F: Fn(&Self, &Type) -> Option<Vec<Type>>,
    {
        let mut out = Vec::new();
        for ty in types {
            match convert(self, ty) {
                Some(converted) => out.extend(converted),
                None => return Maybe::none(),
            }
        }
        Maybe::some(out)
    }

    /// Converts a function type to an llvm function type.
    ///
    /// # Panics
    ///
    /// If the results flatten to more than one type: multi-value returns must be packed into an
    /// aggregate before conversion.
    pub fn convert_fn_t(&self, ft: &FunctionType) -> Maybe<Type> {
        let args = self.on_types(&ft.inputs, Self::convert_arg_t);
        let results = self.on_types(&ft.results, Self::convert_ret_t);

        args.and_then(|params| {
            results.map(|mut results| {
                assert!(
                    results.len() <= 1,
                    "llvm functions return at most one value, got {} for {}",
                    results.len(),
                    ft
                );
                let result = results.pop().unwrap_or(Type::LlvmVoid);
                Type::LlvmFunction {
                    result: Box::new(result),
                    params,
                    variadic: ft.variadic,
                }
            })
        })
    }

    /// Maps each argument of `ft` to its converted types. Fails on the first argument that does
    /// not convert.
    pub fn get_conversion_signature(
        &self,
        ft: &FunctionType,
        variadic: bool,
    ) -> Option<SignatureConversion> {
        let mut conversion = SignatureConversion::new();
        for (index, input) in ft.inputs.iter().enumerate() {
            let converted = self.convert_arg_t(input)?;
            conversion.add_inputs(index, converted);
        }
        tracing::trace!(arguments = conversion.len(), variadic, "converted signature");
        Some(conversion)
    }

    /// Layout of a converted type.
    pub fn layout_of(&self, ty: &Type) -> Option<DlEntry> {
        self.types.layout_of(ty)
    }
}

fn convert_decayed(_: &LlvmTypeConverter<'_>, ty: &Type) -> Maybe<Vec<Type>> {
    unreachable!("decayed type {} must be lowered before llvm conversion", ty)
}

fn convert_pointer_like(conv: &LlvmTypeConverter<'_>, ty: &Type) -> Maybe<Vec<Type>> {
    Maybe::from(ty.element_type())
        .and_then(|element| conv.convert(element))
        .unwrap()
        .map(|element| vec![Type::llvm_ptr(element)])
}

fn convert_memref(conv: &LlvmTypeConverter<'_>, ty: &Type) -> Maybe<Vec<Type>> {
    let Type::MemRef(memref) = ty else {
        return Maybe::none();
    };
    let Some(shape) = memref.shape.as_deref() else {
        return Maybe::none();
    };
    Maybe::some(&*memref.element)
        .and_then(|element| conv.convert(element))
        .unwrap()
        .and_then(|element| make_array(element, shape))
        .map(|array| vec![array])
}

/// Nests arrays so that the last dimension is innermost.
fn make_array(element: Type, shape: &[u64]) -> Option<Type> {
    let (innermost, outer) = shape.split_last()?;
    let array = outer
        .iter()
        .rev()
        .fold(Type::llvm_array(element, *innermost), |inner, dim| {
            Type::llvm_array(inner, *dim)
        });
    Some(array)
}

fn convert_elaborated(conv: &LlvmTypeConverter<'_>, ty: &Type) -> Maybe<Vec<Type>> {
    Maybe::from(ty.element_type())
        .and_then(|element| conv.convert_type_to_type(element))
        .map(|element| vec![element])
}

fn convert_record(conv: &LlvmTypeConverter<'_>, ty: &Type) -> Maybe<Vec<Type>> {
    let Type::Record(name) = ty else {
        return Maybe::none();
    };
    let fields = conv
        .records
        .and_then(|records| records.lookup(name))
        .map(RecordDecl::field_types);

    let identified = conv.types.get_identified(name, fields.as_deref());
    if identified != *name {
        tracing::debug!(record = %name, %identified, "record name already taken");
        return Maybe::none();
    }

    if let (Some(fields), Some(StructBody::Opaque)) = (fields, conv.types.body(name)) {
        conv.types.set_body(name, StructBody::Pending);
        let body: Option<Vec<Type>> = fields
            .iter()
            .map(|field| conv.convert_type_to_type(field))
            .collect();
        match body {
            Some(body) => conv.types.set_body(name, StructBody::Defined(body)),
            None => {
                conv.types.set_body(name, StructBody::Opaque);
                return Maybe::none();
            }
        }
    }
    Maybe::some(vec![Type::LlvmStruct(name.clone())])
}
