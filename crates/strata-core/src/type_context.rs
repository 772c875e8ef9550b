/*! Target type context: the identified structs created while lowering one module.
 *
 * Struct identity is the name. The first claim of a name fixes the record it stands for; a later
 * claim from a different record receives a uniqued name (`S.1`, `S.2`, ...) so that callers can
 * detect the collision by comparing names.
 */

use crate::data_layout::{DataLayoutBlueprint, DlEntry};
use crate::types::{FloatKind, Type};
use indexmap::IndexMap;
use std::cell::RefCell;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructBody {
    /// Declared without a known definition.
    Opaque,
    /// Body conversion in progress; self references resolve to the name only.
    Pending,
    Defined(Vec<Type>),
}

#[derive(Debug, Clone)]
struct IdentifiedStruct {
    /// High-level field types of the record that claimed the name, `None` when only declared.
    origin: Option<Vec<Type>>,
    body: StructBody,
}

#[derive(Debug, Default)]
pub struct TypeContext {
    structs: RefCell<IndexMap<String, IdentifiedStruct>>,
    layout: RefCell<DataLayoutBlueprint>,
}

impl TypeContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `name` for a struct built from `origin` and returns the name actually assigned.
    pub fn get_identified(&self, name: &str, origin: Option<&[Type]>) -> String {
        let mut structs = self.structs.borrow_mut();
        let matches = |entry: &IdentifiedStruct| entry.origin.as_deref() == origin;

        match structs.get(name) {
            None => {
                structs.insert(name.to_string(), Self::fresh(origin));
                return name.to_string();
            }
            Some(entry) if matches(entry) => return name.to_string(),
            Some(_) => {}
        }

        let mut suffix = 1;
        loop {
            let candidate = format!("{}.{}", name, suffix);
            match structs.get(&candidate) {
                None => {
                    structs.insert(candidate.clone(), Self::fresh(origin));
                    return candidate;
                }
                Some(entry) if matches(entry) => return candidate,
                Some(_) => suffix += 1,
            }
        }
    }

    fn fresh(origin: Option<&[Type]>) -> IdentifiedStruct {
        IdentifiedStruct {
            origin: origin.map(<[Type]>::to_vec),
            body: StructBody::Opaque,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.structs.borrow().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.structs.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.structs.borrow().is_empty()
    }

    pub fn body(&self, name: &str) -> Option<StructBody> {
        self.structs.borrow().get(name).map(|s| s.body.clone())
    }

    pub fn has_origin(&self, name: &str) -> bool {
        self.structs
            .borrow()
            .get(name)
            .is_some_and(|s| s.origin.is_some())
    }

    pub fn set_body(&self, name: &str, body: StructBody) {
        if let Some(entry) = self.structs.borrow_mut().get_mut(name) {
            entry.body = body;
        }
    }

    /// Names of every identified struct, in creation order.
    pub fn struct_names(&self) -> Vec<String> {
        self.structs.borrow().keys().cloned().collect()
    }

    /// Size record of a converted type, computed once and then served from the blueprint.
    ///
    /// Opaque structs and high-level types have no layout.
    pub fn layout_of(&self, ty: &Type) -> Option<DlEntry> {
        if let Some(entry) = self.layout.borrow().get(ty) {
            return Some(*entry);
        }
        let entry = self.compute_layout(ty)?;
        self.layout.borrow_mut().try_emplace(ty.clone(), entry);
        Some(entry)
    }

    /// Byte offset of field `index` of the identified struct `name`.
    pub fn field_offset(&self, name: &str, index: usize) -> Option<u64> {
        let fields = self.defined_fields(name)?;
        if index >= fields.len() {
            return None;
        }
        let mut offset = 0;
        for (i, field) in fields.iter().enumerate() {
            let entry = self.layout_of(field)?;
            offset = align_to(offset, entry.abi_align);
            if i == index {
                return Some(offset);
            }
            offset += entry.byte_size;
        }
        None
    }

    pub fn blueprint(&self) -> DataLayoutBlueprint {
        self.layout.borrow().clone()
    }

    fn defined_fields(&self, name: &str) -> Option<Vec<Type>> {
        match self.body(name)? {
            StructBody::Defined(fields) => Some(fields),
            _ => None,
        }
    }

    fn compute_layout(&self, ty: &Type) -> Option<DlEntry> {
        match ty {
            Type::Integer(width) => {
                let bytes = match ty.to_cranelift() {
                    Some(clif) => u64::from(clif.bytes()),
                    None => (u64::from(*width) + 7) / 8,
                };
                Some(DlEntry::new(bytes, u64::from(*width), bytes.max(1)))
            }
            Type::Float(kind) => {
                let (bytes, align) = match kind {
                    FloatKind::F16 | FloatKind::BF16 => (2, 2),
                    FloatKind::F80 | FloatKind::F128 => (16, 16),
                    _ => {
                        let clif = ty.to_cranelift()?;
                        (u64::from(clif.bytes()), u64::from(clif.bytes()))
                    }
                };
                Some(DlEntry::new(bytes, kind.bits(), align))
            }
            Type::LlvmPointer(_) => {
                let clif = ty.to_cranelift()?;
                let bytes = u64::from(clif.bytes());
                Some(DlEntry::new(bytes, u64::from(clif.bits()), bytes))
            }
            Type::LlvmArray(element, count) => {
                let element = self.layout_of(element)?;
                let bytes = element.byte_size * count;
                Some(DlEntry::new(bytes, bytes * 8, element.abi_align))
            }
            Type::LlvmStruct(name) => {
                let fields = self.defined_fields(name)?;
                let mut offset = 0;
                let mut align = 1;
                for field in &fields {
                    let entry = self.layout_of(field)?;
                    offset = align_to(offset, entry.abi_align) + entry.byte_size;
                    align = align.max(entry.abi_align);
                }
                let bytes = align_to(offset, align);
                Some(DlEntry::new(bytes, bytes * 8, align))
            }
            _ => None,
        }
    }
}

fn align_to(offset: u64, align: u64) -> u64 {
    if align <= 1 {
        offset
    } else {
        offset.div_ceil(align) * align
    }
}
