use crate::diagnostics::Diagnostics;
use crate::ir::{FieldDecl, Module, OpKind};
use crate::location::Location;
use crate::symbols::SymbolTable;
use crate::types::Type;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordDecl {
    pub name: String,
    pub fields: Vec<FieldDecl>,
    pub location: Location,
}

impl RecordDecl {
    pub fn field_types(&self) -> Vec<Type> {
        self.fields.iter().map(|f| f.ty.clone()).collect()
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
    pub name: String,
    pub ty: Type,
}

/// Declaration tables of one translation unit.
#[derive(Debug, Default)]
pub struct CodegenContext {
    pub type_decls: SymbolTable<Location>,
    pub type_defs: SymbolTable<Type>,
    pub records: SymbolTable<RecordDecl>,
    pub enum_decls: SymbolTable<EnumDecl>,
    pub enum_constants: SymbolTable<i64>,
    pub diagnostics: Diagnostics,
}

impl CodegenContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the declaration tables from the top-level operations of `module`.
    ///
    /// Conflicting redeclarations are reported and the first one is kept.
    pub fn from_module(module: &Module) -> Self {
        let mut ctx = Self::new();
        for op in module.ops() {
            match &op.kind {
                OpKind::TypeDecl { name } => {
                    let _ = ctx.type_decls.declare(name.clone(), op.location);
                }
                OpKind::TypeDef { name, ty } => {
                    ctx.register_type_def(op.location, name, ty);
                }
                OpKind::RecordDef { name, fields } => {
                    ctx.register_record(op.location, name, fields);
                }
                OpKind::EnumDecl { name, ty } => {
                    ctx.register_enum(op.location, name, ty);
                    for constant in op.regions.iter().flat_map(|r| r.blocks.iter()) {
                        for c in &constant.ops {
                            if let OpKind::EnumConstant { name, value } = &c.kind {
                                ctx.register_enum_constant(c.location, name, *value);
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        ctx
    }

    /// Returns true if the definition is new.
    pub(crate) fn register_type_def(&mut self, loc: Location, name: &str, ty: &Type) -> bool {
        match self.type_defs.lookup(name) {
            Some(existing) if existing == ty => false,
            Some(_) => {
                self.diagnostics
                    .error(loc, format!("multiple type definitions with the same name `{}`", name));
                false
            }
            None => self.type_defs.declare(name, ty.clone()).is_ok(),
        }
    }

    pub(crate) fn register_record(&mut self, loc: Location, name: &str, fields: &[FieldDecl]) -> bool {
        match self.records.lookup(name) {
            Some(existing) if existing.fields == fields => false,
            Some(_) => {
                self.diagnostics
                    .error(loc, format!("multiple record definitions with the same name `{}`", name));
                false
            }
            None => self
                .records
                .declare(
                    name,
                    RecordDecl {
                        name: name.to_string(),
                        fields: fields.to_vec(),
                        location: loc,
                    },
                )
                .is_ok(),
        }
    }

    pub(crate) fn register_enum(&mut self, loc: Location, name: &str, ty: &Type) -> bool {
        let decl = EnumDecl {
            name: name.to_string(),
            ty: ty.clone(),
        };
        if self.enum_decls.declare(name, decl).is_err() {
            self.diagnostics
                .error(loc, format!("multiple enum declarations with the same name `{}`", name));
            return false;
        }
        true
    }

    pub(crate) fn register_enum_constant(&mut self, loc: Location, name: &str, value: i64) -> bool {
        match self.enum_constants.lookup(name) {
            Some(existing) if *existing == value => false,
            Some(_) => {
                self.diagnostics.error(
                    loc,
                    format!("multiple enum constant declarations with the same name `{}`", name),
                );
                false
            }
            None => self.enum_constants.declare(name, value).is_ok(),
        }
    }
}
