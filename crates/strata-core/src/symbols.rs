use indexmap::IndexMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("symbol `{0}` is already declared in this scope")]
pub struct AlreadyDeclared(pub String);

/// Declare-once-per-name table with nested lexical scopes.
///
/// Lookups walk from the innermost scope outwards. Declarations go into the innermost scope and
/// never overwrite: the first registration of a name wins.
#[derive(Debug, Clone)]
pub struct SymbolTable<T> {
    scopes: Vec<IndexMap<String, T>>,
}

impl<T> SymbolTable<T> {
    pub fn new() -> Self {
        Self {
            scopes: vec![IndexMap::new()],
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(IndexMap::new());
    }

    /// Pops the innermost scope. The outermost scope is never removed.
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn declare(&mut self, name: impl Into<String>, value: T) -> Result<(), AlreadyDeclared> {
        let name = name.into();
        let innermost = self.scopes.len() - 1;
        let scope = &mut self.scopes[innermost];
        if scope.contains_key(&name) {
            return Err(AlreadyDeclared(name));
        }
        scope.insert(name, value);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&T> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Symbols visible from the innermost scope, outer scopes first.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.scopes
            .iter()
            .flat_map(|scope| scope.iter().map(|(k, v)| (k.as_str(), v)))
    }
}

impl<T> Default for SymbolTable<T> {
    fn default() -> Self {
        Self::new()
    }
}
