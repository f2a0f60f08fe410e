//! Scope chain for the semantic analyzer.
//!
//! The chain starts with one global scope. `lookup` walks from the innermost
//! scope outward; `define` only ever touches the innermost one.

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolKind {
    Variable { declared_type: Option<String> },
    Function { parameters: Vec<String> },
    /// Provided by the host; accepts `min..=max` arguments.
    Builtin { min: usize, max: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub scope_depth: usize,
}

impl Symbol {
    pub fn is_callable(&self) -> bool {
        !matches!(self.kind, SymbolKind::Variable { .. })
    }

    /// Accepted argument counts, inclusive. `None` for variables.
    pub fn arity(&self) -> Option<(usize, usize)> {
        match &self.kind {
            SymbolKind::Variable { .. } => None,
            SymbolKind::Function { parameters } => Some((parameters.len(), parameters.len())),
            SymbolKind::Builtin { min, max } => Some((*min, *max)),
        }
    }
}

#[derive(Debug)]
pub struct SymbolTable {
    scopes: Vec<HashMap<String, Symbol>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()], // global scope
        }
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Leave the innermost scope. The global scope is never popped.
    pub fn exit_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Current scope depth (0 = global).
    pub fn depth(&self) -> usize {
        self.scopes.len() - 1
    }

    /// Bind `name` in the innermost scope. Returns `false`, leaving the
    /// existing binding in place, if the name is already bound there.
    pub fn define(&mut self, name: &str, kind: SymbolKind) -> bool {
        let scope_depth = self.depth();
        let Some(scope) = self.scopes.last_mut() else {
            return false;
        };
        if scope.contains_key(name) {
            return false;
        }
        scope.insert(
            name.to_string(),
            Symbol {
                name: name.to_string(),
                kind,
                scope_depth,
            },
        );
        true
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    pub fn is_declared_in_current_scope(&self, name: &str) -> bool {
        self.scopes.last().is_some_and(|scope| scope.contains_key(name))
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variable() -> SymbolKind {
        SymbolKind::Variable { declared_type: None }
    }

    #[test]
    fn test_lookup_walks_outward() {
        let mut table = SymbolTable::new();
        table.define("x", variable());
        table.enter_scope();
        table.enter_scope();
        assert_eq!(table.depth(), 2);

        let sym = table.lookup("x").unwrap();
        assert_eq!(sym.scope_depth, 0);
        assert!(!table.is_declared_in_current_scope("x"));
        assert!(table.lookup("y").is_none());
    }

    #[test]
    fn test_shadowing_and_redefinition() {
        let mut table = SymbolTable::new();
        assert!(table.define("x", variable()));
        assert!(!table.define("x", SymbolKind::Function { parameters: vec![] }));
        assert!(!table.lookup("x").unwrap().is_callable());

        table.enter_scope();
        assert!(table.define("x", SymbolKind::Function { parameters: vec!["a".to_string()] }));
        assert_eq!(table.lookup("x").unwrap().arity(), Some((1, 1)));

        table.exit_scope();
        assert_eq!(table.lookup("x").unwrap().arity(), None);
    }

    #[test]
    fn test_global_scope_survives_extra_exits() {
        let mut table = SymbolTable::new();
        table.define("saklaw", SymbolKind::Builtin { min: 1, max: 3 });
        table.exit_scope();
        table.exit_scope();
        assert_eq!(table.depth(), 0);
        assert_eq!(table.lookup("saklaw").unwrap().arity(), Some((1, 3)));
    }
}
