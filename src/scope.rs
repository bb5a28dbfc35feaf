//! Lexical scoping for the type checker.

use std::collections::HashMap;

use crate::{token::Position, types::Type};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Role {
    Variable,
    Parameter,
    Function,
    Struct,
}

#[derive(Clone, Debug)]
pub struct Symbol {
    pub ty: Type,
    pub role: Role,
    pub is_const: bool,
    /// Whether the declaration was already visited by the checking pass.
    /// Globals are registered ahead of time with this unset.
    pub declared: bool,
    pub pos: Position,
}

/// A stack of scopes. Index 0 is the global scope; the parent of scope `n`
/// is scope `n - 1`.
#[derive(Debug)]
pub struct Scopes {
    stack: Vec<HashMap<Box<str>, Symbol>>,
}

impl Scopes {
    /// Creates a stack holding only the (empty) global scope.
    pub fn new() -> Scopes {
        Scopes {
            stack: vec![HashMap::with_capacity(32)],
        }
    }

    pub fn push(&mut self) {
        self.stack.push(HashMap::new());
    }

    pub fn pop(&mut self) {
        assert!(self.stack.len() > 1, "attempted to pop the global scope");
        self.stack.pop();
    }

    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }

    /// Inserts the symbol into the innermost scope, returning the symbol it
    /// replaced, if any.
    pub fn insert(&mut self, name: &str, symbol: Symbol) -> Option<Symbol> {
        self.innermost().insert(name.into(), symbol)
    }

    /// Looks the name up in the innermost scope only.
    pub fn get_local_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        self.innermost().get_mut(name)
    }

    /// Resolves the name, walking from the innermost scope outwards.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.stack.iter().rev().find_map(|scope| scope.get(name))
    }

    fn innermost(&mut self) -> &mut HashMap<Box<str>, Symbol> {
        self.stack
            .last_mut()
            .expect("the global scope is never popped")
    }
}

impl Default for Scopes {
    fn default() -> Self {
        Scopes::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(ty: &str) -> Symbol {
        Symbol {
            ty: Type::primitive(ty),
            role: Role::Variable,
            is_const: false,
            declared: true,
            pos: Position::START,
        }
    }

    #[test]
    fn lookup_walks_outwards() {
        let mut scopes = Scopes::new();
        scopes.insert("a", var("i32"));
        scopes.push();
        scopes.insert("b", var("bool"));
        assert_eq!(scopes.depth(), 1);
        assert_eq!(scopes.lookup("a").map(|s| s.ty.name()).as_deref(), Some("i32"));
        assert!(scopes.get_local_mut("a").is_none());

        scopes.pop();
        assert!(scopes.lookup("b").is_none());
        assert!(scopes.lookup("a").is_some());
    }

    #[test]
    fn inner_declarations_shadow() {
        let mut scopes = Scopes::new();
        scopes.insert("x", var("i32"));
        scopes.push();
        scopes.insert("x", var("f64"));
        assert_eq!(scopes.lookup("x").map(|s| s.ty.name()).as_deref(), Some("f64"));
        scopes.pop();
        assert_eq!(scopes.lookup("x").map(|s| s.ty.name()).as_deref(), Some("i32"));
    }

    #[test]
    #[should_panic(expected = "attempted to pop the global scope")]
    fn popping_global_scope_panics() {
        let mut scopes = Scopes::new();
        scopes.pop();
    }
}
