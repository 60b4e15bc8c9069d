//! Grammar symbols.

use std::fmt;
use std::rc::Rc;

use serde::Deserialize;
use serde::Serialize;

/// The end-of-input terminal, written `$` in spec.md.
pub const END_OF_INPUT: &str = "$";

/// A grammar symbol, named by its string form.
///
/// Terminal symbols are named either by their quoted literal text (e.g.
/// `"struct"`, `"+"`) or by one of the named terminal categories (e.g.
/// `SnakeWord`, `Number`). Nonterminal symbols are named by the left-hand
/// side identifiers used in production strings; names ending in `*`, `+`, or
/// `?` denote the auto-generated list productions (spec.md §4.5).
///
/// Symbols are cheap to clone: the name is reference-counted.
#[derive(Clone, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Symbol(Rc<str>);

impl Symbol {
    /// Creates a new symbol with the given name.
    pub fn new(name: impl Into<Rc<str>>) -> Self {
        Self(name.into())
    }

    /// The symbol's name.
    pub fn name(&self) -> &str {
        &self.0
    }

    /// The end-of-input terminal.
    pub fn end_of_input() -> Self {
        Self::new(END_OF_INPUT)
    }

    /// Whether this symbol is a zero-or-more list nonterminal (`X*`).
    pub fn is_star(&self) -> bool {
        self.0.ends_with('*')
    }

    /// Whether this symbol is a one-or-more list nonterminal (`X+`).
    pub fn is_plus(&self) -> bool {
        self.0.ends_with('+')
    }

    /// Whether this symbol is a zero-or-one optional nonterminal (`X?`).
    pub fn is_optional(&self) -> bool {
        self.0.ends_with('?')
    }

    /// For an auto-generated list/optional symbol, the base symbol it was
    /// derived from (e.g. `Field*` -> `Field`). Returns `None` for a plain
    /// symbol.
    pub fn base(&self) -> Option<Symbol> {
        if self.is_star() || self.is_plus() || self.is_optional() {
            Some(Symbol::new(&self.0[..self.0.len() - 1]))
        } else {
            None
        }
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Symbol::new(value)
    }
}

impl From<String> for Symbol {
    fn from(value: String) -> Self {
        Symbol::new(value)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn base_strips_list_suffix() {
        assert_eq!(Symbol::new("Field*").base(), Some(Symbol::new("Field")));
        assert_eq!(Symbol::new("Field+").base(), Some(Symbol::new("Field")));
        assert_eq!(Symbol::new("Field?").base(), Some(Symbol::new("Field")));
        assert_eq!(Symbol::new("Field").base(), None);
    }
}
