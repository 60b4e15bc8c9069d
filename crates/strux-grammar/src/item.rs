//! LR(1) items.

use std::hash::Hash;
use std::hash::Hasher;

use crate::grammar::Grammar;
use crate::symbol::Symbol;

/// An LR(1) item: a production with a dot position and a lookahead
/// terminal.
///
/// Equality and hashing are defined over `(production, dot, lookahead)`
/// only; `next_symbol` is a derived cache field and must not participate in
/// either (spec.md §3, §9 "Tagged variants"/"Memoization").
#[derive(Clone, Debug, Eq)]
pub struct Item {
    /// Index into the grammar's production list.
    pub production: usize,
    /// The dot position, in `0..=rhs.len()`.
    pub dot: usize,
    /// The lookahead terminal.
    pub lookahead: Symbol,
    /// `rhs[dot]`, or `None` if the dot is at the end. Cached for speed.
    next_symbol: Option<Symbol>,
}

impl Item {
    /// Creates a new item, computing its `next_symbol` cache from `grammar`.
    pub fn new(grammar: &Grammar, production: usize, dot: usize, lookahead: Symbol) -> Self {
        let next_symbol = grammar.productions()[production].rhs.get(dot).cloned();
        Self {
            production,
            dot,
            lookahead,
            next_symbol,
        }
    }

    /// The symbol immediately after the dot, if any.
    pub fn next_symbol(&self) -> Option<&Symbol> {
        self.next_symbol.as_ref()
    }

    /// Whether the dot is at the end of the production's right-hand side.
    pub fn is_complete(&self) -> bool {
        self.next_symbol.is_none()
    }

    /// Returns a new item with the dot advanced one position past the
    /// current `next_symbol`.
    ///
    /// # Panics
    ///
    /// Panics if the dot is already at the end.
    pub fn advanced(&self, grammar: &Grammar) -> Item {
        assert!(!self.is_complete(), "cannot advance a completed item");
        Item::new(grammar, self.production, self.dot + 1, self.lookahead.clone())
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.production == other.production
            && self.dot == other.dot
            && self.lookahead == other.lookahead
    }
}

impl Hash for Item {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.production.hash(state);
        self.dot.hash(state);
        self.lookahead.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexSet;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::grammar::Grammar;
    use crate::production::Production;

    fn grammar() -> Grammar {
        let terminals: IndexSet<Symbol> = ["c"].into_iter().map(Symbol::new).collect();
        Grammar::build(
            Symbol::new("S"),
            vec![Production::parse("S -> c c").unwrap()],
            terminals,
        )
        .unwrap()
    }

    #[test]
    fn equality_ignores_next_symbol_cache() {
        let grammar = grammar();
        let a = Item::new(&grammar, 1, 0, Symbol::end_of_input());
        let b = Item::new(&grammar, 1, 0, Symbol::end_of_input());
        assert_eq!(a, b);
        assert_eq!(a.next_symbol(), Some(&Symbol::new("c")));
    }

    #[test]
    fn advance_moves_dot_and_updates_cache() {
        let grammar = grammar();
        let item = Item::new(&grammar, 1, 0, Symbol::end_of_input());
        let advanced = item.advanced(&grammar);
        assert_eq!(advanced.dot, 1);
        assert_eq!(advanced.next_symbol(), Some(&Symbol::new("c")));
    }
}
