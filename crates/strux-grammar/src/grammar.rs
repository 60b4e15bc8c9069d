//! Grammars: a set of productions over a vocabulary of terminals and
//! nonterminals, with automatic expansion of `*`/`+`/`?` list symbols
//! (spec.md §4.5).

use indexmap::IndexMap;
use indexmap::IndexSet;

use crate::production::Production;
use crate::symbol::Symbol;

/// The fresh nonterminal name used to augment the grammar (spec.md §4.2).
const AUGMENTED_START: &str = "$augmented-start";

/// The shape of an automatically generated list/optional production, used by
/// a consumer (the IR builder's handler registry) to bind a builtin handler
/// without the caller having to special-case every list symbol by name.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AutoProductionKind {
    /// `X* -> X X*` or `X+ -> X X*`: cons the head onto the tail list.
    Cons,
    /// `X* -> ` or `X? -> `: the empty list/option.
    Empty,
    /// `X? -> X`: a one-element list.
    Singleton,
}

/// An error building a [`Grammar`].
#[derive(Debug, thiserror::Error, Eq, PartialEq)]
pub enum GrammarError {
    /// A `*`/`+`/`?` symbol's base has no productions and is not a terminal.
    #[error("symbol `{0}` has no productions and is not registered as a terminal")]
    UndefinedBase(String),
    /// The chosen augmenting start symbol collided with an existing symbol.
    #[error("grammar already contains a symbol named `{0}`; cannot augment")]
    AugmentedNameCollision(String),
}

/// A context-free grammar: productions plus the terminal/nonterminal
/// vocabulary, augmented with a fresh start production.
#[derive(Debug, Clone)]
pub struct Grammar {
    /// The original (pre-augmentation) start symbol.
    start: Symbol,
    /// All productions, including the augmenting production at index 0 and
    /// any auto-generated list/optional productions.
    productions: Vec<Production>,
    /// For auto-generated productions, the shape of the generated rule.
    auto_kinds: IndexMap<usize, AutoProductionKind>,
    /// The terminal vocabulary.
    terminals: IndexSet<Symbol>,
    /// The nonterminal vocabulary (derived: every lhs not in `terminals`).
    nonterminals: IndexSet<Symbol>,
}

impl Grammar {
    /// Builds a grammar from a start symbol, a set of explicitly registered
    /// productions, and the terminal vocabulary.
    ///
    /// Any symbol ending in `*`, `+`, or `?` referenced by a production (as
    /// lhs or rhs) that has no explicit productions of its own is expanded
    /// automatically per spec.md §4.5.
    pub fn build(
        start: Symbol,
        mut productions: Vec<Production>,
        terminals: IndexSet<Symbol>,
    ) -> Result<Grammar, GrammarError> {
        let mut auto_kinds = IndexMap::new();

        // Collect every symbol mentioned anywhere so we can find undefined
        // list/optional symbols that need auto-generation.
        let mut seen_lhs: IndexSet<Symbol> = productions.iter().map(|p| p.lhs.clone()).collect();
        let mut frontier: Vec<Symbol> = productions
            .iter()
            .flat_map(|p| p.rhs.iter().cloned())
            .chain(std::iter::once(start.clone()))
            .collect();

        while let Some(sym) = frontier.pop() {
            if seen_lhs.contains(&sym) || terminals.contains(&sym) {
                continue;
            }
            let Some(base) = sym.base() else {
                // A plain nonterminal with no productions is only a problem
                // if nothing ever defines it; that is caught by the LR(1)
                // generator when it tries to close over it, so we don't
                // error here.
                continue;
            };
            if !seen_lhs.contains(&base) && !terminals.contains(&base) {
                return Err(GrammarError::UndefinedBase(base.name().to_string()));
            }

            let list_self = Symbol::new(format!("{base}*"));
            if sym.is_star() {
                let cons_idx = productions.len();
                productions.push(Production::new(sym.clone(), vec![base.clone(), list_self]));
                auto_kinds.insert(cons_idx, AutoProductionKind::Cons);

                let empty_idx = productions.len();
                productions.push(Production::new(sym.clone(), vec![]));
                auto_kinds.insert(empty_idx, AutoProductionKind::Empty);
            } else if sym.is_plus() {
                let cons_idx = productions.len();
                productions.push(Production::new(sym.clone(), vec![base.clone(), list_self.clone()]));
                auto_kinds.insert(cons_idx, AutoProductionKind::Cons);
                frontier.push(list_self);
            } else if sym.is_optional() {
                let singleton_idx = productions.len();
                productions.push(Production::new(sym.clone(), vec![base.clone()]));
                auto_kinds.insert(singleton_idx, AutoProductionKind::Singleton);

                let empty_idx = productions.len();
                productions.push(Production::new(sym.clone(), vec![]));
                auto_kinds.insert(empty_idx, AutoProductionKind::Empty);
            }
            seen_lhs.insert(sym);
        }

        if terminals.contains(&Symbol::new(AUGMENTED_START)) || seen_lhs.contains(&Symbol::new(AUGMENTED_START))
        {
            return Err(GrammarError::AugmentedNameCollision(
                AUGMENTED_START.to_string(),
            ));
        }

        let augmented_start = Symbol::new(AUGMENTED_START);
        let mut all_productions = Vec::with_capacity(productions.len() + 1);
        all_productions.push(Production::new(augmented_start.clone(), vec![start.clone()]));
        all_productions.extend(productions);

        // Shift auto_kinds indices by one to account for the inserted
        // augmenting production at index 0.
        let auto_kinds = auto_kinds
            .into_iter()
            .map(|(idx, kind)| (idx + 1, kind))
            .collect();

        let nonterminals: IndexSet<Symbol> = all_productions
            .iter()
            .map(|p| p.lhs.clone())
            .filter(|s| !terminals.contains(s))
            .collect();

        Ok(Grammar {
            start,
            productions: all_productions,
            auto_kinds,
            terminals,
            nonterminals,
        })
    }

    /// The original (pre-augmentation) start symbol.
    pub fn start(&self) -> &Symbol {
        &self.start
    }

    /// The augmented start symbol (`S'` in spec.md §4.2).
    pub fn augmented_start(&self) -> Symbol {
        Symbol::new(AUGMENTED_START)
    }

    /// All productions, with the augmenting production at index 0.
    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    /// The terminal vocabulary.
    pub fn terminals(&self) -> &IndexSet<Symbol> {
        &self.terminals
    }

    /// The nonterminal vocabulary.
    pub fn nonterminals(&self) -> &IndexSet<Symbol> {
        &self.nonterminals
    }

    /// Whether `symbol` is a terminal.
    pub fn is_terminal(&self, symbol: &Symbol) -> bool {
        self.terminals.contains(symbol)
    }

    /// The auto-generation kind of the production at `index`, if it was
    /// generated rather than explicitly registered.
    pub fn auto_kind(&self, index: usize) -> Option<AutoProductionKind> {
        self.auto_kinds.get(&index).copied()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn expands_star_symbol() {
        let terminals: IndexSet<Symbol> = ["c", "d"].into_iter().map(Symbol::new).collect();
        let productions = vec![
            Production::parse("S -> C").unwrap(),
            Production::parse("C -> c").unwrap(),
            Production::parse("C -> d Item*").unwrap(),
            Production::parse("Item -> c").unwrap(),
        ];
        let grammar = Grammar::build(Symbol::new("S"), productions, terminals).unwrap();

        // Augmenting production + 4 explicit + cons/empty for Item*.
        assert_eq!(grammar.productions().len(), 7);
        assert!(grammar.nonterminals().contains(&Symbol::new("Item*")));
        assert!(
            grammar
                .productions()
                .iter()
                .any(|p| p.lhs == Symbol::new("Item*") && p.is_epsilon())
        );
    }

    #[test]
    fn rejects_undefined_base() {
        let terminals: IndexSet<Symbol> = ["c"].into_iter().map(Symbol::new).collect();
        let productions = vec![Production::parse("S -> Missing*").unwrap()];
        let err = Grammar::build(Symbol::new("S"), productions, terminals).unwrap_err();
        assert_eq!(err, GrammarError::UndefinedBase("Missing".to_string()));
    }
}
