//! FIRST-set computation (spec.md §4.2).

use std::collections::HashSet;

use indexmap::IndexSet;
use tracing::trace;

use crate::grammar::Grammar;
use crate::symbol::Symbol;

/// FIRST sets for every symbol in a grammar, plus nullability.
#[derive(Debug, Clone)]
pub struct FirstSets {
    /// FIRST(symbol), excluding epsilon.
    first: std::collections::HashMap<Symbol, IndexSet<Symbol>>,
    /// The set of nullable nonterminals (those with ε ∈ FIRST(A)).
    nullable: HashSet<Symbol>,
}

impl FirstSets {
    /// Computes FIRST sets for every terminal and nonterminal in `grammar`
    /// by fixed-point iteration over its productions.
    pub fn compute(grammar: &Grammar) -> FirstSets {
        let span = tracing::debug_span!("first_sets", productions = grammar.productions().len());
        let _enter = span.enter();

        let mut first: std::collections::HashMap<Symbol, IndexSet<Symbol>> =
            std::collections::HashMap::new();
        for terminal in grammar.terminals() {
            first
                .entry(terminal.clone())
                .or_default()
                .insert(terminal.clone());
        }
        for nonterminal in grammar.nonterminals() {
            first.entry(nonterminal.clone()).or_default();
        }

        let mut nullable: HashSet<Symbol> = HashSet::new();
        let mut changed = true;
        let mut iterations = 0usize;
        while changed {
            changed = false;
            iterations += 1;
            for production in grammar.productions() {
                if production.is_epsilon() {
                    changed |= nullable.insert(production.lhs.clone());
                    continue;
                }

                let mut prefix_nullable = true;
                for symbol in &production.rhs {
                    let additions: Vec<Symbol> = first
                        .get(symbol)
                        .map(|set| set.iter().cloned().collect())
                        .unwrap_or_default();
                    let entry = first.entry(production.lhs.clone()).or_default();
                    for terminal in additions {
                        changed |= entry.insert(terminal);
                    }

                    if !nullable.contains(symbol) {
                        prefix_nullable = false;
                        break;
                    }
                }

                if prefix_nullable {
                    changed |= nullable.insert(production.lhs.clone());
                }
            }
        }

        trace!(iterations, "first-set fixed point reached");
        FirstSets { first, nullable }
    }

    /// FIRST(symbol), excluding epsilon.
    pub fn first_of(&self, symbol: &Symbol) -> IndexSet<Symbol> {
        self.first.get(symbol).cloned().unwrap_or_default()
    }

    /// Whether `symbol` can derive the empty string.
    pub fn is_nullable(&self, symbol: &Symbol) -> bool {
        self.nullable.contains(symbol)
    }

    /// Computes FIRST(symbols[0] symbols[1] ... lookahead), where `lookahead`
    /// is a single terminal appended as a guaranteed non-nullable tail (used
    /// by the closure algorithm for `FIRST(βu)`, spec.md §4.2).
    pub fn first_of_sequence(&self, symbols: &[Symbol], lookahead: &Symbol) -> IndexSet<Symbol> {
        let mut result = IndexSet::new();
        for symbol in symbols {
            for terminal in self.first_of(symbol) {
                result.insert(terminal);
            }
            if !self.is_nullable(symbol) {
                return result;
            }
        }
        result.insert(lookahead.clone());
        result
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexSet as Set;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::production::Production;

    #[test]
    fn computes_first_and_nullable() {
        let terminals: Set<Symbol> = ["c", "d"].into_iter().map(Symbol::new).collect();
        let productions = vec![
            Production::parse("S -> C C").unwrap(),
            Production::parse("C -> c C").unwrap(),
            Production::parse("C -> d").unwrap(),
        ];
        let grammar = crate::grammar::Grammar::build(Symbol::new("S"), productions, terminals).unwrap();
        let first = FirstSets::compute(&grammar);

        let first_c = first.first_of(&Symbol::new("C"));
        assert_eq!(first_c, Set::from([Symbol::new("c"), Symbol::new("d")]));
        assert!(!first.is_nullable(&Symbol::new("C")));
    }

    #[test]
    fn nullable_prefix_propagates() {
        let terminals: Set<Symbol> = ["a"].into_iter().map(Symbol::new).collect();
        let productions = vec![
            Production::parse("S -> Opt a").unwrap(),
            Production::parse("Opt -> a").unwrap(),
            Production::parse("Opt ->").unwrap(),
        ];
        let grammar = crate::grammar::Grammar::build(Symbol::new("S"), productions, terminals).unwrap();
        let first = FirstSets::compute(&grammar);
        assert!(first.is_nullable(&Symbol::new("Opt")));
        assert_eq!(
            first.first_of(&Symbol::new("S")),
            Set::from([Symbol::new("a")])
        );
    }
}
