//! Canonical LR(1) table construction (spec.md §4.2).

use std::collections::HashMap;

use indexmap::IndexSet;
use tracing::debug;
use tracing::debug_span;

use crate::action::Action;
use crate::closure::ClosureTable;
use crate::first::FirstSets;
use crate::grammar::Grammar;
use crate::item::Item;
use crate::symbol::Symbol;
use crate::tables::ParserTables;

/// Options controlling table construction.
#[derive(Clone, Copy, Debug)]
pub struct Options {
    /// Whether a non-empty conflict set aborts construction with
    /// [`GeneratorError::Conflicts`] rather than being returned alongside a
    /// usable (if ambiguous) table (spec.md §4.2 "Conflict policy").
    pub fatal_conflicts: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            fatal_conflicts: true,
        }
    }
}

/// An error building [`ParserTables`] from a [`Grammar`].
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// Table construction produced shift/reduce or reduce/reduce conflicts
    /// and [`Options::fatal_conflicts`] was set.
    #[error("{} conflict(s) in the generated parser tables", .0.len())]
    Conflicts(Vec<crate::tables::Conflict>),
}

/// Builds canonical LR(1) ACTION/GOTO tables for `grammar`.
pub fn generate(grammar: &Grammar, options: Options) -> Result<ParserTables, GeneratorError> {
    let span = debug_span!("generate_tables", productions = grammar.productions().len());
    let _enter = span.enter();

    let first = FirstSets::compute(grammar);
    let closures = ClosureTable::new(grammar, &first);

    let seed = Item::new(grammar, 0, 0, Symbol::end_of_input());
    let state0 = closures.closure([seed]);

    let mut states: Vec<IndexSet<Item>> = vec![state0];
    let mut index_of: HashMap<Vec<Item>, usize> = HashMap::new();
    index_of.insert(canonical(&states[0]), 0);

    let mut tables = ParserTables::new(grammar.productions().to_vec());

    let mut worklist = vec![0usize];
    while let Some(state_idx) = worklist.pop() {
        // GOTO is computed for every symbol after the dot in one pass over
        // the state's items, rather than once per candidate symbol
        // (spec.md §4.2 "parallel GOTO").
        let mut by_symbol: HashMap<Symbol, Vec<Item>> = HashMap::new();
        let mut completions: Vec<Item> = Vec::new();
        for item in &states[state_idx] {
            match item.next_symbol() {
                Some(symbol) => by_symbol.entry(symbol.clone()).or_default().push(item.advanced(grammar)),
                None => completions.push(item.clone()),
            }
        }

        for (symbol, advanced) in by_symbol {
            let goto_set = closures.closure(advanced);
            let key = canonical(&goto_set);
            let target = if let Some(existing) = index_of.get(&key) {
                *existing
            } else {
                let new_idx = states.len();
                states.push(goto_set);
                index_of.insert(key, new_idx);
                worklist.push(new_idx);
                new_idx
            };

            if grammar.is_terminal(&symbol) {
                tables.set_action(state_idx, symbol, Action::Shift(target));
            } else {
                tables.set_goto(state_idx, symbol, target);
            }
        }

        for item in completions {
            let is_accept = item.production == 0 && item.lookahead == Symbol::end_of_input();
            if is_accept {
                tables.set_action(state_idx, Symbol::end_of_input(), Action::Accept);
            } else {
                tables.set_action(state_idx, item.lookahead.clone(), Action::Reduce(item.production));
            }
        }
    }

    debug!(states = states.len(), conflicts = tables.conflicts().len(), "tables generated");

    if options.fatal_conflicts && !tables.conflicts().is_empty() {
        return Err(GeneratorError::Conflicts(tables.conflicts().to_vec()));
    }

    Ok(tables)
}

/// Produces a deterministic, hashable key for an item set, independent of
/// insertion order.
fn canonical(items: &IndexSet<Item>) -> Vec<Item> {
    let mut sorted: Vec<Item> = items.iter().cloned().collect();
    sorted.sort_by(|a, b| {
        (a.production, a.dot, a.lookahead.name()).cmp(&(b.production, b.dot, b.lookahead.name()))
    });
    sorted
}

#[cfg(test)]
mod tests {
    use indexmap::IndexSet as Set;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::production::Production;

    fn grammar() -> Grammar {
        // The classic Aho/Sethi/Ullman "dragon book" LR(1) example grammar.
        let terminals: Set<Symbol> = ["c", "d"].into_iter().map(Symbol::new).collect();
        let productions = vec![
            Production::parse("S -> C C").unwrap(),
            Production::parse("C -> c C").unwrap(),
            Production::parse("C -> d").unwrap(),
        ];
        Grammar::build(Symbol::new("S"), productions, terminals).unwrap()
    }

    #[test]
    fn builds_tables_without_conflicts() {
        let grammar = grammar();
        let tables = generate(&grammar, Options::default()).unwrap();
        assert!(tables.conflicts().is_empty());

        let accept = tables.action_raw(0, &Symbol::end_of_input());
        assert!(accept.is_none());
    }

    #[test]
    fn state_zero_shifts_on_both_terminals() {
        let grammar = grammar();
        let tables = generate(&grammar, Options::default()).unwrap();

        assert!(matches!(tables.action(0, &Symbol::new("c")), Action::Shift(_)));
        assert!(matches!(tables.action(0, &Symbol::new("d")), Action::Shift(_)));
        assert_eq!(tables.expected(0).len(), 2);
    }

    #[test]
    fn canonical_key_ignores_item_insertion_order() {
        let grammar = grammar();
        let first = FirstSets::compute(&grammar);
        let closures = ClosureTable::new(&grammar, &first);
        let seed = Item::new(&grammar, 0, 0, Symbol::end_of_input());
        let a = closures.closure([seed.clone()]);
        let b = closures.closure([seed]);
        assert_eq!(canonical(&a), canonical(&b));
    }
}
