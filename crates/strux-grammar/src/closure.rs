//! Item-set closure (spec.md §4.2).
//!
//! The closure of a seed item is computed once and memoized, since closure
//! is additive: `closure(A ∪ B) = closure(A) ∪ closure(B)` for this
//! algorithm's "keep predicting productions for the symbol after the dot"
//! rule. Both the full closure of a single seed item and the single-step
//! immediate additions for an item are memoized, per spec.md §9
//! "Memoization".

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use indexmap::IndexSet;

use crate::first::FirstSets;
use crate::grammar::Grammar;
use crate::item::Item;
use crate::symbol::Symbol;

/// Computes and caches item-set closures for a fixed grammar.
pub struct ClosureTable<'g> {
    /// The grammar being closed over.
    grammar: &'g Grammar,
    /// FIRST sets for the grammar.
    first: &'g FirstSets,
    /// Memoized single-step additions for a seed item.
    immediate_memo: RefCell<HashMap<Item, Rc<Vec<Item>>>>,
    /// Memoized full closure of a single seed item.
    closure_memo: RefCell<HashMap<Item, Rc<IndexSet<Item>>>>,
}

impl<'g> ClosureTable<'g> {
    /// Creates a new closure table for `grammar`.
    pub fn new(grammar: &'g Grammar, first: &'g FirstSets) -> Self {
        Self {
            grammar,
            first,
            immediate_memo: RefCell::new(HashMap::new()),
            closure_memo: RefCell::new(HashMap::new()),
        }
    }

    /// The single-step items predicted directly by `item`: for
    /// `A -> α.Bβ, u`, every `B -> .γ, t` with `t ∈ FIRST(βu)`.
    fn immediate(&self, item: &Item) -> Rc<Vec<Item>> {
        if let Some(cached) = self.immediate_memo.borrow().get(item) {
            return cached.clone();
        }

        let mut additions = Vec::new();
        if let Some(next) = item.next_symbol() {
            if !self.grammar.is_terminal(next) {
                let production = &self.grammar.productions()[item.production];
                let beta = &production.rhs[item.dot + 1..];
                let lookaheads = self.first.first_of_sequence(beta, &item.lookahead);

                for (index, candidate) in self.grammar.productions().iter().enumerate() {
                    if candidate.lhs != *next {
                        continue;
                    }
                    for lookahead in &lookaheads {
                        additions.push(Item::new(self.grammar, index, 0, lookahead.clone()));
                    }
                }
            }
        }

        let rc = Rc::new(additions);
        self.immediate_memo
            .borrow_mut()
            .insert(item.clone(), rc.clone());
        rc
    }

    /// The full closure of the singleton set `{item}`, memoized.
    fn closure_of_item(&self, item: &Item) -> Rc<IndexSet<Item>> {
        if let Some(cached) = self.closure_memo.borrow().get(item) {
            return cached.clone();
        }

        let mut set = IndexSet::new();
        set.insert(item.clone());
        let mut worklist = vec![item.clone()];
        while let Some(current) = worklist.pop() {
            for addition in self.immediate(&current).iter() {
                if set.insert(addition.clone()) {
                    worklist.push(addition.clone());
                }
            }
        }

        let rc = Rc::new(set);
        self.closure_memo
            .borrow_mut()
            .insert(item.clone(), rc.clone());
        rc
    }

    /// The closure of a set of seed items.
    pub fn closure(&self, seeds: impl IntoIterator<Item = Item>) -> IndexSet<Item> {
        let mut result = IndexSet::new();
        for seed in seeds {
            for item in self.closure_of_item(&seed).iter() {
                result.insert(item.clone());
            }
        }
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
    fn closure_predicts_nonterminal_productions() {
        let terminals: Set<Symbol> = ["c", "d"].into_iter().map(Symbol::new).collect();
        let productions = vec![
            Production::parse("S -> C C").unwrap(),
            Production::parse("C -> c C").unwrap(),
            Production::parse("C -> d").unwrap(),
        ];
        let grammar = Grammar::build(Symbol::new("S"), productions, terminals).unwrap();
        let first = FirstSets::compute(&grammar);
        let table = ClosureTable::new(&grammar, &first);

        let seed = Item::new(&grammar, 0, 0, Symbol::end_of_input());
        let closed = table.closure([seed]);

        // S' -> .S,$  S -> .C C,$  C -> .c C,c/d  C -> .d,c/d
        assert_eq!(closed.len(), 6);
    }
}
