//! Compiled LR(1) parser tables (spec.md §3 "Parser tables").

use std::collections::HashMap;

use indexmap::IndexSet;

use crate::action::Action;
use crate::production::Production;
use crate::symbol::Symbol;

/// A recorded ACTION-table conflict: two different actions were assigned to
/// the same `(state, terminal)` pair.
///
/// Table construction records conflicts rather than resolving them
/// (spec.md §4.2 "Conflict policy"); it is the consumer's decision whether a
/// non-empty conflict set is fatal.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Conflict {
    /// The state the conflict occurred in.
    pub state: usize,
    /// The terminal the conflict occurred on.
    pub terminal: Symbol,
    /// The action that was already present.
    pub existing: Action,
    /// The action that could not be installed because of `existing`.
    pub attempted: Action,
}

/// Compiled ACTION/GOTO tables and supporting metadata for an LR(1) parser.
#[derive(Clone, Debug, Default)]
pub struct ParserTables {
    /// ACTION[(state, terminal)].
    action: HashMap<(usize, Symbol), Action>,
    /// GOTO[(state, nonterminal)]. Only nonterminal entries are retained
    /// here; terminal GOTO results surface as `Action::Shift` in `action`
    /// (spec.md §4.2 "Table construction").
    goto: HashMap<(usize, Symbol), usize>,
    /// The set of terminals with a non-`Error` entry in each state.
    expected: HashMap<usize, IndexSet<Symbol>>,
    /// A fallback error code for a state when no example covers the
    /// offending terminal specifically (spec.md §4.2 "Merr").
    default_errors: HashMap<usize, String>,
    /// The grammar's productions, indexed identically to `Reduce` actions.
    productions: Vec<Production>,
    /// Conflicts recorded during table construction.
    conflicts: Vec<Conflict>,
}

impl ParserTables {
    /// Creates an empty table set for the given productions.
    pub fn new(productions: Vec<Production>) -> Self {
        Self {
            action: HashMap::new(),
            goto: HashMap::new(),
            expected: HashMap::new(),
            default_errors: HashMap::new(),
            productions,
            conflicts: Vec::new(),
        }
    }

    /// Reconstructs a table set from already-validated raw entries.
    ///
    /// Used by the cache codec's generated `build_cached_parser` function
    /// body (spec.md §4.4) to rebuild a [`ParserTables`] from literal Rust
    /// data without going through [`ParserTables::set_action`]'s conflict
    /// bookkeeping: the entries are assumed to already come from a single
    /// consistent table, so no conflict detection is needed here.
    pub fn from_raw_parts(
        productions: Vec<Production>,
        actions: Vec<((usize, Symbol), Action)>,
        gotos: Vec<((usize, Symbol), usize)>,
        default_errors: Vec<(usize, String)>,
    ) -> Self {
        let mut expected: HashMap<usize, IndexSet<Symbol>> = HashMap::new();
        for (state, terminal) in actions.iter().map(|(key, _)| key) {
            expected.entry(*state).or_default().insert(terminal.clone());
        }
        Self {
            action: actions.into_iter().collect(),
            goto: gotos.into_iter().collect(),
            expected,
            default_errors: default_errors.into_iter().collect(),
            productions,
            conflicts: Vec::new(),
        }
    }

    /// Looks up `ACTION[state, terminal]`, falling back to the state's
    /// default error code (or a codeless error) per spec.md §4.3.
    pub fn action(&self, state: usize, terminal: &Symbol) -> Action {
        if let Some(action) = self.action.get(&(state, terminal.clone())) {
            return action.clone();
        }
        Action::Error(self.default_errors.get(&state).cloned())
    }

    /// Looks up the raw `ACTION[state, terminal]` entry without falling
    /// back to a default error.
    pub fn action_raw(&self, state: usize, terminal: &Symbol) -> Option<&Action> {
        self.action.get(&(state, terminal.clone()))
    }

    /// Looks up `GOTO[state, nonterminal]`.
    pub fn goto(&self, state: usize, nonterminal: &Symbol) -> Option<usize> {
        self.goto.get(&(state, nonterminal.clone())).copied()
    }

    /// The set of terminals expected (i.e. with a non-`Error` action) in
    /// `state`.
    pub fn expected(&self, state: usize) -> IndexSet<Symbol> {
        self.expected.get(&state).cloned().unwrap_or_default()
    }

    /// The default error code for `state`, if one was installed.
    pub fn default_error(&self, state: usize) -> Option<&str> {
        self.default_errors.get(&state).map(String::as_str)
    }

    /// The grammar's productions.
    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    /// Conflicts recorded during table construction.
    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    /// Installs `ACTION[state, terminal] = action`, recording a conflict
    /// instead of overwriting if a different action is already present.
    pub(crate) fn set_action(&mut self, state: usize, terminal: Symbol, action: Action) {
        self.expected.entry(state).or_default().insert(terminal.clone());
        match self.action.get(&(state, terminal.clone())) {
            Some(existing) if *existing != action => {
                self.conflicts.push(Conflict {
                    state,
                    terminal,
                    existing: existing.clone(),
                    attempted: action,
                });
            }
            Some(_) => {}
            None => {
                self.action.insert((state, terminal), action);
            }
        }
    }

    /// Installs `GOTO[state, nonterminal] = target`.
    pub(crate) fn set_goto(&mut self, state: usize, nonterminal: Symbol, target: usize) {
        self.goto.insert((state, nonterminal), target);
    }

    /// Installs an `Error(code)` action for `(state, terminal)` (spec.md §4.2
    /// "Merr"). Returns `Err` if a different code is already installed.
    pub(crate) fn set_labeled_error(
        &mut self,
        state: usize,
        terminal: Symbol,
        code: String,
    ) -> Result<(), String> {
        match self.action.get(&(state, terminal.clone())) {
            Some(Action::Error(Some(existing))) if *existing != code => Err(existing.clone()),
            Some(Action::Error(Some(_))) => Ok(()),
            Some(other) => Err(format!("state already has a non-error action {other:?}")),
            None => {
                self.action
                    .insert((state, terminal), Action::Error(Some(code)));
                Ok(())
            }
        }
    }

    /// Installs `default_errors[state] = code` (spec.md §4.2 "Merr",
    /// wildcard `ANY_TOKEN`). Returns `Err` if a different code is already
    /// installed.
    pub(crate) fn set_default_error(&mut self, state: usize, code: String) -> Result<(), String> {
        match self.default_errors.get(&state) {
            Some(existing) if *existing != code => Err(existing.clone()),
            _ => {
                self.default_errors.insert(state, code);
                Ok(())
            }
        }
    }

    /// Iterates over every installed `(state, terminal) -> action` entry, in
    /// unspecified order. Used by the cache codec to render a deterministic
    /// sorted form.
    pub fn action_entries(&self) -> impl Iterator<Item = (&(usize, Symbol), &Action)> {
        self.action.iter()
    }

    /// Iterates over every installed `(state, nonterminal) -> state` GOTO
    /// entry.
    pub fn goto_entries(&self) -> impl Iterator<Item = (&(usize, Symbol), &usize)> {
        self.goto.iter()
    }

    /// Iterates over every `state -> code` default-error entry.
    pub fn default_error_entries(&self) -> impl Iterator<Item = (&usize, &str)> {
        self.default_errors.iter().map(|(k, v)| (k, v.as_str()))
    }
}

impl PartialEq for ParserTables {
    fn eq(&self, other: &Self) -> bool {
        self.action == other.action
            && self.goto == other.goto
            && self.productions == other.productions
            && self.default_errors == other.default_errors
    }
}
