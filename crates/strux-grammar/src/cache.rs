//! Parser cache codec (spec.md §4.4).
//!
//! A compiled [`ParserTables`] is expensive to recompute on every run, so it
//! is cached in two complementary forms:
//!
//! - [`render_rust_source`] produces the literal Rust source-artifact format
//!   described by the design: a `build_cached_parser` function body meant to
//!   be committed and compiled normally by a downstream build. This module
//!   never compiles or executes that text itself.
//! - [`CachedTables`] is a serde-friendly mirror of [`ParserTables`] used to
//!   round-trip through `serde_json`, which the element-wise-equality
//!   testable property (spec.md §8) is checked against without needing a
//!   Rust compiler in the loop.

use std::collections::HashSet;
use std::fmt::Write as _;

use serde::Deserialize;
use serde::Serialize;

use crate::action::Action;
use crate::production::Production;
use crate::symbol::Symbol;
use crate::tables::ParserTables;

/// A serde-serializable ACTION-table entry.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
struct ActionEntry {
    state: usize,
    terminal: Symbol,
    action: CachedAction,
}

/// A serde-serializable mirror of [`Action`] ([`Action`] itself stays
/// serde-free to keep `ParserTables` a plain fast-lookup type).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
enum CachedAction {
    Shift(usize),
    Reduce(usize),
    Accept,
    Error(Option<String>),
}

impl From<&Action> for CachedAction {
    fn from(action: &Action) -> Self {
        match action {
            Action::Shift(state) => CachedAction::Shift(*state),
            Action::Reduce(production) => CachedAction::Reduce(*production),
            Action::Accept => CachedAction::Accept,
            Action::Error(code) => CachedAction::Error(code.clone()),
        }
    }
}

impl From<CachedAction> for Action {
    fn from(action: CachedAction) -> Self {
        match action {
            CachedAction::Shift(state) => Action::Shift(state),
            CachedAction::Reduce(production) => Action::Reduce(production),
            CachedAction::Accept => Action::Accept,
            CachedAction::Error(code) => Action::Error(code),
        }
    }
}

/// A serde-serializable GOTO-table entry.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
struct GotoEntry {
    state: usize,
    nonterminal: Symbol,
    target: usize,
}

/// A serde-serializable default-error entry.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
struct DefaultErrorEntry {
    state: usize,
    code: String,
}

/// A `serde_json`-round-trippable mirror of [`ParserTables`].
///
/// `ParserTables`'s primary representation is tuple-keyed `HashMap`s, which
/// `serde_json` cannot serialize directly (object keys must be strings);
/// this type flattens those maps into sorted vectors instead.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CachedTables {
    productions: Vec<Production>,
    actions: Vec<ActionEntry>,
    gotos: Vec<GotoEntry>,
    default_errors: Vec<DefaultErrorEntry>,
}

impl CachedTables {
    /// Flattens `tables` into its serializable form, with entries sorted for
    /// deterministic output.
    pub fn from_tables(tables: &ParserTables) -> Self {
        let mut actions: Vec<ActionEntry> = tables
            .action_entries()
            .map(|((state, terminal), action)| ActionEntry {
                state: *state,
                terminal: terminal.clone(),
                action: action.into(),
            })
            .collect();
        actions.sort_by(|a, b| (a.state, a.terminal.name()).cmp(&(b.state, b.terminal.name())));

        let mut gotos: Vec<GotoEntry> = tables
            .goto_entries()
            .map(|((state, nonterminal), target)| GotoEntry {
                state: *state,
                nonterminal: nonterminal.clone(),
                target: *target,
            })
            .collect();
        gotos.sort_by(|a, b| (a.state, a.nonterminal.name()).cmp(&(b.state, b.nonterminal.name())));

        let mut default_errors: Vec<DefaultErrorEntry> = tables
            .default_error_entries()
            .map(|(state, code)| DefaultErrorEntry {
                state: *state,
                code: code.to_string(),
            })
            .collect();
        default_errors.sort_by_key(|entry| entry.state);

        Self {
            productions: tables.productions().to_vec(),
            actions,
            gotos,
            default_errors,
        }
    }

    /// Reconstructs a [`ParserTables`] from its serialized mirror.
    pub fn into_tables(self) -> ParserTables {
        let mut tables = ParserTables::new(self.productions);
        for entry in self.actions {
            tables_set_action(&mut tables, entry.state, entry.terminal, entry.action.into());
        }
        for entry in self.gotos {
            tables_set_goto(&mut tables, entry.state, entry.nonterminal, entry.target);
        }
        for entry in self.default_errors {
            let _ = tables_set_default_error(&mut tables, entry.state, entry.code);
        }
        tables
    }
}

// `ParserTables`'s mutators are crate-private; thin wrappers keep the cache
// module from needing to become part of that type's impl block.
fn tables_set_action(tables: &mut ParserTables, state: usize, terminal: Symbol, action: Action) {
    tables.set_action(state, terminal, action);
}
fn tables_set_goto(tables: &mut ParserTables, state: usize, nonterminal: Symbol, target: usize) {
    tables.set_goto(state, nonterminal, target);
}
fn tables_set_default_error(tables: &mut ParserTables, state: usize, code: String) -> Result<(), String> {
    tables.set_default_error(state, code)
}

/// Renders `tables` as a literal Rust source module reconstructing the same
/// tables, in the source-artifact format a downstream build compiles
/// normally: a `pub fn build_cached_parser() -> ParserTables` that rebuilds
/// the productions list, ACTION table, and GOTO table from literal data and
/// returns a [`ParserTables`] via [`ParserTables::from_raw_parts`] (spec.md
/// §4.4). This function never invokes the compiler; it only produces text.
pub fn render_rust_source(tables: &ParserTables, module_name: &str) -> String {
    let mirror = CachedTables::from_tables(tables);
    let mut out = String::new();
    let _ = writeln!(out, "// @generated by the strux-grammar cache codec. Do not edit by hand.");
    let _ = writeln!(out, "pub mod {module_name} {{");
    let _ = writeln!(out, "    use strux_grammar::Action;");
    let _ = writeln!(out, "    use strux_grammar::ParserTables;");
    let _ = writeln!(out, "    use strux_grammar::Production;");
    let _ = writeln!(out, "    use strux_grammar::Symbol;");
    let _ = writeln!(out);
    let _ = writeln!(out, "    pub fn build_cached_parser() -> ParserTables {{");

    let _ = writeln!(out, "        let productions = vec![");
    for production in &mirror.productions {
        let _ = writeln!(
            out,
            "            Production::parse({:?}).expect(\"cached production text is well-formed\"),",
            production.to_string()
        );
    }
    let _ = writeln!(out, "        ];");

    let _ = writeln!(out, "        let actions = vec![");
    for entry in &mirror.actions {
        let action = match &entry.action {
            CachedAction::Shift(state) => format!("Action::Shift({state})"),
            CachedAction::Reduce(production) => format!("Action::Reduce({production})"),
            CachedAction::Accept => "Action::Accept".to_string(),
            CachedAction::Error(None) => "Action::Error(None)".to_string(),
            CachedAction::Error(Some(code)) => format!("Action::Error(Some({code:?}.to_string()))"),
        };
        let _ = writeln!(
            out,
            "            (({}, Symbol::new({:?})), {}),",
            entry.state,
            entry.terminal.name(),
            action
        );
    }
    let _ = writeln!(out, "        ];");

    let _ = writeln!(out, "        let gotos = vec![");
    for entry in &mirror.gotos {
        let _ = writeln!(
            out,
            "            (({}, Symbol::new({:?})), {}),",
            entry.state,
            entry.nonterminal.name(),
            entry.target
        );
    }
    let _ = writeln!(out, "        ];");

    let _ = writeln!(out, "        let default_errors = vec![");
    for entry in &mirror.default_errors {
        let _ = writeln!(out, "            ({}, {:?}.to_string()),", entry.state, entry.code);
    }
    let _ = writeln!(out, "        ];");

    let _ = writeln!(out, "        ParserTables::from_raw_parts(productions, actions, gotos, default_errors)");
    let _ = writeln!(out, "    }}");
    let _ = writeln!(out, "}}");
    out
}

/// A staleness report comparing the production set a cache was built from
/// against the grammar's current production set.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Staleness {
    /// Productions present in the cache but no longer in the grammar.
    pub removed: Vec<Production>,
    /// Productions in the grammar but not reflected in the cache.
    pub added: Vec<Production>,
}

impl Staleness {
    /// Whether the cache is stale (the symmetric difference is non-empty).
    pub fn is_stale(&self) -> bool {
        !self.removed.is_empty() || !self.added.is_empty()
    }
}

/// Computes a [`Staleness`] report via the symmetric difference between a
/// cached production set and the grammar's current productions.
pub fn staleness(cached: &[Production], current: &[Production]) -> Staleness {
    let cached_set: HashSet<&Production> = cached.iter().collect();
    let current_set: HashSet<&Production> = current.iter().collect();

    Staleness {
        removed: cached_set.difference(&current_set).map(|p| (*p).clone()).collect(),
        added: current_set.difference(&cached_set).map(|p| (*p).clone()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::generator;
    use crate::generator::Options;
    use crate::grammar::Grammar;
    use indexmap::IndexSet as Set;

    fn grammar() -> Grammar {
        let terminals: Set<Symbol> = ["c", "d"].into_iter().map(Symbol::new).collect();
        let productions = vec![
            Production::parse("S -> C C").unwrap(),
            Production::parse("C -> c C").unwrap(),
            Production::parse("C -> d").unwrap(),
        ];
        Grammar::build(Symbol::new("S"), productions, terminals).unwrap()
    }

    #[test]
    fn json_round_trip_preserves_tables() {
        let grammar = grammar();
        let tables = generator::generate(&grammar, Options::default()).unwrap();
        let mirror = CachedTables::from_tables(&tables);
        let json = serde_json::to_string(&mirror).unwrap();
        let restored: CachedTables = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, mirror);
        assert_eq!(restored.into_tables(), tables);
    }

    #[test]
    fn staleness_detects_added_and_removed_productions() {
        let old = vec![Production::parse("S -> a").unwrap()];
        let new = vec![Production::parse("S -> b").unwrap()];
        let report = staleness(&old, &new);
        assert!(report.is_stale());
        assert_eq!(report.removed, old);
        assert_eq!(report.added, new);
    }

    #[test]
    fn identical_production_sets_are_not_stale() {
        let set = vec![Production::parse("S -> a").unwrap()];
        let report = staleness(&set, &set);
        assert!(!report.is_stale());
    }

    #[test]
    fn rendered_source_defines_build_cached_parser() {
        let grammar = grammar();
        let tables = generator::generate(&grammar, Options::default()).unwrap();
        let source = render_rust_source(&tables, "cached");

        assert!(source.contains("pub fn build_cached_parser() -> ParserTables {"));
        assert!(source.contains("ParserTables::from_raw_parts(productions, actions, gotos, default_errors)"));
        for production in tables.productions() {
            assert!(source.contains(&format!("Production::parse({:?})", production.to_string())));
        }
        assert!(source.contains("Action::Reduce(") || source.contains("Action::Shift("));
    }

    #[test]
    fn from_raw_parts_reconstructs_an_equal_table_set() {
        let grammar = grammar();
        let tables = generator::generate(&grammar, Options::default()).unwrap();
        let mirror = CachedTables::from_tables(&tables);

        let rebuilt = ParserTables::from_raw_parts(
            mirror.productions.clone(),
            mirror
                .actions
                .iter()
                .map(|entry| ((entry.state, entry.terminal.clone()), entry.action.clone().into()))
                .collect(),
            mirror
                .gotos
                .iter()
                .map(|entry| ((entry.state, entry.nonterminal.clone()), entry.target))
                .collect(),
            mirror.default_errors.iter().map(|entry| (entry.state, entry.code.clone())).collect(),
        );
        assert_eq!(rebuilt, tables);
    }
}
