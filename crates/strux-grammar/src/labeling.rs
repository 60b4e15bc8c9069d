//! Installing error codes from labeled examples ("Merr", spec.md §4.2, §4.6).
//!
//! An error-example corpus entry says "parsing this token sequence must fail
//! at token N with this code" (or, for the `$ANY` wildcard, "must fail
//! somewhere with this code, used as the state's fallback"). Labeling drives
//! the existing tables over the example and, if the example's expectation
//! holds, records the code in the table.

use crate::driver;
use crate::tables::ParserTables;
use crate::tree::Token;

/// A single error example to label against the tables.
#[derive(Clone, Debug)]
pub struct Example {
    /// The token sequence to drive, including a trailing `$`.
    pub tokens: Vec<Token>,
    /// The index into `tokens` the parser is expected to fail at, or `None`
    /// if the example asserts the sequence parses successfully.
    pub fail_at: Option<usize>,
    /// The error code to install, if `fail_at` is `Some`.
    pub code: Option<String>,
    /// Whether the example's failure token was written as the `$ANY`
    /// wildcard rather than a specific terminal, meaning the code should be
    /// installed as the state's default error rather than keyed to one
    /// terminal.
    pub any_token: bool,
}

/// An error labeling an example against the tables.
#[derive(Debug, thiserror::Error)]
pub enum LabelingError {
    /// The example expected a failure at `expected` but parsing succeeded.
    #[error("example expected a syntax error at token {expected} but parsing succeeded")]
    UnexpectedSuccess {
        /// The token index the example expected failure at.
        expected: usize,
    },
    /// The example expected a failure at `expected` but the parser failed at
    /// a different token first.
    #[error("example expected a syntax error at token {expected} but the parser failed at token {actual}")]
    WrongFailureToken {
        /// The token index the example expected failure at.
        expected: usize,
        /// The token index the parser actually failed at.
        actual: usize,
    },
    /// A different code was already installed for this state/terminal.
    #[error("state already labels this error `{existing}`, cannot relabel `{attempted}`")]
    ConflictingCode {
        /// The code already installed.
        existing: String,
        /// The code this example tried to install.
        attempted: String,
    },
}

/// Labels a single example against `tables`, mutating its error table.
///
/// Labeling the same `(state, terminal)` with the same code twice is a
/// no-op; labeling it with a different code is an error (spec.md §4.6
/// "conflicting labels").
pub fn label_example(tables: &mut ParserTables, example: &Example) -> Result<(), LabelingError> {
    match (driver::parse(tables, &example.tokens), example.fail_at) {
        (Ok(_), None) => Ok(()),
        (Ok(_), Some(expected)) => Err(LabelingError::UnexpectedSuccess { expected }),
        (Err(err), None) => Err(LabelingError::UnexpectedSuccess {
            expected: err.token_index,
        }),
        (Err(err), Some(expected)) if err.token_index != expected => {
            Err(LabelingError::WrongFailureToken {
                expected,
                actual: err.token_index,
            })
        }
        (Err(err), Some(_)) => {
            let Some(code) = example.code.clone() else {
                return Ok(());
            };
            let result = if example.any_token {
                tables.set_default_error(err.state, code.clone())
            } else {
                tables.set_labeled_error(err.state, err.token, code.clone())
            };
            result.map_err(|existing| LabelingError::ConflictingCode {
                existing,
                attempted: code,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexSet as Set;
    use pretty_assertions::assert_eq;
    use strux_core::Location;
    use strux_core::Position;

    use super::*;
    use crate::generator;
    use crate::generator::Options;
    use crate::grammar::Grammar;
    use crate::production::Production;
    use crate::symbol::Symbol;

    fn grammar() -> Grammar {
        let terminals: Set<Symbol> = ["c", "d"].into_iter().map(Symbol::new).collect();
        let productions = vec![
            Production::parse("S -> C C").unwrap(),
            Production::parse("C -> c C").unwrap(),
            Production::parse("C -> d").unwrap(),
        ];
        Grammar::build(Symbol::new("S"), productions, terminals).unwrap()
    }

    fn token(symbol: &str) -> Token {
        let start = Position::try_new(1, 1, 0);
        let end = Position::try_new(1, 2, 1);
        Token {
            symbol: Symbol::new(symbol),
            text: symbol.to_string(),
            location: Location::new(start, end),
        }
    }

    #[test]
    fn labels_expected_failure() {
        let grammar = grammar();
        let mut tables = generator::generate(&grammar, Options::default()).unwrap();
        let example = Example {
            tokens: vec![token("$")],
            fail_at: Some(0),
            code: Some("E001".to_string()),
            any_token: false,
        };
        label_example(&mut tables, &example).unwrap();
        assert_eq!(tables.action(0, &Symbol::end_of_input()), crate::action::Action::Error(Some("E001".to_string())));
    }

    #[test]
    fn relabeling_with_same_code_is_a_noop() {
        let grammar = grammar();
        let mut tables = generator::generate(&grammar, Options::default()).unwrap();
        let example = Example {
            tokens: vec![token("$")],
            fail_at: Some(0),
            code: Some("E001".to_string()),
            any_token: false,
        };
        label_example(&mut tables, &example).unwrap();
        label_example(&mut tables, &example).unwrap();
    }

    #[test]
    fn relabeling_with_different_code_errors() {
        let grammar = grammar();
        let mut tables = generator::generate(&grammar, Options::default()).unwrap();
        let mut example = Example {
            tokens: vec![token("$")],
            fail_at: Some(0),
            code: Some("E001".to_string()),
            any_token: false,
        };
        label_example(&mut tables, &example).unwrap();
        example.code = Some("E002".to_string());
        let err = label_example(&mut tables, &example).unwrap_err();
        assert!(matches!(err, LabelingError::ConflictingCode { .. }));
    }

    #[test]
    fn wrong_failure_token_is_an_error() {
        let grammar = grammar();
        let mut tables = generator::generate(&grammar, Options::default()).unwrap();
        let example = Example {
            tokens: vec![token("c"), token("$")],
            fail_at: Some(0),
            code: Some("E001".to_string()),
            any_token: false,
        };
        let err = label_example(&mut tables, &example).unwrap_err();
        assert!(matches!(err, LabelingError::WrongFailureToken { .. }));
    }

    #[test]
    fn unexpected_success_is_an_error() {
        let grammar = grammar();
        let mut tables = generator::generate(&grammar, Options::default()).unwrap();
        let example = Example {
            tokens: vec![token("d"), token("d"), token("$")],
            fail_at: None,
            code: None,
            any_token: false,
        };
        label_example(&mut tables, &example).unwrap();

        let example_failing = Example {
            tokens: vec![token("d"), token("d"), token("$")],
            fail_at: Some(2),
            code: Some("E001".to_string()),
            any_token: false,
        };
        let err = label_example(&mut tables, &example_failing).unwrap_err();
        assert!(matches!(err, LabelingError::UnexpectedSuccess { .. }));
    }
}
