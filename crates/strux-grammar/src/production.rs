//! Productions.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::symbol::Symbol;

/// A grammar rule `lhs -> rhs[0] rhs[1] ...`.
///
/// Production strings of the form `"lhs -> rhs_symbol ..."` are parsed by
/// [`Production::parse`] (spec.md §4.5). An empty right-hand side (`"lhs ->"`
/// with nothing following the arrow) denotes an epsilon production.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct Production {
    /// The left-hand side nonterminal.
    pub lhs: Symbol,
    /// The right-hand side, in order.
    pub rhs: Vec<Symbol>,
}

/// An error encountered parsing a production string.
#[derive(Debug, thiserror::Error, Eq, PartialEq)]
pub enum ParseProductionError {
    /// The string did not contain a `->` separator.
    #[error("production `{0}` is missing a `->` separator")]
    MissingArrow(String),
    /// The left-hand side was empty.
    #[error("production `{0}` has an empty left-hand side")]
    EmptyLhs(String),
}

impl Production {
    /// Creates a new production.
    pub fn new(lhs: impl Into<Symbol>, rhs: Vec<Symbol>) -> Self {
        Self {
            lhs: lhs.into(),
            rhs,
        }
    }

    /// Parses a production string of the form `"lhs -> a b c"`.
    ///
    /// Whitespace-separated tokens after the arrow become the right-hand
    /// side symbols; an arrow with nothing after it yields an epsilon
    /// production (empty `rhs`).
    pub fn parse(text: &str) -> Result<Self, ParseProductionError> {
        let (lhs, rhs) = text
            .split_once("->")
            .ok_or_else(|| ParseProductionError::MissingArrow(text.to_string()))?;
        let lhs = lhs.trim();
        if lhs.is_empty() {
            return Err(ParseProductionError::EmptyLhs(text.to_string()));
        }
        let rhs = rhs
            .split_whitespace()
            .map(Symbol::new)
            .collect::<Vec<_>>();
        Ok(Production::new(lhs, rhs))
    }

    /// Whether this production is an epsilon production.
    pub fn is_epsilon(&self) -> bool {
        self.rhs.is_empty()
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ->", self.lhs)?;
        for sym in &self.rhs {
            write!(f, " {sym}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_simple_production() {
        let p = Production::parse("S -> C C").unwrap();
        assert_eq!(p.lhs, Symbol::new("S"));
        assert_eq!(p.rhs, vec![Symbol::new("C"), Symbol::new("C")]);
    }

    #[test]
    fn parses_epsilon_production() {
        let p = Production::parse("Field* ->").unwrap();
        assert!(p.is_epsilon());
    }

    #[test]
    fn rejects_missing_arrow() {
        assert!(matches!(
            Production::parse("S C C"),
            Err(ParseProductionError::MissingArrow(_))
        ));
    }
}
