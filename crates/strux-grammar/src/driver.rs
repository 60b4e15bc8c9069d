//! The LR(1) shift-reduce driver (spec.md §4.3).

use strux_core::Location;
use tracing::trace;

use crate::action::Action;
use crate::symbol::Symbol;
use crate::tables::ParserTables;
use crate::tree::ParseNode;
use crate::tree::Reduction;
use crate::tree::Token;

/// A syntax error raised while driving the parser.
#[derive(Clone, Debug, thiserror::Error)]
#[error("syntax error at {location}: unexpected {token}{code}", code = code_suffix(.code))]
pub struct ParseError {
    /// The error code installed by a labeled example, if any (spec.md §4.2
    /// "Merr").
    pub code: Option<String>,
    /// Index into the token stream of the offending token.
    pub token_index: usize,
    /// The offending token's symbol name.
    pub token: Symbol,
    /// The offending token's source location.
    pub location: Location,
    /// The state the parser was in when the error occurred.
    pub state: usize,
    /// The terminals that would have been accepted in `state`.
    pub expected: Vec<Symbol>,
}

fn code_suffix(code: &Option<String>) -> String {
    match code {
        Some(code) => format!(" [{code}]"),
        None => String::new(),
    }
}

/// Drives `tables` over `tokens`, building a parse tree rooted at the
/// reduction of the grammar's original start production.
///
/// `tokens` must end with an end-of-input token (symbol `$`); the driver
/// does not append one implicitly.
pub fn parse(tables: &ParserTables, tokens: &[Token]) -> Result<ParseNode, ParseError> {
    let mut state_stack: Vec<usize> = vec![0];
    let mut node_stack: Vec<ParseNode> = Vec::new();
    let mut cursor = 0usize;

    loop {
        let state = *state_stack.last().expect("state stack never empties");
        let lookahead = tokens
            .get(cursor)
            .map(|token| token.symbol.clone())
            .unwrap_or_else(Symbol::end_of_input);

        match tables.action(state, &lookahead) {
            Action::Shift(target) => {
                let token = tokens[cursor].clone();
                trace!(state, %lookahead, target, "shift");
                node_stack.push(ParseNode::Token(token));
                state_stack.push(target);
                cursor += 1;
            }
            Action::Reduce(production_index) => {
                let production = &tables.productions()[production_index];
                let arity = production.rhs.len();
                trace!(state, production = production_index, arity, "reduce");

                let children: Vec<ParseNode> = node_stack.split_off(node_stack.len() - arity);
                state_stack.truncate(state_stack.len() - arity);

                let at_if_empty = Location::synthetic_point(
                    tokens
                        .get(cursor)
                        .map(|token| token.location.start())
                        .unwrap_or_else(|| tokens.last().map(|t| t.location.end()).unwrap_or(strux_core::Position::try_new(1, 1, 0))),
                );
                let reduction = Reduction::new(production_index, children, at_if_empty);
                node_stack.push(ParseNode::Reduction(reduction));

                let goto_state = *state_stack.last().expect("state stack never empties");
                let target = tables
                    .goto(goto_state, &production.lhs)
                    .unwrap_or_else(|| panic!("no GOTO for state {goto_state} on {}", production.lhs));
                state_stack.push(target);
            }
            Action::Accept => {
                trace!(state, "accept");
                return Ok(node_stack.pop().expect("accept implies a reduced root node"));
            }
            Action::Error(code) => {
                let location = tokens
                    .get(cursor)
                    .map(|token| token.location)
                    .unwrap_or_else(|| {
                        Location::synthetic_point(
                            tokens.last().map(|t| t.location.end()).unwrap_or(strux_core::Position::try_new(1, 1, 0)),
                        )
                    });
                return Err(ParseError {
                    code,
                    token_index: cursor,
                    token: lookahead,
                    location,
                    state,
                    expected: tables.expected(state).into_iter().collect(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexSet as Set;
    use pretty_assertions::assert_eq;
    use strux_core::Position;

    use super::*;
    use crate::generator;
    use crate::generator::Options;
    use crate::grammar::Grammar;
    use crate::production::Production;

    fn grammar() -> Grammar {
        let terminals: Set<Symbol> = ["c", "d"].into_iter().map(Symbol::new).collect();
        let productions = vec![
            Production::parse("S -> C C").unwrap(),
            Production::parse("C -> c C").unwrap(),
            Production::parse("C -> d").unwrap(),
        ];
        Grammar::build(Symbol::new("S"), productions, terminals).unwrap()
    }

    fn token(symbol: &str, col: usize) -> Token {
        let start = Position::try_new(1, col, col - 1);
        let end = Position::try_new(1, col + 1, col);
        Token {
            symbol: Symbol::new(symbol),
            text: symbol.to_string(),
            location: Location::new(start, end),
        }
    }

    #[test]
    fn parses_ccd_cd() {
        let grammar = grammar();
        let tables = generator::generate(&grammar, Options::default()).unwrap();
        let tokens = vec![
            token("c", 1),
            token("c", 2),
            token("d", 3),
            token("c", 4),
            token("d", 5),
            token("$", 6),
        ];
        let tree = parse(&tables, &tokens).unwrap();
        let root = tree.as_reduction().unwrap();
        assert_eq!(root.production, 0); // $augmented-start -> S
    }

    #[test]
    fn reports_error_with_expected_set() {
        let grammar = grammar();
        let tables = generator::generate(&grammar, Options::default()).unwrap();
        let tokens = vec![token("$", 1)];
        let err = parse(&tables, &tokens).unwrap_err();
        assert_eq!(err.token, Symbol::new("$"));
        assert!(err.expected.contains(&Symbol::new("c")));
        assert!(err.expected.contains(&Symbol::new("d")));
    }
}
