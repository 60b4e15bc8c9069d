//! Indentation-aware tokenizer (spec.md §4.1).

mod patterns;

use strux_core::Location;
use strux_core::Position;
use tracing::debug_span;

use crate::symbol::Symbol;
use crate::tree::Token;
use patterns::Category;

/// A tokenizer error, carrying the file name so it renders the same way a
/// `codespan_reporting` diagnostic would.
#[derive(Clone, Debug, thiserror::Error)]
pub enum TokenizeError {
    /// No literal or regex pattern matched at this position.
    #[error("{file_name}:{location}: unrecognized token")]
    UnrecognizedToken {
        /// The source file name.
        file_name: String,
        /// The offending location.
        location: Location,
    },
    /// A line's leading whitespace did not match any open indent-stack
    /// entry when dedenting.
    #[error("{file_name}:{location}: bad indentation")]
    BadIndentation {
        /// The source file name.
        file_name: String,
        /// The offending location.
        location: Location,
    },
}

/// Tokenizes `text`, returning the full token stream (ending with synthetic
/// Dedents and without a trailing `$`, which the caller appends once it
/// knows no more files will be concatenated) or a non-empty error list.
pub fn tokenize(text: &str, file_name: &str) -> Result<Vec<Token>, Vec<TokenizeError>> {
    let span = debug_span!("tokenize", file_name, bytes = text.len());
    let _enter = span.enter();

    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let mut indent_stack: Vec<String> = vec![String::new()];
    let mut byte_offset = 0usize;

    for (line_index, line) in text.split('\n').enumerate() {
        let line_no = line_index + 1;
        let line_start_byte = byte_offset;
        byte_offset += line.len() + 1;

        let mut line_tokens = Vec::new();
        let mut col = 1usize;
        let mut rest = line;
        let mut only_trivia = true;

        while !rest.is_empty() {
            let literal = patterns::longest_literal(rest);
            let regex_match = patterns::longest_regex_match(rest);

            let chosen = match (literal, regex_match) {
                (Some(lit), Some((_, regex_len))) if lit.len() >= regex_len => {
                    Some((Symbol::new(lit), lit.len(), lit.to_string()))
                }
                (_, Some((category, len))) => {
                    let text = rest[..len].to_string();
                    if category == Category::Nil {
                        None
                    } else {
                        Some((Symbol::new(category.symbol_name()), len, text))
                    }
                }
                (Some(lit), None) => Some((Symbol::new(lit), lit.len(), lit.to_string())),
                (None, None) => {
                    errors.push(TokenizeError::UnrecognizedToken {
                        file_name: file_name.to_string(),
                        location: Location::synthetic_point(Position::try_new(
                            line_no,
                            col,
                            line_start_byte + col - 1,
                        )),
                    });
                    break;
                }
            };

            let Some((symbol, byte_len, text)) = chosen else {
                let width = match (literal, regex_match) {
                    (_, Some((_, len))) => len,
                    _ => unreachable!("nil branch only reached via a regex match"),
                };
                rest = &rest[width..];
                col += width;
                continue;
            };

            let start = Position::try_new(line_no, col, line_start_byte + col - 1);
            let end = Position::try_new(line_no, col + byte_len, line_start_byte + col - 1 + byte_len);
            if symbol.name() != "Comment" {
                only_trivia = false;
            }
            line_tokens.push(Token {
                symbol,
                text,
                location: Location::new(start, end),
            });
            rest = &rest[byte_len..];
            col += byte_len;
        }

        if !errors.is_empty() {
            continue;
        }

        if only_trivia {
            tokens.extend(line_tokens);
            tokens.push(eol_token(line_no, col, line_start_byte + col - 1));
            continue;
        }

        let leading_ws: String = line.chars().take_while(|c| *c == ' ' || *c == '\t').collect();
        let top = indent_stack.last().cloned().unwrap_or_default();

        if leading_ws == top {
            // Same level: no Indent/Dedent.
        } else if leading_ws.starts_with(top.as_str()) {
            let suffix = leading_ws[top.len()..].to_string();
            let at = Position::try_new(line_no, top.len() + 1, line_start_byte + top.len());
            tokens.push(Token {
                symbol: Symbol::new("Indent"),
                text: suffix,
                location: Location::synthetic_point(at),
            });
            indent_stack.push(leading_ws.clone());
        } else {
            let mut popped_to_match = false;
            while let Some(candidate) = indent_stack.last() {
                if *candidate == leading_ws {
                    popped_to_match = true;
                    break;
                }
                indent_stack.pop();
                let at = Position::try_new(line_no, 1, line_start_byte);
                tokens.push(Token {
                    symbol: Symbol::new("Dedent"),
                    text: String::new(),
                    location: Location::synthetic_point(at),
                });
            }
            if !popped_to_match {
                errors.push(TokenizeError::BadIndentation {
                    file_name: file_name.to_string(),
                    location: Location::synthetic_point(Position::try_new(line_no, 1, line_start_byte)),
                });
                continue;
            }
        }

        tokens.extend(line_tokens);
        tokens.push(eol_token(line_no, col, line_start_byte + col - 1));
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    let closing_line = text.split('\n').count() + 1;
    while indent_stack.len() > 1 {
        indent_stack.pop();
        tokens.push(eol_dedent(closing_line, byte_offset));
    }

    Ok(tokens)
}

fn eol_token(line_no: usize, col: usize, byte_no: usize) -> Token {
    Token {
        symbol: Symbol::new("EndOfLine"),
        text: String::new(),
        location: Location::synthetic_point(Position::try_new(line_no, col, byte_no)),
    }
}

fn eol_dedent(line_no: usize, byte_no: usize) -> Token {
    Token {
        symbol: Symbol::new("Dedent"),
        text: String::new(),
        location: Location::synthetic_point(Position::try_new(line_no, 1, byte_no)),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn symbols(tokens: &[Token]) -> Vec<String> {
        tokens.iter().map(|t| t.symbol.name().to_string()).collect()
    }

    #[test]
    fn tokenizes_keyword_and_punctuation() {
        let tokens = tokenize("struct Foo:\n", "t.strux").unwrap();
        assert_eq!(symbols(&tokens), vec!["struct", "CamelWord", ":", "EndOfLine"]);
    }

    #[test]
    fn blank_and_comment_lines_do_not_affect_indent_stack() {
        let tokens = tokenize("struct Foo:\n  # just a comment\n  let x = 1\n", "t.strux").unwrap();
        // The comment-only line contributes no Indent even though it is
        // more deeply indented than the previous line.
        assert_eq!(
            symbols(&tokens),
            vec![
                "struct", "CamelWord", ":", "EndOfLine",
                "Comment", "EndOfLine",
                "Indent", "let", "SnakeWord", "=", "Number", "EndOfLine",
                "Dedent",
            ]
        );
    }

    #[test]
    fn mismatched_dedent_is_an_error() {
        let text = "struct Foo:\n  let x = 1\n let y = 2\n";
        let errors = tokenize(text, "t.strux").unwrap_err();
        assert!(matches!(errors[0], TokenizeError::BadIndentation { .. }));
    }

    #[test]
    fn unrecognized_character_is_an_error() {
        let errors = tokenize("struct Foo: @\n", "t.strux").unwrap_err();
        assert!(matches!(errors[0], TokenizeError::UnrecognizedToken { .. }));
    }
}
