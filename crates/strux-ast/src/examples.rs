//! Error-example corpus loader (spec.md §4.6).
//!
//! The corpus is a single text artifact committed alongside the grammar
//! registry: a block of prose followed by one record per diagnosed syntax
//! error, each record giving the error's message and one or more literal
//! source snippets that must fail to parse at a specific token.

use strux_core::Location;
use strux_core::Position;
use strux_grammar::tokenize;
use strux_grammar::Example;
use strux_grammar::Symbol;
use strux_grammar::Token;
use strux_grammar::TokenizeError;

const RECORD_DELIMITER: &str = "================================================================================";
const MESSAGE_DELIMITER: &str = "--------------------------------------------------------------------------------";
const EXAMPLE_DELIMITER: &str = "---";
const ERROR_MARKER: &str = "$ERR";
const ANY_MARKER: &str = "$ANY";

/// A single loaded example, ready to drive [`strux_grammar::label_example`].
#[derive(Clone, Debug)]
pub struct LoadedExample {
    /// The example, tokens ending with an end-of-input marker.
    pub example: Example,
    /// The error message this example installs as the error code.
    pub message: String,
    /// The example's source text, with marker tokens removed, for
    /// diagnostics and corpus round-tripping.
    pub original_text: String,
}

/// An error loading the error-example corpus.
#[derive(Debug, thiserror::Error)]
pub enum ExampleCorpusError {
    /// A record was not split into exactly a message and an example block by
    /// [`MESSAGE_DELIMITER`].
    #[error("record {index} is not a (message, examples) pair")]
    MalformedRecord {
        /// The zero-based index of the offending record, after discarding
        /// the leading prose record.
        index: usize,
    },
    /// An example's source text failed to tokenize.
    #[error("example {index} failed to tokenize: {errors:?}")]
    Tokenize {
        /// The zero-based index of the offending example across the whole
        /// corpus.
        index: usize,
        /// The underlying tokenizer errors.
        errors: Vec<TokenizeError>,
    },
    /// An example's source text had no `$ERR` marker.
    #[error("example {index} is missing its {ERROR_MARKER} marker")]
    MissingErrorMarker {
        /// The zero-based index of the offending example across the whole
        /// corpus.
        index: usize,
    },
}

/// Loads every example from `corpus`, tokenizing each against the real
/// tokenizer and resolving its `$ERR`/`$ANY` markers.
pub fn load_examples(corpus: &str, file_name: &str) -> Result<Vec<LoadedExample>, ExampleCorpusError> {
    let records = split_on_delimiter(corpus, RECORD_DELIMITER);
    let mut loaded = Vec::new();
    let mut example_index = 0usize;

    for (record_index, record) in records.into_iter().skip(1).enumerate() {
        let parts = split_on_delimiter(&record, MESSAGE_DELIMITER);
        let [message, examples_block] = parts.as_slice() else {
            return Err(ExampleCorpusError::MalformedRecord { index: record_index });
        };
        let message = message.trim().to_string();

        for example_text in split_on_delimiter(examples_block, EXAMPLE_DELIMITER) {
            let trimmed = example_text.trim_matches('\n').to_string();
            loaded.push(load_one(&trimmed, file_name, example_index, &message)?);
            example_index += 1;
        }
    }

    Ok(loaded)
}

fn load_one(
    text: &str,
    file_name: &str,
    index: usize,
    message: &str,
) -> Result<LoadedExample, ExampleCorpusError> {
    let mut tokens =
        tokenize(text, file_name).map_err(|errors| ExampleCorpusError::Tokenize { index, errors })?;

    let Some(marker_at) = tokens.iter().position(|token| token.text == ERROR_MARKER) else {
        return Err(ExampleCorpusError::MissingErrorMarker { index });
    };
    tokens.remove(marker_at);

    let any_token = tokens
        .get(marker_at)
        .map(|token| token.text == ANY_MARKER)
        .unwrap_or(false);
    if any_token {
        tokens.remove(marker_at);
    }

    let fail_at = marker_at;
    tokens.push(end_of_input_token(&tokens));

    Ok(LoadedExample {
        example: Example {
            tokens,
            fail_at: Some(fail_at),
            code: Some(message.to_string()),
            any_token,
        },
        message: message.to_string(),
        original_text: text.to_string(),
    })
}

fn end_of_input_token(tokens: &[Token]) -> Token {
    let at = tokens
        .last()
        .map(|token| token.location.end())
        .unwrap_or_else(|| Position::try_new(1, 1, 0));
    Token {
        symbol: Symbol::end_of_input(),
        text: String::new(),
        location: Location::synthetic_point(at),
    }
}

/// Splits `text` into chunks wherever a line is exactly `delimiter`,
/// discarding the delimiter lines themselves.
fn split_on_delimiter(text: &str, delimiter: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    for line in text.lines() {
        if line == delimiter {
            chunks.push(std::mem::take(&mut current));
        } else {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
        }
    }
    chunks.push(current);
    chunks
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn corpus() -> String {
        format!(
            "this corpus documents the syntax errors a host may see.\n{record}\nfield requires a name.\n{message}\nstruct S:\n  0 [+1]  UInt{err}\n",
            record = RECORD_DELIMITER,
            message = MESSAGE_DELIMITER,
            err = format!("\n{ERROR_MARKER}"),
        )
    }

    #[test]
    fn loads_a_single_example() {
        let loaded = load_examples(&corpus(), "errors.strux").unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].message, "field requires a name.");
        assert!(!loaded[0].example.any_token);
        assert!(loaded[0].example.fail_at.is_some());
        assert!(loaded[0].example.tokens.last().unwrap().symbol == Symbol::end_of_input());
    }

    #[test]
    fn missing_marker_is_an_error() {
        let corpus = format!(
            "this corpus documents the syntax errors a host may see.\n{record}\nmissing marker.\n{message}\nstruct S:\n",
            record = RECORD_DELIMITER,
            message = MESSAGE_DELIMITER,
        );
        let err = load_examples(&corpus, "errors.strux").unwrap_err();
        assert!(matches!(err, ExampleCorpusError::MissingErrorMarker { .. }));
    }

    #[test]
    fn any_marker_sets_the_wildcard_flag() {
        let corpus = format!(
            "this corpus documents the syntax errors a host may see.\n{record}\nany token fails here.\n{message}\nstruct S:{err} {any}\n",
            record = RECORD_DELIMITER,
            message = MESSAGE_DELIMITER,
            err = format!("\n{ERROR_MARKER}"),
            any = ANY_MARKER,
        );
        let loaded = load_examples(&corpus, "errors.strux").unwrap();
        assert!(loaded[0].example.any_token);
    }
}
