//! Front-end compilation pipeline for the strux binary-format DSL.
//!
//! This crate composes the grammar-agnostic lexer/parser (`strux-grammar`)
//! with the DSL's concrete grammar and IR builder (`strux-ast`) into a
//! single [`compile`] entry point, and re-exports the public types of both
//! so a host only needs this one dependency.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

mod diagnostic;

pub use diagnostic::Diagnostic;
pub use diagnostic::Severity;
pub use strux_ast::grammar;
pub use strux_ast::ir;
pub use strux_ast::BuildError;
pub use strux_ast::ExampleCorpusError;
pub use strux_ast::LoadedExample;
pub use strux_grammar::CachedTables;
pub use strux_grammar::GeneratorOptions;
pub use strux_grammar::ParserTables;
pub use strux_grammar::Staleness;

use strux_core::Location;
use strux_core::Position;
use strux_grammar::generate;
use strux_grammar::label_example;
use strux_grammar::parse;
use strux_grammar::tokenize;
use strux_grammar::Grammar;
use strux_grammar::GrammarError;
use strux_grammar::GeneratorError;
use strux_grammar::LabelingError;
use strux_grammar::ParseError;
use strux_grammar::Symbol;
use strux_grammar::Token;
use strux_grammar::TokenizeError;
use tracing::debug_span;

/// Any failure in the tokenize → parse → build pipeline.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// The concrete grammar itself failed to build (a defect in the grammar
    /// registry, not in the input source).
    #[error("grammar registry error: {0}")]
    Grammar(#[from] GrammarError),
    /// The source text failed to tokenize.
    #[error("{} tokenize error(s)", .0.len())]
    Tokenize(Vec<TokenizeError>),
    /// Table construction failed (only possible with
    /// [`GeneratorOptions::fatal_conflicts`] set and a genuinely ambiguous
    /// grammar).
    #[error(transparent)]
    Generate(#[from] GeneratorError),
    /// The token stream did not match the grammar.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The parse tree could not be translated into the Module IR.
    #[error(transparent)]
    Build(#[from] BuildError),
}

impl CompileError {
    /// Renders this error as a [`Diagnostic`] a host can print with
    /// `codespan-reporting`.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            CompileError::Grammar(error) => Diagnostic::error(error.to_string()),
            CompileError::Tokenize(errors) => {
                let mut diagnostic = Diagnostic::error("failed to tokenize source");
                for error in errors {
                    let location = match error {
                        TokenizeError::UnrecognizedToken { location, .. } => *location,
                        TokenizeError::BadIndentation { location, .. } => *location,
                    };
                    diagnostic = diagnostic.with_label(error.to_string(), location);
                }
                diagnostic
            }
            CompileError::Generate(error) => Diagnostic::error(error.to_string()),
            CompileError::Parse(error) => {
                let mut diagnostic = Diagnostic::error(format!("unexpected {token}", token = error.token))
                    .with_label("unexpected token", error.location);
                if let Some(code) = &error.code {
                    diagnostic = diagnostic.with_code(code.clone());
                }
                diagnostic
            }
            CompileError::Build(error) => Diagnostic::error(error.to_string()),
        }
    }
}

/// Builds the concrete grammar, compiles `source` into parser tables fresh
/// every time, and drives it to completion, producing the [`ir::Module`].
///
/// Hosts that compile many files against the same grammar should instead
/// build the [`ParserTables`] once (via [`generate_tables`] or a loaded
/// cache) and call [`compile_with_tables`] per file.
pub fn compile(source: &str, file_name: &str) -> Result<ir::Module, CompileError> {
    let span = debug_span!("compile", file_name);
    let _enter = span.enter();

    let grammar = strux_ast::grammar::build()?;
    let tables = generate(&grammar, GeneratorOptions::default())?;
    compile_with_tables(source, file_name, &grammar, &tables)
}

/// Tokenizes and parses `source` against an already-built `tables`, then
/// builds the Module IR. Use this to amortize table construction (or a
/// loaded parser cache) across many compilations.
pub fn compile_with_tables(
    source: &str,
    file_name: &str,
    grammar: &Grammar,
    tables: &ParserTables,
) -> Result<ir::Module, CompileError> {
    let tokens = tokenize_with_end_marker(source, file_name).map_err(CompileError::Tokenize)?;
    let tree = parse(tables, &tokens)?;
    let module = strux_ast::build_ir(&tree, grammar)?;
    Ok(module)
}

/// Builds fresh canonical LR(1) tables for the concrete grammar.
pub fn generate_tables(options: GeneratorOptions) -> Result<(Grammar, ParserTables), CompileError> {
    let grammar = strux_ast::grammar::build()?;
    let tables = generate(&grammar, options)?;
    Ok((grammar, tables))
}

/// Loads the error-example corpus and labels `tables` with every example's
/// error code, in place.
pub fn label_corpus(
    tables: &mut ParserTables,
    corpus: &str,
    file_name: &str,
) -> Result<(), CorpusLabelingError> {
    let examples = strux_ast::load_examples(corpus, file_name)?;
    for loaded in &examples {
        label_example(tables, &loaded.example)?;
    }
    Ok(())
}

/// A failure loading or applying the error-example corpus.
#[derive(Debug, thiserror::Error)]
pub enum CorpusLabelingError {
    /// The corpus text itself was malformed.
    #[error(transparent)]
    Corpus(#[from] ExampleCorpusError),
    /// An example's expectation did not hold against the generated tables.
    #[error(transparent)]
    Labeling(#[from] LabelingError),
}

fn tokenize_with_end_marker(source: &str, file_name: &str) -> Result<Vec<Token>, Vec<TokenizeError>> {
    let mut tokens = tokenize(source, file_name)?;
    let at = tokens
        .last()
        .map(|token| token.location.end())
        .unwrap_or_else(|| Position::try_new(1, 1, 0));
    tokens.push(Token {
        symbol: Symbol::end_of_input(),
        text: String::new(),
        location: Location::synthetic_point(at),
    });
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn compiles_a_minimal_struct() {
        let module = compile("struct Foo:\n  0 [+1]  UInt  x\n", "t.strux").unwrap();
        assert_eq!(module.type_definitions.len(), 1);
        assert_eq!(module.imports.len(), 1, "the synthetic prelude import is always present");
    }

    #[test]
    fn reports_a_tokenize_error_as_a_diagnostic() {
        let err = compile("struct Foo: @\n", "t.strux").unwrap_err();
        let diagnostic = err.to_diagnostic();
        assert_eq!(diagnostic.to_codespan(()).severity, codespan_reporting::diagnostic::Severity::Error);
    }
}
