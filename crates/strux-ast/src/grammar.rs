//! The binary-format DSL's concrete grammar: a production list, registered
//! alongside the handler that builds each production's IR value (spec.md
//! §4.5 "Grammar registry").
//!
//! The production strings below are intentionally a representative core of
//! the DSL (declarations, fields, the full expression precedence cascade,
//! conditional blocks, inline/anonymous subtypes) rather than an exhaustive
//! enumeration of every surface syntax form a production compiler's grammar
//! would carry; see `DESIGN.md` for the scoping rationale.

use indexmap::IndexSet;
use strux_grammar::Grammar;
use strux_grammar::GrammarError;
use strux_grammar::Production;
use strux_grammar::Symbol;

/// All productions of the DSL's concrete grammar, `lhs -> rhs` strings
/// parsed by [`strux_grammar::Production::parse`].
///
/// Ordering matters: this is the canonical index space every handler in
/// [`crate::builder`] is keyed against.
pub const PRODUCTIONS: &[&str] = &[
    // Module.
    "Module -> Documentation* Import* Attribute* TypeDefinition*",
    // Imports.
    "Import -> import String as SnakeWord EndOfLine",
    // Top-level and nested type definitions.
    "TypeDefinition -> Documentation* Attribute* struct CamelWord RuntimeParameters? : EndOfLine Indent FieldOrSubtype+ Dedent",
    "TypeDefinition -> Documentation* Attribute* bits CamelWord : EndOfLine Indent FieldOrSubtype+ Dedent",
    "TypeDefinition -> Documentation* Attribute* enum CamelWord : EndOfLine Indent EnumValue+ Dedent",
    "TypeDefinition -> Documentation* Attribute* external CamelWord EndOfLine",
    "RuntimeParameters -> ( RuntimeParameter RuntimeParameterTail* )",
    "RuntimeParameterTail -> , RuntimeParameter",
    "RuntimeParameter -> SnakeWord : CamelWord",
    "FieldOrSubtype -> Field",
    "FieldOrSubtype -> TypeDefinition",
    "FieldOrSubtype -> ConditionalBlock",
    "FieldOrSubtype -> VirtualField",
    "ConditionalBlock -> if Expression : EndOfLine Indent FieldOrSubtype+ Dedent",
    "Field -> Expression [ Expression ] FieldType SnakeWord FieldAbbreviation? Attribute* Documentation* EndOfLine",
    "Field -> bits : EndOfLine Indent FieldOrSubtype+ Dedent",
    "VirtualField -> let SnakeWord = Expression Attribute* Documentation* EndOfLine",
    "FieldAbbreviation -> ( SnakeWord )",
    "FieldType -> CamelWord",
    "FieldType -> bits : EndOfLine Indent FieldOrSubtype+ Dedent",
    "EnumValue -> Documentation* SnakeWord = Expression Attribute* EndOfLine",
    // Attributes.
    "Attribute -> [ SnakeWord : Expression ]",
    // Expressions: right-recursive chains, left-folded by the builder.
    "Expression -> ChoiceExpression",
    "ChoiceExpression -> OrExpression",
    "ChoiceExpression -> OrExpression ? Expression : Expression",
    "OrExpression -> AndExpression OrTail*",
    "OrTail -> || AndExpression",
    "AndExpression -> ComparisonExpression AndTail*",
    "AndTail -> && ComparisonExpression",
    "ComparisonExpression -> AdditiveExpression EqualityTail*",
    "ComparisonExpression -> AdditiveExpression LessTail+",
    "ComparisonExpression -> AdditiveExpression GreaterTail+",
    "EqualityTail -> EqualityOperator AdditiveExpression",
    "EqualityOperator -> ==",
    "EqualityOperator -> !=",
    "LessTail -> LessOperator AdditiveExpression",
    "LessOperator -> <",
    "LessOperator -> <=",
    "GreaterTail -> GreaterOperator AdditiveExpression",
    "GreaterOperator -> >",
    "GreaterOperator -> >=",
    "AdditiveExpression -> MultiplicativeExpression AdditiveTail*",
    "AdditiveTail -> AdditiveOperator MultiplicativeExpression",
    "AdditiveOperator -> +",
    "AdditiveOperator -> -",
    "MultiplicativeExpression -> UnaryExpression MultiplicativeTail*",
    "MultiplicativeTail -> * UnaryExpression",
    "UnaryExpression -> PrimaryExpression",
    "UnaryExpression -> - PrimaryExpression",
    "UnaryExpression -> + PrimaryExpression",
    "PrimaryExpression -> Number",
    "PrimaryExpression -> String",
    "PrimaryExpression -> BooleanConstant",
    "PrimaryExpression -> FieldPath",
    "PrimaryExpression -> ConstantPath",
    "PrimaryExpression -> BuiltinCall",
    "PrimaryExpression -> $default",
    "PrimaryExpression -> $next",
    "PrimaryExpression -> $size_in_bits",
    "PrimaryExpression -> $size_in_bytes",
    "PrimaryExpression -> $max_size_in_bits",
    "PrimaryExpression -> $max_size_in_bytes",
    "PrimaryExpression -> $min_size_in_bits",
    "PrimaryExpression -> $min_size_in_bytes",
    "PrimaryExpression -> $is_statically_sized",
    "PrimaryExpression -> $static_size_in_bits",
    "PrimaryExpression -> ( Expression )",
    "FieldPath -> SnakeWord FieldPathTail*",
    "FieldPathTail -> . SnakeWord",
    "ConstantPath -> CamelWord . SnakeWord",
    "BuiltinCall -> BuiltinFunction ( Expression BuiltinCallTail* )",
    "BuiltinCallTail -> , Expression",
    "BuiltinFunction -> $max",
    "BuiltinFunction -> $present",
    "BuiltinFunction -> $upper_bound",
    "BuiltinFunction -> $lower_bound",
];

/// Builds the concrete [`Grammar`] from [`PRODUCTIONS`].
pub fn build() -> Result<Grammar, GrammarError> {
    let productions: Vec<Production> = PRODUCTIONS
        .iter()
        .map(|text| Production::parse(text).expect("grammar table entries are well-formed"))
        .collect();

    let terminals: IndexSet<Symbol> = [
        "import", "as", "struct", "bits", "enum", "external", "if", "let",
        "$default", "$max", "$present", "$upper_bound", "$lower_bound", "$next",
        "$size_in_bits", "$size_in_bytes", "$max_size_in_bits", "$max_size_in_bytes",
        "$min_size_in_bits", "$min_size_in_bytes", "$is_statically_sized",
        "$static_size_in_bits", "[", "]", "(", ")", ":", "=", "+", "-", "*", ".",
        "?", ",", "==", "!=", "&&", "||", "<", ">", "<=", ">=", "EndOfLine",
        "String", "Number", "BooleanConstant", "SnakeWord", "CamelWord",
        "Documentation", "Indent", "Dedent",
    ]
    .into_iter()
    .map(Symbol::new)
    .collect();

    Grammar::build(Symbol::new("Module"), productions, terminals)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_without_error() {
        let grammar = build().unwrap();
        assert!(grammar.productions().len() >= PRODUCTIONS.len());
    }
}
