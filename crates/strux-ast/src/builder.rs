//! Grammar-directed parse-tree → Module IR translation (spec.md §4.5).

use convert_case::Case;
use convert_case::Casing;
use strux_core::Location;
use strux_grammar::AutoProductionKind;
use strux_grammar::Grammar;
use strux_grammar::ParseNode;
use strux_grammar::Production;
use strux_grammar::Reduction;
use strux_grammar::Token;
use tracing::debug_span;

use crate::ir::AddressableUnit;
use crate::ir::Attribute;
use crate::ir::Documentation;
use crate::ir::EnumValue;
use crate::ir::Expression;
use crate::ir::Field;
use crate::ir::Import;
use crate::ir::Module;
use crate::ir::NameDefinition;
use crate::ir::Operator;
use crate::ir::Reference;
use crate::ir::RuntimeParameter;
use crate::ir::TypeDefinition;
use crate::ir::Word;

/// The maximum nesting depth of inline type definitions the builder will
/// follow before giving up, bounding pathological input rather than
/// overflowing an internal stack (an Open Question in spec.md §4.5, decided
/// here; see `DESIGN.md`).
pub const MAX_TYPE_NESTING: usize = 64;

/// An error building the Module IR from a parse tree.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// No handler is registered for a production encountered during the
    /// walk. Indicates a grammar/builder mismatch, not a malformed input.
    #[error("no IR builder handler registered for production `{production}`")]
    UnhandledProduction {
        /// The unhandled production, rendered as `lhs -> rhs...`.
        production: String,
    },
    /// A handler received a child of the wrong shape (a grammar/builder
    /// mismatch, not a malformed input).
    #[error("handler for `{production}` received an unexpected child shape")]
    MalformedChildren {
        /// The production whose handler failed.
        production: String,
    },
    /// A numeric literal's digits could not be decoded.
    #[error("malformed numeric literal `{text}`")]
    MalformedNumber {
        /// The literal's source text.
        text: String,
    },
    /// Inline type definitions nested more than [`MAX_TYPE_NESTING`] deep.
    #[error("inline type definitions nested past the limit of {MAX_TYPE_NESTING}")]
    TypeNestingTooDeep,
}

/// Per-build mutable state threaded through the tree walk: the anonymous
/// bit-block field counter (spec.md §4.5 "Anonymous bit blocks") and the
/// current inline-type nesting depth.
#[derive(Default)]
struct BuildContext {
    anonymous_field_counter: usize,
    nesting_depth: usize,
}

impl BuildContext {
    fn next_anonymous_field_name(&mut self) -> String {
        let name = format!("strux_reserved_anonymous_field_{}", self.anonymous_field_counter);
        self.anonymous_field_counter += 1;
        name
    }
}

/// The contribution of a single `FieldOrSubtype` node: zero or more fields
/// (conditional blocks can expand to several) and zero or more subtypes
/// synthesized along the way.
#[derive(Clone, Debug, Default)]
struct FieldOrSubtype {
    fields: Vec<Field>,
    subtypes: Vec<TypeDefinition>,
}

/// The contribution of a field's declared type: either a plain reference to
/// an already-named type, or an inline definition awaiting the enclosing
/// field's name before it can be assigned a synthesized name (spec.md §4.5
/// "Inline types").
#[derive(Clone, Debug)]
enum FieldTypeValue {
    Named(String),
    Inline {
        fields: Vec<Field>,
        subtypes: Vec<TypeDefinition>,
        addressable_unit: AddressableUnit,
    },
}

/// A dynamically typed intermediate value produced while walking the parse
/// tree bottom-up. Every grammar symbol's handler returns one of these; the
/// Module IR types in [`crate::ir`] are only realized for nodes the grammar
/// actually builds.
#[derive(Clone, Debug)]
enum BuildValue {
    Token(Token),
    List(Vec<BuildValue>),
    Documentation(Documentation),
    Import(Import),
    Attribute(Attribute),
    RuntimeParameter(RuntimeParameter),
    EnumValue(EnumValue),
    FieldOrSubtype(FieldOrSubtype),
    FieldType(FieldTypeValue),
    Expression(Expression),
    /// A `(operator, rhs, source_text)` tail used by the left-fold and
    /// chained-comparison expansion rules.
    Tail(Operator, Expression, String),
    TypeDefinition(TypeDefinition),
    Module(Module),
}

impl BuildValue {
    fn into_token(self) -> Result<Token, String> {
        match self {
            BuildValue::Token(token) => Ok(token),
            other => Err(format!("expected a token, got {other:?}")),
        }
    }

    fn into_list(self) -> Result<Vec<BuildValue>, String> {
        match self {
            BuildValue::List(list) => Ok(list),
            other => Err(format!("expected a list, got {other:?}")),
        }
    }

    fn into_expression(self) -> Result<Expression, String> {
        match self {
            BuildValue::Expression(expr) => Ok(expr),
            other => Err(format!("expected an expression, got {other:?}")),
        }
    }
}

/// Builds the Module IR for `tree`, the root parse-tree node of a full
/// source file, using `grammar` to resolve production shapes and
/// auto-generated list productions.
///
/// The walk is iterative (an explicit stack of frames), never recursing
/// through Rust's call stack, since real parse trees can be thousands of
/// nodes deep (spec.md §4.5).
pub fn build_ir(tree: &ParseNode, grammar: &Grammar) -> Result<Module, BuildError> {
    let span = debug_span!("build_ir");
    let _enter = span.enter();

    enum Frame<'a> {
        Visit(&'a ParseNode),
        Reduce(&'a Reduction),
    }

    let mut context = BuildContext::default();
    let mut work: Vec<Frame<'_>> = vec![Frame::Visit(tree)];
    let mut values: Vec<BuildValue> = Vec::new();

    while let Some(frame) = work.pop() {
        match frame {
            Frame::Visit(ParseNode::Token(token)) => values.push(BuildValue::Token(token.clone())),
            Frame::Visit(ParseNode::Reduction(reduction)) => {
                work.push(Frame::Reduce(reduction));
                for child in reduction.children.iter().rev() {
                    work.push(Frame::Visit(child));
                }
            }
            Frame::Reduce(reduction) => {
                let arity = reduction.children.len();
                let children = values.split_off(values.len() - arity);
                let production = &grammar.productions()[reduction.production];
                let built = dispatch(
                    &mut context,
                    grammar,
                    reduction.production,
                    production,
                    children,
                    reduction.location,
                )?;
                let built = if reduction.location.is_synthetic() {
                    built
                } else {
                    apply_reduction_location(built, reduction.location)
                };
                values.push(built);
            }
        }
    }

    match values.pop() {
        Some(BuildValue::Module(module)) => Ok(module),
        _ => Err(BuildError::UnhandledProduction {
            production: "<root>".to_string(),
        }),
    }
}

/// After a production's handler returns, assigns the production's own parse
/// location to the result (spec.md §4.5 "After the handler returns..."): a
/// value with no location field of its own (a list, token, or intermediate
/// builder value) passes through unchanged; a value that already carries a
/// location has it widened to the full parse node, since every location a
/// handler builds is derived from a subset of that node's own children.
fn apply_reduction_location(value: BuildValue, location: Location) -> BuildValue {
    match value {
        BuildValue::Documentation(mut v) => {
            v.location = location;
            BuildValue::Documentation(v)
        }
        BuildValue::Import(mut v) => {
            v.location = location;
            BuildValue::Import(v)
        }
        BuildValue::Attribute(mut v) => {
            v.location = location;
            BuildValue::Attribute(v)
        }
        BuildValue::RuntimeParameter(mut v) => {
            v.location = location;
            BuildValue::RuntimeParameter(v)
        }
        BuildValue::EnumValue(mut v) => {
            v.location = location;
            BuildValue::EnumValue(v)
        }
        BuildValue::Expression(expr) => BuildValue::Expression(expr.with_location(location)),
        BuildValue::TypeDefinition(def) => BuildValue::TypeDefinition(def.with_location(location)),
        BuildValue::Module(mut v) => {
            v.location = location;
            BuildValue::Module(v)
        }
        other => other,
    }
}

fn malformed(production: &Production) -> BuildError {
    BuildError::MalformedChildren {
        production: production.to_string(),
    }
}

fn dispatch(
    ctx: &mut BuildContext,
    grammar: &Grammar,
    index: usize,
    production: &Production,
    mut children: Vec<BuildValue>,
    location: Location,
) -> Result<BuildValue, BuildError> {
    if let Some(kind) = grammar.auto_kind(index) {
        return Ok(build_auto(kind, children));
    }

    let rhs: Vec<&str> = production.rhs.iter().map(|s| s.name()).collect();
    match (production.lhs.name(), rhs.as_slice()) {
        ("Module", ["Documentation*", "Import*", "Attribute*", "TypeDefinition*"]) => {
            build_module(production, children, location)
        }
        ("Import", ["import", "String", "as", "SnakeWord", "EndOfLine"]) => {
            build_import(production, children)
        }
        (
            "TypeDefinition",
            ["Documentation*", "Attribute*", "struct", "CamelWord", "RuntimeParameters?", ":", "EndOfLine", "Indent", "FieldOrSubtype+", "Dedent"],
        ) => build_structure(ctx, production, children, location, AddressableUnit::Byte, true),
        (
            "TypeDefinition",
            ["Documentation*", "Attribute*", "bits", "CamelWord", ":", "EndOfLine", "Indent", "FieldOrSubtype+", "Dedent"],
        ) => build_structure(ctx, production, children, location, AddressableUnit::Bit, false),
        (
            "TypeDefinition",
            ["Documentation*", "Attribute*", "enum", "CamelWord", ":", "EndOfLine", "Indent", "EnumValue+", "Dedent"],
        ) => build_enum(production, children, location),
        ("TypeDefinition", ["Documentation*", "Attribute*", "external", "CamelWord", "EndOfLine"]) => {
            build_external(production, children, location)
        }
        ("RuntimeParameters", ["(", "RuntimeParameter", "RuntimeParameterTail*", ")"]) => {
            build_runtime_parameters(production, children)
        }
        ("RuntimeParameterTail", [",", "RuntimeParameter"]) => {
            Ok(children.remove(1))
        }
        ("RuntimeParameter", ["SnakeWord", ":", "CamelWord"]) => {
            build_runtime_parameter(production, children, location)
        }
        ("FieldOrSubtype", ["Field"]) => {
            let field = expect_field(production, children.remove(0))?;
            Ok(BuildValue::FieldOrSubtype(FieldOrSubtype {
                fields: vec![field],
                subtypes: vec![],
            }))
        }
        ("FieldOrSubtype", ["TypeDefinition"]) => {
            let subtype = expect_type_definition(production, children.remove(0))?;
            Ok(BuildValue::FieldOrSubtype(FieldOrSubtype {
                fields: vec![],
                subtypes: vec![subtype],
            }))
        }
        ("FieldOrSubtype", ["ConditionalBlock"]) => Ok(children.remove(0)),
        ("FieldOrSubtype", ["VirtualField"]) => Ok(children.remove(0)),
        ("ConditionalBlock", ["if", "Expression", ":", "EndOfLine", "Indent", "FieldOrSubtype+", "Dedent"]) => {
            build_conditional_block(production, children)
        }
        (
            "Field",
            ["Expression", "[", "Expression", "]", "FieldType", "SnakeWord", "FieldAbbreviation?", "Attribute*", "Documentation*", "EndOfLine"],
        ) => build_named_field(production, children, location),
        ("Field", ["bits", ":", "EndOfLine", "Indent", "FieldOrSubtype+", "Dedent"]) => {
            build_anonymous_bit_field(ctx, production, children, location)
        }
        ("VirtualField", ["let", "SnakeWord", "=", "Expression", "Attribute*", "Documentation*", "EndOfLine"]) => {
            build_virtual_field(production, children, location)
        }
        ("FieldAbbreviation", ["(", "SnakeWord", ")"]) => {
            let name = expect_token(production, children.remove(1))?.text;
            Ok(BuildValue::Token(Token {
                symbol: strux_grammar::Symbol::new("SnakeWord"),
                text: name,
                location,
            }))
        }
        ("FieldType", ["CamelWord"]) => {
            let name = expect_token(production, children.remove(0))?.text;
            Ok(BuildValue::FieldType(FieldTypeValue::Named(name)))
        }
        ("FieldType", ["bits", ":", "EndOfLine", "Indent", "FieldOrSubtype+", "Dedent"]) => {
            let collected = expect_list(production, children.remove(4))?;
            let (fields, subtypes) = flatten_field_or_subtypes(collected)?;
            Ok(BuildValue::FieldType(FieldTypeValue::Inline {
                fields,
                subtypes,
                addressable_unit: AddressableUnit::Bit,
            }))
        }
        ("EnumValue", ["Documentation*", "SnakeWord", "=", "Expression", "Attribute*", "EndOfLine"]) => {
            build_enum_value(production, children, location)
        }
        ("Attribute", ["[", "SnakeWord", ":", "Expression", "]"]) => build_attribute(production, children, location),
        ("Expression", ["ChoiceExpression"]) => Ok(children.remove(0)),
        ("ChoiceExpression", ["OrExpression"]) => Ok(children.remove(0)),
        ("ChoiceExpression", ["OrExpression", "?", "Expression", ":", "Expression"]) => {
            build_choice(production, children, location)
        }
        ("OrExpression", ["AndExpression", "OrTail*"]) => build_fold(production, children, Operator::Or),
        ("OrTail", ["||", "AndExpression"]) => build_tail(production, children, Operator::Or),
        ("AndExpression", ["ComparisonExpression", "AndTail*"]) => build_fold(production, children, Operator::And),
        ("AndTail", ["&&", "ComparisonExpression"]) => build_tail(production, children, Operator::And),
        ("ComparisonExpression", ["AdditiveExpression", "EqualityTail*"]) => build_chain(production, children),
        ("ComparisonExpression", ["AdditiveExpression", "LessTail+"]) => build_chain(production, children),
        ("ComparisonExpression", ["AdditiveExpression", "GreaterTail+"]) => build_chain(production, children),
        ("EqualityTail", ["EqualityOperator", "AdditiveExpression"]) => build_operator_tail(production, children),
        ("LessTail", ["LessOperator", "AdditiveExpression"]) => build_operator_tail(production, children),
        ("GreaterTail", ["GreaterOperator", "AdditiveExpression"]) => build_operator_tail(production, children),
        ("EqualityOperator" | "LessOperator" | "GreaterOperator", [symbol]) => build_operator_token(production, children, symbol),
        ("AdditiveExpression", ["MultiplicativeExpression", "AdditiveTail*"]) => {
            build_fold_with_operator(production, children)
        }
        ("AdditiveTail", ["AdditiveOperator", "MultiplicativeExpression"]) => build_operator_tail(production, children),
        ("AdditiveOperator", [symbol]) => build_operator_token(production, children, symbol),
        ("MultiplicativeExpression", ["UnaryExpression", "MultiplicativeTail*"]) => {
            build_fold(production, children, Operator::Multiplication)
        }
        ("MultiplicativeTail", ["*", "UnaryExpression"]) => build_tail(production, children, Operator::Multiplication),
        ("UnaryExpression", ["PrimaryExpression"]) => Ok(children.remove(0)),
        ("UnaryExpression", ["-", "PrimaryExpression"]) => build_unary(production, children, Operator::Subtraction),
        ("UnaryExpression", ["+", "PrimaryExpression"]) => build_unary(production, children, Operator::Addition),
        ("PrimaryExpression", ["Number"]) => build_numeric_constant(production, children),
        ("PrimaryExpression", ["String"]) => build_string_constant(production, children),
        ("PrimaryExpression", ["BooleanConstant"]) => build_boolean_constant(production, children),
        ("PrimaryExpression", ["FieldPath"]) => Ok(children.remove(0)),
        ("PrimaryExpression", ["ConstantPath"]) => Ok(children.remove(0)),
        ("PrimaryExpression", ["BuiltinCall"]) => Ok(children.remove(0)),
        ("PrimaryExpression", [builtin]) if builtin.starts_with('$') => {
            build_builtin_reference(production, children)
        }
        ("PrimaryExpression", ["(", "Expression", ")"]) => Ok(children.remove(1)),
        ("FieldPath", ["SnakeWord", "FieldPathTail*"]) => build_field_path(production, children, location),
        ("FieldPathTail", [".", "SnakeWord"]) => Ok(children.remove(1)),
        ("ConstantPath", ["CamelWord", ".", "SnakeWord"]) => build_constant_path(production, children, location),
        ("BuiltinCall", ["BuiltinFunction", "(", "Expression", "BuiltinCallTail*", ")"]) => {
            build_builtin_call(production, children, location)
        }
        ("BuiltinCallTail", [",", "Expression"]) => Ok(children.remove(1)),
        ("BuiltinFunction", [symbol]) => build_builtin_function_token(production, children, symbol),
        _ => Err(BuildError::UnhandledProduction {
            production: production.to_string(),
        }),
    }
}

fn build_auto(kind: AutoProductionKind, mut children: Vec<BuildValue>) -> BuildValue {
    match kind {
        AutoProductionKind::Empty => BuildValue::List(Vec::new()),
        AutoProductionKind::Singleton => BuildValue::List(vec![children.remove(0)]),
        AutoProductionKind::Cons => {
            let tail = children.pop().expect("cons production has a tail child");
            let head = children.pop().expect("cons production has a head child");
            let mut list = tail.into_list().unwrap_or_default();
            list.insert(0, head);
            BuildValue::List(list)
        }
    }
}

fn expect_token(production: &Production, value: BuildValue) -> Result<Token, BuildError> {
    value.into_token().map_err(|_| malformed(production))
}

fn expect_list(production: &Production, value: BuildValue) -> Result<Vec<BuildValue>, BuildError> {
    value.into_list().map_err(|_| malformed(production))
}

fn expect_expression(production: &Production, value: BuildValue) -> Result<Expression, BuildError> {
    value.into_expression().map_err(|_| malformed(production))
}

fn expect_field(production: &Production, value: BuildValue) -> Result<Field, BuildError> {
    match value {
        BuildValue::FieldOrSubtype(mut fos) if fos.fields.len() == 1 && fos.subtypes.is_empty() => {
            Ok(fos.fields.remove(0))
        }
        _ => Err(malformed(production)),
    }
}

fn expect_type_definition(production: &Production, value: BuildValue) -> Result<TypeDefinition, BuildError> {
    match value {
        BuildValue::TypeDefinition(def) => Ok(def),
        _ => Err(malformed(production)),
    }
}

fn flatten_field_or_subtypes(list: Vec<BuildValue>) -> Result<(Vec<Field>, Vec<TypeDefinition>), BuildError> {
    let mut fields = Vec::new();
    let mut subtypes = Vec::new();
    for item in list {
        if let BuildValue::FieldOrSubtype(fos) = item {
            fields.extend(fos.fields);
            subtypes.extend(fos.subtypes);
        }
    }
    Ok((fields, subtypes))
}

fn documentation_list(production: &Production, value: BuildValue) -> Result<Vec<Documentation>, BuildError> {
    let list = expect_list(production, value)?;
    list.into_iter()
        .map(|v| match v {
            BuildValue::Token(token) => Ok(Documentation {
                text: documentation_text(&token.text),
                location: token.location,
            }),
            _ => Err(malformed(production)),
        })
        .collect()
}

fn documentation_text(raw: &str) -> String {
    raw.strip_prefix("-- ").or_else(|| raw.strip_prefix("--")).unwrap_or(raw).to_string()
}

fn attribute_list(production: &Production, value: BuildValue) -> Result<Vec<Attribute>, BuildError> {
    let list = expect_list(production, value)?;
    list.into_iter()
        .map(|v| match v {
            BuildValue::Attribute(attr) => Ok(attr),
            _ => Err(malformed(production)),
        })
        .collect()
}

fn build_module(
    production: &Production,
    mut children: Vec<BuildValue>,
    location: Location,
) -> Result<BuildValue, BuildError> {
    let type_defs_list = expect_list(production, children.pop().unwrap())?;
    let attributes = attribute_list(production, children.pop().unwrap())?;
    let imports_list = expect_list(production, children.pop().unwrap())?;
    let documentation = documentation_list(production, children.pop().unwrap())?;

    let mut type_definitions = Vec::with_capacity(type_defs_list.len());
    for item in type_defs_list {
        type_definitions.push(expect_type_definition(production, item)?);
    }

    let mut imports = Vec::with_capacity(imports_list.len() + 1);
    let prelude_location = type_definitions
        .first()
        .map(TypeDefinition::name)
        .map(|name| Location::synthetic_point(name.location.start()))
        .unwrap_or_else(|| Location::synthetic_point(strux_core::Position::try_new(1, 1, 0)));
    imports.push(Import {
        file_name: String::new(),
        local_name: String::new(),
        location: prelude_location,
    });
    for item in imports_list {
        match item {
            BuildValue::Import(import) => imports.push(import),
            _ => return Err(malformed(production)),
        }
    }

    Ok(BuildValue::Module(Module {
        documentation,
        imports,
        attributes,
        type_definitions,
        location,
    }))
}

fn build_import(production: &Production, mut children: Vec<BuildValue>) -> Result<BuildValue, BuildError> {
    let local = expect_token(production, children.remove(3))?;
    let file = expect_token(production, children.remove(1))?;
    let location = Location::span(&file.location, &local.location);
    Ok(BuildValue::Import(Import {
        file_name: decode_string_literal(&file.text),
        local_name: local.text,
        location,
    }))
}

#[allow(clippy::too_many_arguments)]
fn build_structure(
    ctx: &mut BuildContext,
    production: &Production,
    mut children: Vec<BuildValue>,
    location: Location,
    addressable_unit: AddressableUnit,
    has_runtime_parameters: bool,
) -> Result<BuildValue, BuildError> {
    ctx.nesting_depth += 1;
    if ctx.nesting_depth > MAX_TYPE_NESTING {
        return Err(BuildError::TypeNestingTooDeep);
    }

    children.pop(); // Dedent: no payload.
    let field_or_subtypes = expect_list(production, children.pop().unwrap())?; // FieldOrSubtype+
    // `children` now holds, in order: Documentation*, Attribute*, struct|bits,
    // CamelWord, [RuntimeParameters?], ':', EndOfLine, Indent — the last
    // three are structural tokens with no payload, left untouched below.

    let (fields, subtypes) = flatten_field_or_subtypes(field_or_subtypes)?;

    // Re-derive the remaining children by position rather than further pops,
    // since the two structure alternatives differ in arity (RuntimeParameters?
    // only appears for `struct`).
    let runtime_parameters = if has_runtime_parameters {
        match children.get(4) {
            Some(BuildValue::List(_)) => {
                let list = expect_list(production, children.remove(4))?;
                list.into_iter()
                    .map(|v| match v {
                        BuildValue::RuntimeParameter(p) => Ok(p),
                        _ => Err(malformed(production)),
                    })
                    .collect::<Result<Vec<_>, _>>()?
            }
            _ => Vec::new(),
        }
    } else {
        Vec::new()
    };

    let name_token = expect_token(production, children.remove(3))?;
    let attributes = attribute_list(production, children.remove(1))?;
    let documentation = documentation_list(production, children.remove(0))?;

    ctx.nesting_depth -= 1;

    Ok(BuildValue::TypeDefinition(TypeDefinition::Structure {
        name: NameDefinition {
            text: name_token.text,
            location: name_token.location,
        },
        fields,
        subtypes,
        runtime_parameters,
        addressable_unit,
        attributes,
        documentation,
        location,
    }))
}

fn build_enum(production: &Production, mut children: Vec<BuildValue>, location: Location) -> Result<BuildValue, BuildError> {
    children.pop(); // Dedent: no payload.
    let values_list = expect_list(production, children.pop().unwrap())?; // EnumValue+
    let name_token = expect_token(production, children.remove(3))?;
    let attributes = attribute_list(production, children.remove(1))?;
    let documentation = documentation_list(production, children.remove(0))?;

    let values = values_list
        .into_iter()
        .map(|v| match v {
            BuildValue::EnumValue(value) => Ok(value),
            _ => Err(malformed(production)),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(BuildValue::TypeDefinition(TypeDefinition::Enum {
        name: NameDefinition {
            text: name_token.text,
            location: name_token.location,
        },
        values,
        attributes,
        documentation,
        location,
    }))
}

fn build_external(production: &Production, mut children: Vec<BuildValue>, location: Location) -> Result<BuildValue, BuildError> {
    let name_token = expect_token(production, children.remove(3))?;
    let attributes = attribute_list(production, children.remove(1))?;
    let documentation = documentation_list(production, children.remove(0))?;
    Ok(BuildValue::TypeDefinition(TypeDefinition::External {
        name: NameDefinition {
            text: name_token.text,
            location: name_token.location,
        },
        attributes,
        documentation,
        location,
    }))
}

fn build_runtime_parameters(production: &Production, mut children: Vec<BuildValue>) -> Result<BuildValue, BuildError> {
    let tail = expect_list(production, children.remove(2))?;
    let head = children.remove(1);
    let mut list = vec![head];
    list.extend(tail);
    Ok(BuildValue::List(list))
}

fn build_runtime_parameter(production: &Production, mut children: Vec<BuildValue>, location: Location) -> Result<BuildValue, BuildError> {
    let type_name = expect_token(production, children.remove(2))?.text;
    let name_token = expect_token(production, children.remove(0))?;
    Ok(BuildValue::RuntimeParameter(RuntimeParameter {
        name: NameDefinition {
            text: name_token.text,
            location: name_token.location,
        },
        type_name,
        location,
    }))
}

fn build_conditional_block(production: &Production, mut children: Vec<BuildValue>) -> Result<BuildValue, BuildError> {
    let inner = expect_list(production, children.remove(5))?;
    let condition = expect_expression(production, children.remove(1))?;
    let (mut fields, subtypes) = flatten_field_or_subtypes(inner)?;

    for field in &mut fields {
        field.existence_condition = apply_is_disjoint_from_parent(condition.clone());
    }

    Ok(BuildValue::FieldOrSubtype(FieldOrSubtype { fields, subtypes }))
}

/// Marks the copied existence-condition expression's location as disjoint
/// from its new parent (spec.md §4.5 "Conditional fields").
fn apply_is_disjoint_from_parent(expression: Expression) -> Expression {
    let location = expression.location().into_disjoint_from_parent();
    expression.with_location(location)
}

fn build_named_field(
    production: &Production,
    mut children: Vec<BuildValue>,
    location: Location,
) -> Result<BuildValue, BuildError> {
    let documentation = documentation_list(production, children.remove(8))?;
    let attributes = attribute_list(production, children.remove(7))?;
    let abbreviation = match children.remove(6) {
        BuildValue::List(list) if list.is_empty() => None,
        BuildValue::List(mut list) if list.len() == 1 => Some(expect_token(production, list.remove(0))?.text),
        _ => return Err(malformed(production)),
    };
    let name_token = expect_token(production, children.remove(5))?;
    let field_type = match children.remove(4) {
        BuildValue::FieldType(value) => value,
        _ => return Err(malformed(production)),
    };
    let size = Box::new(expect_expression(production, children.remove(2))?);
    let start = Box::new(expect_expression(production, children.remove(0))?);

    let mut subtypes = Vec::new();
    let type_name = match field_type {
        FieldTypeValue::Named(name) => name,
        FieldTypeValue::Inline {
            fields,
            subtypes: inner_subtypes,
            addressable_unit,
        } => {
            let generated_name = name_token.text.to_case(Case::Pascal);
            subtypes.extend(inner_subtypes);
            subtypes.push(TypeDefinition::Structure {
                name: NameDefinition {
                    text: generated_name.clone(),
                    location: name_token.location,
                },
                fields,
                subtypes: Vec::new(),
                runtime_parameters: Vec::new(),
                addressable_unit,
                attributes: Vec::new(),
                documentation: Vec::new(),
                location: name_token.location,
            });
            generated_name
        }
    };

    let field = Field {
        start,
        size,
        type_name,
        name: NameDefinition {
            text: name_token.text,
            location: name_token.location,
        },
        abbreviation,
        attributes,
        documentation,
        existence_condition: Expression::BooleanConstant {
            value: true,
            location,
        },
        read_transform: None,
        is_anonymous: false,
        location,
    };

    Ok(BuildValue::FieldOrSubtype(FieldOrSubtype {
        fields: vec![field],
        subtypes,
    }))
}

fn build_anonymous_bit_field(
    ctx: &mut BuildContext,
    production: &Production,
    mut children: Vec<BuildValue>,
    location: Location,
) -> Result<BuildValue, BuildError> {
    let inner = expect_list(production, children.remove(4))?;
    let (fields, inner_subtypes) = flatten_field_or_subtypes(inner)?;

    let name = ctx.next_anonymous_field_name();
    let name_def = NameDefinition {
        text: name.clone(),
        location: Location::synthetic_point(location.start()),
    };
    let type_name = name.to_case(Case::Pascal);
    let mut subtypes = inner_subtypes;
    subtypes.push(TypeDefinition::Structure {
        name: NameDefinition {
            text: type_name.clone(),
            location: name_def.location,
        },
        fields,
        subtypes: Vec::new(),
        runtime_parameters: Vec::new(),
        addressable_unit: AddressableUnit::Bit,
        attributes: Vec::new(),
        documentation: Vec::new(),
        location: name_def.location,
    });

    let field = Field {
        start: Box::new(Expression::NumericConstant {
            value: "0".to_string(),
            location: Location::synthetic_point(location.start()),
        }),
        size: Box::new(Expression::BuiltinReference {
            name: "$size_in_bits".to_string(),
            location: Location::synthetic_point(location.start()),
        }),
        type_name,
        name: name_def,
        abbreviation: None,
        attributes: Vec::new(),
        documentation: Vec::new(),
        existence_condition: Expression::BooleanConstant {
            value: true,
            location,
        },
        read_transform: None,
        is_anonymous: true,
        location,
    };

    Ok(BuildValue::FieldOrSubtype(FieldOrSubtype { fields: vec![field], subtypes }))
}

/// Builds a virtual field (`let name = expr`): a named expression that is
/// not stored in the binary layout but is computable from it. It occupies no
/// physical storage, so `start`/`size` are synthetic zero constants and
/// `type_name` is empty rather than declared, mirroring
/// `original_source`'s `_virtual_field`, which leaves those fields unset
/// entirely; this IR has no optional slot for "unset", so the port uses the
/// nearest zero-width equivalent instead.
fn build_virtual_field(production: &Production, mut children: Vec<BuildValue>, location: Location) -> Result<BuildValue, BuildError> {
    let documentation = documentation_list(production, children.remove(5))?;
    let attributes = attribute_list(production, children.remove(4))?;
    let value = expect_expression(production, children.remove(3))?;
    let name_token = expect_token(production, children.remove(1))?;

    let field = Field {
        start: Box::new(Expression::NumericConstant {
            value: "0".to_string(),
            location: Location::synthetic_point(location.start()),
        }),
        size: Box::new(Expression::NumericConstant {
            value: "0".to_string(),
            location: Location::synthetic_point(location.start()),
        }),
        type_name: String::new(),
        name: NameDefinition {
            text: name_token.text,
            location: name_token.location,
        },
        abbreviation: None,
        attributes,
        documentation,
        existence_condition: Expression::BooleanConstant { value: true, location },
        read_transform: Some(value),
        is_anonymous: false,
        location,
    };

    Ok(BuildValue::FieldOrSubtype(FieldOrSubtype { fields: vec![field], subtypes: Vec::new() }))
}

fn build_enum_value(production: &Production, mut children: Vec<BuildValue>, location: Location) -> Result<BuildValue, BuildError> {
    let attributes = attribute_list(production, children.remove(4))?;
    let value = expect_expression(production, children.remove(3))?;
    let name_token = expect_token(production, children.remove(1))?;
    let documentation = documentation_list(production, children.remove(0))?;
    Ok(BuildValue::EnumValue(EnumValue {
        name: NameDefinition {
            text: name_token.text,
            location: name_token.location,
        },
        value,
        documentation,
        attributes,
        location,
    }))
}

fn build_attribute(production: &Production, mut children: Vec<BuildValue>, location: Location) -> Result<BuildValue, BuildError> {
    let value = expect_expression(production, children.remove(3))?;
    let name_token = expect_token(production, children.remove(1))?;
    Ok(BuildValue::Attribute(Attribute {
        name: name_token.text,
        value,
        location,
    }))
}

fn build_choice(production: &Production, mut children: Vec<BuildValue>, location: Location) -> Result<BuildValue, BuildError> {
    let false_branch = expect_expression(production, children.remove(4))?;
    let true_branch = expect_expression(production, children.remove(2))?;
    let condition = expect_expression(production, children.remove(0))?;
    Ok(BuildValue::Expression(Expression::Function {
        operator: Operator::Choice,
        arguments: vec![condition, true_branch, false_branch],
        function_name: "?:".to_string(),
        location,
    }))
}

/// Left-associative fold for operators that never change between tails
/// (`||`, `&&`, `*`).
fn build_fold(production: &Production, mut children: Vec<BuildValue>, operator: Operator) -> Result<BuildValue, BuildError> {
    let tails = expect_list(production, children.remove(1))?;
    let mut acc = expect_expression(production, children.remove(0))?;
    for tail in tails {
        let rhs = match tail {
            BuildValue::Tail(_, rhs, _) => rhs,
            _ => return Err(malformed(production)),
        };
        let loc = Location::span(&acc.location(), &rhs.location());
        acc = Expression::Function {
            operator,
            arguments: vec![acc, rhs],
            function_name: operator_source_name(operator),
            location: loc,
        };
    }
    Ok(BuildValue::Expression(acc))
}

/// Left-associative fold where each tail carries its own operator (`+`/`-`).
fn build_fold_with_operator(production: &Production, mut children: Vec<BuildValue>) -> Result<BuildValue, BuildError> {
    let tails = expect_list(production, children.remove(1))?;
    let mut acc = expect_expression(production, children.remove(0))?;
    for tail in tails {
        let (op, rhs, text) = match tail {
            BuildValue::Tail(op, rhs, text) => (op, rhs, text),
            _ => return Err(malformed(production)),
        };
        let loc = Location::span(&acc.location(), &rhs.location());
        acc = Expression::Function {
            operator: op,
            arguments: vec![acc, rhs],
            function_name: text,
            location: loc,
        };
    }
    Ok(BuildValue::Expression(acc))
}

/// Builds a tail value `(operator, rhs)` for a fixed-operator tail
/// production (`"||" AndExpression"`, `"&&" ComparisonExpression"`, `"*"
/// UnaryExpression"`), whose operator token carries no payload of its own.
fn build_tail(production: &Production, mut children: Vec<BuildValue>, operator: Operator) -> Result<BuildValue, BuildError> {
    let rhs = expect_expression(production, children.remove(1))?;
    Ok(BuildValue::Tail(operator, rhs, operator_source_name(operator)))
}

/// Builds a tail value for a production whose first child is an
/// already-built `Tail` carrying the chosen operator (`EqualityTail`,
/// `LessTail`, `GreaterTail`, `AdditiveTail`).
fn build_operator_tail(production: &Production, mut children: Vec<BuildValue>) -> Result<BuildValue, BuildError> {
    let rhs = expect_expression(production, children.remove(1))?;
    let (operator, text) = match children.remove(0) {
        BuildValue::Tail(op, _, text) => (op, text),
        _ => return Err(malformed(production)),
    };
    Ok(BuildValue::Tail(operator, rhs, text))
}

/// Builds the `Tail` placeholder for a binary comparison/arithmetic operator
/// token, deriving the [`Operator`] from the token's own source spelling
/// (spec.md §4.5 "Operator -> enum mapping") rather than a hardcoded literal
/// per dispatch arm.
fn build_operator_token(production: &Production, mut children: Vec<BuildValue>, symbol: &str) -> Result<BuildValue, BuildError> {
    let operator = Operator::from_symbol(symbol).ok_or_else(|| malformed(production))?;
    let token = children.remove(0).into_token().map_err(|_| malformed(production))?;
    Ok(BuildValue::Tail(operator, Expression::BooleanConstant { value: false, location: token.location }, token.text))
}

/// Builds the `Tail` placeholder for a `$max`/`$present`/`$upper_bound`/
/// `$lower_bound` builtin-function keyword, deriving the [`Operator`] from
/// the keyword's own spelling rather than a hardcoded literal per dispatch
/// arm.
fn build_builtin_function_token(production: &Production, mut children: Vec<BuildValue>, symbol: &str) -> Result<BuildValue, BuildError> {
    let operator = Operator::from_builtin_keyword(symbol).ok_or_else(|| malformed(production))?;
    let token = children.remove(0).into_token().map_err(|_| malformed(production))?;
    Ok(BuildValue::Tail(operator, Expression::BooleanConstant { value: false, location: token.location }, token.text))
}

/// Expands a chain of same-family comparison tails into a conjunction of
/// pairwise comparisons, duplicating each shared middle operand (spec.md
/// §4.5 "Chained comparisons"). A bare head with no tails passes through
/// unchanged.
fn build_chain(production: &Production, mut children: Vec<BuildValue>) -> Result<BuildValue, BuildError> {
    let tails = expect_list(production, children.remove(1))?;
    let head = expect_expression(production, children.remove(0))?;

    if tails.is_empty() {
        return Ok(BuildValue::Expression(head));
    }

    let mut previous_operand = head.clone();
    let mut result: Option<Expression> = None;
    for tail in tails {
        let (operator, rhs, text) = match tail {
            BuildValue::Tail(op, rhs, text) => (op, rhs, text),
            _ => return Err(malformed(production)),
        };
        let loc = Location::span(&previous_operand.location(), &rhs.location());
        let term = Expression::Function {
            operator,
            arguments: vec![previous_operand.clone(), rhs.clone()],
            function_name: text,
            location: loc,
        };
        result = Some(match result {
            None => term,
            Some(existing) => {
                let and_loc = Location::span(&existing.location(), &term.location());
                Expression::Function {
                    operator: Operator::And,
                    arguments: vec![existing, term],
                    function_name: "&&".to_string(),
                    location: and_loc,
                }
            }
        });
        previous_operand = rhs;
    }

    Ok(BuildValue::Expression(result.expect("non-empty tail list produces a result")))
}

/// Wraps a unary `+`/`-` operand with a synthetic zero-width phantom-zero
/// left operand (spec.md §4.5 "Unary +/-").
fn build_unary(production: &Production, mut children: Vec<BuildValue>, operator: Operator) -> Result<BuildValue, BuildError> {
    let operand = expect_expression(production, children.remove(1))?;
    let sign_token = expect_token(production, children.remove(0))?;
    Ok(BuildValue::Expression(unary_with_phantom_zero(operator, sign_token.location, operand)))
}

fn unary_with_phantom_zero(operator: Operator, sign_location: Location, operand: Expression) -> Expression {
    let zero = Expression::NumericConstant {
        value: "0".to_string(),
        location: Location::synthetic_point(sign_location.start()),
    };
    let loc = Location::span(&sign_location, &operand.location());
    Expression::Function {
        operator,
        arguments: vec![zero, operand],
        function_name: operator_source_name(operator),
        location: loc,
    }
}

fn build_numeric_constant(production: &Production, mut children: Vec<BuildValue>) -> Result<BuildValue, BuildError> {
    let token = expect_token(production, children.remove(0))?;
    let value = decode_integer_literal(&token.text).ok_or_else(|| BuildError::MalformedNumber {
        text: token.text.clone(),
    })?;
    Ok(BuildValue::Expression(Expression::NumericConstant {
        value,
        location: token.location,
    }))
}

fn build_string_constant(production: &Production, mut children: Vec<BuildValue>) -> Result<BuildValue, BuildError> {
    let token = expect_token(production, children.remove(0))?;
    Ok(BuildValue::Expression(Expression::StringConstant {
        value: decode_string_literal(&token.text),
        location: token.location,
    }))
}

fn build_boolean_constant(production: &Production, mut children: Vec<BuildValue>) -> Result<BuildValue, BuildError> {
    let token = expect_token(production, children.remove(0))?;
    Ok(BuildValue::Expression(Expression::BooleanConstant {
        value: token.text == "true",
        location: token.location,
    }))
}

fn build_builtin_reference(production: &Production, mut children: Vec<BuildValue>) -> Result<BuildValue, BuildError> {
    let token = expect_token(production, children.remove(0))?;
    Ok(BuildValue::Expression(Expression::BuiltinReference {
        name: token.text,
        location: token.location,
    }))
}

fn build_field_path(production: &Production, mut children: Vec<BuildValue>, location: Location) -> Result<BuildValue, BuildError> {
    let tail = expect_list(production, children.remove(1))?;
    let head = expect_token(production, children.remove(0))?;
    let mut path = vec![Word {
        text: head.text,
        location: head.location,
    }];
    for segment in tail {
        let token = expect_token(production, segment)?;
        path.push(Word {
            text: token.text,
            location: token.location,
        });
    }
    Ok(BuildValue::Expression(Expression::FieldReference { path, location }))
}

fn build_constant_path(production: &Production, mut children: Vec<BuildValue>, location: Location) -> Result<BuildValue, BuildError> {
    let member = expect_token(production, children.remove(2))?;
    let owner = expect_token(production, children.remove(0))?;
    let path = Reference {
        path: vec![
            Word { text: owner.text, location: owner.location },
            Word { text: member.text, location: member.location },
        ],
        location,
    };
    Ok(BuildValue::Expression(Expression::ConstantReference { path, location }))
}

fn build_builtin_call(production: &Production, mut children: Vec<BuildValue>, location: Location) -> Result<BuildValue, BuildError> {
    let tail = expect_list(production, children.remove(3))?;
    let first_argument = expect_expression(production, children.remove(2))?;
    let (operator, text) = match children.remove(0) {
        BuildValue::Tail(op, _, text) => (op, text),
        _ => return Err(malformed(production)),
    };

    let mut arguments = vec![first_argument];
    for item in tail {
        arguments.push(expect_expression(production, item)?);
    }

    Ok(BuildValue::Expression(Expression::Function {
        operator,
        arguments,
        function_name: text,
        location,
    }))
}

/// The canonical source spelling for an operator that isn't carried by a
/// single token (used when folding tails that share one fixed operator).
fn operator_source_name(operator: Operator) -> String {
    match operator {
        Operator::Addition => "+",
        Operator::Subtraction => "-",
        Operator::Multiplication => "*",
        Operator::Equality => "==",
        Operator::Inequality => "!=",
        Operator::And => "&&",
        Operator::Or => "||",
        Operator::Greater => ">",
        Operator::GreaterOrEqual => ">=",
        Operator::Less => "<",
        Operator::LessOrEqual => "<=",
        Operator::Choice => "?:",
        Operator::Maximum => "$max",
        Operator::Presence => "$present",
        Operator::UpperBound => "$upper_bound",
        Operator::LowerBound => "$lower_bound",
    }
    .to_string()
}

/// Decodes a decimal, `0x`, or `0b` integer literal (with `_` grouping) into
/// a decimal-string arbitrary-precision value (spec.md §4.5 "Integer
/// literals"). Returns `None` on malformed digit groups.
fn decode_integer_literal(text: &str) -> Option<String> {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    if let Some(hex) = cleaned.strip_prefix("0x").or_else(|| cleaned.strip_prefix("0X")) {
        return decode_radix(hex, 16);
    }
    if let Some(bin) = cleaned.strip_prefix("0b").or_else(|| cleaned.strip_prefix("0B")) {
        return decode_radix(bin, 2);
    }
    if cleaned.chars().all(|c| c.is_ascii_digit()) && !cleaned.is_empty() {
        return Some(trim_leading_zeros(&cleaned));
    }
    None
}

/// Converts a sequence of base-`radix` digits into a decimal-string value
/// using repeated long division, without relying on a fixed-width integer
/// type (arbitrary-precision, matching spec.md §4.5).
fn decode_radix(digits: &str, radix: u32) -> Option<String> {
    if digits.is_empty() {
        return None;
    }
    let mut decimal_digits: Vec<u8> = vec![0];
    for ch in digits.chars() {
        let digit = ch.to_digit(radix)?;
        let mut carry = digit;
        for d in decimal_digits.iter_mut().rev() {
            let product = *d as u32 * radix + carry;
            *d = (product % 10) as u8;
            carry = product / 10;
        }
        while carry > 0 {
            decimal_digits.insert(0, (carry % 10) as u8);
            carry /= 10;
        }
    }
    let s: String = decimal_digits.iter().map(|d| (b'0' + d) as char).collect();
    Some(trim_leading_zeros(&s))
}

fn trim_leading_zeros(s: &str) -> String {
    let trimmed = s.trim_start_matches('0');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Strips surrounding quotes and decodes `\\`, `\"`, `\n` escapes (spec.md
/// §4.5 "String literals"; other `\x` sequences are rejected earlier, at the
/// tokenizer level, so only these three ever reach the builder).
fn decode_string_literal(text: &str) -> String {
    let inner = text.strip_prefix('"').and_then(|t| t.strip_suffix('"')).unwrap_or(text);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('\\') => out.push('\\'),
                Some('"') => out.push('"'),
                Some('n') => out.push('\n'),
                Some(other) => out.push(other),
                None => {}
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use strux_core::Position;

    use super::*;

    #[test]
    fn decodes_decimal_number() {
        assert_eq!(decode_integer_literal("1_234"), Some("1234".to_string()));
    }

    #[test]
    fn decodes_hex_number() {
        assert_eq!(decode_integer_literal("0xFF"), Some("255".to_string()));
    }

    #[test]
    fn decodes_binary_number() {
        assert_eq!(decode_integer_literal("0b1010"), Some("10".to_string()));
    }

    #[test]
    fn decodes_large_hex_number_without_overflow() {
        assert_eq!(
            decode_integer_literal("0xFFFFFFFFFFFFFFFFFF"),
            Some("4722366482869645213695".to_string())
        );
    }

    #[test]
    fn decodes_string_escapes() {
        assert_eq!(decode_string_literal("\"a\\nb\\\"c\\\\d\""), "a\nb\"c\\d");
    }

    #[test]
    fn chained_less_than_expands_to_conjunction() {
        let loc = |col: usize| Location::new(
            Position::try_new(1, col, col - 1),
            Position::try_new(1, col + 1, col),
        );
        let a = Expression::FieldReference { path: vec![Word { text: "a".into(), location: loc(1) }], location: loc(1) };
        let b = Expression::FieldReference { path: vec![Word { text: "b".into(), location: loc(5) }], location: loc(5) };
        let c = Expression::FieldReference { path: vec![Word { text: "c".into(), location: loc(9) }], location: loc(9) };

        let production = Production::parse("ComparisonExpression -> AdditiveExpression LessTail+").unwrap();
        let children = vec![
            BuildValue::Expression(a.clone()),
            BuildValue::List(vec![
                BuildValue::Tail(Operator::Less, b.clone(), "<".to_string()),
                BuildValue::Tail(Operator::Less, c.clone(), "<".to_string()),
            ]),
        ];
        let built = build_chain(&production, children).unwrap();
        match built {
            BuildValue::Expression(Expression::Function { operator: Operator::And, arguments, .. }) => {
                assert_eq!(arguments.len(), 2);
                match &arguments[0] {
                    Expression::Function { operator: Operator::Less, .. } => {}
                    other => panic!("expected a < comparison, got {other:?}"),
                }
            }
            other => panic!("expected an && of two comparisons, got {other:?}"),
        }
    }

    #[test]
    fn constant_path_builds_a_qualified_reference() {
        let loc = |col: usize| Location::new(Position::try_new(1, col, col - 1), Position::try_new(1, col + 1, col));
        let production = Production::parse("ConstantPath -> CamelWord . SnakeWord").unwrap();
        let children = vec![
            BuildValue::Token(Token { symbol: strux_grammar::Symbol::new("CamelWord"), text: "Color".to_string(), location: loc(1) }),
            BuildValue::Token(Token { symbol: strux_grammar::Symbol::new("."), text: ".".to_string(), location: loc(6) }),
            BuildValue::Token(Token { symbol: strux_grammar::Symbol::new("SnakeWord"), text: "red".to_string(), location: loc(7) }),
        ];
        let built = build_constant_path(&production, children, loc(1)).unwrap();
        match built {
            BuildValue::Expression(Expression::ConstantReference { path, .. }) => {
                assert_eq!(path.path.len(), 2);
                assert_eq!(path.path[0].text, "Color");
                assert_eq!(path.path[1].text, "red");
            }
            other => panic!("expected a ConstantReference, got {other:?}"),
        }
    }

    #[test]
    fn unary_minus_gets_a_phantom_zero_operand() {
        let sign_location = Location::new(Position::try_new(1, 1, 0), Position::try_new(1, 2, 1));
        let operand = Expression::NumericConstant {
            value: "5".to_string(),
            location: Location::new(Position::try_new(1, 2, 1), Position::try_new(1, 3, 2)),
        };
        let result = unary_with_phantom_zero(Operator::Subtraction, sign_location, operand);
        match result {
            Expression::Function { operator: Operator::Subtraction, arguments, .. } => {
                assert!(matches!(arguments[0], Expression::NumericConstant { ref value, .. } if value == "0"));
            }
            other => panic!("expected a Subtraction function, got {other:?}"),
        }
    }

    #[test]
    fn virtual_field_populates_read_transform() {
        let loc = |col: usize| Location::new(Position::try_new(1, col, col - 1), Position::try_new(1, col + 1, col));
        let production = Production::parse("VirtualField -> let SnakeWord = Expression Attribute* Documentation* EndOfLine").unwrap();
        let value = Expression::NumericConstant { value: "1".to_string(), location: loc(9) };
        let children = vec![
            BuildValue::Token(Token { symbol: strux_grammar::Symbol::new("let"), text: "let".to_string(), location: loc(1) }),
            BuildValue::Token(Token { symbol: strux_grammar::Symbol::new("SnakeWord"), text: "flag".to_string(), location: loc(5) }),
            BuildValue::Token(Token { symbol: strux_grammar::Symbol::new("="), text: "=".to_string(), location: loc(8) }),
            BuildValue::Expression(value.clone()),
            BuildValue::List(vec![]),
            BuildValue::List(vec![]),
            BuildValue::Token(Token { symbol: strux_grammar::Symbol::new("EndOfLine"), text: "\n".to_string(), location: loc(10) }),
        ];
        let built = build_virtual_field(&production, children, loc(1)).unwrap();
        match built {
            BuildValue::FieldOrSubtype(FieldOrSubtype { fields, subtypes }) => {
                assert!(subtypes.is_empty());
                assert_eq!(fields.len(), 1);
                assert_eq!(fields[0].name.text, "flag");
                assert_eq!(fields[0].read_transform, Some(value));
                assert!(fields[0].type_name.is_empty());
            }
            other => panic!("expected a FieldOrSubtype, got {other:?}"),
        }
    }
}
