//! Module IR types (spec.md §3 "Module IR").

use serde::Deserialize;
use serde::Serialize;
use strux_core::Location;

/// A single documentation comment (`-- ...` or a bare `--`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Documentation {
    /// The comment text, with the leading `-- ` stripped.
    pub text: String,
    /// Source location.
    pub location: Location,
}

/// A single identifier segment of a qualified name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Word {
    /// The identifier text.
    pub text: String,
    /// Source location.
    pub location: Location,
}

/// A reference to a qualified name: a non-empty sequence of [`Word`]
/// segments (`a.b.c`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    /// The path segments, in order.
    pub path: Vec<Word>,
    /// Source location.
    pub location: Location,
}

/// The name being introduced by a declaration (a struct, enum, field, or
/// import's local name).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NameDefinition {
    /// The declared identifier text.
    pub text: String,
    /// Source location.
    pub location: Location,
}

/// An `import "file" as name` declaration, or the synthetic prelude import
/// every module carries as its first entry (spec.md §4.5 "Prelude import").
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Import {
    /// The imported file's name, or empty for the synthetic prelude import.
    pub file_name: String,
    /// The local alias bound to the import, or empty for the prelude.
    pub local_name: String,
    /// Source location.
    pub location: Location,
}

/// A `[name: value]` attribute attached to a module, type, or field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// The attribute's name.
    pub name: String,
    /// The attribute's value expression.
    pub value: Expression,
    /// Source location.
    pub location: Location,
}

/// A declared runtime parameter of a structure (`(count: UInt:32)`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuntimeParameter {
    /// The parameter's name.
    pub name: NameDefinition,
    /// The parameter's declared physical type name.
    pub type_name: String,
    /// Source location.
    pub location: Location,
}

/// The operator or builtin function an [`Expression::Function`] applies
/// (spec.md §4.5 "Operator → enum mapping").
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Operator {
    /// `+`
    Addition,
    /// `-` (binary or unary, via the phantom-zero translation)
    Subtraction,
    /// `*`
    Multiplication,
    /// `==`
    Equality,
    /// `!=`
    Inequality,
    /// `&&`
    And,
    /// `||`
    Or,
    /// `>`
    Greater,
    /// `>=`
    GreaterOrEqual,
    /// `<`
    Less,
    /// `<=`
    LessOrEqual,
    /// `c ? t : f`
    Choice,
    /// `$max(...)`
    Maximum,
    /// `$present(...)`
    Presence,
    /// `$upper_bound(...)`
    UpperBound,
    /// `$lower_bound(...)`
    LowerBound,
}

impl Operator {
    /// The operator whose source spelling is `text`, if any, checking the
    /// binary-operator spellings from spec.md §4.5.
    pub fn from_symbol(text: &str) -> Option<Operator> {
        Some(match text {
            "+" => Operator::Addition,
            "-" => Operator::Subtraction,
            "*" => Operator::Multiplication,
            "==" => Operator::Equality,
            "!=" => Operator::Inequality,
            "&&" => Operator::And,
            "||" => Operator::Or,
            ">" => Operator::Greater,
            ">=" => Operator::GreaterOrEqual,
            "<" => Operator::Less,
            "<=" => Operator::LessOrEqual,
            _ => return None,
        })
    }

    /// The operator named by a builtin function keyword (`$max`, `$present`,
    /// `$upper_bound`, `$lower_bound`), if any.
    pub fn from_builtin_keyword(text: &str) -> Option<Operator> {
        Some(match text {
            "$max" => Operator::Maximum,
            "$present" => Operator::Presence,
            "$upper_bound" => Operator::UpperBound,
            "$lower_bound" => Operator::LowerBound,
            _ => return None,
        })
    }
}

/// An expression node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// An integer literal, stored as a decimal string (spec.md §4.5
    /// "Integer literals").
    NumericConstant {
        /// The literal's value, as decimal digits.
        value: String,
        /// Source location.
        location: Location,
    },
    /// `true` or `false`.
    BooleanConstant {
        /// The literal's value.
        value: bool,
        /// Source location.
        location: Location,
    },
    /// A quoted string literal, with escapes already decoded.
    StringConstant {
        /// The decoded string value.
        value: String,
        /// Source location.
        location: Location,
    },
    /// A reference to a field of the enclosing structure, by dotted path.
    FieldReference {
        /// The path segments.
        path: Vec<Word>,
        /// Source location.
        location: Location,
    },
    /// A reference to an enum value or other named constant, by qualified
    /// path (`EnumName.Value`).
    ConstantReference {
        /// The qualified path.
        path: Reference,
        /// Source location.
        location: Location,
    },
    /// A reference to a builtin value (e.g. `$size_in_bits`) with no
    /// arguments.
    BuiltinReference {
        /// The builtin's source spelling.
        name: String,
        /// Source location.
        location: Location,
    },
    /// An operator or builtin function application.
    Function {
        /// The operator being applied.
        operator: Operator,
        /// The operator's arguments, in order.
        arguments: Vec<Expression>,
        /// The operator or function's source spelling (e.g. `"+"`, `"?:"`,
        /// `"$max"`).
        function_name: String,
        /// Source location.
        location: Location,
    },
}

impl Expression {
    /// The expression's source location.
    pub fn location(&self) -> Location {
        match self {
            Expression::NumericConstant { location, .. }
            | Expression::BooleanConstant { location, .. }
            | Expression::StringConstant { location, .. }
            | Expression::FieldReference { location, .. }
            | Expression::ConstantReference { location, .. }
            | Expression::BuiltinReference { location, .. }
            | Expression::Function { location, .. } => *location,
        }
    }

    /// Returns a copy of this expression with its location replaced.
    pub fn with_location(self, location: Location) -> Self {
        match self {
            Expression::NumericConstant { value, .. } => Expression::NumericConstant { value, location },
            Expression::BooleanConstant { value, .. } => Expression::BooleanConstant { value, location },
            Expression::StringConstant { value, .. } => Expression::StringConstant { value, location },
            Expression::FieldReference { path, .. } => Expression::FieldReference { path, location },
            Expression::ConstantReference { path, .. } => Expression::ConstantReference { path, location },
            Expression::BuiltinReference { name, .. } => Expression::BuiltinReference { name, location },
            Expression::Function { operator, arguments, function_name, .. } => {
                Expression::Function { operator, arguments, function_name, location }
            }
        }
    }
}

/// Whether a structure's fields are addressed by byte or by bit offset.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum AddressableUnit {
    /// Fields are addressed in bytes (a `struct`).
    Byte,
    /// Fields are addressed in bits (a `bits` block).
    Bit,
}

/// A single `name = value` entry of an `enum`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnumValue {
    /// The value's name.
    pub name: NameDefinition,
    /// The value's numeric value expression.
    pub value: Expression,
    /// Documentation attached to this value.
    pub documentation: Vec<Documentation>,
    /// Attributes attached to this value.
    pub attributes: Vec<Attribute>,
    /// Source location.
    pub location: Location,
}

/// A single field of a structure.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// The field's start-offset expression.
    pub start: Box<Expression>,
    /// The field's size expression.
    pub size: Box<Expression>,
    /// The name of the field's declared type (may reference a synthesized
    /// inline subtype; spec.md §4.5 "Inline types").
    pub type_name: String,
    /// The field's declared name.
    pub name: NameDefinition,
    /// An optional short alias for the field.
    pub abbreviation: Option<String>,
    /// Attributes attached to the field.
    pub attributes: Vec<Attribute>,
    /// Documentation attached to the field.
    pub documentation: Vec<Documentation>,
    /// The condition under which the field is present. Defaults to a
    /// synthetic `true` constant at the field's declaration location for
    /// unconditional fields (spec.md §4.5 "Conditional fields").
    pub existence_condition: Expression,
    /// A transform applied when reading a virtual field's value, if any.
    pub read_transform: Option<Expression>,
    /// Whether this field was synthesized for a name-less anonymous bit
    /// block (spec.md §4.5 "Anonymous bit blocks").
    pub is_anonymous: bool,
    /// Source location.
    pub location: Location,
}

/// A type definition: a `struct`, `bits` block, `enum`, or `external` type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TypeDefinition {
    /// A `struct` or `bits` block.
    Structure {
        /// The type's declared name.
        name: NameDefinition,
        /// The structure's fields, in declaration order.
        fields: Vec<Field>,
        /// Subtypes synthesized from inline type definitions and anonymous
        /// bit blocks nested inside this structure.
        subtypes: Vec<TypeDefinition>,
        /// Declared runtime parameters.
        runtime_parameters: Vec<RuntimeParameter>,
        /// Whether fields are addressed in bytes or bits.
        addressable_unit: AddressableUnit,
        /// Attributes attached to the type.
        attributes: Vec<Attribute>,
        /// Documentation attached to the type.
        documentation: Vec<Documentation>,
        /// Source location.
        location: Location,
    },
    /// An `enum`.
    Enum {
        /// The type's declared name.
        name: NameDefinition,
        /// The enum's values, in declaration order.
        values: Vec<EnumValue>,
        /// Attributes attached to the type.
        attributes: Vec<Attribute>,
        /// Documentation attached to the type.
        documentation: Vec<Documentation>,
        /// Source location.
        location: Location,
    },
    /// An `external` type, whose representation is defined outside the
    /// module.
    External {
        /// The type's declared name.
        name: NameDefinition,
        /// Attributes attached to the type.
        attributes: Vec<Attribute>,
        /// Documentation attached to the type.
        documentation: Vec<Documentation>,
        /// Source location.
        location: Location,
    },
}

impl TypeDefinition {
    /// The type's declared name.
    pub fn name(&self) -> &NameDefinition {
        match self {
            TypeDefinition::Structure { name, .. }
            | TypeDefinition::Enum { name, .. }
            | TypeDefinition::External { name, .. } => name,
        }
    }

    /// Returns a copy of this type definition with its location replaced.
    pub fn with_location(self, location: Location) -> Self {
        match self {
            TypeDefinition::Structure { name, fields, subtypes, runtime_parameters, addressable_unit, attributes, documentation, .. } => {
                TypeDefinition::Structure { name, fields, subtypes, runtime_parameters, addressable_unit, attributes, documentation, location }
            }
            TypeDefinition::Enum { name, values, attributes, documentation, .. } => {
                TypeDefinition::Enum { name, values, attributes, documentation, location }
            }
            TypeDefinition::External { name, attributes, documentation, .. } => {
                TypeDefinition::External { name, attributes, documentation, location }
            }
        }
    }
}

/// A fully parsed and translated source file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Module {
    /// Module-level documentation.
    pub documentation: Vec<Documentation>,
    /// Imports, with the synthetic prelude import always first (spec.md
    /// §4.5 "Prelude import").
    pub imports: Vec<Import>,
    /// Module-level attributes.
    pub attributes: Vec<Attribute>,
    /// Top-level type definitions, in declaration order.
    pub type_definitions: Vec<TypeDefinition>,
    /// Source location.
    pub location: Location,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use strux_core::Position;

    use super::*;

    #[test]
    fn module_ir_round_trips_through_json() {
        let location = Location::new(Position::try_new(1, 1, 0), Position::try_new(1, 1, 0));
        let module = Module {
            documentation: vec![Documentation {
                text: "a module".to_string(),
                location,
            }],
            imports: vec![Import {
                file_name: String::new(),
                local_name: String::new(),
                location,
            }],
            attributes: Vec::new(),
            type_definitions: vec![TypeDefinition::External {
                name: NameDefinition {
                    text: "Opaque".to_string(),
                    location,
                },
                attributes: Vec::new(),
                documentation: Vec::new(),
                location,
            }],
            location,
        };

        let json = serde_json::to_string(&module).unwrap();
        let round_tripped: Module = serde_json::from_str(&json).unwrap();
        assert_eq!(module, round_tripped);
    }
}
