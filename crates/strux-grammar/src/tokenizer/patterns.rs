//! Literal and regex token pattern tables (spec.md §4.1 "Token categories").

use std::sync::OnceLock;

use regex::Regex;

/// The symbol category a regex pattern produces. `Nil` patterns (whitespace)
/// consume input but emit no token.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Category {
    /// Emits no token.
    Nil,
    /// A reserved-prefix identifier, always an error category.
    BadWord,
    /// A quoted string literal.
    String,
    /// A well-formed integer literal.
    Number,
    /// A malformed numeric literal.
    BadNumber,
    /// `true` or `false`.
    BooleanConstant,
    /// `[a-z][a-z_0-9]*`.
    SnakeWord,
    /// `[A-Z][A-Z_0-9]*`.
    ShoutyWord,
    /// `[A-Z][A-Za-z0-9]*` with at least one lowercase letter.
    CamelWord,
    /// `-- ...` or a bare `--`.
    Documentation,
    /// `--...` not in the form of a valid comment marker.
    BadDocumentation,
    /// `#...`.
    Comment,
}

impl Category {
    /// The terminal symbol name this category surfaces as, for use in
    /// grammar production strings.
    pub fn symbol_name(self) -> &'static str {
        match self {
            Category::Nil => "",
            Category::BadWord => "BadWord",
            Category::String => "String",
            Category::Number => "Number",
            Category::BadNumber => "BadNumber",
            Category::BooleanConstant => "BooleanConstant",
            Category::SnakeWord => "SnakeWord",
            Category::ShoutyWord => "ShoutyWord",
            Category::CamelWord => "CamelWord",
            Category::Documentation => "Documentation",
            Category::BadDocumentation => "BadDocumentation",
            Category::Comment => "Comment",
        }
    }
}

/// Literal keyword and punctuation tokens, tried before regex categories and
/// preferred on a length tie (spec.md §4.1 step 2, "literal > regex").
///
/// Longest literal wins among these; ordering here does not matter for
/// matching, only for readability.
pub const LITERALS: &[&str] = &[
    // Keywords.
    "struct", "bits", "enum", "external", "import", "as", "if", "let",
    "$default", "$max", "$present", "$upper_bound", "$lower_bound", "$next",
    "$size_in_bits", "$size_in_bytes", "$max_size_in_bits", "$max_size_in_bytes",
    "$min_size_in_bits", "$min_size_in_bytes", "$is_statically_sized",
    "$static_size_in_bits",
    // Two-character punctuation/operators (must precede their one-character
    // prefixes in no particular order; matching picks the longest anyway).
    "==", "!=", "&&", "||", "<=", ">=",
    // Single-character punctuation.
    "[", "]", "(", ")", ":", "=", "+", "-", "*", ".", "?", ",", "<", ">",
    // Reserved markers used only by the error-example corpus loader; never
    // legal in a real module and never produced by the grammar registry.
    "$ERR", "$ANY",
];

/// Finds the longest literal in [`LITERALS`] that matches at the start of
/// `text`.
pub fn longest_literal(text: &str) -> Option<&'static str> {
    LITERALS
        .iter()
        .copied()
        .filter(|literal| text.starts_with(literal))
        .max_by_key(|literal| literal.len())
}

struct RegexCategory {
    regex: Regex,
    category: Category,
}

fn compiled() -> &'static [RegexCategory] {
    static TABLE: OnceLock<Vec<RegexCategory>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let entries: &[(&str, Category)] = &[
            (r"^[ \t]+", Category::Nil),
            (
                r"^(?:StruxReserved|strux_reserved_|STRUX_RESERVED_)[A-Za-z0-9_]*",
                Category::BadWord,
            ),
            (r#"^"(?:[^"\\\n]|\\\\|\\"|\\n)*""#, Category::String),
            (r"^0x[0-9a-fA-F](?:_?[0-9a-fA-F])*", Category::Number),
            (r"^0b[01](?:_?[01])*", Category::Number),
            (r"^[0-9](?:_?[0-9])*", Category::Number),
            (r"^0[xXbB][0-9a-zA-Z_]*", Category::BadNumber),
            (r"^[0-9][0-9a-zA-Z_]*", Category::BadNumber),
            (r"^-- .*", Category::Documentation),
            (r"^--$", Category::Documentation),
            (r"^--.*", Category::BadDocumentation),
            (r"^#.*", Category::Comment),
            (r"^(?:true|false)\b", Category::BooleanConstant),
            (r"^[a-z][a-z_0-9]*", Category::SnakeWord),
            (r"^[A-Z][A-Za-z0-9_]*", Category::CamelWord),
        ];
        entries
            .iter()
            .map(|(pattern, category)| RegexCategory {
                regex: Regex::new(pattern).expect("pattern table entries are valid regexes"),
                category: *category,
            })
            .collect()
    })
}

/// Finds the longest regex match at the start of `text`, after applying the
/// shouty/camel disambiguation rule (an identifier starting with an
/// uppercase letter is [`Category::ShoutyWord`] iff every remaining
/// character is uppercase, a digit, or `_`).
pub fn longest_regex_match(text: &str) -> Option<(Category, usize)> {
    let mut best: Option<(Category, usize)> = None;
    for entry in compiled() {
        if let Some(found) = entry.regex.find(text) {
            let len = found.end();
            if best.map(|(_, best_len)| len > best_len).unwrap_or(true) {
                let category = if entry.category == Category::CamelWord
                    && found.as_str()[1..].chars().all(|c| c.is_ascii_uppercase() || c == '_' || c.is_ascii_digit())
                {
                    Category::ShoutyWord
                } else {
                    entry.category
                };
                best = Some((category, len));
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn literal_beats_prefix_of_word() {
        assert_eq!(longest_literal("struct foo"), Some("struct"));
    }

    #[test]
    fn reserved_prefix_is_bad_word() {
        let (category, len) = longest_regex_match("StruxReservedFoo bar").unwrap();
        assert_eq!(category, Category::BadWord);
        assert_eq!(len, "StruxReservedFoo".len());
    }

    #[test]
    fn shouty_word_disambiguated_from_camel() {
        let (shouty, _) = longest_regex_match("FOO_BAR baz").unwrap();
        assert_eq!(shouty, Category::ShoutyWord);
        let (camel, _) = longest_regex_match("FooBar baz").unwrap();
        assert_eq!(camel, Category::CamelWord);
    }

    #[test]
    fn bare_double_dash_is_documentation() {
        let (category, len) = longest_regex_match("--").unwrap();
        assert_eq!(category, Category::Documentation);
        assert_eq!(len, 2);
    }

    #[test]
    fn dash_dash_without_space_is_bad_documentation() {
        let (category, _) = longest_regex_match("--nope").unwrap();
        assert_eq!(category, Category::BadDocumentation);
    }

    #[test]
    fn boolean_keyword_does_not_swallow_longer_identifier() {
        let (category, len) = longest_regex_match("true_story bar").unwrap();
        assert_eq!(category, Category::SnakeWord);
        assert_eq!(len, "true_story".len());

        let (category, len) = longest_regex_match("true && false").unwrap();
        assert_eq!(category, Category::BooleanConstant);
        assert_eq!(len, "true".len());
    }

    #[test]
    fn hex_number_with_underscore_groups() {
        let (category, len) = longest_regex_match("0x1234_5678 rest").unwrap();
        assert_eq!(category, Category::Number);
        assert_eq!(len, "0x1234_5678".len());
    }
}
