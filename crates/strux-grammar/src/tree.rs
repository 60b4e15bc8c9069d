//! The parse tree produced by the LR(1) driver (spec.md §4.3).
//!
//! Unlike an incremental (rowan-style) concrete syntax tree, this is a plain
//! owned tree built bottom-up and discarded after IR construction reads it
//! once.

use strux_core::Location;

use crate::symbol::Symbol;

/// A single token, as attached to a leaf of the parse tree.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    /// The terminal symbol this token matched.
    pub symbol: Symbol,
    /// The token's exact source text.
    pub text: String,
    /// The token's source location.
    pub location: Location,
}

/// A node of the parse tree: either a token (leaf) or a reduction (interior
/// node produced by applying a production).
#[derive(Clone, Debug, PartialEq)]
pub enum ParseNode {
    /// A terminal leaf.
    Token(Token),
    /// An interior node produced by reducing a production's right-hand side.
    Reduction(Reduction),
}

impl ParseNode {
    /// The node's source location.
    pub fn location(&self) -> Location {
        match self {
            ParseNode::Token(token) => token.location,
            ParseNode::Reduction(reduction) => reduction.location,
        }
    }

    /// The token at this node, if it is a leaf.
    pub fn as_token(&self) -> Option<&Token> {
        match self {
            ParseNode::Token(token) => Some(token),
            ParseNode::Reduction(_) => None,
        }
    }

    /// The reduction at this node, if it is an interior node.
    pub fn as_reduction(&self) -> Option<&Reduction> {
        match self {
            ParseNode::Token(_) => None,
            ParseNode::Reduction(reduction) => Some(reduction),
        }
    }
}

/// An interior parse-tree node: the application of production `production`
/// to a sequence of child nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct Reduction {
    /// Index of the production that was reduced.
    pub production: usize,
    /// The production's right-hand-side children, in order.
    pub children: Vec<ParseNode>,
    /// The reduction's location: the span from the first non-nil child's
    /// start to the last non-nil child's end, or a synthetic point if every
    /// child is nil (an epsilon reduction), per spec.md §4.3.
    pub location: Location,
}

impl Reduction {
    /// Builds a reduction, computing its location from `children`.
    ///
    /// A child counts as nil when its own location is synthetic: either it is
    /// itself an epsilon reduction (an empty `*`/`?` auto-production) or,
    /// recursively, a reduction built entirely from nil children. The span is
    /// taken from the first non-nil child's start to the last non-nil child's
    /// end, skipping past any nil children at either end — matching
    /// `C -> c D; D -> ;`, where `D`'s reduction carries no real location and
    /// must not shrink or shift `C`'s span.
    pub fn new(production: usize, children: Vec<ParseNode>, at_if_empty: Location) -> Self {
        let start = children.iter().find(|child| !child.location().is_synthetic()).map(|child| child.location().start());
        let end = children
            .iter()
            .rev()
            .find(|child| !child.location().is_synthetic())
            .map(|child| child.location().end());
        let location = match (start, end) {
            (Some(start), Some(end)) => Location::new(start, end),
            _ => at_if_empty,
        };
        Self {
            production,
            children,
            location,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use strux_core::Position;

    use super::*;

    fn pos(col: usize) -> Position {
        Position::try_new(1, col, col - 1)
    }

    fn token(col: usize) -> ParseNode {
        ParseNode::Token(Token {
            symbol: Symbol::new("c"),
            text: "c".to_string(),
            location: Location::new(pos(col), pos(col + 1)),
        })
    }

    fn nil_reduction(at: Location) -> ParseNode {
        ParseNode::Reduction(Reduction::new(0, Vec::new(), at))
    }

    #[test]
    fn skips_a_trailing_nil_child() {
        let c = token(1);
        let d = nil_reduction(Location::synthetic_point(pos(2)));
        let reduction = Reduction::new(1, vec![c, d], Location::synthetic_point(pos(5)));
        assert_eq!(reduction.location, Location::new(pos(1), pos(2)));
        assert!(!reduction.location.is_synthetic());
    }

    #[test]
    fn skips_a_leading_nil_child() {
        let d = nil_reduction(Location::synthetic_point(pos(1)));
        let c = token(2);
        let reduction = Reduction::new(1, vec![d, c], Location::synthetic_point(pos(5)));
        assert_eq!(reduction.location, Location::new(pos(2), pos(3)));
    }

    #[test]
    fn all_nil_children_fall_back_to_a_synthetic_point() {
        let at = Location::synthetic_point(pos(3));
        let reduction = Reduction::new(1, vec![nil_reduction(Location::synthetic_point(pos(1)))], at);
        assert_eq!(reduction.location, at);
        assert!(reduction.location.is_synthetic());
    }
}
