//! Locations.

use serde::Deserialize;
use serde::Serialize;

use crate::Position;

/// A source range with provenance flags.
///
/// Invariant (spec.md §3): `start <= end` lexicographically. `is_synthetic`
/// marks locations fabricated rather than copied from real source text: an
/// IR-builder-fabricated node (e.g. the unary-minus phantom zero), or an
/// epsilon reduction's placeholder location (spec.md §4.3), which in turn
/// makes a parent reduction's own location synthetic if every child's is.
/// `is_disjoint_from_parent` exempts a child location from
/// the "child location contained in parent location" invariant — needed when
/// an existence condition is copied from an enclosing `if` into each of its
/// inner fields (spec.md §4.5 "Conditional fields").
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Location {
    /// The start of the range, inclusive.
    start: Position,
    /// The end of the range, inclusive.
    end: Position,
    /// Whether this location was fabricated rather than parsed.
    is_synthetic: bool,
    /// Whether this location is exempt from parent containment.
    is_disjoint_from_parent: bool,
}

impl Location {
    /// Creates a new [`Location`] spanning `start` to `end`.
    ///
    /// # Panics
    ///
    /// Panics if `end` precedes `start`.
    pub fn new(start: Position, end: Position) -> Self {
        assert!(start <= end, "a location's end must not precede its start");
        Self {
            start,
            end,
            is_synthetic: false,
            is_disjoint_from_parent: false,
        }
    }

    /// Creates a zero-width synthetic location at a single point.
    ///
    /// Used for the phantom zero literal in unary minus expansion and for
    /// other IR-builder-fabricated nodes (spec.md §4.5).
    pub fn synthetic_point(at: Position) -> Self {
        Self {
            start: at,
            end: at,
            is_synthetic: true,
            is_disjoint_from_parent: false,
        }
    }

    /// Returns a copy of this location marked synthetic.
    pub fn into_synthetic(mut self) -> Self {
        self.is_synthetic = true;
        self
    }

    /// Returns a copy of this location marked disjoint from its parent.
    pub fn into_disjoint_from_parent(mut self) -> Self {
        self.is_disjoint_from_parent = true;
        self
    }

    /// The start position.
    pub fn start(&self) -> Position {
        self.start
    }

    /// The end position.
    pub fn end(&self) -> Position {
        self.end
    }

    /// Whether this location was fabricated rather than parsed.
    pub fn is_synthetic(&self) -> bool {
        self.is_synthetic
    }

    /// Whether this location is exempt from parent containment.
    pub fn is_disjoint_from_parent(&self) -> bool {
        self.is_disjoint_from_parent
    }

    /// Returns whether `self`'s range is contained within `parent`'s range.
    ///
    /// Ignores `is_disjoint_from_parent` on `self`; callers should consult
    /// that flag themselves before treating a violation as an error (spec.md
    /// §8 "Location containment").
    pub fn contained_in(&self, parent: &Location) -> bool {
        parent.start <= self.start && self.end <= parent.end
    }

    /// Computes the span from the start of `first` to the end of `last`.
    ///
    /// Used by the LR(1) driver when building a reduction's location from its
    /// first and last non-nil children (spec.md §4.3), and by the IR
    /// builder's location-merging rule (spec.md §4.5).
    pub fn span(first: &Location, last: &Location) -> Location {
        Location::new(first.start, last.end)
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn pos(line: usize, col: usize, byte: usize) -> Position {
        Position::try_new(line, col, byte)
    }

    #[test]
    fn containment() {
        let parent = Location::new(pos(1, 1, 0), pos(3, 1, 20));
        let child = Location::new(pos(2, 1, 5), pos(2, 5, 9));
        assert!(child.contained_in(&parent));

        let outside = Location::new(pos(4, 1, 25), pos(4, 2, 26));
        assert!(!outside.contained_in(&parent));
    }

    #[test]
    fn span_joins_first_and_last() {
        let first = Location::new(pos(1, 1, 0), pos(1, 2, 1));
        let last = Location::new(pos(1, 5, 4), pos(1, 6, 5));
        let joined = Location::span(&first, &last);
        assert_eq!(joined.start(), first.start());
        assert_eq!(joined.end(), last.end());
    }

    #[test]
    #[should_panic(expected = "end must not precede")]
    fn rejects_inverted_range() {
        Location::new(pos(2, 1, 5), pos(1, 1, 0));
    }

    #[test]
    fn display_collapses_point_locations() {
        let point = Location::synthetic_point(pos(3, 4, 10));
        assert_eq!(point.to_string(), "3:4");
    }
}
