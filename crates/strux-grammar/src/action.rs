//! Parser actions (spec.md §3, §4.2).

/// A decision in the ACTION table for a `(state, terminal)` pair.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Action {
    /// Shift the current token and move to the given state.
    Shift(usize),
    /// Reduce by the production at the given index.
    Reduce(usize),
    /// Accept the input.
    Accept,
    /// A syntax error, optionally labeled with an error code installed by
    /// an error example (spec.md §4.2 "Merr").
    Error(Option<String>),
}

impl Action {
    /// Whether this action is an [`Action::Error`].
    pub fn is_error(&self) -> bool {
        matches!(self, Action::Error(_))
    }
}
