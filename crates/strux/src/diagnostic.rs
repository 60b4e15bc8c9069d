//! Rendering [`CompileError`](crate::CompileError) as a `codespan-reporting`
//! diagnostic, so a host can print a source-annotated error without
//! depending on any of the lower crates' internal error types directly.

use std::ops::Range;

use strux_core::Location;

/// A diagnostic's severity. Every [`crate::CompileError`] renders as
/// [`Severity::Error`]; the extra variants exist for hosts that want to
/// surface non-fatal notices (e.g. staleness reports) through the same type.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Severity {
    /// An unrecoverable failure.
    Error,
    /// A recoverable but noteworthy condition.
    Warning,
    /// Additional context attached to another diagnostic.
    Note,
}

/// A single labeled span within a diagnostic.
#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    message: String,
    range: Range<usize>,
}

/// A diagnostic ready to render with `codespan-reporting`, once the caller
/// has registered the source text under a `codespan_reporting::files` file
/// id.
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
    severity: Severity,
    message: String,
    code: Option<String>,
    labels: Vec<Label>,
}

impl Diagnostic {
    /// Creates a bare error diagnostic with no labels.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            code: None,
            labels: Vec::new(),
        }
    }

    /// Attaches an error code (spec.md §4.2 "Merr").
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Adds a label pointing at `location`. The first label added is the
    /// diagnostic's primary label.
    pub fn with_label(mut self, message: impl Into<String>, location: Location) -> Self {
        self.labels.push(Label {
            message: message.into(),
            range: location.start().byte_no()..location.end().byte_no(),
        });
        self
    }

    /// Converts to a `codespan_reporting` diagnostic for `file_id`.
    pub fn to_codespan<FileId: Copy>(&self, file_id: FileId) -> codespan_reporting::diagnostic::Diagnostic<FileId> {
        use codespan_reporting::diagnostic as codespan;

        let mut diagnostic = match self.severity {
            Severity::Error => codespan::Diagnostic::error(),
            Severity::Warning => codespan::Diagnostic::warning(),
            Severity::Note => codespan::Diagnostic::note(),
        };
        diagnostic.code.clone_from(&self.code);
        diagnostic.message.clone_from(&self.message);

        if self.labels.is_empty() {
            diagnostic.labels.push(codespan::Label::new(
                codespan::LabelStyle::Primary,
                file_id,
                usize::MAX - 1..usize::MAX,
            ));
        } else {
            for (index, label) in self.labels.iter().enumerate() {
                let style = if index == 0 {
                    codespan::LabelStyle::Primary
                } else {
                    codespan::LabelStyle::Secondary
                };
                diagnostic
                    .labels
                    .push(codespan::Label::new(style, file_id, label.range.clone()).with_message(&label.message));
            }
        }

        diagnostic
    }
}
