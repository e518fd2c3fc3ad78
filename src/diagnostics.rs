use crate::ast::TextRange;
use crate::fix::TextEdit;
use crate::level::LintLevel;
use crate::lint::LintDescriptor;
use serde::Serialize;

/// A single lint finding.
#[derive(Debug, Clone)]
#[must_use]
pub struct Diagnostic {
    pub lint: &'static LintDescriptor,
    pub level: LintLevel,
    pub file: Option<String>,
    pub span: Span,
    /// Byte range the diagnostic is anchored to.
    pub range: TextRange,
    /// Catalog key of the message template (`sortImportsByPath`, `tooTall`, ...).
    pub message_id: &'static str,
    pub message: String,
    /// Shown under the message; the suggestion text when there is one.
    pub help: Option<String>,
    pub suggestion: Option<Suggestion>,
}

/// Optional machine- or human-applicable fix for a diagnostic.
#[derive(Debug, Clone)]
pub struct Suggestion {
    pub message: String,
    pub edit: TextEdit,
    pub applicability: Applicability,
}

impl Suggestion {
    pub fn machine_applicable(message: impl Into<String>, edit: TextEdit) -> Self {
        Self {
            message: message.into(),
            edit,
            applicability: Applicability::MachineApplicable,
        }
    }

    pub fn maybe_incorrect(message: impl Into<String>, edit: TextEdit) -> Self {
        Self {
            message: message.into(),
            edit,
            applicability: Applicability::MaybeIncorrect,
        }
    }
}

/// Applicability of an automated suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Applicability {
    /// Safe to apply without review (reordering that keeps every byte of the original).
    MachineApplicable,
    /// Changes meaning unless applied together with related edits (renames).
    MaybeIncorrect,
    HasPlaceholders,
    Unspecified,
}

/// Span in a source file (1-based row/column positions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

/// Single position in a source file (1-based row, 1-based column in chars).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Position {
    pub row: usize,
    pub column: usize,
}
