//! Auto-fix application for lint diagnostics.
//!
//! Diagnostics carry their edit as a byte range of the text they were computed
//! against. One pass applies every eligible, non-overlapping edit; edits that
//! collide with an earlier one are deferred so the caller can re-lint and try
//! again on the updated text.

use crate::diagnostics::{Applicability, Diagnostic};
use crate::fix::{FixError, TextEdit, apply_edits};
use std::fmt::Write as _;
use std::path::Path;

/// Result of applying fixes to a source file.
#[derive(Debug)]
pub struct FixResult {
    pub fixed_source: String,
    pub fixes_applied: usize,
    /// Suggestions not applied: unsafe without opt-in, or overlapping an applied edit.
    pub fixes_skipped: usize,
}

/// Apply the suggestions attached to `diagnostics`.
///
/// `MachineApplicable` suggestions always apply; `MaybeIncorrect` and
/// `HasPlaceholders` only with `allow_unsafe`. Edits are taken in diagnostic
/// order and an edit overlapping one already taken is skipped.
///
/// # Errors
///
/// Fails if an edit points outside the text or splits a character.
pub fn apply_fixes(
    source: &str,
    diagnostics: &[Diagnostic],
    allow_unsafe: bool,
) -> Result<FixResult, FixError> {
    let mut edits: Vec<TextEdit> = Vec::new();
    let mut skipped = 0;

    for diag in diagnostics {
        let Some(suggestion) = &diag.suggestion else {
            continue;
        };

        let eligible = match suggestion.applicability {
            Applicability::MachineApplicable => true,
            Applicability::MaybeIncorrect | Applicability::HasPlaceholders => allow_unsafe,
            Applicability::Unspecified => false,
        };
        if !eligible {
            skipped += 1;
            continue;
        }

        suggestion.edit.validate(source)?;
        if edits.iter().any(|e| e.overlaps_with(&suggestion.edit)) {
            tracing::debug!(
                lint = diag.lint.name,
                start = suggestion.edit.range.start,
                "deferring overlapping fix"
            );
            skipped += 1;
            continue;
        }
        edits.push(suggestion.edit.clone());
    }

    let applied = edits.len();
    let fixed_source = apply_edits(source, &edits)?;
    Ok(FixResult {
        fixed_source,
        fixes_applied: applied,
        fixes_skipped: skipped,
    })
}

/// Generate a unified diff between original and fixed source.
pub fn format_diff(original: &str, fixed: &str, path: &Path) -> String {
    format_diff_with_context(original, fixed, path, 3)
}

/// Line-by-line unified diff with `context` unchanged lines around each change.
///
/// Lines are compared positionally, which is exact for the fixes this crate
/// produces: reorderings keep the line count of the text they touch.
pub fn format_diff_with_context(
    original: &str,
    fixed: &str,
    path: &Path,
    context: usize,
) -> String {
    let orig_lines: Vec<&str> = original.lines().collect();
    let fixed_lines: Vec<&str> = fixed.lines().collect();
    let max_len = orig_lines.len().max(fixed_lines.len());

    let changed: Vec<usize> = (0..max_len)
        .filter(|&i| orig_lines.get(i) != fixed_lines.get(i))
        .collect();
    if changed.is_empty() {
        return String::new();
    }

    // Merge changed lines whose context windows touch.
    let mut hunks: Vec<(usize, usize)> = Vec::new();
    for &i in &changed {
        let start = i.saturating_sub(context);
        let end = (i + context + 1).min(max_len);
        match hunks.last_mut() {
            Some((_, last_end)) if start <= *last_end => *last_end = end,
            _ => hunks.push((start, end)),
        }
    }

    let path_str = path.display().to_string();
    let mut output = String::new();
    let _ = writeln!(output, "--- a/{path_str}");
    let _ = writeln!(output, "+++ b/{path_str}");

    for (start, end) in hunks {
        let orig_size = end.min(orig_lines.len()).saturating_sub(start);
        let fixed_size = end.min(fixed_lines.len()).saturating_sub(start);
        let _ = writeln!(
            output,
            "@@ -{},{} +{},{} @@",
            start + 1,
            orig_size,
            start + 1,
            fixed_size
        );

        for line_idx in start..end {
            let orig = orig_lines.get(line_idx);
            let fix = fixed_lines.get(line_idx);
            if orig == fix {
                if let Some(line) = orig {
                    let _ = writeln!(output, " {line}");
                }
                continue;
            }
            if let Some(line) = orig {
                let _ = writeln!(output, "-{line}");
            }
            if let Some(line) = fix {
                let _ = writeln!(output, "+{line}");
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::TextRange;
    use crate::diagnostics::{Position, Span, Suggestion};
    use crate::level::LintLevel;
    use crate::lint::{FixDescriptor, LintCategory, LintDescriptor};

    static TEST_LINT: LintDescriptor = LintDescriptor {
        name: "test",
        category: LintCategory::Style,
        description: "test",
        fix: FixDescriptor::none(),
        messages: &[],
    };

    fn diag(start: usize, end: usize, replacement: &str, applicability: Applicability) -> Diagnostic {
        let pos = Position { row: 1, column: 1 };
        Diagnostic {
            lint: &TEST_LINT,
            level: LintLevel::Warn,
            file: None,
            span: Span { start: pos, end: pos },
            range: TextRange::new(start, end),
            message_id: "test",
            message: "test".into(),
            help: None,
            suggestion: Some(Suggestion {
                message: "Replace".into(),
                edit: TextEdit::replace(TextRange::new(start, end), replacement),
                applicability,
            }),
        }
    }

    #[test]
    fn test_apply_single_fix() {
        let source = "let { b, a } = obj;";
        let result = apply_fixes(
            source,
            &[diag(6, 10, "a, b", Applicability::MachineApplicable)],
            false,
        )
        .unwrap();
        assert_eq!(result.fixed_source, "let { a, b } = obj;");
        assert_eq!(result.fixes_applied, 1);
    }

    #[test]
    fn test_unsafe_fixes_need_opt_in() {
        let source = "let aVAR = 1;";
        let diags = [diag(4, 8, "aVar", Applicability::MaybeIncorrect)];

        let skipped = apply_fixes(source, &diags, false).unwrap();
        assert_eq!(skipped.fixed_source, source);
        assert_eq!(skipped.fixes_skipped, 1);

        let applied = apply_fixes(source, &diags, true).unwrap();
        assert_eq!(applied.fixed_source, "let aVar = 1;");
    }

    #[test]
    fn test_overlapping_fixes_are_deferred() {
        let source = "let { c, b, a } = obj;";
        let diags = [
            diag(6, 13, "a, b, c", Applicability::MachineApplicable),
            diag(9, 13, "a, b", Applicability::MachineApplicable),
        ];
        let result = apply_fixes(source, &diags, false).unwrap();
        assert_eq!(result.fixed_source, "let { a, b, c } = obj;");
        assert_eq!(result.fixes_applied, 1);
        assert_eq!(result.fixes_skipped, 1);
    }

    #[test]
    fn test_format_diff() {
        let original = "import b from \"b\";\nimport a from \"a\";\n";
        let fixed = "import a from \"a\";\nimport b from \"b\";\n";
        let diff = format_diff(original, fixed, Path::new("src/index.ts"));
        assert!(diff.contains("--- a/src/index.ts"));
        assert!(diff.contains("-import b from \"b\";"));
        assert!(diff.contains("+import a from \"a\";"));
        assert!(diff.contains("@@ -1,2 +1,2 @@"));
    }
}
