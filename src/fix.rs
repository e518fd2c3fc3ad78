//! Text edits and their pure application.
//!
//! Edits address byte ranges of the original text. A batch of edits is
//! validated as a whole (in bounds, on char boundaries, non-overlapping) and
//! applied back to front so earlier offsets stay valid.

use crate::ast::TextRange;
use thiserror::Error;

/// Error type for edit application.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FixError {
    #[error("overlapping edits at byte {0}")]
    OverlappingEdits(usize),

    #[error("edit range [{start}..{end}) exceeds source length {source_len}")]
    InvalidRange {
        start: usize,
        end: usize,
        source_len: usize,
    },

    #[error("edit start {start} is after edit end {end}")]
    InvalidEditOrder { start: usize, end: usize },

    #[error("edit boundary {0} splits a character")]
    NotCharBoundary(usize),
}

/// Replace `range` of the original text with `replacement`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range: TextRange,
    pub replacement: String,
}

impl TextEdit {
    pub fn replace(range: TextRange, replacement: impl Into<String>) -> Self {
        Self {
            range,
            replacement: replacement.into(),
        }
    }

    pub fn delete(range: TextRange) -> Self {
        Self::replace(range, String::new())
    }

    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Self::replace(TextRange::new(offset, offset), text)
    }

    /// Half-open ranges overlap when each starts before the other ends.
    /// Two insertions at the same offset also conflict.
    pub fn overlaps_with(&self, other: &TextEdit) -> bool {
        let (a, b) = (self.range, other.range);
        (a.start < b.end && b.start < a.end) || a.start == b.start
    }

    pub fn validate(&self, source: &str) -> Result<(), FixError> {
        let TextRange { start, end } = self.range;
        if start > end {
            return Err(FixError::InvalidEditOrder { start, end });
        }
        if end > source.len() {
            return Err(FixError::InvalidRange {
                start,
                end,
                source_len: source.len(),
            });
        }
        for offset in [start, end] {
            if !source.is_char_boundary(offset) {
                return Err(FixError::NotCharBoundary(offset));
            }
        }
        Ok(())
    }
}

/// Validate that `edits` are individually valid and pairwise non-overlapping.
pub fn validate_edits(edits: &[TextEdit], source: &str) -> Result<(), FixError> {
    for edit in edits {
        edit.validate(source)?;
    }

    let mut sorted: Vec<&TextEdit> = edits.iter().collect();
    sorted.sort_by_key(|e| (e.range.start, e.range.end));
    for pair in sorted.windows(2) {
        if pair[0].overlaps_with(pair[1]) {
            return Err(FixError::OverlappingEdits(pair[1].range.start));
        }
    }
    Ok(())
}

/// Apply non-overlapping edits to `source`.
///
/// # Errors
///
/// Fails without touching anything if any edit is invalid or two edits overlap.
///
/// # Example
///
/// ```rust
/// use sequence_lint::ast::TextRange;
/// use sequence_lint::fix::{TextEdit, apply_edits};
///
/// let source = "let { b, a } = obj;";
/// let edits = vec![TextEdit::replace(TextRange::new(6, 10), "a, b")];
/// assert_eq!(apply_edits(source, &edits).unwrap(), "let { a, b } = obj;");
/// ```
pub fn apply_edits(source: &str, edits: &[TextEdit]) -> Result<String, FixError> {
    if edits.is_empty() {
        return Ok(source.to_string());
    }
    validate_edits(edits, source)?;

    let mut sorted = edits.to_vec();
    sorted.sort_by(|a, b| b.range.start.cmp(&a.range.start));

    let mut result = source.to_string();
    for edit in sorted {
        result.replace_range(edit.range.start..edit.range.end, &edit.replacement);
    }
    Ok(result)
}

/// Apply a single edit (convenience wrapper).
pub fn apply_edit(source: &str, edit: &TextEdit) -> Result<String, FixError> {
    apply_edits(source, std::slice::from_ref(edit))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit(start: usize, end: usize, text: &str) -> TextEdit {
        TextEdit::replace(TextRange::new(start, end), text)
    }

    #[test]
    fn test_overlap_detection() {
        let a = edit(0, 10, "a");
        let b = edit(5, 15, "b");
        let c = edit(10, 20, "c");
        assert!(a.overlaps_with(&b));
        assert!(b.overlaps_with(&a));
        assert!(!a.overlaps_with(&c));
        assert!(TextEdit::insert(3, "x").overlaps_with(&TextEdit::insert(3, "y")));
    }

    #[test]
    fn test_validate_rejects_bad_ranges() {
        assert!(matches!(
            edit(10, 5, "").validate("0123456789abc"),
            Err(FixError::InvalidEditOrder { .. })
        ));
        assert!(matches!(
            edit(0, 15, "").validate("short"),
            Err(FixError::InvalidRange { .. })
        ));
        assert_eq!(
            edit(1, 2, "").validate("é"),
            Err(FixError::NotCharBoundary(1))
        );
    }

    #[test]
    fn test_validate_edits_overlapping() {
        let edits = vec![edit(0, 10, "a"), edit(5, 15, "b")];
        assert!(matches!(
            validate_edits(&edits, &"x".repeat(20)),
            Err(FixError::OverlappingEdits(5))
        ));
    }

    #[test]
    fn test_apply_swaps_import_members() {
        let source = "import { Bravo, Alpha } from \"x\";";
        let result = apply_edit(source, &edit(9, 21, "Alpha, Bravo")).unwrap();
        assert_eq!(result, "import { Alpha, Bravo } from \"x\";");
    }

    #[test]
    fn test_apply_multiple_edits_in_any_order() {
        let source = "let aVAR = bVAR + cVAR;";
        let edits = vec![edit(18, 22, "cVar"), edit(4, 8, "aVar"), edit(11, 15, "bVar")];
        assert_eq!(apply_edits(source, &edits).unwrap(), "let aVar = bVar + cVar;");
    }

    #[test]
    fn test_delete_and_insert() {
        assert_eq!(
            apply_edit("hello world", &TextEdit::delete(TextRange::new(5, 11))).unwrap(),
            "hello"
        );
        assert_eq!(
            apply_edit("a, b", &TextEdit::insert(4, ",")).unwrap(),
            "a, b,"
        );
    }

    #[test]
    fn test_no_edits_is_identity() {
        assert_eq!(apply_edits("unchanged", &[]).unwrap(), "unchanged");
    }
}
