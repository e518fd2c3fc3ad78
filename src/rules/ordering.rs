//! Shared machinery of the ordering rules: adjacency between siblings and the
//! text rebuilding behind their fixes.

use crate::ast::TextRange;
use crate::error::LintResult;
use crate::fix::TextEdit;
use crate::source::SourceFile;
use std::cmp::Ordering;

use super::util::{CompareOptions, string_compare};

/// A sibling taking part in a sort: its key range (what moves) and the name it sorts by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub range: TextRange,
    pub name: String,
}

impl SortKey {
    pub fn new(range: TextRange, name: impl Into<String>) -> Self {
        Self {
            range,
            name: name.into(),
        }
    }
}

/// Whether `right` directly follows `left`: at most one line break between
/// them, or only comments in between with no blank line on either side.
pub fn are_adjacent(file: &SourceFile, left: TextRange, right: TextRange) -> bool {
    let left_end = file.line_of(left.end);
    let right_start = file.line_of(right.start);
    let comments = file.comments_after(left);
    match (comments.first(), comments.last()) {
        (Some(first), Some(last)) => {
            file.line_of(first.range.start).saturating_sub(left_end) <= 1
                && right_start.saturating_sub(file.line_of(last.range.end)) <= 1
        }
        _ => right_start.saturating_sub(left_end) <= 1,
    }
}

/// Split `items` into runs of mutually adjacent neighbours.
pub fn adjacent_runs(file: &SourceFile, items: &[TextRange]) -> Vec<Vec<usize>> {
    let mut runs: Vec<Vec<usize>> = Vec::new();
    for (i, range) in items.iter().enumerate() {
        let continues = i > 0 && are_adjacent(file, items[i - 1], *range);
        match runs.last_mut() {
            Some(run) if continues => run.push(i),
            _ => runs.push(vec![i]),
        }
    }
    runs
}

fn sorted_order(keys: &[SortKey], opts: CompareOptions) -> Vec<usize> {
    let mut order: Vec<usize> = (0..keys.len()).collect();
    order.sort_by(|&a, &b| string_compare(&keys[a].name, &keys[b].name, opts));
    order
}

/// Reorder brace-delimited entries (`{ b, a }`) while keeping each entry's
/// trailing comma and comments attached to it.
///
/// Every key moves together with the text up to the next key. The last key's
/// text runs up to the closing `}`, or up to a `...` rest element inside the
/// braces, which stays in place. A comma is added after the last key when it
/// has none so the moved entry stays separated.
///
/// # Errors
///
/// Fails when no closing `}` follows the last key.
pub fn comment_preserving_fix(
    file: &SourceFile,
    keys: &[SortKey],
    opts: CompareOptions,
) -> LintResult<Option<TextEdit>> {
    let (Some(first), Some(last)) = (keys.first(), keys.last()) else {
        return Ok(None);
    };

    let Some(closing) = file.find_punctuator_after(last.range.end, "}") else {
        crate::lint_bail!("no `}}` after sorted entries at {}", last.range);
    };
    let rest = file
        .find_punctuator_between(last.range.end, closing.range.start, "...")
        .map(|t| t.range.start);
    let end = rest.unwrap_or(closing.range.start);
    let add_comma = rest.is_none() && !file.has_punctuator_between(last.range.end, end, ",");

    let fragments: Vec<String> = keys
        .iter()
        .enumerate()
        .map(|(i, key)| {
            let tail_end = keys.get(i + 1).map_or(end, |next| next.range.start);
            let mut fragment = file.slice(key.range).to_string();
            if i + 1 == keys.len() && add_comma {
                fragment.push(',');
            }
            fragment.push_str(file.slice(TextRange::new(key.range.end, tail_end)));
            fragment
        })
        .collect();

    let replacement: String = sorted_order(keys, opts)
        .into_iter()
        .map(|i| fragments[i].as_str())
        .collect();
    Ok(Some(TextEdit::replace(
        TextRange::new(first.range.start, end),
        replacement,
    )))
}

/// Reorder entries in place, reusing the separators found between the
/// original positions (`b, a` -> `a, b`).
pub fn positional_fix(file: &SourceFile, keys: &[SortKey], opts: CompareOptions) -> Option<TextEdit> {
    let (first, last) = (keys.first()?, keys.last()?);
    let order = sorted_order(keys, opts);

    let mut replacement = String::new();
    for (slot, &i) in order.iter().enumerate() {
        replacement.push_str(file.slice(keys[i].range));
        if let Some(next) = keys.get(slot + 1) {
            replacement.push_str(file.slice(TextRange::new(keys[slot].range.end, next.range.start)));
        }
    }
    Some(TextEdit::replace(
        TextRange::new(first.range.start, last.range.end),
        replacement,
    ))
}

/// First index `i` where `keys[i]` sorts after `keys[i + 1]`.
pub fn first_inversion(keys: &[SortKey], opts: CompareOptions) -> Option<usize> {
    keys.windows(2)
        .position(|w| string_compare(&w[0].name, &w[1].name, opts) == Ordering::Greater)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{NodeKind, NodeTag};
    use crate::fix::apply_edit;

    const PLAIN: CompareOptions = CompareOptions {
        ignore_case: false,
        natural: false,
    };

    /// Keys of the first object pattern in `src`.
    fn pattern_keys(file: &SourceFile) -> Vec<SortKey> {
        let ast = file.ast();
        let pattern = ast
            .preorder(ast.root())
            .into_iter()
            .find(|id| ast.tag(*id) == NodeTag::ObjectPattern)
            .unwrap();
        let NodeKind::ObjectPattern { properties } = ast.kind(pattern) else {
            unreachable!()
        };
        properties
            .iter()
            .filter_map(|p| match ast.kind(*p) {
                NodeKind::Property { key, .. } => {
                    Some(SortKey::new(ast.range(*p).unwrap(), ast.name(*key).unwrap()))
                }
                _ => None,
            })
            .collect()
    }

    fn fix(src: &str) -> String {
        let file = SourceFile::parse(src, &[]).unwrap();
        let keys = pattern_keys(&file);
        let edit = comment_preserving_fix(&file, &keys, PLAIN).unwrap().unwrap();
        apply_edit(src, &edit).unwrap()
    }

    #[test]
    fn adds_a_trailing_comma() {
        assert_eq!(fix("const { b, a } = o;"), "const { a, b, } = o;");
    }

    #[test]
    fn keeps_an_existing_trailing_comma() {
        assert_eq!(fix("const { b, a, } = o;"), "const { a, b, } = o;");
    }

    #[test]
    fn comments_travel_with_their_entry() {
        let src = "const {\n  b, // bee\n  a // ay\n} = o;";
        assert_eq!(fix(src), "const {\n  a, // ay\nb, // bee\n  } = o;");
    }

    #[test]
    fn rest_element_stays_last() {
        assert_eq!(fix("const { c, a, ...rest } = o;"), "const { a, c, ...rest } = o;");
    }

    #[test]
    fn positional_fix_reuses_separators() {
        let src = "const { b,  a } = o;";
        let file = SourceFile::parse(src, &[]).unwrap();
        let keys = pattern_keys(&file);
        let edit = positional_fix(&file, &keys, PLAIN).unwrap();
        assert_eq!(apply_edit(src, &edit).unwrap(), "const { a,  b } = o;");
    }

    #[test]
    fn adjacency_follows_blank_lines_and_comments() {
        let src = "import a from 'a';\n// about b\nimport b from 'b';\n\nimport c from 'c';";
        let file = SourceFile::parse(src, &[]).unwrap();
        let ast = file.ast();
        let NodeKind::Program { body } = ast.kind(ast.root()) else {
            unreachable!()
        };
        let ranges: Vec<TextRange> = body.iter().map(|id| ast.range(*id).unwrap()).collect();
        assert!(are_adjacent(&file, ranges[0], ranges[1]));
        assert!(!are_adjacent(&file, ranges[1], ranges[2]));
        assert_eq!(adjacent_runs(&file, &ranges), vec![vec![0, 1], vec![2]]);
    }

    #[test]
    fn first_inversion_uses_the_comparator() {
        let keys = [
            SortKey::new(TextRange::new(0, 1), "a"),
            SortKey::new(TextRange::new(2, 3), "C"),
            SortKey::new(TextRange::new(4, 5), "b"),
        ];
        assert_eq!(first_inversion(&keys, PLAIN), Some(0));
        let folded = CompareOptions {
            ignore_case: true,
            natural: false,
        };
        assert_eq!(first_inversion(&keys, folded), Some(1));
    }
}
