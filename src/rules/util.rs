use std::cmp::Ordering;

/// How names are compared by the ordering rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompareOptions {
    pub ignore_case: bool,
    /// Compare runs of ASCII digits by numeric value (`key5` before `key10`).
    pub natural: bool,
}

/// Total order over names used by every ordering rule.
///
/// Without `natural` this is plain code-point order, so `"A" < "a"` and
/// `"key10" < "key5"`. The result is `Equal` only for identical (post
/// case-folding) strings.
pub(crate) fn string_compare(a: &str, b: &str, opts: CompareOptions) -> Ordering {
    if opts.ignore_case {
        let (a, b) = (a.to_lowercase(), b.to_lowercase());
        compare_folded(&a, &b, opts.natural)
    } else {
        compare_folded(a, b, opts.natural)
    }
}

fn compare_folded(a: &str, b: &str, natural: bool) -> Ordering {
    if natural {
        natural_cmp(a, b).then_with(|| a.cmp(b))
    } else {
        a.cmp(b)
    }
}

fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        if a[i].is_ascii_digit() && b[j].is_ascii_digit() {
            let run_a = digit_run(a, i);
            let run_b = digit_run(b, j);
            let ord = compare_digit_runs(&a[i..run_a], &b[j..run_b]);
            if ord != Ordering::Equal {
                return ord;
            }
            i = run_a;
            j = run_b;
            continue;
        }
        match a[i].cmp(&b[j]) {
            Ordering::Equal => {
                i += 1;
                j += 1;
            }
            other => return other,
        }
    }
    (a.len() - i).cmp(&(b.len() - j))
}

fn digit_run(bytes: &[u8], from: usize) -> usize {
    bytes[from..]
        .iter()
        .position(|b| !b.is_ascii_digit())
        .map_or(bytes.len(), |n| from + n)
}

/// Compare two digit runs by value without overflowing on long runs.
fn compare_digit_runs(a: &[u8], b: &[u8]) -> Ordering {
    let strip = |run: &[u8]| -> usize { run.iter().take_while(|&&d| d == b'0').count() };
    let (a, b) = (&a[strip(a)..], &b[strip(b)..]);
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

// ============================================================================
// Character classes shared by the casing rules
// ============================================================================

/// A letter whose uppercase form is itself. Caseless letters count as both cases.
pub(crate) fn is_upper(c: char) -> bool {
    c.is_alphabetic() && c.to_uppercase().eq(std::iter::once(c))
}

pub(crate) fn is_lower(c: char) -> bool {
    c.is_alphabetic() && c.to_lowercase().eq(std::iter::once(c))
}

pub(crate) fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

/// Every char is an uppercase letter. Digits do not count.
pub(crate) fn is_all_caps(s: &str) -> bool {
    s.chars().all(is_upper)
}

pub(crate) fn is_all_caps_and_digits(s: &str) -> bool {
    s.chars().all(|c| is_upper(c) || is_digit(c))
}

/// First char uppercased, the rest lowercased.
pub(crate) fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN: CompareOptions = CompareOptions {
        ignore_case: false,
        natural: false,
    };

    #[test]
    fn plain_order_is_code_point_order() {
        assert_eq!(string_compare("A", "a", PLAIN), Ordering::Less);
        assert_eq!(string_compare("key10", "key5", PLAIN), Ordering::Less);
        assert_eq!(string_compare("a", "a", PLAIN), Ordering::Equal);
    }

    #[test]
    fn ignore_case_folds_before_comparing() {
        let opts = CompareOptions {
            ignore_case: true,
            natural: false,
        };
        assert_eq!(string_compare("B", "a", opts), Ordering::Greater);
        assert_eq!(string_compare("Foo", "foo", opts), Ordering::Equal);
    }

    #[test]
    fn natural_compares_digit_runs_by_value() {
        let opts = CompareOptions {
            ignore_case: false,
            natural: true,
        };
        assert_eq!(string_compare("key5", "key10", opts), Ordering::Less);
        assert_eq!(string_compare("a2b", "a10a", opts), Ordering::Less);
        assert_eq!(string_compare("v01", "v1", opts), Ordering::Less);
        assert_eq!(string_compare("x", "x1", opts), Ordering::Less);
        let long = "9".repeat(40);
        assert_eq!(
            string_compare(&format!("n{long}"), "n1", opts),
            Ordering::Greater
        );
    }

    #[test]
    fn case_classes() {
        assert!(is_upper('A') && !is_upper('a') && !is_upper('1'));
        assert!(is_lower('a') && !is_lower('_'));
        assert!(is_all_caps("XML") && !is_all_caps("X1"));
        assert!(is_all_caps_and_digits("X1") && is_all_caps_and_digits(""));
    }

    #[test]
    fn capitalize_lowers_the_tail() {
        assert_eq!(capitalize("hTML"), "Html");
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("__"), "__");
    }
}
