//! Identifier tokenization and strict camel-case validation.
//!
//! Pure functions over names; the AST-facing classifier lives in
//! [`super::strict_camel_case`].

use super::util::{capitalize, is_all_caps, is_all_caps_and_digits, is_digit, is_lower, is_upper};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;

static ALL_CAPS_SNAKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\p{Lu}0-9]+(?:_[\p{Lu}0-9]+)+$").expect("all-caps snake pattern is valid")
});

static MIXED_SNAKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^_*[\p{L}0-9]+(?:_[\p{L}0-9]+)+_*$").expect("mixed snake pattern is valid")
});

/// `SCREAMING_SNAKE` names; always acceptable as constants.
pub fn is_all_caps_snake_case(name: &str) -> bool {
    ALL_CAPS_SNAKE.is_match(name)
}

/// Words separated by underscores, with optional leading/trailing underscore runs.
pub fn is_mixed_snake_case(name: &str) -> bool {
    MIXED_SNAKE.is_match(name)
}

// ============================================================================
// Tokens
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordKind {
    Normal,
    /// Every char an uppercase letter (`XML`, `X`).
    AllCaps,
    Digits,
    UnderscoreRun,
}

/// A maximal substring of an identifier. Tokens of one name concatenate back
/// to the name exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Word<'a> {
    pub text: &'a str,
    pub kind: WordKind,
}

impl<'a> Word<'a> {
    fn new(text: &'a str) -> Self {
        let kind = if text.chars().all(|c| c == '_') {
            WordKind::UnderscoreRun
        } else if text.chars().all(is_digit) {
            WordKind::Digits
        } else if is_all_caps(text) {
            WordKind::AllCaps
        } else {
            WordKind::Normal
        };
        Self { text, kind }
    }
}

/// Split a name into words: snake-style names on underscores, everything
/// else on camel-case boundaries.
pub fn tokenize(name: &str) -> Vec<Word<'_>> {
    if is_mixed_snake_case(name) {
        tokenize_snake_case(name)
    } else {
        tokenize_camel_case(name)
    }
}

/// Camel-case split.
///
/// A run of capitals is one word until a lowercase letter follows, which
/// starts a new word with the last capital (`XMLHttp` -> `XML`, `Http`). A
/// digit run starts a word. Underscores and `$` stick to their neighbours.
pub fn tokenize_camel_case(name: &str) -> Vec<Word<'_>> {
    let mut words = Vec::new();
    let mut start = 0;
    let mut capturing = false;
    let mut last_was_upper = false;
    let mut last_was_digit = false;
    let mut prev_offset = 0;

    for (i, c) in name.char_indices() {
        let upper = is_upper(c);
        let digit = is_digit(c);

        if upper && last_was_upper {
            capturing = true;
        } else if upper && !capturing && i != 0 {
            push_word(&mut words, &name[start..i]);
            start = i;
        } else if is_lower(c) && capturing {
            push_word(&mut words, &name[start..prev_offset]);
            start = prev_offset;
            capturing = false;
        } else if digit && !last_was_digit {
            push_word(&mut words, &name[start..i]);
            start = i;
            capturing = false;
        }

        last_was_upper = upper;
        last_was_digit = digit;
        prev_offset = i;
    }

    push_word(&mut words, &name[start..]);
    words
}

fn push_word<'a>(words: &mut Vec<Word<'a>>, text: &'a str) {
    if !text.is_empty() {
        words.push(Word::new(text));
    }
}

/// Snake-case split keeping every underscore run as its own token.
pub fn tokenize_snake_case(name: &str) -> Vec<Word<'_>> {
    let mut words = Vec::new();
    let mut start = 0;
    let mut in_underscores = false;

    for (i, c) in name.char_indices() {
        let underscore = c == '_';
        if i != 0 && underscore != in_underscores {
            push_word(&mut words, &name[start..i]);
            start = i;
        }
        in_underscores = underscore;
    }

    push_word(&mut words, &name[start..]);
    words
}

// ============================================================================
// Validation
// ============================================================================

/// Where single-character capitals (`getX`) are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OneCharWords {
    Always,
    #[default]
    Never,
    /// Only as the final word, optionally followed by a trailing underscore run.
    Last,
}

/// Outcome of validating one name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    Invalid { suggestion: Option<String> },
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid)
    }

    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Verdict::Valid => None,
            Verdict::Invalid { suggestion } => suggestion.as_deref(),
        }
    }
}

/// Checks names against strict camel case.
#[derive(Debug, Clone, Default)]
pub struct CasingValidator {
    ignored: HashSet<String>,
    one_char_words: OneCharWords,
    ignore_single_words: bool,
}

impl CasingValidator {
    pub fn new(
        ignored: impl IntoIterator<Item = String>,
        one_char_words: OneCharWords,
        ignore_single_words: bool,
    ) -> Self {
        Self {
            ignored: ignored.into_iter().collect(),
            one_char_words,
            ignore_single_words,
        }
    }

    /// Validate `name`. `exempt_single_word` lets an all-caps single word
    /// (`HTML`, `MAX2`) pass in positions configured for it.
    ///
    /// A suggestion is only offered when it differs from `name`, is not
    /// empty, and itself validates.
    pub fn check(&self, name: &str, exempt_single_word: bool) -> Verdict {
        let verdict = self.check_once(name, exempt_single_word);
        match verdict {
            Verdict::Invalid {
                suggestion: Some(ref fixed),
            } if !self.check_once(fixed, exempt_single_word).is_valid() => {
                tracing::trace!(name, suggestion = %fixed, "dropping suggestion that fails validation");
                Verdict::Invalid { suggestion: None }
            }
            other => other,
        }
    }

    fn check_once(&self, name: &str, exempt_single_word: bool) -> Verdict {
        if self.ignored.contains(name) {
            return Verdict::Valid;
        }
        if is_all_caps_and_digits(name) && (self.ignore_single_words || exempt_single_word) {
            return Verdict::Valid;
        }
        if is_all_caps_snake_case(name) {
            return Verdict::Valid;
        }
        if is_mixed_snake_case(name) {
            return Verdict::Invalid {
                suggestion: suggestion_for(name, camelize_snake(&tokenize_snake_case(name))),
            };
        }

        let words = tokenize_camel_case(name);
        let last = words.len().saturating_sub(1);
        let ends_in_underscores =
            words.len() >= 2 && words[last].kind == WordKind::UnderscoreRun;

        let mut valid = true;
        let mut fixed = String::with_capacity(name.len());
        for (i, word) in words.iter().enumerate() {
            let acceptable = word.kind != WordKind::AllCaps
                || (word.text.chars().count() == 1
                    && match self.one_char_words {
                        OneCharWords::Always => true,
                        OneCharWords::Never => false,
                        OneCharWords::Last => {
                            i == last || (ends_in_underscores && i + 1 == last)
                        }
                    });
            if acceptable {
                fixed.push_str(word.text);
            } else {
                valid = false;
                fixed.push_str(&capitalize(word.text));
            }
        }

        if valid {
            Verdict::Valid
        } else {
            Verdict::Invalid {
                suggestion: suggestion_for(name, fixed),
            }
        }
    }
}

/// Join snake words into camel case, keeping leading and trailing underscore runs.
fn camelize_snake(words: &[Word<'_>]) -> String {
    let last = words.len().saturating_sub(1);
    let mut out = String::new();
    let mut seen_word = false;
    for (i, word) in words.iter().enumerate() {
        if word.kind == WordKind::UnderscoreRun {
            if i == 0 || i == last {
                out.push_str(word.text);
            }
            continue;
        }
        if seen_word {
            out.push_str(&capitalize(word.text));
        } else if word.text.starts_with(is_upper) {
            out.push_str(&capitalize(word.text));
        } else {
            out.push_str(&word.text.to_lowercase());
        }
        seen_word = true;
    }
    out
}

fn suggestion_for(name: &str, fixed: String) -> Option<String> {
    (!fixed.is_empty() && fixed != name).then_some(fixed)
}
