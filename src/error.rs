use anyhow::Error as AnyhowError;
use thiserror::Error;

/// Result alias for errors emitted by the lint core.
pub type LintResult<T> = Result<T, LintError>;

/// Structured error type for the lint core.
///
/// Configuration problems (`InvalidOption`, `UnknownLint`) are raised when a rule
/// or registry is constructed. `MissingRange` is a structural invariant violation
/// that aborts processing of the current file; it is never reported as a lint.
#[derive(Debug, Error)]
pub enum LintError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse source: syntax error at line {line}")]
    Syntax { line: usize },

    #[error("parser failure: {0}")]
    Parser(String),

    #[error("node `{kind}` has no source range")]
    MissingRange { kind: &'static str },

    #[error("invalid option for `{rule}`: {message}")]
    InvalidOption { rule: &'static str, message: String },

    #[error("unknown lint: {0}")]
    UnknownLint(String),

    #[error("{0}")]
    Other(String),
}

impl LintError {
    pub fn invalid_option(rule: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidOption {
            rule,
            message: message.into(),
        }
    }

    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

impl From<AnyhowError> for LintError {
    fn from(err: AnyhowError) -> Self {
        LintError::other(err.to_string())
    }
}

/// Convenience macro mirroring `anyhow::bail!` but returning `LintError`.
#[macro_export]
macro_rules! lint_bail {
    ($($arg:tt)*) => {
        return Err($crate::error::LintError::other(format!($($arg)*)))
    };
}

/// Convenience macro mirroring `anyhow::ensure!`.
#[macro_export]
macro_rules! lint_ensure {
    ($cond:expr, $($arg:tt)*) => {
        if !($cond) {
            $crate::lint_bail!($($arg)*);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guarded(n: usize) -> LintResult<usize> {
        crate::lint_ensure!(n > 0, "expected a positive value, got {n}");
        Ok(n)
    }

    #[test]
    fn ensure_macro_short_circuits() {
        assert_eq!(guarded(3).unwrap(), 3);
        let err = guarded(0).unwrap_err();
        assert_eq!(err.to_string(), "expected a positive value, got 0");
    }

    #[test]
    fn missing_range_names_the_node_kind() {
        let err = LintError::MissingRange { kind: "Identifier" };
        assert_eq!(err.to_string(), "node `Identifier` has no source range");
    }
}
