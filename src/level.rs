use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity assigned to a lint's diagnostics. `Allow` suppresses the lint entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LintLevel {
    Allow,
    #[default]
    Warn,
    Error,
}

impl LintLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LintLevel::Allow => "allow",
            LintLevel::Warn => "warning",
            LintLevel::Error => "error",
        }
    }

    /// Accepts the spellings used in config files and on the command line.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "allow" | "off" => Some(LintLevel::Allow),
            "warn" | "warning" => Some(LintLevel::Warn),
            "error" | "deny" => Some(LintLevel::Error),
            _ => None,
        }
    }
}

impl fmt::Display for LintLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_config_spellings() {
        assert_eq!(LintLevel::from_name("off"), Some(LintLevel::Allow));
        assert_eq!(LintLevel::from_name("Warning"), Some(LintLevel::Warn));
        assert_eq!(LintLevel::from_name("deny"), Some(LintLevel::Error));
        assert_eq!(LintLevel::from_name("loud"), None);
    }

    #[test]
    fn errors_outrank_warnings() {
        assert!(LintLevel::Error > LintLevel::Warn);
        assert_eq!(LintLevel::default(), LintLevel::Warn);
    }
}
