use crate::level::LintLevel;
use crate::lint::all_known_lints_with_aliases;
use crate::rules::{
    LogicalExpressionComplexityOptions, OrderedDestructuringOptions, OrderedImportMembersOptions,
    OrderedImportsByPathOptions, StrictCamelCaseOptions,
};
use crate::telemetry::filter_for_level;
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SequenceLintConfig {
    /// `error`, `warn`, `info`, `debug`, `trace` or `off`; `RUST_LOG` takes precedence.
    #[serde(default)]
    pub log_level: Option<String>,

    /// Names that resolve like built-in globals (e.g. `jQuery`).
    #[serde(default)]
    pub globals: Vec<String>,

    #[serde(default)]
    pub lints: LintsConfig,

    #[serde(default)]
    pub rules: RulesConfig,
}

impl SequenceLintConfig {
    /// Tracing filter directive for `log_level`, if one is set.
    pub fn tracing_filter(&self) -> Option<String> {
        self.log_level.as_deref().and_then(filter_for_level)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LintsConfig {
    #[serde(default)]
    pub disabled: Vec<String>,

    #[serde(flatten)]
    pub levels: HashMap<String, LintLevel>,
}

/// Per-rule options from the `[rules.<name>]` tables.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RulesConfig {
    #[serde(alias = "strict-camel-case")]
    pub strict_camel_case: StrictCamelCaseOptions,

    #[serde(alias = "ordered-imports-by-path")]
    pub ordered_imports_by_path: OrderedImportsByPathOptions,

    #[serde(alias = "ordered-import-members")]
    pub ordered_import_members: OrderedImportMembersOptions,

    #[serde(alias = "ordered-destructuring")]
    pub ordered_destructuring: OrderedDestructuringOptions,

    #[serde(alias = "logical-expression-complexity")]
    pub logical_expression_complexity: LogicalExpressionComplexityOptions,
}

pub const DEFAULT_CONFIG_FILE_NAME: &str = "sequence-lint.toml";

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut cur = Some(start_dir);
    while let Some(dir) = cur {
        let candidate = dir.join(DEFAULT_CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        cur = dir.parent();
    }
    None
}

pub fn load_config_file(path: &Path) -> Result<SequenceLintConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    let cfg: SequenceLintConfig = toml::from_str(&raw)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;
    validate(&cfg).with_context(|| format!("invalid config file: {}", path.display()))?;
    Ok(cfg)
}

fn validate(cfg: &SequenceLintConfig) -> Result<()> {
    if let Some(level) = cfg.log_level.as_deref() {
        if filter_for_level(level).is_none() {
            bail!("unknown log_level `{level}`");
        }
    }
    let known = all_known_lints_with_aliases();
    if let Some(name) = cfg
        .lints
        .levels
        .keys()
        .chain(&cfg.lints.disabled)
        .find(|name| !known.contains(name.as_str()))
    {
        bail!("unknown lint `{name}` in [lints]");
    }
    Ok(())
}

pub fn load_config(
    explicit_path: Option<&Path>,
    start_dir: &Path,
) -> Result<Option<(PathBuf, SequenceLintConfig)>> {
    if let Some(p) = explicit_path {
        let cfg = load_config_file(p)?;
        return Ok(Some((p.to_path_buf(), cfg)));
    }

    let Some(p) = find_config_file(start_dir) else {
        return Ok(None);
    };
    tracing::debug!(path = %p.display(), "using discovered config");
    let cfg = load_config_file(&p)?;
    Ok(Some((p, cfg)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::strict_camel_case::SingleWordPosition;

    fn parse(raw: &str) -> Result<SequenceLintConfig> {
        let cfg: SequenceLintConfig = toml::from_str(raw)?;
        validate(&cfg)?;
        Ok(cfg)
    }

    #[test]
    fn empty_config_uses_rule_defaults() {
        let cfg = parse("").unwrap();
        assert!(cfg.rules.ordered_imports_by_path.allow_separate_groups);
        assert_eq!(cfg.rules.logical_expression_complexity.max_height, 2);
        assert_eq!(cfg.tracing_filter(), None);
    }

    #[test]
    fn rule_tables_accept_kebab_case_names() {
        let cfg = parse(
            r#"
            [rules.strict-camel-case]
            ignore_single_words_in = ["enum_member"]

            [rules.ordered_imports_by_path]
            groups = ["^react", "THE_REST"]
            sort_type_imports_first = false
            "#,
        )
        .unwrap();
        assert_eq!(
            cfg.rules.strict_camel_case.ignore_single_words_in,
            [SingleWordPosition::EnumMember]
        );
        assert_eq!(cfg.rules.ordered_imports_by_path.groups.len(), 2);
        assert_eq!(
            cfg.rules.ordered_imports_by_path.sort_type_imports_first,
            Some(false)
        );
    }

    #[test]
    fn lint_levels_and_log_level() {
        let cfg = parse(
            r#"
            log_level = "debug"
            globals = ["jQuery"]

            [lints]
            disabled = ["ordered-destructuring"]
            strict_camel_case = "error"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.tracing_filter().as_deref(), Some("sequence_lint=debug"));
        assert_eq!(cfg.globals, ["jQuery"]);
        assert_eq!(cfg.lints.levels["strict_camel_case"], LintLevel::Error);
    }

    #[test]
    fn rejects_unknown_settings() {
        assert!(parse("log_level = \"loud\"").is_err());
        assert!(parse("[lints]\nno_such_lint = \"warn\"").is_err());
        assert!(parse("[rules.ordered_destructuring]\nsort = true").is_err());
        assert!(parse("[lints]\npreview = true").is_err());
    }
}
