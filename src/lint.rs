use crate::ast::{NodeId, NodeTag, TextRange};
use crate::diagnostics::{Diagnostic, Suggestion};
use crate::error::{LintError, LintResult};
use crate::level::LintLevel;
use crate::source::SourceFile;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

// ============================================================================
// Fix Safety Classification
// ============================================================================

/// Safety classification for auto-fixes.
///
/// - `Safe` fixes only move existing text around
/// - `Unsafe` fixes change program meaning unless every related edit is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FixSafety {
    /// Applied by default with `--fix`.
    #[default]
    Safe,

    /// Requires `--unsafe-fixes` to apply.
    Unsafe,
}

impl FixSafety {
    pub fn as_str(&self) -> &'static str {
        match self {
            FixSafety::Safe => "safe",
            FixSafety::Unsafe => "unsafe",
        }
    }
}

/// Descriptor for an auto-fix associated with a lint rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixDescriptor {
    pub available: bool,
    pub safety: FixSafety,
    pub description: &'static str,
}

impl FixDescriptor {
    pub const fn safe(description: &'static str) -> Self {
        Self {
            available: true,
            safety: FixSafety::Safe,
            description,
        }
    }

    pub const fn unsafe_fix(description: &'static str) -> Self {
        Self {
            available: true,
            safety: FixSafety::Unsafe,
            description,
        }
    }

    pub const fn none() -> Self {
        Self {
            available: false,
            safety: FixSafety::Safe,
            description: "",
        }
    }
}

// ============================================================================
// Lint Categories
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LintCategory {
    /// Ordering of imports, import members and destructured keys.
    Style,
    Naming,
    Complexity,
}

impl LintCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            LintCategory::Style => "style",
            LintCategory::Naming => "naming",
            LintCategory::Complexity => "complexity",
        }
    }
}

// ============================================================================
// Descriptors and message catalogs
// ============================================================================

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([^{}\s]+)\s*\}\}").expect("placeholder pattern is valid")
});

/// Static metadata describing a lint rule.
#[derive(Debug)]
pub struct LintDescriptor {
    pub name: &'static str,
    pub category: LintCategory,
    pub description: &'static str,
    pub fix: FixDescriptor,
    /// `(message_id, template)` pairs; templates use `{{placeholder}}` syntax.
    pub messages: &'static [(&'static str, &'static str)],
}

impl LintDescriptor {
    pub fn message_template(&self, message_id: &str) -> Option<&'static str> {
        self.messages
            .iter()
            .find(|(id, _)| *id == message_id)
            .map(|(_, template)| *template)
    }

    /// Render a catalog message. Placeholders without data are left as written.
    ///
    /// # Errors
    ///
    /// Fails when `message_id` is not in the catalog.
    pub fn render_message(&self, message_id: &str, data: &[(&str, &str)]) -> LintResult<String> {
        let Some(template) = self.message_template(message_id) else {
            crate::lint_bail!("`{}` has no message `{message_id}`", self.name);
        };
        Ok(render_template(template, data))
    }
}

pub fn render_template(template: &str, data: &[(&str, &str)]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &regex::Captures<'_>| {
            let key = &caps[1];
            data.iter()
                .find(|(k, _)| *k == key)
                .map_or_else(|| caps[0].to_string(), |(_, v)| (*v).to_string())
        })
        .into_owned()
}

// ============================================================================
// Rules and visitors
// ============================================================================

/// A node kind a visitor wants to see, optionally restricted to a parent kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Selector {
    pub tag: NodeTag,
    pub parent: Option<NodeTag>,
}

impl Selector {
    pub const fn node(tag: NodeTag) -> Self {
        Self { tag, parent: None }
    }

    pub const fn child_of(tag: NodeTag, parent: NodeTag) -> Self {
        Self {
            tag,
            parent: Some(parent),
        }
    }

    pub fn matches(&self, tag: NodeTag, parent: Option<NodeTag>) -> bool {
        self.tag == tag && (self.parent.is_none() || self.parent == parent)
    }
}

/// A configured lint rule. Options are fixed when the rule is built; all
/// mutable state lives in the visitor returned by [`LintRule::create`].
pub trait LintRule: Send + Sync {
    fn descriptor(&self) -> &'static LintDescriptor;

    /// Fresh per-file visitor.
    fn create<'r>(&'r self, file: &SourceFile) -> Box<dyn RuleVisitor + 'r>;
}

pub trait RuleVisitor {
    fn selectors(&self) -> Vec<Selector>;

    /// Called for every node matching one of [`RuleVisitor::selectors`], in pre-order.
    fn visit(&mut self, node: NodeId, ctx: &mut LintContext<'_>) -> LintResult<()>;
}

// ============================================================================
// Settings
// ============================================================================

/// Per-lint levels derived from `sequence-lint.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintSettings {
    levels: HashMap<String, LintLevel>,
}

impl LintSettings {
    #[must_use]
    pub fn with_config_levels(mut self, levels: HashMap<String, LintLevel>) -> Self {
        for (name, level) in levels {
            let canonical = resolve_lint_alias(&name);
            self.levels.insert(canonical.to_string(), level);
        }
        self
    }

    #[must_use]
    pub fn disable(mut self, disabled: impl IntoIterator<Item = String>) -> Self {
        for name in disabled {
            let canonical = resolve_lint_alias(&name);
            self.levels.insert(canonical.to_string(), LintLevel::Allow);
        }
        self
    }

    pub fn level_for(&self, lint_name: &str) -> LintLevel {
        self.levels
            .get(resolve_lint_alias(lint_name))
            .copied()
            .unwrap_or_default()
    }
}

// ============================================================================
// Context
// ============================================================================

/// Report sink handed to visitors while one file is walked.
pub struct LintContext<'a> {
    file: &'a SourceFile,
    settings: &'a LintSettings,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> LintContext<'a> {
    pub fn new(file: &'a SourceFile, settings: &'a LintSettings) -> Self {
        Self {
            file,
            settings,
            diagnostics: Vec::new(),
        }
    }

    pub fn file(&self) -> &'a SourceFile {
        self.file
    }

    pub fn settings(&self) -> &LintSettings {
        self.settings
    }

    /// Report a catalog message anchored at `range`.
    pub fn report(
        &mut self,
        lint: &'static LintDescriptor,
        range: TextRange,
        message_id: &'static str,
        data: &[(&str, &str)],
    ) -> LintResult<()> {
        self.report_with_suggestion(lint, range, message_id, data, None)
    }

    /// Report with an optional fix. Diagnostics for lints set to `allow` are dropped.
    pub fn report_with_suggestion(
        &mut self,
        lint: &'static LintDescriptor,
        range: TextRange,
        message_id: &'static str,
        data: &[(&str, &str)],
        suggestion: Option<Suggestion>,
    ) -> LintResult<()> {
        let level = self.settings.level_for(lint.name);
        if level == LintLevel::Allow {
            return Ok(());
        }

        let message = lint.render_message(message_id, data)?;
        let help = suggestion.as_ref().map(|s| s.message.clone());
        self.diagnostics.push(Diagnostic {
            lint,
            level,
            file: None,
            span: self.file.span(range),
            range,
            message_id,
            message,
            help,
            suggestion,
        });
        Ok(())
    }

    /// Diagnostics in source order.
    #[must_use]
    pub fn into_diagnostics(mut self) -> Vec<Diagnostic> {
        self.diagnostics.sort_by_key(|d| d.range.start);
        self.diagnostics
    }
}

// ============================================================================
// Lint Name Aliases
// ============================================================================

/// Alternative spellings accepted in config files and CLI arguments.
///
/// Format: (alias, canonical_name)
pub const LINT_ALIASES: &[(&str, &str)] = &[
    ("logical-expression-complexity", "logical_expression_complexity"),
    ("ordered-destructuring", "ordered_destructuring"),
    ("ordered-import-members", "ordered_import_members"),
    ("ordered-imports-by-path", "ordered_imports_by_path"),
    ("strict-camel-case", "strict_camel_case"),
];

/// Resolve a lint name to its canonical form; unknown names come back unchanged.
pub fn resolve_lint_alias(name: &str) -> &str {
    LINT_ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map_or(name, |(_, canonical)| canonical)
}

pub fn all_known_lints() -> HashSet<&'static str> {
    crate::rules::ALL_DESCRIPTORS.iter().map(|d| d.name).collect()
}

pub fn all_known_lints_with_aliases() -> HashSet<&'static str> {
    let mut known = all_known_lints();
    known.extend(LINT_ALIASES.iter().map(|(alias, _)| *alias));
    known
}

// ============================================================================
// Registry
// ============================================================================

pub struct LintRegistry {
    rules: Vec<Box<dyn LintRule>>,
}

impl Default for LintRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LintRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    #[must_use]
    pub fn with_rule(mut self, rule: impl LintRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn rules(&self) -> impl Iterator<Item = &dyn LintRule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &'static LintDescriptor> + '_ {
        self.rules.iter().map(|r| r.descriptor())
    }

    /// Every built-in rule with default options.
    #[must_use = "registry should be used to create an engine"]
    pub fn default_rules() -> Self {
        Self {
            rules: crate::rules::default_rules(),
        }
    }

    /// Built-in rules configured from `options`, then filtered.
    ///
    /// # Errors
    ///
    /// Returns an error if any name in `only`, `skip` or `disabled` is unknown,
    /// or if a rule rejects its options.
    pub fn default_rules_filtered(
        only: &[String],
        skip: &[String],
        disabled: &[String],
        options: &crate::config::RulesConfig,
    ) -> LintResult<Self> {
        let known = all_known_lints_with_aliases();
        if let Some(unknown) = only
            .iter()
            .chain(skip)
            .chain(disabled)
            .find(|n| !known.contains(n.as_str()))
        {
            return Err(LintError::UnknownLint(unknown.clone()));
        }

        let only_set: HashSet<&str> = only.iter().map(|s| resolve_lint_alias(s)).collect();
        let excluded: HashSet<&str> = skip
            .iter()
            .chain(disabled)
            .map(|s| resolve_lint_alias(s))
            .collect();

        let mut reg = Self::new();
        for rule in crate::rules::configured_rules(options)? {
            let descriptor = rule.descriptor();
            if !only_set.is_empty() && !only_set.contains(descriptor.name) {
                continue;
            }
            if excluded.contains(descriptor.name) {
                continue;
            }
            reg.rules.push(rule);
        }

        tracing::debug!(rules = reg.rules.len(), "registry built");
        Ok(reg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static CATALOG_LINT: LintDescriptor = LintDescriptor {
        name: "catalog",
        category: LintCategory::Style,
        description: "test",
        fix: FixDescriptor::none(),
        messages: &[("pair", "{{next}} should come before {{ current }}")],
    };

    #[test]
    fn renders_placeholders() {
        let msg = CATALOG_LINT
            .render_message("pair", &[("next", "a"), ("current", "b")])
            .unwrap();
        assert_eq!(msg, "a should come before b");
    }

    #[test]
    fn missing_data_keeps_the_placeholder() {
        assert_eq!(render_template("x {{gone}} y", &[]), "x {{gone}} y");
    }

    #[test]
    fn unknown_message_id_is_an_error() {
        assert!(CATALOG_LINT.render_message("nope", &[]).is_err());
    }

    #[test]
    fn kebab_case_names_resolve() {
        assert_eq!(resolve_lint_alias("strict-camel-case"), "strict_camel_case");
        assert_eq!(resolve_lint_alias("strict_camel_case"), "strict_camel_case");
        assert_eq!(resolve_lint_alias("no_such_lint"), "no_such_lint");
    }

    #[test]
    fn settings_resolve_aliases() {
        let settings = LintSettings::default()
            .with_config_levels(HashMap::from([(
                "ordered-imports-by-path".to_string(),
                LintLevel::Error,
            )]))
            .disable(["strict-camel-case".to_string()]);
        assert_eq!(settings.level_for("ordered_imports_by_path"), LintLevel::Error);
        assert_eq!(settings.level_for("strict_camel_case"), LintLevel::Allow);
        assert_eq!(settings.level_for("ordered_destructuring"), LintLevel::Warn);
    }

    #[test]
    fn selector_parent_is_optional() {
        let any = Selector::node(NodeTag::Identifier);
        let keyed = Selector::child_of(NodeTag::Identifier, NodeTag::Property);
        assert!(any.matches(NodeTag::Identifier, None));
        assert!(keyed.matches(NodeTag::Identifier, Some(NodeTag::Property)));
        assert!(!keyed.matches(NodeTag::Identifier, Some(NodeTag::MemberExpression)));
    }

    #[test]
    fn suggestions_become_help_lines() {
        let file = SourceFile::parse("let b = a;", &[]).unwrap();
        let settings = LintSettings::default();
        let mut ctx = LintContext::new(&file, &settings);
        let range = TextRange::new(4, 5);
        ctx.report(&CATALOG_LINT, range, "pair", &[("next", "a"), ("current", "b")])
            .unwrap();
        ctx.report_with_suggestion(
            &CATALOG_LINT,
            range,
            "pair",
            &[("next", "a"), ("current", "b")],
            Some(Suggestion::machine_applicable(
                "Rename to `c`",
                crate::fix::TextEdit::replace(range, "c"),
            )),
        )
        .unwrap();
        let help: Vec<Option<String>> = ctx.into_diagnostics().into_iter().map(|d| d.help).collect();
        assert_eq!(help, [None, Some("Rename to `c`".to_string())]);
    }

    #[test]
    fn default_registry_matches_the_filtered_one() {
        let plain: Vec<&str> = LintRegistry::default_rules().descriptors().map(|d| d.name).collect();
        let filtered = LintRegistry::default_rules_filtered(
            &[],
            &["strict_camel_case".to_string()],
            &[],
            &crate::config::RulesConfig::default(),
        )
        .unwrap();
        let filtered: Vec<&str> = filtered.descriptors().map(|d| d.name).collect();
        assert_eq!(plain.len(), filtered.len() + 1);
        assert!(plain.iter().filter(|n| **n != "strict_camel_case").eq(filtered.iter()));
    }

    #[test]
    fn unknown_lint_names_are_rejected() {
        let err = LintRegistry::default_rules_filtered(
            &["no_such_lint".to_string()],
            &[],
            &[],
            &crate::config::RulesConfig::default(),
        )
        .err()
        .expect("unknown lint should fail");
        assert!(matches!(err, LintError::UnknownLint(name) if name == "no_such_lint"));
    }
}
