use sequence_lint::LintEngine;
use sequence_lint::config::{self, DEFAULT_CONFIG_FILE_NAME, RulesConfig, SequenceLintConfig};
use sequence_lint::error::LintError;
use sequence_lint::level::LintLevel;
use sequence_lint::lint::{LintRegistry, LintSettings};
use sequence_lint::rules::OrderedImportsByPathOptions;
use std::fs;
use tempfile::tempdir;

const CONFIG: &str = r#"
log_level = "info"
globals = ["legacyAPI"]

[lints]
disabled = ["ordered_destructuring"]
strict-camel-case = "error"

[rules.logical-expression-complexity]
max_height = 3
"#;

fn engine_from(cfg: SequenceLintConfig) -> LintEngine {
    let SequenceLintConfig {
        globals,
        lints,
        rules,
        ..
    } = cfg;
    let registry =
        LintRegistry::default_rules_filtered(&[], &[], &lints.disabled, &rules)
            .unwrap();
    let settings = LintSettings::default()
        .with_config_levels(lints.levels)
        .disable(lints.disabled);
    LintEngine::new_with_settings(registry, settings).with_globals(globals)
}

#[test]
fn config_is_discovered_from_nested_directories() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join(DEFAULT_CONFIG_FILE_NAME), CONFIG).unwrap();
    let nested = dir.path().join("src").join("app");
    fs::create_dir_all(&nested).unwrap();

    let found = config::find_config_file(&nested).unwrap();
    assert_eq!(found, dir.path().join(DEFAULT_CONFIG_FILE_NAME));

    let (path, cfg) = config::load_config(None, &nested).unwrap().unwrap();
    assert_eq!(path, found);
    assert_eq!(cfg.tracing_filter().as_deref(), Some("sequence_lint=info"));
}

#[test]
fn missing_config_is_not_an_error() {
    let dir = tempdir().unwrap();
    assert!(config::load_config(None, dir.path()).unwrap().is_none());
}

#[test]
fn explicit_path_must_exist() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    assert!(config::load_config(Some(&missing), dir.path()).is_err());
}

#[test]
fn levels_disables_and_rule_options_take_effect() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("custom.toml");
    fs::write(&path, CONFIG).unwrap();
    let cfg = config::load_config_file(&path).unwrap();
    let engine = engine_from(cfg);

    let src = "const { beta, alpha } = source;\nconst flag = !!!ready;\nlet aVAR = legacyAPI;";
    let diags = engine.lint_source(src).unwrap();

    assert!(diags.iter().all(|d| d.lint.name != "ordered_destructuring"));
    assert!(diags.iter().all(|d| d.lint.name != "logical_expression_complexity"));

    let camel: Vec<(&str, LintLevel)> = diags
        .iter()
        .filter(|d| d.lint.name == "strict_camel_case")
        .map(|d| (d.message.as_str(), d.level))
        .collect();
    assert_eq!(
        camel,
        [(
            r#"Identifier "aVAR" is not in strict camel case, should be "aVar"."#,
            LintLevel::Error
        )]
    );
}

#[test]
fn malformed_config_reports_the_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(DEFAULT_CONFIG_FILE_NAME);
    fs::write(&path, "[rules.ordered_imports_by_path]\nignore_case = \"yes\"\n").unwrap();
    let err = config::load_config_file(&path).unwrap_err();
    assert!(format!("{err:#}").contains("failed to parse config file"));
}

#[test]
fn invalid_group_pattern_fails_registry_construction() {
    let rules = RulesConfig {
        ordered_imports_by_path: OrderedImportsByPathOptions {
            groups: vec!["(".to_string(), "THE_REST".to_string()],
            ..Default::default()
        },
        ..Default::default()
    };
    let result = LintRegistry::default_rules_filtered(&[], &[], &[], &rules);
    assert!(matches!(result, Err(LintError::InvalidOption { .. })));
}

#[test]
fn unknown_lint_names_are_rejected() {
    let result = LintRegistry::default_rules_filtered(
        &["no_such_lint".to_string()],
        &[],
        &[],
        &RulesConfig::default(),
    );
    assert!(matches!(result, Err(LintError::UnknownLint(name)) if name == "no_such_lint"));
}

#[test]
fn only_accepts_kebab_names() {
    let registry = LintRegistry::default_rules_filtered(
        &["ordered-destructuring".to_string()],
        &[],
        &[],
        &RulesConfig::default(),
    )
    .unwrap();
    let names: Vec<&str> = registry.descriptors().map(|d| d.name).collect();
    assert_eq!(names, ["ordered_destructuring"]);
}
