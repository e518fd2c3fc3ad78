//! Core sequence-lint engine and lint registry.
//!
//! Source is parsed with tree-sitter, lowered into a small arena AST and then
//! walked once, dispatching nodes to every enabled rule's visitor.

pub mod ast;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod fix;
pub mod fixer;
pub mod globals;
pub mod level;
pub mod lint;
pub mod parser;
pub mod rules;
pub mod scope;
pub mod source;
pub mod telemetry;
pub mod visitor;

use anyhow::{Context, Result};
use std::path::Path;

use crate::diagnostics::Diagnostic;
use crate::lint::{LintContext, LintRegistry, LintSettings, RuleVisitor};
use crate::parser::Dialect;
use crate::source::SourceFile;
use crate::visitor::walk_tree;

/// Engine orchestrates linting by parsing source and running registered rules.
pub struct LintEngine {
    registry: LintRegistry,
    settings: LintSettings,
    globals: Vec<String>,
}

impl LintEngine {
    /// Create a new engine with default lint settings.
    pub fn new(registry: LintRegistry) -> Self {
        Self::new_with_settings(registry, LintSettings::default())
    }

    /// Create a new engine with explicit lint settings (e.g. from config).
    pub fn new_with_settings(registry: LintRegistry, settings: LintSettings) -> Self {
        Self {
            registry,
            settings,
            globals: Vec::new(),
        }
    }

    /// Extra names that resolve like built-in globals.
    #[must_use]
    pub fn with_globals(mut self, globals: Vec<String>) -> Self {
        self.globals = globals;
        self
    }

    pub fn registry(&self) -> &LintRegistry {
        &self.registry
    }

    /// Lint a single in-memory TypeScript/JavaScript string and return diagnostics.
    pub fn lint_source(&self, source: &str) -> Result<Vec<Diagnostic>> {
        self.lint_source_as(source, Dialect::TypeScript)
    }

    /// Like [`LintEngine::lint_source`] with an explicit grammar.
    pub fn lint_source_as(&self, source: &str, dialect: Dialect) -> Result<Vec<Diagnostic>> {
        let file = SourceFile::parse_as(source, dialect, &self.globals)?;
        Ok(self.run_rules(&file)?)
    }

    /// Read and lint one file; diagnostics carry the path.
    pub fn lint_path(&self, path: &Path) -> Result<Vec<Diagnostic>> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mut diagnostics = self
            .lint_source_as(&source, Dialect::from_path(path))
            .with_context(|| format!("failed to lint {}", path.display()))?;
        let name = path.display().to_string();
        for diag in &mut diagnostics {
            diag.file = Some(name.clone());
        }
        Ok(diagnostics)
    }

    fn run_rules(&self, file: &SourceFile) -> error::LintResult<Vec<Diagnostic>> {
        crate::instrument_block!("lint", {
            let mut ctx = LintContext::new(file, &self.settings);
            let mut visitors: Vec<Box<dyn RuleVisitor + '_>> =
                self.registry.rules().map(|rule| rule.create(file)).collect();
            walk_tree(&mut visitors, &mut ctx)?;
            let diagnostics = ctx.into_diagnostics();
            tracing::debug!(count = diagnostics.len(), "file linted");
            Ok(diagnostics)
        })
    }
}

/// Construct a `LintEngine` with all built-in stable lints at default options.
///
/// # Errors
///
/// Fails only if a built-in rule rejects its default options.
pub fn create_default_engine() -> Result<LintEngine> {
    let registry = LintRegistry::default_rules_filtered(
        &[],
        &[],
        &[],
        &config::RulesConfig::default(),
    )?;
    Ok(LintEngine::new(registry))
}
