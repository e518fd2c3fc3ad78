use clap::Parser;
use sequence_lint::LintEngine;
use sequence_lint::cli::{Args, Command, LintArgs, OutputFormat};
use sequence_lint::config::{self, SequenceLintConfig};
use sequence_lint::diagnostics::Diagnostic;
use sequence_lint::fixer;
use sequence_lint::level::LintLevel;
use sequence_lint::lint::{LintRegistry, LintSettings, resolve_lint_alias};
use sequence_lint::parser::Dialect;
use sequence_lint::rules::ALL_DESCRIPTORS;
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use walkdir::WalkDir;

/// Extensions linted when walking directories.
const SOURCE_EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "cts", "js", "jsx", "mjs", "cjs"];

/// Directory names never descended into.
const SKIPPED_DIRS: &[&str] = &["node_modules", ".git", "target", "dist", "build"];

/// Upper bound on lint+fix rounds per file.
const MAX_ITERATIONS: usize = 10;

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::from(2)
        }
    }
}

fn run() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    match args.command {
        Some(Command::ListRules) => {
            sequence_lint::telemetry::init_tracing(None);
            list_rules();
            Ok(ExitCode::SUCCESS)
        }
        Some(Command::Explain { rule }) => {
            sequence_lint::telemetry::init_tracing(None);
            explain_rule(&rule)?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Command::Lint(lint)) => lint_command(lint),
        None => lint_command(args.lint),
    }
}

fn list_rules() {
    let mut rules: Vec<_> = ALL_DESCRIPTORS.to_vec();
    rules.sort_by_key(|d| d.name);

    for d in rules {
        let fix_status = if d.fix.available {
            format!(" [fix: {}]", d.fix.safety.as_str())
        } else {
            String::new()
        };
        println!(
            "{}\t{}\t{}{}",
            d.name,
            d.category.as_str(),
            d.description,
            fix_status
        );
    }
}

fn explain_rule(rule: &str) -> anyhow::Result<()> {
    let canonical = resolve_lint_alias(rule);
    let Some(d) = ALL_DESCRIPTORS.iter().find(|d| d.name == canonical) else {
        anyhow::bail!("unknown lint: {rule}");
    };

    println!("name: {}", d.name);
    println!("category: {}", d.category.as_str());
    println!("description: {}", d.description);
    if d.fix.available {
        println!("fix: available ({})", d.fix.safety.as_str());
        if !d.fix.description.is_empty() {
            println!("fix description: {}", d.fix.description);
        }
    } else {
        println!("fix: not available");
    }
    println!("messages:");
    for (id, template) in d.messages {
        println!("  {id}: {template}");
    }
    Ok(())
}

/// Engine configured from the discovered (or explicit) config and the CLI filters.
fn build_engine(args: &LintArgs) -> anyhow::Result<LintEngine> {
    let start_dir = infer_start_dir(args)?;
    let loaded = config::load_config(args.config.as_deref(), &start_dir)?;
    let cfg = loaded.map(|(_path, cfg)| cfg).unwrap_or_default();

    sequence_lint::telemetry::init_tracing(cfg.tracing_filter().as_deref());
    let SequenceLintConfig {
        globals,
        lints,
        rules,
        ..
    } = cfg;

    let registry =
        LintRegistry::default_rules_filtered(&args.only, &args.skip, &lints.disabled, &rules)?;
    let settings = LintSettings::default()
        .with_config_levels(lints.levels)
        .disable(lints.disabled);
    Ok(LintEngine::new_with_settings(registry, settings).with_globals(globals))
}

fn lint_command(args: LintArgs) -> anyhow::Result<ExitCode> {
    if args.fix || args.fix_dry_run {
        return fix_command(&args);
    }

    let engine = build_engine(&args)?;
    let diagnostics = if args.paths.is_empty() {
        let mut source = String::new();
        std::io::stdin().read_to_string(&mut source)?;
        let mut diags = engine.lint_source(&source)?;
        for d in &mut diags {
            d.file = Some("stdin".to_string());
        }
        diags
    } else {
        let mut all = Vec::new();
        for path in collect_source_files(&args.paths)? {
            all.extend(engine.lint_path(&path)?);
        }
        all
    };

    let has_error = diagnostics.iter().any(|d| d.level == LintLevel::Error);
    match args.format {
        OutputFormat::Json => print_json(&diagnostics)?,
        OutputFormat::Pretty => print_pretty(&diagnostics),
        OutputFormat::Github => print_github(&diagnostics, args.deny_warnings),
    }

    if has_error || (args.deny_warnings && !diagnostics.is_empty()) {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

#[derive(Debug, Serialize)]
struct JsonDiagnostic {
    file: String,
    row: usize,
    column: usize,
    level: String,
    lint: String,
    message_id: String,
    message: String,
    fixable: bool,
}

fn display_file(diag: &Diagnostic) -> &str {
    diag.file.as_deref().unwrap_or("<unknown>")
}

fn print_json(diagnostics: &[Diagnostic]) -> anyhow::Result<()> {
    let mut out: Vec<JsonDiagnostic> = diagnostics
        .iter()
        .map(|d| JsonDiagnostic {
            file: display_file(d).to_string(),
            row: d.span.start.row,
            column: d.span.start.column,
            level: d.level.as_str().to_string(),
            lint: d.lint.name.to_string(),
            message_id: d.message_id.to_string(),
            message: d.message.clone(),
            fixable: d.suggestion.is_some(),
        })
        .collect();

    out.sort_by(|a, b| {
        (a.file.as_str(), a.row, a.column, a.lint.as_str())
            .cmp(&(b.file.as_str(), b.row, b.column, b.lint.as_str()))
    });

    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn print_pretty(diagnostics: &[Diagnostic]) {
    for diag in diagnostics {
        println!(
            "{}:{}:{}: {}: {}: {}",
            display_file(diag),
            diag.span.start.row,
            diag.span.start.column,
            diag.level.as_str(),
            diag.lint.name,
            diag.message
        );
        if let Some(help) = &diag.help {
            println!("  help: {help}");
        }
    }
    println!("{} diagnostic(s)", diagnostics.len());
}

fn print_github(diagnostics: &[Diagnostic], deny_warnings: bool) {
    for diag in diagnostics {
        let kind = if diag.level == LintLevel::Error
            || (deny_warnings && diag.level == LintLevel::Warn)
        {
            "error"
        } else {
            "warning"
        };
        println!(
            "::{} file={},line={},col={},title={}::{}",
            kind,
            github_escape(display_file(diag)),
            diag.span.start.row,
            diag.span.start.column,
            diag.lint.name,
            github_escape(&diag.message)
        );
    }
}

/// Handle --fix / --fix-dry-run: lint and apply fixes until nothing changes.
fn fix_command(args: &LintArgs) -> anyhow::Result<ExitCode> {
    if args.paths.is_empty() {
        anyhow::bail!("--fix requires file paths (stdin not supported)");
    }

    let engine = build_engine(args)?;
    let files = collect_source_files(&args.paths)?;
    let mut total_fixed = 0usize;
    let mut total_skipped = 0usize;
    let mut files_modified = 0usize;

    for path in &files {
        let original_source = std::fs::read_to_string(path)?;
        let dialect = Dialect::from_path(path);
        let mut current_source = original_source.clone();
        let mut file_fixes = 0usize;
        let mut iterations = 0usize;

        loop {
            iterations += 1;
            if iterations > MAX_ITERATIONS {
                tracing::warn!(path = %path.display(), "max fix iterations ({MAX_ITERATIONS}) reached");
                break;
            }

            let diagnostics = engine.lint_source_as(&current_source, dialect)?;
            let result = fixer::apply_fixes(&current_source, &diagnostics, args.unsafe_fixes)?;
            if result.fixes_applied == 0 {
                total_skipped += result.fixes_skipped;
                break;
            }

            file_fixes += result.fixes_applied;
            current_source = result.fixed_source;
        }

        if file_fixes == 0 {
            continue;
        }
        if args.fix_dry_run {
            let diff = fixer::format_diff(&original_source, &current_source, path);
            if !diff.is_empty() {
                println!("{diff}");
            }
        } else {
            if !args.no_backup {
                std::fs::write(backup_path(path), &original_source)?;
            }
            std::fs::write(path, &current_source)?;
            files_modified += 1;
        }
        total_fixed += file_fixes;
    }

    if args.fix_dry_run {
        println!(
            "\n{} fix(es) would be applied to {} file(s)",
            total_fixed,
            files.len()
        );
    } else {
        println!("Applied {total_fixed} fix(es) to {files_modified} file(s)");
    }
    if total_skipped > 0 {
        println!("{total_skipped} fix(es) skipped (use --unsafe-fixes to apply renames)");
    }

    Ok(ExitCode::SUCCESS)
}

fn backup_path(path: &Path) -> PathBuf {
    path.with_extension(format!(
        "{}.bak",
        path.extension().unwrap_or_default().to_string_lossy()
    ))
}

fn github_escape(s: &str) -> String {
    s.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn collect_source_files(paths: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for path in paths {
        if path.is_dir() {
            let walker = WalkDir::new(path)
                .into_iter()
                .filter_entry(|e| !(e.file_type().is_dir() && e.depth() > 0 && should_skip_dir(e.path())));
            for entry in walker {
                let entry = entry?;
                if entry.file_type().is_file() && has_source_extension(entry.path()) {
                    out.push(entry.into_path());
                }
            }
        } else {
            std::fs::metadata(path)
                .map_err(|e| anyhow::anyhow!("cannot read {}: {e}", path.display()))?;
            out.push(path.clone());
        }
    }

    out.sort();
    out.dedup();
    Ok(out)
}

fn has_source_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

fn should_skip_dir(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .is_some_and(|name| SKIPPED_DIRS.contains(&name))
}

fn infer_start_dir(args: &LintArgs) -> anyhow::Result<PathBuf> {
    let base = match args.paths.first() {
        Some(p) => p.clone(),
        None => std::env::current_dir()?,
    };

    let base = if base.is_file() {
        base.parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    } else {
        base
    };

    Ok(base)
}
