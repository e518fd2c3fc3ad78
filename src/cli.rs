use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// sequence-lint CLI options.
#[derive(Debug, Parser)]
#[command(
    name = "sequence-lint",
    version,
    about = "Lint JavaScript and TypeScript for naming, ordering and expression complexity",
    args_conflicts_with_subcommands = true,
    subcommand_precedence_over_arg = true
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub lint: LintArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Lint files or directories.
    Lint(LintArgs),

    /// List available lints.
    ListRules,

    /// Explain a lint.
    Explain {
        /// Lint rule name.
        rule: String,
    },
}

#[derive(Debug, Clone, ClapArgs)]
pub struct LintArgs {
    /// Files/directories to lint. Defaults to stdin when absent.
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,

    /// Only run these lints (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,

    /// Skip these lints (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Path to a sequence-lint.toml; otherwise discovered from the current directory.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Exit with code 1 if any diagnostics are emitted.
    #[arg(long)]
    pub deny_warnings: bool,

    /// Apply fixes in place.
    #[arg(long, conflicts_with = "fix_dry_run")]
    pub fix: bool,

    /// Print the diff fixes would produce without writing files.
    #[arg(long)]
    pub fix_dry_run: bool,

    /// Also apply fixes that may change behaviour (renames).
    #[arg(long)]
    pub unsafe_fixes: bool,

    /// Do not write a `.bak` copy before fixing a file.
    #[arg(long)]
    pub no_backup: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
    Github,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_paths_lint() {
        let args = Args::try_parse_from(["sequence-lint", "src", "--only", "a,b"]).unwrap();
        assert!(args.command.is_none());
        assert_eq!(args.lint.paths, [PathBuf::from("src")]);
        assert_eq!(args.lint.only, ["a", "b"]);
    }

    #[test]
    fn subcommands_parse() {
        let args = Args::try_parse_from(["sequence-lint", "explain", "strict_camel_case"]).unwrap();
        assert!(matches!(args.command, Some(Command::Explain { rule }) if rule == "strict_camel_case"));

        let args = Args::try_parse_from(["sequence-lint", "lint", "--format", "json", "a.ts"]).unwrap();
        let Some(Command::Lint(lint)) = args.command else {
            panic!("expected lint subcommand");
        };
        assert_eq!(lint.format, OutputFormat::Json);
    }

    #[test]
    fn there_is_no_preview_tier() {
        assert!(Args::try_parse_from(["sequence-lint", "--preview", "a.ts"]).is_err());
    }

    #[test]
    fn fix_modes_conflict() {
        assert!(Args::try_parse_from(["sequence-lint", "--fix", "--fix-dry-run", "a.ts"]).is_err());
    }
}
