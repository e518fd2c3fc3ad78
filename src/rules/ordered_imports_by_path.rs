use crate::ast::{ImportKind, NodeId, NodeKind, NodeTag, TextRange};
use crate::diagnostics::Suggestion;
use crate::error::{LintError, LintResult};
use crate::fix::TextEdit;
use crate::lint::{
    FixDescriptor, LintCategory, LintContext, LintDescriptor, LintRule, RuleVisitor,
    Selector,
};
use crate::source::SourceFile;
use itertools::Itertools;
use regex::Regex;
use serde::Deserialize;
use std::cmp::Ordering;
use std::collections::HashSet;

use super::ordering::adjacent_runs;
use super::util::{CompareOptions, string_compare};

// ============================================================================
// OrderedImportsByPathLint
// ============================================================================

pub static ORDERED_IMPORTS_BY_PATH: LintDescriptor = LintDescriptor {
    name: "ordered_imports_by_path",
    category: LintCategory::Style,
    description: "Import declarations should be sorted by module path, optionally in configured groups",
    fix: FixDescriptor::safe("Sort the import declarations"),
    messages: &[
        (
            "sortSideEffectsFirst",
            "Sort side-effects-only modules before others. `{{declarationA}}` should come before `{{declarationB}}`",
        ),
        (
            "sortImportsByPath",
            "Sort imports alphabetically by path. `{{declarationA}}` should come before `{{declarationB}}`",
        ),
        (
            "sortTypeImports",
            "Type imports should be sorted {{typeStyle}} value imports. `{{declarationA}}` should come before `{{declarationB}}`",
        ),
        (
            "wrongGroup",
            "{{declaration}} should be in group `{{correctGroupLabel}}` (#{{correctGroupIndex}}) but is in group `{{actualGroupLabel}}` (#{{actualGroupIndex}})",
        ),
    ],
};

/// Reserved group name for imports that match no pattern.
pub const THE_REST_GROUP: &str = "THE_REST";
/// Reserved group name for side-effect-only imports (`import "polyfill"`).
pub const SIDE_EFFECTS_GROUP: &str = "SIDE_EFFECTS";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrderedImportsByPathOptions {
    pub ignore_case: bool,
    pub natural: bool,
    /// Blank lines split imports into independently sorted runs.
    pub allow_separate_groups: bool,
    pub sort_side_effects_first: bool,
    /// Placement of `import type` next to a value import of the same path:
    /// `true` before, `false` after, unset either way.
    pub sort_type_imports_first: Option<bool>,
    /// Ordered path patterns; needs `THE_REST` and more than one entry to take effect.
    pub groups: Vec<String>,
}

impl Default for OrderedImportsByPathOptions {
    fn default() -> Self {
        Self {
            ignore_case: false,
            natural: false,
            allow_separate_groups: true,
            sort_side_effects_first: false,
            sort_type_imports_first: None,
            groups: Vec::new(),
        }
    }
}

#[derive(Debug)]
enum GroupSpec {
    SideEffects,
    TheRest,
    Pattern(Regex),
}

impl GroupSpec {
    fn label(&self) -> &str {
        match self {
            GroupSpec::SideEffects => SIDE_EFFECTS_GROUP,
            GroupSpec::TheRest => THE_REST_GROUP,
            GroupSpec::Pattern(re) => re.as_str(),
        }
    }

    fn matches(&self, path: &str) -> bool {
        matches!(self, GroupSpec::Pattern(re) if re.is_match(path))
    }
}

pub struct OrderedImportsByPathLint {
    compare: CompareOptions,
    allow_separate_groups: bool,
    side_effects_first: bool,
    type_imports_first: Option<bool>,
    /// Configured groups, deduplicated, always starting with the side-effects group.
    groups: Vec<GroupSpec>,
    using_groups: bool,
}

impl Default for OrderedImportsByPathLint {
    fn default() -> Self {
        Self {
            compare: CompareOptions::default(),
            allow_separate_groups: true,
            side_effects_first: false,
            type_imports_first: None,
            groups: vec![GroupSpec::SideEffects],
            using_groups: false,
        }
    }
}

impl OrderedImportsByPathLint {
    /// # Errors
    ///
    /// Fails when a group pattern is not a valid regular expression.
    pub fn new(options: OrderedImportsByPathOptions) -> LintResult<Self> {
        let has_the_rest = options.groups.iter().any(|g| g == THE_REST_GROUP);
        let mut using_groups =
            options.groups.len() > 1 && has_the_rest && options.allow_separate_groups;
        if !options.groups.is_empty() {
            if !options.allow_separate_groups {
                tracing::warn!("groups is set, but allow_separate_groups is false; ignoring groups");
            }
            if !has_the_rest {
                tracing::warn!("groups is set, but the THE_REST group is not present; ignoring groups");
                using_groups = false;
            }
        }
        if options.groups.iter().duplicates().next().is_some() {
            tracing::warn!("groups contains duplicate group names; ignoring the duplicates");
        }

        let groups = std::iter::once(SIDE_EFFECTS_GROUP)
            .chain(options.groups.iter().map(String::as_str))
            .unique()
            .map(|group| match group {
                SIDE_EFFECTS_GROUP => Ok(GroupSpec::SideEffects),
                THE_REST_GROUP => Ok(GroupSpec::TheRest),
                pattern => Regex::new(pattern).map(GroupSpec::Pattern).map_err(|e| {
                    LintError::invalid_option(
                        ORDERED_IMPORTS_BY_PATH.name,
                        format!("group `{pattern}` is not a valid pattern: {e}"),
                    )
                }),
            })
            .collect::<LintResult<Vec<_>>>()?;

        Ok(Self {
            compare: CompareOptions {
                ignore_case: options.ignore_case,
                natural: options.natural,
            },
            allow_separate_groups: options.allow_separate_groups,
            side_effects_first: options.sort_side_effects_first,
            type_imports_first: options.sort_type_imports_first,
            groups,
            using_groups,
        })
    }

    fn compare(&self, a: &ImportInfo, b: &ImportInfo) -> Ordering {
        if self.side_effects_first && a.side_effect != b.side_effect {
            return if a.side_effect {
                Ordering::Less
            } else {
                Ordering::Greater
            };
        }
        match string_compare(&a.path, &b.path, self.compare) {
            Ordering::Equal if a.kind != b.kind => {
                let type_first = match self.type_imports_first {
                    Some(true) => Ordering::Less,
                    Some(false) => Ordering::Greater,
                    None => return Ordering::Equal,
                };
                if a.kind == ImportKind::Type {
                    type_first
                } else {
                    type_first.reverse()
                }
            }
            other => other,
        }
    }

    /// Effective groups for one file: unused groups are dropped.
    fn effective_groups(&self, imports: &[ImportInfo]) -> Vec<&GroupSpec> {
        let patterns: Vec<&GroupSpec> = self
            .groups
            .iter()
            .filter(|g| matches!(g, GroupSpec::Pattern(_)))
            .collect();
        self.groups
            .iter()
            .filter(|group| match group {
                GroupSpec::TheRest => imports.iter().any(|import| {
                    !patterns.iter().any(|p| p.matches(&import.path))
                        && !(self.side_effects_first && import.side_effect)
                }),
                GroupSpec::SideEffects => {
                    self.side_effects_first && imports.iter().any(|import| import.side_effect)
                }
                GroupSpec::Pattern(_) => imports.iter().any(|import| group.matches(&import.path)),
            })
            .collect()
    }

    fn correct_group(&self, import: &ImportInfo, effective: &[&GroupSpec]) -> Option<usize> {
        if self.side_effects_first && import.side_effect {
            return effective
                .iter()
                .position(|g| matches!(g, GroupSpec::SideEffects));
        }
        effective
            .iter()
            .position(|g| g.matches(&import.path))
            .or_else(|| effective.iter().position(|g| matches!(g, GroupSpec::TheRest)))
    }
}

impl LintRule for OrderedImportsByPathLint {
    fn descriptor(&self) -> &'static LintDescriptor {
        &ORDERED_IMPORTS_BY_PATH
    }

    fn create<'r>(&'r self, _file: &SourceFile) -> Box<dyn RuleVisitor + 'r> {
        Box::new(ImportsByPathVisitor {
            rule: self,
            plan: None,
            previous: None,
            wrong_group_fixed: false,
            fixed_runs: HashSet::new(),
        })
    }
}

// ============================================================================
// Per-file plan
// ============================================================================

#[derive(Debug)]
struct ImportInfo {
    node: NodeId,
    range: TextRange,
    path: String,
    kind: ImportKind,
    side_effect: bool,
}

/// Top-level imports of a file and how they split into runs and groups.
struct ImportsPlan {
    imports: Vec<ImportInfo>,
    /// Other top-level statements; a fix never spans one of these.
    statements: Vec<TextRange>,
    runs: Vec<Vec<usize>>,
    run_of: Vec<usize>,
    /// `(correct group, effective group labels)` per import when groups are in use.
    grouping: Option<Grouping>,
}

struct Grouping {
    labels: Vec<String>,
    correct: Vec<usize>,
}

impl Grouping {
    fn any_misplaced(&self, run_of: &[usize]) -> bool {
        self.correct.iter().zip(run_of).any(|(c, a)| c != a)
    }
}

impl ImportsPlan {
    fn build(rule: &OrderedImportsByPathLint, file: &SourceFile) -> LintResult<Self> {
        let ast = file.ast();
        let NodeKind::Program { body } = ast.kind(ast.root()) else {
            crate::lint_bail!("tree root is not a program");
        };

        let mut imports = Vec::new();
        let mut statements = Vec::new();
        for &statement in body {
            let range = ast.range(statement)?;
            match ast.kind(statement) {
                NodeKind::ImportDeclaration {
                    specifiers,
                    source,
                    import_kind,
                } => imports.push(ImportInfo {
                    node: statement,
                    range,
                    path: source.clone(),
                    kind: *import_kind,
                    side_effect: specifiers.is_empty(),
                }),
                _ => statements.push(range),
            }
        }

        let ranges: Vec<TextRange> = imports.iter().map(|i| i.range).collect();
        let runs = adjacent_runs(file, &ranges);
        let mut run_of = vec![0; imports.len()];
        for (run_index, run) in runs.iter().enumerate() {
            for &i in run {
                run_of[i] = run_index;
            }
        }

        let grouping = if rule.using_groups {
            let effective = rule.effective_groups(&imports);
            let correct = imports
                .iter()
                .map(|import| {
                    rule.correct_group(import, &effective).ok_or_else(|| {
                        LintError::other(format!("no group accepts import `{}`", import.path))
                    })
                })
                .collect::<LintResult<Vec<_>>>()?;
            Some(Grouping {
                labels: effective.iter().map(|g| g.label().to_string()).collect(),
                correct,
            })
        } else {
            None
        };

        tracing::trace!(imports = imports.len(), runs = runs.len(), "import plan");
        Ok(Self {
            imports,
            statements,
            runs,
            run_of,
            grouping,
        })
    }

    /// End of an import's movable text: the declaration plus trailing comments,
    /// except for the last import whose comments may describe the code below.
    fn fragment_end(&self, file: &SourceFile, index: usize, last: usize) -> usize {
        let range = self.imports[index].range;
        if index == last {
            return range.end;
        }
        file.comments_after(range)
            .last()
            .map_or(range.end, |comment| comment.range.end)
    }

    fn fragment<'f>(&self, file: &'f SourceFile, index: usize, last: usize) -> &'f str {
        let start = self.imports[index].range.start;
        file.slice(TextRange::new(start, self.fragment_end(file, index, last)))
    }

    fn edit_range(&self, members: &[usize]) -> Option<TextRange> {
        let first = self.imports.get(*members.first()?)?;
        let last = self.imports.get(*members.last()?)?;
        let range = TextRange::new(first.range.start, last.range.end);
        if self.statements.iter().any(|s| range.contains(*s)) {
            tracing::debug!(%range, "imports are interleaved with other statements; not fixing");
            return None;
        }
        Some(range)
    }

    /// Sort one run of imports, keeping same-line separators.
    fn order_fix(
        &self,
        rule: &OrderedImportsByPathLint,
        file: &SourceFile,
        members: &[usize],
    ) -> Option<TextEdit> {
        let range = self.edit_range(members)?;
        let last = *members.last()?;
        let joiners: Vec<&str> = members
            .iter()
            .tuple_windows()
            .map(|(&left, &right)| {
                let gap = file.slice(TextRange::new(
                    self.fragment_end(file, left, last),
                    self.imports[right].range.start,
                ));
                if gap.contains('\n') { "\n" } else { gap }
            })
            .collect();

        let mut sorted = members.to_vec();
        sorted.sort_by(|&a, &b| rule.compare(&self.imports[a], &self.imports[b]));

        let mut replacement = String::new();
        for (slot, &i) in sorted.iter().enumerate() {
            replacement.push_str(self.fragment(file, i, last));
            if let Some(joiner) = joiners.get(slot) {
                replacement.push_str(joiner);
            }
        }
        Some(TextEdit::replace(range, replacement))
    }

    /// Move every import to its group, one blank line between groups.
    fn regroup_fix(&self, rule: &OrderedImportsByPathLint, file: &SourceFile) -> Option<TextEdit> {
        let grouping = self.grouping.as_ref()?;
        let all: Vec<usize> = (0..self.imports.len()).collect();
        let range = self.edit_range(&all)?;
        let last = *all.last()?;

        let mut buckets: Vec<Vec<usize>> = vec![Vec::new(); grouping.labels.len()];
        for (i, &group) in grouping.correct.iter().enumerate() {
            buckets[group].push(i);
        }
        let replacement = buckets
            .iter_mut()
            .filter(|bucket| !bucket.is_empty())
            .map(|bucket| {
                bucket.sort_by(|&a, &b| rule.compare(&self.imports[a], &self.imports[b]));
                bucket.iter().map(|&i| self.fragment(file, i, last)).join("\n")
            })
            .join("\n\n");
        Some(TextEdit::replace(range, replacement))
    }
}

// ============================================================================
// Visitor
// ============================================================================

struct ImportsByPathVisitor<'r> {
    rule: &'r OrderedImportsByPathLint,
    plan: Option<ImportsPlan>,
    previous: Option<usize>,
    wrong_group_fixed: bool,
    /// Runs whose order fix was already offered.
    fixed_runs: HashSet<usize>,
}

impl ImportsByPathVisitor<'_> {
    fn check_group(&mut self, index: usize, ctx: &mut LintContext<'_>) -> LintResult<()> {
        let file = ctx.file();
        let Some(plan) = self.plan.as_ref() else {
            return Ok(());
        };
        let Some(grouping) = plan.grouping.as_ref() else {
            return Ok(());
        };
        let correct = grouping.correct[index];
        let actual = plan.run_of[index];
        if correct == actual {
            return Ok(());
        }

        let suggestion = if self.wrong_group_fixed {
            None
        } else {
            self.wrong_group_fixed = true;
            plan.regroup_fix(self.rule, file)
                .map(|edit| Suggestion::machine_applicable("Move imports to their groups", edit))
        };
        let import = &plan.imports[index];
        let actual_label = grouping
            .labels
            .get(actual)
            .map_or("<out of bounds>", String::as_str);
        ctx.report_with_suggestion(
            &ORDERED_IMPORTS_BY_PATH,
            import.range,
            "wrongGroup",
            &[
                ("declaration", import.path.as_str()),
                ("correctGroupLabel", grouping.labels[correct].as_str()),
                ("correctGroupIndex", correct.to_string().as_str()),
                ("actualGroupLabel", actual_label),
                ("actualGroupIndex", actual.to_string().as_str()),
            ],
            suggestion,
        )
    }

    fn check_order(&mut self, index: usize, ctx: &mut LintContext<'_>) -> LintResult<()> {
        let file = ctx.file();
        let rule = self.rule;
        let Some(plan) = self.plan.as_ref() else {
            return Ok(());
        };
        if rule.allow_separate_groups
            && self
                .previous
                .is_some_and(|previous| plan.run_of[previous] != plan.run_of[index])
        {
            self.previous = None;
        }
        let Some(previous) = self.previous.replace(index) else {
            return Ok(());
        };

        let (prev, node) = (&plan.imports[previous], &plan.imports[index]);
        if rule.compare(prev, node) != Ordering::Greater {
            return Ok(());
        }

        let (message_id, declaration_a, declaration_b) =
            if prev.path == node.path && prev.kind != node.kind {
                ("sortTypeImports", file.slice(node.range), file.slice(prev.range))
            } else if rule.side_effects_first && prev.side_effect != node.side_effect {
                ("sortSideEffectsFirst", file.slice(node.range), file.slice(prev.range))
            } else {
                ("sortImportsByPath", node.path.as_str(), prev.path.as_str())
            };
        let type_style = if rule.type_imports_first == Some(true) {
            "before"
        } else {
            "after"
        };

        let misplaced = plan
            .grouping
            .as_ref()
            .is_some_and(|g| g.any_misplaced(&plan.run_of));
        let run_key = if rule.allow_separate_groups {
            plan.run_of[index]
        } else {
            usize::MAX
        };
        let suggestion = if misplaced || !self.fixed_runs.insert(run_key) {
            None
        } else {
            let members: Vec<usize> = if rule.allow_separate_groups {
                plan.runs[plan.run_of[index]].clone()
            } else {
                (0..plan.imports.len()).collect()
            };
            plan.order_fix(rule, file, &members)
                .map(|edit| Suggestion::machine_applicable("Sort imports by path", edit))
        };

        tracing::debug!(previous = %prev.path, current = %node.path, message_id, "unsorted import");
        ctx.report_with_suggestion(
            &ORDERED_IMPORTS_BY_PATH,
            node.range,
            message_id,
            &[
                ("declarationA", declaration_a),
                ("declarationB", declaration_b),
                ("typeStyle", type_style),
            ],
            suggestion,
        )
    }
}

impl RuleVisitor for ImportsByPathVisitor<'_> {
    fn selectors(&self) -> Vec<Selector> {
        vec![Selector::child_of(NodeTag::ImportDeclaration, NodeTag::Program)]
    }

    fn visit(&mut self, node: NodeId, ctx: &mut LintContext<'_>) -> LintResult<()> {
        if self.plan.is_none() {
            self.plan = Some(ImportsPlan::build(self.rule, ctx.file())?);
        }
        let Some(index) = self
            .plan
            .as_ref()
            .and_then(|plan| plan.imports.iter().position(|i| i.node == node))
        else {
            return Ok(());
        };

        self.check_group(index, ctx)?;
        self.check_order(index, ctx)
    }
}
