use crate::ast::{NodeId, NodeKind, NodeTag};
use crate::diagnostics::Suggestion;
use crate::error::LintResult;
use crate::lint::{
    FixDescriptor, LintCategory, LintContext, LintDescriptor, LintRule, RuleVisitor,
    Selector,
};
use crate::source::SourceFile;
use serde::Deserialize;

use super::ordering::{SortKey, comment_preserving_fix, positional_fix};
use super::util::CompareOptions;
use super::util::string_compare;

// ============================================================================
// OrderedImportMembersLint
// ============================================================================

pub static ORDERED_IMPORT_MEMBERS: LintDescriptor = LintDescriptor {
    name: "ordered_import_members",
    category: LintCategory::Style,
    description: "Named imports inside braces should be sorted by local name",
    fix: FixDescriptor::safe("Sort the imported members"),
    messages: &[(
        "sortMembersAlphabetically",
        r#"Sort import members alphabetically. "{{specifierA}}" should come before "{{specifierB}}"."#,
    )],
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrderedImportMembersOptions {
    pub ignore_case: bool,
    pub natural: bool,
    /// Also fix lists with comments around members; comments move with the member before them.
    pub sort_specifiers_with_comments: bool,
}

#[derive(Default)]
pub struct OrderedImportMembersLint {
    compare: CompareOptions,
    sort_with_comments: bool,
}

impl OrderedImportMembersLint {
    pub fn new(options: OrderedImportMembersOptions) -> Self {
        Self {
            compare: CompareOptions {
                ignore_case: options.ignore_case,
                natural: options.natural,
            },
            sort_with_comments: options.sort_specifiers_with_comments,
        }
    }
}

impl LintRule for OrderedImportMembersLint {
    fn descriptor(&self) -> &'static LintDescriptor {
        &ORDERED_IMPORT_MEMBERS
    }

    fn create<'r>(&'r self, _file: &SourceFile) -> Box<dyn RuleVisitor + 'r> {
        Box::new(ImportMembersVisitor { rule: self })
    }
}

struct ImportMembersVisitor<'r> {
    rule: &'r OrderedImportMembersLint,
}

impl RuleVisitor for ImportMembersVisitor<'_> {
    fn selectors(&self) -> Vec<Selector> {
        vec![Selector::node(NodeTag::ImportDeclaration)]
    }

    fn visit(&mut self, node: NodeId, ctx: &mut LintContext<'_>) -> LintResult<()> {
        let file = ctx.file();
        let ast = file.ast();
        let NodeKind::ImportDeclaration { specifiers, .. } = ast.kind(node) else {
            return Ok(());
        };

        let mut members: Vec<(NodeId, &str)> = Vec::new();
        for &specifier in specifiers {
            if let NodeKind::ImportSpecifier { local, .. } = ast.kind(specifier) {
                if let Some(name) = ast.name(*local) {
                    members.push((specifier, name));
                }
            }
        }

        // The last out-of-order pair is the one reported.
        let Some(pair) = members
            .windows(2)
            .rev()
            .find(|w| string_compare(w[0].1, w[1].1, self.rule.compare).is_gt())
        else {
            return Ok(());
        };
        let ((_, before), (unsorted, unsorted_name)) = (pair[0], pair[1]);

        let keys = members
            .iter()
            .map(|&(id, name)| Ok(SortKey::new(ast.range(id)?, name)))
            .collect::<LintResult<Vec<_>>>()?;
        let edit = if has_comments(file, &keys) {
            if self.rule.sort_with_comments {
                comment_preserving_fix(file, &keys, self.rule.compare)?
            } else {
                tracing::debug!("import members have comments; not fixing");
                None
            }
        } else {
            positional_fix(file, &keys, self.rule.compare)
        };

        ctx.report_with_suggestion(
            &ORDERED_IMPORT_MEMBERS,
            ast.range(unsorted)?,
            "sortMembersAlphabetically",
            &[("specifierA", unsorted_name), ("specifierB", before)],
            edit.map(|edit| Suggestion::machine_applicable("Sort import members", edit)),
        )
    }
}

fn has_comments(file: &SourceFile, keys: &[SortKey]) -> bool {
    keys.iter().any(|key| {
        !file.comments_before(key.range).is_empty() || !file.comments_after(key.range).is_empty()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostic;
    use crate::fix::apply_edit;
    use crate::lint::LintSettings;
    use crate::visitor::walk_tree;

    fn run(src: &str, options: OrderedImportMembersOptions) -> Vec<Diagnostic> {
        let file = SourceFile::parse(src, &[]).unwrap();
        let settings = LintSettings::default();
        let rule = OrderedImportMembersLint::new(options);
        let mut ctx = LintContext::new(&file, &settings);
        let mut visitors = vec![rule.create(&file)];
        walk_tree(&mut visitors, &mut ctx).unwrap();
        ctx.into_diagnostics()
    }

    fn fixed(src: &str, options: OrderedImportMembersOptions) -> Option<String> {
        let diags = run(src, options);
        let suggestion = diags.first()?.suggestion.as_ref()?;
        Some(apply_edit(src, &suggestion.edit).unwrap())
    }

    #[test]
    fn sorted_members_pass() {
        assert!(run("import { a, b, c } from 'x';", Default::default()).is_empty());
        assert!(run("import D, { a } from 'x';", Default::default()).is_empty());
    }

    #[test]
    fn reports_the_last_unsorted_member() {
        let diags = run("import { c, a, b, Z } from 'x';", Default::default());
        assert_eq!(diags.len(), 1);
        assert_eq!(
            diags[0].message,
            r#"Sort import members alphabetically. "Z" should come before "b"."#
        );
    }

    #[test]
    fn renamed_members_sort_by_local_name() {
        let src = "import { z as a, b } from 'x';";
        assert!(run(src, Default::default()).is_empty());
        assert_eq!(
            fixed("import { a as z, b } from 'x';", Default::default()).as_deref(),
            Some("import { b, a as z } from 'x';")
        );
    }

    #[test]
    fn simple_fix_keeps_separators() {
        assert_eq!(
            fixed("import D, {\n  b,\n  a,\n} from 'x';", Default::default()).as_deref(),
            Some("import D, {\n  a,\n  b,\n} from 'x';")
        );
    }

    #[test]
    fn comments_block_the_fix_unless_enabled() {
        let src = "import {\n  b, // bee\n  a // ay\n} from 'x';";
        let diags = run(src, Default::default());
        assert_eq!(diags.len(), 1);
        assert!(diags[0].suggestion.is_none());

        let with_comments = OrderedImportMembersOptions {
            sort_specifiers_with_comments: true,
            ..Default::default()
        };
        assert_eq!(
            fixed(src, with_comments).as_deref(),
            Some("import {\n  a, // ay\nb, // bee\n  } from 'x';")
        );
    }

    #[test]
    fn ignore_case_option() {
        let src = "import { b, C } from 'x';";
        assert_eq!(run(src, Default::default()).len(), 1);
        let folded = OrderedImportMembersOptions {
            ignore_case: true,
            ..Default::default()
        };
        assert!(run(src, folded).is_empty());
    }
}
