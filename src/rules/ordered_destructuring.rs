use crate::ast::{NodeId, NodeKind, NodeTag};
use crate::diagnostics::Suggestion;
use crate::error::LintResult;
use crate::lint::{
    FixDescriptor, LintCategory, LintContext, LintDescriptor, LintRule, RuleVisitor,
    Selector,
};
use crate::source::SourceFile;
use serde::Deserialize;
use std::cmp::Ordering;

use super::ordering::{SortKey, comment_preserving_fix};
use super::util::{CompareOptions, string_compare};

// ============================================================================
// OrderedDestructuringLint
// ============================================================================

pub static ORDERED_DESTRUCTURING: LintDescriptor = LintDescriptor {
    name: "ordered_destructuring",
    category: LintCategory::Style,
    description: "Keys of object destructuring patterns should be sorted",
    fix: FixDescriptor::safe("Sort the destructured keys"),
    messages: &[(
        "sortPropsInObjectPattern",
        "{{next}} should come before {{current}}",
    )],
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrderedDestructuringOptions {
    pub ignore_case: bool,
    pub natural: bool,
}

#[derive(Default)]
pub struct OrderedDestructuringLint {
    compare: CompareOptions,
}

impl OrderedDestructuringLint {
    pub fn new(options: OrderedDestructuringOptions) -> Self {
        Self {
            compare: CompareOptions {
                ignore_case: options.ignore_case,
                natural: options.natural,
            },
        }
    }
}

impl LintRule for OrderedDestructuringLint {
    fn descriptor(&self) -> &'static LintDescriptor {
        &ORDERED_DESTRUCTURING
    }

    fn create<'r>(&'r self, _file: &SourceFile) -> Box<dyn RuleVisitor + 'r> {
        Box::new(DestructuringVisitor { rule: self })
    }
}

struct DestructuringVisitor<'r> {
    rule: &'r OrderedDestructuringLint,
}

impl RuleVisitor for DestructuringVisitor<'_> {
    fn selectors(&self) -> Vec<Selector> {
        vec![Selector::node(NodeTag::ObjectPattern)]
    }

    fn visit(&mut self, node: NodeId, ctx: &mut LintContext<'_>) -> LintResult<()> {
        let file = ctx.file();
        let ast = file.ast();
        let NodeKind::ObjectPattern { properties } = ast.kind(node) else {
            return Ok(());
        };
        let pattern_range = ast.range(node)?;

        // One fix per pattern: every pair report would rewrite the same text.
        let mut fix_offered = false;
        for pair in properties.windows(2) {
            let (Some(current), Some(next)) = (identifier_key(file, pair[0]), identifier_key(file, pair[1]))
            else {
                break;
            };
            if string_compare(current, next, self.rule.compare) != Ordering::Greater {
                continue;
            }

            let suggestion = if fix_offered {
                None
            } else {
                fix_offered = true;
                comment_preserving_fix(file, &sort_keys(file, properties)?, self.rule.compare)?
                    .map(|edit| Suggestion::machine_applicable("Sort destructured keys", edit))
            };
            tracing::debug!(current, next, "unsorted destructuring keys");
            ctx.report_with_suggestion(
                &ORDERED_DESTRUCTURING,
                pattern_range,
                "sortPropsInObjectPattern",
                &[("current", current), ("next", next)],
                suggestion,
            )?;
        }
        Ok(())
    }
}

/// Name of a `key: value` entry whose key is a plain identifier.
fn identifier_key(file: &SourceFile, property: NodeId) -> Option<&str> {
    let ast = file.ast();
    match ast.kind(property) {
        NodeKind::Property { key, .. } if ast.tag(*key) == NodeTag::Identifier => ast.name(*key),
        _ => None,
    }
}

/// Every entry except trailing rest elements, which stay where they are.
fn sort_keys(file: &SourceFile, properties: &[NodeId]) -> LintResult<Vec<SortKey>> {
    let ast = file.ast();
    let end = properties
        .iter()
        .rposition(|p| ast.tag(*p) != NodeTag::RestElement)
        .map_or(0, |i| i + 1);

    properties[..end]
        .iter()
        .map(|&property| {
            let range = ast.range(property)?;
            let name = match ast.kind(property) {
                NodeKind::Property { key, .. } => match ast.name(*key) {
                    Some(name) => name.to_string(),
                    None => file.node_text(*key)?.to_string(),
                },
                _ => file.slice(range).to_string(),
            };
            Ok(SortKey::new(range, name))
        })
        .collect()
}
