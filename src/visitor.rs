//! Single-pass dispatch of AST nodes to rule visitors.
//!
//! Every visitor registers its selectors once per file; the table is keyed by
//! node tag so each node only consults the visitors that asked for its kind.

use crate::ast::NodeTag;
use crate::error::LintResult;
use crate::lint::{LintContext, RuleVisitor, Selector};
use std::collections::HashMap;

/// Visitors interested in one node tag, with the parent constraint each registered.
type Registrations = Vec<(usize, Option<NodeTag>)>;

pub struct DispatchTable {
    by_tag: HashMap<NodeTag, Registrations>,
}

impl DispatchTable {
    pub fn build(visitors: &[Box<dyn RuleVisitor + '_>]) -> Self {
        let mut by_tag: HashMap<NodeTag, Registrations> = HashMap::new();
        for (index, visitor) in visitors.iter().enumerate() {
            for Selector { tag, parent } in visitor.selectors() {
                let entry = by_tag.entry(tag).or_default();
                // A visitor registering the same tag with and without a parent
                // still sees each node once.
                if !entry.contains(&(index, parent)) {
                    entry.push((index, parent));
                }
            }
        }
        Self { by_tag }
    }

    /// Indices of visitors to call for a node, in registration order, without duplicates.
    fn targets(&self, tag: NodeTag, parent: Option<NodeTag>) -> Vec<usize> {
        let Some(regs) = self.by_tag.get(&tag) else {
            return Vec::new();
        };
        let mut out: Vec<usize> = Vec::new();
        for &(index, wanted) in regs {
            let selector = Selector { tag, parent: wanted };
            if selector.matches(tag, parent) && !out.contains(&index) {
                out.push(index);
            }
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.by_tag.is_empty()
    }
}

/// Walk the file's tree once in pre-order, handing each node to the visitors
/// that selected it.
///
/// # Errors
///
/// Stops at the first visitor error; diagnostics reported so far stay in `ctx`.
pub fn walk_tree(
    visitors: &mut [Box<dyn RuleVisitor + '_>],
    ctx: &mut LintContext<'_>,
) -> LintResult<()> {
    let table = DispatchTable::build(visitors);
    if table.is_empty() {
        return Ok(());
    }

    let ast = ctx.file().ast();
    for node in ast.preorder(ast.root()) {
        let targets = table.targets(ast.tag(node), ast.parent_tag(node));
        for index in targets {
            visitors[index].visit(node, ctx)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeId;
    use crate::lint::LintSettings;
    use crate::source::SourceFile;

    struct Recorder {
        selectors: Vec<Selector>,
        seen: Vec<NodeTag>,
    }

    impl RuleVisitor for Recorder {
        fn selectors(&self) -> Vec<Selector> {
            self.selectors.clone()
        }

        fn visit(&mut self, node: NodeId, ctx: &mut LintContext<'_>) -> LintResult<()> {
            self.seen.push(ctx.file().ast().tag(node));
            Ok(())
        }
    }

    fn run(src: &str, selectors: Vec<Selector>) -> Vec<NodeTag> {
        let file = SourceFile::parse(src, &[]).unwrap();
        let settings = LintSettings::default();
        let mut ctx = LintContext::new(&file, &settings);
        let mut recorder = Recorder {
            selectors,
            seen: Vec::new(),
        };
        {
            let mut visitors: Vec<Box<dyn RuleVisitor + '_>> = vec![Box::new(&mut recorder)];
            walk_tree(&mut visitors, &mut ctx).unwrap();
        }
        recorder.seen
    }

    impl RuleVisitor for &mut Recorder {
        fn selectors(&self) -> Vec<Selector> {
            (**self).selectors()
        }

        fn visit(&mut self, node: NodeId, ctx: &mut LintContext<'_>) -> LintResult<()> {
            (**self).visit(node, ctx)
        }
    }

    #[test]
    fn parent_constraint_filters_nodes() {
        let seen = run(
            "const o = { a: b }; o.c = d;",
            vec![Selector::child_of(NodeTag::Identifier, NodeTag::Property)],
        );
        assert_eq!(seen, vec![NodeTag::Identifier, NodeTag::Identifier]);
    }

    #[test]
    fn overlapping_selectors_visit_once() {
        let seen = run(
            "a && b;",
            vec![
                Selector::node(NodeTag::LogicalExpression),
                Selector::node(NodeTag::LogicalExpression),
            ],
        );
        assert_eq!(seen, vec![NodeTag::LogicalExpression]);
    }

    #[test]
    fn visits_in_preorder() {
        let seen = run(
            "a && (b || c);",
            vec![Selector::node(NodeTag::LogicalExpression)],
        );
        assert_eq!(seen.len(), 2);
    }
}
