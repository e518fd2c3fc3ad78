use crate::ast::{NodeId, NodeKind, NodeTag};
use crate::error::{LintError, LintResult};
use crate::lint::{
    FixDescriptor, LintCategory, LintContext, LintDescriptor, LintRule, RuleVisitor,
    Selector,
};
use crate::source::SourceFile;
use itertools::Itertools;
use serde::Deserialize;
use std::collections::HashSet;

// ============================================================================
// LogicalExpressionComplexityLint
// ============================================================================

pub static LOGICAL_EXPRESSION_COMPLEXITY: LintDescriptor = LintDescriptor {
    name: "logical_expression_complexity",
    category: LintCategory::Complexity,
    description: "Logical expressions should stay below a nesting height and term count",
    fix: FixDescriptor::none(),
    messages: &[
        (
            "tooTall",
            "Expression height is {{height}}; max allowed is {{maxAllowed}}",
        ),
        (
            "tooManyTerms",
            "Expression has {{numTerms}} terms; max allowed is {{maxAllowed}}",
        ),
    ],
};

/// Comparison operators that may be counted as part of a logical expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum ComparisonOperator {
    #[serde(rename = "==")]
    Equal,
    #[serde(rename = "===")]
    StrictEqual,
    #[serde(rename = "!=")]
    NotEqual,
    #[serde(rename = "!==")]
    StrictNotEqual,
    #[serde(rename = "<")]
    Less,
    #[serde(rename = "<=")]
    LessEqual,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = ">=")]
    GreaterEqual,
}

impl ComparisonOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            ComparisonOperator::Equal => "==",
            ComparisonOperator::StrictEqual => "===",
            ComparisonOperator::NotEqual => "!=",
            ComparisonOperator::StrictNotEqual => "!==",
            ComparisonOperator::Less => "<",
            ComparisonOperator::LessEqual => "<=",
            ComparisonOperator::Greater => ">",
            ComparisonOperator::GreaterEqual => ">=",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogicalExpressionComplexityOptions {
    /// 0 disables the height check.
    pub max_height: u32,
    /// 0 disables the term check.
    pub max_terms: u32,
    pub binary_operators: Vec<ComparisonOperator>,
    pub include_ternary: bool,
}

impl Default for LogicalExpressionComplexityOptions {
    fn default() -> Self {
        Self {
            max_height: 2,
            max_terms: 4,
            binary_operators: Vec::new(),
            include_ternary: true,
        }
    }
}

#[derive(Default)]
pub struct LogicalExpressionComplexityLint {
    options: LogicalExpressionComplexityOptions,
}

impl LogicalExpressionComplexityLint {
    /// # Errors
    ///
    /// Fails when `binary_operators` lists an operator twice.
    pub fn new(options: LogicalExpressionComplexityOptions) -> LintResult<Self> {
        if let Some(op) = options.binary_operators.iter().duplicates().next() {
            return Err(LintError::invalid_option(
                LOGICAL_EXPRESSION_COMPLEXITY.name,
                format!("binary_operators lists `{}` more than once", op.as_str()),
            ));
        }
        Ok(Self { options })
    }

    fn counts_binary(&self, operator: &str) -> bool {
        self.options
            .binary_operators
            .iter()
            .any(|op| op.as_str() == operator)
    }

    /// Children of `node` when it takes part in the expression tree.
    fn operands(&self, kind: &NodeKind) -> Option<Vec<NodeId>> {
        match kind {
            NodeKind::LogicalExpression { left, right, .. } => Some(vec![*left, *right]),
            NodeKind::BinaryExpression {
                operator,
                left,
                right,
            } if self.counts_binary(operator) => Some(vec![*left, *right]),
            NodeKind::UnaryExpression { operator, argument } if operator == "!" => {
                Some(vec![*argument])
            }
            NodeKind::ConditionalExpression {
                test,
                consequent,
                alternate,
            } if self.options.include_ternary => Some(vec![*test, *consequent, *alternate]),
            _ => None,
        }
    }
}

impl LintRule for LogicalExpressionComplexityLint {
    fn descriptor(&self) -> &'static LintDescriptor {
        &LOGICAL_EXPRESSION_COMPLEXITY
    }

    fn create<'r>(&'r self, _file: &SourceFile) -> Box<dyn RuleVisitor + 'r> {
        Box::new(ComplexityVisitor {
            rule: self,
            height_seen: HashSet::new(),
            terms_seen: HashSet::new(),
        })
    }
}

struct ComplexityVisitor<'r> {
    rule: &'r LogicalExpressionComplexityLint,
    height_seen: HashSet<NodeId>,
    terms_seen: HashSet<NodeId>,
}

impl ComplexityVisitor<'_> {
    fn height(&mut self, file: &SourceFile, node: NodeId) -> i64 {
        let kind = file.ast().kind(node);
        if matches!(kind, NodeKind::PrivateIdentifier { .. }) {
            return -1;
        }
        self.height_seen.insert(node);
        match self.rule.operands(kind) {
            Some(children) => {
                children
                    .into_iter()
                    .map(|child| self.height(file, child))
                    .max()
                    .unwrap_or(-1)
                    + 1
            }
            None => 0,
        }
    }

    fn terms(&mut self, file: &SourceFile, node: NodeId) -> u64 {
        let kind = file.ast().kind(node);
        if matches!(kind, NodeKind::PrivateIdentifier { .. }) {
            return 0;
        }
        self.terms_seen.insert(node);
        match self.rule.operands(kind) {
            Some(children) => children
                .into_iter()
                .map(|child| self.terms(file, child))
                .sum(),
            None => 1,
        }
    }
}

impl RuleVisitor for ComplexityVisitor<'_> {
    fn selectors(&self) -> Vec<Selector> {
        let mut selectors = vec![
            Selector::node(NodeTag::BinaryExpression),
            Selector::node(NodeTag::LogicalExpression),
            Selector::node(NodeTag::UnaryExpression),
        ];
        if self.rule.options.include_ternary {
            selectors.push(Selector::node(NodeTag::ConditionalExpression));
        }
        selectors
    }

    fn visit(&mut self, node: NodeId, ctx: &mut LintContext<'_>) -> LintResult<()> {
        let file = ctx.file();
        if self.rule.operands(file.ast().kind(node)).is_none() {
            return Ok(());
        }
        let range = file.ast().range(node)?;
        let max_height = self.rule.options.max_height;
        let max_terms = self.rule.options.max_terms;

        if max_height > 0 && !self.height_seen.contains(&node) {
            let height = self.height(file, node);
            if height > i64::from(max_height) {
                tracing::debug!(height, %range, "expression too tall");
                ctx.report(
                    &LOGICAL_EXPRESSION_COMPLEXITY,
                    range,
                    "tooTall",
                    &[
                        ("height", height.to_string().as_str()),
                        ("maxAllowed", max_height.to_string().as_str()),
                    ],
                )?;
            }
        }
        if max_terms > 0 && !self.terms_seen.contains(&node) {
            let terms = self.terms(file, node);
            if terms > u64::from(max_terms) {
                tracing::debug!(terms, %range, "expression has too many terms");
                ctx.report(
                    &LOGICAL_EXPRESSION_COMPLEXITY,
                    range,
                    "tooManyTerms",
                    &[
                        ("numTerms", terms.to_string().as_str()),
                        ("maxAllowed", max_terms.to_string().as_str()),
                    ],
                )?;
            }
        }
        Ok(())
    }
}
