mod util;

pub mod casing;
pub mod ordering;

pub mod logical_expression_complexity;
pub mod ordered_destructuring;
pub mod ordered_import_members;
pub mod ordered_imports_by_path;
pub mod strict_camel_case;

use crate::config::RulesConfig;
use crate::error::LintResult;
use crate::lint::{LintDescriptor, LintRule};

pub use util::CompareOptions;

// Naming lints
pub use strict_camel_case::{STRICT_CAMEL_CASE, StrictCamelCaseLint, StrictCamelCaseOptions};

// Ordering lints
pub use ordered_destructuring::{
    ORDERED_DESTRUCTURING, OrderedDestructuringLint, OrderedDestructuringOptions,
};
pub use ordered_import_members::{
    ORDERED_IMPORT_MEMBERS, OrderedImportMembersLint, OrderedImportMembersOptions,
};
pub use ordered_imports_by_path::{
    ORDERED_IMPORTS_BY_PATH, OrderedImportsByPathLint, OrderedImportsByPathOptions,
};

// Complexity lints
pub use logical_expression_complexity::{
    LOGICAL_EXPRESSION_COMPLEXITY, LogicalExpressionComplexityLint,
    LogicalExpressionComplexityOptions,
};

/// Every built-in lint, in `list-rules` order.
pub static ALL_DESCRIPTORS: &[&LintDescriptor] = &[
    &LOGICAL_EXPRESSION_COMPLEXITY,
    &ORDERED_DESTRUCTURING,
    &ORDERED_IMPORT_MEMBERS,
    &ORDERED_IMPORTS_BY_PATH,
    &STRICT_CAMEL_CASE,
];

/// Built-in rules with their default options.
pub fn default_rules() -> Vec<Box<dyn LintRule>> {
    vec![
        Box::new(LogicalExpressionComplexityLint::default()),
        Box::new(OrderedDestructuringLint::default()),
        Box::new(OrderedImportMembersLint::default()),
        Box::new(OrderedImportsByPathLint::default()),
        Box::new(StrictCamelCaseLint::default()),
    ]
}

/// Built-in rules built from the `[rules.*]` config tables.
///
/// # Errors
///
/// Returns the first rule that rejects its options.
pub fn configured_rules(config: &RulesConfig) -> LintResult<Vec<Box<dyn LintRule>>> {
    Ok(vec![
        Box::new(LogicalExpressionComplexityLint::new(
            config.logical_expression_complexity.clone(),
        )?),
        Box::new(OrderedDestructuringLint::new(config.ordered_destructuring)),
        Box::new(OrderedImportMembersLint::new(config.ordered_import_members)),
        Box::new(OrderedImportsByPathLint::new(
            config.ordered_imports_by_path.clone(),
        )?),
        Box::new(StrictCamelCaseLint::new(config.strict_camel_case.clone())?),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptors_match_default_rules() {
        let names: Vec<&str> = default_rules().iter().map(|r| r.descriptor().name).collect();
        let listed: Vec<&str> = ALL_DESCRIPTORS.iter().map(|d| d.name).collect();
        assert_eq!(names, listed);
    }

    #[test]
    fn every_message_template_is_unique_per_rule() {
        for descriptor in ALL_DESCRIPTORS {
            let mut ids: Vec<&str> = descriptor.messages.iter().map(|(id, _)| *id).collect();
            ids.sort_unstable();
            ids.dedup();
            assert_eq!(ids.len(), descriptor.messages.len(), "{}", descriptor.name);
        }
    }
}
