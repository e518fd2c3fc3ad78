use crate::ast::{NodeId, NodeKind, NodeTag, VariableKind};
use crate::diagnostics::Suggestion;
use crate::error::{LintError, LintResult};
use crate::fix::TextEdit;
use crate::lint::{
    FixDescriptor, LintCategory, LintContext, LintDescriptor, LintRule, RuleVisitor,
    Selector,
};
use crate::source::SourceFile;
use serde::Deserialize;
use std::collections::HashSet;
use tracing::Level;

use super::casing::{CasingValidator, OneCharWords, Verdict};

// ============================================================================
// StrictCamelCaseLint
// ============================================================================

pub static STRICT_CAMEL_CASE: LintDescriptor = LintDescriptor {
    name: "strict_camel_case",
    category: LintCategory::Naming,
    description: "Identifiers must be camel case with acronyms written as words (`xmlHttp`, not `XMLHttp`)",
    fix: FixDescriptor::unsafe_fix("Rename this occurrence to the suggested name"),
    messages: &[
        (
            "notCamelCaseWithSuggestion",
            r#"Identifier "{{name}}" is not in strict camel case, should be "{{suggestion}}".{{debug}}"#,
        ),
        (
            "notCamelCasePrivateWithSuggestion",
            r##""Private member #{{name}}" is not in strict camel case, should be "#{{suggestion}}".{{debug}}"##,
        ),
        (
            "notCamelCaseNoSuggestion",
            r#"Identifier "{{name}}" is not in strict camel case, no suggestion possible for 1-char words.{{debug}}"#,
        ),
        (
            "notCamelCasePrivateNoSuggestion",
            r#""Private member #{{name}}" is not in strict camel case, no suggestion possible for 1-char words.{{debug}}"#,
        ),
    ],
};

/// Positions where an all-caps single word (`HTML`, `VERSION`) may be allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SingleWordPosition {
    EnumMember,
    FirstClassConstant,
    ObjectField,
    StaticClassField,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StrictCamelCaseOptions {
    pub ignore_properties: bool,
    pub ignore_imports: bool,
    pub ignored_identifiers: Vec<String>,
    pub allow_one_char_words: OneCharWords,
    pub ignore_single_words: bool,
    pub ignore_single_words_in: Vec<SingleWordPosition>,
}

#[derive(Default)]
pub struct StrictCamelCaseLint {
    options: StrictCamelCaseOptions,
    validator: CasingValidator,
}

impl StrictCamelCaseLint {
    /// # Errors
    ///
    /// Rejects duplicate entries in `ignored_identifiers` or `ignore_single_words_in`.
    pub fn new(options: StrictCamelCaseOptions) -> LintResult<Self> {
        if let Some(dup) = first_duplicate(&options.ignored_identifiers) {
            return Err(LintError::invalid_option(
                STRICT_CAMEL_CASE.name,
                format!("`ignored_identifiers` lists `{dup}` twice"),
            ));
        }
        if let Some(dup) = first_duplicate(&options.ignore_single_words_in) {
            return Err(LintError::invalid_option(
                STRICT_CAMEL_CASE.name,
                format!("`ignore_single_words_in` lists `{dup:?}` twice"),
            ));
        }

        let validator = CasingValidator::new(
            options.ignored_identifiers.iter().cloned(),
            options.allow_one_char_words,
            options.ignore_single_words,
        );
        Ok(Self { options, validator })
    }

    fn exempt(&self, position: SingleWordPosition) -> bool {
        self.options.ignore_single_words_in.contains(&position)
    }
}

fn first_duplicate<T: Eq + std::hash::Hash>(items: &[T]) -> Option<&T> {
    let mut seen = HashSet::new();
    items.iter().find(|item| !seen.insert(*item))
}

impl LintRule for StrictCamelCaseLint {
    fn descriptor(&self) -> &'static LintDescriptor {
        &STRICT_CAMEL_CASE
    }

    fn create<'r>(&'r self, _file: &SourceFile) -> Box<dyn RuleVisitor + 'r> {
        Box::new(CamelCaseVisitor {
            rule: self,
            reported: HashSet::new(),
        })
    }
}

/// Parents whose `Identifier`/`PrivateIdentifier` children may name a property,
/// an export or a label.
const NAMING_PARENTS: &[NodeTag] = &[
    NodeTag::Property,
    NodeTag::MethodDefinition,
    NodeTag::PropertyDefinition,
    NodeTag::MemberExpression,
    NodeTag::TsPropertySignature,
    NodeTag::TsMethodSignature,
    NodeTag::TsEnumMember,
    NodeTag::ExportAllDeclaration,
    NodeTag::ExportSpecifier,
    NodeTag::LabeledStatement,
    NodeTag::BreakStatement,
    NodeTag::ContinueStatement,
];

/// How a name in a non-declaring position is checked.
enum NameSite {
    /// Property-like names, skipped under `ignore_properties`.
    Member { exempt: bool },
    /// Export names and labels; never exempt.
    Export,
}

struct CamelCaseVisitor<'r> {
    rule: &'r StrictCamelCaseLint,
    /// Start offsets already reported in this file.
    reported: HashSet<usize>,
}

impl RuleVisitor for CamelCaseVisitor<'_> {
    fn selectors(&self) -> Vec<Selector> {
        let mut selectors = vec![
            Selector::node(NodeTag::Program),
            Selector::node(NodeTag::Function),
            Selector::node(NodeTag::CatchClause),
            Selector::node(NodeTag::Class),
            Selector::node(NodeTag::TsInterfaceDeclaration),
            Selector::node(NodeTag::TsEnumDeclaration),
            Selector::node(NodeTag::TsTypeAliasDeclaration),
            Selector::node(NodeTag::VariableDeclaration),
            Selector::node(NodeTag::ImportDeclaration),
        ];
        for parent in NAMING_PARENTS {
            selectors.push(Selector::child_of(NodeTag::Identifier, *parent));
            selectors.push(Selector::child_of(NodeTag::PrivateIdentifier, *parent));
        }
        selectors
    }

    fn visit(&mut self, node: NodeId, ctx: &mut LintContext<'_>) -> LintResult<()> {
        let ast = ctx.file().ast();
        match ast.kind(node) {
            NodeKind::Program { .. } => self.check_globals(ctx),
            NodeKind::VariableDeclaration { kind, .. } => {
                let exempt = *kind == VariableKind::Const
                    && self.rule.exempt(SingleWordPosition::FirstClassConstant);
                self.check_declarations(node, exempt, ctx)
            }
            NodeKind::Function { .. }
            | NodeKind::CatchClause { .. }
            | NodeKind::Class { .. }
            | NodeKind::TsInterfaceDeclaration { .. }
            | NodeKind::TsEnumDeclaration { .. }
            | NodeKind::TsTypeAliasDeclaration { .. } => {
                self.check_declarations(node, false, ctx)
            }
            NodeKind::ImportDeclaration { specifiers, .. } => {
                if self.rule.options.ignore_imports {
                    return Ok(());
                }
                for specifier in specifiers {
                    self.check_import(*specifier, ctx)?;
                }
                Ok(())
            }
            NodeKind::Identifier { .. } | NodeKind::PrivateIdentifier { .. } => {
                self.check_name_site(node, ctx)
            }
            _ => Ok(()),
        }
    }
}

impl CamelCaseVisitor<'_> {
    /// References that resolve to nothing in this file.
    fn check_globals(&mut self, ctx: &mut LintContext<'_>) -> LintResult<()> {
        let file = ctx.file();
        for reference in file.scopes().through() {
            let Some(name) = file.ast().name(reference.identifier) else {
                continue;
            };
            if let Verdict::Invalid { suggestion } = self.rule.validator.check(name, false) {
                self.report(reference.identifier, suggestion.as_deref(), "global reference", ctx)?;
            }
        }
        Ok(())
    }

    /// Every name a declaring node introduces, plus each later use of it.
    fn check_declarations(
        &mut self,
        node: NodeId,
        exempt: bool,
        ctx: &mut LintContext<'_>,
    ) -> LintResult<()> {
        let file = ctx.file();
        for variable in file.scopes().declared_variables(node) {
            let Verdict::Invalid { suggestion } = self.rule.validator.check(&variable.name, exempt)
            else {
                tracing::trace!(name = %variable.name, "declaration passes");
                continue;
            };
            let Some(&identifier) = variable.identifiers.first() else {
                continue;
            };
            self.report(identifier, suggestion.as_deref(), "declaration", ctx)?;
            for reference in variable.references.iter().filter(|r| !r.init) {
                self.report(reference.identifier, suggestion.as_deref(), "declaration reference", ctx)?;
            }
        }
        Ok(())
    }

    /// Import bindings. A named import that keeps the exporter's name is not
    /// ours to rename, so neither it nor its uses are reported.
    fn check_import(&mut self, specifier: NodeId, ctx: &mut LintContext<'_>) -> LintResult<()> {
        let file = ctx.file();
        let ast = file.ast();
        for variable in file.scopes().declared_variables(specifier) {
            let Verdict::Invalid { suggestion } = self.rule.validator.check(&variable.name, false)
            else {
                continue;
            };
            let Some(&identifier) = variable.identifiers.first() else {
                continue;
            };

            if let NodeKind::ImportSpecifier { imported, .. } = ast.kind(specifier) {
                if ast.name(*imported) == Some(variable.name.as_str()) {
                    tracing::debug!(name = %variable.name, "skipping unrenamed named import");
                    continue;
                }
            }

            self.report(identifier, suggestion.as_deref(), "import", ctx)?;
            for reference in &variable.references {
                self.report(reference.identifier, suggestion.as_deref(), "import reference", ctx)?;
            }
        }
        Ok(())
    }

    fn check_name_site(&mut self, node: NodeId, ctx: &mut LintContext<'_>) -> LintResult<()> {
        let ast = ctx.file().ast();
        let Some(site) = self.classify(node, ctx.file()) else {
            return Ok(());
        };
        let Some(name) = ast.name(node) else {
            return Ok(());
        };

        let (exempt, context) = match site {
            NameSite::Member { .. } if self.rule.options.ignore_properties => {
                tracing::trace!(name, "ignoring property name");
                return Ok(());
            }
            NameSite::Member { exempt } => (exempt, "member name"),
            NameSite::Export => (false, "export or label"),
        };

        if let Verdict::Invalid { suggestion } = self.rule.validator.check(name, exempt) {
            self.report(node, suggestion.as_deref(), context, ctx)?;
        }
        Ok(())
    }

    fn classify(&self, node: NodeId, file: &SourceFile) -> Option<NameSite> {
        let ast = file.ast();
        let parent = ast.parent(node)?;
        let private = ast.tag(node) == NodeTag::PrivateIdentifier;

        let site = match ast.kind(parent) {
            NodeKind::Property {
                key,
                computed: false,
                ..
            } if *key == node && ast.parent_tag(parent) == Some(NodeTag::ObjectExpression) => {
                NameSite::Member {
                    exempt: self.rule.exempt(SingleWordPosition::ObjectField),
                }
            }
            NodeKind::MethodDefinition {
                key,
                computed: false,
                ..
            } if *key == node => NameSite::Member { exempt: false },
            NodeKind::PropertyDefinition {
                key,
                is_static,
                computed: false,
                ..
            } if *key == node => NameSite::Member {
                exempt: !private
                    && *is_static
                    && self.rule.exempt(SingleWordPosition::StaticClassField),
            },
            // Only names being assigned; reading `Status.GOOD` is not a declaration.
            NodeKind::MemberExpression {
                property,
                computed: false,
                ..
            } if *property == node && is_assignment_target(file, parent) => NameSite::Member {
                exempt: !private && self.rule.exempt(SingleWordPosition::ObjectField),
            },
            NodeKind::TsPropertySignature {
                key,
                computed: false,
            } if *key == node && is_named_type_member(file, parent) => {
                NameSite::Member { exempt: false }
            }
            NodeKind::TsMethodSignature {
                key,
                computed: false,
            } if *key == node
                && ast.parent_tag(parent) == Some(NodeTag::TsInterfaceDeclaration) =>
            {
                NameSite::Member { exempt: false }
            }
            NodeKind::TsEnumMember { id, .. } if *id == node => NameSite::Member {
                exempt: self.rule.exempt(SingleWordPosition::EnumMember),
            },
            NodeKind::ExportAllDeclaration {
                exported: Some(exported),
                ..
            }
            | NodeKind::ExportSpecifier { exported, .. }
                if *exported == node && !private =>
            {
                NameSite::Export
            }
            NodeKind::LabeledStatement { label, .. } if *label == node => NameSite::Export,
            NodeKind::BreakStatement { label: Some(label) }
            | NodeKind::ContinueStatement { label: Some(label) }
                if *label == node =>
            {
                NameSite::Export
            }
            _ => return None,
        };
        Some(site)
    }

    /// Report one occurrence unless its start offset was already reported.
    fn report(
        &mut self,
        node: NodeId,
        suggestion: Option<&str>,
        context: &str,
        ctx: &mut LintContext<'_>,
    ) -> LintResult<()> {
        let ast = ctx.file().ast();
        let range = ast.range(node)?;
        let name = ast.name(node).unwrap_or_default();
        if !self.reported.insert(range.start) {
            tracing::debug!(name, start = range.start, "already reported");
            return Ok(());
        }

        let private = ast.tag(node) == NodeTag::PrivateIdentifier;
        let message_id = match (private, suggestion.is_some()) {
            (false, true) => "notCamelCaseWithSuggestion",
            (true, true) => "notCamelCasePrivateWithSuggestion",
            (false, false) => "notCamelCaseNoSuggestion",
            (true, false) => "notCamelCasePrivateNoSuggestion",
        };
        let debug = if tracing::enabled!(Level::DEBUG) {
            format!(" ({context} {})", ast.path(node))
        } else {
            String::new()
        };
        tracing::debug!(name, path = %ast.path(node), "reporting");

        let fix = suggestion.map(|fixed| {
            let prefix = if private { "#" } else { "" };
            Suggestion::maybe_incorrect(
                format!("Replace \"{name}\" with \"{fixed}\""),
                TextEdit::replace(range, format!("{prefix}{fixed}")),
            )
        });

        ctx.report_with_suggestion(
            &STRICT_CAMEL_CASE,
            range,
            message_id,
            &[
                ("name", name),
                ("suggestion", suggestion.unwrap_or_default()),
                ("debug", debug.as_str()),
            ],
            fix,
        )
    }
}

fn is_assignment_target(file: &SourceFile, member: NodeId) -> bool {
    let ast = file.ast();
    ast.parent(member).is_some_and(|p| {
        matches!(ast.kind(p), NodeKind::AssignmentExpression { left, .. } if *left == member)
    })
}

/// Property signatures of interfaces and of object types aliased by name.
fn is_named_type_member(file: &SourceFile, signature: NodeId) -> bool {
    let ast = file.ast();
    match ast.parent_tag(signature) {
        Some(NodeTag::TsInterfaceDeclaration) => true,
        Some(NodeTag::TsTypeLiteral) => ast
            .parent(signature)
            .and_then(|literal| ast.parent_tag(literal))
            == Some(NodeTag::TsTypeAliasDeclaration),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lint::LintSettings;
    use crate::visitor::walk_tree;

    fn lint_with(src: &str, options: StrictCamelCaseOptions) -> Vec<(String, Option<String>)> {
        let file = SourceFile::parse(src, &[]).unwrap();
        let settings = LintSettings::default();
        let rule = StrictCamelCaseLint::new(options).unwrap();
        let mut ctx = LintContext::new(&file, &settings);
        let mut visitors = vec![rule.create(&file)];
        walk_tree(&mut visitors, &mut ctx).unwrap();
        ctx.into_diagnostics()
            .into_iter()
            .map(|d| {
                let replacement = d.suggestion.map(|s| s.edit.replacement);
                (file.slice(d.range).to_string(), replacement)
            })
            .collect()
    }

    fn lint(src: &str) -> Vec<(String, Option<String>)> {
        lint_with(src, StrictCamelCaseOptions::default())
    }

    fn names(found: &[(String, Option<String>)]) -> Vec<&str> {
        found.iter().map(|(n, _)| n.as_str()).collect()
    }

    #[test]
    fn declaration_and_uses_are_reported_once_each() {
        let found = lint("let aVAR = 1;\naVAR = 2;\nconsole.log(aVAR);");
        assert_eq!(names(&found), ["aVAR", "aVAR", "aVAR"]);
        assert!(found.iter().all(|(_, s)| s.as_deref() == Some("aVar")));
    }

    #[test]
    fn unresolved_references_are_checked() {
        assert_eq!(names(&lint("sendXMLRequest();")), ["sendXMLRequest"]);
    }

    #[test]
    fn function_params_and_classes() {
        let found = lint("function parseHTML(rawHTML) { return rawHTML; }\nclass JSONThing {}");
        assert_eq!(names(&found), ["parseHTML", "rawHTML", "rawHTML", "JSONThing"]);
    }

    #[test]
    fn const_single_words_can_be_exempt() {
        let src = "const VERSION = '1.0';";
        assert_eq!(names(&lint(src)), ["VERSION"]);
        let exempt = StrictCamelCaseOptions {
            ignore_single_words_in: vec![SingleWordPosition::FirstClassConstant],
            ..Default::default()
        };
        assert!(lint_with(src, exempt).is_empty());
    }

    #[test]
    fn object_fields_and_class_members() {
        let src = "const o = { fooBAR: 1 };\nclass Klass { static MAX = 1; #privVAL = 2; getHTML() {} }";
        let found = lint(src);
        assert_eq!(names(&found), ["fooBAR", "MAX", "#privVAL", "getHTML"]);
        assert_eq!(found[2].1.as_deref(), Some("#privVal"));

        let ignored = StrictCamelCaseOptions {
            ignore_properties: true,
            ..Default::default()
        };
        assert!(lint_with(src, ignored).is_empty());
    }

    #[test]
    fn reading_a_namespaced_constant_is_fine() {
        assert!(lint("enum Status { Good }\nconst s = Status.Good;\nlet t = window.HTML;").is_empty());
        assert_eq!(names(&lint("window.someHTML = 1;")), ["someHTML"]);
    }

    #[test]
    fn unrenamed_named_imports_are_skipped() {
        let found = lint("import { parseHTML } from 'x';\nimport { toXML as asXML } from 'y';\nasXML();");
        assert_eq!(names(&found), ["asXML", "asXML"]);
        assert_eq!(found[0].1.as_deref(), Some("asXml"));
    }

    #[test]
    fn default_imports_can_be_ignored() {
        let src = "import HTMLParser from 'h';";
        assert_eq!(names(&lint(src)), ["HTMLParser"]);
        let ignored = StrictCamelCaseOptions {
            ignore_imports: true,
            ..Default::default()
        };
        assert!(lint_with(src, ignored).is_empty());
    }

    #[test]
    fn labels_and_exports() {
        let found = lint("outerLOOP: for (;;) { break outerLOOP; }\nconst a = 1;\nexport { a as exportedVAL };");
        assert_eq!(names(&found), ["outerLOOP", "outerLOOP", "exportedVAL"]);
    }

    #[test]
    fn interfaces_enums_and_aliases() {
        let src = "interface IFoo { someURL: string; getURL(): void }\nenum Colors { DARKRED }\ntype PointXY = { posX: number };";
        let found = lint(src);
        assert_eq!(
            names(&found),
            ["IFoo", "someURL", "getURL", "DARKRED", "PointXY", "posX"]
        );
    }

    #[test]
    fn one_char_words_have_no_suggestion() {
        let found = lint("let getX = 1;");
        assert_eq!(found, [("getX".to_string(), None)]);
    }

    #[test]
    fn duplicate_options_are_rejected() {
        let options = StrictCamelCaseOptions {
            ignored_identifiers: vec!["a".into(), "a".into()],
            ..Default::default()
        };
        assert!(matches!(
            StrictCamelCaseLint::new(options),
            Err(LintError::InvalidOption { .. })
        ));
    }
}
