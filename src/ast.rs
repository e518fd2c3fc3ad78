//! Arena-allocated syntax tree consumed by the lint rules.
//!
//! The parser lowers tree-sitter's concrete syntax into the closed [`NodeKind`]
//! sum type below. Nodes reference each other through [`NodeId`] indices; the
//! parent of every node lives in a side table so rules can look upward without
//! back-pointers inside the nodes themselves.

use crate::error::{LintError, LintResult};
use std::fmt;

/// Index of a node inside an [`Ast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Half-open byte range `[start, end)` into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn contains(&self, other: TextRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportKind {
    Value,
    Type,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableKind {
    Var,
    Let,
    Const,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    Declaration,
    Expression,
    Arrow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Declaration,
    Expression,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOperator {
    And,
    Or,
    Coalesce,
}

impl LogicalOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            LogicalOperator::And => "&&",
            LogicalOperator::Or => "||",
            LogicalOperator::Coalesce => "??",
        }
    }
}

/// Closed set of syntax nodes the rules understand.
///
/// Anything the rules never look at is lowered to [`NodeKind::Other`], which
/// keeps its children so traversal still reaches nested constructs.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Program {
        body: Vec<NodeId>,
    },
    ImportDeclaration {
        specifiers: Vec<NodeId>,
        source: String,
        import_kind: ImportKind,
    },
    /// `imported` and `local` are the same node when the import is not renamed.
    ImportSpecifier {
        imported: NodeId,
        local: NodeId,
    },
    ImportDefaultSpecifier {
        local: NodeId,
    },
    ImportNamespaceSpecifier {
        local: NodeId,
    },
    ExportNamedDeclaration {
        declaration: Option<NodeId>,
        specifiers: Vec<NodeId>,
        source: Option<String>,
    },
    /// `local` and `exported` are the same node when the export is not renamed.
    ExportSpecifier {
        local: NodeId,
        exported: NodeId,
    },
    ExportAllDeclaration {
        exported: Option<NodeId>,
        source: String,
    },
    Identifier {
        name: String,
    },
    /// Name is stored without the leading `#`; the range covers it.
    PrivateIdentifier {
        name: String,
    },
    Literal {
        raw: String,
    },
    VariableDeclaration {
        kind: VariableKind,
        declarations: Vec<NodeId>,
    },
    VariableDeclarator {
        id: NodeId,
        init: Option<NodeId>,
    },
    Function {
        kind: FunctionKind,
        id: Option<NodeId>,
        params: Vec<NodeId>,
        body: Option<NodeId>,
    },
    Class {
        kind: ClassKind,
        id: Option<NodeId>,
        heritage: Vec<NodeId>,
        members: Vec<NodeId>,
    },
    MethodDefinition {
        key: NodeId,
        value: NodeId,
        is_static: bool,
        computed: bool,
    },
    PropertyDefinition {
        key: NodeId,
        value: Option<NodeId>,
        is_static: bool,
        computed: bool,
    },
    ObjectExpression {
        properties: Vec<NodeId>,
    },
    /// Shorthand properties share a single node for `key` and `value`.
    Property {
        key: NodeId,
        value: NodeId,
        shorthand: bool,
        computed: bool,
    },
    ObjectPattern {
        properties: Vec<NodeId>,
    },
    ArrayPattern {
        elements: Vec<NodeId>,
    },
    RestElement {
        argument: NodeId,
    },
    AssignmentPattern {
        left: NodeId,
        right: NodeId,
    },
    AssignmentExpression {
        operator: String,
        left: NodeId,
        right: NodeId,
    },
    MemberExpression {
        object: NodeId,
        property: NodeId,
        computed: bool,
    },
    LogicalExpression {
        operator: LogicalOperator,
        left: NodeId,
        right: NodeId,
    },
    BinaryExpression {
        operator: String,
        left: NodeId,
        right: NodeId,
    },
    UnaryExpression {
        operator: String,
        argument: NodeId,
    },
    ConditionalExpression {
        test: NodeId,
        consequent: NodeId,
        alternate: NodeId,
    },
    CatchClause {
        param: Option<NodeId>,
        body: NodeId,
    },
    BlockStatement {
        body: Vec<NodeId>,
    },
    /// `for`, `for-in` and `for-of` loops; their head opens a block scope.
    ForStatement {
        children: Vec<NodeId>,
    },
    LabeledStatement {
        label: NodeId,
        body: NodeId,
    },
    BreakStatement {
        label: Option<NodeId>,
    },
    ContinueStatement {
        label: Option<NodeId>,
    },
    TsInterfaceDeclaration {
        id: NodeId,
        type_parameters: Vec<NodeId>,
        members: Vec<NodeId>,
    },
    TsTypeAliasDeclaration {
        id: NodeId,
        type_parameters: Vec<NodeId>,
        type_annotation: Option<NodeId>,
    },
    TsTypeLiteral {
        members: Vec<NodeId>,
    },
    TsPropertySignature {
        key: NodeId,
        computed: bool,
    },
    TsMethodSignature {
        key: NodeId,
        computed: bool,
    },
    TsEnumDeclaration {
        id: NodeId,
        members: Vec<NodeId>,
    },
    TsEnumMember {
        id: NodeId,
        initializer: Option<NodeId>,
    },
    TsTypeParameter {
        name: NodeId,
    },
    Other {
        grammar_kind: &'static str,
        children: Vec<NodeId>,
    },
}

/// Field-less mirror of [`NodeKind`] used for dispatch tables and selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeTag {
    Program,
    ImportDeclaration,
    ImportSpecifier,
    ImportDefaultSpecifier,
    ImportNamespaceSpecifier,
    ExportNamedDeclaration,
    ExportSpecifier,
    ExportAllDeclaration,
    Identifier,
    PrivateIdentifier,
    Literal,
    VariableDeclaration,
    VariableDeclarator,
    Function,
    Class,
    MethodDefinition,
    PropertyDefinition,
    ObjectExpression,
    Property,
    ObjectPattern,
    ArrayPattern,
    RestElement,
    AssignmentPattern,
    AssignmentExpression,
    MemberExpression,
    LogicalExpression,
    BinaryExpression,
    UnaryExpression,
    ConditionalExpression,
    CatchClause,
    BlockStatement,
    ForStatement,
    LabeledStatement,
    BreakStatement,
    ContinueStatement,
    TsInterfaceDeclaration,
    TsTypeAliasDeclaration,
    TsTypeLiteral,
    TsPropertySignature,
    TsMethodSignature,
    TsEnumDeclaration,
    TsEnumMember,
    TsTypeParameter,
    Other,
}

impl NodeKind {
    pub fn tag(&self) -> NodeTag {
        match self {
            NodeKind::Program { .. } => NodeTag::Program,
            NodeKind::ImportDeclaration { .. } => NodeTag::ImportDeclaration,
            NodeKind::ImportSpecifier { .. } => NodeTag::ImportSpecifier,
            NodeKind::ImportDefaultSpecifier { .. } => NodeTag::ImportDefaultSpecifier,
            NodeKind::ImportNamespaceSpecifier { .. } => NodeTag::ImportNamespaceSpecifier,
            NodeKind::ExportNamedDeclaration { .. } => NodeTag::ExportNamedDeclaration,
            NodeKind::ExportSpecifier { .. } => NodeTag::ExportSpecifier,
            NodeKind::ExportAllDeclaration { .. } => NodeTag::ExportAllDeclaration,
            NodeKind::Identifier { .. } => NodeTag::Identifier,
            NodeKind::PrivateIdentifier { .. } => NodeTag::PrivateIdentifier,
            NodeKind::Literal { .. } => NodeTag::Literal,
            NodeKind::VariableDeclaration { .. } => NodeTag::VariableDeclaration,
            NodeKind::VariableDeclarator { .. } => NodeTag::VariableDeclarator,
            NodeKind::Function { .. } => NodeTag::Function,
            NodeKind::Class { .. } => NodeTag::Class,
            NodeKind::MethodDefinition { .. } => NodeTag::MethodDefinition,
            NodeKind::PropertyDefinition { .. } => NodeTag::PropertyDefinition,
            NodeKind::ObjectExpression { .. } => NodeTag::ObjectExpression,
            NodeKind::Property { .. } => NodeTag::Property,
            NodeKind::ObjectPattern { .. } => NodeTag::ObjectPattern,
            NodeKind::ArrayPattern { .. } => NodeTag::ArrayPattern,
            NodeKind::RestElement { .. } => NodeTag::RestElement,
            NodeKind::AssignmentPattern { .. } => NodeTag::AssignmentPattern,
            NodeKind::AssignmentExpression { .. } => NodeTag::AssignmentExpression,
            NodeKind::MemberExpression { .. } => NodeTag::MemberExpression,
            NodeKind::LogicalExpression { .. } => NodeTag::LogicalExpression,
            NodeKind::BinaryExpression { .. } => NodeTag::BinaryExpression,
            NodeKind::UnaryExpression { .. } => NodeTag::UnaryExpression,
            NodeKind::ConditionalExpression { .. } => NodeTag::ConditionalExpression,
            NodeKind::CatchClause { .. } => NodeTag::CatchClause,
            NodeKind::BlockStatement { .. } => NodeTag::BlockStatement,
            NodeKind::ForStatement { .. } => NodeTag::ForStatement,
            NodeKind::LabeledStatement { .. } => NodeTag::LabeledStatement,
            NodeKind::BreakStatement { .. } => NodeTag::BreakStatement,
            NodeKind::ContinueStatement { .. } => NodeTag::ContinueStatement,
            NodeKind::TsInterfaceDeclaration { .. } => NodeTag::TsInterfaceDeclaration,
            NodeKind::TsTypeAliasDeclaration { .. } => NodeTag::TsTypeAliasDeclaration,
            NodeKind::TsTypeLiteral { .. } => NodeTag::TsTypeLiteral,
            NodeKind::TsPropertySignature { .. } => NodeTag::TsPropertySignature,
            NodeKind::TsMethodSignature { .. } => NodeTag::TsMethodSignature,
            NodeKind::TsEnumDeclaration { .. } => NodeTag::TsEnumDeclaration,
            NodeKind::TsEnumMember { .. } => NodeTag::TsEnumMember,
            NodeKind::TsTypeParameter { .. } => NodeTag::TsTypeParameter,
            NodeKind::Other { .. } => NodeTag::Other,
        }
    }

    /// Children in source order, each listed once.
    pub fn children(&self) -> Vec<NodeId> {
        fn opt(out: &mut Vec<NodeId>, id: Option<NodeId>) {
            out.extend(id);
        }

        let mut out = Vec::new();
        match self {
            NodeKind::Program { body } | NodeKind::BlockStatement { body } => {
                out.extend(body);
            }
            NodeKind::ImportDeclaration { specifiers, .. } => out.extend(specifiers),
            NodeKind::ImportSpecifier { imported, local } => {
                out.push(*imported);
                if local != imported {
                    out.push(*local);
                }
            }
            NodeKind::ImportDefaultSpecifier { local }
            | NodeKind::ImportNamespaceSpecifier { local } => out.push(*local),
            NodeKind::ExportNamedDeclaration {
                declaration,
                specifiers,
                ..
            } => {
                opt(&mut out, *declaration);
                out.extend(specifiers);
            }
            NodeKind::ExportSpecifier { local, exported } => {
                out.push(*local);
                if exported != local {
                    out.push(*exported);
                }
            }
            NodeKind::ExportAllDeclaration { exported, .. } => opt(&mut out, *exported),
            NodeKind::Identifier { .. }
            | NodeKind::PrivateIdentifier { .. }
            | NodeKind::Literal { .. } => {}
            NodeKind::VariableDeclaration { declarations, .. } => out.extend(declarations),
            NodeKind::VariableDeclarator { id, init } => {
                out.push(*id);
                opt(&mut out, *init);
            }
            NodeKind::Function {
                id, params, body, ..
            } => {
                opt(&mut out, *id);
                out.extend(params);
                opt(&mut out, *body);
            }
            NodeKind::Class {
                id,
                heritage,
                members,
                ..
            } => {
                opt(&mut out, *id);
                out.extend(heritage);
                out.extend(members);
            }
            NodeKind::MethodDefinition { key, value, .. } => {
                out.push(*key);
                out.push(*value);
            }
            NodeKind::PropertyDefinition { key, value, .. } => {
                out.push(*key);
                opt(&mut out, *value);
            }
            NodeKind::ObjectExpression { properties } | NodeKind::ObjectPattern { properties } => {
                out.extend(properties);
            }
            NodeKind::Property { key, value, .. } => {
                out.push(*key);
                if value != key {
                    out.push(*value);
                }
            }
            NodeKind::ArrayPattern { elements } => out.extend(elements),
            NodeKind::RestElement { argument } => out.push(*argument),
            NodeKind::AssignmentPattern { left, right }
            | NodeKind::AssignmentExpression { left, right, .. }
            | NodeKind::LogicalExpression { left, right, .. }
            | NodeKind::BinaryExpression { left, right, .. } => {
                out.push(*left);
                out.push(*right);
            }
            NodeKind::MemberExpression {
                object, property, ..
            } => {
                out.push(*object);
                out.push(*property);
            }
            NodeKind::UnaryExpression { argument, .. } => out.push(*argument),
            NodeKind::ConditionalExpression {
                test,
                consequent,
                alternate,
            } => {
                out.push(*test);
                out.push(*consequent);
                out.push(*alternate);
            }
            NodeKind::CatchClause { param, body } => {
                opt(&mut out, *param);
                out.push(*body);
            }
            NodeKind::ForStatement { children } | NodeKind::Other { children, .. } => {
                out.extend(children);
            }
            NodeKind::LabeledStatement { label, body } => {
                out.push(*label);
                out.push(*body);
            }
            NodeKind::BreakStatement { label } | NodeKind::ContinueStatement { label } => {
                opt(&mut out, *label);
            }
            NodeKind::TsInterfaceDeclaration {
                id,
                type_parameters,
                members,
            } => {
                out.push(*id);
                out.extend(type_parameters);
                out.extend(members);
            }
            NodeKind::TsTypeAliasDeclaration {
                id,
                type_parameters,
                type_annotation,
            } => {
                out.push(*id);
                out.extend(type_parameters);
                opt(&mut out, *type_annotation);
            }
            NodeKind::TsTypeLiteral { members } => out.extend(members),
            NodeKind::TsPropertySignature { key, .. } | NodeKind::TsMethodSignature { key, .. } => {
                out.push(*key);
            }
            NodeKind::TsEnumDeclaration { id, members } => {
                out.push(*id);
                out.extend(members);
            }
            NodeKind::TsEnumMember { id, initializer } => {
                out.push(*id);
                opt(&mut out, *initializer);
            }
            NodeKind::TsTypeParameter { name } => out.push(*name),
        }
        out
    }

    /// Short display name used in debug output (`"VariableDeclarator"`, `"Other(call_expression)"`).
    pub fn display_name(&self) -> String {
        match self {
            NodeKind::Other { grammar_kind, .. } => format!("Other({grammar_kind})"),
            other => format!("{:?}", other.tag()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub range: Option<TextRange>,
}

/// Immutable syntax tree for one file.
#[derive(Debug, Clone)]
pub struct Ast {
    nodes: Vec<Node>,
    parents: Vec<Option<NodeId>>,
    root: NodeId,
}

impl Ast {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn tag(&self, id: NodeId) -> NodeTag {
        self.kind(id).tag()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents[id.index()]
    }

    pub fn parent_tag(&self, id: NodeId) -> Option<NodeTag> {
        self.parent(id).map(|p| self.tag(p))
    }

    /// Source range of a node.
    ///
    /// # Errors
    ///
    /// A node without a range is a broken tree; the error aborts the current file.
    pub fn range(&self, id: NodeId) -> LintResult<TextRange> {
        let node = self.node(id);
        node.range.ok_or_else(|| LintError::MissingRange {
            kind: tag_name(node.kind.tag()),
        })
    }

    /// Name of an `Identifier` or `PrivateIdentifier`, `None` for anything else.
    pub fn name(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Identifier { name } | NodeKind::PrivateIdentifier { name } => Some(name),
            _ => None,
        }
    }

    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |p| self.parent(*p))
    }

    /// Pre-order traversal starting at `from`.
    pub fn preorder(&self, from: NodeId) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            out.push(id);
            let children = self.kind(id).children();
            stack.extend(children.into_iter().rev());
        }
        out
    }

    /// `Program > VariableDeclaration > VariableDeclarator > Identifier` style path.
    pub fn path(&self, id: NodeId) -> String {
        let mut segments: Vec<String> = self
            .ancestors(id)
            .map(|a| self.kind(a).display_name())
            .collect();
        segments.reverse();
        segments.push(self.kind(id).display_name());
        segments.join(" > ")
    }
}

fn tag_name(tag: NodeTag) -> &'static str {
    match tag {
        NodeTag::Identifier => "Identifier",
        NodeTag::PrivateIdentifier => "PrivateIdentifier",
        NodeTag::Program => "Program",
        NodeTag::ImportDeclaration => "ImportDeclaration",
        NodeTag::ObjectPattern => "ObjectPattern",
        NodeTag::Property => "Property",
        NodeTag::LogicalExpression => "LogicalExpression",
        NodeTag::BinaryExpression => "BinaryExpression",
        NodeTag::UnaryExpression => "UnaryExpression",
        NodeTag::ConditionalExpression => "ConditionalExpression",
        _ => "node",
    }
}

/// Incremental builder used by the parser. Children are pushed before their parent.
#[derive(Debug, Default)]
pub struct AstBuilder {
    nodes: Vec<Node>,
}

impl AstBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: NodeKind, range: Option<TextRange>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node { kind, range });
        id
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    /// Seal the tree, computing the parent table from the child lists.
    pub fn finish(self, root: NodeId) -> Ast {
        let mut parents = vec![None; self.nodes.len()];
        for (idx, node) in self.nodes.iter().enumerate() {
            for child in node.kind.children() {
                parents[child.index()] = Some(NodeId(idx as u32));
            }
        }
        Ast {
            nodes: self.nodes,
            parents,
            root,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(b: &mut AstBuilder, name: &str, start: usize) -> NodeId {
        b.push(
            NodeKind::Identifier {
                name: name.to_string(),
            },
            Some(TextRange::new(start, start + name.len())),
        )
    }

    #[test]
    fn shared_key_and_value_are_visited_once() {
        let mut b = AstBuilder::new();
        let key = ident(&mut b, "a", 2);
        let prop = b.push(
            NodeKind::Property {
                key,
                value: key,
                shorthand: true,
                computed: false,
            },
            Some(TextRange::new(2, 3)),
        );
        let obj = b.push(
            NodeKind::ObjectExpression {
                properties: vec![prop],
            },
            Some(TextRange::new(0, 5)),
        );
        let ast = b.finish(obj);

        assert_eq!(ast.preorder(obj), vec![obj, prop, key]);
        assert_eq!(ast.parent(key), Some(prop));
        assert_eq!(ast.path(key), "ObjectExpression > Property > Identifier");
    }

    #[test]
    fn missing_range_is_an_error() {
        let mut b = AstBuilder::new();
        let id = b.push(
            NodeKind::Identifier {
                name: "x".to_string(),
            },
            None,
        );
        let ast = b.finish(id);
        assert!(matches!(
            ast.range(id),
            Err(LintError::MissingRange { kind: "Identifier" })
        ));
    }
}
