//! Lowering from tree-sitter-typescript's concrete tree to the arena AST.
//!
//! Type positions are opaque: annotations, type arguments and the like become
//! childless [`NodeKind::Other`] nodes so identifiers inside them never count
//! as value references. Only declaration names of interfaces, type aliases,
//! enums and type parameters are lowered to identifiers.

use crate::ast::{
    Ast, AstBuilder, ClassKind, FunctionKind, ImportKind, LogicalOperator, NodeId, NodeKind,
    TextRange, VariableKind,
};
use tree_sitter::Node;

pub(super) fn lower_program(root: Node, source: &str) -> Ast {
    let mut lowerer = Lowerer {
        source,
        builder: AstBuilder::new(),
    };
    let body = lowerer.lower_named_children(root);
    let program = lowerer.push(NodeKind::Program { body }, root);
    lowerer.builder.finish(program)
}

struct Lowerer<'s> {
    source: &'s str,
    builder: AstBuilder,
}

fn range_of(node: Node) -> TextRange {
    TextRange::new(node.start_byte(), node.end_byte())
}

fn is_trivia(node: Node) -> bool {
    matches!(node.kind(), "comment" | "html_comment" | "hash_bang_line")
}

fn is_type_kind(kind: &str) -> bool {
    matches!(
        kind,
        "type_annotation"
            | "type_arguments"
            | "type_parameters"
            | "predefined_type"
            | "type_identifier"
            | "nested_type_identifier"
            | "generic_type"
            | "object_type"
            | "union_type"
            | "intersection_type"
            | "function_type"
            | "constructor_type"
            | "array_type"
            | "tuple_type"
            | "literal_type"
            | "lookup_type"
            | "conditional_type"
            | "index_type_query"
            | "type_query"
            | "parenthesized_type"
            | "readonly_type"
            | "template_literal_type"
            | "infer_type"
            | "existential_type"
            | "this_type"
            | "optional_type"
            | "rest_type"
            | "constraint"
            | "default_type"
            | "asserts_annotation"
            | "type_predicate_annotation"
            | "implements_clause"
            | "extends_type_clause"
            | "opting_type_annotation"
            | "omitting_type_annotation"
            | "adding_type_annotation"
            | "index_signature"
            | "call_signature"
            | "construct_signature"
    )
}

fn strip_quotes(raw: &str) -> String {
    for quote in ['"', '\'', '`'] {
        if let Some(inner) = raw
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner.to_string();
        }
    }
    raw.to_string()
}

impl<'s> Lowerer<'s> {
    fn text(&self, node: Node) -> &'s str {
        self.source
            .get(node.start_byte()..node.end_byte())
            .unwrap_or("")
    }

    fn push(&mut self, kind: NodeKind, node: Node) -> NodeId {
        self.builder.push(kind, Some(range_of(node)))
    }

    fn push_range(&mut self, kind: NodeKind, range: TextRange) -> NodeId {
        self.builder.push(kind, Some(range))
    }

    fn leaf(&mut self, node: Node) -> NodeId {
        self.push(
            NodeKind::Other {
                grammar_kind: node.kind(),
                children: Vec::new(),
            },
            node,
        )
    }

    fn identifier(&mut self, node: Node) -> NodeId {
        let name = self.text(node).to_string();
        self.push(NodeKind::Identifier { name }, node)
    }

    fn private_identifier(&mut self, node: Node) -> NodeId {
        let name = self.text(node).trim_start_matches('#').to_string();
        self.push(NodeKind::PrivateIdentifier { name }, node)
    }

    fn literal(&mut self, node: Node) -> NodeId {
        let raw = self.text(node).to_string();
        self.push(NodeKind::Literal { raw }, node)
    }

    fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
        let mut cursor = node.walk();
        node.named_children(&mut cursor)
            .filter(|c| !is_trivia(*c))
            .collect()
    }

    fn lower_named_children(&mut self, node: Node) -> Vec<NodeId> {
        Self::named_children(node)
            .into_iter()
            .map(|c| self.lower(c))
            .collect()
    }

    fn lower_opt(&mut self, node: Option<Node>) -> Option<NodeId> {
        node.map(|n| self.lower(n))
    }

    fn generic(&mut self, node: Node) -> NodeId {
        let children = self.lower_named_children(node);
        self.push(
            NodeKind::Other {
                grammar_kind: node.kind(),
                children,
            },
            node,
        )
    }

    fn lower(&mut self, node: Node) -> NodeId {
        let kind = node.kind();
        if is_type_kind(kind) {
            return self.leaf(node);
        }
        match kind {
            "identifier" | "shorthand_property_identifier" => self.identifier(node),
            "private_property_identifier" => self.private_identifier(node),
            "property_identifier" | "statement_identifier" | "this" | "super" => self.leaf(node),
            "string" | "number" | "regex" | "true" | "false" | "null" => self.literal(node),
            "parenthesized_expression" => match Self::named_children(node).first() {
                Some(inner) => self.lower(*inner),
                None => self.leaf(node),
            },
            "import_statement" => self.lower_import(node),
            "export_statement" => self.lower_export(node),
            "lexical_declaration" | "variable_declaration" => self.lower_variable_declaration(node),
            "variable_declarator" => self.lower_declarator(node),
            "function_declaration" | "generator_function_declaration" | "function_signature" => {
                self.lower_function(node, FunctionKind::Declaration)
            }
            "function_expression" | "function" | "generator_function" => {
                self.lower_function(node, FunctionKind::Expression)
            }
            "arrow_function" => self.lower_function(node, FunctionKind::Arrow),
            "class_declaration" | "abstract_class_declaration" => {
                self.lower_class(node, ClassKind::Declaration)
            }
            "class" => self.lower_class(node, ClassKind::Expression),
            "object" => self.lower_object(node),
            "object_pattern" => self.lower_object_pattern(node),
            "array_pattern" => {
                let elements = self.lower_named_children(node);
                self.push(NodeKind::ArrayPattern { elements }, node)
            }
            "rest_pattern" => self.lower_rest(node),
            "assignment_pattern" => {
                let left = self.lower_field(node, "left");
                let right = self.lower_field(node, "right");
                self.push(NodeKind::AssignmentPattern { left, right }, node)
            }
            "assignment_expression" | "augmented_assignment_expression" => {
                self.lower_assignment(node)
            }
            "member_expression" => self.lower_member(node),
            "subscript_expression" => {
                let object = self.lower_field(node, "object");
                let property = self.lower_field(node, "index");
                self.push(
                    NodeKind::MemberExpression {
                        object,
                        property,
                        computed: true,
                    },
                    node,
                )
            }
            "binary_expression" => self.lower_binary(node),
            "unary_expression" => {
                let operator = self.field_kind(node, "operator");
                let argument = self.lower_field(node, "argument");
                self.push(NodeKind::UnaryExpression { operator, argument }, node)
            }
            "ternary_expression" => {
                let test = self.lower_field(node, "condition");
                let consequent = self.lower_field(node, "consequence");
                let alternate = self.lower_field(node, "alternative");
                self.push(
                    NodeKind::ConditionalExpression {
                        test,
                        consequent,
                        alternate,
                    },
                    node,
                )
            }
            "as_expression" | "satisfies_expression" | "type_assertion" => {
                let children = Self::named_children(node)
                    .into_iter()
                    .filter(|c| !is_type_kind(c.kind()))
                    .map(|c| self.lower(c))
                    .collect();
                self.push(
                    NodeKind::Other {
                        grammar_kind: kind,
                        children,
                    },
                    node,
                )
            }
            "catch_clause" => {
                let param = self.lower_opt(node.child_by_field_name("parameter"));
                let body = self.lower_field(node, "body");
                self.push(NodeKind::CatchClause { param, body }, node)
            }
            "statement_block" | "class_static_block" => {
                let body = self.lower_named_children(node);
                self.push(NodeKind::BlockStatement { body }, node)
            }
            "for_statement" => {
                let children = self.lower_named_children(node);
                self.push(NodeKind::ForStatement { children }, node)
            }
            "for_in_statement" => self.lower_for_in(node),
            "labeled_statement" => {
                let label = self.label(node);
                let body = self.lower_field(node, "body");
                match label {
                    Some(label) => self.push(NodeKind::LabeledStatement { label, body }, node),
                    None => self.push(
                        NodeKind::Other {
                            grammar_kind: kind,
                            children: vec![body],
                        },
                        node,
                    ),
                }
            }
            "break_statement" => {
                let label = self.label(node);
                self.push(NodeKind::BreakStatement { label }, node)
            }
            "continue_statement" => {
                let label = self.label(node);
                self.push(NodeKind::ContinueStatement { label }, node)
            }
            "interface_declaration" => self.lower_interface(node),
            "type_alias_declaration" => self.lower_type_alias(node),
            "enum_declaration" => self.lower_enum(node),
            "internal_module" | "module" => {
                // Namespace names are not value references.
                let children = node
                    .child_by_field_name("body")
                    .map(|b| vec![self.lower(b)])
                    .unwrap_or_default();
                self.push(
                    NodeKind::Other {
                        grammar_kind: kind,
                        children,
                    },
                    node,
                )
            }
            "import_alias" | "jsx_closing_element" => self.leaf(node),
            "jsx_opening_element" | "jsx_self_closing_element" => {
                // Tag names are markup, attributes and children are expressions.
                let name = node.child_by_field_name("name").map(|n| n.id());
                let children = Self::named_children(node)
                    .into_iter()
                    .filter(|c| Some(c.id()) != name)
                    .map(|c| self.lower(c))
                    .collect();
                self.push(
                    NodeKind::Other {
                        grammar_kind: kind,
                        children,
                    },
                    node,
                )
            }
            _ => self.generic(node),
        }
    }

    fn lower_field(&mut self, node: Node, field: &str) -> NodeId {
        match node.child_by_field_name(field) {
            Some(child) => self.lower(child),
            None => self.leaf(node),
        }
    }

    fn field_kind(&self, node: Node, field: &str) -> String {
        node.child_by_field_name(field)
            .map(|c| c.kind().to_string())
            .unwrap_or_default()
    }

    fn label(&mut self, node: Node) -> Option<NodeId> {
        node.child_by_field_name("label")
            .map(|label| self.identifier(label))
    }

    fn has_anonymous_child(node: Node, kind: &str) -> bool {
        let mut cursor = node.walk();
        node.children(&mut cursor)
            .any(|c| !c.is_named() && c.kind() == kind)
    }

    // ------------------------------------------------------------------
    // Modules
    // ------------------------------------------------------------------

    fn lower_import(&mut self, node: Node) -> NodeId {
        let Some(source_node) = node.child_by_field_name("source") else {
            // `import x = require("y")` and friends.
            return self.leaf(node);
        };
        let source = strip_quotes(self.text(source_node));
        let import_kind = if Self::has_anonymous_child(node, "type") {
            ImportKind::Type
        } else {
            ImportKind::Value
        };

        let mut specifiers = Vec::new();
        for child in Self::named_children(node) {
            if child.kind() != "import_clause" {
                continue;
            }
            for part in Self::named_children(child) {
                match part.kind() {
                    "identifier" => {
                        let local = self.identifier(part);
                        specifiers.push(self.push(NodeKind::ImportDefaultSpecifier { local }, part));
                    }
                    "namespace_import" => {
                        let Some(name) = Self::named_children(part)
                            .into_iter()
                            .find(|c| c.kind() == "identifier")
                        else {
                            continue;
                        };
                        let local = self.identifier(name);
                        specifiers
                            .push(self.push(NodeKind::ImportNamespaceSpecifier { local }, part));
                    }
                    "named_imports" => {
                        for spec in Self::named_children(part) {
                            if spec.kind() == "import_specifier" {
                                specifiers.push(self.lower_import_specifier(spec));
                            }
                        }
                    }
                    _ => {}
                }
            }
        }

        self.push(
            NodeKind::ImportDeclaration {
                specifiers,
                source,
                import_kind,
            },
            node,
        )
    }

    fn lower_import_specifier(&mut self, spec: Node) -> NodeId {
        let name = spec.child_by_field_name("name");
        let alias = spec.child_by_field_name("alias");
        let (imported, local) = match (name, alias) {
            (Some(name), Some(alias)) => {
                let imported = self.module_export_name(name);
                (imported, self.identifier(alias))
            }
            (Some(name), None) => {
                let id = self.module_export_name(name);
                (id, id)
            }
            _ => {
                let id = self.leaf(spec);
                (id, id)
            }
        };
        self.push(NodeKind::ImportSpecifier { imported, local }, spec)
    }

    fn module_export_name(&mut self, node: Node) -> NodeId {
        if node.kind() == "string" {
            self.literal(node)
        } else {
            self.identifier(node)
        }
    }

    fn lower_export(&mut self, node: Node) -> NodeId {
        let source = node
            .child_by_field_name("source")
            .map(|s| strip_quotes(self.text(s)));

        if let Some(declaration) = node.child_by_field_name("declaration") {
            let declaration = self.lower(declaration);
            return self.push(
                NodeKind::ExportNamedDeclaration {
                    declaration: Some(declaration),
                    specifiers: Vec::new(),
                    source: None,
                },
                node,
            );
        }

        let children = Self::named_children(node);
        if let Some(clause) = children.iter().find(|c| c.kind() == "export_clause") {
            let mut specifiers = Vec::new();
            for spec in Self::named_children(*clause) {
                if spec.kind() != "export_specifier" {
                    continue;
                }
                let local = match spec.child_by_field_name("name") {
                    Some(name) => self.module_export_name(name),
                    None => self.leaf(spec),
                };
                let exported = match spec.child_by_field_name("alias") {
                    Some(alias) => self.module_export_name(alias),
                    None => local,
                };
                specifiers.push(self.push(NodeKind::ExportSpecifier { local, exported }, spec));
            }
            return self.push(
                NodeKind::ExportNamedDeclaration {
                    declaration: None,
                    specifiers,
                    source,
                },
                node,
            );
        }

        if let Some(source) = source {
            let exported = children
                .iter()
                .find(|c| c.kind() == "namespace_export")
                .and_then(|ns| {
                    Self::named_children(*ns)
                        .into_iter()
                        .next()
                })
                .map(|name| self.module_export_name(name));
            return self.push(NodeKind::ExportAllDeclaration { exported, source }, node);
        }

        self.generic(node)
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    fn lower_variable_declaration(&mut self, node: Node) -> NodeId {
        let kind = if node.kind() == "variable_declaration" {
            VariableKind::Var
        } else {
            match node.child_by_field_name("kind").map(|k| k.kind()) {
                Some("const") => VariableKind::Const,
                _ => VariableKind::Let,
            }
        };
        let declarations = Self::named_children(node)
            .into_iter()
            .filter(|c| c.kind() == "variable_declarator")
            .map(|c| self.lower_declarator(c))
            .collect();
        self.push(NodeKind::VariableDeclaration { kind, declarations }, node)
    }

    fn lower_declarator(&mut self, node: Node) -> NodeId {
        let id = self.lower_field(node, "name");
        let init = self.lower_opt(node.child_by_field_name("value"));
        self.push(NodeKind::VariableDeclarator { id, init }, node)
    }

    fn lower_for_in(&mut self, node: Node) -> NodeId {
        let mut children = Vec::new();
        let declared_kind = node
            .child_by_field_name("kind")
            .and_then(|k| match k.kind() {
                "var" => Some(VariableKind::Var),
                "let" => Some(VariableKind::Let),
                "const" => Some(VariableKind::Const),
                _ => None,
            });

        if let Some(left) = node.child_by_field_name("left") {
            let left_id = self.lower(left);
            match (declared_kind, node.child_by_field_name("kind")) {
                (Some(kind), Some(kw)) => {
                    let init = self.lower_opt(node.child_by_field_name("value"));
                    let declarator = self.push_range(
                        NodeKind::VariableDeclarator { id: left_id, init },
                        range_of(left),
                    );
                    let declaration = self.push_range(
                        NodeKind::VariableDeclaration {
                            kind,
                            declarations: vec![declarator],
                        },
                        TextRange::new(kw.start_byte(), left.end_byte()),
                    );
                    children.push(declaration);
                }
                _ => children.push(left_id),
            }
        }
        if let Some(right) = node.child_by_field_name("right") {
            children.push(self.lower(right));
        }
        if let Some(body) = node.child_by_field_name("body") {
            children.push(self.lower(body));
        }
        self.push(NodeKind::ForStatement { children }, node)
    }

    fn lower_params(&mut self, node: Node) -> Vec<NodeId> {
        if let Some(param) = node.child_by_field_name("parameter") {
            return vec![self.lower(param)];
        }
        let Some(params) = node.child_by_field_name("parameters") else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for param in Self::named_children(params) {
            match param.kind() {
                "required_parameter" | "optional_parameter" => {
                    let Some(pattern) = param.child_by_field_name("pattern") else {
                        continue;
                    };
                    let left = self.lower(pattern);
                    let id = match param.child_by_field_name("value") {
                        Some(value) => {
                            let right = self.lower(value);
                            self.push(NodeKind::AssignmentPattern { left, right }, param)
                        }
                        None => left,
                    };
                    out.push(id);
                }
                "decorator" => {}
                _ => out.push(self.lower(param)),
            }
        }
        out
    }

    fn lower_function(&mut self, node: Node, kind: FunctionKind) -> NodeId {
        let id = node
            .child_by_field_name("name")
            .map(|name| self.identifier(name));
        self.lower_function_with_id(node, kind, id)
    }

    /// Method bodies: the name belongs to the enclosing key, not the function.
    fn lower_method_value(&mut self, node: Node) -> NodeId {
        self.lower_function_with_id(node, FunctionKind::Expression, None)
    }

    fn lower_function_with_id(
        &mut self,
        node: Node,
        kind: FunctionKind,
        id: Option<NodeId>,
    ) -> NodeId {
        let params = self.lower_params(node);
        let body = self.lower_opt(node.child_by_field_name("body"));
        self.push(
            NodeKind::Function {
                kind,
                id,
                params,
                body,
            },
            node,
        )
    }

    fn lower_class(&mut self, node: Node, kind: ClassKind) -> NodeId {
        let id = node
            .child_by_field_name("name")
            .map(|name| self.identifier(name));

        let mut heritage = Vec::new();
        for child in Self::named_children(node) {
            if child.kind() != "class_heritage" {
                continue;
            }
            for clause in Self::named_children(child) {
                if clause.kind() == "extends_clause" {
                    heritage.extend(self.lower_named_children(clause));
                }
            }
        }

        let mut members = Vec::new();
        if let Some(body) = node.child_by_field_name("body") {
            for member in Self::named_children(body) {
                members.push(self.lower_class_member(member));
            }
        }

        self.push(
            NodeKind::Class {
                kind,
                id,
                heritage,
                members,
            },
            node,
        )
    }

    fn lower_key(&mut self, key: Node) -> (NodeId, bool) {
        match key.kind() {
            "property_identifier" | "identifier" | "shorthand_property_identifier" => {
                (self.identifier(key), false)
            }
            "private_property_identifier" => (self.private_identifier(key), false),
            "string" | "number" => (self.literal(key), false),
            "computed_property_name" => {
                let inner = match Self::named_children(key).first() {
                    Some(expr) => self.lower(*expr),
                    None => self.leaf(key),
                };
                (inner, true)
            }
            _ => (self.leaf(key), false),
        }
    }

    fn lower_class_member(&mut self, member: Node) -> NodeId {
        let is_static = Self::has_anonymous_child(member, "static");
        match member.kind() {
            "method_definition" => {
                let Some(name) = member.child_by_field_name("name") else {
                    return self.generic(member);
                };
                let (key, computed) = self.lower_key(name);
                let value = self.lower_method_value(member);
                self.push(
                    NodeKind::MethodDefinition {
                        key,
                        value,
                        is_static,
                        computed,
                    },
                    member,
                )
            }
            "public_field_definition" | "field_definition" => {
                let name = member
                    .child_by_field_name("name")
                    .or_else(|| member.child_by_field_name("property"));
                let Some(name) = name else {
                    return self.generic(member);
                };
                let (key, computed) = self.lower_key(name);
                let value = self.lower_opt(member.child_by_field_name("value"));
                self.push(
                    NodeKind::PropertyDefinition {
                        key,
                        value,
                        is_static,
                        computed,
                    },
                    member,
                )
            }
            // Abstract and overload signatures carry no runtime names.
            "method_signature" | "abstract_method_signature" => self.leaf(member),
            _ => self.lower(member),
        }
    }

    // ------------------------------------------------------------------
    // Objects and patterns
    // ------------------------------------------------------------------

    fn lower_object(&mut self, node: Node) -> NodeId {
        let mut properties = Vec::new();
        for child in Self::named_children(node) {
            let prop = match child.kind() {
                "pair" => {
                    let Some(key_node) = child.child_by_field_name("key") else {
                        continue;
                    };
                    let (key, computed) = self.lower_key(key_node);
                    let value = self.lower_field(child, "value");
                    self.push(
                        NodeKind::Property {
                            key,
                            value,
                            shorthand: false,
                            computed,
                        },
                        child,
                    )
                }
                "shorthand_property_identifier" => {
                    let id = self.identifier(child);
                    self.push(
                        NodeKind::Property {
                            key: id,
                            value: id,
                            shorthand: true,
                            computed: false,
                        },
                        child,
                    )
                }
                "method_definition" => {
                    let Some(name) = child.child_by_field_name("name") else {
                        continue;
                    };
                    let (key, computed) = self.lower_key(name);
                    let value = self.lower_method_value(child);
                    self.push(
                        NodeKind::Property {
                            key,
                            value,
                            shorthand: false,
                            computed,
                        },
                        child,
                    )
                }
                _ => self.lower(child),
            };
            properties.push(prop);
        }
        self.push(NodeKind::ObjectExpression { properties }, node)
    }

    fn lower_object_pattern(&mut self, node: Node) -> NodeId {
        let mut properties = Vec::new();
        for child in Self::named_children(node) {
            let prop = match child.kind() {
                "pair_pattern" => {
                    let Some(key_node) = child.child_by_field_name("key") else {
                        continue;
                    };
                    let (key, computed) = self.lower_key(key_node);
                    let value = self.lower_field(child, "value");
                    self.push(
                        NodeKind::Property {
                            key,
                            value,
                            shorthand: false,
                            computed,
                        },
                        child,
                    )
                }
                "shorthand_property_identifier_pattern" => {
                    let id = self.identifier(child);
                    self.push(
                        NodeKind::Property {
                            key: id,
                            value: id,
                            shorthand: true,
                            computed: false,
                        },
                        child,
                    )
                }
                "object_assignment_pattern" => {
                    let Some(left_node) = child.child_by_field_name("left") else {
                        continue;
                    };
                    let right = self.lower_field(child, "right");
                    if left_node.kind() == "shorthand_property_identifier_pattern" {
                        // `{ a = 1 }`: the key and the binding are distinct nodes over the same text.
                        let key = self.identifier(left_node);
                        let binding = self.identifier(left_node);
                        let value =
                            self.push(NodeKind::AssignmentPattern { left: binding, right }, child);
                        self.push(
                            NodeKind::Property {
                                key,
                                value,
                                shorthand: true,
                                computed: false,
                            },
                            child,
                        )
                    } else {
                        let left = self.lower(left_node);
                        self.push(NodeKind::AssignmentPattern { left, right }, child)
                    }
                }
                "rest_pattern" => self.lower_rest(child),
                _ => self.lower(child),
            };
            properties.push(prop);
        }
        self.push(NodeKind::ObjectPattern { properties }, node)
    }

    fn lower_rest(&mut self, node: Node) -> NodeId {
        let argument = match Self::named_children(node).first() {
            Some(inner) => self.lower(*inner),
            None => self.leaf(node),
        };
        self.push(NodeKind::RestElement { argument }, node)
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn lower_assignment(&mut self, node: Node) -> NodeId {
        let left = self.lower_field(node, "left");
        let right = self.lower_field(node, "right");
        let operator = if node.kind() == "assignment_expression" {
            "=".to_string()
        } else {
            self.field_kind(node, "operator")
        };
        self.push(
            NodeKind::AssignmentExpression {
                operator,
                left,
                right,
            },
            node,
        )
    }

    fn lower_member(&mut self, node: Node) -> NodeId {
        let object = self.lower_field(node, "object");
        let property = match node.child_by_field_name("property") {
            Some(prop) if prop.kind() == "private_property_identifier" => {
                self.private_identifier(prop)
            }
            Some(prop) => self.identifier(prop),
            None => self.leaf(node),
        };
        self.push(
            NodeKind::MemberExpression {
                object,
                property,
                computed: false,
            },
            node,
        )
    }

    fn lower_binary(&mut self, node: Node) -> NodeId {
        let operator = self.field_kind(node, "operator");
        let left = self.lower_field(node, "left");
        let right = self.lower_field(node, "right");
        let logical = match operator.as_str() {
            "&&" => Some(LogicalOperator::And),
            "||" => Some(LogicalOperator::Or),
            "??" => Some(LogicalOperator::Coalesce),
            _ => None,
        };
        match logical {
            Some(operator) => self.push(
                NodeKind::LogicalExpression {
                    operator,
                    left,
                    right,
                },
                node,
            ),
            None => self.push(
                NodeKind::BinaryExpression {
                    operator,
                    left,
                    right,
                },
                node,
            ),
        }
    }

    // ------------------------------------------------------------------
    // TypeScript declarations
    // ------------------------------------------------------------------

    fn lower_type_parameters(&mut self, node: Node) -> Vec<NodeId> {
        let Some(params) = node.child_by_field_name("type_parameters") else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for param in Self::named_children(params) {
            if param.kind() != "type_parameter" {
                continue;
            }
            let Some(name_node) = param.child_by_field_name("name") else {
                continue;
            };
            let name = self.identifier(name_node);
            out.push(self.push(NodeKind::TsTypeParameter { name }, param));
        }
        out
    }

    fn lower_signatures(&mut self, body: Node) -> Vec<NodeId> {
        let mut members = Vec::new();
        for member in Self::named_children(body) {
            let id = match member.kind() {
                "property_signature" | "method_signature" => {
                    let Some(name) = member.child_by_field_name("name") else {
                        members.push(self.leaf(member));
                        continue;
                    };
                    let (key, computed) = self.lower_key(name);
                    if member.kind() == "property_signature" {
                        self.push(NodeKind::TsPropertySignature { key, computed }, member)
                    } else {
                        self.push(NodeKind::TsMethodSignature { key, computed }, member)
                    }
                }
                _ => self.leaf(member),
            };
            members.push(id);
        }
        members
    }

    fn lower_interface(&mut self, node: Node) -> NodeId {
        let Some(name) = node.child_by_field_name("name") else {
            return self.leaf(node);
        };
        let id = self.identifier(name);
        let type_parameters = self.lower_type_parameters(node);
        let members = match node.child_by_field_name("body") {
            Some(body) => self.lower_signatures(body),
            None => Vec::new(),
        };
        self.push(
            NodeKind::TsInterfaceDeclaration {
                id,
                type_parameters,
                members,
            },
            node,
        )
    }

    fn lower_type_alias(&mut self, node: Node) -> NodeId {
        let Some(name) = node.child_by_field_name("name") else {
            return self.leaf(node);
        };
        let id = self.identifier(name);
        let type_parameters = self.lower_type_parameters(node);
        let type_annotation = node.child_by_field_name("value").map(|value| {
            if value.kind() == "object_type" {
                let members = self.lower_signatures(value);
                self.push(NodeKind::TsTypeLiteral { members }, value)
            } else {
                self.leaf(value)
            }
        });
        self.push(
            NodeKind::TsTypeAliasDeclaration {
                id,
                type_parameters,
                type_annotation,
            },
            node,
        )
    }

    fn lower_enum(&mut self, node: Node) -> NodeId {
        let Some(name) = node.child_by_field_name("name") else {
            return self.leaf(node);
        };
        let id = self.identifier(name);
        let mut members = Vec::new();
        if let Some(body) = node.child_by_field_name("body") {
            for member in Self::named_children(body) {
                let (member_id, initializer) = match member.kind() {
                    "enum_assignment" => {
                        let Some(name) = member.child_by_field_name("name") else {
                            continue;
                        };
                        let (key, _) = self.lower_key(name);
                        let init = self.lower_opt(member.child_by_field_name("value"));
                        (key, init)
                    }
                    _ => (self.lower_key(member).0, None),
                };
                members.push(self.push(
                    NodeKind::TsEnumMember {
                        id: member_id,
                        initializer,
                    },
                    member,
                ));
            }
        }
        self.push(NodeKind::TsEnumDeclaration { id, members }, node)
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse_source;
    use crate::ast::{NodeKind, NodeTag};

    fn tags(src: &str) -> Vec<NodeTag> {
        let parsed = parse_source(src).expect("parse should succeed");
        let ast = parsed.ast;
        ast.preorder(ast.root())
            .into_iter()
            .map(|id| ast.tag(id))
            .collect()
    }

    #[test]
    fn parentheses_are_transparent() {
        let t = tags("x = (a && b) || c;");
        let logical = t.iter().filter(|t| **t == NodeTag::LogicalExpression).count();
        assert_eq!(logical, 2);
    }

    #[test]
    fn type_annotations_hide_identifiers() {
        let parsed = parse_source("let a: Foo<Bar> = b;").expect("parse");
        let ast = parsed.ast;
        let names: Vec<_> = ast
            .preorder(ast.root())
            .into_iter()
            .filter_map(|id| ast.name(id).map(str::to_string))
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn for_of_head_becomes_a_declaration() {
        let t = tags("for (const item of items) { use(item); }");
        assert!(t.contains(&NodeTag::ForStatement));
        assert!(t.contains(&NodeTag::VariableDeclaration));
        assert!(t.contains(&NodeTag::VariableDeclarator));
    }

    #[test]
    fn private_names_drop_the_hash() {
        let parsed = parse_source("class A { #secretValue = 1; }").expect("parse");
        let ast = parsed.ast;
        let private = ast
            .preorder(ast.root())
            .into_iter()
            .find(|id| ast.tag(*id) == NodeTag::PrivateIdentifier)
            .expect("private identifier");
        assert!(matches!(
            ast.kind(private),
            NodeKind::PrivateIdentifier { name } if name == "secretValue"
        ));
        let range = ast.range(private).expect("range");
        assert_eq!(range.len(), "#secretValue".len());
    }

    #[test]
    fn enum_members_and_interfaces_are_lowered() {
        let t = tags("enum Dir { Up, Down = 2 }\ninterface Shape { area(): number; name: string }");
        assert_eq!(t.iter().filter(|t| **t == NodeTag::TsEnumMember).count(), 2);
        assert!(t.contains(&NodeTag::TsMethodSignature));
        assert!(t.contains(&NodeTag::TsPropertySignature));
    }
}
