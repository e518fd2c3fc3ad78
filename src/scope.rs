//! Scope analysis: which names each declaring node introduces, where every
//! identifier reference resolves, and which references resolve nowhere.
//!
//! Runs in two passes. The first builds scopes and declarations so hoisted
//! names (`var`, function declarations) are visible before their textual
//! position; the second resolves every identifier in reference position.

use crate::ast::{Ast, ClassKind, FunctionKind, NodeId, NodeKind, VariableKind};
use crate::globals::is_builtin_global;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VariableId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Module,
    Function,
    Block,
    Catch,
    Class,
}

#[derive(Debug)]
pub struct Scope {
    pub kind: ScopeKind,
    pub node: NodeId,
    pub parent: Option<ScopeId>,
    names: HashMap<String, VariableId>,
}

/// An identifier occurrence that reads or writes a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    pub identifier: NodeId,
    /// Set for the implicit write performed by a declarator's initializer.
    pub init: bool,
}

#[derive(Debug)]
pub struct Variable {
    pub name: String,
    pub scope: ScopeId,
    /// Declaring identifiers in source order; more than one for redeclarations.
    pub identifiers: Vec<NodeId>,
    pub references: Vec<Reference>,
}

#[derive(Debug, Default)]
pub struct ScopeTable {
    scopes: Vec<Scope>,
    variables: Vec<Variable>,
    declared: HashMap<NodeId, Vec<VariableId>>,
    through: Vec<Reference>,
}

impl ScopeTable {
    pub fn analyze(ast: &Ast, extra_globals: &[String]) -> Self {
        let globals: HashSet<&str> = extra_globals.iter().map(String::as_str).collect();
        let mut analyzer = Analyzer {
            ast,
            table: ScopeTable::default(),
            bindings: HashSet::new(),
            node_scope: HashMap::new(),
        };

        let root = ast.root();
        let module = analyzer.new_scope(ScopeKind::Module, root, None);
        analyzer.declare(root, module, module);
        analyzer.resolve_references(&globals);

        tracing::trace!(
            scopes = analyzer.table.scopes.len(),
            variables = analyzer.table.variables.len(),
            through = analyzer.table.through.len(),
            "scope analysis finished"
        );
        analyzer.table
    }

    /// Variables introduced by a declaring node (declaration, function, class,
    /// catch clause, import specifier, TypeScript declaration).
    pub fn declared_variables(&self, node: NodeId) -> impl Iterator<Item = &Variable> + '_ {
        self.declared
            .get(&node)
            .into_iter()
            .flatten()
            .map(|v| &self.variables[v.0])
    }

    /// References that resolve to no declaration and are not known globals.
    pub fn through(&self) -> &[Reference] {
        &self.through
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    pub fn variables(&self) -> impl Iterator<Item = &Variable> + '_ {
        self.variables.iter()
    }
}

struct Analyzer<'a> {
    ast: &'a Ast,
    table: ScopeTable,
    /// Identifiers in declaring position; never treated as references.
    bindings: HashSet<NodeId>,
    node_scope: HashMap<NodeId, ScopeId>,
}

impl Analyzer<'_> {
    fn new_scope(&mut self, kind: ScopeKind, node: NodeId, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.table.scopes.len());
        self.table.scopes.push(Scope {
            kind,
            node,
            parent,
            names: HashMap::new(),
        });
        id
    }

    fn hoist_target(&self, mut scope: ScopeId) -> ScopeId {
        loop {
            let s = &self.table.scopes[scope.0];
            match (s.kind, s.parent) {
                (ScopeKind::Function | ScopeKind::Module, _) | (_, None) => return scope,
                (_, Some(parent)) => scope = parent,
            }
        }
    }

    fn define(&mut self, scope: ScopeId, ident: NodeId, declaring: NodeId) -> Option<VariableId> {
        let NodeKind::Identifier { name } = self.ast.kind(ident) else {
            return None;
        };
        self.bindings.insert(ident);

        let var = match self.table.scopes[scope.0].names.get(name) {
            Some(existing) => *existing,
            None => {
                let id = VariableId(self.table.variables.len());
                self.table.variables.push(Variable {
                    name: name.clone(),
                    scope,
                    identifiers: Vec::new(),
                    references: Vec::new(),
                });
                self.table.scopes[scope.0].names.insert(name.clone(), id);
                id
            }
        };

        let variable = &mut self.table.variables[var.0];
        if !variable.identifiers.contains(&ident) {
            variable.identifiers.push(ident);
        }
        let declared = self.table.declared.entry(declaring).or_default();
        if !declared.contains(&var) {
            declared.push(var);
        }
        Some(var)
    }

    /// Identifiers bound by a pattern, in source order.
    fn pattern_bindings(&self, pattern: NodeId, out: &mut Vec<NodeId>) {
        match self.ast.kind(pattern) {
            NodeKind::Identifier { .. } => out.push(pattern),
            NodeKind::ObjectPattern { properties } => {
                for prop in properties {
                    match self.ast.kind(*prop) {
                        NodeKind::Property { value, .. } => self.pattern_bindings(*value, out),
                        _ => self.pattern_bindings(*prop, out),
                    }
                }
            }
            NodeKind::ArrayPattern { elements } => {
                for element in elements {
                    self.pattern_bindings(*element, out);
                }
            }
            NodeKind::AssignmentPattern { left, .. } => self.pattern_bindings(*left, out),
            NodeKind::RestElement { argument } => self.pattern_bindings(*argument, out),
            _ => {}
        }
    }

    fn define_pattern(&mut self, scope: ScopeId, pattern: NodeId, declaring: NodeId) -> Vec<VariableId> {
        let mut idents = Vec::new();
        self.pattern_bindings(pattern, &mut idents);
        idents
            .into_iter()
            .filter_map(|ident| self.define(scope, ident, declaring))
            .collect()
    }

    fn declare(&mut self, id: NodeId, scope: ScopeId, module: ScopeId) {
        let ast = self.ast;
        let mut inner = scope;

        match ast.kind(id) {
            NodeKind::VariableDeclaration { kind, declarations } => {
                let target = match kind {
                    VariableKind::Var => self.hoist_target(scope),
                    VariableKind::Let | VariableKind::Const => scope,
                };
                for declarator in declarations {
                    let NodeKind::VariableDeclarator { id: pattern, init } = ast.kind(*declarator)
                    else {
                        continue;
                    };
                    let mut idents = Vec::new();
                    self.pattern_bindings(*pattern, &mut idents);
                    for ident in idents {
                        let Some(var) = self.define(target, ident, id) else {
                            continue;
                        };
                        if init.is_some() {
                            self.table.variables[var.0].references.push(Reference {
                                identifier: ident,
                                init: true,
                            });
                        }
                    }
                }
            }
            NodeKind::Function {
                kind,
                id: name,
                params,
                ..
            } => {
                let function_scope = self.new_scope(ScopeKind::Function, id, Some(scope));
                if let Some(name) = name {
                    match kind {
                        FunctionKind::Declaration => {
                            self.define(scope, *name, id);
                        }
                        FunctionKind::Expression => {
                            self.define(function_scope, *name, id);
                        }
                        FunctionKind::Arrow => {}
                    }
                }
                for param in params {
                    self.define_pattern(function_scope, *param, id);
                }
                inner = function_scope;
            }
            NodeKind::Class { kind, id: name, .. } => {
                let class_scope = self.new_scope(ScopeKind::Class, id, Some(scope));
                if let Some(name) = name {
                    match kind {
                        ClassKind::Declaration => self.define(scope, *name, id),
                        ClassKind::Expression => self.define(class_scope, *name, id),
                    };
                }
                inner = class_scope;
            }
            NodeKind::CatchClause { param, .. } => {
                let catch_scope = self.new_scope(ScopeKind::Catch, id, Some(scope));
                if let Some(param) = param {
                    self.define_pattern(catch_scope, *param, id);
                }
                inner = catch_scope;
            }
            NodeKind::BlockStatement { .. } => {
                let is_function_body = ast
                    .parent(id)
                    .is_some_and(|p| matches!(ast.kind(p), NodeKind::Function { .. }));
                if !is_function_body {
                    inner = self.new_scope(ScopeKind::Block, id, Some(scope));
                }
            }
            NodeKind::ForStatement { .. } => {
                inner = self.new_scope(ScopeKind::Block, id, Some(scope));
            }
            NodeKind::ImportDefaultSpecifier { local }
            | NodeKind::ImportNamespaceSpecifier { local }
            | NodeKind::ImportSpecifier { local, .. } => {
                self.define(module, *local, id);
            }
            NodeKind::TsInterfaceDeclaration { id: name, .. }
            | NodeKind::TsTypeAliasDeclaration { id: name, .. }
            | NodeKind::TsEnumDeclaration { id: name, .. } => {
                self.define(scope, *name, id);
            }
            NodeKind::TsTypeParameter { name } => {
                self.define(scope, *name, id);
            }
            _ => {}
        }

        self.node_scope.insert(id, inner);
        for child in ast.kind(id).children() {
            self.declare(child, inner, module);
        }
    }

    fn is_reference_position(&self, ident: NodeId) -> bool {
        let ast = self.ast;
        let Some(parent) = ast.parent(ident) else {
            return true;
        };
        match ast.kind(parent) {
            NodeKind::Property {
                key,
                value,
                computed,
                ..
            } => !(*key == ident && *value != ident && !*computed),
            NodeKind::MethodDefinition { key, computed, .. }
            | NodeKind::PropertyDefinition { key, computed, .. }
            | NodeKind::TsPropertySignature { key, computed }
            | NodeKind::TsMethodSignature { key, computed } => !(*key == ident && !*computed),
            NodeKind::MemberExpression {
                property, computed, ..
            } => !(*property == ident && !*computed),
            NodeKind::TsEnumMember { id, .. } => *id != ident,
            NodeKind::LabeledStatement { .. }
            | NodeKind::BreakStatement { .. }
            | NodeKind::ContinueStatement { .. }
            | NodeKind::ExportAllDeclaration { .. } => false,
            NodeKind::ImportSpecifier { imported, local } => {
                !(*imported == ident && *local != ident)
            }
            NodeKind::ExportSpecifier { local, .. } => {
                if *local != ident {
                    return false;
                }
                let re_export = ast.parent(parent).is_some_and(|decl| {
                    matches!(
                        ast.kind(decl),
                        NodeKind::ExportNamedDeclaration {
                            source: Some(_),
                            ..
                        }
                    )
                });
                !re_export
            }
            _ => true,
        }
    }

    fn lookup(&self, mut scope: ScopeId, name: &str) -> Option<VariableId> {
        loop {
            let s = &self.table.scopes[scope.0];
            if let Some(var) = s.names.get(name) {
                return Some(*var);
            }
            scope = s.parent?;
        }
    }

    fn resolve_references(&mut self, extra_globals: &HashSet<&str>) {
        let ast = self.ast;
        for id in ast.preorder(ast.root()) {
            let NodeKind::Identifier { name } = ast.kind(id) else {
                continue;
            };
            if self.bindings.contains(&id) || !self.is_reference_position(id) {
                continue;
            }
            let Some(scope) = self.node_scope.get(&id).copied() else {
                continue;
            };
            let reference = Reference {
                identifier: id,
                init: false,
            };
            match self.lookup(scope, name) {
                Some(var) => self.table.variables[var.0].references.push(reference),
                None if is_builtin_global(name) || extra_globals.contains(name.as_str()) => {}
                None => self.table.through.push(reference),
            }
        }
    }
}
