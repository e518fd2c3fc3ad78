//! tree-sitter front end: parse, reject broken trees, collect tokens and comments,
//! then lower the concrete tree into [`crate::ast`].

mod lower;

use crate::ast::{Ast, TextRange};
use crate::error::{LintError, LintResult};
use crate::source::{Comment, CommentKind, Token, TokenKind};
use std::path::Path;
use tree_sitter::{Language, Node, Parser, Tree};

/// Which tree-sitter grammar to parse with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    #[default]
    TypeScript,
    Tsx,
}

impl Dialect {
    /// Pick the grammar from a file extension. JSX-bearing files need the TSX grammar.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("tsx" | "jsx") => Dialect::Tsx,
            _ => Dialect::TypeScript,
        }
    }

    fn language(self) -> Language {
        match self {
            Dialect::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Dialect::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}

/// Output of the front end for one file.
#[derive(Debug)]
pub struct ParsedSource {
    pub ast: Ast,
    pub tokens: Vec<Token>,
    pub comments: Vec<Comment>,
}

pub fn parse_source(source: &str) -> LintResult<ParsedSource> {
    parse_source_as(source, Dialect::TypeScript)
}

pub fn parse_source_as(source: &str, dialect: Dialect) -> LintResult<ParsedSource> {
    let tree = parse_tree(source, dialect)?;
    let root = tree.root_node();

    if root.has_error() {
        let line = first_error_line(root).unwrap_or(1);
        tracing::debug!(line, "rejecting source with syntax errors");
        return Err(LintError::Syntax { line });
    }

    let mut tokens = Vec::new();
    let mut comments = Vec::new();
    collect_tokens(root, source, &mut tokens, &mut comments);

    let ast = lower::lower_program(root, source);
    tracing::trace!(
        nodes = ast.len(),
        tokens = tokens.len(),
        comments = comments.len(),
        "lowered source"
    );

    Ok(ParsedSource {
        ast,
        tokens,
        comments,
    })
}

fn parse_tree(source: &str, dialect: Dialect) -> LintResult<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&dialect.language())
        .map_err(|e| LintError::Parser(format!("failed to load grammar: {e}")))?;

    parser
        .parse(source, None)
        .ok_or_else(|| LintError::Parser("tree-sitter failed to parse source".to_string()))
}

fn first_error_line(node: Node) -> Option<usize> {
    if node.is_error() || node.is_missing() {
        return Some(node.start_position().row + 1);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error()
            && let Some(line) = first_error_line(child)
        {
            return Some(line);
        }
    }
    None
}

/// Leaves become tokens; strings, templates and regexes are kept whole.
fn collect_tokens(node: Node, source: &str, tokens: &mut Vec<Token>, comments: &mut Vec<Comment>) {
    let range = TextRange::new(node.start_byte(), node.end_byte());
    let kind = node.kind();

    if kind == "comment" || kind == "html_comment" {
        comments.push(comment_at(source, range));
        return;
    }

    let atomic = matches!(kind, "string" | "template_string" | "regex");
    if atomic || node.child_count() == 0 {
        if !range.is_empty() {
            tokens.push(Token {
                kind: classify_token(node),
                range,
            });
        }
        if atomic {
            // Template substitutions may still carry comments.
            collect_nested_comments(node, source, comments);
        }
        return;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_tokens(child, source, tokens, comments);
    }
}

fn collect_nested_comments(node: Node, source: &str, comments: &mut Vec<Comment>) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "comment" {
            comments.push(comment_at(
                source,
                TextRange::new(child.start_byte(), child.end_byte()),
            ));
        } else {
            collect_nested_comments(child, source, comments);
        }
    }
}

fn comment_at(source: &str, range: TextRange) -> Comment {
    let text = source.get(range.start..range.end).unwrap_or("");
    let kind = if text.starts_with("/*") {
        CommentKind::Block
    } else {
        CommentKind::Line
    };
    Comment { kind, range }
}

fn classify_token(node: Node) -> TokenKind {
    let kind = node.kind();
    if !node.is_named() {
        return if kind.starts_with(|c: char| c.is_ascii_alphabetic()) {
            TokenKind::Keyword
        } else {
            TokenKind::Punctuator
        };
    }
    match kind {
        "identifier"
        | "property_identifier"
        | "shorthand_property_identifier"
        | "shorthand_property_identifier_pattern"
        | "private_property_identifier"
        | "statement_identifier"
        | "type_identifier" => TokenKind::Identifier,
        "string" => TokenKind::String,
        "template_string" => TokenKind::Template,
        "number" => TokenKind::Numeric,
        "regex" => TokenKind::RegExp,
        "true" | "false" | "null" | "undefined" | "this" | "super" => TokenKind::Keyword,
        _ => TokenKind::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeKind;

    #[test]
    fn rejects_syntax_errors_with_line() {
        let err = parse_source("let a = 1;\nlet = ;\n").unwrap_err();
        assert!(matches!(err, LintError::Syntax { line: 2 }));
    }

    #[test]
    fn strings_are_single_tokens() {
        let src = "import a from \"some/path\";";
        let parsed = parse_source(src).expect("parse should succeed");
        let strings: Vec<_> = parsed
            .tokens
            .iter()
            .filter(|t| t.kind == TokenKind::String)
            .collect();
        assert_eq!(strings.len(), 1);
        assert_eq!(&src[strings[0].range.start..strings[0].range.end], "\"some/path\"");
    }

    #[test]
    fn comments_are_not_tokens() {
        let src = "let { b, /* keep */ a } = obj; // done\n";
        let parsed = parse_source(src).expect("parse should succeed");
        assert_eq!(parsed.comments.len(), 2);
        assert!(
            parsed
                .tokens
                .iter()
                .all(|t| !src[t.range.start..t.range.end].starts_with("/"))
        );
    }

    #[test]
    fn lowers_import_declarations() {
        let parsed = parse_source("import type { A, b as C } from './x';").expect("parse");
        let ast = &parsed.ast;
        let NodeKind::Program { body } = ast.kind(ast.root()) else {
            panic!("expected program root");
        };
        let NodeKind::ImportDeclaration {
            specifiers,
            source,
            import_kind,
        } = ast.kind(body[0])
        else {
            panic!("expected import declaration");
        };
        assert_eq!(source, "./x");
        assert_eq!(*import_kind, crate::ast::ImportKind::Type);
        assert_eq!(specifiers.len(), 2);
    }

    #[test]
    fn tsx_dialect_follows_extension() {
        assert_eq!(Dialect::from_path(Path::new("a/b.tsx")), Dialect::Tsx);
        assert_eq!(Dialect::from_path(Path::new("a/b.mjs")), Dialect::TypeScript);
    }
}
