//! Everything the rules know about one file: text, tree, tokens, comments and scopes.

use crate::ast::{Ast, NodeId, TextRange};
use crate::diagnostics::{Position, Span};
use crate::error::LintResult;
use crate::parser;
use crate::scope::ScopeTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Punctuator,
    Keyword,
    Identifier,
    String,
    Template,
    Numeric,
    RegExp,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub range: TextRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommentKind {
    Line,
    Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comment {
    pub kind: CommentKind,
    pub range: TextRange,
}

/// A parsed source file. Tokens and comments are sorted by start offset.
#[derive(Debug)]
pub struct SourceFile {
    text: String,
    ast: Ast,
    tokens: Vec<Token>,
    comments: Vec<Comment>,
    scopes: ScopeTable,
    line_starts: Vec<usize>,
}

impl SourceFile {
    /// Parse `text` and run scope analysis.
    ///
    /// `extra_globals` are names that should resolve like built-in globals.
    ///
    /// # Errors
    ///
    /// Fails when the text does not parse cleanly.
    pub fn parse(text: impl Into<String>, extra_globals: &[String]) -> LintResult<Self> {
        Self::parse_as(text, parser::Dialect::TypeScript, extra_globals)
    }

    /// Like [`SourceFile::parse`] with an explicit grammar (`.tsx`/`.jsx` need [`parser::Dialect::Tsx`]).
    ///
    /// # Errors
    ///
    /// Fails when the text does not parse cleanly.
    pub fn parse_as(
        text: impl Into<String>,
        dialect: parser::Dialect,
        extra_globals: &[String],
    ) -> LintResult<Self> {
        let text = text.into();
        let parsed = parser::parse_source_as(&text, dialect)?;
        Ok(Self::from_parts(
            text,
            parsed.ast,
            parsed.tokens,
            parsed.comments,
            extra_globals,
        ))
    }

    pub fn from_parts(
        text: String,
        ast: Ast,
        mut tokens: Vec<Token>,
        mut comments: Vec<Comment>,
        extra_globals: &[String],
    ) -> Self {
        tokens.sort_by_key(|t| t.range.start);
        comments.sort_by_key(|c| c.range.start);
        let scopes = ScopeTable::analyze(&ast, extra_globals);
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            text,
            ast,
            tokens,
            comments,
            scopes,
            line_starts,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn scopes(&self) -> &ScopeTable {
        &self.scopes
    }

    /// Text covered by `range`; empty when the range does not fall on char boundaries.
    pub fn slice(&self, range: TextRange) -> &str {
        self.text.get(range.start..range.end).unwrap_or("")
    }

    /// Text of a node.
    pub fn node_text(&self, id: NodeId) -> LintResult<&str> {
        Ok(self.slice(self.ast.range(id)?))
    }

    /// 1-based line number containing `offset`.
    pub fn line_of(&self, offset: usize) -> usize {
        self.line_starts.partition_point(|&start| start <= offset)
    }

    /// 1-based line/column of `offset`; columns count chars, not bytes.
    pub fn position(&self, offset: usize) -> Position {
        let row = self.line_of(offset);
        let line_start = self.line_starts[row - 1];
        let end = offset.min(self.text.len());
        let column = self
            .text
            .get(line_start..end)
            .map_or(end - line_start, |s| s.chars().count())
            + 1;
        Position { row, column }
    }

    pub fn span(&self, range: TextRange) -> Span {
        Span {
            start: self.position(range.start),
            end: self.position(range.end),
        }
    }

    pub fn token_text(&self, token: &Token) -> &str {
        self.slice(token.range)
    }

    /// Comments between the previous token and `range`.
    pub fn comments_before(&self, range: TextRange) -> &[Comment] {
        let idx = self.tokens.partition_point(|t| t.range.end <= range.start);
        let floor = if idx == 0 {
            0
        } else {
            self.tokens[idx - 1].range.end
        };
        self.comments_within(floor, range.start)
    }

    /// Comments between `range` and the next token.
    pub fn comments_after(&self, range: TextRange) -> &[Comment] {
        let idx = self.tokens.partition_point(|t| t.range.start < range.end);
        let ceiling = self
            .tokens
            .get(idx)
            .map_or(self.text.len(), |t| t.range.start);
        self.comments_within(range.end, ceiling)
    }

    fn comments_within(&self, start: usize, end: usize) -> &[Comment] {
        let lo = self.comments.partition_point(|c| c.range.start < start);
        let hi = self.comments.partition_point(|c| c.range.end <= end);
        if lo >= hi { &[] } else { &self.comments[lo..hi] }
    }

    /// First punctuator token equal to `value` starting at or after `pos`.
    pub fn find_punctuator_after(&self, pos: usize, value: &str) -> Option<&Token> {
        let idx = self.tokens.partition_point(|t| t.range.start < pos);
        self.tokens[idx..]
            .iter()
            .find(|t| t.kind == TokenKind::Punctuator && self.token_text(t) == value)
    }

    /// First punctuator equal to `value` lying entirely inside `[start, end)`.
    pub fn find_punctuator_between(&self, start: usize, end: usize, value: &str) -> Option<&Token> {
        let idx = self.tokens.partition_point(|t| t.range.start < start);
        self.tokens[idx..]
            .iter()
            .take_while(|t| t.range.end <= end)
            .find(|t| t.kind == TokenKind::Punctuator && self.token_text(t) == value)
    }

    pub fn has_punctuator_between(&self, start: usize, end: usize, value: &str) -> bool {
        self.find_punctuator_between(start, end, value).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(src: &str) -> SourceFile {
        SourceFile::parse(src, &[]).expect("source should parse")
    }

    #[test]
    fn lines_are_one_based() {
        let f = file("let a = 1;\nlet b = 2;\n");
        assert_eq!(f.line_of(0), 1);
        assert_eq!(f.line_of(11), 2);
        assert_eq!(f.position(15).column, 5);
    }

    #[test]
    fn finds_comments_around_a_range() {
        let src = "import a from \"a\"; // trailing\n/* lead */ import b from \"b\";\n";
        let f = file(src);
        let first_end = src.find(';').unwrap() + 1;
        let after = f.comments_after(TextRange::new(0, first_end));
        assert_eq!(after.len(), 2);
        assert_eq!(f.slice(after[0].range), "// trailing");

        let second_start = src.find("import b").unwrap();
        let before = f.comments_before(TextRange::new(second_start, src.len() - 1));
        assert_eq!(before.len(), 2);
        assert_eq!(f.slice(before[1].range), "/* lead */");
    }

    #[test]
    fn finds_punctuators() {
        let src = "let { a, ...rest } = obj;";
        let f = file(src);
        let brace = f.find_punctuator_after(7, "}").expect("closing brace");
        assert_eq!(brace.range.start, src.find('}').unwrap());
        assert!(f.find_punctuator_after(0, "...").is_some());
        assert!(f.has_punctuator_between(6, 8, ","));
        assert!(!f.has_punctuator_between(0, 5, ","));
    }
}
