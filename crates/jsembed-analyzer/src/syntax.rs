use jsembed_extract::{LineTable, Position, TextRange};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Start and end positions of a syntax element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Loc {
    pub start: Position,
    pub end: Position,
}

impl Loc {
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }
}

/// Grammar family used to parse a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialectKind {
    JavaScript,
    TypeScript,
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::JavaScript => write!(f, "JavaScript"),
            Self::TypeScript => write!(f, "TypeScript"),
        }
    }
}

/// Top-level grammar mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceType {
    Module,
    Script,
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Module => write!(f, "module"),
            Self::Script => write!(f, "script"),
        }
    }
}

/// A node of the syntax tree.
///
/// `range` indexes the owning unit's text; `loc` is derived from it through
/// the unit's line table. Synthetic nodes may carry neither.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    pub kind: String,
    pub range: Option<TextRange>,
    pub loc: Option<Loc>,
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    #[must_use]
    pub fn new(kind: impl Into<String>, range: Option<TextRange>, loc: Option<Loc>) -> Self {
        Self {
            kind: kind.into(),
            range,
            loc,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<SyntaxNode>) -> Self {
        self.children = children;
        self
    }

    /// Iterate over this node and all its descendants, depth-first
    pub fn descendants(&self) -> impl Iterator<Item = &SyntaxNode> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }

    /// First node of the given kind, depth-first
    #[must_use]
    pub fn find(&self, kind: &str) -> Option<&SyntaxNode> {
        self.descendants().find(|node| node.kind == kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Keyword,
    Identifier,
    Punctuator,
    String,
    Numeric,
    Boolean,
    Null,
    RegularExpression,
    Template,
    JsxText,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub range: TextRange,
    pub loc: Loc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommentKind {
    Line,
    Block,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub kind: CommentKind,
    /// Comment text without its delimiters
    pub value: String,
    pub range: TextRange,
    pub loc: Loc,
}

/// A parsed text buffer: syntax tree, token and comment streams, and the
/// positional tables of the buffer every range points into.
///
/// Units are values: position rewrites build a new unit instead of editing
/// this one, and the text tables are shared behind `Arc`s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUnit {
    pub tree: SyntaxNode,
    pub tokens: Vec<Token>,
    pub comments: Vec<Comment>,
    pub text: Arc<str>,
    pub line_table: Arc<LineTable>,
    /// Lines of `text`, without terminators
    pub lines: Arc<[String]>,
    pub dialect: DialectKind,
    pub source_type: SourceType,
}

impl ParsedUnit {
    #[must_use]
    pub fn new(text: &str, tree: SyntaxNode, dialect: DialectKind, source_type: SourceType) -> Self {
        let line_table = LineTable::new(text);
        let lines = line_table.lines(text);
        Self {
            tree,
            tokens: Vec::new(),
            comments: Vec::new(),
            text: Arc::from(text),
            line_table: Arc::new(line_table),
            lines: Arc::from(lines),
            dialect,
            source_type,
        }
    }

    #[must_use]
    pub fn with_tokens(mut self, tokens: Vec<Token>) -> Self {
        self.tokens = tokens;
        self
    }

    #[must_use]
    pub fn with_comments(mut self, comments: Vec<Comment>) -> Self {
        self.comments = comments;
        self
    }

    /// Position of a byte offset of `text`
    #[must_use]
    pub fn position_of(&self, offset: usize) -> Position {
        self.line_table.position_of(&self.text, offset)
    }

    #[must_use]
    pub fn loc_of(&self, range: TextRange) -> Loc {
        Loc::new(self.position_of(range.start), self.position_of(range.end))
    }

    /// Source text covered by `range`
    #[must_use]
    pub fn slice(&self, range: TextRange) -> Option<&str> {
        self.text.get(range.start..range.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(kind: &str, start: usize, end: usize) -> SyntaxNode {
        SyntaxNode::new(kind, Some(TextRange::new(start, end)), None)
    }

    #[test]
    fn test_descendants_are_preorder() {
        let tree = SyntaxNode::new("program", None, None).with_children(vec![
            SyntaxNode::new("statement", None, None)
                .with_children(vec![leaf("a", 0, 1), leaf("b", 2, 3)]),
            leaf("c", 4, 5),
        ]);

        let kinds: Vec<_> = tree.descendants().map(|n| n.kind.as_str()).collect();
        assert_eq!(kinds, vec!["program", "statement", "a", "b", "c"]);
        assert_eq!(tree.find("b").and_then(|n| n.range), Some(TextRange::new(2, 3)));
        assert!(tree.find("missing").is_none());
    }

    #[test]
    fn test_unit_positions() {
        let unit = ParsedUnit::new(
            "a;\nbc;",
            leaf("program", 0, 6),
            DialectKind::JavaScript,
            SourceType::Module,
        );

        assert_eq!(unit.lines.len(), 2);
        assert_eq!(unit.position_of(4), Position::new(2, 1));
        assert_eq!(
            unit.loc_of(TextRange::new(3, 5)),
            Loc::new(Position::new(2, 0), Position::new(2, 2))
        );
        assert_eq!(unit.slice(TextRange::new(3, 5)), Some("bc"));
    }
}
