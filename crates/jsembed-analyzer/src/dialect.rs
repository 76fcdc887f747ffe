//! Grammar dialects backing the resilient parser.
//!
//! A [`Dialect`] turns source text into a [`ParsedUnit`] or a [`ParseFailure`]
//! carrying a located message. [`TreeSitterDialect`] is the built-in
//! implementation over the tree-sitter JavaScript and TypeScript grammars.

use crate::syntax::{
    Comment, CommentKind, DialectKind, Loc, ParsedUnit, SourceType, SyntaxNode, Token, TokenKind,
};
use crate::ParseFailure;
use jsembed_extract::{LineTable, TextRange};
use tree_sitter::{Node, Parser, TreeCursor};

/// Nodes emitted as a single token even though the grammar gives them children
const ATOMIC_TOKENS: &[&str] = &["string", "regex"];

/// Options passed to a single dialect invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialectOptions {
    pub source_type: SourceType,
    /// Accept JSX syntax
    pub jsx: bool,
}

/// A grammar able to parse JavaScript-family source text
pub trait Dialect: Send + Sync {
    fn kind(&self) -> DialectKind;

    fn parse(&self, text: &str, options: &DialectOptions) -> Result<ParsedUnit, ParseFailure>;
}

/// Dialect backed by a tree-sitter grammar.
///
/// Syntax errors anywhere in the tree fail the parse. The typed dialect
/// always parses as a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeSitterDialect {
    kind: DialectKind,
}

impl TreeSitterDialect {
    #[must_use]
    pub const fn javascript() -> Self {
        Self {
            kind: DialectKind::JavaScript,
        }
    }

    #[must_use]
    pub const fn typescript() -> Self {
        Self {
            kind: DialectKind::TypeScript,
        }
    }

    fn grammar(&self, jsx: bool) -> tree_sitter::Language {
        match (self.kind, jsx) {
            (DialectKind::JavaScript, _) => tree_sitter_javascript::LANGUAGE.into(),
            (DialectKind::TypeScript, false) => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            (DialectKind::TypeScript, true) => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}

impl Dialect for TreeSitterDialect {
    fn kind(&self) -> DialectKind {
        self.kind
    }

    fn parse(&self, text: &str, options: &DialectOptions) -> Result<ParsedUnit, ParseFailure> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.grammar(options.jsx))
            .map_err(|e| ParseFailure::new(format!("Failed to set {} grammar: {e}", self.kind)))?;

        let tree = parser
            .parse(text, None)
            .ok_or_else(|| ParseFailure::new("Failed to parse source code"))?;
        let root = tree.root_node();
        let line_table = LineTable::new(text);

        if root.has_error() {
            return Err(syntax_error(root, text, &line_table));
        }

        let source_type = match self.kind {
            DialectKind::TypeScript => SourceType::Module,
            DialectKind::JavaScript => options.source_type,
        };
        check_source_type(root, text, &line_table, source_type)?;

        let mut converter = Converter {
            text,
            line_table: &line_table,
            tokens: Vec::new(),
            comments: Vec::new(),
        };
        let syntax = converter.node(root);
        let Converter {
            tokens, comments, ..
        } = converter;

        Ok(ParsedUnit::new(text, syntax, self.kind, source_type)
            .with_tokens(tokens)
            .with_comments(comments))
    }
}

/// Depth-first traversal of a tree-sitter subtree
struct Preorder<'tree> {
    cursor: TreeCursor<'tree>,
    done: bool,
}

impl<'tree> Preorder<'tree> {
    fn new(root: Node<'tree>) -> Self {
        Self {
            cursor: root.walk(),
            done: false,
        }
    }

    /// Move past the current node's subtree
    fn skip_subtree(&mut self) {
        while !self.cursor.goto_next_sibling() {
            if !self.cursor.goto_parent() {
                self.done = true;
                return;
            }
        }
    }
}

impl<'tree> Iterator for Preorder<'tree> {
    type Item = Node<'tree>;

    fn next(&mut self) -> Option<Node<'tree>> {
        if self.done {
            return None;
        }
        let node = self.cursor.node();
        if !self.cursor.goto_first_child() {
            self.skip_subtree();
        }
        Some(node)
    }
}

fn located(node: Node, description: &str, text: &str, line_table: &LineTable) -> ParseFailure {
    ParseFailure::at(description, line_table.position_of(text, node.start_byte()))
}

/// Describe the first syntax error of the tree, in document order
fn syntax_error(root: Node, text: &str, line_table: &LineTable) -> ParseFailure {
    let mut cursor = root.walk();
    let culprit = loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            break Some(node);
        }
        if node.has_error() && cursor.goto_first_child() {
            continue;
        }
        let mut exhausted = false;
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                exhausted = true;
                break;
            }
        }
        if exhausted {
            break None;
        }
    };

    let Some(node) = culprit else {
        return located(root, "Unexpected token.", text, line_table);
    };

    if node.is_missing() {
        return located(node, &format!("Expected '{}'.", node.kind()), text, line_table);
    }

    let mut leaf = node;
    while let Some(child) = leaf.child(0) {
        leaf = child;
    }
    let token = leaf
        .utf8_text(text.as_bytes())
        .ok()
        .and_then(|t| t.split_whitespace().next())
        .unwrap_or_default();

    if token.is_empty() {
        located(leaf, "Unexpected end of input.", text, line_table)
    } else {
        located(leaf, &format!("Unexpected token '{token}'."), text, line_table)
    }
}

/// Reject constructs the chosen top-level mode does not allow
fn check_source_type(
    root: Node,
    text: &str,
    line_table: &LineTable,
    source_type: SourceType,
) -> Result<(), ParseFailure> {
    for node in Preorder::new(root) {
        let description = match (source_type, node.kind()) {
            (SourceType::Module, "with_statement") => "'with' in strict mode.",
            (SourceType::Module, "number")
                if node.is_named() && is_legacy_octal(node_text(node, text)) =>
            {
                "Legacy octal literals are not allowed in strict mode."
            }
            (SourceType::Script, "import_statement" | "export_statement") => {
                "'import' and 'export' may appear only with 'sourceType: module'."
            }
            _ => continue,
        };
        return Err(located(node, description, text, line_table));
    }
    Ok(())
}

fn is_legacy_octal(literal: &str) -> bool {
    literal.len() > 1 && literal.starts_with('0') && literal.bytes().all(|b| b.is_ascii_digit())
}

fn node_text<'s>(node: Node, text: &'s str) -> &'s str {
    text.get(node.start_byte()..node.end_byte())
        .unwrap_or_default()
}

/// Builds the syntax tree and the token and comment streams in one pass
struct Converter<'s> {
    text: &'s str,
    line_table: &'s LineTable,
    tokens: Vec<Token>,
    comments: Vec<Comment>,
}

impl Converter<'_> {
    fn range(&self, node: Node) -> (TextRange, Loc) {
        let range = TextRange::new(node.start_byte(), node.end_byte());
        let loc = Loc::new(
            self.line_table.position_of(self.text, range.start),
            self.line_table.position_of(self.text, range.end),
        );
        (range, loc)
    }

    fn node(&mut self, node: Node) -> SyntaxNode {
        let (range, loc) = self.range(node);
        let syntax = SyntaxNode::new(node.kind(), Some(range), Some(loc));

        if node.child_count() == 0 || ATOMIC_TOKENS.contains(&node.kind()) {
            self.token(node);
            return syntax;
        }

        let children = self.children(node);
        syntax.with_children(children)
    }

    fn children(&mut self, node: Node) -> Vec<SyntaxNode> {
        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        let mut named = Vec::new();

        for child in children {
            if is_comment(child) {
                self.comment(child);
            } else if child.is_named() {
                named.push(self.node(child));
            } else if child.child_count() == 0 {
                self.token(child);
            } else {
                named.extend(self.children(child));
            }
        }

        named
    }

    fn token(&mut self, node: Node) {
        let (range, loc) = self.range(node);
        if range.is_empty() {
            return;
        }
        self.tokens.push(Token {
            kind: token_kind(node),
            value: node_text(node, self.text).to_string(),
            range,
            loc,
        });
    }

    fn comment(&mut self, node: Node) {
        let (range, loc) = self.range(node);
        let raw = node_text(node, self.text);
        let (kind, value) = if let Some(body) = raw.strip_prefix("/*") {
            (CommentKind::Block, body.strip_suffix("*/").unwrap_or(body))
        } else {
            let body = raw
                .strip_prefix("//")
                .or_else(|| raw.strip_prefix("<!--"))
                .or_else(|| raw.strip_prefix("-->"))
                .unwrap_or(raw);
            (CommentKind::Line, body)
        };
        self.comments.push(Comment {
            kind,
            value: value.to_string(),
            range,
            loc,
        });
    }
}

fn is_comment(node: Node) -> bool {
    node.is_named() && matches!(node.kind(), "comment" | "html_comment")
}

fn token_kind(node: Node) -> TokenKind {
    let kind = node.kind();
    if !node.is_named() {
        return match kind {
            "`" => TokenKind::Template,
            _ if kind.starts_with(|c: char| c.is_ascii_alphabetic()) => TokenKind::Keyword,
            _ => TokenKind::Punctuator,
        };
    }

    match kind {
        "string" => TokenKind::String,
        "number" => TokenKind::Numeric,
        "regex" => TokenKind::RegularExpression,
        "true" | "false" => TokenKind::Boolean,
        "null" => TokenKind::Null,
        "jsx_text" => TokenKind::JsxText,
        "string_fragment" | "escape_sequence" => TokenKind::Template,
        "undefined" => TokenKind::Identifier,
        _ if kind.ends_with("identifier") => TokenKind::Identifier,
        _ => TokenKind::Keyword,
    }
}
