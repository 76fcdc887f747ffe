//! Rewrites a fragment's parsed unit into host-document coordinates.
//!
//! Fragment text is usually a contiguous slice of the host text starting at
//! the anchor offset, so every range shifts by that offset. Decoded fragments
//! map their ranges through the fragment's offset table instead. Line and column
//! positions are not additive (a fragment line break restarts the column),
//! so they are recomputed from the shifted ranges through the host line
//! table.

use crate::syntax::{Comment, Loc, ParsedUnit, SyntaxNode, Token};
use jsembed_extract::{HostDocument, TextRange};
use std::sync::Arc;

/// Build a copy of `unit` positioned in `host`.
///
/// Ranges are shifted by `anchor_offset` and locations recomputed; nodes
/// without a range are carried over unchanged. The result shares the host's
/// text, line table and lines. `unit` is left untouched.
#[must_use]
pub fn remap_unit(unit: &ParsedUnit, anchor_offset: usize, host: &HostDocument) -> ParsedUnit {
    remap_unit_with(unit, host, |range| range.shift(anchor_offset))
}

/// Build a copy of `unit` positioned in `host`, translating each range with
/// `host_range`.
#[must_use]
pub fn remap_unit_with(
    unit: &ParsedUnit,
    host: &HostDocument,
    host_range: impl Fn(TextRange) -> TextRange,
) -> ParsedUnit {
    let remapper = Remapper {
        host_range: &host_range,
        host,
    };

    ParsedUnit {
        tree: remapper.node(&unit.tree),
        tokens: unit.tokens.iter().map(|t| remapper.token(t)).collect(),
        comments: unit.comments.iter().map(|c| remapper.comment(c)).collect(),
        text: Arc::clone(host.text()),
        line_table: Arc::clone(host.line_table()),
        lines: Arc::clone(host.lines()),
        dialect: unit.dialect,
        source_type: unit.source_type,
    }
}

struct Remapper<'h> {
    host_range: &'h dyn Fn(TextRange) -> TextRange,
    host: &'h HostDocument,
}

impl Remapper<'_> {
    fn shift(&self, range: TextRange) -> (TextRange, Loc) {
        let range = (self.host_range)(range);
        let loc = Loc::new(
            self.host.position_of(range.start),
            self.host.position_of(range.end),
        );
        (range, loc)
    }

    fn node(&self, node: &SyntaxNode) -> SyntaxNode {
        let (range, loc) = match node.range {
            Some(range) => {
                let (range, loc) = self.shift(range);
                (Some(range), node.loc.map(|_| loc))
            }
            None => (None, node.loc),
        };

        SyntaxNode {
            kind: node.kind.clone(),
            range,
            loc,
            children: node.children.iter().map(|child| self.node(child)).collect(),
        }
    }

    fn token(&self, token: &Token) -> Token {
        let (range, loc) = self.shift(token.range);
        Token {
            kind: token.kind,
            value: token.value.clone(),
            range,
            loc,
        }
    }

    fn comment(&self, comment: &Comment) -> Comment {
        let (range, loc) = self.shift(comment.range);
        Comment {
            kind: comment.kind,
            value: comment.value.clone(),
            range,
            loc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{CommentKind, DialectKind, SourceType, TokenKind};
    use jsembed_extract::Position;

    /// `a;\n  b;` parsed by hand
    fn fragment_unit() -> ParsedUnit {
        let text = "a;\n  b;";
        let unit = ParsedUnit::new(
            text,
            SyntaxNode::new("program", None, None),
            DialectKind::JavaScript,
            SourceType::Script,
        );
        let node = |kind: &str, start: usize, end: usize| {
            let range = TextRange::new(start, end);
            SyntaxNode::new(kind, Some(range), Some(unit.loc_of(range)))
        };
        let tree = node("program", 0, 7).with_children(vec![
            node("expression_statement", 0, 2).with_children(vec![node("identifier", 0, 1)]),
            node("expression_statement", 5, 7).with_children(vec![
                node("identifier", 5, 6),
                SyntaxNode::new("synthetic", None, None),
            ]),
        ]);
        let tokens = vec![Token {
            kind: TokenKind::Identifier,
            value: "b".to_string(),
            range: TextRange::new(5, 6),
            loc: unit.loc_of(TextRange::new(5, 6)),
        }];
        let comments = vec![Comment {
            kind: CommentKind::Block,
            value: String::new(),
            range: TextRange::new(2, 3),
            loc: unit.loc_of(TextRange::new(2, 3)),
        }];

        ParsedUnit { tree, ..unit }
            .with_tokens(tokens)
            .with_comments(comments)
    }

    #[test]
    fn test_ranges_shift_and_locations_follow_host_lines() {
        let host = HostDocument::new("<p>\n<script>a;\n  b;</script>\n");
        let unit = fragment_unit();
        let remapped = remap_unit(&unit, 12, &host);

        assert_eq!(remapped.tree.range, Some(TextRange::new(12, 19)));
        assert_eq!(
            remapped.tree.loc,
            Some(Loc::new(Position::new(2, 8), Position::new(3, 4)))
        );

        let b = &remapped.tree.children[1].children[0];
        assert_eq!(b.range, Some(TextRange::new(17, 18)));
        assert_eq!(b.loc.map(|l| l.start), Some(Position::new(3, 2)));
        assert_eq!(
            remapped.slice(TextRange::new(17, 18)),
            Some("b"),
            "remapped ranges index the host text"
        );

        assert_eq!(remapped.tokens[0].range, TextRange::new(17, 18));
        assert_eq!(remapped.tokens[0].loc.start, Position::new(3, 2));
        assert_eq!(remapped.comments[0].range, TextRange::new(14, 15));
    }

    #[test]
    fn test_nodes_without_range_are_untouched() {
        let host = HostDocument::new("<p>\n<script>a;\n  b;</script>\n");
        let remapped = remap_unit(&fragment_unit(), 12, &host);

        let synthetic = &remapped.tree.children[1].children[1];
        assert_eq!(synthetic.range, None);
        assert_eq!(synthetic.loc, None);
    }

    #[test]
    fn test_original_unit_is_not_modified() {
        let host = HostDocument::new("<p>\n<script>a;\n  b;</script>\n");
        let unit = fragment_unit();
        let before = unit.clone();

        let remapped = remap_unit(&unit, 12, &host);

        assert_eq!(unit, before);
        assert_ne!(remapped.tree, unit.tree);
        assert!(Arc::ptr_eq(&remapped.text, host.text()));
        assert!(Arc::ptr_eq(&remapped.line_table, host.line_table()));
        assert!(Arc::ptr_eq(&remapped.lines, host.lines()));
    }

    #[test]
    fn test_remap_through_offset_table() {
        // the escaped `\n` of the host decodes to a line break
        let host = HostDocument::new("x: \"a;\\n  b;\"\n");
        let table = [4, 5, 6, 8, 9, 10, 11, 12];
        let remapped = remap_unit_with(&fragment_unit(), &host, |range| {
            TextRange::new(table[range.start], table[range.end])
        });

        assert_eq!(remapped.tree.range, Some(TextRange::new(4, 12)));
        assert_eq!(remapped.tokens[0].range, TextRange::new(10, 11));
        assert_eq!(remapped.tokens[0].loc.start, Position::new(1, 10));
        assert_eq!(remapped.slice(remapped.tokens[0].range), Some("b"));
        assert_eq!(remapped.comments[0].range, TextRange::new(6, 8));
    }

    #[test]
    fn test_identity_remap() {
        let unit = fragment_unit();
        let host = HostDocument::new(&unit.text);
        let remapped = remap_unit(&unit, 0, &host);

        assert_eq!(remapped.tree, unit.tree);
        assert_eq!(remapped.tokens, unit.tokens);
        assert_eq!(remapped.comments, unit.comments);
    }
}
