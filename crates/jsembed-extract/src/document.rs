use crate::{LineTable, Position};
use std::sync::Arc;

/// The whole host document a set of fragments was extracted from.
///
/// Cloning is cheap: the text, line table and line array are shared by every
/// fragment of the same document, so they are computed once per document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostDocument {
    text: Arc<str>,
    line_table: Arc<LineTable>,
    lines: Arc<[String]>,
}

impl HostDocument {
    #[must_use]
    pub fn new(text: &str) -> Self {
        let line_table = LineTable::new(text);
        let lines = line_table.lines(text);
        Self {
            text: Arc::from(text),
            line_table: Arc::new(line_table),
            lines: Arc::from(lines),
        }
    }

    #[must_use]
    pub fn text(&self) -> &Arc<str> {
        &self.text
    }

    #[must_use]
    pub fn line_table(&self) -> &Arc<LineTable> {
        &self.line_table
    }

    #[must_use]
    pub fn lines(&self) -> &Arc<[String]> {
        &self.lines
    }

    /// Position of a byte offset in the whole document
    #[must_use]
    pub fn position_of(&self, offset: usize) -> Position {
        self.line_table.position_of(&self.text, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_tables() {
        let host = HostDocument::new("<p>\n<script>x</script>\n");
        let other = host.clone();

        assert!(Arc::ptr_eq(host.line_table(), other.line_table()));
        assert!(Arc::ptr_eq(host.lines(), other.lines()));
        assert_eq!(host.lines().len(), 3);
        assert_eq!(host.position_of(12), Position::new(2, 8));
    }
}
