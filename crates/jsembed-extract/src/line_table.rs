use crate::Position;

/// Line-start index for a specific text buffer.
///
/// Converts byte offsets into [`Position`]s (1-indexed lines, UTF-16 columns)
/// with a binary search over the recorded line starts. Recognized line breaks
/// are `\r\n`, `\r`, `\n`, U+2028 and U+2029.
///
/// The table does not own its text: every conversion takes the buffer the
/// table was built from. Pairing a table with another buffer yields garbage
/// positions, never a panic.
///
/// # Example
///
/// ```
/// use jsembed_extract::{LineTable, Position};
///
/// let source = "line 1\nline 2\nline 3";
/// let table = LineTable::new(source);
///
/// assert_eq!(table.position_of(source, 7), Position::new(2, 0));
/// assert_eq!(table.offset_of(source, Position::new(2, 0)), Some(7));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineTable {
    /// Byte offset of the start of each line; index 0 is always 0
    line_starts: Vec<usize>,
}

impl LineTable {
    /// Build a line table from source text
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        let mut chars = text.char_indices().peekable();

        while let Some((idx, ch)) = chars.next() {
            match ch {
                '\r' => {
                    if let Some(&(next, '\n')) = chars.peek() {
                        chars.next();
                        line_starts.push(next + 1);
                    } else {
                        line_starts.push(idx + 1);
                    }
                }
                '\n' => line_starts.push(idx + 1),
                '\u{2028}' | '\u{2029}' => line_starts.push(idx + ch.len_utf8()),
                _ => {}
            }
        }

        Self { line_starts }
    }

    /// Byte offsets of every line start
    #[must_use]
    pub fn line_starts(&self) -> &[usize] {
        &self.line_starts
    }

    /// Get the number of lines in the indexed text
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Get the byte offset of the start of a 1-indexed line
    #[must_use]
    pub fn line_start(&self, line: usize) -> Option<usize> {
        line.checked_sub(1)
            .and_then(|index| self.line_starts.get(index))
            .copied()
    }

    /// Convert a byte offset to a position.
    ///
    /// Offsets past the end of `text` are clamped to its end, offsets inside
    /// a multi-byte character to the start of that character.
    #[must_use]
    pub fn position_of(&self, text: &str, offset: usize) -> Position {
        let mut offset = offset.min(text.len());
        while offset > 0 && !text.is_char_boundary(offset) {
            offset -= 1;
        }

        let index = match self.line_starts.binary_search(&offset) {
            Ok(index) => index,
            Err(index) => index.saturating_sub(1),
        };

        let line_start = self.line_starts.get(index).copied().unwrap_or(0).min(offset);
        let column = text
            .get(line_start..offset)
            .map_or(offset - line_start, |prefix| prefix.encode_utf16().count());

        Position::new(index + 1, column)
    }

    /// Convert a position back to a byte offset.
    ///
    /// Returns `None` if the line does not exist or the column runs past the
    /// end of its line.
    #[must_use]
    pub fn offset_of(&self, text: &str, position: Position) -> Option<usize> {
        let line_start = self.line_start(position.line)?;
        let rest = text.get(line_start..)?;

        let mut units = 0;
        for (idx, ch) in rest.char_indices() {
            if units == position.column {
                return Some(line_start + idx);
            }
            if is_line_break(ch) || units > position.column {
                return None;
            }
            units += ch.len_utf16();
        }

        (units == position.column).then_some(text.len())
    }

    /// Split `text` into its lines, without line terminators
    #[must_use]
    pub fn lines(&self, text: &str) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.line_starts.len());

        for (index, &start) in self.line_starts.iter().enumerate() {
            let end = self
                .line_starts
                .get(index + 1)
                .copied()
                .unwrap_or(text.len());
            let line = text.get(start..end).unwrap_or("");
            let line = line
                .strip_suffix("\r\n")
                .or_else(|| line.strip_suffix(is_line_break))
                .unwrap_or(line);
            lines.push(line.to_string());
        }

        lines
    }
}

const fn is_line_break(ch: char) -> bool {
    matches!(ch, '\r' | '\n' | '\u{2028}' | '\u{2029}')
}
