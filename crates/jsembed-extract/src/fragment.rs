use crate::{HostDocument, Position, TextRange};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How a fragment's text sits in its host document.
///
/// Governs how parse error positions are translated back to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FragmentFormat {
    /// Text starts at the anchor, possibly mid-line (HTML scripts, plain YAML scalars)
    Plain,
    /// Block content starting on the line below the anchor (YAML `|` / `>` scalars)
    TemplateInterpolated,
    /// Any other inline form (quoted YAML scalars)
    Other,
}

/// A contiguous slice of embedded code located inside a host document.
///
/// Created by the scanners, immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// The embedded code: a raw slice of the host text, or the decoded
    /// value of an escaped region when `offsets` is set
    pub text: String,

    /// Byte offset in the host document where `text` begins
    pub anchor_offset: usize,

    /// Host position of the anchor.
    ///
    /// For [`FragmentFormat::TemplateInterpolated`] this is the block header,
    /// the content starting on the following line.
    pub anchor_position: Position,

    /// The document the fragment was extracted from
    pub host: HostDocument,

    pub format: FragmentFormat,

    /// Name of the logical unit holding the code (e.g. a function resource)
    pub label: Option<String>,

    /// Host offset of every byte of a decoded `text`, plus one entry for its end
    pub offsets: Option<Arc<[usize]>>,
}

impl Fragment {
    /// Create a fragment whose anchor is the position of its first byte
    #[must_use]
    pub fn new(host: &HostDocument, range: TextRange, format: FragmentFormat) -> Self {
        let text = host
            .text()
            .get(range.start..range.end)
            .unwrap_or_default()
            .to_string();

        Self {
            text,
            anchor_offset: range.start,
            anchor_position: host.position_of(range.start),
            host: host.clone(),
            format,
            label: None,
            offsets: None,
        }
    }

    /// Create a fragment whose text was decoded from the host `range`.
    ///
    /// `offsets` holds, for each byte of `text` and for its end, the host
    /// offset of the source it was decoded from.
    #[must_use]
    pub fn decoded(
        host: &HostDocument,
        range: TextRange,
        text: String,
        offsets: Vec<usize>,
        format: FragmentFormat,
    ) -> Self {
        debug_assert_eq!(offsets.len(), text.len() + 1);
        Self {
            text,
            anchor_offset: range.start,
            anchor_position: host.position_of(range.start),
            host: host.clone(),
            format,
            label: None,
            offsets: Some(offsets.into()),
        }
    }

    #[must_use]
    pub fn with_anchor_position(mut self, position: Position) -> Self {
        self.anchor_position = position;
        self
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Host offset of a byte offset into `text`
    #[must_use]
    pub fn host_offset(&self, offset: usize) -> usize {
        match &self.offsets {
            Some(offsets) => offsets
                .get(offset)
                .or_else(|| offsets.last())
                .copied()
                .unwrap_or(self.anchor_offset),
            None => self.anchor_offset + offset,
        }
    }

    /// Host range of a range of `text`
    #[must_use]
    pub fn host_range_of(&self, range: TextRange) -> TextRange {
        TextRange::new(self.host_offset(range.start), self.host_offset(range.end))
    }

    /// Byte range of the fragment in the host document
    #[must_use]
    pub fn host_range(&self) -> TextRange {
        self.host_range_of(TextRange::new(0, self.text.len()))
    }
}
