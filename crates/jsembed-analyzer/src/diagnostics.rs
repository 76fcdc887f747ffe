use crate::syntax::Loc;
use jsembed_extract::Position;
use serde::{Deserialize, Serialize};

/// A span of source with an optional explanation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueLocation {
    /// 1-based
    pub line: usize,
    /// 0-based
    pub column: usize,
    pub end_line: usize,
    pub end_column: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl IssueLocation {
    #[must_use]
    pub fn new(loc: Loc) -> Self {
        Self {
            line: loc.start.line,
            column: loc.start.column,
            end_line: loc.end.line,
            end_column: loc.end.column,
            message: None,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// A single text replacement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickFixEdit {
    pub text: String,
    pub loc: IssueLocation,
}

/// An automatic fix offered for a finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickFix {
    pub message: String,
    pub edits: Vec<QuickFixEdit>,
}

/// A rule violation reported by a rule engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    /// Identifier of the rule (e.g., "no-unused-vars")
    pub rule_id: String,

    /// Start line (1-based)
    pub line: usize,

    /// Start column (0-based)
    pub column: usize,

    pub end_line: usize,
    pub end_column: usize,

    pub message: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quick_fixes: Vec<QuickFix>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secondary_locations: Vec<IssueLocation>,
}

impl Finding {
    pub fn new(rule_id: impl Into<String>, loc: Loc, message: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.into(),
            line: loc.start.line,
            column: loc.start.column,
            end_line: loc.end.line,
            end_column: loc.end.column,
            message: message.into(),
            quick_fixes: Vec::new(),
            secondary_locations: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_quick_fix(mut self, fix: QuickFix) -> Self {
        self.quick_fixes.push(fix);
        self
    }

    #[must_use]
    pub fn with_secondary_location(mut self, location: IssueLocation) -> Self {
        self.secondary_locations.push(location);
        self
    }

    /// Where the finding starts
    #[must_use]
    pub fn start(&self) -> Position {
        Position::new(self.line, self.column)
    }
}
