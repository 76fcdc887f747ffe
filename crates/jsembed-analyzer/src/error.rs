use jsembed_extract::Position;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalyzerError>;

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("Configuration error: {0}")]
    Config(#[from] jsembed_config::ConfigError),

    #[error("Extraction error: {0}")]
    Extract(#[from] jsembed_extract::ExtractError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Analysis task failed: {0}")]
    Task(String),
}

/// A parse failure.
///
/// `message` embeds the failure location as `(line:column)` with both parts
/// 1-based, while `position` keeps the column 0-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParseFailure {
    pub message: String,
    pub position: Option<Position>,
    /// Label of the fragment being parsed, if any
    pub fragment_label: Option<String>,
}

impl ParseFailure {
    /// A failure without a known location
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            position: None,
            fragment_label: None,
        }
    }

    /// A failure at `position`, whose message gets the location suffix
    #[must_use]
    pub fn at(description: &str, position: Position) -> Self {
        Self {
            message: format!(
                "{description} ({}:{})",
                position.line,
                position.column + 1
            ),
            position: Some(position),
            fragment_label: None,
        }
    }

    #[must_use]
    pub fn with_fragment_label(mut self, label: Option<String>) -> Self {
        self.fragment_label = label;
        self
    }
}
