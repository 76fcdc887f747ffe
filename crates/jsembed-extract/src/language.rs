use std::path::Path;

/// Languages of analyzable files
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Language {
    /// JavaScript (.js, .jsx, .mjs, .cjs)
    JavaScript,
    /// TypeScript (.ts, .tsx, .mts, .cts)
    TypeScript,
    /// HTML documents with inline scripts (.html, .htm)
    Html,
    /// CloudFormation / SAM templates with inline Lambda code (.yaml, .yml)
    Yaml,
}

impl Language {
    /// Detect language from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();

        match extension.as_str() {
            "js" | "jsx" | "mjs" | "cjs" => Some(Self::JavaScript),
            "ts" | "tsx" | "mts" | "cts" => Some(Self::TypeScript),
            "html" | "htm" => Some(Self::Html),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }

    /// Check if code must be extracted from this language before parsing
    pub fn is_embedding_host(&self) -> bool {
        matches!(self, Self::Html | Self::Yaml)
    }

    /// Check if this language is TypeScript/JavaScript
    pub fn is_js_family(&self) -> bool {
        matches!(self, Self::TypeScript | Self::JavaScript)
    }
}
