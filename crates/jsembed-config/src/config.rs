use serde::{Deserialize, Serialize};

/// `type` attribute values of `<script>` elements that hold JavaScript.
const DEFAULT_SCRIPT_TYPES: &[&str] = &[
    "text/javascript",
    "application/javascript",
    "text/ecmascript",
    "application/ecmascript",
    "module",
];

/// Top-level analysis configuration.
///
/// Loaded once before any document is processed and treated as read-only
/// for the duration of a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisConfig {
    /// Dialect selection for the resilient parser
    pub parser: ParserConfig,

    /// Inline `<script>` extraction from HTML documents
    pub html: HtmlConfig,

    /// Inline Lambda code extraction from CloudFormation / SAM templates
    pub yaml: YamlConfig,

    /// File patterns to include in batch runs (empty means everything supported)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,

    /// File patterns to exclude from batch runs
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
}

/// Parser configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParserConfig {
    /// Try the TypeScript dialect first for plain JavaScript inputs
    pub prefer_typescript: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            prefer_typescript: true,
        }
    }
}

/// HTML host configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HtmlConfig {
    pub enabled: bool,

    /// Accepted values of the `type` attribute (compared lowercase).
    /// A script without a `type` attribute is always JavaScript.
    pub script_types: Vec<String>,
}

impl Default for HtmlConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            script_types: DEFAULT_SCRIPT_TYPES
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

/// YAML host configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct YamlConfig {
    pub enabled: bool,

    /// Prefix of the Lambda `Runtime` property that marks JavaScript code
    pub runtime_prefix: String,
}

impl Default for YamlConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            runtime_prefix: "nodejs".to_string(),
        }
    }
}
