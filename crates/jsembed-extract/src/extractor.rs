use crate::{html, yaml, ExtractError, Fragment, HostDocument, Language, Result};
use jsembed_config::AnalysisConfig;

/// Configuration for fragment extraction
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Extract inline `<script>` elements from HTML documents
    pub html: bool,

    /// `type` attribute values recognized as JavaScript (lowercase).
    /// Scripts without a `type` attribute are always extracted.
    pub script_types: Vec<String>,

    /// Extract inline Lambda code from YAML templates
    pub yaml: bool,

    /// Prefix of the `Runtime` property marking a JavaScript function
    pub runtime_prefix: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self::from(&AnalysisConfig::default())
    }
}

impl From<&AnalysisConfig> for ExtractConfig {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            html: config.html.enabled,
            script_types: config
                .html
                .script_types
                .iter()
                .map(|t| t.trim().to_ascii_lowercase())
                .collect(),
            yaml: config.yaml.enabled,
            runtime_prefix: config.yaml.runtime_prefix.clone(),
        }
    }
}

impl ExtractConfig {
    pub(crate) fn is_script_type(&self, value: &str) -> bool {
        let value = value.trim().to_ascii_lowercase();
        value.is_empty() || self.script_types.iter().any(|t| *t == value)
    }
}

/// Extract the embedded code fragments of a host document, in document order
pub fn extract_from_source(
    source: &str,
    language: Language,
    config: &ExtractConfig,
) -> Result<Vec<Fragment>> {
    let fragments = match language {
        Language::Html if config.html => html::scan(&HostDocument::new(source), config),
        Language::Yaml if config.yaml => yaml::scan(&HostDocument::new(source), config),
        Language::Html | Language::Yaml => Vec::new(),
        Language::JavaScript | Language::TypeScript => {
            return Err(ExtractError::UnsupportedLanguage(language))
        }
    };

    tracing::debug!(
        language = ?language,
        count = fragments.len(),
        "Extracted embedded fragments"
    );

    Ok(fragments)
}
