use crate::{AnalysisConfig, ConfigError, Result};
use std::fs;
use std::path::Path;

/// Extension-less config file name, parsed as YAML first, then JSON
const RC_FILE: &str = ".jsembedrc";

/// Load an analysis config from the specified path.
/// Automatically detects the format based on file extension.
pub fn load_config(path: &Path) -> Result<AnalysisConfig> {
    let contents = fs::read_to_string(path)?;
    load_config_from_str(&contents, path)
}

/// Load an analysis config from a string.
/// The path is used for error messages and format detection.
pub fn load_config_from_str(contents: &str, path: &Path) -> Result<AnalysisConfig> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("");

    let file_name = path.file_name().and_then(|name| name.to_str()).unwrap_or("");

    let config = match extension {
        "yml" | "yaml" => parse_yaml(contents, path)?,
        "json" => parse_json(contents, path)?,
        "" if file_name == RC_FILE => {
            parse_yaml(contents, path).or_else(|_| parse_json(contents, path))?
        }
        _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    };

    validate_config(&config, path)?;

    Ok(config)
}

fn parse_yaml(contents: &str, path: &Path) -> Result<AnalysisConfig> {
    serde_yaml::from_str(contents).map_err(|e| ConfigError::Invalid {
        path: path.to_path_buf(),
        message: format!("YAML parse error: {e}"),
    })
}

fn parse_json(contents: &str, path: &Path) -> Result<AnalysisConfig> {
    serde_json::from_str(contents).map_err(|e| ConfigError::Invalid {
        path: path.to_path_buf(),
        message: format!("JSON parse error: {e}"),
    })
}

/// Validate the loaded configuration
fn validate_config(config: &AnalysisConfig, path: &Path) -> Result<()> {
    let invalid = |message: &str| ConfigError::Invalid {
        path: path.to_path_buf(),
        message: message.to_string(),
    };

    if config.html.enabled && config.html.script_types.is_empty() {
        return Err(invalid("HTML extraction is enabled but has no script types"));
    }

    if config.yaml.enabled && config.yaml.runtime_prefix.trim().is_empty() {
        return Err(invalid("YAML extraction is enabled but has an empty runtime prefix"));
    }

    for pattern in config.include.iter().chain(&config.exclude) {
        if pattern.trim().is_empty() {
            return Err(invalid("File patterns must not be empty"));
        }
    }

    Ok(())
}
