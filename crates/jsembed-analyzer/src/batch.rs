use crate::analysis::{analyze, AnalysisInput, AnalysisOutput};
use crate::{AnalyzerError, Result, RuleEngine};
use jsembed_config::AnalysisConfig;
use jsembed_extract::Language;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// Outcome of analyzing one file of a batch
#[derive(Debug)]
pub struct FileAnalysis {
    pub path: PathBuf,
    pub result: Result<AnalysisOutput>,
}

/// Load the batch configuration, or the defaults when no file is given
pub fn load_batch_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    match path {
        Some(path) => Ok(jsembed_config::load_config(path)?),
        None => Ok(AnalysisConfig::default()),
    }
}

/// Analyze every supported file under `root`.
///
/// Files are selected by the configured `include` patterns (all files when
/// empty) minus the `exclude` patterns. Each file is read asynchronously and
/// analyzed on a blocking worker, in parallel. A file that cannot be read or
/// analyzed fails on its own. Results are sorted by path.
pub async fn analyze_paths(
    root: &Path,
    config: Arc<AnalysisConfig>,
    engine: Arc<dyn RuleEngine>,
) -> Result<Vec<FileAnalysis>> {
    let files = find_files(root, &config)?;
    tracing::info!(root = %root.display(), count = files.len(), "Discovered files");

    let mut handles = Vec::with_capacity(files.len());
    for (path, language) in files {
        let config = Arc::clone(&config);
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            let result = analyze_file(&path, language, config, engine).await;
            FileAnalysis { path, result }
        }));
    }

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        let analysis = handle
            .await
            .map_err(|e| AnalyzerError::Task(e.to_string()))?;
        results.push(analysis);
    }

    results.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(results)
}

async fn analyze_file(
    path: &Path,
    language: Language,
    config: Arc<AnalysisConfig>,
    engine: Arc<dyn RuleEngine>,
) -> Result<AnalysisOutput> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        tracing::warn!(path = %path.display(), "Failed to load file: {e}");
        AnalyzerError::Io(e)
    })?;

    let input = AnalysisInput::new(path.display().to_string(), content, language);
    tokio::task::spawn_blocking(move || analyze(&input, &config, engine.as_ref()))
        .await
        .map_err(|e| AnalyzerError::Task(e.to_string()))?
}

/// Collect the supported files selected by the configuration
fn find_files(root: &Path, config: &AnalysisConfig) -> Result<Vec<(PathBuf, Language)>> {
    let exclude = config
        .exclude
        .iter()
        .flat_map(|pattern| expand_braces(pattern))
        .map(|pattern| glob::Pattern::new(&pattern))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let candidates = if config.include.is_empty() {
        walk(root)
    } else {
        let mut files = Vec::new();
        for pattern in &config.include {
            for expanded in expand_braces(pattern) {
                let full_pattern = root.join(&expanded).display().to_string();
                for entry in glob::glob(&full_pattern)? {
                    match entry {
                        Ok(path) if path.is_file() => {
                            if !files.contains(&path) {
                                files.push(path);
                            }
                        }
                        Ok(_) => {}
                        Err(e) => tracing::warn!("Failed to read glob entry: {e}"),
                    }
                }
            }
        }
        files
    };

    Ok(candidates
        .into_iter()
        .filter(|path| {
            let relative = path.strip_prefix(root).unwrap_or(path);
            !exclude.iter().any(|pattern| pattern.matches_path(relative))
        })
        .filter_map(|path| Language::from_path(&path).map(|language| (path, language)))
        .collect())
}

fn walk(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("Failed to walk directory: {e}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .collect()
}

/// Expand brace patterns like `{html,yaml}` into multiple patterns
fn expand_braces(pattern: &str) -> Vec<String> {
    if let (Some(start), Some(end)) = (pattern.find('{'), pattern.find('}')) {
        if start < end {
            let before = &pattern[..start];
            let after = &pattern[end + 1..];

            return pattern[start + 1..end]
                .split(',')
                .flat_map(|option| expand_braces(&format!("{before}{option}{after}")))
                .collect();
        }
    }

    vec![pattern.to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::NoRules;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_expand_braces() {
        assert_eq!(
            expand_braces("src/**/*.{html,yaml}"),
            vec!["src/**/*.html", "src/**/*.yaml"]
        );
        assert_eq!(
            expand_braces("{a,b}/*.{js,ts}"),
            vec!["a/*.js", "a/*.ts", "b/*.js", "b/*.ts"]
        );
        assert_eq!(expand_braces("*.html"), vec!["*.html"]);
    }

    #[test]
    fn test_find_files_walks_and_filters() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("vendor")).unwrap();
        fs::write(root.join("index.html"), "<script>a()</script>").unwrap();
        fs::write(root.join("README.md"), "# readme").unwrap();
        fs::write(root.join("vendor/lib.js"), "b()").unwrap();

        let files = find_files(root, &AnalysisConfig::default()).unwrap();
        assert_eq!(files.len(), 2);

        let config = AnalysisConfig {
            exclude: vec!["vendor/**".to_string()],
            ..AnalysisConfig::default()
        };
        let files = find_files(root, &config).unwrap();
        assert_eq!(files, vec![(root.join("index.html"), Language::Html)]);
    }

    #[test]
    fn test_find_files_with_include_patterns() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("a.html"), "").unwrap();
        fs::write(root.join("b.yaml"), "").unwrap();
        fs::write(root.join("c.js"), "").unwrap();

        let config = AnalysisConfig {
            include: vec!["*.{html,yaml}".to_string()],
            ..AnalysisConfig::default()
        };
        let mut files = find_files(root, &config).unwrap();
        files.sort();

        assert_eq!(
            files,
            vec![
                (root.join("a.html"), Language::Html),
                (root.join("b.yaml"), Language::Yaml),
            ]
        );
    }

    #[test]
    fn test_invalid_exclude_pattern() {
        let config = AnalysisConfig {
            exclude: vec!["[".to_string()],
            ..AnalysisConfig::default()
        };
        let result = find_files(Path::new("."), &config);
        assert!(matches!(result, Err(AnalyzerError::Pattern(_))));
    }

    #[test]
    fn test_load_batch_config_defaults() {
        let config = load_batch_config(None).unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[tokio::test]
    async fn test_analyze_paths_sorted() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("b.html"), "<script>b(</script>").unwrap();
        fs::write(root.join("a.js"), "a();").unwrap();

        let results = analyze_paths(
            root,
            Arc::new(AnalysisConfig::default()),
            Arc::new(NoRules),
        )
        .await
        .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].path, root.join("a.js"));
        assert_eq!(results[1].path, root.join("b.html"));

        let b = results[1].result.as_ref().unwrap();
        assert_eq!(b.parsing_errors.len(), 1);
    }
}
