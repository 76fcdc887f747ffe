use crate::builder::{build_source_units, EmbeddedUnit};
use crate::parser::{ParseIntent, ParserOptions, ResilientParser};
use crate::{Finding, ParseFailure, Result, RuleEngine};
use jsembed_config::AnalysisConfig;
use jsembed_extract::{extract_from_source, ExtractConfig, Language};
use std::time::{Duration, Instant};

/// A document to analyze
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisInput {
    pub file_path: String,
    pub file_content: String,
    pub language: Language,
}

impl AnalysisInput {
    pub fn new(
        file_path: impl Into<String>,
        file_content: impl Into<String>,
        language: Language,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            file_content: file_content.into(),
            language,
        }
    }
}

/// Time spent in each phase of an analysis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Perf {
    /// Extraction and parsing
    pub parse_time: Duration,
    /// Rule evaluation
    pub analysis_time: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct AnalysisOutput {
    pub issues: Vec<Finding>,
    /// One entry per document or fragment that could not be parsed
    pub parsing_errors: Vec<ParseFailure>,
    pub perf: Perf,
}

/// Analyze a document of any supported language.
///
/// Embedding hosts go through [`analyze_embedded`]; JavaScript and
/// TypeScript files are parsed whole and linted under their own path.
pub fn analyze(
    input: &AnalysisInput,
    config: &AnalysisConfig,
    engine: &dyn RuleEngine,
) -> Result<AnalysisOutput> {
    let Some(intent) = ParseIntent::from_language(input.language) else {
        return analyze_embedded(input, config, engine);
    };

    tracing::debug!(path = %input.file_path, "Analyzing file");

    let parser = ResilientParser::new();
    let options = ParserOptions::from(&config.parser);
    let (parsed, parse_time) = measure_duration(|| {
        parser.parse(&input.file_content, Some(&input.file_path), intent, &options)
    });

    let mut output = AnalysisOutput::default();
    output.perf.parse_time = parse_time;

    match parsed {
        Ok(unit) => {
            let (issues, analysis_time) =
                measure_duration(|| engine.lint(&unit, &input.file_path));
            output.issues = issues;
            output.perf.analysis_time = analysis_time;
        }
        Err(failure) => {
            tracing::debug!(path = %input.file_path, "Parse failure: {}", failure.message);
            output.parsing_errors.push(failure);
        }
    }

    Ok(output)
}

/// Analyze the code embedded in an HTML or YAML document.
///
/// Every fragment is parsed, positioned in the host and linted under its
/// synthetic path. Findings outside the fragment's own code are dropped,
/// since rules see the whole host text. Fragments failing to parse are
/// reported in `parsing_errors` and do not stop the others.
pub fn analyze_embedded(
    input: &AnalysisInput,
    config: &AnalysisConfig,
    engine: &dyn RuleEngine,
) -> Result<AnalysisOutput> {
    tracing::debug!(path = %input.file_path, "Analyzing embedded code");

    let parser = ResilientParser::new();
    let options = ParserOptions::from(&config.parser);
    let (built, parse_time) = measure_duration(|| -> Result<_> {
        let fragments = extract_from_source(
            &input.file_content,
            input.language,
            &ExtractConfig::from(config),
        )?;
        Ok(build_source_units(
            &input.file_path,
            &fragments,
            &parser,
            &options,
        ))
    });

    let mut units = Vec::new();
    let mut parsing_errors = Vec::new();
    for result in built? {
        match result {
            Ok(unit) => units.push(unit),
            Err(failure) => {
                tracing::debug!(
                    path = %input.file_path,
                    fragment = ?failure.fragment_label,
                    "Parse failure: {}",
                    failure.message
                );
                parsing_errors.push(failure);
            }
        }
    }

    let (issues, analysis_time) = measure_duration(|| {
        units
            .iter()
            .flat_map(|embedded| {
                let issues = engine.lint(&embedded.unit, &embedded.synthetic_path);
                remove_non_js_issues(embedded, issues)
            })
            .collect()
    });

    Ok(AnalysisOutput {
        issues,
        parsing_errors,
        perf: Perf {
            parse_time,
            analysis_time,
        },
    })
}

/// Keep the findings starting inside the fragment's syntax tree
fn remove_non_js_issues(embedded: &EmbeddedUnit, issues: Vec<Finding>) -> Vec<Finding> {
    let unit = &embedded.unit;
    let extent = unit.tree.range.unwrap_or(embedded.fragment_range);

    issues
        .into_iter()
        .filter(|issue| {
            unit.line_table
                .offset_of(&unit.text, issue.start())
                .is_some_and(|offset| extent.start <= offset && offset <= extent.end)
        })
        .collect()
}

fn measure_duration<T>(f: impl FnOnce() -> T) -> (T, Duration) {
    let start = Instant::now();
    let result = f();
    (result, start.elapsed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{Loc, ParsedUnit};
    use jsembed_extract::Position;

    /// Reports one finding per identifier token, and one at the very start of the text
    fn identifiers(unit: &ParsedUnit, _path: &str) -> Vec<Finding> {
        let mut findings: Vec<_> = unit
            .tokens
            .iter()
            .filter(|t| t.kind == crate::syntax::TokenKind::Identifier)
            .map(|t| Finding::new("ident", t.loc, t.value.clone()))
            .collect();
        findings.push(Finding::new(
            "file-start",
            Loc::new(Position::new(1, 0), Position::new(1, 0)),
            "start",
        ));
        findings
    }

    #[test]
    fn test_issues_outside_fragments_are_dropped() {
        let input = AnalysisInput::new(
            "page.html",
            "<p>\n<script>\nfoo();\n</script>\n",
            Language::Html,
        );
        let output = analyze(&input, &AnalysisConfig::default(), &identifiers).unwrap();

        assert!(output.parsing_errors.is_empty());
        assert_eq!(output.issues.len(), 1);
        assert_eq!(output.issues[0].message, "foo");
        assert_eq!(output.issues[0].start(), Position::new(3, 0));
    }

    #[test]
    fn test_standalone_file_is_not_filtered() {
        let input = AnalysisInput::new("a.js", "foo();", Language::JavaScript);
        let output = analyze(&input, &AnalysisConfig::default(), &identifiers).unwrap();

        let rules: Vec<_> = output.issues.iter().map(|i| i.rule_id.as_str()).collect();
        assert_eq!(rules, vec!["ident", "file-start"]);
    }

    #[test]
    fn test_standalone_parse_failure() {
        let input = AnalysisInput::new("a.ts", "let = ;", Language::TypeScript);
        let output = analyze(&input, &AnalysisConfig::default(), &identifiers).unwrap();

        assert!(output.issues.is_empty());
        assert_eq!(output.parsing_errors.len(), 1);
        assert!(output.parsing_errors[0].position.is_some());
    }

    #[test]
    fn test_disabled_host_yields_empty_output() {
        let mut config = AnalysisConfig::default();
        config.html.enabled = false;

        let input = AnalysisInput::new("page.html", "<script>foo()</script>", Language::Html);
        let output = analyze_embedded(&input, &config, &identifiers).unwrap();

        assert!(output.issues.is_empty());
        assert!(output.parsing_errors.is_empty());
    }

    #[test]
    fn test_configured_script_types_are_normalized() {
        let mut config = AnalysisConfig::default();
        config.html.script_types = vec![" Text/Babel ".to_string()];

        let input = AnalysisInput::new(
            "page.html",
            "<script type=\"text/babel\">foo()</script>",
            Language::Html,
        );
        let output = analyze_embedded(&input, &config, &identifiers).unwrap();
        assert_eq!(output.issues.len(), 1);
    }

    #[test]
    fn test_standalone_language_is_rejected_by_embedded_analysis() {
        let input = AnalysisInput::new("a.js", "foo();", Language::JavaScript);
        assert!(analyze_embedded(&input, &AnalysisConfig::default(), &identifiers).is_err());
    }
}
