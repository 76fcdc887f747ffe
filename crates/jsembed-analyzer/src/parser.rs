use crate::dialect::{Dialect, DialectOptions, TreeSitterDialect};
use crate::syntax::{ParsedUnit, SourceType};
use crate::ParseFailure;
use jsembed_config::ParserConfig;
use jsembed_extract::Language;
use std::path::Path;

/// Language the caller declares for the text being parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseIntent {
    /// Plain JavaScript; the typed dialect is acceptable but optional
    JavaScript,
    /// TypeScript; no other grammar is acceptable
    TypeScript,
}

impl ParseIntent {
    #[must_use]
    pub fn from_language(language: Language) -> Option<Self> {
        match language {
            Language::JavaScript => Some(Self::JavaScript),
            Language::TypeScript => Some(Self::TypeScript),
            Language::Html | Language::Yaml => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    /// Try the typed dialect first for JavaScript intent
    pub prefer_typed_dialect: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            prefer_typed_dialect: true,
        }
    }
}

impl From<&ParserConfig> for ParserOptions {
    fn from(config: &ParserConfig) -> Self {
        Self {
            prefer_typed_dialect: config.prefer_typescript,
        }
    }
}

/// What a failed strategy means for the whole parse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OnFailure {
    /// Stop and surface this failure
    Fatal,
    /// Log and move on
    Discard,
    /// Move on, surfacing this failure if every later strategy fails too
    Report,
}

struct Strategy<'p> {
    dialect: &'p dyn Dialect,
    options: DialectOptions,
    on_failure: OnFailure,
}

/// Parses JavaScript-family text by trying grammars in order until one
/// accepts it.
///
/// The chain is: the typed dialect (when requested by the intent, the path
/// hint, or [`ParserOptions::prefer_typed_dialect`]), then the general
/// dialect as a module, then as a script. When everything fails the
/// module-mode failure is returned, since module is the preferred mode.
pub struct ResilientParser {
    typed: Box<dyn Dialect>,
    general: Box<dyn Dialect>,
}

impl Default for ResilientParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ResilientParser {
    /// Create a parser over the tree-sitter TypeScript and JavaScript grammars
    #[must_use]
    pub fn new() -> Self {
        Self::with_dialects(TreeSitterDialect::typescript(), TreeSitterDialect::javascript())
    }

    #[must_use]
    pub fn with_dialects(
        typed: impl Dialect + 'static,
        general: impl Dialect + 'static,
    ) -> Self {
        Self {
            typed: Box::new(typed),
            general: Box::new(general),
        }
    }

    pub fn parse(
        &self,
        text: &str,
        file_path_hint: Option<&str>,
        intent: ParseIntent,
        options: &ParserOptions,
    ) -> Result<ParsedUnit, ParseFailure> {
        let path = file_path_hint.unwrap_or("<fragment>");
        let mut reported = None;

        for strategy in self.strategies(file_path_hint, intent, options) {
            tracing::debug!(
                "Parsing {path} with {} parser as {}",
                strategy.dialect.kind(),
                strategy.options.source_type
            );

            let failure = match strategy.dialect.parse(text, &strategy.options) {
                Ok(unit) => return Ok(unit),
                Err(failure) => failure,
            };

            tracing::debug!(
                "Failed to parse {path} with {} parser as {}: {}",
                strategy.dialect.kind(),
                strategy.options.source_type,
                failure.message
            );

            match strategy.on_failure {
                OnFailure::Fatal => return Err(failure),
                OnFailure::Report if reported.is_none() => reported = Some(failure),
                OnFailure::Report | OnFailure::Discard => {}
            }
        }

        Err(reported.unwrap_or_else(|| ParseFailure::new(format!("Failed to parse {path}"))))
    }

    fn strategies(
        &self,
        file_path_hint: Option<&str>,
        intent: ParseIntent,
        options: &ParserOptions,
    ) -> Vec<Strategy<'_>> {
        let extension = file_path_hint
            .and_then(|hint| Path::new(hint).extension())
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        let extension = extension.as_deref();
        let jsx = matches!(extension, Some("jsx" | "tsx"));
        let typed_hint = matches!(extension, Some("ts" | "tsx" | "mts" | "cts"));

        let mut strategies = Vec::with_capacity(3);

        if intent == ParseIntent::TypeScript || typed_hint || options.prefer_typed_dialect {
            strategies.push(Strategy {
                dialect: self.typed.as_ref(),
                options: DialectOptions {
                    source_type: SourceType::Module,
                    jsx,
                },
                on_failure: if intent == ParseIntent::TypeScript {
                    OnFailure::Fatal
                } else {
                    OnFailure::Discard
                },
            });
        }

        for source_type in [SourceType::Module, SourceType::Script] {
            strategies.push(Strategy {
                dialect: self.general.as_ref(),
                options: DialectOptions { source_type, jsx },
                on_failure: OnFailure::Report,
            });
        }

        strategies
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{DialectKind, SyntaxNode};
    use std::sync::{Arc, Mutex};

    type Calls = Arc<Mutex<Vec<(DialectKind, SourceType, bool)>>>;

    /// Dialect that records its calls and fails in the configured modes
    struct Scripted {
        kind: DialectKind,
        fails_in: Vec<SourceType>,
        calls: Calls,
    }

    impl Dialect for Scripted {
        fn kind(&self) -> DialectKind {
            self.kind
        }

        fn parse(&self, text: &str, options: &DialectOptions) -> Result<ParsedUnit, ParseFailure> {
            self.calls
                .lock()
                .unwrap()
                .push((self.kind, options.source_type, options.jsx));
            if self.fails_in.contains(&options.source_type) {
                return Err(ParseFailure::new(format!(
                    "{} failed as {}",
                    self.kind, options.source_type
                )));
            }
            Ok(ParsedUnit::new(
                text,
                SyntaxNode::new("program", None, None),
                self.kind,
                options.source_type,
            ))
        }
    }

    fn scripted(typed_fails: bool, general_fails_in: Vec<SourceType>) -> (ResilientParser, Calls) {
        let calls = Calls::default();
        let typed_fails_in = if typed_fails {
            vec![SourceType::Module, SourceType::Script]
        } else {
            Vec::new()
        };
        let parser = ResilientParser::with_dialects(
            Scripted {
                kind: DialectKind::TypeScript,
                fails_in: typed_fails_in,
                calls: Arc::clone(&calls),
            },
            Scripted {
                kind: DialectKind::JavaScript,
                fails_in: general_fails_in,
                calls: Arc::clone(&calls),
            },
        );
        (parser, calls)
    }

    const NO_TYPED: ParserOptions = ParserOptions {
        prefer_typed_dialect: false,
    };

    #[test]
    fn test_typed_dialect_first_when_preferred() {
        let (parser, calls) = scripted(false, vec![]);
        let unit = parser
            .parse("x", None, ParseIntent::JavaScript, &ParserOptions::default())
            .unwrap();

        assert_eq!(unit.dialect, DialectKind::TypeScript);
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_typed_failure_is_fatal_for_typescript_intent() {
        let (parser, calls) = scripted(true, vec![]);
        let failure = parser
            .parse("x", Some("a.ts"), ParseIntent::TypeScript, &NO_TYPED)
            .unwrap_err();

        assert_eq!(failure.message, "TypeScript failed as module");
        assert_eq!(
            *calls.lock().unwrap(),
            vec![(DialectKind::TypeScript, SourceType::Module, false)]
        );
    }

    #[test]
    fn test_typed_failure_is_swallowed_for_javascript_intent() {
        let (parser, calls) = scripted(true, vec![]);
        let unit = parser
            .parse("x", None, ParseIntent::JavaScript, &ParserOptions::default())
            .unwrap();

        assert_eq!(unit.dialect, DialectKind::JavaScript);
        assert_eq!(unit.source_type, SourceType::Module);
        assert_eq!(calls.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_typed_extension_hint_selects_typed_dialect() {
        let (parser, calls) = scripted(false, vec![]);
        let unit = parser
            .parse("x", Some("src/App.TSX"), ParseIntent::JavaScript, &NO_TYPED)
            .unwrap();

        assert_eq!(unit.dialect, DialectKind::TypeScript);
        assert_eq!(
            *calls.lock().unwrap(),
            vec![(DialectKind::TypeScript, SourceType::Module, true)]
        );
    }

    #[test]
    fn test_general_dialect_only_when_typed_not_requested() {
        let (parser, calls) = scripted(false, vec![]);
        parser
            .parse("x", Some("a.jsx"), ParseIntent::JavaScript, &NO_TYPED)
            .unwrap();

        assert_eq!(
            *calls.lock().unwrap(),
            vec![(DialectKind::JavaScript, SourceType::Module, true)]
        );
    }

    #[test]
    fn test_script_mode_fallback() {
        let (parser, _) = scripted(true, vec![SourceType::Module]);
        let unit = parser
            .parse("x", None, ParseIntent::JavaScript, &ParserOptions::default())
            .unwrap();

        assert_eq!(unit.source_type, SourceType::Script);
    }

    #[test]
    fn test_module_failure_wins_when_everything_fails() {
        let (parser, calls) = scripted(true, vec![SourceType::Module, SourceType::Script]);
        let failure = parser
            .parse("x", None, ParseIntent::JavaScript, &ParserOptions::default())
            .unwrap_err();

        assert_eq!(failure.message, "JavaScript failed as module");
        assert_eq!(calls.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_tree_sitter_chain() {
        let parser = ResilientParser::new();

        let unit = parser
            .parse("with (obj) { x; }", None, ParseIntent::JavaScript, &NO_TYPED)
            .unwrap();
        assert_eq!(unit.source_type, SourceType::Script);

        let failure = parser
            .parse(
                "import x from 'y';\nwith (x) {}",
                None,
                ParseIntent::JavaScript,
                &NO_TYPED,
            )
            .unwrap_err();
        assert_eq!(failure.message, "'with' in strict mode. (2:1)");

        let unit = parser
            .parse(
                "let a: number = 1;",
                None,
                ParseIntent::JavaScript,
                &ParserOptions::default(),
            )
            .unwrap();
        assert_eq!(unit.dialect, DialectKind::TypeScript);

        assert!(parser
            .parse("let a: number = 1;", None, ParseIntent::JavaScript, &NO_TYPED)
            .is_err());
    }

    #[test]
    fn test_options_from_config() {
        let config = ParserConfig {
            prefer_typescript: false,
        };
        assert!(!ParserOptions::from(&config).prefer_typed_dialect);
        assert_eq!(
            ParseIntent::from_language(Language::TypeScript),
            Some(ParseIntent::TypeScript)
        );
        assert_eq!(ParseIntent::from_language(Language::Html), None);
    }
}
