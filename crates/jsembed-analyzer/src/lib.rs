mod analysis;
mod batch;
mod builder;
mod diagnostics;
mod dialect;
mod error;
mod parser;
mod patch;
mod remap;
mod rules;
mod syntax;

pub use analysis::{analyze, analyze_embedded, AnalysisInput, AnalysisOutput, Perf};
pub use batch::{analyze_paths, load_batch_config, FileAnalysis};
pub use builder::{build_source_unit, build_source_units, compose_synthetic_path, EmbeddedUnit};
pub use diagnostics::{Finding, IssueLocation, QuickFix, QuickFixEdit};
pub use dialect::{Dialect, DialectOptions, TreeSitterDialect};
pub use error::{AnalyzerError, ParseFailure, Result};
pub use parser::{ParseIntent, ParserOptions, ResilientParser};
pub use patch::{patch_failure_message, patch_parse_failure, patched_line};
pub use remap::{remap_unit, remap_unit_with};
pub use rules::{NoRules, RuleEngine};
pub use syntax::{
    Comment, CommentKind, DialectKind, Loc, ParsedUnit, SourceType, SyntaxNode, Token, TokenKind,
};

// Re-export common types from dependencies
pub use jsembed_config::AnalysisConfig;
pub use jsembed_extract::{Fragment, FragmentFormat, HostDocument, Language, Position, TextRange};
