use crate::syntax::ParsedUnit;
use crate::Finding;

/// Evaluates lint rules over a parsed unit.
///
/// Implementations see the whole host text through the unit, and must
/// report findings in the unit's coordinates.
pub trait RuleEngine: Send + Sync {
    /// Run the rules on `unit`, reported under `file_path`
    fn lint(&self, unit: &ParsedUnit, file_path: &str) -> Vec<Finding>;
}

impl<F> RuleEngine for F
where
    F: Fn(&ParsedUnit, &str) -> Vec<Finding> + Send + Sync,
{
    fn lint(&self, unit: &ParsedUnit, file_path: &str) -> Vec<Finding> {
        self(unit, file_path)
    }
}

/// Engine reporting nothing, for parse-only runs
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRules;

impl RuleEngine for NoRules {
    fn lint(&self, _unit: &ParsedUnit, _file_path: &str) -> Vec<Finding> {
        Vec::new()
    }
}
