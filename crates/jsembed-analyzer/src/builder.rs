use crate::parser::{ParseIntent, ParserOptions, ResilientParser};
use crate::patch::patch_parse_failure;
use crate::remap::remap_unit_with;
use crate::syntax::ParsedUnit;
use crate::ParseFailure;
use jsembed_extract::{Fragment, TextRange};
use std::path::Path;

/// A fragment parsed and positioned in its host document
#[derive(Debug, Clone)]
pub struct EmbeddedUnit {
    pub unit: ParsedUnit,
    /// Path findings for this fragment are reported under
    pub synthetic_path: String,
    /// Byte range of the fragment in the host
    pub fragment_range: TextRange,
}

/// Parse every fragment of a host document, in order.
///
/// Each fragment succeeds or fails on its own: a failure is patched to host
/// coordinates and reported in place without affecting the other fragments.
pub fn build_source_units(
    host_path: &str,
    fragments: &[Fragment],
    parser: &ResilientParser,
    options: &ParserOptions,
) -> Vec<Result<EmbeddedUnit, ParseFailure>> {
    fragments
        .iter()
        .map(|fragment| build_source_unit(host_path, fragment, parser, options))
        .collect()
}

pub fn build_source_unit(
    host_path: &str,
    fragment: &Fragment,
    parser: &ResilientParser,
    options: &ParserOptions,
) -> Result<EmbeddedUnit, ParseFailure> {
    let synthetic_path = compose_synthetic_path(host_path, fragment.label.as_deref());

    // no path hint: the host extension says nothing about the fragment dialect
    let unit = parser
        .parse(&fragment.text, None, ParseIntent::JavaScript, options)
        .map_err(|failure| patch_parse_failure(&failure, fragment))?;

    Ok(EmbeddedUnit {
        unit: remap_unit_with(&unit, &fragment.host, |range| fragment.host_range_of(range)),
        synthetic_path,
        fragment_range: fragment.host_range(),
    })
}

/// Derive a per-fragment path from the host path and the fragment label.
///
/// `dir/name.ext` with label `l` becomes `dir/name-l.ext`; without a label
/// the host path is returned unchanged.
#[must_use]
pub fn compose_synthetic_path(host_path: &str, label: Option<&str>) -> String {
    let Some(label) = label else {
        return host_path.to_string();
    };

    let path = Path::new(host_path);
    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        return host_path.to_string();
    };

    let file_name = match path.extension().and_then(|e| e.to_str()) {
        Some(extension) => format!("{stem}-{label}.{extension}"),
        None => format!("{stem}-{label}"),
    };

    path.with_file_name(file_name).to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsembed_extract::{extract_from_source, ExtractConfig, Language, Position};

    #[test]
    fn test_compose_synthetic_path() {
        assert_eq!(
            compose_synthetic_path("a/b/widget.html", Some("onClick")),
            "a/b/widget-onClick.html"
        );
        assert_eq!(
            compose_synthetic_path("a/b/widget.html", None),
            "a/b/widget.html"
        );
        assert_eq!(
            compose_synthetic_path("template.yaml", Some("Fn")),
            "template-Fn.yaml"
        );
        assert_eq!(compose_synthetic_path("Makefile", Some("x")), "Makefile-x");
    }

    #[test]
    fn test_units_are_positioned_in_host() {
        let source = "<p>\n<script>f(x)</script>\n";
        let fragments = extract_from_source(source, Language::Html, &ExtractConfig::default()).unwrap();

        let units = build_source_units(
            "page.html",
            &fragments,
            &ResilientParser::new(),
            &ParserOptions::default(),
        );

        assert_eq!(units.len(), 1);
        let embedded = units[0].as_ref().unwrap();
        assert_eq!(embedded.synthetic_path, "page.html");
        assert_eq!(embedded.fragment_range, TextRange::new(12, 16));
        assert_eq!(
            embedded.unit.tree.loc.map(|l| l.start),
            Some(Position::new(2, 8))
        );
        assert_eq!(&*embedded.unit.text, source);
    }

    #[test]
    fn test_failure_does_not_stop_other_fragments() {
        let source = "<script>a(</script>\n<script>b()</script>\n";
        let fragments = extract_from_source(source, Language::Html, &ExtractConfig::default()).unwrap();

        let units = build_source_units(
            "page.html",
            &fragments,
            &ResilientParser::new(),
            &ParserOptions::default(),
        );

        assert_eq!(units.len(), 2);
        let failure = units[0].as_ref().unwrap_err();
        assert_eq!(failure.position.map(|p| p.line), Some(1));
        assert!(units[1].is_ok());
    }
}
