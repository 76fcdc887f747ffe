use crate::ParseFailure;
use jsembed_extract::{Fragment, FragmentFormat, LineTable, Position};
use once_cell::sync::Lazy;
use regex::Regex;

/// `(line:column)` location suffix of parser messages
static MESSAGE_LOCATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\((?<line>\d+):(?<column>\d+)\)").expect("valid location regex"));

/// Translate a fragment-relative parse failure to host coordinates.
///
/// Builds a new failure; `failure` is left as is. The fragment label is
/// attached so the failure can be traced back to its logical unit.
///
/// `position` is the location to trust. The `(line:column)` of the message
/// keeps the parser's convention: its column is only shifted by the anchor
/// column for plain fragments, so it can disagree with `position.column`.
#[must_use]
pub fn patch_parse_failure(failure: &ParseFailure, fragment: &Fragment) -> ParseFailure {
    let mut patched = failure
        .clone()
        .with_fragment_label(fragment.label.clone());

    if let Some(position) = failure.position {
        let position = host_position(position, fragment);
        patched.message = patch_failure_message(&failure.message, position.line, fragment);
        patched.position = Some(position);
    }

    patched
}

/// Host line of a fragment-relative failure line
#[must_use]
pub fn patched_line(line: usize, fragment: &Fragment) -> usize {
    let anchor = fragment.anchor_position.line;
    match fragment.format {
        // failures in plain fragments are reported on the anchor line
        FragmentFormat::Plain => anchor,
        // content starts on the line below the block header
        FragmentFormat::TemplateInterpolated => anchor + line,
        FragmentFormat::Other => (anchor + line).saturating_sub(1),
    }
}

fn host_position(position: Position, fragment: &Fragment) -> Position {
    let line = patched_line(position.line, fragment);
    match fragment.format {
        FragmentFormat::Plain if position.line == 1 => {
            Position::new(line, fragment.anchor_position.column + position.column)
        }
        FragmentFormat::Plain => fragment.anchor_position,
        FragmentFormat::TemplateInterpolated => Position::new(line, position.column),
        // decoded text: go through the fragment's offsets
        FragmentFormat::Other => LineTable::new(&fragment.text)
            .offset_of(&fragment.text, position)
            .map_or(Position::new(line, position.column), |offset| {
                fragment.host.position_of(fragment.host_offset(offset))
            }),
    }
}

/// Rewrite the first `(line:column)` location of a parser message.
///
/// The line is replaced by `patched_line`. For plain fragments the 1-based
/// column is shifted by the anchor column; other formats keep it.
#[must_use]
pub fn patch_failure_message(message: &str, patched_line: usize, fragment: &Fragment) -> String {
    let Some(captures) = MESSAGE_LOCATION.captures(message) else {
        return message.to_string();
    };
    let (Some(location), Ok(column)) = (captures.get(0), captures["column"].parse::<usize>())
    else {
        return message.to_string();
    };

    let column = match fragment.format {
        FragmentFormat::Plain => (column + fragment.anchor_position.column).saturating_sub(1),
        FragmentFormat::TemplateInterpolated | FragmentFormat::Other => column,
    };

    format!(
        "{}({patched_line}:{column}){}",
        &message[..location.start()],
        &message[location.end()..]
    )
}
