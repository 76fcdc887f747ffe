//! Inline Lambda code extraction from CloudFormation / SAM templates.
//!
//! The scanner works line by line on the block structure of the template:
//! `Resources` → resource → `Properties` → code property. Flow collections
//! and anchors are not interpreted; templates holding inline code in those
//! forms produce no fragments.

use crate::{ExtractConfig, Fragment, FragmentFormat, HostDocument, TextRange};

const SERVERLESS_FUNCTION: &str = "AWS::Serverless::Function";
const LAMBDA_FUNCTION: &str = "AWS::Lambda::Function";

/// A `key: value` line of a block mapping
#[derive(Debug, Clone, Copy)]
struct Entry<'a> {
    /// Line index (0-based)
    line: usize,
    indent: usize,
    key: &'a str,
    value: &'a str,
    /// Byte column of `value` within the line
    value_column: usize,
}

struct Template<'a> {
    host: &'a HostDocument,
    lines: &'a [String],
    line_starts: &'a [usize],
}

pub(crate) fn scan(host: &HostDocument, config: &ExtractConfig) -> Vec<Fragment> {
    let template = Template {
        host,
        lines: host.lines(),
        line_starts: host.line_table().line_starts(),
    };
    template.functions(config)
}

impl<'a> Template<'a> {
    fn functions(&self, config: &ExtractConfig) -> Vec<Fragment> {
        let top_level = self.entries(0, self.lines.len(), 0);

        let Some(resources) = find(&top_level, "Resources") else {
            return Vec::new();
        };

        let global_runtime = find(&top_level, "Globals")
            .and_then(|globals| find(&self.children(globals), "Function").copied())
            .and_then(|function| find(&self.children(&function), "Runtime").copied())
            .map(|runtime| scalar(runtime.value));

        let mut fragments = Vec::new();

        for resource in self.children(resources) {
            let properties = self.children(&resource);
            let Some(kind) = find(&properties, "Type").map(|t| scalar(t.value)) else {
                continue;
            };
            let Some(props) = find(&properties, "Properties").map(|p| self.children(p)) else {
                continue;
            };

            let code = match kind {
                SERVERLESS_FUNCTION => find(&props, "InlineCode").copied(),
                LAMBDA_FUNCTION => find(&props, "Code")
                    .and_then(|code| find(&self.children(code), "ZipFile").copied()),
                _ => continue,
            };
            let Some(code) = code else {
                continue;
            };

            let runtime = find(&props, "Runtime")
                .map(|runtime| scalar(runtime.value))
                .or(global_runtime);
            if !runtime.is_some_and(|runtime| runtime.starts_with(&config.runtime_prefix)) {
                tracing::debug!(
                    resource = resource.key,
                    runtime = ?runtime,
                    "Skipping function with a non-JavaScript runtime"
                );
                continue;
            }

            if let Some(fragment) = self.code_fragment(&code) {
                fragments.push(fragment.with_label(resource.key));
            }
        }

        fragments
    }

    /// Build the fragment for the value of a code property
    fn code_fragment(&self, entry: &Entry<'_>) -> Option<Fragment> {
        let value_offset = self.line_starts[entry.line] + entry.value_column;

        match entry.value.chars().next()? {
            '|' | '>' => {
                let end = self.block_end(entry.line, entry.indent);
                let last = (entry.line + 1..end)
                    .rev()
                    .find(|&line| !self.lines[line].trim().is_empty())?;
                let first = entry.line + 1;

                let range = TextRange::new(
                    self.line_starts[first],
                    self.line_starts[last] + self.lines[last].len(),
                );
                Some(
                    Fragment::new(self.host, range, FragmentFormat::TemplateInterpolated)
                        .with_anchor_position(self.host.position_of(value_offset)),
                )
            }
            quote @ ('"' | '\'') => {
                let inner = closing_quote(&entry.value[1..], quote)?;
                let start = value_offset + 1;
                let range = TextRange::new(start, start + inner);
                let raw = &entry.value[1..=inner];

                let Some((text, offsets)) = unquote(raw, quote) else {
                    tracing::debug!(
                        line = entry.line + 1,
                        "Skipping quoted code with an unsupported escape"
                    );
                    return None;
                };
                if text == raw {
                    return Some(Fragment::new(self.host, range, FragmentFormat::Other));
                }
                let offsets = offsets.into_iter().map(|offset| start + offset).collect();
                Some(Fragment::decoded(
                    self.host,
                    range,
                    text,
                    offsets,
                    FragmentFormat::Other,
                ))
            }
            _ => {
                let code = strip_comment(entry.value);
                Some(Fragment::new(
                    self.host,
                    TextRange::new(value_offset, value_offset + code.len()),
                    FragmentFormat::Plain,
                ))
            }
        }
    }

    /// Nested mapping entries of `parent`
    fn children(&self, parent: &Entry<'_>) -> Vec<Entry<'a>> {
        let end = self.block_end(parent.line, parent.indent);
        let Some(indent) = (parent.line + 1..end)
            .find(|&line| !is_blank(&self.lines[line]))
            .map(|line| indent_of(&self.lines[line]))
        else {
            return Vec::new();
        };
        self.entries(parent.line + 1, end, indent)
    }

    /// Entries at exactly `indent` within lines `[from, to)`
    fn entries(&self, from: usize, to: usize, indent: usize) -> Vec<Entry<'a>> {
        (from..to)
            .filter(|&line| !is_blank(&self.lines[line]))
            .filter(|&line| indent_of(&self.lines[line]) == indent)
            .filter_map(|line| entry(line, &self.lines[line]))
            .collect()
    }

    /// Index of the first line after `line` that closes its block
    fn block_end(&self, line: usize, indent: usize) -> usize {
        (line + 1..self.lines.len())
            .find(|&next| !is_blank(&self.lines[next]) && indent_of(&self.lines[next]) <= indent)
            .unwrap_or(self.lines.len())
    }
}

fn find<'e, 'a>(entries: &'e [Entry<'a>], key: &str) -> Option<&'e Entry<'a>> {
    entries.iter().find(|entry| entry.key == key)
}

fn entry(line: usize, text: &str) -> Option<Entry<'_>> {
    let indent = indent_of(text);
    let rest = &text[indent..];

    let (key, after_key) = match rest.chars().next()? {
        quote @ ('"' | '\'') => {
            let len = closing_quote(&rest[1..], quote)?;
            (&rest[1..=len], len + 2)
        }
        _ => {
            let colon = rest
                .match_indices(':')
                .map(|(idx, _)| idx)
                .find(|&idx| matches!(rest.as_bytes().get(idx + 1), None | Some(b' ' | b'\t')))?;
            (rest[..colon].trim_end(), colon)
        }
    };

    let after_colon = rest[after_key..].strip_prefix(':')?;
    let value = after_colon.trim_start();
    let value_column = text.len() - value.len();

    Some(Entry {
        line,
        indent,
        key,
        value,
        value_column,
    })
}

/// Length of a quoted scalar body, `text` starting right after the opening quote
fn closing_quote(text: &str, quote: char) -> Option<usize> {
    let mut chars = text.char_indices().peekable();
    while let Some((idx, ch)) = chars.next() {
        match ch {
            '\\' if quote == '"' => {
                chars.next();
            }
            '\'' if quote == '\'' => {
                if chars.peek().is_some_and(|&(_, next)| next == '\'') {
                    chars.next();
                } else {
                    return Some(idx);
                }
            }
            '"' if quote == '"' => return Some(idx),
            _ => {}
        }
    }
    None
}

/// Decode the body of a quoted scalar.
///
/// Returns the value along with the offset in `raw` of the source of each
/// value byte, plus `raw.len()` for the end. `None` for an escape this
/// decoder does not know.
fn unquote(raw: &str, quote: char) -> Option<(String, Vec<usize>)> {
    let mut text = String::with_capacity(raw.len());
    let mut offsets = Vec::with_capacity(raw.len() + 1);
    let mut chars = raw.char_indices();

    while let Some((idx, ch)) = chars.next() {
        let decoded = match ch {
            '\'' if quote == '\'' => {
                chars.next();
                '\''
            }
            '\\' if quote == '"' => {
                let (_, escape) = chars.next()?;
                match escape {
                    '0' => '\0',
                    'a' => '\u{07}',
                    'b' => '\u{08}',
                    't' | '\t' => '\t',
                    'n' => '\n',
                    'v' => '\u{0B}',
                    'f' => '\u{0C}',
                    'r' => '\r',
                    'e' => '\u{1B}',
                    ' ' => ' ',
                    '"' => '"',
                    '/' => '/',
                    '\\' => '\\',
                    'N' => '\u{85}',
                    '_' => '\u{A0}',
                    'L' => '\u{2028}',
                    'P' => '\u{2029}',
                    'x' => hex_escape(&mut chars, 2)?,
                    'u' => hex_escape(&mut chars, 4)?,
                    'U' => hex_escape(&mut chars, 8)?,
                    _ => return None,
                }
            }
            _ => ch,
        };
        offsets.extend(std::iter::repeat(idx).take(decoded.len_utf8()));
        text.push(decoded);
    }
    offsets.push(raw.len());

    Some((text, offsets))
}

fn hex_escape(chars: &mut impl Iterator<Item = (usize, char)>, digits: usize) -> Option<char> {
    let mut value = 0;
    for _ in 0..digits {
        value = value * 16 + chars.next()?.1.to_digit(16)?;
    }
    char::from_u32(value)
}

/// Value without its trailing comment
fn strip_comment(value: &str) -> &str {
    let comment = value
        .match_indices('#')
        .map(|(idx, _)| idx)
        .find(|&idx| idx > 0 && matches!(value.as_bytes()[idx - 1], b' ' | b'\t'));
    comment.map_or(value, |idx| &value[..idx]).trim_end()
}

/// Plain value of a scalar: unquoted, without trailing comment
fn scalar(value: &str) -> &str {
    let value = value.trim();
    if let Some(quote) = value.chars().next().filter(|c| matches!(c, '"' | '\'')) {
        if let Some(len) = closing_quote(&value[1..], quote) {
            return &value[1..=len];
        }
    }
    strip_comment(value)
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

fn is_blank(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}
