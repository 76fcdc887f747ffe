//! Inline `<script>` extraction from HTML documents.
//!
//! The scanner is a small tokenizer that only understands what matters for
//! locating script content: comments, `<script>` start tags with their
//! attributes, and the matching `</script` end tag. Offsets come from the
//! tokenizer itself, so repeated identical snippets keep distinct anchors.

use crate::{ExtractConfig, Fragment, FragmentFormat, HostDocument, TextRange};

const SCRIPT: &str = "script";
const SCRIPT_END: &str = "</script";

/// A parsed `<script ...>` start tag
#[derive(Debug)]
struct StartTag {
    attributes: Vec<(String, Option<String>)>,
    /// Offset right after the closing `>`
    end: usize,
    self_closing: bool,
}

impl StartTag {
    fn attribute(&self, name: &str) -> Option<Option<&str>> {
        self.attributes
            .iter()
            .find(|(attr, _)| attr == name)
            .map(|(_, value)| value.as_deref())
    }

    fn holds_code(&self, config: &ExtractConfig) -> bool {
        if self.attribute("src").is_some() {
            return false;
        }
        match self.attribute("type") {
            Some(value) => config.is_script_type(value.unwrap_or("")),
            None => true,
        }
    }
}

pub(crate) fn scan(host: &HostDocument, config: &ExtractConfig) -> Vec<Fragment> {
    let text: &str = host.text();
    let mut fragments = Vec::new();
    let mut pos = 0;

    while let Some(relative) = text[pos..].find('<') {
        let lt = pos + relative;
        let rest = &text[lt..];

        if rest.starts_with("<!--") {
            pos = rest.find("-->").map_or(text.len(), |end| lt + end + 3);
            continue;
        }

        if !is_script_open(rest) {
            pos = lt + 1;
            continue;
        }

        let Some(tag) = parse_start_tag(text, lt + 1 + SCRIPT.len()) else {
            break;
        };

        if tag.self_closing {
            pos = tag.end;
            continue;
        }

        let content_start = tag.end;
        let content_end = find_ignore_ascii_case(&text[content_start..], SCRIPT_END)
            .map_or(text.len(), |idx| content_start + idx);
        pos = content_end;

        if !tag.holds_code(config) {
            tracing::debug!(offset = lt, "Skipping non-JavaScript script element");
            continue;
        }

        if text[content_start..content_end].trim().is_empty() {
            continue;
        }

        fragments.push(Fragment::new(
            host,
            TextRange::new(content_start, content_end),
            FragmentFormat::Plain,
        ));
    }

    fragments
}

/// Check whether `rest` starts with a `<script` open tag name
fn is_script_open(rest: &str) -> bool {
    let bytes = rest.as_bytes();
    let name_end = 1 + SCRIPT.len();

    bytes.len() > name_end
        && bytes[1..name_end].eq_ignore_ascii_case(SCRIPT.as_bytes())
        && matches!(bytes[name_end], b'>' | b'/' | b' ' | b'\t' | b'\n' | b'\r' | b'\x0c')
}

/// Parse attributes from `start` (right after the tag name) up to the closing `>`.
///
/// Returns `None` when the document ends inside the tag.
fn parse_start_tag(text: &str, start: usize) -> Option<StartTag> {
    let bytes = text.as_bytes();
    let mut attributes = Vec::new();
    let mut i = start;

    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }

        match bytes.get(i)? {
            b'>' => {
                return Some(StartTag {
                    attributes,
                    end: i + 1,
                    self_closing: false,
                })
            }
            b'/' if bytes.get(i + 1) == Some(&b'>') => {
                return Some(StartTag {
                    attributes,
                    end: i + 2,
                    self_closing: true,
                })
            }
            b'/' => {
                i += 1;
                continue;
            }
            _ => {}
        }

        let name_start = i;
        while i < bytes.len()
            && !bytes[i].is_ascii_whitespace()
            && !matches!(bytes[i], b'=' | b'>' | b'/')
        {
            i += 1;
        }
        let name = text[name_start..i].to_ascii_lowercase();

        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }

        let mut value = None;
        if bytes.get(i) == Some(&b'=') {
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            match bytes.get(i)? {
                quote @ (b'"' | b'\'') => {
                    let value_start = i + 1;
                    let value_end = value_start + text[value_start..].find(char::from(*quote))?;
                    value = Some(text[value_start..value_end].to_string());
                    i = value_end + 1;
                }
                _ => {
                    let value_start = i;
                    while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>'
                    {
                        i += 1;
                    }
                    value = Some(text[value_start..i].to_string());
                }
            }
        }

        attributes.push((name, value));
    }
}

fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle.as_bytes()))
}
