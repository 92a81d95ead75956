//! Line-oriented diff of two JSON payloads.

use serde_json::Value;
use similar::{Algorithm, ChangeTag, TextDiff};

/// One line of a diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffLine<'a> {
    Same(&'a str),
    /// Only on the left (actual) side.
    Removed(&'a str),
    /// Only on the right (expected) side.
    Added(&'a str),
}

impl DiffLine<'_> {
    fn marker(&self) -> &'static str {
        match self {
            Self::Same(_) => "  ",
            Self::Removed(_) => "- ",
            Self::Added(_) => "+ ",
        }
    }

    fn text(&self) -> &str {
        match self {
            Self::Same(text) | Self::Removed(text) | Self::Added(text) => text,
        }
    }
}

/// Pretty, multi-line JSON used everywhere payloads are shown.
pub fn pretty_format(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Line diff of `old` against `new`. Within a changed block, removals come
/// before additions.
pub fn diff_lines<'a>(old: &'a str, new: &'a str) -> Vec<DiffLine<'a>> {
    let diff = TextDiff::configure()
        .algorithm(Algorithm::Patience)
        .diff_lines(old, new);

    let lines: Vec<DiffLine<'a>> = diff
        .iter_all_changes()
        .map(|change| {
            let value = change.value();
            let line = value.strip_suffix('\n').unwrap_or(value);
            match change.tag() {
                ChangeTag::Equal => DiffLine::Same(line),
                ChangeTag::Delete => DiffLine::Removed(line),
                ChangeTag::Insert => DiffLine::Added(line),
            }
        })
        .collect();
    lines
}

/// Diff of `actual` against `expected`, with a legend naming each side.
pub fn pretty_print_diff(actual: &Value, expected: &Value) -> String {
    let actual = pretty_format(actual);
    let expected = pretty_format(expected);

    let mut out = String::from("(+ is expected lines, - is actual lines)\n");
    for line in diff_lines(&actual, &expected) {
        out.push_str(line.marker());
        out.push_str(line.text());
        out.push('\n');
    }
    out
}
