//! Gutter-annotated source listings of located call sites.

use std::fmt::Write as _;

use ropey::Rope;

use crate::config::LocatorConfig;
use crate::constants::{GUTTER_BAR, GUTTER_WIDTH};
use crate::error::Result;
use crate::locator::{LineRange, SourceLocator};
use crate::spec::CapturedFrames;

const NO_FRAMES: &str = "<no source location was captured>";
const DISABLED: &str = "<source context disabled>";

/// Renders the source context of a request for diagnostics.
#[derive(Debug, Clone)]
pub struct SourceContext {
    locator: SourceLocator,
    enabled: bool,
}

impl Default for SourceContext {
    fn default() -> Self {
        Self::new(SourceLocator::new())
    }
}

impl SourceContext {
    pub fn new(locator: SourceLocator) -> Self {
        Self {
            locator,
            enabled: true,
        }
    }

    pub fn from_config(config: &LocatorConfig) -> Self {
        Self {
            locator: SourceLocator::new(),
            enabled: config.enabled,
        }
    }

    pub fn render(&self, frames: &CapturedFrames) -> Result<String> {
        if !self.enabled {
            return Ok(DISABLED.to_string());
        }
        if frames.is_empty() {
            return Ok(NO_FRAMES.to_string());
        }

        let site = self.locator.locate(frames)?;
        Ok(pretty_print_file_context(
            &site.file,
            self.locator.engine_file(),
            &site.source,
            site.range,
        ))
    }
}

/// `file_path` with the prefix it shares with `engine_file` removed.
///
/// The prefix is computed character by character, so it may end in the
/// middle of a path component.
pub fn display_path<'a>(file_path: &'a str, engine_file: &str) -> &'a str {
    let prefix_len: usize = file_path
        .char_indices()
        .zip(engine_file.chars())
        .take_while(|((_, a), b)| a == b)
        .map(|((_, a), _)| a.len_utf8())
        .sum();
    &file_path[prefix_len..]
}

/// The lines of `range` with their numbers in a gutter, below the display path.
pub fn pretty_print_file_context(
    file_path: &str,
    engine_file: &str,
    contents: &str,
    range: LineRange,
) -> String {
    let rope = Rope::from_str(contents);
    let mut out = String::new();
    out.push_str(display_path(file_path, engine_file));
    out.push('\n');

    for index in range.to_slice() {
        if index >= rope.len_lines() {
            break;
        }
        let line = rope.line(index);
        let _ = write!(out, "{:>width$} {GUTTER_BAR} {line}", index + 1, width = GUTTER_WIDTH);
        if !out.ends_with('\n') {
            out.push('\n');
        }
    }

    out
}
