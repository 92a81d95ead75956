//! Recovers the test author's call expression behind a request spec.
//!
//! Given the frames captured when a request was declared, the locator picks
//! the first frame outside the builder, parses that file, and returns the
//! innermost call whose line range contains the frame's line.

pub mod calls;
pub mod range;

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use compact_str::CompactString;
use tracing::trace;

pub use calls::{call_segments, CallSegment};
pub use range::LineRange;

use crate::error::{Result, TestSpecError};
use crate::spec::{CapturedFrames, Frame, ENGINE_FILE};

/// Innermost call segment whose line range contains `line` (1-indexed).
///
/// Spans of well-formed nested calls strictly nest, so ties only arise for
/// sibling calls sharing a line; the first one encountered wins. Macro
/// invocations are only considered when no parsed call encloses the line,
/// so a `json!(..)` argument never shadows the request it belongs to.
pub fn innermost_call(source: &str, segments: &[CallSegment], line: u32) -> Option<LineRange> {
    let innermost = |is_macro: bool| {
        segments
            .iter()
            .filter(|segment| segment.is_macro == is_macro)
            .map(|segment| segment.line_range(source))
            .filter(|range| range.contains(line))
            .min_by_key(|range| range.span())
    };
    innermost(false).or_else(|| innermost(true))
}

/// Parse `source` and find the innermost call around `line`.
///
/// `None` means either the parse failed or no call encloses the line.
pub fn find_call_range(source: &str, line: u32) -> Option<LineRange> {
    let tree = calls::parse(source)?;
    let segments = call_segments(&tree, source);
    innermost_call(source, &segments, line)
}

/// A located call expression in the author's source.
#[derive(Debug, Clone)]
pub struct CallSite {
    /// File as recorded in the frame.
    pub file: CompactString,
    /// Path the file was read from.
    pub path: PathBuf,
    pub source: String,
    pub range: LineRange,
}

#[derive(Debug, Clone)]
pub struct SourceLocator {
    engine_file: Cow<'static, str>,
    manifest_dir: Option<PathBuf>,
}

impl Default for SourceLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceLocator {
    pub fn new() -> Self {
        Self {
            engine_file: Cow::Borrowed(ENGINE_FILE),
            manifest_dir: std::env::var_os("CARGO_MANIFEST_DIR").map(PathBuf::from),
        }
    }

    /// Treat frames from `engine_file` as builder-internal.
    pub fn with_engine_file(mut self, engine_file: impl Into<Cow<'static, str>>) -> Self {
        self.engine_file = engine_file.into();
        self
    }

    pub fn engine_file(&self) -> &str {
        &self.engine_file
    }

    /// First captured frame outside the builder; assumed to be the test's own code.
    pub fn caller_frame<'f>(&self, frames: &'f CapturedFrames) -> Result<&'f Frame> {
        frames
            .first_outside(&self.engine_file)
            .ok_or(TestSpecError::NoCallerFrame)
    }

    pub fn locate(&self, frames: &CapturedFrames) -> Result<CallSite> {
        let frame = self.caller_frame(frames)?;
        let path = self.resolve_path(&frame.file);
        let source = std::fs::read_to_string(&path).map_err(|e| TestSpecError::io(&path, e))?;

        let tree = calls::parse(&source).ok_or_else(|| TestSpecError::ParseFailed {
            path: path.clone(),
        })?;
        let segments = call_segments(&tree, &source);
        trace!(
            file = %frame.file,
            line = frame.line,
            candidates = segments.len(),
            "Locating call site"
        );

        let range = innermost_call(&source, &segments, frame.line).ok_or_else(|| {
            TestSpecError::CallSiteNotFound {
                path: path.clone(),
                line: frame.line,
            }
        })?;

        Ok(CallSite {
            file: frame.file.clone(),
            path,
            source,
            range,
        })
    }

    /// Compiler-reported paths are relative to the package root, which is
    /// not always the working directory.
    fn resolve_path(&self, file: &str) -> PathBuf {
        let path = Path::new(file);
        if path.is_absolute() || path.exists() {
            return path.to_path_buf();
        }
        match &self.manifest_dir {
            Some(dir) if dir.join(path).exists() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }
}
