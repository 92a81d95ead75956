//! Call-site provenance attached to request specs.
//!
//! Frames are recorded innermost first. Capturing is just copying a few
//! `Location` fields; source files are only parsed later, if a diagnostic
//! for the request is ever rendered.

use std::panic::Location;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// One source location in a captured call stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// Path as reported by the compiler (usually relative to the package root).
    pub file: CompactString,

    /// 1-indexed line.
    pub line: u32,

    /// 1-indexed column.
    pub column: u32,
}

impl Frame {
    pub fn new(file: impl Into<CompactString>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    fn from_location(location: &Location<'_>) -> Self {
        Self::new(location.file(), location.line(), location.column())
    }
}

/// Call stack captured when a request spec was declared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapturedFrames(SmallVec<[Frame; 2]>);

impl CapturedFrames {
    /// Record `innermost` followed by the location of the nearest caller that
    /// is not itself `#[track_caller]`.
    #[track_caller]
    pub fn capture(innermost: Frame) -> Self {
        let caller = Frame::from_location(Location::caller());
        let mut frames = SmallVec::new();
        frames.push(innermost);
        frames.push(caller);
        Self(frames)
    }

    pub fn from_frames(frames: impl IntoIterator<Item = Frame>) -> Self {
        Self(frames.into_iter().collect())
    }

    pub fn frames(&self) -> &[Frame] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First frame, innermost first, whose file is not `engine_file`.
    pub fn first_outside(&self, engine_file: &str) -> Option<&Frame> {
        self.0.iter().find(|frame| frame.file != engine_file)
    }
}
