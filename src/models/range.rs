//! Host editor coordinates.
//!
//! Mirrors the editor's position/range shape closely enough to slice blame
//! data and to embed a range in a resource identifier.

use serde::{Deserialize, Serialize};

/// Zero-based line and character offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// Start/end pair of positions. Serialized as a two-element array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "[Position; 2]", into = "[Position; 2]")]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Range covering whole lines `start..=end`.
    pub fn lines(start: u32, end: u32) -> Self {
        Self {
            start: Position::new(start, 0),
            end: Position::new(end, 0),
        }
    }
}

impl From<[Position; 2]> for Range {
    fn from([start, end]: [Position; 2]) -> Self {
        Self { start, end }
    }
}

impl From<Range> for [Position; 2] {
    fn from(range: Range) -> Self {
        [range.start, range.end]
    }
}
