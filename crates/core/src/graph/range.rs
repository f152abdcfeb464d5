//! Source ranges with both narrow (exact token) and wide (including adjacent
//! trivia such as modifiers and annotations) spans. Both are retained because
//! downstream consumers need exact-token spans for highlighting and logical
//! extents for metrics.

use crate::storage::strtable::StrKey;
use serde::{Deserialize, Serialize};

/// One line/column pair, 1-based. Zero means "unknown".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Point {
    pub line: u32,
    pub col: u32,
}

impl Point {
    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }

    pub fn is_set(self) -> bool {
        self.line != 0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    /// String-table key of the source file path.
    pub path: StrKey,
    pub start: Point,
    pub end: Point,
    pub wide_start: Point,
    pub wide_end: Point,
}

impl Range {
    pub fn new(path: StrKey, start: Point, end: Point) -> Self {
        Self {
            path,
            start,
            end,
            wide_start: start,
            wide_end: end,
        }
    }

    pub fn with_wide(mut self, wide_start: Point, wide_end: Point) -> Self {
        self.wide_start = wide_start;
        self.wide_end = wide_end;
        self
    }

    pub fn contains(&self, p: Point) -> bool {
        self.wide_start <= p && p <= self.wide_end
    }
}
