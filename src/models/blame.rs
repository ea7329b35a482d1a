//! Parsed blame data for one file at one snapshot.
//!
//! Line records are kept in physical line order, so a visible editor range
//! maps directly onto a slice of `lines`. Commit records are keyed by hash and
//! only exist for hashes referenced by at least one line.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use super::{CommitRecord, Range};

/// Attribution for a single line of the working copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineRecord {
    /// Hash of the commit that last touched this line
    pub hash: String,
    /// Line number in the commit's version of the file (0-indexed)
    pub original_line: usize,
    /// Line number in the working copy (0-indexed)
    pub current_line: usize,
}

/// Commits plus per-line attribution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BlameResult {
    pub commits: HashMap<String, CommitRecord>,
    pub lines: Vec<LineRecord>,
}

/// Lines of a range attributed to one commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShaBlame {
    /// `None` when the hash does not appear in the file
    pub commit: Option<CommitRecord>,
    pub lines: Vec<LineRecord>,
}

impl BlameResult {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines whose index falls in `range.start.line..=range.end.line`.
    ///
    /// Out-of-bounds ends are clamped; an inverted range yields nothing.
    pub fn slice_lines(&self, range: &Range) -> &[LineRecord] {
        let len = self.lines.len();
        let start = (range.start.line as usize).min(len);
        let end = (range.end.line as usize).saturating_add(1).min(len);

        if start >= end {
            &[]
        } else {
            &self.lines[start..end]
        }
    }

    /// Restrict to a line range, keeping only the commits it references.
    pub fn for_range(&self, range: &Range) -> BlameResult {
        if self.lines.is_empty() {
            return self.clone();
        }

        let lines = self.slice_lines(range).to_vec();
        let mut commits = HashMap::new();
        for line in &lines {
            if commits.contains_key(&line.hash) {
                continue;
            }
            if let Some(commit) = self.commits.get(&line.hash) {
                commits.insert(line.hash.clone(), commit.clone());
            }
        }

        BlameResult { commits, lines }
    }

    /// Lines in a range attributed to `hash`, with that commit's record.
    pub fn for_sha_range(&self, hash: &str, range: &Range) -> ShaBlame {
        let lines = self
            .slice_lines(range)
            .iter()
            .filter(|line| line.hash == hash)
            .cloned()
            .collect();

        ShaBlame {
            commit: self.commits.get(hash).cloned(),
            lines,
        }
    }

    /// Commit records in order of first appearance among the lines.
    ///
    /// Gives hosts without ordering of their own a stable display order.
    pub fn ordered_commits(&self) -> Vec<&CommitRecord> {
        let mut seen = HashSet::new();
        self.lines
            .iter()
            .filter(|line| seen.insert(line.hash.as_str()))
            .filter_map(|line| self.commits.get(&line.hash))
            .collect()
    }
}
