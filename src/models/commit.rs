use chrono::{DateTime, FixedOffset};
use serde::Serialize;

/// A commit as seen in one file's blame output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitRecord {
    /// Abbreviated hash as printed by blame (may carry a leading `^`)
    pub hash: String,
    /// Path of the file in that commit's tree
    pub file_name: String,
    pub author: String,
    /// Commit time, keeping the author's UTC offset
    pub date: DateTime<FixedOffset>,
}

impl CommitRecord {
    /// Format the commit date with a chrono `strftime` pattern.
    pub fn formatted_date(&self, pattern: &str) -> String {
        self.date.format(pattern).to_string()
    }
}
