//! Addressable identifiers for blame documents shown by the host.
//!
//! Format:
//! `<scheme>:<index>. <author>, <date> - <dir>/<hash>: <file>?<query>`
//!
//! The index is zero-padded to the width of the total count so hosts that
//! sort identifiers as text keep display order. The query is JSON:
//! `{"fileName":..,"sha":..,"range":[{line,character},{line,character}],"index":..}`

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::LensConfig;
use crate::error::{BlameError, Result};
use crate::models::{CommitRecord, Range};

/// Prefix of the query payload inside an identifier.
const QUERY_MARKER: &str = "?{\"fileName\":";

/// Payload carried in the identifier's query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceQuery {
    /// Absolute path: repository root joined with the commit's file path
    pub file_name: String,
    pub sha: String,
    pub range: Range,
    pub index: usize,
}

pub fn encode_resource_uri(
    config: &LensConfig,
    repo_root: &Path,
    commit: &CommitRecord,
    range: &Range,
    index: usize,
    total: usize,
) -> Result<String> {
    let width = total.to_string().len();
    let commit_path = Path::new(&commit.file_name);

    let dir = match commit_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_string_lossy().into_owned(),
        _ => ".".to_string(),
    };
    let base_name = commit_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| commit.file_name.clone());

    let query = ResourceQuery {
        file_name: repo_root.join(commit_path).to_string_lossy().into_owned(),
        sha: commit.hash.clone(),
        range: *range,
        index,
    };
    let payload = serde_json::to_string(&query)?;

    Ok(format!(
        "{}:{:0width$}. {}, {} - {}/{}: {}?{}",
        config.scheme,
        index,
        commit.author,
        commit.formatted_date(&config.date_format),
        dir,
        commit.hash,
        base_name,
        payload,
        width = width
    ))
}

/// Recover the query payload from a full identifier.
pub fn decode_resource_uri(uri: &str) -> Result<ResourceQuery> {
    let start = uri
        .find(QUERY_MARKER)
        .ok_or_else(|| BlameError::InvalidResource(format!("no query in {}", uri)))?;
    decode_resource_query(&uri[start + 1..])
}

/// Parse a bare query payload.
pub fn decode_resource_query(query: &str) -> Result<ResourceQuery> {
    serde_json::from_str(query).map_err(|e| BlameError::InvalidResource(e.to_string()))
}
