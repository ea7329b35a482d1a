//! Raw blame text providers.
//!
//! The store never runs a version-control tool itself. It asks a
//! `BlameSource` for the text, which the host implements (usually by running
//! `git blame` in the repository).
//!
//! - `FnSource`: adapts an async closure, for hosts and tests
//! - `CapturedSource`: reads blame output saved to disk as `<file>.blame`

use anyhow::Context;
use async_trait::async_trait;
use std::future::Future;
use std::path::PathBuf;

/// Something that can produce raw blame output for a file.
#[async_trait]
pub trait BlameSource: Send + Sync {
    async fn raw_blame(&self, file: &str) -> anyhow::Result<String>;
}

/// Wraps `Fn(String) -> impl Future<Output = anyhow::Result<String>>`.
pub struct FnSource<F>(pub F);

#[async_trait]
impl<F, Fut> BlameSource for FnSource<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<String>> + Send,
{
    async fn raw_blame(&self, file: &str) -> anyhow::Result<String> {
        (self.0)(file.to_string()).await
    }
}

/// Reads captured blame output from a directory.
#[derive(Debug, Clone)]
pub struct CapturedSource {
    dir: PathBuf,
}

impl CapturedSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Where the capture for `file` is expected to live.
    pub fn capture_path(&self, file: &str) -> PathBuf {
        self.dir.join(format!("{}.blame", file))
    }
}

#[async_trait]
impl BlameSource for CapturedSource {
    async fn raw_blame(&self, file: &str) -> anyhow::Result<String> {
        let path = self.capture_path(file);
        tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("reading captured blame {}", path.display()))
    }
}
