//! Delivery sinks for converted files.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while delivering a file.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Filesystem error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Destination for converted files.
#[async_trait]
pub trait DownloadSink: Send + Sync {
    /// Deliver one named file.
    async fn deliver(&self, name: &str, bytes: &[u8]) -> Result<(), SinkError>;
}

/// Sink that writes files into a directory, creating it on first use.
pub struct FsSink {
    dir: PathBuf,
}

impl FsSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Strip path components so a result name can never escape the
    /// target directory.
    fn sanitize(name: &str) -> &str {
        let base = name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(name);
        if base.is_empty() {
            "unnamed"
        } else {
            base
        }
    }
}

#[async_trait]
impl DownloadSink for FsSink {
    async fn deliver(&self, name: &str, bytes: &[u8]) -> Result<(), SinkError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(Self::sanitize(name));
        tokio::fs::write(&path, bytes).await?;
        debug!(path = %path.display(), size = bytes.len(), "Delivered file");
        Ok(())
    }
}

impl std::fmt::Debug for FsSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsSink").field("dir", &self.dir).finish()
    }
}
