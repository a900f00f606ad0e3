//! Download port interface

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::error::DataUrlError;
use crate::domain::recording::DownloadLink;

/// Download errors
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Invalid download link: {0}")]
    InvalidLink(#[from] DataUrlError),

    #[error("Failed to save recording: {0}")]
    WriteFailed(String),
}

/// Port for following a download link
#[async_trait]
pub trait DownloadSink: Send + Sync {
    /// Save the link target under its suggested filename.
    ///
    /// # Returns
    /// Where the recording was written
    async fn save(&self, link: &DownloadLink) -> Result<PathBuf, DownloadError>;
}
