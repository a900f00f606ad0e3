//! Filesystem download sink
//!
//! Following a download link decodes its data URL and writes the bytes
//! under the link's suggested filename.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::info;

use crate::application::ports::{DownloadError, DownloadSink};
use crate::domain::recording::DownloadLink;

/// Saves downloads into a fixed directory
pub struct FsDownloadSink {
    dir: PathBuf,
}

impl FsDownloadSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Destination for `filename`; path components are stripped so a link
    /// can never write outside the download directory
    fn destination(&self, filename: &str) -> Result<PathBuf, DownloadError> {
        let name = Path::new(filename)
            .file_name()
            .ok_or_else(|| DownloadError::WriteFailed(format!("invalid filename: {}", filename)))?;
        Ok(self.dir.join(name))
    }
}

#[async_trait]
impl DownloadSink for FsDownloadSink {
    async fn save(&self, link: &DownloadLink) -> Result<PathBuf, DownloadError> {
        let (_mime, bytes) = link.resolve()?;
        let path = self.destination(link.filename())?;

        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| DownloadError::WriteFailed(e.to_string()))?;
        fs::write(&path, &bytes)
            .await
            .map_err(|e| DownloadError::WriteFailed(e.to_string()))?;

        info!(path = %path.display(), bytes = bytes.len(), "recording saved");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::recording::{AudioMimeType, FinalizedRecording};
    use tempfile::TempDir;

    fn link(filename: &str) -> DownloadLink {
        let recording = FinalizedRecording::new(vec![0x66, 0x4c, 0x61, 0x43, 1, 2], AudioMimeType::Flac);
        DownloadLink::for_recording(&recording, filename)
    }

    #[tokio::test]
    async fn writes_decoded_bytes_under_suggested_name() {
        let dir = TempDir::new().unwrap();
        let sink = FsDownloadSink::new(dir.path());

        let path = sink.save(&link("myfile.mp3")).await.unwrap();

        assert_eq!(path, dir.path().join("myfile.mp3"));
        assert_eq!(std::fs::read(&path).unwrap(), vec![0x66, 0x4c, 0x61, 0x43, 1, 2]);
    }

    #[tokio::test]
    async fn creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("takes").join("today");
        let sink = FsDownloadSink::new(&nested);

        let path = sink.save(&link("a.flac")).await.unwrap();

        assert!(path.starts_with(&nested));
        assert!(path.exists());
    }

    #[tokio::test]
    async fn strips_directories_from_filename() {
        let dir = TempDir::new().unwrap();
        let sink = FsDownloadSink::new(dir.path());

        let path = sink.save(&link("../escape.flac")).await.unwrap();

        assert_eq!(path, dir.path().join("escape.flac"));
    }

    #[tokio::test]
    async fn overwrites_existing_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("myfile.mp3"), b"old").unwrap();
        let sink = FsDownloadSink::new(dir.path());

        let path = sink.save(&link("myfile.mp3")).await.unwrap();

        assert_eq!(std::fs::read(path).unwrap().len(), 6);
    }

    #[tokio::test]
    async fn rejects_malformed_link() {
        let dir = TempDir::new().unwrap();
        let sink = FsDownloadSink::new(dir.path());

        let err = sink
            .save(&DownloadLink::new("https://example.com/a.mp3", "a.mp3"))
            .await
            .unwrap_err();

        assert!(matches!(err, DownloadError::InvalidLink(_)));
    }
}
