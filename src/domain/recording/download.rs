//! Download link value object

use base64::Engine;

use super::audio::FinalizedRecording;
use crate::domain::error::DataUrlError;

/// Suggested filename for saved recordings.
///
/// Fixed regardless of the negotiated encoding.
pub const DEFAULT_DOWNLOAD_FILENAME: &str = "myfile.mp3";

/// Link-like target for saving the last finalized recording
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLink {
    href: String,
    filename: String,
}

impl DownloadLink {
    pub fn new(href: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            filename: filename.into(),
        }
    }

    /// Point a link at a finalized recording
    pub fn for_recording(recording: &FinalizedRecording, filename: impl Into<String>) -> Self {
        Self::new(recording.data_url(), filename)
    }

    pub fn href(&self) -> &str {
        &self.href
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Resolve the link target into its MIME string and payload
    pub fn resolve(&self) -> Result<(String, Vec<u8>), DataUrlError> {
        decode_data_url(&self.href)
    }
}

/// Decode a base64 `data:` URL into its MIME string and bytes
pub fn decode_data_url(url: &str) -> Result<(String, Vec<u8>), DataUrlError> {
    let rest = url.strip_prefix("data:").ok_or(DataUrlError::NotADataUrl)?;
    let (header, payload) = rest.split_once(',').ok_or(DataUrlError::MissingPayload)?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or(DataUrlError::NotBase64)?;

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| DataUrlError::InvalidPayload(e.to_string()))?;

    Ok((mime.to_string(), bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::recording::AudioMimeType;

    #[test]
    fn link_for_recording_uses_data_url() {
        let recording = FinalizedRecording::new(vec![9, 8, 7], AudioMimeType::Flac);
        let link = DownloadLink::for_recording(&recording, DEFAULT_DOWNLOAD_FILENAME);
        assert_eq!(link.filename(), "myfile.mp3");
        assert!(link.href().starts_with("data:audio/flac;base64,"));
    }

    #[test]
    fn resolve_returns_original_bytes() {
        let recording = FinalizedRecording::new(vec![0, 255, 16, 32], AudioMimeType::Ogg);
        let link = DownloadLink::for_recording(&recording, "clip.ogg");
        let (mime, bytes) = link.resolve().unwrap();
        assert_eq!(mime, "audio/ogg");
        assert_eq!(bytes, vec![0, 255, 16, 32]);
    }

    #[test]
    fn decode_rejects_other_schemes() {
        assert!(matches!(
            decode_data_url("https://example.com/a.mp3"),
            Err(DataUrlError::NotADataUrl)
        ));
    }

    #[test]
    fn decode_requires_base64_and_payload() {
        assert!(matches!(
            decode_data_url("data:audio/ogg"),
            Err(DataUrlError::MissingPayload)
        ));
        assert!(matches!(
            decode_data_url("data:text/plain,hello"),
            Err(DataUrlError::NotBase64)
        ));
        assert!(matches!(
            decode_data_url("data:audio/ogg;base64,***"),
            Err(DataUrlError::InvalidPayload(_))
        ));
    }

    #[test]
    fn decode_empty_payload() {
        let (mime, bytes) = decode_data_url("data:audio/flac;base64,").unwrap();
        assert_eq!(mime, "audio/flac");
        assert!(bytes.is_empty());
    }
}
