//! Finalized recording value object

use std::fmt;
use std::sync::Arc;

use base64::Engine;

/// Audio encodings a capture pipeline can negotiate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AudioMimeType {
    #[default]
    Flac,
    Ogg,
    Wav,
    Webm,
    Mp4,
    Mpeg,
}

impl AudioMimeType {
    /// Get the MIME type string
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Flac => "audio/flac",
            Self::Ogg => "audio/ogg",
            Self::Wav => "audio/wav",
            Self::Webm => "audio/webm",
            Self::Mp4 => "audio/mp4",
            Self::Mpeg => "audio/mpeg",
        }
    }
}

impl fmt::Display for AudioMimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The single immutable audio object produced when a session stops.
/// Holds the ordered concatenation of every captured chunk. Clones share
/// the same bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizedRecording {
    data: Arc<[u8]>,
    mime_type: AudioMimeType,
}

impl FinalizedRecording {
    pub fn new(data: Vec<u8>, mime_type: AudioMimeType) -> Self {
        Self {
            data: data.into(),
            mime_type,
        }
    }

    /// Concatenate chunks in capture order
    pub fn from_chunks(chunks: Vec<Vec<u8>>, mime_type: AudioMimeType) -> Self {
        Self::new(chunks.concat(), mime_type)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Handle to the bytes for consumers that need to own them
    pub fn shared_data(&self) -> Arc<[u8]> {
        Arc::clone(&self.data)
    }

    pub fn mime_type(&self) -> AudioMimeType {
        self.mime_type
    }

    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get human-readable size
    pub fn human_readable_size(&self) -> String {
        let bytes = self.size_bytes();
        if bytes < 1024 {
            format!("{} B", bytes)
        } else if bytes < 1024 * 1024 {
            format!("{:.1} KB", bytes as f64 / 1024.0)
        } else {
            format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
        }
    }

    /// Playable `data:` URL carrying the recording as base64
    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type.as_str(),
            base64::engine::general_purpose::STANDARD.encode(self.data())
        )
    }
}
