//! Recording value objects

mod audio;
mod download;
mod elapsed;

pub use audio::{AudioMimeType, FinalizedRecording};
pub use download::{decode_data_url, DownloadLink, DEFAULT_DOWNLOAD_FILENAME};
pub use elapsed::{ElapsedTime, MaxRecordingHours, DEFAULT_MAX_RECORDING_HOURS};
