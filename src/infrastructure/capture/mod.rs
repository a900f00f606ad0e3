//! Audio capture adapters

mod cpal_host;
mod flac_encoder;

pub use cpal_host::{CpalCaptureHost, CpalPipeline, CpalStream};
pub use flac_encoder::{encode_to_flac, EncodingError};
