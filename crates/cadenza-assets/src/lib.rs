//! # Cadenza Assets
//!
//! Sound asset pipeline for the Cadenza audio runtime.
//!
//! ## Features
//! - Ordered extension lookup (Ogg Vorbis, then WAVE)
//! - Whole-file decode to 16-bit PCM with device upload
//! - Single-decode-per-name buffer cache

pub mod buffer;
pub mod cache;
pub mod decoder;
pub mod format;
pub mod pipeline;

pub use buffer::SoundBuffer;
pub use cache::SoundBufferCache;
pub use decoder::{DecodedStream, StreamDecoder, VorbisDecoder, WaveDecoder};
pub use format::{FormatTable, SoundFormat};
pub use pipeline::{DEFAULT_CHUNK_SIZE, decode_file};

use std::path::PathBuf;

use cadenza_platform::PlatformError;
use thiserror::Error;

/// Asset errors
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Sound not found: {0}")]
    NotFound(String),

    #[error("Error opening {} for decoding: {reason}", path.display())]
    Open { path: PathBuf, reason: String },

    #[error("Decode failed: {0}")]
    Decode(String),

    #[error("Decoded stream is empty: {}", .0.display())]
    EmptyStream(PathBuf),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Audio device error: {0}")]
    Device(#[from] PlatformError),
}

/// Result type for asset operations
pub type AssetResult<T> = Result<T, AssetError>;
