//! # Cadenza Audio
//!
//! Audio resource manager for the Cadenza audio runtime.
//!
//! ## Features
//! - Device and context bring-up with ordered teardown
//! - Decode-once buffer cache shared by every source
//! - Named sound sources with inert placeholders
//! - Ambient slots with autoplay handover
//! - Per-frame listener update

pub mod ambient;
pub mod config;
pub mod registry;
pub mod source;
pub mod system;

#[cfg(test)]
mod test_support;

pub use ambient::AmbientSound;
pub use config::AudioConfig;
pub use registry::{AmbientSlotRegistry, NamedSourceRegistry, SlotChange};
pub use source::SoundSource;
pub use system::{AudioSystem, SystemState};

use thiserror::Error;

/// Audio system errors
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Invalid audio configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for audio operations
pub type AudioResult<T> = Result<T, AudioError>;
