//! # Cadenza Platform
//!
//! Platform layer for the Cadenza audio runtime.
//!
//! This crate provides:
//! - **Audio**: the device/channel API as the [`AudioBackend`] capability
//! - **Resources**: scoped guards for devices, contexts, buffers and voices,
//!   and the severable [`DeviceLink`] they share
//! - **Headless**: null and in-memory software backends
//! - **FileSystem**: sound search root and existence checks

pub mod audio;
pub mod filesystem;
pub mod headless;
pub mod resource;

pub use audio::{
    AudioBackend, BackendError, BufferId, ChannelFormat, ContextError, ContextId, DeviceId,
    DistanceModel, SharedBackend, VoiceId,
};
pub use filesystem::FileSystem;
pub use headless::{HeadlessBackend, HeadlessOptions, NullBackend};
pub use resource::{ContextGuard, DeviceBuffer, DeviceGuard, DeviceLink, Voice};

use std::path::PathBuf;

use thiserror::Error;

/// Platform-specific errors
#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("File I/O error: {0}")]
    FileIO(#[from] std::io::Error),

    #[error("Path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("No audio device available")]
    DeviceUnavailable,

    #[error("Audio context error: {0}")]
    Context(#[from] ContextError),

    #[error("Audio backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Result type for platform operations
pub type PlatformResult<T> = Result<T, PlatformError>;
