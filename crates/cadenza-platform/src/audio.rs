//! Audio Backend
//!
//! The device/channel API the runtime drives. A backend opens the output
//! device, manages the rendering context, stores uploaded PCM buffers and
//! positions buffer-backed voices relative to the listener.
//!
//! Handles are plain integers owned by the backend; the scoped wrappers in
//! [`crate::resource`] pair every acquisition with its release.

use std::rc::Rc;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque output device handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId(pub u32);

/// Opaque rendering context handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(pub u32);

/// Opaque device-side buffer handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub u32);

/// Opaque voice handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoiceId(pub u32);

/// PCM layout of an uploaded buffer. Samples are always 16-bit signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelFormat {
    Mono16,
    Stereo16,
}

impl ChannelFormat {
    /// Classify a stream by channel count. Anything but mono is stereo.
    pub fn from_channels(channels: u16) -> Self {
        if channels == 1 {
            Self::Mono16
        } else {
            Self::Stereo16
        }
    }

    /// Get the number of channels
    pub fn channel_count(&self) -> usize {
        match self {
            Self::Mono16 => 1,
            Self::Stereo16 => 2,
        }
    }

    /// Bytes per sample frame
    pub fn frame_size(&self) -> usize {
        self.channel_count() * 2
    }
}

/// Distance attenuation model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DistanceModel {
    None,
    Inverse,
    InverseClamped,
    Linear,
    LinearClamped,
    #[default]
    Exponent,
    ExponentClamped,
}

/// Device/context level error codes
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    #[error("invalid device")]
    InvalidDevice,

    #[error("invalid context")]
    InvalidContext,

    #[error("invalid enum")]
    InvalidEnum,

    #[error("invalid value")]
    InvalidValue,

    #[error("out of memory")]
    OutOfMemory,

    #[error("<unknown OpenAL error>")]
    Unknown(i32),
}

/// Buffer/voice level error codes
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendError {
    #[error("invalid name")]
    InvalidName,

    #[error("invalid enum")]
    InvalidEnum,

    #[error("invalid value")]
    InvalidValue,

    #[error("invalid operation")]
    InvalidOperation,

    #[error("out of memory")]
    OutOfMemory,

    #[error("<unknown OpenAL error>")]
    Unknown(i32),
}

/// Render an optional error code the way diagnostics print it
pub fn error_string<E: std::fmt::Display>(error: Option<E>) -> String {
    match error {
        Some(error) => error.to_string(),
        None => String::from("no error"),
    }
}

/// Extension advertised by devices that accept Vorbis data directly
pub const VORBIS_EXTENSION: &str = "EXT_vorbis";

/// Low-level device/channel API.
///
/// Calls never panic and never return `Result`: failures are reported
/// through `None`/`false` returns and the sticky error queried with
/// [`AudioBackend::take_error`] or [`AudioBackend::device_error`].
pub trait AudioBackend {
    /// Open the default output device
    fn open_device(&self) -> Option<DeviceId>;

    /// Close a device
    fn close_device(&self, device: DeviceId);

    /// Check for a device extension
    fn is_extension_present(&self, device: DeviceId, name: &str) -> bool;

    /// Create a rendering context on a device
    fn create_context(&self, device: DeviceId) -> Option<ContextId>;

    /// Destroy a context
    fn destroy_context(&self, context: ContextId);

    /// Bind a context as current, or unbind with `None`
    fn make_context_current(&self, context: Option<ContextId>) -> bool;

    /// Fetch and clear the pending device error
    fn device_error(&self, device: DeviceId) -> Option<ContextError>;

    /// Human readable device name
    fn device_name(&self, device: DeviceId) -> String;

    /// Backend implementation version
    fn version(&self) -> String;

    /// Select the distance attenuation model
    fn set_distance_model(&self, model: DistanceModel);

    /// Allocate a device buffer
    fn create_buffer(&self) -> BufferId;

    /// Upload PCM data into a device buffer
    fn upload_buffer(&self, buffer: BufferId, format: ChannelFormat, data: &[u8], sample_rate: u32);

    /// Release a device buffer
    fn delete_buffer(&self, buffer: BufferId);

    /// Allocate a voice
    fn create_voice(&self) -> VoiceId;

    /// Release a voice
    fn delete_voice(&self, voice: VoiceId);

    /// Attach a buffer to a voice
    fn set_voice_buffer(&self, voice: VoiceId, buffer: BufferId);

    /// Set voice position
    fn set_voice_position(&self, voice: VoiceId, position: Vec3);

    /// Set voice velocity
    fn set_voice_velocity(&self, voice: VoiceId, velocity: Vec3);

    /// Interpret the voice position relative to the listener
    fn set_voice_relative(&self, voice: VoiceId, relative: bool);

    /// Set the voice rolloff factor
    fn set_voice_rolloff(&self, voice: VoiceId, factor: f32);

    /// Loop the attached buffer
    fn set_voice_looping(&self, voice: VoiceId, looping: bool);

    /// Start playback
    fn play_voice(&self, voice: VoiceId);

    /// Stop playback
    fn stop_voice(&self, voice: VoiceId);

    /// Set listener position
    fn set_listener_position(&self, position: [f32; 3]);

    /// Set listener velocity
    fn set_listener_velocity(&self, velocity: [f32; 3]);

    /// Set listener orientation (at, up)
    fn set_listener_orientation(&self, orientation: [f32; 6]);

    /// Set listener gain
    fn set_listener_gain(&self, gain: f32);

    /// Fetch and clear the pending buffer/voice error
    fn take_error(&self) -> Option<BackendError>;
}

/// Backend shared by the system and every handle wrapper
pub type SharedBackend = Rc<dyn AudioBackend>;
