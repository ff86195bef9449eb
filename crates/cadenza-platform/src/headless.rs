//! Software backends
//!
//! [`NullBackend`] never finds a device. [`HeadlessBackend`] is an in-memory
//! device that keeps full bookkeeping of buffers, voices and the listener
//! without producing any output, used for servers, tools and tests.

use ahash::AHashMap;
use glam::Vec3;
use parking_lot::Mutex;

use crate::audio::{
    AudioBackend, BackendError, BufferId, ChannelFormat, ContextError, ContextId, DeviceId,
    DistanceModel, VORBIS_EXTENSION, VoiceId,
};

/// Backend for machines without any audio output
#[derive(Debug, Default)]
pub struct NullBackend;

impl AudioBackend for NullBackend {
    fn open_device(&self) -> Option<DeviceId> {
        None
    }
    fn close_device(&self, _device: DeviceId) {}
    fn is_extension_present(&self, _device: DeviceId, _name: &str) -> bool {
        false
    }
    fn create_context(&self, _device: DeviceId) -> Option<ContextId> {
        None
    }
    fn destroy_context(&self, _context: ContextId) {}
    fn make_context_current(&self, _context: Option<ContextId>) -> bool {
        false
    }
    fn device_error(&self, _device: DeviceId) -> Option<ContextError> {
        Some(ContextError::InvalidDevice)
    }
    fn device_name(&self, _device: DeviceId) -> String {
        String::new()
    }
    fn version(&self) -> String {
        String::from("null")
    }
    fn set_distance_model(&self, _model: DistanceModel) {}
    fn create_buffer(&self) -> BufferId {
        BufferId(0)
    }
    fn upload_buffer(&self, _buffer: BufferId, _format: ChannelFormat, _data: &[u8], _rate: u32) {}
    fn delete_buffer(&self, _buffer: BufferId) {}
    fn create_voice(&self) -> VoiceId {
        VoiceId(0)
    }
    fn delete_voice(&self, _voice: VoiceId) {}
    fn set_voice_buffer(&self, _voice: VoiceId, _buffer: BufferId) {}
    fn set_voice_position(&self, _voice: VoiceId, _position: Vec3) {}
    fn set_voice_velocity(&self, _voice: VoiceId, _velocity: Vec3) {}
    fn set_voice_relative(&self, _voice: VoiceId, _relative: bool) {}
    fn set_voice_rolloff(&self, _voice: VoiceId, _factor: f32) {}
    fn set_voice_looping(&self, _voice: VoiceId, _looping: bool) {}
    fn play_voice(&self, _voice: VoiceId) {}
    fn stop_voice(&self, _voice: VoiceId) {}
    fn set_listener_position(&self, _position: [f32; 3]) {}
    fn set_listener_velocity(&self, _velocity: [f32; 3]) {}
    fn set_listener_orientation(&self, _orientation: [f32; 6]) {}
    fn set_listener_gain(&self, _gain: f32) {}
    fn take_error(&self) -> Option<BackendError> {
        None
    }
}

/// Failure injection for the headless device
#[derive(Debug, Clone, Default)]
pub struct HeadlessOptions {
    /// `open_device` returns nothing
    pub fail_open: bool,
    /// `create_context` returns nothing
    pub fail_context: bool,
    /// `make_context_current` reports failure
    pub fail_make_current: bool,
    /// every upload raises an error
    pub fail_upload: bool,
    /// advertise the Vorbis extension
    pub vorbis_extension: bool,
}

/// Uploaded buffer bookkeeping
#[derive(Debug, Clone, PartialEq)]
pub struct BufferRecord {
    pub format: Option<ChannelFormat>,
    pub sample_rate: u32,
    pub byte_len: usize,
}

/// Voice bookkeeping
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceRecord {
    pub buffer: Option<BufferId>,
    pub position: Vec3,
    pub velocity: Vec3,
    pub relative: bool,
    pub rolloff: f32,
    pub looping: bool,
    pub playing: bool,
    pub play_count: u32,
    pub stop_count: u32,
}

impl Default for VoiceRecord {
    fn default() -> Self {
        Self {
            buffer: None,
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            relative: false,
            rolloff: 1.0,
            looping: false,
            playing: false,
            play_count: 0,
            stop_count: 0,
        }
    }
}

/// Listener bookkeeping
#[derive(Debug, Clone, PartialEq)]
pub struct ListenerRecord {
    pub position: [f32; 3],
    pub velocity: [f32; 3],
    pub orientation: [f32; 6],
    pub gain: f32,
    /// Number of position pushes
    pub updates: u32,
}

impl Default for ListenerRecord {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            velocity: [0.0; 3],
            orientation: [0.0, 0.0, -1.0, 0.0, 1.0, 0.0],
            gain: 1.0,
            updates: 0,
        }
    }
}

#[derive(Debug, Default)]
struct HeadlessState {
    next_id: u32,
    devices: Vec<DeviceId>,
    contexts: Vec<ContextId>,
    current: Option<ContextId>,
    buffers: AHashMap<BufferId, BufferRecord>,
    voices: AHashMap<VoiceId, VoiceRecord>,
    listener: ListenerRecord,
    distance_model: Option<DistanceModel>,
    device_error: Option<ContextError>,
    error: Option<BackendError>,
}

impl HeadlessState {
    fn allocate(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    // The first error sticks until it is taken.
    fn raise(&mut self, error: BackendError) {
        self.error.get_or_insert(error);
    }

    fn voice_mut(&mut self, voice: VoiceId) -> Option<&mut VoiceRecord> {
        if !self.voices.contains_key(&voice) {
            self.raise(BackendError::InvalidName);
        }
        self.voices.get_mut(&voice)
    }
}

/// In-memory audio device
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    options: HeadlessOptions,
    state: Mutex<HeadlessState>,
}

impl HeadlessBackend {
    /// Create a headless device that succeeds at everything
    pub fn new() -> Self {
        Self::with_options(HeadlessOptions::default())
    }

    /// Create a headless device with failure injection
    pub fn with_options(options: HeadlessOptions) -> Self {
        Self {
            options,
            state: Mutex::new(HeadlessState::default()),
        }
    }

    /// Check whether a device handle is open
    pub fn is_device_open(&self, device: DeviceId) -> bool {
        self.state.lock().devices.contains(&device)
    }

    /// Number of open devices
    pub fn open_device_count(&self) -> usize {
        self.state.lock().devices.len()
    }

    /// Number of contexts not yet destroyed
    pub fn live_context_count(&self) -> usize {
        self.state.lock().contexts.len()
    }

    /// Currently bound context
    pub fn current_context(&self) -> Option<ContextId> {
        self.state.lock().current
    }

    /// Selected distance model, if any was set
    pub fn distance_model(&self) -> Option<DistanceModel> {
        self.state.lock().distance_model
    }

    /// Number of live buffers
    pub fn live_buffer_count(&self) -> usize {
        self.state.lock().buffers.len()
    }

    /// Snapshot of a buffer
    pub fn buffer(&self, buffer: BufferId) -> Option<BufferRecord> {
        self.state.lock().buffers.get(&buffer).cloned()
    }

    /// Number of live voices
    pub fn live_voice_count(&self) -> usize {
        self.state.lock().voices.len()
    }

    /// Snapshot of a voice
    pub fn voice(&self, voice: VoiceId) -> Option<VoiceRecord> {
        self.state.lock().voices.get(&voice).cloned()
    }

    /// Voices currently playing
    pub fn playing_voices(&self) -> Vec<VoiceId> {
        let state = self.state.lock();
        let mut playing: Vec<_> = state
            .voices
            .iter()
            .filter(|(_, record)| record.playing)
            .map(|(id, _)| *id)
            .collect();
        playing.sort_by_key(|id| id.0);
        playing
    }

    /// Snapshot of the listener
    pub fn listener(&self) -> ListenerRecord {
        self.state.lock().listener.clone()
    }
}

impl AudioBackend for HeadlessBackend {
    fn open_device(&self) -> Option<DeviceId> {
        if self.options.fail_open {
            return None;
        }
        let mut state = self.state.lock();
        let device = DeviceId(state.allocate());
        state.devices.push(device);
        log::debug!("Headless device {} opened", device.0);
        Some(device)
    }

    fn close_device(&self, device: DeviceId) {
        let mut state = self.state.lock();
        state.devices.retain(|d| *d != device);
        // The last device takes whatever is still allocated with it.
        if state.devices.is_empty() && !(state.buffers.is_empty() && state.voices.is_empty()) {
            log::debug!(
                "Headless device {} reclaimed {} buffers, {} voices",
                device.0,
                state.buffers.len(),
                state.voices.len()
            );
            state.buffers.clear();
            state.voices.clear();
        }
        log::debug!("Headless device {} closed", device.0);
    }

    fn is_extension_present(&self, _device: DeviceId, name: &str) -> bool {
        self.options.vorbis_extension && name == VORBIS_EXTENSION
    }

    fn create_context(&self, device: DeviceId) -> Option<ContextId> {
        let mut state = self.state.lock();
        if self.options.fail_context || !state.devices.contains(&device) {
            state.device_error = Some(ContextError::InvalidDevice);
            return None;
        }
        let context = ContextId(state.allocate());
        state.contexts.push(context);
        Some(context)
    }

    fn destroy_context(&self, context: ContextId) {
        let mut state = self.state.lock();
        if state.current == Some(context) {
            state.device_error = Some(ContextError::InvalidContext);
            return;
        }
        state.contexts.retain(|c| *c != context);
    }

    fn make_context_current(&self, context: Option<ContextId>) -> bool {
        let mut state = self.state.lock();
        match context {
            None => {
                state.current = None;
                true
            }
            Some(_) if self.options.fail_make_current => {
                state.device_error = Some(ContextError::InvalidContext);
                false
            }
            Some(context) if state.contexts.contains(&context) => {
                state.current = Some(context);
                true
            }
            Some(_) => {
                state.device_error = Some(ContextError::InvalidContext);
                false
            }
        }
    }

    fn device_error(&self, _device: DeviceId) -> Option<ContextError> {
        self.state.lock().device_error.take()
    }

    fn device_name(&self, _device: DeviceId) -> String {
        String::from("Headless Software Device")
    }

    fn version(&self) -> String {
        format!("headless {}", env!("CARGO_PKG_VERSION"))
    }

    fn set_distance_model(&self, model: DistanceModel) {
        self.state.lock().distance_model = Some(model);
    }

    fn create_buffer(&self) -> BufferId {
        let mut state = self.state.lock();
        let buffer = BufferId(state.allocate());
        state.buffers.insert(
            buffer,
            BufferRecord {
                format: None,
                sample_rate: 0,
                byte_len: 0,
            },
        );
        buffer
    }

    fn upload_buffer(&self, buffer: BufferId, format: ChannelFormat, data: &[u8], sample_rate: u32) {
        let mut state = self.state.lock();
        if self.options.fail_upload {
            state.raise(BackendError::InvalidValue);
            return;
        }
        match state.buffers.get_mut(&buffer) {
            Some(record) => {
                record.format = Some(format);
                record.sample_rate = sample_rate;
                record.byte_len = data.len();
            }
            None => state.raise(BackendError::InvalidName),
        }
    }

    fn delete_buffer(&self, buffer: BufferId) {
        let mut state = self.state.lock();
        let in_use = state.voices.values().any(|v| v.buffer == Some(buffer));
        if in_use {
            state.raise(BackendError::InvalidOperation);
            return;
        }
        if state.buffers.remove(&buffer).is_none() {
            state.raise(BackendError::InvalidName);
        }
    }

    fn create_voice(&self) -> VoiceId {
        let mut state = self.state.lock();
        let voice = VoiceId(state.allocate());
        state.voices.insert(voice, VoiceRecord::default());
        voice
    }

    fn delete_voice(&self, voice: VoiceId) {
        let mut state = self.state.lock();
        if state.voices.remove(&voice).is_none() {
            state.raise(BackendError::InvalidName);
        }
    }

    fn set_voice_buffer(&self, voice: VoiceId, buffer: BufferId) {
        let mut state = self.state.lock();
        if !state.buffers.contains_key(&buffer) {
            state.raise(BackendError::InvalidName);
            return;
        }
        if let Some(record) = state.voice_mut(voice) {
            record.buffer = Some(buffer);
        }
    }

    fn set_voice_position(&self, voice: VoiceId, position: Vec3) {
        if let Some(record) = self.state.lock().voice_mut(voice) {
            record.position = position;
        }
    }

    fn set_voice_velocity(&self, voice: VoiceId, velocity: Vec3) {
        if let Some(record) = self.state.lock().voice_mut(voice) {
            record.velocity = velocity;
        }
    }

    fn set_voice_relative(&self, voice: VoiceId, relative: bool) {
        if let Some(record) = self.state.lock().voice_mut(voice) {
            record.relative = relative;
        }
    }

    fn set_voice_rolloff(&self, voice: VoiceId, factor: f32) {
        if let Some(record) = self.state.lock().voice_mut(voice) {
            record.rolloff = factor;
        }
    }

    fn set_voice_looping(&self, voice: VoiceId, looping: bool) {
        if let Some(record) = self.state.lock().voice_mut(voice) {
            record.looping = looping;
        }
    }

    fn play_voice(&self, voice: VoiceId) {
        if let Some(record) = self.state.lock().voice_mut(voice) {
            record.playing = true;
            record.play_count += 1;
        }
    }

    fn stop_voice(&self, voice: VoiceId) {
        if let Some(record) = self.state.lock().voice_mut(voice) {
            record.playing = false;
            record.stop_count += 1;
        }
    }

    fn set_listener_position(&self, position: [f32; 3]) {
        let mut state = self.state.lock();
        state.listener.position = position;
        state.listener.updates += 1;
    }

    fn set_listener_velocity(&self, velocity: [f32; 3]) {
        self.state.lock().listener.velocity = velocity;
    }

    fn set_listener_orientation(&self, orientation: [f32; 6]) {
        self.state.lock().listener.orientation = orientation;
    }

    fn set_listener_gain(&self, gain: f32) {
        self.state.lock().listener.gain = gain;
    }

    fn take_error(&self) -> Option<BackendError> {
        self.state.lock().error.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_backend_has_no_device() {
        let backend = NullBackend;
        assert!(backend.open_device().is_none());
        assert!(backend.take_error().is_none());
    }

    #[test]
    fn test_headless_handles_are_unique() {
        let backend = HeadlessBackend::new();
        let a = backend.create_buffer();
        let b = backend.create_buffer();
        let v = backend.create_voice();

        assert_ne!(a, b);
        assert_ne!(a.0, v.0);
        assert_eq!(backend.live_buffer_count(), 2);
        assert_eq!(backend.live_voice_count(), 1);
    }

    #[test]
    fn test_headless_upload_records_payload() {
        let backend = HeadlessBackend::new();
        let buffer = backend.create_buffer();
        backend.upload_buffer(buffer, ChannelFormat::Stereo16, &[0; 16], 48000);

        let record = backend.buffer(buffer).unwrap();
        assert_eq!(record.format, Some(ChannelFormat::Stereo16));
        assert_eq!(record.byte_len, 16);
        assert_eq!(record.sample_rate, 48000);
        assert!(backend.take_error().is_none());
    }

    #[test]
    fn test_headless_invalid_voice_raises_error() {
        let backend = HeadlessBackend::new();
        backend.play_voice(VoiceId(99));
        assert_eq!(backend.take_error(), Some(BackendError::InvalidName));
        assert!(backend.take_error().is_none());
    }

    #[test]
    fn test_headless_buffer_in_use_cannot_be_deleted() {
        let backend = HeadlessBackend::new();
        let buffer = backend.create_buffer();
        let voice = backend.create_voice();
        backend.set_voice_buffer(voice, buffer);

        backend.delete_buffer(buffer);
        assert_eq!(backend.take_error(), Some(BackendError::InvalidOperation));

        backend.delete_voice(voice);
        backend.delete_buffer(buffer);
        assert!(backend.take_error().is_none());
        assert_eq!(backend.live_buffer_count(), 0);
    }

    #[test]
    fn test_headless_play_stop_counts() {
        let backend = HeadlessBackend::new();
        let voice = backend.create_voice();
        backend.play_voice(voice);
        backend.stop_voice(voice);
        backend.play_voice(voice);

        let record = backend.voice(voice).unwrap();
        assert!(record.playing);
        assert_eq!(record.play_count, 2);
        assert_eq!(record.stop_count, 1);
        assert_eq!(backend.playing_voices(), vec![voice]);
    }

    #[test]
    fn test_headless_last_close_reclaims_handles() {
        let backend = HeadlessBackend::new();
        let first = backend.open_device().unwrap();
        let second = backend.open_device().unwrap();
        backend.create_buffer();
        backend.create_voice();

        backend.close_device(first);
        assert_eq!(backend.live_buffer_count(), 1);

        backend.close_device(second);
        assert_eq!(backend.live_buffer_count(), 0);
        assert_eq!(backend.live_voice_count(), 0);
        assert!(backend.take_error().is_none());
    }

    #[test]
    fn test_headless_context_failures() {
        let backend = HeadlessBackend::with_options(HeadlessOptions {
            fail_context: true,
            ..Default::default()
        });
        let device = backend.open_device().unwrap();
        assert!(backend.create_context(device).is_none());
        assert_eq!(backend.device_error(device), Some(ContextError::InvalidDevice));
        assert_eq!(backend.device_error(device), None);
    }

    #[test]
    fn test_headless_vorbis_extension() {
        let backend = HeadlessBackend::with_options(HeadlessOptions {
            vorbis_extension: true,
            ..Default::default()
        });
        let device = backend.open_device().unwrap();
        assert!(backend.is_extension_present(device, VORBIS_EXTENSION));
        assert!(!backend.is_extension_present(device, "EXT_mp3"));
    }
}
