//! Scoped device resources
//!
//! Each wrapper owns one backend handle and releases it on drop, so every
//! exit path (including failed bring-up) gives the handle back.
//!
//! Buffers and voices reach the backend through a [`DeviceLink`]. Once the
//! owner severs the link they go quiet, so handles that outlive the device
//! never touch it again.

use std::cell::Cell;
use std::rc::Rc;

use glam::Vec3;

use crate::audio::{
    BackendError, BufferId, ChannelFormat, ContextError, ContextId, DeviceId, SharedBackend,
    VoiceId,
};
use crate::{PlatformError, PlatformResult};

/// Backend access shared by every buffer and voice of one device
#[derive(Clone)]
pub struct DeviceLink {
    backend: SharedBackend,
    live: Rc<Cell<bool>>,
}

impl DeviceLink {
    pub fn new(backend: SharedBackend) -> Self {
        Self {
            backend,
            live: Rc::new(Cell::new(true)),
        }
    }

    pub fn backend(&self) -> &SharedBackend {
        &self.backend
    }

    /// Whether handles created through this link may still call the backend
    pub fn is_live(&self) -> bool {
        self.live.get()
    }

    /// Detach every handle created through any clone of this link
    pub fn sever(&self) {
        self.live.set(false);
    }

    fn check(&self) -> PlatformResult<()> {
        if self.is_live() {
            Ok(())
        } else {
            Err(PlatformError::DeviceUnavailable)
        }
    }
}

impl std::fmt::Debug for DeviceLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceLink")
            .field("live", &self.is_live())
            .finish()
    }
}

/// Open output device, closed on drop
pub struct DeviceGuard {
    backend: SharedBackend,
    id: DeviceId,
}

impl DeviceGuard {
    /// Open the default device
    pub fn open(backend: &SharedBackend) -> Option<Self> {
        let id = backend.open_device()?;
        Some(Self {
            backend: Rc::clone(backend),
            id,
        })
    }

    /// Raw handle
    pub fn id(&self) -> DeviceId {
        self.id
    }

    /// Fetch the pending device error
    pub fn error(&self) -> Option<ContextError> {
        self.backend.device_error(self.id)
    }

    /// Check for a device extension
    pub fn has_extension(&self, name: &str) -> bool {
        self.backend.is_extension_present(self.id, name)
    }

    /// Human readable device name
    pub fn name(&self) -> String {
        self.backend.device_name(self.id)
    }
}

impl Drop for DeviceGuard {
    fn drop(&mut self) {
        self.backend.close_device(self.id);
    }
}

/// Rendering context, unbound and destroyed on drop
pub struct ContextGuard {
    backend: SharedBackend,
    id: ContextId,
    current: bool,
}

impl ContextGuard {
    /// Create a context on `device`
    pub fn create(device: &DeviceGuard) -> Option<Self> {
        let id = device.backend.create_context(device.id)?;
        Some(Self {
            backend: Rc::clone(&device.backend),
            id,
            current: false,
        })
    }

    /// Raw handle
    pub fn id(&self) -> ContextId {
        self.id
    }

    /// Bind as the current context
    pub fn make_current(&mut self) -> bool {
        self.current = self.backend.make_context_current(Some(self.id));
        self.current
    }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        if self.current {
            self.backend.make_context_current(None);
        }
        self.backend.destroy_context(self.id);
    }
}

/// Device-side PCM buffer, deleted on drop
pub struct DeviceBuffer {
    link: DeviceLink,
    id: BufferId,
}

impl DeviceBuffer {
    /// Allocate a buffer and upload `data` into it.
    ///
    /// The buffer is returned even when the upload reports an error. Fails
    /// only on a severed link.
    pub fn upload(
        link: &DeviceLink,
        format: ChannelFormat,
        data: &[u8],
        sample_rate: u32,
    ) -> PlatformResult<(Self, Option<BackendError>)> {
        link.check()?;
        let backend = link.backend();
        let id = backend.create_buffer();
        backend.upload_buffer(id, format, data, sample_rate);
        let error = backend.take_error();

        let buffer = Self {
            link: link.clone(),
            id,
        };
        Ok((buffer, error))
    }

    /// Raw handle
    pub fn id(&self) -> BufferId {
        self.id
    }
}

impl Drop for DeviceBuffer {
    fn drop(&mut self) {
        if self.link.is_live() {
            self.link.backend.delete_buffer(self.id);
        }
    }
}

impl std::fmt::Debug for DeviceBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("DeviceBuffer").field(&self.id).finish()
    }
}

/// Buffer-backed voice, stopped and deleted on drop
pub struct Voice {
    link: DeviceLink,
    id: VoiceId,
}

impl Voice {
    /// Allocate a voice playing `buffer`
    pub fn new(link: &DeviceLink, buffer: BufferId) -> PlatformResult<Self> {
        link.check()?;
        let id = link.backend.create_voice();
        link.backend.set_voice_buffer(id, buffer);
        Ok(Self {
            link: link.clone(),
            id,
        })
    }

    /// Raw handle
    pub fn id(&self) -> VoiceId {
        self.id
    }

    /// Link this voice was created through
    pub fn link(&self) -> &DeviceLink {
        &self.link
    }

    /// Backend, while the link holds
    fn backend(&self) -> Option<&SharedBackend> {
        self.link.is_live().then_some(&self.link.backend)
    }

    pub fn set_position(&self, position: Vec3) {
        if let Some(backend) = self.backend() {
            backend.set_voice_position(self.id, position);
        }
    }

    pub fn set_velocity(&self, velocity: Vec3) {
        if let Some(backend) = self.backend() {
            backend.set_voice_velocity(self.id, velocity);
        }
    }

    pub fn set_relative(&self, relative: bool) {
        if let Some(backend) = self.backend() {
            backend.set_voice_relative(self.id, relative);
        }
    }

    pub fn set_rolloff(&self, factor: f32) {
        if let Some(backend) = self.backend() {
            backend.set_voice_rolloff(self.id, factor);
        }
    }

    pub fn set_looping(&self, looping: bool) {
        if let Some(backend) = self.backend() {
            backend.set_voice_looping(self.id, looping);
        }
    }

    pub fn play(&self) {
        if let Some(backend) = self.backend() {
            backend.play_voice(self.id);
        }
    }

    pub fn stop(&self) {
        if let Some(backend) = self.backend() {
            backend.stop_voice(self.id);
        }
    }
}

impl Drop for Voice {
    fn drop(&mut self) {
        if let Some(backend) = self.backend() {
            backend.stop_voice(self.id);
            backend.delete_voice(self.id);
        }
    }
}

impl std::fmt::Debug for Voice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Voice").field(&self.id).finish()
    }
}
