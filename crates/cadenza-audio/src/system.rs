//! Audio system
//!
//! Owns the device and context, the buffer cache and both registries. The
//! device is brought up at construction; when that fails the system stays
//! `Unavailable` for the rest of the run and every operation quietly does
//! nothing.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use cadenza_assets::{FormatTable, SoundBuffer, SoundBufferCache, SoundFormat};
use cadenza_core::{CameraPose, ListenerState};
use cadenza_platform::audio::{VORBIS_EXTENSION, error_string};
use cadenza_platform::{
    ContextError, ContextGuard, DeviceGuard, DeviceLink, PlatformError, PlatformResult,
    SharedBackend,
};
use glam::Vec3;

use crate::ambient::AmbientSound;
use crate::config::AudioConfig;
use crate::registry::{AmbientSlotRegistry, NamedSourceRegistry, SlotChange};
use crate::source::SoundSource;

/// Lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemState {
    /// Device and context are bound
    Active,
    /// No usable device for this run
    Unavailable,
    /// Torn down after being active
    ShutDown,
}

// Fields drop in declaration order: the context goes before the device.
struct ActiveDevice {
    context: ContextGuard,
    device: DeviceGuard,
}

/// Audio resource manager
pub struct AudioSystem {
    config: AudioConfig,
    link: DeviceLink,
    state: SystemState,
    can_vorbis: bool,
    cache: SoundBufferCache,
    sources: NamedSourceRegistry,
    ambient: AmbientSlotRegistry,
    listener: ListenerState,
    device: Option<ActiveDevice>,
}

impl AudioSystem {
    /// Bring up the default device with the standard format table
    pub fn new(backend: SharedBackend, config: AudioConfig) -> Self {
        Self::with_formats(backend, config, FormatTable::standard())
    }

    /// Bring up the default device with a custom format table
    pub fn with_formats(backend: SharedBackend, config: AudioConfig, formats: FormatTable) -> Self {
        let link = DeviceLink::new(backend);
        let cache =
            SoundBufferCache::new(link.clone(), formats).with_chunk_size(config.decode_chunk_size);

        let (device, state, can_vorbis) = match Self::bring_up(link.backend(), &config) {
            Ok((device, can_vorbis)) => (Some(device), SystemState::Active, can_vorbis),
            Err(err) => {
                log::warn!("Audio disabled: {}", err);
                (None, SystemState::Unavailable, false)
            }
        };

        let mut system = Self {
            config,
            link,
            state,
            can_vorbis,
            cache,
            sources: NamedSourceRegistry::new(),
            ambient: AmbientSlotRegistry::new(),
            listener: ListenerState::default(),
            device,
        };

        if let Some(path) = system.config.sound_path.clone() {
            system.init(path);
        }

        system
    }

    fn bring_up(backend: &SharedBackend, config: &AudioConfig) -> PlatformResult<(ActiveDevice, bool)> {
        let device = DeviceGuard::open(backend).ok_or(PlatformError::DeviceUnavailable)?;

        let can_vorbis = device.has_extension(VORBIS_EXTENSION);
        if can_vorbis {
            log::info!("Vorbis extension present");
        } else {
            log::info!("Vorbis extension NOT present");
        }

        let Some(mut context) = ContextGuard::create(&device) else {
            let error = device.error();
            log::error!("Unable to initialize audio context: {}", error_string(error));
            return Err(error.unwrap_or(ContextError::InvalidContext).into());
        };

        let bound = context.make_current();
        let pending = device.error();
        if !bound || pending.is_some() {
            log::error!("Error setting audio context: {}", error_string(pending));
            return Err(pending.unwrap_or(ContextError::InvalidContext).into());
        }

        backend.set_distance_model(config.distance_model);

        log::info!("Audio backend version: {}", backend.version());
        log::info!("Audio device: {}", device.name());

        Ok((ActiveDevice { context, device }, can_vorbis))
    }

    /// Set the sound search root and seed the placeholder ambient sound
    pub fn init(&mut self, path: impl AsRef<Path>) {
        if !self.is_available() {
            log::info!("Audio system unavailable, ignoring init");
            return;
        }

        let path = path.as_ref();
        match self.cache.set_search_root(path) {
            Ok(()) => log::info!("Sound search root: {}", path.display()),
            Err(err) => log::warn!("Sound search root unusable: {}", err),
        }

        self.ambient.seed_placeholder();
    }

    /// Current lifecycle state
    pub fn state(&self) -> SystemState {
        self.state
    }

    /// Whether the device is up
    pub fn is_available(&self) -> bool {
        self.state == SystemState::Active
    }

    /// Whether the device advertised the Vorbis extension
    pub fn can_vorbis(&self) -> bool {
        self.can_vorbis
    }

    pub fn config(&self) -> &AudioConfig {
        &self.config
    }

    pub fn search_root(&self) -> Option<&Path> {
        self.cache.search_root()
    }

    /// Last listener state pushed to the device
    pub fn listener_state(&self) -> &ListenerState {
        &self.listener
    }

    pub fn cache(&self) -> &SoundBufferCache {
        &self.cache
    }

    /// Resolve `name` to a file without decoding it
    pub fn find_sound_file(&self, name: &str) -> Option<(PathBuf, SoundFormat)> {
        self.cache.find_sound_file(name)
    }

    /// Decoded buffer for `name`, loading it on first use.
    ///
    /// A buffer still held at shutdown stays readable but no longer
    /// touches the device.
    pub fn load_sound(&mut self, name: &str) -> Option<Rc<SoundBuffer>> {
        if !self.is_available() {
            return None;
        }
        self.cache.get(name)
    }

    /// Register a source named `name` playing `sound_name`.
    ///
    /// An already registered name returns the existing source. A sound
    /// that cannot be loaded still yields a registered placeholder.
    pub fn create_source(&mut self, name: &str, sound_name: &str) -> Option<&mut SoundSource> {
        if !self.is_available() {
            return None;
        }

        let cache = &mut self.cache;
        let link = &self.link;
        let rolloff = self.config.rolloff_factor;
        let source = self.sources.create_with(name, || {
            let buffer = cache.get(sound_name);
            if buffer.is_none() {
                log::info!(
                    "Sound source {} not available: {} could not be loaded",
                    name,
                    sound_name
                );
            }
            SoundSource::from_buffer(link, buffer.as_ref(), rolloff)
        });
        Some(source)
    }

    /// Source registered as `name`, or a new placeholder under that name
    pub fn get_source(&mut self, name: &str) -> Option<&mut SoundSource> {
        if !self.is_available() {
            return None;
        }
        Some(self.sources.get_or_placeholder(name))
    }

    /// Unregister a source, releasing its voice
    pub fn remove_source(&mut self, name: &str) -> bool {
        self.sources.remove(name)
    }

    pub fn has_source(&self, name: &str) -> bool {
        self.sources.contains(name)
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Ambient sound for `name`, created on first use
    pub fn get_ambient_sound(&mut self, name: &str) -> Option<&mut AmbientSound> {
        if !self.is_available() {
            return None;
        }

        if !self.ambient.has_sound(name) {
            let buffer = self.cache.get(name)?;
            let source = SoundSource::new(&self.link, &buffer, self.config.rolloff_factor);
            self.ambient.insert_sound(name, AmbientSound::new(source));
        }
        self.ambient.sound_mut(name)
    }

    /// Switch `slot` to the ambient sound `name`.
    ///
    /// Playback carries over from the previous occupant; `autoplay` starts
    /// the new sound regardless.
    pub fn set_ambient(&mut self, slot: &str, name: &str, autoplay: bool) {
        if !self.is_available() {
            return;
        }

        let resolved = self.get_ambient_sound(name).is_some();
        match self.ambient.assign(slot, resolved.then_some(name), autoplay) {
            SlotChange::Unchanged => {}
            SlotChange::Switched => log::info!("Ambient {} switched to {}", slot, name),
            SlotChange::FellBack => {
                log::debug!("Ambient {} sound {} unavailable, using placeholder", slot, name)
            }
        }
    }

    /// Ambient sound held by `slot`
    pub fn ambient_in_slot(&self, slot: &str) -> Option<&AmbientSound> {
        self.ambient.ambient_in_slot(slot)
    }

    /// Sound name held by `slot`
    pub fn slot_sound_name(&self, slot: &str) -> Option<&str> {
        self.ambient.slot_sound_name(slot)
    }

    pub fn stop_all_ambient(&mut self) {
        self.ambient.stop_all();
    }

    /// Push the camera pose to the device listener
    pub fn update_listener(&mut self, camera: &CameraPose, velocity: Vec3) {
        if !self.is_available() {
            return;
        }

        self.listener = ListenerState::from_camera(camera, velocity);
        let backend = self.link.backend();
        backend.set_listener_position(self.listener.position());
        backend.set_listener_velocity(self.listener.velocity());
        backend.set_listener_orientation(self.listener.orientation());
        backend.set_listener_gain(self.config.listener_gain);
    }

    /// Release every sound, then the context, then the device.
    ///
    /// Buffers and source copies still held by callers are detached from
    /// the device before it goes away. Safe to call more than once.
    pub fn shutdown(&mut self) {
        self.ambient.clear();
        self.sources.clear();
        self.cache.release_all();
        self.link.sever();

        if let Some(active) = self.device.take() {
            let context = active.context.id();
            let device = active.device.id();
            drop(active);
            self.state = SystemState::ShutDown;
            log::info!(
                "Audio system shut down (context {}, device {})",
                context.0,
                device.0
            );
        }
    }
}

impl Drop for AudioSystem {
    fn drop(&mut self) {
        self.shutdown();
    }
}
