//! Sound sources
//!
//! A source binds one decoded buffer to a device voice. A source without a
//! buffer is an inert placeholder: every playback call on it does nothing,
//! so callers can hold on to names whose sound never loaded.

use std::rc::{Rc, Weak};

use cadenza_assets::SoundBuffer;
use cadenza_platform::{DeviceLink, Voice, VoiceId};
use glam::Vec3;

struct BoundVoice {
    buffer: Weak<SoundBuffer>,
    voice: Voice,
    rolloff: f32,
}

/// Playable instance of a sound buffer
pub struct SoundSource {
    binding: Option<BoundVoice>,
    relative: bool,
    position: Vec3,
}

impl SoundSource {
    /// Create an inert placeholder
    pub fn placeholder() -> Self {
        Self {
            binding: None,
            relative: false,
            position: Vec3::ZERO,
        }
    }

    /// Bind a fresh voice to `buffer`.
    ///
    /// On a severed link the result is a placeholder.
    pub fn new(link: &DeviceLink, buffer: &Rc<SoundBuffer>, rolloff: f32) -> Self {
        let voice = match Voice::new(link, buffer.device_buffer()) {
            Ok(voice) => voice,
            Err(err) => {
                log::debug!("No voice for sound source: {}", err);
                return Self::placeholder();
            }
        };
        voice.set_position(Vec3::ZERO);
        voice.set_velocity(Vec3::ZERO);
        voice.set_rolloff(rolloff);

        Self {
            binding: Some(BoundVoice {
                buffer: Rc::downgrade(buffer),
                voice,
                rolloff,
            }),
            relative: false,
            position: Vec3::ZERO,
        }
    }

    /// Bind to `buffer` if there is one, otherwise create a placeholder
    pub fn from_buffer(link: &DeviceLink, buffer: Option<&Rc<SoundBuffer>>, rolloff: f32) -> Self {
        match buffer {
            Some(buffer) => Self::new(link, buffer, rolloff),
            None => Self::placeholder(),
        }
    }

    /// Voice that may still be driven. None for placeholders, for sources
    /// whose buffer has been released and once the device is gone.
    fn live_voice(&self) -> Option<&Voice> {
        let bound = self.binding.as_ref()?;
        (bound.buffer.strong_count() > 0 && bound.voice.link().is_live()).then_some(&bound.voice)
    }

    /// Whether this source has no buffer
    pub fn is_placeholder(&self) -> bool {
        self.binding.is_none()
    }

    /// Bound buffer, if still alive
    pub fn buffer(&self) -> Option<Rc<SoundBuffer>> {
        self.binding.as_ref()?.buffer.upgrade()
    }

    /// Device voice handle
    pub fn voice_id(&self) -> Option<VoiceId> {
        self.binding.as_ref().map(|b| b.voice.id())
    }

    pub fn play(&self) {
        if let Some(voice) = self.live_voice() {
            voice.play();
        }
    }

    pub fn stop(&self) {
        if let Some(voice) = self.live_voice() {
            voice.stop();
        }
    }

    pub fn set_looping(&self, looping: bool) {
        if let Some(voice) = self.live_voice() {
            voice.set_looping(looping);
        }
    }

    /// Last position set on this source
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        if let Some(voice) = self.live_voice() {
            voice.set_position(position);
        }
    }

    /// Whether the position is relative to the listener
    pub fn is_relative(&self) -> bool {
        self.relative
    }

    pub fn set_relative(&mut self, relative: bool) {
        self.relative = relative;
        if let Some(voice) = self.live_voice() {
            voice.set_relative(relative);
        }
    }
}

/// Copies share the buffer but get a voice of their own.
impl Clone for SoundSource {
    fn clone(&self) -> Self {
        let fresh = self.binding.as_ref().and_then(|bound| {
            let buffer = bound.buffer.upgrade()?;
            Some(Self::new(bound.voice.link(), &buffer, bound.rolloff))
        });

        let mut copy = fresh.unwrap_or_else(Self::placeholder);
        copy.set_relative(self.relative);
        copy.set_position(self.position);
        copy
    }
}

impl std::fmt::Debug for SoundSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundSource")
            .field("voice", &self.voice_id())
            .field("relative", &self.relative)
            .field("position", &self.position)
            .finish()
    }
}
