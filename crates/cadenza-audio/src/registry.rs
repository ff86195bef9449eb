//! Source and ambient slot registries
//!
//! Both registries are owned by the audio system and only mutated through
//! it. Names stay registered until shutdown.

use ahash::AHashMap;
use cadenza_core::PLACEHOLDER_SOUND;

use crate::ambient::AmbientSound;
use crate::source::SoundSource;

/// Sources by caller-chosen name
#[derive(Debug, Default)]
pub struct NamedSourceRegistry {
    sources: AHashMap<String, SoundSource>,
}

impl NamedSourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the source built by `make` under `name`.
    ///
    /// An existing entry is returned unchanged and `make` is not called.
    pub fn create_with(
        &mut self,
        name: &str,
        make: impl FnOnce() -> SoundSource,
    ) -> &mut SoundSource {
        if self.sources.contains_key(name) {
            log::warn!("Attempt to re-create sound source '{}'", name);
        }
        self.sources.entry(name.to_string()).or_insert_with(make)
    }

    /// Look up `name`, registering an inert placeholder if it is unknown
    pub fn get_or_placeholder(&mut self, name: &str) -> &mut SoundSource {
        if !self.sources.contains_key(name) {
            log::warn!(
                "Attempt to get sound source '{}' before it was created",
                name
            );
        }
        self.sources
            .entry(name.to_string())
            .or_insert_with(SoundSource::placeholder)
    }

    pub fn get(&self, name: &str) -> Option<&SoundSource> {
        self.sources.get(name)
    }

    /// Unregister `name`, releasing its voice
    pub fn remove(&mut self, name: &str) -> bool {
        self.sources.remove(name).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sources.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Release every source
    pub fn clear(&mut self) {
        self.sources.clear();
    }
}

/// Outcome of a slot assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotChange {
    /// The slot already held this sound
    Unchanged,
    /// The slot now holds the requested sound
    Switched,
    /// The requested sound was unavailable; the slot holds the placeholder
    FellBack,
}

/// Ambient sounds by sound name, and the slots pointing at them.
///
/// Slots referencing the same sound name share one [`AmbientSound`].
#[derive(Debug, Default)]
pub struct AmbientSlotRegistry {
    sounds: AHashMap<String, AmbientSound>,
    slots: AHashMap<String, String>,
}

impl AmbientSlotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the silent fallback sound under the empty name
    pub fn seed_placeholder(&mut self) {
        self.sounds
            .entry(PLACEHOLDER_SOUND.to_string())
            .or_insert_with(AmbientSound::placeholder);
    }

    pub fn has_sound(&self, name: &str) -> bool {
        self.sounds.contains_key(name)
    }

    pub fn sound(&self, name: &str) -> Option<&AmbientSound> {
        self.sounds.get(name)
    }

    pub fn sound_mut(&mut self, name: &str) -> Option<&mut AmbientSound> {
        self.sounds.get_mut(name)
    }

    /// Register `sound` under `name`, keeping any existing entry
    pub fn insert_sound(&mut self, name: &str, sound: AmbientSound) -> &mut AmbientSound {
        self.sounds.entry(name.to_string()).or_insert(sound)
    }

    /// Point `slot` at the registered sound `name`.
    ///
    /// `None` (or a name that is not registered) falls back to the
    /// placeholder. The new sound starts playing when the previous
    /// occupant was playing or `autoplay` is set; the placeholder is
    /// never started.
    pub fn assign(&mut self, slot: &str, name: Option<&str>, autoplay: bool) -> SlotChange {
        let resolved = name.filter(|name| self.sounds.contains_key(*name));
        let target = resolved.unwrap_or(PLACEHOLDER_SOUND);

        if self.slots.get(slot).map(String::as_str) == Some(target) {
            return SlotChange::Unchanged;
        }

        let mut was_playing = false;
        let previous = self.slots.get(slot).cloned();
        if let Some(sound) = previous.and_then(|key| self.sounds.get_mut(&key)) {
            if sound.is_playing() {
                was_playing = true;
                sound.stop();
            }
        }

        match resolved {
            Some(name) => {
                if let Some(sound) = self.sounds.get_mut(name) {
                    if was_playing || autoplay {
                        sound.play();
                    }
                }
                self.slots.insert(slot.to_string(), name.to_string());
                SlotChange::Switched
            }
            None => {
                self.seed_placeholder();
                self.slots
                    .insert(slot.to_string(), PLACEHOLDER_SOUND.to_string());
                SlotChange::FellBack
            }
        }
    }

    /// Sound name held by `slot`
    pub fn slot_sound_name(&self, slot: &str) -> Option<&str> {
        self.slots.get(slot).map(String::as_str)
    }

    /// Ambient sound held by `slot`
    pub fn ambient_in_slot(&self, slot: &str) -> Option<&AmbientSound> {
        self.slots.get(slot).and_then(|name| self.sounds.get(name))
    }

    /// Number of assigned slots
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of registered sounds, placeholder included
    pub fn sound_count(&self) -> usize {
        self.sounds.len()
    }

    /// Stop every playing sound
    pub fn stop_all(&mut self) {
        for sound in self.sounds.values_mut().filter(|s| s.is_playing()) {
            sound.stop();
        }
    }

    /// Forget every slot and release every sound
    pub fn clear(&mut self) {
        self.slots.clear();
        self.sounds.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Fixture, MONO, STEREO};

    fn ambient_fixture() -> (Fixture, AmbientSlotRegistry) {
        let mut fixture = Fixture::new(&[("rain", STEREO, 64), ("wind", MONO, 64)]);
        let mut registry = AmbientSlotRegistry::new();
        registry.seed_placeholder();
        for name in ["rain", "wind"] {
            let buffer = fixture.buffer(name);
            let source = SoundSource::new(&fixture.link, &buffer, 0.7);
            registry.insert_sound(name, AmbientSound::new(source));
        }
        (fixture, registry)
    }

    fn voice_of(registry: &AmbientSlotRegistry, name: &str) -> cadenza_platform::VoiceId {
        registry.sound(name).unwrap().source().voice_id().unwrap()
    }

    #[test]
    fn test_create_is_idempotent() {
        let mut registry = NamedSourceRegistry::new();
        registry.create_with("door", SoundSource::placeholder);
        registry
            .create_with("door", || panic!("existing entry must be kept"))
            .set_relative(true);

        assert_eq!(registry.len(), 1);
        assert!(registry.get("door").unwrap().is_relative());
    }

    #[test]
    fn test_get_or_placeholder_registers_once() {
        let mut registry = NamedSourceRegistry::new();
        registry
            .get_or_placeholder("never-created")
            .set_position(glam::Vec3::X);

        let again = registry.get_or_placeholder("never-created");
        assert!(again.is_placeholder());
        assert_eq!(again.position(), glam::Vec3::X);
        assert_eq!(registry.len(), 1);

        assert!(registry.remove("never-created"));
        assert!(!registry.contains("never-created"));
    }

    #[test]
    fn test_assign_without_autoplay_stays_silent() {
        let (fixture, mut registry) = ambient_fixture();

        assert_eq!(registry.assign("weather", Some("rain"), false), SlotChange::Switched);
        assert!(!registry.ambient_in_slot("weather").unwrap().is_playing());
        assert!(fixture.backend.playing_voices().is_empty());
    }

    #[test]
    fn test_assign_with_autoplay_plays() {
        let (fixture, mut registry) = ambient_fixture();

        registry.assign("weather", Some("rain"), true);
        assert!(registry.ambient_in_slot("weather").unwrap().is_playing());
        assert_eq!(
            fixture.backend.playing_voices(),
            vec![voice_of(&registry, "rain")]
        );
    }

    #[test]
    fn test_repeated_assign_is_noop() {
        let (fixture, mut registry) = ambient_fixture();

        registry.assign("weather", Some("rain"), true);
        assert_eq!(registry.assign("weather", Some("rain"), true), SlotChange::Unchanged);

        let record = fixture.backend.voice(voice_of(&registry, "rain")).unwrap();
        assert_eq!(record.play_count, 1);
        assert_eq!(record.stop_count, 0);
    }

    #[test]
    fn test_playing_state_carries_over() {
        let (fixture, mut registry) = ambient_fixture();

        registry.assign("weather", Some("rain"), true);
        registry.assign("weather", Some("wind"), false);

        assert!(!registry.sound("rain").unwrap().is_playing());
        assert!(registry.sound("wind").unwrap().is_playing());
        assert_eq!(registry.slot_sound_name("weather"), Some("wind"));

        let rain = fixture.backend.voice(voice_of(&registry, "rain")).unwrap();
        assert_eq!(rain.stop_count, 1);
    }

    #[test]
    fn test_failed_resolution_falls_back() {
        let (fixture, mut registry) = ambient_fixture();

        registry.assign("weather", Some("rain"), true);
        assert_eq!(registry.assign("weather", None, true), SlotChange::FellBack);

        assert_eq!(registry.slot_sound_name("weather"), Some(PLACEHOLDER_SOUND));
        assert!(registry.ambient_in_slot("weather").unwrap().is_placeholder());
        assert!(!registry.ambient_in_slot("weather").unwrap().is_playing());
        assert!(fixture.backend.playing_voices().is_empty());

        assert_eq!(registry.assign("weather", Some("thunder"), true), SlotChange::Unchanged);
    }

    #[test]
    fn test_slots_share_sound() {
        let (_fixture, mut registry) = ambient_fixture();

        registry.assign("weather", Some("rain"), false);
        registry.assign("biome", Some("rain"), true);

        assert!(registry.ambient_in_slot("weather").unwrap().is_playing());
        assert_eq!(registry.slot_count(), 2);
        assert_eq!(registry.sound_count(), 3);

        registry.stop_all();
        assert!(!registry.ambient_in_slot("biome").unwrap().is_playing());
    }
}
