//! Shared test fixtures

use std::path::Path;
use std::rc::Rc;

use cadenza_assets::{FormatTable, SoundBuffer, SoundBufferCache};
use cadenza_platform::{DeviceLink, HeadlessBackend, HeadlessOptions};
use tempfile::TempDir;

use crate::config::AudioConfig;
use crate::system::AudioSystem;

pub const MONO: u16 = 1;
pub const STEREO: u16 = 2;

/// Write a 16-bit WAVE file of `frames` frames
pub fn write_wav(path: &Path, channels: u16, frames: usize) {
    let spec = hound::WavSpec {
        channels,
        sample_rate: 22050,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..frames * channels as usize {
        writer.write_sample((i % 512) as i16).unwrap();
    }
    writer.finalize().unwrap();
}

/// Sound directory holding `(name, channels, frames)` WAVE files
pub fn sound_dir(sounds: &[(&str, u16, usize)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, channels, frames) in sounds {
        write_wav(&dir.path().join(format!("{name}.wav")), *channels, *frames);
    }
    dir
}

/// Headless backend plus a cache rooted at a populated sound directory
pub struct Fixture {
    // keeps the sound files on disk
    _dir: TempDir,
    pub backend: Rc<HeadlessBackend>,
    pub link: DeviceLink,
    pub cache: SoundBufferCache,
}

impl Fixture {
    pub fn new(sounds: &[(&str, u16, usize)]) -> Self {
        let dir = sound_dir(sounds);
        let backend = Rc::new(HeadlessBackend::new());
        let link = DeviceLink::new(backend.clone());
        let mut cache = SoundBufferCache::new(link.clone(), FormatTable::standard());
        cache.set_search_root(dir.path()).unwrap();
        Self {
            _dir: dir,
            backend,
            link,
            cache,
        }
    }

    pub fn buffer(&mut self, name: &str) -> Rc<SoundBuffer> {
        self.cache.get(name).unwrap()
    }
}

/// Audio system on a headless device
pub fn headless_system(
    options: HeadlessOptions,
    config: AudioConfig,
) -> (AudioSystem, Rc<HeadlessBackend>) {
    let backend = Rc::new(HeadlessBackend::with_options(options));
    let system = AudioSystem::new(backend.clone(), config);
    (system, backend)
}
