//! Ambient sounds
//!
//! Looping background sounds. The `playing` flag is the logical state the
//! slot registry reasons about; it is kept even for placeholders, which
//! produce no output.

use crate::source::SoundSource;

/// Looping source with a logical playing flag
#[derive(Debug)]
pub struct AmbientSound {
    source: SoundSource,
    playing: bool,
}

impl AmbientSound {
    /// Wrap `source`, switching it to looping playback
    pub fn new(source: SoundSource) -> Self {
        source.set_looping(true);
        Self {
            source,
            playing: false,
        }
    }

    /// Silent ambient sound
    pub fn placeholder() -> Self {
        Self::new(SoundSource::placeholder())
    }

    pub fn play(&mut self) {
        self.source.play();
        self.playing = true;
    }

    pub fn stop(&mut self) {
        self.source.stop();
        self.playing = false;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_placeholder(&self) -> bool {
        self.source.is_placeholder()
    }

    /// Underlying source
    pub fn source(&self) -> &SoundSource {
        &self.source
    }
}
