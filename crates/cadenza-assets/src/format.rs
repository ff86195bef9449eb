//! Supported sound formats
//!
//! Lookups try each entry of a [`FormatTable`] in order; the first
//! extension with an existing file wins. New formats are appended.

use crate::decoder::{StreamDecoder, VorbisDecoder, WaveDecoder};

/// Encoded format of a sound file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundFormat {
    /// Ogg Vorbis
    Vorbis,
    /// RIFF WAVE
    Wave,
}

impl SoundFormat {
    /// Canonical file extension
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Vorbis => "ogg",
            Self::Wave => "wav",
        }
    }
}

impl std::fmt::Display for SoundFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vorbis => write!(f, "Ogg Vorbis"),
            Self::Wave => write!(f, "WAVE"),
        }
    }
}

/// One lookup entry
pub struct FormatEntry {
    extension: String,
    format: SoundFormat,
    decoder: Box<dyn StreamDecoder>,
}

impl FormatEntry {
    /// File extension without the dot
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Format tag
    pub fn format(&self) -> SoundFormat {
        self.format
    }

    /// Decoder for files of this entry
    pub fn decoder(&self) -> &dyn StreamDecoder {
        self.decoder.as_ref()
    }
}

impl std::fmt::Debug for FormatEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatEntry")
            .field("extension", &self.extension)
            .field("format", &self.format)
            .field("decoder", &self.decoder.name())
            .finish()
    }
}

/// Ordered extension lookup table
#[derive(Debug, Default)]
pub struct FormatTable {
    entries: Vec<FormatEntry>,
}

impl FormatTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Ogg Vorbis first, then WAVE
    pub fn standard() -> Self {
        Self::new()
            .with(SoundFormat::Vorbis.extension(), SoundFormat::Vorbis, VorbisDecoder)
            .with(SoundFormat::Wave.extension(), SoundFormat::Wave, WaveDecoder)
    }

    /// Append an entry with the lowest priority so far
    pub fn with(
        mut self,
        extension: impl Into<String>,
        format: SoundFormat,
        decoder: impl StreamDecoder + 'static,
    ) -> Self {
        self.push(extension, format, Box::new(decoder));
        self
    }

    /// Append a boxed decoder
    pub fn push(
        &mut self,
        extension: impl Into<String>,
        format: SoundFormat,
        decoder: Box<dyn StreamDecoder>,
    ) {
        self.entries.push(FormatEntry {
            extension: extension.into(),
            format,
            decoder,
        });
    }

    /// Entries in priority order
    pub fn iter(&self) -> impl Iterator<Item = &FormatEntry> {
        self.entries.iter()
    }

    /// Extensions in priority order
    pub fn extensions(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.extension.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
