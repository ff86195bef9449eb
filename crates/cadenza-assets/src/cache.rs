//! Sound buffer cache
//!
//! Maps logical sound names to decoded buffers. A name is decoded at most
//! once for the lifetime of the cache; failures are never cached, so a
//! missing sound is probed again on every lookup.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use ahash::AHashMap;
use cadenza_platform::{DeviceLink, FileSystem, PlatformResult};

use crate::buffer::SoundBuffer;
use crate::format::{FormatEntry, FormatTable, SoundFormat};
use crate::pipeline::{DEFAULT_CHUNK_SIZE, decode_file};
use crate::{AssetError, AssetResult};

/// Decoded buffers by logical name
pub struct SoundBufferCache {
    link: DeviceLink,
    files: FileSystem,
    formats: FormatTable,
    chunk_size: usize,
    entries: AHashMap<String, Rc<SoundBuffer>>,
    decodes: usize,
}

impl SoundBufferCache {
    /// Create an empty cache with no search root
    pub fn new(link: DeviceLink, formats: FormatTable) -> Self {
        Self {
            link,
            files: FileSystem::new(),
            formats,
            chunk_size: DEFAULT_CHUNK_SIZE,
            entries: AHashMap::new(),
            decodes: 0,
        }
    }

    /// Set the decode chunk size
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Root all lookups at `root`. Fails if the directory is missing.
    pub fn set_search_root(&mut self, root: impl AsRef<Path>) -> PlatformResult<()> {
        self.files.set_root(root)
    }

    /// Current search root
    pub fn search_root(&self) -> Option<&Path> {
        self.files.root()
    }

    /// Format lookup table
    pub fn formats(&self) -> &FormatTable {
        &self.formats
    }

    fn resolve(&self, name: &str) -> Option<(PathBuf, &FormatEntry)> {
        self.formats.iter().find_map(|entry| {
            let candidate = self.files.candidate(name, entry.extension())?;
            self.files.exists(&candidate).then_some((candidate, entry))
        })
    }

    /// Find the first existing file for `name` in priority order
    pub fn find_sound_file(&self, name: &str) -> Option<(PathBuf, SoundFormat)> {
        self.resolve(name)
            .map(|(path, entry)| (path, entry.format()))
    }

    /// Look up a buffer, decoding it on first use
    pub fn get(&mut self, name: &str) -> Option<Rc<SoundBuffer>> {
        if let Some(buffer) = self.entries.get(name) {
            log::debug!("Sound '{}' loaded from cache", name);
            return Some(Rc::clone(buffer));
        }

        match self.load(name) {
            Ok(buffer) => Some(buffer),
            Err(AssetError::NotFound(_)) => {
                log::trace!(
                    "Couldn't find audio file '{}' in {:?}",
                    name,
                    self.files.root()
                );
                None
            }
            Err(err) => {
                log::warn!("Error decoding sound '{}': {}", name, err);
                None
            }
        }
    }

    fn load(&mut self, name: &str) -> AssetResult<Rc<SoundBuffer>> {
        let (path, entry) = self
            .resolve(name)
            .ok_or_else(|| AssetError::NotFound(name.to_string()))?;
        log::debug!("Audio file '{}' found as {}", name, path.display());

        let buffer = decode_file(entry.decoder(), &path, &self.link, self.chunk_size)?;
        self.decodes += 1;

        let buffer = Rc::new(buffer);
        self.entries.insert(name.to_string(), Rc::clone(&buffer));
        Ok(buffer)
    }

    /// Check if `name` is decoded
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of cached buffers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of successful decodes performed
    pub fn decode_count(&self) -> usize {
        self.decodes
    }

    /// Total PCM bytes held
    pub fn decoded_bytes(&self) -> usize {
        self.entries.values().map(|b| b.pcm_bytes().len()).sum()
    }

    /// Drop every buffer, releasing the device copies.
    ///
    /// Voices bound to these buffers must be released first.
    pub fn release_all(&mut self) {
        if !self.entries.is_empty() {
            log::debug!("Releasing {} cached sound buffers", self.entries.len());
        }
        self.entries.clear();
    }
}
