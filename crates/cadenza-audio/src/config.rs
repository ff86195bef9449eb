//! Audio configuration

use std::path::{Path, PathBuf};

use cadenza_assets::DEFAULT_CHUNK_SIZE;
use cadenza_platform::DistanceModel;
use serde::{Deserialize, Serialize};

use crate::AudioResult;

/// Audio system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Sound search root, applied at construction when set
    pub sound_path: Option<PathBuf>,
    /// Fixed listener gain
    pub listener_gain: f32,
    /// Rolloff factor given to every new voice
    pub rolloff_factor: f32,
    /// Distance attenuation model
    pub distance_model: DistanceModel,
    /// Decode chunk size in bytes
    pub decode_chunk_size: usize,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sound_path: None,
            listener_gain: 0.3,
            rolloff_factor: 0.7,
            distance_model: DistanceModel::Exponent,
            decode_chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl AudioConfig {
    /// Parse a JSON configuration. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> AudioResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> AudioResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Set the sound search root
    pub fn with_sound_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.sound_path = Some(path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AudioError;

    #[test]
    fn test_config_default() {
        let config = AudioConfig::default();
        assert_eq!(config.listener_gain, 0.3);
        assert_eq!(config.rolloff_factor, 0.7);
        assert_eq!(config.distance_model, DistanceModel::Exponent);
        assert_eq!(config.decode_chunk_size, 32768);
        assert!(config.sound_path.is_none());
    }

    #[test]
    fn test_config_partial_json() {
        let config = AudioConfig::from_json_str(
            r#"{ "sound_path": "data/sounds", "distance_model": "inverse_clamped" }"#,
        )
        .unwrap();

        assert_eq!(config.sound_path, Some(PathBuf::from("data/sounds")));
        assert_eq!(config.distance_model, DistanceModel::InverseClamped);
        assert_eq!(config.listener_gain, 0.3);
    }

    #[test]
    fn test_config_invalid_json() {
        let result = AudioConfig::from_json_str("{ listener_gain: }");
        assert!(matches!(result, Err(AudioError::Config(_))));
    }

    #[test]
    fn test_config_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audio.json");
        std::fs::write(&path, r#"{ "listener_gain": 0.5 }"#).unwrap();

        let config = AudioConfig::load(&path).unwrap();
        assert_eq!(config.listener_gain, 0.5);

        let missing = AudioConfig::load(dir.path().join("nope.json"));
        assert!(matches!(missing, Err(AudioError::Io(_))));
    }
}
