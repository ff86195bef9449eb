//! Decoded sound buffers

use cadenza_platform::{BufferId, ChannelFormat, DeviceBuffer};

/// Immutable decoded PCM payload and its device-side copy
#[derive(Debug)]
pub struct SoundBuffer {
    format: ChannelFormat,
    sample_rate: u32,
    pcm: Vec<u8>,
    device: DeviceBuffer,
}

impl SoundBuffer {
    pub(crate) fn new(
        format: ChannelFormat,
        sample_rate: u32,
        pcm: Vec<u8>,
        device: DeviceBuffer,
    ) -> Self {
        Self {
            format,
            sample_rate,
            pcm,
            device,
        }
    }

    /// Channel layout
    pub fn format(&self) -> ChannelFormat {
        self.format
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Interleaved 16-bit little-endian samples
    pub fn pcm_bytes(&self) -> &[u8] {
        &self.pcm
    }

    /// Handle of the uploaded device buffer
    pub fn device_buffer(&self) -> BufferId {
        self.device.id()
    }

    /// Number of sample frames
    pub fn frame_count(&self) -> usize {
        self.pcm.len() / self.format.frame_size()
    }

    /// Playback length in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frame_count() as f64 / f64::from(self.sample_rate)
    }
}
