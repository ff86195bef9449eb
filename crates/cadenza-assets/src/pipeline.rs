//! Decode pipeline
//!
//! Decodes a whole file into memory and uploads the result to a new device
//! buffer. No resampling or transcoding is done.

use std::path::Path;

use cadenza_platform::{ChannelFormat, DeviceBuffer, DeviceLink};

use crate::buffer::SoundBuffer;
use crate::decoder::StreamDecoder;
use crate::{AssetError, AssetResult};

/// Default decode chunk size in bytes
pub const DEFAULT_CHUNK_SIZE: usize = 32768;

/// Smallest chunk that still holds one sample
const MIN_CHUNK_SIZE: usize = 2;

/// Decode `path` with `decoder` and upload it through `link`.
///
/// An upload error is logged; the buffer is still returned.
pub fn decode_file(
    decoder: &dyn StreamDecoder,
    path: &Path,
    link: &DeviceLink,
    chunk_size: usize,
) -> AssetResult<SoundBuffer> {
    let mut stream = decoder.open(path)?;

    let format = ChannelFormat::from_channels(stream.channels());
    let sample_rate = stream.sample_rate();

    let mut chunk = vec![0u8; chunk_size.max(MIN_CHUNK_SIZE)];
    let mut pcm = Vec::new();
    loop {
        let read = stream.read(&mut chunk)?;
        if read == 0 {
            break;
        }
        pcm.extend_from_slice(&chunk[..read]);
    }

    if pcm.is_empty() {
        return Err(AssetError::EmptyStream(path.to_path_buf()));
    }

    let (device, error) = DeviceBuffer::upload(link, format, &pcm, sample_rate)?;
    if let Some(error) = error {
        log::warn!(
            "Audio backend error: {} preparing sound buffer for {}",
            error,
            path.display()
        );
    }

    log::info!(
        "Audio file {} loaded ({:?}, {} Hz, {} bytes, {})",
        path.display(),
        format,
        sample_rate,
        pcm.len(),
        decoder.name()
    );

    Ok(SoundBuffer::new(format, sample_rate, pcm, device))
}
