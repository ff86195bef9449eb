//! Bitstream decoders
//!
//! A decoder opens an encoded file and exposes it as a stream of
//! interleaved 16-bit little-endian samples, read in caller-sized chunks.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use hound::{SampleFormat, WavReader};
use lewton::inside_ogg::OggStreamReader;

use crate::{AssetError, AssetResult};

/// An opened, decodable stream
pub trait DecodedStream {
    /// Channel count from the stream header
    fn channels(&self) -> u16;

    /// Sample rate from the stream header
    fn sample_rate(&self) -> u32;

    /// Decode into `out`, returning the number of bytes written.
    ///
    /// `Ok(0)` marks the end of the stream.
    fn read(&mut self, out: &mut [u8]) -> AssetResult<usize>;
}

/// Opens encoded files of one format
pub trait StreamDecoder {
    /// Short name for diagnostics
    fn name(&self) -> &'static str;

    /// Open `path` for decoding
    fn open(&self, path: &Path) -> AssetResult<Box<dyn DecodedStream>>;
}

/// Decoded samples waiting to be copied out
#[derive(Debug, Default)]
struct PendingSamples {
    samples: Vec<i16>,
    cursor: usize,
}

impl PendingSamples {
    fn is_drained(&self) -> bool {
        self.cursor >= self.samples.len()
    }

    fn refill(&mut self, samples: Vec<i16>) {
        self.samples = samples;
        self.cursor = 0;
    }

    /// Copy whole samples into `out`
    fn drain_into(&mut self, out: &mut [u8]) -> usize {
        let remaining = &self.samples[self.cursor..];
        let count = remaining.len().min(out.len() / 2);
        for (dst, sample) in out.chunks_exact_mut(2).zip(&remaining[..count]) {
            dst.copy_from_slice(&sample.to_le_bytes());
        }
        self.cursor += count;
        count * 2
    }
}

/// Ogg Vorbis decoder
#[derive(Debug, Default, Clone, Copy)]
pub struct VorbisDecoder;

struct VorbisStream {
    reader: OggStreamReader<BufReader<File>>,
    pending: PendingSamples,
}

impl StreamDecoder for VorbisDecoder {
    fn name(&self) -> &'static str {
        "vorbis"
    }

    fn open(&self, path: &Path) -> AssetResult<Box<dyn DecodedStream>> {
        let file = File::open(path)?;
        let reader = OggStreamReader::new(BufReader::new(file)).map_err(|e| AssetError::Open {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(Box::new(VorbisStream {
            reader,
            pending: PendingSamples::default(),
        }))
    }
}

impl DecodedStream for VorbisStream {
    fn channels(&self) -> u16 {
        u16::from(self.reader.ident_hdr.audio_channels)
    }

    fn sample_rate(&self) -> u32 {
        self.reader.ident_hdr.audio_sample_rate
    }

    fn read(&mut self, out: &mut [u8]) -> AssetResult<usize> {
        while self.pending.is_drained() {
            let packet = self
                .reader
                .read_dec_packet_itl()
                .map_err(|e| AssetError::Decode(e.to_string()))?;
            match packet {
                Some(samples) => self.pending.refill(samples),
                None => return Ok(0),
            }
        }
        Ok(self.pending.drain_into(out))
    }
}

/// RIFF WAVE decoder
#[derive(Debug, Default, Clone, Copy)]
pub struct WaveDecoder;

struct WaveStream {
    reader: WavReader<BufReader<File>>,
}

impl StreamDecoder for WaveDecoder {
    fn name(&self) -> &'static str {
        "wave"
    }

    fn open(&self, path: &Path) -> AssetResult<Box<dyn DecodedStream>> {
        let reader = WavReader::open(path).map_err(|e| AssetError::Open {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Box::new(WaveStream { reader }))
    }
}

/// Rescale an integer sample of `bits` depth to 16 bits
fn to_i16(sample: i32, bits: u16) -> i16 {
    if bits > 16 {
        (sample >> (bits - 16)) as i16
    } else {
        (sample << (16 - bits)) as i16
    }
}

impl DecodedStream for WaveStream {
    fn channels(&self) -> u16 {
        self.reader.spec().channels
    }

    fn sample_rate(&self) -> u32 {
        self.reader.spec().sample_rate
    }

    fn read(&mut self, out: &mut [u8]) -> AssetResult<usize> {
        let spec = self.reader.spec();
        let want = out.len() / 2;
        let mut written = 0;

        match spec.sample_format {
            SampleFormat::Int => {
                for sample in self.reader.samples::<i32>().take(want) {
                    let sample = sample.map_err(|e| AssetError::Decode(e.to_string()))?;
                    let value = to_i16(sample, spec.bits_per_sample);
                    out[written * 2..written * 2 + 2].copy_from_slice(&value.to_le_bytes());
                    written += 1;
                }
            }
            SampleFormat::Float => {
                for sample in self.reader.samples::<f32>().take(want) {
                    let sample = sample.map_err(|e| AssetError::Decode(e.to_string()))?;
                    let value = (sample.clamp(-1.0, 1.0) * 32767.0) as i16;
                    out[written * 2..written * 2 + 2].copy_from_slice(&value.to_le_bytes());
                    written += 1;
                }
            }
        }

        Ok(written * 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Silent Ogg Vorbis streams of 1024 frames each
    const SILENCE_MONO: &[u8] = include_bytes!("../testdata/silence_mono.ogg");
    const SILENCE_STEREO: &[u8] = include_bytes!("../testdata/silence_stereo.ogg");
    const SILENCE_FRAMES: usize = 1024;

    fn write_wav(path: &Path, spec: hound::WavSpec, frames: usize) {
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for i in 0..frames * spec.channels as usize {
            match (spec.sample_format, spec.bits_per_sample) {
                (SampleFormat::Float, _) => writer.write_sample(0.5f32).unwrap(),
                (SampleFormat::Int, 8) => writer.write_sample((i % 100) as i8).unwrap(),
                _ => writer.write_sample((i % 1000) as i16).unwrap(),
            }
        }
        writer.finalize().unwrap();
    }

    fn read_all(stream: &mut dyn DecodedStream, chunk: usize) -> Vec<u8> {
        let mut buf = vec![0u8; chunk];
        let mut out = Vec::new();
        loop {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            out.extend_from_slice(&buf[..n]);
        }
        out
    }

    #[test]
    fn test_pending_samples_drain() {
        let mut pending = PendingSamples::default();
        pending.refill(vec![1, -1, 256]);

        let mut out = [0u8; 5];
        assert_eq!(pending.drain_into(&mut out), 4);
        assert_eq!(&out[..4], &[1, 0, 0xFF, 0xFF]);
        assert!(!pending.is_drained());

        assert_eq!(pending.drain_into(&mut out), 2);
        assert_eq!(&out[..2], &[0, 1]);
        assert!(pending.is_drained());
    }

    #[test]
    fn test_sample_rescaling() {
        assert_eq!(to_i16(1000, 16), 1000);
        assert_eq!(to_i16(1, 8), 256);
        assert_eq!(to_i16(0x10_0000, 24), 0x1000);
        assert_eq!(to_i16(-128, 8), i16::MIN);
    }

    #[test]
    fn test_wave_decoder_16bit_stereo() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 22050,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        write_wav(&path, spec, 300);

        let mut stream = WaveDecoder.open(&path).unwrap();
        assert_eq!(stream.channels(), 2);
        assert_eq!(stream.sample_rate(), 22050);

        let pcm = read_all(stream.as_mut(), 128);
        assert_eq!(pcm.len(), 300 * 2 * 2);
        assert_eq!(&pcm[2..4], &1i16.to_le_bytes());
    }

    #[test]
    fn test_wave_decoder_rescales_depths() {
        let dir = tempfile::tempdir().unwrap();

        let path = dir.path().join("low.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 8,
            sample_format: SampleFormat::Int,
        };
        write_wav(&path, spec, 10);
        let pcm = read_all(WaveDecoder.open(&path).unwrap().as_mut(), 64);
        assert_eq!(pcm.len(), 20);
        assert_eq!(&pcm[2..4], &256i16.to_le_bytes());

        let path = dir.path().join("float.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        write_wav(&path, spec, 4);
        let pcm = read_all(WaveDecoder.open(&path).unwrap().as_mut(), 64);
        assert_eq!(pcm.len(), 8);
        assert_eq!(&pcm[..2], &16383i16.to_le_bytes());
    }

    #[test]
    fn test_wave_decoder_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.wav");
        std::fs::write(&path, b"definitely not a riff header").unwrap();

        let result = WaveDecoder.open(&path);
        assert!(matches!(result, Err(AssetError::Open { .. })));
    }

    #[test]
    fn test_vorbis_decoder_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.ogg");
        std::fs::write(&path, vec![0u8; 64]).unwrap();

        assert!(VorbisDecoder.open(&path).is_err());
    }

    #[test]
    fn test_vorbis_decoder_missing_file() {
        let result = VorbisDecoder.open(Path::new("/nonexistent/cadenza/sound.ogg"));
        assert!(matches!(result, Err(AssetError::IoError(_))));
    }

    #[test]
    fn test_vorbis_decoder_mono() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("silence.ogg");
        std::fs::write(&path, SILENCE_MONO).unwrap();

        let mut stream = VorbisDecoder.open(&path).unwrap();
        assert_eq!(stream.channels(), 1);
        assert_eq!(stream.sample_rate(), 22050);

        // one packet holds 128 frames; 64-byte reads split every packet
        let pcm = read_all(stream.as_mut(), 64);
        assert_eq!(pcm.len(), SILENCE_FRAMES * 2);
        assert!(pcm.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_vorbis_decoder_stereo() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("silence.ogg");
        std::fs::write(&path, SILENCE_STEREO).unwrap();

        let mut stream = VorbisDecoder.open(&path).unwrap();
        assert_eq!(stream.channels(), 2);
        assert_eq!(stream.sample_rate(), 44100);

        let pcm = read_all(stream.as_mut(), 4096);
        assert_eq!(pcm.len(), SILENCE_FRAMES * 2 * 2);
    }
}
