//! Decoded audio sources.
//!
//! A [`BlockSource`] is the pull-based provider the render path reads from:
//! seekable, loopable, and able to fill an interleaved output block with any
//! channel count. [`MemorySource`] keeps the whole decoded file in memory;
//! [`decode_file`] builds one from a WAV (hound) or FLAC (claxon) file.

use std::error::Error;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::time::Duration;

use crate::constants::AUDIO_EXTENSIONS;

pub trait BlockSource: Send {
    fn channels(&self) -> u16;

    fn sample_rate(&self) -> u32;

    fn total_frames(&self) -> u64;

    /// Current read position in frames.
    fn position(&self) -> u64;

    fn seek(&mut self, frame: u64);

    fn set_looping(&mut self, looping: bool);

    fn is_looping(&self) -> bool;

    /// Fills `out` with interleaved frames of `out_channels` channels.
    ///
    /// Returns the number of frames taken from the source. Frames past the end
    /// of a non-looping source are written as silence.
    fn read(&mut self, out: &mut [f32], out_channels: u16) -> usize;

    fn duration(&self) -> Duration {
        let rate = self.sample_rate();
        if rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.total_frames() as f64 / rate as f64)
    }
}

/// A fully decoded file held as interleaved `f32` samples in [-1, 1].
#[derive(Debug, Clone)]
pub struct MemorySource {
    samples: Vec<f32>,
    channels: u16,
    sample_rate: u32,
    frames: usize,
    position: usize,
    looping: bool,
}

impl MemorySource {
    pub fn from_interleaved(
        samples: Vec<f32>,
        channels: u16,
        sample_rate: u32,
    ) -> Result<Self, Box<dyn Error>> {
        if channels == 0 {
            return Err("Audio source must have at least one channel".into());
        }
        if sample_rate == 0 {
            return Err("Audio source must have a non-zero sample rate".into());
        }

        let frames = samples.len() / channels as usize;

        Ok(Self {
            samples,
            channels,
            sample_rate,
            frames,
            position: 0,
            looping: false,
        })
    }
}

impl BlockSource for MemorySource {
    fn channels(&self) -> u16 {
        self.channels
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_frames(&self) -> u64 {
        self.frames as u64
    }

    fn position(&self) -> u64 {
        self.position as u64
    }

    fn seek(&mut self, frame: u64) {
        self.position = (frame as usize).min(self.frames);
    }

    fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    fn is_looping(&self) -> bool {
        self.looping
    }

    fn read(&mut self, out: &mut [f32], out_channels: u16) -> usize {
        let out_channels = out_channels.max(1) as usize;
        let src_channels = self.channels as usize;
        let mut produced = 0;

        for frame in out.chunks_exact_mut(out_channels) {
            if self.position >= self.frames {
                if self.looping && self.frames > 0 {
                    self.position = 0;
                } else {
                    break;
                }
            }

            let base = self.position * src_channels;
            for (ch, sample) in frame.iter_mut().enumerate() {
                // Extra output channels repeat the last source channel (mono -> stereo)
                *sample = self.samples[base + ch.min(src_channels - 1)];
            }

            self.position += 1;
            produced += 1;
        }

        // Covers frames past the end and any partial trailing frame
        out[produced * out_channels..].fill(0.0);

        produced
    }
}

pub fn is_supported_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| AUDIO_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Decodes a WAV or FLAC file into memory.
pub fn decode_file(path: &Path) -> Result<MemorySource, Box<dyn Error>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let source = match ext.as_str() {
        "wav" => {
            let reader = hound::WavReader::new(BufReader::new(File::open(path)?))?;
            decode_wav(reader)?
        }
        "flac" => {
            let reader = claxon::FlacReader::open(path)?;
            decode_flac(reader)?
        }
        _ => return Err(format!("Unsupported audio format: {ext}").into()),
    };

    log::info!(
        "Decoded {}: {} Hz, {} channels, {:?}",
        path.display(),
        source.sample_rate(),
        source.channels(),
        source.duration()
    );

    Ok(source)
}

fn decode_wav<R: Read>(mut reader: hound::WavReader<R>) -> Result<MemorySource, Box<dyn Error>> {
    let spec = reader.spec();

    log::debug!("WAV format: {spec:?}");

    let samples: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Float, 32) => reader.samples::<f32>().collect::<Result<_, _>>()?,
        (hound::SampleFormat::Int, 8) => reader
            .samples::<i8>()
            .map(|s| s.map(|s| s as f32 / 128.0))
            .collect::<Result<_, _>>()?,
        (hound::SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|s| s.map(|s| s as f32 / 32768.0))
            .collect::<Result<_, _>>()?,
        (hound::SampleFormat::Int, 24) => reader
            .samples::<i32>()
            .map(|s| s.map(|s| s as f32 / 8388608.0))
            .collect::<Result<_, _>>()?,
        (hound::SampleFormat::Int, 32) => reader
            .samples::<i32>()
            .map(|s| s.map(|s| s as f32 / 2147483648.0))
            .collect::<Result<_, _>>()?,
        (format, bits) => {
            return Err(format!("Unsupported WAV encoding: {format:?} {bits}-bit").into());
        }
    };

    MemorySource::from_interleaved(samples, spec.channels, spec.sample_rate)
}

fn decode_flac<R: Read>(mut reader: claxon::FlacReader<R>) -> Result<MemorySource, Box<dyn Error>> {
    let info = reader.streaminfo();
    let scale = (1u64 << (info.bits_per_sample - 1)) as f32;

    let mut samples = Vec::new();
    for sample in reader.samples() {
        samples.push(sample? as f32 / scale);
    }

    MemorySource::from_interleaved(samples, info.channels as u16, info.sample_rate)
}
