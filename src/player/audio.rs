//! Audio output for the player.
//!
//! The [`AudioEngine`] opens the default output device through rodio and feeds
//! it a single endless [`RenderSource`]. That source is the only thing running
//! on the device thread: it pulls fixed-size blocks from the
//! [`RenderPath`](tapedeck::render::RenderPath) and hands them to rodio one
//! sample at a time. Transport, gain and file changes all reach it through the
//! render path's atomics and channels, so the device stream is opened once and
//! never rebuilt.

use rodio::{OutputStream, OutputStreamBuilder, Sink, Source};
use std::error::Error;
use std::time::Duration;
use tapedeck::render::RenderPath;

const FALLBACK_SAMPLE_RATE: u32 = 44100;

pub struct AudioEngine {
    _stream: OutputStream,
    sink: Sink,
}

impl AudioEngine {
    /// Opens the default device and starts pulling from `path`.
    pub fn start(path: RenderPath, block_frames: usize) -> Result<Self, Box<dyn Error>> {
        let mut stream = OutputStreamBuilder::open_default_stream()?;
        stream.log_on_drop(false);

        let sink = Sink::connect_new(stream.mixer());
        let channels = path.channels();
        sink.append(RenderSource::new(path, block_frames));
        sink.play();

        log::info!("Audio output opened: {channels} channels, {block_frames} frames per block");

        Ok(Self {
            _stream: stream,
            sink,
        })
    }

    pub fn is_running(&self) -> bool {
        !self.sink.empty()
    }
}

/// Endless rodio source that renders one block at a time.
pub struct RenderSource {
    path: RenderPath,
    buffer: Vec<f32>,
    cursor: usize,
    sample_rate: u32,
}

impl RenderSource {
    pub fn new(path: RenderPath, block_frames: usize) -> Self {
        let len = block_frames.max(1) * path.channels() as usize;
        let mut source = Self {
            path,
            buffer: vec![0.0; len],
            cursor: 0,
            sample_rate: FALLBACK_SAMPLE_RATE,
        };
        source.refill();
        source
    }

    // Rendering eagerly keeps sample_rate() correct for the block rodio is about to read
    fn refill(&mut self) {
        self.path.render(&mut self.buffer);
        self.sample_rate = self.path.sample_rate().unwrap_or(FALLBACK_SAMPLE_RATE);
        self.cursor = 0;
    }
}

impl Iterator for RenderSource {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        let sample = self.buffer[self.cursor];
        self.cursor += 1;

        if self.cursor >= self.buffer.len() {
            self.refill();
        }

        Some(sample)
    }
}

impl Source for RenderSource {
    fn current_span_len(&self) -> Option<usize> {
        // Each block is its own span so a new file may change the sample rate
        Some(self.buffer.len() - self.cursor)
    }

    fn channels(&self) -> u16 {
        self.path.channels()
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tapedeck::render::render_pair;
    use tapedeck::source::MemorySource;
    use tapedeck::transport::Deck;

    fn is_ci_environment() -> bool {
        // Check common CI environment variables
        std::env::var("CI").is_ok()
            || std::env::var("GITHUB_ACTIONS").is_ok()
            || std::env::var("TRAVIS").is_ok()
            || std::env::var("CIRCLECI").is_ok()
    }

    fn skip_if_no_audio() -> Result<(), Box<dyn Error>> {
        if is_ci_environment() {
            eprintln!("Skipping audio test in CI environment");
            return Err("Audio not available in CI".into());
        }
        Ok(())
    }

    #[test]
    fn test_render_source_is_silent_without_file() {
        let (_control, path, _events) = render_pair(2, 1.0);
        let mut source = RenderSource::new(path, 4);

        assert_eq!(source.channels(), 2);
        assert_eq!(source.sample_rate(), FALLBACK_SAMPLE_RATE);
        assert_eq!(source.current_span_len(), Some(8));
        assert!(source.by_ref().take(32).all(|s| s == 0.0));
    }

    #[test]
    fn test_render_source_never_ends() {
        let (_control, path, _events) = render_pair(1, 1.0);
        let source = RenderSource::new(path, 2);
        assert_eq!(source.take(1000).count(), 1000);
    }

    #[test]
    fn test_render_source_follows_loaded_sample_rate() {
        let (mut control, path, _events) = render_pair(1, 1.0);
        let mut source = RenderSource::new(path, 2);

        let file = MemorySource::from_interleaved(vec![0.5; 64], 1, 22050).unwrap();
        control.load(Box::new(file));
        control.start();

        // Drain the block rendered before the file arrived
        source.next();
        source.next();

        assert_eq!(source.sample_rate(), 22050);
        assert_eq!(source.next(), Some(0.5));
    }

    #[test]
    fn test_start_audio_engine() {
        if skip_if_no_audio().is_err() {
            return;
        }

        let (_control, path, _events) = render_pair(2, 1.0);
        if let Ok(engine) = AudioEngine::start(path, 512) {
            assert!(engine.is_running());
        }
    }
}
