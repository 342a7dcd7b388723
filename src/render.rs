//! Real-time render path and its control-thread handle.
//!
//! [`render_pair`] creates the two halves that share one [`RenderShared`]:
//!
//! - [`RenderPath`] lives on the audio thread. Each call to
//!   [`RenderPath::render`] fills one interleaved block: it swaps in a newly
//!   loaded source (only ever at a block boundary), applies a pending seek,
//!   pulls frames, multiplies by the gain and publishes the block peak.
//! - [`RenderControl`] lives on the control thread and implements
//!   [`Deck`]. It never touches the active source directly: sources travel to
//!   the audio thread over a channel and come back on a second channel once
//!   they have been replaced, so they are dropped on the control thread.
//!
//! Everything crossing threads besides those channels is an atomic; the audio
//! thread never takes a lock.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};

use crate::constants::{MAX_GAIN, MIN_GAIN};
use crate::source::BlockSource;
use crate::transport::Deck;

const NO_SEEK: u64 = u64::MAX;

/// An `f32` stored as its bit pattern in an `AtomicU32`.
#[derive(Debug)]
pub struct AtomicF32(AtomicU32);

impl AtomicF32 {
    pub fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    pub fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    pub fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// Change notifications from the engine, consumed by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    Started,
    Stopped,
}

#[derive(Debug)]
pub struct RenderShared {
    gain: AtomicF32,
    peak: AtomicF32,
    playing: AtomicBool,
    looping: AtomicBool,
    loaded: AtomicBool,
    position: AtomicU64,
    total_frames: AtomicU64,
    sample_rate: AtomicU32,
    seek_request: AtomicU64,
}

impl RenderShared {
    fn new(gain: f32) -> Self {
        Self {
            gain: AtomicF32::new(clamp_gain(gain)),
            peak: AtomicF32::new(0.0),
            playing: AtomicBool::new(false),
            looping: AtomicBool::new(false),
            loaded: AtomicBool::new(false),
            position: AtomicU64::new(0),
            total_frames: AtomicU64::new(0),
            sample_rate: AtomicU32::new(0),
            seek_request: AtomicU64::new(NO_SEEK),
        }
    }
}

/// Builds a connected control/render pair and the engine notification channel.
pub fn render_pair(
    output_channels: u16,
    gain: f32,
) -> (RenderControl, RenderPath, Receiver<EngineEvent>) {
    let shared = Arc::new(RenderShared::new(gain));
    let (source_tx, source_rx) = mpsc::channel();
    let (retired_tx, retired_rx) = mpsc::channel();
    let (events_tx, events_rx) = mpsc::channel();

    let control = RenderControl {
        shared: shared.clone(),
        outgoing: source_tx,
        retired: retired_rx,
        events: events_tx.clone(),
    };

    let path = RenderPath {
        shared,
        channels: output_channels.max(1),
        source: None,
        incoming: source_rx,
        retired: retired_tx,
        events: events_tx,
    };

    (control, path, events_rx)
}

pub struct RenderPath {
    shared: Arc<RenderShared>,
    channels: u16,
    source: Option<Box<dyn BlockSource>>,
    incoming: Receiver<Box<dyn BlockSource>>,
    retired: Sender<Box<dyn BlockSource>>,
    events: Sender<EngineEvent>,
}

impl RenderPath {
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Sample rate of the active source, if one has been swapped in.
    pub fn sample_rate(&self) -> Option<u32> {
        self.source.as_ref().map(|s| s.sample_rate())
    }

    /// Renders one interleaved block of `block.len() / channels` frames.
    pub fn render(&mut self, block: &mut [f32]) {
        self.accept_pending_source();
        self.apply_seek_request();

        let Some(source) = self.source.as_mut() else {
            block.fill(0.0);
            self.shared.peak.store(0.0);
            return;
        };

        if !self.shared.playing.load(Ordering::Acquire) {
            block.fill(0.0);
            self.shared.peak.store(0.0);
            return;
        }

        let looping = self.shared.looping.load(Ordering::Relaxed);
        if source.is_looping() != looping {
            source.set_looping(looping);
        }

        let wanted = block.len() / self.channels as usize;
        let produced = source.read(block, self.channels);
        self.shared
            .position
            .store(source.position(), Ordering::Release);

        if produced < wanted
            && !source.is_looping()
            && self.shared.playing.swap(false, Ordering::AcqRel)
        {
            let _ = self.events.send(EngineEvent::Stopped);
        }

        let gain = self.shared.gain.load();
        if gain != 1.0 {
            apply_gain(block, gain);
        }

        self.shared.peak.store(peak_level(block));
    }

    fn accept_pending_source(&mut self) {
        while let Ok(mut next) = self.incoming.try_recv() {
            next.set_looping(self.shared.looping.load(Ordering::Relaxed));
            self.shared.position.store(next.position(), Ordering::Release);

            if let Some(previous) = self.source.replace(next) {
                // Hand the old source back so it is released off the audio thread
                let _ = self.retired.send(previous);
            }
        }
    }

    fn apply_seek_request(&mut self) {
        let frame = self.shared.seek_request.swap(NO_SEEK, Ordering::AcqRel);
        if frame == NO_SEEK {
            return;
        }

        if let Some(source) = self.source.as_mut() {
            source.seek(frame);
            self.shared
                .position
                .store(source.position(), Ordering::Release);
        }
    }
}

pub struct RenderControl {
    shared: Arc<RenderShared>,
    outgoing: Sender<Box<dyn BlockSource>>,
    retired: Receiver<Box<dyn BlockSource>>,
    events: Sender<EngineEvent>,
}

impl RenderControl {
    pub fn gain(&self) -> f32 {
        self.shared.gain.load()
    }

    pub fn set_gain(&self, gain: f32) {
        self.shared.gain.store(clamp_gain(gain));
    }

    /// Peak of the most recently rendered block.
    pub fn peak(&self) -> f32 {
        self.shared.peak.load()
    }

    pub fn is_loaded(&self) -> bool {
        self.shared.loaded.load(Ordering::Acquire)
    }

    pub fn duration_secs(&self) -> f64 {
        let rate = self.shared.sample_rate.load(Ordering::Acquire);
        if rate == 0 {
            return 0.0;
        }
        self.shared.total_frames.load(Ordering::Acquire) as f64 / rate as f64
    }

    /// Drops sources the render path has swapped out. Returns how many.
    pub fn collect_retired(&self) -> usize {
        let mut released = 0;
        while let Ok(source) = self.retired.try_recv() {
            drop(source);
            released += 1;
        }
        if released > 0 {
            log::debug!("Released {released} retired source(s)");
        }
        released
    }
}

impl Deck for RenderControl {
    fn load(&mut self, source: Box<dyn BlockSource>) {
        // A new file starts unstarted; it must not reach the output before Play
        self.stop();
        self.collect_retired();

        self.shared
            .sample_rate
            .store(source.sample_rate(), Ordering::Release);
        self.shared
            .total_frames
            .store(source.total_frames(), Ordering::Release);
        self.shared.position.store(0, Ordering::Release);

        if self.outgoing.send(source).is_err() {
            log::warn!("Render path is gone; source was not loaded");
            return;
        }
        self.shared.loaded.store(true, Ordering::Release);
    }

    fn start(&mut self) {
        if !self.is_loaded() {
            return;
        }
        // Post first so an immediate end of stream cannot overtake it
        let _ = self.events.send(EngineEvent::Started);
        self.shared.playing.store(true, Ordering::Release);
    }

    fn stop(&mut self) {
        if self.shared.playing.swap(false, Ordering::AcqRel) {
            let _ = self.events.send(EngineEvent::Stopped);
        }
    }

    fn set_position(&mut self, seconds: f64) {
        let rate = self.shared.sample_rate.load(Ordering::Acquire) as f64;
        let frame = (seconds.max(0.0) * rate) as u64;
        self.shared.seek_request.store(frame, Ordering::Release);
        self.shared.position.store(frame, Ordering::Release);
    }

    fn set_looping(&mut self, looping: bool) {
        self.shared.looping.store(looping, Ordering::Relaxed);
    }

    fn position(&self) -> f64 {
        let rate = self.shared.sample_rate.load(Ordering::Acquire);
        if rate == 0 {
            return 0.0;
        }
        self.shared.position.load(Ordering::Acquire) as f64 / rate as f64
    }

    fn is_playing(&self) -> bool {
        self.shared.playing.load(Ordering::Acquire)
    }
}

pub fn clamp_gain(gain: f32) -> f32 {
    if gain.is_nan() {
        return MAX_GAIN;
    }
    gain.clamp(MIN_GAIN, MAX_GAIN)
}

pub fn apply_gain(block: &mut [f32], gain: f32) {
    for sample in block.iter_mut() {
        *sample *= gain;
    }
}

/// Largest absolute sample value in the block, across all channels.
pub fn peak_level(block: &[f32]) -> f32 {
    block.iter().fold(0.0f32, |peak, s| peak.max(s.abs()))
}
