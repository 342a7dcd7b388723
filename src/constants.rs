//! Project-wide constants used across multiple modules.
//!
//! This module centralizes constant definitions to avoid duplication and ensure
//! consistency between the library core and the terminal player.

/// Number of peak readings kept for the scrolling meter
pub const METER_HISTORY_SIZE: usize = 64;

/// Lower and upper bounds of the volume control
pub const MIN_GAIN: f32 = 0.0;
pub const MAX_GAIN: f32 = 1.0;

/// Volume slider step
pub const GAIN_STEP: f32 = 0.01;

/// Allowed range for the UI refresh timer, in milliseconds
pub const MIN_REFRESH_MS: u64 = 20;
pub const MAX_REFRESH_MS: u64 = 50;

/// Frames rendered per device block when nothing else is configured
pub const DEFAULT_BLOCK_FRAMES: usize = 512;

/// Supported audio file extensions (lowercase)
pub const AUDIO_EXTENSIONS: &[&str] = &["wav", "flac"];

/// Label shown instead of a position while paused
pub const PAUSED_LABEL: &str = "Paused";

/// Label shown instead of a position while not playing
pub const STOPPED_LABEL: &str = "Stopped";
