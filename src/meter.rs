//! Scrolling peak-level history.
//!
//! The timer tick pushes the latest block peak into a fixed ring of
//! [`METER_HISTORY_SIZE`] slots. Readers walk the ring starting at the write
//! index, so the oldest reading comes first and the newest last, which gives
//! the right-to-left scrolling bar graph.

use crate::constants::METER_HISTORY_SIZE;

#[derive(Debug, Clone)]
pub struct MeterHistory {
    levels: [f32; METER_HISTORY_SIZE],
    write_index: usize,
}

impl Default for MeterHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl MeterHistory {
    pub fn new() -> Self {
        Self {
            levels: [0.0; METER_HISTORY_SIZE],
            write_index: 0,
        }
    }

    pub fn write_index(&self) -> usize {
        self.write_index
    }

    /// Overwrites the slot at the write index and advances it.
    pub fn push(&mut self, level: f32) {
        self.levels[self.write_index] = clamp_level(level);
        self.write_index = (self.write_index + 1) % METER_HISTORY_SIZE;
    }

    /// Most recently pushed level.
    pub fn latest(&self) -> f32 {
        let index = (self.write_index + METER_HISTORY_SIZE - 1) % METER_HISTORY_SIZE;
        self.levels[index]
    }

    /// Levels from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        (0..METER_HISTORY_SIZE)
            .map(move |i| self.levels[(self.write_index + i) % METER_HISTORY_SIZE])
    }

    /// Draws the history as `height` text rows, top row first, one column per
    /// reading. Each cell resolves to eighths of a row.
    pub fn rows(&self, height: usize) -> Vec<String> {
        let eighths: Vec<usize> = self
            .iter()
            .map(|level| (level * (height * 8) as f32) as usize)
            .collect();

        (0..height)
            .rev()
            .map(|row| {
                eighths
                    .iter()
                    .map(|&e| {
                        let filled = e.saturating_sub(row * 8).min(8);
                        amplitude_to_blocks(filled as f32 / 8.0)
                    })
                    .collect::<String>()
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.levels = [0.0; METER_HISTORY_SIZE];
        self.write_index = 0;
    }
}

fn clamp_level(level: f32) -> f32 {
    if level.is_nan() {
        return 0.0;
    }
    level.clamp(0.0, 1.0)
}

/// Convert amplitude to terminal block characters for visualization
pub fn amplitude_to_blocks(amplitude: f32) -> &'static str {
    let normalized = amplitude.abs().min(1.0);
    let index = (normalized * 8.0) as usize;

    match index {
        0 => " ",
        1 => "▁",
        2 => "▂",
        3 => "▃",
        4 => "▄",
        5 => "▅",
        6 => "▆",
        7 => "▇",
        _ => "█",
    }
}
