//! Position readout shown under the transport buttons.

use crate::constants::{PAUSED_LABEL, STOPPED_LABEL};
use crate::transport::TransportState;

/// Formats seconds as `MM:SS:mmm`, with minutes and seconds taken mod 60.
///
/// Negative or non-finite input renders as zero.
pub fn format_position(seconds: f64) -> String {
    let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
    let total_ms = (seconds * 1000.0) as u64;

    let minutes = (total_ms / 60_000) % 60;
    let secs = (total_ms / 1000) % 60;
    let millis = total_ms % 1000;

    format!("{minutes:02}:{secs:02}:{millis:03}")
}

/// Text for the position label: the running time while playing, otherwise a
/// status word.
pub fn position_label(state: TransportState, seconds: f64) -> String {
    match state {
        TransportState::Playing => format_position(seconds),
        TransportState::Paused => PAUSED_LABEL.to_string(),
        _ => STOPPED_LABEL.to_string(),
    }
}
