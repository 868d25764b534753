//! Microphone capture and speech-turn detection.
//!
//! The capture controller owns one CPAL input stream and one analysis tap.
//! The hardware callback thread downmixes and frames samples; the session
//! thread polls `AudioFrame` snapshots and feeds their mean amplitude to the
//! turn detector, which raises edge-triggered speech start/end events.

/// Number of magnitude bins per analysis frame.
pub const DEFAULT_FRAME_BINS: usize = 128;

/// Leading bins surfaced for level visualization.
pub const VISUAL_BINS: usize = 20;

mod capture;
mod frame;
mod meter;
mod tap;
#[cfg(test)]
mod tests;
mod turn;

pub use capture::{AudioBlob, CaptureConfig, CaptureController, CaptureError, CaptureHandle};
pub use frame::AudioFrame;
pub use meter::LiveMeter;
pub use turn::{ticks_to_seconds, TurnConfig, TurnDetector, TurnEvent, TurnState};
