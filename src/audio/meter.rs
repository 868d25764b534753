use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Shared live level readout for the UI layer.
///
/// Holds the mean bin amplitude (0..=255) of the most recent analysis frame.
/// Written by the session worker, read from the rendering side without
/// locking.
#[derive(Clone, Debug)]
pub struct LiveMeter {
    level_bits: Arc<AtomicU32>,
}

impl LiveMeter {
    pub fn new() -> Self {
        Self {
            level_bits: Arc::new(AtomicU32::new(0f32.to_bits())),
        }
    }

    pub fn set_level(&self, mean_amplitude: f32) {
        self.level_bits
            .store(mean_amplitude.to_bits(), Ordering::Relaxed);
    }

    pub fn level(&self) -> f32 {
        f32::from_bits(self.level_bits.load(Ordering::Relaxed))
    }
}

impl Default for LiveMeter {
    fn default() -> Self {
        Self::new()
    }
}
