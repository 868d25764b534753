//! Per-tick amplitude snapshots.
//!
//! An `AudioFrame` is a fixed-size row of unsigned byte magnitudes, one per
//! bin, derived from the raw PCM of the current analysis frame. Frames are
//! ephemeral: the detector consumes the mean amplitude and the UI may keep a
//! short visualization slice, nothing else is retained across ticks.

use super::VISUAL_BINS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFrame {
    bins: Vec<u8>,
}

impl AudioFrame {
    /// All-silent frame with `bin_count` zeroed bins.
    pub fn empty(bin_count: usize) -> Self {
        Self {
            bins: vec![0; bin_count.max(1)],
        }
    }

    /// Collapse a PCM frame into `bin_count` byte magnitudes.
    ///
    /// Each bin holds the peak absolute amplitude of its sample chunk scaled
    /// to 0..=255, which mirrors the byte-magnitude contract the session
    /// layer was written against.
    pub fn from_samples(samples: &[f32], bin_count: usize) -> Self {
        let bin_count = bin_count.max(1);
        if samples.is_empty() {
            return Self::empty(bin_count);
        }
        let chunk = samples.len().div_ceil(bin_count);
        let mut bins = Vec::with_capacity(bin_count);
        for slot in samples.chunks(chunk) {
            let peak = slot.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
            bins.push((peak.clamp(0.0, 1.0) * 255.0).round() as u8);
        }
        bins.resize(bin_count, 0);
        Self { bins }
    }

    /// Mean of all bin magnitudes; the single input the turn detector reads.
    pub fn mean_amplitude(&self) -> f32 {
        if self.bins.is_empty() {
            return 0.0;
        }
        let sum: u32 = self.bins.iter().map(|&b| u32::from(b)).sum();
        sum as f32 / self.bins.len() as f32
    }

    pub fn bins(&self) -> &[u8] {
        &self.bins
    }

    /// Leading slice used for the level bars in the UI layer.
    pub fn visual(&self) -> &[u8] {
        &self.bins[..VISUAL_BINS.min(self.bins.len())]
    }
}
