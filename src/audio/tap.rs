use crossbeam_channel::{Sender, TrySendError};
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
};

/// Downmix interleaved multi-channel input to mono while applying the
/// provided converter, so the detector and recorder see a single channel
/// regardless of the microphone layout.
pub(super) fn append_downmixed_samples<T, F>(
    buf: &mut Vec<f32>,
    data: &[T],
    channels: usize,
    mut convert: F,
) where
    T: Copy,
    F: FnMut(T) -> f32,
{
    if channels <= 1 {
        buf.extend(data.iter().copied().map(&mut convert));
        return;
    }

    let mut acc = 0.0f32;
    let mut count = 0usize;
    for sample in data.iter().copied() {
        acc += convert(sample);
        count += 1;
        if count == channels {
            buf.push(acc / channels as f32);
            acc = 0.0;
            count = 0;
        }
    }
    if count > 0 {
        buf.push(acc / count as f32);
    }
}

/// Runs on the CPAL callback thread. Splits the downmixed stream into
/// fixed-size analysis frames for the session thread and, while a recording
/// is active, mirrors every sample into the shared record buffer.
pub(super) struct AnalysisTap {
    frame_samples: usize,
    pending: Vec<f32>,
    scratch: Vec<f32>,
    frames: Sender<Vec<f32>>,
    dropped: Arc<AtomicUsize>,
    record: Arc<Mutex<Vec<f32>>>,
    recording: Arc<AtomicBool>,
}

impl AnalysisTap {
    pub(super) fn new(
        frame_samples: usize,
        frames: Sender<Vec<f32>>,
        dropped: Arc<AtomicUsize>,
        record: Arc<Mutex<Vec<f32>>>,
        recording: Arc<AtomicBool>,
    ) -> Self {
        Self {
            frame_samples: frame_samples.max(1),
            pending: Vec::with_capacity(frame_samples),
            scratch: Vec::new(),
            frames,
            dropped,
            record,
            recording,
        }
    }

    pub(super) fn push<T, F>(&mut self, data: &[T], channels: usize, convert: F)
    where
        T: Copy,
        F: FnMut(T) -> f32,
    {
        self.scratch.clear();
        append_downmixed_samples(&mut self.scratch, data, channels, convert);

        if self.recording.load(Ordering::Relaxed) {
            if let Ok(mut rec) = self.record.lock() {
                rec.extend_from_slice(&self.scratch);
            }
        }

        self.pending.extend_from_slice(&self.scratch);
        while self.pending.len() >= self.frame_samples {
            let frame: Vec<f32> = self.pending.drain(..self.frame_samples).collect();
            if let Err(err) = self.frames.try_send(frame) {
                match err {
                    TrySendError::Full(_) => {
                        // Session thread is behind; drop the frame rather
                        // than block the hardware callback.
                        self.dropped.fetch_add(1, Ordering::Relaxed);
                    }
                    TrySendError::Disconnected(_) => break,
                }
            }
        }
    }
}
