//! Capture controller: microphone lifecycle, analysis tap, raw recording.
//!
//! `acquire` opens one CPAL input stream and returns a handle that produces
//! `AudioFrame` snapshots on demand and accumulates raw mono PCM while a
//! recording is active. `release` is idempotent and also runs on drop, so
//! the microphone indicator cannot outlive the session on any exit path.

use super::frame::AudioFrame;
use super::tap::AnalysisTap;
use crate::log_debug;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, StreamConfig};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError};
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("microphone access denied: {0}")]
    PermissionDenied(String),

    #[error("no usable audio input device: {0}")]
    DeviceUnavailable(String),

    /// Logic fault: stop requested without a matching start. Guarded by the
    /// session state machine, never expected at runtime.
    #[error("recording stop requested without an active recording")]
    NoActiveRecording,

    #[error("audio stream error: {0}")]
    Stream(String),

    #[error("audio stream disconnected")]
    Disconnected,

    #[error("failed to encode captured audio: {0}")]
    Encode(#[from] hound::Error),
}

impl CaptureError {
    /// Platform-specific pointer shown alongside acquisition failures.
    pub fn permission_hint() -> &'static str {
        #[cfg(target_os = "macos")]
        {
            "macOS: System Settings > Privacy & Security > Microphone (enable your terminal)."
        }
        #[cfg(target_os = "linux")]
        {
            "Linux: check PipeWire/PulseAudio permissions and ensure the device is not muted."
        }
        #[cfg(target_os = "windows")]
        {
            "Windows: Settings > Privacy & Security > Microphone (allow access for your terminal)."
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            "Check OS microphone permissions."
        }
    }
}

fn classify_backend(description: &str) -> CaptureError {
    let lowered = description.to_ascii_lowercase();
    if lowered.contains("permission") || lowered.contains("denied") || lowered.contains("not permitted")
    {
        CaptureError::PermissionDenied(description.to_string())
    } else {
        CaptureError::Stream(description.to_string())
    }
}

/// Opaque finished recording: one WAV-encoded mono clip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioBlob {
    bytes: Vec<u8>,
}

impl AudioBlob {
    pub fn from_samples(samples: &[f32], sample_rate: u32) -> Result<Self, CaptureError> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
            for sample in samples {
                let quantized = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
                writer.write_sample(quantized)?;
            }
            writer.finalize()?;
        }
        Ok(Self {
            bytes: cursor.into_inner(),
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Tunables for one capture session.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Preferred input device name; default device when `None`.
    pub preferred_device: Option<String>,
    /// Analysis frames emitted per second (the polling tick cadence).
    pub tick_hz: u32,
    /// Magnitude bins per `AudioFrame`.
    pub frame_bins: usize,
    /// Bounded frame-channel capacity between callback and session threads.
    pub channel_capacity: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            preferred_device: None,
            tick_hz: 60,
            frame_bins: super::DEFAULT_FRAME_BINS,
            channel_capacity: 64,
        }
    }
}

/// Entry point for microphone access.
pub struct CaptureController;

impl CaptureController {
    /// List microphone names so the CLI can expose a selector.
    pub fn list_devices() -> Result<Vec<String>, CaptureError> {
        let host = cpal::default_host();
        let devices = host
            .input_devices()
            .map_err(|err| CaptureError::DeviceUnavailable(err.to_string()))?;
        let mut names = Vec::new();
        for device in devices {
            if let Ok(name) = device.name() {
                names.push(name);
            }
        }
        Ok(names)
    }

    /// Request microphone access and start the analysis tap.
    ///
    /// Fails with `PermissionDenied` or `DeviceUnavailable` when the
    /// platform refuses; the caller must surface that and not proceed to
    /// detection. Never retried automatically.
    pub fn acquire(cfg: &CaptureConfig) -> Result<CaptureHandle, CaptureError> {
        let host = cpal::default_host();
        let device = match cfg.preferred_device.as_deref() {
            Some(name) => {
                let mut devices = host
                    .input_devices()
                    .map_err(|err| CaptureError::DeviceUnavailable(err.to_string()))?;
                devices
                    .find(|d| d.name().map(|n| n == name).unwrap_or(false))
                    .ok_or_else(|| {
                        CaptureError::DeviceUnavailable(format!("input device '{name}' not found"))
                    })?
            }
            None => host.default_input_device().ok_or_else(|| {
                CaptureError::DeviceUnavailable("no default input device".to_string())
            })?,
        };
        let device_name = device
            .name()
            .unwrap_or_else(|_| "unknown input device".to_string());

        let default_config = device.default_input_config().map_err(|err| match err {
            cpal::DefaultStreamConfigError::DeviceNotAvailable => {
                CaptureError::DeviceUnavailable(device_name.clone())
            }
            cpal::DefaultStreamConfigError::BackendSpecific { err } => {
                classify_backend(&err.description)
            }
            other => CaptureError::Stream(other.to_string()),
        })?;
        let format = default_config.sample_format();
        let device_config: StreamConfig = default_config.into();
        let device_rate = device_config.sample_rate.0;
        let channels = usize::from(device_config.channels.max(1));

        let tick_hz = cfg.tick_hz.max(1);
        let frame_samples = (u64::from(device_rate) / u64::from(tick_hz)).max(1) as usize;
        let (sender, receiver) = bounded::<Vec<f32>>(cfg.channel_capacity.max(1));
        let dropped = Arc::new(AtomicUsize::new(0));
        let record = Arc::new(Mutex::new(Vec::new()));
        let recording = Arc::new(AtomicBool::new(false));
        let tap = Arc::new(Mutex::new(AnalysisTap::new(
            frame_samples,
            sender,
            dropped.clone(),
            record.clone(),
            recording.clone(),
        )));

        log_debug(&format!(
            "capture config: device={device_name} format={format:?} rate={device_rate}Hz channels={channels} frame_samples={frame_samples}"
        ));

        let err_fn = |err| log_debug(&format!("audio_stream_error: {err}"));
        let stream = match format {
            SampleFormat::F32 => {
                let tap = tap.clone();
                let dropped = dropped.clone();
                device.build_input_stream(
                    &device_config,
                    move |data: &[f32], _| {
                        if let Ok(mut tap) = tap.try_lock() {
                            tap.push(data, channels, |sample| sample);
                        } else {
                            dropped.fetch_add(1, Ordering::Relaxed);
                        }
                    },
                    err_fn,
                    None,
                )
            }
            SampleFormat::I16 => {
                let tap = tap.clone();
                let dropped = dropped.clone();
                device.build_input_stream(
                    &device_config,
                    move |data: &[i16], _| {
                        if let Ok(mut tap) = tap.try_lock() {
                            tap.push(data, channels, |sample| f32::from(sample) / 32_768.0);
                        } else {
                            dropped.fetch_add(1, Ordering::Relaxed);
                        }
                    },
                    err_fn,
                    None,
                )
            }
            SampleFormat::U16 => {
                let tap = tap.clone();
                let dropped = dropped.clone();
                device.build_input_stream(
                    &device_config,
                    move |data: &[u16], _| {
                        if let Ok(mut tap) = tap.try_lock() {
                            tap.push(data, channels, |sample| {
                                (f32::from(sample) - 32_768.0) / 32_768.0
                            });
                        } else {
                            dropped.fetch_add(1, Ordering::Relaxed);
                        }
                    },
                    err_fn,
                    None,
                )
            }
            other => {
                return Err(CaptureError::Stream(format!(
                    "unsupported sample format: {other:?}"
                )))
            }
        }
        .map_err(|err| match err {
            cpal::BuildStreamError::DeviceNotAvailable => {
                CaptureError::DeviceUnavailable(device_name.clone())
            }
            cpal::BuildStreamError::BackendSpecific { err } => classify_backend(&err.description),
            other => CaptureError::Stream(other.to_string()),
        })?;

        stream.play().map_err(|err| match err {
            cpal::PlayStreamError::DeviceNotAvailable => {
                CaptureError::DeviceUnavailable(device_name.clone())
            }
            cpal::PlayStreamError::BackendSpecific { err } => classify_backend(&err.description),
        })?;

        Ok(CaptureHandle {
            stream: Some(stream),
            frames: receiver,
            record,
            recording,
            dropped,
            device_rate,
            device_name,
            frame_bins: cfg.frame_bins.max(1),
            frame_duration: Duration::from_millis((1000 / u64::from(tick_hz)).max(1)),
            latest: AudioFrame::empty(cfg.frame_bins.max(1)),
            released: false,
        })
    }
}

/// Live analysis tap plus recording controls for one acquired microphone.
///
/// Exclusively owned by the session worker; the stream never crosses
/// threads.
pub struct CaptureHandle {
    stream: Option<cpal::Stream>,
    frames: Receiver<Vec<f32>>,
    record: Arc<Mutex<Vec<f32>>>,
    recording: Arc<AtomicBool>,
    dropped: Arc<AtomicUsize>,
    device_rate: u32,
    device_name: String,
    frame_bins: usize,
    frame_duration: Duration,
    latest: AudioFrame,
    released: bool,
}

impl CaptureHandle {
    /// Block until the next analysis frame or the tick deadline.
    ///
    /// `Ok(None)` means no frame arrived within the timeout; the caller's
    /// tick still advances. `Err(Disconnected)` means the stream died.
    pub fn next_frame(&mut self, timeout: Duration) -> Result<Option<AudioFrame>, CaptureError> {
        match self.frames.recv_timeout(timeout) {
            Ok(samples) => {
                self.latest = AudioFrame::from_samples(&samples, self.frame_bins);
                Ok(Some(self.latest.clone()))
            }
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(CaptureError::Disconnected),
        }
    }

    /// Current frame without blocking; returns the previous frame when no
    /// new data has arrived. Safe to call at any polling rate.
    pub fn sample_frame(&mut self) -> AudioFrame {
        while let Ok(samples) = self.frames.try_recv() {
            self.latest = AudioFrame::from_samples(&samples, self.frame_bins);
        }
        self.latest.clone()
    }

    /// Interval matching the configured tick cadence.
    pub fn frame_duration(&self) -> Duration {
        self.frame_duration
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn frames_dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn is_recording(&self) -> bool {
        self.recording.load(Ordering::Relaxed)
    }

    /// Start accumulating raw PCM. Restarting an active recording clears the
    /// buffer and begins fresh.
    pub fn begin_recording(&self) {
        if let Ok(mut rec) = self.record.lock() {
            rec.clear();
        }
        self.recording.store(true, Ordering::Relaxed);
    }

    /// Stop accumulating and encode the finished clip.
    pub fn end_recording(&self) -> Result<AudioBlob, CaptureError> {
        if !self.recording.swap(false, Ordering::Relaxed) {
            return Err(CaptureError::NoActiveRecording);
        }
        let samples = {
            let mut rec = self
                .record
                .lock()
                .map_err(|_| CaptureError::Stream("record buffer lock poisoned".to_string()))?;
            std::mem::take(&mut *rec)
        };
        AudioBlob::from_samples(&samples, self.device_rate)
    }

    /// Discard any in-flight recording without producing a blob.
    pub fn abort_recording(&self) {
        self.recording.store(false, Ordering::Relaxed);
        if let Ok(mut rec) = self.record.lock() {
            rec.clear();
        }
    }

    /// Stop the hardware stream and tear down the tap. Idempotent; the
    /// second and later calls are no-ops.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.recording.store(false, Ordering::Relaxed);
        if let Some(stream) = self.stream.take() {
            if let Err(err) = stream.pause() {
                log_debug(&format!("failed to pause audio stream: {err}"));
            }
            drop(stream);
        }
        log_debug(&format!(
            "capture released: device={} frames_dropped={}",
            self.device_name,
            self.frames_dropped()
        ));
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    #[cfg(test)]
    pub(super) fn for_tests(
        frames: Receiver<Vec<f32>>,
        record: Arc<Mutex<Vec<f32>>>,
        recording: Arc<AtomicBool>,
        device_rate: u32,
    ) -> Self {
        Self {
            stream: None,
            frames,
            record,
            recording,
            dropped: Arc::new(AtomicUsize::new(0)),
            device_rate,
            device_name: "test device".to_string(),
            frame_bins: super::DEFAULT_FRAME_BINS,
            frame_duration: Duration::from_millis(16),
            latest: AudioFrame::empty(super::DEFAULT_FRAME_BINS),
            released: false,
        }
    }
}

impl Drop for CaptureHandle {
    fn drop(&mut self) {
        self.release();
    }
}
