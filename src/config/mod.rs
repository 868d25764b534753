//! Command-line parsing and validation helpers.

mod defaults;
mod validation;

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use defaults::{
    default_store_path, default_tts_command, DEFAULT_API_TIMEOUT_MS, DEFAULT_CHANNEL_CAPACITY,
    DEFAULT_DURATION_MINUTES, DEFAULT_FOCUS_SCORE, DEFAULT_FRAME_BINS, DEFAULT_QUESTION_BUDGET,
    DEFAULT_ROLE, DEFAULT_SILENCE_RUN_TICKS, DEFAULT_TICK_HZ, DEFAULT_VOLUME_THRESHOLD,
};

/// Interview flavor; decides which question bank drives the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterviewType {
    Technical,
    Behavioral,
    Coding,
    Full,
}

impl InterviewType {
    pub fn label(self) -> &'static str {
        match self {
            InterviewType::Technical => "technical",
            InterviewType::Behavioral => "behavioral",
            InterviewType::Coding => "coding",
            InterviewType::Full => "full",
        }
    }
}

/// CLI options for the intervox session runner. Validated values keep the
/// audio pipeline and downstream subprocesses safe.
#[derive(Debug, Parser, Clone)]
#[command(about = "intervox - voice-driven mock interview sessions", author, version)]
pub struct AppConfig {
    /// Role the interview is tailored to
    #[arg(long, default_value = DEFAULT_ROLE)]
    pub role: String,

    /// Interview flavor
    #[arg(long = "interview-type", value_enum, default_value_t = InterviewType::Technical)]
    pub interview_type: InterviewType,

    /// Session length before the countdown force-completes (minutes)
    #[arg(long = "duration-minutes", default_value_t = DEFAULT_DURATION_MINUTES)]
    pub duration_minutes: u64,

    /// Number of questions asked before the session completes
    #[arg(long, default_value_t = DEFAULT_QUESTION_BUDGET)]
    pub questions: usize,

    /// Mean bin amplitude (0-255) that counts as speech
    #[arg(long = "volume-threshold", default_value_t = DEFAULT_VOLUME_THRESHOLD, allow_hyphen_values = true)]
    pub volume_threshold: f32,

    /// Consecutive quiet ticks that end an answer
    #[arg(long = "silence-run-ticks", default_value_t = DEFAULT_SILENCE_RUN_TICKS)]
    pub silence_run_ticks: u32,

    /// Detector polling cadence (ticks per second)
    #[arg(long = "tick-hz", default_value_t = DEFAULT_TICK_HZ)]
    pub tick_hz: u32,

    /// Magnitude bins per analysis frame
    #[arg(long = "frame-bins", default_value_t = DEFAULT_FRAME_BINS)]
    pub frame_bins: usize,

    /// Frame channel capacity between the capture callback and the session
    #[arg(long = "channel-capacity", default_value_t = DEFAULT_CHANNEL_CAPACITY)]
    pub channel_capacity: usize,

    /// Preferred audio input device name
    #[arg(long)]
    pub input_device: Option<String>,

    /// Print detected audio input devices and exit
    #[arg(long = "list-input-devices", default_value_t = false)]
    pub list_input_devices: bool,

    /// Text-to-speech command line used to read prompts aloud
    #[arg(long = "tts-cmd", env = "INTERVOX_TTS_CMD")]
    pub tts_cmd: Option<String>,

    /// Skip prompt playback entirely
    #[arg(long, default_value_t = false)]
    pub mute: bool,

    /// Backend base URL; offline when absent
    #[arg(long = "api-base-url", env = "INTERVOX_API_URL")]
    pub api_base_url: Option<String>,

    /// Opaque user id attached to backend requests
    #[arg(long = "user-id", env = "INTERVOX_USER_ID")]
    pub user_id: Option<String>,

    /// User email attached to backend requests
    #[arg(long = "user-email", env = "INTERVOX_USER_EMAIL")]
    pub user_email: Option<String>,

    /// Self-reported focus score submitted with each answer (0.0-1.0)
    #[arg(long = "focus-score", default_value_t = DEFAULT_FOCUS_SCORE)]
    pub focus_score: f32,

    /// Session store location
    #[arg(long = "store-path", default_value_os_t = default_store_path())]
    pub store_path: PathBuf,

    /// Enable file logging (debug)
    #[arg(long = "logs", env = "INTERVOX_LOGS", default_value_t = false)]
    pub logs: bool,

    /// Disable all file logging (overrides --logs and log env vars)
    #[arg(long = "no-logs", env = "INTERVOX_NO_LOGS", default_value_t = false)]
    pub no_logs: bool,

    /// Allow logging prompt/transcript snippets (debug log only)
    #[arg(
        long = "log-content",
        env = "INTERVOX_LOG_CONTENT",
        default_value_t = false
    )]
    pub log_content: bool,

    /// Enable verbose timing logs
    #[arg(long)]
    pub log_timings: bool,
}

impl AppConfig {
    /// Snapshot the detector tunables for downstream consumers.
    pub fn turn_config(&self) -> crate::audio::TurnConfig {
        crate::audio::TurnConfig {
            volume_threshold: self.volume_threshold,
            silence_run_ticks: self.silence_run_ticks,
            tick_hz: self.tick_hz,
        }
    }

    /// Snapshot the capture tunables for downstream consumers.
    pub fn capture_config(&self) -> crate::audio::CaptureConfig {
        crate::audio::CaptureConfig {
            preferred_device: self.input_device.clone(),
            tick_hz: self.tick_hz,
            frame_bins: self.frame_bins,
            channel_capacity: self.channel_capacity,
        }
    }

    /// Immutable session parameters handed to the accumulator.
    pub fn session_config(&self) -> crate::session::SessionConfig {
        crate::session::SessionConfig {
            role: self.role.clone(),
            interview_type: self.interview_type,
            duration_minutes: self.duration_minutes,
        }
    }

    /// Backend client settings when a base URL was supplied.
    pub fn api_config(&self) -> Option<crate::api::ApiConfig> {
        self.api_base_url.as_ref().map(|base_url| crate::api::ApiConfig {
            base_url: base_url.clone(),
            user_id: self.user_id.clone(),
            user_email: self.user_email.clone(),
            timeout_ms: DEFAULT_API_TIMEOUT_MS,
        })
    }
}
