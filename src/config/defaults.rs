//! Named defaults and hard limits for the CLI tunables.

use std::env;
use std::path::PathBuf;

pub const DEFAULT_ROLE: &str = "Software Developer";
pub const DEFAULT_DURATION_MINUTES: u64 = 5;
pub const DEFAULT_QUESTION_BUDGET: usize = 5;

pub const DEFAULT_VOLUME_THRESHOLD: f32 = 20.0;
pub const DEFAULT_SILENCE_RUN_TICKS: u32 = 30;
pub const DEFAULT_TICK_HZ: u32 = 60;
pub const DEFAULT_FRAME_BINS: usize = crate::audio::DEFAULT_FRAME_BINS;
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

pub const DEFAULT_FOCUS_SCORE: f32 = 1.0;
pub const DEFAULT_API_TIMEOUT_MS: u64 = 15_000;

pub const MAX_DURATION_MINUTES: u64 = 180;
pub const MAX_QUESTION_BUDGET: usize = 50;
pub const MIN_TICK_HZ: u32 = 1;
pub const MAX_TICK_HZ: u32 = 240;
pub const MAX_SILENCE_RUN_TICKS: u32 = 3_600;
pub const MAX_VOLUME_THRESHOLD: f32 = 255.0;
pub const MIN_FRAME_BINS: usize = 16;
pub const MAX_FRAME_BINS: usize = 2_048;
pub const MAX_ROLE_CHARS: usize = 120;
pub const MAX_DEVICE_CHARS: usize = 256;

/// Session store lives next to the log files; overridable per run.
pub fn default_store_path() -> PathBuf {
    env::temp_dir().join("intervox_store.json")
}

/// Platform text-to-speech command used when the user supplies none.
pub fn default_tts_command() -> &'static str {
    #[cfg(target_os = "macos")]
    {
        "say"
    }
    #[cfg(not(target_os = "macos"))]
    {
        "espeak"
    }
}
