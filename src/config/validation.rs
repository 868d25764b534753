use super::defaults::{
    MAX_DEVICE_CHARS, MAX_DURATION_MINUTES, MAX_FRAME_BINS, MAX_QUESTION_BUDGET, MAX_ROLE_CHARS,
    MAX_SILENCE_RUN_TICKS, MAX_TICK_HZ, MAX_VOLUME_THRESHOLD, MIN_FRAME_BINS, MIN_TICK_HZ,
};
use super::AppConfig;
use anyhow::{bail, Result};
use clap::Parser;

impl AppConfig {
    /// Parse CLI arguments and validate them right away.
    pub fn parse_args() -> Result<Self> {
        let mut config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Check CLI values and normalize what downstream code consumes.
    pub fn validate(&mut self) -> Result<()> {
        self.role = self.role.trim().to_string();
        if self.role.is_empty() {
            bail!("--role must not be empty");
        }
        if self.role.chars().count() > MAX_ROLE_CHARS {
            bail!("--role must be at most {MAX_ROLE_CHARS} characters");
        }

        if !(1..=MAX_DURATION_MINUTES).contains(&self.duration_minutes) {
            bail!(
                "--duration-minutes must be between 1 and {MAX_DURATION_MINUTES}, got {}",
                self.duration_minutes
            );
        }
        if !(1..=MAX_QUESTION_BUDGET).contains(&self.questions) {
            bail!(
                "--questions must be between 1 and {MAX_QUESTION_BUDGET}, got {}",
                self.questions
            );
        }

        if !(0.0..=MAX_VOLUME_THRESHOLD).contains(&self.volume_threshold) {
            bail!(
                "--volume-threshold must be between 0 and {MAX_VOLUME_THRESHOLD}, got {}",
                self.volume_threshold
            );
        }
        if !(1..=MAX_SILENCE_RUN_TICKS).contains(&self.silence_run_ticks) {
            bail!(
                "--silence-run-ticks must be between 1 and {MAX_SILENCE_RUN_TICKS}, got {}",
                self.silence_run_ticks
            );
        }
        if !(MIN_TICK_HZ..=MAX_TICK_HZ).contains(&self.tick_hz) {
            bail!(
                "--tick-hz must be between {MIN_TICK_HZ} and {MAX_TICK_HZ}, got {}",
                self.tick_hz
            );
        }
        if !(MIN_FRAME_BINS..=MAX_FRAME_BINS).contains(&self.frame_bins) {
            bail!(
                "--frame-bins must be between {MIN_FRAME_BINS} and {MAX_FRAME_BINS}, got {}",
                self.frame_bins
            );
        }
        if !(8..=1024).contains(&self.channel_capacity) {
            bail!(
                "--channel-capacity must be between 8 and 1024, got {}",
                self.channel_capacity
            );
        }

        // The device string is matched verbatim against CPAL names; keep it
        // free of control characters.
        if let Some(device) = &self.input_device {
            if device.len() > MAX_DEVICE_CHARS || device.chars().any(char::is_control) {
                bail!(
                    "--input-device must be <={MAX_DEVICE_CHARS} characters with no control characters"
                );
            }
        }

        if let Some(cmd) = &self.tts_cmd {
            let words = shell_words::split(cmd)
                .map_err(|err| anyhow::anyhow!("--tts-cmd is not parseable: {err}"))?;
            if words.is_empty() {
                bail!("--tts-cmd must name a command");
            }
        }

        if let Some(url) = &self.api_base_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                bail!("--api-base-url must start with http:// or https://, got '{url}'");
            }
        }

        if !(0.0..=1.0).contains(&self.focus_score) {
            bail!(
                "--focus-score must be between 0.0 and 1.0, got {}",
                self.focus_score
            );
        }

        Ok(())
    }
}
