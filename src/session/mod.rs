//! Interview session accumulator.
//!
//! `InterviewSession` is the pure state machine: it owns the transcript,
//! tracks the current prompt and the wall-clock countdown, and enforces the
//! question budget. The `runner` submodule drives it against real capture,
//! detection, and speech synthesis on a worker thread.

mod prompts;
pub mod runner;
#[cfg(test)]
mod tests;

use crate::audio::AudioBlob;
use crate::config::InterviewType;

pub use prompts::prompts_for;
pub use runner::{start_session, SessionCommand, SessionJob, SessionUpdate};

/// Immutable parameters for one session, fixed before the first prompt.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub role: String,
    pub interview_type: InterviewType,
    pub duration_minutes: u64,
}

impl SessionConfig {
    pub fn countdown_seconds(&self) -> u64 {
        self.duration_minutes * 60
    }
}

/// One completed answer. Immutable once appended to the transcript.
#[derive(Debug, Clone)]
pub struct AnswerRecord {
    pub prompt_text: String,
    pub captured_duration_seconds: u64,
    pub raw_audio: AudioBlob,
}

/// Everything handed to feedback rendering when a session finishes.
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub transcript: Vec<AnswerRecord>,
    pub total_elapsed_seconds: u64,
    pub timed_out: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Active,
    Complete { timed_out: bool },
}

pub struct InterviewSession {
    config: SessionConfig,
    prompts: Vec<String>,
    transcript: Vec<AnswerRecord>,
    cursor: usize,
    remaining_seconds: u64,
    elapsed_seconds: u64,
    state: SessionState,
}

impl InterviewSession {
    pub fn new(config: SessionConfig, prompts: Vec<String>) -> Self {
        let countdown = config.countdown_seconds();
        Self::with_countdown(config, prompts, countdown)
    }

    /// Build a session with an explicit countdown budget in seconds.
    pub fn with_countdown(config: SessionConfig, prompts: Vec<String>, seconds: u64) -> Self {
        let state = if prompts.is_empty() {
            SessionState::Complete { timed_out: false }
        } else {
            SessionState::Active
        };
        Self {
            config,
            prompts,
            transcript: Vec::new(),
            cursor: 0,
            remaining_seconds: seconds,
            elapsed_seconds: 0,
            state,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Upper bound on transcript length.
    pub fn question_budget(&self) -> usize {
        self.prompts.len()
    }

    /// Zero-based index of the prompt currently awaiting an answer.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current_prompt(&self) -> Option<&str> {
        if self.is_complete() {
            return None;
        }
        self.prompts.get(self.cursor).map(String::as_str)
    }

    /// Prompt text for re-playback; the transcript is untouched.
    pub fn repeat_current_prompt(&self) -> Option<&str> {
        self.current_prompt()
    }

    pub fn answered(&self) -> usize {
        self.transcript.len()
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.state, SessionState::Complete { .. })
    }

    /// Append a finished answer for the current prompt and advance.
    ///
    /// Ignored once the session is complete, which keeps the transcript
    /// within the question budget even if a late detector event races the
    /// countdown.
    pub fn record_answer(&mut self, captured_duration_seconds: u64, raw_audio: AudioBlob) {
        if self.is_complete() {
            return;
        }
        let prompt_text = self.prompts[self.cursor].clone();
        self.transcript.push(AnswerRecord {
            prompt_text,
            captured_duration_seconds,
            raw_audio,
        });
        self.advance();
    }

    /// Move past the current prompt without appending a record.
    pub fn skip_current_prompt(&mut self) {
        if self.is_complete() {
            return;
        }
        self.advance();
    }

    fn advance(&mut self) {
        self.cursor += 1;
        if self.cursor >= self.prompts.len() {
            self.state = SessionState::Complete { timed_out: false };
        }
    }

    /// One second of wall-clock time passed. Returns `true` once the session
    /// is complete; reaching zero force-completes regardless of turn state.
    pub fn tick_second(&mut self) -> bool {
        if self.is_complete() {
            return true;
        }
        self.elapsed_seconds += 1;
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            self.state = SessionState::Complete { timed_out: true };
        }
        self.is_complete()
    }

    /// Terminate early on operator request, keeping what was accumulated.
    pub fn force_complete(&mut self) {
        if !self.is_complete() {
            self.state = SessionState::Complete { timed_out: false };
        }
    }

    pub fn into_summary(self) -> SessionSummary {
        let timed_out = matches!(self.state, SessionState::Complete { timed_out: true });
        SessionSummary {
            transcript: self.transcript,
            total_elapsed_seconds: self.elapsed_seconds,
            timed_out,
        }
    }
}

/// MM:SS rendering used for countdowns and answer durations.
pub fn format_duration(total_seconds: u64) -> String {
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{minutes:02}:{seconds:02}")
}
