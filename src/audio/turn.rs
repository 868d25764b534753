//! Speech-turn detection.
//!
//! Converts the per-tick mean amplitude stream into discrete turns: one
//! `SpeechStart` when amplitude first crosses the volume threshold, one
//! matching `SpeechEnd` once the trailing silence run grows long enough.
//! Pure state machine, no I/O; the caller owns the polling cadence and
//! cancellation is simply ceasing to poll.

/// Tunables for turn classification. Policy values, injected by the caller
/// rather than hard-coded at the detection site.
#[derive(Debug, Clone)]
pub struct TurnConfig {
    /// Mean bin amplitude (0..=255) that counts as speech.
    pub volume_threshold: f32,
    /// Consecutive sub-threshold ticks that end a turn.
    pub silence_run_ticks: u32,
    /// Polling cadence, used to derive whole-second durations from ticks.
    pub tick_hz: u32,
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            volume_threshold: 20.0,
            silence_run_ticks: 30,
            tick_hz: 60,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    Speaking,
}

/// Edge-triggered detector output. At most one event per tick.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TurnEvent {
    SpeechStart,
    SpeechEnd { speaking_ticks: u64 },
}

/// Whole seconds for a tick count at the given cadence.
pub fn ticks_to_seconds(ticks: u64, tick_hz: u32) -> u64 {
    ticks / u64::from(tick_hz.max(1))
}

pub struct TurnDetector {
    cfg: TurnConfig,
    state: TurnState,
    silence_ticks: u32,
    speaking_ticks: u64,
}

impl TurnDetector {
    pub fn new(cfg: TurnConfig) -> Self {
        Self {
            cfg,
            state: TurnState::Idle,
            silence_ticks: 0,
            speaking_ticks: 0,
        }
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    /// Elapsed-tick counter of the turn in progress, displayed as whole
    /// seconds. Includes the trailing silence run, matching what the user
    /// sees while the recording indicator is still live.
    pub fn speaking_seconds(&self) -> u64 {
        ticks_to_seconds(self.speaking_ticks, self.cfg.tick_hz)
    }

    /// Back to `Idle` with all counters cleared. Called at session start and
    /// after each completed turn.
    pub fn reset(&mut self) {
        self.state = TurnState::Idle;
        self.silence_ticks = 0;
        self.speaking_ticks = 0;
    }

    /// Feed one tick's mean amplitude; returns the transition event, if any.
    ///
    /// Ticks must be delivered strictly in order. A detector that never sees
    /// amplitude above threshold never starts a turn; the UI layer's manual
    /// skip is the escape hatch for that.
    pub fn on_tick(&mut self, mean_amplitude: f32) -> Option<TurnEvent> {
        let mut event = None;

        if mean_amplitude > self.cfg.volume_threshold {
            self.silence_ticks = 0;
            if self.state == TurnState::Idle {
                self.state = TurnState::Speaking;
                self.speaking_ticks = 0;
                event = Some(TurnEvent::SpeechStart);
            }
        } else {
            self.silence_ticks = self.silence_ticks.saturating_add(1);
            if self.state == TurnState::Speaking && self.silence_ticks > self.cfg.silence_run_ticks
            {
                self.state = TurnState::Idle;
                let speaking_ticks = self.speaking_ticks;
                self.speaking_ticks = 0;
                self.silence_ticks = 0;
                return Some(TurnEvent::SpeechEnd { speaking_ticks });
            }
        }

        if self.state == TurnState::Speaking {
            self.speaking_ticks = self.speaking_ticks.saturating_add(1);
        }

        event
    }
}
