//! Background worker that drives one interview session end to end.
//!
//! Keeps the terminal responsive while the session thread speaks prompts,
//! polls the capture tap, and reacts to detector events. The worker reports
//! progress over a channel and accepts skip/repeat/stop commands from the
//! operator; every exit path releases the microphone before the final
//! summary is sent.

use super::{InterviewSession, SessionConfig, SessionSummary};
use crate::audio::{
    ticks_to_seconds, CaptureConfig, CaptureController, CaptureError, LiveMeter, TurnConfig,
    TurnDetector, TurnEvent,
};
use crate::log_debug;
use crate::speech::SpeechSynth;
use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

/// Operator input, drained once per tick.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Skip,
    Repeat,
    Stop,
}

/// Progress messages sent from the worker back to the UI.
#[derive(Debug)]
pub enum SessionUpdate {
    PromptStarted { index: usize, text: String },
    Listening { index: usize },
    SpeechStarted { index: usize },
    AnswerRecorded { index: usize, seconds: u64 },
    PromptSkipped { index: usize },
    TurnDiscarded { index: usize, reason: String },
    Countdown { remaining_seconds: u64 },
    Failed { message: String, hint: Option<&'static str> },
    Completed(SessionSummary),
}

/// Handle the UI uses to follow and steer the worker thread.
pub struct SessionJob {
    pub receiver: mpsc::Receiver<SessionUpdate>,
    pub commands: Sender<SessionCommand>,
    pub handle: Option<thread::JoinHandle<()>>,
}

/// Spawn the session worker. The capture stream is acquired on the worker
/// thread and never crosses it.
pub fn start_session(
    session_cfg: SessionConfig,
    prompts: Vec<String>,
    capture_cfg: CaptureConfig,
    turn_cfg: TurnConfig,
    synth: Box<dyn SpeechSynth + Send>,
    meter: Option<LiveMeter>,
) -> SessionJob {
    let (updates, receiver) = mpsc::channel();
    let (commands, command_rx) = bounded(16);

    let handle = thread::spawn(move || {
        let session = InterviewSession::new(session_cfg, prompts);
        run_interview(session, &capture_cfg, turn_cfg, synth, meter, &command_rx, &updates);
    });

    SessionJob {
        receiver,
        commands,
        handle: Some(handle),
    }
}

/// Prompt playback is best effort; the prompt text stays visible in the UI
/// either way.
fn speak(synth: &mut (dyn SpeechSynth + Send), text: &str) {
    if let Err(err) = synth.speak(text) {
        log_debug(&format!("speech synthesis failed: {err}"));
    }
}

/// Structured per-turn metrics for the debug log.
fn log_turn_metrics(index: usize, speaking_ticks: u64, seconds: u64, blob_bytes: usize, dropped: usize) {
    log_debug(&format!(
        "turn_metrics|prompt={index}|speaking_ticks={speaking_ticks}|seconds={seconds}|blob_bytes={blob_bytes}|frames_dropped={dropped}"
    ));
}

fn run_interview(
    mut session: InterviewSession,
    capture_cfg: &CaptureConfig,
    turn_cfg: TurnConfig,
    mut synth: Box<dyn SpeechSynth + Send>,
    meter: Option<LiveMeter>,
    commands: &Receiver<SessionCommand>,
    updates: &mpsc::Sender<SessionUpdate>,
) {
    // Speak the first prompt before touching the microphone, so a denied
    // permission leaves the session unstarted and retryable.
    let Some(first) = session.current_prompt().map(str::to_string) else {
        let _ = updates.send(SessionUpdate::Completed(session.into_summary()));
        return;
    };
    let _ = updates.send(SessionUpdate::PromptStarted {
        index: 0,
        text: first.clone(),
    });
    speak(synth.as_mut(), &first);

    let mut handle = match CaptureController::acquire(capture_cfg) {
        Ok(handle) => handle,
        Err(err) => {
            let _ = updates.send(SessionUpdate::Failed {
                message: err.to_string(),
                hint: Some(CaptureError::permission_hint()),
            });
            return;
        }
    };
    log_debug(&format!("session capture on '{}'", handle.device_name()));

    let mut detector = TurnDetector::new(turn_cfg.clone());
    let tick_wait = handle.frame_duration();
    let mut next_second = Instant::now() + Duration::from_secs(1);

    'session: while !session.is_complete() {
        let index = session.cursor();
        detector.reset();
        handle.begin_recording();
        let _ = updates.send(SessionUpdate::Listening { index });

        'listen: loop {
            // Operator commands take effect between ticks.
            match commands.try_recv() {
                Ok(SessionCommand::Stop) => {
                    handle.abort_recording();
                    session.force_complete();
                    break 'listen;
                }
                Ok(SessionCommand::Skip) => {
                    handle.abort_recording();
                    session.skip_current_prompt();
                    let _ = updates.send(SessionUpdate::PromptSkipped { index });
                    break 'listen;
                }
                Ok(SessionCommand::Repeat) => {
                    handle.abort_recording();
                    if let Some(prompt) = session.repeat_current_prompt().map(str::to_string) {
                        speak(synth.as_mut(), &prompt);
                    }
                    detector.reset();
                    handle.begin_recording();
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => {
                    handle.abort_recording();
                    session.force_complete();
                    break 'listen;
                }
            }

            // Wall-clock countdown, independent of the tick timeline.
            let now = Instant::now();
            while now >= next_second {
                next_second += Duration::from_secs(1);
                if session.tick_second() {
                    handle.abort_recording();
                    break 'listen;
                }
                let _ = updates.send(SessionUpdate::Countdown {
                    remaining_seconds: session.remaining_seconds(),
                });
            }

            match handle.next_frame(tick_wait) {
                Ok(Some(frame)) => {
                    let amplitude = frame.mean_amplitude();
                    if let Some(meter) = &meter {
                        meter.set_level(amplitude);
                    }
                    match detector.on_tick(amplitude) {
                        Some(TurnEvent::SpeechStart) => {
                            let _ = updates.send(SessionUpdate::SpeechStarted { index });
                        }
                        Some(TurnEvent::SpeechEnd { speaking_ticks }) => {
                            let seconds = ticks_to_seconds(speaking_ticks, turn_cfg.tick_hz);
                            match handle.end_recording() {
                                Ok(blob) => {
                                    log_turn_metrics(
                                        index,
                                        speaking_ticks,
                                        seconds,
                                        blob.len(),
                                        handle.frames_dropped(),
                                    );
                                    session.record_answer(seconds, blob);
                                    let _ = updates
                                        .send(SessionUpdate::AnswerRecorded { index, seconds });
                                    break 'listen;
                                }
                                Err(err) => {
                                    // One bad recording attempt is locally
                                    // recoverable: retry the same prompt.
                                    log_debug(&format!("turn discarded: {err}"));
                                    let _ = updates.send(SessionUpdate::TurnDiscarded {
                                        index,
                                        reason: err.to_string(),
                                    });
                                    detector.reset();
                                    handle.begin_recording();
                                }
                            }
                        }
                        None => {}
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    handle.abort_recording();
                    let _ = updates.send(SessionUpdate::Failed {
                        message: err.to_string(),
                        hint: None,
                    });
                    session.force_complete();
                    break 'listen;
                }
            }
        }

        if session.is_complete() {
            break 'session;
        }
        let index = session.cursor();
        if let Some(prompt) = session.current_prompt().map(str::to_string) {
            let _ = updates.send(SessionUpdate::PromptStarted {
                index,
                text: prompt.clone(),
            });
            speak(synth.as_mut(), &prompt);
        }
    }

    // Same logical step as ending the loop: no dangling microphone.
    handle.release();
    if let Some(meter) = &meter {
        meter.set_level(0.0);
    }
    let _ = updates.send(SessionUpdate::Completed(session.into_summary()));
}
