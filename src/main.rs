//! Terminal driver for one voice interview session.

use anyhow::Result;
use intervox::api::{ApiClient, ApiConfig};
use intervox::audio::{CaptureController, LiveMeter};
use intervox::config::AppConfig;
use intervox::feedback::FeedbackPayload;
use intervox::session::{
    format_duration, prompts_for, start_session, SessionCommand, SessionSummary, SessionUpdate,
};
use intervox::speech::{CommandSynth, NullSynth, SpeechSynth};
use intervox::store::{
    unix_now, JsonFileStore, SessionStatus, SessionStore, SetupRecord, StoredSession,
};
use std::io::BufRead;
use std::thread;

fn main() -> Result<()> {
    let config = AppConfig::parse_args()?;
    intervox::init_logging(&config);
    intervox::init_tracing(&config);

    if config.list_input_devices {
        list_input_devices();
        return Ok(());
    }

    run(config)
}

fn list_input_devices() {
    match CaptureController::list_devices() {
        Ok(devices) if devices.is_empty() => println!("No audio input devices detected."),
        Ok(devices) => {
            println!("Detected audio input devices:");
            for name in devices {
                println!("  - {name}");
            }
        }
        Err(err) => println!("Failed to list audio input devices: {err}"),
    }
}

fn build_synth(config: &AppConfig) -> Result<Box<dyn SpeechSynth + Send>> {
    if config.mute {
        return Ok(Box::new(NullSynth));
    }
    let synth = match &config.tts_cmd {
        Some(cmd) => CommandSynth::from_command_line(cmd)?,
        None => CommandSynth::platform_default(),
    };
    Ok(Box::new(synth))
}

fn run(config: AppConfig) -> Result<()> {
    let mut store = SessionStore::new(JsonFileStore::open(&config.store_path));
    let setup = SetupRecord {
        role: config.role.clone(),
        interview_type: config.interview_type,
        duration_minutes: config.duration_minutes,
        saved_at_unix: unix_now(),
    };
    if let Err(err) = store.record_setup(&setup) {
        intervox::log_debug(&format!("setup history not saved: {err}"));
    }
    if let Err(err) = store.save_current_session(&StoredSession {
        role: config.role.clone(),
        interview_type: config.interview_type,
        duration_minutes: config.duration_minutes,
        status: SessionStatus::Active,
        started_at_unix: unix_now(),
    }) {
        intervox::log_debug(&format!("current session not saved: {err}"));
    }

    let prompts = prompts_for(config.interview_type, config.questions);
    let synth = build_synth(&config)?;

    println!(
        "intervox - {} interview for {}",
        config.interview_type.label(),
        config.role
    );
    println!(
        "{} questions, {} on the clock. Speak after each prompt; pause when you are done.",
        config.questions,
        format_duration(config.duration_minutes * 60)
    );
    println!("Controls: [s]kip  [r]epeat  [q]uit (press the key, then Enter)");
    println!();

    let mut job = start_session(
        config.session_config(),
        prompts,
        config.capture_config(),
        config.turn_config(),
        synth,
        Some(LiveMeter::new()),
    );
    spawn_command_reader(job.commands.clone());

    let mut summary = None;
    for update in job.receiver.iter() {
        match update {
            SessionUpdate::PromptStarted { index, text } => println!("Q{}: {text}", index + 1),
            SessionUpdate::Listening { .. } => println!("  listening... speak now"),
            SessionUpdate::SpeechStarted { .. } => println!("  recording..."),
            SessionUpdate::AnswerRecorded { seconds, .. } => {
                println!("  answer recorded ({})", format_duration(seconds));
            }
            SessionUpdate::PromptSkipped { .. } => println!("  skipped"),
            SessionUpdate::TurnDiscarded { reason, .. } => {
                println!("  answer discarded ({reason}); try again");
            }
            SessionUpdate::Countdown { remaining_seconds } => {
                if remaining_seconds <= 10 || remaining_seconds % 60 == 0 {
                    println!("  {} left", format_duration(remaining_seconds));
                }
            }
            SessionUpdate::Failed { message, hint } => {
                eprintln!("error: {message}");
                if let Some(hint) = hint {
                    eprintln!("{hint}");
                }
            }
            SessionUpdate::Completed(finished) => summary = Some(finished),
        }
    }
    if let Some(handle) = job.handle.take() {
        let _ = handle.join();
    }

    let Some(summary) = summary else {
        let _ = store.clear_current_session();
        anyhow::bail!("session did not start; fix the microphone and run again");
    };

    println!();
    if summary.timed_out {
        println!("Time! The countdown ended the session.");
    }
    println!(
        "Interview complete - {} answers in {}.",
        summary.transcript.len(),
        format_duration(summary.total_elapsed_seconds)
    );
    for (i, record) in summary.transcript.iter().enumerate() {
        println!(
            "  Q{}: {} ({})",
            i + 1,
            record.prompt_text,
            format_duration(record.captured_duration_seconds)
        );
    }

    let _ = store.clear_current_session();

    if let Some(api_cfg) = config.api_config() {
        submit_results(&config, api_cfg, &summary);
    }
    Ok(())
}

fn spawn_command_reader(commands: crossbeam_channel::Sender<SessionCommand>) {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let command = match line.trim().to_ascii_lowercase().as_str() {
                "s" | "skip" => SessionCommand::Skip,
                "r" | "repeat" => SessionCommand::Repeat,
                "q" | "quit" | "stop" => SessionCommand::Stop,
                _ => continue,
            };
            let stop = command == SessionCommand::Stop;
            if commands.send(command).is_err() || stop {
                break;
            }
        }
    });
}

/// Upload answers and fetch feedback. Failures are retryable; the printed
/// transcript above is never lost to a network error.
fn submit_results(config: &AppConfig, api_cfg: ApiConfig, summary: &SessionSummary) {
    println!();
    println!("Submitting answers to {}...", api_cfg.base_url);
    let client = match ApiClient::new(api_cfg) {
        Ok(client) => client,
        Err(err) => {
            eprintln!("backend unavailable: {err}. Retry later; your transcript is kept above.");
            return;
        }
    };

    if let Err(err) = client.setup_interview(&config.role, config.interview_type.label(), None) {
        eprintln!("setup submission failed: {err}. Retry later; nothing was lost.");
        return;
    }
    for (i, record) in summary.transcript.iter().enumerate() {
        match client.send_audio(&record.raw_audio, config.focus_score) {
            Ok(_) => println!("  uploaded answer {}", i + 1),
            Err(err) => eprintln!("  upload of answer {} failed: {err} (retry later)", i + 1),
        }
    }

    match client.fetch_feedback() {
        Ok(payload) => print_feedback(&payload),
        Err(err) => eprintln!("feedback not available yet: {err}. Retry later."),
    }
}

fn print_feedback(payload: &FeedbackPayload) {
    println!();
    match payload {
        FeedbackPayload::Sectioned(sectioned) => {
            println!("Feedback:");
            let sections = [
                ("Technical", &sectioned.technical),
                ("Behavioral", &sectioned.behavioral),
                ("Coding", &sectioned.coding),
            ];
            for (label, section) in sections {
                if let Some(section) = section {
                    match section.score {
                        Some(score) => println!("  {label}: {score:.0}"),
                        None => println!("  {label}: no score"),
                    }
                    if !section.feedback.is_empty() {
                        println!("    {}", section.feedback);
                    }
                }
            }
            if let Some(confidence) = sectioned.meta.average_confidence {
                println!("  Confidence: {:.0}%", confidence * 100.0);
            }
            if let Some(focus) = sectioned.meta.average_focus {
                println!("  Focus: {:.0}%", focus * 100.0);
            }
        }
        FeedbackPayload::Unified(unified) => {
            println!("Feedback:");
            if let Some(overall) = unified.metrics.overall {
                println!("  Overall: {overall:.1}");
            }
            if let Some(summary) = &unified.metrics.summary {
                println!("  {summary}");
            }
        }
        FeedbackPayload::Unknown(_) => {
            println!("Feedback arrived in an unrecognized shape; check the web dashboard.");
        }
    }
}
