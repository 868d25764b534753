use super::{format_duration, prompts_for, InterviewSession, SessionConfig};
use crate::audio::AudioBlob;
use crate::config::InterviewType;

fn test_config(duration_minutes: u64) -> SessionConfig {
    SessionConfig {
        role: "Backend Developer".to_string(),
        interview_type: InterviewType::Behavioral,
        duration_minutes,
    }
}

fn blob() -> AudioBlob {
    AudioBlob::from_samples(&[0.1f32; 160], 16_000).expect("test blob")
}

fn numbered_prompts(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("Question {i}")).collect()
}

#[test]
fn answers_accumulate_in_prompt_order() {
    let prompts = numbered_prompts(3);
    let mut session = InterviewSession::new(test_config(5), prompts.clone());

    // Simulated detector: start then end immediately for each prompt.
    for seconds in [4, 7, 2] {
        assert!(!session.is_complete());
        session.record_answer(seconds, blob());
    }

    assert!(session.is_complete());
    let summary = session.into_summary();
    assert_eq!(summary.transcript.len(), 3);
    assert!(!summary.timed_out);
    for (record, prompt) in summary.transcript.iter().zip(&prompts) {
        assert_eq!(&record.prompt_text, prompt);
    }
    assert_eq!(summary.transcript[1].captured_duration_seconds, 7);
}

#[test]
fn transcript_never_exceeds_the_question_budget() {
    let mut session = InterviewSession::new(test_config(5), numbered_prompts(2));
    session.record_answer(1, blob());
    session.record_answer(1, blob());
    // Late events after completion are ignored.
    session.record_answer(1, blob());
    session.record_answer(1, blob());

    assert!(session.is_complete());
    assert_eq!(session.answered(), 2);
}

#[test]
fn skip_advances_without_appending() {
    let mut session = InterviewSession::new(test_config(5), numbered_prompts(3));
    session.record_answer(3, blob());
    session.skip_current_prompt();
    session.record_answer(5, blob());

    assert!(session.is_complete());
    // Two speech-end events, one skipped turn.
    let summary = session.into_summary();
    assert_eq!(summary.transcript.len(), 2);
    assert_eq!(summary.transcript[0].prompt_text, "Question 1");
    assert_eq!(summary.transcript[1].prompt_text, "Question 3");
}

#[test]
fn repeat_leaves_the_transcript_untouched() {
    let mut session = InterviewSession::new(test_config(5), numbered_prompts(2));
    assert_eq!(session.repeat_current_prompt(), Some("Question 1"));
    assert_eq!(session.repeat_current_prompt(), Some("Question 1"));
    assert_eq!(session.answered(), 0);
    assert_eq!(session.cursor(), 0);
}

#[test]
fn countdown_force_completes_with_an_empty_transcript() {
    // One second on the clock, no speech ever detected.
    let mut session =
        InterviewSession::with_countdown(test_config(1), numbered_prompts(5), 1);
    assert!(!session.is_complete());
    assert!(session.tick_second());

    assert!(session.is_complete());
    assert_eq!(session.current_prompt(), None);
    let summary = session.into_summary();
    assert!(summary.transcript.is_empty());
    assert!(summary.timed_out);
    assert_eq!(summary.total_elapsed_seconds, 1);
}

#[test]
fn countdown_stops_ticking_after_completion() {
    let mut session = InterviewSession::with_countdown(test_config(1), numbered_prompts(1), 2);
    session.record_answer(1, blob());
    assert!(session.is_complete());
    assert!(session.tick_second());
    assert_eq!(session.elapsed_seconds(), 0);
}

#[test]
fn elapsed_time_is_reported_in_the_summary() {
    let mut session = InterviewSession::with_countdown(test_config(1), numbered_prompts(1), 60);
    for _ in 0..13 {
        session.tick_second();
    }
    session.record_answer(9, blob());
    let summary = session.into_summary();
    assert_eq!(summary.total_elapsed_seconds, 13);
    assert!(!summary.timed_out);
}

#[test]
fn force_complete_keeps_accumulated_answers() {
    let mut session = InterviewSession::new(test_config(5), numbered_prompts(4));
    session.record_answer(2, blob());
    session.force_complete();

    assert!(session.is_complete());
    let summary = session.into_summary();
    assert_eq!(summary.transcript.len(), 1);
    assert!(!summary.timed_out);
}

#[test]
fn empty_prompt_lists_complete_immediately() {
    let session = InterviewSession::new(test_config(5), Vec::new());
    assert!(session.is_complete());
    assert_eq!(session.current_prompt(), None);
}

#[test]
fn countdown_seconds_derive_from_minutes() {
    assert_eq!(test_config(5).countdown_seconds(), 300);
    assert_eq!(test_config(1).countdown_seconds(), 60);
}

#[test]
fn default_prompts_fill_the_budget() {
    let session = InterviewSession::new(
        test_config(5),
        prompts_for(InterviewType::Behavioral, 5),
    );
    assert_eq!(session.question_budget(), 5);
}

#[test]
fn durations_render_as_minutes_and_seconds() {
    assert_eq!(format_duration(0), "00:00");
    assert_eq!(format_duration(5), "00:05");
    assert_eq!(format_duration(123), "02:03");
    assert_eq!(format_duration(3600), "60:00");
}
