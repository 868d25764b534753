use super::capture::CaptureHandle;
use super::tap::{append_downmixed_samples, AnalysisTap};
use super::{
    ticks_to_seconds, AudioBlob, AudioFrame, LiveMeter, TurnConfig, TurnDetector, TurnEvent,
    TurnState, DEFAULT_FRAME_BINS, VISUAL_BINS,
};
use crossbeam_channel::bounded;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn detector(volume_threshold: f32, silence_run_ticks: u32) -> TurnDetector {
    TurnDetector::new(TurnConfig {
        volume_threshold,
        silence_run_ticks,
        tick_hz: 60,
    })
}

#[test]
fn downmixes_multi_channel_audio() {
    let mut buf = Vec::new();
    let samples = [1.0f32, -1.0, 0.5, 0.5];
    append_downmixed_samples(&mut buf, &samples, 2, |sample| sample);
    assert_eq!(buf, vec![0.0, 0.5]);
}

#[test]
fn preserves_single_channel_audio() {
    let mut buf = Vec::new();
    let samples = [0.1f32, 0.2, 0.3];
    append_downmixed_samples(&mut buf, &samples, 1, |sample| sample);
    assert_eq!(buf, samples);
}

#[test]
fn frame_from_empty_samples_is_silent() {
    let frame = AudioFrame::from_samples(&[], DEFAULT_FRAME_BINS);
    assert_eq!(frame.bins().len(), DEFAULT_FRAME_BINS);
    assert_eq!(frame.mean_amplitude(), 0.0);
}

#[test]
fn frame_bins_track_chunk_peaks() {
    // Two bins: quiet first half, full-scale second half.
    let mut samples = vec![0.0f32; 50];
    samples.extend(vec![1.0f32; 50]);
    let frame = AudioFrame::from_samples(&samples, 2);
    assert_eq!(frame.bins(), &[0, 255]);
    assert!((frame.mean_amplitude() - 127.5).abs() < 1e-3);
}

#[test]
fn frame_visual_slice_is_bounded() {
    let frame = AudioFrame::from_samples(&vec![0.5f32; 4096], DEFAULT_FRAME_BINS);
    assert_eq!(frame.visual().len(), VISUAL_BINS);

    let tiny = AudioFrame::from_samples(&[0.5f32; 8], 4);
    assert_eq!(tiny.visual().len(), 4);
}

#[test]
fn quiet_frames_never_start_a_turn() {
    let mut det = detector(20.0, 30);
    for _ in 0..500 {
        assert_eq!(det.on_tick(5.0), None);
    }
    assert_eq!(det.state(), TurnState::Idle);
}

#[test]
fn one_turn_yields_one_start_and_one_end_in_order() {
    let mut det = detector(20.0, 30);
    let mut events = Vec::new();
    for _ in 0..5 {
        if let Some(event) = det.on_tick(80.0) {
            events.push(event);
        }
    }
    for _ in 0..40 {
        if let Some(event) = det.on_tick(1.0) {
            events.push(event);
        }
    }
    assert_eq!(events.len(), 2);
    assert_eq!(events[0], TurnEvent::SpeechStart);
    assert!(matches!(events[1], TurnEvent::SpeechEnd { .. }));
}

#[test]
fn threshold_scenario_fires_at_expected_ticks() {
    // Volume threshold 20, silence run 30, amplitudes
    // [5, 5, 25, 25, 25] then 35 quiet ticks.
    let mut det = detector(20.0, 30);
    let mut amplitudes = vec![5.0, 5.0, 25.0, 25.0, 25.0];
    amplitudes.extend(std::iter::repeat(5.0).take(35));

    let mut fired = Vec::new();
    for (tick, amp) in amplitudes.iter().enumerate() {
        if let Some(event) = det.on_tick(*amp) {
            fired.push((tick, event));
        }
    }

    assert_eq!(fired.len(), 2, "expected one start and one end, got {fired:?}");
    assert_eq!(fired[0], (2, TurnEvent::SpeechStart));
    // Silence begins at tick 5; the run exceeds 30 on tick 35.
    assert_eq!(
        fired[1],
        (35, TurnEvent::SpeechEnd { speaking_ticks: 33 })
    );
    assert_eq!(det.state(), TurnState::Idle);
}

#[test]
fn speaking_ticks_include_the_silence_tail() {
    let mut det = detector(20.0, 10);
    for _ in 0..4 {
        det.on_tick(50.0);
    }
    let mut end = None;
    for _ in 0..20 {
        if let Some(event @ TurnEvent::SpeechEnd { .. }) = det.on_tick(0.0) {
            end = Some(event);
            break;
        }
    }
    // 4 loud ticks plus 10 counted silence ticks before the run tips over.
    assert_eq!(end, Some(TurnEvent::SpeechEnd { speaking_ticks: 14 }));
}

#[test]
fn reset_returns_to_idle_and_clears_counters() {
    let mut det = detector(20.0, 30);
    det.on_tick(100.0);
    assert_eq!(det.state(), TurnState::Speaking);
    det.reset();
    assert_eq!(det.state(), TurnState::Idle);
    assert_eq!(det.speaking_seconds(), 0);
    // A fresh crossing fires again after reset.
    assert_eq!(det.on_tick(100.0), Some(TurnEvent::SpeechStart));
}

#[test]
fn ticks_convert_to_whole_seconds() {
    assert_eq!(ticks_to_seconds(0, 60), 0);
    assert_eq!(ticks_to_seconds(59, 60), 0);
    assert_eq!(ticks_to_seconds(120, 60), 2);
    assert_eq!(ticks_to_seconds(10, 0), 10);
}

#[test]
fn live_meter_defaults_to_silence() {
    let meter = LiveMeter::new();
    assert_eq!(meter.level(), 0.0);
}

#[test]
fn live_meter_updates_level() {
    let meter = LiveMeter::new();
    meter.set_level(42.5);
    assert_eq!(meter.level(), 42.5);
}

#[test]
fn tap_emits_fixed_size_frames() {
    let (sender, receiver) = bounded(8);
    let mut tap = AnalysisTap::new(
        4,
        sender,
        Arc::new(AtomicUsize::new(0)),
        Arc::new(Mutex::new(Vec::new())),
        Arc::new(AtomicBool::new(false)),
    );
    tap.push(&[0.1f32; 10], 1, |sample| sample);
    assert_eq!(receiver.try_recv().map(|f| f.len()), Ok(4));
    assert_eq!(receiver.try_recv().map(|f| f.len()), Ok(4));
    // Two trailing samples stay pending until the next callback.
    assert!(receiver.try_recv().is_err());
}

#[test]
fn tap_counts_dropped_frames_when_channel_is_full() {
    let (sender, receiver) = bounded(1);
    let dropped = Arc::new(AtomicUsize::new(0));
    let mut tap = AnalysisTap::new(
        2,
        sender,
        dropped.clone(),
        Arc::new(Mutex::new(Vec::new())),
        Arc::new(AtomicBool::new(false)),
    );
    tap.push(&[0.2f32; 8], 1, |sample| sample);
    assert_eq!(receiver.len(), 1);
    assert_eq!(dropped.load(Ordering::Relaxed), 3);
}

#[test]
fn tap_mirrors_samples_only_while_recording() {
    let (sender, _receiver) = bounded(8);
    let record = Arc::new(Mutex::new(Vec::new()));
    let recording = Arc::new(AtomicBool::new(false));
    let mut tap = AnalysisTap::new(
        4,
        sender,
        Arc::new(AtomicUsize::new(0)),
        record.clone(),
        recording.clone(),
    );

    tap.push(&[0.3f32; 4], 1, |sample| sample);
    assert!(record.lock().unwrap().is_empty());

    recording.store(true, Ordering::Relaxed);
    tap.push(&[0.3f32; 4], 1, |sample| sample);
    assert_eq!(record.lock().unwrap().len(), 4);
}

#[test]
fn blob_round_trips_through_wav() {
    let samples: Vec<f32> = (0..320).map(|i| (i as f32 * 0.05).sin() * 0.5).collect();
    let blob = AudioBlob::from_samples(&samples, 16_000).expect("encode wav");
    assert!(!blob.is_empty());

    let reader =
        hound::WavReader::new(std::io::Cursor::new(blob.as_bytes())).expect("parse wav header");
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, 16_000);
    assert_eq!(reader.len() as usize, samples.len());
}

fn test_handle(
    recording: Arc<AtomicBool>,
    record: Arc<Mutex<Vec<f32>>>,
) -> (CaptureHandle, crossbeam_channel::Sender<Vec<f32>>) {
    let (sender, receiver) = bounded(1);
    (
        CaptureHandle::for_tests(receiver, record, recording, 16_000),
        sender,
    )
}

#[test]
fn end_recording_without_begin_is_a_logic_fault() {
    let (handle, _sender) = test_handle(
        Arc::new(AtomicBool::new(false)),
        Arc::new(Mutex::new(Vec::new())),
    );
    assert!(matches!(
        handle.end_recording(),
        Err(super::CaptureError::NoActiveRecording)
    ));
}

#[test]
fn begin_then_end_recording_yields_a_blob() {
    let record = Arc::new(Mutex::new(Vec::new()));
    let (handle, _sender) = test_handle(Arc::new(AtomicBool::new(false)), record.clone());

    handle.begin_recording();
    assert!(handle.is_recording());
    record.lock().unwrap().extend_from_slice(&[0.25f32; 160]);

    let blob = handle.end_recording().expect("finished blob");
    assert!(!handle.is_recording());
    assert!(!blob.is_empty());
}

#[test]
fn abort_recording_discards_pending_samples() {
    let record = Arc::new(Mutex::new(Vec::new()));
    let (handle, _sender) = test_handle(Arc::new(AtomicBool::new(false)), record.clone());

    handle.begin_recording();
    record.lock().unwrap().extend_from_slice(&[0.25f32; 16]);
    handle.abort_recording();

    assert!(!handle.is_recording());
    assert!(record.lock().unwrap().is_empty());
    assert!(matches!(
        handle.end_recording(),
        Err(super::CaptureError::NoActiveRecording)
    ));
}

#[test]
fn release_is_idempotent() {
    let (mut handle, _sender) = test_handle(
        Arc::new(AtomicBool::new(true)),
        Arc::new(Mutex::new(Vec::new())),
    );
    assert!(!handle.is_released());
    handle.release();
    assert!(handle.is_released());
    assert!(!handle.is_recording());
    // Second release observes nothing left to do.
    handle.release();
    assert!(handle.is_released());
}

#[test]
fn next_frame_times_out_without_data() {
    let (mut handle, _sender) = test_handle(
        Arc::new(AtomicBool::new(false)),
        Arc::new(Mutex::new(Vec::new())),
    );
    let got = handle
        .next_frame(Duration::from_millis(1))
        .expect("timeout is not an error");
    assert!(got.is_none());
}
