// Integration test: Stability of long looped playback
//
// A looping session must keep its timer queue and voice pool bounded and keep
// producing finite, clipped-free output for as long as it runs.

use virtual_piano::{FeedbackLog, NoteName, PianoConfig, PianoSession};

/// Simulated minutes of looping - suitable for CI
#[test]
fn test_loop_stability_short() {
    run_loop_stability(60.0, 8000.0, "short (1 simulated min)");
}

/// Run manually for full validation: cargo test --test stability -- --ignored
#[test]
#[ignore]
fn test_loop_stability_long() {
    run_loop_stability(60.0 * 30.0, 48000.0, "long (30 simulated min)");
}

fn run_loop_stability(seconds: f64, sample_rate: f32, test_name: &str) {
    const BUFFER_SIZE: usize = 512;

    println!("\n=== Loop Stability Test ({}) ===", test_name);

    let mut session = PianoSession::new(&PianoConfig::default(), sample_rate, FeedbackLog::new());

    // A short chord-ish phrase with overlapping notes: (note, frequency, on, off)
    session.start_recording().unwrap();
    let phrase = [
        ("C4", 261.63, 0.0, 0.4),
        ("E4", 329.63, 0.1, 0.5),
        ("G4", 392.0, 0.2, 0.6),
        ("C5", 523.25, 0.5, 0.9),
    ];
    let mut edges: Vec<(f64, &str, Option<f32>)> = Vec::new();
    for (name, frequency, on, off) in phrase {
        edges.push((on, name, Some(frequency)));
        edges.push((off, name, None));
    }
    edges.sort_by(|a, b| a.0.total_cmp(&b.0));
    for (at, name, frequency) in edges {
        session.advance_to(at);
        match frequency {
            Some(frequency) => session.note_on(&NoteName::from(name), frequency),
            None => session.note_off_request(&NoteName::from(name)),
        }
    }
    session.stop_recording().unwrap();
    let events = session.recording_log().len();
    assert_eq!(events, 4);

    session.set_loop(true);
    session.play().unwrap();

    let mut buffer = vec![0.0f32; BUFFER_SIZE];
    let mut clock = session.now();
    let end = clock + seconds;
    let step = BUFFER_SIZE as f64 / sample_rate as f64;

    let mut max_pending = 0;
    let mut max_voices = 0;
    let mut max_amplitude = 0.0f32;

    while clock < end {
        session.render(clock, sample_rate, &mut buffer);
        clock += step;

        for sample in &buffer {
            assert!(sample.is_finite(), "Non-finite sample at {:.3}s", clock);
            max_amplitude = max_amplitude.max(sample.abs());
        }

        max_pending = max_pending.max(session.pending_tasks());
        let engine = session.voice_engine();
        max_voices = max_voices.max(engine.active_voice_count() + engine.releasing_voice_count());
    }

    println!("Max pending tasks: {}", max_pending);
    println!("Max voices: {}", max_voices);
    println!("Max amplitude: {:.3}", max_amplitude);

    assert!(session.is_playing_back());
    // One pass in flight at a time: an on, an off per event plus the cycle end
    assert!(max_pending <= 2 * events + 1);
    assert!(max_voices <= 2 * events);
    assert!(max_amplitude < 2.0);

    // Turning the loop off lets the pass in flight finish
    session.set_loop(false);
    session.advance_to(clock + 2.0);
    assert!(!session.is_playing_back());
    assert_eq!(session.pending_tasks(), 0);
    assert_eq!(session.voice_engine().active_voice_count(), 0);
}
