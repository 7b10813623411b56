// Integration test: Randomized recording sessions
//
// Random presses and releases are replayed against a simple model of what the
// log must contain.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use virtual_piano::sequencer::MIN_NOTE_DURATION;
use virtual_piano::{FeedbackLog, FrequencyLookup, NoteName, PianoConfig, PianoSession};

const EPS: f64 = 1e-9;

struct Expected {
    note: NoteName,
    start: f64,
    duration: f64,
}

fn run_random_session(seed: u64, actions: usize, use_sustain: bool) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut session = PianoSession::new(&PianoConfig::default(), 44100.0, FeedbackLog::new());

    let mut names: Vec<NoteName> = session
        .layout()
        .keys()
        .iter()
        .map(|key| key.note.clone())
        .collect();
    // A note the layout cannot resolve
    names.push(NoteName::from("Z0"));

    let mut pending: HashMap<NoteName, f64> = HashMap::new();
    let mut held_by_pedal: Vec<NoteName> = Vec::new();
    let mut sustain = false;
    let mut expected: Vec<Expected> = Vec::new();

    let mut finish = |note: &NoteName, now: f64, pending: &mut HashMap<NoteName, f64>| {
        if let Some(start) = pending.remove(note) {
            if session_layout_has(note) {
                expected.push(Expected {
                    note: note.clone(),
                    start,
                    duration: (now - start).max(MIN_NOTE_DURATION),
                });
            }
        }
    };

    session.start_recording().unwrap();
    let mut now = 0.0;

    for _ in 0..actions {
        now += rng.gen_range(0.0..0.25);
        session.advance_to(now);

        if use_sustain && rng.gen_bool(0.1) {
            sustain = !sustain;
            session.set_sustain(sustain);
            if !sustain {
                for note in held_by_pedal.drain(..) {
                    finish(&note, now, &mut pending);
                }
            }
            continue;
        }

        let note = names[rng.gen_range(0..names.len())].clone();
        if pending.contains_key(&note) && !held_by_pedal.contains(&note) {
            session.note_off_request(&note);
            if sustain {
                held_by_pedal.push(note);
            } else {
                finish(&note, now, &mut pending);
            }
        } else {
            session.note_on(&note, 440.0);
            pending.entry(note).or_insert(now);
        }
    }

    now += 0.5;
    session.advance_to(now);
    session.stop_recording().unwrap();

    // Still-open notes are closed at stop, ordered by start
    let mut open: Vec<(NoteName, f64)> = pending.into_iter().collect();
    open.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    for (note, start) in open {
        if session_layout_has(&note) {
            expected.push(Expected {
                note,
                start,
                duration: (now - start).max(MIN_NOTE_DURATION),
            });
        }
    }

    let log = session.recording_log();
    assert_eq!(log.len(), expected.len(), "seed {}", seed);
    for (event, want) in log.iter().zip(&expected) {
        assert_eq!(event.note, want.note, "seed {}", seed);
        assert!(event.start >= 0.0);
        assert!(event.duration >= MIN_NOTE_DURATION);
        assert!((event.start - want.start).abs() < EPS, "seed {}", seed);
        assert!((event.duration - want.duration).abs() < EPS, "seed {}", seed);
        let layout_frequency = session.layout().frequency_of(&event.note).unwrap();
        assert_eq!(event.frequency, layout_frequency);
    }
}

fn session_layout_has(note: &NoteName) -> bool {
    virtual_piano::KeyLayout::two_octaves()
        .frequency_of(note)
        .is_some()
}

#[test]
fn test_random_recordings_match_model() {
    for seed in 0..20 {
        run_random_session(seed, 300, false);
    }
}

#[test]
fn test_random_recordings_with_sustain_match_model() {
    for seed in 100..120 {
        run_random_session(seed, 300, true);
    }
}
