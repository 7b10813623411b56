// Integration test: Session logging stays below the default filter
//
// The session runs inside the audio callback; with the binary's default `info`
// filter nothing it logs after construction may reach the writer.

use log::{Level, LevelFilter, Log, Metadata, Record};
use std::sync::Mutex;
use virtual_piano::{FeedbackLog, Lesson, LessonStep, NoteName, PianoConfig, PianoSession};

struct CaptureLogger {
    records: Mutex<Vec<(Level, String)>>,
}

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if let Ok(mut records) = self.records.lock() {
            records.push((record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger {
    records: Mutex::new(Vec::new()),
};

#[test]
fn test_session_transitions_log_at_debug_only() {
    log::set_logger(&LOGGER).unwrap();
    log::set_max_level(LevelFilter::Trace);

    let mut config = PianoConfig::default();
    config.lesson = Lesson {
        title: "Short".to_string(),
        steps: vec![LessonStep::new("C4", 0.2)],
    };
    let mut session = PianoSession::new(&config, 8000.0, FeedbackLog::new());
    let c4 = NoteName::from("C4");

    session.start_recording().unwrap();
    session.note_on(&c4, 261.63);
    session.advance_to(0.3);
    session.note_off_request(&c4);
    session.stop_recording().unwrap();

    session.set_loop(true);
    session.play().unwrap();
    session.advance_to(1.5);
    session.stop_playback().unwrap();
    session.play().unwrap();
    session.set_loop(false);
    session.advance_to(3.0);

    session.start_lesson().unwrap();
    session.advance_to(4.0);

    // Rejections
    assert!(session.stop_recording().is_err());
    assert!(session.stop_playback().is_err());

    let records = LOGGER.records.lock().unwrap();
    assert!(
        records.iter().any(|(level, _)| *level == Level::Debug),
        "the flow should have produced debug records"
    );
    let loud: Vec<_> = records
        .iter()
        .filter(|(level, _)| *level <= Level::Info)
        .collect();
    assert!(loud.is_empty(), "records above debug: {:?}", loud);
}
