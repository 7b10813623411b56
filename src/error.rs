// Error types shared by the session, configuration and audio layers

/// Result alias used across the crate
pub type PianoResult<T> = Result<T, PianoError>;

/// Everything that can refuse or fail in the piano
///
/// Session rejections (recording while playing back, playing an empty log, ...)
/// are ordinary values: the session state is left untouched when one is returned.
#[derive(Debug, thiserror::Error)]
pub enum PianoError {
    #[error("Recording is in progress")]
    RecordingActive,

    #[error("Playback is in progress")]
    PlaybackActive,

    #[error("A lesson is already running")]
    LessonActive,

    #[error("Not currently recording")]
    NotRecording,

    #[error("Not currently playing back")]
    NotPlaying,

    #[error("Nothing to play")]
    NothingToPlay,

    #[error("Invalid playback speed: {0} (must be a finite value above zero)")]
    InvalidSpeed(f64),

    #[error("Unknown sound type: {0}")]
    UnknownWaveType(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RON error: {0}")]
    RonParse(#[from] ron::error::SpannedError),

    #[error("Audio device error: {0}")]
    Audio(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            PianoError::InvalidSpeed(-1.0).to_string(),
            "Invalid playback speed: -1 (must be a finite value above zero)"
        );
        assert_eq!(
            PianoError::UnknownWaveType("organ".into()).to_string(),
            "Unknown sound type: organ"
        );
    }
}
