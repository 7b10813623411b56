// Configuration - Key layout, sound and lesson settings stored as RON

use crate::error::{PianoError, PianoResult};
use crate::note::{KeyBinding, KeyLayout, default_keys};
use crate::sequencer::lesson::Lesson;
use crate::sequencer::schedule::Speed;
use crate::synth::envelope::PluckParams;
use crate::synth::oscillator::WaveType;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "virtual-piano";
const CONFIG_FILE: &str = "config.ron";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PianoConfig {
    pub keys: Vec<KeyBinding>,
    pub wave_type: WaveType,
    /// Initial playback speed multiplier
    pub speed: f64,
    /// Range offered by the speed slider
    pub speed_range: (f64, f64),
    pub loop_enabled: bool,
    /// Master volume (0.0 - 1.0)
    pub volume: f32,
    pub envelope: PluckParams,
    pub lesson: Lesson,
}

impl Default for PianoConfig {
    fn default() -> Self {
        Self {
            keys: default_keys(),
            wave_type: WaveType::default(),
            speed: 1.0,
            speed_range: (0.5, 1.5),
            loop_enabled: false,
            volume: 0.5,
            envelope: PluckParams::default(),
            lesson: Lesson::default(),
        }
    }
}

impl PianoConfig {
    /// `<config_dir>/virtual-piano/config.ron`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Parse and validate a RON document
    pub fn from_ron(text: &str) -> PianoResult<Self> {
        let config: Self = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_ron(&self) -> PianoResult<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| PianoError::InvalidConfig(format!("Failed to serialize: {}", e)))
    }

    pub fn load(path: &Path) -> PianoResult<Self> {
        let text = fs::read_to_string(path)?;
        let config = Self::from_ron(&text)?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> PianoResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_ron()?)?;
        Ok(())
    }

    /// Explicit path if given, else the per-user file if it exists, else defaults
    ///
    /// An explicit path that cannot be loaded is an error; a broken per-user file
    /// only logs a warning.
    pub fn load_or_default(explicit: Option<&Path>) -> PianoResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => match Self::load(&path) {
                Ok(config) => Ok(config),
                Err(e) => {
                    log::warn!("Ignoring {}: {}", path.display(), e);
                    Ok(Self::default())
                }
            },
            _ => {
                log::info!("No configuration file, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> PianoResult<()> {
        let mut seen = HashSet::new();
        for key in &self.keys {
            if !seen.insert(&key.note) {
                return Err(PianoError::InvalidConfig(format!(
                    "Duplicate note {} in key layout",
                    key.note
                )));
            }
            if !(key.frequency.is_finite() && key.frequency > 0.0) {
                return Err(PianoError::InvalidConfig(format!(
                    "Note {} has invalid frequency {}",
                    key.note, key.frequency
                )));
            }
        }

        Speed::new(self.speed)?;
        let (low, high) = self.speed_range;
        if Speed::new(low).is_err() || Speed::new(high).is_err() || low > high {
            return Err(PianoError::InvalidConfig(format!(
                "Invalid speed range {}..{}",
                low, high
            )));
        }

        if !(0.0..=1.0).contains(&self.volume) {
            return Err(PianoError::InvalidConfig(format!(
                "Volume {} out of range 0.0-1.0",
                self.volume
            )));
        }

        if let Some(step) = self
            .lesson
            .steps
            .iter()
            .find(|step| !(step.duration.is_finite() && step.duration > 0.0))
        {
            return Err(PianoError::InvalidConfig(format!(
                "Lesson step {} has invalid duration {}",
                step.note, step.duration
            )));
        }

        Ok(())
    }

    pub fn layout(&self) -> KeyLayout {
        KeyLayout::new(self.keys.clone())
    }
}
