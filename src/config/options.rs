// src/config/options.rs
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::info;

use super::consts::*;
use crate::error::ConfigError;
use crate::filter::NameFilter;
use crate::notify::{Cues, ToneCue, VoicePreference};

/// Everything the monitor reads from `attok_monitor.toml`. Every key is optional.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonitorConfig {
    pub tick_seconds: u64,
    pub failure_backoff_cap_seconds: u64,
    pub failure_threshold: u32,
    pub extract_timeout_seconds: u64,
    pub queue_capacity: usize,
    pub voice_preference: VoicePreference,
    pub speech_rate: u32,
    pub tone_arrival: ToneCue,
    pub tone_departure: ToneCue,
    pub stop_words_extra: Vec<String>,
    pub board_url: String,
    pub log_dir: PathBuf,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            tick_seconds: TICK_SECONDS,
            failure_backoff_cap_seconds: BACKOFF_CAP_SECONDS,
            failure_threshold: FAILURE_THRESHOLD,
            extract_timeout_seconds: EXTRACT_TIMEOUT_SECONDS,
            queue_capacity: QUEUE_CAPACITY,
            voice_preference: VoicePreference::default(),
            speech_rate: SPEECH_RATE,
            tone_arrival: ToneCue::arrival(),
            tone_departure: ToneCue::departure(),
            stop_words_extra: Vec::new(),
            board_url: BOARD_URL.to_string(),
            log_dir: PathBuf::from(LOG_DIR),
        }
    }
}

impl MonitorConfig {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// `Some(path)`: the file must exist. `None`: use `attok_monitor.toml`
    /// in the working directory if present, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(CONFIG_FILE), false),
        };

        if !explicit && !path.exists() {
            info!("Config: {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let cfg = Self::from_toml(&text)?;
        info!("Config: loaded {}", path.display());
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let bad = |msg: String| Err(ConfigError::Invalid(msg));

        if self.tick_seconds < 1 {
            return bad("tick_seconds must be >= 1".into());
        }
        if self.failure_backoff_cap_seconds < self.tick_seconds {
            return bad(format!(
                "failure_backoff_cap_seconds ({}) is below tick_seconds ({})",
                self.failure_backoff_cap_seconds, self.tick_seconds
            ));
        }
        if self.failure_threshold < 1 {
            return bad("failure_threshold must be >= 1".into());
        }
        if self.extract_timeout_seconds < 1 {
            return bad("extract_timeout_seconds must be >= 1".into());
        }
        if self.queue_capacity < 1 {
            return bad("queue_capacity must be >= 1".into());
        }
        if self.board_url.trim().is_empty() {
            return bad("board_url is empty".into());
        }
        for (label, cue) in [("tone_arrival", &self.tone_arrival), ("tone_departure", &self.tone_departure)] {
            if cue.tones.is_empty() {
                return bad(format!("{label} has no tones"));
            }
            if cue.gap_ms > TONE_MAX_MS {
                return bad(format!("{label}.gap_ms above {TONE_MAX_MS}"));
            }
            for t in &cue.tones {
                if !(TONE_MIN_HZ..=TONE_MAX_HZ).contains(&t.freq_hz) {
                    return bad(format!("{label}: {} Hz outside {TONE_MIN_HZ}..={TONE_MAX_HZ}", t.freq_hz));
                }
                if !(1..=TONE_MAX_MS).contains(&t.duration_ms) {
                    return bad(format!("{label}: {} ms outside 1..={TONE_MAX_MS}", t.duration_ms));
                }
            }
        }
        Ok(())
    }

    pub fn tick(&self) -> Duration { Duration::from_secs(self.tick_seconds) }
    pub fn backoff_cap(&self) -> Duration { Duration::from_secs(self.failure_backoff_cap_seconds) }
    pub fn extract_timeout(&self) -> Duration { Duration::from_secs(self.extract_timeout_seconds) }

    pub fn cues(&self) -> Cues {
        Cues { arrival: self.tone_arrival.clone(), departure: self.tone_departure.clone() }
    }

    pub fn name_filter(&self) -> NameFilter {
        NameFilter::with_extra(&self.stop_words_extra)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::ToneSpec;
    use std::io::Write;

    #[test]
    fn empty_file_is_defaults() {
        assert_eq!(MonitorConfig::from_toml("").unwrap(), MonitorConfig::default());
    }

    #[test]
    fn overrides() {
        let cfg = MonitorConfig::from_toml(
            r#"
            tick_seconds = 5
            failure_backoff_cap_seconds = 60
            voice_preference = "default"
            stop_words_extra = ["공지사항"]
            tone_departure = { tones = [{ freq_hz = 500, duration_ms = 300 }] }
            "#,
        )
        .unwrap();
        assert_eq!(cfg.tick(), Duration::from_secs(5));
        assert_eq!(cfg.voice_preference, VoicePreference::Default);
        assert_eq!(cfg.tone_departure.tones, vec![ToneSpec::new(500, 300)]);
        assert_eq!(cfg.tone_departure.gap_ms, 0);
        assert_eq!(cfg.tone_arrival, ToneCue::arrival());
        assert!(!cfg.name_filter().accepts("공지사항"));
    }

    #[test]
    fn rejects_bad_values() {
        for text in [
            "tick_seconds = 0",
            "tick_seconds = 60\nfailure_backoff_cap_seconds = 30",
            "queue_capacity = 0",
            "extract_timeout_seconds = 0",
            "tone_arrival = { tones = [] }",
            "tone_arrival = { tones = [{ freq_hz = 5, duration_ms = 100 }] }",
            "tone_arrival = { tones = [{ freq_hz = 800, duration_ms = 0 }] }",
        ] {
            assert!(matches!(MonitorConfig::from_toml(text), Err(ConfigError::Invalid(_))), "{text}");
        }
    }

    #[test]
    fn unknown_key_is_parse_error() {
        assert!(matches!(MonitorConfig::from_toml("tick = 3"), Err(ConfigError::Parse(_))));
        assert!(matches!(MonitorConfig::from_toml(r#"voice_preference = "en""#), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn load_from_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "tick_seconds = 7").unwrap();
        let cfg = MonitorConfig::load(Some(f.path())).unwrap();
        assert_eq!(cfg.tick_seconds, 7);
    }

    #[test]
    fn explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(MonitorConfig::load(Some(&missing)), Err(ConfigError::Io { .. })));
    }
}
