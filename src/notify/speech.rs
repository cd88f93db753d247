// src/notify/speech.rs
use serde::Deserialize;

/// Voice pick for the speech engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoicePreference {
    /// First installed Korean voice, else the platform default.
    #[default]
    Ko,
    Default,
}

/// Rate on a scale where 200 is the engine's normal speed.
pub const NOMINAL_RATE: u32 = 200;

/// Map `rate` (200 = normal) into an engine's `[min, max]` range,
/// pivoting on its own `normal` so engines with a zero-centred scale work too.
pub fn scale_rate(rate: u32, min: f32, normal: f32, max: f32) -> f32 {
    let f = rate as f32 / NOMINAL_RATE as f32;
    let v = if f <= 1.0 {
        min + (normal - min) * f
    } else {
        normal + (max - normal) * (f - 1.0)
    };
    v.clamp(min, max)
}

#[cfg(feature = "audio")]
pub use engine::SpeechEngine;

#[cfg(feature = "audio")]
mod engine {
    use std::thread;
    use std::time::{Duration, Instant};

    use tracing::{debug, info, warn};
    use tts::Tts;

    use super::{scale_rate, VoicePreference};
    use crate::error::NotifyError;

    const POLL: Duration = Duration::from_millis(50);
    /// Upper bound on one utterance; a stuck engine must not wedge the queue.
    const MAX_UTTERANCE: Duration = Duration::from_secs(10);

    fn speech_err(e: tts::Error) -> NotifyError {
        NotifyError::Speech(e.to_string())
    }

    /// One long-lived synthesis session. Lives on the notifier thread.
    pub struct SpeechEngine {
        tts: Tts,
        can_poll: bool,
    }

    impl SpeechEngine {
        pub fn open(pref: VoicePreference, rate: u32) -> Result<Self, NotifyError> {
            let mut tts = Tts::default().map_err(speech_err)?;
            let features = tts.supported_features();

            if features.rate {
                let r = scale_rate(rate, tts.min_rate(), tts.normal_rate(), tts.max_rate());
                tts.set_rate(r).map_err(speech_err)?;
            }
            if features.volume {
                let max = tts.max_volume();
                tts.set_volume(max).map_err(speech_err)?;
            }
            if features.voice && pref == VoicePreference::Ko {
                match tts.voices() {
                    Ok(voices) => {
                        match voices.iter().find(|v| v.language().to_string().starts_with("ko")) {
                            Some(v) => {
                                tts.set_voice(v).map_err(speech_err)?;
                                info!("Speech: voice {} ({})", v.name(), v.language());
                            }
                            None => info!("Speech: no Korean voice installed, using default"),
                        }
                    }
                    Err(e) => warn!("Speech: cannot list voices: {e}"),
                }
            }

            Ok(Self { tts, can_poll: features.is_speaking })
        }

        /// Blocks until the engine reports it is done (bounded).
        pub fn speak(&mut self, text: &str) -> Result<(), NotifyError> {
            self.tts.speak(text, false).map_err(speech_err)?;
            debug!("Speech: {text:?}");

            if !self.can_poll {
                // Rough guess at ~4 syllables/s
                thread::sleep(Duration::from_millis(250 * text.chars().count() as u64 + 300));
                return Ok(());
            }

            let start = Instant::now();
            thread::sleep(POLL);
            while self.tts.is_speaking().map_err(speech_err)? {
                if start.elapsed() > MAX_UTTERANCE {
                    warn!("Speech: utterance still running after {MAX_UTTERANCE:?}, moving on");
                    break;
                }
                thread::sleep(POLL);
            }
            Ok(())
        }
    }
}
