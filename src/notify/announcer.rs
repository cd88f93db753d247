// src/notify/announcer.rs
use tracing::info;

use super::speech::VoicePreference;
use super::tone::ToneCue;
use crate::error::NotifyError;

/// Audio side of one notification: a tone cue, then a spoken line.
/// Implementations live on the notifier thread and need not be `Send`.
pub trait Announcer {
    fn chime(&mut self, cue: &ToneCue) -> Result<(), NotifyError>;
    fn speak(&mut self, text: &str) -> Result<(), NotifyError>;
}

/// No audio; log only.
pub struct SilentAnnouncer;

impl Announcer for SilentAnnouncer {
    fn chime(&mut self, cue: &ToneCue) -> Result<(), NotifyError> {
        info!("Notify: (silent) {} tone(s)", cue.tones.len());
        Ok(())
    }

    fn speak(&mut self, text: &str) -> Result<(), NotifyError> {
        info!("Notify: (silent) {text}");
        Ok(())
    }
}

/// Whatever the platform offers; each half degrades to silence on its own.
#[cfg(feature = "audio")]
pub struct SystemAnnouncer {
    tones: Option<super::tone::TonePlayer>,
    voice: Option<super::speech::SpeechEngine>,
}

#[cfg(feature = "audio")]
impl SystemAnnouncer {
    pub fn open(pref: VoicePreference, rate: u32) -> Self {
        use tracing::warn;

        let tones = super::tone::TonePlayer::open()
            .map_err(|e| warn!("Notify: tones disabled: {e}"))
            .ok();
        let voice = super::speech::SpeechEngine::open(pref, rate)
            .map_err(|e| warn!("Notify: speech disabled: {e}"))
            .ok();
        Self { tones, voice }
    }
}

#[cfg(feature = "audio")]
impl Announcer for SystemAnnouncer {
    fn chime(&mut self, cue: &ToneCue) -> Result<(), NotifyError> {
        match &self.tones {
            Some(p) => p.play(cue),
            None => Ok(()),
        }
    }

    fn speak(&mut self, text: &str) -> Result<(), NotifyError> {
        match &mut self.voice {
            Some(v) => v.speak(text),
            None => {
                info!("Notify: (no speech) {text}");
                Ok(())
            }
        }
    }
}

/// Best announcer this build can offer. Call on the notifier thread.
pub fn platform_announcer(pref: VoicePreference, rate: u32) -> Box<dyn Announcer> {
    #[cfg(feature = "audio")]
    {
        Box::new(SystemAnnouncer::open(pref, rate))
    }
    #[cfg(not(feature = "audio"))]
    {
        let _ = (pref, rate);
        info!("Notify: built without `audio`; notifications are logged only");
        Box::new(SilentAnnouncer)
    }
}
