// src/notify/tone.rs
use std::time::Duration;

use serde::Deserialize;

use crate::model::EventKind;

const AMPLITUDE: f32 = 0.5;
/// Linear fade at both ends of every tone, against clicks.
const FADE_MS: u64 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct ToneSpec {
    pub freq_hz: u32,
    pub duration_ms: u64,
}

impl ToneSpec {
    pub const fn new(freq_hz: u32, duration_ms: u64) -> Self {
        Self { freq_hz, duration_ms }
    }
}

/// A short beep pattern played before speech.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ToneCue {
    pub tones: Vec<ToneSpec>,
    #[serde(default)]
    pub gap_ms: u64,
}

impl ToneCue {
    /// Two short ascending tones.
    pub fn arrival() -> Self {
        Self { tones: vec![ToneSpec::new(800, 200), ToneSpec::new(1000, 200)], gap_ms: 100 }
    }

    /// One longer, lower tone.
    pub fn departure() -> Self {
        Self { tones: vec![ToneSpec::new(600, 400)], gap_ms: 0 }
    }

    pub fn total_duration(&self) -> Duration {
        let tones: u64 = self.tones.iter().map(|t| t.duration_ms).sum();
        let gaps = self.gap_ms * self.tones.len().saturating_sub(1) as u64;
        Duration::from_millis(tones + gaps)
    }

    /// Mono f32 samples for the whole cue, gaps included.
    pub fn render(&self, sample_rate: u32) -> Vec<f32> {
        let per_ms = sample_rate as f64 / 1000.0;
        let gap = (self.gap_ms as f64 * per_ms) as usize;
        let mut out = Vec::with_capacity((self.total_duration().as_millis() as f64 * per_ms) as usize);

        for (i, tone) in self.tones.iter().enumerate() {
            if i > 0 {
                out.extend(std::iter::repeat(0.0).take(gap));
            }
            let n = (tone.duration_ms as f64 * per_ms) as usize;
            let fade = ((FADE_MS as f64 * per_ms) as usize).min(n / 2).max(1);
            let step = std::f64::consts::TAU * tone.freq_hz as f64 / sample_rate as f64;
            out.extend((0..n).map(|k| {
                let env = (k.min(n - 1 - k) as f32 / fade as f32).min(1.0);
                (step * k as f64).sin() as f32 * AMPLITUDE * env
            }));
        }
        out
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cues {
    pub arrival: ToneCue,
    pub departure: ToneCue,
}

impl Default for Cues {
    fn default() -> Self {
        Self { arrival: ToneCue::arrival(), departure: ToneCue::departure() }
    }
}

impl Cues {
    pub fn for_kind(&self, kind: EventKind) -> &ToneCue {
        match kind {
            EventKind::Arrival => &self.arrival,
            EventKind::Departure => &self.departure,
        }
    }
}

#[cfg(feature = "audio")]
pub use player::TonePlayer;

#[cfg(feature = "audio")]
mod player {
    use std::thread;
    use std::time::Duration;

    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
    use cpal::{FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};
    use tracing::{debug, info, warn};

    use super::ToneCue;
    use crate::error::NotifyError;

    /// Default output device, opened once and reused for every cue.
    pub struct TonePlayer {
        device: cpal::Device,
        config: StreamConfig,
        format: SampleFormat,
    }

    impl TonePlayer {
        pub fn open() -> Result<Self, NotifyError> {
            let host = cpal::default_host();
            let device = host
                .default_output_device()
                .ok_or_else(|| NotifyError::Audio("no default output device".into()))?;
            let supported = device
                .default_output_config()
                .map_err(|e| NotifyError::Audio(format!("default config: {e}")))?;

            let format = supported.sample_format();
            let config: StreamConfig = supported.into();
            info!(
                "Tone: device={} rate={} channels={} format={format:?}",
                device.name().unwrap_or_else(|_| "Unknown".into()),
                config.sample_rate.0,
                config.channels
            );
            Ok(Self { device, config, format })
        }

        /// Blocks until the cue has played out.
        pub fn play(&self, cue: &ToneCue) -> Result<(), NotifyError> {
            let samples = cue.render(self.config.sample_rate.0);
            let stream = match self.format {
                SampleFormat::F32 => self.build::<f32>(samples)?,
                SampleFormat::I16 => self.build::<i16>(samples)?,
                SampleFormat::U16 => self.build::<u16>(samples)?,
                other => return Err(NotifyError::Audio(format!("unsupported sample format {other:?}"))),
            };

            stream.play().map_err(|e| NotifyError::Audio(format!("play: {e}")))?;
            thread::sleep(cue.total_duration() + Duration::from_millis(60));
            debug!("Tone: played {} tone(s)", cue.tones.len());
            Ok(())
        }

        fn build<T>(&self, samples: Vec<f32>) -> Result<Stream, NotifyError>
        where
            T: SizedSample + FromSample<f32>,
        {
            let channels = self.config.channels as usize;
            let mut cursor = 0usize;
            self.device
                .build_output_stream(
                    &self.config,
                    move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                        for frame in data.chunks_mut(channels) {
                            let v = T::from_sample(samples.get(cursor).copied().unwrap_or(0.0));
                            cursor += 1;
                            for out in frame.iter_mut() {
                                *out = v;
                            }
                        }
                    },
                    |err| warn!("Tone: stream error: {err}"),
                    None,
                )
                .map_err(|e| NotifyError::Audio(format!("build stream: {e}")))
        }
    }
}
