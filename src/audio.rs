//! Impact feedback
//!
//! The board only decides *when* a ball knocks and *how hard*; an
//! [`ImpactSink`] turns that into sound. On the web the sound is a short
//! procedurally generated wood knock (filtered noise burst plus a low sine
//! body), no audio files needed. Playback is best effort: callers log and
//! drop any error.

use thiserror::Error;

/// Audio failures. Never fatal to the simulation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AudioError {
    #[error("audio output unavailable")]
    Unavailable,
    #[error("audio backend error: {0}")]
    Backend(String),
}

/// Plays a percussive impact at `intensity` in `[0, 1]`
pub trait ImpactSink {
    fn play_impact(&mut self, intensity: f32) -> Result<(), AudioError>;
}

/// Volume shaping shared by every backend
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Volume {
    pub master: f32,
    pub muted: bool,
}

impl Default for Volume {
    fn default() -> Self {
        Self {
            master: 0.8,
            muted: false,
        }
    }
}

impl Volume {
    /// Peak gain for an impact; the knock never exceeds 0.15
    pub fn impact_gain(&self, intensity: f32) -> f32 {
        if self.muted {
            0.0
        } else {
            (intensity.clamp(0.0, 1.0) * 0.15).min(0.15) * self.master.clamp(0.0, 1.0)
        }
    }
}

/// Native stand-in: no audio device, impacts are only traced
#[derive(Debug, Default)]
pub struct SilentAudio {
    pub volume: Volume,
    played: u64,
}

impl SilentAudio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Impacts requested so far
    pub fn played(&self) -> u64 {
        self.played
    }
}

impl ImpactSink for SilentAudio {
    fn play_impact(&mut self, intensity: f32) -> Result<(), AudioError> {
        self.played += 1;
        log::trace!(
            "knock intensity={:.2} gain={:.3}",
            intensity,
            self.volume.impact_gain(intensity)
        );
        Ok(())
    }
}

/// Test double that records every impact and can be told to fail
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingAudio {
    pub played: Vec<f32>,
    pub fail: bool,
}

#[cfg(test)]
impl ImpactSink for RecordingAudio {
    fn play_impact(&mut self, intensity: f32) -> Result<(), AudioError> {
        self.played.push(intensity);
        if self.fail {
            Err(AudioError::Unavailable)
        } else {
            Ok(())
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web_audio::WoodKnock;

#[cfg(target_arch = "wasm32")]
mod web_audio {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;
    use web_sys::{AudioContext, BiquadFilterType, OscillatorType};

    use super::{AudioError, ImpactSink, Volume};

    fn js_err(e: wasm_bindgen::JsValue) -> AudioError {
        AudioError::Backend(format!("{e:?}"))
    }

    /// Web Audio wood knock
    pub struct WoodKnock {
        ctx: Option<AudioContext>,
        pub volume: Volume,
        rng: Pcg32,
    }

    impl WoodKnock {
        pub fn new(seed: u64) -> Self {
            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                volume: Volume::default(),
                rng: Pcg32::seed_from_u64(seed),
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        fn knock(&mut self, ctx: &AudioContext, gain: f32) -> Result<(), wasm_bindgen::JsValue> {
            let t = ctx.current_time();
            let rate = ctx.sample_rate();

            // 50 ms of decaying noise for the woody texture
            let len = (rate * 0.05) as usize;
            let decay = len as f32 * 0.1;
            let samples: Vec<f32> = (0..len)
                .map(|i| (self.rng.random::<f32>() * 2.0 - 1.0) * (-(i as f32) / decay).exp())
                .collect();
            let buffer = ctx.create_buffer(1, len as u32, rate)?;
            buffer.copy_to_channel(&samples, 0)?;

            let noise = ctx.create_buffer_source()?;
            noise.set_buffer(Some(&buffer));

            let filter = ctx.create_biquad_filter()?;
            filter.set_type(BiquadFilterType::Bandpass);
            filter
                .frequency()
                .set_value(800.0 + self.rng.random::<f32>() * 400.0);
            filter.q().set_value(2.0);

            let noise_gain = ctx.create_gain()?;
            noise_gain.gain().set_value_at_time(gain, t)?;
            noise_gain
                .gain()
                .exponential_ramp_to_value_at_time(0.001, t + 0.08)?;

            // Low sine for body
            let osc = ctx.create_oscillator()?;
            osc.set_type(OscillatorType::Sine);
            osc.frequency()
                .set_value(150.0 + self.rng.random::<f32>() * 100.0);
            let osc_gain = ctx.create_gain()?;
            osc_gain.gain().set_value_at_time(gain * 0.3, t)?;
            osc_gain
                .gain()
                .exponential_ramp_to_value_at_time(0.001, t + 0.05)?;

            noise.connect_with_audio_node(&filter)?;
            filter.connect_with_audio_node(&noise_gain)?;
            noise_gain.connect_with_audio_node(&ctx.destination())?;
            osc.connect_with_audio_node(&osc_gain)?;
            osc_gain.connect_with_audio_node(&ctx.destination())?;

            noise.start_with_when(t)?;
            noise.stop_with_when(t + 0.1)?;
            osc.start_with_when(t)?;
            osc.stop_with_when(t + 0.1)?;
            Ok(())
        }
    }

    impl ImpactSink for WoodKnock {
        fn play_impact(&mut self, intensity: f32) -> Result<(), AudioError> {
            let gain = self.volume.impact_gain(intensity);
            if gain <= 0.0 {
                return Ok(());
            }
            let ctx = self.ctx.clone().ok_or(AudioError::Unavailable)?;

            // Resume context if suspended (browsers require user gesture)
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }
            self.knock(&ctx, gain).map_err(js_err)
        }
    }
}
