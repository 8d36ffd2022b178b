//! User settings
//!
//! Physics sliders, background colour and audio. Held in memory only; the
//! native runner can read them from a JSON file.

use serde::{Deserialize, Serialize};

use crate::audio::Volume;
use crate::board::BoardConfig;

/// Background colour presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BackgroundPreset {
    #[default]
    Midnight,
    DeepPurple,
    DarkTeal,
    Charcoal,
    Navy,
    DarkRed,
}

impl BackgroundPreset {
    pub const ALL: [BackgroundPreset; 6] = [
        BackgroundPreset::Midnight,
        BackgroundPreset::DeepPurple,
        BackgroundPreset::DarkTeal,
        BackgroundPreset::Charcoal,
        BackgroundPreset::Navy,
        BackgroundPreset::DarkRed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BackgroundPreset::Midnight => "Midnight",
            BackgroundPreset::DeepPurple => "Deep Purple",
            BackgroundPreset::DarkTeal => "Dark Teal",
            BackgroundPreset::Charcoal => "Charcoal",
            BackgroundPreset::Navy => "Navy",
            BackgroundPreset::DarkRed => "Dark Red",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().replace(['-', '_'], " ").as_str() {
            "midnight" => Some(BackgroundPreset::Midnight),
            "deep purple" | "purple" => Some(BackgroundPreset::DeepPurple),
            "dark teal" | "teal" => Some(BackgroundPreset::DarkTeal),
            "charcoal" => Some(BackgroundPreset::Charcoal),
            "navy" => Some(BackgroundPreset::Navy),
            "dark red" | "red" => Some(BackgroundPreset::DarkRed),
            _ => None,
        }
    }

    /// CSS hex colour
    pub fn hex(&self) -> &'static str {
        match self {
            BackgroundPreset::Midnight => "#0a0a1a",
            BackgroundPreset::DeepPurple => "#1a0a2e",
            BackgroundPreset::DarkTeal => "#0a1a1a",
            BackgroundPreset::Charcoal => "#1a1a1a",
            BackgroundPreset::Navy => "#0a0a2e",
            BackgroundPreset::DarkRed => "#1a0a0a",
        }
    }
}

/// Slider ranges
pub const GRAVITY_RANGE: (f32, f32) = (0.1, 2.0);
pub const BOUNCINESS_RANGE: (f32, f32) = (0.1, 2.0);
pub const FRICTION_RANGE: (f32, f32) = (0.0, 2.0);

/// User-tunable settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Physics ===
    /// Gravity multiplier
    pub gravity: f32,
    /// Restitution of balls and pegs
    pub bounciness: f32,
    pub friction: f32,

    // === Appearance ===
    pub background: BackgroundPreset,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    pub muted: bool,

    /// Seed for ball colours and spawn jitter
    pub seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gravity: 1.0,
            bounciness: 0.6,
            friction: 0.1,

            background: BackgroundPreset::Midnight,

            master_volume: 0.8,
            muted: false,

            seed: 0x5eed,
        }
    }
}

fn clamp_to((min, max): (f32, f32), value: f32) -> f32 {
    if value.is_nan() { min } else { value.clamp(min, max) }
}

impl Settings {
    pub fn set_gravity(&mut self, value: f32) {
        self.gravity = clamp_to(GRAVITY_RANGE, value);
    }

    pub fn set_bounciness(&mut self, value: f32) {
        self.bounciness = clamp_to(BOUNCINESS_RANGE, value);
    }

    pub fn set_friction(&mut self, value: f32) {
        self.friction = clamp_to(FRICTION_RANGE, value);
    }

    pub fn set_master_volume(&mut self, value: f32) {
        self.master_volume = clamp_to((0.0, 1.0), value);
    }

    /// Pull every slider back into range (for values read from JSON)
    pub fn sanitized(mut self) -> Self {
        self.set_gravity(self.gravity);
        self.set_bounciness(self.bounciness);
        self.set_friction(self.friction);
        self.set_master_volume(self.master_volume);
        self
    }

    pub fn volume(&self) -> Volume {
        Volume {
            master: self.master_volume,
            muted: self.muted,
        }
    }

    /// Board parameters for a board of the given size
    pub fn board_config(&self, width: f32, height: f32, slot_count: u32) -> BoardConfig {
        BoardConfig::new(width, height, slot_count).with_physics(
            self.gravity,
            self.bounciness,
            self.friction,
        )
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(Self::sanitized)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setters_clamp() {
        let mut settings = Settings::default();
        settings.set_gravity(5.0);
        settings.set_bounciness(0.0);
        settings.set_friction(-1.0);
        settings.set_master_volume(f32::NAN);
        assert_eq!(settings.gravity, 2.0);
        assert_eq!(settings.bounciness, 0.1);
        assert_eq!(settings.friction, 0.0);
        assert_eq!(settings.master_volume, 0.0);
    }

    #[test]
    fn test_json_fills_defaults_and_sanitizes() {
        let settings = Settings::from_json(r#"{"gravity": 9.0, "background": "Navy"}"#).unwrap();
        assert_eq!(settings.gravity, 2.0);
        assert_eq!(settings.background, BackgroundPreset::Navy);
        assert_eq!(settings.bounciness, 0.6);

        let back = Settings::from_json(&settings.to_json().unwrap()).unwrap();
        assert_eq!(back, settings);
        assert!(Settings::from_json("not json").is_err());
    }

    #[test]
    fn test_board_config_carries_physics() {
        let mut settings = Settings::default();
        settings.set_bounciness(1.5);
        let config = settings.board_config(480.0, 576.0, 4);
        assert_eq!(config.restitution, 1.5);
        assert_eq!(config.slot_count, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_background_names() {
        for preset in BackgroundPreset::ALL {
            assert_eq!(BackgroundPreset::from_name(preset.as_str()), Some(preset));
            assert!(preset.hex().starts_with('#'));
        }
        assert_eq!(BackgroundPreset::from_name("dark-teal"), Some(BackgroundPreset::DarkTeal));
        assert_eq!(BackgroundPreset::from_name("plaid"), None);
    }
}
