//! Engine tunables. Every field has a default matching the live site, and a
//! JSON document may override any subset of them.

use serde::{Deserialize, Serialize};

use crate::error::{MotionError, Result};
use crate::motion::SpringParams;
use crate::particles::{ParticleKind, ParticlePreset, SnowBankConfig};
use crate::reveal::{FadeUpConfig, RevealTiming};
use crate::tilt::{FocusStyle, TiltPreset};
use crate::track::TrackConfig;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Breakpoints {
    pub mobile: f64,
    pub desktop: f64,
}

impl Default for Breakpoints {
    fn default() -> Self {
        Self { mobile: 768.0, desktop: 1024.0 }
    }
}

/// Layout class of the current viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Mobile,
    Tablet,
    Desktop,
}

impl DeviceClass {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mobile => "mobile",
            Self::Tablet => "tablet",
            Self::Desktop => "desktop",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Seconds the page takes to glide to a new wheel target.
    pub smooth_duration: f64,
    pub wheel_multiplier: f64,
    /// Scroll offset past which the navigation bar condenses.
    pub nav_threshold: f64,
    /// Catch-up time of the events timeline line.
    pub timeline_lag: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self { smooth_duration: 1.5, wheel_multiplier: 1.0, nav_threshold: 20.0, timeline_lag: 1.5 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticlePresets {
    pub snow: ParticlePreset,
    pub sparkle: ParticlePreset,
    pub drift: ParticlePreset,
}

impl ParticlePresets {
    pub fn get(&self, kind: ParticleKind) -> ParticlePreset {
        match kind {
            ParticleKind::AmbientSnow => self.snow,
            ParticleKind::AccentSparkle => self.sparkle,
            ParticleKind::GroundDrift => self.drift,
        }
    }
}

impl Default for ParticlePresets {
    fn default() -> Self {
        Self {
            snow: ParticleKind::AmbientSnow.preset(),
            sparkle: ParticleKind::AccentSparkle.preset(),
            drift: ParticleKind::GroundDrift.preset(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub breakpoints: Breakpoints,
    pub scroll: ScrollConfig,
    /// Smooths hero progress so the video scale never jumps with the wheel.
    pub spring: SpringParams,
    pub text: RevealTiming,
    pub fade_up: FadeUpConfig,
    pub tilt: TiltPreset,
    pub focus: FocusStyle,
    pub track: TrackConfig,
    pub particles: ParticlePresets,
    pub snow_bank: SnowBankConfig,
    /// Seconds the "copied" acknowledgement stays visible.
    pub toast_window: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            breakpoints: Breakpoints::default(),
            scroll: ScrollConfig::default(),
            spring: SpringParams::default(),
            text: RevealTiming::default(),
            fade_up: FadeUpConfig::default(),
            tilt: TiltPreset::default(),
            focus: FocusStyle::default(),
            track: TrackConfig::default(),
            particles: ParticlePresets::default(),
            snow_bank: SnowBankConfig::default(),
            toast_window: 2.0,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|source| MotionError::Decode { what: "engine config", source })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let positive = |v: f64| v.is_finite() && v > 0.0;

        if !positive(self.breakpoints.mobile) || self.breakpoints.mobile > self.breakpoints.desktop {
            return Err(MotionError::config("breakpoints must be positive and mobile <= desktop"));
        }
        if !positive(self.scroll.smooth_duration) || !positive(self.text.duration) || !positive(self.fade_up.duration) {
            return Err(MotionError::config("durations must be positive"));
        }
        if !positive(self.tilt.enter_duration) || !positive(self.tilt.leave_duration) {
            return Err(MotionError::config("tilt durations must be positive"));
        }
        if !positive(self.spring.stiffness) || !positive(self.spring.mass) {
            return Err(MotionError::config("spring stiffness and mass must be positive"));
        }
        if !(0.0..=1.0).contains(&self.focus.opacity) {
            return Err(MotionError::config("focus opacity must lie in [0, 1]"));
        }
        for preset in [self.particles.snow, self.particles.sparkle, self.particles.drift] {
            let spreads = [preset.radius, preset.speed_x, preset.speed_y, preset.alpha];
            if !spreads.iter().all(|s| s.is_ordered()) {
                return Err(MotionError::config("particle ranges must have min <= max"));
            }
        }
        if !positive(self.snow_bank.spacing) {
            return Err(MotionError::config("snow bank spacing must be positive"));
        }
        if !positive(self.toast_window) {
            return Err(MotionError::config("toast window must be positive"));
        }
        Ok(())
    }

    pub fn is_desktop(&self, viewport_width: f64) -> bool {
        viewport_width >= self.breakpoints.desktop
    }

    pub fn is_mobile(&self, viewport_width: f64) -> bool {
        viewport_width < self.breakpoints.mobile
    }

    pub fn device_class(&self, viewport_width: f64) -> DeviceClass {
        if self.is_mobile(viewport_width) {
            DeviceClass::Mobile
        } else if self.is_desktop(viewport_width) {
            DeviceClass::Desktop
        } else {
            DeviceClass::Tablet
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        config.validate().unwrap();
        assert_eq!(config.text.duration, 0.8);
        assert_eq!(config.particles.snow.count, 200);
    }

    #[test]
    fn partial_override_keeps_defaults() {
        let config = EngineConfig::from_json(r#"{ "tilt": { "max_rotation": 8.0 }, "toast_window": 3.0 }"#).unwrap();
        assert_eq!(config.tilt.max_rotation, 8.0);
        assert_eq!(config.tilt.hover_scale, 1.04);
        assert_eq!(config.toast_window, 3.0);
        assert_eq!(config.breakpoints.desktop, 1024.0);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(EngineConfig::from_json(r#"{ "breakpoints": { "mobile": 2000.0 } }"#).is_err());
        assert!(EngineConfig::from_json(r#"{ "focus": { "opacity": 4.0 } }"#).is_err());
        assert!(EngineConfig::from_json("not json").is_err());
    }

    #[test]
    fn track_start_parses_from_text() {
        let config = EngineConfig::from_json(r#"{ "track": { "start": "top 10%" } }"#).unwrap();
        assert_eq!(config.track.start.to_string(), "top 10%");
    }

    #[test]
    fn breakpoint_helpers() {
        let config = EngineConfig::default();
        assert!(config.is_desktop(1280.0));
        assert!(!config.is_desktop(1000.0));
        assert!(config.is_mobile(375.0));
        assert_eq!(config.device_class(900.0), DeviceClass::Tablet);
        assert_eq!(config.device_class(768.0), DeviceClass::Tablet);
        assert_eq!(config.device_class(1024.0), DeviceClass::Desktop);
    }
}
