use fastrand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Spread, FRAME_RATE, MAX_TICK};
use crate::surface::{Bounds, Color, Paint, Surface};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnowBankConfig {
    /// Horizontal distance between mound slots.
    pub spacing: f64,
    /// Random offset added to each slot position.
    pub jitter: f64,
    pub half_width: f64,
    pub start_height: Spread,
    pub max_height: Spread,
    /// Height gained per 60 Hz frame.
    pub growth: Spread,
    pub alpha: f64,
}

impl Default for SnowBankConfig {
    fn default() -> Self {
        Self {
            spacing: 120.0,
            jitter: 40.0,
            half_width: 70.0,
            start_height: Spread::new(8.0, 20.0),
            max_height: Spread::new(35.0, 75.0),
            growth: Spread::new(0.01, 0.035),
            alpha: 0.25,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mound {
    pub x: f64,
    pub height: f64,
    pub max_height: f64,
    pub growth: f64,
}

/// Snow slowly piling up along the bottom edge of a band.
#[derive(Debug)]
pub struct SnowBank {
    config: SnowBankConfig,
    bounds: Bounds,
    mounds: Vec<Mound>,
    rng: Rng,
}

impl SnowBank {
    pub fn new(config: SnowBankConfig, bounds: Bounds, rng: Rng) -> Option<Self> {
        if !bounds.is_drawable() || config.spacing <= 0.0 {
            return None;
        }
        let mut bank = Self { config, bounds, mounds: Vec::new(), rng };
        bank.lay_out();
        Some(bank)
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn mounds(&self) -> &[Mound] {
        &self.mounds
    }

    /// Re-lays the slots for a new width. Existing mounds keep their height;
    /// slots that no longer fit are dropped and new ones start fresh.
    pub fn resize(&mut self, bounds: Bounds) {
        if !bounds.is_drawable() || bounds == self.bounds {
            return;
        }
        self.bounds = bounds;
        self.lay_out();
    }

    pub fn tick(&mut self, dt: f64) {
        let frames = dt.clamp(0.0, MAX_TICK) * FRAME_RATE;
        for m in &mut self.mounds {
            m.height = (m.height + m.growth * frames).min(m.max_height);
        }
    }

    pub fn render(&self, surface: &mut dyn Surface) {
        surface.clear();
        let paint = Paint { color: Color::WHITE, alpha: self.config.alpha, glow: 0.0 };
        for m in &self.mounds {
            surface.fill_mound(m.x, self.config.half_width, m.height, &paint);
        }
    }

    fn lay_out(&mut self) {
        let slots = (self.bounds.width / self.config.spacing).floor() as usize;
        self.mounds.truncate(slots);
        let Self { config, mounds, rng, .. } = &mut *self;
        for i in mounds.len()..slots {
            let start = config.start_height.sample(rng);
            mounds.push(Mound {
                x: i as f64 * config.spacing + rng.f64() * config.jitter,
                height: start,
                max_height: config.max_height.sample(rng).max(start),
                growth: config.growth.sample(rng),
            });
        }
        debug!(slots, width = self.bounds.width, "snow bank laid out");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_mound_per_slot() {
        let bank = SnowBank::new(SnowBankConfig::default(), Bounds::new(1280.0, 180.0), Rng::with_seed(2)).unwrap();
        assert_eq!(bank.mounds().len(), 10);
    }

    #[test]
    fn mounds_grow_then_stop() {
        let mut bank = SnowBank::new(SnowBankConfig::default(), Bounds::new(600.0, 180.0), Rng::with_seed(4)).unwrap();
        for _ in 0..100_000 {
            bank.tick(1.0 / 60.0);
        }
        assert!(bank.mounds().iter().all(|m| m.height == m.max_height));
    }

    #[test]
    fn resize_keeps_surviving_heights() {
        let mut bank = SnowBank::new(SnowBankConfig::default(), Bounds::new(1200.0, 180.0), Rng::with_seed(5)).unwrap();
        bank.tick(0.2);
        let first = bank.mounds()[0];
        bank.resize(Bounds::new(360.0, 180.0));
        assert_eq!(bank.mounds().len(), 3);
        assert_eq!(bank.mounds()[0], first);
        bank.resize(Bounds::new(1440.0, 180.0));
        assert_eq!(bank.mounds().len(), 12);
    }
}
