//! Frame-stepped particle overlays (snowfall, sparkles, ground drift) and the
//! accumulating snow bank along the bottom of the roster section.
//!
//! Particle counts never change after initialisation: a particle that leaves
//! the visible area is respawned in place at its kind's entry edge.

mod bank;

pub use bank::{Mound, SnowBank, SnowBankConfig};

use fastrand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::motion::clamp01;
use crate::surface::{Bounds, Color, Paint, Surface};

/// Velocities are expressed per 60 Hz frame; `tick` rescales by real time.
const FRAME_RATE: f64 = 60.0;
/// Longest step a single tick may take, so a backgrounded tab does not
/// teleport every particle on resume.
const MAX_TICK: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParticleKind {
    AmbientSnow,
    AccentSparkle,
    GroundDrift,
}

/// Closed interval particles sample their properties from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spread {
    pub min: f64,
    pub max: f64,
}

impl Spread {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn sample(&self, rng: &mut Rng) -> f64 {
        self.min + rng.f64() * (self.max - self.min)
    }

    pub fn is_ordered(&self) -> bool {
        self.min <= self.max
    }
}

/// Edge particles enter from; they are recycled once past the opposite edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Entry {
    Above,
    Below,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tint {
    Fixed(Color),
    RandomHue,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticlePreset {
    pub count: usize,
    pub radius: Spread,
    pub speed_x: Spread,
    pub speed_y: Spread,
    pub alpha: Spread,
    pub glow: f64,
    pub tint: Tint,
    pub entry: Entry,
}

impl ParticleKind {
    pub fn preset(self) -> ParticlePreset {
        match self {
            Self::AmbientSnow => ParticlePreset {
                count: 200,
                radius: Spread::new(1.0, 3.0),
                speed_x: Spread::new(-0.25, 0.25),
                speed_y: Spread::new(0.2, 0.8),
                alpha: Spread::new(0.3, 0.8),
                glow: 5.0,
                tint: Tint::Fixed(Color::WHITE),
                entry: Entry::Above,
            },
            Self::AccentSparkle => ParticlePreset {
                count: 50,
                radius: Spread::new(1.0, 5.0),
                speed_x: Spread::new(-2.0, 2.0),
                speed_y: Spread::new(-7.0, -2.0),
                alpha: Spread::new(1.0, 1.0),
                glow: 0.0,
                tint: Tint::RandomHue,
                entry: Entry::Below,
            },
            Self::GroundDrift => ParticlePreset {
                count: 60,
                radius: Spread::new(0.5, 2.0),
                speed_x: Spread::new(-0.8, 0.8),
                speed_y: Spread::new(0.05, 0.25),
                alpha: Spread::new(0.15, 0.45),
                glow: 3.0,
                tint: Tint::Fixed(Color::WHITE),
                entry: Entry::Above,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub speed_x: f64,
    pub speed_y: f64,
    pub radius: f64,
    pub alpha: f64,
    pub color: Color,
}

/// One overlay's worth of particles, owned by the component that draws it.
#[derive(Debug)]
pub struct ParticleField {
    kind: ParticleKind,
    preset: ParticlePreset,
    bounds: Bounds,
    particles: Vec<Particle>,
    rng: Rng,
}

impl ParticleField {
    /// Seeds `preset.count` particles inside `bounds`.
    ///
    /// Returns `None`, and the overlay simply never runs, when there is no
    /// drawable surface to simulate over.
    pub fn initialize(kind: ParticleKind, preset: ParticlePreset, bounds: Bounds, mut rng: Rng) -> Option<Self> {
        if !bounds.is_drawable() {
            warn!(?kind, ?bounds, "particle surface unavailable, overlay disabled");
            return None;
        }
        let particles = (0..preset.count).map(|_| spawn(&mut rng, &preset, bounds, true)).collect();
        debug!(?kind, count = preset.count, "particle field initialised");
        Some(Self { kind, preset, bounds, particles, rng })
    }

    pub fn kind(&self) -> ParticleKind {
        self.kind
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Moves every particle by its velocity, recycling any that left the area.
    pub fn tick(&mut self, dt: f64) {
        let frames = dt.clamp(0.0, MAX_TICK) * FRAME_RATE;
        let Self { preset, bounds, particles, rng, .. } = &mut *self;
        for p in particles.iter_mut() {
            p.x += p.speed_x * frames;
            p.y += p.speed_y * frames;
            if has_exited(p, preset.entry, *bounds) {
                *p = spawn(rng, preset, *bounds, false);
            }
        }
    }

    /// Adopts new surface dimensions. Particle state is kept as is.
    pub fn resize(&mut self, bounds: Bounds) {
        if !bounds.is_drawable() || bounds == self.bounds {
            return;
        }
        debug!(kind = ?self.kind, ?bounds, "particle surface resized");
        self.bounds = bounds;
    }

    pub fn render(&self, surface: &mut dyn Surface) {
        surface.clear();
        for p in &self.particles {
            let paint = Paint { color: p.color, alpha: p.alpha, glow: self.preset.glow };
            surface.fill_circle(p.x, p.y, p.radius, &paint);
        }
    }
}

fn spawn(rng: &mut Rng, preset: &ParticlePreset, bounds: Bounds, initial: bool) -> Particle {
    let radius = preset.radius.sample(rng).max(0.0);
    let y = match preset.entry {
        // The very first batch is scattered over one screen height above the
        // top edge so the overlay fills in gradually instead of as a sheet.
        Entry::Above if initial => -rng.f64() * bounds.height,
        Entry::Above => -radius - rng.f64() * bounds.height * 0.1,
        Entry::Below => bounds.height + radius,
    };
    let color = match preset.tint {
        Tint::Fixed(color) => color,
        Tint::RandomHue => Color::from_hue(rng.f64() * 360.0),
    };
    Particle {
        x: rng.f64() * bounds.width,
        y,
        speed_x: preset.speed_x.sample(rng),
        speed_y: preset.speed_y.sample(rng),
        radius,
        alpha: clamp01(preset.alpha.sample(rng)),
        color,
    }
}

fn has_exited(p: &Particle, entry: Entry, bounds: Bounds) -> bool {
    let sideways = p.x + p.radius < 0.0 || p.x - p.radius > bounds.width;
    let past_far_edge = match entry {
        Entry::Above => p.y - p.radius > bounds.height,
        Entry::Below => p.y + p.radius < 0.0,
    };
    sideways || past_far_edge
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(kind: ParticleKind) -> ParticleField {
        ParticleField::initialize(kind, kind.preset(), Bounds::new(800.0, 600.0), Rng::with_seed(7)).unwrap()
    }

    #[test]
    fn missing_surface_is_a_no_op() {
        let kind = ParticleKind::AmbientSnow;
        assert!(ParticleField::initialize(kind, kind.preset(), Bounds::new(0.0, 0.0), Rng::with_seed(1)).is_none());
    }

    #[test]
    fn snow_starts_above_the_viewport() {
        let f = field(ParticleKind::AmbientSnow);
        assert_eq!(f.len(), 200);
        assert!(f.particles().iter().all(|p| p.y <= 0.0));
    }

    #[test]
    fn sparkles_start_at_the_bottom_edge() {
        let f = field(ParticleKind::AccentSparkle);
        assert_eq!(f.len(), 50);
        assert!(f.particles().iter().all(|p| p.y >= 600.0));
    }

    #[test]
    fn fallen_snow_is_recycled_above() {
        let mut f = field(ParticleKind::AmbientSnow);
        f.particles[0].y = 650.0;
        f.particles[0].speed_x = 0.0;
        f.tick(1.0 / 60.0);
        assert!(f.particles()[0].y < 0.0);
        assert_eq!(f.len(), 200);
    }

    #[test]
    fn risen_sparkle_is_recycled_below() {
        let mut f = field(ParticleKind::AccentSparkle);
        f.particles[3].y = -20.0;
        f.particles[3].x = 400.0;
        f.tick(0.0);
        assert!(f.particles()[3].y >= 600.0);
    }

    #[test]
    fn resize_keeps_particles() {
        let mut f = field(ParticleKind::GroundDrift);
        let before = f.particles().to_vec();
        f.resize(Bounds::new(1024.0, 180.0));
        assert_eq!(f.bounds(), Bounds::new(1024.0, 180.0));
        assert_eq!(f.particles(), before.as_slice());
        f.resize(Bounds::new(0.0, 0.0));
        assert_eq!(f.bounds(), Bounds::new(1024.0, 180.0));
    }

    #[test]
    fn alpha_stays_in_unit_range() {
        let mut preset = ParticleKind::AmbientSnow.preset();
        preset.alpha = Spread::new(0.5, 3.0);
        let f = ParticleField::initialize(ParticleKind::AmbientSnow, preset, Bounds::new(100.0, 100.0), Rng::with_seed(3))
            .unwrap();
        assert!(f.particles().iter().all(|p| (0.0..=1.0).contains(&p.alpha)));
    }
}
