use serde::{Deserialize, Serialize};

use super::trigger::{Edge, TriggerPoint};
use super::{RegionLayout, Viewport};
use crate::error::{MotionError, Result};
use crate::motion::{clamp01, Spring, SpringParams};

/// Snap distance for the lag filter.
const LAG_EPSILON: f64 = 1e-4;

/// Optional filtering between raw scroll progress and what gets rendered.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind")]
pub enum Smoothing {
    #[default]
    None,
    Spring(SpringParams),
    /// Exponential catch-up that closes ~98% of the gap in `seconds`.
    Lag { seconds: f64 },
}

#[derive(Debug, Clone)]
enum Filter {
    Direct(f64),
    Spring(Spring),
    Lag { value: f64, seconds: f64 },
}

impl Filter {
    fn new(smoothing: Smoothing) -> Self {
        match smoothing {
            Smoothing::None => Self::Direct(0.0),
            Smoothing::Spring(params) => Self::Spring(Spring::new(params, 0.0)),
            Smoothing::Lag { seconds } => Self::Lag { value: 0.0, seconds },
        }
    }

    fn step(&mut self, target: f64, dt: f64) -> f64 {
        let out = match self {
            Self::Direct(value) => {
                *value = target;
                target
            }
            Self::Spring(spring) => {
                spring.set_target(target);
                spring.step(dt)
            }
            Self::Lag { value, seconds } => {
                if *seconds <= 0.0 || (target - *value).abs() < LAG_EPSILON {
                    *value = target;
                } else {
                    let alpha = 1.0 - (-4.0 * dt.max(0.0) / *seconds).exp();
                    *value += (target - *value) * alpha;
                }
                *value
            }
        };
        clamp01(out)
    }

    fn value(&self) -> f64 {
        clamp01(match self {
            Self::Direct(value) | Self::Lag { value, .. } => *value,
            Self::Spring(spring) => spring.value(),
        })
    }
}

/// Scroll offsets at which a region's progress is 0 and 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub start: f64,
    pub end: f64,
}

impl Span {
    /// Normalised position of `scroll` within the span, clamped to `[0, 1]`.
    pub fn progress(&self, scroll: f64) -> f64 {
        if self.end <= self.start {
            return if scroll >= self.start { 1.0 } else { 0.0 };
        }
        clamp01((scroll - self.start) / (self.end - self.start))
    }

    pub fn length(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

/// One tracked page region and its (optionally smoothed) progress.
///
/// Boundaries depend on layout, so they are cached only until the next
/// [`ScrollRegion::invalidate`] and re-measured lazily on the following read.
#[derive(Debug, Clone)]
pub struct ScrollRegion {
    start: Edge,
    end: TriggerPoint,
    span: Option<Span>,
    raw: f64,
    filter: Filter,
}

impl ScrollRegion {
    pub fn new(start: TriggerPoint, end: TriggerPoint, smoothing: Smoothing) -> Result<Self> {
        let TriggerPoint::Edge(start) = start else {
            return Err(MotionError::trigger(&start.to_string(), "a region cannot start relative to itself"));
        };
        validate_smoothing(smoothing)?;
        Ok(Self { start, end, span: None, raw: 0.0, filter: Filter::new(smoothing) })
    }

    pub fn parse(start: &str, end: &str, smoothing: Smoothing) -> Result<Self> {
        Self::new(start.parse()?, end.parse()?, smoothing)
    }

    pub fn invalidate(&mut self) {
        self.span = None;
    }

    /// Replaces the end rule, e.g. when a pinned track's width changes.
    pub fn set_end(&mut self, end: TriggerPoint) {
        if self.end != end {
            self.end = end;
            self.invalidate();
        }
    }

    pub fn cached_span(&self) -> Option<Span> {
        self.span
    }

    /// Returns the cached span, measuring through `measure` if it was
    /// invalidated. `None` from `measure` leaves the cache empty so the next
    /// call retries.
    pub fn span(&mut self, measure: impl FnOnce() -> Option<(RegionLayout, Viewport)>) -> Option<Span> {
        if self.span.is_none() {
            let (layout, viewport) = measure()?;
            let start = self.start.scroll_offset(layout, viewport);
            let end = match self.end {
                TriggerPoint::Edge(edge) => edge.scroll_offset(layout, viewport),
                TriggerPoint::Relative(px) => start + px,
            };
            self.span = Some(Span { start, end });
        }
        self.span
    }

    /// Recomputes raw progress for `scroll` and advances the filter by `dt`.
    /// Returns the smoothed progress.
    pub fn update(
        &mut self,
        scroll: f64,
        dt: f64,
        measure: impl FnOnce() -> Option<(RegionLayout, Viewport)>,
    ) -> f64 {
        if let Some(span) = self.span(measure) {
            self.raw = span.progress(scroll);
        }
        self.filter.step(self.raw, dt)
    }

    pub fn raw_progress(&self) -> f64 {
        self.raw
    }

    pub fn progress(&self) -> f64 {
        self.filter.value()
    }
}

fn validate_smoothing(smoothing: Smoothing) -> Result<()> {
    match smoothing {
        Smoothing::Spring(p) if p.stiffness <= 0.0 || p.mass <= 0.0 || p.damping < 0.0 => {
            Err(MotionError::config("spring stiffness and mass must be positive"))
        }
        Smoothing::Lag { seconds } if !seconds.is_finite() || seconds < 0.0 => {
            Err(MotionError::config("lag must be a non-negative number of seconds"))
        }
        _ => Ok(()),
    }
}
