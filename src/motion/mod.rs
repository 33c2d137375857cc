//! Shared animation primitives: clamped interpolation, easing curves, tweens,
//! springs and the rest/active transition machine used by every interactive
//! component.

mod easing;
mod spring;
mod tween;

pub use easing::Easing;
pub use spring::{Spring, SpringParams};
pub use tween::{Animated, Tween};

pub fn clamp01(v: f64) -> f64 {
    if v.is_nan() {
        return 0.0;
    }
    v.clamp(0.0, 1.0)
}

pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    if t >= 1.0 {
        return to;
    }
    from + (to - from) * t
}

/// Maps `value` from `input` onto `output`, clamping at both edges.
pub fn map_range(value: f64, input: (f64, f64), output: (f64, f64)) -> f64 {
    let (a, b) = input;
    if a == b {
        return if value < a { output.0 } else { output.1 };
    }
    if value == a {
        return output.0;
    }
    if value == b {
        return output.1;
    }
    lerp(output.0, output.1, clamp01((value - a) / (b - a)))
}

/// Piecewise-linear mapping through ascending input stops.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyframes {
    stops: Vec<(f64, f64)>,
}

impl Keyframes {
    /// Builds a mapping from `(input, output)` pairs.
    ///
    /// Returns `None` when fewer than two stops are given or the inputs are
    /// not ascending.
    pub fn new(stops: impl Into<Vec<(f64, f64)>>) -> Option<Self> {
        let stops = stops.into();
        let ascending = stops.windows(2).all(|w| w[0].0 <= w[1].0);
        (stops.len() >= 2 && ascending).then_some(Self { stops })
    }

    pub fn sample(&self, value: f64) -> f64 {
        let first = self.stops[0];
        if value <= first.0 {
            return first.1;
        }
        for pair in self.stops.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            if value <= hi.0 {
                return map_range(value, (lo.0, hi.0), (lo.1, hi.1));
            }
        }
        self.stops[self.stops.len() - 1].1
    }
}

/// Lifecycle shared by text reveals, card tilts and pinned tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Rest,
    TransitioningIn,
    Active,
    TransitioningOut,
}

/// Tracks which [`Phase`] a component is in from its activation history.
///
/// A freshly mounted machine is at rest; every later change is animated for
/// `duration` seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseMachine {
    active: bool,
    changed_at: Option<f64>,
    duration: f64,
}

impl PhaseMachine {
    pub fn new(duration: f64) -> Self {
        Self { active: false, changed_at: None, duration }
    }

    /// Records the new input; returns `false` when nothing changed.
    pub fn set_active(&mut self, active: bool, now: f64) -> bool {
        if self.active == active {
            return false;
        }
        self.active = active;
        self.changed_at = Some(now);
        true
    }

    pub fn set_duration(&mut self, duration: f64) {
        self.duration = duration;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn phase(&self, now: f64) -> Phase {
        let settled = self.changed_at.map_or(true, |at| now >= at + self.duration);
        match (self.active, settled) {
            (true, true) => Phase::Active,
            (true, false) => Phase::TransitioningIn,
            (false, true) => Phase::Rest,
            (false, false) => Phase::TransitioningOut,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_range_clamps_outside_domain() {
        assert_eq!(map_range(-1.0, (0.0, 0.8), (1.0, 2.5)), 1.0);
        assert_eq!(map_range(0.4, (0.0, 0.8), (1.0, 2.5)), 1.75);
        assert_eq!(map_range(3.0, (0.0, 0.8), (1.0, 2.5)), 2.5);
    }

    #[test]
    fn keyframes_hold_edges() {
        let k = Keyframes::new([(0.4, 0.0), (0.8, 0.8)]).unwrap();
        assert_eq!(k.sample(0.0), 0.0);
        assert!((k.sample(0.6) - 0.4).abs() < 1e-12);
        assert_eq!(k.sample(1.0), 0.8);
    }

    #[test]
    fn keyframes_reject_descending_stops() {
        assert!(Keyframes::new([(1.0, 0.0), (0.0, 1.0)]).is_none());
        assert!(Keyframes::new([(1.0, 0.0)]).is_none());
    }

    #[test]
    fn phase_machine_walks_through_states() {
        let mut m = PhaseMachine::new(0.5);
        assert_eq!(m.phase(0.0), Phase::Rest);
        assert!(m.set_active(true, 1.0));
        assert_eq!(m.phase(1.2), Phase::TransitioningIn);
        assert_eq!(m.phase(1.5), Phase::Active);
        assert!(!m.set_active(true, 2.0));
        m.set_active(false, 2.0);
        assert_eq!(m.phase(2.1), Phase::TransitioningOut);
        assert_eq!(m.phase(3.0), Phase::Rest);
    }
}
