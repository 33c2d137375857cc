use serde::{Deserialize, Serialize};

/// Parameters of a damped spring filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringParams {
    pub stiffness: f64,
    pub damping: f64,
    pub mass: f64,
    /// Below this distance and speed the spring snaps onto its target.
    pub rest_epsilon: f64,
}

impl SpringParams {
    /// Damping chosen so the spring settles without overshoot.
    pub fn critically_damped(stiffness: f64, mass: f64) -> Self {
        Self { stiffness, damping: 2.0 * (stiffness * mass).sqrt(), mass, rest_epsilon: 1e-4 }
    }
}

impl Default for SpringParams {
    fn default() -> Self {
        Self::critically_damped(120.0, 1.0)
    }
}

/// A one-dimensional spring that chases a target value frame by frame.
#[derive(Debug, Clone)]
pub struct Spring {
    params: SpringParams,
    value: f64,
    velocity: f64,
    target: f64,
}

impl Spring {
    /// Largest integration step; longer frames are subdivided.
    const MAX_STEP: f64 = 1.0 / 120.0;

    pub fn new(params: SpringParams, initial: f64) -> Self {
        Self { params, value: initial, velocity: 0.0, target: initial }
    }

    pub fn set_target(&mut self, target: f64) {
        self.target = target;
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn is_resting(&self) -> bool {
        self.value == self.target && self.velocity == 0.0
    }

    /// Jumps straight to `value` with no residual motion.
    pub fn snap_to(&mut self, value: f64) {
        self.value = value;
        self.target = value;
        self.velocity = 0.0;
    }

    /// Advances the filter by `dt` seconds and returns the new value.
    pub fn step(&mut self, dt: f64) -> f64 {
        if self.is_resting() || dt <= 0.0 {
            return self.value;
        }

        let SpringParams { stiffness, damping, mass, rest_epsilon } = self.params;
        let mut remaining = dt;
        while remaining > 0.0 {
            let h = remaining.min(Self::MAX_STEP);
            let force = -stiffness * (self.value - self.target) - damping * self.velocity;
            self.velocity += force / mass * h;
            self.value += self.velocity * h;
            remaining -= h;
        }

        if (self.value - self.target).abs() < rest_epsilon && self.velocity.abs() < rest_epsilon {
            self.snap_to(self.target);
        }
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settles_exactly_on_target() {
        let mut spring = Spring::new(SpringParams::default(), 0.0);
        spring.set_target(1.0);
        for _ in 0..600 {
            spring.step(1.0 / 60.0);
        }
        assert!(spring.is_resting());
        assert_eq!(spring.value(), 1.0);
    }

    #[test]
    fn critically_damped_does_not_overshoot() {
        let mut spring = Spring::new(SpringParams::critically_damped(200.0, 1.0), 0.0);
        spring.set_target(1.0);
        for _ in 0..300 {
            let v = spring.step(1.0 / 60.0);
            assert!(v <= 1.0 + 1e-6, "overshot to {v}");
        }
    }

    #[test]
    fn resting_spring_is_inert() {
        let mut spring = Spring::new(SpringParams::default(), 0.25);
        assert!(spring.is_resting());
        assert_eq!(spring.step(1.0), 0.25);
    }

    #[test]
    fn long_frames_are_stable() {
        let mut spring = Spring::new(SpringParams::critically_damped(400.0, 1.0), 0.0);
        spring.set_target(10.0);
        let v = spring.step(0.5);
        assert!(v.is_finite() && v <= 10.0 + 1e-6);
    }
}
