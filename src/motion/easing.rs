use serde::{Deserialize, Serialize};

use super::clamp01;

/// Timing curves used by every transition in the engine.
///
/// The `PowerNOut` names follow the animation-library convention where
/// `power2` is a cubic curve, `power3` quartic and `power4` quintic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind")]
pub enum Easing {
    Linear,
    Power2Out,
    Power3Out,
    Power4Out,
    /// `min(1, 1.001 - 2^(-10t))`, the smooth-scroll curve.
    ExpoOut,
    CubicBezier { x1: f64, y1: f64, x2: f64, y2: f64 },
}

impl Easing {
    /// `cubic-bezier(0.6, 0.01, 0.05, 0.95)`, shared by all kinetic text.
    pub const PREMIUM: Self = Self::CubicBezier { x1: 0.6, y1: 0.01, x2: 0.05, y2: 0.95 };

    /// Maps linear time `t` to eased progress. Input is clamped to `[0, 1]`
    /// and both endpoints are exact.
    pub fn apply(self, t: f64) -> f64 {
        let t = clamp01(t);
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        match self {
            Self::Linear => t,
            Self::Power2Out => 1.0 - (1.0 - t).powi(3),
            Self::Power3Out => 1.0 - (1.0 - t).powi(4),
            Self::Power4Out => 1.0 - (1.0 - t).powi(5),
            Self::ExpoOut => (1.001 - 2f64.powf(-10.0 * t)).min(1.0),
            Self::CubicBezier { x1, y1, x2, y2 } => {
                let s = solve_bezier_x(t, x1, x2);
                bezier(s, y1, y2)
            }
        }
    }
}

fn bezier(s: f64, p1: f64, p2: f64) -> f64 {
    let u = 1.0 - s;
    3.0 * u * u * s * p1 + 3.0 * u * s * s * p2 + s * s * s
}

fn bezier_slope(s: f64, p1: f64, p2: f64) -> f64 {
    let u = 1.0 - s;
    3.0 * u * u * p1 + 6.0 * u * s * (p2 - p1) + 3.0 * s * s * (1.0 - p2)
}

/// Finds the curve parameter whose x coordinate equals `x`.
/// Newton first, bisection when the slope flattens out.
fn solve_bezier_x(x: f64, x1: f64, x2: f64) -> f64 {
    const EPSILON: f64 = 1e-7;

    let mut s = x;
    for _ in 0..8 {
        let err = bezier(s, x1, x2) - x;
        if err.abs() < EPSILON {
            return s;
        }
        let slope = bezier_slope(s, x1, x2);
        if slope.abs() < 1e-6 {
            break;
        }
        s -= err / slope;
    }

    let (mut lo, mut hi) = (0.0, 1.0);
    s = x;
    for _ in 0..64 {
        let value = bezier(s, x1, x2);
        if (value - x).abs() < EPSILON {
            break;
        }
        if value < x {
            lo = s;
        } else {
            hi = s;
        }
        s = (lo + hi) * 0.5;
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 6] = [
        Easing::Linear,
        Easing::Power2Out,
        Easing::Power3Out,
        Easing::Power4Out,
        Easing::ExpoOut,
        Easing::PREMIUM,
    ];

    #[test]
    fn endpoints_are_exact() {
        for easing in ALL {
            assert_eq!(easing.apply(0.0), 0.0, "{easing:?}");
            assert_eq!(easing.apply(1.0), 1.0, "{easing:?}");
            assert_eq!(easing.apply(-3.0), 0.0, "{easing:?}");
            assert_eq!(easing.apply(7.0), 1.0, "{easing:?}");
        }
    }

    #[test]
    fn curves_are_monotonic() {
        for easing in ALL {
            let mut prev = 0.0;
            for i in 1..=200 {
                let v = easing.apply(f64::from(i) / 200.0);
                assert!(v + 1e-9 >= prev, "{easing:?} dipped at step {i}");
                prev = v;
            }
        }
    }

    #[test]
    fn linear_bezier_is_identity() {
        let linear = Easing::CubicBezier { x1: 0.25, y1: 0.25, x2: 0.75, y2: 0.75 };
        for i in 0..=10 {
            let t = f64::from(i) / 10.0;
            assert!((linear.apply(t) - t).abs() < 1e-6);
        }
    }

    #[test]
    fn premium_curve_is_slow_then_fast_then_slow() {
        let e = Easing::PREMIUM;
        assert!(e.apply(0.2) < 0.2);
        assert!(e.apply(0.8) > 0.8);
    }
}
