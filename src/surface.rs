//! Drawing abstraction the particle layers render through. The browser build
//! backs it with a 2D canvas context; tests record the calls.

use serde::{Deserialize, Serialize};

/// Pixel dimensions of a drawing surface or simulation area.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Zero-area or non-finite bounds mean there is nothing to draw on.
    pub fn is_drawable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Fully saturated colour at half lightness, `hsl(hue, 100%, 50%)`.
    pub fn from_hue(hue: f64) -> Self {
        let h = hue.rem_euclid(360.0) / 60.0;
        let x = 1.0 - (h % 2.0 - 1.0).abs();
        let (r, g, b) = match h as u32 {
            0 => (1.0, x, 0.0),
            1 => (x, 1.0, 0.0),
            2 => (0.0, 1.0, x),
            3 => (0.0, x, 1.0),
            4 => (x, 0.0, 1.0),
            _ => (1.0, 0.0, x),
        };
        let channel = |c: f64| (c * 255.0).round() as u8;
        Self::rgb(channel(r), channel(g), channel(b))
    }

    pub fn css(&self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// How one shape is filled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    pub color: Color,
    pub alpha: f64,
    /// Shadow blur radius; zero disables the glow.
    pub glow: f64,
}

pub trait Surface {
    fn bounds(&self) -> Bounds;

    fn clear(&mut self);

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, paint: &Paint);

    /// A mound rising from the bottom edge, traced by [`MoundPath`].
    fn fill_mound(&mut self, center_x: f64, half_width: f64, height: f64, paint: &Paint);
}

/// Quadratic curve outlining a mound: from `center_x - half_width` on the
/// floor to `center_x + half_width`, with its control point `height` above
/// the floor. The visible crest is half as tall as the control point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoundPath {
    pub start: (f64, f64),
    pub control: (f64, f64),
    pub end: (f64, f64),
}

impl MoundPath {
    pub fn new(center_x: f64, half_width: f64, height: f64, floor: f64) -> Self {
        Self {
            start: (center_x - half_width, floor),
            control: (center_x, floor - height),
            end: (center_x + half_width, floor),
        }
    }

    /// Height of the curve's crest above the floor.
    pub fn crest(&self) -> f64 {
        (self.start.1 - self.control.1) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hue_wheel_primaries() {
        assert_eq!(Color::from_hue(0.0), Color::rgb(255, 0, 0));
        assert_eq!(Color::from_hue(120.0), Color::rgb(0, 255, 0));
        assert_eq!(Color::from_hue(240.0), Color::rgb(0, 0, 255));
        assert_eq!(Color::from_hue(360.0), Color::rgb(255, 0, 0));
    }

    #[test]
    fn mound_control_point_sits_height_above_floor() {
        let path = MoundPath::new(300.0, 70.0, 40.0, 160.0);
        assert_eq!(path.start, (230.0, 160.0));
        assert_eq!(path.control, (300.0, 120.0));
        assert_eq!(path.end, (370.0, 160.0));
        assert_eq!(path.crest(), 20.0);
    }

    #[test]
    fn degenerate_bounds_are_not_drawable() {
        assert!(!Bounds::new(0.0, 100.0).is_drawable());
        assert!(!Bounds::new(f64::NAN, 100.0).is_drawable());
        assert!(Bounds::new(1.0, 1.0).is_drawable());
    }
}
