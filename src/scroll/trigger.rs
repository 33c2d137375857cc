use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{RegionLayout, Viewport};
use crate::error::{MotionError, Result};

/// A position along an element or the viewport, measured from its top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Offset {
    /// Fraction of the extent: `top` is 0, `center` 0.5, `bottom` 1.
    Fraction(f64),
    Pixels(f64),
}

impl Offset {
    pub fn resolve(self, extent: f64) -> f64 {
        match self {
            Self::Fraction(f) => f * extent,
            Self::Pixels(px) => px,
        }
    }

    fn parse(token: &str, input: &str) -> Result<Self> {
        let offset = match token {
            "top" | "start" => Self::Fraction(0.0),
            "center" => Self::Fraction(0.5),
            "bottom" | "end" => Self::Fraction(1.0),
            _ => {
                if let Some(pct) = token.strip_suffix('%') {
                    Self::Fraction(number(pct, input)? / 100.0)
                } else {
                    Self::Pixels(number(token.strip_suffix("px").unwrap_or(token), input)?)
                }
            }
        };
        Ok(offset)
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fraction(v) if *v == 0.0 => f.write_str("top"),
            Self::Fraction(v) if *v == 0.5 => f.write_str("center"),
            Self::Fraction(v) if *v == 1.0 => f.write_str("bottom"),
            // Percentages were divided by 100 on parse; round off the error.
            Self::Fraction(v) => write!(f, "{}%", (v * 100.0 * 1e9).round() / 1e9),
            Self::Pixels(px) => write!(f, "{px}px"),
        }
    }
}

fn number(token: &str, input: &str) -> Result<f64> {
    token
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| MotionError::trigger(input, format!("`{token}` is not a position")))
}

/// "The scroll offset at which `element` on the region meets `viewport` on
/// the screen."
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub element: Offset,
    pub viewport: Offset,
}

impl Edge {
    pub fn scroll_offset(&self, layout: RegionLayout, viewport: Viewport) -> f64 {
        layout.top + self.element.resolve(layout.height) - self.viewport.resolve(viewport.height)
    }
}

/// A region boundary rule.
///
/// Parses the same forms page authors write: `"top 20%"`, `"bottom 80%"`,
/// `"top bottom"`, `"center 50px"`, `"start start"`, and for end points only,
/// a distance past the start such as `"+=1200"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TriggerPoint {
    Edge(Edge),
    /// Pixels of scroll after the region's start point.
    Relative(f64),
}

impl TriggerPoint {
    pub fn edge(element: Offset, viewport: Offset) -> Self {
        Self::Edge(Edge { element, viewport })
    }
}

impl FromStr for TriggerPoint {
    type Err = MotionError;

    fn from_str(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if let Some(distance) = trimmed.strip_prefix("+=") {
            let px = number(distance.trim().strip_suffix("px").unwrap_or(distance.trim()), input)?;
            if px < 0.0 {
                return Err(MotionError::trigger(input, "relative distance must not be negative"));
            }
            return Ok(Self::Relative(px));
        }

        let mut tokens = trimmed.split_whitespace();
        let (Some(element), Some(viewport), None) = (tokens.next(), tokens.next(), tokens.next()) else {
            return Err(MotionError::trigger(input, "expected `<element> <viewport>`"));
        };
        Ok(Self::edge(Offset::parse(element, input)?, Offset::parse(viewport, input)?))
    }
}

impl fmt::Display for TriggerPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Edge(edge) => write!(f, "{} {}", edge.element, edge.viewport),
            Self::Relative(px) => write!(f, "+={px}"),
        }
    }
}

impl Serialize for TriggerPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TriggerPoint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_keyword_and_percentage() {
        let t: TriggerPoint = "top 20%".parse().unwrap();
        assert_eq!(t, TriggerPoint::edge(Offset::Fraction(0.0), Offset::Fraction(0.2)));
        let t: TriggerPoint = "end end".parse().unwrap();
        assert_eq!(t, TriggerPoint::edge(Offset::Fraction(1.0), Offset::Fraction(1.0)));
    }

    #[test]
    fn percentages_print_as_written() {
        for text in ["top 7%", "center 12.5%", "bottom 33%", "top 0.1%"] {
            let point: TriggerPoint = text.parse().unwrap();
            assert_eq!(point.to_string(), text);
            assert_eq!(point.to_string().parse::<TriggerPoint>().unwrap(), point);
        }
    }

    #[test]
    fn parses_pixels_and_relative() {
        let t: TriggerPoint = "center 50px".parse().unwrap();
        assert_eq!(t, TriggerPoint::edge(Offset::Fraction(0.5), Offset::Pixels(50.0)));
        assert_eq!("+=1200".parse::<TriggerPoint>().unwrap(), TriggerPoint::Relative(1200.0));
    }

    #[test]
    fn rejects_malformed_expressions() {
        for bad in ["", "top", "top 20% 4", "middle 10%", "+=-5", "top NaN"] {
            assert!(bad.parse::<TriggerPoint>().is_err(), "{bad:?} parsed");
        }
    }

    #[test]
    fn edge_resolves_against_layout() {
        let edge = Edge { element: Offset::Fraction(0.0), viewport: Offset::Fraction(0.2) };
        let layout = RegionLayout { top: 1000.0, height: 400.0 };
        let viewport = Viewport { width: 1280.0, height: 800.0 };
        assert_eq!(edge.scroll_offset(layout, viewport), 840.0);
    }

    #[test]
    fn display_round_trips_through_serde() {
        let t: TriggerPoint = serde_json::from_str("\"bottom 80%\"").unwrap();
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"bottom 80%\"");
    }
}
