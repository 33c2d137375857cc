//! Scroll progress mapping.
//!
//! A [`ScrollRegion`] turns the page scroll offset into a clamped `[0, 1]`
//! progress for one section, optionally smoothed. [`ScrollMapper`] holds any
//! number of independent regions by name and measures them through a
//! [`LayoutProbe`].

mod region;
mod smooth;
mod trigger;

pub use region::{ScrollRegion, Smoothing, Span};
pub use smooth::SmoothScroll;
pub use trigger::{Edge, Offset, TriggerPoint};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

/// A section's document-space position.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RegionLayout {
    /// Distance from the document top, independent of the current scroll.
    pub top: f64,
    pub height: f64,
}

/// Source of layout measurements, keyed by section name.
pub trait LayoutProbe {
    fn viewport(&self) -> Viewport;

    /// Current layout of the named section, or `None` if it is not mounted
    /// or has not been laid out yet.
    fn layout(&self, section: &str) -> Option<RegionLayout>;

    /// Full scroll width of a horizontally overflowing track, 0 if unknown.
    fn track_width(&self, section: &str) -> f64 {
        let _ = section;
        0.0
    }

    /// Client size of the element hosting a drawing surface.
    fn container_size(&self, section: &str) -> Option<crate::surface::Bounds> {
        let _ = section;
        None
    }
}

/// Fraction of the section currently inside the viewport.
pub fn visible_fraction(layout: RegionLayout, scroll: f64, viewport: Viewport) -> f64 {
    if layout.height <= 0.0 {
        return 0.0;
    }
    let top = layout.top.max(scroll);
    let bottom = (layout.top + layout.height).min(scroll + viewport.height);
    ((bottom - top) / layout.height).clamp(0.0, 1.0)
}

/// Independent scroll regions addressed by section name.
#[derive(Debug, Default)]
pub struct ScrollMapper {
    regions: Vec<(String, ScrollRegion)>,
}

impl ScrollMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracks `region` under `section`, replacing any previous region there.
    pub fn insert(&mut self, section: impl Into<String>, region: ScrollRegion) {
        let section = section.into();
        match self.regions.iter_mut().find(|(name, _)| *name == section) {
            Some((_, slot)) => *slot = region,
            None => self.regions.push((section, region)),
        }
    }

    pub fn remove(&mut self, section: &str) -> Option<ScrollRegion> {
        let index = self.regions.iter().position(|(name, _)| name == section)?;
        Some(self.regions.remove(index).1)
    }

    pub fn get(&self, section: &str) -> Option<&ScrollRegion> {
        self.regions.iter().find(|(name, _)| name == section).map(|(_, r)| r)
    }

    pub fn progress(&self, section: &str) -> Option<f64> {
        self.get(section).map(ScrollRegion::progress)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Drops every cached boundary; they are re-measured on the next update.
    pub fn invalidate_all(&mut self) {
        for (_, region) in &mut self.regions {
            region.invalidate();
        }
    }

    pub fn update(&mut self, scroll: f64, dt: f64, probe: &dyn LayoutProbe) {
        let viewport = probe.viewport();
        for (name, region) in &mut self.regions {
            region.update(scroll, dt, || probe.layout(name.as_str()).map(|layout| (layout, viewport)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visible_fraction_counts_overlap() {
        let layout = RegionLayout { top: 1000.0, height: 200.0 };
        let viewport = Viewport { width: 800.0, height: 600.0 };
        assert_eq!(visible_fraction(layout, 0.0, viewport), 0.0);
        assert_eq!(visible_fraction(layout, 500.0, viewport), 0.5);
        assert_eq!(visible_fraction(layout, 1000.0, viewport), 1.0);
        assert_eq!(visible_fraction(layout, 5000.0, viewport), 0.0);
    }

    #[test]
    fn insert_replaces_same_section() {
        let mut mapper = ScrollMapper::new();
        mapper.insert("hero", ScrollRegion::parse("top top", "bottom bottom", Smoothing::None).unwrap());
        mapper.insert("hero", ScrollRegion::parse("top top", "+=10", Smoothing::None).unwrap());
        assert_eq!(mapper.len(), 1);
        assert!(mapper.remove("hero").is_some());
        assert!(mapper.is_empty());
    }
}
