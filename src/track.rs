//! Pinned horizontal tracks: while a section is pinned, vertical scroll
//! through it slides a wide row of cards sideways.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::motion::lerp;
use crate::scroll::{LayoutProbe, ScrollRegion, Smoothing, TriggerPoint, Viewport};

/// Where the track sits at progress 0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InitialOffset {
    #[default]
    Zero,
    /// Just off the right edge of the screen.
    ViewportWidth,
    Pixels(f64),
}

impl InitialOffset {
    pub fn resolve(self, viewport: Viewport) -> f64 {
        match self {
            Self::Zero => 0.0,
            Self::ViewportWidth => viewport.width,
            Self::Pixels(px) => px,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    /// When the section pins, e.g. `"top 20%"`. The pinned distance always
    /// equals the measured track width.
    pub start: TriggerPoint,
    /// Below this viewport width the track is laid out as a normal column.
    pub min_viewport_width: f64,
    pub initial_offset: InitialOffset,
    pub smoothing: Smoothing,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            start: TriggerPoint::edge(crate::scroll::Offset::Fraction(0.0), crate::scroll::Offset::Fraction(0.2)),
            min_viewport_width: 1024.0,
            initial_offset: InitialOffset::ViewportWidth,
            smoothing: Smoothing::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinState {
    Before,
    Pinned,
    After,
}

/// What the renderer should do with the track this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackFrame {
    /// Narrow viewport: no pinning, no transform, normal vertical flow.
    Flow,
    /// Track not measured yet; leave it untransformed and retry next frame.
    Pending,
    Pinned {
        translate_x: f64,
        progress: f64,
        pin: PinState,
        /// Fixed distance from the viewport top while pinned.
        pin_top: f64,
        /// Scroll distance consumed by the pin; the section needs this much
        /// extra height.
        scroll_length: f64,
    },
}

/// Layout key of the element wrapping the pinned part of `section`.
///
/// The wrapper stays in normal flow while its child is fixed, so its top is
/// where the pinned content sits before pinning.
pub fn stage_key(section: &str) -> String {
    format!("{section}-stage")
}

#[derive(Debug, Clone)]
pub struct PinnedTrack {
    config: TrackConfig,
    region: ScrollRegion,
    width: Option<f64>,
    enabled: Option<bool>,
}

impl PinnedTrack {
    pub fn new(config: TrackConfig) -> Result<Self> {
        let region = ScrollRegion::new(config.start, TriggerPoint::Relative(0.0), config.smoothing)?;
        Ok(Self { config, region, width: None, enabled: None })
    }

    /// Forgets every layout measurement. Call when the track's content
    /// changes size.
    pub fn invalidate(&mut self) {
        self.width = None;
        self.region.invalidate();
    }

    /// Re-evaluates the breakpoint and drops cached measurements.
    pub fn on_resize(&mut self, viewport: Viewport) {
        let enabled = viewport.width >= self.config.min_viewport_width;
        if self.enabled != Some(enabled) {
            debug!(enabled, width = viewport.width, "pinned track breakpoint crossed");
        }
        self.enabled = Some(enabled);
        self.invalidate();
    }

    pub fn is_enabled(&self) -> Option<bool> {
        self.enabled
    }

    pub fn measured_width(&self) -> Option<f64> {
        self.width
    }

    /// Horizontal translation for `progress`, moving linearly from the
    /// initial offset to `-width`.
    pub fn translation(&self, progress: f64, width: f64, viewport: Viewport) -> f64 {
        lerp(self.config.initial_offset.resolve(viewport), -width, progress)
    }

    pub fn update(&mut self, scroll: f64, dt: f64, section: &str, probe: &dyn LayoutProbe) -> TrackFrame {
        let viewport = probe.viewport();
        if self.enabled.is_none() {
            self.on_resize(viewport);
        }
        if self.enabled != Some(true) {
            return TrackFrame::Flow;
        }

        let width = match self.width {
            Some(width) => width,
            None => {
                let measured = probe.track_width(section);
                if !(measured.is_finite() && measured > 0.0) {
                    debug!(section, "track width not measurable yet");
                    return TrackFrame::Pending;
                }
                self.width = Some(measured);
                self.region.set_end(TriggerPoint::Relative(measured));
                measured
            }
        };

        let progress =
            self.region.update(scroll, dt, || probe.layout(&stage_key(section)).map(|layout| (layout, viewport)));
        let Some(span) = self.region.cached_span() else {
            return TrackFrame::Pending;
        };

        let pin = if scroll < span.start {
            PinState::Before
        } else if scroll > span.end {
            PinState::After
        } else {
            PinState::Pinned
        };
        let pin_top = match self.config.start {
            TriggerPoint::Edge(edge) => edge.viewport.resolve(viewport.height),
            TriggerPoint::Relative(_) => 0.0,
        };

        TrackFrame::Pinned {
            translate_x: self.translation(progress, width, viewport),
            progress,
            pin,
            pin_top,
            scroll_length: span.length(),
        }
    }
}
