//! Text and card reveals.
//!
//! [`KineticText`] is the slot-machine hover effect: every character is drawn
//! twice, and on activation one copy slides out while the other slides in.
//! Even and odd characters move in opposite directions. [`FadeUp`] is the
//! in-view entrance used by cards and headings.

use serde::{Deserialize, Serialize};

use crate::motion::{Animated, Easing, Phase, PhaseMachine};

/// Offsets are percentages of the character cell height.
const CELL: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealTiming {
    pub duration: f64,
    pub easing: Easing,
}

impl Default for RevealTiming {
    fn default() -> Self {
        Self { duration: 0.8, easing: Easing::PREMIUM }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RevealMode {
    #[default]
    Reversible,
    /// The first activation is permanent; later deactivations are ignored.
    Once,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    Even,
    Odd,
}

impl Parity {
    pub fn of(index: usize) -> Self {
        if index % 2 == 0 {
            Self::Even
        } else {
            Self::Odd
        }
    }

    /// Where the primary copy goes when active.
    pub fn exit_offset(self) -> f64 {
        match self {
            Self::Even => -CELL,
            Self::Odd => CELL,
        }
    }

    /// Where the clone waits while at rest: the opposite side.
    pub fn clone_rest_offset(self) -> f64 {
        -self.exit_offset()
    }
}

#[derive(Debug, Clone, PartialEq)]
struct CharSlot {
    ch: char,
    parity: Parity,
    primary: Animated,
    clone: Animated,
}

/// One character's layers at a point in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharFrame {
    /// Character to draw; spaces come back as non-breaking spaces so the
    /// cell keeps its width.
    pub glyph: char,
    pub parity: Parity,
    /// Vertical offset of the primary glyph, in percent.
    pub primary_y: f64,
    /// Vertical offset of the accent copy, in percent.
    pub clone_y: f64,
}

#[derive(Debug, Clone)]
pub struct KineticText {
    slots: Vec<CharSlot>,
    timing: RevealTiming,
    mode: RevealMode,
    machine: PhaseMachine,
    latched: bool,
}

impl KineticText {
    pub fn new(text: &str, mode: RevealMode, timing: RevealTiming) -> Self {
        let slots = text
            .chars()
            .enumerate()
            .map(|(i, ch)| {
                let parity = Parity::of(i);
                CharSlot {
                    ch,
                    parity,
                    primary: Animated::at_rest(0.0),
                    clone: Animated::at_rest(parity.clone_rest_offset()),
                }
            })
            .collect();
        Self { slots, timing, mode, machine: PhaseMachine::new(timing.duration), latched: false }
    }

    pub fn text(&self) -> String {
        self.slots.iter().map(|s| s.ch).collect()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_active(&self) -> bool {
        self.machine.is_active()
    }

    pub fn phase(&self, now: f64) -> Phase {
        self.machine.phase(now)
    }

    /// Feeds the hover or in-view signal. Returns whether anything changed.
    pub fn set_active(&mut self, active: bool, now: f64) -> bool {
        if !active && self.latched {
            return false;
        }
        if !self.machine.set_active(active, now) {
            return false;
        }
        if active && self.mode == RevealMode::Once {
            self.latched = true;
        }

        let RevealTiming { duration, easing } = self.timing;
        for slot in &mut self.slots {
            let (primary, clone) =
                if active { (slot.parity.exit_offset(), 0.0) } else { (0.0, slot.parity.clone_rest_offset()) };
            slot.primary.animate_to(primary, now, duration, easing);
            slot.clone.animate_to(clone, now, duration, easing);
        }
        true
    }

    pub fn sample(&self, now: f64) -> Vec<CharFrame> {
        self.slots
            .iter()
            .map(|slot| CharFrame {
                glyph: if slot.ch == ' ' { '\u{00A0}' } else { slot.ch },
                parity: slot.parity,
                primary_y: slot.primary.value_at(now),
                clone_y: slot.clone.value_at(now),
            })
            .collect()
    }

    pub fn is_settled(&self, now: f64) -> bool {
        self.slots.iter().all(|s| s.primary.is_settled(now) && s.clone.is_settled(now))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FadeUpConfig {
    /// Starting downward offset in pixels.
    pub distance: f64,
    /// Starting blur radius in pixels.
    pub blur: f64,
    pub duration: f64,
    pub easing: Easing,
    /// Extra delay per item index, in seconds.
    pub stagger: f64,
}

impl Default for FadeUpConfig {
    fn default() -> Self {
        Self { distance: 30.0, blur: 10.0, duration: 0.7, easing: Easing::Power4Out, stagger: 0.1 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeFrame {
    pub opacity: f64,
    pub translate_y: f64,
    pub blur: f64,
}

/// Entrance animation for an item in a list: hidden and offset until it
/// scrolls into view.
#[derive(Debug, Clone)]
pub struct FadeUp {
    config: FadeUpConfig,
    delay: f64,
    mode: RevealMode,
    machine: PhaseMachine,
    latched: bool,
    opacity: Animated,
    offset: Animated,
    blur: Animated,
}

impl FadeUp {
    pub fn new(index: usize, mode: RevealMode, config: FadeUpConfig) -> Self {
        Self {
            config,
            delay: index as f64 * config.stagger,
            mode,
            machine: PhaseMachine::new(config.duration),
            latched: false,
            opacity: Animated::at_rest(0.0),
            offset: Animated::at_rest(config.distance),
            blur: Animated::at_rest(config.blur),
        }
    }

    pub fn phase(&self, now: f64) -> Phase {
        self.machine.phase(now)
    }

    pub fn set_in_view(&mut self, in_view: bool, now: f64) -> bool {
        if !in_view && self.latched {
            return false;
        }
        if !self.machine.set_active(in_view, now) {
            return false;
        }
        if in_view && self.mode == RevealMode::Once {
            self.latched = true;
        }

        let FadeUpConfig { distance, blur, duration, easing, .. } = self.config;
        let delay = if in_view { self.delay } else { 0.0 };
        self.machine.set_duration(delay + duration);
        let (opacity, offset, radius) = if in_view { (1.0, 0.0, 0.0) } else { (0.0, distance, blur) };
        self.opacity.animate_to_after(opacity, now, delay, duration, easing);
        self.offset.animate_to_after(offset, now, delay, duration, easing);
        self.blur.animate_to_after(radius, now, delay, duration, easing);
        true
    }

    pub fn sample(&self, now: f64) -> FadeFrame {
        FadeFrame {
            opacity: self.opacity.value_at(now).clamp(0.0, 1.0),
            translate_y: self.offset.value_at(now),
            blur: self.blur.value_at(now).max(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parity_alternates_direction() {
        let mut text = KineticText::new("abcd", RevealMode::Reversible, RevealTiming::default());
        text.set_active(true, 0.0);
        let frames = text.sample(10.0);
        assert_eq!(frames[0].primary_y, -100.0);
        assert_eq!(frames[1].primary_y, 100.0);
        assert_eq!(frames[2].primary_y, -100.0);
        assert!(frames.iter().all(|f| f.clone_y == 0.0));
    }

    #[test]
    fn clones_wait_on_opposite_side() {
        let text = KineticText::new("ab", RevealMode::Reversible, RevealTiming::default());
        let frames = text.sample(0.0);
        assert_eq!((frames[0].primary_y, frames[0].clone_y), (0.0, 100.0));
        assert_eq!((frames[1].primary_y, frames[1].clone_y), (0.0, -100.0));
    }

    #[test]
    fn spaces_render_as_nbsp() {
        let text = KineticText::new("a b", RevealMode::Reversible, RevealTiming::default());
        assert_eq!(text.sample(0.0)[1].glyph, '\u{00A0}');
        assert_eq!(text.text(), "a b");
    }

    #[test]
    fn once_mode_ignores_deactivation() {
        let mut text = KineticText::new("hi", RevealMode::Once, RevealTiming::default());
        assert!(text.set_active(true, 0.0));
        assert!(!text.set_active(false, 1.0));
        assert_eq!(text.phase(5.0), Phase::Active);
        assert_eq!(text.sample(5.0)[0].primary_y, -100.0);
    }

    #[test]
    fn mid_transition_reversal_does_not_jump() {
        let mut text = KineticText::new("x", RevealMode::Reversible, RevealTiming::default());
        text.set_active(true, 0.0);
        let before = text.sample(0.4)[0].primary_y;
        text.set_active(false, 0.4);
        assert_eq!(text.sample(0.4)[0].primary_y, before);
        assert_eq!(text.phase(0.5), Phase::TransitioningOut);
    }

    #[test]
    fn fade_up_staggers_by_index() {
        let mut first = FadeUp::new(0, RevealMode::Once, FadeUpConfig::default());
        let mut third = FadeUp::new(2, RevealMode::Once, FadeUpConfig::default());
        first.set_in_view(true, 0.0);
        third.set_in_view(true, 0.0);
        assert!(first.sample(0.1).opacity > 0.0);
        assert_eq!(third.sample(0.1).opacity, 0.0);
        assert_eq!(third.sample(2.0), FadeFrame { opacity: 1.0, translate_y: 0.0, blur: 0.0 });
    }

    #[test]
    fn fade_up_once_stays_visible() {
        let mut card = FadeUp::new(0, RevealMode::Once, FadeUpConfig::default());
        card.set_in_view(true, 0.0);
        assert!(!card.set_in_view(false, 1.0));
        assert_eq!(card.sample(3.0).opacity, 1.0);
    }
}
