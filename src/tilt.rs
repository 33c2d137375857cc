//! Pointer-reactive 3D card tilt and the deck-wide focus mode that dims
//! every card except the hovered one.

use std::cell::Cell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::motion::{Animated, Easing, Phase, PhaseMachine};

/// Element bounds in client (viewport) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TiltPreset {
    /// Rotation in degrees at the card's edges.
    pub max_rotation: f64,
    pub hover_scale: f64,
    pub enter_duration: f64,
    pub enter_easing: Easing,
    pub leave_duration: f64,
    pub leave_easing: Easing,
}

impl Default for TiltPreset {
    fn default() -> Self {
        Self {
            max_rotation: 16.0,
            hover_scale: 1.04,
            enter_duration: 0.8,
            enter_easing: Easing::Power2Out,
            leave_duration: 1.0,
            leave_easing: Easing::Power3Out,
        }
    }
}

/// Rotation (degrees) and scale applied to a card.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TiltState {
    pub rotation_x: f64,
    pub rotation_y: f64,
    pub scale: f64,
}

impl TiltState {
    pub const REST: Self = Self { rotation_x: 0.0, rotation_y: 0.0, scale: 1.0 };

    /// CSS `transform` value for this state.
    pub fn css(&self) -> String {
        format!(
            "perspective(1000px) rotateX({:.3}deg) rotateY({:.3}deg) scale({:.4})",
            self.rotation_x, self.rotation_y, self.scale
        )
    }
}

/// The pose a pointer at `(x, y)` asks for.
///
/// Offsets are normalised to `[-1, 1]` from the card centre; pointer
/// positions outside the bounds are clamped to the edge. Pointing below the
/// centre tips the card back (positive X), pointing right turns it away
/// (negative Y).
pub fn tilt_target(rect: Rect, x: f64, y: f64, preset: &TiltPreset) -> TiltState {
    let normalise = |pos: f64, start: f64, extent: f64| {
        if extent <= 0.0 {
            return 0.0;
        }
        let half = extent / 2.0;
        ((pos - start - half) / half).clamp(-1.0, 1.0)
    };
    let nx = normalise(x, rect.left, rect.width);
    let ny = normalise(y, rect.top, rect.height);
    TiltState {
        rotation_x: ny * preset.max_rotation,
        // Avoid handing out -0.0 for a centred pointer.
        rotation_y: if nx == 0.0 { 0.0 } else { -nx * preset.max_rotation },
        scale: preset.hover_scale,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardId(pub u32);

/// Which card, if any, the pointer is over.
///
/// Owned by the deck and shared with each card by handle; a card may only
/// clear the focus it set itself.
#[derive(Debug, Clone, Default)]
pub struct HoverFocus {
    hovered: Rc<Cell<Option<CardId>>>,
}

impl HoverFocus {
    pub fn hovered(&self) -> Option<CardId> {
        self.hovered.get()
    }

    pub fn claim(&self, id: CardId) {
        self.hovered.set(Some(id));
    }

    pub fn release(&self, id: CardId) {
        if self.hovered.get() == Some(id) {
            self.hovered.set(None);
        }
    }

    /// Another card is hovered, so `id` should recede.
    pub fn is_dimmed(&self, id: CardId) -> bool {
        self.hovered.get().is_some_and(|h| h != id)
    }
}

#[derive(Debug, Clone)]
pub struct CardTilt {
    id: CardId,
    preset: TiltPreset,
    focus: HoverFocus,
    machine: PhaseMachine,
    rotation_x: Animated,
    rotation_y: Animated,
    scale: Animated,
}

impl CardTilt {
    pub fn new(id: CardId, preset: TiltPreset, focus: HoverFocus) -> Self {
        Self {
            id,
            preset,
            focus,
            machine: PhaseMachine::new(preset.enter_duration),
            rotation_x: Animated::at_rest(0.0),
            rotation_y: Animated::at_rest(0.0),
            scale: Animated::at_rest(1.0),
        }
    }

    pub fn id(&self) -> CardId {
        self.id
    }

    pub fn phase(&self, now: f64) -> Phase {
        self.machine.phase(now)
    }

    pub fn pointer_move(&mut self, rect: Rect, x: f64, y: f64, now: f64) {
        let target = tilt_target(rect, x, y, &self.preset);
        if self.machine.set_active(true, now) {
            self.machine.set_duration(self.preset.enter_duration);
        }
        self.focus.claim(self.id);
        self.approach(target, now, self.preset.enter_duration, self.preset.enter_easing);
    }

    pub fn pointer_leave(&mut self, now: f64) {
        if self.machine.set_active(false, now) {
            self.machine.set_duration(self.preset.leave_duration);
        }
        self.focus.release(self.id);
        self.approach(TiltState::REST, now, self.preset.leave_duration, self.preset.leave_easing);
    }

    pub fn sample(&self, now: f64) -> TiltState {
        TiltState {
            rotation_x: self.rotation_x.value_at(now),
            rotation_y: self.rotation_y.value_at(now),
            scale: self.scale.value_at(now),
        }
    }

    pub fn is_dimmed(&self) -> bool {
        self.focus.is_dimmed(self.id)
    }

    fn approach(&mut self, target: TiltState, now: f64, duration: f64, easing: Easing) {
        self.rotation_x.animate_to(target.rotation_x, now, duration, easing);
        self.rotation_y.animate_to(target.rotation_y, now, duration, easing);
        self.scale.animate_to(target.scale, now, duration, easing);
    }
}

/// Styling applied to receding cards while another one is hovered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusStyle {
    pub enabled: bool,
    pub blur: f64,
    pub opacity: f64,
}

impl Default for FocusStyle {
    fn default() -> Self {
        Self { enabled: true, blur: 12.0, opacity: 0.2 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardFrame {
    pub id: CardId,
    pub tilt: TiltState,
    pub dimmed: bool,
}

/// A list of tiltable cards sharing one [`HoverFocus`].
#[derive(Debug, Clone)]
pub struct CardDeck {
    focus: HoverFocus,
    style: FocusStyle,
    cards: Vec<CardTilt>,
}

impl CardDeck {
    pub fn new(ids: impl IntoIterator<Item = CardId>, preset: TiltPreset, style: FocusStyle) -> Self {
        let focus = HoverFocus::default();
        let cards = ids.into_iter().map(|id| CardTilt::new(id, preset, focus.clone())).collect();
        Self { focus, style, cards }
    }

    pub fn focus(&self) -> &HoverFocus {
        &self.focus
    }

    pub fn style(&self) -> FocusStyle {
        self.style
    }

    pub fn card(&self, id: CardId) -> Option<&CardTilt> {
        self.cards.iter().find(|c| c.id == id)
    }

    pub fn pointer_move(&mut self, id: CardId, rect: Rect, x: f64, y: f64, now: f64) {
        if let Some(card) = self.cards.iter_mut().find(|c| c.id == id) {
            card.pointer_move(rect, x, y, now);
        }
    }

    pub fn pointer_leave(&mut self, id: CardId, now: f64) {
        if let Some(card) = self.cards.iter_mut().find(|c| c.id == id) {
            card.pointer_leave(now);
        }
    }

    pub fn frames(&self, now: f64) -> Vec<CardFrame> {
        self.cards
            .iter()
            .map(|card| CardFrame {
                id: card.id,
                tilt: card.sample(now),
                dimmed: self.style.enabled && card.is_dimmed(),
            })
            .collect()
    }
}
