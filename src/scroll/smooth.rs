use crate::motion::{lerp, Easing};

/// Inertial page scrolling: wheel input moves a target, and the rendered
/// scroll position eases toward it over a fixed duration.
#[derive(Debug, Clone)]
pub struct SmoothScroll {
    current: f64,
    from: f64,
    target: f64,
    elapsed: f64,
    duration: f64,
    limit: f64,
    easing: Easing,
}

impl SmoothScroll {
    pub fn new(duration: f64, limit: f64) -> Self {
        Self {
            current: 0.0,
            from: 0.0,
            target: 0.0,
            elapsed: 0.0,
            duration,
            limit: limit.max(0.0),
            easing: Easing::ExpoOut,
        }
    }

    pub fn position(&self) -> f64 {
        self.current
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn is_animating(&self) -> bool {
        self.current != self.target
    }

    pub fn limit(&self) -> f64 {
        self.limit
    }

    /// Largest scrollable offset (document height minus viewport height).
    pub fn set_limit(&mut self, limit: f64) {
        self.limit = limit.max(0.0);
        if self.target > self.limit {
            self.retarget(self.limit);
        }
    }

    pub fn on_wheel(&mut self, delta: f64) {
        self.retarget(self.target + delta);
    }

    /// Scrolls to `offset`; `immediate` skips the easing.
    pub fn scroll_to(&mut self, offset: f64, immediate: bool) {
        self.retarget(offset);
        if immediate {
            self.current = self.target;
        }
    }

    /// Follows a scroll that happened outside the engine (keyboard, scrollbar).
    /// The document has been scrolled that far, so the limit grows to match.
    pub fn sync(&mut self, offset: f64) {
        let offset = offset.max(0.0);
        self.limit = self.limit.max(offset);
        self.current = offset;
        self.from = offset;
        self.target = offset;
    }

    pub fn tick(&mut self, dt: f64) -> f64 {
        if !self.is_animating() {
            return self.current;
        }
        self.elapsed += dt.max(0.0);
        let t = if self.duration > 0.0 { self.elapsed / self.duration } else { 1.0 };
        self.current = if t >= 1.0 { self.target } else { lerp(self.from, self.target, self.easing.apply(t)) };
        self.current
    }

    fn retarget(&mut self, target: f64) {
        self.target = target.clamp(0.0, self.limit);
        self.from = self.current;
        self.elapsed = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wheel_eases_to_target() {
        let mut s = SmoothScroll::new(1.5, 10_000.0);
        s.on_wheel(400.0);
        let early = s.tick(0.1);
        assert!(early > 0.0 && early < 400.0);
        for _ in 0..100 {
            s.tick(1.0 / 60.0);
        }
        assert_eq!(s.position(), 400.0);
        assert!(!s.is_animating());
    }

    #[test]
    fn target_is_clamped_to_limit() {
        let mut s = SmoothScroll::new(1.5, 300.0);
        s.on_wheel(-50.0);
        assert_eq!(s.target(), 0.0);
        s.on_wheel(1000.0);
        assert_eq!(s.target(), 300.0);
        s.set_limit(100.0);
        assert_eq!(s.target(), 100.0);
    }

    #[test]
    fn native_scroll_past_stale_limit_raises_it() {
        let mut s = SmoothScroll::new(1.5, 1000.0);
        s.sync(3000.0);
        assert_eq!(s.position(), 3000.0);
        assert_eq!(s.limit(), 3000.0);
        s.sync(-20.0);
        assert_eq!(s.position(), 0.0);
    }

    #[test]
    fn immediate_scroll_skips_animation() {
        let mut s = SmoothScroll::new(1.5, 1000.0);
        s.scroll_to(250.0, true);
        assert_eq!(s.position(), 250.0);
        assert!(!s.is_animating());
    }
}
