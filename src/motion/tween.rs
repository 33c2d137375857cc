use super::easing::Easing;

/// A single timed transition between two values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    pub from: f64,
    pub to: f64,
    /// Clock time, in seconds, at which the transition begins.
    pub start: f64,
    pub duration: f64,
    pub easing: Easing,
}

impl Tween {
    pub fn value_at(&self, now: f64) -> f64 {
        if self.is_finished(now) {
            return self.to;
        }
        if now <= self.start {
            return self.from;
        }
        let t = (now - self.start) / self.duration;
        self.from + (self.to - self.from) * self.easing.apply(t)
    }

    pub fn is_finished(&self, now: f64) -> bool {
        self.duration <= 0.0 || now >= self.start + self.duration
    }
}

/// A value that is always either resting or mid-tween.
///
/// Retargeting starts the new tween from wherever the old one currently is, so
/// interrupted transitions never jump.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Animated {
    tween: Tween,
}

impl Animated {
    pub fn at_rest(value: f64) -> Self {
        Self {
            tween: Tween { from: value, to: value, start: 0.0, duration: 0.0, easing: Easing::Linear },
        }
    }

    pub fn animate_to(&mut self, target: f64, now: f64, duration: f64, easing: Easing) {
        self.animate_to_after(target, now, 0.0, duration, easing);
    }

    /// Like [`Animated::animate_to`] with a start delay in seconds.
    pub fn animate_to_after(&mut self, target: f64, now: f64, delay: f64, duration: f64, easing: Easing) {
        if self.tween.to == target && self.tween.easing == easing {
            return;
        }
        let from = self.value_at(now);
        self.tween = Tween { from, to: target, start: now + delay.max(0.0), duration, easing };
    }

    pub fn value_at(&self, now: f64) -> f64 {
        self.tween.value_at(now)
    }

    pub fn target(&self) -> f64 {
        self.tween.to
    }

    pub fn is_settled(&self, now: f64) -> bool {
        self.tween.is_finished(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tween_clamps_before_and_after() {
        let t = Tween { from: 2.0, to: 4.0, start: 1.0, duration: 2.0, easing: Easing::Linear };
        assert_eq!(t.value_at(0.0), 2.0);
        assert_eq!(t.value_at(2.0), 3.0);
        assert_eq!(t.value_at(9.0), 4.0);
    }

    #[test]
    fn retarget_continues_from_current_value() {
        let mut a = Animated::at_rest(0.0);
        a.animate_to(100.0, 0.0, 1.0, Easing::Linear);
        a.animate_to(0.0, 0.5, 1.0, Easing::Linear);
        assert_eq!(a.value_at(0.5), 50.0);
        assert_eq!(a.value_at(1.5), 0.0);
    }

    #[test]
    fn same_target_does_not_restart() {
        let mut a = Animated::at_rest(0.0);
        a.animate_to(10.0, 0.0, 1.0, Easing::Linear);
        a.animate_to(10.0, 0.5, 1.0, Easing::Linear);
        assert!(a.is_settled(1.0));
    }
}
