//! "Copied" acknowledgement shown after an address is written to the
//! clipboard.
//!
//! The acknowledgement owns the timer handle that will end it. Dropping the
//! handle must cancel the timer, so dismissing the toast, replacing it, or
//! tearing down its owner all cancel the pending expiry.

use crate::tilt::CardId;

#[derive(Debug)]
struct Acknowledgement<H> {
    card: CardId,
    expires_at: f64,
    _timer: H,
}

#[derive(Debug)]
pub struct CopyToast<H = ()> {
    window: f64,
    ack: Option<Acknowledgement<H>>,
}

impl<H> CopyToast<H> {
    /// `window` is how long, in seconds, the acknowledgement stays up.
    pub fn new(window: f64) -> Self {
        Self { window, ack: None }
    }

    pub fn window(&self) -> f64 {
        self.window
    }

    /// Shows the acknowledgement on `card`, replacing (and cancelling) any
    /// earlier one.
    pub fn acknowledge(&mut self, card: CardId, now: f64, timer: H) {
        self.ack = Some(Acknowledgement { card, expires_at: now + self.window, _timer: timer });
    }

    pub fn dismiss(&mut self) {
        self.ack = None;
    }

    /// Clears the acknowledgement for `card` only if it is still the one
    /// showing, so a late expiry cannot hide a newer toast.
    pub fn dismiss_card(&mut self, card: CardId) {
        if self.copied() == Some(card) {
            self.ack = None;
        }
    }

    /// Drops an acknowledgement whose window has passed. Returns the card it
    /// was shown on.
    pub fn expire(&mut self, now: f64) -> Option<CardId> {
        let due = self.ack.as_ref().is_some_and(|ack| now >= ack.expires_at);
        if due {
            self.ack.take().map(|ack| ack.card)
        } else {
            None
        }
    }

    pub fn copied(&self) -> Option<CardId> {
        self.ack.as_ref().map(|ack| ack.card)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Timer stand-in that records whether it was cancelled.
    struct Handle(Rc<Cell<bool>>);

    impl Drop for Handle {
        fn drop(&mut self) {
            self.0.set(true);
        }
    }

    #[test]
    fn expires_after_window() {
        let mut toast: CopyToast = CopyToast::new(2.0);
        toast.acknowledge(CardId(4), 10.0, ());
        assert_eq!(toast.expire(11.9), None);
        assert_eq!(toast.copied(), Some(CardId(4)));
        assert_eq!(toast.expire(12.0), Some(CardId(4)));
        assert_eq!(toast.copied(), None);
    }

    #[test]
    fn dismiss_and_replacement_cancel_timer() {
        let first = Rc::new(Cell::new(false));
        let second = Rc::new(Cell::new(false));
        let mut toast = CopyToast::new(2.0);
        toast.acknowledge(CardId(1), 0.0, Handle(first.clone()));
        toast.acknowledge(CardId(2), 0.5, Handle(second.clone()));
        assert!(first.get());
        assert!(!second.get());
        toast.dismiss();
        assert!(second.get());
    }

    #[test]
    fn teardown_cancels_timer() {
        let cancelled = Rc::new(Cell::new(false));
        {
            let mut toast = CopyToast::new(2.0);
            toast.acknowledge(CardId(1), 0.0, Handle(cancelled.clone()));
        }
        assert!(cancelled.get());
    }

    #[test]
    fn stale_expiry_keeps_newer_toast() {
        let mut toast: CopyToast = CopyToast::new(2.0);
        toast.acknowledge(CardId(1), 0.0, ());
        toast.acknowledge(CardId(2), 1.0, ());
        toast.dismiss_card(CardId(1));
        assert_eq!(toast.copied(), Some(CardId(2)));
    }
}
