//! Delayed outcome delivery.
//!
//! The session decides win or loss the moment a decisive ship is destroyed,
//! but the callback only fires after a grace period of simulated time. The
//! timer is owned by the session, so exiting cancels it deterministically.

use skirmish_core::enums::Outcome;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Pending {
    outcome: Outcome,
    due_at: f64,
}

/// Cancellable one-shot timer for the session outcome.
#[derive(Debug, Clone, Default)]
pub struct OutcomeTimer {
    pending: Option<Pending>,
}

impl OutcomeTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer to deliver `outcome` once `now + delay` is reached.
    /// Replaces any pending outcome.
    pub fn schedule(&mut self, outcome: Outcome, now: f64, delay: f32) {
        self.pending = Some(Pending {
            outcome,
            due_at: now + f64::from(delay.max(0.0)),
        });
    }

    /// Take the outcome if it is due. Fires at most once per schedule.
    pub fn poll(&mut self, now: f64) -> Option<Outcome> {
        match self.pending {
            Some(p) if now >= p.due_at => {
                self.pending = None;
                Some(p.outcome)
            }
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Simulated time at which the pending outcome becomes due.
    pub fn due_at(&self) -> Option<f64> {
        self.pending.map(|p| p.due_at)
    }
}

type Callback = Box<dyn FnMut() + Send>;

/// Registered `on_won` / `on_lost` listeners.
#[derive(Default)]
pub struct OutcomeCallbacks {
    won: Vec<Callback>,
    lost: Vec<Callback>,
}

impl OutcomeCallbacks {
    pub fn on_won(&mut self, f: impl FnMut() + Send + 'static) {
        self.won.push(Box::new(f));
    }

    pub fn on_lost(&mut self, f: impl FnMut() + Send + 'static) {
        self.lost.push(Box::new(f));
    }

    /// Invoke every listener registered for `outcome`.
    pub fn fire(&mut self, outcome: Outcome) {
        let listeners = match outcome {
            Outcome::Won => &mut self.won,
            Outcome::Lost => &mut self.lost,
        };
        for listener in listeners.iter_mut() {
            listener();
        }
    }

    pub fn clear(&mut self) {
        self.won.clear();
        self.lost.clear();
    }
}

impl std::fmt::Debug for OutcomeCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutcomeCallbacks")
            .field("won", &self.won.len())
            .field("lost", &self.lost.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_after_delay() {
        let mut timer = OutcomeTimer::new();
        timer.schedule(Outcome::Won, 2.0, 1.5);
        assert_eq!(timer.poll(2.0), None);
        assert_eq!(timer.poll(3.49), None);
        assert_eq!(timer.poll(3.5), Some(Outcome::Won));
        assert_eq!(timer.poll(10.0), None);
    }

    #[test]
    fn test_cancel_drops_pending() {
        let mut timer = OutcomeTimer::new();
        timer.schedule(Outcome::Lost, 0.0, 1.0);
        assert!(timer.is_pending());
        timer.cancel();
        assert!(!timer.is_pending());
        assert_eq!(timer.poll(5.0), None);
    }

    #[test]
    fn test_callbacks_route_by_outcome() {
        use std::sync::atomic::{AtomicU32, Ordering};
        use std::sync::Arc;

        let won = Arc::new(AtomicU32::new(0));
        let lost = Arc::new(AtomicU32::new(0));
        let mut callbacks = OutcomeCallbacks::default();
        let w = won.clone();
        callbacks.on_won(move || {
            w.fetch_add(1, Ordering::SeqCst);
        });
        let l = lost.clone();
        callbacks.on_lost(move || {
            l.fetch_add(1, Ordering::SeqCst);
        });

        callbacks.fire(Outcome::Won);
        assert_eq!(won.load(Ordering::SeqCst), 1);
        assert_eq!(lost.load(Ordering::SeqCst), 0);
    }
}
