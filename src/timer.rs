//! Cancellable timers polled by the single-threaded main loop.
//!
//! Neither timer owns a thread or a callback: the loop asks "did you fire at
//! `now`?" and runs the deferred action itself. Once `cancel` has been called
//! the answer is `false` forever, so nothing can fire after cancellation.

use std::time::{Duration, Instant};

/// Single-shot deadline.
#[derive(Debug, Clone, Default)]
pub struct Timeout {
    due: Option<Instant>,
    cancelled: bool,
}

impl Timeout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm (or re-arm) the timeout. Ignored after `cancel`.
    pub fn schedule(&mut self, at: Instant) -> bool {
        if self.cancelled {
            return false;
        }
        self.due = Some(at);
        true
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
        self.due = None;
    }

    pub fn due(&self) -> Option<Instant> {
        self.due
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// True exactly once when `now` reaches the deadline; disarms itself.
    pub fn fire(&mut self, now: Instant) -> bool {
        if self.cancelled {
            return false;
        }
        match self.due {
            Some(due) if now >= due => {
                self.due = None;
                true
            }
            _ => false,
        }
    }
}

/// Periodic tick. Missed periods are coalesced into a single fire.
#[derive(Debug, Clone)]
pub struct Interval {
    period: Duration,
    next: Option<Instant>,
    cancelled: bool,
}

impl Interval {
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            next: None,
            cancelled: false,
        }
    }

    /// Start ticking one period after `now`. No-op if already running or cancelled.
    pub fn start(&mut self, now: Instant) {
        if self.cancelled || self.next.is_some() {
            return;
        }
        self.next = Some(now + self.period);
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        !self.cancelled && self.next.is_some()
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
        self.next = None;
    }

    pub fn poll(&mut self, now: Instant) -> bool {
        if self.cancelled {
            return false;
        }
        let Some(mut next) = self.next else {
            return false;
        };
        if now < next {
            return false;
        }
        while next <= now {
            next += self.period;
        }
        self.next = Some(next);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn timeout_fires_once_at_deadline() {
        let t0 = Instant::now();
        let mut t = Timeout::new();
        assert!(t.schedule(t0 + ms(100)));
        assert!(!t.fire(t0 + ms(99)));
        assert!(t.fire(t0 + ms(100)));
        assert!(!t.fire(t0 + ms(500)));
        assert_eq!(t.due(), None);
    }

    #[test]
    fn cancelled_timeout_never_fires_or_rearms() {
        let t0 = Instant::now();
        let mut t = Timeout::new();
        t.schedule(t0 + ms(10));
        t.cancel();
        assert!(!t.fire(t0 + ms(1000)));
        assert!(!t.schedule(t0 + ms(20)));
        assert!(!t.fire(t0 + ms(1000)));
        assert!(t.is_cancelled());
    }

    #[test]
    fn interval_coalesces_missed_ticks() {
        let t0 = Instant::now();
        let mut i = Interval::new(ms(1000));
        assert!(!i.poll(t0 + ms(5000)), "not started yet");
        i.start(t0);
        assert!(!i.poll(t0 + ms(999)));
        assert!(i.poll(t0 + ms(3500)));
        assert!(!i.poll(t0 + ms(3900)));
        assert!(i.poll(t0 + ms(4000)));
    }

    #[test]
    fn cancelled_interval_stays_silent() {
        let t0 = Instant::now();
        let mut i = Interval::new(ms(1000));
        i.start(t0);
        i.cancel();
        i.start(t0);
        assert!(!i.is_running());
        assert!(!i.poll(t0 + ms(10_000)));
    }
}
