//! Change coalescing.
//!
//! A [`Debouncer`] holds back a stream of values until it has been quiet for a
//! fixed period, then releases the latest one, skipping it if it equals the
//! last released value. Time is passed in by the caller, so the same logic
//! serves the polling loop of `astlens watch` and the unit tests.

use std::time::{Duration, Instant};

/// Default quiet period for source text changes.
pub const SOURCE_DEBOUNCE: Duration = Duration::from_millis(500);

/// Default quiet period for node selection changes.
pub const SELECTION_DEBOUNCE: Duration = Duration::from_millis(150);

/// Quiet-period debouncer with duplicate suppression.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    quiet: Duration,
    pending: Option<(T, Instant)>,
    last_emitted: Option<T>,
}

impl<T: Clone + PartialEq> Debouncer<T> {
    /// Create a debouncer that waits `quiet` after the latest push.
    #[must_use]
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
            last_emitted: None,
        }
    }

    /// The quiet period.
    #[must_use]
    pub fn quiet(&self) -> Duration {
        self.quiet
    }

    /// Record a new value observed at `now`, restarting the quiet period.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now));
    }

    /// Record `value` observed at `now` only if it is a change.
    ///
    /// Polling sources report the same value over and over; only a value that
    /// differs from the pending one (or, with nothing pending, from the last
    /// released one) restarts the quiet period. Returns whether it did.
    pub fn observe(&mut self, value: T, now: Instant) -> bool {
        let current = match &self.pending {
            Some((pending, _)) => Some(pending),
            None => self.last_emitted.as_ref(),
        };
        if current == Some(&value) {
            return false;
        }
        self.push(value, now);
        true
    }

    /// Whether a value is waiting for its quiet period to pass.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Release the pending value if the quiet period has passed at `now`.
    ///
    /// Returns `None` while the period is running, when nothing is pending, or
    /// when the settled value equals the one released last.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let (_, pushed_at) = self.pending.as_ref()?;
        if now.saturating_duration_since(*pushed_at) < self.quiet {
            return None;
        }
        let (value, _) = self.pending.take()?;
        if self.last_emitted.as_ref() == Some(&value) {
            tracing::trace!("Settled value unchanged, suppressed");
            return None;
        }
        self.last_emitted = Some(value.clone());
        Some(value)
    }

    /// Mark `value` as already released, e.g. the initial text of a document.
    pub fn prime(&mut self, value: T) {
        self.last_emitted = Some(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn releases_only_after_the_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(SOURCE_DEBOUNCE);

        debouncer.push("a", start);

        assert_eq!(debouncer.poll(start + ms(499)), None);
        assert_eq!(debouncer.poll(start + ms(500)), Some("a"));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn new_pushes_restart_the_period_and_keep_the_latest() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(ms(100));

        debouncer.push(1, start);
        debouncer.push(2, start + ms(80));

        assert_eq!(debouncer.poll(start + ms(150)), None);
        assert_eq!(debouncer.poll(start + ms(180)), Some(2));
    }

    #[test]
    fn repeated_values_are_suppressed() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(SELECTION_DEBOUNCE);

        debouncer.push(7, start);
        assert_eq!(debouncer.poll(start + ms(200)), Some(7));

        debouncer.push(7, start + ms(300));
        assert_eq!(debouncer.poll(start + ms(600)), None);

        debouncer.push(8, start + ms(700));
        assert_eq!(debouncer.poll(start + ms(900)), Some(8));
    }

    #[test]
    fn primed_value_counts_as_released() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(ms(10));
        debouncer.prime(String::from("text"));

        debouncer.push(String::from("text"), start);

        assert_eq!(debouncer.poll(start + ms(20)), None);
    }

    #[test]
    fn observing_the_same_value_does_not_restart_the_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(ms(100));
        debouncer.prime("old");

        assert!(!debouncer.observe("old", start));
        assert!(debouncer.observe("new", start));
        assert!(!debouncer.observe("new", start + ms(60)));

        assert_eq!(debouncer.poll(start + ms(100)), Some("new"));
        assert!(!debouncer.observe("new", start + ms(200)));
    }

    #[test]
    fn poll_without_push_is_none() {
        let mut debouncer: Debouncer<u8> = Debouncer::new(ms(10));
        assert_eq!(debouncer.poll(Instant::now()), None);
    }
}
