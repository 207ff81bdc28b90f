use std::time::Instant;

/// Time source for rate computation, replaceable in tests
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Turns a monotonically increasing counter into a per-second rate.
///
/// The baseline only moves when [`RateTracker::sample`] is called, so a rate
/// that nobody reads for a while averages over the whole unread interval.
/// A counter that goes backwards yields a negative rate; it is not corrected.
#[derive(Debug, Clone, Default)]
pub struct RateTracker {
    baseline: Option<(Instant, f64)>,
}

impl RateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `counter` observed at `now` and return the rate since the last sample.
    ///
    /// The very first sample has no baseline and returns 0.
    pub fn sample(&mut self, now: Instant, counter: f64) -> f64 {
        let rate = match self.baseline {
            Some((last_time, last_counter)) => {
                let elapsed = now.saturating_duration_since(last_time).as_secs_f64();
                if elapsed > 0.0 {
                    (counter - last_counter) / elapsed
                } else {
                    0.0
                }
            }
            None => 0.0,
        };

        self.baseline = Some((now, counter));
        rate
    }
}
