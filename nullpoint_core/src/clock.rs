use std::time::{Duration, Instant};

/// Fixed-period tick source for the enemy motion.
///
/// A tick that falls due while a previous period was still being handled is
/// coalesced: however many periods were missed, `poll` fires once and the
/// next period starts at that moment.
#[derive(Debug, Clone)]
pub struct TickClock {
    period: Duration,
    last_tick: Option<Instant>,
}

impl TickClock {
    /// Creates a stopped clock.
    pub fn new(period: Duration) -> Self {
        TickClock {
            period,
            last_tick: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.last_tick.is_some()
    }

    /// Starts, or restarts, counting a period from `now`.
    pub fn start(&mut self, now: Instant) {
        self.last_tick = Some(now);
    }

    pub fn stop(&mut self) {
        self.last_tick = None;
    }

    /// Returns true if a tick is due at `now`, and starts the next period.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.last_tick {
            Some(last) if now.saturating_duration_since(last) >= self.period => {
                self.last_tick = Some(now);
                true
            }
            _ => false,
        }
    }

    /// Time until the next tick, or `None` while stopped.
    pub fn until_next(&self, now: Instant) -> Option<Duration> {
        let last = self.last_tick?;
        Some(
            self.period
                .checked_sub(now.saturating_duration_since(last))
                .unwrap_or(Duration::ZERO),
        )
    }
}
