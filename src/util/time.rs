//! Time utilities for game simulation

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Discrete simulation time unit
pub type Tick = u64;

/// Default tick length in milliseconds
pub const DEFAULT_TICK_RATE_MS: u64 = 100;

/// Get current Unix timestamp in milliseconds
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_millis() as u64
}

/// Server start time for uptime tracking
static SERVER_START: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

/// Initialize server start time (call once at startup)
pub fn init_server_time() {
    SERVER_START.get_or_init(Instant::now);
}

/// Get server uptime in seconds
pub fn uptime_secs() -> u64 {
    SERVER_START
        .get()
        .map(|start| start.elapsed().as_secs())
        .unwrap_or(0)
}

/// Quantizes wall-clock time into integer ticks.
///
/// Every cooldown, reload window and projectile flight time in the world is
/// measured in these ticks, so all of them share one clock.
#[derive(Debug, Clone, Copy)]
pub struct TickClock {
    tick_rate_ms: u64,
}

impl TickClock {
    pub fn new(tick_rate_ms: u64) -> Self {
        Self {
            tick_rate_ms: tick_rate_ms.max(1),
        }
    }

    /// Current tick: `floor(unix_millis / tick_rate)`
    pub fn tick(&self) -> Tick {
        self.tick_at(unix_millis())
    }

    /// Tick containing the given Unix millisecond timestamp
    pub fn tick_at(&self, millis: u64) -> Tick {
        millis / self.tick_rate_ms
    }

    /// Number of whole ticks covering `millis`
    pub fn ticks_in(&self, millis: u64) -> Tick {
        millis / self.tick_rate_ms
    }

    pub fn tick_duration(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }

    pub fn tick_rate_ms(&self) -> u64 {
        self.tick_rate_ms
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_RATE_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_floors_milliseconds() {
        let clock = TickClock::new(100);
        assert_eq!(clock.tick_at(0), 0);
        assert_eq!(clock.tick_at(99), 0);
        assert_eq!(clock.tick_at(100), 1);
        assert_eq!(clock.tick_at(1_234_567), 12_345);
    }

    #[test]
    fn timeout_window_in_ticks() {
        let clock = TickClock::new(100);
        assert_eq!(clock.ticks_in(10_000), 100);
    }

    #[test]
    fn zero_rate_is_clamped() {
        let clock = TickClock::new(0);
        assert_eq!(clock.tick_rate_ms(), 1);
        assert_eq!(clock.tick_at(42), 42);
    }

    #[test]
    fn live_tick_tracks_wall_clock() {
        let clock = TickClock::default();
        let before = unix_millis() / DEFAULT_TICK_RATE_MS;
        let tick = clock.tick();
        assert!(tick >= before);
        assert!(tick <= unix_millis() / DEFAULT_TICK_RATE_MS);
    }
}
