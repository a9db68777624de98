//! World stepping: the `Stepper` seam and the fixed-rate driver

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

use crate::util::time::{Tick, TickClock};

use super::events::{log_events, WorldEvent};
use super::world::World;

/// The world behind its single lock
pub type SharedWorld = Arc<Mutex<World>>;

/// Advances global simulation by one step. Implementors do not know whether
/// a timer or an incoming request is driving them.
pub trait Stepper {
    /// Run one step at tick `now` and hand back the events it raised
    fn step(&mut self, now: Tick) -> Vec<WorldEvent>;
}

impl Stepper for World {
    fn step(&mut self, now: Tick) -> Vec<WorldEvent> {
        self.advance_projectiles(now);
        self.sweep_timeouts(now);
        self.drain_events()
    }
}

/// Drives a `Stepper` once per tick from its own task
pub struct FixedRateScheduler<S> {
    target: Arc<Mutex<S>>,
    clock: TickClock,
}

impl<S: Stepper + Send + 'static> FixedRateScheduler<S> {
    pub fn new(target: Arc<Mutex<S>>, clock: TickClock) -> Self {
        Self { target, clock }
    }

    /// Step once at the current tick. The lock is held only for the step.
    pub fn step_once(&self) -> Vec<WorldEvent> {
        let now = self.clock.tick();
        self.target.lock().step(now)
    }

    /// Run the fixed-rate loop forever
    pub async fn run(self) {
        info!(
            tick_ms = self.clock.tick_rate_ms(),
            "Fixed-rate world scheduler started"
        );

        let mut ticker = interval(self.clock.tick_duration());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            log_events(self.step_once());
        }
    }
}
