//! Auto-Advance Timer
//!
//! Drives `Engine::tick` from a tokio interval. The engine never knows about
//! the timer; pausing, blocking events and councils are all handled inside
//! `tick`, so the timer just keeps firing.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::engine::Engine;
use crate::systems::phase::TickOutcome;

/// Shared handle to an engine driven by a timer
pub type SharedEngine = Arc<Mutex<Engine>>;

/// Lock the engine, recovering it if a previous holder panicked.
pub fn lock(engine: &SharedEngine) -> MutexGuard<'_, Engine> {
    engine.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Tick period at `speed`, never shorter than one millisecond.
pub fn tick_period(base_tick_ms: u64, speed: u8) -> Duration {
    Duration::from_millis((base_tick_ms / speed.max(1) as u64).max(1))
}

/// Background task calling `tick` at the engine's configured rate.
pub struct AutoAdvance {
    engine: SharedEngine,
    task: Option<JoinHandle<()>>,
}

impl AutoAdvance {
    pub fn new(engine: SharedEngine) -> Self {
        Self { engine, task: None }
    }

    pub fn engine(&self) -> &SharedEngine {
        &self.engine
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Unpause the clock and start ticking. Must be called inside a tokio
    /// runtime. Restarts the task if one is already running.
    pub fn start(&mut self) {
        self.abort_task();
        let period = {
            let mut engine = lock(&self.engine);
            engine.resume();
            tick_period(engine.config().timer.base_tick_ms, engine.clock().speed)
        };
        let engine = Arc::clone(&self.engine);
        self.task = Some(tokio::spawn(run(engine, period)));
        tracing::debug!(period_ms = period.as_millis() as u64, "Auto-advance started");
    }

    /// Pause the clock and stop ticking. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if self.abort_task() {
            tracing::debug!("Auto-advance stopped");
        }
        lock(&self.engine).pause();
    }

    /// Change speed. A running timer picks up the new period immediately.
    pub fn set_speed(&mut self, speed: u8) -> u8 {
        let applied = lock(&self.engine).set_speed(speed);
        if self.is_running() {
            self.start();
        }
        applied
    }

    fn abort_task(&mut self) -> bool {
        match self.task.take() {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        }
    }
}

impl Drop for AutoAdvance {
    fn drop(&mut self) {
        self.abort_task();
    }
}

async fn run(engine: SharedEngine, period: Duration) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let outcome = lock(&engine).tick();
        if let TickOutcome::Advanced { change, .. } = &outcome {
            tracing::debug!(time = %change.to, "Auto-advance moved the clock");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_period_scales_with_speed() {
        assert_eq!(tick_period(250, 1), Duration::from_millis(250));
        assert_eq!(tick_period(250, 2), Duration::from_millis(125));
        assert_eq!(tick_period(250, 4), Duration::from_millis(62));
        assert_eq!(tick_period(250, 0), Duration::from_millis(250));
        assert_eq!(tick_period(0, 4), Duration::from_millis(1));
    }
}
