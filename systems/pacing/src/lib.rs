#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-rate simulation clock that turns frame deltas into tick commands.
//!
//! Render loops run at whatever rate the display allows. The pacing system
//! accumulates the elapsed time and emits one [`Command::Tick`] per full
//! simulation interval so game-logic throughput stays independent of the
//! frame rate.

use std::time::Duration;

use matopeli_core::{Command, GameState};
use tracing::debug;

const DEFAULT_MAX_CATCH_UP: u32 = 4;

/// Configuration parameters required to construct the pacing system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    tick_interval: Duration,
    max_catch_up: u32,
}

impl Config {
    /// Creates a configuration ticking once per `tick_interval`.
    ///
    /// At most `max_catch_up` ticks are emitted for a single update; any
    /// backlog beyond that is dropped.
    #[must_use]
    pub const fn new(tick_interval: Duration, max_catch_up: u32) -> Self {
        Self {
            tick_interval,
            max_catch_up,
        }
    }

    /// Creates a configuration ticking `hertz` times per second.
    ///
    /// Returns `None` for a zero rate.
    #[must_use]
    pub fn from_hertz(hertz: u32) -> Option<Self> {
        if hertz == 0 {
            return None;
        }
        let interval = Duration::from_secs(1) / hertz;
        Some(Self::new(interval, DEFAULT_MAX_CATCH_UP))
    }

    /// Simulated time between two ticks.
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        self.tick_interval
    }
}

/// Pure system that emits tick commands at a fixed rate while a game runs.
#[derive(Debug)]
pub struct Pacing {
    tick_interval: Duration,
    max_catch_up: u32,
    accumulator: Duration,
}

impl Pacing {
    /// Creates a new pacing system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            tick_interval: config.tick_interval,
            max_catch_up: config.max_catch_up,
            accumulator: Duration::ZERO,
        }
    }

    /// Consumes the frame delta and the world state to emit tick commands.
    ///
    /// Time spent outside [`GameState::Running`] is discarded so a fresh game
    /// never starts with a burst of stale ticks.
    pub fn handle(&mut self, dt: Duration, state: GameState, out: &mut Vec<Command>) {
        if state != GameState::Running {
            self.accumulator = Duration::ZERO;
            return;
        }

        if self.tick_interval.is_zero() || dt.is_zero() {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(dt);
        let ticks = self.resolve_ticks();
        out.extend(std::iter::repeat(Command::Tick).take(ticks));
    }

    /// Time accumulated toward the next tick.
    #[must_use]
    pub fn pending(&self) -> Duration {
        self.accumulator
    }

    fn resolve_ticks(&mut self) -> usize {
        let mut ticks = 0;
        while self.accumulator >= self.tick_interval {
            if ticks >= self.max_catch_up as usize {
                debug!(
                    backlog_ms = self.accumulator.as_millis() as u64,
                    "dropping simulation backlog"
                );
                self.accumulator = Duration::ZERO;
                break;
            }
            self.accumulator -= self.tick_interval;
            ticks += 1;
        }
        ticks
    }
}
