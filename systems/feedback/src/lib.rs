#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Bridges world events to listener notifications and feedback cues.

use std::collections::VecDeque;

use matopeli_core::{Event, Listener};
use tracing::trace;

/// Notifies `listener` about every event that has a listener hook.
///
/// Events are forwarded in the order the world emitted them.
pub fn dispatch(events: &[Event], listener: &mut dyn Listener) {
    for event in events {
        match event {
            Event::WormGrew { .. } => listener.on_growth(),
            Event::GameOver { .. } => listener.on_game_over(),
            Event::GameStarted { .. } => {}
        }
    }
}

/// Audio or visual reaction an adapter may play back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cue {
    /// The worm ate a target.
    Chomp,
    /// The worm crashed.
    Crash,
}

/// Listener that queues cues until an adapter collects them.
#[derive(Debug, Default)]
pub struct Feedback {
    cues: VecDeque<Cue>,
}

impl Feedback {
    /// Creates an empty feedback queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes world events and queues the resulting cues.
    pub fn handle(&mut self, events: &[Event]) {
        dispatch(events, self);
    }

    /// Removes and yields every queued cue, oldest first.
    pub fn drain_cues(&mut self) -> impl Iterator<Item = Cue> + '_ {
        self.cues.drain(..)
    }

    /// Reports whether no cue is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }
}

impl Listener for Feedback {
    fn on_growth(&mut self) {
        trace!("queueing chomp cue");
        self.cues.push_back(Cue::Chomp);
    }

    fn on_game_over(&mut self) {
        trace!("queueing crash cue");
        self.cues.push_back(Cue::Crash);
    }
}
