#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Matopeli engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values that systems turn
//! into listener notifications. Target placement draws from a
//! [`RandomSource`] supplied by the driver so that replays stay deterministic.

use serde::{Deserialize, Serialize};

/// Canonical title shown by the UI shell.
pub const GAME_TITLE: &str = "Matopeli";

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    /// Resets the world and begins a new game. Ignored while a game is running.
    Start,
    /// Queues an intended turn. Legality is decided when the next tick resolves it.
    ChangeDirection {
        /// Direction the player asked for.
        direction: Direction,
    },
    /// Advances the simulation by one discrete step.
    Tick,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Event {
    /// Announces that a fresh game began.
    GameStarted {
        /// Cell occupied by the single starting segment.
        head: Position,
        /// Cell holding the first target, if the grid had room for one.
        target: Option<Position>,
    },
    /// Confirms that the worm consumed a target and grew by one segment.
    WormGrew {
        /// Score after the target was consumed.
        score: u32,
        /// Cell where the target was consumed.
        head: Position,
    },
    /// Reports that the last tick ended the game.
    GameOver {
        /// Final score of the finished game.
        score: u32,
        /// Obstacle the worm ran into.
        collision: Collision,
    },
}

/// Obstacle classification for a fatal move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Collision {
    /// A segment left the grid bounds.
    Wall,
    /// The head moved onto another segment of the worm.
    Body,
}

/// Lifecycle of a single world.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameState {
    /// No game has been started yet.
    #[default]
    Initial,
    /// A game is in progress and ticks advance the worm.
    Running,
    /// The last game ended in a collision and awaits a restart.
    GameOver,
}

/// Cardinal movement directions available to the worm.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
}

impl Direction {
    /// Every direction in a fixed order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit vector of the direction as `(dx, dy)`.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// Direction pointing the exact opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
///
/// Coordinates are signed so that a move past the grid edge is representable
/// and can be classified as a wall collision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    x: i32,
    y: i32,
}

impl Position {
    /// Creates a new grid position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Zero-based column of the position.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Zero-based row of the position.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Position one step away in the provided direction.
    #[must_use]
    pub const fn offset(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    /// Computes the Manhattan distance between two positions.
    #[must_use]
    pub fn manhattan_distance(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// Receives the notifications a tick can produce.
///
/// Implementations are called synchronously while the driver processes the
/// events of the tick that produced them.
pub trait Listener {
    /// The worm consumed a target.
    fn on_growth(&mut self);

    /// The worm collided and the game ended.
    fn on_game_over(&mut self);
}

/// Uniform integer source used for target placement.
pub trait RandomSource: std::fmt::Debug {
    /// Returns an integer in `low..high`. Callers guarantee `low < high`.
    fn random_int(&mut self, low: usize, high: usize) -> usize;
}
