#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Matopeli.
//!
//! The [`World`] owns the worm, the queued turns, the target and the game
//! lifecycle. Drivers mutate it exclusively through [`apply`] and observe it
//! through the read-only [`query`] functions.

use std::collections::{HashSet, VecDeque};

use matopeli_core::{Collision, Command, Direction, Event, GameState, Position, RandomSource};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{debug, info};

const DEFAULT_GRID_WIDTH: u32 = 30;
const DEFAULT_GRID_HEIGHT: u32 = 20;
const DEFAULT_TARGET_SEED: u64 = 0x6d61_746f_7065_6c69;

const SPAWN_DIRECTION: Direction = Direction::Right;

/// Largest grid edge that still fits signed cell coordinates.
pub const MAX_GRID_DIMENSION: u32 = i32::MAX as u32;

/// Largest number of cells a grid may hold.
///
/// Target placement scans every cell, so the whole grid must fit in memory.
pub const MAX_GRID_CELLS: u64 = 1 << 22;

/// Dimensions of the bounded grid the worm lives on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorldConfig {
    width: u32,
    height: u32,
}

impl WorldConfig {
    /// Validates and creates a grid description.
    pub fn new(width: u32, height: u32) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::EmptyGrid { width, height });
        }
        for value in [width, height] {
            if value > MAX_GRID_DIMENSION {
                return Err(ConfigError::TooLarge {
                    value,
                    max: MAX_GRID_DIMENSION,
                });
            }
        }
        let cells = u64::from(width) * u64::from(height);
        if cells > MAX_GRID_CELLS {
            return Err(ConfigError::TooManyCells {
                cells,
                max: MAX_GRID_CELLS,
            });
        }

        Ok(Self { width, height })
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether the position lies inside `[0, width) x [0, height)`.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        u32::try_from(position.x()).map_or(false, |x| x < self.width)
            && u32::try_from(position.y()).map_or(false, |y| y < self.height)
    }

    /// Cell where a fresh game places its single starting segment.
    #[must_use]
    pub fn spawn_position(&self) -> Position {
        Position::new((self.width / 2) as i32, (self.height / 2) as i32)
    }

    fn index(&self, position: Position) -> Option<usize> {
        if !self.contains(position) {
            return None;
        }
        let x = usize::try_from(position.x()).ok()?;
        let y = usize::try_from(position.y()).ok()?;
        let width = usize::try_from(self.width).ok()?;
        Some(y * width + x)
    }

    fn cell_count(&self) -> usize {
        let cells = u64::from(self.width) * u64::from(self.height);
        usize::try_from(cells).unwrap_or(usize::MAX)
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_GRID_WIDTH,
            height: DEFAULT_GRID_HEIGHT,
        }
    }
}

/// Reasons a grid description may be rejected.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// At least one dimension was zero.
    #[error("grid dimensions must be positive (received {width}x{height})")]
    EmptyGrid {
        /// Requested number of columns.
        width: u32,
        /// Requested number of rows.
        height: u32,
    },
    /// A dimension does not fit signed cell coordinates.
    #[error("grid dimension {value} exceeds the supported maximum of {max}")]
    TooLarge {
        /// Offending dimension.
        value: u32,
        /// Largest accepted dimension.
        max: u32,
    },
    /// The grid holds more cells than target placement can scan.
    #[error("grid of {cells} cells exceeds the supported maximum of {max}")]
    TooManyCells {
        /// Requested cell count.
        cells: u64,
        /// Largest accepted cell count.
        max: u64,
    },
}

/// Explicit mid-game arrangement used to resume a world in a known state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WormLayout {
    /// Worm segments, head first.
    pub worm: Vec<Position>,
    /// Direction the worm is currently heading.
    pub direction: Direction,
    /// Cell holding the target, if any.
    pub target: Option<Position>,
}

/// Reasons a [`WormLayout`] may be rejected.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    /// The layout contained no segments.
    #[error("worm layout must contain at least one segment")]
    EmptyWorm,
    /// A segment lies outside the grid.
    #[error("worm segment {segment:?} lies outside the grid")]
    SegmentOutOfBounds {
        /// Offending segment.
        segment: Position,
    },
    /// Two segments share a cell.
    #[error("worm segment {segment:?} appears more than once")]
    OverlappingSegments {
        /// Cell covered twice.
        segment: Position,
    },
    /// The target lies outside the grid.
    #[error("target {target:?} lies outside the grid")]
    TargetOutOfBounds {
        /// Offending target.
        target: Position,
    },
    /// The target shares a cell with the worm.
    #[error("target {target:?} is covered by the worm")]
    TargetOnWorm {
        /// Offending target.
        target: Position,
    },
}

/// Seedable ChaCha-backed [`RandomSource`].
#[derive(Clone, Debug)]
pub struct SeededRandom {
    rng: ChaCha8Rng,
}

impl SeededRandom {
    /// Creates a source whose sequence is fully determined by `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn random_int(&mut self, low: usize, high: usize) -> usize {
        self.rng.gen_range(low..high)
    }
}

/// Represents the authoritative Matopeli world state.
#[derive(Debug)]
pub struct World {
    config: WorldConfig,
    worm: Vec<Position>,
    direction: Direction,
    pending_moves: VecDeque<Direction>,
    target: Option<Position>,
    score: u32,
    state: GameState,
    tick_index: u64,
    random: Box<dyn RandomSource>,
}

impl World {
    /// Creates a world on the default grid with a fixed target seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(
            WorldConfig::default(),
            Box::new(SeededRandom::new(DEFAULT_TARGET_SEED)),
        )
    }

    /// Creates a world in the initial state on the provided grid.
    #[must_use]
    pub fn with_config(config: WorldConfig, random: Box<dyn RandomSource>) -> Self {
        Self {
            config,
            worm: Vec::new(),
            direction: SPAWN_DIRECTION,
            pending_moves: VecDeque::new(),
            target: None,
            score: 0,
            state: GameState::Initial,
            tick_index: 0,
            random,
        }
    }

    /// Creates a running world from an explicit arrangement.
    ///
    /// The score is derived from the worm length so the length invariant
    /// holds from the first tick.
    pub fn from_layout(
        config: WorldConfig,
        layout: WormLayout,
        random: Box<dyn RandomSource>,
    ) -> Result<Self, LayoutError> {
        validate_layout(&config, &layout)?;

        let score = u32::try_from(layout.worm.len() - 1).unwrap_or(u32::MAX);
        let mut world = Self::with_config(config, random);
        world.worm = layout.worm;
        world.direction = layout.direction;
        world.target = layout.target;
        world.score = score;
        world.state = GameState::Running;
        Ok(world)
    }

    fn start(&mut self, out_events: &mut Vec<Event>) {
        if self.state == GameState::Running {
            debug!("start ignored while a game is running");
            return;
        }

        let head = self.config.spawn_position();
        self.worm = vec![head];
        self.direction = SPAWN_DIRECTION;
        self.pending_moves.clear();
        self.score = 0;
        self.tick_index = 0;
        self.state = GameState::Running;
        self.place_target();

        info!(
            width = self.config.width(),
            height = self.config.height(),
            "game started"
        );
        out_events.push(Event::GameStarted {
            head,
            target: self.target,
        });
    }

    fn tick(&mut self, out_events: &mut Vec<Event>) {
        if self.state != GameState::Running {
            return;
        }
        let Some(&old_tail) = self.worm.last() else {
            return;
        };

        self.tick_index = self.tick_index.saturating_add(1);
        self.resolve_direction();

        let mut body = advance(&self.worm, self.direction);
        let head = body[0];

        let collision = if rules::hits_walls(&body, &self.config) {
            Some(Collision::Wall)
        } else if rules::hits_self(&body) {
            Some(Collision::Body)
        } else {
            None
        };

        if let Some(collision) = collision {
            self.state = GameState::GameOver;
            info!(
                score = self.score,
                tick = self.tick_index,
                ?collision,
                "game over"
            );
            out_events.push(Event::GameOver {
                score: self.score,
                collision,
            });
            return;
        }

        if rules::hits_target(head, self.target) {
            body.push(old_tail);
            self.worm = body;
            self.score = self.score.saturating_add(1);
            self.place_target();
            debug!(score = self.score, ?head, "worm grew");
            out_events.push(Event::WormGrew {
                score: self.score,
                head,
            });
            return;
        }

        self.worm = body;
    }

    fn resolve_direction(&mut self) {
        while let Some(candidate) = self.pending_moves.pop_front() {
            if rules::is_legal_turn(self.direction, candidate, self.worm.len()) {
                self.direction = candidate;
                break;
            }
        }
        self.pending_moves.clear();
    }

    fn place_target(&mut self) {
        let free = free_cells(&self.config, &self.worm);
        self.target = if free.is_empty() {
            None
        } else {
            let index = self.random.random_int(0, free.len());
            debug_assert!(index < free.len(), "random source returned {index}");
            free.get(index).or(free.last()).copied()
        };
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// A tick emits at most one event. Every mutation is committed before this
/// function returns.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Start => world.start(out_events),
        Command::ChangeDirection { direction } => world.pending_moves.push_back(direction),
        Command::Tick => world.tick(out_events),
    }
}

/// Pure geometric predicates used by the simulation step.
pub mod rules {
    use std::collections::HashSet;

    use matopeli_core::{Direction, Position};

    use super::WorldConfig;

    /// Reports whether any segment lies outside the grid.
    #[must_use]
    pub fn hits_walls(body: &[Position], config: &WorldConfig) -> bool {
        body.iter().any(|segment| !config.contains(*segment))
    }

    /// Reports whether the head shares a cell with any later segment.
    #[must_use]
    pub fn hits_self(body: &[Position]) -> bool {
        match body.split_first() {
            Some((head, rest)) => rest.contains(head),
            None => false,
        }
    }

    /// Reports whether the head lands on the target.
    #[must_use]
    pub fn hits_target(head: Position, target: Option<Position>) -> bool {
        target == Some(head)
    }

    /// Reports whether `candidate` may replace `current` for a worm of `length`.
    ///
    /// Only an exact reversal of a worm longer than one segment is illegal.
    #[must_use]
    pub fn is_legal_turn(current: Direction, candidate: Direction, length: usize) -> bool {
        !(candidate == current.opposite() && length > 1)
    }

    /// First segment that revisits a cell already covered by the body.
    #[must_use]
    pub fn first_overlap(body: &[Position]) -> Option<Position> {
        let mut seen = HashSet::with_capacity(body.len());
        body.iter().copied().find(|segment| !seen.insert(*segment))
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use matopeli_core::{Direction, GameState, Position};

    use super::{World, WorldConfig};

    /// Grid description the world was created with.
    #[must_use]
    pub fn config(world: &World) -> WorldConfig {
        world.config
    }

    /// Grid dimensions as `(width, height)`.
    #[must_use]
    pub fn dimensions(world: &World) -> (u32, u32) {
        (world.config.width(), world.config.height())
    }

    /// Worm segments, head first. Empty before the first start.
    #[must_use]
    pub fn worm(world: &World) -> &[Position] {
        &world.worm
    }

    /// Cell occupied by the head, if the worm exists.
    #[must_use]
    pub fn head(world: &World) -> Option<Position> {
        world.worm.first().copied()
    }

    /// Cell holding the target, absent when the worm fills the grid.
    #[must_use]
    pub fn target(world: &World) -> Option<Position> {
        world.target
    }

    /// Number of targets consumed this game.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.score
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(world: &World) -> GameState {
        world.state
    }

    /// Direction committed by the last tick.
    #[must_use]
    pub fn direction(world: &World) -> Direction {
        world.direction
    }

    /// Turns queued since the last tick, oldest first.
    pub fn pending_moves(world: &World) -> impl Iterator<Item = Direction> + '_ {
        world.pending_moves.iter().copied()
    }

    /// Number of ticks completed in the current game.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Reports whether the next tick would accept `candidate` as a turn.
    #[must_use]
    pub fn is_legal_turn(world: &World, candidate: Direction) -> bool {
        super::rules::is_legal_turn(world.direction, candidate, world.worm.len())
    }
}

fn advance(worm: &[Position], direction: Direction) -> Vec<Position> {
    let mut body = Vec::with_capacity(worm.len() + 1);
    if let Some(head) = worm.first() {
        body.push(head.offset(direction));
        body.extend_from_slice(&worm[..worm.len() - 1]);
    }
    body
}

fn free_cells(config: &WorldConfig, worm: &[Position]) -> Vec<Position> {
    let mut occupied = vec![false; config.cell_count()];
    for segment in worm {
        if let Some(slot) = config.index(*segment).and_then(|index| occupied.get_mut(index)) {
            *slot = true;
        }
    }

    let mut free = Vec::with_capacity(occupied.len().saturating_sub(worm.len()));
    for y in 0..config.height() {
        for x in 0..config.width() {
            let cell = Position::new(x as i32, y as i32);
            let taken = config
                .index(cell)
                .and_then(|index| occupied.get(index).copied())
                .unwrap_or(true);
            if !taken {
                free.push(cell);
            }
        }
    }
    free
}

fn validate_layout(config: &WorldConfig, layout: &WormLayout) -> Result<(), LayoutError> {
    if layout.worm.is_empty() {
        return Err(LayoutError::EmptyWorm);
    }
    if let Some(segment) = layout
        .worm
        .iter()
        .copied()
        .find(|segment| !config.contains(*segment))
    {
        return Err(LayoutError::SegmentOutOfBounds { segment });
    }
    if let Some(segment) = rules::first_overlap(&layout.worm) {
        return Err(LayoutError::OverlappingSegments { segment });
    }
    if let Some(target) = layout.target {
        if !config.contains(target) {
            return Err(LayoutError::TargetOutOfBounds { target });
        }
        let covered: HashSet<Position> = layout.worm.iter().copied().collect();
        if covered.contains(&target) {
            return Err(LayoutError::TargetOnWorm { target });
        }
    }
    Ok(())
}
