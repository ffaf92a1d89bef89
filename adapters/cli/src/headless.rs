//! Windowless runs steered by a greedy autopilot.

use matopeli_core::{Collision, Command, Direction, Event, GameState, Listener, Position};
use matopeli_system_feedback::dispatch;
use matopeli_world::{apply, query, SeededRandom, World, WorldConfig};
use serde::Serialize;
use tracing::{debug, info};

/// Outcome of a headless run, printed as JSON.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub(crate) struct Summary {
    pub(crate) seed: u64,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) ticks: u64,
    pub(crate) score: u32,
    pub(crate) worm_length: usize,
    pub(crate) state: GameState,
    pub(crate) collision: Option<Collision>,
    pub(crate) growths: u32,
}

#[derive(Debug, Default)]
struct Tally {
    growths: u32,
    game_overs: u32,
}

impl Listener for Tally {
    fn on_growth(&mut self) {
        self.growths += 1;
    }

    fn on_game_over(&mut self) {
        self.game_overs += 1;
    }
}

/// Plays one game for at most `max_ticks` ticks.
pub(crate) fn run(config: WorldConfig, seed: u64, max_ticks: u64) -> Summary {
    let mut world = World::with_config(config, Box::new(SeededRandom::new(seed)));
    let mut tally = Tally::default();
    let mut collision = None;
    let mut events = Vec::new();

    apply(&mut world, Command::Start, &mut events);
    while query::state(&world) == GameState::Running && query::tick_index(&world) < max_ticks {
        events.clear();
        let direction = choose_direction(&world);
        apply(&mut world, Command::ChangeDirection { direction }, &mut events);
        apply(&mut world, Command::Tick, &mut events);
        dispatch(&events, &mut tally);
        for event in &events {
            if let Event::GameOver { collision: hit, .. } = event {
                collision = Some(*hit);
            }
        }
    }

    if tally.game_overs > 0 {
        debug!(?collision, "autopilot crashed");
    }
    let summary = Summary {
        seed,
        width: config.width(),
        height: config.height(),
        ticks: query::tick_index(&world),
        score: query::score(&world),
        worm_length: query::worm(&world).len(),
        state: query::state(&world),
        collision,
        growths: tally.growths,
    };
    info!(score = summary.score, ticks = summary.ticks, "headless run finished");
    summary
}

/// Picks the legal direction whose next cell is free and closest to the target.
///
/// Falls back to the current heading when every move is fatal.
fn choose_direction(world: &World) -> Direction {
    let current = query::direction(world);
    let Some(head) = query::head(world) else {
        return current;
    };
    let config = query::config(world);
    let worm = query::worm(world);
    let body = &worm[..worm.len().saturating_sub(1)];
    let target = query::target(world);

    Direction::ALL
        .into_iter()
        .filter(|candidate| query::is_legal_turn(world, *candidate))
        .map(|candidate| (candidate, head.offset(candidate)))
        .filter(|(_, next)| config.contains(*next) && !body.contains(next))
        .min_by_key(|(candidate, next)| (distance(*next, target), *candidate != current))
        .map_or(current, |(candidate, _)| candidate)
}

fn distance(cell: Position, target: Option<Position>) -> u32 {
    target.map_or(0, |target| cell.manhattan_distance(target))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(width: u32, height: u32) -> WorldConfig {
        WorldConfig::new(width, height).expect("valid grid")
    }

    #[test]
    fn same_seed_produces_identical_summary() {
        let first = run(config(12, 9), 17, 400);
        let second = run(config(12, 9), 17, 400);
        assert_eq!(first, second);
    }

    #[test]
    fn autopilot_collects_targets() {
        let summary = run(config(30, 20), 7, 200);
        assert!(summary.score >= 1, "autopilot never reached a target: {summary:?}");
        assert_eq!(summary.growths, summary.score);
    }

    #[test]
    fn summary_respects_length_invariant() {
        for seed in 0..8 {
            let summary = run(config(6, 5), seed, 2_000);
            assert_eq!(summary.worm_length, summary.score as usize + 1);
            assert!(summary.ticks <= 2_000);
            if summary.state == GameState::GameOver {
                assert!(summary.collision.is_some());
            } else {
                assert_eq!(summary.collision, None);
            }
        }
    }

    #[test]
    fn tick_budget_is_honoured() {
        let summary = run(config(30, 20), 3, 5);
        assert_eq!(summary.ticks, 5);
        assert_eq!(summary.state, GameState::Running);
    }
}
