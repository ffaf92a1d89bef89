#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that prepares the texts of the Matopeli shell.

use matopeli_core::{GameState, GAME_TITLE};
use matopeli_world::{query, World};

const INTRO: &str = "Kerää palloja törmäämättä mihinkään";
const CONTROLS: [&str; 2] = ["Käänny: ← ↑ → ↓", "Uusi peli: välilyönti"];
const GAME_OVER_HEADLINE: &str = "Game Over";

/// Centered text block drawn above the grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Overlay {
    /// Large first line.
    pub headline: String,
    /// Smaller second line.
    pub detail: String,
}

/// Produces data required to greet the player.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Title of the game window.
    #[must_use]
    pub fn title(&self) -> &'static str {
        GAME_TITLE
    }

    /// One-line description of the goal.
    #[must_use]
    pub fn intro(&self) -> &'static str {
        INTRO
    }

    /// Control hints, one per line.
    #[must_use]
    pub fn controls(&self) -> &'static [&'static str] {
        &CONTROLS
    }

    /// Overlay shown for the current lifecycle state, if any.
    #[must_use]
    pub fn overlay(&self, world: &World) -> Option<Overlay> {
        match query::state(world) {
            GameState::Initial => Some(Overlay {
                headline: GAME_TITLE.to_owned(),
                detail: INTRO.to_owned(),
            }),
            GameState::Running => None,
            GameState::GameOver => Some(Overlay {
                headline: GAME_OVER_HEADLINE.to_owned(),
                detail: format!("Score: {}", query::score(world)),
            }),
        }
    }
}
