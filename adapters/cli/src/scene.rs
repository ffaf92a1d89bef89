//! Translates world state into the scene consumed by rendering backends.

use std::time::Duration;

use anyhow::Result;
use matopeli_rendering::{
    Color, GridPresentation, OverlayPresentation, Scene, TargetPresentation, WormPresentation,
};
use matopeli_system_bootstrap::Bootstrap;
use matopeli_system_feedback::Cue;
use matopeli_world::{query, World};

const CELL_LENGTH: f32 = 1.0;

pub(crate) const CLEAR_COLOR: Color = Color::from_rgb_u8(235, 235, 235);
const GRID_COLOR: Color = Color::from_rgb_u8(255, 255, 255);
const HEAD_COLOR: Color = Color::from_rgb_u8(0, 0, 0);
const BODY_COLOR: Color = Color::from_rgb_u8(40, 40, 40);
const TARGET_COLOR: Color = Color::from_rgb_u8(200, 30, 30);
const OVERLAY_COLOR: Color = Color::from_rgb_u8(0, 0, 255);
const CHOMP_COLOR: Color = Color::from_rgb_u8(40, 180, 60);
const CRASH_COLOR: Color = Color::from_rgb_u8(220, 20, 20);

const CHOMP_DURATION: Duration = Duration::from_millis(120);
const CRASH_DURATION: Duration = Duration::from_millis(300);

/// Builds the first scene for `world`.
pub(crate) fn build_scene(world: &World, bootstrap: &Bootstrap) -> Result<Scene> {
    let (columns, rows) = query::dimensions(world);
    let grid = GridPresentation::new(columns, rows, CELL_LENGTH, GRID_COLOR)?;
    let worm = WormPresentation {
        segments: Vec::new(),
        head_color: HEAD_COLOR,
        body_color: BODY_COLOR,
    };
    let mut scene = Scene::new(grid, worm);
    scene.hints = bootstrap
        .controls()
        .iter()
        .map(|line| (*line).to_owned())
        .collect();
    refresh(&mut scene, world, bootstrap, None);
    Ok(scene)
}

/// Copies the dynamic parts of `world` into `scene`.
pub(crate) fn refresh(
    scene: &mut Scene,
    world: &World,
    bootstrap: &Bootstrap,
    flash: Option<Color>,
) {
    scene.worm.segments.clear();
    scene.worm.segments.extend_from_slice(query::worm(world));
    scene.target = query::target(world).map(|cell| TargetPresentation {
        cell,
        color: TARGET_COLOR,
    });
    scene.score = query::score(world);
    scene.overlay = bootstrap.overlay(world).map(|overlay| OverlayPresentation {
        headline: overlay.headline,
        detail: overlay.detail,
        color: OVERLAY_COLOR,
    });
    scene.flash = flash;
}

/// Short-lived tint triggered by feedback cues.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Flash {
    active: Option<(Color, Duration)>,
}

impl Flash {
    /// Starts the tint for `cue`, replacing any tint still showing.
    pub(crate) fn trigger(&mut self, cue: Cue) {
        self.active = Some(match cue {
            Cue::Chomp => (CHOMP_COLOR, CHOMP_DURATION),
            Cue::Crash => (CRASH_COLOR, CRASH_DURATION),
        });
    }

    /// Advances the timer by `dt` and returns the tint to show this frame.
    pub(crate) fn advance(&mut self, dt: Duration) -> Option<Color> {
        let (color, remaining) = self.active?;
        match remaining.checked_sub(dt) {
            Some(left) if !left.is_zero() => {
                self.active = Some((color, left));
                Some(color)
            }
            _ => {
                self.active = None;
                None
            }
        }
    }
}
