#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Matopeli.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment, so
//! the dependency is declared without its default `audio` feature. Feedback
//! cues are therefore shown as a short tint over the play area.

use anyhow::Result;
use glam::Vec2;
use macroquad::input::{is_key_pressed, KeyCode};
use matopeli_core::Direction;
use matopeli_rendering::{
    Color, FrameInput, OverlayPresentation, Presentation, RenderingBackend, Scene,
};
use std::time::{Duration, Instant};
use tracing::info;

const HUD_FONT_SIZE: f32 = 28.0;
const HINT_FONT_SIZE: f32 = 20.0;
const HEADLINE_FONT_SIZE: f32 = 48.0;
const DETAIL_FONT_SIZE: f32 = 22.0;
const HUD_BAND: f32 = 40.0;
const HINT_LINE_HEIGHT: f32 = 24.0;
const FLASH_ALPHA: f32 = 0.25;

/// Keys mapped to directions, checked in this order every frame.
const DIRECTION_KEYS: [(KeyCode, Direction); 8] = [
    (KeyCode::Up, Direction::Up),
    (KeyCode::Down, Direction::Down),
    (KeyCode::Left, Direction::Left),
    (KeyCode::Right, Direction::Right),
    (KeyCode::W, Direction::Up),
    (KeyCode::S, Direction::Down),
    (KeyCode::A, Direction::Left),
    (KeyCode::D, Direction::Right),
];

/// Snapshot of edge-triggered keys observed during a single frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct KeyboardObservations {
    quit_requested: bool,
    start_requested: bool,
    pressed_directions: Vec<KeyCode>,
}

impl KeyboardObservations {
    fn poll() -> Self {
        Self {
            quit_requested: is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q),
            start_requested: is_key_pressed(KeyCode::Space),
            pressed_directions: DIRECTION_KEYS
                .iter()
                .map(|(key, _)| *key)
                .filter(|key| is_key_pressed(*key))
                .collect(),
        }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    target_frame_rate: Option<u32>,
    show_fps: bool,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Caps presentation at the provided number of frames per second.
    ///
    /// The cap sleeps the render thread at the end of a fast frame, so the
    /// macroquad loop blocks there instead of yielding.
    #[must_use]
    pub fn with_target_frame_rate(mut self, frames_per_second: Option<u32>) -> Self {
        self.target_frame_rate = frames_per_second.filter(|rate| *rate > 0);
        self
    }

    /// Configures whether the backend logs frame timing once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            target_frame_rate,
            show_fps,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: 960,
            window_height: 720,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        let frame_budget = target_frame_rate.map(|rate| Duration::from_secs(1) / rate);

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();

            loop {
                let frame_start = Instant::now();
                let keyboard = KeyboardObservations::poll();
                if keyboard.quit_requested {
                    break;
                }

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                update_scene(frame_dt, frame_input_from_observations(&keyboard), &mut scene);

                macroquad::window::clear_background(background);
                let metrics = SceneMetrics::from_scene(
                    &scene,
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );
                draw_scene(&scene, &metrics);

                if let Some(per_second) = fps_counter.record_frame(frame_dt) {
                    if show_fps {
                        info!(fps = per_second, "frame rate");
                    }
                }

                if let Some(pause) = frame_pause(frame_budget, frame_start.elapsed()) {
                    std::thread::sleep(pause);
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

/// Time left in the frame budget after `spent`, if any.
fn frame_pause(budget: Option<Duration>, spent: Duration) -> Option<Duration> {
    budget?
        .checked_sub(spent)
        .filter(|remaining| !remaining.is_zero())
}

fn frame_input_from_observations(observations: &KeyboardObservations) -> FrameInput {
    let directions = observations
        .pressed_directions
        .iter()
        .filter_map(|pressed| {
            DIRECTION_KEYS
                .iter()
                .find(|(key, _)| key == pressed)
                .map(|(_, direction)| *direction)
        })
        .collect();

    FrameInput {
        directions,
        start_requested: observations.start_requested,
    }
}

/// Screen-space layout of the grid within the window.
#[derive(Clone, Copy, Debug, PartialEq)]
struct SceneMetrics {
    scale: f32,
    grid_origin: Vec2,
    grid_size: Vec2,
    cell_step: f32,
}

impl SceneMetrics {
    fn from_scene(scene: &Scene, screen_width: f32, screen_height: f32) -> Self {
        let grid = scene.grid;
        let hint_band = scene.hints.len() as f32 * HINT_LINE_HEIGHT;
        let available = Vec2::new(
            screen_width.max(0.0),
            (screen_height - HUD_BAND - hint_band).max(0.0),
        );

        let world_size = Vec2::new(grid.width(), grid.height());
        let scale = if world_size.x <= f32::EPSILON || world_size.y <= f32::EPSILON {
            1.0
        } else {
            (available.x / world_size.x).min(available.y / world_size.y)
        };

        let grid_size = world_size * scale;
        let grid_origin = Vec2::new(
            ((available.x - grid_size.x) * 0.5).max(0.0),
            HUD_BAND + ((available.y - grid_size.y) * 0.5).max(0.0),
        );

        Self {
            scale,
            grid_origin,
            grid_size,
            cell_step: grid.cell_length * scale,
        }
    }

    fn to_screen(&self, world_position: Vec2) -> Vec2 {
        self.grid_origin + world_position * self.scale
    }
}

fn draw_scene(scene: &Scene, metrics: &SceneMetrics) {
    let grid = scene.grid;
    macroquad::shapes::draw_rectangle(
        metrics.grid_origin.x,
        metrics.grid_origin.y,
        metrics.grid_size.x,
        metrics.grid_size.y,
        to_macroquad_color(grid.background),
    );

    if let Some(target) = scene.target {
        if let Some(center) = grid.cell_center(target.cell) {
            let center = metrics.to_screen(center);
            macroquad::shapes::draw_circle(
                center.x,
                center.y,
                metrics.cell_step * 0.4,
                to_macroquad_color(target.color),
            );
        }
    }

    for (index, segment) in scene.worm.segments.iter().enumerate() {
        let Some(origin) = grid.cell_origin(*segment) else {
            continue;
        };
        let origin = metrics.to_screen(origin);
        let color = if index == 0 {
            scene.worm.head_color
        } else {
            scene.worm.body_color
        };
        macroquad::shapes::draw_rectangle(
            origin.x,
            origin.y,
            metrics.cell_step,
            metrics.cell_step,
            to_macroquad_color(color),
        );
    }

    if let Some(flash) = scene.flash {
        let tint = Color { alpha: FLASH_ALPHA, ..flash };
        macroquad::shapes::draw_rectangle(
            metrics.grid_origin.x,
            metrics.grid_origin.y,
            metrics.grid_size.x,
            metrics.grid_size.y,
            to_macroquad_color(tint),
        );
    }

    let score_line = format!("Score: {}", scene.score);
    macroquad::text::draw_text(
        &score_line,
        metrics.grid_origin.x,
        HUD_BAND * 0.75,
        HUD_FONT_SIZE,
        macroquad::color::BLACK,
    );

    let hint_top = metrics.grid_origin.y + metrics.grid_size.y;
    for (line, hint) in scene.hints.iter().enumerate() {
        macroquad::text::draw_text(
            hint,
            metrics.grid_origin.x,
            hint_top + HINT_LINE_HEIGHT * (line as f32 + 1.0),
            HINT_FONT_SIZE,
            macroquad::color::DARKGRAY,
        );
    }

    if let Some(overlay) = &scene.overlay {
        draw_overlay(overlay, metrics);
    }
}

fn draw_overlay(overlay: &OverlayPresentation, metrics: &SceneMetrics) {
    let center = metrics.grid_origin + metrics.grid_size * 0.5;
    let color = to_macroquad_color(overlay.color);

    let headline = macroquad::text::measure_text(
        &overlay.headline,
        None,
        HEADLINE_FONT_SIZE as u16,
        1.0,
    );
    macroquad::text::draw_text(
        &overlay.headline,
        center.x - headline.width * 0.5,
        center.y,
        HEADLINE_FONT_SIZE,
        color,
    );

    let detail = macroquad::text::measure_text(&overlay.detail, None, DETAIL_FONT_SIZE as u16, 1.0);
    macroquad::text::draw_text(
        &overlay.detail,
        center.x - detail.width * 0.5,
        center.y + 36.0,
        DETAIL_FONT_SIZE,
        color,
    );
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

/// Tracks the average frames-per-second produced by the render loop.
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
}

impl FpsCounter {
    /// Records a rendered frame and returns the average rate once one second has elapsed.
    fn record_frame(&mut self, frame: Duration) -> Option<f32> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let per_second = self.frames as f32 / seconds;
        self.elapsed = Duration::ZERO;
        self.frames = 0;
        Some(per_second)
    }
}
