#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots Matopeli.

mod headless;
mod scene;
mod settings;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use matopeli_core::Command;
use matopeli_rendering::{Presentation, RenderingBackend};
use matopeli_rendering_macroquad::MacroquadBackend;
use matopeli_system_bootstrap::Bootstrap;
use matopeli_system_feedback::Feedback;
use matopeli_system_pacing::Pacing;
use matopeli_world::{self as world, query, SeededRandom, World};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    scene::Flash,
    settings::{GameSettings, Overrides, Resolved},
};

/// Command-line arguments for Matopeli.
#[derive(Debug, Parser)]
#[command(name = "matopeli", version, about = "Grid worm game")]
struct CliArgs {
    /// TOML file with game settings.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Grid columns.
    #[arg(long)]
    width: Option<u32>,
    /// Grid rows.
    #[arg(long)]
    height: Option<u32>,
    /// Simulation ticks per second.
    #[arg(long, value_name = "HZ")]
    simulation_hz: Option<u32>,
    /// Upper bound on rendered frames per second.
    #[arg(long, value_name = "HZ")]
    render_hz: Option<u32>,
    /// Seed for target placement.
    #[arg(long)]
    seed: Option<u64>,
    /// Enables or disables vertical sync.
    #[arg(long, value_name = "BOOL")]
    vsync: Option<bool>,
    /// Logs the frame rate once per second.
    #[arg(long)]
    show_fps: bool,
    /// Runs the autopilot without a window and prints a JSON summary.
    #[arg(long)]
    headless: bool,
    /// Tick budget for headless runs.
    #[arg(long, default_value_t = 1_000)]
    ticks: u64,
}

impl CliArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            width: self.width,
            height: self.height,
            simulation_hz: self.simulation_hz,
            render_hz: self.render_hz,
            seed: self.seed,
            vsync: self.vsync,
        }
    }
}

/// Entry point for the Matopeli command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = CliArgs::parse();

    let mut settings = GameSettings::load(args.config.as_deref())?;
    settings.apply_overrides(&args.overrides());
    let resolved = settings.resolve()?;
    let seed = settings.seed.unwrap_or_else(rand::random);
    info!(
        seed,
        width = resolved.world.width(),
        height = resolved.world.height(),
        simulation_hz = settings.simulation_hz,
        render_hz = resolved.render_hz,
        "settings resolved"
    );

    if args.headless {
        let summary = headless::run(resolved.world, seed, args.ticks);
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    run_windowed(resolved, seed, args.show_fps)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run_windowed(resolved: Resolved, seed: u64, show_fps: bool) -> Result<()> {
    let bootstrap = Bootstrap;
    let mut world = World::with_config(resolved.world, Box::new(SeededRandom::new(seed)));
    let mut pacing = Pacing::new(resolved.pacing);
    let mut feedback = Feedback::new();
    let mut flash = Flash::default();
    let mut events = Vec::new();
    let mut ticks = Vec::new();

    let scene = scene::build_scene(&world, &bootstrap)?;
    let presentation = Presentation::new(bootstrap.title(), scene::CLEAR_COLOR, scene);
    let backend = MacroquadBackend::new()
        .with_vsync(resolved.vsync)
        .with_target_frame_rate(Some(resolved.render_hz))
        .with_show_fps(show_fps);

    backend.run(presentation, move |dt, input, scene| {
        events.clear();
        if input.start_requested {
            world::apply(&mut world, Command::Start, &mut events);
        }
        for direction in input.directions {
            world::apply(&mut world, Command::ChangeDirection { direction }, &mut events);
        }

        ticks.clear();
        pacing.handle(dt, query::state(&world), &mut ticks);
        for command in ticks.drain(..) {
            world::apply(&mut world, command, &mut events);
        }

        feedback.handle(&events);
        for cue in feedback.drain_cues() {
            flash.trigger(cue);
        }
        let tint = flash.advance(dt);
        scene::refresh(scene, &world, &bootstrap, tint);
    })
}
