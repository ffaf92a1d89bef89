//! Game settings loaded from an optional TOML file and refined by flags.

use std::{fs, path::Path};

use anyhow::{ensure, Context, Result};
use matopeli_system_pacing::Config as PacingConfig;
use matopeli_world::WorldConfig;
use serde::Deserialize;

const DEFAULT_WIDTH: u32 = 30;
const DEFAULT_HEIGHT: u32 = 20;
const DEFAULT_SIMULATION_HZ: u32 = 10;
const DEFAULT_RENDER_HZ: u32 = 60;

/// Settings recognised in the configuration file.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameSettings {
    /// Grid columns.
    pub(crate) width: u32,
    /// Grid rows.
    pub(crate) height: u32,
    /// Simulation ticks per second.
    pub(crate) simulation_hz: u32,
    /// Upper bound on rendered frames per second.
    pub(crate) render_hz: u32,
    /// Seed of the target placement stream; drawn from entropy when absent.
    pub(crate) seed: Option<u64>,
    /// Whether presentation waits for the display refresh.
    pub(crate) vsync: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            simulation_hz: DEFAULT_SIMULATION_HZ,
            render_hz: DEFAULT_RENDER_HZ,
            seed: None,
            vsync: true,
        }
    }
}

/// Values supplied on the command line that take precedence over the file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Overrides {
    pub(crate) width: Option<u32>,
    pub(crate) height: Option<u32>,
    pub(crate) simulation_hz: Option<u32>,
    pub(crate) render_hz: Option<u32>,
    pub(crate) seed: Option<u64>,
    pub(crate) vsync: Option<bool>,
}

/// Validated settings ready to build the world and the pacing system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Resolved {
    pub(crate) world: WorldConfig,
    pub(crate) pacing: PacingConfig,
    pub(crate) render_hz: u32,
    pub(crate) vsync: bool,
}

impl GameSettings {
    /// Reads settings from `path`, or returns the defaults when no path is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("config file {} is not valid", path.display()))
    }

    /// Parses settings from TOML text. Missing keys keep their defaults.
    pub(crate) fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse settings TOML")
    }

    /// Replaces every value that was given on the command line.
    pub(crate) fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(width) = overrides.width {
            self.width = width;
        }
        if let Some(height) = overrides.height {
            self.height = height;
        }
        if let Some(simulation_hz) = overrides.simulation_hz {
            self.simulation_hz = simulation_hz;
        }
        if let Some(render_hz) = overrides.render_hz {
            self.render_hz = render_hz;
        }
        if overrides.seed.is_some() {
            self.seed = overrides.seed;
        }
        if let Some(vsync) = overrides.vsync {
            self.vsync = vsync;
        }
    }

    /// Validates the settings and converts them into simulation configs.
    pub(crate) fn resolve(&self) -> Result<Resolved> {
        let world = WorldConfig::new(self.width, self.height).context("invalid grid size")?;
        let pacing = PacingConfig::from_hertz(self.simulation_hz)
            .context("simulation_hz must be greater than zero")?;
        ensure!(self.render_hz > 0, "render_hz must be greater than zero");

        Ok(Resolved {
            world,
            pacing,
            render_hz: self.render_hz,
            vsync: self.vsync,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn defaults_match_classic_board() {
        let settings = GameSettings::default();
        assert_eq!((settings.width, settings.height), (30, 20));
        assert_eq!(settings.simulation_hz, 10);
        assert_eq!(settings.render_hz, 60);
        assert_eq!(settings.seed, None);
        assert!(settings.vsync);
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let settings = GameSettings::from_toml("width = 12\nseed = 99\n").expect("valid toml");
        assert_eq!(settings.width, 12);
        assert_eq!(settings.height, 20);
        assert_eq!(settings.seed, Some(99));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(GameSettings::from_toml("speed = 3\n").is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let error = GameSettings::load(Some(Path::new("/nonexistent/matopeli.toml")))
            .expect_err("missing file must fail");
        assert!(format!("{error:#}").contains("/nonexistent/matopeli.toml"));
    }

    #[test]
    fn overrides_take_precedence() {
        let mut settings = GameSettings::from_toml("width = 12\nvsync = true\n").expect("valid");
        settings.apply_overrides(&Overrides {
            width: Some(8),
            vsync: Some(false),
            seed: Some(5),
            ..Overrides::default()
        });
        assert_eq!(settings.width, 8);
        assert!(!settings.vsync);
        assert_eq!(settings.seed, Some(5));
        assert_eq!(settings.height, 20);
    }

    #[test]
    fn resolve_builds_configs() {
        let resolved = GameSettings::default().resolve().expect("defaults are valid");
        assert_eq!(resolved.world.width(), 30);
        assert_eq!(resolved.world.height(), 20);
        assert_eq!(resolved.pacing.tick_interval(), Duration::from_millis(100));
        assert_eq!(resolved.render_hz, 60);
        assert!(resolved.vsync);
    }

    #[test]
    fn resolve_rejects_degenerate_values() {
        for settings in [
            GameSettings {
                width: 0,
                ..GameSettings::default()
            },
            GameSettings {
                simulation_hz: 0,
                ..GameSettings::default()
            },
            GameSettings {
                render_hz: 0,
                ..GameSettings::default()
            },
            GameSettings {
                width: i32::MAX as u32,
                height: i32::MAX as u32,
                ..GameSettings::default()
            },
        ] {
            assert!(settings.resolve().is_err(), "{settings:?} should be rejected");
        }
    }
}
