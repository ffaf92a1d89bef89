#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Matopeli adapters.

use anyhow::Result as AnyResult;
use glam::Vec2;
use matopeli_core::{Direction, Position};
use std::{error::Error, fmt, time::Duration};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Directional presses observed this frame, in press order.
    pub directions: Vec<Direction>,
    /// Whether the adapter detected a new-game request on this frame.
    pub start_requested: bool,
}

/// Describes the rectangular cell grid rendered by adapters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridPresentation {
    /// Number of columns contained in the grid.
    pub columns: u32,
    /// Number of rows contained in the grid.
    pub rows: u32,
    /// Side length of a single cell expressed in world units.
    pub cell_length: f32,
    /// Color used to fill the play area.
    pub background: Color,
}

impl GridPresentation {
    /// Creates a new grid descriptor.
    ///
    /// Returns an error when the grid has no area or the cell length is not positive.
    pub fn new(
        columns: u32,
        rows: u32,
        cell_length: f32,
        background: Color,
    ) -> std::result::Result<Self, RenderingError> {
        if columns == 0 || rows == 0 {
            return Err(RenderingError::EmptyGrid { columns, rows });
        }
        if !(cell_length > 0.0) {
            return Err(RenderingError::InvalidCellLength { cell_length });
        }

        Ok(Self {
            columns,
            rows,
            cell_length,
            background,
        })
    }

    /// Calculates the total width of the grid.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.cell_length
    }

    /// Calculates the total height of the grid.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.cell_length
    }

    /// Upper-left corner of the cell in world units.
    ///
    /// Returns `None` for cells outside the grid.
    #[must_use]
    pub fn cell_origin(&self, cell: Position) -> Option<Vec2> {
        let column = u32::try_from(cell.x()).ok()?;
        let row = u32::try_from(cell.y()).ok()?;
        if column >= self.columns || row >= self.rows {
            return None;
        }

        Some(Vec2::new(column as f32, row as f32) * self.cell_length)
    }

    /// Center of the cell in world units.
    #[must_use]
    pub fn cell_center(&self, cell: Position) -> Option<Vec2> {
        self.cell_origin(cell)
            .map(|origin| origin + Vec2::splat(self.cell_length * 0.5))
    }
}

/// Worm segments and their palette.
#[derive(Clone, Debug, PartialEq)]
pub struct WormPresentation {
    /// Segments, head first.
    pub segments: Vec<Position>,
    /// Color of the head segment.
    pub head_color: Color,
    /// Color of every other segment.
    pub body_color: Color,
}

/// Consumable cell the worm is chasing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetPresentation {
    /// Cell holding the target.
    pub cell: Position,
    /// Fill color of the target.
    pub color: Color,
}

/// Centered two-line message, used for the title and game-over screens.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayPresentation {
    /// Large first line.
    pub headline: String,
    /// Smaller second line.
    pub detail: String,
    /// Text color.
    pub color: Color,
}

/// Scene description combining the grid, the worm and the target.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Grid that composes the play area.
    pub grid: GridPresentation,
    /// Worm currently on the grid.
    pub worm: WormPresentation,
    /// Target, absent when the grid is full.
    pub target: Option<TargetPresentation>,
    /// Score shown in the heads-up display.
    pub score: u32,
    /// Message drawn on top of the grid.
    pub overlay: Option<OverlayPresentation>,
    /// Short tint applied to the play area after a feedback cue.
    pub flash: Option<Color>,
    /// Hint lines printed below the grid.
    pub hints: Vec<String>,
}

impl Scene {
    /// Creates an empty scene on the provided grid.
    #[must_use]
    pub fn new(grid: GridPresentation, worm: WormPresentation) -> Self {
        Self {
            grid,
            worm,
            target: None,
            score: 0,
            overlay: None,
            flash: None,
            hints: Vec::new(),
        }
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Matopeli scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// per-frame input captured by the adapter, and refreshes the scene from
    /// the world before it is rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// The grid must contain at least one cell.
    EmptyGrid {
        /// Provided column count.
        columns: u32,
        /// Provided row count.
        rows: u32,
    },
    /// Cells must have a positive side length.
    InvalidCellLength {
        /// Provided length that failed validation.
        cell_length: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid { columns, rows } => {
                write!(f, "grid must contain cells (received {columns}x{rows})")
            }
            Self::InvalidCellLength { cell_length } => {
                write!(f, "cell_length must be positive (received {cell_length})")
            }
        }
    }
}

impl Error for RenderingError {}
