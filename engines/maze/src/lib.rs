//! Pure maze grid-world logic crate.
//! - Grid layout, cell kinds and symbol parsing
//! - Episode state machine: movement, rewards, termination/truncation
//! - Deterministic procedural generation with a serializable RNG
//! - Named preset layouts for demos and tests

mod game;
mod gen;
mod grid;
mod preset;

pub use game::{Action, GameConfig, MazeGame, PublicState, Reason, StepOutcome};
pub use gen::{GenConfig, LcgRng};
pub use grid::{Cell, Grid, LayoutError};
pub use preset::{preset_names, preset_rows};
