//! Tile renderer for maze episodes.
//! Paints one fixed-size tile per cell from PNG assets, with the agent
//! composited over its current cell. Missing assets are reported and their
//! cells skipped; rendering is never fatal to an episode.

use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use maze_rs::{Cell, Grid};
use tracing::warn;

/// Tile edge length in pixels.
pub const TILE_SIZE: u32 = 125;

/// Only explicit file output can fail; frame composition is infallible.
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("failed to write frame {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Loaded tile assets, one optional image per drawable kind.
pub struct TileSet {
    wall: Option<RgbaImage>,
    start: Option<RgbaImage>,
    goal: Option<RgbaImage>,
    pit: Option<RgbaImage>,
    agent: Option<RgbaImage>,
}

impl TileSet {
    /// Load tiles from `dir`, resizing each to [`TILE_SIZE`]. A missing or
    /// undecodable asset is logged and left out; its cells are skipped when
    /// drawing.
    pub fn load(dir: &Path) -> TileSet {
        TileSet {
            wall: load_tile(dir, "obstacle.png"),
            start: load_tile(dir, "start.png"),
            goal: load_tile(dir, "goal.png"),
            pit: load_tile(dir, "fire.png"),
            agent: load_tile(dir, "spider.png"),
        }
    }

    /// A tile set with no assets; frames come out as plain backgrounds.
    pub fn empty() -> TileSet {
        TileSet { wall: None, start: None, goal: None, pit: None, agent: None }
    }

    pub fn is_complete(&self) -> bool {
        self.wall.is_some()
            && self.start.is_some()
            && self.goal.is_some()
            && self.pit.is_some()
            && self.agent.is_some()
    }

    fn for_cell(&self, cell: Cell) -> Option<&RgbaImage> {
        match cell {
            Cell::Wall => self.wall.as_ref(),
            Cell::Start => self.start.as_ref(),
            Cell::Goal => self.goal.as_ref(),
            Cell::Pit => self.pit.as_ref(),
            Cell::Empty => None,
        }
    }
}

fn load_tile(dir: &Path, name: &str) -> Option<RgbaImage> {
    let path = dir.join(name);
    match image::open(&path) {
        Ok(img) => {
            let img = imageops::resize(&img.to_rgba8(), TILE_SIZE, TILE_SIZE, FilterType::Nearest);
            Some(img)
        }
        Err(e) => {
            warn!(asset = %path.display(), error = %e, "tile asset unavailable, cells will be skipped");
            None
        }
    }
}

/// Scoped rendering context. Owns the tile set for its lifetime; dropping it
/// releases everything, no process-global state involved.
pub struct FrameRenderer {
    tiles: TileSet,
}

impl FrameRenderer {
    pub fn new(tiles: TileSet) -> FrameRenderer {
        FrameRenderer { tiles }
    }

    /// Compose one frame: white background, a tile per non-empty cell, the
    /// agent drawn last over its current cell.
    pub fn render(&self, grid: &Grid, agent_pos: (usize, usize)) -> RgbaImage {
        let width = grid.cols() as u32 * TILE_SIZE;
        let height = grid.rows() as u32 * TILE_SIZE;
        let mut frame = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));

        for r in 0..grid.rows() {
            for c in 0..grid.cols() {
                let left = (c as u32 * TILE_SIZE) as i64;
                let top = (r as u32 * TILE_SIZE) as i64;
                if let Some(tile) = self.tiles.for_cell(grid.get(r, c)) {
                    imageops::overlay(&mut frame, tile, left, top);
                }
                if (r, c) == agent_pos {
                    if let Some(tile) = self.tiles.agent.as_ref() {
                        imageops::overlay(&mut frame, tile, left, top);
                    }
                }
            }
        }
        frame
    }

    /// Render and write a PNG frame.
    pub fn render_to_file(
        &self,
        grid: &Grid,
        agent_pos: (usize, usize),
        path: &Path,
    ) -> Result<(), RenderError> {
        let frame = self.render(grid, agent_pos);
        frame
            .save(path)
            .map_err(|source| RenderError::Write { path: path.to_path_buf(), source })
    }
}
