use serde::{Deserialize, Serialize};

use crate::grid::{Cell, Grid, LayoutError};

/// Tiny deterministic RNG to keep generated layouts reproducible and
/// serializable alongside the rest of the game state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LcgRng {
    state: u64,
}

impl LcgRng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    #[inline]
    fn step(&mut self) {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
    }

    pub fn next_u32(&mut self) -> u32 {
        self.step();
        (self.state >> 32) as u32
    }

    pub fn gen_range(&mut self, upper: usize) -> usize {
        if upper == 0 {
            0
        } else {
            (self.next_u32() as usize) % upper
        }
    }
}

/// Parameters for procedural square layouts.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenConfig {
    pub size: usize,
    /// Fraction of cells that become walls, floored.
    pub obstacle_frac: f64,
    /// Fraction of cells that become pits, floored.
    pub pit_frac: f64,
    /// Place start/goal at opposite corners instead of sampling them.
    pub corner_endpoints: bool,
    /// Keep the cells adjacent to start/goal free of walls and pits.
    pub endpoint_buffer: bool,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            size: 6,
            obstacle_frac: 0.10,
            pit_frac: 0.05,
            corner_endpoints: false,
            endpoint_buffer: false,
        }
    }
}

impl GenConfig {
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.size < 2 {
            return Err(LayoutError::TooSmall);
        }
        Ok(())
    }
}

impl Grid {
    /// Generate a square layout: start and goal first (corners or sampled
    /// without replacement), then `floor(frac * size^2)` walls and pits drawn
    /// from the remaining free cells. The three sets are pairwise disjoint by
    /// construction. Sampling simply stops if the grid runs out of free cells.
    pub fn generate(cfg: &GenConfig, seed: u64) -> Result<Grid, LayoutError> {
        cfg.validate()?;
        Ok(Self::generate_unchecked(cfg, seed))
    }

    /// Generation body; callers must have validated `cfg`.
    pub(crate) fn generate_unchecked(cfg: &GenConfig, seed: u64) -> Grid {
        let size = cfg.size;
        let total = size * size;
        let mut cells = vec![Cell::Empty; total];
        let mut rng = LcgRng::new(seed);

        let mut free: Vec<(usize, usize)> = (0..size)
            .flat_map(|r| (0..size).map(move |c| (r, c)))
            .collect();

        let (start, goal) = if cfg.corner_endpoints {
            let start = (0, 0);
            let goal = (size - 1, size - 1);
            free.retain(|&p| p != start && p != goal);
            (start, goal)
        } else {
            let start = free.swap_remove(rng.gen_range(free.len()));
            let goal = free.swap_remove(rng.gen_range(free.len()));
            (start, goal)
        };
        cells[start.0 * size + start.1] = Cell::Start;
        cells[goal.0 * size + goal.1] = Cell::Goal;

        if cfg.endpoint_buffer {
            free.retain(|&(r, c)| {
                let near = |p: (usize, usize)| {
                    r.abs_diff(p.0) <= 1 && c.abs_diff(p.1) <= 1
                };
                !near(start) && !near(goal)
            });
        }

        let num_walls = (cfg.obstacle_frac * total as f64).floor() as usize;
        let num_pits = (cfg.pit_frac * total as f64).floor() as usize;
        for _ in 0..num_walls {
            if free.is_empty() {
                break;
            }
            let (r, c) = free.swap_remove(rng.gen_range(free.len()));
            cells[r * size + c] = Cell::Wall;
        }
        for _ in 0..num_pits {
            if free.is_empty() {
                break;
            }
            let (r, c) = free.swap_remove(rng.gen_range(free.len()));
            cells[r * size + c] = Cell::Pit;
        }

        match Grid::from_cells(size, size, cells) {
            Ok(grid) => grid,
            // Start and goal are always placed; size >= 2 is validated upstream.
            Err(_) => unreachable!("generated layout violates its own invariants"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lcg_is_deterministic() {
        let mut a = LcgRng::new(7);
        let mut b = LcgRng::new(7);
        for _ in 0..16 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn gen_range_stays_in_bounds() {
        let mut rng = LcgRng::new(123);
        for upper in [1usize, 2, 5, 17] {
            for _ in 0..64 {
                assert!(rng.gen_range(upper) < upper);
            }
        }
        assert_eq!(rng.gen_range(0), 0);
    }

    #[test]
    fn too_small_config_rejected() {
        let cfg = GenConfig { size: 1, ..GenConfig::default() };
        assert_eq!(Grid::generate(&cfg, 0).unwrap_err(), LayoutError::TooSmall);
    }
}
