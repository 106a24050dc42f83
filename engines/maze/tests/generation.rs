use maze_rs::{Cell, GameConfig, GenConfig, Grid, MazeGame};

fn count(grid: &Grid, kind: Cell) -> usize {
    let mut n = 0;
    for r in 0..grid.rows() {
        for c in 0..grid.cols() {
            if grid.get(r, c) == kind {
                n += 1;
            }
        }
    }
    n
}

#[test]
fn generated_counts_match_floored_fractions() {
    for size in [4usize, 6, 8, 10] {
        let cfg = GenConfig { size, ..GenConfig::default() };
        let grid = Grid::generate(&cfg, 99).unwrap();
        let total = size * size;
        assert_eq!(count(&grid, Cell::Wall), (0.10 * total as f64).floor() as usize);
        assert_eq!(count(&grid, Cell::Pit), (0.05 * total as f64).floor() as usize);
        assert_eq!(count(&grid, Cell::Start), 1);
        assert_eq!(count(&grid, Cell::Goal), 1);
    }
}

#[test]
fn walls_and_pits_never_cover_endpoints() {
    // Heavy obstacle density to stress the disjointness of the sampled sets.
    let cfg = GenConfig { size: 6, obstacle_frac: 0.4, pit_frac: 0.3, ..GenConfig::default() };
    for seed in 0..50u64 {
        let grid = Grid::generate(&cfg, seed).unwrap();
        let (sr, sc) = grid.start();
        let (gr, gc) = grid.goal();
        assert_eq!(grid.get(sr, sc), Cell::Start);
        assert_eq!(grid.get(gr, gc), Cell::Goal);
        assert_ne!(grid.start(), grid.goal());
    }
}

#[test]
fn same_seed_same_layout_different_seed_usually_differs() {
    let cfg = GenConfig::default();
    let a = Grid::generate(&cfg, 7).unwrap();
    let b = Grid::generate(&cfg, 7).unwrap();
    assert_eq!(a, b);

    let c = Grid::generate(&cfg, 8).unwrap();
    assert_ne!(a, c);
}

#[test]
fn corner_endpoints_pin_start_and_goal() {
    let cfg = GenConfig { size: 5, corner_endpoints: true, ..GenConfig::default() };
    for seed in 0..10u64 {
        let grid = Grid::generate(&cfg, seed).unwrap();
        assert_eq!(grid.start(), (0, 0));
        assert_eq!(grid.goal(), (4, 4));
    }
}

#[test]
fn endpoint_buffer_keeps_neighbors_clear() {
    let cfg = GenConfig {
        size: 8,
        obstacle_frac: 0.2,
        pit_frac: 0.1,
        endpoint_buffer: true,
        ..GenConfig::default()
    };
    for seed in 0..20u64 {
        let grid = Grid::generate(&cfg, seed).unwrap();
        for &(er, ec) in &[grid.start(), grid.goal()] {
            for dr in -1isize..=1 {
                for dc in -1isize..=1 {
                    let r = er as isize + dr;
                    let c = ec as isize + dc;
                    if !grid.in_bounds(r, c) {
                        continue;
                    }
                    let cell = grid.get(r as usize, c as usize);
                    assert_ne!(cell, Cell::Wall, "wall in buffer zone, seed {seed}");
                    assert_ne!(cell, Cell::Pit, "pit in buffer zone, seed {seed}");
                }
            }
        }
    }
}

#[test]
fn generated_game_reset_rebuilds_layout() {
    let mut game =
        MazeGame::generated(GenConfig::default(), GameConfig::default(), 3).unwrap();
    let first = game.grid().clone();

    // Explicit seed: reproducible layout.
    game.reset(Some(3));
    assert_eq!(*game.grid(), first);

    // No seed: a fresh layout is drawn.
    game.reset(None);
    assert_ne!(*game.grid(), first);
    assert_eq!(game.agent_pos(), game.grid().start());
    assert_eq!(game.step_count(), 0);
}

#[test]
fn fixed_game_reset_reuses_layout() {
    let grid = Grid::parse(maze_rs::preset_rows("demo").unwrap()).unwrap();
    let mut game = MazeGame::new(grid.clone(), GameConfig::default());
    game.reset(None);
    assert_eq!(*game.grid(), grid);
    game.reset(Some(12345));
    assert_eq!(*game.grid(), grid);
}
