//! Random-action driver: roll a few episodes on the demo maze, print each
//! step, and dump PNG frames when tile assets are available.
//!
//! Env vars: MAZE_ASSETS (tile directory), MAZE_FRAMES (output directory),
//! MAZE_SIZE (switch to a generated maze of that side length).

use std::env;
use std::error::Error;
use std::path::PathBuf;

use maze_render::{FrameRenderer, TileSet};
use maze_rs::{Action, GameConfig, GenConfig, Grid, LcgRng, MazeGame};

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt().init();

    let mut game = match env::var("MAZE_SIZE").ok().and_then(|s| s.parse::<usize>().ok()) {
        Some(size) => MazeGame::generated(
            GenConfig { size, ..GenConfig::default() },
            GameConfig::default(),
            7,
        )?,
        None => {
            let rows = maze_rs::preset_rows("demo").ok_or("demo preset missing")?;
            MazeGame::new(Grid::parse(rows)?, GameConfig::default())
        }
    };

    let renderer = env::var("MAZE_ASSETS").ok().map(|dir| {
        let tiles = TileSet::load(&PathBuf::from(dir));
        if !tiles.is_complete() {
            println!("Some tile assets are missing; those cells will be blank.");
        }
        FrameRenderer::new(tiles)
    });
    let frames_dir = env::var("MAZE_FRAMES").ok().map(PathBuf::from);
    if let Some(dir) = &frames_dir {
        std::fs::create_dir_all(dir)?;
    }

    let mut rng = LcgRng::new(2024);
    let num_episodes = 5;

    for episode in 1..=num_episodes {
        println!("Starting episode {episode}");
        game.reset(None);
        println!("{}\n", game.grid().maze_text_with_agent(Some(game.agent_pos())));

        loop {
            let action = Action::ALL[rng.gen_range(4)];
            let out = game.step(action);
            println!(
                "Step {}: action={} pos={:?} reward={} ({})",
                game.step_count(),
                action.name(),
                game.agent_pos(),
                out.reward,
                out.reason
            );

            if let (Some(renderer), Some(dir)) = (&renderer, &frames_dir) {
                let path = dir.join(format!("ep{episode}_step{:03}.png", game.step_count()));
                if let Err(e) = renderer.render_to_file(game.grid(), game.agent_pos(), &path) {
                    // Rendering trouble never kills the episode.
                    println!("Frame skipped: {e}");
                }
            }

            if out.terminated || out.truncated {
                println!(
                    "Episode {episode} finished after {} steps: {}\n",
                    game.step_count(),
                    out.reason
                );
                break;
            }
        }
    }

    Ok(())
}
