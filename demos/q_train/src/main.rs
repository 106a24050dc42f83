//! Tabular Q-learning driver: trains a policy on the training maze purely
//! through the reset/step interface, persists the Q-table to JSON, and
//! replays it greedily.
//!
//! Usage: q_train train [model.json] | q_train eval [model.json]

use std::collections::HashMap;
use std::env;
use std::error::Error;
use std::fs;
use std::path::Path;

use maze_rs::{Action, GameConfig, Grid, LcgRng, MazeGame};
use serde::{Deserialize, Serialize};

const ALPHA: f64 = 0.1;
const GAMMA: f64 = 0.95;
const EPISODES: u32 = 3000;
const EPSILON_MIN: f64 = 0.05;
const EPSILON_DECAY: f64 = 0.999;

#[derive(Default, Serialize, Deserialize)]
struct QTable {
    // Keyed by "row,col"; JSON object keys must be strings.
    values: HashMap<String, [f64; 4]>,
}

impl QTable {
    fn key(pos: (usize, usize)) -> String {
        format!("{},{}", pos.0, pos.1)
    }

    fn get(&self, pos: (usize, usize)) -> [f64; 4] {
        self.values.get(&Self::key(pos)).copied().unwrap_or([0.0; 4])
    }

    fn update(&mut self, pos: (usize, usize), action: Action, value: f64) {
        let entry = self.values.entry(Self::key(pos)).or_insert([0.0; 4]);
        entry[action as usize] = value;
    }

    fn best_action(&self, pos: (usize, usize)) -> Action {
        let q = self.get(pos);
        let mut best = 0;
        for i in 1..4 {
            if q[i] > q[best] {
                best = i;
            }
        }
        Action::ALL[best]
    }

    fn save(&self, path: &Path) -> Result<(), Box<dyn Error>> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    fn load(path: &Path) -> Result<QTable, Box<dyn Error>> {
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }
}

fn training_game() -> Result<MazeGame, Box<dyn Error>> {
    let rows = maze_rs::preset_rows("training").ok_or("training preset missing")?;
    let grid = Grid::parse(rows)?;
    // Small step penalty so the learned policy prefers short paths.
    Ok(MazeGame::new(grid, GameConfig { max_steps: 50, step_penalty: 0.01 }))
}

fn train(path: &Path) -> Result<(), Box<dyn Error>> {
    let mut game = training_game()?;
    let mut table = QTable::default();
    let mut rng = LcgRng::new(1);
    let mut epsilon = 1.0f64;
    let mut goals = 0u32;

    for episode in 1..=EPISODES {
        game.reset(None);
        loop {
            let pos = game.agent_pos();
            let explore = (rng.next_u32() as f64 / u32::MAX as f64) < epsilon;
            let action =
                if explore { Action::ALL[rng.gen_range(4)] } else { table.best_action(pos) };

            let out = game.step(action);
            let next = game.agent_pos();
            let future = if out.terminated {
                0.0
            } else {
                table.get(next).into_iter().fold(f64::MIN, f64::max)
            };
            let q = table.get(pos)[action as usize];
            table.update(pos, action, q + ALPHA * (out.reward + GAMMA * future - q));

            if out.terminated || out.truncated {
                if out.reward == 1.0 {
                    goals += 1;
                }
                break;
            }
        }
        epsilon = (epsilon * EPSILON_DECAY).max(EPSILON_MIN);
        if episode % 500 == 0 {
            println!("episode {episode}: goal rate {:.2}", goals as f64 / episode as f64);
        }
    }

    table.save(path)?;
    println!("Saved Q-table with {} states to {}", table.values.len(), path.display());
    Ok(())
}

fn eval(path: &Path) -> Result<(), Box<dyn Error>> {
    let table = QTable::load(path)?;
    let mut game = training_game()?;
    game.reset(None);

    println!("{}\n", game.grid().maze_text_with_agent(Some(game.agent_pos())));
    loop {
        let action = table.best_action(game.agent_pos());
        let out = game.step(action);
        println!(
            "Step {}: action={} pos={:?} obs={:?} reward={} ({})",
            game.step_count(),
            action.name(),
            game.agent_pos(),
            game.position_obs(),
            out.reward,
            out.reason
        );
        if out.terminated || out.truncated {
            println!("\nEpisode finished: {}", out.reason);
            break;
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().collect();
    let mode = args.get(1).map(String::as_str);
    let default_path = "q_maze_model.json".to_string();
    let path = Path::new(args.get(2).unwrap_or(&default_path));

    match mode {
        Some("train") => train(path),
        Some("eval") => eval(path),
        _ => {
            eprintln!("usage: q_train <train|eval> [model.json]");
            std::process::exit(2);
        }
    }
}
