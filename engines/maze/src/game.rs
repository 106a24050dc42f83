use serde::{Deserialize, Serialize};

use crate::gen::GenConfig;
use crate::grid::{Cell, Grid, LayoutError};

/// The four moves, encoded 0..3 for gym-style drivers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Action {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Up, Action::Down, Action::Left, Action::Right];

    /// Unit displacement in (row, col) space.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Action::Up => (-1, 0),
            Action::Down => (1, 0),
            Action::Left => (0, -1),
            Action::Right => (0, 1),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Action::Up => "up",
            Action::Down => "down",
            Action::Left => "left",
            Action::Right => "right",
        }
    }

    pub fn from_name(name: &str) -> Option<Action> {
        match name {
            "up" => Some(Action::Up),
            "down" => Some(Action::Down),
            "left" => Some(Action::Left),
            "right" => Some(Action::Right),
            _ => None,
        }
    }
}

impl TryFrom<u8> for Action {
    type Error = &'static str;
    fn try_from(v: u8) -> Result<Self, Self::Error> {
        Ok(match v {
            0 => Action::Up,
            1 => Action::Down,
            2 => Action::Left,
            3 => Action::Right,
            _ => return Err("invalid action index (expected 0..3)"),
        })
    }
}

/// Why the last step ended the way it did. Display strings match the
/// original drivers' info messages.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reason {
    Exploring,
    GoalReached,
    FellIntoPit,
    OutOfTime,
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Reason::Exploring => "Continue exploring",
            Reason::GoalReached => "Goal reached!",
            Reason::FellIntoPit => "Fell into death pit!",
            Reason::OutOfTime => "Out of time",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameConfig {
    pub max_steps: u32,
    /// Subtracted from the reward on every non-terminal step, including the
    /// step that truncates on the time limit.
    pub step_penalty: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self { max_steps: 50, step_penalty: 0.0 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub reward: f64,
    pub terminated: bool,
    pub truncated: bool,
    /// False when the move was absorbed as a no-op (wall or out of bounds).
    pub moved: bool,
    pub reason: Reason,
}

/// Where the layout comes from on reset: a fixed grid is reused, a generated
/// one is rebuilt from a fresh seed.
#[derive(Clone, Debug, Serialize, Deserialize)]
enum Layout {
    Fixed,
    Generated(GenConfig),
}

/// The grid-world state machine: owns the grid, the agent position and the
/// step counter; exposes reset/step; computes observations and rewards.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MazeGame {
    layout: Layout,
    grid: Grid,
    agent_pos: (usize, usize),
    step_count: u32,
    max_steps: u32,
    step_penalty: f64,
    seed: u64,
    reward_last: f64,
    total_reward: f64,
    reason_last: Reason,
}

/// Serializable view of the episode for wrappers and renderers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PublicState {
    pub rows: usize,
    pub cols: usize,
    pub agent_pos: (usize, usize),
    pub start: (usize, usize),
    pub goal: (usize, usize),
    pub step_count: u32,
    pub max_steps: u32,
    pub reward_last: f64,
    pub total_reward: f64,
    pub terminated: bool,
    pub truncated: bool,
    pub reason: Reason,
    pub maze_text: String,
}

impl MazeGame {
    /// Episode over a fixed layout; reset reuses the same grid.
    pub fn new(grid: Grid, cfg: GameConfig) -> Self {
        let agent_pos = grid.start();
        Self {
            layout: Layout::Fixed,
            grid,
            agent_pos,
            step_count: 0,
            max_steps: cfg.max_steps,
            step_penalty: cfg.step_penalty,
            seed: 0,
            reward_last: 0.0,
            total_reward: 0.0,
            reason_last: Reason::Exploring,
        }
    }

    /// Episode over procedurally generated layouts; every reset without an
    /// explicit seed derives the next one from the previous.
    pub fn generated(gen: GenConfig, cfg: GameConfig, seed: u64) -> Result<Self, LayoutError> {
        gen.validate()?;
        let grid = Grid::generate_unchecked(&gen, seed);
        let agent_pos = grid.start();
        Ok(Self {
            layout: Layout::Generated(gen),
            grid,
            agent_pos,
            step_count: 0,
            max_steps: cfg.max_steps,
            step_penalty: cfg.step_penalty,
            seed,
            reward_last: 0.0,
            total_reward: 0.0,
            reason_last: Reason::Exploring,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn agent_pos(&self) -> (usize, usize) {
        self.agent_pos
    }

    pub fn step_count(&self) -> u32 {
        self.step_count
    }

    pub fn max_steps(&self) -> u32 {
        self.max_steps
    }

    pub fn reward_last(&self) -> f64 {
        self.reward_last
    }

    pub fn total_reward(&self) -> f64 {
        self.total_reward
    }

    fn at_goal(&self) -> bool {
        self.agent_pos == self.grid.goal()
    }

    fn at_pit(&self) -> bool {
        self.grid.get(self.agent_pos.0, self.agent_pos.1) == Cell::Pit
    }

    /// Natural end state: goal or pit. Derived, never stored.
    pub fn terminated(&self) -> bool {
        self.at_goal() || self.at_pit()
    }

    /// Artificial cutoff: step budget exhausted without a natural end.
    pub fn truncated(&self) -> bool {
        !self.terminated() && self.step_count >= self.max_steps
    }

    /// Restart the episode. Never fails: generated layouts were validated at
    /// construction, fixed ones are simply reused.
    pub fn reset(&mut self, seed: Option<u64>) {
        if let Layout::Generated(gen) = &self.layout {
            self.seed = seed.unwrap_or_else(|| self.seed.wrapping_add(1));
            self.grid = Grid::generate_unchecked(gen, self.seed);
        }
        self.agent_pos = self.grid.start();
        self.step_count = 0;
        self.reward_last = 0.0;
        self.total_reward = 0.0;
        self.reason_last = Reason::Exploring;
    }

    /// Advance one step. Illegal moves are absorbed as no-ops, never errors.
    /// After the episode has ended, further calls return the final outcome
    /// without mutating anything.
    pub fn step(&mut self, action: Action) -> StepOutcome {
        if self.terminated() || self.truncated() {
            return StepOutcome {
                reward: self.reward_last,
                terminated: self.terminated(),
                truncated: self.truncated(),
                moved: false,
                reason: self.reason_last,
            };
        }

        let (dr, dc) = action.delta();
        let cand_r = self.agent_pos.0 as isize + dr;
        let cand_c = self.agent_pos.1 as isize + dc;
        let moved = self.grid.is_walkable(cand_r, cand_c);
        if moved {
            self.agent_pos = (cand_r as usize, cand_c as usize);
        }
        self.step_count += 1;

        let (reward, terminated, truncated, reason) = if self.at_goal() {
            (1.0, true, false, Reason::GoalReached)
        } else if self.at_pit() {
            (-1.0, true, false, Reason::FellIntoPit)
        } else if self.step_count >= self.max_steps {
            (-self.step_penalty, false, true, Reason::OutOfTime)
        } else {
            (-self.step_penalty, false, false, Reason::Exploring)
        };

        self.reward_last = reward;
        self.total_reward += reward;
        self.reason_last = reason;

        StepOutcome { reward, terminated, truncated, moved, reason }
    }

    /// Normalized (row, col) in [0,1], divided by dimension-1.
    pub fn position_obs(&self) -> [f32; 2] {
        [
            self.agent_pos.0 as f32 / (self.grid.rows() - 1) as f32,
            self.agent_pos.1 as f32 / (self.grid.cols() - 1) as f32,
        ]
    }

    /// Cell kinds of the four adjacent cells in action order (up, down, left,
    /// right). Out-of-bounds neighbors read as walls.
    pub fn visibility_obs(&self) -> [u8; 4] {
        let mut out = [0u8; 4];
        for (i, action) in Action::ALL.iter().enumerate() {
            let (dr, dc) = action.delta();
            let r = self.agent_pos.0 as isize + dr;
            let c = self.agent_pos.1 as isize + dc;
            out[i] = if self.grid.in_bounds(r, c) {
                self.grid.get(r as usize, c as usize).visibility_code()
            } else {
                Cell::Wall.visibility_code()
            };
        }
        out
    }

    pub fn public_state(&self) -> PublicState {
        PublicState {
            rows: self.grid.rows(),
            cols: self.grid.cols(),
            agent_pos: self.agent_pos,
            start: self.grid.start(),
            goal: self.grid.goal(),
            step_count: self.step_count,
            max_steps: self.max_steps,
            reward_last: self.reward_last,
            total_reward: self.total_reward,
            terminated: self.terminated(),
            truncated: self.truncated(),
            reason: self.reason_last,
            maze_text: self.grid.maze_text_with_agent(Some(self.agent_pos)),
        }
    }
}
