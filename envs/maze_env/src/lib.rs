use async_trait::async_trait;
use maze_rs::{Action, GameConfig, GenConfig, Grid, MazeGame};
use mazegame_core::{
    register_environment_with_config, EngineError, Environment, Observation, Snapshot, ToolCall,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as Json};
use std::sync::Arc;

/// Observation shape exposed to policies.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ObsKind {
    /// Normalized (row, col) position only.
    #[default]
    Position,
    /// Normalized position plus the four-cell adjacency vector.
    PositionVisibility,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    /// Literal layout, one string per row; wins over `preset` and `size`.
    pub maze: Option<Vec<String>>,
    /// Named built-in layout ("demo", "training").
    pub preset: Option<String>,
    /// Side length for a procedurally generated square maze.
    pub size: Option<usize>,
    pub obstacle_frac: Option<f64>,
    pub pit_frac: Option<f64>,
    pub corner_endpoints: Option<bool>,
    pub endpoint_buffer: Option<bool>,
    pub max_steps: Option<u32>,
    pub step_penalty: Option<f64>,
    /// Seed for generated layouts; fixed layouts ignore it.
    pub seed: Option<u64>,
    pub observation: Option<ObsKind>,
}

fn action_from_args(args: &Json) -> Result<Action, EngineError> {
    if let Some(a) = args.get("action").and_then(|v| v.as_i64()) {
        let idx = u8::try_from(a)
            .map_err(|_| EngineError::Validation(format!("unknown action int: {a}")))?;
        return Action::try_from(idx)
            .map_err(|e| EngineError::Validation(format!("unknown action int: {a} ({e})")));
    }
    let dir = args
        .get("direction")
        .and_then(|v| v.as_str())
        .ok_or_else(|| EngineError::Validation("missing action or direction".into()))?;
    Action::from_name(&dir.to_ascii_lowercase())
        .ok_or_else(|| EngineError::Validation(format!("invalid direction '{dir}'")))
}

fn make_game(cfg: &Config) -> Result<MazeGame, EngineError> {
    let game_cfg = GameConfig {
        max_steps: cfg.max_steps.unwrap_or(50),
        step_penalty: cfg.step_penalty.unwrap_or(0.0),
    };
    // Literal layout wins, then named preset, then procedural size.
    if let Some(rows) = &cfg.maze {
        let grid = Grid::parse(rows).map_err(validation)?;
        return Ok(MazeGame::new(grid, game_cfg));
    }
    if let Some(name) = &cfg.preset {
        let rows = maze_rs::preset_rows(name)
            .ok_or_else(|| EngineError::Validation(format!("unknown preset: {name}")))?;
        let grid = Grid::parse(rows).map_err(validation)?;
        return Ok(MazeGame::new(grid, game_cfg));
    }
    if let Some(size) = cfg.size {
        let defaults = GenConfig::default();
        let gen = GenConfig {
            size,
            obstacle_frac: cfg.obstacle_frac.unwrap_or(defaults.obstacle_frac),
            pit_frac: cfg.pit_frac.unwrap_or(defaults.pit_frac),
            corner_endpoints: cfg.corner_endpoints.unwrap_or(defaults.corner_endpoints),
            endpoint_buffer: cfg.endpoint_buffer.unwrap_or(defaults.endpoint_buffer),
        };
        return MazeGame::generated(gen, game_cfg, cfg.seed.unwrap_or(42)).map_err(validation);
    }
    let rows = maze_rs::preset_rows("demo")
        .ok_or_else(|| EngineError::Internal("demo preset missing".into()))?;
    let grid = Grid::parse(rows).map_err(validation)?;
    Ok(MazeGame::new(grid, game_cfg))
}

fn validation(e: maze_rs::LayoutError) -> EngineError {
    EngineError::Validation(e.to_string())
}

pub struct MazeEnvironment {
    game: MazeGame,
    obs_kind: ObsKind,
}

impl MazeEnvironment {
    pub fn new(cfg: Config) -> Result<Self, EngineError> {
        let obs_kind = cfg.observation.unwrap_or_default();
        Ok(Self { game: make_game(&cfg)?, obs_kind })
    }

    fn snapshot_obs(&self, extra: Json) -> Observation {
        let st = self.game.public_state();
        let mut public = json!({
            "agent_pos": [st.agent_pos.0, st.agent_pos.1],
            "position": self.game.position_obs(),
            "rows": st.rows,
            "cols": st.cols,
            "step_count": st.step_count,
            "max_steps": st.max_steps,
            "reward_last": st.reward_last,
            "total_reward": st.total_reward,
            "reason": st.reason.to_string(),
            "maze_text": st.maze_text,
            "terminated": st.terminated,
            "truncated": st.truncated,
            "extra": extra,
        });
        if self.obs_kind == ObsKind::PositionVisibility {
            if let Some(map) = public.as_object_mut() {
                map.insert("visibility".into(), json!(self.game.visibility_obs()));
            }
        }
        Observation { terminated: st.terminated, truncated: st.truncated, data: public }
    }
}

#[async_trait]
impl Environment for MazeEnvironment {
    async fn initialize(&mut self) -> Result<Observation, EngineError> {
        // Construction already placed the agent at the start with the
        // configured seed; only an episode that has started needs a reset,
        // so the first initialize never burns the configured seed.
        if self.game.step_count() > 0 {
            self.game.reset(None);
        }
        Ok(self.snapshot_obs(json!({"event": "initialize"})))
    }

    async fn step(&mut self, tool_calls: Vec<ToolCall>) -> Result<Observation, EngineError> {
        if tool_calls.is_empty() {
            return Err(EngineError::Validation("no tool_calls provided".into()));
        }
        let call = &tool_calls[0];
        match call.tool.as_str() {
            "move" | "interact" => {
                let action = action_from_args(&call.args)?;
                let out = self.game.step(action);
                Ok(self.snapshot_obs(json!({
                    "action": action.name(),
                    "moved": out.moved,
                })))
            }
            "reset" => {
                let seed = call.args.get("seed").and_then(|v| v.as_u64());
                self.game.reset(seed);
                Ok(self.snapshot_obs(json!({"event": "reset"})))
            }
            other => Err(EngineError::Validation(format!("unknown tool: {other}"))),
        }
    }

    async fn checkpoint(&self) -> Result<Snapshot, EngineError> {
        let data = serde_json::to_value(&self.game)
            .map_err(|e| EngineError::Internal(format!("snapshot failed: {e}")))?;
        Ok(Snapshot { version: 1, engine: "maze".into(), data })
    }

    async fn terminate(&mut self) -> Result<Observation, EngineError> {
        let mut obs = self.snapshot_obs(json!({"event": "terminate"}));
        obs.truncated = true;
        if let Some(map) = obs.data.as_object_mut() {
            map.insert("truncated".into(), Json::Bool(true));
        }
        Ok(obs)
    }
}

/// Registration helper for registry-based construction.
pub fn register_default_env() {
    register_environment_with_config(
        "MazeGame",
        Arc::new(|cfg| {
            let cfg: Config = match cfg {
                Some(v) => serde_json::from_value(v)
                    .map_err(|e| EngineError::Validation(format!("bad config: {e}")))?,
                None => Config::default(),
            };
            Ok(Box::new(MazeEnvironment::new(cfg)?))
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(action: i64) -> ToolCall {
        ToolCall { tool: "move".into(), args: json!({ "action": action }) }
    }

    #[tokio::test]
    async fn walks_demo_maze_to_goal() {
        let mut env = MazeEnvironment::new(Config::default()).unwrap();
        let obs = env.initialize().await.unwrap();
        assert!(!obs.terminated);
        assert_eq!(obs.data["agent_pos"], json!([0, 0]));

        // down, down, right, right, right, down
        let mut last = None;
        for action in [1i64, 1, 3, 3, 3, 1] {
            last = Some(env.step(vec![mv(action)]).await.unwrap());
        }
        let obs = last.unwrap();
        assert!(obs.terminated);
        assert!(!obs.truncated);
        assert_eq!(obs.data["reward_last"], json!(1.0));
        assert_eq!(obs.data["reason"], json!("Goal reached!"));
    }

    #[tokio::test]
    async fn initialize_restarts_a_stepped_episode() {
        let mut env = MazeEnvironment::new(Config::default()).unwrap();
        env.initialize().await.unwrap();
        env.step(vec![mv(1)]).await.unwrap();

        let obs = env.initialize().await.unwrap();
        assert_eq!(obs.data["agent_pos"], json!([0, 0]));
        assert_eq!(obs.data["step_count"], json!(0));
        assert!(!obs.terminated);
    }

    #[tokio::test]
    async fn direction_strings_are_accepted() {
        let mut env = MazeEnvironment::new(Config::default()).unwrap();
        env.initialize().await.unwrap();
        let obs = env
            .step(vec![ToolCall { tool: "move".into(), args: json!({"direction": "Down"}) }])
            .await
            .unwrap();
        assert_eq!(obs.data["agent_pos"], json!([1, 0]));
    }

    #[tokio::test]
    async fn invalid_action_is_a_validation_error() {
        let mut env = MazeEnvironment::new(Config::default()).unwrap();
        env.initialize().await.unwrap();
        let err = env.step(vec![mv(9)]).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        let err = env
            .step(vec![ToolCall { tool: "fly".into(), args: Json::Null }])
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[tokio::test]
    async fn layout_without_goal_fails_at_construction() {
        let cfg = Config {
            maze: Some(vec!["S.".into(), "..".into()]),
            ..Config::default()
        };
        assert!(matches!(MazeEnvironment::new(cfg), Err(EngineError::Validation(_))));
    }

    #[tokio::test]
    async fn visibility_observation_is_opt_in() {
        let cfg = Config {
            observation: Some(ObsKind::PositionVisibility),
            ..Config::default()
        };
        let mut env = MazeEnvironment::new(cfg).unwrap();
        let obs = env.initialize().await.unwrap();
        let vis = obs.data["visibility"].as_array().unwrap();
        assert_eq!(vis.len(), 4);

        let mut plain = MazeEnvironment::new(Config::default()).unwrap();
        let obs = plain.initialize().await.unwrap();
        assert!(obs.data.get("visibility").is_none());
    }

    #[tokio::test]
    async fn reset_tool_reseeds_generated_layouts() {
        let cfg = Config { size: Some(6), seed: Some(5), ..Config::default() };
        let mut env = MazeEnvironment::new(cfg).unwrap();
        let first = env.initialize().await.unwrap();
        let reset = env
            .step(vec![ToolCall { tool: "reset".into(), args: json!({"seed": 6}) }])
            .await
            .unwrap();
        assert_ne!(first.data["maze_text"], reset.data["maze_text"]);
        assert_eq!(reset.data["step_count"], json!(0));
    }

    #[tokio::test]
    async fn checkpoint_roundtrips_through_serde() {
        let mut env = MazeEnvironment::new(Config::default()).unwrap();
        env.initialize().await.unwrap();
        env.step(vec![mv(1)]).await.unwrap();
        let snap = env.checkpoint().await.unwrap();
        assert_eq!(snap.engine, "maze");
        let game: MazeGame = serde_json::from_value(snap.data).unwrap();
        assert_eq!(game.agent_pos(), (1, 0));
        assert_eq!(game.step_count(), 1);
    }
}
