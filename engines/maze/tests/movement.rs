use maze_rs::{Action, GameConfig, Grid, MazeGame};

fn demo_game() -> MazeGame {
    let grid = Grid::parse(maze_rs::preset_rows("demo").unwrap()).unwrap();
    MazeGame::new(grid, GameConfig::default())
}

#[test]
fn reset_places_agent_at_start_with_zero_steps() {
    let mut game = demo_game();
    game.step(Action::Down);
    game.step(Action::Right);
    game.reset(None);
    assert_eq!(game.agent_pos(), game.grid().start());
    assert_eq!(game.step_count(), 0);
    assert_eq!(game.total_reward(), 0.0);
}

#[test]
fn out_of_bounds_move_is_a_noop() {
    let mut game = demo_game();
    let out = game.step(Action::Up);
    assert!(!out.moved);
    assert_eq!(game.agent_pos(), (0, 0));
    assert!(!out.terminated);
    assert!(!out.truncated);
    assert_eq!(out.reward, 0.0);
    // The absorbed move still costs a step.
    assert_eq!(game.step_count(), 1);
}

#[test]
fn wall_move_is_a_noop_but_counts_a_step() {
    let mut game = demo_game();
    game.step(Action::Down); // (1,0)
    let before = game.agent_pos();
    let out = game.step(Action::Right); // (1,1) is a wall
    assert!(!out.moved);
    assert_eq!(game.agent_pos(), before);
    assert_eq!(game.step_count(), 2);
}

#[test]
fn legal_moves_displace_by_one_cell() {
    let mut game = demo_game();
    let out = game.step(Action::Down);
    assert!(out.moved);
    assert_eq!(game.agent_pos(), (1, 0));
    let out = game.step(Action::Down);
    assert!(out.moved);
    assert_eq!(game.agent_pos(), (2, 0));
}

#[test]
fn position_always_in_bounds_under_action_sweeps() {
    let mut game = demo_game();
    // Cycle through all actions repeatedly, bouncing off every border.
    for i in 0..200 {
        let action = Action::try_from((i % 4) as u8).unwrap();
        game.step(action);
        let (r, c) = game.agent_pos();
        assert!(r < game.grid().rows(), "row {r} out of bounds");
        assert!(c < game.grid().cols(), "col {c} out of bounds");
        if game.terminated() || game.truncated() {
            game.reset(None);
        }
    }
}

#[test]
fn agent_never_rests_on_a_wall() {
    let mut game = demo_game();
    for i in 0..200 {
        let action = Action::try_from(((i * 7) % 4) as u8).unwrap();
        game.step(action);
        let (r, c) = game.agent_pos();
        assert_ne!(game.grid().get(r, c), maze_rs::Cell::Wall);
        if game.terminated() || game.truncated() {
            game.reset(None);
        }
    }
}

#[test]
fn scenario_demo_maze_to_goal() {
    // S...
    // .#.#
    // ....
    // #.#G
    let mut game = demo_game();
    let path = [
        Action::Down,
        Action::Down,
        Action::Right,
        Action::Right,
        Action::Right,
        Action::Down,
    ];
    let mut last = None;
    for action in path {
        last = Some(game.step(action));
    }
    let out = last.unwrap();
    assert_eq!(game.agent_pos(), (3, 3));
    assert_eq!(out.reward, 1.0);
    assert!(out.terminated);
    assert!(!out.truncated);
}

#[test]
fn determinism_same_actions_same_positions() {
    let mut a = demo_game();
    let mut b = demo_game();
    for action in [Action::Down, Action::Right, Action::Down, Action::Left, Action::Up] {
        a.step(action);
        b.step(action);
        assert_eq!(a.agent_pos(), b.agent_pos());
        assert_eq!(a.step_count(), b.step_count());
    }
}
