use std::collections::{HashMap, VecDeque};

use nullpoint_core::{
    Direction, Input, Position,
    config::EngineConfig,
    enemy::{Enemy, MotionPolicy},
    engine::{CloseReason, Engine, MoveOutcome, OpenOutcome, PresentationSink, SessionState},
    locator::{find_spawn, find_valid_enemy_positions},
    map::TileGrid,
    render::{Glyph, RenderBuffer},
};

#[derive(Default)]
struct Recorder {
    last_frame: Option<RenderBuffer>,
    renders: usize,
    acquired: usize,
    closed: Vec<CloseReason>,
}

impl PresentationSink for Recorder {
    fn render(&mut self, frame: &RenderBuffer) {
        self.renders += 1;
        self.last_frame = Some(frame.clone());
    }

    fn objective_acquired(&mut self) {
        self.acquired += 1;
    }

    fn session_closed(&mut self, reason: CloseReason) {
        self.closed.push(reason);
    }
}

/// Enemies that keep walking into the ceiling.
struct Pinned;

impl MotionPolicy for Pinned {
    fn propose(&mut self, _enemy: &Enemy) -> Direction {
        Direction::Up
    }
}

/// Replays a fixed list of directions, then keeps walking up.
struct Scripted(VecDeque<Direction>);

impl MotionPolicy for Scripted {
    fn propose(&mut self, _enemy: &Enemy) -> Direction {
        self.0.pop_front().unwrap_or(Direction::Up)
    }
}

fn config(enemy_count: usize, radius: usize) -> EngineConfig {
    EngineConfig {
        enemy_count,
        enemy_exclusion_radius: radius,
        ..EngineConfig::default().with_seed(42)
    }
}

/// Shortest list of steps between two open cells.
fn route(grid: &TileGrid, from: Position, to: Position) -> Vec<Direction> {
    let mut came_from: HashMap<Position, (Position, Direction)> = HashMap::new();
    let mut frontier = VecDeque::from([from]);
    while let Some(current) = frontier.pop_front() {
        if current == to {
            break;
        }
        for direction in Direction::ALL {
            let Some(next) = current.step(direction) else {
                continue;
            };
            if grid.is_blocked(next) || next == from || came_from.contains_key(&next) {
                continue;
            }
            came_from.insert(next, (current, direction));
            frontier.push_back(next);
        }
    }

    let mut steps = Vec::new();
    let mut current = to;
    while current != from {
        let (previous, direction) = came_from[&current];
        steps.push(direction);
        current = previous;
    }
    steps.reverse();
    steps
}

#[test]
fn border_moves_are_rejected_in_a_single_cell_room() {
    let terrain = TileGrid::parse(&["###", "# #", "###"]).unwrap();
    let mut engine = Engine::new(terrain, config(0, 10));
    let mut sink = Recorder::default();
    assert_eq!(engine.open(&mut sink), OpenOutcome::Opened);
    assert_eq!(engine.world().spawn(), Position::new(1, 1));

    for direction in Direction::ALL {
        assert_eq!(
            engine.handle_input(Input::Move(direction), &mut sink),
            MoveOutcome::Blocked
        );
        assert_eq!(engine.world().player(), Position::new(1, 1));
    }
}

#[test]
fn enemy_candidates_exclude_everything_near_spawn() {
    let grid = TileGrid::dungeon().unwrap();
    let spawn = find_spawn(&grid);
    let candidates = find_valid_enemy_positions(&grid, spawn, 10);
    for (position, _) in grid.enumerate() {
        if position.manhattan_distance(spawn) <= 10 {
            assert!(
                !candidates.contains(&position),
                "{position:?} is within reach of the spawn"
            );
        }
    }
    let adjacent = Position::new(spawn.x + 1, spawn.y);
    assert!(grid.is_open(adjacent));
    assert!(!candidates.contains(&adjacent));
}

#[test]
fn walking_into_an_enemy_respawns_the_player() {
    // With radius 1 the only enemy cell is (3, 1).
    let terrain = TileGrid::parse(&["#####", "#   #", "#####"]).unwrap();
    let mut engine = Engine::new(terrain, config(5, 1)).with_motion_policy(Box::new(Pinned));
    let mut sink = Recorder::default();
    engine.open(&mut sink);
    assert_eq!(engine.world().enemies().len(), 1);
    assert_eq!(engine.world().enemies()[0].position, Position::new(3, 1));

    assert_eq!(
        engine.handle_input(Input::Move(Direction::Right), &mut sink),
        MoveOutcome::Moved
    );
    assert!(engine.tick(&mut sink));
    assert_eq!(
        engine.handle_input(Input::Move(Direction::Right), &mut sink),
        MoveOutcome::Respawned
    );
    assert_eq!(engine.world().player(), engine.world().spawn());
    assert_eq!(engine.state(), SessionState::Exploring);

    let frame = sink.last_frame.expect("respawn renders");
    assert_eq!(frame[Position::new(1, 1)], Glyph::Player);
    assert_eq!(frame[Position::new(3, 1)], Glyph::Enemy(">:("));
}

#[test]
fn respawn_onto_an_occupied_spawn_shares_the_cell_until_someone_moves() {
    // Spawn is (1, 1); with radius 2 the only enemy cell is (3, 2).
    let terrain = TileGrid::parse(&["#####", "#   #", "#   #", "#####"]).unwrap();
    let script = VecDeque::from([
        Direction::Up,
        Direction::Left,
        Direction::Left,
        Direction::Right,
    ]);
    let mut engine =
        Engine::new(terrain, config(1, 2)).with_motion_policy(Box::new(Scripted(script)));
    let mut sink = Recorder::default();
    engine.open(&mut sink);
    let spawn = engine.world().spawn();
    assert_eq!(spawn, Position::new(1, 1));
    assert_eq!(engine.world().enemies()[0].position, Position::new(3, 2));

    assert_eq!(
        engine.handle_input(Input::Move(Direction::Down), &mut sink),
        MoveOutcome::Moved
    );
    for _ in 0..3 {
        assert!(engine.tick(&mut sink));
    }
    assert_eq!(engine.world().enemies()[0].position, spawn);
    assert_eq!(engine.world().player(), Position::new(1, 2));

    assert_eq!(
        engine.handle_input(Input::Move(Direction::Up), &mut sink),
        MoveOutcome::Respawned
    );
    assert_eq!(engine.world().player(), spawn);
    assert!(engine.world().enemy_at(spawn));
    assert_eq!(engine.state(), SessionState::Exploring);
    let frame = sink.last_frame.clone().expect("respawn renders");
    assert_eq!(frame[spawn], Glyph::Player);

    assert!(engine.tick(&mut sink));
    assert_eq!(engine.world().enemies()[0].position, Position::new(2, 1));
    assert_eq!(engine.world().player(), spawn);
    assert!(!engine.world().enemy_at(spawn));
}

fn engine_at_key() -> (Engine, Recorder) {
    let mut engine = Engine::with_dungeon(config(0, 10)).unwrap();
    let mut sink = Recorder::default();
    engine.open(&mut sink);
    let key = engine.world().objective().expect("shipped map has a key");
    let steps = route(engine.world().terrain(), engine.world().player(), key);
    assert!(!steps.is_empty());

    let (last, walk) = steps.split_last().unwrap();
    for direction in walk {
        assert_eq!(
            engine.handle_input(Input::Move(*direction), &mut sink),
            MoveOutcome::Moved
        );
    }
    assert_eq!(
        engine.handle_input(Input::Move(*last), &mut sink),
        MoveOutcome::ObjectiveAcquired
    );
    (engine, sink)
}

#[test]
fn stepping_on_the_key_collects_it_once() {
    let (mut engine, mut sink) = engine_at_key();
    assert!(engine.world().collected());
    assert_eq!(engine.world().player(), engine.world().objective().unwrap());
    assert_eq!(engine.state(), SessionState::ObjectiveAnimating);
    assert_eq!(sink.acquired, 1);

    let renders = sink.renders;
    for direction in Direction::ALL {
        assert_eq!(
            engine.handle_input(Input::Move(direction), &mut sink),
            MoveOutcome::Ignored
        );
    }
    assert!(!engine.tick(&mut sink));
    assert_eq!(sink.renders, renders);
    assert_eq!(sink.acquired, 1);

    assert!(engine.finish_objective_sequence(&mut sink));
    assert_eq!(sink.closed, vec![CloseReason::ObjectiveAcquired]);
    assert_eq!(engine.open(&mut sink), OpenOutcome::Locked);
    assert_eq!(sink.acquired, 1);
}

#[test]
fn cancelling_the_key_sequence_keeps_the_key() {
    let (mut engine, mut sink) = engine_at_key();
    assert_eq!(
        engine.handle_input(Input::Cancel, &mut sink),
        MoveOutcome::Closed
    );
    assert_eq!(engine.state(), SessionState::Idle);
    assert!(engine.world().collected());
    assert_eq!(sink.closed, vec![CloseReason::Cancelled]);
    assert!(!engine.finish_objective_sequence(&mut sink));
    assert_eq!(engine.open(&mut sink), OpenOutcome::Locked);
}

#[test]
fn reopening_resets_player_and_enemies() {
    let mut engine = Engine::with_dungeon(config(15, 10)).unwrap();
    let mut sink = Recorder::default();
    engine.open(&mut sink);
    engine.handle_input(Input::Move(Direction::Right), &mut sink);
    assert_ne!(engine.world().player(), engine.world().spawn());

    engine.handle_input(Input::Cancel, &mut sink);
    assert!(engine.world().enemies().is_empty());

    assert_eq!(engine.open(&mut sink), OpenOutcome::Opened);
    assert_eq!(engine.world().player(), engine.world().spawn());
    assert_eq!(engine.world().enemies().len(), 15);
}

#[test]
fn seeded_sessions_replay_identically() {
    let play = || {
        let mut engine = Engine::with_dungeon(config(15, 10)).unwrap();
        let mut sink = Recorder::default();
        engine.open(&mut sink);
        for _ in 0..25 {
            engine.tick(&mut sink);
        }
        engine
            .world()
            .enemies()
            .iter()
            .map(|enemy| enemy.position)
            .collect::<Vec<_>>()
    };
    assert_eq!(play(), play());
}
