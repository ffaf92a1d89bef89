use matopeli_core::{Collision, Command, Direction, Event, GameState, Position};
use matopeli_world::{self as world, query, SeededRandom, World, WorldConfig, WormLayout};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn config(width: u32, height: u32) -> WorldConfig {
    WorldConfig::new(width, height).expect("valid grid")
}

fn layout_world(
    width: u32,
    height: u32,
    worm: &[(i32, i32)],
    direction: Direction,
    target: Option<(i32, i32)>,
) -> World {
    let layout = WormLayout {
        worm: worm.iter().map(|&(x, y)| Position::new(x, y)).collect(),
        direction,
        target: target.map(|(x, y)| Position::new(x, y)),
    };
    World::from_layout(
        config(width, height),
        layout,
        Box::new(SeededRandom::new(0x5eed)),
    )
    .expect("valid layout")
}

fn tick(world: &mut World) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::Tick, &mut events);
    events
}

fn turn(world: &mut World, direction: Direction) {
    let mut events = Vec::new();
    world::apply(world, Command::ChangeDirection { direction }, &mut events);
    assert!(events.is_empty(), "direction changes never emit events");
}

fn positions(cells: &[(i32, i32)]) -> Vec<Position> {
    cells.iter().map(|&(x, y)| Position::new(x, y)).collect()
}

#[test]
fn worm_grows_when_reaching_target() {
    let mut world = layout_world(5, 5, &[(2, 2)], Direction::Right, Some((4, 2)));

    assert!(tick(&mut world).is_empty());
    assert_eq!(query::worm(&world), positions(&[(3, 2)]).as_slice());

    let events = tick(&mut world);
    assert_eq!(
        events,
        vec![Event::WormGrew {
            score: 1,
            head: Position::new(4, 2),
        }]
    );
    assert_eq!(query::worm(&world), positions(&[(4, 2), (3, 2)]).as_slice());
    assert_eq!(query::score(&world), 1);
    assert_eq!(query::state(&world), GameState::Running);

    let target = query::target(&world).expect("target respawned");
    assert!(!query::worm(&world).contains(&target));
}

#[test]
fn moving_into_wall_ends_game_without_committing() {
    let mut world = layout_world(5, 5, &[(0, 2), (1, 2)], Direction::Left, Some((4, 4)));
    let before = query::worm(&world).to_vec();

    let events = tick(&mut world);

    assert_eq!(
        events,
        vec![Event::GameOver {
            score: 1,
            collision: Collision::Wall,
        }]
    );
    assert_eq!(query::state(&world), GameState::GameOver);
    assert_eq!(query::worm(&world), before.as_slice());
}

#[test]
fn single_segment_worm_may_reverse() {
    let mut world = layout_world(5, 5, &[(2, 2)], Direction::Right, Some((0, 0)));
    turn(&mut world, Direction::Left);

    let _ = tick(&mut world);

    assert_eq!(query::direction(&world), Direction::Left);
    assert_eq!(query::worm(&world), positions(&[(1, 2)]).as_slice());
}

#[test]
fn reversal_of_long_worm_is_ignored() {
    let mut world = layout_world(6, 6, &[(3, 3), (2, 3)], Direction::Right, Some((0, 0)));
    turn(&mut world, Direction::Left);

    let events = tick(&mut world);

    assert!(events.is_empty());
    assert_eq!(query::direction(&world), Direction::Right);
    assert_eq!(query::worm(&world), positions(&[(4, 3), (3, 3)]).as_slice());
}

#[test]
fn first_legal_turn_wins_and_queue_is_drained() {
    let mut world = layout_world(8, 8, &[(3, 3), (2, 3)], Direction::Right, Some((0, 0)));
    turn(&mut world, Direction::Left);
    turn(&mut world, Direction::Up);
    turn(&mut world, Direction::Down);

    let _ = tick(&mut world);
    assert_eq!(query::direction(&world), Direction::Up);
    assert_eq!(query::pending_moves(&world).count(), 0);

    let _ = tick(&mut world);
    assert_eq!(query::direction(&world), Direction::Up);
    assert_eq!(query::head(&world), Some(Position::new(3, 1)));
}

#[test]
fn repeated_reversals_do_not_carry_over() {
    let mut world = layout_world(8, 8, &[(3, 3), (2, 3)], Direction::Right, Some((0, 0)));
    turn(&mut world, Direction::Left);
    turn(&mut world, Direction::Left);

    let _ = tick(&mut world);

    assert_eq!(query::direction(&world), Direction::Right);
    assert_eq!(query::pending_moves(&world).count(), 0);
}

#[test]
fn same_direction_resubmission_is_harmless() {
    let mut world = layout_world(8, 8, &[(3, 3), (2, 3)], Direction::Right, Some((0, 0)));
    turn(&mut world, Direction::Right);
    turn(&mut world, Direction::Down);

    let _ = tick(&mut world);

    assert_eq!(query::direction(&world), Direction::Right);
    assert_eq!(query::head(&world), Some(Position::new(4, 3)));
}

#[test]
fn running_into_body_ends_game_without_committing() {
    let mut world = layout_world(
        6,
        6,
        &[(2, 2), (2, 3), (3, 3), (3, 2), (3, 1)],
        Direction::Up,
        Some((0, 0)),
    );
    let before = query::worm(&world).to_vec();
    turn(&mut world, Direction::Right);

    let events = tick(&mut world);

    assert_eq!(
        events,
        vec![Event::GameOver {
            score: 4,
            collision: Collision::Body,
        }]
    );
    assert_eq!(query::worm(&world), before.as_slice());
    assert_eq!(query::state(&world), GameState::GameOver);
}

#[test]
fn head_may_follow_the_vacating_tail() {
    let mut world = layout_world(
        4,
        4,
        &[(1, 1), (2, 1), (2, 2), (1, 2)],
        Direction::Left,
        Some((3, 3)),
    );
    turn(&mut world, Direction::Down);

    let events = tick(&mut world);

    assert!(events.is_empty());
    assert_eq!(query::state(&world), GameState::Running);
    assert_eq!(
        query::worm(&world),
        positions(&[(1, 2), (1, 1), (2, 1), (2, 2)]).as_slice()
    );
}

#[test]
fn full_grid_leaves_target_absent() {
    let mut world = layout_world(
        2,
        2,
        &[(0, 0), (1, 0), (1, 1), (0, 1)],
        Direction::Left,
        None,
    );

    for direction in [Direction::Down, Direction::Right, Direction::Up, Direction::Left] {
        turn(&mut world, direction);
        let events = tick(&mut world);
        assert!(events.is_empty(), "unexpected events {events:?}");
        assert_eq!(query::target(&world), None);
        assert_eq!(query::score(&world), 3);
        assert_eq!(query::state(&world), GameState::Running);
    }
}

#[test]
fn growth_into_last_free_cell_clears_target() {
    let mut world = layout_world(2, 1, &[(0, 0)], Direction::Right, Some((1, 0)));

    let events = tick(&mut world);

    assert_eq!(events.len(), 1);
    assert_eq!(query::worm(&world), positions(&[(1, 0), (0, 0)]).as_slice());
    assert_eq!(query::target(&world), None);
}

#[test]
fn commands_before_start_are_safe() {
    let mut world = World::with_config(config(6, 4), Box::new(SeededRandom::new(1)));

    assert!(tick(&mut world).is_empty());
    turn(&mut world, Direction::Up);
    assert_eq!(query::state(&world), GameState::Initial);
    assert!(query::worm(&world).is_empty());
    assert_eq!(query::pending_moves(&world).count(), 1);

    let mut events = Vec::new();
    world::apply(&mut world, Command::Start, &mut events);

    assert_eq!(query::pending_moves(&world).count(), 0);
    assert_eq!(query::state(&world), GameState::Running);
    assert_eq!(query::worm(&world), positions(&[(3, 2)]).as_slice());
    assert_eq!(query::direction(&world), Direction::Right);
    assert!(matches!(events.as_slice(), [Event::GameStarted { .. }]));

    let _ = tick(&mut world);
    assert_eq!(query::head(&world), Some(Position::new(4, 2)));
}

#[test]
fn start_is_ignored_while_running() {
    let mut world = World::with_config(config(6, 4), Box::new(SeededRandom::new(2)));
    let mut events = Vec::new();
    world::apply(&mut world, Command::Start, &mut events);
    let _ = tick(&mut world);
    let worm = query::worm(&world).to_vec();
    let target = query::target(&world);

    events.clear();
    world::apply(&mut world, Command::Start, &mut events);

    assert!(events.is_empty());
    assert_eq!(query::worm(&world), worm.as_slice());
    assert_eq!(query::target(&world), target);
    assert_eq!(query::tick_index(&world), 1);
}

#[test]
fn start_after_game_over_resets_everything() {
    let mut world = layout_world(3, 3, &[(2, 1), (1, 1)], Direction::Right, Some((0, 0)));
    let _ = tick(&mut world);
    assert_eq!(query::state(&world), GameState::GameOver);

    turn(&mut world, Direction::Up);
    let mut events = Vec::new();
    world::apply(&mut world, Command::Start, &mut events);

    assert_eq!(query::state(&world), GameState::Running);
    assert_eq!(query::score(&world), 0);
    assert_eq!(query::worm(&world), positions(&[(1, 1)]).as_slice());
    assert_eq!(query::direction(&world), Direction::Right);
    assert_eq!(query::pending_moves(&world).count(), 0);
    assert_eq!(query::tick_index(&world), 0);
    let target = query::target(&world).expect("target placed");
    assert_ne!(target, Position::new(1, 1));
}

#[test]
fn ticks_after_game_over_are_ignored() {
    let mut world = layout_world(3, 3, &[(2, 1)], Direction::Right, Some((0, 0)));
    assert_eq!(tick(&mut world).len(), 1);
    let frozen = query::worm(&world).to_vec();

    assert!(tick(&mut world).is_empty());
    assert_eq!(query::worm(&world), frozen.as_slice());
}

#[test]
fn random_play_preserves_invariants() {
    let mut input = ChaCha8Rng::seed_from_u64(0x1f2e_3d4c);
    let mut world = World::with_config(config(7, 5), Box::new(SeededRandom::new(99)));
    let (width, height) = query::dimensions(&world);
    let mut games = 0;

    for _ in 0..5_000 {
        if query::state(&world) != GameState::Running {
            let mut events = Vec::new();
            world::apply(&mut world, Command::Start, &mut events);
            games += 1;
        }

        if input.gen_bool(0.4) {
            let direction = Direction::ALL[input.gen_range(0..Direction::ALL.len())];
            turn(&mut world, direction);
        }

        let before = query::worm(&world).to_vec();
        let events = tick(&mut world);
        assert!(events.len() <= 1, "a tick emits at most one event");

        let worm = query::worm(&world);
        assert_eq!(worm.len() as u32, query::score(&world) + 1);

        match query::state(&world) {
            GameState::GameOver => {
                assert_eq!(worm, before.as_slice(), "fatal move must not commit");
                assert!(matches!(events.as_slice(), [Event::GameOver { .. }]));
            }
            GameState::Running => {
                for segment in worm {
                    assert!(segment.x() >= 0 && (segment.x() as u32) < width);
                    assert!(segment.y() >= 0 && (segment.y() as u32) < height);
                }
            }
            GameState::Initial => panic!("world returned to the initial state"),
        }

        if let Some(target) = query::target(&world) {
            assert!(!worm.contains(&target), "target placed on the worm");
        }
    }

    assert!(games > 1, "expected several games to be played");
}
