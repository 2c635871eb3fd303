use skirmish_core::{
    Circle, Command, Event, Faction, Health, PixelPoint, PlacementError, UnitBlueprint, UnitId,
    UnitState,
};
use skirmish_world::{self as world, query, World};

fn configured_world() -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigureMap {
            width: 1_000,
            height: 800,
            grid_size: 40,
        },
        &mut events,
    );
    world
}

fn soldier(label: &str, x: i32, y: i32) -> Command {
    Command::SpawnUnit {
        blueprint: UnitBlueprint {
            label: label.to_owned(),
            position: PixelPoint::new(x, y),
            radius: 20,
            state: UnitState::new(Faction::Player, Health::new(30), 7),
            npc: None,
        },
    }
}

#[test]
fn move_into_obstacle_is_rejected_and_unit_stays() {
    let mut world = configured_world();
    let mut events = Vec::new();

    world::apply(&mut world, soldier("Soldier", 100, 100), &mut events);
    world::apply(
        &mut world,
        Command::PlaceObstacle {
            position: PixelPoint::new(200, 200),
            radius: 30,
        },
        &mut events,
    );

    let state = query::game_state(&world);
    assert_eq!(state.units()[0].position(), PixelPoint::new(100, 100));
    assert_eq!(state.obstacles()[0].position(), PixelPoint::new(220, 220));

    events.clear();
    world::apply(
        &mut world,
        Command::MoveUnit {
            unit: UnitId::new(0),
            destination: PixelPoint::new(210, 210),
        },
        &mut events,
    );

    assert_eq!(
        events,
        vec![Event::UnitMoveRejected {
            unit: UnitId::new(0),
            destination: PixelPoint::new(220, 220),
            reason: PlacementError::Collision,
        }]
    );
    let unit = query::unit(&world, UnitId::new(0)).expect("unit exists");
    assert_eq!(unit.position(), PixelPoint::new(100, 100));
    assert!(
        !unit.state().has_acted(),
        "moving never spends the action on its own"
    );
}

#[test]
fn move_next_to_obstacle_clears_it() {
    let mut world = configured_world();
    let mut events = Vec::new();
    world::apply(&mut world, soldier("Soldier", 100, 100), &mut events);
    world::apply(
        &mut world,
        Command::PlaceObstacle {
            position: PixelPoint::new(200, 200),
            radius: 30,
        },
        &mut events,
    );
    events.clear();

    world::apply(
        &mut world,
        Command::MoveUnit {
            unit: UnitId::new(0),
            destination: PixelPoint::new(190, 190),
        },
        &mut events,
    );

    assert_eq!(
        events,
        vec![Event::UnitMoved {
            unit: UnitId::new(0),
            from: PixelPoint::new(100, 100),
            to: PixelPoint::new(180, 180),
        }]
    );
}

#[test]
fn successful_move_snaps_to_cell_center() {
    let mut world = configured_world();
    let mut events = Vec::new();
    world::apply(&mut world, soldier("Soldier", 100, 100), &mut events);
    events.clear();

    world::apply(
        &mut world,
        Command::MoveUnit {
            unit: UnitId::new(0),
            destination: PixelPoint::new(415, 333),
        },
        &mut events,
    );

    assert_eq!(
        events,
        vec![Event::UnitMoved {
            unit: UnitId::new(0),
            from: PixelPoint::new(100, 100),
            to: PixelPoint::new(420, 340),
        }]
    );
    let unit = query::unit(&world, UnitId::new(0)).expect("unit exists");
    assert!(!unit.state().has_acted());
}

#[test]
fn units_cannot_stack_on_each_other() {
    let mut world = configured_world();
    let mut events = Vec::new();
    world::apply(&mut world, soldier("first", 100, 100), &mut events);
    world::apply(&mut world, soldier("second", 140, 100), &mut events);
    events.clear();

    world::apply(
        &mut world,
        Command::MoveUnit {
            unit: UnitId::new(1),
            destination: PixelPoint::new(101, 101),
        },
        &mut events,
    );

    assert!(matches!(
        events.as_slice(),
        [Event::UnitMoveRejected {
            reason: PlacementError::Collision,
            ..
        }]
    ));
    assert_eq!(
        query::unit(&world, UnitId::new(1))
            .expect("unit exists")
            .position(),
        PixelPoint::new(140, 100)
    );
}

#[test]
fn adjacent_cells_touch_without_overlapping() {
    let mut world = configured_world();
    let mut events = Vec::new();

    world::apply(&mut world, soldier("first", 100, 100), &mut events);
    world::apply(&mut world, soldier("second", 140, 100), &mut events);

    assert_eq!(query::game_state(&world).units().len(), 2);
}

#[test]
fn obstacle_on_occupied_cell_is_dropped() {
    let mut world = configured_world();
    let mut events = Vec::new();
    world::apply(&mut world, soldier("Soldier", 100, 100), &mut events);
    events.clear();

    world::apply(
        &mut world,
        Command::PlaceObstacle {
            position: PixelPoint::new(110, 110),
            radius: 10,
        },
        &mut events,
    );

    assert_eq!(
        events,
        vec![Event::ObstaclePlacementRejected {
            position: PixelPoint::new(100, 100),
            reason: PlacementError::Collision,
        }]
    );
    assert!(query::game_state(&world).obstacles().is_empty());
}

#[test]
fn placement_validity_matches_registry_contents() {
    let mut world = configured_world();
    let mut events = Vec::new();
    world::apply(&mut world, soldier("Soldier", 100, 100), &mut events);

    let free = Circle::new(PixelPoint::new(300, 300), 20);
    assert!(query::is_placement_valid(&world, &free, None));

    let shifted = Circle::new(PixelPoint::new(110, 100), 20);
    assert!(!query::is_placement_valid(&world, &shifted, None));
    assert!(query::is_placement_valid(
        &world,
        &shifted,
        Some(UnitId::new(0))
    ));

    let outside = Circle::new(PixelPoint::new(990, 100), 20);
    assert!(!query::is_placement_valid(&world, &outside, None));
}

#[test]
fn dead_units_keep_blocking_their_cell() {
    let mut world = configured_world();
    let mut events = Vec::new();
    world::apply(&mut world, soldier("fallen", 100, 100), &mut events);
    world::apply(&mut world, soldier("survivor", 300, 300), &mut events);
    world::apply(
        &mut world,
        Command::DamageUnit {
            unit: UnitId::new(0),
            amount: 100,
        },
        &mut events,
    );
    events.clear();

    world::apply(
        &mut world,
        Command::MoveUnit {
            unit: UnitId::new(1),
            destination: PixelPoint::new(100, 100),
        },
        &mut events,
    );

    assert!(matches!(
        events.as_slice(),
        [Event::UnitMoveRejected {
            reason: PlacementError::Collision,
            ..
        }]
    ));
}
