use skirmish_core::{Command, Event, Faction, Health, NpcBehavior, PixelPoint};
use skirmish_system_bootstrap::{
    Bootstrap, Scenario, ScenarioError, MAX_ROLLED_DAMAGE, MIN_ROLLED_DAMAGE,
};
use skirmish_world::{self as world, query};

const AMBUSH: &str = r#"
    seed = 7

    [map]
    width = 400
    height = 400
    grid_size = 20

    [rules]
    dead_units_stall_turn = true

    [[units]]
    label = "Soldier"
    x = 50
    y = 50
    radius = 10
    faction = "player"
    damage = 10

    [[units]]
    label = "Raider"
    x = 250
    y = 250
    radius = 10
    faction = "npc"
    max_health = 8
    behavior = "patrol"

    [[obstacles]]
    x = 150
    y = 150
    radius = 15
"#;

fn spawned_damage(commands: &[Command]) -> Vec<u32> {
    commands
        .iter()
        .filter_map(|command| match command {
            Command::SpawnUnit { blueprint } => Some(blueprint.state.damage()),
            _ => None,
        })
        .collect()
}

#[test]
fn scenario_parses_from_toml() {
    let scenario = Scenario::from_toml_str(AMBUSH).expect("scenario parses");

    assert_eq!(scenario.seed, 7);
    assert_eq!(scenario.map.grid_size, 20);
    assert!(scenario.rules.dead_units_stall_turn);
    assert_eq!(scenario.units.len(), 2);
    assert_eq!(scenario.units[1].faction, Faction::Npc);
    assert_eq!(scenario.units[1].behavior, Some(NpcBehavior::Patrol));
    assert_eq!(scenario.obstacles.len(), 1);
}

#[test]
fn commands_configure_map_before_spawning() {
    let scenario = Scenario::from_toml_str(AMBUSH).expect("scenario parses");
    let commands = Bootstrap.commands(&scenario);

    assert_eq!(
        commands[0],
        Command::ConfigureMap {
            width: 400,
            height: 400,
            grid_size: 20,
        }
    );
    assert!(matches!(commands[1], Command::SpawnUnit { .. }));
    assert!(matches!(commands[2], Command::SpawnUnit { .. }));
    assert_eq!(
        commands[3],
        Command::PlaceObstacle {
            position: PixelPoint::new(150, 150),
            radius: 15,
        }
    );
    assert_eq!(commands.len(), 4);
}

#[test]
fn unset_fields_fall_back_to_defaults() {
    let scenario = Scenario::from_toml_str(AMBUSH).expect("scenario parses");
    let commands = Bootstrap.commands(&scenario);

    let Command::SpawnUnit { blueprint: soldier } = &commands[1] else {
        panic!("expected soldier spawn, got {:?}", commands[1]);
    };
    assert_eq!(soldier.state.damage(), 10);
    assert_eq!(soldier.state.health(), Health::new(30));
    assert!(soldier.npc.is_none());

    let Command::SpawnUnit { blueprint: raider } = &commands[2] else {
        panic!("expected raider spawn, got {:?}", commands[2]);
    };
    assert_eq!(raider.state.health(), Health::new(8));
    assert!((MIN_ROLLED_DAMAGE..=MAX_ROLLED_DAMAGE).contains(&raider.state.damage()));
    let profile = raider.npc.expect("npc profile");
    assert_eq!(profile.behavior, NpcBehavior::Patrol);
    assert_eq!(profile.detection_range, 20);
}

#[test]
fn damage_rolls_are_deterministic_per_seed() {
    let scenario = Scenario::default().with_seed(42);

    let first = spawned_damage(&Bootstrap.commands(&scenario));
    let second = spawned_damage(&Bootstrap.commands(&scenario));

    assert_eq!(first, second);
    assert!(first
        .iter()
        .all(|damage| (MIN_ROLLED_DAMAGE..=MAX_ROLLED_DAMAGE).contains(damage)));
}

#[test]
fn default_scenario_populates_world() {
    let bootstrap = Bootstrap;
    let scenario = Scenario::default();
    let mut world = bootstrap.world(&scenario);
    let mut events = Vec::new();

    for command in bootstrap.commands(&scenario) {
        world::apply(&mut world, command, &mut events);
    }

    let spawned = events
        .iter()
        .filter(|event| matches!(event, Event::UnitSpawned { .. }))
        .count();
    assert_eq!(spawned, 4);
    let state = query::game_state(&world);
    assert_eq!(state.units()[0].label(), "Soldier");
    assert_eq!(state.units()[0].position(), PixelPoint::new(100, 100));
    assert_eq!(state.obstacles()[0].position(), PixelPoint::new(220, 220));
    assert_eq!(state.living(Faction::Npc).count(), 2);
    assert_eq!(bootstrap.welcome_banner(&world), "Welcome to Skirmish.");
}

#[test]
fn unknown_keys_are_rejected() {
    let error = Scenario::from_toml_str("seed = 1\nturbo = true\n").expect_err("unknown key");
    assert!(matches!(error, ScenarioError::Parse(_)));
}

#[test]
fn misspelled_rule_is_rejected() {
    let error = Scenario::from_toml_str("[rules]\ndead_unit_stall_turn = true\n")
        .expect_err("misspelled rule");
    assert!(matches!(error, ScenarioError::Parse(_)));

    let scenario = Scenario::from_toml_str("[rules]\ndead_units_stall_turn = true\n")
        .expect("valid rule");
    assert!(scenario.rules.dead_units_stall_turn);
}

#[test]
fn future_versions_are_rejected() {
    let error = Scenario::from_toml_str("version = 2\n").expect_err("unsupported version");
    assert!(matches!(error, ScenarioError::UnsupportedVersion { found: 2 }));
    assert_eq!(error.to_string(), "unsupported scenario version 2; expected 1");
}

#[test]
fn player_units_cannot_carry_behaviour() {
    let contents = r#"
        [[units]]
        label = "Soldier"
        x = 100
        y = 100
        radius = 20
        faction = "player"
        behavior = "guard"
    "#;

    let error = Scenario::from_toml_str(contents).expect_err("behaviour on player");
    assert!(matches!(
        error,
        ScenarioError::BehaviorOnPlayerUnit { ref label } if label == "Soldier"
    ));
}

#[test]
fn empty_scenario_uses_default_map() {
    let scenario = Scenario::from_toml_str("").expect("empty scenario parses");
    let commands = Bootstrap.commands(&scenario);

    assert_eq!(
        commands,
        vec![Command::ConfigureMap {
            width: 1_000,
            height: 800,
            grid_size: 40,
        }]
    );
}
