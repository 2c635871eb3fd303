#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that prepares a Skirmish session from a scenario.
//!
//! Scenarios are authored in TOML and turned into the command batch that
//! configures the map and populates it. Damage values that the scenario leaves
//! open are rolled from a seeded ChaCha stream so the same scenario always
//! yields the same session.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use skirmish_core::{
    Command, Faction, Health, NpcBehavior, NpcProfile, PixelPoint, UnitBlueprint, UnitState,
};
use skirmish_world::{query, TurnRules, World};
use thiserror::Error;

/// Scenario format version understood by this crate.
pub const SUPPORTED_SCENARIO_VERSION: u32 = 1;

/// Health assigned to units that do not specify one.
pub const DEFAULT_MAX_HEALTH: u32 = 30;

/// Smallest damage value a rolled unit may receive.
pub const MIN_ROLLED_DAMAGE: u32 = 5;

/// Largest damage value a rolled unit may receive.
pub const MAX_ROLLED_DAMAGE: u32 = 9;

/// Complete description of a session's starting state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Format version; must equal [`SUPPORTED_SCENARIO_VERSION`].
    #[serde(default = "default_version")]
    pub version: u32,
    /// Seed for the damage rolls.
    #[serde(default)]
    pub seed: u64,
    /// Map dimensions.
    #[serde(default)]
    pub map: MapConfig,
    /// Turn rules handed to the world.
    #[serde(default)]
    pub rules: TurnRules,
    /// Units spawned in order.
    #[serde(default)]
    pub units: Vec<UnitConfig>,
    /// Obstacles placed after the units, in order.
    #[serde(default)]
    pub obstacles: Vec<ObstacleConfig>,
}

fn default_version() -> u32 {
    SUPPORTED_SCENARIO_VERSION
}

/// Map section of a scenario.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MapConfig {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Cell edge in pixels.
    pub grid_size: u32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 1_000,
            height: 800,
            grid_size: 40,
        }
    }
}

/// Unit entry of a scenario.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnitConfig {
    /// Display label.
    pub label: String,
    /// Requested horizontal position in pixels.
    pub x: i32,
    /// Requested vertical position in pixels.
    pub y: i32,
    /// Collision radius in pixels.
    pub radius: u32,
    /// Side the unit fights for.
    pub faction: Faction,
    /// Starting health; defaults to [`DEFAULT_MAX_HEALTH`].
    #[serde(default)]
    pub max_health: Option<u32>,
    /// Damage per attack; rolled from the scenario seed when absent.
    #[serde(default)]
    pub damage: Option<u32>,
    /// Behaviour tag for NPC units.
    #[serde(default)]
    pub behavior: Option<NpcBehavior>,
}

/// Obstacle entry of a scenario.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObstacleConfig {
    /// Requested horizontal position in pixels.
    pub x: i32,
    /// Requested vertical position in pixels.
    pub y: i32,
    /// Collision radius in pixels.
    pub radius: u32,
}

/// Errors raised while loading a scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// The TOML text could not be parsed into a scenario.
    #[error("could not parse scenario: {0}")]
    Parse(#[from] toml::de::Error),
    /// The scenario declares a version this crate does not understand.
    #[error("unsupported scenario version {found}; expected {}", SUPPORTED_SCENARIO_VERSION)]
    UnsupportedVersion {
        /// Version found in the scenario.
        found: u32,
    },
    /// A player unit carries an NPC behaviour tag.
    #[error("unit `{label}` is a player unit and cannot carry an NPC behaviour")]
    BehaviorOnPlayerUnit {
        /// Label of the offending unit.
        label: String,
    },
    /// A unit or obstacle has a zero radius.
    #[error("entity `{label}` must have a positive radius")]
    ZeroRadius {
        /// Label of the offending unit, or `obstacle #n`.
        label: String,
    },
}

impl Scenario {
    /// Parses and validates a scenario from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ScenarioError> {
        let scenario: Self = toml::from_str(contents)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Checks the invariants serde cannot express.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.version != SUPPORTED_SCENARIO_VERSION {
            return Err(ScenarioError::UnsupportedVersion {
                found: self.version,
            });
        }

        for unit in &self.units {
            if unit.radius == 0 {
                return Err(ScenarioError::ZeroRadius {
                    label: unit.label.clone(),
                });
            }
            if unit.faction == Faction::Player && unit.behavior.is_some() {
                return Err(ScenarioError::BehaviorOnPlayerUnit {
                    label: unit.label.clone(),
                });
            }
        }

        if let Some(index) = self.obstacles.iter().position(|obstacle| obstacle.radius == 0) {
            return Err(ScenarioError::ZeroRadius {
                label: format!("obstacle #{index}"),
            });
        }

        Ok(())
    }

    /// Returns a copy of the scenario using the provided seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Default for Scenario {
    /// A soldier and a scout face two NPC targets around a single rock.
    fn default() -> Self {
        let unit = |label: &str, x, y, faction, behavior| UnitConfig {
            label: label.to_owned(),
            x,
            y,
            radius: 20,
            faction,
            max_health: None,
            damage: None,
            behavior,
        };

        Self {
            version: SUPPORTED_SCENARIO_VERSION,
            seed: 0,
            map: MapConfig::default(),
            rules: TurnRules::default(),
            units: vec![
                unit("Soldier", 100, 100, Faction::Player, None),
                unit("Scout", 100, 300, Faction::Player, None),
                unit("Raider", 420, 300, Faction::Npc, Some(NpcBehavior::Idle)),
                unit("Sentry", 620, 500, Faction::Npc, Some(NpcBehavior::Guard)),
            ],
            obstacles: vec![ObstacleConfig {
                x: 200,
                y: 200,
                radius: 30,
            }],
        }
    }
}

/// Produces the world and opening commands for a session.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Derives the banner that should be shown when the session starts.
    #[must_use]
    pub fn welcome_banner<'world>(&self, world: &'world World) -> &'world str {
        query::welcome_banner(world)
    }

    /// Creates an empty world governed by the scenario's turn rules.
    #[must_use]
    pub fn world(&self, scenario: &Scenario) -> World {
        World::with_rules(scenario.rules)
    }

    /// Builds the command batch that configures the map and populates it.
    ///
    /// The batch starts with `ConfigureMap`, followed by one `SpawnUnit` per
    /// unit and one `PlaceObstacle` per obstacle, in scenario order.
    #[must_use]
    pub fn commands(&self, scenario: &Scenario) -> Vec<Command> {
        let mut rng = ChaCha8Rng::seed_from_u64(scenario.seed);
        let mut commands = Vec::with_capacity(1 + scenario.units.len() + scenario.obstacles.len());

        commands.push(Command::ConfigureMap {
            width: scenario.map.width,
            height: scenario.map.height,
            grid_size: scenario.map.grid_size,
        });

        for unit in &scenario.units {
            let blueprint = blueprint(unit, &mut rng);
            tracing::debug!(
                label = %blueprint.label,
                damage = blueprint.state.damage(),
                "unit blueprint prepared"
            );
            commands.push(Command::SpawnUnit { blueprint });
        }

        commands.extend(scenario.obstacles.iter().map(|obstacle| Command::PlaceObstacle {
            position: PixelPoint::new(obstacle.x, obstacle.y),
            radius: obstacle.radius,
        }));

        commands
    }
}

fn blueprint(unit: &UnitConfig, rng: &mut ChaCha8Rng) -> UnitBlueprint {
    let damage = unit
        .damage
        .unwrap_or_else(|| rng.gen_range(MIN_ROLLED_DAMAGE..=MAX_ROLLED_DAMAGE));
    let max_health = Health::new(unit.max_health.unwrap_or(DEFAULT_MAX_HEALTH));
    let npc = match unit.faction {
        Faction::Npc => Some(NpcProfile {
            behavior: unit.behavior.unwrap_or_default(),
            ..NpcProfile::for_radius(unit.radius)
        }),
        Faction::Player => None,
    };

    UnitBlueprint {
        label: unit.label.clone(),
        position: PixelPoint::new(unit.x, unit.y),
        radius: unit.radius,
        state: UnitState::new(unit.faction, max_health, damage),
        npc,
    }
}
