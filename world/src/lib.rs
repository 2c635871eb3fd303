#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Skirmish.
//!
//! The world owns the map grid, every unit and obstacle, and the turn
//! controller. It is mutated exclusively through [`apply`]; rejected requests
//! never fail loudly, they leave the state untouched and surface as rejection
//! events plus a `tracing` warning.

mod collision;
mod registry;
mod turns;
mod units;

use skirmish_core::{ActionError, Command, Event, SpatialGrid, WELCOME_BANNER};

use crate::{registry::Registry, turns::TurnController};

pub use crate::{
    turns::{
        all_current_turn_units_acted, EndTurnValidator, EndTurnVerdict, TurnContext, TurnRules,
    },
    units::{Obstacle, Unit},
};

/// Represents the authoritative Skirmish world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    grid: SpatialGrid,
    registry: Registry,
    turns: TurnController,
}

impl World {
    /// Creates an empty world on the default map using the default turn rules.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rules(TurnRules::default())
    }

    /// Creates an empty world on the default map using the provided turn rules.
    #[must_use]
    pub fn with_rules(rules: TurnRules) -> Self {
        Self {
            banner: WELCOME_BANNER,
            grid: SpatialGrid::default(),
            registry: Registry::new(),
            turns: TurnController::new(rules),
        }
    }

    /// Appends an end-of-turn validator after the built-in ones.
    ///
    /// Validators are evaluated in insertion order after every recorded action;
    /// the first one that reports `should_end_turn` ends the turn.
    pub fn push_end_turn_validator(&mut self, validator: EndTurnValidator) {
        self.turns.push_validator(validator);
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureMap {
            width,
            height,
            grid_size,
        } => {
            world.grid = SpatialGrid::new(width, height, grid_size);
            world.registry = Registry::new();
            tracing::info!(width, height, grid_size, "map configured");
            out_events.push(Event::MapConfigured { grid: world.grid });
            world
                .turns
                .restart(world.registry.units_mut(), out_events);
        }
        Command::SpawnUnit { blueprint } => {
            let label = blueprint.label.clone();
            let faction = blueprint.state.faction();
            match world.registry.add_unit(&world.grid, blueprint) {
                Ok((unit, position)) => {
                    tracing::debug!(
                        unit = unit.get(),
                        %label,
                        x = position.x(),
                        y = position.y(),
                        "unit added"
                    );
                    out_events.push(Event::UnitSpawned {
                        unit,
                        faction,
                        position,
                    });
                }
                Err(rejection) => {
                    tracing::warn!(
                        %label,
                        x = rejection.position.x(),
                        y = rejection.position.y(),
                        reason = %rejection.reason,
                        "invalid position to add unit"
                    );
                    out_events.push(Event::UnitPlacementRejected {
                        label,
                        position: rejection.position,
                        reason: rejection.reason,
                    });
                }
            }
        }
        Command::PlaceObstacle { position, radius } => {
            match world.registry.add_obstacle(&world.grid, position, radius) {
                Ok((obstacle, position)) => {
                    tracing::debug!(
                        obstacle = obstacle.get(),
                        x = position.x(),
                        y = position.y(),
                        radius,
                        "obstacle added"
                    );
                    out_events.push(Event::ObstaclePlaced {
                        obstacle,
                        position,
                        radius,
                    });
                }
                Err(rejection) => {
                    tracing::warn!(
                        x = rejection.position.x(),
                        y = rejection.position.y(),
                        reason = %rejection.reason,
                        "invalid position to add obstacle"
                    );
                    out_events.push(Event::ObstaclePlacementRejected {
                        position: rejection.position,
                        reason: rejection.reason,
                    });
                }
            }
        }
        Command::MoveUnit { unit, destination } => {
            match world.registry.move_unit(&world.grid, unit, destination) {
                Ok(relocation) => {
                    tracing::debug!(
                        unit = unit.get(),
                        x = relocation.to.x(),
                        y = relocation.to.y(),
                        "unit moved"
                    );
                    out_events.push(Event::UnitMoved {
                        unit,
                        from: relocation.from,
                        to: relocation.to,
                    });
                }
                Err(rejection) => {
                    tracing::warn!(
                        unit = unit.get(),
                        x = rejection.position.x(),
                        y = rejection.position.y(),
                        reason = %rejection.reason,
                        "invalid move"
                    );
                    out_events.push(Event::UnitMoveRejected {
                        unit,
                        destination: rejection.position,
                        reason: rejection.reason,
                    });
                }
            }
        }
        Command::PerformAction { unit, kind } => {
            let turn = world.turns.current();
            let gate = match world.registry.unit_mut(unit) {
                Some(acting) => match acting.state().action_gate(turn) {
                    Some(reason) => Err(reason),
                    None => {
                        acting.state_mut().perform_action(kind);
                        Ok(())
                    }
                },
                None => Err(ActionError::UnknownUnit),
            };

            match gate {
                Ok(()) => out_events.push(Event::ActionPerformed { unit, kind }),
                Err(reason) => {
                    tracing::warn!(unit = unit.get(), ?kind, %reason, "action refused");
                    out_events.push(Event::ActionRejected { unit, reason });
                }
            }
        }
        Command::RecordUnitAction { unit } => {
            world
                .turns
                .record_unit_action(world.registry.units_mut(), unit, out_events);
        }
        Command::DamageUnit { unit, amount } => match world.registry.unit_mut(unit) {
            Some(target) => {
                let defeated = target.state_mut().take_damage(amount);
                let remaining = target.state().health();
                tracing::info!(
                    unit = unit.get(),
                    amount,
                    remaining = remaining.get(),
                    defeated,
                    "unit damaged"
                );
                out_events.push(Event::UnitDamaged {
                    unit,
                    amount,
                    remaining,
                    defeated,
                });
            }
            None => tracing::warn!(unit = unit.get(), "cannot damage unknown unit"),
        },
        Command::EndTurn => {
            world.turns.end_turn(
                world.registry.units_mut(),
                "turn ended on request".to_owned(),
                out_events,
            );
        }
        Command::SetNpcBehavior { unit, behavior } => {
            match world.registry.unit_mut(unit).and_then(Unit::npc_mut) {
                Some(profile) => {
                    profile.behavior = behavior;
                    out_events.push(Event::NpcBehaviorChanged { unit, behavior });
                }
                None => tracing::warn!(unit = unit.get(), "behaviour applies to NPC units only"),
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::collections::BTreeSet;

    use super::{turns::TurnRules, Obstacle, Unit, World};
    use skirmish_core::{Circle, Faction, SpatialGrid, TurnIndex, UnitId, UnitView};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides the grid used for snapping and bounds checks.
    #[must_use]
    pub fn grid(world: &World) -> &SpatialGrid {
        &world.grid
    }

    /// Reports the active turn rules.
    #[must_use]
    pub fn turn_rules(world: &World) -> TurnRules {
        world.turns.rules()
    }

    /// Reports the current turn counter.
    #[must_use]
    pub fn current_turn(world: &World) -> TurnIndex {
        world.turns.current()
    }

    /// Reports whether the player faction owns the current turn.
    #[must_use]
    pub fn is_player_turn(world: &World) -> bool {
        world.turns.current().is_player_turn()
    }

    /// Units recorded as having acted during the current turn.
    #[must_use]
    pub fn acted_this_turn(world: &World) -> &BTreeSet<UnitId> {
        world.turns.acted()
    }

    /// Borrowed view of every unit and obstacle.
    #[must_use]
    pub fn game_state(world: &World) -> GameState<'_> {
        GameState {
            units: world.registry.units(),
            obstacles: world.registry.obstacles(),
        }
    }

    /// Looks up a single unit.
    #[must_use]
    pub fn unit(world: &World, unit: UnitId) -> Option<&Unit> {
        world.registry.unit(unit)
    }

    /// Captures a read-only view of every unit for systems.
    #[must_use]
    pub fn unit_view(world: &World) -> UnitView {
        UnitView::from_snapshots(world.registry.units().iter().map(Unit::snapshot).collect())
    }

    /// Reports whether the footprint is in bounds and overlaps nothing but `exclude`.
    #[must_use]
    pub fn is_placement_valid(world: &World, candidate: &Circle, exclude: Option<UnitId>) -> bool {
        world
            .registry
            .check_placement(&world.grid, candidate, exclude)
            .is_ok()
    }

    /// Summarises how far the owning faction has progressed through the current turn.
    #[must_use]
    pub fn turn_progress(world: &World) -> TurnProgress {
        let turn = world.turns.current();
        let owner = turn.owner();
        let living: Vec<&Unit> = world
            .registry
            .units()
            .iter()
            .filter(|unit| unit.state().faction() == owner && !unit.state().is_dead())
            .collect();
        TurnProgress {
            turn,
            owner,
            acted: living.iter().filter(|unit| unit.state().has_acted()).count(),
            living: living.len(),
        }
    }

    /// Borrowed view of the registry contents.
    #[derive(Clone, Copy, Debug)]
    pub struct GameState<'a> {
        units: &'a [Unit],
        obstacles: &'a [Obstacle],
    }

    impl<'a> GameState<'a> {
        /// Every unit in creation order, including dead ones.
        #[must_use]
        pub fn units(&self) -> &'a [Unit] {
            self.units
        }

        /// Every obstacle in creation order.
        #[must_use]
        pub fn obstacles(&self) -> &'a [Obstacle] {
            self.obstacles
        }

        /// Living units belonging to the provided faction.
        pub fn living(&self, faction: Faction) -> impl Iterator<Item = &'a Unit> + 'a {
            self.units
                .iter()
                .filter(move |unit| unit.state().faction() == faction && !unit.state().is_dead())
        }
    }

    /// Progress of the owning faction through the current turn.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct TurnProgress {
        /// Current turn.
        pub turn: TurnIndex,
        /// Faction that owns the turn.
        pub owner: Faction,
        /// Living units of the owner that already acted.
        pub acted: usize,
        /// Living units of the owner.
        pub living: usize,
    }
}
