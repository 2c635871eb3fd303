//! Session loop that feeds scripted input through the orders system into the world.

use skirmish_core::{Command, Event};
use skirmish_system_bootstrap::{Bootstrap, Scenario};
use skirmish_system_orders::{OrderInput, Orders};
use skirmish_world::{self as world, query, World};

use crate::{save_slot::SaveSlot, script::ScriptLine};

/// Owns the world and the systems that drive it for one playthrough.
#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    orders: Orders,
    save_slot: SaveSlot,
}

impl Session {
    /// Builds the world described by the scenario and applies its opening commands.
    pub(crate) fn start(bootstrap: &Bootstrap, scenario: &Scenario) -> Self {
        let mut session = Self {
            world: bootstrap.world(scenario),
            orders: Orders::new(),
            save_slot: SaveSlot::default(),
        };
        let events = session.pump(bootstrap.commands(scenario), None);
        let rejected = events
            .iter()
            .filter(|event| {
                matches!(
                    event,
                    Event::UnitPlacementRejected { .. } | Event::ObstaclePlacementRejected { .. }
                )
            })
            .count();
        tracing::info!(
            units = query::game_state(&session.world).units().len(),
            rejected,
            "scenario loaded"
        );
        session
    }

    /// Read-only access to the world.
    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    /// Save slot filled by `save` instructions.
    pub(crate) fn save_slot(&self) -> &SaveSlot {
        &self.save_slot
    }

    /// Executes one scripted instruction and returns every event it caused.
    pub(crate) fn submit(&mut self, line: ScriptLine) -> Vec<Event> {
        let input = match line {
            ScriptLine::Hover(point) => OrderInput::PointerMoved(point),
            ScriptLine::Click(point) => OrderInput::Click(point),
            ScriptLine::EndTurn => OrderInput::EndTurn,
            ScriptLine::Save => {
                let snapshot = self.save_slot.save(&self.world);
                tracing::info!(
                    turn = snapshot.turn.get(),
                    units = snapshot.units.len(),
                    "game saved"
                );
                return Vec::new();
            }
            ScriptLine::DiscardSave => {
                self.save_slot.reset();
                tracing::info!("save discarded");
                return Vec::new();
            }
        };

        let events = self.pump(Vec::new(), Some(input));
        if events.iter().any(|event| matches!(event, Event::TurnStarted { .. })) {
            self.report_turn_progress();
        }
        events
    }

    /// Logs the owning faction's progress, flagging turns nobody can act in.
    fn report_turn_progress(&self) {
        let progress = query::turn_progress(&self.world);
        if progress.living == 0 {
            tracing::warn!(
                turn = progress.turn.get(),
                faction = %progress.owner,
                "no living units; end the turn to continue"
            );
        } else {
            tracing::info!(
                turn = progress.turn.get(),
                faction = %progress.owner,
                acted = progress.acted,
                living = progress.living,
                "turn in progress"
            );
        }
    }

    /// Applies commands and relays the resulting events to the orders system until it goes quiet.
    fn pump(&mut self, mut commands: Vec<Command>, mut input: Option<OrderInput>) -> Vec<Event> {
        let mut log = Vec::new();
        let mut events = Vec::new();

        loop {
            events.clear();
            for command in commands.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }
            for event in &events {
                tracing::debug!(?event, "event");
            }
            log.extend(events.iter().cloned());

            let units = query::unit_view(&self.world);
            let turn = query::current_turn(&self.world);
            let grid = *query::grid(&self.world);
            let world = &self.world;
            self.orders.handle(
                &events,
                input.take(),
                &units,
                turn,
                &grid,
                |candidate, unit| query::is_placement_valid(world, candidate, Some(unit)),
                &mut commands,
            );

            if commands.is_empty() {
                break;
            }
        }

        log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::{ActionKind, Faction, PixelPoint, TurnIndex, UnitId};

    fn session() -> Session {
        Session::start(&Bootstrap, &Scenario::default())
    }

    fn click(session: &mut Session, x: i32, y: i32) -> Vec<Event> {
        session.submit(ScriptLine::Click(PixelPoint::new(x, y)))
    }

    #[test]
    fn default_scenario_starts_on_player_turn() {
        let session = session();

        assert_eq!(query::current_turn(session.world()), TurnIndex::FIRST);
        assert_eq!(query::game_state(session.world()).units().len(), 4);
        assert!(session.save_slot().saved().is_none());
    }

    #[test]
    fn select_then_click_moves_and_records() {
        let mut session = session();

        assert!(click(&mut session, 100, 100).is_empty());
        let events = click(&mut session, 300, 140);

        assert!(events.contains(&Event::ActionPerformed {
            unit: UnitId::new(0),
            kind: ActionKind::Move,
        }));
        let soldier = query::unit(session.world(), UnitId::new(0)).expect("soldier");
        assert_eq!(soldier.position(), PixelPoint::new(300, 140));
    }

    #[test]
    fn both_player_moves_hand_over_to_npcs() {
        let mut session = session();
        let _ = click(&mut session, 100, 100);
        let _ = click(&mut session, 300, 140);
        let _ = click(&mut session, 100, 300);
        let events = click(&mut session, 380, 300);

        assert!(events.contains(&Event::TurnStarted {
            turn: TurnIndex::new(1),
            faction: Faction::Npc,
        }));
    }

    #[test]
    fn save_and_discard_manage_the_slot() {
        let mut session = session();

        let _ = session.submit(ScriptLine::Save);
        assert_eq!(
            session.save_slot().saved().map(|saved| saved.turn),
            Some(TurnIndex::FIRST)
        );

        let _ = session.submit(ScriptLine::DiscardSave);
        assert!(session.save_slot().saved().is_none());
    }

    #[test]
    fn end_turn_advances_without_actions() {
        let mut session = session();

        let _ = session.submit(ScriptLine::EndTurn);

        assert_eq!(query::current_turn(session.world()), TurnIndex::new(1));
    }
}
