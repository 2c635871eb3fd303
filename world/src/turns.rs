//! Turn controller: parity-based ownership, per-turn resets and end-of-turn validators.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use skirmish_core::{ActionError, Event, TurnIndex, UnitId};

use crate::units::Unit;

/// Tunable rules consulted by the turn controller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TurnRules {
    /// When set, dead units count toward "every unit has acted", so a faction
    /// with a fallen unit never ends its turn automatically.
    pub dead_units_stall_turn: bool,
}

/// Outcome reported by a single end-of-turn validator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndTurnVerdict {
    /// Indicates whether the current turn should end now.
    pub should_end_turn: bool,
    /// Explanation suitable for logs and the `TurnEnded` event.
    pub message: String,
}

impl EndTurnVerdict {
    /// Verdict that ends the turn.
    #[must_use]
    pub fn end(message: impl Into<String>) -> Self {
        Self {
            should_end_turn: true,
            message: message.into(),
        }
    }

    /// Verdict that keeps the turn running.
    #[must_use]
    pub fn continue_turn(message: impl Into<String>) -> Self {
        Self {
            should_end_turn: false,
            message: message.into(),
        }
    }
}

/// Read-only state handed to end-of-turn validators.
#[derive(Clone, Copy, Debug)]
pub struct TurnContext<'a> {
    /// Turn being evaluated.
    pub turn: TurnIndex,
    /// Every unit in the registry, in creation order.
    pub units: &'a [Unit],
    /// Units recorded as having acted during this turn.
    pub acted: &'a BTreeSet<UnitId>,
    /// Active rule set.
    pub rules: TurnRules,
}

/// Pure function deciding whether the current turn is over.
pub type EndTurnValidator = fn(&TurnContext<'_>) -> EndTurnVerdict;

/// Ends the turn once every unit of the owning faction has acted.
///
/// Dead units are skipped unless [`TurnRules::dead_units_stall_turn`] is set.
/// A faction with no eligible units satisfies the check vacuously.
#[must_use]
pub fn all_current_turn_units_acted(context: &TurnContext<'_>) -> EndTurnVerdict {
    let owner = context.turn.owner();
    let pending = context
        .units
        .iter()
        .filter(|unit| unit.state().faction() == owner)
        .filter(|unit| context.rules.dead_units_stall_turn || !unit.state().is_dead())
        .find(|unit| !unit.state().has_acted());

    match pending {
        Some(unit) => EndTurnVerdict::continue_turn(format!(
            "{} has not acted yet",
            unit.label()
        )),
        None => EndTurnVerdict::end(format!("all {owner} units have acted")),
    }
}

/// Tracks the turn counter and the set of units that acted this turn.
#[derive(Debug)]
pub(crate) struct TurnController {
    current: TurnIndex,
    acted: BTreeSet<UnitId>,
    validators: Vec<EndTurnValidator>,
    rules: TurnRules,
}

impl TurnController {
    pub(crate) fn new(rules: TurnRules) -> Self {
        Self {
            current: TurnIndex::FIRST,
            acted: BTreeSet::new(),
            validators: vec![all_current_turn_units_acted],
            rules,
        }
    }

    pub(crate) const fn current(&self) -> TurnIndex {
        self.current
    }

    pub(crate) fn acted(&self) -> &BTreeSet<UnitId> {
        &self.acted
    }

    pub(crate) const fn rules(&self) -> TurnRules {
        self.rules
    }

    /// Appends a validator. Validators run in insertion order.
    pub(crate) fn push_validator(&mut self, validator: EndTurnValidator) {
        self.validators.push(validator);
    }

    /// Returns to turn zero without touching the validator list.
    pub(crate) fn restart(&mut self, units: &mut [Unit], out_events: &mut Vec<Event>) {
        self.current = TurnIndex::FIRST;
        self.start_turn(units, out_events);
    }

    /// Clears per-turn bookkeeping for every unit, whichever faction owns the turn.
    pub(crate) fn start_turn(&mut self, units: &mut [Unit], out_events: &mut Vec<Event>) {
        self.acted.clear();
        for unit in units.iter_mut() {
            unit.state_mut().reset_action_state();
        }

        let faction = self.current.owner();
        tracing::info!(turn = self.current.get(), %faction, "turn started");
        out_events.push(Event::TurnStarted {
            turn: self.current,
            faction,
        });
    }

    /// Advances the counter and starts the next turn.
    pub(crate) fn end_turn(
        &mut self,
        units: &mut [Unit],
        reason: String,
        out_events: &mut Vec<Event>,
    ) {
        tracing::info!(turn = self.current.get(), %reason, "turn ended");
        out_events.push(Event::TurnEnded {
            turn: self.current,
            reason,
        });
        self.current = self.current.next();
        self.start_turn(units, out_events);
    }

    /// Marks the unit as acted, remembers it and evaluates the validators.
    pub(crate) fn record_unit_action(
        &mut self,
        units: &mut [Unit],
        unit: UnitId,
        out_events: &mut Vec<Event>,
    ) {
        let Some(acting) = units.iter_mut().find(|candidate| candidate.id() == unit) else {
            tracing::warn!(unit = unit.get(), "cannot record action for unknown unit");
            out_events.push(Event::ActionRejected {
                unit,
                reason: ActionError::UnknownUnit,
            });
            return;
        };

        acting.state_mut().mark_acted();
        let _ = self.acted.insert(unit);
        out_events.push(Event::UnitActionRecorded {
            unit,
            acted_this_turn: self.acted.len(),
        });

        let _ = self.check_end_turn_conditions(units, out_events);
    }

    /// Runs the validators in order and ends the turn on the first positive verdict.
    pub(crate) fn check_end_turn_conditions(
        &mut self,
        units: &mut [Unit],
        out_events: &mut Vec<Event>,
    ) -> bool {
        let verdict = {
            let context = TurnContext {
                turn: self.current,
                units: &*units,
                acted: &self.acted,
                rules: self.rules,
            };
            self.validators
                .iter()
                .map(|validator| validator(&context))
                .find(|verdict| verdict.should_end_turn)
        };

        match verdict {
            Some(verdict) => {
                self.end_turn(units, verdict.message, out_events);
                true
            }
            None => false,
        }
    }
}
