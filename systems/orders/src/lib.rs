#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure orders system that turns pointer input into unit commands.
//!
//! A first click selects a unit of the faction that owns the turn. A second
//! click either attacks a living enemy under the pointer or moves the selected
//! unit there. Moves are two-phase: the action is only spent once the world
//! confirms the relocation with [`Event::UnitMoved`].

use skirmish_core::{
    ActionKind, Circle, Command, Event, PixelPoint, SpatialGrid, TurnIndex, UnitId, UnitSnapshot,
    UnitView,
};

/// Pointer input distilled by an adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderInput {
    /// Cursor moved to the provided map position.
    PointerMoved(PixelPoint),
    /// Player clicked the provided map position.
    Click(PixelPoint),
    /// Player requested the current turn to end.
    EndTurn,
}

/// Preview of the move the selected unit would make.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MovePreview {
    /// Unit that would move.
    pub unit: UnitId,
    /// Cell center the unit currently occupies.
    pub from: PixelPoint,
    /// Cell center under the cursor.
    pub to: PixelPoint,
    /// Indicates whether the world would accept the move.
    pub placeable: bool,
}

/// Orders system holding the current selection and any move awaiting confirmation.
#[derive(Debug, Default, Clone)]
pub struct Orders {
    selected: Option<UnitId>,
    preview: Option<MovePreview>,
    pending_move: Option<UnitId>,
}

impl Orders {
    /// Creates an orders system with nothing selected.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            selected: None,
            preview: None,
            pending_move: None,
        }
    }

    /// Unit currently selected, if any.
    #[must_use]
    pub const fn selected(&self) -> Option<UnitId> {
        self.selected
    }

    /// Move preview for the selected unit, if any.
    #[must_use]
    pub const fn preview(&self) -> Option<MovePreview> {
        self.preview
    }

    /// Unit whose move was requested but not yet confirmed.
    #[must_use]
    pub const fn pending_move(&self) -> Option<UnitId> {
        self.pending_move
    }

    /// Consumes world events and optional input to emit unit commands.
    ///
    /// The `placement_valid` closure should mirror the world's
    /// `query::is_placement_valid`, excluding the provided unit.
    #[allow(clippy::too_many_arguments)]
    pub fn handle<F>(
        &mut self,
        events: &[Event],
        input: Option<OrderInput>,
        units: &UnitView,
        turn: TurnIndex,
        grid: &SpatialGrid,
        mut placement_valid: F,
        out: &mut Vec<Command>,
    ) where
        F: FnMut(&Circle, UnitId) -> bool,
    {
        for event in events {
            self.observe(event, out);
        }

        match input {
            Some(OrderInput::PointerMoved(point)) => {
                self.update_preview(point, units, grid, &mut placement_valid);
            }
            Some(OrderInput::Click(point)) => match self.selected {
                None => self.select(point, units, turn, grid, &mut placement_valid),
                Some(selected) => {
                    self.issue(selected, point, units, turn, out);
                    self.clear_selection();
                }
            },
            Some(OrderInput::EndTurn) => {
                self.clear_selection();
                out.push(Command::EndTurn);
            }
            None => {}
        }
    }

    fn observe(&mut self, event: &Event, out: &mut Vec<Command>) {
        match event {
            Event::UnitMoved { unit, .. } if self.pending_move == Some(*unit) => {
                self.pending_move = None;
                out.push(Command::PerformAction {
                    unit: *unit,
                    kind: ActionKind::Move,
                });
                out.push(Command::RecordUnitAction { unit: *unit });
            }
            Event::UnitMoveRejected { unit, reason, .. } if self.pending_move == Some(*unit) => {
                self.pending_move = None;
                tracing::debug!(unit = unit.get(), %reason, "move not confirmed, action kept");
            }
            Event::TurnStarted { .. } | Event::MapConfigured { .. } => self.clear_selection(),
            _ => {}
        }
    }

    fn select<F>(
        &mut self,
        point: PixelPoint,
        units: &UnitView,
        turn: TurnIndex,
        grid: &SpatialGrid,
        placement_valid: &mut F,
    ) where
        F: FnMut(&Circle, UnitId) -> bool,
    {
        let Some(unit) = units.iter().find(|unit| unit.contains_click(point)) else {
            return;
        };

        if unit.state.can_move(turn) {
            tracing::debug!(unit = unit.id.get(), label = %unit.label, "unit selected");
            self.selected = Some(unit.id);
            self.preview = Some(preview_for(unit, point, grid, placement_valid));
        } else if unit.state.has_acted() {
            tracing::info!(
                unit = unit.id.get(),
                label = %unit.label,
                action = ?unit.state.action(),
                "unit has already acted"
            );
        }
    }

    fn issue(
        &mut self,
        selected: UnitId,
        point: PixelPoint,
        units: &UnitView,
        turn: TurnIndex,
        out: &mut Vec<Command>,
    ) {
        let Some(attacker) = units.get(selected) else {
            return;
        };
        if let Some(reason) = attacker.state.action_gate(turn) {
            tracing::debug!(unit = selected.get(), %reason, "selected unit can no longer act");
            return;
        }

        let target = units
            .iter()
            .filter(|unit| !unit.state.is_dead())
            .filter(|unit| unit.contains_click(point))
            .find(|unit| unit.state.faction() != attacker.state.faction());

        match target {
            Some(target) => attack(attacker, target, out),
            None => {
                tracing::debug!(
                    unit = attacker.id.get(),
                    x = point.x(),
                    y = point.y(),
                    "move requested"
                );
                self.pending_move = Some(attacker.id);
                out.push(Command::MoveUnit {
                    unit: attacker.id,
                    destination: point,
                });
            }
        }
    }

    fn update_preview<F>(
        &mut self,
        point: PixelPoint,
        units: &UnitView,
        grid: &SpatialGrid,
        placement_valid: &mut F,
    ) where
        F: FnMut(&Circle, UnitId) -> bool,
    {
        let Some(unit) = self.selected.and_then(|selected| units.get(selected)) else {
            self.preview = None;
            return;
        };

        self.preview = Some(preview_for(unit, point, grid, placement_valid));
    }

    fn clear_selection(&mut self) {
        self.selected = None;
        self.preview = None;
    }
}

fn preview_for<F>(
    unit: &UnitSnapshot,
    point: PixelPoint,
    grid: &SpatialGrid,
    placement_valid: &mut F,
) -> MovePreview
where
    F: FnMut(&Circle, UnitId) -> bool,
{
    let to = grid.resolve_cell(point).center;
    MovePreview {
        unit: unit.id,
        from: unit.position,
        to,
        placeable: placement_valid(&Circle::new(to, unit.radius), unit.id),
    }
}

fn attack(attacker: &UnitSnapshot, target: &UnitSnapshot, out: &mut Vec<Command>) {
    tracing::info!(
        attacker = %attacker.label,
        target = %target.label,
        damage = attacker.state.damage(),
        target_health = target.state.health().get(),
        "enemy unit targeted"
    );
    out.push(Command::DamageUnit {
        unit: target.id,
        amount: attacker.state.damage(),
    });
    out.push(Command::PerformAction {
        unit: attacker.id,
        kind: ActionKind::Attack,
    });
    out.push(Command::RecordUnitAction { unit: attacker.id });
}
