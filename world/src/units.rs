//! Units and obstacles as stored by the world.

use skirmish_core::{
    Circle, NpcProfile, ObstacleId, ObstacleSnapshot, PixelPoint, UnitId, UnitSnapshot, UnitState,
};

/// Unit stored inside the world. Mutated only through `apply`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Unit {
    id: UnitId,
    label: String,
    position: PixelPoint,
    radius: u32,
    state: UnitState,
    npc: Option<NpcProfile>,
}

impl Unit {
    pub(crate) fn new(
        id: UnitId,
        label: String,
        position: PixelPoint,
        radius: u32,
        state: UnitState,
        npc: Option<NpcProfile>,
    ) -> Self {
        Self {
            id,
            label,
            position,
            radius,
            state,
            npc,
        }
    }

    /// Identifier allocated by the world.
    #[must_use]
    pub const fn id(&self) -> UnitId {
        self.id
    }

    /// Display label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Cell center currently occupied.
    #[must_use]
    pub const fn position(&self) -> PixelPoint {
        self.position
    }

    /// Collision radius in pixels.
    #[must_use]
    pub const fn radius(&self) -> u32 {
        self.radius
    }

    /// Collision footprint at the current position.
    #[must_use]
    pub const fn footprint(&self) -> Circle {
        Circle::new(self.position, self.radius)
    }

    /// Combat statistics and action bookkeeping.
    #[must_use]
    pub const fn state(&self) -> &UnitState {
        &self.state
    }

    /// NPC attributes, present only for NPC units.
    #[must_use]
    pub const fn npc(&self) -> Option<&NpcProfile> {
        self.npc.as_ref()
    }

    /// Captures an owned snapshot for systems and adapters.
    #[must_use]
    pub fn snapshot(&self) -> UnitSnapshot {
        UnitSnapshot {
            id: self.id,
            label: self.label.clone(),
            position: self.position,
            radius: self.radius,
            state: self.state,
            npc: self.npc,
        }
    }

    pub(crate) fn state_mut(&mut self) -> &mut UnitState {
        &mut self.state
    }

    pub(crate) fn npc_mut(&mut self) -> Option<&mut NpcProfile> {
        self.npc.as_mut()
    }

    pub(crate) fn relocate(&mut self, position: PixelPoint) {
        self.position = position;
    }
}

/// Static obstacle. Never moves and is never removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Obstacle {
    id: ObstacleId,
    position: PixelPoint,
    radius: u32,
}

impl Obstacle {
    pub(crate) const fn new(id: ObstacleId, position: PixelPoint, radius: u32) -> Self {
        Self {
            id,
            position,
            radius,
        }
    }

    /// Identifier allocated by the world.
    #[must_use]
    pub const fn id(&self) -> ObstacleId {
        self.id
    }

    /// Cell center occupied by the obstacle.
    #[must_use]
    pub const fn position(&self) -> PixelPoint {
        self.position
    }

    /// Collision radius in pixels.
    #[must_use]
    pub const fn radius(&self) -> u32 {
        self.radius
    }

    /// Collision footprint of the obstacle.
    #[must_use]
    pub const fn footprint(&self) -> Circle {
        Circle::new(self.position, self.radius)
    }

    /// Captures a snapshot for systems and adapters.
    #[must_use]
    pub const fn snapshot(&self) -> ObstacleSnapshot {
        ObstacleSnapshot {
            id: self.id,
            position: self.position,
            radius: self.radius,
        }
    }
}
