//! Authoritative unit and obstacle storage with validated placement.

use skirmish_core::{
    Circle, ObstacleId, PixelPoint, PlacementError, SpatialGrid, UnitBlueprint, UnitId,
};

use crate::{
    collision,
    units::{Obstacle, Unit},
};

/// Reason and snapped position of a refused placement or move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Rejection {
    pub(crate) position: PixelPoint,
    pub(crate) reason: PlacementError,
}

/// Completed relocation of a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Relocation {
    pub(crate) from: PixelPoint,
    pub(crate) to: PixelPoint,
}

/// Registry that stores units and obstacles and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct Registry {
    units: Vec<Unit>,
    obstacles: Vec<Obstacle>,
    next_unit_id: UnitId,
    next_obstacle_id: ObstacleId,
}

impl Registry {
    /// Creates an empty registry with reset identifier counters.
    pub(crate) fn new() -> Self {
        Self {
            units: Vec::new(),
            obstacles: Vec::new(),
            next_unit_id: UnitId::new(0),
            next_obstacle_id: ObstacleId::new(0),
        }
    }

    pub(crate) fn units(&self) -> &[Unit] {
        &self.units
    }

    pub(crate) fn units_mut(&mut self) -> &mut [Unit] {
        &mut self.units
    }

    pub(crate) fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub(crate) fn unit(&self, unit: UnitId) -> Option<&Unit> {
        self.units.iter().find(|candidate| candidate.id() == unit)
    }

    pub(crate) fn unit_mut(&mut self, unit: UnitId) -> Option<&mut Unit> {
        self.units.iter_mut().find(|candidate| candidate.id() == unit)
    }

    /// Validates a footprint against the grid and every stored entity.
    pub(crate) fn check_placement(
        &self,
        grid: &SpatialGrid,
        candidate: &Circle,
        exclude: Option<UnitId>,
    ) -> Result<(), PlacementError> {
        collision::check_placement(grid, &self.obstacles, &self.units, candidate, exclude)
    }

    /// Snaps the blueprint to its cell center and stores it when the placement is valid.
    pub(crate) fn add_unit(
        &mut self,
        grid: &SpatialGrid,
        blueprint: UnitBlueprint,
    ) -> Result<(UnitId, PixelPoint), Rejection> {
        let position = grid.resolve_cell(blueprint.position).center;
        let candidate = Circle::new(position, blueprint.radius);
        self.check_placement(grid, &candidate, None)
            .map_err(|reason| Rejection { position, reason })?;

        let id = self.next_unit_id;
        self.next_unit_id = UnitId::new(id.get().saturating_add(1));
        self.units.push(Unit::new(
            id,
            blueprint.label,
            position,
            blueprint.radius,
            blueprint.state,
            blueprint.npc,
        ));
        Ok((id, position))
    }

    /// Snaps the obstacle to its cell center and stores it when the placement is valid.
    pub(crate) fn add_obstacle(
        &mut self,
        grid: &SpatialGrid,
        position: PixelPoint,
        radius: u32,
    ) -> Result<(ObstacleId, PixelPoint), Rejection> {
        let position = grid.resolve_cell(position).center;
        let candidate = Circle::new(position, radius);
        self.check_placement(grid, &candidate, None)
            .map_err(|reason| Rejection { position, reason })?;

        let id = self.next_obstacle_id;
        self.next_obstacle_id = ObstacleId::new(id.get().saturating_add(1));
        self.obstacles.push(Obstacle::new(id, position, radius));
        Ok((id, position))
    }

    /// Relocates a unit to the cell containing `destination`.
    ///
    /// The moving unit is excluded from the collision scan so it never blocks
    /// itself. A rejected move leaves the unit where it was.
    pub(crate) fn move_unit(
        &mut self,
        grid: &SpatialGrid,
        unit: UnitId,
        destination: PixelPoint,
    ) -> Result<Relocation, Rejection> {
        let position = grid.resolve_cell(destination).center;
        let Some(radius) = self.unit(unit).map(Unit::radius) else {
            return Err(Rejection {
                position,
                reason: PlacementError::UnknownUnit,
            });
        };

        let candidate = Circle::new(position, radius);
        self.check_placement(grid, &candidate, Some(unit))
            .map_err(|reason| Rejection { position, reason })?;

        let Some(moving) = self.unit_mut(unit) else {
            return Err(Rejection {
                position,
                reason: PlacementError::UnknownUnit,
            });
        };
        let from = moving.position();
        moving.relocate(position);
        Ok(Relocation { from, to: position })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::{Faction, Health, UnitState};

    fn blueprint(label: &str, x: i32, y: i32, radius: u32) -> UnitBlueprint {
        UnitBlueprint {
            label: label.to_owned(),
            position: PixelPoint::new(x, y),
            radius,
            state: UnitState::new(Faction::Player, Health::new(30), 5),
            npc: None,
        }
    }

    #[test]
    fn registry_starts_empty_with_zero_identifiers() {
        let registry = Registry::new();
        assert!(registry.units().is_empty());
        assert!(registry.obstacles().is_empty());
        assert_eq!(registry.next_unit_id.get(), 0);
        assert_eq!(registry.next_obstacle_id.get(), 0);
    }

    #[test]
    fn unit_is_snapped_before_validation() {
        let grid = SpatialGrid::new(1_000, 800, 40);
        let mut registry = Registry::new();

        let (id, position) = registry
            .add_unit(&grid, blueprint("Soldier", 113, 97, 20))
            .expect("free cell");

        assert_eq!(position, PixelPoint::new(100, 100));
        let unit = registry.unit(id).expect("stored unit");
        assert_eq!(unit.position(), position);
    }

    #[test]
    fn rejected_unit_is_not_stored_and_consumes_no_identifier() {
        let grid = SpatialGrid::new(1_000, 800, 40);
        let mut registry = Registry::new();
        let _ = registry
            .add_unit(&grid, blueprint("first", 100, 100, 20))
            .expect("free cell");

        let rejection = registry
            .add_unit(&grid, blueprint("second", 105, 105, 20))
            .expect_err("occupied cell");
        assert_eq!(rejection.reason, PlacementError::Collision);
        assert_eq!(rejection.position, PixelPoint::new(100, 100));
        assert_eq!(registry.units().len(), 1);

        let (third, _) = registry
            .add_unit(&grid, blueprint("third", 300, 300, 20))
            .expect("free cell");
        assert_eq!(third, UnitId::new(1));
    }

    #[test]
    fn moving_onto_own_cell_is_valid() {
        let grid = SpatialGrid::new(1_000, 800, 40);
        let mut registry = Registry::new();
        let (id, _) = registry
            .add_unit(&grid, blueprint("Soldier", 100, 100, 20))
            .expect("free cell");

        let relocation = registry
            .move_unit(&grid, id, PixelPoint::new(110, 90))
            .expect("own cell");
        assert_eq!(relocation.from, relocation.to);
    }

    #[test]
    fn moving_unknown_unit_is_rejected() {
        let grid = SpatialGrid::default();
        let mut registry = Registry::new();

        let rejection = registry
            .move_unit(&grid, UnitId::new(3), PixelPoint::new(100, 100))
            .expect_err("missing unit");
        assert_eq!(rejection.reason, PlacementError::UnknownUnit);
    }
}
