//! Circle overlap checks against every obstacle and unit in the registry.

use skirmish_core::{Circle, PlacementError, SpatialGrid, UnitId};

use crate::units::{Obstacle, Unit};

/// Reports whether the candidate overlaps any obstacle or any unit other than `exclude`.
///
/// Dead units are still scanned; their bodies keep blocking the cell.
pub(crate) fn has_collision(
    obstacles: &[Obstacle],
    units: &[Unit],
    candidate: &Circle,
    exclude: Option<UnitId>,
) -> bool {
    obstacles
        .iter()
        .any(|obstacle| candidate.overlaps(&obstacle.footprint()))
        || units
            .iter()
            .filter(|unit| Some(unit.id()) != exclude)
            .any(|unit| candidate.overlaps(&unit.footprint()))
}

/// Validates a footprint, reporting bounds violations before collisions.
pub(crate) fn check_placement(
    grid: &SpatialGrid,
    obstacles: &[Obstacle],
    units: &[Unit],
    candidate: &Circle,
    exclude: Option<UnitId>,
) -> Result<(), PlacementError> {
    if !grid.is_within_bounds(candidate) {
        return Err(PlacementError::OutOfBounds);
    }

    if has_collision(obstacles, units, candidate, exclude) {
        return Err(PlacementError::Collision);
    }

    Ok(())
}
