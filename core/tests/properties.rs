//! Property-based tests for grid snapping, overlap and damage.

use proptest::prelude::*;

use skirmish_core::{Circle, Faction, Health, PixelPoint, SpatialGrid, TurnIndex, UnitState};

fn coordinate() -> impl Strategy<Value = i32> {
    -100_000i32..100_000
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    /// Overlap does not depend on argument order.
    #[test]
    fn prop_overlap_is_symmetric(
        ax in coordinate(),
        ay in coordinate(),
        ar in 0u32..500,
        bx in coordinate(),
        by in coordinate(),
        br in 0u32..500
    ) {
        let a = Circle::new(PixelPoint::new(ax, ay), ar);
        let b = Circle::new(PixelPoint::new(bx, by), br);
        prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
    }

    /// A circle with a positive radius overlaps itself.
    #[test]
    fn prop_circle_overlaps_itself(x in coordinate(), y in coordinate(), radius in 1u32..500) {
        let circle = Circle::new(PixelPoint::new(x, y), radius);
        prop_assert!(circle.overlaps(&circle));
    }

    /// Snapping a cell center yields the same cell and center.
    #[test]
    fn prop_resolve_cell_is_idempotent(
        x in coordinate(),
        y in coordinate(),
        grid_size in 1u32..200
    ) {
        let grid = SpatialGrid::new(1_000, 800, grid_size);
        let first = grid.resolve_cell(PixelPoint::new(x, y));
        let second = grid.resolve_cell(first.center);
        prop_assert_eq!(first, second);
    }

    /// The resolved cell always contains the input point.
    #[test]
    fn prop_resolved_cell_contains_point(
        x in coordinate(),
        y in coordinate(),
        grid_size in 1u32..200
    ) {
        let grid = SpatialGrid::new(1_000, 800, grid_size);
        let resolved = grid.resolve_cell(PixelPoint::new(x, y));
        let size = i64::from(grid_size);
        let left = i64::from(resolved.cell.column()) * size;
        let top = i64::from(resolved.cell.row()) * size;
        prop_assert!(left <= i64::from(x) && i64::from(x) < left + size);
        prop_assert!(top <= i64::from(y) && i64::from(y) < top + size);
    }

    /// Health never underflows and death is reported exactly at zero.
    #[test]
    fn prop_damage_clamps_at_zero(
        max_health in 0u32..1_000,
        hits in proptest::collection::vec(0u32..400, 0..8)
    ) {
        let mut state = UnitState::new(Faction::Npc, Health::new(max_health), 5);
        let mut expected = max_health;
        for amount in hits {
            let defeated = state.take_damage(amount);
            expected = expected.saturating_sub(amount);
            prop_assert_eq!(state.health(), Health::new(expected));
            prop_assert_eq!(defeated, expected == 0);
        }
        prop_assert!(state.health() <= state.max_health());
    }

    /// Only the owning faction of a turn may act, and only while alive and idle.
    #[test]
    fn prop_gate_follows_parity(turn in 0u64..1_000, player in any::<bool>()) {
        let faction = if player { Faction::Player } else { Faction::Npc };
        let turn = TurnIndex::new(turn);
        let state = UnitState::new(faction, Health::new(10), 3);
        prop_assert_eq!(state.can_move(turn), turn.owner() == faction);
        prop_assert_eq!(state.can_move(turn), state.can_attack(turn));
    }
}
