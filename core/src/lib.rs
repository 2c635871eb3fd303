#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Skirmish engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.
//!
//! The pure pieces of the rules live here as well: grid snapping
//! ([`SpatialGrid`]), circle overlap ([`Circle::overlaps`]) and the per-unit
//! action gate ([`UnitState`]).

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Skirmish.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Replaces the map bounds and cell size, clearing every entity and restarting at turn zero.
    ConfigureMap {
        /// Width of the map measured in pixels.
        width: u32,
        /// Height of the map measured in pixels.
        height: u32,
        /// Edge length of a single square cell in pixels.
        grid_size: u32,
    },
    /// Requests creation of a unit. The position is snapped to its cell center.
    SpawnUnit {
        /// Description of the unit to create.
        blueprint: UnitBlueprint,
    },
    /// Requests creation of a static obstacle. The position is snapped to its cell center.
    PlaceObstacle {
        /// Requested pixel position of the obstacle.
        position: PixelPoint,
        /// Collision radius of the obstacle in pixels.
        radius: u32,
    },
    /// Requests that a unit relocate to the cell containing the destination.
    ///
    /// The acted flag is untouched; callers follow up with [`Command::PerformAction`].
    MoveUnit {
        /// Identifier of the unit to move.
        unit: UnitId,
        /// Pixel position the move targets.
        destination: PixelPoint,
    },
    /// Marks a unit as having spent its action for the current turn.
    PerformAction {
        /// Identifier of the acting unit.
        unit: UnitId,
        /// Kind of action that was carried out.
        kind: ActionKind,
    },
    /// Records that a unit acted and evaluates the end-of-turn validators.
    RecordUnitAction {
        /// Identifier of the unit that acted.
        unit: UnitId,
    },
    /// Applies damage to a unit.
    DamageUnit {
        /// Identifier of the unit receiving damage.
        unit: UnitId,
        /// Amount of health removed.
        amount: u32,
    },
    /// Ends the current turn unconditionally.
    EndTurn,
    /// Replaces the inert behaviour tag carried by an NPC unit.
    SetNpcBehavior {
        /// Identifier of the NPC unit.
        unit: UnitId,
        /// Behaviour tag to assign.
        behavior: NpcBehavior,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that the map was reconfigured and all entities were cleared.
    MapConfigured {
        /// Grid describing the new map.
        grid: SpatialGrid,
    },
    /// Confirms that a unit joined the registry.
    UnitSpawned {
        /// Identifier assigned to the unit.
        unit: UnitId,
        /// Faction the unit fights for.
        faction: Faction,
        /// Cell center the unit occupies.
        position: PixelPoint,
    },
    /// Reports that a unit could not be created.
    UnitPlacementRejected {
        /// Label of the unit that was dropped.
        label: String,
        /// Snapped position that failed validation.
        position: PixelPoint,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that an obstacle joined the registry.
    ObstaclePlaced {
        /// Identifier assigned to the obstacle.
        obstacle: ObstacleId,
        /// Cell center the obstacle occupies.
        position: PixelPoint,
        /// Collision radius of the obstacle.
        radius: u32,
    },
    /// Reports that an obstacle could not be created.
    ObstaclePlacementRejected {
        /// Snapped position that failed validation.
        position: PixelPoint,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a unit moved between two cell centers.
    UnitMoved {
        /// Identifier of the unit that moved.
        unit: UnitId,
        /// Position held before the move.
        from: PixelPoint,
        /// Position held after the move.
        to: PixelPoint,
    },
    /// Reports that a move request was rejected and the unit stayed put.
    UnitMoveRejected {
        /// Identifier of the unit that attempted to move.
        unit: UnitId,
        /// Snapped destination that failed validation.
        destination: PixelPoint,
        /// Specific reason the move failed.
        reason: PlacementError,
    },
    /// Confirms that a unit spent its action.
    ActionPerformed {
        /// Identifier of the acting unit.
        unit: UnitId,
        /// Kind of action recorded.
        kind: ActionKind,
    },
    /// Reports that a unit was not allowed to act.
    ActionRejected {
        /// Identifier of the unit that attempted to act.
        unit: UnitId,
        /// Specific reason the action was refused.
        reason: ActionError,
    },
    /// Confirms that an action was recorded against the current turn.
    UnitActionRecorded {
        /// Identifier of the unit that acted.
        unit: UnitId,
        /// Number of distinct units recorded during the current turn.
        acted_this_turn: usize,
    },
    /// Confirms that a unit lost health.
    UnitDamaged {
        /// Identifier of the damaged unit.
        unit: UnitId,
        /// Damage requested.
        amount: u32,
        /// Health remaining after the hit.
        remaining: Health,
        /// Indicates whether the unit is now dead.
        defeated: bool,
    },
    /// Announces that a turn finished.
    TurnEnded {
        /// Turn that just finished.
        turn: TurnIndex,
        /// Human readable explanation supplied by the validator or command.
        reason: String,
    },
    /// Announces that a new turn began and every unit's action state was reset.
    TurnStarted {
        /// Turn that just started.
        turn: TurnIndex,
        /// Faction that owns the new turn.
        faction: Faction,
    },
    /// Confirms that an NPC unit received a new behaviour tag.
    NpcBehaviorChanged {
        /// Identifier of the NPC unit.
        unit: UnitId,
        /// Behaviour tag now assigned.
        behavior: NpcBehavior,
    },
}

/// Integer pixel coordinate on the map surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PixelPoint {
    x: i32,
    y: i32,
}

impl PixelPoint {
    /// Creates a new pixel coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal component measured from the left edge of the map.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical component measured from the top edge of the map.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Squared Euclidean distance to another point.
    #[must_use]
    pub fn distance_squared(self, other: PixelPoint) -> u128 {
        let dx = u128::from((i64::from(self.x) - i64::from(other.x)).unsigned_abs());
        let dy = u128::from((i64::from(self.y) - i64::from(other.y)).unsigned_abs());
        dx * dx + dy * dy
    }
}

/// Circular collision footprint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Circle {
    center: PixelPoint,
    radius: u32,
}

impl Circle {
    /// Creates a circle from its center and radius.
    #[must_use]
    pub const fn new(center: PixelPoint, radius: u32) -> Self {
        Self { center, radius }
    }

    /// Center of the circle.
    #[must_use]
    pub const fn center(&self) -> PixelPoint {
        self.center
    }

    /// Radius of the circle in pixels.
    #[must_use]
    pub const fn radius(&self) -> u32 {
        self.radius
    }

    /// Reports whether two circles overlap.
    ///
    /// Circles overlap when the distance between their centers is strictly
    /// less than the sum of their radii; touching circles do not overlap.
    /// The comparison is carried out on squared integers, which preserves the
    /// strict inequality exactly.
    #[must_use]
    pub fn overlaps(&self, other: &Circle) -> bool {
        let reach = u128::from(self.radius) + u128::from(other.radius);
        self.center.distance_squared(other.center) < reach * reach
    }
}

/// Location of a single grid cell expressed as column and row indices.
///
/// Indices are signed because pointer input may land left of or above the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: i32,
    row: i32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }
}

/// Result of snapping a pixel coordinate onto the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ResolvedCell {
    /// Cell that contains the resolved coordinate.
    pub cell: CellCoord,
    /// Pixel position of the cell's center.
    pub center: PixelPoint,
}

/// Map bounds together with the fixed cell size used for snapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpatialGrid {
    width: u32,
    height: u32,
    grid_size: u32,
}

impl SpatialGrid {
    /// Creates a grid description. A zero cell size is promoted to one pixel.
    #[must_use]
    pub const fn new(width: u32, height: u32, grid_size: u32) -> Self {
        let grid_size = if grid_size == 0 { 1 } else { grid_size };
        Self {
            width,
            height,
            grid_size,
        }
    }

    /// Width of the map in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the map in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Edge length of a single cell in pixels.
    #[must_use]
    pub const fn grid_size(&self) -> u32 {
        self.grid_size
    }

    /// Resolves a pixel coordinate to its containing cell and that cell's center.
    ///
    /// Uses floor division, so `-1` lands in column `-1` rather than `0`.
    #[must_use]
    pub fn resolve_cell(&self, point: PixelPoint) -> ResolvedCell {
        let size = i64::from(self.grid_size);
        let column = i64::from(point.x()).div_euclid(size);
        let row = i64::from(point.y()).div_euclid(size);
        let center_x = column * size + size / 2;
        let center_y = row * size + size / 2;
        ResolvedCell {
            cell: CellCoord::new(saturate_i32(column), saturate_i32(row)),
            center: PixelPoint::new(saturate_i32(center_x), saturate_i32(center_y)),
        }
    }

    /// Reports whether a circle lies entirely inside the map bounds.
    #[must_use]
    pub fn is_within_bounds(&self, circle: &Circle) -> bool {
        let x = i64::from(circle.center().x());
        let y = i64::from(circle.center().y());
        let radius = i64::from(circle.radius());
        x - radius >= 0
            && x + radius <= i64::from(self.width)
            && y - radius >= 0
            && y + radius <= i64::from(self.height)
    }
}

impl Default for SpatialGrid {
    fn default() -> Self {
        Self::new(1_000, 800, 40)
    }
}

fn saturate_i32(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}

/// Unique identifier assigned to a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an obstacle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObstacleId(u32);

impl ObstacleId {
    /// Creates a new obstacle identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Monotonic turn counter. Even turns belong to the player, odd turns to NPCs.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TurnIndex(u64);

impl TurnIndex {
    /// The first turn of every session.
    pub const FIRST: Self = Self(0);

    /// Creates a turn index wrapper.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the underlying counter.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// Turn that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Reports whether the player faction owns this turn.
    #[must_use]
    pub const fn is_player_turn(self) -> bool {
        self.0 % 2 == 0
    }

    /// Faction that owns this turn.
    #[must_use]
    pub const fn owner(self) -> Faction {
        if self.is_player_turn() {
            Faction::Player
        } else {
            Faction::Npc
        }
    }
}

/// Side a unit fights for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Faction {
    /// Units commanded by the player; act on even turns.
    Player,
    /// Units controlled by the game; act on odd turns.
    Npc,
}

impl Faction {
    /// Reports whether this faction owns the provided turn.
    #[must_use]
    pub const fn owns_turn(self, turn: TurnIndex) -> bool {
        match self {
            Self::Player => turn.get() % 2 == 0,
            Self::Npc => turn.get() % 2 == 1,
        }
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => f.pad("player"),
            Self::Npc => f.pad("npc"),
        }
    }
}

/// Action a unit may spend its turn on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// The unit relocated to another cell.
    Move,
    /// The unit dealt damage to an enemy.
    Attack,
}

/// Inert behaviour tag carried by NPC units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NpcBehavior {
    /// Stands still.
    #[default]
    Idle,
    /// Holds a position.
    Guard,
    /// Wanders between cells.
    Patrol,
}

/// Extra attributes attached to NPC units. Nothing in the rules reads them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NpcProfile {
    /// Current behaviour tag.
    pub behavior: NpcBehavior,
    /// Radius in pixels within which the NPC notices other units.
    pub detection_range: u32,
}

impl NpcProfile {
    /// Creates the default profile for an NPC with the given collision radius.
    #[must_use]
    pub const fn for_radius(radius: u32) -> Self {
        Self {
            behavior: NpcBehavior::Idle,
            detection_range: radius.saturating_mul(2),
        }
    }
}

/// Non-negative hit points.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Health(u32);

impl Health {
    /// Creates a health value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric health value.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Reports whether no health remains.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.0 == 0
    }
}

/// Per-unit combat statistics and turn action bookkeeping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitState {
    faction: Faction,
    health: Health,
    max_health: Health,
    damage: u32,
    has_acted: bool,
    action: Option<ActionKind>,
}

impl UnitState {
    /// Creates a fresh, full-health state that has not yet acted.
    #[must_use]
    pub const fn new(faction: Faction, max_health: Health, damage: u32) -> Self {
        Self {
            faction,
            health: max_health,
            max_health,
            damage,
            has_acted: false,
            action: None,
        }
    }

    /// Faction the unit fights for.
    #[must_use]
    pub const fn faction(&self) -> Faction {
        self.faction
    }

    /// Health currently remaining.
    #[must_use]
    pub const fn health(&self) -> Health {
        self.health
    }

    /// Health the unit started with.
    #[must_use]
    pub const fn max_health(&self) -> Health {
        self.max_health
    }

    /// Damage dealt per attack.
    #[must_use]
    pub const fn damage(&self) -> u32 {
        self.damage
    }

    /// Reports whether the unit already spent its action this turn.
    #[must_use]
    pub const fn has_acted(&self) -> bool {
        self.has_acted
    }

    /// Action spent this turn, if any.
    #[must_use]
    pub const fn action(&self) -> Option<ActionKind> {
        self.action
    }

    /// Reports whether the unit has no health left.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.health.is_depleted()
    }

    /// Reports whether the unit may move during the provided turn.
    #[must_use]
    pub const fn can_move(&self, turn: TurnIndex) -> bool {
        self.may_act(turn)
    }

    /// Reports whether the unit may attack during the provided turn.
    ///
    /// Shares the gate with [`UnitState::can_move`]; the caller picks the action.
    #[must_use]
    pub const fn can_attack(&self, turn: TurnIndex) -> bool {
        self.may_act(turn)
    }

    /// Explains why the unit may not act, or `None` when it may.
    #[must_use]
    pub const fn action_gate(&self, turn: TurnIndex) -> Option<ActionError> {
        if self.is_dead() {
            Some(ActionError::Dead)
        } else if !self.faction.owns_turn(turn) {
            Some(ActionError::NotOwnTurn)
        } else if self.has_acted {
            Some(ActionError::AlreadyActed)
        } else {
            None
        }
    }

    const fn may_act(&self, turn: TurnIndex) -> bool {
        self.action_gate(turn).is_none()
    }

    /// Removes health, clamping at zero. Returns `true` when the unit is dead afterwards.
    pub fn take_damage(&mut self, amount: u32) -> bool {
        self.health = Health::new(self.health.get().saturating_sub(amount));
        self.is_dead()
    }

    /// Marks the action as spent.
    pub fn perform_action(&mut self, kind: ActionKind) {
        self.has_acted = true;
        self.action = Some(kind);
    }

    /// Sets the acted flag without choosing an action kind.
    pub fn mark_acted(&mut self) {
        self.has_acted = true;
    }

    /// Clears the acted flag and action kind for a new turn.
    pub fn reset_action_state(&mut self) {
        self.has_acted = false;
        self.action = None;
    }
}

/// Description of a unit to create.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitBlueprint {
    /// Display label.
    pub label: String,
    /// Requested pixel position, snapped to a cell center on creation.
    pub position: PixelPoint,
    /// Collision radius in pixels.
    pub radius: u32,
    /// Faction, health and damage.
    pub state: UnitState,
    /// Optional NPC attributes.
    pub npc: Option<NpcProfile>,
}

/// Immutable representation of a single unit used for queries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSnapshot {
    /// Unique identifier assigned to the unit.
    pub id: UnitId,
    /// Display label.
    pub label: String,
    /// Cell center currently occupied.
    pub position: PixelPoint,
    /// Collision radius in pixels.
    pub radius: u32,
    /// Combat and action state.
    pub state: UnitState,
    /// NPC attributes, if any.
    pub npc: Option<NpcProfile>,
}

impl UnitSnapshot {
    /// Reports whether the point falls inside the unit's square click box.
    #[must_use]
    pub fn contains_click(&self, point: PixelPoint) -> bool {
        let dx = (i64::from(self.position.x()) - i64::from(point.x())).unsigned_abs();
        let dy = (i64::from(self.position.y()) - i64::from(point.y())).unsigned_abs();
        dx <= u64::from(self.radius) && dy <= u64::from(self.radius)
    }
}

/// Read-only snapshot describing all units on the map.
#[derive(Clone, Debug, Default)]
pub struct UnitView {
    snapshots: Vec<UnitSnapshot>,
}

impl UnitView {
    /// Creates a new unit view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<UnitSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured unit snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &UnitSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a single unit.
    #[must_use]
    pub fn get(&self, unit: UnitId) -> Option<&UnitSnapshot> {
        self.snapshots
            .binary_search_by_key(&unit, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }
}

/// Immutable representation of a single obstacle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObstacleSnapshot {
    /// Identifier allocated to the obstacle by the world.
    pub id: ObstacleId,
    /// Cell center occupied by the obstacle.
    pub position: PixelPoint,
    /// Collision radius in pixels.
    pub radius: u32,
}

/// Reasons a placement or move request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// The footprint extends beyond the map bounds.
    #[error("footprint extends beyond the map bounds")]
    OutOfBounds,
    /// The footprint overlaps an obstacle or another unit.
    #[error("footprint overlaps an obstacle or another unit")]
    Collision,
    /// No unit with the provided identifier exists.
    #[error("unit does not exist")]
    UnknownUnit,
}

/// Reasons a unit may be refused an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum ActionError {
    /// No unit with the provided identifier exists.
    #[error("unit does not exist")]
    UnknownUnit,
    /// The unit has no health left.
    #[error("unit is dead")]
    Dead,
    /// The unit's faction does not own the current turn.
    #[error("unit's faction does not own the current turn")]
    NotOwnTurn,
    /// The unit already spent its action this turn.
    #[error("unit already acted this turn")]
    AlreadyActed,
}
