//! In-memory save slot and its single-line transfer format.

use std::fmt;

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use skirmish_core::{ObstacleSnapshot, SpatialGrid, TurnIndex, UnitSnapshot};
use skirmish_world::{query, Obstacle, World};
use thiserror::Error;

const SNAPSHOT_DOMAIN: &str = "skirmish";
const SNAPSHOT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded snapshot payload.
pub(crate) const SNAPSHOT_HEADER: &str = "skirmish:v1";
/// Delimiter used to separate the prefix, version and payload.
const FIELD_DELIMITER: char = ':';

/// Owned copy of the game state taken at save time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct SaveSnapshot {
    /// Turn that was running.
    pub(crate) turn: TurnIndex,
    /// Map the session was played on.
    pub(crate) grid: SpatialGrid,
    /// Every unit in creation order, including dead ones.
    pub(crate) units: Vec<UnitSnapshot>,
    /// Every obstacle in creation order.
    pub(crate) obstacles: Vec<ObstacleSnapshot>,
}

impl SaveSnapshot {
    /// Copies the current world state.
    #[must_use]
    pub(crate) fn capture(world: &World) -> Self {
        let state = query::game_state(world);
        Self {
            turn: query::current_turn(world),
            grid: *query::grid(world),
            units: state.units().iter().map(|unit| unit.snapshot()).collect(),
            obstacles: state.obstacles().iter().map(Obstacle::snapshot).collect(),
        }
    }

    /// Encodes the snapshot into a single-line string suitable for clipboard transfer.
    pub(crate) fn encode(&self) -> Result<String, SaveTransferError> {
        let json = serde_json::to_vec(self).map_err(SaveTransferError::Serialization)?;
        let encoded = STANDARD_NO_PAD.encode(json);
        Ok(format!("{SNAPSHOT_HEADER}{FIELD_DELIMITER}{encoded}"))
    }

    /// Decodes a snapshot from the provided string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, SaveTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(SaveTransferError::EmptyPayload);
        }

        let mut parts = trimmed.splitn(3, FIELD_DELIMITER);
        let domain = parts.next().ok_or(SaveTransferError::MissingPrefix)?;
        let version = parts.next().ok_or(SaveTransferError::MissingVersion)?;
        let payload = parts.next().ok_or(SaveTransferError::MissingPayload)?;

        if domain != SNAPSHOT_DOMAIN {
            return Err(SaveTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != SNAPSHOT_VERSION {
            return Err(SaveTransferError::UnsupportedVersion(version.to_owned()));
        }

        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(SaveTransferError::InvalidEncoding)?;
        serde_json::from_slice(&bytes).map_err(SaveTransferError::InvalidPayload)
    }
}

impl fmt::Display for SaveSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "turn {} ({}) on {}x{} map, grid {}",
            self.turn.get(),
            self.turn.owner(),
            self.grid.width(),
            self.grid.height(),
            self.grid.grid_size()
        )?;
        for unit in &self.units {
            let action = match unit.state.action() {
                Some(kind) => format!("{kind:?}").to_lowercase(),
                None if unit.state.has_acted() => "acted".to_owned(),
                None => "ready".to_owned(),
            };
            writeln!(
                f,
                "  #{} {:<10} {:<6} ({}, {}) hp {}/{} dmg {} {}{}",
                unit.id.get(),
                unit.label,
                unit.state.faction(),
                unit.position.x(),
                unit.position.y(),
                unit.state.health().get(),
                unit.state.max_health().get(),
                unit.state.damage(),
                action,
                if unit.state.is_dead() { " [dead]" } else { "" }
            )?;
        }
        writeln!(f, "  obstacles: {}", self.obstacles.len())
    }
}

/// Single in-memory slot holding the latest save.
#[derive(Debug, Default)]
pub(crate) struct SaveSlot {
    saved: Option<SaveSnapshot>,
}

impl SaveSlot {
    /// Captures the world, replacing any previous save.
    pub(crate) fn save(&mut self, world: &World) -> &SaveSnapshot {
        self.saved.insert(SaveSnapshot::capture(world))
    }

    /// Empties the slot.
    pub(crate) fn reset(&mut self) {
        self.saved = None;
    }

    /// Latest save, if any.
    #[must_use]
    pub(crate) fn saved(&self) -> Option<&SaveSnapshot> {
        self.saved.as_ref()
    }
}

/// Errors that can occur while encoding or decoding save transfer strings.
#[derive(Debug, Error)]
pub(crate) enum SaveTransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("save payload was empty")]
    EmptyPayload,
    /// The prefix segment was missing from the encoded snapshot.
    #[error("save string is missing the prefix")]
    MissingPrefix,
    /// The encoded snapshot did not contain a version segment.
    #[error("save string is missing the version")]
    MissingVersion,
    /// The encoded snapshot did not include the payload segment.
    #[error("save string is missing the payload")]
    MissingPayload,
    /// The encoded snapshot used an unexpected prefix segment.
    #[error("save prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The encoded snapshot used an unsupported version identifier.
    #[error("save version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode save payload: {0}")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The decoded payload could not be deserialised.
    #[error("could not parse save payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
    /// The snapshot could not be serialised.
    #[error("could not serialise save payload: {0}")]
    Serialization(#[source] serde_json::Error),
}
