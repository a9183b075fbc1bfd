//! Exploration state machine: movement, tile reveal and events, exit rule.
//!
//! A run is `Exploring` until a tile event pauses it. Battles and boss fights
//! resolve synchronously in the run service, so `InBattle`/`AtBoss` are only
//! ever observed mid-step. `Completed`, `Exited` and `Abandoned` are terminal.

use super::types::{DungeonMap, DungeonTile, Position, TileType, DIR_OFFSETS};
use crate::core::GameError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplorationStatus {
    Exploring,
    InBattle,
    AtBoss,
    Completed,
    Exited,
    Abandoned,
}

impl ExplorationStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ExplorationStatus::Completed | ExplorationStatus::Exited | ExplorationStatus::Abandoned
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("cannot move while in battle")]
    InBattle,
    #[error("already at this position")]
    AlreadyThere,
    #[error("target position is out of bounds")]
    OutOfBounds,
    #[error("target position is not adjacent")]
    NotAdjacent,
}

impl From<MoveError> for GameError {
    fn from(e: MoveError) -> Self {
        GameError::StateConflict(e.to_string())
    }
}

/// Why a run cannot be exited right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ExitBlocked {
    #[error("cannot exit while in battle")]
    InBattle,
    #[error("must be at entrance to exit")]
    NotAtEntrance,
}

impl From<ExitBlocked> for GameError {
    fn from(e: ExitBlocked) -> Self {
        GameError::StateConflict(e.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileEventKind {
    None,
    Battle,
    Chest,
    Boss,
    Ladder,
    Entrance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileEvent {
    pub kind: TileEventKind,
    pub position: Position,
    pub metadata: Option<Value>,
}

impl TileEvent {
    /// Battles, chests and the boss pause auto-exploration.
    pub fn can_continue(&self) -> bool {
        !matches!(
            self.kind,
            TileEventKind::Battle | TileEventKind::Chest | TileEventKind::Boss
        )
    }
}

pub fn tile_event(tile: &DungeonTile) -> TileEvent {
    let kind = match tile.tile_type {
        TileType::Empty => TileEventKind::None,
        TileType::Entrance => TileEventKind::Entrance,
        TileType::Enemy => TileEventKind::Battle,
        TileType::Chest => TileEventKind::Chest,
        TileType::Boss => TileEventKind::Boss,
        TileType::Ladder => TileEventKind::Ladder,
    };
    TileEvent {
        kind,
        position: (tile.x, tile.y),
        metadata: tile.metadata.clone(),
    }
}

/// Checks a move to `(x, y)` without applying it.
pub fn validate_move(
    map: &DungeonMap,
    x: i64,
    y: i64,
    status: ExplorationStatus,
) -> Result<Position, MoveError> {
    if status == ExplorationStatus::InBattle {
        return Err(MoveError::InBattle);
    }
    let (px, py) = map.player_position;
    if (px as i64, py as i64) == (x, y) {
        return Err(MoveError::AlreadyThere);
    }
    if !map.in_bounds(x, y) {
        return Err(MoveError::OutOfBounds);
    }
    if !map.is_adjacent(x, y) {
        return Err(MoveError::NotAdjacent);
    }
    Ok((x as usize, y as usize))
}

/// Moves the player. Does not reveal or trigger anything.
pub fn move_player(
    map: &mut DungeonMap,
    x: i64,
    y: i64,
    status: ExplorationStatus,
) -> Result<Position, MoveError> {
    let target = validate_move(map, x, y, status)?;
    map.player_position = target;
    Ok(target)
}

pub fn valid_moves(map: &DungeonMap, status: ExplorationStatus) -> Vec<Position> {
    if status == ExplorationStatus::InBattle {
        return Vec::new();
    }
    let (px, py) = map.player_position;
    DIR_OFFSETS
        .iter()
        .map(|(dx, dy)| (px as i64 + dx, py as i64 + dy))
        .filter(|&(x, y)| map.in_bounds(x, y))
        .map(|(x, y)| (x as usize, y as usize))
        .collect()
}

/// Marks `(x, y)` visible and visited, makes its neighbours visible, and
/// classifies the tile.
pub fn reveal_and_trigger(map: &mut DungeonMap, x: usize, y: usize) -> Option<TileEvent> {
    let tile = map.tile_mut(x, y)?;
    tile.is_visible = true;
    tile.is_visited = true;
    let event = tile_event(tile);
    for (nx, ny) in map.neighbors((x, y)) {
        if let Some(n) = map.tile_mut(nx, ny) {
            n.is_visible = true;
        }
    }
    Some(event)
}

/// Move plus reveal: one exploration step on the map alone.
pub fn step(
    map: &mut DungeonMap,
    x: i64,
    y: i64,
    status: ExplorationStatus,
) -> Result<TileEvent, MoveError> {
    let (tx, ty) = move_player(map, x, y, status)?;
    reveal_and_trigger(map, tx, ty).ok_or(MoveError::OutOfBounds)
}

/// Turns a resolved enemy or chest tile into an empty one.
pub fn clear_tile(map: &mut DungeonMap, x: usize, y: usize) -> bool {
    match map.tile_mut(x, y) {
        Some(tile) if matches!(tile.tile_type, TileType::Enemy | TileType::Chest) => {
            tile.tile_type = TileType::Empty;
            tile.metadata = None;
            true
        }
        _ => false,
    }
}

pub fn can_exit(map: &DungeonMap, status: ExplorationStatus) -> Result<(), ExitBlocked> {
    if status == ExplorationStatus::InBattle {
        return Err(ExitBlocked::InBattle);
    }
    if !map.is_at_entrance() {
        return Err(ExitBlocked::NotAtEntrance);
    }
    Ok(())
}
