//! Procedural dungeon floor generation.

use super::types::{neighbors, DungeonMap, DungeonTile, Position, TileType, MAP_BLOB_VERSION};
use crate::core::constants::MIN_DUNGEON_MAP_SIZE;
use crate::core::{GameError, GameResult};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

/// Entrance sits at the bottom centre.
pub fn entrance_position(size: usize) -> Position {
    (size / 2, size - 1)
}

/// Generates a floor with `size` enemies and `size` chests.
pub fn generate_map(
    size: usize,
    floor: u32,
    total_floors: u32,
    rng: &mut impl Rng,
) -> GameResult<DungeonMap> {
    generate_map_with_counts(size, floor, total_floors, size, size, rng)
}

/// Generates a floor:
/// 1. entrance at `(size/2, size-1)`, visible and visited
/// 2. boss (final floor) or ladder anywhere except the entrance and its neighbours
/// 3. shuffled empty cells: the first `enemy_count` become enemies, the next
///    `chest_count` chests
pub fn generate_map_with_counts(
    size: usize,
    floor: u32,
    total_floors: u32,
    enemy_count: usize,
    chest_count: usize,
    rng: &mut impl Rng,
) -> GameResult<DungeonMap> {
    if size < MIN_DUNGEON_MAP_SIZE {
        return Err(GameError::Validation(format!(
            "map size must be at least {MIN_DUNGEON_MAP_SIZE}, got {size}"
        )));
    }
    let available = size * size - 2;
    if enemy_count + chest_count > available {
        return Err(GameError::Validation(format!(
            "cannot fit {enemy_count} enemies and {chest_count} chests in {available} tiles"
        )));
    }
    if floor == 0 || floor > total_floors {
        return Err(GameError::Validation(format!(
            "floor {floor} is outside 1..={total_floors}"
        )));
    }

    let mut tiles: Vec<Vec<DungeonTile>> = (0..size)
        .map(|y| {
            (0..size)
                .map(|x| DungeonTile::new(x, y, TileType::Empty))
                .collect()
        })
        .collect();

    let entrance = entrance_position(size);
    {
        let tile = &mut tiles[entrance.1][entrance.0];
        tile.tile_type = TileType::Entrance;
        tile.is_visible = true;
        tile.is_visited = true;
    }

    let near_entrance = neighbors(entrance, size);
    let candidates: Vec<Position> = (0..size)
        .flat_map(|y| (0..size).map(move |x| (x, y)))
        .filter(|&p| p != entrance && !near_entrance.contains(&p))
        .collect();
    let &(goal_x, goal_y) = candidates
        .choose(rng)
        .ok_or_else(|| GameError::Validation("no valid boss position".to_string()))?;
    let goal_type = if floor == total_floors {
        TileType::Boss
    } else {
        TileType::Ladder
    };
    tiles[goal_y][goal_x].tile_type = goal_type;

    let mut empties: Vec<Position> = tiles
        .iter()
        .flatten()
        .filter(|t| t.tile_type == TileType::Empty)
        .map(|t| (t.x, t.y))
        .collect();
    empties.shuffle(rng);
    for &(x, y) in empties.iter().take(enemy_count) {
        tiles[y][x].tile_type = TileType::Enemy;
    }
    for &(x, y) in empties.iter().skip(enemy_count).take(chest_count) {
        tiles[y][x].tile_type = TileType::Chest;
    }

    debug!(
        size,
        floor,
        total_floors,
        goal = ?goal_type,
        goal_x,
        goal_y,
        "dungeon floor generated"
    );

    Ok(DungeonMap {
        version: MAP_BLOB_VERSION,
        size,
        tiles,
        player_position: entrance,
        floor,
        total_floors,
        entrance_position: entrance,
    })
}
