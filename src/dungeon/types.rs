//! Dungeon map data structures and the persisted map blob.
//!
//! The map is saved with a run as JSON and must come back identical, so the
//! blob carries a `version` and is validated on load. A blob that fails
//! validation is rejected as `MalformedState`, never patched up.

use crate::core::{GameError, GameResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Current blob version. Blobs without a version field are version 1.
pub const MAP_BLOB_VERSION: u32 = 1;

/// Grid position as `(x, y)`; `x` is the column.
pub type Position = (usize, usize);

/// Direction offsets: up, down, left, right.
pub const DIR_OFFSETS: [(i64, i64); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileType {
    /// Start position; the only place a run can be exited.
    Entrance,
    Enemy,
    Chest,
    /// Final floor only.
    Boss,
    Empty,
    /// Stairs to the next floor on non-final floors.
    Ladder,
}

impl TileType {
    pub fn icon(&self) -> char {
        match self {
            TileType::Entrance => 'E',
            TileType::Enemy => 'x',
            TileType::Chest => 'C',
            TileType::Boss => 'B',
            TileType::Empty => '.',
            TileType::Ladder => 'L',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DungeonTile {
    pub x: usize,
    pub y: usize,
    pub tile_type: TileType,
    #[serde(default)]
    pub is_visible: bool,
    #[serde(default)]
    pub is_visited: bool,
    #[serde(default)]
    pub metadata: Option<Value>,
}

impl DungeonTile {
    pub fn new(x: usize, y: usize, tile_type: TileType) -> Self {
        Self {
            x,
            y,
            tile_type,
            is_visible: false,
            is_visited: false,
            metadata: None,
        }
    }
}

fn default_version() -> u32 {
    1
}

fn default_floor() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DungeonMap {
    #[serde(default = "default_version")]
    pub version: u32,
    pub size: usize,
    /// Row-major: `tiles[y][x]`.
    pub tiles: Vec<Vec<DungeonTile>>,
    pub player_position: Position,
    #[serde(default = "default_floor")]
    pub floor: u32,
    #[serde(default = "default_floor")]
    pub total_floors: u32,
    #[serde(default)]
    pub entrance_position: Position,
}

impl DungeonMap {
    pub fn tile(&self, x: usize, y: usize) -> Option<&DungeonTile> {
        self.tiles.get(y).and_then(|row| row.get(x))
    }

    pub fn tile_mut(&mut self, x: usize, y: usize) -> Option<&mut DungeonTile> {
        self.tiles.get_mut(y).and_then(|row| row.get_mut(x))
    }

    pub fn current_tile(&self) -> Option<&DungeonTile> {
        let (x, y) = self.player_position;
        self.tile(x, y)
    }

    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.size && (y as usize) < self.size
    }

    /// In-bounds 4-neighbourhood of a position.
    pub fn neighbors(&self, pos: Position) -> Vec<Position> {
        neighbors(pos, self.size)
    }

    /// True if `(x, y)` is one orthogonal step from the player.
    pub fn is_adjacent(&self, x: i64, y: i64) -> bool {
        let (px, py) = self.player_position;
        let dx = (x - px as i64).abs();
        let dy = (y - py as i64).abs();
        dx + dy == 1
    }

    pub fn is_at_entrance(&self) -> bool {
        self.player_position == self.entrance_position
    }

    pub fn is_final_floor(&self) -> bool {
        self.floor >= self.total_floors
    }

    pub fn count_tiles(&self, tile_type: TileType) -> usize {
        self.tiles
            .iter()
            .flatten()
            .filter(|t| t.tile_type == tile_type)
            .count()
    }

    pub fn find_tile(&self, tile_type: TileType) -> Option<Position> {
        self.tiles
            .iter()
            .flatten()
            .find(|t| t.tile_type == tile_type)
            .map(|t| (t.x, t.y))
    }

    pub fn visited_count(&self) -> usize {
        self.tiles.iter().flatten().filter(|t| t.is_visited).count()
    }

    /// Checks the structural invariants a saved blob must satisfy.
    pub fn validate(&self) -> GameResult<()> {
        let bad = |msg: String| Err(GameError::MalformedState(msg));
        if self.version == 0 || self.version > MAP_BLOB_VERSION {
            return bad(format!("unsupported map version {}", self.version));
        }
        if self.size == 0 || self.tiles.len() != self.size {
            return bad(format!(
                "expected {} rows, found {}",
                self.size,
                self.tiles.len()
            ));
        }
        for (y, row) in self.tiles.iter().enumerate() {
            if row.len() != self.size {
                return bad(format!("row {y} has {} tiles", row.len()));
            }
            for (x, tile) in row.iter().enumerate() {
                if tile.x != x || tile.y != y {
                    return bad(format!(
                        "tile at ({x}, {y}) claims ({}, {})",
                        tile.x, tile.y
                    ));
                }
            }
        }
        let in_grid = |(x, y): Position| x < self.size && y < self.size;
        if !in_grid(self.player_position) {
            return bad("player position out of bounds".to_string());
        }
        if !in_grid(self.entrance_position) {
            return bad("entrance position out of bounds".to_string());
        }
        if self.floor == 0 || self.floor > self.total_floors {
            return bad(format!(
                "floor {} of {}",
                self.floor, self.total_floors
            ));
        }
        Ok(())
    }

    pub fn to_value(&self) -> GameResult<Value> {
        serde_json::to_value(self).map_err(|e| GameError::MalformedState(e.to_string()))
    }

    pub fn from_value(value: Value) -> GameResult<Self> {
        let map: Self =
            serde_json::from_value(value).map_err(|e| GameError::MalformedState(e.to_string()))?;
        map.validate()?;
        Ok(map)
    }

    pub fn to_json(&self) -> GameResult<String> {
        serde_json::to_string(self).map_err(|e| GameError::MalformedState(e.to_string()))
    }

    pub fn from_json(json: &str) -> GameResult<Self> {
        let map: Self =
            serde_json::from_str(json).map_err(|e| GameError::MalformedState(e.to_string()))?;
        map.validate()?;
        Ok(map)
    }

    /// Text grid for logs and the simulator: `@` is the player, `?` is fog.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.size * (self.size + 1));
        for row in &self.tiles {
            for tile in row {
                let c = if (tile.x, tile.y) == self.player_position {
                    '@'
                } else if tile.is_visible {
                    tile.tile_type.icon()
                } else {
                    '?'
                };
                out.push(c);
            }
            out.push('\n');
        }
        out
    }
}

/// In-bounds 4-neighbourhood of `pos` on a `size` x `size` grid.
pub fn neighbors(pos: Position, size: usize) -> Vec<Position> {
    let (x, y) = (pos.0 as i64, pos.1 as i64);
    DIR_OFFSETS
        .iter()
        .map(|(dx, dy)| (x + dx, y + dy))
        .filter(|&(nx, ny)| nx >= 0 && ny >= 0 && (nx as usize) < size && (ny as usize) < size)
        .map(|(nx, ny)| (nx as usize, ny as usize))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn empty_map(size: usize) -> DungeonMap {
        let tiles = (0..size)
            .map(|y| (0..size).map(|x| DungeonTile::new(x, y, TileType::Empty)).collect())
            .collect();
        DungeonMap {
            version: MAP_BLOB_VERSION,
            size,
            tiles,
            player_position: (size / 2, size - 1),
            floor: 1,
            total_floors: 1,
            entrance_position: (size / 2, size - 1),
        }
    }

    #[test]
    fn test_neighbors_at_corner_and_center() {
        assert_eq!(neighbors((0, 0), 5).len(), 2);
        assert_eq!(neighbors((2, 4), 5).len(), 3);
        assert_eq!(neighbors((2, 2), 5).len(), 4);
    }

    #[test]
    fn test_is_adjacent() {
        let map = empty_map(5);
        assert!(map.is_adjacent(2, 3));
        assert!(map.is_adjacent(1, 4));
        assert!(!map.is_adjacent(1, 3));
        assert!(!map.is_adjacent(2, 4));
        assert!(!map.is_adjacent(2, 2));
    }

    #[test]
    fn test_json_round_trip() {
        let mut map = empty_map(5);
        map.tiles[0][3].tile_type = TileType::Boss;
        map.tiles[1][1].metadata = Some(json!({"enemy": "Zubat"}));
        map.tiles[4][2].is_visited = true;
        let json = map.to_json().unwrap();
        assert_eq!(DungeonMap::from_json(&json).unwrap(), map);
    }

    #[test]
    fn test_blob_field_names() {
        let value = empty_map(5).to_value().unwrap();
        assert_eq!(value["player_position"], json!([2, 4]));
        assert_eq!(value["tiles"][0][0]["tile_type"], json!("empty"));
        assert_eq!(value["tiles"][0][0]["is_visible"], json!(false));
    }

    #[test]
    fn test_missing_version_defaults_to_one() {
        let mut value = empty_map(5).to_value().unwrap();
        value.as_object_mut().unwrap().remove("version");
        let map = DungeonMap::from_value(value).unwrap();
        assert_eq!(map.version, 1);
    }

    #[test]
    fn test_malformed_blobs_rejected() {
        assert!(matches!(
            DungeonMap::from_json("{not json"),
            Err(GameError::MalformedState(_))
        ));

        let mut map = empty_map(5);
        map.tiles.pop();
        assert!(matches!(map.validate(), Err(GameError::MalformedState(_))));

        let mut map = empty_map(5);
        map.player_position = (7, 0);
        let json = map.to_json().unwrap();
        assert!(DungeonMap::from_json(&json).is_err());

        let mut map = empty_map(5);
        map.version = MAP_BLOB_VERSION + 1;
        assert!(map.validate().is_err());

        let mut map = empty_map(5);
        map.tiles[2][2].x = 0;
        assert!(map.validate().is_err());
    }

    #[test]
    fn test_render_marks_player_and_fog() {
        let mut map = empty_map(5);
        map.tiles[3][2].is_visible = true;
        let text = map.render();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[4], "??@??");
        assert_eq!(lines[3], "??.??");
    }
}
