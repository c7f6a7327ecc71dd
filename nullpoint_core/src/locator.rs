//! Deterministic searches over the terrain: where the player spawns, where
//! enemies may be placed and where the key lies.

use tracing::debug;

use crate::{
    Position,
    map::{Tile, TileGrid},
};

/// Rows skipped at the top and bottom while searching for a spawn.
pub const SPAWN_ROW_INSET: usize = 9;
/// Columns skipped at the left and right while searching for a spawn.
pub const SPAWN_COLUMN_INSET: usize = 24;
/// Cell used when the spawn search finds nothing, provided it is open.
pub const FALLBACK_SPAWN: Position = Position::new(1, 1);

/// Finds the player spawn point.
///
/// Scans the inset region in row-major order and returns the first open cell
/// that has an open cell `SPAWN_ROW_INSET` rows above or below it, or
/// `SPAWN_COLUMN_INSET` columns left or right of it. This rejects isolated
/// pockets in favour of cells inside a larger open area.
///
/// When nothing qualifies, [`FALLBACK_SPAWN`] is used if open, otherwise the
/// first open cell of the grid. The result is therefore always open.
pub fn find_spawn(grid: &TileGrid) -> Position {
    let (width, height) = grid.dimensions();
    let open = |x: usize, y: usize| matches!(grid.get(x, y), Some(Tile::Open));

    for y in SPAWN_ROW_INSET..height.saturating_sub(SPAWN_ROW_INSET) {
        for x in SPAWN_COLUMN_INSET..width.saturating_sub(SPAWN_COLUMN_INSET) {
            if !open(x, y) {
                continue;
            }
            if open(x, y - SPAWN_ROW_INSET)
                || open(x, y + SPAWN_ROW_INSET)
                || open(x - SPAWN_COLUMN_INSET, y)
                || open(x + SPAWN_COLUMN_INSET, y)
            {
                return Position::new(x, y);
            }
        }
    }

    if grid.is_open(FALLBACK_SPAWN) {
        debug!(?FALLBACK_SPAWN, "no spawn candidate, using fallback");
        return FALLBACK_SPAWN;
    }

    let first_open = grid
        .enumerate()
        .find_map(|(position, tile)| (*tile == Tile::Open).then_some(position))
        .unwrap_or(FALLBACK_SPAWN);
    debug!(?first_open, "fallback spawn is a wall, using first open cell");
    first_open
}

/// All open cells whose manhattan distance to `spawn` exceeds `exclusion_radius`,
/// in row-major order.
pub fn find_valid_enemy_positions(
    grid: &TileGrid,
    spawn: Position,
    exclusion_radius: usize,
) -> Vec<Position> {
    grid.enumerate()
        .filter_map(|(position, tile)| match tile {
            Tile::Open if position.manhattan_distance(spawn) > exclusion_radius => Some(position),
            _ => None,
        })
        .collect()
}

/// Location of the key: 32 columns from the right edge, 15 rows from the bottom.
///
/// Returns `None` when the grid is too small or the cell is not open.
pub fn objective_position(grid: &TileGrid) -> Option<Position> {
    let (width, height) = grid.dimensions();
    let position = Position::new(width.checked_sub(32)?, height.checked_sub(15)?);
    grid.is_open(position).then_some(position)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_on_shipped_map() {
        let grid = TileGrid::dungeon().unwrap();
        let spawn = find_spawn(&grid);
        assert_eq!(spawn, Position::new(24, 9));
        assert_eq!(find_spawn(&grid), spawn);
        assert!(grid.is_open(spawn));
    }

    #[test]
    fn small_map_falls_back_to_interior_cell() {
        let grid = TileGrid::parse(&["###", "# #", "###"]).unwrap();
        assert_eq!(find_spawn(&grid), Position::new(1, 1));
    }

    #[test]
    fn walled_fallback_is_replaced_by_first_open_cell() {
        let grid = TileGrid::parse(&["####", "####", "## #", "####"]).unwrap();
        assert_eq!(find_spawn(&grid), Position::new(2, 2));
    }

    #[test]
    fn enemy_candidates_respect_exclusion_radius() {
        let grid = TileGrid::dungeon().unwrap();
        let spawn = find_spawn(&grid);
        let candidates = find_valid_enemy_positions(&grid, spawn, 10);

        assert!(!candidates.is_empty());
        assert!(!candidates.contains(&Position::new(spawn.x + 1, spawn.y)));
        assert!(!candidates.contains(&Position::new(spawn.x + 10, spawn.y)));
        assert!(candidates.contains(&Position::new(spawn.x + 11, spawn.y)));
        for candidate in &candidates {
            assert!(candidate.manhattan_distance(spawn) > 10);
            assert!(grid.is_open(*candidate));
        }
    }

    #[test]
    fn key_sits_in_the_lower_right_chamber() {
        let grid = TileGrid::dungeon().unwrap();
        assert_eq!(objective_position(&grid), Some(Position::new(157, 33)));
    }

    #[test]
    fn tiny_map_has_no_key_position() {
        let grid = TileGrid::parse(&["###", "# #", "###"]).unwrap();
        assert_eq!(objective_position(&grid), None);
    }
}
