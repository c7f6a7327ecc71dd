use crate::{
    Position,
    map::{Grid, Tile},
    world::World,
};

pub const PLAYER_GLYPH: &str = "@";
pub const KEY_GLYPH: &str = "ꄗ";

/// What a single cell of the display shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    Terrain(Tile),
    Enemy(&'static str),
    Objective,
    Player,
}

impl Glyph {
    pub fn symbol(&self) -> &'static str {
        match self {
            Glyph::Terrain(Tile::Wall) => "#",
            Glyph::Terrain(Tile::Open) => " ",
            Glyph::Enemy(face) => *face,
            Glyph::Objective => KEY_GLYPH,
            Glyph::Player => PLAYER_GLYPH,
        }
    }

    /// A single-column stand-in for [`symbol`](Self::symbol), for drivers
    /// that draw one terminal cell per map cell. Enemies show the first
    /// character of their face; the key glyph is double width, so it
    /// becomes `?`.
    pub fn cell(&self) -> char {
        match self {
            Glyph::Terrain(Tile::Wall) => '#',
            Glyph::Terrain(Tile::Open) => ' ',
            Glyph::Enemy(face) => face.chars().next().unwrap_or('?'),
            Glyph::Objective => '?',
            Glyph::Player => '@',
        }
    }
}

/// A snapshot of the dungeon ready for display.
pub type RenderBuffer = Grid<Glyph>;

/// Projects the world into a display buffer.
///
/// Each cell shows, by precedence: the player, the key if not collected, an
/// enemy, then the terrain.
pub fn project(world: &World) -> RenderBuffer {
    let terrain = world.terrain();
    let mut buffer = Grid::from_generator(terrain.width(), terrain.height(), |x, y| {
        Glyph::Terrain(terrain[Position::new(x, y)])
    });

    // Lowest precedence first so later writes win.
    for enemy in world.enemies() {
        buffer[enemy.position] = Glyph::Enemy(enemy.glyph());
    }
    if let Some(objective) = world.uncollected_objective() {
        buffer[objective] = Glyph::Objective;
    }
    buffer[world.player()] = Glyph::Player;
    buffer
}

/// Joins each row of the buffer into a string.
pub fn to_lines(buffer: &RenderBuffer) -> Vec<String> {
    buffer
        .rows()
        .map(|row| row.iter().map(Glyph::symbol).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{enemy::Enemy, map::TileGrid};

    fn corridor() -> World {
        let mut world = World::new(TileGrid::parse(&["######", "#    #", "######"]).unwrap());
        world.objective = Some(Position::new(3, 1));
        world
    }

    #[test]
    fn player_wins_every_tie() {
        let mut world = corridor();
        world.player = Position::new(3, 1);
        world.enemies.push(Enemy {
            position: Position::new(3, 1),
            kind: 0,
        });
        let buffer = project(&world);
        assert_eq!(buffer[Position::new(3, 1)], Glyph::Player);
    }

    #[test]
    fn key_hides_enemy_until_collected() {
        let mut world = corridor();
        world.enemies.push(Enemy {
            position: Position::new(3, 1),
            kind: 1,
        });
        assert_eq!(project(&world)[Position::new(3, 1)], Glyph::Objective);

        world.collected = true;
        assert_eq!(project(&world)[Position::new(3, 1)], Glyph::Enemy("0_o"));
    }

    #[test]
    fn cells_are_one_column_each() {
        let mut world = corridor();
        world.enemies.push(Enemy {
            position: Position::new(4, 1),
            kind: 0,
        });
        let buffer = project(&world);
        let row: String = buffer.rows().nth(1).unwrap().iter().map(Glyph::cell).collect();
        assert_eq!(row, "#@ ?>#");
    }

    #[test]
    fn lines_spell_out_the_map() {
        let world = corridor();
        assert_eq!(
            to_lines(&project(&world)),
            vec!["######", "#@ ꄗ #", "######"]
        );
    }
}
