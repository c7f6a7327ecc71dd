use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{Direction, Position, map::TileGrid};

/// Faces the enemies wear, cycled by spawn order.
pub const ENEMY_GLYPHS: [&str; 9] = [
    ">:(", "0_o", "o_o", "=o=", ">-<", "D:=", "^_^", "-_-", "x_x",
];

/// A wandering enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enemy {
    pub position: Position,
    /// Index into [`ENEMY_GLYPHS`].
    pub kind: usize,
}

impl Enemy {
    pub fn glyph(&self) -> &'static str {
        ENEMY_GLYPHS[self.kind % ENEMY_GLYPHS.len()]
    }
}

/// Decides which way an enemy tries to step on a tick.
///
/// Policies see only the enemy itself; whether the step is taken is decided
/// by [`advance_enemies`].
pub trait MotionPolicy {
    fn propose(&mut self, enemy: &Enemy) -> Direction;
}

/// Picks one of the four cardinal directions uniformly at random.
#[derive(Debug)]
pub struct RandomWalk {
    rng: StdRng,
}

impl RandomWalk {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_os_rng() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }
}

impl MotionPolicy for RandomWalk {
    fn propose(&mut self, _enemy: &Enemy) -> Direction {
        Direction::ALL[self.rng.random_range(0..Direction::ALL.len())]
    }
}

/// Returns true if any enemy currently stands on `position`.
pub fn is_occupied(enemies: &[Enemy], position: Position) -> bool {
    enemies.iter().any(|enemy| enemy.position == position)
}

/// Moves every enemy at most one step, in collection order.
///
/// A step is accepted when the target is open and no enemy stands there at
/// that moment. Earlier enemies have already moved when later ones are
/// checked, so a later enemy may take a cell vacated in the same tick.
/// Returns the number of enemies that moved.
pub fn advance_enemies(
    grid: &TileGrid,
    enemies: &mut [Enemy],
    policy: &mut dyn MotionPolicy,
) -> usize {
    let mut moved = 0;
    for index in 0..enemies.len() {
        let direction = policy.propose(&enemies[index]);
        let Some(target) = enemies[index].position.step(direction) else {
            continue;
        };
        if grid.is_blocked(target) || is_occupied(enemies, target) {
            continue;
        }
        enemies[index].position = target;
        moved += 1;
    }
    moved
}
