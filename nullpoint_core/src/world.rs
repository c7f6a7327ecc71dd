use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    Position,
    enemy::{ENEMY_GLYPHS, Enemy, is_occupied},
    locator::{find_spawn, find_valid_enemy_positions, objective_position},
    map::TileGrid,
};

/// Everything the dungeon simulation mutates, owned by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub(crate) terrain: TileGrid,
    pub(crate) spawn: Position,
    pub(crate) player: Position,
    pub(crate) enemies: Vec<Enemy>,
    pub(crate) objective: Option<Position>,
    pub(crate) collected: bool,
}

impl World {
    /// Creates a world with the player on the spawn point and no enemies.
    pub fn new(terrain: TileGrid) -> Self {
        let spawn = find_spawn(&terrain);
        let objective = objective_position(&terrain).filter(|position| *position != spawn);
        World {
            terrain,
            spawn,
            player: spawn,
            enemies: Vec::new(),
            objective,
            collected: false,
        }
    }

    /// Places a fresh player and enemy set. The collected flag survives.
    pub fn reset<R: Rng>(
        &mut self,
        rng: &mut R,
        enemy_count: usize,
        exclusion_radius: usize,
    ) {
        self.player = self.spawn;
        self.spawn_enemies(rng, enemy_count, exclusion_radius);
    }

    /// Replaces the enemy set with up to `count` enemies drawn without
    /// replacement from the valid positions. Glyphs cycle by spawn order.
    pub fn spawn_enemies<R: Rng>(
        &mut self,
        rng: &mut R,
        count: usize,
        exclusion_radius: usize,
    ) {
        let mut candidates =
            find_valid_enemy_positions(&self.terrain, self.spawn, exclusion_radius);
        self.enemies.clear();
        for kind in 0..count {
            if candidates.is_empty() {
                warn!(requested = count, placed = kind, "ran out of enemy positions");
                break;
            }
            let position = candidates.swap_remove(rng.random_range(0..candidates.len()));
            self.enemies.push(Enemy {
                position,
                kind: kind % ENEMY_GLYPHS.len(),
            });
        }
    }

    pub fn terrain(&self) -> &TileGrid {
        &self.terrain
    }

    pub fn spawn(&self) -> Position {
        self.spawn
    }

    pub fn player(&self) -> Position {
        self.player
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn objective(&self) -> Option<Position> {
        self.objective
    }

    pub fn collected(&self) -> bool {
        self.collected
    }

    pub fn enemy_at(&self, position: Position) -> bool {
        is_occupied(&self.enemies, position)
    }

    /// The key position while it is still on the floor.
    pub(crate) fn uncollected_objective(&self) -> Option<Position> {
        self.objective.filter(|_| !self.collected)
    }
}
