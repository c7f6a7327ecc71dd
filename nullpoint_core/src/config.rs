use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables for a dungeon session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Enemies placed each time the mini-game opens.
    pub enemy_count: usize,
    /// Enemies never start within this manhattan distance of the spawn.
    pub enemy_exclusion_radius: usize,
    /// Period of the enemy tick in milliseconds.
    pub tick_period_ms: u64,
    /// Seed for enemy placement and motion. `None` draws from the OS.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            enemy_count: 15,
            enemy_exclusion_radius: 10,
            tick_period_ms: 400,
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }
}
