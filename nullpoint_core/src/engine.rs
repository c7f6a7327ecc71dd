use rand::{SeedableRng, rngs::StdRng};
use tracing::{debug, info};

use crate::{
    Direction, Input,
    config::EngineConfig,
    enemy::{MotionPolicy, RandomWalk, advance_enemies},
    map::{MapError, TileGrid},
    render::{RenderBuffer, project},
    world::World,
};

/// Where the mini-game currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Closed. Only `open` does anything.
    Idle,
    /// Accepting moves and ticks.
    Exploring,
    /// The player is being put back on the spawn. Never observable between calls.
    Respawning,
    /// The key was picked up and the presentation is playing. Only cancel is accepted.
    ObjectiveAnimating,
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    Cancelled,
    ObjectiveAcquired,
}

/// Result of asking the engine to open the mini-game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    Opened,
    AlreadyOpen,
    /// The key has been found; the dungeon cannot be entered again.
    Locked,
}

/// Represents the outcome of processing one input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The engine was not accepting this input.
    Ignored,
    /// The target cell is a wall or off the map. Nothing changed.
    Blocked,
    Moved,
    /// The player ran into an enemy and went back to the spawn.
    Respawned,
    ObjectiveAcquired,
    Closed,
}

/// Receives everything the engine wants shown.
pub trait PresentationSink {
    /// Called with a fresh projection after every change to the world.
    fn render(&mut self, frame: &RenderBuffer);

    /// The key was just picked up. Fired once per game.
    fn objective_acquired(&mut self) {}

    fn session_closed(&mut self, _reason: CloseReason) {}
}

/// Runs the dungeon mini-game.
///
/// The engine owns the [`World`] exclusively. Drivers feed it inputs and
/// ticks one at a time and observe it through a [`PresentationSink`].
pub struct Engine {
    world: World,
    state: SessionState,
    config: EngineConfig,
    rng: StdRng,
    motion: Box<dyn MotionPolicy>,
}

impl Engine {
    /// Creates a closed engine over `terrain`.
    pub fn new(terrain: TileGrid, config: EngineConfig) -> Self {
        let (rng, motion) = match config.seed {
            Some(seed) => (
                StdRng::seed_from_u64(seed),
                RandomWalk::new(seed.wrapping_add(1)),
            ),
            None => (StdRng::from_os_rng(), RandomWalk::from_os_rng()),
        };
        Engine {
            world: World::new(terrain),
            state: SessionState::Idle,
            config,
            rng,
            motion: Box::new(motion),
        }
    }

    /// Creates a closed engine over the shipped dungeon map.
    pub fn with_dungeon(config: EngineConfig) -> Result<Self, MapError> {
        Ok(Self::new(TileGrid::dungeon()?, config))
    }

    /// Replaces the enemy motion policy.
    pub fn with_motion_policy(mut self, motion: Box<dyn MotionPolicy>) -> Self {
        self.motion = motion;
        self
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state != SessionState::Idle
    }

    /// Whether the tick source should be running.
    pub fn accepts_ticks(&self) -> bool {
        matches!(
            self.state,
            SessionState::Exploring | SessionState::Respawning
        )
    }

    /// Current projection of the world.
    pub fn frame(&self) -> RenderBuffer {
        project(&self.world)
    }

    /// Opens the mini-game, placing the player and a fresh set of enemies.
    pub fn open(&mut self, sink: &mut dyn PresentationSink) -> OpenOutcome {
        if self.world.collected {
            info!("dungeon is locked, key already found");
            return OpenOutcome::Locked;
        }
        if self.is_open() {
            return OpenOutcome::AlreadyOpen;
        }

        self.world.reset(
            &mut self.rng,
            self.config.enemy_count,
            self.config.enemy_exclusion_radius,
        );
        self.state = SessionState::Exploring;
        info!(
            spawn = ?self.world.spawn,
            enemies = self.world.enemies.len(),
            "dungeon opened"
        );
        self.render(sink);
        OpenOutcome::Opened
    }

    /// Processes a single input event.
    pub fn handle_input(&mut self, input: Input, sink: &mut dyn PresentationSink) -> MoveOutcome {
        match (self.state, input) {
            (SessionState::Idle, _) => MoveOutcome::Ignored,
            (_, Input::Cancel) => {
                self.close(sink);
                MoveOutcome::Closed
            }
            (SessionState::Exploring, Input::Move(direction)) => self.resolve_move(direction, sink),
            (_, Input::Move(_)) => MoveOutcome::Ignored,
        }
    }

    /// Processes a raw `(dx, dy)` move intent.
    ///
    /// Only single cardinal steps move the player. Diagonal, zero and longer
    /// offsets are dropped without touching the world.
    pub fn handle_offset(
        &mut self,
        dx: isize,
        dy: isize,
        sink: &mut dyn PresentationSink,
    ) -> MoveOutcome {
        match Direction::from_delta(dx, dy) {
            Some(direction) => self.handle_input(Input::Move(direction), sink),
            None => {
                debug!(dx, dy, "ignoring non-cardinal move");
                MoveOutcome::Ignored
            }
        }
    }

    /// Advances every enemy by one step of the motion policy.
    ///
    /// An enemy that ends up on the player sends the player back to the
    /// spawn. If an enemy is already standing on the spawn the two share
    /// that cell until one of them moves off it.
    ///
    /// Returns `false` when the session is not accepting ticks.
    pub fn tick(&mut self, sink: &mut dyn PresentationSink) -> bool {
        if !self.accepts_ticks() {
            return false;
        }

        advance_enemies(
            &self.world.terrain,
            &mut self.world.enemies,
            self.motion.as_mut(),
        );
        if self.world.enemy_at(self.world.player) {
            self.respawn(sink);
        } else {
            self.render(sink);
        }
        true
    }

    /// Ends the objective presentation and closes the session.
    ///
    /// Returns `false` if no presentation was running.
    pub fn finish_objective_sequence(&mut self, sink: &mut dyn PresentationSink) -> bool {
        if self.state != SessionState::ObjectiveAnimating {
            return false;
        }
        self.state = SessionState::Idle;
        info!("objective sequence finished");
        sink.session_closed(CloseReason::ObjectiveAcquired);
        true
    }

    /// Force-closes the mini-game and discards the enemies.
    ///
    /// The collected flag keeps whatever value it had.
    pub fn close(&mut self, sink: &mut dyn PresentationSink) -> bool {
        if self.state == SessionState::Idle {
            return false;
        }
        self.state = SessionState::Idle;
        self.world.enemies.clear();
        info!(collected = self.world.collected, "dungeon closed");
        sink.session_closed(CloseReason::Cancelled);
        true
    }

    fn resolve_move(
        &mut self,
        direction: Direction,
        sink: &mut dyn PresentationSink,
    ) -> MoveOutcome {
        let Some(target) = self.world.player.step(direction) else {
            return MoveOutcome::Blocked;
        };
        if self.world.terrain.is_blocked(target) {
            return MoveOutcome::Blocked;
        }

        if self.world.enemy_at(target) {
            self.respawn(sink);
            return MoveOutcome::Respawned;
        }

        if self.world.uncollected_objective() == Some(target) {
            self.world.player = target;
            self.world.collected = true;
            self.state = SessionState::ObjectiveAnimating;
            info!(position = ?target, "objective acquired");
            self.render(sink);
            sink.objective_acquired();
            return MoveOutcome::ObjectiveAcquired;
        }

        self.world.player = target;
        if self.world.enemy_at(target) {
            self.respawn(sink);
            return MoveOutcome::Respawned;
        }
        self.render(sink);
        MoveOutcome::Moved
    }

    fn respawn(&mut self, sink: &mut dyn PresentationSink) {
        self.state = SessionState::Respawning;
        debug!(from = ?self.world.player, to = ?self.world.spawn, "player caught, respawning");
        self.world.player = self.world.spawn;
        self.render(sink);
        self.state = SessionState::Exploring;
    }

    fn render(&self, sink: &mut dyn PresentationSink) {
        sink.render(&project(&self.world));
    }
}
