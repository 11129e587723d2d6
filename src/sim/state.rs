//! Game state and core simulation types
//!
//! Everything a tick reads or writes lives in [`GameState`]; there is no
//! ambient state anywhere else in the crate.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::level::LevelScript;
use super::spawner::{EndlessSpawner, ScriptPlayback, Spawner};
use crate::consts::*;
use crate::snap_to_right_angle;
use crate::tuning::{Tuning, Viewport};

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// No run active
    #[default]
    Menu,
    /// Active gameplay
    Playing,
    /// Player hit something deadly
    GameOver,
    /// Scripted level finished and drained
    LevelComplete,
}

impl GamePhase {
    /// GameOver and LevelComplete wait for an external command
    pub fn is_terminal(&self) -> bool {
        matches!(self, GamePhase::GameOver | GamePhase::LevelComplete)
    }
}

/// Which course is being played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    /// Scripted level, numbered from 1
    Level(u32),
    /// Procedural course with a difficulty ramp
    Endless,
}

/// Notable things that happened during a tick, drained by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Normal jump from the ground or a platform
    Jumped,
    /// Orb consumed for an in-air jump
    OrbActivated { obstacle_id: u32 },
    /// Obstacle scrolled off the left edge
    ObstacleCleared { score: u64 },
    /// Endless difficulty ramp fired
    SpeedUp { speed: f32, spawn_rate: u32 },
    /// Deadly collision
    Died { score: u64 },
    /// Level drained after its duration
    LevelComplete { level: u32, score: u64 },
}

/// The player's cube
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner; x stays fixed for the whole run
    pub pos: Vec2,
    pub size: Vec2,
    /// Positive is downward
    pub velocity_y: f32,
    pub gravity: f32,
    pub jump_power: f32,
    pub is_jumping: bool,
    /// Degrees; snapped to a multiple of 90 on every landing
    pub rotation: f32,
    pub color: u32,
}

impl Player {
    /// Player resting on the ground line
    pub fn new(tuning: &Tuning, viewport: &Viewport) -> Self {
        Self {
            pos: Vec2::new(tuning.player_x, viewport.ground_y - tuning.player_size),
            size: Vec2::splat(tuning.player_size),
            velocity_y: 0.0,
            gravity: tuning.gravity,
            jump_power: tuning.jump_power,
            is_jumping: false,
            rotation: 0.0,
            color: PLAYER_COLOR,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: self.size,
        }
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    /// Put the player's feet on `surface_y` and stop vertical motion
    pub fn land_on(&mut self, surface_y: f32) {
        self.pos.y = surface_y - self.size.y;
        self.velocity_y = 0.0;
        self.is_jumping = false;
        self.rotation = snap_to_right_angle(self.rotation);
    }

    /// Launch upward
    pub fn launch(&mut self) {
        self.velocity_y = self.jump_power;
        self.is_jumping = true;
    }
}

/// Obstacle variants with their variant-only state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Deadly; collides as a triangle
    Spike,
    /// Deadly box
    Block,
    /// Safe to land on from above, deadly from the side or below
    Platform,
    /// Grants one in-air jump, never deadly
    Orb { activated: bool, pulse_phase: f32 },
}

impl ObstacleKind {
    pub fn obstacle_type(&self) -> ObstacleType {
        match self {
            ObstacleKind::Spike => ObstacleType::Spike,
            ObstacleKind::Block => ObstacleType::Block,
            ObstacleKind::Platform => ObstacleType::Platform,
            ObstacleKind::Orb { .. } => ObstacleType::Orb,
        }
    }
}

/// Payload-free obstacle tag used by spawn schedules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObstacleType {
    Spike,
    Block,
    Platform,
    Orb,
}

impl ObstacleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObstacleType::Spike => "spike",
            ObstacleType::Block => "block",
            ObstacleType::Platform => "platform",
            ObstacleType::Orb => "orb",
        }
    }

    pub fn color(&self) -> u32 {
        match self {
            ObstacleType::Spike => SPIKE_COLOR,
            ObstacleType::Block => BLOCK_COLOR,
            ObstacleType::Platform => PLATFORM_COLOR,
            ObstacleType::Orb => ORB_COLOR,
        }
    }
}

/// A scrolling obstacle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub kind: ObstacleKind,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub color: u32,
}

impl Obstacle {
    /// Build an obstacle of `ty` entering at `x`
    ///
    /// Ground obstacles are one unit square and sit on the ground line; orbs
    /// float `orb_height` above it.
    pub fn new(id: u32, ty: ObstacleType, x: f32, tuning: &Tuning, viewport: &Viewport) -> Self {
        let (kind, y, size) = match ty {
            ObstacleType::Spike => (ObstacleKind::Spike, viewport.ground_y - tuning.unit, tuning.unit),
            ObstacleType::Block => (ObstacleKind::Block, viewport.ground_y - tuning.unit, tuning.unit),
            ObstacleType::Platform => (
                ObstacleKind::Platform,
                viewport.ground_y - tuning.unit,
                tuning.unit,
            ),
            ObstacleType::Orb => (
                ObstacleKind::Orb {
                    activated: false,
                    pulse_phase: 0.0,
                },
                viewport.ground_y - tuning.orb_height,
                tuning.orb_size,
            ),
        };
        Self {
            id,
            kind,
            pos: Vec2::new(x, y),
            size: Vec2::splat(size),
            color: ty.color(),
        }
    }

    pub fn rect(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: self.size,
        }
    }

    pub fn obstacle_type(&self) -> ObstacleType {
        self.kind.obstacle_type()
    }

    /// Fully past the left edge of the screen
    pub fn is_off_screen(&self) -> bool {
        self.pos.x + self.size.x < 0.0
    }

    /// Orb that can still grant a jump
    pub fn is_live_orb(&self) -> bool {
        matches!(self.kind, ObstacleKind::Orb { activated: false, .. })
    }
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Ticks remaining
    pub life: f32,
    pub color: u32,
}

/// RNG state wrapper so runs can be replayed from their seed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub stream: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    /// Derive an independent stream so effects never perturb spawn rolls
    pub fn with_stream(seed: u64, stream: u64) -> Self {
        Self { seed, stream }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::new(self.seed, self.stream)
    }
}

/// Complete simulation state for one session
#[derive(Debug, Clone)]
pub struct GameState {
    pub tuning: Tuning,
    pub viewport: Viewport,
    /// Course being played (meaningful outside Menu)
    pub mode: GameMode,
    pub phase: GamePhase,
    /// Obstacles cleared this run
    pub score: u64,
    /// Units per tick that obstacles move left
    pub scroll_speed: f32,
    /// Seconds since the run started (delta-time scaled)
    pub elapsed: f32,
    /// Ticks since the run started
    pub time_ticks: u64,
    /// Level-triggered hold input, latched from the last tick input
    pub holding_jump: bool,
    pub player: Player,
    /// Live obstacles in spawn order
    pub obstacles: Vec<Obstacle>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    pub spawner: Spawner,
    /// Seed of the current run
    pub seed: u64,
    fx_rng: Pcg32,
    events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Fresh state sitting in the menu
    pub fn new(tuning: Tuning, viewport: Viewport, seed: u64) -> Self {
        let player = Player::new(&tuning, &viewport);
        Self {
            mode: GameMode::Endless,
            phase: GamePhase::Menu,
            score: 0,
            scroll_speed: tuning.endless_base_speed,
            elapsed: 0.0,
            time_ticks: 0,
            holding_jump: false,
            player,
            obstacles: Vec::new(),
            particles: Vec::new(),
            spawner: Spawner::Idle,
            seed,
            fx_rng: RngState::with_stream(seed, 1).to_rng(),
            events: Vec::new(),
            next_id: 1,
            tuning,
            viewport,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Clear everything a run accumulates and put the player back on the ground
    fn reset_run(&mut self) {
        self.score = 0;
        self.elapsed = 0.0;
        self.time_ticks = 0;
        self.obstacles.clear();
        self.particles.clear();
        self.events.clear();
        self.player = Player::new(&self.tuning, &self.viewport);
        self.fx_rng = RngState::with_stream(self.seed, 1).to_rng();
    }

    /// Start playing a scripted level
    pub fn begin_level(&mut self, level: u32, script: &LevelScript) {
        self.reset_run();
        self.mode = GameMode::Level(level);
        self.scroll_speed = script.speed;
        self.spawner = Spawner::Scripted(ScriptPlayback::new(script.clone()));
        self.phase = GamePhase::Playing;
        log::info!("Level {} '{}' started (speed {})", level, script.name, script.speed);
    }

    /// Start an endless run seeded with `seed`
    pub fn begin_endless(&mut self, seed: u64) {
        self.seed = seed;
        self.reset_run();
        self.mode = GameMode::Endless;
        self.scroll_speed = self.tuning.endless_base_speed;
        self.spawner = Spawner::Endless(EndlessSpawner::new(seed, &self.tuning));
        self.phase = GamePhase::Playing;
        log::info!("Endless run started with seed {}", seed);
    }

    /// Leave the current run; obstacles and particles stay for a frozen backdrop
    pub fn return_to_menu(&mut self) {
        self.phase = GamePhase::Menu;
        self.spawner = Spawner::Idle;
        self.holding_jump = false;
    }

    /// Spawn an obstacle `x_offset` units past the right edge of the viewport
    pub fn spawn_obstacle(&mut self, ty: ObstacleType, x_offset: f32) -> u32 {
        let id = self.next_entity_id();
        let x = self.viewport.width + x_offset;
        let obstacle = Obstacle::new(id, ty, x, &self.tuning, &self.viewport);
        log::debug!("Spawned {} #{} at x={}", ty.as_str(), id, x);
        self.obstacles.push(obstacle);
        id
    }

    /// Burst of particles at `pos`
    pub fn emit_particles(&mut self, pos: Vec2, color: u32) {
        let spread = self.tuning.particle_speed;
        for _ in 0..self.tuning.particle_burst {
            if self.tuning.max_particles == 0 {
                return;
            }
            if self.particles.len() >= self.tuning.max_particles {
                self.particles.remove(0);
            }
            let vel = Vec2::new(
                (self.fx_rng.random::<f32>() - 0.5) * spread,
                (self.fx_rng.random::<f32>() - 0.5) * spread,
            );
            self.particles.push(Particle {
                pos,
                vel,
                life: self.tuning.particle_life,
                color,
            });
        }
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take the events queued since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn has_live_particles(&self) -> bool {
        !self.particles.is_empty()
    }

    /// Level progress in whole percent; None outside level mode
    pub fn progress_percent(&self) -> Option<u32> {
        let Spawner::Scripted(playback) = &self.spawner else {
            return None;
        };
        let duration = playback.script().duration;
        if duration <= 0.0 {
            return Some(100);
        }
        let pct = (self.elapsed / duration * 100.0).floor().clamp(0.0, 100.0);
        Some(pct as u32)
    }

    pub fn level_number(&self) -> Option<u32> {
        match self.mode {
            GameMode::Level(n) => Some(n),
            GameMode::Endless => None,
        }
    }
}
