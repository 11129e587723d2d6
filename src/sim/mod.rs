//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Host-driven ticks only, the core never schedules itself
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod level;
pub mod snapshot;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::{Rect, is_landing_on_top, point_in_triangle, rect_overlap, triangle_collision};
pub use level::{LevelCatalog, LevelError, LevelScript, SpawnEvent};
pub use snapshot::RenderSnapshot;
pub use spawner::{EndlessSpawner, Pattern, Ramp, ScriptPlayback, Spawner};
pub use state::{
    GameEvent, GameMode, GamePhase, GameState, Obstacle, ObstacleKind, ObstacleType, Particle,
    Player, RngState,
};
pub use tick::{TickInput, advance_effects, jump, tick};
