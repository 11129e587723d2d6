//! Endless Dash - A Geometry Dash-style auto-runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, spawning)
//! - `session`: Mode controller (scripted levels vs. endless runs)
//! - `audio`: Music track selection sink
//! - `settings`: Persisted volume preference
//! - `tuning`: Data-driven game balance

pub mod audio;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use session::Session;
pub use settings::Settings;
pub use tuning::{Tuning, Viewport};

/// Game configuration constants
///
/// Physics values are per tick (one tick per display frame); level clocks are
/// in seconds.
pub mod consts {
    /// Nominal tick rate used by hosts that drive the sim on a fixed timestep
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Player defaults
    pub const PLAYER_X: f32 = 100.0;
    pub const PLAYER_SIZE: f32 = 40.0;
    pub const GRAVITY: f32 = 0.8;
    /// Negative: screen y grows downward
    pub const JUMP_POWER: f32 = -15.0;
    /// Degrees of spin per airborne tick
    pub const ROTATION_STEP: f32 = 8.0;

    /// Grid step used for obstacle sizes and script offsets
    pub const UNIT: f32 = 40.0;
    pub const ORB_SIZE: f32 = 30.0;
    /// Orb top edge distance above the ground line
    pub const ORB_HEIGHT: f32 = 150.0;
    pub const PLATFORM_HOP_GAP: f32 = 150.0;
    pub const ORB_PULSE_STEP: f32 = 0.1;

    /// Feet within this many units below a platform top count as a landing
    pub const LANDING_TOLERANCE: f32 = 15.0;
    /// Slack for float settling when deciding the player is on the ground
    pub const HOLD_JUMP_TOLERANCE: f32 = 1.0;

    /// Particle bursts
    pub const PARTICLE_BURST: usize = 8;
    pub const PARTICLE_LIFE: f32 = 30.0;
    pub const PARTICLE_SPEED: f32 = 8.0;
    pub const MAX_PARTICLES: usize = 512;

    /// Endless mode difficulty
    pub const ENDLESS_BASE_SPEED: f32 = 5.0;
    pub const ENDLESS_SPEED_STEP: f32 = 0.5;
    pub const ENDLESS_SPAWN_RATE: u32 = 90;
    pub const ENDLESS_SPAWN_RATE_STEP: u32 = 5;
    pub const ENDLESS_MIN_SPAWN_RATE: u32 = 50;
    pub const ENDLESS_RAMP_MILESTONE: u64 = 10;

    /// Ground line sits this far above the bottom of the screen
    pub const GROUND_MARGIN: f32 = 200.0;

    /// Entity colors (0xRRGGBB)
    pub const PLAYER_COLOR: u32 = 0x00d4ff;
    pub const SPIKE_COLOR: u32 = 0xff6b6b;
    pub const BLOCK_COLOR: u32 = 0xff4444;
    pub const PLATFORM_COLOR: u32 = 0x4ecca3;
    pub const ORB_COLOR: u32 = 0xffd93d;
}

/// Snap an angle in degrees to the nearest multiple of 90
#[inline]
pub fn snap_to_right_angle(degrees: f32) -> f32 {
    (degrees / 90.0).round() * 90.0
}
