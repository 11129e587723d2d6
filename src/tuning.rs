//! Data-driven game balance
//!
//! Every physics and difficulty number the simulation reads lives here, so
//! alternative balance sets (bigger grid, faster ramp) can be loaded from JSON
//! instead of patched into the code.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Failure decoding a tuning file
#[derive(Debug, thiserror::Error)]
pub enum TuningError {
    #[error("Invalid tuning data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid tuning value: {0}")]
    Invalid(&'static str),
}

/// Balance parameters for a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Player ===
    pub player_x: f32,
    pub player_size: f32,
    pub gravity: f32,
    pub jump_power: f32,
    pub rotation_step: f32,

    // === Obstacles ===
    /// Base obstacle size and the scale of level-script offsets
    pub unit: f32,
    pub orb_size: f32,
    pub orb_height: f32,
    pub platform_hop_gap: f32,
    pub orb_pulse_step: f32,

    // === Collision ===
    pub landing_tolerance: f32,
    pub hold_jump_tolerance: f32,

    // === Effects ===
    pub particle_burst: usize,
    pub particle_life: f32,
    pub particle_speed: f32,
    pub max_particles: usize,

    // === Endless difficulty ===
    pub endless_base_speed: f32,
    pub speed_step: f32,
    /// Ticks between endless spawns at the start of a run
    pub base_spawn_rate: u32,
    pub spawn_rate_step: u32,
    pub min_spawn_rate: u32,
    /// Cleared obstacles between difficulty ramps
    pub ramp_milestone: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player_x: PLAYER_X,
            player_size: PLAYER_SIZE,
            gravity: GRAVITY,
            jump_power: JUMP_POWER,
            rotation_step: ROTATION_STEP,

            unit: UNIT,
            orb_size: ORB_SIZE,
            orb_height: ORB_HEIGHT,
            platform_hop_gap: PLATFORM_HOP_GAP,
            orb_pulse_step: ORB_PULSE_STEP,

            landing_tolerance: LANDING_TOLERANCE,
            hold_jump_tolerance: HOLD_JUMP_TOLERANCE,

            particle_burst: PARTICLE_BURST,
            particle_life: PARTICLE_LIFE,
            particle_speed: PARTICLE_SPEED,
            max_particles: MAX_PARTICLES,

            endless_base_speed: ENDLESS_BASE_SPEED,
            speed_step: ENDLESS_SPEED_STEP,
            base_spawn_rate: ENDLESS_SPAWN_RATE,
            spawn_rate_step: ENDLESS_SPAWN_RATE_STEP,
            min_spawn_rate: ENDLESS_MIN_SPAWN_RATE,
            ramp_milestone: ENDLESS_RAMP_MILESTONE,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON; missing fields fall back to defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values that would stall or invert the simulation
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.gravity <= 0.0 {
            return Err(TuningError::Invalid("gravity must be positive"));
        }
        if self.jump_power >= 0.0 {
            return Err(TuningError::Invalid("jump_power must point upward (negative)"));
        }
        if self.unit <= 0.0 || self.player_size <= 0.0 || self.orb_size <= 0.0 {
            return Err(TuningError::Invalid("sizes must be positive"));
        }
        if self.max_particles == 0 {
            return Err(TuningError::Invalid("max_particles must be at least 1"));
        }
        if self.particle_life <= 0.0 {
            return Err(TuningError::Invalid("particle_life must be positive"));
        }
        if self.landing_tolerance < 0.0 || self.hold_jump_tolerance < 0.0 {
            return Err(TuningError::Invalid("tolerances must not be negative"));
        }
        if self.ramp_milestone == 0 {
            return Err(TuningError::Invalid("ramp_milestone must be at least 1"));
        }
        if self.min_spawn_rate > self.base_spawn_rate {
            return Err(TuningError::Invalid("min_spawn_rate exceeds base_spawn_rate"));
        }
        Ok(())
    }
}

/// Visible play area supplied by the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Obstacles enter at this x (plus their offset)
    pub width: f32,
    /// Y of the ground line (screen coordinates, y grows downward)
    pub ground_y: f32,
}

impl Viewport {
    pub fn new(width: f32, ground_y: f32) -> Self {
        Self { width, ground_y }
    }

    /// Derive the ground line from a screen size the way the game lays it out
    pub fn from_screen(width: f32, height: f32) -> Self {
        Self {
            width,
            ground_y: height - GROUND_MARGIN,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::from_screen(1280.0, 720.0)
    }
}
