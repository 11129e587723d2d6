//! Read-only view of the simulation for renderers
//!
//! Captured once per frame after the tick. Nothing flows back into the state.

use glam::Vec2;
use serde::Serialize;

use super::state::{GamePhase, GameState, ObstacleKind, ObstacleType};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    pub pos: Vec2,
    pub size: Vec2,
    /// Degrees
    pub rotation: f32,
    pub color: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObstacleView {
    pub id: u32,
    pub kind: ObstacleType,
    pub pos: Vec2,
    pub size: Vec2,
    pub color: u32,
    /// Orbs only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activated: Option<bool>,
    /// Orbs only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pulse_phase: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticleView {
    pub pos: Vec2,
    /// Remaining life in [0, 1]
    pub life_fraction: f32,
    pub color: u32,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSnapshot {
    pub phase: GamePhase,
    pub score: u64,
    pub progress_percent: Option<u32>,
    pub ground_y: f32,
    pub player: PlayerView,
    pub obstacles: Vec<ObstacleView>,
    pub particles: Vec<ParticleView>,
}

impl RenderSnapshot {
    pub fn capture(state: &GameState) -> Self {
        let player = &state.player;
        let max_life = state.tuning.particle_life.max(f32::EPSILON);

        let obstacles = state
            .obstacles
            .iter()
            .map(|o| {
                let (activated, pulse_phase) = match o.kind {
                    ObstacleKind::Orb {
                        activated,
                        pulse_phase,
                    } => (Some(activated), Some(pulse_phase)),
                    _ => (None, None),
                };
                ObstacleView {
                    id: o.id,
                    kind: o.obstacle_type(),
                    pos: o.pos,
                    size: o.size,
                    color: o.color,
                    activated,
                    pulse_phase,
                }
            })
            .collect();

        let particles = state
            .particles
            .iter()
            .map(|p| ParticleView {
                pos: p.pos,
                life_fraction: (p.life / max_life).clamp(0.0, 1.0),
                color: p.color,
            })
            .collect();

        Self {
            phase: state.phase,
            score: state.score,
            progress_percent: state.progress_percent(),
            ground_y: state.viewport.ground_y,
            player: PlayerView {
                pos: player.pos,
                size: player.size,
                rotation: player.rotation,
                color: player.color,
            },
            obstacles,
            particles,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
