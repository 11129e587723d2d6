//! Per-frame simulation tick
//!
//! Core game loop that advances the run by one frame. Physics is per tick;
//! only the level clock is scaled by `dt`, so scripted levels keep wall-clock
//! timing while the endless ramp counts frames.

use glam::Vec2;

use super::collision::{is_landing_on_top, rect_overlap, triangle_collision};
use super::spawner::Spawner;
use super::state::{GameEvent, GameMode, GamePhase, GameState, ObstacleKind};

/// Input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Jump was pressed since the last tick (edge-triggered)
    pub jump: bool,
    /// Jump button is held down (level-triggered)
    pub holding_jump: bool,
}

/// Advance the game state by one frame of `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.holding_jump = input.holding_jump;
    if input.jump {
        jump(state);
    }

    if state.phase != GamePhase::Playing {
        return;
    }

    state.time_ticks += 1;

    if !update_spawner(state, dt) {
        return;
    }

    update_player(state);

    if !update_obstacles(state) {
        return;
    }

    advance_effects(state);
}

/// Jump request from the player
///
/// An unused orb touching the player wins over everything, in spawn order,
/// and works mid-air. Otherwise only a grounded player can jump.
pub fn jump(state: &mut GameState) {
    if state.phase != GamePhase::Playing {
        return;
    }

    let player_rect = state.player.rect();
    let orb = state
        .obstacles
        .iter()
        .position(|o| o.is_live_orb() && rect_overlap(&player_rect, &o.rect()));

    if let Some(index) = orb {
        state.player.launch();
        let orb = &mut state.obstacles[index];
        if let ObstacleKind::Orb { activated, .. } = &mut orb.kind {
            *activated = true;
        }
        let (orb_id, orb_center, orb_color) = (orb.id, orb.rect().center(), orb.color);

        state.emit_particles(orb_center, orb_color);
        state.emit_particles(player_rect.center(), state.player.color);
        state.push_event(GameEvent::OrbActivated { obstacle_id: orb_id });
        log::debug!("Orb #{} activated", orb_id);
        return;
    }

    if !state.player.is_jumping {
        state.player.launch();
        let feet = Vec2::new(player_rect.center().x, player_rect.bottom());
        state.emit_particles(feet, state.player.color);
        state.push_event(GameEvent::Jumped);
    }
}

/// Mode-specific spawning; returns false if the tick ended the level
fn update_spawner(state: &mut GameState, dt: f32) -> bool {
    match &mut state.spawner {
        Spawner::Idle => {}
        Spawner::Scripted(playback) => {
            state.elapsed += dt;

            if playback.is_complete(state.elapsed, state.obstacles.len()) {
                complete_level(state);
                return false;
            }

            let unit = state.tuning.unit;
            for (ty, offset) in playback.due(state.elapsed) {
                state.spawn_obstacle(ty, offset * unit);
            }
        }
        Spawner::Endless(spawner) => {
            state.elapsed += dt;

            let pattern = spawner.update();
            let ramp = spawner.ramp(state.score, state.scroll_speed, &state.tuning);

            if let Some(pattern) = pattern {
                log::debug!("Endless pattern {:?}", pattern);
                for (ty, offset) in pattern.pieces(&state.tuning) {
                    state.spawn_obstacle(ty, offset);
                }
            }

            if let Some(ramp) = ramp {
                state.scroll_speed = ramp.speed;
                log::info!(
                    "Speed up at score {}: speed={}, spawn_rate={}",
                    state.score,
                    ramp.speed,
                    ramp.spawn_rate
                );
                state.push_event(GameEvent::SpeedUp {
                    speed: ramp.speed,
                    spawn_rate: ramp.spawn_rate,
                });
            }
        }
    }
    true
}

/// Gravity, ground clamp, hold-to-jump and airborne spin
fn update_player(state: &mut GameState) {
    let ground_y = state.viewport.ground_y;
    let player = &mut state.player;

    player.velocity_y += player.gravity;
    player.pos.y += player.velocity_y;

    if player.bottom() >= ground_y {
        player.land_on(ground_y);
    }

    let grounded = player.bottom() >= ground_y - state.tuning.hold_jump_tolerance;
    if state.holding_jump && !player.is_jumping && grounded {
        jump(state);
    }

    if state.player.is_jumping {
        state.player.rotation += state.tuning.rotation_step;
    }
}

/// Scroll, collide and retire obstacles; returns false if the player died
///
/// Walks back to front so removal never skips or repeats an obstacle.
fn update_obstacles(state: &mut GameState) -> bool {
    let speed = state.scroll_speed;
    let tolerance = state.tuning.landing_tolerance;

    let mut index = state.obstacles.len();
    while index > 0 {
        index -= 1;

        let obstacle = &mut state.obstacles[index];
        obstacle.pos.x -= speed;
        let rect = obstacle.rect();
        let kind = obstacle.kind;

        let player_rect = state.player.rect();
        let hit = match kind {
            ObstacleKind::Spike => triangle_collision(&player_rect, &rect),
            _ => rect_overlap(&player_rect, &rect),
        };

        if hit {
            match kind {
                ObstacleKind::Orb { .. } => {}
                ObstacleKind::Platform
                    if is_landing_on_top(&player_rect, state.player.velocity_y, &rect, tolerance) =>
                {
                    state.player.land_on(rect.top());
                    if state.holding_jump {
                        jump(state);
                    }
                }
                _ => {
                    game_over(state);
                    return false;
                }
            }
        }

        let orb_pulse_step = state.tuning.orb_pulse_step;
        let obstacle = &mut state.obstacles[index];
        if let ObstacleKind::Orb { pulse_phase, .. } = &mut obstacle.kind {
            *pulse_phase += orb_pulse_step;
        }

        if obstacle.is_off_screen() {
            state.obstacles.remove(index);
            state.score += 1;
            state.push_event(GameEvent::ObstacleCleared { score: state.score });
        }
    }
    true
}

/// Integrate particles and drop the expired ones
///
/// Also safe to call outside Playing so effects can finish after a death.
pub fn advance_effects(state: &mut GameState) {
    for particle in state.particles.iter_mut() {
        particle.pos += particle.vel;
        particle.life -= 1.0;
    }
    state.particles.retain(|p| p.life > 0.0);
}

fn game_over(state: &mut GameState) {
    state.phase = GamePhase::GameOver;
    state.holding_jump = false;
    log::info!("Game over with score {}", state.score);
    state.push_event(GameEvent::Died { score: state.score });
}

fn complete_level(state: &mut GameState) {
    state.phase = GamePhase::LevelComplete;
    let level = match state.mode {
        GameMode::Level(n) => n,
        GameMode::Endless => 0,
    };
    log::info!("Level {} complete with score {}", level, state.score);
    state.push_event(GameEvent::LevelComplete {
        level,
        score: state.score,
    });
}
