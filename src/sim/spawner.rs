//! Obstacle spawning
//!
//! Two strategies, chosen by the session mode:
//! - scripted playback fires each level event once, keyed by elapsed seconds
//! - endless generation rolls a random pattern every `spawn_rate` ticks and
//!   tightens the rate as the score climbs

use rand::Rng;
use rand_pcg::Pcg32;

use super::level::LevelScript;
use super::state::ObstacleType;
use super::state::RngState;
use crate::tuning::Tuning;

/// Active spawn strategy
#[derive(Debug, Clone)]
pub enum Spawner {
    /// Nothing spawns (menu)
    Idle,
    Scripted(ScriptPlayback),
    Endless(EndlessSpawner),
}

/// Playback cursor over a level script
#[derive(Debug, Clone)]
pub struct ScriptPlayback {
    script: LevelScript,
    /// Events before this index have fired this run
    cursor: usize,
}

impl ScriptPlayback {
    pub fn new(mut script: LevelScript) -> Self {
        // Stable: simultaneous events keep their authored order
        script.events.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { script, cursor: 0 }
    }

    pub fn script(&self) -> &LevelScript {
        &self.script
    }

    /// Events due at `elapsed` that have not fired yet, as (type, offset in units)
    ///
    /// Each event is returned exactly once per playback.
    pub fn due(&mut self, elapsed: f32) -> Vec<(ObstacleType, f32)> {
        let mut due = Vec::new();
        while let Some(event) = self.script.events.get(self.cursor) {
            if event.time > elapsed {
                break;
            }
            due.push((event.kind, event.offset));
            self.cursor += 1;
        }
        due
    }

    /// Number of events that have not fired yet
    pub fn pending(&self) -> usize {
        self.script.events.len() - self.cursor
    }

    /// Duration passed, every event fired and nothing left on screen
    pub fn is_complete(&self, elapsed: f32, live_obstacles: usize) -> bool {
        elapsed >= self.script.duration && self.pending() == 0 && live_obstacles == 0
    }
}

/// Endless-mode obstacle patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    Spike,
    Block,
    Platform,
    DoubleSpike,
    TripleSpike,
    PlatformHop,
    Orb,
    /// Five spikes with a rescue orb over the middle
    LongSpikes,
}

impl Pattern {
    pub const ALL: [Pattern; 8] = [
        Pattern::Spike,
        Pattern::Block,
        Pattern::Platform,
        Pattern::DoubleSpike,
        Pattern::TripleSpike,
        Pattern::PlatformHop,
        Pattern::Orb,
        Pattern::LongSpikes,
    ];

    /// Obstacles making up this pattern, as (type, pixel offset)
    pub fn pieces(&self, tuning: &Tuning) -> Vec<(ObstacleType, f32)> {
        let u = tuning.unit;
        match self {
            Pattern::Spike => vec![(ObstacleType::Spike, 0.0)],
            Pattern::Block => vec![(ObstacleType::Block, 0.0)],
            Pattern::Platform => vec![(ObstacleType::Platform, 0.0)],
            Pattern::DoubleSpike => vec![(ObstacleType::Spike, 0.0), (ObstacleType::Spike, u)],
            Pattern::TripleSpike => vec![
                (ObstacleType::Spike, 0.0),
                (ObstacleType::Spike, u),
                (ObstacleType::Spike, 2.0 * u),
            ],
            Pattern::PlatformHop => vec![
                (ObstacleType::Platform, 0.0),
                (ObstacleType::Platform, tuning.platform_hop_gap),
            ],
            Pattern::Orb => vec![(ObstacleType::Orb, 0.0)],
            Pattern::LongSpikes => {
                let mut pieces: Vec<_> = (0..5)
                    .map(|i| (ObstacleType::Spike, i as f32 * u))
                    .collect();
                pieces.push((ObstacleType::Orb, 2.0 * u));
                pieces
            }
        }
    }
}

/// Result of an endless difficulty ramp
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ramp {
    pub speed: f32,
    pub spawn_rate: u32,
}

/// Procedural spawner for endless mode
#[derive(Debug, Clone)]
pub struct EndlessSpawner {
    rng: Pcg32,
    /// Ticks since the last spawn
    pub timer: u32,
    /// Spawn when the timer exceeds this
    pub spawn_rate: u32,
    /// Score at which the last ramp fired
    pub last_ramp_score: u64,
}

impl EndlessSpawner {
    pub fn new(seed: u64, tuning: &Tuning) -> Self {
        Self::with_rng(RngState::new(seed).to_rng(), tuning)
    }

    /// Use a caller-supplied generator (tests, replays)
    pub fn with_rng(rng: Pcg32, tuning: &Tuning) -> Self {
        Self {
            rng,
            timer: 0,
            spawn_rate: tuning.base_spawn_rate,
            last_ramp_score: 0,
        }
    }

    /// Advance one tick; returns a pattern when one is due
    pub fn update(&mut self) -> Option<Pattern> {
        self.timer += 1;
        if self.timer > self.spawn_rate {
            self.timer = 0;
            Some(self.roll_pattern())
        } else {
            None
        }
    }

    /// Uniform pick over every pattern
    pub fn roll_pattern(&mut self) -> Pattern {
        Pattern::ALL[self.rng.random_range(0..Pattern::ALL.len())]
    }

    /// Ramp difficulty once per milestone band of cleared obstacles
    ///
    /// Returns the new speed and spawn rate when a ramp fires.
    pub fn ramp(&mut self, score: u64, speed: f32, tuning: &Tuning) -> Option<Ramp> {
        if score == 0 || score < self.last_ramp_score + tuning.ramp_milestone {
            return None;
        }
        self.last_ramp_score = score;
        self.spawn_rate = self
            .spawn_rate
            .saturating_sub(tuning.spawn_rate_step)
            .max(tuning.min_spawn_rate);
        Some(Ramp {
            speed: speed + tuning.speed_step,
            spawn_rate: self.spawn_rate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::{LevelCatalog, SpawnEvent};
    use proptest::prelude::*;

    fn script(events: Vec<SpawnEvent>, duration: f32) -> LevelScript {
        LevelScript {
            name: "test".to_string(),
            speed: 5.0,
            duration,
            events,
        }
    }

    #[test]
    fn test_playback_fires_each_event_once() {
        let mut playback = ScriptPlayback::new(script(
            vec![
                SpawnEvent::new(0.5, ObstacleType::Spike, 0.0),
                SpawnEvent::new(1.0, ObstacleType::Spike, 0.0),
                SpawnEvent::new(1.0, ObstacleType::Orb, 1.5),
            ],
            2.0,
        ));

        assert!(playback.due(0.4).is_empty());
        assert_eq!(playback.due(0.5), vec![(ObstacleType::Spike, 0.0)]);
        assert!(playback.due(0.6).is_empty());
        assert_eq!(
            playback.due(1.2),
            vec![(ObstacleType::Spike, 0.0), (ObstacleType::Orb, 1.5)]
        );
        assert!(playback.due(5.0).is_empty());
        assert_eq!(playback.pending(), 0);
    }

    #[test]
    fn test_playback_sorts_unordered_scripts() {
        let mut playback = ScriptPlayback::new(script(
            vec![
                SpawnEvent::new(1.0, ObstacleType::Block, 0.0),
                SpawnEvent::new(0.2, ObstacleType::Spike, 0.0),
            ],
            2.0,
        ));
        assert_eq!(playback.due(0.3), vec![(ObstacleType::Spike, 0.0)]);
        assert_eq!(playback.due(1.0), vec![(ObstacleType::Block, 0.0)]);
    }

    #[test]
    fn test_completion_needs_time_and_drain() {
        let playback = ScriptPlayback::new(script(vec![], 3.0));
        assert!(!playback.is_complete(2.9, 0));
        assert!(!playback.is_complete(3.0, 1));
        assert!(playback.is_complete(3.0, 0));
    }

    #[test]
    fn test_completion_waits_for_unfired_events() {
        let mut playback = ScriptPlayback::new(script(
            vec![SpawnEvent::new(2.999, ObstacleType::Block, 0.0)],
            3.0,
        ));
        // Past the duration with an empty screen, but the block never spawned
        assert!(!playback.is_complete(3.1, 0));
        assert_eq!(playback.due(3.1).len(), 1);
        assert!(playback.is_complete(3.1, 0));
    }

    #[test]
    fn test_builtin_level_spawns_everything() {
        let level = LevelCatalog::builtin().get(1).unwrap().clone();
        let total = level.events.len();
        let mut playback = ScriptPlayback::new(level);
        let spawned = playback.due(100.0);
        assert_eq!(spawned.len(), total);
    }

    #[test]
    fn test_endless_spawns_after_rate() {
        let tuning = Tuning::default();
        let mut spawner = EndlessSpawner::new(1, &tuning);
        for _ in 0..tuning.base_spawn_rate {
            assert!(spawner.update().is_none());
        }
        assert!(spawner.update().is_some());
        assert_eq!(spawner.timer, 0);
    }

    #[test]
    fn test_pattern_pieces() {
        let tuning = Tuning::default();
        assert_eq!(Pattern::TripleSpike.pieces(&tuning).len(), 3);
        let hop = Pattern::PlatformHop.pieces(&tuning);
        assert_eq!(hop[1], (ObstacleType::Platform, 150.0));

        let long = Pattern::LongSpikes.pieces(&tuning);
        assert_eq!(long.len(), 6);
        assert_eq!(long[4], (ObstacleType::Spike, 160.0));
        assert_eq!(long[5], (ObstacleType::Orb, 80.0));
    }

    #[test]
    fn test_pattern_offsets_follow_unit() {
        let tuning = Tuning {
            unit: 60.0,
            ..Tuning::default()
        };
        assert_eq!(Pattern::DoubleSpike.pieces(&tuning)[1], (ObstacleType::Spike, 60.0));
    }

    #[test]
    fn test_same_seed_same_patterns() {
        let tuning = Tuning::default();
        let mut a = EndlessSpawner::new(99, &tuning);
        let mut b = EndlessSpawner::new(99, &tuning);
        for _ in 0..50 {
            assert_eq!(a.roll_pattern(), b.roll_pattern());
        }
    }

    #[test]
    fn test_every_pattern_reachable() {
        let tuning = Tuning::default();
        let mut spawner = EndlessSpawner::new(5, &tuning);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            seen.insert(spawner.roll_pattern() as u8);
        }
        assert_eq!(seen.len(), Pattern::ALL.len());
    }

    #[test]
    fn test_ramp_once_per_milestone() {
        let tuning = Tuning::default();
        let mut spawner = EndlessSpawner::new(1, &tuning);

        assert!(spawner.ramp(0, 5.0, &tuning).is_none());
        assert!(spawner.ramp(9, 5.0, &tuning).is_none());

        let ramp = spawner.ramp(10, 5.0, &tuning).unwrap();
        assert_eq!(ramp.speed, 5.5);
        assert_eq!(ramp.spawn_rate, 85);

        // Same band: no re-trigger
        assert!(spawner.ramp(10, 5.5, &tuning).is_none());
        assert!(spawner.ramp(19, 5.5, &tuning).is_none());

        let ramp = spawner.ramp(20, 5.5, &tuning).unwrap();
        assert_eq!(ramp.speed, 6.0);
        assert_eq!(ramp.spawn_rate, 80);
    }

    #[test]
    fn test_ramp_cadence_is_configurable() {
        let tuning = Tuning {
            ramp_milestone: 15,
            ..Tuning::default()
        };
        let mut spawner = EndlessSpawner::new(1, &tuning);
        assert!(spawner.ramp(10, 5.0, &tuning).is_none());
        assert!(spawner.ramp(15, 5.0, &tuning).is_some());
    }

    proptest! {
        #[test]
        fn prop_spawn_rate_never_below_floor(scores in proptest::collection::vec(1u64..20, 1..60)) {
            let tuning = Tuning::default();
            let mut spawner = EndlessSpawner::new(1, &tuning);
            let mut score = 0;
            let mut speed = tuning.endless_base_speed;
            let mut ramps = 0u64;
            for step in scores {
                score += step;
                if let Some(ramp) = spawner.ramp(score, speed, &tuning) {
                    speed = ramp.speed;
                    ramps += 1;
                }
                prop_assert!(spawner.spawn_rate >= tuning.min_spawn_rate);
            }
            // One ramp at most per milestone band crossed
            prop_assert!(ramps <= score / tuning.ramp_milestone);
        }
    }
}
