//! Scripted level data
//!
//! A level is a fixed, replayable spawn schedule. Offsets are in grid units
//! (scaled by `Tuning::unit` at spawn time) so a script survives a change of
//! obstacle size.

use serde::{Deserialize, Serialize};

use super::state::ObstacleType;
use super::state::ObstacleType::{Block, Orb, Platform, Spike};

/// Problems with level data, caught at load time rather than mid-run
#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    #[error("Level '{0}' has a non-positive or non-finite duration")]
    BadDuration(String),
    #[error("Level '{0}' has a non-positive or non-finite scroll speed")]
    BadSpeed(String),
    #[error("Level '{level}' event {index} has invalid time {time}")]
    BadTime { level: String, index: usize, time: f32 },
    #[error("Level '{level}' event {index} at {time}s never spawns before the {duration}s duration")]
    Unreachable {
        level: String,
        index: usize,
        time: f32,
        duration: f32,
    },
    #[error("Level '{level}' event {index} has invalid offset {offset}")]
    BadOffset { level: String, index: usize, offset: f32 },
    #[error("Level '{level}' event {index} is scheduled before the event preceding it")]
    Unordered { level: String, index: usize },
    #[error("Level catalog is empty")]
    EmptyCatalog,
    #[error("Invalid level data: {0}")]
    Json(#[from] serde_json::Error),
}

/// One timed spawn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnEvent {
    /// Seconds after the level starts
    pub time: f32,
    #[serde(rename = "type")]
    pub kind: ObstacleType,
    /// Grid units past the right edge of the viewport
    #[serde(default)]
    pub offset: f32,
}

impl SpawnEvent {
    pub const fn new(time: f32, kind: ObstacleType, offset: f32) -> Self {
        Self { time, kind, offset }
    }
}

/// Immutable definition of one level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelScript {
    pub name: String,
    /// Scroll speed in units per tick
    pub speed: f32,
    /// Seconds before the level may complete
    pub duration: f32,
    /// Spawn schedule in time order
    pub events: Vec<SpawnEvent>,
}

impl LevelScript {
    /// Parse and validate a single level
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let script: Self = serde_json::from_str(json)?;
        script.validate()?;
        Ok(script)
    }

    /// Check the schedule can actually be played out
    pub fn validate(&self) -> Result<(), LevelError> {
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(LevelError::BadDuration(self.name.clone()));
        }
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(LevelError::BadSpeed(self.name.clone()));
        }

        let mut previous = 0.0f32;
        for (index, event) in self.events.iter().enumerate() {
            if !event.time.is_finite() || event.time < 0.0 {
                return Err(LevelError::BadTime {
                    level: self.name.clone(),
                    index,
                    time: event.time,
                });
            }
            if event.time > self.duration {
                return Err(LevelError::Unreachable {
                    level: self.name.clone(),
                    index,
                    time: event.time,
                    duration: self.duration,
                });
            }
            if !event.offset.is_finite() || event.offset < 0.0 {
                return Err(LevelError::BadOffset {
                    level: self.name.clone(),
                    index,
                    offset: event.offset,
                });
            }
            if event.time < previous {
                return Err(LevelError::Unordered {
                    level: self.name.clone(),
                    index,
                });
            }
            previous = event.time;
        }
        Ok(())
    }
}

/// Levels keyed by number, starting at 1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelCatalog {
    levels: Vec<LevelScript>,
}

impl LevelCatalog {
    /// Build a catalog, validating every level
    pub fn new(levels: Vec<LevelScript>) -> Result<Self, LevelError> {
        if levels.is_empty() {
            return Err(LevelError::EmptyCatalog);
        }
        for level in &levels {
            level.validate()?;
        }
        Ok(Self { levels })
    }

    /// Parse a JSON array of levels
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let levels: Vec<LevelScript> = serde_json::from_str(json)?;
        Self::new(levels)
    }

    /// The three levels that ship with the game
    pub fn builtin() -> Self {
        Self {
            levels: vec![level_one(), level_two(), level_three()],
        }
    }

    /// Level `number` (1-based)
    pub fn get(&self, number: u32) -> Option<&LevelScript> {
        let index = (number as usize).checked_sub(1)?;
        self.levels.get(index)
    }

    pub fn len(&self) -> u32 {
        self.levels.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// True when no level follows `number`
    pub fn is_last(&self, number: u32) -> bool {
        number >= self.len()
    }
}

impl Default for LevelCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn level_one() -> LevelScript {
    LevelScript {
        name: "Level 1: The Beginning".to_string(),
        speed: 5.0,
        duration: 25.0,
        events: vec![
            SpawnEvent::new(0.80, Spike, 0.0),
            SpawnEvent::new(1.67, Spike, 0.0),
            SpawnEvent::new(3.33, Spike, 0.0),
            SpawnEvent::new(3.33, Spike, 1.0),
            SpawnEvent::new(5.00, Block, 0.0),
            SpawnEvent::new(6.67, Spike, 0.0),
            SpawnEvent::new(7.50, Spike, 1.0),
            // Four spikes under an orb: first orb lesson
            SpawnEvent::new(10.00, Spike, 0.0),
            SpawnEvent::new(10.00, Spike, 1.0),
            SpawnEvent::new(10.00, Spike, 2.0),
            SpawnEvent::new(10.00, Spike, 3.0),
            SpawnEvent::new(10.00, Orb, 1.5),
            SpawnEvent::new(13.33, Platform, 0.0),
            SpawnEvent::new(15.83, Platform, 0.0),
            SpawnEvent::new(18.33, Spike, 0.0),
            // Staircase
            SpawnEvent::new(20.83, Platform, 0.0),
            SpawnEvent::new(22.17, Platform, 0.0),
            SpawnEvent::new(23.50, Platform, 0.0),
            SpawnEvent::new(25.00, Spike, 0.0),
        ],
    }
}

fn level_two() -> LevelScript {
    LevelScript {
        name: "Level 2: Platform Jumper".to_string(),
        speed: 6.0,
        duration: 27.5,
        events: vec![
            SpawnEvent::new(1.33, Spike, 0.0),
            SpawnEvent::new(2.67, Spike, 0.0),
            SpawnEvent::new(4.00, Block, 0.0),
            SpawnEvent::new(6.33, Spike, 0.0),
            SpawnEvent::new(6.33, Spike, 1.0),
            SpawnEvent::new(6.33, Spike, 2.0),
            SpawnEvent::new(6.33, Spike, 3.0),
            SpawnEvent::new(6.33, Spike, 4.0),
            SpawnEvent::new(6.33, Orb, 2.0),
            // Platform hops
            SpawnEvent::new(9.17, Platform, 0.0),
            SpawnEvent::new(11.33, Platform, 0.0),
            SpawnEvent::new(13.50, Platform, 0.0),
            SpawnEvent::new(15.83, Spike, 0.0),
            SpawnEvent::new(17.17, Block, 0.0),
            SpawnEvent::new(19.17, Orb, 0.0),
            SpawnEvent::new(20.33, Platform, 0.0),
            // Staircase
            SpawnEvent::new(22.50, Platform, 0.0),
            SpawnEvent::new(23.67, Platform, 0.0),
            SpawnEvent::new(24.83, Platform, 0.0),
            SpawnEvent::new(24.83, Spike, 1.5),
            SpawnEvent::new(26.67, Spike, 0.0),
        ],
    }
}

fn level_three() -> LevelScript {
    LevelScript {
        name: "Level 3: Speed Trial".to_string(),
        speed: 7.0,
        duration: 30.0,
        events: vec![
            SpawnEvent::new(1.33, Spike, 0.0),
            SpawnEvent::new(2.67, Spike, 0.0),
            SpawnEvent::new(4.00, Block, 0.0),
            SpawnEvent::new(5.83, Spike, 0.0),
            SpawnEvent::new(5.83, Spike, 1.0),
            SpawnEvent::new(5.83, Spike, 2.0),
            SpawnEvent::new(5.83, Spike, 3.0),
            SpawnEvent::new(5.83, Spike, 4.0),
            SpawnEvent::new(5.83, Spike, 5.0),
            SpawnEvent::new(5.83, Orb, 2.5),
            SpawnEvent::new(9.17, Platform, 0.0),
            SpawnEvent::new(10.83, Platform, 0.0),
            SpawnEvent::new(13.00, Orb, 0.0),
            SpawnEvent::new(14.17, Platform, 0.0),
            SpawnEvent::new(16.33, Spike, 0.0),
            // Staircase
            SpawnEvent::new(18.00, Platform, 0.0),
            SpawnEvent::new(19.00, Platform, 0.0),
            SpawnEvent::new(20.00, Platform, 0.0),
            SpawnEvent::new(21.00, Platform, 0.0),
            SpawnEvent::new(23.00, Block, 0.0),
            SpawnEvent::new(25.00, Spike, 0.0),
            SpawnEvent::new(25.00, Spike, 1.0),
            SpawnEvent::new(25.00, Spike, 2.0),
            SpawnEvent::new(25.00, Spike, 3.0),
            SpawnEvent::new(25.00, Spike, 4.0),
            SpawnEvent::new(25.00, Orb, 2.0),
            SpawnEvent::new(27.50, Platform, 0.0),
            // Final challenge
            SpawnEvent::new(29.17, Spike, 0.0),
            SpawnEvent::new(29.17, Spike, 1.0),
            SpawnEvent::new(29.17, Spike, 2.0),
            SpawnEvent::new(29.17, Spike, 3.0),
        ],
    }
}
