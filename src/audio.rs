//! Music track selection
//!
//! The session reports phase transitions; a [`MusicDirector`] turns them into
//! track changes on a host-provided [`MusicBackend`]. Backend failures are
//! logged and dropped so a broken audio device never stops the game.

use crate::sim::GameMode;

/// Background music tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Track {
    Menu,
    /// One track per scripted level, numbered from 1
    Level(u32),
    Endless,
}

impl Track {
    /// Stable track key for asset lookup ("menu", "level2", "endless")
    pub fn key(&self) -> String {
        match self {
            Track::Menu => "menu".to_string(),
            Track::Level(n) => format!("level{}", n),
            Track::Endless => "endless".to_string(),
        }
    }

    /// Menu and endless music loop; level tracks play once
    pub fn loops(&self) -> bool {
        !matches!(self, Track::Level(_))
    }

    /// Track for a run in `mode`
    pub fn for_mode(mode: GameMode) -> Self {
        match mode {
            GameMode::Level(n) => Track::Level(n),
            GameMode::Endless => Track::Endless,
        }
    }
}

/// Phase transitions the session reports to its audio sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Menu,
    RunStarted(GameMode),
    GameOver(GameMode),
    LevelComplete(u32),
}

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("Track '{0}' is not available")]
    MissingTrack(String),
    #[error("Playback failed: {0}")]
    Playback(String),
}

/// Sink notified by the session; never fails from the caller's side
pub trait AudioSink {
    fn on_transition(&mut self, transition: Transition);

    /// Volume in percent, 0-100
    fn set_volume(&mut self, volume: u8);
}

/// Audio sink that ignores everything
#[derive(Debug, Default)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn on_transition(&mut self, _transition: Transition) {}

    fn set_volume(&mut self, _volume: u8) {}
}

/// Host playback device
pub trait MusicBackend {
    /// Start `track` from the beginning, replacing whatever was playing
    fn play(&mut self, track: Track, looped: bool) -> Result<(), AudioError>;

    fn stop(&mut self) -> Result<(), AudioError>;

    /// Linear gain, 0.0 - 1.0
    fn set_volume(&mut self, volume: f32) -> Result<(), AudioError>;
}

/// Picks the track for each transition and drives a [`MusicBackend`]
pub struct MusicDirector<B: MusicBackend> {
    backend: B,
    enabled: bool,
    volume: u8,
    /// Track that fits the current phase, if any; used to resume after unmute
    resume: Option<Track>,
}

impl<B: MusicBackend> MusicDirector<B> {
    pub fn new(backend: B, volume: u8) -> Self {
        let mut director = Self {
            backend,
            enabled: true,
            volume: volume.min(100),
            resume: None,
        };
        director.apply_volume();
        director
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    /// Mute or unmute; unmuting restarts the track for the current phase
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        if self.enabled {
            if let Some(track) = self.resume {
                self.play(track);
            }
        } else {
            self.stop();
        }
        log::info!("Music {}", if self.enabled { "enabled" } else { "disabled" });
        self.enabled
    }

    fn play(&mut self, track: Track) {
        if !self.enabled {
            return;
        }
        if let Err(e) = self.backend.play(track, track.loops()) {
            log::warn!("Music playback failed for '{}': {}", track.key(), e);
        }
    }

    fn stop(&mut self) {
        if let Err(e) = self.backend.stop() {
            log::warn!("Failed to stop music: {}", e);
        }
    }

    fn apply_volume(&mut self) {
        let gain = self.volume as f32 / 100.0;
        if let Err(e) = self.backend.set_volume(gain) {
            log::warn!("Failed to set music volume: {}", e);
        }
    }
}

impl<B: MusicBackend> AudioSink for MusicDirector<B> {
    fn on_transition(&mut self, transition: Transition) {
        match transition {
            Transition::Menu => {
                self.resume = Some(Track::Menu);
                self.play(Track::Menu);
            }
            Transition::RunStarted(mode) => {
                let track = Track::for_mode(mode);
                self.resume = Some(track);
                self.play(track);
            }
            // Current track keeps going; nothing to resume into after a mute
            Transition::GameOver(_) | Transition::LevelComplete(_) => {
                self.resume = None;
            }
        }
    }

    fn set_volume(&mut self, volume: u8) {
        self.volume = volume.min(100);
        self.apply_volume();
    }
}
