//! Session and mode controller
//!
//! Owns the simulation state, the level catalogue and the audio sink. Hosts
//! drive it with commands from their UI and one [`Session::tick`] per frame.

use rand::Rng;
use rand_pcg::Pcg32;

use crate::audio::{AudioSink, SilentAudio, Transition};
use crate::sim::{
    GameEvent, GameMode, GamePhase, GameState, LevelCatalog, RenderSnapshot, RngState, TickInput,
    advance_effects, jump, tick,
};
use crate::tuning::{Tuning, Viewport};

pub struct Session {
    state: GameState,
    catalog: LevelCatalog,
    audio: Box<dyn AudioSink>,
    /// Seeds successive endless runs
    seed_rng: Pcg32,
    /// Hold input as last reported by the host
    holding_jump: bool,
    last_phase: GamePhase,
}

impl Session {
    pub fn new(tuning: Tuning, viewport: Viewport, catalog: LevelCatalog, seed: u64) -> Self {
        Self {
            state: GameState::new(tuning, viewport, seed),
            catalog,
            audio: Box::new(SilentAudio),
            seed_rng: RngState::with_stream(seed, 2).to_rng(),
            holding_jump: false,
            last_phase: GamePhase::Menu,
        }
    }

    /// Replace the audio sink
    pub fn with_audio(mut self, audio: Box<dyn AudioSink>) -> Self {
        self.audio = audio;
        self
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn catalog(&self) -> &LevelCatalog {
        &self.catalog
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn mode(&self) -> GameMode {
        self.state.mode
    }

    pub fn score(&self) -> u64 {
        self.state.score
    }

    pub fn progress_percent(&self) -> Option<u32> {
        self.state.progress_percent()
    }

    /// Start scripted level `number` (1-based); false if no such level
    pub fn start_level(&mut self, number: u32) -> bool {
        let Some(script) = self.catalog.get(number) else {
            log::warn!("No level {} (catalogue has {})", number, self.catalog.len());
            return false;
        };
        self.state.begin_level(number, script);
        self.enter_run();
        true
    }

    /// Start an endless run with the next seed from the session stream
    pub fn start_endless(&mut self) {
        let seed = self.seed_rng.random::<u64>();
        self.start_endless_seeded(seed);
    }

    /// Start an endless run with an explicit seed (replays)
    pub fn start_endless_seeded(&mut self, seed: u64) {
        self.state.begin_endless(seed);
        self.enter_run();
    }

    /// Replay the current mode; ignored from the menu
    pub fn restart(&mut self) -> bool {
        if self.state.phase == GamePhase::Menu {
            log::debug!("Restart ignored in menu");
            return false;
        }
        match self.state.mode {
            GameMode::Level(n) => self.start_level(n),
            GameMode::Endless => {
                self.start_endless();
                true
            }
        }
    }

    pub fn show_menu(&mut self) {
        self.state.return_to_menu();
        self.last_phase = GamePhase::Menu;
        self.audio.on_transition(Transition::Menu);
    }

    /// After a completed level, start the next one or go back to the menu
    /// after the last; returns true if a level started
    pub fn advance_to_next_level(&mut self) -> bool {
        let GameMode::Level(n) = self.state.mode else {
            return false;
        };
        if self.state.phase != GamePhase::LevelComplete {
            log::debug!("Next level ignored in {:?}", self.state.phase);
            return false;
        }
        if self.catalog.is_last(n) {
            self.show_menu();
            return false;
        }
        self.start_level(n + 1)
    }

    /// Edge-triggered jump from the input source
    pub fn jump_pressed(&mut self) {
        jump(&mut self.state);
    }

    /// Level-triggered hold state from the input source
    pub fn set_holding_jump(&mut self, holding: bool) {
        self.holding_jump = holding;
    }

    /// Advance one frame of `dt` seconds and report phase changes to audio
    pub fn tick(&mut self, dt: f32) {
        let input = TickInput {
            jump: false,
            holding_jump: self.holding_jump,
        };
        tick(&mut self.state, &input, dt);

        let phase = self.state.phase;
        if phase != self.last_phase {
            match phase {
                GamePhase::GameOver => {
                    self.audio.on_transition(Transition::GameOver(self.state.mode));
                }
                GamePhase::LevelComplete => {
                    let level = self.state.level_number().unwrap_or_default();
                    self.audio.on_transition(Transition::LevelComplete(level));
                }
                GamePhase::Menu | GamePhase::Playing => {}
            }
            self.last_phase = phase;
        }
    }

    /// Keep particles decaying after a run ends (post-mortem effects)
    pub fn tick_effects(&mut self) {
        if self.state.phase.is_terminal() {
            advance_effects(&mut self.state);
        }
    }

    /// Whether the host still needs to call [`Session::tick_effects`]
    pub fn has_live_particles(&self) -> bool {
        self.state.has_live_particles()
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.state.drain_events()
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot::capture(&self.state)
    }

    /// Forward a 0-100 volume to the audio sink; returns the clamped value
    pub fn set_volume(&mut self, volume: u8) -> u8 {
        let volume = volume.min(100);
        self.audio.set_volume(volume);
        volume
    }

    fn enter_run(&mut self) {
        self.last_phase = GamePhase::Playing;
        self.audio.on_transition(Transition::RunStarted(self.state.mode));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{PARTICLE_LIFE, SIM_DT};
    use crate::sim::{LevelScript, ObstacleType, SpawnEvent};
    use glam::Vec2;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Audio sink that records into a shared log
    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<Transition>>>, Rc<RefCell<Vec<u8>>>);

    impl AudioSink for Recorder {
        fn on_transition(&mut self, transition: Transition) {
            self.0.borrow_mut().push(transition);
        }

        fn set_volume(&mut self, volume: u8) {
            self.1.borrow_mut().push(volume);
        }
    }

    fn short_level(name: &str) -> LevelScript {
        LevelScript {
            name: name.to_string(),
            speed: 50.0,
            duration: 0.5,
            events: vec![SpawnEvent::new(0.1, ObstacleType::Orb, 0.0)],
        }
    }

    fn session_with(catalog: LevelCatalog) -> (Session, Recorder) {
        let recorder = Recorder::default();
        let session = Session::new(Tuning::default(), Viewport::new(800.0, 400.0), catalog, 99)
            .with_audio(Box::new(recorder.clone()));
        (session, recorder)
    }

    fn two_levels() -> LevelCatalog {
        LevelCatalog::new(vec![short_level("one"), short_level("two")]).unwrap()
    }

    /// Tick until the phase leaves Playing
    fn run_out(session: &mut Session) {
        for _ in 0..10_000 {
            if session.phase() != GamePhase::Playing {
                return;
            }
            session.tick(0.05);
        }
    }

    #[test]
    fn test_start_level_and_unknown_level() {
        let (mut session, recorder) = session_with(LevelCatalog::builtin());
        assert!(!session.start_level(0));
        assert!(!session.start_level(4));
        assert_eq!(session.phase(), GamePhase::Menu);

        assert!(session.start_level(2));
        assert_eq!(session.phase(), GamePhase::Playing);
        assert_eq!(session.mode(), GameMode::Level(2));
        assert_eq!(session.progress_percent(), Some(0));
        assert_eq!(
            *recorder.0.borrow(),
            vec![Transition::RunStarted(GameMode::Level(2))]
        );
    }

    #[test]
    fn test_level_complete_then_next_then_menu() {
        let (mut session, recorder) = session_with(two_levels());
        session.start_level(1);
        run_out(&mut session);
        assert_eq!(session.phase(), GamePhase::LevelComplete);
        assert_eq!(session.score(), 1);
        assert_eq!(session.progress_percent(), Some(100));

        assert!(session.advance_to_next_level());
        assert_eq!(session.mode(), GameMode::Level(2));
        assert_eq!(session.score(), 0);

        run_out(&mut session);
        assert_eq!(session.phase(), GamePhase::LevelComplete);
        assert!(!session.advance_to_next_level());
        assert_eq!(session.phase(), GamePhase::Menu);

        assert_eq!(
            *recorder.0.borrow(),
            vec![
                Transition::RunStarted(GameMode::Level(1)),
                Transition::LevelComplete(1),
                Transition::RunStarted(GameMode::Level(2)),
                Transition::LevelComplete(2),
                Transition::Menu,
            ]
        );
    }

    #[test]
    fn test_next_level_ignored_while_playing() {
        let (mut session, _) = session_with(two_levels());
        session.start_level(1);
        assert!(!session.advance_to_next_level());
        assert_eq!(session.mode(), GameMode::Level(1));
        assert_eq!(session.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_game_over_and_restart_level() {
        let (mut session, recorder) = session_with(LevelCatalog::builtin());
        session.start_level(1);
        run_out(&mut session);
        // Nobody jumps, so the first spike ends the run
        assert_eq!(session.phase(), GamePhase::GameOver);
        assert!(matches!(
            session.drain_events().last(),
            Some(GameEvent::Died { .. })
        ));

        assert!(session.restart());
        assert_eq!(session.phase(), GamePhase::Playing);
        assert_eq!(session.mode(), GameMode::Level(1));
        assert!(session.state().obstacles.is_empty());
        assert_eq!(
            recorder.0.borrow()[1],
            Transition::GameOver(GameMode::Level(1))
        );
    }

    #[test]
    fn test_restart_endless_uses_fresh_seed() {
        let (mut session, _) = session_with(LevelCatalog::builtin());
        assert!(!session.restart());

        session.start_endless();
        let first_seed = session.state().seed;
        session.restart();
        assert_eq!(session.mode(), GameMode::Endless);
        assert_ne!(session.state().seed, first_seed);
    }

    #[test]
    fn test_sessions_with_same_seed_replay_identically() {
        let play = || {
            let (mut session, _) = session_with(LevelCatalog::builtin());
            session.start_endless();
            for i in 0..400 {
                session.set_holding_jump(i % 50 < 20);
                session.tick(SIM_DT);
            }
            (session.score(), session.phase(), session.state().player.pos)
        };
        assert_eq!(play(), play());
    }

    #[test]
    fn test_post_mortem_effects_drain() {
        let (mut session, _) = session_with(LevelCatalog::builtin());
        session.start_level(1);
        run_out(&mut session);
        assert_eq!(session.phase(), GamePhase::GameOver);

        session.state.emit_particles(Vec2::new(120.0, 380.0), 0xffffff);
        // Ticks are frozen, effects are not
        session.tick(SIM_DT);
        assert!(session.has_live_particles());

        let mut frames = 0;
        while session.has_live_particles() && frames < 100 {
            session.tick_effects();
            frames += 1;
        }
        assert_eq!(frames, PARTICLE_LIFE as usize);
    }

    #[test]
    fn test_menu_freezes_run() {
        let (mut session, recorder) = session_with(LevelCatalog::builtin());
        session.start_endless_seeded(4);
        session.tick(SIM_DT);
        session.show_menu();
        let ticks = session.state().time_ticks;
        session.tick(SIM_DT);
        assert_eq!(session.state().time_ticks, ticks);
        assert_eq!(recorder.0.borrow().last(), Some(&Transition::Menu));
    }

    #[test]
    fn test_set_volume_clamps() {
        let (mut session, recorder) = session_with(LevelCatalog::builtin());
        assert_eq!(session.set_volume(140), 100);
        assert_eq!(session.set_volume(20), 20);
        assert_eq!(*recorder.1.borrow(), vec![100, 20]);
    }

    #[test]
    fn test_snapshot_reflects_session() {
        let (mut session, _) = session_with(LevelCatalog::builtin());
        session.start_level(1);
        let snapshot = session.snapshot();
        assert_eq!(snapshot.phase, GamePhase::Playing);
        assert_eq!(snapshot.progress_percent, Some(0));
        assert_eq!(snapshot.score, 0);
    }
}
