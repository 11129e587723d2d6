//! Endless Dash headless runner
//!
//! Plays a scripted level or an endless run with a simple autopilot and logs
//! how it went. Handy for balancing level data and tuning files.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use clap::Parser;

    use endless_dash::audio::{AudioError, MusicBackend, MusicDirector, Track};
    use endless_dash::consts::SIM_DT;
    use endless_dash::sim::{
        GameEvent, GamePhase, GameState, LevelCatalog, ObstacleKind, rect_overlap,
    };
    use endless_dash::{Session, Settings, Tuning, Viewport};

    /// Frames between progress log lines
    const REPORT_INTERVAL: u64 = 600;

    #[derive(Parser, Debug)]
    #[command(name = "endless-dash")]
    #[command(about = "Headless Endless Dash runner")]
    struct Args {
        /// Scripted level to play (1-based)
        #[arg(short, long, default_value = "1")]
        level: u32,

        /// Play an endless run instead of a level
        #[arg(short, long)]
        endless: bool,

        /// Session seed
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Give up after this many frames
        #[arg(short = 'n', long, default_value = "36000")]
        max_frames: u64,

        /// Screen width
        #[arg(long, default_value = "1280")]
        width: f32,

        /// Screen height
        #[arg(long, default_value = "720")]
        height: f32,

        /// Tuning JSON file
        #[arg(short, long)]
        tuning: Option<PathBuf>,

        /// Level catalogue JSON file (array of levels)
        #[arg(long)]
        levels: Option<PathBuf>,

        /// Settings file
        #[arg(long, default_value = Settings::FILE_NAME)]
        settings: PathBuf,

        /// Music volume 0-100 (saved to the settings file when given)
        #[arg(long)]
        volume: Option<u8>,

        /// Autopilot reaction distance in ticks of travel
        #[arg(long, default_value = "4")]
        reaction: f32,

        /// Print the final render snapshot as JSON
        #[arg(long)]
        dump_snapshot: bool,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    }

    /// Music backend with no device: logs what would play
    struct LogBackend;

    impl MusicBackend for LogBackend {
        fn play(&mut self, track: Track, looped: bool) -> Result<(), AudioError> {
            log::info!("Music: {}{}", track.key(), if looped { " (loop)" } else { "" });
            Ok(())
        }

        fn stop(&mut self) -> Result<(), AudioError> {
            log::info!("Music stopped");
            Ok(())
        }

        fn set_volume(&mut self, volume: f32) -> Result<(), AudioError> {
            log::debug!("Music volume {:.2}", volume);
            Ok(())
        }
    }

    /// Jump when something deadly is about to reach the player, or to use an
    /// orb on the way down
    fn autopilot(state: &GameState, reaction: f32) -> bool {
        let player = state.player.rect();
        let reach = state.scroll_speed * reaction;

        for obstacle in &state.obstacles {
            match obstacle.kind {
                ObstacleKind::Orb { activated: false, .. } => {
                    if state.player.velocity_y > 0.0 && rect_overlap(&player, &obstacle.rect()) {
                        return true;
                    }
                }
                ObstacleKind::Orb { .. } => {}
                _ => {
                    let gap = obstacle.pos.x - player.right();
                    if !state.player.is_jumping && gap >= 0.0 && gap <= reach {
                        return true;
                    }
                }
            }
        }
        false
    }

    fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
        let tuning = match &args.tuning {
            Some(path) => Tuning::from_json(&std::fs::read_to_string(path)?)?,
            None => Tuning::default(),
        };
        let catalog = match &args.levels {
            Some(path) => LevelCatalog::from_json(&std::fs::read_to_string(path)?)?,
            None => LevelCatalog::builtin(),
        };

        let mut settings = Settings::load_or_default(&args.settings);
        if let Some(volume) = args.volume {
            settings.set_volume(volume);
            settings.save(&args.settings)?;
        }

        let viewport = Viewport::from_screen(args.width, args.height);
        let director = MusicDirector::new(LogBackend, settings.volume);
        let mut session =
            Session::new(tuning, viewport, catalog, args.seed).with_audio(Box::new(director));
        session.show_menu();

        if args.endless {
            session.start_endless();
        } else if !session.start_level(args.level) {
            let count = session.catalog().len();
            return Err(format!("level {} does not exist (1-{} available)", args.level, count).into());
        }

        let mut frames = 0;
        let mut jumps = 0;
        let mut orbs = 0;
        while session.phase() == GamePhase::Playing && frames < args.max_frames {
            if autopilot(session.state(), args.reaction) {
                session.jump_pressed();
            }
            session.tick(SIM_DT);
            frames += 1;

            for event in session.drain_events() {
                match event {
                    GameEvent::Jumped => jumps += 1,
                    GameEvent::OrbActivated { .. } => orbs += 1,
                    GameEvent::SpeedUp { speed, spawn_rate } => {
                        log::debug!("Frame {}: speed {} spawn rate {}", frames, speed, spawn_rate);
                    }
                    _ => {}
                }
            }

            if frames % REPORT_INTERVAL == 0 {
                match session.progress_percent() {
                    Some(pct) => log::info!("Frame {}: score {} ({}%)", frames, session.score(), pct),
                    None => log::info!("Frame {}: score {}", frames, session.score()),
                }
            }
        }

        // Let the last particles burn out the way a host would after a death
        let mut effect_frames = 0;
        while session.has_live_particles() && session.phase().is_terminal() {
            session.tick_effects();
            effect_frames += 1;
        }

        log::info!(
            "Finished in {:?} after {} frames ({} effect frames): score {}, {} jumps, {} orbs",
            session.phase(),
            frames,
            effect_frames,
            session.score(),
            jumps,
            orbs
        );

        if args.dump_snapshot {
            println!("{}", session.snapshot().to_json()?);
        }
        Ok(())
    }

    pub fn main() {
        let args = Args::parse();

        let default_level = if args.verbose { "debug" } else { "info" };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
            .init();
        log::info!("Endless Dash (headless) starting...");

        if let Err(e) = run(args) {
            log::error!("{}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    native::main();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Hosts embed the library directly on the web
}
