/// Entry point and game loop.
///
/// `digrunner [stage.txt ...]` plays the given stage files in order, or the
/// built-in stages when none are given. `q` or Esc quits.

use std::path::Path;
use std::time::{Duration, Instant};

use log::{debug, error, info};

use digrunner::config::GameConfig;
use digrunner::error::StageError;
use digrunner::sim::level::{self, StageTemplate};
use digrunner::sim::session::GameSession;
use digrunner::ui::input::InputState;
use digrunner::ui::renderer::Renderer;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = GameConfig::load();
    let stages = match load_stages(std::env::args().skip(1)) {
        Ok(stages) => stages,
        Err(e) => {
            eprintln!("Could not load stages: {e}");
            std::process::exit(1);
        }
    };
    let mut session = match GameSession::new(config, stages) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Could not start: {e}");
            std::process::exit(1);
        }
    };
    info!(
        "{} stage(s) loaded, tick {} ms",
        session.stage_count(),
        session.config().tick_rate_ms
    );

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut session, &mut renderer);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        error!("game loop stopped: {e}");
        eprintln!("Game error: {e}");
    }
}

fn load_stages<I: Iterator<Item = String>>(paths: I) -> Result<Vec<StageTemplate>, StageError> {
    let paths: Vec<String> = paths.collect();
    if paths.is_empty() {
        return (1..=level::embedded_count()).map(level::embedded_stage).collect();
    }
    paths
        .iter()
        .enumerate()
        .map(|(i, p)| StageTemplate::load(Path::new(p), i as u32 + 1))
        .collect()
}

fn game_loop(
    session: &mut GameSession,
    renderer: &mut Renderer,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut input = InputState::new();
    let tick_rate = Duration::from_millis(session.config().tick_rate_ms);
    let mut last_tick = Instant::now();

    loop {
        input.drain_events();
        if input.quit_requested() {
            break;
        }
        input.apply(session.latch_mut());

        if last_tick.elapsed() >= tick_rate {
            for event in session.tick()? {
                debug!("{event:?}");
            }
            renderer.render(session.play())?;
            last_tick = Instant::now();
        }

        std::thread::sleep(FRAME_SLEEP);
    }
    Ok(())
}
