/// GameSession: everything one running game owns.
///
/// The host constructs one session and calls `tick()` at the configured
/// rate, feeding key presses into `latch_mut()` in between. The session
/// owns the stage list, the active `StagePlay` and the random source.
///
/// After a loss the stage restarts once the death animation has played;
/// after a clear the next stage starts. Select restarts at any time;
/// pause during the opening tour skips straight to the return pan.

use log::{debug, info};
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::config::GameConfig;
use crate::domain::input::{ButtonLatch, Stick};
use crate::error::StageError;

use super::event::StageEvent;
use super::level::StageTemplate;
use super::play::{PlayMode, StagePlay};

/// Ticks the death animation runs before the stage restarts.
pub const LOST_TICKS: u32 = 200;
/// Ticks the clear screen is held before the next stage.
pub const CLEAR_TICKS: u32 = 350;

pub struct GameSession {
    config: GameConfig,
    latch: ButtonLatch,
    stages: Vec<StageTemplate>,
    current: usize,
    play: StagePlay,
    ending: u32,
    attempts: u32,
}

impl GameSession {
    /// Start at the first of `stages`.
    pub fn new(config: GameConfig, stages: Vec<StageTemplate>) -> Result<Self, StageError> {
        let first = stages.first().ok_or(StageError::NoStages)?;
        let rng = Pcg32::seed_from_u64(config.seed);
        let play = StagePlay::new(first, config.tuning.clone(), rng)?;
        Ok(GameSession {
            config,
            latch: ButtonLatch::new(),
            stages,
            current: 0,
            play,
            ending: 0,
            attempts: 1,
        })
    }

    /// One tick of the game. Returns the events the stage emitted.
    pub fn tick(&mut self) -> Result<Vec<StageEvent>, StageError> {
        if self.latch.select() {
            info!("select pressed, restarting stage");
            self.restart()?;
            return Ok(Vec::new());
        }
        if matches!(self.play.mode(), PlayMode::Showcase(_)) && self.latch.pause() {
            debug!("showcase skipped");
            self.play.skip_showcase();
        }

        let events = self.play.step_frame(&mut self.latch);

        match self.play.mode() {
            PlayMode::Lost | PlayMode::Cleared => self.ending += 1,
            _ => self.ending = 0,
        }
        if self.play.is_lost() && self.ending >= LOST_TICKS {
            self.restart()?;
        } else if self.play.is_cleared() && self.ending >= CLEAR_TICKS {
            self.current = (self.current + 1) % self.stages.len();
            self.attempts = 0;
            self.restart()?;
        }
        Ok(events)
    }

    /// Rebuild the current stage from its template.
    pub fn restart(&mut self) -> Result<(), StageError> {
        let template = &self.stages[self.current];
        let rng = Pcg32::seed_from_u64(self.config.seed.wrapping_add(self.attempts as u64));
        self.play = StagePlay::new(template, self.config.tuning.clone(), rng)?;
        self.ending = 0;
        self.attempts += 1;
        Ok(())
    }

    pub fn play(&self) -> &StagePlay {
        &self.play
    }

    pub fn latch_mut(&mut self) -> &mut ButtonLatch {
        &mut self.latch
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn stage_index(&self) -> usize {
        self.current
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}
