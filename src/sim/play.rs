/// StagePlay: one attempt at one stage.
///
/// ## Modes
///
/// ```text
///   Showcase(Right → Down → Left → Up) ──► ReturnX ──► ReturnY ──► Playing
///                                            ▲                      │  │  │
///                                            └──── Paused ◄─────────┘  │  │
///                                                                 Lost ◄┘  └► Cleared
/// ```
///
/// Only `Playing` moves actors: the player first, then every enemy in
/// index order, so enemies always see this tick's digs.
///
/// The camera works in pixels. It follows the player while playing; in
/// every other mode it is driven by the mode. `base` is the zoom level:
/// it grows toward `zoom_steps` while paused and shrinks toward zero
/// otherwise (the showcase keeps it fixed).

use log::info;
use rand::RngCore;
use rand_pcg::Pcg32;

use crate::config::Tuning;
use crate::domain::entity::{HoleEntry, Point, TILE_SIZE};
use crate::domain::input::Stick;
use crate::domain::pose::Point3;
use crate::domain::tile::BlockKind;
use crate::error::StageError;

use super::enemy::Enemy;
use super::event::StageEvent;
use super::level::{StageInfo, StageTemplate};
use super::motion::{move_frame, Frame};
use super::player::Player;
use super::stage::{Outcome, StageState};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Pan {
    Right,
    Down,
    Left,
    Up,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PlayMode {
    Playing,
    Paused,
    Cleared,
    Lost,
    /// Automatic tour of the stage at start.
    Showcase(Pan),
    /// Easing back to the player, horizontally then vertically.
    ReturnX,
    ReturnY,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Camera {
    pub x: i32,
    pub y: i32,
    pub base: u32,
}

pub struct StagePlay<R: RngCore = Pcg32> {
    info: StageInfo,
    stage: StageState,
    player: Player,
    enemies: Vec<Enemy>,
    tuning: Tuning,
    rng: R,
    mode: PlayMode,
    camera: Camera,
    play_time: u64,
}

impl<R: RngCore> StagePlay<R> {
    pub fn new(template: &StageTemplate, tuning: Tuning, rng: R) -> Result<Self, StageError> {
        let spawn = template.player_spawn().ok_or_else(|| StageError::MissingPlayer {
            name: template.info.name.clone(),
        })?;
        let mut stage = StageState::new(template.grid.clone(), tuning.hole_ticks);
        stage.occupancy.set(spawn.x, spawn.y, BlockKind::Player);
        stage.set_player_tile(spawn);
        let player = Player::new(spawn, &tuning);

        let spawns = template.enemy_spawns();
        let enemies: Vec<Enemy> = spawns
            .iter()
            .enumerate()
            .map(|(i, &at)| {
                stage.occupancy.set(at.x, at.y, BlockKind::Enemy);
                Enemy::new(at, i, spawns.len(), &tuning)
            })
            .collect();

        let mode = if tuning.showcase { PlayMode::Showcase(Pan::Right) } else { PlayMode::Playing };
        let camera = Camera { x: 0, y: 0, base: tuning.zoom_steps };
        info!(
            "stage {} '{}' started: {} enemies, {} gold",
            template.info.number,
            template.info.name,
            enemies.len(),
            stage.rest_gold()
        );

        Ok(StagePlay {
            info: template.info.clone(),
            stage,
            player,
            enemies,
            tuning,
            rng,
            mode,
            camera,
            play_time: 0,
        })
    }

    /// Advance one tick and return what changed.
    pub fn step_frame(&mut self, stick: &mut dyn Stick) -> Vec<StageEvent> {
        self.zoom();
        match self.mode {
            PlayMode::Playing => self.play(stick),
            PlayMode::Paused => self.paused(stick),
            PlayMode::Showcase(pan) => self.showcase(pan),
            PlayMode::ReturnX => self.return_x(),
            PlayMode::ReturnY => self.return_y(),
            PlayMode::Lost => self.player.advance_dying(),
            PlayMode::Cleared => {}
        }
        self.stage.drain_events()
    }

    /// Jump straight to the return pan.
    pub fn skip_showcase(&mut self) {
        if matches!(self.mode, PlayMode::Showcase(_)) {
            self.mode = PlayMode::ReturnX;
        }
    }

    // ── Mode handlers ──

    fn zoom(&mut self) {
        match self.mode {
            PlayMode::Paused => {
                if self.camera.base < self.tuning.zoom_steps {
                    self.camera.base += 1;
                }
            }
            PlayMode::Showcase(_) => {}
            _ => self.camera.base = self.camera.base.saturating_sub(1),
        }
    }

    fn play(&mut self, stick: &mut dyn Stick) {
        if stick.pause() {
            self.mode = PlayMode::Paused;
            self.focus_player();
            info!("paused at tick {}", self.play_time);
            return;
        }
        self.play_time += 1;

        let mut frame = Frame { stick, rng: &mut self.rng, tuning: &self.tuning };
        move_frame(&mut self.player, &mut self.stage, &mut frame);
        for enemy in &mut self.enemies {
            move_frame(enemy, &mut self.stage, &mut frame);
        }

        match self.stage.outcome() {
            Some(Outcome::Cleared) => {
                self.mode = PlayMode::Cleared;
                self.focus_player();
                info!("stage cleared in {} ticks", self.play_time);
            }
            Some(Outcome::Lost) => {
                self.mode = PlayMode::Lost;
                self.focus_player();
                self.player.start_dying();
                info!("stage lost after {} ticks", self.play_time);
            }
            None => {}
        }
    }

    fn paused(&mut self, stick: &mut dyn Stick) {
        if stick.pause() {
            self.mode = PlayMode::ReturnX;
            info!("resumed");
        }
        let (max_x, max_y) = self.extent();
        let (pan_x, pan_y) = (self.tuning.pan_x, self.tuning.pan_y);
        let cam = &mut self.camera;
        if stick.right() && cam.x < max_x { cam.x += pan_x; }
        if stick.left() && cam.x > 0 { cam.x -= pan_x; }
        if stick.down() && cam.y < max_y { cam.y += pan_y; }
        if stick.up() && cam.y > 0 { cam.y -= pan_y; }
    }

    fn showcase(&mut self, pan: Pan) {
        let (max_x, max_y) = self.extent();
        let (pan_x, pan_y) = (self.tuning.pan_x, self.tuning.pan_y);
        let cam = &mut self.camera;
        self.mode = match pan {
            Pan::Right => {
                cam.x += pan_x;
                if cam.x >= max_x { PlayMode::Showcase(Pan::Down) } else { self.mode }
            }
            Pan::Down => {
                cam.y += pan_y;
                if cam.y >= max_y { PlayMode::Showcase(Pan::Left) } else { self.mode }
            }
            Pan::Left => {
                cam.x -= pan_x;
                if cam.x <= 0 { PlayMode::Showcase(Pan::Up) } else { self.mode }
            }
            Pan::Up => {
                cam.y -= pan_y;
                if cam.y <= 0 { PlayMode::ReturnX } else { self.mode }
            }
        };
    }

    fn return_x(&mut self) {
        let target = self.player.draw_point().x;
        if approach(&mut self.camera.x, target, self.tuning.pan_x) {
            self.mode = PlayMode::ReturnY;
        }
    }

    fn return_y(&mut self) {
        let target = self.player.draw_point().y;
        if approach(&mut self.camera.y, target, self.tuning.pan_y) {
            self.mode = PlayMode::Playing;
        }
    }

    fn focus_player(&mut self) {
        let Point { x, y } = self.player.draw_point();
        self.camera.x = x;
        self.camera.y = y;
    }

    /// Stage size in pixels.
    fn extent(&self) -> (i32, i32) {
        (self.stage.width() * TILE_SIZE, self.stage.height() * TILE_SIZE)
    }

    // ── Renderer-facing queries ──

    /// Camera focus in tiles (centre of the focused tile) and zoom in 0..=1.
    pub fn view_pos(&self) -> Point3 {
        let focus = if self.mode == PlayMode::Playing {
            self.player.draw_point()
        } else {
            Point::new(self.camera.x, self.camera.y)
        };
        let zoom = if self.tuning.zoom_steps == 0 {
            0.0
        } else {
            self.camera.base as f32 / self.tuning.zoom_steps as f32
        };
        Point3 {
            x: focus.x as f32 / TILE_SIZE as f32 + 0.5,
            y: focus.y as f32 / TILE_SIZE as f32 + 0.5,
            z: zoom,
        }
    }

    /// Open holes plus the dig in flight, if any.
    pub fn hole_list(&self) -> Vec<HoleEntry> {
        let mut holes = self.stage.holes().to_vec();
        holes.extend(self.player.dig_in_progress(&self.tuning));
        holes
    }

    pub fn rest_gold(&self) -> u32 {
        self.stage.rest_gold()
    }

    pub fn play_time(&self) -> u64 {
        self.play_time
    }

    pub fn mode(&self) -> PlayMode {
        self.mode
    }

    pub fn is_cleared(&self) -> bool {
        self.mode == PlayMode::Cleared
    }

    pub fn is_lost(&self) -> bool {
        self.mode == PlayMode::Lost
    }

    pub fn stage(&self) -> &StageState {
        &self.stage
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn camera(&self) -> Camera {
        self.camera
    }

    pub fn info(&self) -> &StageInfo {
        &self.info
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }
}

/// Move `pos` toward `target` by at most `speed`; true once it arrives.
fn approach(pos: &mut i32, target: i32, speed: i32) -> bool {
    if (target - *pos).abs() <= speed {
        *pos = target;
        return true;
    }
    *pos += (target - *pos).signum() * speed;
    false
}
