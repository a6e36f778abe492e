/// Enemies: chase the player, carry gold, fall into holes, respawn.
///
/// ## Per-decision state machine
///
/// ┌──────────────────────────┬──────────────────────────────────────┐
/// │ State (priority order)    │ Behaviour                            │
/// ├──────────────────────────┼──────────────────────────────────────┤
/// │ respawning (reborn > 0)   │ stand still, count down              │
/// │ trapped (trapped > 0)     │ finish sliding in, count down, then  │
/// │                           │ climb out remembering the hole       │
/// │ climbing out (last hole)  │ keep going Up while in the hole cell │
/// │ otherwise                 │ chase (see `domain::ai`)             │
/// └──────────────────────────┴──────────────────────────────────────┘
///
/// Gravity is off while respawning, trapped or climbing out.
///
/// Enemies block each other: a cell showing an enemy cannot be entered.
/// Walking into the player's cell loses the stage.

use log::debug;
use rand::Rng;

use crate::config::Tuning;
use crate::domain::ai;
use crate::domain::cadence::Cadence;
use crate::domain::entity::{LastHole, Point, Walk};
use crate::domain::pose::{self, PoseMap};
use crate::domain::tile::BlockKind;

use super::event::{ActionKey, StageEvent};
use super::motion::{Actor, Frame, Motion};
use super::stage::StageState;

#[derive(Clone, Debug)]
pub struct Enemy {
    motion: Motion,
    index: usize,
    spawn: Point,
    carry: u32,
    trapped: u32,
    reborn: u32,
    last_hole: Option<LastHole>,
}

impl Enemy {
    /// Enemy `index` of `count`. Later enemies start a few ticks late so
    /// they do not move in lockstep.
    pub fn new(at: Point, index: usize, count: usize, tuning: &Tuning) -> Self {
        let cadence = Cadence::for_enemies(tuning.enemy_step_speed, tuning.enemy_step_times, count as u32);
        Enemy {
            motion: Motion::new(at, cadence, index),
            index,
            spawn: at,
            carry: 0,
            trapped: 0,
            reborn: 0,
            last_hole: None,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn tile(&self) -> Point {
        self.motion.tile
    }

    pub fn is_carrying(&self) -> bool {
        self.carry > 0
    }

    pub fn is_trapped(&self) -> bool {
        self.trapped > 0
    }

    pub fn is_respawning(&self) -> bool {
        self.reborn > 0
    }

    /// Pixel position; a trapped enemy about to climb out shakes.
    pub fn draw_point(&self) -> Point {
        let mut pos = self.motion.draw_point();
        if self.trapped > 0 && self.trapped < 8 {
            pos.x += (self.trapped & 2) as i32 - 1;
        }
        pos
    }

    pub fn pose(&self) -> PoseMap {
        pose::enemy_pose(&self.motion.stance(), self.reborn)
    }

    fn key(&self) -> ActionKey {
        ActionKey::Enemy(self.index)
    }

    /// Put gold down at (x, y) in both layers.
    fn place_gold(stage: &mut StageState, x: i32, y: i32) {
        stage.terrain.set(x, y, BlockKind::Gold);
        stage.occupancy.set(x, y, BlockKind::Gold);
        stage.draw(x, y, BlockKind::Gold);
    }

    /// Fell into a dug hole: get stuck and give up any gold.
    fn fall_into_hole(&mut self, stage: &mut StageState, at: Point, tuning: &Tuning) {
        self.trapped = tuning.hole_wait;
        debug!("enemy {} trapped at ({}, {})", self.index, at.x, at.y);
        if self.carry == 0 { return; }
        self.carry = 0;
        let (x, y) = (at.x, at.y - 1);
        if stage.terrain.get(x, y) == BlockKind::Empty && stage.occupancy.get(x, y) == BlockKind::Empty {
            Enemy::place_gold(stage, x, y);
            debug!("enemy {} ejected gold to ({x}, {y})", self.index);
        } else {
            stage.hunt_gold();
            debug!("enemy {} lost its gold", self.index);
        }
        stage.emit(StageEvent::ActionCancelled { key: self.key() });
    }

    /// Maybe drop carried gold on the cell just left.
    fn carry_step(&mut self, stage: &mut StageState, frame: &mut Frame, left: Point) {
        if self.carry == 0 { return; }
        self.carry += 1;
        if stage.terrain.get(left.x, left.y) != BlockKind::Empty || self.motion.walk == Walk::Fall {
            return;
        }
        let tuning = frame.tuning;
        if self.carry >= tuning.carry_max || frame.rng.random_bool(tuning.drop_chance) {
            Enemy::place_gold(stage, left.x, left.y);
            self.carry = 0;
            stage.emit(StageEvent::ActionCancelled { key: self.key() });
            debug!("enemy {} dropped gold at ({}, {})", self.index, left.x, left.y);
        }
    }

    /// Scan for an open cell, starting at a random column of row 1 and
    /// moving right then down, wrapping around the grid.
    fn respawn_cell(&self, stage: &StageState, frame: &mut Frame) -> Point {
        let (w, h) = (stage.width(), stage.height());
        let cells = w * h;
        let start = w + frame.rng.random_range(0..w);
        (0..cells)
            .map(|k| (start + k) % cells)
            .map(|i| Point::new(i % w, i / w))
            .find(|p| {
                stage.terrain.get(p.x, p.y) == BlockKind::Empty
                    && stage.occupancy.get(p.x, p.y) == BlockKind::Empty
            })
            .unwrap_or(self.spawn)
    }
}

impl Actor for Enemy {
    fn motion(&self) -> &Motion {
        &self.motion
    }

    fn motion_mut(&mut self) -> &mut Motion {
        &mut self.motion
    }

    fn auto_fall(&self) -> bool {
        self.trapped == 0 && self.reborn == 0 && self.last_hole.is_none()
    }

    fn can_enter(&self, stage: &StageState, nx: i32, ny: i32) -> bool {
        stage.occupancy.get(nx, ny) != BlockKind::Enemy
            && stage.view().can_enter(self.motion.tile.y, nx, ny)
    }

    fn decide(&mut self, stage: &mut StageState, frame: &mut Frame) -> Option<Walk> {
        let at = self.motion.tile;
        if self.reborn > 0 {
            self.reborn -= 1;
            return None;
        }
        if self.trapped > 0 {
            self.trapped -= 1;
            if self.motion.sy < 0 { return Some(Walk::Fall); }
            if self.trapped > 0 { return None; }
            self.motion.sx = 0;
            self.last_hole = Some(LastHole { x: at.x, y: at.y, time: frame.tuning.climb_memory });
            stage.begin_escape(at);
            return Some(Walk::Up);
        }
        if let Some(mut hole) = self.last_hole {
            hole.time -= 1;
            if hole.time <= 0 {
                stage.end_escape(Point::new(hole.x, hole.y));
            }
            if hole.at(at.x, at.y) {
                self.last_hole = Some(hole);
                return Some(Walk::Up);
            }
            self.last_hole = if hole.time <= 0 { None } else { Some(hole) };
        }
        Some(ai::chase(&stage.view(), at, stage.player_tile()))
    }

    fn on_move(&mut self, stage: &mut StageState, frame: &mut Frame, before: Point, after: Point) {
        if stage.occupancy.get(after.x, after.y) == BlockKind::Player {
            stage.lose();
            return;
        }
        let bg = stage.background(before.x, before.y);
        stage.occupancy.set(before.x, before.y, bg);
        stage.occupancy.set(after.x, after.y, BlockKind::Enemy);
        if before == after { return; }
        stage.end_escape(before);

        let entered_brick = stage.terrain.get(after.x, after.y) == BlockKind::Brick;
        if let Some(hole) = self.last_hole.as_mut() {
            if hole.x == before.x && hole.y == before.y + 1 {
                self.last_hole = None;
            } else if entered_brick {
                hole.time = 1;
            }
        }
        if after.y > before.y && entered_brick {
            self.fall_into_hole(stage, after, frame.tuning);
        }
        self.carry_step(stage, frame, before);
    }

    fn on_gold(&mut self, stage: &mut StageState, _frame: &mut Frame) {
        if self.carry > 0 { return; }
        let Point { x, y } = self.motion.tile;
        stage.terrain.set(x, y, BlockKind::Empty);
        stage.draw(x, y, BlockKind::Empty);
        stage.emit(StageEvent::GoldCollected { key: self.key(), x, y });
        self.carry = 1;
        debug!("enemy {} picked up gold at ({x}, {y})", self.index);
    }

    fn on_dead(&mut self, stage: &mut StageState, frame: &mut Frame) {
        if self.carry > 0 {
            self.carry = 0;
            stage.hunt_gold();
            stage.emit(StageEvent::ActionCancelled { key: self.key() });
        }
        if let Some(hole) = self.last_hole.take() {
            stage.end_escape(Point::new(hole.x, hole.y));
        }
        let cell = self.respawn_cell(stage, frame);
        self.motion.place(cell, Walk::Fall);
        self.trapped = 0;
        self.reborn = frame.tuning.reborn_wait;
        stage.occupancy.set(cell.x, cell.y, BlockKind::Enemy);
        debug!("enemy {} respawned at ({}, {})", self.index, cell.x, cell.y);
    }
}
