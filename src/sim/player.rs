/// The player: input-driven movement, digging and gold collection.
///
/// ## Decision Order
///
///   1. Lost check: own occupancy cell no longer shows the player
///      (an enemy walked in) → loss.
///   2. Dig in progress: abort if the side cell filled up, open the
///      hole on the beam's last tick, otherwise keep beaming.
///   3. New dig left, then right.
///   4. Up (on a ladder), Down, Left, Right.
///   5. Idle: count up; after a while, fidget by turning around.
///
/// The idle counter and the fidget period are measured in decision
/// points, not ticks: at the default cadence three of every five ticks.
///
/// Hole countdowns are advanced in the player's pre-move hook, so they
/// tick on the player's decision cadence.

use log::{debug, info};

use crate::config::Tuning;
use crate::domain::cadence::Cadence;
use crate::domain::entity::{DeadAnim, Facing, HoleEntry, Point, Walk};
use crate::domain::pose::{self, PoseMap};
use crate::domain::tile::BlockKind;

use super::event::{ActionKey, StageEvent};
use super::motion::{Actor, Frame, Motion};
use super::stage::StageState;

#[derive(Clone, Debug)]
pub struct Player {
    motion: Motion,
    beam: i32,
    wait: u32,
    dead: Option<DeadAnim>,
}

impl Player {
    pub fn new(at: Point, tuning: &Tuning) -> Self {
        let cadence = Cadence::for_player(tuning.player_step_speed, tuning.player_step_times);
        Player {
            motion: Motion::new(at, cadence, 0),
            beam: 0,
            wait: 0,
            dead: None,
        }
    }

    pub fn tile(&self) -> Point {
        self.motion.tile
    }

    pub fn draw_point(&self) -> Point {
        self.motion.draw_point()
    }

    pub fn pose(&self) -> PoseMap {
        pose::player_pose(&self.motion.stance(), self.dead.as_ref())
    }

    /// Signed beam countdown: negative digs left, positive digs right.
    pub fn beam(&self) -> i32 {
        self.beam
    }

    pub fn idle_ticks(&self) -> u32 {
        self.wait
    }

    pub fn dead_anim(&self) -> Option<&DeadAnim> {
        self.dead.as_ref()
    }

    /// The dig in flight, shaped like a hole entry for the renderer.
    pub fn dig_in_progress(&self, tuning: &Tuning) -> Option<HoleEntry> {
        if self.beam == 0 { return None; }
        let Point { x, y } = self.motion.tile;
        let dx = self.beam.signum();
        let elapsed = tuning.beam_step as i32 - self.beam.abs();
        Some(HoleEntry { x: x + dx, y: y + 1, time: (elapsed.max(0) * 4) as u32 })
    }

    pub(crate) fn start_dying(&mut self) {
        if self.dead.is_none() {
            self.dead = Some(DeadAnim::default());
        }
    }

    pub(crate) fn advance_dying(&mut self) {
        if let Some(anim) = self.dead.as_mut() {
            anim.advance();
        }
    }

    fn start_dig(&mut self, stage: &mut StageState, dir: Facing, tuning: &Tuning) -> Option<Walk> {
        let target = stage.view().dig_target(self.motion.tile, dir)?;
        self.beam = tuning.beam_step as i32 * dir.dx();
        self.wait = 0;
        stage.draw(target.x, target.y, BlockKind::Empty);
        stage.emit(StageEvent::BrickBroken {
            key: ActionKey::Dig { x: target.x, y: target.y },
            x: target.x,
            y: target.y,
            facing: dir,
        });
        debug!("dig started at ({}, {})", target.x, target.y);
        Some(match dir {
            Facing::Left => Walk::LeftBeam,
            Facing::Right => Walk::RightBeam,
        })
    }

    /// Run the beam countdown. Returns the beam walk while digging.
    fn continue_dig(&mut self, stage: &mut StageState, tuning: &Tuning) -> Option<Walk> {
        if self.beam == 0 { return None; }
        let Point { x: bx, y: by } = self.motion.tile;
        let dx = self.beam.signum();
        let wait = tuning.beam_wait as i32;
        if self.beam.abs() > wait {
            if stage.occupancy.get(bx + dx, by) != BlockKind::Empty {
                let (x, y) = (bx + dx, by + 1);
                stage.draw(x, y, BlockKind::Brick);
                stage.emit(StageEvent::ActionCancelled { key: ActionKey::Dig { x, y } });
                debug!("dig at ({x}, {y}) interrupted");
                self.beam = 0;
                return None;
            }
        } else if self.beam.abs() == wait {
            stage.open_hole(bx + dx, by + 1);
        }
        self.beam -= dx;
        self.wait = 0;
        Some(if dx < 0 { Walk::LeftBeam } else { Walk::RightBeam })
    }

    fn fidget(&mut self, tuning: &Tuning) {
        self.wait += 1;
        if tuning.idle_fidget == 0 { return; }
        if self.wait < tuning.idle_fidget || self.motion.bar { return; }
        if !matches!(self.motion.walk, Walk::Left | Walk::Right | Walk::Fall) { return; }
        self.motion.view.time = 0;
        if self.wait % tuning.idle_fidget == 0 {
            let dir = self.motion.view.dir.flipped();
            self.motion.view.dir = dir;
            self.motion.walk = if dir == Facing::Left { Walk::Left } else { Walk::Right };
        }
    }
}

impl Actor for Player {
    fn motion(&self) -> &Motion {
        &self.motion
    }

    fn motion_mut(&mut self) -> &mut Motion {
        &mut self.motion
    }

    fn auto_fall(&self) -> bool {
        self.beam == 0
    }

    fn pre_move(&mut self, stage: &mut StageState, _frame: &mut Frame) {
        stage.tick_holes();
    }

    fn decide(&mut self, stage: &mut StageState, frame: &mut Frame) -> Option<Walk> {
        let tuning = frame.tuning;
        let Point { x: bx, y: by } = self.motion.tile;
        let (sx, sy) = (self.motion.sx, self.motion.sy);

        if stage.occupancy.get(bx, by) != BlockKind::Player {
            stage.lose();
            return None;
        }
        if self.beam != 0 {
            if let Some(walk) = self.continue_dig(stage, tuning) {
                return Some(walk);
            }
        }

        if frame.stick.left_beam() {
            if let Some(walk) = self.start_dig(stage, Facing::Left, tuning) {
                return Some(walk);
            }
        }
        if frame.stick.right_beam() {
            if let Some(walk) = self.start_dig(stage, Facing::Right, tuning) {
                return Some(walk);
            }
        }

        let chosen = if frame.stick.up() && self.can_climb(stage) && (sy > 0 || self.can_enter(stage, bx, by - 1)) {
            Some(Walk::Up)
        } else if frame.stick.down() && (sy < 0 || self.can_enter(stage, bx, by + 1)) {
            Some(Walk::Down)
        } else if frame.stick.left() && (sx > 0 || self.can_enter(stage, bx - 1, by)) {
            Some(Walk::Left)
        } else if frame.stick.right() && (sx < 0 || self.can_enter(stage, bx + 1, by)) {
            Some(Walk::Right)
        } else {
            None
        };

        match chosen {
            Some(walk) => {
                self.wait = 0;
                Some(walk)
            }
            None => {
                self.fidget(tuning);
                None
            }
        }
    }

    fn on_move(&mut self, stage: &mut StageState, _frame: &mut Frame, before: Point, after: Point) {
        let bg = stage.background(before.x, before.y);
        stage.occupancy.set(before.x, before.y, bg);
        stage.occupancy.set(after.x, after.y, BlockKind::Player);
        stage.set_player_tile(after);
        if before.y != after.y {
            self.wait = 0;
        }
        if stage.rest_gold() == 0 && self.motion.sy == 0 && after.y == 0 && stage.outcome().is_none() {
            info!("player reached the top with all gold");
            stage.clear();
        }
    }

    fn on_gold(&mut self, stage: &mut StageState, _frame: &mut Frame) {
        let Point { x, y } = self.motion.tile;
        stage.terrain.set(x, y, BlockKind::Empty);
        stage.draw(x, y, BlockKind::Empty);
        stage.emit(StageEvent::GoldCollected { key: ActionKey::Player, x, y });
        stage.hunt_gold();
    }

    fn on_dead(&mut self, stage: &mut StageState, _frame: &mut Frame) {
        info!("player buried at ({}, {})", self.motion.tile.x, self.motion.tile.y);
        stage.lose();
    }
}

impl Player {
    /// On a ladder, or about to step onto one from above its centre.
    fn can_climb(&self, stage: &StageState) -> bool {
        let Point { x, y } = self.motion.tile;
        stage.terrain.get(x, y) == BlockKind::Ladder
            || (self.motion.sy > 0 && stage.terrain.get(x, y + 1) == BlockKind::Ladder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::TileGrid;
    use crate::domain::input::{Button, ButtonLatch};
    use crate::sim::motion::move_frame;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    struct Rig {
        stage: StageState,
        player: Player,
        tuning: Tuning,
        latch: ButtonLatch,
        rng: Pcg32,
    }

    impl Rig {
        fn new(rows: &[&str], tuning: Tuning) -> Self {
            let h = rows.len() as i32;
            let w = rows.iter().map(|r| r.len()).max().unwrap_or(0) as i32;
            let template = TileGrid::from_rows(rows, w, h).unwrap();
            let mut stage = StageState::new(template.clone(), tuning.hole_ticks);
            let (x, y, _) = template
                .cells()
                .find(|c| c.2 == BlockKind::Player)
                .unwrap();
            stage.occupancy.set(x, y, BlockKind::Player);
            stage.set_player_tile(Point::new(x, y));
            let player = Player::new(Point::new(x, y), &tuning);
            Rig { stage, player, tuning, latch: ButtonLatch::new(), rng: Pcg32::seed_from_u64(7) }
        }

        fn tick(&mut self, n: usize) {
            for _ in 0..n {
                let mut frame = Frame { stick: &mut self.latch, rng: &mut self.rng, tuning: &self.tuning };
                move_frame(&mut self.player, &mut self.stage, &mut frame);
            }
        }
    }

    #[test]
    fn boxed_in_player_idles() {
        let mut rig = Rig::new(&[
            "OOO",
            "P..",
            "OOO",
        ], Tuning::default());
        rig.tick(30);
        assert_eq!(rig.player.tile(), Point::new(0, 1));
        assert_eq!(rig.player.draw_point(), Point::new(0, 16));
        // Decisions happen on 3 of every 5 ticks.
        assert_eq!(rig.player.idle_ticks(), 18);
    }

    #[test]
    fn walks_right_while_held() {
        let mut rig = Rig::new(&[
            "P  ",
            "OOO",
        ], Tuning::default());
        rig.latch.press(Button::Right);
        rig.tick(40);
        assert_eq!(rig.player.tile(), Point::new(2, 0));
        assert_eq!(rig.stage.occupancy.get(2, 0), BlockKind::Player);
        assert_eq!(rig.stage.occupancy.get(0, 0), BlockKind::Empty);
        assert_eq!(rig.stage.player_tile(), Point::new(2, 0));
    }

    #[test]
    fn dig_registers_one_hole_with_full_lifetime() {
        let tuning = Tuning { hole_ticks: 200, ..Tuning::default() };
        let mut rig = Rig::new(&[
            "P  ",
            "OOO",
        ], tuning);
        rig.latch.press(Button::RightBeam);
        rig.tick(1);
        assert_eq!(rig.player.beam(), 15);
        assert!(matches!(
            rig.stage.events().last(),
            Some(StageEvent::BrickBroken { x: 1, y: 1, facing: Facing::Right, .. })
        ));
        // The brick stays solid until the beam finishes.
        assert_eq!(rig.stage.occupancy.get(1, 1), BlockKind::Brick);

        let mut ticks = 1;
        while rig.stage.holes().is_empty() {
            rig.tick(1);
            ticks += 1;
            assert!(ticks < 60, "hole never opened");
        }
        assert_eq!(rig.stage.holes().len(), 1);
        assert_eq!(rig.stage.holes()[0], HoleEntry { x: 1, y: 1, time: 200 });
        assert_eq!(rig.stage.occupancy.get(1, 1), BlockKind::Empty);
        assert_eq!(rig.stage.terrain.get(1, 1), BlockKind::Brick);
    }

    #[test]
    fn dig_progress_is_reported() {
        let mut rig = Rig::new(&["P ", "OO"], Tuning::default());
        assert_eq!(rig.player.dig_in_progress(&rig.tuning), None);
        rig.latch.press(Button::RightBeam);
        rig.tick(1);
        rig.latch.release(Button::RightBeam);
        rig.tick(1);
        let hole = rig.player.dig_in_progress(&rig.tuning).unwrap();
        assert_eq!((hole.x, hole.y), (1, 1));
        assert_eq!(hole.time, 4);
    }

    #[test]
    fn dig_rejected_without_brick() {
        let mut rig = Rig::new(&[
            " P ",
            "XO$",
        ], Tuning::default());
        rig.latch.press(Button::LeftBeam);
        rig.tick(3);
        assert_eq!(rig.player.beam(), 0);
        assert!(rig.stage.events().is_empty());
    }

    #[test]
    fn dig_aborts_when_side_fills() {
        let mut rig = Rig::new(&[
            "P  ",
            "OOO",
        ], Tuning::default());
        rig.latch.press(Button::RightBeam);
        rig.tick(1);
        rig.latch.release(Button::RightBeam);
        rig.stage.occupancy.set(1, 0, BlockKind::Enemy);
        rig.tick(1);
        assert_eq!(rig.player.beam(), 0);
        let events = rig.stage.drain_events();
        assert!(events.contains(&StageEvent::BlockChanged { x: 1, y: 1, kind: BlockKind::Brick }));
        assert!(events.contains(&StageEvent::ActionCancelled { key: ActionKey::Dig { x: 1, y: 1 } }));
        assert!(rig.stage.holes().is_empty());
    }

    #[test]
    fn picking_last_gold_reveals_ladder_and_clears_at_top() {
        let mut rig = Rig::new(&[
            "  !",
            "P$!",
            "OOO",
        ], Tuning::default());
        rig.latch.press(Button::Right);
        rig.tick(20);
        assert_eq!(rig.stage.rest_gold(), 0);
        assert_eq!(rig.stage.terrain.get(1, 1), BlockKind::Empty);
        assert_eq!(rig.stage.terrain.get(2, 0), BlockKind::Ladder);
        assert!(rig.stage.events().iter().any(|e| matches!(
            e,
            StageEvent::GoldCollected { key: ActionKey::Player, x: 1, y: 1 }
        )));

        rig.tick(20);
        rig.latch.release(Button::Right);
        rig.latch.press(Button::Up);
        rig.tick(60);
        assert_eq!(rig.player.tile(), Point::new(2, 0));
        assert_eq!(rig.stage.outcome(), Some(crate::sim::stage::Outcome::Cleared));
    }

    #[test]
    fn enemy_in_players_cell_is_a_loss() {
        let mut rig = Rig::new(&["P ", "OO"], Tuning::default());
        rig.stage.occupancy.set(0, 0, BlockKind::Enemy);
        rig.tick(1);
        assert_eq!(rig.stage.outcome(), Some(crate::sim::stage::Outcome::Lost));
    }

    #[test]
    fn idle_player_turns_around() {
        let tuning = Tuning { idle_fidget: 4, ..Tuning::default() };
        let mut rig = Rig::new(&["P", "O"], tuning);
        assert_eq!(rig.player.motion().view.dir, Facing::Left);
        // Four idle decisions take six ticks.
        rig.tick(6);
        assert_eq!(rig.player.idle_ticks(), 4);
        assert_eq!(rig.player.motion().view.dir, Facing::Right);
    }
}
