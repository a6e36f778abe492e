/// Movement engine shared by the player and enemies.
///
/// Actors live on a tile (`tile`) with a sub-tile pixel offset (`sx`,
/// `sy`) kept within about half a tile of the centre. Each tick an actor
/// either spends one queued per-tick pixel count from its cadence, or,
/// when the queue is empty, reaches a decision point:
///
///   1. `pre_move` hook
///   2. buried check (own occupancy cell is Brick → `on_dead`)
///   3. gravity, else `decide`
///   4. queue the next cadence segment (zeros if no walk)
///   5. collision check; commit to the neighbouring tile once the
///      segment would carry the offset past the half-tile mark
///   6. trapdoor reveal, `on_move`, then spend the first queued count
///
/// Pixel steps slide the off-axis offset back to zero, flag hanging on a
/// bar, and fire `on_gold` when an actor is exactly centred on gold.

use rand::RngCore;

use crate::config::Tuning;
use crate::domain::cadence::Cadence;
use crate::domain::entity::{Facing, Point, ViewState, Walk, HALF_SIZE, TILE_SIZE};
use crate::domain::input::Stick;
use crate::domain::pose::Stance;
use crate::domain::tile::BlockKind;

use super::stage::StageState;

#[derive(Clone, Debug)]
pub struct Motion {
    pub tile: Point,
    pub sx: i32,
    pub sy: i32,
    pub walk: Walk,
    pub bar: bool,
    pub view: ViewState,
    cadence: Cadence,
    pending: Vec<u8>,
}

impl Motion {
    /// `wait` idle ticks are queued before the first decision.
    pub fn new(tile: Point, cadence: Cadence, wait: usize) -> Self {
        Motion {
            tile,
            sx: 0,
            sy: 0,
            walk: Walk::Left,
            bar: false,
            view: ViewState::default(),
            cadence,
            pending: vec![0; wait],
        }
    }

    /// Pixel position of the actor's top-left corner.
    pub fn draw_point(&self) -> Point {
        Point::new(self.tile.x * TILE_SIZE + self.sx, self.tile.y * TILE_SIZE + self.sy)
    }

    pub fn stance(&self) -> Stance {
        Stance { walk: self.walk, bar: self.bar, view: self.view }
    }

    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    /// Put the actor back on a tile centre, keeping its cadence position.
    pub fn place(&mut self, tile: Point, walk: Walk) {
        self.tile = tile;
        self.sx = 0;
        self.sy = 0;
        self.walk = walk;
        self.view.dir = Facing::Left;
    }

    /// Queue the next cadence segment and return its pixel total.
    fn queue_segment(&mut self, moving: bool) -> i32 {
        let segment = self.cadence.next_segment();
        let mut total = 0;
        for &count in segment {
            let count = if moving { count } else { 0 };
            total += count as i32;
            self.pending.push(count);
        }
        total
    }

    fn halt(&mut self) {
        self.pending.iter_mut().for_each(|c| *c = 0);
    }
}

/// Per-tick collaborators handed to every actor.
pub struct Frame<'a> {
    pub stick: &'a mut dyn Stick,
    pub rng: &'a mut dyn RngCore,
    pub tuning: &'a Tuning,
}

/// Hooks that make an actor a player or an enemy.
pub trait Actor {
    fn motion(&self) -> &Motion;
    fn motion_mut(&mut self) -> &mut Motion;

    /// Whether gravity applies at this decision point.
    fn auto_fall(&self) -> bool {
        true
    }

    fn can_enter(&self, stage: &StageState, nx: i32, ny: i32) -> bool {
        stage.view().can_enter(self.motion().tile.y, nx, ny)
    }

    fn pre_move(&mut self, _stage: &mut StageState, _frame: &mut Frame) {}

    /// Choose a walk for the coming segment, or stand still.
    fn decide(&mut self, stage: &mut StageState, frame: &mut Frame) -> Option<Walk>;

    /// Called at every decision point; `before == after` when no tile change.
    fn on_move(&mut self, stage: &mut StageState, frame: &mut Frame, before: Point, after: Point);

    fn on_gold(&mut self, stage: &mut StageState, frame: &mut Frame);

    fn on_dead(&mut self, stage: &mut StageState, frame: &mut Frame);
}

/// Advance one actor by one tick.
pub fn move_frame<A: Actor>(actor: &mut A, stage: &mut StageState, frame: &mut Frame) {
    if let Some(count) = actor.motion_mut().pending.pop() {
        step_pixels(actor, stage, frame, count);
        return;
    }

    actor.pre_move(stage, frame);
    let at = actor.motion().tile;
    if stage.occupancy.get(at.x, at.y) == BlockKind::Brick {
        actor.on_dead(stage, frame);
        return;
    }

    let falling = actor.auto_fall() && stage.should_fall(at, actor.motion().sy);
    let walk = if falling { Some(Walk::Fall) } else { actor.decide(stage, frame) };
    let total = actor.motion_mut().queue_segment(walk.is_some());

    let before = actor.motion().tile;
    if let Some(walk) = walk {
        commit(actor, stage, walk, total);
    }
    let after = actor.motion().tile;
    if after != before && stage.background(after.x, after.y) == BlockKind::Trapdoor {
        stage.draw(after.x, after.y, BlockKind::Trapdoor);
    }
    actor.on_move(stage, frame, before, after);

    if let Some(count) = actor.motion_mut().pending.pop() {
        step_pixels(actor, stage, frame, count);
    }
}

/// Collision check for the chosen walk, then the coarse tile change.
fn commit<A: Actor>(actor: &mut A, stage: &StageState, walk: Walk, total: i32) {
    let Point { x: bx, y: by } = actor.motion().tile;
    let (sx, sy) = (actor.motion().sx, actor.motion().sy);
    let blocked = match walk {
        Walk::Left => !actor.can_enter(stage, bx - 1, by) && sx <= 0,
        Walk::Right => !actor.can_enter(stage, bx + 1, by) && sx >= 0,
        Walk::Up => !actor.can_enter(stage, bx, by - 1) && sy <= 0,
        Walk::Down | Walk::Fall => !actor.can_enter(stage, bx, by + 1) && sy >= 0,
        Walk::LeftBeam | Walk::RightBeam => false,
    };
    let m = actor.motion_mut();
    if blocked {
        m.halt();
        return;
    }
    m.walk = walk;
    match walk {
        Walk::Left if m.sx - total < -HALF_SIZE => {
            m.sx += TILE_SIZE;
            m.tile.x -= 1;
        }
        Walk::Right if m.sx + total >= HALF_SIZE => {
            m.sx -= TILE_SIZE;
            m.tile.x += 1;
        }
        Walk::Up if m.sy - total < -HALF_SIZE => {
            m.sy += TILE_SIZE;
            m.tile.y -= 1;
        }
        Walk::Down | Walk::Fall if m.sy + total >= HALF_SIZE => {
            m.sy -= TILE_SIZE;
            m.tile.y += 1;
        }
        _ => {}
    }
}

fn step_pixels<A: Actor>(actor: &mut A, stage: &mut StageState, frame: &mut Frame, count: u8) {
    for _ in 0..count {
        step_pixel(actor, stage, frame);
    }
}

fn step_pixel<A: Actor>(actor: &mut A, stage: &mut StageState, frame: &mut Frame) {
    let m = actor.motion_mut();
    match m.walk {
        Walk::Left | Walk::Right => {
            m.sx += if m.walk == Walk::Left { -1 } else { 1 };
            m.sy -= m.sy.signum();
            m.view.dir = if m.walk == Walk::Left { Facing::Left } else { Facing::Right };
            m.view.time = m.view.time.wrapping_add(1);
        }
        Walk::Up | Walk::Down | Walk::Fall => {
            m.sy += if m.walk == Walk::Up { -1 } else { 1 };
            m.sx -= m.sx.signum();
            m.view.time = m.view.time.wrapping_add(1);
        }
        Walk::LeftBeam | Walk::RightBeam => {
            m.sx -= m.sx.signum();
            m.sy -= m.sy.signum();
            m.view.dir = if m.walk == Walk::LeftBeam { Facing::Left } else { Facing::Right };
        }
    }
    let at = m.tile;
    let here = stage.terrain.get(at.x, at.y);
    m.bar = m.sy == 0 && here == BlockKind::Bar;
    if m.sx == 0 && m.sy == 0 && here == BlockKind::Gold {
        actor.on_gold(stage, frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::TileGrid;
    use crate::domain::input::IdleStick;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    /// A bare actor that walks one fixed direction and records hooks.
    struct Walker {
        motion: Motion,
        walk: Option<Walk>,
        moves: Vec<(Point, Point)>,
        golds: u32,
        deaths: u32,
    }

    impl Walker {
        fn new(at: Point, walk: Option<Walk>) -> Self {
            Walker {
                motion: Motion::new(at, Cadence::for_player(6, 5), 0),
                walk,
                moves: Vec::new(),
                golds: 0,
                deaths: 0,
            }
        }
    }

    impl Actor for Walker {
        fn motion(&self) -> &Motion { &self.motion }
        fn motion_mut(&mut self) -> &mut Motion { &mut self.motion }
        fn decide(&mut self, _: &mut StageState, _: &mut Frame) -> Option<Walk> { self.walk }
        fn on_move(&mut self, _: &mut StageState, _: &mut Frame, before: Point, after: Point) {
            self.moves.push((before, after));
        }
        fn on_gold(&mut self, _: &mut StageState, _: &mut Frame) { self.golds += 1; }
        fn on_dead(&mut self, _: &mut StageState, _: &mut Frame) { self.deaths += 1; }
    }

    fn stage_from(rows: &[&str]) -> StageState {
        let h = rows.len() as i32;
        let w = rows.iter().map(|r| r.len()).max().unwrap_or(0) as i32;
        StageState::new(TileGrid::from_rows(rows, w, h).unwrap(), 100)
    }

    fn run(actor: &mut Walker, stage: &mut StageState, ticks: usize) {
        let tuning = Tuning::default();
        let mut stick = IdleStick;
        let mut rng = Pcg32::seed_from_u64(1);
        let mut frame = Frame { stick: &mut stick, rng: &mut rng, tuning: &tuning };
        for _ in 0..ticks {
            move_frame(actor, stage, &mut frame);
        }
    }

    #[test]
    fn walks_six_pixels_every_five_ticks() {
        let mut stage = stage_from(&[
            "      ",
            "OOOOOO",
        ]);
        let mut walker = Walker::new(Point::new(0, 0), Some(Walk::Right));
        run(&mut walker, &mut stage, 5);
        assert_eq!(walker.motion.draw_point(), Point::new(6, 0));
        run(&mut walker, &mut stage, 5);
        assert_eq!(walker.motion.draw_point(), Point::new(12, 0));
        assert_eq!(walker.motion.tile, Point::new(1, 0));
    }

    #[test]
    fn tile_changes_before_pixels_arrive() {
        let mut stage = stage_from(&[
            "   ",
            "OOO",
        ]);
        let mut walker = Walker::new(Point::new(0, 0), Some(Walk::Right));
        // The decision on tick 6 sees offset 6 plus a 2-pixel segment.
        run(&mut walker, &mut stage, 5);
        assert_eq!(walker.motion.tile, Point::new(0, 0));
        assert_eq!(walker.motion.sx, 6);
        run(&mut walker, &mut stage, 1);
        assert_eq!(walker.motion.tile, Point::new(1, 0));
        assert!(walker.motion.sx < 0);
        assert!(walker.moves.contains(&(Point::new(0, 0), Point::new(1, 0))));
    }

    #[test]
    fn wall_stops_at_centre() {
        let mut stage = stage_from(&[
            " X",
            "OO",
        ]);
        let mut walker = Walker::new(Point::new(0, 0), Some(Walk::Right));
        run(&mut walker, &mut stage, 20);
        assert_eq!(walker.motion.tile, Point::new(0, 0));
        assert_eq!(walker.motion.sx, 0);
    }

    #[test]
    fn grid_edge_blocks() {
        let mut stage = stage_from(&[" ", "O"]);
        let mut walker = Walker::new(Point::new(0, 0), Some(Walk::Left));
        run(&mut walker, &mut stage, 10);
        assert_eq!(walker.motion.draw_point(), Point::new(0, 0));
    }

    #[test]
    fn gravity_overrides_decision() {
        let mut stage = stage_from(&[
            " ",
            " ",
            "O",
        ]);
        let mut walker = Walker::new(Point::new(0, 0), Some(Walk::Left));
        run(&mut walker, &mut stage, 30);
        assert_eq!(walker.motion.tile, Point::new(0, 1));
        assert_eq!(walker.motion.sy, 0);
        assert_eq!(walker.motion.walk, Walk::Fall);
    }

    #[test]
    fn idle_actor_never_moves() {
        let mut stage = stage_from(&["  ", "OO"]);
        let mut walker = Walker::new(Point::new(0, 0), None);
        run(&mut walker, &mut stage, 25);
        assert_eq!(walker.motion.draw_point(), Point::new(0, 0));
        assert!(walker.moves.iter().all(|(b, a)| b == a));
    }

    #[test]
    fn centred_on_gold_fires_hook() {
        let mut stage = stage_from(&[
            " $",
            "OO",
        ]);
        let mut walker = Walker::new(Point::new(0, 0), Some(Walk::Right));
        run(&mut walker, &mut stage, 14);
        assert_eq!(walker.motion.draw_point(), Point::new(16, 0));
        assert_eq!(walker.golds, 1);
    }

    #[test]
    fn buried_actor_dies() {
        let mut stage = stage_from(&[" ", "O"]);
        stage.occupancy.set(0, 0, BlockKind::Brick);
        let mut walker = Walker::new(Point::new(0, 0), None);
        run(&mut walker, &mut stage, 1);
        assert_eq!(walker.deaths, 1);
        assert!(walker.moves.is_empty());
    }

    #[test]
    fn falling_onto_bar_stops() {
        let mut stage = stage_from(&[
            " ",
            "-",
            " ",
        ]);
        let mut walker = Walker::new(Point::new(0, 0), None);
        run(&mut walker, &mut stage, 40);
        assert_eq!(walker.motion.tile, Point::new(0, 1));
        assert_eq!(walker.motion.sy, 0);
        assert!(walker.motion.bar);
    }

    #[test]
    fn initial_wait_delays_first_decision() {
        let mut stage = stage_from(&["   ", "OOO"]);
        let mut walker = Walker::new(Point::new(0, 0), Some(Walk::Right));
        walker.motion = Motion::new(Point::new(0, 0), Cadence::for_player(6, 5), 3);
        run(&mut walker, &mut stage, 3);
        assert!(walker.moves.is_empty());
        run(&mut walker, &mut stage, 1);
        assert_eq!(walker.moves.len(), 1);
    }
}
