/// StageState: the grids, holes and event queue of a running stage.
///
/// ## Layer Architecture
///
/// Three grids of the same size:
///   - `template`:  the stage as authored. **Never mutated**. Keeps spawn
///                   markers and escape ladders.
///   - `terrain`:   what each cell is made of. Spawn markers and escape
///                   ladders are normalized to `Empty`. Dug bricks stay
///                   `Brick` here; collected gold becomes `Empty`.
///   - `occupancy`: what is standing in each cell: terrain plus actors,
///                   with dug holes showing as `Empty`.
///
/// Restarting a stage rebuilds from the template.
///
/// ## Holes
///
/// Digging writes `Empty` into occupancy only and registers a hole entry
/// with the stage's hole lifetime. Each tick the entry counts down; at
/// zero it writes `Brick` back into occupancy. An actor caught inside is
/// buried and notices on its next decision. Closing waits while an enemy
/// is climbing out of that exact cell.
///
/// ## Falling
///
/// ┌─────────────────────────────────────┬────────┐
/// │ Condition (priority order)           │ Fall?  │
/// ├─────────────────────────────────────┼────────┤
/// │ terrain here is Ladder               │ NO     │
/// │ terrain here is Bar and sy == 0      │ NO     │
/// │ still above tile centre (sy < 0)     │ YES    │
/// │ cell below stops a fall              │ NO     │
/// │   (`can_enter_for_fall` is false)    │        │
/// │ Otherwise                            │ YES    │
/// └─────────────────────────────────────┴────────┘
///
/// ## Events
///
/// Everything the presentation layer needs to know is queued as a
/// `StageEvent` and drained once per tick.

use log::{debug, info};

use crate::domain::entity::{HoleEntry, Point};
use crate::domain::grid::TileGrid;
use crate::domain::rules::MapView;
use crate::domain::tile::BlockKind;

use super::event::StageEvent;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    Cleared,
    Lost,
}

#[derive(Clone, Debug)]
pub struct StageState {
    template: TileGrid,
    pub terrain: TileGrid,
    pub occupancy: TileGrid,
    holes: Vec<HoleEntry>,
    hole_ticks: u32,
    player: Point,
    rest_gold: u32,
    escapes: Vec<Point>,
    events: Vec<StageEvent>,
    outcome: Option<Outcome>,
}

impl StageState {
    pub fn new(template: TileGrid, hole_ticks: u32) -> Self {
        let terrain = TileGrid::seeded_from(&template);
        let occupancy = terrain.clone();
        let rest_gold = template.count(BlockKind::Gold) as u32;
        StageState {
            template,
            terrain,
            occupancy,
            holes: Vec::new(),
            hole_ticks,
            player: Point::default(),
            rest_gold,
            escapes: Vec::new(),
            events: Vec::new(),
            outcome: None,
        }
    }

    pub fn width(&self) -> i32 {
        self.template.width()
    }

    pub fn height(&self) -> i32 {
        self.template.height()
    }

    pub fn template(&self) -> &TileGrid {
        &self.template
    }

    pub fn view(&self) -> MapView<'_> {
        MapView { terrain: &self.terrain, occupancy: &self.occupancy }
    }

    pub fn background(&self, x: i32, y: i32) -> BlockKind {
        self.view().background(x, y)
    }

    /// Would a falling actor keep falling into (x, y)?
    pub fn can_enter_for_fall(&self, x: i32, y: i32) -> bool {
        !self.view().is_ground(x, y)
    }

    /// Gravity check for an actor at tile `at` with vertical offset `sy`.
    pub fn should_fall(&self, at: Point, sy: i32) -> bool {
        let here = self.terrain.get(at.x, at.y);
        if here == BlockKind::Ladder { return false; }
        if sy == 0 && here == BlockKind::Bar { return false; }
        if sy < 0 { return true; }
        self.can_enter_for_fall(at.x, at.y + 1)
    }

    // ── Player tracking ──

    pub fn player_tile(&self) -> Point {
        self.player
    }

    pub fn set_player_tile(&mut self, at: Point) {
        self.player = at;
    }

    // ── Gold ──

    pub fn rest_gold(&self) -> u32 {
        self.rest_gold
    }

    /// One gold left the stage (collected or destroyed). When the last
    /// one goes, escape ladders appear.
    pub fn hunt_gold(&mut self) {
        if self.rest_gold == 0 { return; }
        self.rest_gold -= 1;
        debug!("gold remaining: {}", self.rest_gold);
        if self.rest_gold > 0 { return; }

        info!("all gold gone, revealing escape ladders");
        let escapes: Vec<(i32, i32)> = self
            .template
            .cells()
            .filter(|&(_, _, kind)| kind == BlockKind::EscapeLadder)
            .map(|(x, y, _)| (x, y))
            .collect();
        for (x, y) in escapes {
            self.terrain.set(x, y, BlockKind::Ladder);
            if self.occupancy.get(x, y) == BlockKind::Empty {
                self.occupancy.set(x, y, BlockKind::Ladder);
                self.draw(x, y, BlockKind::Ladder);
            }
        }
    }

    // ── Holes ──

    pub fn holes(&self) -> &[HoleEntry] {
        &self.holes
    }

    pub fn hole_ticks(&self) -> u32 {
        self.hole_ticks
    }

    /// Open a dug hole at (x, y) and start its countdown.
    pub fn open_hole(&mut self, x: i32, y: i32) {
        self.occupancy.set(x, y, BlockKind::Empty);
        self.holes.push(HoleEntry { x, y, time: self.hole_ticks });
        debug!("hole opened at ({x}, {y}) for {} ticks", self.hole_ticks);
    }

    /// Count every hole down by one; refill the ones that reach zero.
    pub fn tick_holes(&mut self) {
        let mut closed = Vec::new();
        for hole in &mut self.holes {
            hole.time = hole.time.saturating_sub(1);
            if hole.time == 0 && !self.escapes.contains(&Point::new(hole.x, hole.y)) {
                closed.push((hole.x, hole.y));
            }
        }
        if closed.is_empty() { return; }
        self.holes.retain(|h| !closed.contains(&(h.x, h.y)) || h.time > 0);
        for (x, y) in closed {
            self.occupancy.set(x, y, BlockKind::Brick);
            self.draw(x, y, BlockKind::Brick);
            debug!("hole closed at ({x}, {y})");
        }
    }

    /// An enemy started climbing out of the hole at `at`.
    pub fn begin_escape(&mut self, at: Point) {
        if !self.escapes.contains(&at) {
            self.escapes.push(at);
        }
    }

    pub fn end_escape(&mut self, at: Point) {
        self.escapes.retain(|&p| p != at);
    }

    // ── Events ──

    pub fn emit(&mut self, event: StageEvent) {
        self.events.push(event);
    }

    pub fn draw(&mut self, x: i32, y: i32, kind: BlockKind) {
        self.emit(StageEvent::BlockChanged { x, y, kind });
    }

    pub fn events(&self) -> &[StageEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<StageEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Outcome ──

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn clear(&mut self) {
        self.outcome = Some(Outcome::Cleared);
    }

    pub fn lose(&mut self) {
        self.outcome = Some(Outcome::Lost);
    }
}
