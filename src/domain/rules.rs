/// Movement, fall and dig rules over the two live layers.
///
/// Pure functions: they answer "what is legal" and never mutate.
///
/// ## Layers
///
///   - `terrain`:   what the stage is made of (bricks keep their kind
///                   while dug; gold lives here until collected).
///   - `occupancy`: what is standing in each cell right now: terrain
///                   plus actors, with dug holes showing as `Empty`.
///
/// ## Background Read
///
/// ┌───────────────────────────┬──────────────────────────────┐
/// │ occupancy at cell          │ background                   │
/// ├───────────────────────────┼──────────────────────────────┤
/// │ Player or Enemy            │ terrain (Brick read as Empty)│
/// │ anything else              │ occupancy                    │
/// └───────────────────────────┴──────────────────────────────┘
///
/// ## Entering a Cell
///
/// ┌──────────────────────────────┬────────┐
/// │ Condition                     │ Allow? │
/// ├──────────────────────────────┼────────┤
/// │ x outside the grid            │ DENY   │
/// │ background Brick / Concrete   │ DENY   │
/// │ background Trapdoor, not below│ DENY   │
/// │ Otherwise                     │ ALLOW  │
/// └──────────────────────────────┴────────┘

use super::entity::{Facing, Point};
use super::grid::TileGrid;
use super::tile::BlockKind;

/// Read-only view of both live layers for rule queries.
#[derive(Clone, Copy)]
pub struct MapView<'a> {
    pub terrain: &'a TileGrid,
    pub occupancy: &'a TileGrid,
}

impl<'a> MapView<'a> {
    pub fn width(&self) -> i32 {
        self.occupancy.width()
    }

    pub fn height(&self) -> i32 {
        self.occupancy.height()
    }

    /// What an actor would find in the cell if it stepped in, ignoring actors.
    pub fn background(&self, x: i32, y: i32) -> BlockKind {
        let here = self.occupancy.get(x, y);
        if !here.is_actor() {
            return here;
        }
        match self.terrain.get(x, y) {
            BlockKind::Brick => BlockKind::Empty,
            other => other,
        }
    }

    /// Can an actor at row `from_y` move into (nx, ny)?
    pub fn can_enter(&self, from_y: i32, nx: i32, ny: i32) -> bool {
        if nx < 0 || nx >= self.width() { return false; }
        let bg = self.background(nx, ny);
        if bg.is_solid() { return false; }
        if ny <= from_y && bg == BlockKind::Trapdoor { return false; }
        true
    }

    /// Would the cell below stop a fall?
    pub fn is_ground(&self, x: i32, y: i32) -> bool {
        matches!(
            self.occupancy.get(x, y),
            BlockKind::Brick | BlockKind::Concrete | BlockKind::Ladder | BlockKind::Enemy
        )
    }

    /// Cell to dig for an actor at `at` facing `dir`, if digging is legal:
    /// the diagonal cell below must be Brick and the cell beside must be open.
    pub fn dig_target(&self, at: Point, dir: Facing) -> Option<Point> {
        let x = at.x + dir.dx();
        if self.occupancy.get(x, at.y + 1) != BlockKind::Brick { return None; }
        if self.occupancy.get(x, at.y) != BlockKind::Empty { return None; }
        Some(Point::new(x, at.y + 1))
    }

    /// A dug hole: brick terrain whose occupancy has been opened.
    pub fn is_open_hole(&self, x: i32, y: i32) -> bool {
        self.terrain.get(x, y) == BlockKind::Brick && self.occupancy.get(x, y) != BlockKind::Brick
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build (terrain, occupancy) from a diagram. Actors appear only in
    /// occupancy; terrain is the normalized copy.
    /// Legend: 'O'=Brick 'X'=Concrete '#'=Ladder '-'=Bar 'V'=Trapdoor
    ///         '$'=Gold  'P'=Player   'E'=Enemy   'h'=dug hole (Brick
    ///         terrain, Empty occupancy)
    pub(crate) fn layers_from(rows: &[&str]) -> (TileGrid, TileGrid) {
        let height = rows.len() as i32;
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(0) as i32;
        let plain: Vec<String> = rows.iter().map(|r| r.replace('h', "O")).collect();
        let template = TileGrid::from_rows(&plain, width, height).unwrap();
        let terrain = TileGrid::seeded_from(&template);
        let mut occupancy = terrain.clone();
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let (x, y) = (x as i32, y as i32);
                match ch {
                    'P' => occupancy.set(x, y, BlockKind::Player),
                    'E' => occupancy.set(x, y, BlockKind::Enemy),
                    'h' => occupancy.set(x, y, BlockKind::Empty),
                    _ => {}
                }
            }
        }
        (terrain, occupancy)
    }

    fn view<'a>(layers: &'a (TileGrid, TileGrid)) -> MapView<'a> {
        MapView { terrain: &layers.0, occupancy: &layers.1 }
    }

    // ── Background ──

    #[test]
    fn background_sees_through_actors() {
        let layers = layers_from(&[
            "P E",
            "OOO",
        ]);
        let map = view(&layers);
        assert_eq!(map.background(0, 0), BlockKind::Empty);
        assert_eq!(map.background(2, 0), BlockKind::Empty);
        assert_eq!(map.background(1, 1), BlockKind::Brick);
    }

    #[test]
    fn background_demotes_brick_under_actor() {
        let (terrain, mut occupancy) = layers_from(&["h"]);
        occupancy.set(0, 0, BlockKind::Enemy);
        let map = MapView { terrain: &terrain, occupancy: &occupancy };
        assert_eq!(map.background(0, 0), BlockKind::Empty);
    }

    // ── Entering ──

    #[test]
    fn walls_and_edges_block() {
        let layers = layers_from(&[
            "O X",
            "OOO",
        ]);
        let map = view(&layers);
        assert!(!map.can_enter(0, 0, 0));
        assert!(map.can_enter(0, 1, 0));
        assert!(!map.can_enter(0, 2, 0));
        assert!(!map.can_enter(0, -1, 0));
        assert!(!map.can_enter(0, 3, 0));
        assert!(!map.can_enter(0, 1, -1));
    }

    #[test]
    fn trapdoor_only_from_above() {
        let layers = layers_from(&[
            "  ",
            "V ",
        ]);
        let map = view(&layers);
        assert!(map.can_enter(0, 0, 1));
        assert!(!map.can_enter(1, 0, 1));
        assert!(!map.can_enter(2, 0, 1));
    }

    #[test]
    fn open_hole_is_enterable() {
        let layers = layers_from(&[
            "  ",
            "hO",
        ]);
        let map = view(&layers);
        assert!(map.can_enter(0, 0, 1));
        assert!(!map.can_enter(0, 1, 1));
        assert!(map.is_open_hole(0, 1));
        assert!(!map.is_open_hole(1, 1));
    }

    // ── Digging ──

    #[test]
    fn dig_needs_brick_below_and_open_side() {
        let layers = layers_from(&[
            " P$",
            "OOO",
        ]);
        let map = view(&layers);
        let at = Point::new(1, 0);
        assert_eq!(map.dig_target(at, Facing::Left), Some(Point::new(0, 1)));
        assert_eq!(map.dig_target(at, Facing::Right), None);
    }

    #[test]
    fn cannot_dig_concrete_or_open_hole() {
        let layers = layers_from(&[
            " P ",
            "XOh",
        ]);
        let map = view(&layers);
        let at = Point::new(1, 0);
        assert_eq!(map.dig_target(at, Facing::Left), None);
        assert_eq!(map.dig_target(at, Facing::Right), None);
    }
}
