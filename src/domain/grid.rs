/// TileGrid: a fixed-size rectangular grid of `BlockKind`.
///
/// ## Edge Reads
///
/// Reads never fail. Off-grid coordinates answer with a fixed kind so
/// that movement rules need no bounds checks of their own:
///   - above or below the grid (y < 0 or y >= height) → `Concrete`
///   - left or right of the grid (x < 0 or x >= width) → `Empty`
///
/// Writes outside the grid are silently ignored.

use crate::error::StageError;

use super::tile::BlockKind;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TileGrid {
    width: i32,
    height: i32,
    cells: Vec<BlockKind>,
}

impl TileGrid {
    /// An all-`Empty` grid.
    pub fn new(width: i32, height: i32) -> Result<Self, StageError> {
        if width <= 0 || height <= 0 {
            return Err(StageError::InvalidSize { width, height });
        }
        Ok(TileGrid {
            width,
            height,
            cells: vec![BlockKind::Empty; (width * height) as usize],
        })
    }

    /// Parse symbol rows. Rows past `height` and characters past `width`
    /// are dropped; missing cells stay `Empty`.
    pub fn from_rows<S: AsRef<str>>(rows: &[S], width: i32, height: i32) -> Result<Self, StageError> {
        let mut grid = TileGrid::new(width, height)?;
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.as_ref().chars().enumerate() {
                grid.set(x as i32, y as i32, BlockKind::from_symbol(ch));
            }
        }
        Ok(grid)
    }

    /// Copy a template into a live layer. Spawn-only kinds
    /// (escape ladders, enemies, the player) become `Empty`.
    pub fn seeded_from(template: &TileGrid) -> Self {
        let cells = template
            .cells
            .iter()
            .map(|&kind| if kind.is_spawn_only() { BlockKind::Empty } else { kind })
            .collect();
        TileGrid { width: template.width, height: template.height, cells }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    pub fn get(&self, x: i32, y: i32) -> BlockKind {
        if y < 0 || y >= self.height { return BlockKind::Concrete; }
        if x < 0 || x >= self.width { return BlockKind::Empty; }
        self.cells[(y * self.width + x) as usize]
    }

    pub fn set(&mut self, x: i32, y: i32, kind: BlockKind) {
        if !self.in_bounds(x, y) { return; }
        let idx = (y * self.width + x) as usize;
        self.cells[idx] = kind;
    }

    /// All cells in row-major order with their coordinates.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32, BlockKind)> + '_ {
        let w = self.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &kind)| (i as i32 % w, i as i32 / w, kind))
    }

    pub fn count(&self, kind: BlockKind) -> usize {
        self.cells.iter().filter(|&&k| k == kind).count()
    }

    /// Rows rendered back to canonical symbols.
    pub fn to_rows(&self) -> Vec<String> {
        (0..self.height)
            .map(|y| (0..self.width).map(|x| self.get(x, y).symbol()).collect())
            .collect()
    }
}
