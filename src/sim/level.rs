/// Stage templates: authored maps plus their name and number.
///
/// ## Sources
///   1. A stage file given on the command line (`.txt`)
///   2. Built-in embedded stages
///
/// ## Stage file format:
///   Line 1: `# Stage Name` (optional)
///   Lines:  map rows
///
/// Trailing blank lines are dropped. Rows may be ragged; short rows are
/// padded with Empty.
///
/// ## Tile legend:
///   'O' = Brick (diggable)       'X' = Concrete
///   '#' = Ladder                 '~' '-' '^' = Bar
///   'V' = Trapdoor               '!' = Escape ladder (after all gold)
///   '$' = Gold                   'P' = Player spawn
///   'E' = Enemy spawn            ' ' = Empty
///
/// ## Fitting to a frame
///
/// A stage set has a fixed frame (`width` x `height`) and may reserve
/// `offset` blank rows at the top. Maps narrower than the frame are
/// centred horizontally.

use std::path::Path;

use crate::domain::entity::Point;
use crate::domain::grid::TileGrid;
use crate::domain::tile::BlockKind;
use crate::error::StageError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StageInfo {
    pub name: String,
    pub number: u32,
}

#[derive(Clone, Debug)]
pub struct StageTemplate {
    pub info: StageInfo,
    pub grid: TileGrid,
}

/// Frame of the built-in stage set.
pub const FRAME_WIDTH: i32 = 28;
pub const FRAME_HEIGHT: i32 = 16;

impl StageTemplate {
    /// Rows taken as-is: the grid is as wide as the longest row.
    pub fn from_rows<S: AsRef<str>>(rows: &[S], info: StageInfo) -> Result<Self, StageError> {
        let height = rows.len() as i32;
        let width = rows.iter().map(|r| r.as_ref().chars().count()).max().unwrap_or(0) as i32;
        let grid = TileGrid::from_rows(rows, width, height)?;
        Ok(StageTemplate { info, grid })
    }

    /// Fit `rows` into a `width` x `height` frame with `offset` blank rows
    /// on top, centring narrower maps.
    pub fn fitted<S: AsRef<str>>(
        rows: &[S],
        width: i32,
        height: i32,
        offset: usize,
        info: StageInfo,
    ) -> Result<Self, StageError> {
        let widest = rows.iter().map(|r| r.as_ref().chars().count()).max().unwrap_or(0) as i32;
        let pad = if widest < width { " ".repeat(((width - widest) / 2) as usize) } else { String::new() };
        let mut fitted: Vec<String> = vec![String::new(); offset];
        fitted.extend(rows.iter().map(|r| format!("{pad}{}", r.as_ref())));
        let grid = TileGrid::from_rows(&fitted, width, height + offset as i32)?;
        Ok(StageTemplate { info, grid })
    }

    /// Parse a single stage from text content.
    pub fn parse(content: &str, number: u32) -> Result<Self, StageError> {
        let mut name = String::new();
        let mut rows: Vec<&str> = vec![];

        for line in content.lines() {
            if rows.is_empty() && name.is_empty() && is_name_line(line) {
                name = line[1..].trim().to_string();
            } else {
                rows.push(line.trim_end_matches('\r'));
            }
        }

        while rows.last().map_or(false, |r| r.trim().is_empty()) {
            rows.pop();
        }
        if rows.is_empty() {
            return Err(StageError::NoRows);
        }
        if name.is_empty() {
            name = format!("Stage {number}");
        }

        StageTemplate::from_rows(&rows, StageInfo { name, number })
    }

    pub fn load(path: &Path, number: u32) -> Result<Self, StageError> {
        let content = std::fs::read_to_string(path).map_err(|source| StageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        StageTemplate::parse(&content, number)
    }

    /// Player spawn; with several markers the last one in reading order wins.
    pub fn player_spawn(&self) -> Option<Point> {
        self.grid
            .cells()
            .filter(|&(_, _, kind)| kind == BlockKind::Player)
            .last()
            .map(|(x, y, _)| Point::new(x, y))
    }

    /// Enemy spawns in reading order; this order is the enemy index.
    pub fn enemy_spawns(&self) -> Vec<Point> {
        self.grid
            .cells()
            .filter(|&(_, _, kind)| kind == BlockKind::Enemy)
            .map(|(x, y, _)| Point::new(x, y))
            .collect()
    }
}

/// Distinguish `# Stage Name` from a map row that starts with a ladder.
/// A name line starts with `#` and contains a letter or digit that is
/// not a map symbol.
fn is_name_line(line: &str) -> bool {
    match line.strip_prefix('#') {
        Some(rest) => rest.chars().any(|c| c.is_alphanumeric() && !"OXVEP".contains(c)),
        None => false,
    }
}

// ══════════════════════════════════════════════════════════════
// Embedded stages
// ══════════════════════════════════════════════════════════════

const EMBEDDED: &[(&str, &[&str])] = &[
    ("First Dig", &[
        "        !                !  ",
        "        !                !  ",
        "    $   !                !  ",
        "OOOOOOOO#OOOOOOO         !  ",
        "        #----------     $!  ",
        "        #    OO#   OOOOOO#OO",
        "      E #    OO#      $E #  ",
        "OO#OOOOOOOOOOOOOOOOO#OOOOOOO",
        "  #                 #       ",
        "  #           E     #       ",
        "OOOOOOOOOO#OOOOOOOOO#       ",
        "          #         #       ",
        "       $  #---------#  $    ",
        "    #OOOOOOO        OOOOOOO#",
        "    #          P  $        #",
        "OOOOOOOOOOOOOOOOOOOOOOOOOOOO",
    ]),
    ("Locked Vault", &[
        "   !                  !     ",
        "   !                  !     ",
        "   !$     $    $     $!     ",
        "   OOO   OOO  OOO   OOO     ",
        "   #                  #     ",
        "   #  --------  ---   #     ",
        "   #  #      #  # #  #      ",
        "   # $#  E   #  #$#  #      ",
        "   #OO#OOOOOO#  #O#  #      ",
        "   #  #      #  # #  #      ",
        "   #  #--  --#--#-#--#      ",
        "   #  #   $     #    #      ",
        " P #  #  OOO  E #  $ #      ",
        " OO#XX#XXXXXXXXX#XXOO#XX    ",
        "   #  #         #    #      ",
        "XXXXXXXXXXXXXXXXXXXXXXXXXXXX",
    ]),
];

pub fn embedded_count() -> u32 {
    EMBEDDED.len() as u32
}

/// Built-in stage `number` (1-based, wrapping).
pub fn embedded_stage(number: u32) -> Result<StageTemplate, StageError> {
    let count = embedded_count();
    let number = (number.max(1) - 1) % count + 1;
    let (name, rows) = EMBEDDED[(number - 1) as usize];
    let info = StageInfo { name: name.to_string(), number };
    StageTemplate::fitted(rows, FRAME_WIDTH, FRAME_HEIGHT, 0, info)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> StageInfo {
        StageInfo { name: "t".to_string(), number: 1 }
    }

    #[test]
    fn narrow_map_is_centred_below_offset() {
        let t = StageTemplate::fitted(&["P$", "OO"], 6, 2, 1, info()).unwrap();
        assert_eq!(t.grid.height(), 3);
        assert_eq!(t.grid.width(), 6);
        assert_eq!(t.grid.to_rows(), vec!["      ", "  P$  ", "  OO  "]);
    }

    #[test]
    fn parse_reads_name_and_trims_blank_tail() {
        let t = StageTemplate::parse("# Twin Towers\n P \nOOO\n\n\n", 4).unwrap();
        assert_eq!(t.info, StageInfo { name: "Twin Towers".to_string(), number: 4 });
        assert_eq!(t.grid.height(), 2);
        assert_eq!(t.player_spawn(), Some(Point::new(1, 0)));
    }

    #[test]
    fn ladder_row_is_not_a_name() {
        let t = StageTemplate::parse("##  P\nOOOOO\n", 2).unwrap();
        assert_eq!(t.grid.height(), 2);
        assert_eq!(t.grid.get(0, 0), BlockKind::Ladder);
        assert_eq!(t.info.name, "Stage 2");
    }

    #[test]
    fn empty_file_is_rejected() {
        assert!(matches!(StageTemplate::parse("# Nothing\n\n", 1), Err(StageError::NoRows)));
    }

    #[test]
    fn spawns_in_reading_order() {
        let t = StageTemplate::from_rows(&["E P", "P E"], info()).unwrap();
        assert_eq!(t.player_spawn(), Some(Point::new(0, 1)));
        assert_eq!(t.enemy_spawns(), vec![Point::new(0, 0), Point::new(2, 1)]);
    }

    #[test]
    fn embedded_stages_are_playable() {
        for n in 1..=embedded_count() {
            let t = embedded_stage(n).unwrap();
            assert_eq!(t.grid.width(), FRAME_WIDTH);
            assert_eq!(t.grid.height(), FRAME_HEIGHT);
            assert!(t.player_spawn().is_some());
            assert!(t.grid.count(BlockKind::Gold) > 0);
            assert!(t.grid.count(BlockKind::EscapeLadder) > 0);
        }
        assert_eq!(embedded_stage(embedded_count() + 1).unwrap().info.number, 1);
    }
}
