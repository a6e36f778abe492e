/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The map is drawn from the occupancy layer with open holes and the
/// dig in flight overlaid. Each game cell is two terminal columns. The
/// viewport follows `StagePlay::view_pos`, so the showcase tour and the
/// paused camera pan scroll the map.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use rand::RngCore;

use crate::domain::tile::BlockKind;
use crate::sim::enemy::Enemy;
use crate::sim::play::{PlayMode, StagePlay};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel used to invalidate the back buffer.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = if bg == Color::Reset { Cell::BASE_BG } else { bg };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    /// Row of text, for tests.
    #[cfg(test)]
    fn row_text(&self, y: usize) -> String {
        (0..self.width).map(|x| self.get(x, y).ch).collect()
    }
}

// ── Renderer ──

const CELL_W: usize = 2;

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_mode: Option<PlayMode>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_mode: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.resize(tw as usize, th as usize);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    fn resize(&mut self, w: usize, h: usize) {
        self.term_w = w;
        self.term_h = h;
        self.front.resize(w, h);
        self.back.resize(w, h);
        // Force full repaint: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);
    }

    pub fn render<R: RngCore>(&mut self, play: &StagePlay<R>) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.resize(tw as usize, th as usize);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }
        if self.last_mode != Some(play.mode()) {
            self.back.cells.fill(Cell::INVALID);
            self.last_mode = Some(play.mode());
        }

        self.front.clear();
        compose(&mut self.front, play);
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;

        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }
                if need_move {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
            }
            need_move = true;
        }

        self.writer.flush()
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Renderer::new()
    }
}

// ── Compose: build front buffer content ──

fn compose<R: RngCore>(buf: &mut FrameBuffer, play: &StagePlay<R>) {
    let stage = play.stage();
    let info = play.info();
    let status = match play.mode() {
        PlayMode::Playing => "",
        PlayMode::Paused => "PAUSED",
        PlayMode::Cleared => "STAGE CLEAR",
        PlayMode::Lost => "MISS",
        PlayMode::Showcase(_) | PlayMode::ReturnX | PlayMode::ReturnY => "READY",
    };
    let hud = format!(
        " STAGE {:<3} {:<16} GOLD {:<3} TIME {:<6} {} ",
        info.number,
        info.name,
        play.rest_gold(),
        play.play_time(),
        status,
    );
    for x in 0..buf.width {
        buf.set(x, HUD_ROW, Cell::new(' ', Color::White, HUD_BG));
    }
    buf.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);

    // ── Map (camera viewport) ──
    let view_w = (buf.width / CELL_W).min(stage.width() as usize);
    let view_h = buf.height.saturating_sub(MAP_ROW + 2).min(stage.height() as usize);
    let focus = play.view_pos();
    let left = viewport_origin(focus.x, view_w, stage.width());
    let top = viewport_origin(focus.y, view_h, stage.height());

    let holes = play.hole_list();
    let player = play.player().tile();

    for vy in 0..view_h {
        let gy = top + vy as i32;
        for vx in 0..view_w {
            let gx = left + vx as i32;
            let hole = holes.iter().find(|h| h.x == gx && h.y == gy);
            let (c0, c1, fg, bg) = if gx == player.x && gy == player.y {
                player_glyph(play)
            } else if let Some(enemy) = play.enemies().iter().find(|e| e.tile().x == gx && e.tile().y == gy) {
                enemy_glyph(enemy)
            } else if hole.is_some() && stage.occupancy.get(gx, gy) == BlockKind::Empty {
                (' ', ' ', Color::Reset, Color::Rgb { r: 10, g: 8, b: 0 })
            } else if let Some(hole) = hole {
                // Dig in progress: brick still standing in occupancy.
                let c = if hole.time < 24 { '▓' } else { '░' };
                (c, c, Color::DarkYellow, Color::Rgb { r: 60, g: 40, b: 0 })
            } else {
                tile_glyph(stage.occupancy.get(gx, gy))
            };
            let col = vx * CELL_W;
            let row = MAP_ROW + vy;
            buf.set(col, row, Cell::new(c0, fg, bg));
            buf.set(col + 1, row, Cell::new(c1, fg, bg));
        }
    }

    let help_row = MAP_ROW + view_h + 1;
    let help = " ←↑→↓ Move  Z/X Dig  Enter Pause/Skip  Tab Restart  Q Quit";
    buf.put_str(0, help_row, help, Color::DarkGrey, Color::Reset);
}

/// First visible cell so that `focus` sits in the middle, clamped to the stage.
fn viewport_origin(focus: f32, view: usize, size: i32) -> i32 {
    let view = view as i32;
    let origin = focus.floor() as i32 - view / 2;
    origin.clamp(0, (size - view).max(0))
}

fn player_glyph<R: RngCore>(play: &StagePlay<R>) -> (char, char, Color, Color) {
    if play.player().dead_anim().is_some() {
        return ('x', 'x', Color::Magenta, Color::Reset);
    }
    if play.player().beam() != 0 {
        return ('*', '*', Color::White, Color::Reset);
    }
    ('[', ']', Color::Green, Color::Reset)
}

/// Trapped enemies show braces; a freshly respawned one is greyed out.
fn enemy_glyph(enemy: &Enemy) -> (char, char, Color, Color) {
    let (c0, c1) = if enemy.is_trapped() { ('{', '}') } else { ('<', '>') };
    let fg = if enemy.is_respawning() {
        Color::DarkGrey
    } else if enemy.is_carrying() {
        Color::Yellow
    } else {
        Color::Red
    };
    (c0, c1, fg, Color::Reset)
}

fn tile_glyph(kind: BlockKind) -> (char, char, Color, Color) {
    match kind {
        BlockKind::Brick => ('░', '░', Color::Rgb { r: 180, g: 120, b: 60 }, Color::Rgb { r: 100, g: 65, b: 30 }),
        BlockKind::Concrete => ('█', '█', Color::Rgb { r: 120, g: 120, b: 120 }, Color::Rgb { r: 70, g: 70, b: 70 }),
        BlockKind::Ladder => ('╠', '╣', Color::Rgb { r: 100, g: 200, b: 255 }, Color::Reset),
        BlockKind::Bar => ('━', '━', Color::Rgb { r: 180, g: 100, b: 200 }, Color::Reset),
        BlockKind::Trapdoor => ('░', '░', Color::Rgb { r: 180, g: 120, b: 60 }, Color::Rgb { r: 90, g: 60, b: 30 }),
        BlockKind::Gold => ('$', '$', Color::Yellow, Color::Reset),
        BlockKind::Empty
        | BlockKind::EscapeLadder
        | BlockKind::Enemy
        | BlockKind::Player => (' ', ' ', Color::Reset, Color::Reset),
    }
}
