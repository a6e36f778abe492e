/// Enemy AI: target selection by line of sight over the live layers.
///
/// The enemy never plans a full path. Each decision it:
///   1. Walks straight at the player if both stand on the same row and
///      the floor between them is continuous.
///   2. Otherwise looks along its row as far as it can walk, and up and
///      down every column in that span, collecting cells where it could
///      stop (ladder tops, ledges, floors).
///   3. Scores the candidates and steps toward the best one.
///
/// ## Scoring (lower wins, first found wins ties)
///
/// ┌──────────────────────────┬──────────────────────────────────────┐
/// │ Candidate                 │ Score                                │
/// ├──────────────────────────┼──────────────────────────────────────┤
/// │ on the player's row       │ |dx| * 2 (+1 if right of the enemy)  │
/// │ elsewhere                 │ |row - player row| * W + W           │
/// │   below the player        │ + H * W * 2                          │
/// │   left / right of enemy   │ + 1 / + 2                            │
/// └──────────────────────────┴──────────────────────────────────────┘
///
/// Vertical sight uses terrain, so a dug brick still reads as Brick.

use super::entity::{Point, Walk};
use super::rules::MapView;
use super::tile::BlockKind;

/// Context for one decision.
struct Ctx<'a> {
    map: &'a MapView<'a>,
    bx: i32,
    by: i32,
}

impl<'a> Ctx<'a> {
    fn terrain(&self, x: i32, y: i32) -> BlockKind {
        self.map.terrain.get(x, y)
    }

    fn occupancy(&self, x: i32, y: i32) -> BlockKind {
        self.map.occupancy.get(x, y)
    }

    /// Direction to the player along a continuous floor, or 0.
    fn same_row_direction(&self, px: i32) -> i32 {
        let ax = (px - self.bx).signum();
        let mut x = self.bx + ax;
        loop {
            let b0 = self.terrain(x, self.by);
            let b1 = self.terrain(x, self.by + 1);
            let hanging = matches!(b0, BlockKind::Ladder | BlockKind::Bar);
            let floored = matches!(
                b1,
                BlockKind::Brick | BlockKind::Concrete | BlockKind::Ladder | BlockKind::Bar | BlockKind::Gold
            );
            if !hanging && !floored { return 0; }
            if x == px { return ax; }
            x += ax;
        }
    }

    /// How far the enemy can walk along its row: (leftmost, rightmost).
    fn horizontal_view(&self) -> (i32, i32) {
        let check = |ax: i32| {
            let mut x = self.bx;
            loop {
                let nx = x + ax;
                let b0 = self.occupancy(nx, self.by);
                if nx < 0 || nx >= self.map.width() || b0.is_solid() {
                    return x;
                }
                x = nx;
                let b1 = self.terrain(x, self.by + 1);
                if !matches!(b0, BlockKind::Ladder | BlockKind::Bar) && !b1.is_floor() {
                    return x;
                }
            }
        };
        (check(-1), check(1))
    }

    /// Vertical reach in column `x`: (top of ladder run, bottom of drop).
    fn vertical_view(&self, x: i32) -> (i32, i32) {
        let mut y1 = self.by;
        while self.terrain(x, y1) == BlockKind::Ladder {
            y1 -= 1;
        }
        let mut y2 = self.by;
        while y2 < self.map.height() - 1 && !self.terrain(x, y2 + 1).is_solid() {
            y2 += 1;
        }
        (y1, y2)
    }

    fn candidates(&self, py: i32) -> Vec<Point> {
        let mut result = Vec::new();
        let (left, right) = self.horizontal_view();
        for x in left..=right {
            let (y1, y2) = self.vertical_view(x);
            if y1 == y2 { continue; }

            // ── Upward: ladder top, then ledges and bars along the climb ──
            if y1 < self.by {
                result.push(Point::new(x, y1));
                for y in ((y1 + 1)..self.by).rev() {
                    let bar_beside = self.terrain(x - 1, y) == BlockKind::Bar
                        || self.terrain(x + 1, y) == BlockKind::Bar;
                    let ledge_beside = self.terrain(x - 1, y + 1).is_floor()
                        || self.terrain(x + 1, y + 1).is_floor();
                    if bar_beside || ledge_beside {
                        result.push(Point::new(x, y));
                    }
                }
            }

            // ── Downward: floors, then exits at or below the player's row ──
            if y2 > self.by {
                for y in self.by..=y2 {
                    if self.terrain(x, y + 1).is_solid() {
                        result.push(Point::new(x, y));
                        continue;
                    }
                    if y < py { continue; }
                    let here = self.terrain(x, y);
                    let dug = here == BlockKind::Brick && self.occupancy(x, y) == BlockKind::Empty;
                    let stoppable = matches!(
                        here,
                        BlockKind::Ladder | BlockKind::Bar | BlockKind::Trapdoor | BlockKind::Gold
                    );
                    if !stoppable && !dug { continue; }
                    let l0 = self.terrain(x - 1, y);
                    let l1 = self.terrain(x - 1, y + 1);
                    let r0 = self.terrain(x + 1, y);
                    let r1 = self.terrain(x + 1, y + 1);
                    if l1.is_floor() || r1.is_floor() {
                        result.push(Point::new(x, y));
                        continue;
                    }
                    if l0 == BlockKind::Bar
                        || (x == 0 && r0 == BlockKind::Bar)
                        || (x > 0 && r1 == BlockKind::Bar)
                    {
                        result.push(Point::new(x, y));
                    }
                }
            }
        }
        result
    }

    fn priority(&self, p: Point, player: Point) -> i32 {
        let w = self.map.width();
        let h = self.map.height();
        if p.y == player.y {
            return (self.bx - p.x).abs() * 2 + if self.bx < p.x { 1 } else { 0 };
        }
        let mut score = (player.y - p.y).abs() * w + w;
        if p.y > player.y { score += h * w * 2; }
        if p.x < self.bx {
            score += 1;
        } else if p.x > self.bx {
            score += 2;
        }
        score
    }

    /// Unit step toward the chosen target: (ax, ay).
    fn target(&self, player: Point) -> (i32, i32) {
        if player.y == self.by {
            let ax = self.same_row_direction(player.x);
            if ax != 0 { return (ax, 0); }
        }
        let best = self
            .candidates(player.y)
            .into_iter()
            .fold(None::<(Point, i32)>, |best, p| {
                let score = self.priority(p, player);
                match best {
                    Some((_, s)) if s <= score => best,
                    _ => Some((p, score)),
                }
            });
        let Some((pos, _)) = best else { return (0, 1) };
        if pos.x < self.bx {
            (-1, 0)
        } else if pos.x > self.bx {
            (1, 0)
        } else if pos.y < self.by {
            (0, -1)
        } else {
            (0, 1)
        }
    }
}

/// Pick the walk that brings an enemy at `at` closer to the player.
pub fn chase(map: &MapView, at: Point, player: Point) -> Walk {
    let ctx = Ctx { map, bx: at.x, by: at.y };
    match ctx.target(player) {
        (ax, _) if ax < 0 => Walk::Left,
        (ax, _) if ax > 0 => Walk::Right,
        (_, ay) if ay < 0 => Walk::Up,
        _ => Walk::Down,
    }
}
