/// Small value types shared by the player, enemies and the stage:
/// tile points, facing, walk types, hole entries and animation payloads.

/// Pixels in half a tile. A tile is `2 * HALF_SIZE` pixels wide.
pub const HALF_SIZE: i32 = 8;
pub const TILE_SIZE: i32 = HALF_SIZE * 2;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Facing {
    #[default]
    Left,
    Right,
}

impl Facing {
    pub fn flipped(self) -> Self {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }

    pub fn dx(self) -> i32 {
        match self {
            Facing::Left => -1,
            Facing::Right => 1,
        }
    }
}

/// What an actor is doing this decision segment.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Walk {
    #[default]
    Left,
    Right,
    Up,
    Down,
    Fall,
    LeftBeam,
    RightBeam,
}

impl Walk {
    pub fn is_vertical(self) -> bool {
        matches!(self, Walk::Up | Walk::Down)
    }
}

/// A dug hole counting down to refill.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct HoleEntry {
    pub x: i32,
    pub y: i32,
    pub time: u32,
}

/// Enemy memory of the hole it is climbing out of.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct LastHole {
    pub x: i32,
    pub y: i32,
    pub time: i32,
}

impl LastHole {
    pub fn at(&self, x: i32, y: i32) -> bool {
        self.x == x && self.y == y
    }
}

/// Facing and animation clock handed to the pose builder.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ViewState {
    pub dir: Facing,
    pub time: u32,
}

/// Death animation payload, advanced while the stage is lost.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct DeadAnim {
    pub count: u32,
    pub dx: f32,
    pub dy: f32,
    pub dz: f32,
    pub vy: f32,
}

impl Default for DeadAnim {
    fn default() -> Self {
        DeadAnim { count: 0, dx: 0.0, dy: 0.0, dz: 0.0, vy: -0.15 }
    }
}

impl DeadAnim {
    /// Lift off the stage, then get tossed up and pulled back down.
    pub fn advance(&mut self) {
        if self.dz < 0.5 {
            self.dz = (self.dz + 0.01).min(0.5);
        } else {
            self.dy += self.vy;
            self.vy += 0.01;
        }
        self.count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facing_flip_and_dx() {
        assert_eq!(Facing::Left.flipped(), Facing::Right);
        assert_eq!(Facing::Right.dx(), 1);
        assert_eq!(Facing::Left.dx(), -1);
    }

    #[test]
    fn dead_anim_lifts_then_tosses_up_and_back() {
        let mut anim = DeadAnim::default();
        while anim.dz < 0.5 {
            anim.advance();
            assert!(anim.count <= 52);
        }
        assert!(anim.count >= 49);
        assert_eq!(anim.dy, 0.0);
        let lifted = anim.count;
        anim.advance();
        anim.advance();
        assert!((anim.dy + 0.29).abs() < 1e-4, "dy {}", anim.dy);
        assert_eq!(anim.count, lifted + 2);
        // Rising slows, stops after 15 steps, then falls back.
        let mut peak = anim.dy;
        for _ in 0..40 {
            anim.advance();
            peak = peak.min(anim.dy);
        }
        assert!(peak < -1.1);
        assert!(anim.dy > peak);
    }

    #[test]
    fn last_hole_position_match() {
        let hole = LastHole { x: 3, y: 4, time: 24 };
        assert!(hole.at(3, 4));
        assert!(!hole.at(3, 5));
    }
}
