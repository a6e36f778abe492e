/// Cadence: a repeating per-tick pixel schedule.
///
/// An actor moving `speed` pixels every `times` ticks cannot move a
/// fractional pixel, so the rate is spread over a short cycle of integer
/// counts. The cycle is split into segments; the start of each segment
/// is a decision point where the actor picks its next walk.
///
/// The player (speed 6 over 5 ticks) gets `*2*11*11`: decide, move 2;
/// decide, move 1 then 1; decide, move 1 then 1. Five ticks, six pixels.
///
/// Every generated cycle covers an even number of pixels so that two
/// segments always add up to whole half-tile steps.

/// Guard against speeds that would never settle on an even total.
const MAX_CYCLE_PIXELS: u64 = 100;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Cadence {
    segments: Vec<Vec<u8>>,
    cursor: usize,
}

impl Cadence {
    /// Build the schedule for `speed` pixels per `times` ticks.
    /// A zero speed or period yields a stationary one-tick cycle.
    pub fn generate(speed: u32, times: u32) -> Self {
        if speed == 0 || times == 0 {
            return Cadence { segments: vec![vec![0]], cursor: 0 };
        }
        let (speed, times) = (u64::from(speed), u64::from(times));
        let mut segments: Vec<Vec<u8>> = Vec::new();
        let mut count = 0u64;
        let mut total = 0u64;
        let mut next = 0u64;
        while count % times != 0 || total == 0 || total & 1 == 1 {
            count += speed;
            let mut dt = 0u8;
            while count > total * times {
                dt = dt.saturating_add(1);
                total += 1;
            }
            if total > next {
                segments.push(Vec::new());
                next += 2;
            }
            if let Some(segment) = segments.last_mut() {
                segment.push(dt);
            }
            if total > MAX_CYCLE_PIXELS { break; }
        }
        Cadence { segments, cursor: 0 }
    }

    /// Player schedule: `speed` pixels per `times` ticks.
    pub fn for_player(speed: u32, times: u32) -> Self {
        Cadence::generate(speed, times)
    }

    /// Enemy schedule. Enemies slow down as the stage gets more crowded.
    pub fn for_enemies(speed: u32, times: u32, enemy_count: u32) -> Self {
        let speed = enemy_count.saturating_add(1).saturating_mul(speed);
        let times = enemy_count.saturating_mul(3).saturating_mul(times);
        Cadence::generate(speed, times)
    }

    /// The next segment's per-tick counts. Wraps at the end of the cycle.
    pub fn next_segment(&mut self) -> &[u8] {
        let idx = self.cursor;
        self.cursor = (self.cursor + 1) % self.segments.len();
        &self.segments[idx]
    }

    pub fn segments(&self) -> &[Vec<u8>] {
        &self.segments
    }

    /// Pixels covered by one full cycle.
    pub fn cycle_pixels(&self) -> u32 {
        self.segments.iter().flatten().map(|&d| d as u32).sum()
    }

    /// Ticks taken by one full cycle.
    pub fn cycle_ticks(&self) -> u32 {
        self.segments.iter().map(|s| s.len() as u32).sum()
    }

    /// Compact form: `*` before each segment, then its digits.
    pub fn pattern(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            out.push('*');
            for &d in segment {
                out.push_str(&d.to_string());
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn player_pattern() {
        let cadence = Cadence::for_player(6, 5);
        assert_eq!(cadence.pattern(), "*2*11*11");
        assert_eq!(cadence.cycle_pixels(), 6);
        assert_eq!(cadence.cycle_ticks(), 5);
    }

    #[test]
    fn single_enemy_pattern() {
        let cadence = Cadence::for_enemies(6, 5, 1);
        assert_eq!(cadence.pattern(), "*11*110");
    }

    #[test]
    fn more_enemies_move_slower() {
        let one = Cadence::for_enemies(6, 5, 1);
        let four = Cadence::for_enemies(6, 5, 4);
        let rate = |c: &Cadence| c.cycle_pixels() as f64 / c.cycle_ticks() as f64;
        assert!(rate(&four) < rate(&one));
    }

    #[test]
    fn zero_speed_stands_still() {
        let mut cadence = Cadence::generate(0, 5);
        assert_eq!(cadence.next_segment(), &[0]);
        assert_eq!(cadence.next_segment(), &[0]);
    }

    #[test]
    fn segments_wrap() {
        let mut cadence = Cadence::for_player(6, 5);
        assert_eq!(cadence.next_segment(), &[2]);
        assert_eq!(cadence.next_segment(), &[1, 1]);
        assert_eq!(cadence.next_segment(), &[1, 1]);
        assert_eq!(cadence.next_segment(), &[2]);
    }

    #[test]
    fn huge_period_does_not_overflow() {
        let cadence = Cadence::generate(3 << 29, 1 << 30);
        assert_eq!(cadence.pattern(), "*2*1*21");
        assert_eq!(cadence.cycle_pixels(), 6);
        assert_eq!(cadence.cycle_ticks(), 4);
    }

    proptest! {
        #[test]
        fn cycle_matches_requested_rate(speed in 1u32..40, times in 1u32..40) {
            let cadence = Cadence::generate(speed, times);
            let pixels = cadence.cycle_pixels();
            prop_assume!(u64::from(pixels) <= MAX_CYCLE_PIXELS);
            prop_assert_eq!(pixels * times, speed * cadence.cycle_ticks());
            prop_assert_eq!(pixels % 2, 0);
            prop_assert!(cadence.segments().iter().all(|s| !s.is_empty()));
        }
    }
}
