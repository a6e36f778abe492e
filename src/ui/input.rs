/// Keyboard capture for the terminal host.
///
/// Tracks which keys are currently held down and mirrors them into a
/// `ButtonLatch` once per frame. The latch handles edge detection, so
/// holding Enter pauses once and holding an arrow keeps walking.
///
/// Most terminals never report key releases, so a key counts as released
/// once no Press/Repeat event has arrived for `HOLD_TIMEOUT`. When the
/// terminal does report releases, `honor_release` makes them immediate.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::input::{Button, ButtonLatch};

/// After this duration without a Press/Repeat event, consider the key released.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_DIG_L: &[KeyCode] = &[KeyCode::Char('z'), KeyCode::Char('Z')];
const KEYS_DIG_R: &[KeyCode] = &[KeyCode::Char('x'), KeyCode::Char('X')];
const KEYS_PAUSE: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char('p'), KeyCode::Char('P')];
const KEYS_SELECT: &[KeyCode] = &[KeyCode::Tab, KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];

const BINDINGS: &[(Button, &[KeyCode])] = &[
    (Button::Left, KEYS_LEFT),
    (Button::Right, KEYS_RIGHT),
    (Button::Up, KEYS_UP),
    (Button::Down, KEYS_DOWN),
    (Button::LeftBeam, KEYS_DIG_L),
    (Button::RightBeam, KEYS_DIG_R),
    (Button::Pause, KEYS_PAUSE),
    (Button::Select, KEYS_SELECT),
];

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Raw key events collected during drain, for meta-key handling.
    raw_events: Vec<KeyEvent>,

    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per frame, before the simulation tick.
    pub fn drain_events(&mut self) {
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            let key = match event::read() {
                Ok(Event::Key(key)) => key,
                _ => continue,
            };
            self.raw_events.push(key);
            self.record(key, Instant::now());
        }

        let now = Instant::now();
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    fn record(&mut self, key: KeyEvent, at: Instant) {
        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&key.code);
            }
            KeyEventKind::Release => {}
            _ => {
                self.last_active.insert(key.code, at);
            }
        }
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        self.last_active
            .get(&code)
            .map(|t| t.elapsed() < HOLD_TIMEOUT)
            .unwrap_or(false)
    }

    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.is_held(*c))
    }

    /// Mirror held keys into the latch: press what is held, release the rest.
    pub fn apply(&self, latch: &mut ButtonLatch) {
        for &(button, keys) in BINDINGS {
            if self.any_held(keys) {
                latch.press(button);
            } else {
                latch.release(button);
            }
        }
    }

    /// Quit key or Ctrl+C seen this frame.
    pub fn quit_requested(&self) -> bool {
        self.raw_events.iter().any(|k| {
            let ctrl_c = k.modifiers.contains(KeyModifiers::CONTROL)
                && matches!(k.code, KeyCode::Char('c') | KeyCode::Char('C'));
            ctrl_c || (k.kind != KeyEventKind::Release && KEYS_QUIT.contains(&k.code))
        })
    }
}

impl Default for InputState {
    fn default() -> Self {
        InputState::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::input::Stick;

    fn press(input: &mut InputState, code: KeyCode) {
        input.record(KeyEvent::new(code, KeyModifiers::NONE), Instant::now());
    }

    #[test]
    fn held_key_presses_button() {
        let mut input = InputState::new();
        let mut latch = ButtonLatch::new();
        press(&mut input, KeyCode::Char('z'));
        input.apply(&mut latch);
        assert!(latch.is_held(Button::LeftBeam));
        assert!(!latch.is_held(Button::Right));
    }

    #[test]
    fn released_key_releases_button() {
        let mut input = InputState::new();
        input.honor_release = true;
        let mut latch = ButtonLatch::new();
        press(&mut input, KeyCode::Enter);
        input.apply(&mut latch);
        assert!(latch.pause());
        assert!(!latch.pause());

        let release = KeyEvent::new_with_kind(KeyCode::Enter, KeyModifiers::NONE, KeyEventKind::Release);
        input.record(release, Instant::now());
        input.apply(&mut latch);
        assert!(!latch.is_held(Button::Pause));

        press(&mut input, KeyCode::Enter);
        input.apply(&mut latch);
        assert!(latch.pause());
    }

    #[test]
    fn release_ignored_without_enhancement() {
        let mut input = InputState::new();
        press(&mut input, KeyCode::Left);
        let release = KeyEvent::new_with_kind(KeyCode::Left, KeyModifiers::NONE, KeyEventKind::Release);
        input.record(release, Instant::now());
        assert!(input.is_held(KeyCode::Left));
    }

    #[test]
    fn stale_key_times_out() {
        let mut input = InputState::new();
        let old = Instant::now() - HOLD_TIMEOUT * 2;
        input.record(KeyEvent::new(KeyCode::Up, KeyModifiers::NONE), old);
        assert!(!input.is_held(KeyCode::Up));
    }
}
