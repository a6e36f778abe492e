/// Input intents consumed by the simulation.
///
/// A `Stick` answers "is this button down?" and can optionally consume
/// the press: once consumed, the button reads as up until it is
/// released and pressed again. Movement queries never consume, so held
/// directions keep walking. Pause consumes, so one press toggles once.

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Button {
    Left,
    Right,
    Up,
    Down,
    LeftBeam,
    RightBeam,
    Pause,
    Select,
}

impl Button {
    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

pub trait Stick {
    fn is_down(&mut self, button: Button, consume: bool) -> bool;

    fn left(&mut self) -> bool { self.is_down(Button::Left, false) }
    fn right(&mut self) -> bool { self.is_down(Button::Right, false) }
    fn up(&mut self) -> bool { self.is_down(Button::Up, false) }
    fn down(&mut self) -> bool { self.is_down(Button::Down, false) }
    fn left_beam(&mut self) -> bool { self.is_down(Button::LeftBeam, false) }
    fn right_beam(&mut self) -> bool { self.is_down(Button::RightBeam, false) }
    fn pause(&mut self) -> bool { self.is_down(Button::Pause, true) }
    fn select(&mut self) -> bool { self.is_down(Button::Select, true) }
}

/// Held/consumed bit sets fed by press and release events.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ButtonLatch {
    held: u16,
    kept: u16,
}

impl ButtonLatch {
    pub fn new() -> Self {
        ButtonLatch::default()
    }

    pub fn press(&mut self, button: Button) {
        self.held |= button.bit();
    }

    pub fn release(&mut self, button: Button) {
        self.held &= !button.bit();
        self.kept &= !button.bit();
    }

    pub fn is_held(&self, button: Button) -> bool {
        self.held & button.bit() != 0
    }
}

impl Stick for ButtonLatch {
    fn is_down(&mut self, button: Button, consume: bool) -> bool {
        let down = self.held & button.bit() & !self.kept != 0;
        if consume && down {
            self.kept |= button.bit();
        }
        down
    }
}

/// A stick with nothing pressed.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdleStick;

impl Stick for IdleStick {
    fn is_down(&mut self, _button: Button, _consume: bool) -> bool {
        false
    }
}
