use crate::clock::{ClockState, Direction, Field};

/// One debounced adjustment button: which field it touches, which way, and
/// whether the current press has already been consumed.
pub struct AdjustButton {
    field: Field,
    direction: Direction,
    latch: bool,
}

impl AdjustButton {
    pub const fn new(field: Field, direction: Direction) -> Self {
        Self {
            field,
            direction,
            latch: false,
        }
    }

    /// Feed one polled level sample (true = pressed). Applies at most one
    /// unit per physical press: the latch is set when the press is first
    /// seen and rearmed only once the line reads released again.
    pub fn poll(&mut self, pressed: bool, clock: &mut ClockState) {
        if pressed && !self.latch {
            clock.nudge(self.field, self.direction);
            self.latch = true;
        } else if !pressed {
            self.latch = false;
        }
    }
}

/// The fixed button table, in line order: inc/dec hours, inc/dec minutes,
/// inc/dec seconds. Processed uniformly once per main-loop pass.
pub const fn adjust_table() -> [AdjustButton; 6] {
    [
        AdjustButton::new(Field::Hours, Direction::Up),
        AdjustButton::new(Field::Hours, Direction::Down),
        AdjustButton::new(Field::Mins, Direction::Up),
        AdjustButton::new(Field::Mins, Direction::Down),
        AdjustButton::new(Field::Secs, Direction::Up),
        AdjustButton::new(Field::Secs, Direction::Down),
    ]
}

/// Two-sample edge detector for the mode button: compares the current poll
/// against the previous one and fires once per released -> pressed
/// transition.
pub struct EdgeDetector {
    prev_pressed: bool,
}

impl EdgeDetector {
    /// Starts as if mid-press: a line held at boot cannot fire until it
    /// has been seen released once.
    pub const fn new() -> Self {
        Self { prev_pressed: true }
    }

    pub fn poll(&mut self, pressed: bool) -> bool {
        let fired = pressed && !self.prev_pressed;
        self.prev_pressed = pressed;
        fired
    }
}
