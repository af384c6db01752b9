/// Direction of automatic time advance: stopwatch or countdown timer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mode {
    CountUp,
    CountDown,
}

/// What a tick asks of the buzzer line.
///
/// Count-up ticks always drive the line low. A running countdown leaves it
/// alone, so a raised alarm stays raised until a mode change or a reset. A
/// countdown sitting at zero keeps re-raising it.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AlarmRequest {
    Silence,
    Leave,
    Raise,
}

/// Which time field a manual adjustment targets.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Field {
    Hours,
    Mins,
    Secs,
}

/// Direction of a manual adjustment.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Direction {
    Up,
    Down,
}

/// Shared state for the clock: the authoritative time value plus the tick
/// direction. Callers keep the fields in range (secs and mins below 60,
/// hours below 100) after every logical update.
pub struct ClockState {
    pub hours: u8,
    pub mins: u8,
    pub secs: u8,
    pub mode: Mode,
}

impl ClockState {
    /// Hour count at which the value wraps back to zero.
    pub const MAX_HOURS: u8 = 100;

    pub const fn new() -> Self {
        Self {
            hours: 0,
            mins: 0,
            secs: 0,
            mode: Mode::CountUp,
        }
    }

    /// One tick of automatic advance in the current mode.
    pub fn tick(&mut self) -> AlarmRequest {
        match self.mode {
            Mode::CountUp => {
                self.advance();
                AlarmRequest::Silence
            }
            Mode::CountDown => self.retreat(),
        }
    }

    /// Count-up step. Carries secs -> mins -> hours; at the hour limit the
    /// whole value silently wraps to zero.
    fn advance(&mut self) {
        self.secs += 1;
        if self.secs == 60 {
            self.secs = 0;
            self.mins += 1;
        }
        if self.mins == 60 {
            self.mins = 0;
            self.hours += 1;
        }
        if self.hours == Self::MAX_HOURS {
            self.hours = 0;
            self.mins = 0;
            self.secs = 0;
        }
    }

    /// Countdown step. Borrows hours -> mins -> secs; at zero the value
    /// stays put and the alarm is re-raised every tick.
    fn retreat(&mut self) -> AlarmRequest {
        if self.secs > 0 {
            self.secs -= 1;
        } else if self.mins > 0 {
            self.mins -= 1;
            self.secs = 59;
        } else if self.hours > 0 {
            self.hours -= 1;
            self.mins = 59;
            self.secs = 59;
        } else {
            return AlarmRequest::Raise;
        }
        AlarmRequest::Leave
    }

    /// Apply one manual adjustment unit. Decrements are a no-op at zero;
    /// increments rely on a later `normalize` pass to carry.
    pub fn nudge(&mut self, field: Field, direction: Direction) {
        let value = match field {
            Field::Hours => &mut self.hours,
            Field::Mins => &mut self.mins,
            Field::Secs => &mut self.secs,
        };
        match direction {
            Direction::Up => *value += 1,
            Direction::Down => {
                if *value > 0 {
                    *value -= 1;
                }
            }
        }
    }

    /// Carry pass run once after a round of manual adjustments, in either
    /// mode. Carries upward only; decrements never leave a field below
    /// zero, so there is nothing to borrow. The manual hour wrap leaves
    /// mins and secs untouched, unlike the tick-path wrap.
    pub fn normalize(&mut self) {
        if self.secs >= 60 {
            self.secs -= 60;
            self.mins += 1;
        }
        if self.mins >= 60 {
            self.mins -= 60;
            self.hours += 1;
        }
        if self.hours >= Self::MAX_HOURS {
            self.hours = 0;
        }
    }

    /// Zero the time value. Mode is untouched.
    pub fn reset(&mut self) {
        self.hours = 0;
        self.mins = 0;
        self.secs = 0;
    }

    /// Flip between count-up and countdown.
    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            Mode::CountUp => Mode::CountDown,
            Mode::CountDown => Mode::CountUp,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock_at(hours: u8, mins: u8, secs: u8, mode: Mode) -> ClockState {
        ClockState {
            hours,
            mins,
            secs,
            mode,
        }
    }

    #[test]
    fn count_up_advances_one_second() {
        let mut clock = clock_at(0, 0, 0, Mode::CountUp);
        assert_eq!(clock.tick(), AlarmRequest::Silence);
        assert_eq!((clock.hours, clock.mins, clock.secs), (0, 0, 1));
    }

    #[test]
    fn count_up_carries_through_minutes_and_hours() {
        let mut clock = clock_at(0, 59, 59, Mode::CountUp);
        clock.tick();
        assert_eq!((clock.hours, clock.mins, clock.secs), (1, 0, 0));
    }

    #[test]
    fn count_up_wraps_at_hundred_hours() {
        let mut clock = clock_at(99, 59, 59, Mode::CountUp);
        clock.tick();
        assert_eq!((clock.hours, clock.mins, clock.secs), (0, 0, 0));
    }

    #[test]
    fn countdown_decrements_one_second() {
        let mut clock = clock_at(5, 1, 5, Mode::CountDown);
        assert_eq!(clock.tick(), AlarmRequest::Leave);
        assert_eq!((clock.hours, clock.mins, clock.secs), (5, 1, 4));
    }

    #[test]
    fn countdown_borrows_from_minutes() {
        let mut clock = clock_at(5, 1, 0, Mode::CountDown);
        assert_eq!(clock.tick(), AlarmRequest::Leave);
        assert_eq!((clock.hours, clock.mins, clock.secs), (5, 0, 59));
    }

    #[test]
    fn countdown_borrows_from_hours() {
        let mut clock = clock_at(3, 0, 0, Mode::CountDown);
        clock.tick();
        assert_eq!((clock.hours, clock.mins, clock.secs), (2, 59, 59));
    }

    #[test]
    fn countdown_at_zero_raises_alarm_and_stays() {
        let mut clock = clock_at(0, 0, 0, Mode::CountDown);
        assert_eq!(clock.tick(), AlarmRequest::Raise);
        assert_eq!(clock.tick(), AlarmRequest::Raise);
        assert_eq!((clock.hours, clock.mins, clock.secs), (0, 0, 0));
    }

    #[test]
    fn countdown_never_clears_a_raised_alarm_by_itself() {
        let mut clock = clock_at(0, 0, 0, Mode::CountDown);
        assert_eq!(clock.tick(), AlarmRequest::Raise);
        clock.nudge(Field::Secs, Direction::Up);
        clock.normalize();
        assert_eq!(clock.tick(), AlarmRequest::Leave);
        assert_eq!((clock.hours, clock.mins, clock.secs), (0, 0, 0));
    }

    #[test]
    fn manual_increment_carries_after_normalize() {
        let mut clock = clock_at(0, 0, 59, Mode::CountUp);
        clock.nudge(Field::Secs, Direction::Up);
        clock.normalize();
        assert_eq!((clock.hours, clock.mins, clock.secs), (0, 1, 0));
    }

    #[test]
    fn manual_carry_runs_in_countdown_mode_too() {
        let mut clock = clock_at(0, 59, 59, Mode::CountDown);
        clock.nudge(Field::Secs, Direction::Up);
        clock.normalize();
        assert_eq!((clock.hours, clock.mins, clock.secs), (1, 0, 0));
    }

    #[test]
    fn manual_hour_wrap_keeps_minutes_and_seconds() {
        let mut clock = clock_at(99, 12, 34, Mode::CountUp);
        clock.nudge(Field::Hours, Direction::Up);
        clock.normalize();
        assert_eq!((clock.hours, clock.mins, clock.secs), (0, 12, 34));
    }

    #[test]
    fn manual_decrement_stops_at_zero() {
        let mut clock = clock_at(0, 0, 0, Mode::CountUp);
        clock.nudge(Field::Hours, Direction::Down);
        clock.nudge(Field::Mins, Direction::Down);
        clock.nudge(Field::Secs, Direction::Down);
        clock.normalize();
        assert_eq!((clock.hours, clock.mins, clock.secs), (0, 0, 0));
    }

    #[test]
    fn toggle_mode_keeps_the_time_value() {
        let mut clock = clock_at(7, 8, 9, Mode::CountUp);
        clock.toggle_mode();
        assert_eq!(clock.mode, Mode::CountDown);
        assert_eq!((clock.hours, clock.mins, clock.secs), (7, 8, 9));
        clock.toggle_mode();
        assert_eq!(clock.mode, Mode::CountUp);
    }

    #[test]
    fn reset_keeps_mode() {
        let mut clock = clock_at(12, 34, 56, Mode::CountDown);
        clock.reset();
        assert_eq!((clock.hours, clock.mins, clock.secs), (0, 0, 0));
        assert_eq!(clock.mode, Mode::CountDown);
    }

    #[test]
    fn fields_stay_in_range_over_many_ticks() {
        let mut clock = ClockState::new();
        // long enough to cross the 100 hour wraparound
        for _ in 0..400_000 {
            clock.tick();
            assert!(clock.secs < 60);
            assert!(clock.mins < 60);
            assert!(clock.hours < ClockState::MAX_HOURS);
        }
    }
}
