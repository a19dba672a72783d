//! Countdown for timed row injection
//!
//! The countdown is a plain value advanced by [`Countdown::tick`]; whoever owns
//! the session decides how often a tick happens. A disarmed countdown never
//! expires.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    duration: u32,
    remaining: u32,
    armed: bool,
}

impl Countdown {
    /// Create a disarmed countdown of `duration` ticks
    pub fn new(duration: u32) -> Self {
        Self {
            duration,
            remaining: duration,
            armed: false,
        }
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Ticks left before expiry, `None` while disarmed
    pub fn remaining(&self) -> Option<u32> {
        self.armed.then_some(self.remaining)
    }

    /// Arm at the full duration
    pub fn reset(&mut self) {
        self.remaining = self.duration;
        self.armed = true;
    }

    /// Disarm; nothing fires until the next `reset`
    pub fn cancel(&mut self) {
        self.remaining = self.duration;
        self.armed = false;
    }

    /// Advance one time unit. Returns true exactly when the countdown expires.
    ///
    /// An expired countdown stays at zero until it is reset.
    pub fn tick(&mut self) -> bool {
        if !self.armed || self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        self.remaining == 0
    }
}
