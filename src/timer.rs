use embedded_hal::delay::DelayNs;

/// Counts down the time left until the next reading
pub struct CountDownTimer {
    target_ms: u32,
}

impl CountDownTimer {
    pub fn new(target_ms: u32) -> CountDownTimer {
        Self { target_ms }
    }

    /// Takes `elapsed_ms` off the remaining time
    pub fn tick(&mut self, elapsed_ms: u32) {
        self.target_ms = self.target_ms.saturating_sub(elapsed_ms);
    }

    pub fn set_time(&mut self, ms: u32) {
        self.target_ms = ms;
    }

    pub fn is_finished(&self) -> bool {
        self.target_ms == 0
    }

    /// Blocks until the timer runs out, one tick at a time
    /// Checks `stop` before every tick.
    /// param delay: Blocking delay
    /// param tick_ms: Longest single wait
    /// param stop: Returns true once the caller wants to quit
    /// returns false if it was stopped before the time ran out
    pub fn wait<D, F>(&mut self, delay: &mut D, tick_ms: u32, stop: &mut F) -> bool
    where
        D: DelayNs,
        F: FnMut() -> bool,
    {
        let tick_ms = tick_ms.max(1);
        while !self.is_finished() {
            if stop() {
                return false;
            }
            let step = self.target_ms.min(tick_ms);
            delay.delay_ms(step);
            self.tick(step);
        }
        true
    }
}
