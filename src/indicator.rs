use embedded_hal::digital::{OutputPin, PinState};

/// Temperature bands shown on the tri-color LED.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedState {
    /// Below 20 C
    Cold,
    /// 20 C up to, not including, 21 C
    CoolLow,
    /// 21 C to 22 C inclusive
    CoolHigh,
    /// Above 22 C up to 23 C inclusive
    WarmHigh,
    /// Above 23 C
    Hot,
}

impl LedState {
    /// (blue, green, red), active high
    pub const fn colors(self) -> (bool, bool, bool) {
        match self {
            LedState::Cold => (true, false, false),
            LedState::CoolLow => (true, true, false),
            LedState::CoolHigh => (false, true, false),
            LedState::WarmHigh => (false, true, true),
            LedState::Hot => (false, false, true),
        }
    }
}

/// Maps a temperature onto its LED band.
/// Exactly 22.0 is CoolHigh, exactly 23.0 is WarmHigh.
pub fn classify(temperature_celsius: f64) -> LedState {
    let t = temperature_celsius;
    if (20.0..21.0).contains(&t) {
        LedState::CoolLow
    } else if (21.0..=22.0).contains(&t) {
        LedState::CoolHigh
    } else if t > 22.0 && t <= 23.0 {
        LedState::WarmHigh
    } else if t > 23.0 {
        LedState::Hot
    } else {
        LedState::Cold
    }
}

/// The three LED lines, handed to [`Indicator::new`]
pub struct LedPins<B, G, R> {
    pub blue: B,
    pub green: G,
    pub red: R,
}

/// Drives an RGB LED from a [`LedState`]
pub struct Indicator<B, G, R> {
    pins: LedPins<B, G, R>,
}

impl<B, G, R, E> Indicator<B, G, R>
where
    B: OutputPin<Error = E>,
    G: OutputPin<Error = E>,
    R: OutputPin<Error = E>,
{
    pub fn new(pins: LedPins<B, G, R>) -> Self {
        Self { pins }
    }

    pub fn release(self) -> LedPins<B, G, R> {
        self.pins
    }

    /// Lights the colors for the given band
    pub fn show(&mut self, state: LedState) -> Result<(), E> {
        let (blue, green, red) = state.colors();
        self.set(blue, green, red)
    }

    /// Turns every color off
    pub fn off(&mut self) -> Result<(), E> {
        self.set(false, false, false)
    }

    fn set(&mut self, blue: bool, green: bool, red: bool) -> Result<(), E> {
        self.pins.blue.set_state(PinState::from(blue))?;
        self.pins.green.set_state(PinState::from(green))?;
        self.pins.red.set_state(PinState::from(red))
    }
}
