//! Raw sensor ticks and their conversion to physical units.

/// Full scale of the sensor's 16-bit ratiometric output.
const FULL_SCALE: f64 = 65535.0;

/// One measurement frame as read off the bus, before conversion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawReading {
    pub temperature_ticks: u16,
    pub humidity_ticks: u16,
}

impl RawReading {
    pub const fn new(temperature_ticks: u16, humidity_ticks: u16) -> Self {
        Self {
            temperature_ticks,
            humidity_ticks,
        }
    }
}

/// A converted reading.
/// temperature_celsius: Temperature in degrees Celsius
/// humidity_percent: Relative humidity, always within 0..=100
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhysicalReading {
    pub temperature_celsius: f64,
    pub humidity_percent: f64,
}

/// Converts raw ticks with the SHT4x datasheet formulas
/// param raw: Frame from the sensor
/// returns the reading with humidity clamped to 0..=100
pub fn convert(raw: RawReading) -> PhysicalReading {
    PhysicalReading {
        temperature_celsius: ticks_to_celsius(raw.temperature_ticks),
        humidity_percent: ticks_to_humidity(raw.humidity_ticks),
    }
}

/// T = -45 + 175 * ticks / 65535
pub fn ticks_to_celsius(ticks: u16) -> f64 {
    -45.0 + f64::from(175 * u32::from(ticks)) / FULL_SCALE
}

/// RH = -6 + 125 * ticks / 65535, clamped
pub fn ticks_to_humidity(ticks: u16) -> f64 {
    let humidity = -6.0 + f64::from(125 * u32::from(ticks)) / FULL_SCALE;
    humidity.clamp(0.0, 100.0)
}
