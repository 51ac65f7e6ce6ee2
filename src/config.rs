use crate::sensors::SensorConfig;

/// I2C1 data line
pub const I2C_SDA_PIN: u8 = 14;
/// I2C1 clock line
pub const I2C_SCL_PIN: u8 = 15;
pub const I2C_FREQUENCY_HZ: u32 = 400_000;

pub const LED_PIN_BLUE: u8 = 18;
pub const LED_PIN_GREEN: u8 = 19;
pub const LED_PIN_RED: u8 = 20;

/// UART0 on GP0 (TX) / GP1 (RX) for the readings
pub const UART_BAUD: u32 = 115_200;

pub const REPORT_INTERVAL_MS: u32 = 30_000;
pub const TICK_MS: u32 = 1_000;

/// StationConfig defines how the station samples and reports.
/// sensor: Bus address and measurement options for the SHT40
/// report_interval_ms: Time between two readings
/// tick_ms: Granularity at which a stop request is noticed while waiting
/// led_enabled: Whether the tri-color LED is driven at all
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StationConfig {
    pub sensor: SensorConfig,
    pub report_interval_ms: u32,
    pub tick_ms: u32,
    pub led_enabled: bool,
}

impl Default for StationConfig {
    fn default() -> Self {
        StationConfig {
            sensor: SensorConfig::default(),
            report_interval_ms: REPORT_INTERVAL_MS, // One reading every 30 seconds
            tick_ms: TICK_MS,
            led_enabled: true,
        }
    }
}

impl StationConfig {
    /// Tick length actually used by the scheduler
    /// A zero tick would never advance, so it is raised to 1ms and capped
    /// at the interval.
    pub fn effective_tick_ms(&self) -> u32 {
        self.tick_ms.clamp(1, self.report_interval_ms.max(1))
    }
}
