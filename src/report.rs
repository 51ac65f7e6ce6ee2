use core::fmt::{self, Write};
use heapless::String;
use ufmt::uwrite;

use crate::config::{self, StationConfig};
use crate::reading::PhysicalReading;

/// Longest line is "-45.00\t100.00\n"
pub const LINE_CAPACITY: usize = 24;

/// First line on the serial port after boot
pub const BANNER: &str = "Reading raw data from registers...\n";

/// Writes one reading as `temperature\thumidity\n`, two decimals each
/// param sink: Serial port or any other text sink
/// param reading: Converted reading
pub fn present<W: Write>(sink: &mut W, reading: &PhysicalReading) -> fmt::Result {
    writeln!(
        sink,
        "{:.2}\t{:.2}",
        reading.temperature_celsius, reading.humidity_percent
    )
}

/// Same line as [`present`], as a string
pub fn format_reading(reading: &PhysicalReading) -> Result<String<LINE_CAPACITY>, fmt::Error> {
    let mut line = String::new();
    present(&mut line, reading)?;
    Ok(line)
}

/// Summary of the wiring and timing, shown once after [`BANNER`]
/// returns: e.g. "sht40 @ 0x44 on GP14/GP15, led GP18/GP19/GP20, every 30s\n"
pub fn startup_banner(config: &StationConfig) -> Result<String<80>, fmt::Error> {
    let mut line: String<80> = String::new();
    // ufmt has no hex, the address goes through core::fmt
    write!(line, "sht40 @ {:#04x}", config.sensor.address)?;
    uwrite!(
        &mut line,
        " on GP{}/GP{}, ",
        config::I2C_SDA_PIN,
        config::I2C_SCL_PIN
    )
    .map_err(|_| fmt::Error)?;
    if config.led_enabled {
        uwrite!(
            &mut line,
            "led GP{}/GP{}/GP{}, ",
            config::LED_PIN_BLUE,
            config::LED_PIN_GREEN,
            config::LED_PIN_RED
        )
        .map_err(|_| fmt::Error)?;
    } else {
        uwrite!(&mut line, "led off, ").map_err(|_| fmt::Error)?;
    }
    uwrite!(&mut line, "every {}s\n", config.report_interval_ms / 1000).map_err(|_| fmt::Error)?;
    Ok(line)
}

/// Parses a logged line back into a reading
/// Host-side capture tools prepend timestamp columns, so only the last two
/// whitespace separated fields are used.
/// param line: One line of the serial log
/// returns None for the banner or anything else that isn't a reading
pub fn parse_line(line: &str) -> Option<PhysicalReading> {
    let mut fields = line.split_whitespace().rev();
    let humidity_percent = fields.next()?.parse::<f64>().ok()?;
    let temperature_celsius = fields.next()?.parse::<f64>().ok()?;
    Some(PhysicalReading {
        temperature_celsius,
        humidity_percent,
    })
}
