//! The sampling loop: read, convert, classify, light, report, wait.

use core::fmt::{self, Write};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::i2c::I2c;

use crate::config::StationConfig;
use crate::indicator::{classify, Indicator};
use crate::reading::{convert, PhysicalReading};
use crate::report::{self, present};
use crate::sensors::{SensorError, Sht40};
use crate::timer::CountDownTimer;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StationError<SE, PE> {
    Sensor(SensorError<SE>),
    Indicator(PE),
    Report(fmt::Error),
}

impl<SE, PE> From<SensorError<SE>> for StationError<SE, PE> {
    fn from(value: SensorError<SE>) -> Self {
        StationError::Sensor(value)
    }
}

impl<SE, PE> From<fmt::Error> for StationError<SE, PE> {
    fn from(value: fmt::Error) -> Self {
        StationError::Report(value)
    }
}

/// Everything one cycle touches, owned in one place.
///
/// `I`/`SD` are the sensor bus and its conversion delay, `B`/`G`/`R` the LED
/// lines, `W` the text sink and `D` the delay used between readings.
pub struct Station<I, SD, B, G, R, W, D> {
    sensor: Sht40<I, SD>,
    indicator: Indicator<B, G, R>,
    sink: W,
    delay: D,
    config: StationConfig,
}

impl<I, SD, B, G, R, W, D, SE, PE> Station<I, SD, B, G, R, W, D>
where
    I: I2c<Error = SE>,
    SD: DelayNs,
    B: OutputPin<Error = PE>,
    G: OutputPin<Error = PE>,
    R: OutputPin<Error = PE>,
    W: Write,
    D: DelayNs,
{
    pub fn new(
        sensor: Sht40<I, SD>,
        indicator: Indicator<B, G, R>,
        sink: W,
        delay: D,
        config: StationConfig,
    ) -> Self {
        Self {
            sensor,
            indicator,
            sink,
            delay,
            config,
        }
    }

    pub fn sink(&self) -> &W {
        &self.sink
    }

    /// Gives back the driver, the LED, the sink and the delay
    pub fn release(self) -> (Sht40<I, SD>, Indicator<B, G, R>, W, D) {
        (self.sensor, self.indicator, self.sink, self.delay)
    }

    /// One-time setup: banner, LEDs off, sensor reset
    /// A failed reset is only logged; the first read will show whether the
    /// sensor is there.
    pub fn start(&mut self) -> Result<(), StationError<SE, PE>> {
        self.sink.write_str(report::BANNER)?;
        let summary = report::startup_banner(&self.config)?;
        self.sink.write_str(&summary)?;

        if self.config.led_enabled {
            self.indicator.off().map_err(StationError::Indicator)?;
        }

        if self.sensor.reset().is_err() {
            warn!("sht40 reset failed");
        }
        Ok(())
    }

    /// Reads, converts, lights the LED and reports one reading
    pub fn poll_once(&mut self) -> Result<PhysicalReading, StationError<SE, PE>> {
        let raw = self.sensor.read_raw()?;
        let reading = convert(raw);
        let state = classify(reading.temperature_celsius);

        debug!("raw {}, band {}", raw, state);

        if self.config.led_enabled {
            self.indicator.show(state).map_err(StationError::Indicator)?;
        }
        present(&mut self.sink, &reading)?;

        info!(
            "T: {=f64} C, RH: {=f64} %",
            reading.temperature_celsius, reading.humidity_percent
        );
        Ok(reading)
    }

    /// Polls every `report_interval_ms` until `stop` returns true
    /// A failed cycle is logged and skipped; the loop carries on.
    /// param stop: Checked between ticks of the wait; never true on the device
    pub fn run_until<F>(&mut self, mut stop: F)
    where
        SE: embedded_hal::i2c::Error,
        F: FnMut() -> bool,
    {
        let tick_ms = self.config.effective_tick_ms();
        let mut timer = CountDownTimer::new(0);

        loop {
            if stop() {
                break;
            }

            if let Err(e) = self.poll_once() {
                match e {
                    StationError::Sensor(e) => warn!("sensor read failed: {}", e.kind()),
                    StationError::Indicator(_) => warn!("led update failed"),
                    StationError::Report(_) => warn!("serial write failed"),
                }
            }

            timer.set_time(self.config.report_interval_ms);
            if !timer.wait(&mut self.delay, tick_ms, &mut stop) {
                break;
            }
        }
        info!("station stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicator::LedPins;
    use crate::sensors::{SensorConfig, CMD_MEASURE_HIGH_PRECISION, CMD_SOFT_RESET, SHT40_ADDRESS};
    use crate::timer::tests::RecordingDelay;
    use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction as PinTransaction};
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    type TestStation =
        Station<I2cMock, NoopDelay, PinMock, PinMock, PinMock, String, RecordingDelay>;

    fn measure(frame: [u8; 6]) -> [I2cTransaction; 2] {
        [
            I2cTransaction::write(SHT40_ADDRESS, vec![CMD_MEASURE_HIGH_PRECISION]),
            I2cTransaction::read(SHT40_ADDRESS, frame.to_vec()),
        ]
    }

    fn station(i2c: &I2cMock, pins: &[PinMock; 3], config: StationConfig) -> TestStation {
        let sensor = Sht40::new(i2c.clone(), NoopDelay::new(), config.sensor);
        let indicator = Indicator::new(LedPins {
            blue: pins[0].clone(),
            green: pins[1].clone(),
            red: pins[2].clone(),
        });
        Station::new(
            sensor,
            indicator,
            String::new(),
            RecordingDelay::default(),
            config,
        )
    }

    fn set(states: &[State]) -> Vec<PinTransaction> {
        states.iter().map(|s| PinTransaction::set(*s)).collect()
    }

    fn done(i2c: &mut I2cMock, pins: &mut [PinMock; 3]) {
        i2c.done();
        for pin in pins.iter_mut() {
            pin.done();
        }
    }

    #[test]
    fn test_start_resets_and_clears_leds() {
        let mut i2c = I2cMock::new(&[I2cTransaction::write(SHT40_ADDRESS, vec![CMD_SOFT_RESET])]);
        let mut pins = [
            PinMock::new(&set(&[State::Low])),
            PinMock::new(&set(&[State::Low])),
            PinMock::new(&set(&[State::Low])),
        ];
        let mut station = station(&i2c, &pins, StationConfig::default());

        station.start().unwrap();
        assert!(station.sink().starts_with(report::BANNER));
        assert!(station.sink().ends_with("every 30s\n"));
        done(&mut i2c, &mut pins);
    }

    #[test]
    fn test_start_survives_missing_sensor() {
        let nack = ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address);
        let mut i2c = I2cMock::new(&[
            I2cTransaction::write(SHT40_ADDRESS, vec![CMD_SOFT_RESET]).with_error(nack),
        ]);
        let mut pins = [PinMock::new(&[]), PinMock::new(&[]), PinMock::new(&[])];
        let config = StationConfig {
            led_enabled: false,
            ..StationConfig::default()
        };
        let mut station = station(&i2c, &pins, config);

        assert!(station.start().is_ok());
        done(&mut i2c, &mut pins);
    }

    #[test]
    fn test_poll_once_full_cycle() {
        // 0x6666 -> 25.00 C (Hot), 0x8000 -> 56.50 %
        let mut i2c = I2cMock::new(&measure([0x66, 0x66, 0x00, 0x80, 0x00, 0x00]));
        let mut pins = [
            PinMock::new(&set(&[State::Low])),
            PinMock::new(&set(&[State::Low])),
            PinMock::new(&set(&[State::High])),
        ];
        let mut station = station(&i2c, &pins, StationConfig::default());

        let reading = station.poll_once().unwrap();
        assert!((reading.temperature_celsius - 25.0).abs() < 1e-9);
        assert_eq!(station.sink().as_str(), "25.00\t56.50\n");
        done(&mut i2c, &mut pins);
    }

    #[test]
    fn test_poll_once_without_leds() {
        let mut i2c = I2cMock::new(&measure([0x00, 0x00, 0x00, 0x00, 0x00, 0x00]));
        let mut pins = [PinMock::new(&[]), PinMock::new(&[]), PinMock::new(&[])];
        let config = StationConfig {
            led_enabled: false,
            ..StationConfig::default()
        };
        let mut station = station(&i2c, &pins, config);

        station.poll_once().unwrap();
        assert_eq!(station.sink().as_str(), "-45.00\t0.00\n");
        done(&mut i2c, &mut pins);
    }

    #[test]
    fn test_poll_once_crc_failure_reports_nothing() {
        let mut i2c = I2cMock::new(&measure([0xBE, 0xEF, 0x00, 0xBE, 0xEF, 0x92]));
        let mut pins = [PinMock::new(&[]), PinMock::new(&[]), PinMock::new(&[])];
        let config = StationConfig {
            sensor: SensorConfig {
                validate_crc: true,
                ..SensorConfig::default()
            },
            ..StationConfig::default()
        };
        let mut station = station(&i2c, &pins, config);

        let err = station.poll_once().unwrap_err();
        assert!(matches!(
            err,
            StationError::Sensor(SensorError::ChecksumMismatch { .. })
        ));
        assert!(station.sink().is_empty());
        done(&mut i2c, &mut pins);
    }

    #[test]
    fn test_run_until_waits_between_readings() {
        let mut expectations = Vec::new();
        expectations.extend(measure([0x66, 0x66, 0x00, 0x80, 0x00, 0x00]));
        expectations.extend(measure([0x00, 0x00, 0x00, 0x00, 0x00, 0x00]));
        let mut i2c = I2cMock::new(&expectations);
        let mut pins = [PinMock::new(&[]), PinMock::new(&[]), PinMock::new(&[])];
        let config = StationConfig {
            led_enabled: false,
            ..StationConfig::default()
        };
        let mut station = station(&i2c, &pins, config);

        // Stop right after the second reading: 1 check before the first poll,
        // 30 during the first wait, 1 before the second poll, 1 at the start
        // of the second wait.
        let mut checks = 0;
        station.run_until(|| {
            checks += 1;
            checks > 32
        });

        assert_eq!(station.sink().as_str(), "25.00\t56.50\n-45.00\t0.00\n");
        let (_, _, _, delay) = station.release();
        assert_eq!(delay.waits_ms, vec![1_000; 30]);
        done(&mut i2c, &mut pins);
    }

    #[test]
    fn test_run_until_keeps_going_after_bus_error() {
        let nack = ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address);
        let mut expectations = vec![
            I2cTransaction::write(SHT40_ADDRESS, vec![CMD_MEASURE_HIGH_PRECISION]).with_error(nack),
        ];
        expectations.extend(measure([0x66, 0x66, 0x00, 0x80, 0x00, 0x00]));
        let mut i2c = I2cMock::new(&expectations);
        let mut pins = [PinMock::new(&[]), PinMock::new(&[]), PinMock::new(&[])];
        let config = StationConfig {
            led_enabled: false,
            report_interval_ms: 2_000,
            ..StationConfig::default()
        };
        let mut station = station(&i2c, &pins, config);

        // 1 + 2 ticks + 1, then stop at the first check of the second wait
        let mut checks = 0;
        station.run_until(|| {
            checks += 1;
            checks > 4
        });

        assert_eq!(station.sink().as_str(), "25.00\t56.50\n");
        done(&mut i2c, &mut pins);
    }

    #[test]
    fn test_run_until_stops_before_first_poll() {
        let mut i2c = I2cMock::new(&[]);
        let mut pins = [PinMock::new(&[]), PinMock::new(&[]), PinMock::new(&[])];
        let mut station = station(&i2c, &pins, StationConfig::default());

        station.run_until(|| true);
        assert!(station.sink().is_empty());
        done(&mut i2c, &mut pins);
    }

    #[test]
    fn test_same_ticks_same_output() {
        let frame = [0x5A, 0x10, 0x00, 0x71, 0x22, 0x00];
        let mut expectations = Vec::new();
        expectations.extend(measure(frame));
        expectations.extend(measure(frame));
        let mut i2c = I2cMock::new(&expectations);
        let mut pins = [PinMock::new(&[]), PinMock::new(&[]), PinMock::new(&[])];
        let config = StationConfig {
            led_enabled: false,
            ..StationConfig::default()
        };
        let mut station = station(&i2c, &pins, config);

        let first = station.poll_once().unwrap();
        let second = station.poll_once().unwrap();
        assert_eq!(first, second);
        let (first_line, second_line) = station.sink().split_at(station.sink().len() / 2);
        assert_eq!(first_line, second_line);
        done(&mut i2c, &mut pins);
    }
}
