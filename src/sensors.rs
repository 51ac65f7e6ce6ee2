use crc::{Crc, CRC_8_NRSC_5};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{Error as I2cError, ErrorKind, I2c};

use crate::reading::RawReading;

/// Default 7-bit address of the SHT40-AD1B
pub const SHT40_ADDRESS: u8 = 0x44;
/// I2C general call address; every device on the bus listens to it
pub const GENERAL_CALL_ADDRESS: u8 = 0x00;
/// Soft reset
pub const CMD_SOFT_RESET: u8 = 0x06;
/// Measure T & RH with high precision (high repeatability)
pub const CMD_MEASURE_HIGH_PRECISION: u8 = 0xFD;
/// High precision conversion takes 8.3ms max
pub const CONVERSION_DELAY_MS: u32 = 10;
/// Soft reset takes 1ms max
pub const RESET_DELAY_MS: u32 = 1;

// Sensirion CRC-8: poly 0x31, init 0xFF, no reflection, no final xor
const SENSIRION_CRC: Crc<u8> = Crc::<u8>::new(&CRC_8_NRSC_5);

/// SensorConfig describes how the driver talks to the sensor.
/// address: 7-bit bus address
/// conversion_delay_ms: Wait between the measure command and the read
/// validate_crc: Check the two CRC bytes of every frame
/// reset_via_general_call: Send the reset byte to the general call address
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorConfig {
    pub address: u8,
    pub conversion_delay_ms: u32,
    pub validate_crc: bool,
    pub reset_via_general_call: bool,
}

impl SensorConfig {
    pub const fn new() -> Self {
        Self {
            address: SHT40_ADDRESS,
            conversion_delay_ms: CONVERSION_DELAY_MS,
            validate_crc: false,
            reset_via_general_call: false,
        }
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Which half of the frame a CRC byte belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Word {
    Temperature,
    Humidity,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SensorError<E> {
    /// The I2C transaction failed
    Bus(E),
    /// A CRC byte did not match its data word
    ChecksumMismatch { word: Word, expected: u8, found: u8 },
}

/// Coarse classification of a [`SensorError`], loggable without knowing the HAL
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorErrorKind {
    BusNack,
    Bus,
    ChecksumMismatch,
}

impl<E: I2cError> SensorError<E> {
    pub fn kind(&self) -> SensorErrorKind {
        match self {
            SensorError::Bus(e) => match e.kind() {
                ErrorKind::NoAcknowledge(_) => SensorErrorKind::BusNack,
                _ => SensorErrorKind::Bus,
            },
            SensorError::ChecksumMismatch { .. } => SensorErrorKind::ChecksumMismatch,
        }
    }
}

impl<E> From<E> for SensorError<E> {
    fn from(value: E) -> Self {
        SensorError::Bus(value)
    }
}

/// Blocking SHT40 driver.
///
/// Owns the bus and the delay used to wait out a conversion, so tests can hand
/// in mocks for both.
pub struct Sht40<I, D> {
    i2c: I,
    delay: D,
    config: SensorConfig,
}

impl<I, D, E> Sht40<I, D>
where
    I: I2c<Error = E>,
    D: DelayNs,
{
    pub fn new(i2c: I, delay: D, config: SensorConfig) -> Self {
        Self { i2c, delay, config }
    }

    /// Gives back the bus and the delay
    pub fn release(self) -> (I, D) {
        (self.i2c, self.delay)
    }

    /// Puts the sensor into a known state
    /// Waits out the reset time so the next command is not NACKed
    pub fn reset(&mut self) -> Result<(), SensorError<E>> {
        let address = if self.config.reset_via_general_call {
            GENERAL_CALL_ADDRESS
        } else {
            self.config.address
        };
        self.i2c.write(address, &[CMD_SOFT_RESET])?;
        self.delay.delay_ms(RESET_DELAY_MS);
        Ok(())
    }

    /// Runs one high precision measurement
    /// returns the temperature and humidity ticks
    pub fn read_raw(&mut self) -> Result<RawReading, SensorError<E>> {
        let mut buffer = [0u8; 6];

        self.i2c
            .write(self.config.address, &[CMD_MEASURE_HIGH_PRECISION])?;
        self.delay.delay_ms(self.config.conversion_delay_ms);
        self.i2c.read(self.config.address, &mut buffer)?;

        debug!("sht40 frame: {:x}", buffer);

        if self.config.validate_crc {
            check_word::<E>(Word::Temperature, &buffer[0..3])?;
            check_word::<E>(Word::Humidity, &buffer[3..6])?;
        }

        Ok(RawReading::new(
            u16::from_be_bytes([buffer[0], buffer[1]]),
            u16::from_be_bytes([buffer[3], buffer[4]]),
        ))
    }
}

/// Sensirion CRC-8 of one data word
pub fn crc8(data: &[u8]) -> u8 {
    SENSIRION_CRC.checksum(data)
}

/// Checks a [msb, lsb, crc] triple
fn check_word<E>(word: Word, chunk: &[u8]) -> Result<(), SensorError<E>> {
    let expected = crc8(&chunk[0..2]);
    let found = chunk[2];
    if expected == found {
        Ok(())
    } else {
        Err(SensorError::ChecksumMismatch {
            word,
            expected,
            found,
        })
    }
}
