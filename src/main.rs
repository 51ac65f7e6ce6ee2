#![no_std]
#![no_main]

use bsp::entry;
use defmt::*;
use defmt_rtt as _;
use panic_probe as _;

// Provide an alias for our BSP so we can switch targets quickly.
// Uncomment the BSP you included in Cargo.toml, the rest of the code does not need to change.
use rp_pico as bsp;

use bsp::hal::{
    clocks::{init_clocks_and_plls, Clock},
    fugit::RateExtU32,
    gpio::{FunctionI2C, FunctionUart, Pin, PullUp},
    pac,
    uart::{DataBits, StopBits, UartConfig, UartPeripheral},
    watchdog::Watchdog,
    Sio, Timer, I2C,
};
use pico_weather::config::{self, StationConfig};
use pico_weather::indicator::{Indicator, LedPins};
use pico_weather::sensors::Sht40;
use pico_weather::station::Station;

#[entry]
fn main() -> ! {
    info!("pico-weather starting");
    // Grab our singleton objects
    let mut pac = pac::Peripherals::take().unwrap();

    // Set up the watchdog driver - needed by the clock setup code
    let mut watchdog = Watchdog::new(pac.WATCHDOG);

    // Configure the clocks
    //
    // The default is to generate a 125 MHz system clock
    let clocks = init_clocks_and_plls(
        bsp::XOSC_CRYSTAL_FREQ,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .ok()
    .unwrap();

    // The single-cycle I/O block controls our GPIO pins
    let sio = Sio::new(pac.SIO);

    // Set the pins up according to their function on this particular board
    let pins = bsp::Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );

    let station_config = StationConfig::default();

    // Timer is Copy: one for the sensor's conversion wait, one for the interval
    let timer = Timer::new(pac.TIMER, &mut pac.RESETS, &clocks);

    // Serial output on UART0, GP0 (TX) / GP1 (RX)
    let uart_pins = (
        pins.gpio0.into_function::<FunctionUart>(),
        pins.gpio1.into_function::<FunctionUart>(),
    );
    let uart = UartPeripheral::new(pac.UART0, uart_pins, &mut pac.RESETS)
        .enable(
            UartConfig::new(
                config::UART_BAUD.Hz(),
                DataBits::Eight,
                None,
                StopBits::One,
            ),
            clocks.peripheral_clock.freq(),
        )
        .unwrap();

    // SHT40 on I2C1, GP14 (SDA) / GP15 (SCL)
    let sda_pin: Pin<_, FunctionI2C, PullUp> = pins.gpio14.reconfigure(); // config::I2C_SDA_PIN
    let scl_pin: Pin<_, FunctionI2C, PullUp> = pins.gpio15.reconfigure(); // config::I2C_SCL_PIN
    let i2c = I2C::i2c1(
        pac.I2C1,
        sda_pin,
        scl_pin,
        config::I2C_FREQUENCY_HZ.Hz(),
        &mut pac.RESETS,
        &clocks.system_clock,
    );
    let sensor = Sht40::new(i2c, timer, station_config.sensor);

    // Tri-color LED on GP18 (blue), GP19 (green), GP20 (red)
    let indicator = Indicator::new(LedPins {
        blue: pins.gpio18.into_push_pull_output(),  // config::LED_PIN_BLUE
        green: pins.gpio19.into_push_pull_output(), // config::LED_PIN_GREEN
        red: pins.gpio20.into_push_pull_output(),   // config::LED_PIN_RED
    });

    let mut station = Station::new(sensor, indicator, uart, timer, station_config);

    if station.start().is_err() {
        error!("startup output failed");
    }

    info!(
        "pico-weather ready, reporting every {=u32} ms",
        station_config.report_interval_ms
    );

    // Runs until power-off
    station.run_until(|| false);

    loop {
        cortex_m::asm::wfi();
    }
}
