/// Display driver for the ESP32-2432S028R (ILI9341, 320x240, SPI).
///
/// No framebuffer: the monitor paints straight to the panel through
/// `embedded-graphics`, so only a small SPI staging buffer is needed.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_hal_bus::spi::ExclusiveDevice;
use esp_hal::delay::Delay;
use esp_hal::gpio::{Level, Output, OutputConfig};
use esp_hal::spi::master::{Config as SpiConfig, Spi};
use esp_hal::spi::Mode;
use esp_hal::time::Rate;
use mipidsi::interface::SpiInterface;
use mipidsi::models::ILI9341Rgb565;
use mipidsi::options::{ColorOrder, Orientation, Rotation};
use mipidsi::Builder;
use static_cell::StaticCell;

use crate::board;

/// SPI staging buffer for pixel writes
static SPI_BUFFER: StaticCell<[u8; 512]> = StaticCell::new();

/// Bring up the panel in landscape and return it as a draw target.
///
/// Panics if the SPI bus or the controller fails to initialise; there is
/// nothing useful the device can do without a screen.
pub fn init(
    spi2: esp_hal::peripherals::SPI2<'static>,
    sck: esp_hal::peripherals::GPIO14<'static>,
    mosi: esp_hal::peripherals::GPIO13<'static>,
    miso: esp_hal::peripherals::GPIO12<'static>,
    cs_pin: esp_hal::peripherals::GPIO15<'static>,
    dc_pin: esp_hal::peripherals::GPIO2<'static>,
) -> impl DrawTarget<Color = Rgb565> {
    // Configure SPI bus (Mode 0)
    let spi_config = SpiConfig::default()
        .with_frequency(Rate::from_mhz(board::DISPLAY_SPI_FREQ_MHZ))
        .with_mode(Mode::_0);
    let spi = Spi::new(spi2, spi_config)
        .expect("display SPI init failed")
        .with_sck(sck)
        .with_mosi(mosi)
        .with_miso(miso);

    let cs = Output::new(cs_pin, Level::High, OutputConfig::default());
    let spi_device = ExclusiveDevice::new_no_delay(spi, cs).expect("display CS init failed");

    let dc = Output::new(dc_pin, Level::Low, OutputConfig::default());
    let buffer = SPI_BUFFER.init([0u8; 512]);
    let di = SpiInterface::new(spi_device, dc, buffer);

    // Reset line is tied to EN on this board
    let mut delay = Delay::new();
    let display = Builder::new(ILI9341Rgb565, di)
        .display_size(240, 320)
        .color_order(ColorOrder::Bgr)
        .orientation(Orientation::new().rotate(Rotation::Deg90))
        .init(&mut delay)
        .expect("ILI9341 init failed");

    log::info!("Display initialized (320x240 landscape)");
    display
}
