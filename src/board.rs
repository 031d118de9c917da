/// Hardware abstraction for supported boards.
///
/// Each board module defines pin assignments and capabilities
/// selected at compile time via feature flags.

#[cfg(feature = "board-cyd")]
mod hw {
    // ILI9341 on HSPI
    pub const DISPLAY_SCK_PIN: u8 = 14;
    pub const DISPLAY_MOSI_PIN: u8 = 13;
    pub const DISPLAY_MISO_PIN: u8 = 12;
    pub const DISPLAY_CS_PIN: u8 = 15;
    pub const DISPLAY_DC_PIN: u8 = 2;
    pub const BACKLIGHT_PIN: u8 = 21;
    pub const DISPLAY_SPI_FREQ_MHZ: u32 = 40;

    // XPT2046 on VSPI (non-default pins on this board)
    pub const TOUCH_CLK_PIN: u8 = 25;
    pub const TOUCH_MOSI_PIN: u8 = 32;
    pub const TOUCH_MISO_PIN: u8 = 39;
    pub const TOUCH_CS_PIN: u8 = 33;
    pub const TOUCH_IRQ_PIN: u8 = 36;
    pub const TOUCH_SPI_FREQ_MHZ: u32 = 2;

    pub const HAS_DISPLAY: bool = true;
    pub const HAS_TOUCH: bool = true;
    pub const BOARD_NAME: &str = "esp32_2432s028r";
}

#[cfg(not(feature = "board-cyd"))]
mod hw {
    pub const HAS_DISPLAY: bool = false;
    pub const HAS_TOUCH: bool = false;
    pub const BOARD_NAME: &str = "unknown";
}

pub use hw::*;
