/// XPT2046 resistive touch controller over `embedded-hal` SPI.
///
/// Conversions are 12-bit, read as the top bits of a 16-bit response to
/// each control byte. Pressure is derived from the two Z plates; a touch
/// counts once it exceeds [`PRESSURE_THRESHOLD`].

use embedded_hal::spi::SpiDevice;

use blemonitor::input::{RawPoint, TouchPanel};

/// Minimum pressure reading treated as a touch
pub const PRESSURE_THRESHOLD: u16 = 400;

// Control bytes: start bit, channel, 12-bit differential, ADC on
const CMD_X: u8 = 0x91;
const CMD_Y: u8 = 0xD1;
const CMD_Z1: u8 = 0xB1;
const CMD_Z2: u8 = 0xC1;
// Same Y channel with power-down bits cleared, leaves PENIRQ armed
const CMD_IDLE: u8 = 0xD0;

/// Conversions averaged per axis
const SAMPLES: u32 = 3;

pub struct Xpt2046<SPI> {
    spi: SPI,
}

impl<SPI: SpiDevice> Xpt2046<SPI> {
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// One 12-bit conversion; 0 on a bus error.
    fn read(&mut self, cmd: u8) -> u16 {
        let mut buf = [cmd, 0, 0];
        match self.spi.transfer_in_place(&mut buf) {
            Ok(()) => (u16::from_be_bytes([buf[1], buf[2]]) >> 3) & 0x0FFF,
            Err(_) => {
                log::trace!("touch SPI transfer failed");
                0
            }
        }
    }

    fn average(&mut self, cmd: u8) -> u16 {
        let sum: u32 = (0..SAMPLES).map(|_| u32::from(self.read(cmd))).sum();
        (sum / SAMPLES) as u16
    }

    fn idle(&mut self) {
        let _ = self.read(CMD_IDLE);
    }

    /// Plate pressure; larger means firmer.
    pub fn pressure(&mut self) -> u16 {
        let z1 = self.read(CMD_Z1);
        let z2 = self.read(CMD_Z2);
        self.idle();
        (z1 + 4095).saturating_sub(z2)
    }
}

impl<SPI: SpiDevice> TouchPanel for Xpt2046<SPI> {
    fn touched(&mut self) -> bool {
        self.pressure() > PRESSURE_THRESHOLD
    }

    fn point(&mut self) -> RawPoint {
        let x = self.average(CMD_X);
        let y = self.average(CMD_Y);
        self.idle();
        RawPoint { x, y }
    }
}
