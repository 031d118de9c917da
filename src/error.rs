//! Unified error type for the monitor.
//!
//! All variants are fieldless so the enum stays `Copy` and never allocates.
//! Driver failures are logged at the call site and otherwise ignored; the
//! next tick retries implicitly.

use core::fmt;

/// Top-level error type used across the library and firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // Radio
    /// Scan parameters were rejected by the radio.
    RadioConfigure,

    /// The radio could not begin scanning.
    RadioStart,

    /// The radio could not be stopped.
    RadioStop,

    /// The radio command queue is full.
    RadioBusy,

    // UI / Display
    /// A draw call to the display failed.
    Display,

    // Input
    /// Text did not parse as a six-octet MAC address.
    InvalidAddress,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Error::RadioConfigure => "radio rejected scan parameters",
            Error::RadioStart => "radio failed to start scanning",
            Error::RadioStop => "radio failed to stop scanning",
            Error::RadioBusy => "radio command queue full",
            Error::Display => "display draw failed",
            Error::InvalidAddress => "invalid MAC address",
        };
        f.write_str(msg)
    }
}
