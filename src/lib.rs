//! BLE proximity monitor: portable scan, classify and alert engine.
//!
//! Everything in this crate is platform independent and testable on the
//! host with `cargo test`. The firmware binary (`src/main.rs`) supplies the
//! radio, the display and the touch panel through the [`scanner::Radio`],
//! `embedded_graphics::DrawTarget` and [`input::TouchPanel`] seams and
//! calls [`monitor::Monitor::tick`] every few milliseconds.
//!
//! Data flows one way: radio reports become [`scanner::Observation`]s, the
//! [`registry::Registry`] classifies them against what it has seen before,
//! and the [`ui`] renders the registry, the [`history`] rings and the
//! [`shields`] state. Sets and display lines grow with the number of
//! devices seen, so the crate needs `alloc`.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod board;
pub mod defaults;
pub mod error;
pub mod history;
pub mod input;
pub mod monitor;
pub mod oui;
pub mod protocol;
pub mod registry;
pub mod scanner;
pub mod shields;
pub mod ui;
