#![cfg_attr(not(test), no_std)]

//! IR remote actuator controller
//!
//! Hardware independent core of the firmware: the command mapping, the
//! actuator state machine shared by the LED dimmer and the ESC throttle,
//! the polling scheduler and the safety interlocks layered on top.
//!
//! The RP2350 firmware in `main.rs` plugs an IR receiver and the PWM
//! peripheral into the traits exposed here.

#[macro_use]
mod log;

/// Actuator control core
pub mod system;

pub use log::LogFormat;
