//! Core system components for actuator control
//!
//! Everything here is hardware independent; the firmware binary supplies an
//! [`output::OutputDriver`] and a [`decoder::CommandDecoder`].
pub mod actuator;
pub mod arming;
pub mod command;
pub mod config;
pub mod control;
pub mod decoder;
pub mod event;
pub mod led;
pub mod machine;
#[cfg(test)]
mod mock;
pub mod motor;
pub mod output;
pub mod pwm;
pub mod scheduler;
pub mod timing;
