//! LED dimmer
//!
//! Off, solid on, blinking at a preset rate, or free PWM with adjustable
//! frequency and duty. Any frequency or duty adjustment means "raw PWM from
//! now on" and switches to [`LedMode::PwmCustom`] whatever the LED was doing.

use super::actuator::Actuator;
use super::command::Command;
use super::config::{LedConfig, BLINK_MAX_RATE_HZ, BLINK_MIN_RATE_HZ};
use super::event::ControlError;
use super::output::{Channel, Write, Writes};
use super::pwm::{clamp_to, step_clamped, Clamped, Parameter, PwmParameters};
use super::timing::Millis;

/// LED modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedMode {
    Off,
    SolidOn,
    /// Toggling at `rate_hz` full cycles per second
    Blinking { rate_hz: u8 },
    PwmCustom { frequency_hz: u32, duty: u8 },
}

/// LED dimmer actuator
#[derive(Debug, Clone)]
pub struct LedActuator {
    mode: LedMode,
    config: LedConfig,
}

impl LedActuator {
    pub fn new(config: LedConfig) -> Self {
        Self {
            mode: LedMode::Off,
            config,
        }
    }

    /// Custom PWM settings to adjust from, the defaults when not in custom PWM
    fn custom(&self) -> (u32, u8) {
        match self.mode {
            LedMode::PwmCustom { frequency_hz, duty } => (frequency_hz, duty),
            _ => (self.config.default_frequency_hz, self.config.default_duty),
        }
    }
}

impl Default for LedActuator {
    fn default() -> Self {
        Self::new(LedConfig::default())
    }
}

impl Actuator for LedActuator {
    type Mode = LedMode;

    fn mode(&self) -> LedMode {
        self.mode
    }

    fn reset(&mut self) {
        self.mode = LedMode::Off;
    }

    fn apply(&mut self, command: Command, _now: Millis) -> Result<Option<Clamped>, ControlError> {
        match command {
            Command::PowerToggle => {
                self.mode = match self.mode {
                    LedMode::Off => LedMode::SolidOn,
                    _ => LedMode::Off,
                };
                Ok(None)
            }
            // never rejected, whatever the device
            Command::EmergencyStop => {
                self.mode = LedMode::Off;
                Ok(None)
            }
            Command::SelectPreset(n) => {
                let (rate, clamped) = clamp_to(
                    n as i64,
                    BLINK_MIN_RATE_HZ as u32,
                    BLINK_MAX_RATE_HZ as u32,
                    Parameter::BlinkRate,
                );
                self.mode = LedMode::Blinking { rate_hz: rate as u8 };
                Ok(clamped)
            }
            Command::AdjustFrequency(delta) => {
                let (frequency_hz, duty) = self.custom();
                let (frequency_hz, clamped) = step_clamped(
                    frequency_hz,
                    delta as i32,
                    self.config.min_frequency_hz,
                    self.config.max_frequency_hz,
                    Parameter::Frequency,
                );
                self.mode = LedMode::PwmCustom { frequency_hz, duty };
                Ok(clamped)
            }
            Command::AdjustDuty(delta) => {
                let (frequency_hz, duty) = self.custom();
                let (duty, clamped) = step_clamped(
                    duty as u32,
                    delta as i32,
                    0,
                    u8::MAX as u32,
                    Parameter::Duty,
                );
                self.mode = LedMode::PwmCustom {
                    frequency_hz,
                    duty: duty as u8,
                };
                Ok(clamped)
            }
            other => Err(ControlError::Unsupported(other)),
        }
    }

    fn visual_interval_ms(&self) -> Option<u32> {
        match self.mode {
            // half of one blink cycle
            LedMode::Blinking { rate_hz } => Some(500 / rate_hz.max(1) as u32),
            _ => None,
        }
    }

    fn visual_channel(&self) -> Channel {
        Channel::Actuator
    }

    fn outputs(&self, visual: bool, writes: &mut Writes) {
        let write = match self.mode {
            LedMode::Off => Write::Level {
                channel: Channel::Actuator,
                high: false,
            },
            LedMode::SolidOn => Write::Level {
                channel: Channel::Actuator,
                high: true,
            },
            LedMode::Blinking { .. } => Write::Level {
                channel: Channel::Actuator,
                high: visual,
            },
            LedMode::PwmCustom { frequency_hz, duty } => Write::Pwm {
                channel: Channel::Actuator,
                params: PwmParameters::dimmer(frequency_hz, duty),
            },
        };
        let _ = writes.push(write);
    }
}
