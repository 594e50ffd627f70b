//! ESC throttle
//!
//! Brushless motor through an ESC on a 50Hz servo signal. Throttle is only
//! accepted once armed, the stop pulse goes out before anything else, and
//! an emergency stop is never refused.
//!
//! # Indicator
//! - Disarmed: off
//! - Arming: fast flash
//! - Armed at zero: slow blink
//! - Running: solid

use super::actuator::Actuator;
use super::arming::ArmState;
use super::command::Command;
use super::config::MotorConfig;
use super::event::ControlError;
use super::output::{Channel, Write, Writes};
use super::pwm::{clamp_to, speed_to_pulse_us, step_clamped, Clamped, Parameter, PwmParameters};
use super::timing::Millis;

/// Motor modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorMode {
    Disarmed,
    Arming,
    Armed { speed_percent: u8 },
    Disarming,
}

/// ESC throttle actuator
#[derive(Debug, Clone)]
pub struct MotorActuator {
    arm: ArmState,
    speed_percent: u8,
    config: MotorConfig,
}

impl MotorActuator {
    pub fn new(config: MotorConfig) -> Self {
        Self {
            arm: ArmState::Disarmed,
            speed_percent: 0,
            config,
        }
    }

    /// Where the arming handshake stands
    pub fn arm_state(&self) -> ArmState {
        self.arm
    }

    /// Pulse width currently commanded to the ESC
    pub fn pulse_width_us(&self) -> u16 {
        let speed = if self.arm.is_armed() {
            self.speed_percent
        } else {
            0
        };
        speed_to_pulse_us(speed, self.config.min_pulse_us, self.config.max_pulse_us)
    }

    fn require_armed(&self) -> Result<(), ControlError> {
        if self.arm.is_armed() {
            Ok(())
        } else {
            Err(ControlError::NotArmed)
        }
    }

    fn arm(&mut self, now: Millis) -> Result<Option<Clamped>, ControlError> {
        self.arm.begin_arm(now)?;
        self.speed_percent = 0;
        Ok(None)
    }

    fn disarm(&mut self, now: Millis) -> Result<Option<Clamped>, ControlError> {
        self.arm.begin_disarm(now)?;
        self.speed_percent = 0;
        Ok(None)
    }

    fn step_speed(&mut self, delta: i32) -> Result<Option<Clamped>, ControlError> {
        self.require_armed()?;
        let (speed, clamped) = step_clamped(self.speed_percent as u32, delta, 0, 100, Parameter::Speed);
        self.speed_percent = speed as u8;
        Ok(clamped)
    }
}

impl Default for MotorActuator {
    fn default() -> Self {
        Self::new(MotorConfig::default())
    }
}

impl Actuator for MotorActuator {
    type Mode = MotorMode;

    fn mode(&self) -> MotorMode {
        match self.arm {
            ArmState::Disarmed => MotorMode::Disarmed,
            ArmState::Arming { .. } => MotorMode::Arming,
            ArmState::Armed => MotorMode::Armed {
                speed_percent: self.speed_percent,
            },
            ArmState::Disarming { .. } => MotorMode::Disarming,
        }
    }

    fn reset(&mut self) {
        self.arm = ArmState::Disarmed;
        self.speed_percent = 0;
    }

    fn apply(&mut self, command: Command, now: Millis) -> Result<Option<Clamped>, ControlError> {
        match command {
            Command::PowerToggle => match self.arm {
                ArmState::Disarmed => self.arm(now),
                ArmState::Armed => self.disarm(now),
                ArmState::Arming { .. } | ArmState::Disarming { .. } => {
                    Err(ControlError::TransitionInProgress)
                }
            },
            Command::Arm => self.arm(now),
            Command::Disarm => self.disarm(now),
            Command::SelectPreset(n) => {
                self.require_armed()?;
                let requested = n as i64 * self.config.preset_step as i64;
                let (speed, clamped) = clamp_to(requested, 0, 100, Parameter::Speed);
                self.speed_percent = speed as u8;
                Ok(clamped)
            }
            Command::SpeedUp => self.step_speed(self.config.speed_step as i32),
            Command::SpeedDown => self.step_speed(-(self.config.speed_step as i32)),
            Command::EmergencyStop => {
                // armed stays armed at zero, anything else already holds the stop pulse
                self.speed_percent = 0;
                Ok(None)
            }
            other => Err(ControlError::Unsupported(other)),
        }
    }

    fn advance(&mut self, now: Millis) -> Option<Command> {
        match self.arm.advance(now, &self.config)? {
            ArmState::Armed => {
                self.speed_percent = 0;
                Some(Command::Arm)
            }
            _ => Some(Command::Disarm),
        }
    }

    fn in_transition(&self) -> bool {
        self.arm.in_transition()
    }

    fn is_running(&self) -> bool {
        self.arm.is_armed() && self.speed_percent > 0
    }

    fn inactivity_timeout_ms(&self) -> Option<u32> {
        Some(self.config.inactivity_timeout_ms)
    }

    fn visual_interval_ms(&self) -> Option<u32> {
        match self.mode() {
            MotorMode::Arming => Some(self.config.arming_flash_ms),
            MotorMode::Armed { speed_percent: 0 } => Some(self.config.status_blink_ms),
            _ => None,
        }
    }

    fn visual_channel(&self) -> Channel {
        Channel::Indicator
    }

    fn outputs(&self, visual: bool, writes: &mut Writes) {
        let _ = writes.push(Write::Pwm {
            channel: Channel::Actuator,
            params: PwmParameters::servo_pulse(
                self.config.frequency_hz,
                self.pulse_width_us(),
                self.config.min_pulse_us,
                self.config.max_pulse_us,
            ),
        });
        let indicator = match self.mode() {
            MotorMode::Disarmed | MotorMode::Disarming => false,
            MotorMode::Arming | MotorMode::Armed { speed_percent: 0 } => visual,
            MotorMode::Armed { .. } => true,
        };
        let _ = writes.push(Write::Level {
            channel: Channel::Indicator,
            high: indicator,
        });
    }
}
