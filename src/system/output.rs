//! Output driver seam
//!
//! The state machine never touches the PWM peripheral. It produces
//! [`Write`]s and hands them to an [`OutputDriver`], which the firmware
//! implements over the RP2350 PWM slices.

use super::pwm::PwmParameters;
use core::fmt;
use heapless::Vec;

/// Physical outputs of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    /// The LED being dimmed or the ESC signal line
    Actuator,
    /// Status LED next to the ESC connector
    Indicator,
}

impl Channel {
    pub const COUNT: usize = 2;

    pub const fn index(self) -> usize {
        match self {
            Channel::Actuator => 0,
            Channel::Indicator => 1,
        }
    }
}

/// Driver level failures, logged and otherwise ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputError {
    /// Channel not wired on this board
    InvalidChannel,
    /// The peripheral cannot produce this frequency
    UnsupportedFrequency,
    /// The HAL reported an error
    Hardware,
}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputError::InvalidChannel => write!(f, "channel not available"),
            OutputError::UnsupportedFrequency => write!(f, "frequency not supported"),
            OutputError::Hardware => write!(f, "PWM hardware error"),
        }
    }
}

/// PWM peripheral as seen by the state machine
pub trait OutputDriver {
    /// Sets up a channel; reconfiguring resets the channel output
    fn configure(
        &mut self,
        channel: Channel,
        frequency_hz: u32,
        resolution_bits: u8,
    ) -> Result<(), OutputError>;

    /// Writes a duty value in the configured resolution
    fn write(&mut self, channel: Channel, duty: u16) -> Result<(), OutputError>;

    /// Drives the channel fully high or fully low
    fn set_level(&mut self, channel: Channel, high: bool) -> Result<(), OutputError>;
}

/// One pending output change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Write {
    Level { channel: Channel, high: bool },
    Pwm { channel: Channel, params: PwmParameters },
}

/// Output changes produced by one transition
pub type Writes = Vec<Write, 4>;

/// Pushes writes to a driver, reconfiguring a channel only when needed
///
/// Remembers the frequency and resolution each channel was last configured
/// with; a duty write always follows a configure since reconfiguration
/// resets the channel.
#[derive(Debug)]
pub struct OutputStage<D> {
    driver: D,
    configured: [Option<(u32, u8)>; Channel::COUNT],
}

impl<D: OutputDriver> OutputStage<D> {
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            configured: [None; Channel::COUNT],
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Applies all writes, logging failures and carrying on
    pub fn push(&mut self, writes: &[Write]) {
        for write in writes {
            if let Err(e) = self.apply(write) {
                log_warn!("output write {:?} failed: {:?}", write, e);
            }
        }
    }

    fn apply(&mut self, write: &Write) -> Result<(), OutputError> {
        match *write {
            Write::Level { channel, high } => self.driver.set_level(channel, high),
            Write::Pwm { channel, params } => {
                let setup = (params.frequency_hz, params.resolution.bits());
                if self.configured[channel.index()] != Some(setup) {
                    // forget the old setup first, a failed configure leaves the channel unknown
                    self.configured[channel.index()] = None;
                    self.driver.configure(channel, setup.0, setup.1)?;
                    self.configured[channel.index()] = Some(setup);
                }
                let duty = params.duty.min(params.resolution.max_duty());
                self.driver.write(channel, duty)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::mock::{DriverCall, RecordingDriver};

    #[test]
    fn test_configures_only_on_change() {
        let mut stage = OutputStage::new(RecordingDriver::default());
        let write = |freq, duty| Write::Pwm {
            channel: Channel::Actuator,
            params: PwmParameters::dimmer(freq, duty),
        };

        stage.push(&[write(1_000, 128), write(1_000, 143), write(1_100, 143)]);

        assert_eq!(
            stage.driver().calls.as_slice(),
            &[
                DriverCall::Configure(Channel::Actuator, 1_000, 8),
                DriverCall::Duty(Channel::Actuator, 128),
                DriverCall::Duty(Channel::Actuator, 143),
                DriverCall::Configure(Channel::Actuator, 1_100, 8),
                DriverCall::Duty(Channel::Actuator, 143),
            ]
        );
    }

    #[test]
    fn test_failed_write_does_not_stop_later_writes() {
        let mut driver = RecordingDriver::default();
        driver.fail_channel = Some(Channel::Indicator);
        let mut stage = OutputStage::new(driver);

        stage.push(&[
            Write::Level {
                channel: Channel::Indicator,
                high: true,
            },
            Write::Level {
                channel: Channel::Actuator,
                high: true,
            },
        ]);

        assert_eq!(stage.driver().level(Channel::Actuator), Some(true));
        assert_eq!(stage.driver().level(Channel::Indicator), None);
    }

    #[test]
    fn test_failed_configure_is_retried() {
        let mut driver = RecordingDriver::default();
        driver.fail_channel = Some(Channel::Actuator);
        let mut stage = OutputStage::new(driver);
        let write = Write::Pwm {
            channel: Channel::Actuator,
            params: PwmParameters::servo_pulse(50, 1_000, 1_000, 2_000),
        };

        stage.push(&[write]);
        stage.driver_mut().fail_channel = None;
        stage.push(&[write]);

        assert_eq!(stage.driver().configured(Channel::Actuator), Some((50, 16)));
        assert_eq!(stage.driver().duty(Channel::Actuator), Some(3_276));
    }
}
