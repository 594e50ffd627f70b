//! Recording output driver for host tests

use super::output::{Channel, OutputDriver, OutputError};

/// A driver call as the hardware would have seen it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverCall {
    Configure(Channel, u32, u8),
    Duty(Channel, u16),
    Level(Channel, bool),
}

/// Driver that records every successful call
///
/// `fail_channel` makes every call on that channel fail, for exercising the
/// error path.
#[derive(Debug, Default)]
pub struct RecordingDriver {
    pub calls: Vec<DriverCall>,
    pub fail_channel: Option<Channel>,
}

impl RecordingDriver {
    fn check(&self, channel: Channel) -> Result<(), OutputError> {
        if self.fail_channel == Some(channel) {
            Err(OutputError::Hardware)
        } else {
            Ok(())
        }
    }

    /// Last level written to a channel
    pub fn level(&self, channel: Channel) -> Option<bool> {
        self.calls.iter().rev().find_map(|call| match *call {
            DriverCall::Level(c, high) if c == channel => Some(high),
            _ => None,
        })
    }

    /// Last duty written to a channel
    pub fn duty(&self, channel: Channel) -> Option<u16> {
        self.calls.iter().rev().find_map(|call| match *call {
            DriverCall::Duty(c, duty) if c == channel => Some(duty),
            _ => None,
        })
    }

    /// Last frequency and resolution a channel was configured with
    pub fn configured(&self, channel: Channel) -> Option<(u32, u8)> {
        self.calls.iter().rev().find_map(|call| match *call {
            DriverCall::Configure(c, freq, bits) if c == channel => Some((freq, bits)),
            _ => None,
        })
    }

    /// Every duty value ever written to a channel
    pub fn duties(&self, channel: Channel) -> Vec<u16> {
        self.calls
            .iter()
            .filter_map(|call| match *call {
                DriverCall::Duty(c, duty) if c == channel => Some(duty),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl OutputDriver for RecordingDriver {
    fn configure(
        &mut self,
        channel: Channel,
        frequency_hz: u32,
        resolution_bits: u8,
    ) -> Result<(), OutputError> {
        self.check(channel)?;
        self.calls
            .push(DriverCall::Configure(channel, frequency_hz, resolution_bits));
        Ok(())
    }

    fn write(&mut self, channel: Channel, duty: u16) -> Result<(), OutputError> {
        self.check(channel)?;
        self.calls.push(DriverCall::Duty(channel, duty));
        Ok(())
    }

    fn set_level(&mut self, channel: Channel, high: bool) -> Result<(), OutputError> {
        self.check(channel)?;
        self.calls.push(DriverCall::Level(channel, high));
        Ok(())
    }
}
