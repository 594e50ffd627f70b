//! PWM output driver on the RP2350 slices
//!
//! Each [`Channel`] is one slice output. Duty values arrive in the 8 or 16
//! bit domain the channel was configured with and are scaled to the slice
//! `top` by the embedded-hal duty helpers.

use defmt::debug;
use embassy_rp::pwm::{self, Pwm, SetDutyCycle};
use ir_actuator::system::output::{Channel, OutputDriver, OutputError};

use super::resources::OutputResources;

/// Largest integer clock divider of a slice
const MAX_DIVIDER: u32 = 255;

struct Slice {
    pwm: Pwm<'static>,
    max_duty: u16,
}

impl Slice {
    fn new(pwm: Pwm<'static>) -> Self {
        Self {
            pwm,
            max_duty: u16::MAX,
        }
    }
}

/// [`OutputDriver`] over the actuator and indicator slices
pub struct RpPwmDriver {
    slices: [Slice; Channel::COUNT],
}

impl RpPwmDriver {
    pub fn new(r: OutputResources) -> Self {
        let actuator = Pwm::new_output_a(r.actuator_slice, r.actuator_pin, pwm::Config::default());
        let indicator =
            Pwm::new_output_b(r.indicator_slice, r.indicator_pin, pwm::Config::default());
        Self {
            slices: [Slice::new(actuator), Slice::new(indicator)],
        }
    }

    fn slice(&mut self, channel: Channel) -> &mut Slice {
        &mut self.slices[channel.index()]
    }
}

/// Divider and top for `frequency_hz`, keeping the period within 16 bits
fn divider_and_top(clock_hz: u32, frequency_hz: u32) -> Option<(u8, u16)> {
    if frequency_hz == 0 {
        return None;
    }
    let divider = (clock_hz / frequency_hz) / 65_535 + 1;
    if divider > MAX_DIVIDER {
        return None;
    }
    let period = clock_hz / (frequency_hz * divider);
    let top = u16::try_from(period.checked_sub(1)?).ok()?;
    Some((divider as u8, top))
}

impl OutputDriver for RpPwmDriver {
    fn configure(
        &mut self,
        channel: Channel,
        frequency_hz: u32,
        resolution_bits: u8,
    ) -> Result<(), OutputError> {
        let clock_hz = embassy_rp::clocks::clk_sys_freq();
        let (divider, top) =
            divider_and_top(clock_hz, frequency_hz).ok_or(OutputError::UnsupportedFrequency)?;
        let max_duty = match resolution_bits {
            1..=16 => ((1u32 << resolution_bits) - 1) as u16,
            _ => return Err(OutputError::UnsupportedFrequency),
        };

        let slice = self.slice(channel);
        let mut config = pwm::Config::default();
        config.divider = divider.into();
        config.top = top;
        slice.pwm.set_config(&config);
        slice.max_duty = max_duty;
        debug!(
            "{} at {}Hz: div={} top={}",
            channel, frequency_hz, divider, top
        );
        Ok(())
    }

    fn write(&mut self, channel: Channel, duty: u16) -> Result<(), OutputError> {
        let slice = self.slice(channel);
        let duty = duty.min(slice.max_duty);
        slice
            .pwm
            .set_duty_cycle_fraction(duty, slice.max_duty)
            .map_err(|_| OutputError::Hardware)
    }

    fn set_level(&mut self, channel: Channel, high: bool) -> Result<(), OutputError> {
        let pwm = &mut self.slice(channel).pwm;
        let result = if high {
            pwm.set_duty_cycle_fully_on()
        } else {
            pwm.set_duty_cycle_fully_off()
        };
        result.map_err(|_| OutputError::Hardware)
    }
}
