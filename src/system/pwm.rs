//! PWM parameters and range arithmetic
//!
//! Everything that ends up in a duty register is produced here, and every
//! value is clamped to its legal range on the way. Adjustments past a bound
//! stop exactly at the bound and report a [`Clamped`].

/// Duty value domain of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Resolution {
    /// 0..=255, LED dimming
    Bits8,
    /// 0..=65535, ESC pulse width encoding
    Bits16,
}

impl Resolution {
    pub const fn bits(self) -> u8 {
        match self {
            Resolution::Bits8 => 8,
            Resolution::Bits16 => 16,
        }
    }

    /// Largest duty value in this domain
    pub const fn max_duty(self) -> u16 {
        match self {
            Resolution::Bits8 => u8::MAX as u16,
            Resolution::Bits16 => u16::MAX,
        }
    }
}

/// Parameter that hit its bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parameter {
    Frequency,
    Duty,
    Speed,
    BlinkRate,
}

/// An adjustment was clamped to the nearest bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Clamped {
    pub parameter: Parameter,
    /// Value the command asked for
    pub requested: i32,
    /// Value actually applied
    pub applied: u32,
}

/// Settings for one PWM channel write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PwmParameters {
    pub frequency_hz: u32,
    pub resolution: Resolution,
    /// Always within `resolution.max_duty()`
    pub duty: u16,
    /// High time of the servo pulse, ESC channel only
    pub pulse_width_us: Option<u16>,
}

impl PwmParameters {
    /// 8-bit dimming output
    pub fn dimmer(frequency_hz: u32, duty: u8) -> Self {
        Self {
            frequency_hz,
            resolution: Resolution::Bits8,
            duty: duty as u16,
            pulse_width_us: None,
        }
    }

    /// Servo pulse output, the pulse is clamped to `[min_us, max_us]`
    pub fn servo_pulse(frequency_hz: u32, pulse_us: u16, min_us: u16, max_us: u16) -> Self {
        let pulse_us = pulse_us.clamp(min_us, max_us);
        Self {
            frequency_hz,
            resolution: Resolution::Bits16,
            duty: pulse_to_duty(pulse_us, frequency_hz, Resolution::Bits16),
            pulse_width_us: Some(pulse_us),
        }
    }
}

/// Adds `delta` to `value` and clamps the result to `[min, max]`
pub fn step_clamped(
    value: u32,
    delta: i32,
    min: u32,
    max: u32,
    parameter: Parameter,
) -> (u32, Option<Clamped>) {
    let requested = value as i64 + delta as i64;
    clamp_to(requested, min, max, parameter)
}

/// Clamps an absolute request to `[min, max]`
pub fn clamp_to(requested: i64, min: u32, max: u32, parameter: Parameter) -> (u32, Option<Clamped>) {
    let applied = requested.clamp(min as i64, max as i64) as u32;
    let clamped = (applied as i64 != requested).then(|| Clamped {
        parameter,
        requested: requested.clamp(i32::MIN as i64, i32::MAX as i64) as i32,
        applied,
    });
    (applied, clamped)
}

/// ESC pulse width for a throttle percentage, linear from `min_us` to `max_us`
pub fn speed_to_pulse_us(speed_percent: u8, min_us: u16, max_us: u16) -> u16 {
    let speed = speed_percent.min(100) as u32;
    let span = max_us.saturating_sub(min_us) as u32;
    min_us + (span * speed / 100) as u16
}

/// Duty value that holds the output high for `pulse_us` of each period
pub fn pulse_to_duty(pulse_us: u16, frequency_hz: u32, resolution: Resolution) -> u16 {
    let period_us = 1_000_000 / frequency_hz.max(1) as u64;
    let max = resolution.max_duty() as u64;
    let duty = pulse_us as u64 * max / period_us;
    duty.min(max) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duty_steps_clamp_exactly() {
        let (duty, clamped) = step_clamped(250, 15, 0, 255, Parameter::Duty);
        assert_eq!(duty, 255);
        assert_eq!(
            clamped,
            Some(Clamped {
                parameter: Parameter::Duty,
                requested: 265,
                applied: 255
            })
        );

        let (duty, clamped) = step_clamped(10, -15, 0, 255, Parameter::Duty);
        assert_eq!(duty, 0);
        assert_eq!(clamped.map(|c| c.requested), Some(-5));

        let (duty, clamped) = step_clamped(128, 15, 0, 255, Parameter::Duty);
        assert_eq!(duty, 143);
        assert_eq!(clamped, None);
    }

    #[test]
    fn test_duty_range_over_all_steps() {
        for start in 0..=255u32 {
            for delta in [-300, -15, -1, 0, 1, 15, 300] {
                let (duty, clamped) = step_clamped(start, delta, 0, 255, Parameter::Duty);
                assert!(duty <= 255);
                let exact = start as i32 + delta;
                if (0..=255).contains(&exact) {
                    assert_eq!(duty as i32, exact);
                    assert!(clamped.is_none());
                } else {
                    assert_eq!(duty, if exact < 0 { 0 } else { 255 });
                    assert!(clamped.is_some());
                }
            }
        }
    }

    #[test]
    fn test_frequency_clamps_to_band() {
        let (freq, clamped) = step_clamped(150, -100, 100, 10_000, Parameter::Frequency);
        assert_eq!(freq, 100);
        assert!(clamped.is_some());

        let (freq, clamped) = step_clamped(9_950, 100, 100, 10_000, Parameter::Frequency);
        assert_eq!(freq, 10_000);
        assert!(clamped.is_some());
    }

    #[test]
    fn test_speed_to_pulse() {
        assert_eq!(speed_to_pulse_us(0, 1_000, 2_000), 1_000);
        assert_eq!(speed_to_pulse_us(50, 1_000, 2_000), 1_500);
        assert_eq!(speed_to_pulse_us(100, 1_000, 2_000), 2_000);
        assert_eq!(speed_to_pulse_us(250, 1_000, 2_000), 2_000);
    }

    #[test]
    fn test_servo_pulse_duty() {
        let params = PwmParameters::servo_pulse(50, 1_500, 1_000, 2_000);
        assert_eq!(params.pulse_width_us, Some(1_500));
        // 1500us of a 20ms frame in 16 bits
        assert_eq!(params.duty, 4_915);

        let params = PwmParameters::servo_pulse(50, 2_500, 1_000, 2_000);
        assert_eq!(params.pulse_width_us, Some(2_000));
        assert_eq!(params.duty, 6_553);

        let params = PwmParameters::servo_pulse(50, 200, 1_000, 2_000);
        assert_eq!(params.pulse_width_us, Some(1_000));
    }
}
