//! Device configuration
//!
//! Limits, defaults and timings for both actuator variants. The constants
//! are the values the boards ship with; [`LedConfig`] and [`MotorConfig`]
//! carry them at run time so a different board (or a test) can adjust them.

// LED custom PWM limits
pub const LED_MIN_FREQUENCY_HZ: u32 = 100;
pub const LED_MAX_FREQUENCY_HZ: u32 = 10_000;
pub const LED_DEFAULT_FREQUENCY_HZ: u32 = 1_000; // on entering custom PWM
pub const LED_DEFAULT_DUTY: u8 = 128; // 50% in the 8-bit domain

// Blink presets
pub const BLINK_MIN_RATE_HZ: u8 = 1;
pub const BLINK_MAX_RATE_HZ: u8 = 9;

// ESC servo signal
pub const ESC_FREQUENCY_HZ: u32 = 50; // 20ms frame
pub const ESC_MIN_PULSE_US: u16 = 1_000; // motor stopped
pub const ESC_MAX_PULSE_US: u16 = 2_000; // full throttle

// Throttle
pub const SPEED_STEP_PERCENT: u8 = 5;
pub const PRESET_STEP_PERCENT: u8 = 10;

// Safety and indication timings
pub const INACTIVITY_TIMEOUT_MS: u32 = 10_000;
pub const STATUS_BLINK_MS: u32 = 1_000;
pub const ARMING_HOLD_MS: u32 = 2_000; // stop pulse held before throttle is accepted
pub const ARMING_FLASH_MS: u32 = 100;
pub const DISARM_SETTLE_MS: u32 = 100;

/// LED dimmer settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LedConfig {
    pub min_frequency_hz: u32,
    pub max_frequency_hz: u32,
    /// Frequency used when custom PWM is entered from another mode
    pub default_frequency_hz: u32,
    /// Duty used when custom PWM is entered from another mode
    pub default_duty: u8,
}

impl Default for LedConfig {
    fn default() -> Self {
        Self {
            min_frequency_hz: LED_MIN_FREQUENCY_HZ,
            max_frequency_hz: LED_MAX_FREQUENCY_HZ,
            default_frequency_hz: LED_DEFAULT_FREQUENCY_HZ,
            default_duty: LED_DEFAULT_DUTY,
        }
    }
}

/// ESC throttle settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotorConfig {
    pub frequency_hz: u32,
    pub min_pulse_us: u16,
    pub max_pulse_us: u16,
    /// Points added or removed by one speed up/down press
    pub speed_step: u8,
    /// Percent per preset digit
    pub preset_step: u8,
    /// Running without a command for longer than this forces a stop
    pub inactivity_timeout_ms: u32,
    /// Indicator half period while armed at zero
    pub status_blink_ms: u32,
    pub arming_hold_ms: u32,
    pub arming_flash_ms: u32,
    pub disarm_settle_ms: u32,
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self {
            frequency_hz: ESC_FREQUENCY_HZ,
            min_pulse_us: ESC_MIN_PULSE_US,
            max_pulse_us: ESC_MAX_PULSE_US,
            speed_step: SPEED_STEP_PERCENT,
            preset_step: PRESET_STEP_PERCENT,
            inactivity_timeout_ms: INACTIVITY_TIMEOUT_MS,
            status_blink_ms: STATUS_BLINK_MS,
            arming_hold_ms: ARMING_HOLD_MS,
            arming_flash_ms: ARMING_FLASH_MS,
            disarm_settle_ms: DISARM_SETTLE_MS,
        }
    }
}
