//! Remote commands and the code table
//!
//! Decoding happens in two stages: the raw 32-bit code from the IR decoder
//! is looked up in a [`CommandMapping`], and only the resulting logical
//! [`Command`] ever reaches the state machine. Swapping the remote means
//! swapping the table.
//!
//! # Default remote layout
//!
//! Both tables target the common 21-key NEC remote:
//!
//! ```text
//!   [CH-] 0xFFA25D  [CH] 0xFF629D   [CH+] 0xFFE21D
//!   [|<<] 0xFF22DD  [>>|] 0xFF02FD  [>||] 0xFFC23D
//!   [ - ] 0xFFE01F  [ + ] 0xFFA857  [EQ ] 0xFF906F
//!   [ 0 ] 0xFF6897  [ 1 ] 0xFF30CF  [ 2 ] 0xFF18E7
//!   [ 3 ] 0xFF7A85  [ 4 ] 0xFF10EF  [ 5 ] 0xFF38C7
//!   [ 6 ] 0xFF5AA5  [ 7 ] 0xFF42BD  [ 8 ] 0xFF4AB5
//!   [ 9 ] 0xFF52AD
//! ```

use core::fmt;
use heapless::LinearMap;

/// Maximum number of entries a code table can hold
pub const MAPPING_CAPACITY: usize = 32;

/// Code the NEC decoder reports for a held-down key
pub const NEC_REPEAT: u32 = 0xFFFF_FFFF;

/// Duty change per volume press on the LED device
pub const DUTY_STEP: i16 = 15;

/// Frequency change per skip press on the LED device
pub const FREQUENCY_STEP_HZ: i16 = 100;

/// Logical actuator commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Switch on from off / disarmed, or fully off from any on state
    PowerToggle,
    /// Blink rate (LED) or tenth of full throttle (motor)
    SelectPreset(u8),
    /// Change the custom PWM frequency by the given Hz
    AdjustFrequency(i16),
    /// Change the custom PWM duty by the given 8-bit steps
    AdjustDuty(i16),
    /// Throttle to zero, unconditionally
    EmergencyStop,
    SpeedUp,
    SpeedDown,
    /// Start the arming sequence
    Arm,
    /// Start the disarm sequence
    Disarm,
    /// Code not present in the table
    Unrecognized,
}

impl Command {
    /// Commands whose repeated application keeps changing the state
    ///
    /// Every other command either toggles or lands in the same state twice,
    /// so a decoder auto-repeat of one of those must not be applied again.
    pub const fn is_cumulative(&self) -> bool {
        matches!(
            self,
            Command::AdjustFrequency(_)
                | Command::AdjustDuty(_)
                | Command::SpeedUp
                | Command::SpeedDown
        )
    }
}

/// Code table override did not fit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MappingFull {
    pub code: u32,
}

impl fmt::Display for MappingFull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "command table full ({} entries), cannot add {:#010x}",
            MAPPING_CAPACITY, self.code
        )
    }
}

/// Raw remote code to logical command lookup
#[derive(Debug, Clone)]
pub struct CommandMapping {
    entries: LinearMap<u32, Command, MAPPING_CAPACITY>,
}

impl CommandMapping {
    /// Empty table, every code is unrecognized
    pub const fn new() -> Self {
        Self {
            entries: LinearMap::new(),
        }
    }

    /// Builds a table from `(code, command)` pairs; later pairs win
    pub fn from_entries(entries: &[(u32, Command)]) -> Result<Self, MappingFull> {
        let mut mapping = Self::new();
        for &(code, command) in entries {
            mapping.set(code, command)?;
        }
        Ok(mapping)
    }

    /// Default table for the LED dimmer
    pub fn led() -> Self {
        Self::from_entries(LED_CODES).unwrap_or_else(|_| Self::new())
    }

    /// Default table for the ESC throttle
    pub fn motor() -> Self {
        Self::from_entries(MOTOR_CODES).unwrap_or_else(|_| Self::new())
    }

    /// Logical command for a raw code
    pub fn lookup(&self, code: u32) -> Command {
        self.entries
            .get(&code)
            .copied()
            .unwrap_or(Command::Unrecognized)
    }

    /// Adds or replaces an entry, returning the command it replaced
    pub fn set(&mut self, code: u32, command: Command) -> Result<Option<Command>, MappingFull> {
        self.entries
            .insert(code, command)
            .map_err(|(code, _)| MappingFull { code })
    }

    /// Removes an entry so the code becomes unrecognized
    pub fn remove(&mut self, code: u32) -> Option<Command> {
        self.entries.remove(&code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CommandMapping {
    fn default() -> Self {
        Self::new()
    }
}

/// Key codes of the 21-key NEC remote
pub mod keys {
    pub const CH_MINUS: u32 = 0xFFA25D;
    pub const CH: u32 = 0xFF629D;
    pub const CH_PLUS: u32 = 0xFFE21D;
    pub const PREV: u32 = 0xFF22DD;
    pub const NEXT: u32 = 0xFF02FD;
    pub const PLAY: u32 = 0xFFC23D;
    pub const VOL_MINUS: u32 = 0xFFE01F;
    pub const VOL_PLUS: u32 = 0xFFA857;
    pub const EQ: u32 = 0xFF906F;
    /// Digit keys, index is the digit
    pub const DIGITS: [u32; 10] = [
        0xFF6897, 0xFF30CF, 0xFF18E7, 0xFF7A85, 0xFF10EF, 0xFF38C7, 0xFF5AA5, 0xFF42BD,
        0xFF4AB5, 0xFF52AD,
    ];
}

/// LED dimmer key bindings
pub const LED_CODES: &[(u32, Command)] = &[
    (keys::CH_MINUS, Command::PowerToggle),
    (keys::DIGITS[1], Command::SelectPreset(1)),
    (keys::DIGITS[2], Command::SelectPreset(2)),
    (keys::DIGITS[3], Command::SelectPreset(3)),
    (keys::DIGITS[4], Command::SelectPreset(4)),
    (keys::DIGITS[5], Command::SelectPreset(5)),
    (keys::DIGITS[6], Command::SelectPreset(6)),
    (keys::DIGITS[7], Command::SelectPreset(7)),
    (keys::DIGITS[8], Command::SelectPreset(8)),
    (keys::DIGITS[9], Command::SelectPreset(9)),
    (keys::VOL_PLUS, Command::AdjustDuty(DUTY_STEP)),
    (keys::VOL_MINUS, Command::AdjustDuty(-DUTY_STEP)),
    (keys::NEXT, Command::AdjustFrequency(FREQUENCY_STEP_HZ)),
    (keys::PREV, Command::AdjustFrequency(-FREQUENCY_STEP_HZ)),
];

/// ESC throttle key bindings
pub const MOTOR_CODES: &[(u32, Command)] = &[
    (keys::CH_MINUS, Command::PowerToggle),
    (keys::CH_PLUS, Command::Arm),
    (keys::CH, Command::Disarm),
    (keys::PLAY, Command::EmergencyStop),
    (keys::VOL_PLUS, Command::SpeedUp),
    (keys::VOL_MINUS, Command::SpeedDown),
    (keys::DIGITS[0], Command::SelectPreset(0)),
    (keys::DIGITS[1], Command::SelectPreset(1)),
    (keys::DIGITS[2], Command::SelectPreset(2)),
    (keys::DIGITS[3], Command::SelectPreset(3)),
    (keys::DIGITS[4], Command::SelectPreset(4)),
    (keys::DIGITS[5], Command::SelectPreset(5)),
    (keys::DIGITS[6], Command::SelectPreset(6)),
    (keys::DIGITS[7], Command::SelectPreset(7)),
    (keys::DIGITS[8], Command::SelectPreset(8)),
    (keys::DIGITS[9], Command::SelectPreset(9)),
];
