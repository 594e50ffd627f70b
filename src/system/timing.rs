//! Timestamps and timing state
//!
//! Time is a free running millisecond counter that wraps at `u32::MAX`.
//! Every elapsed time computation goes through [`Millis::since`], which
//! subtracts with wraparound so deadlines keep working across the overflow.

/// Millisecond timestamp from a free running, wrapping counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Millis(pub u32);

impl Millis {
    /// Milliseconds elapsed from `earlier` to `self`, tolerating one counter wrap
    pub const fn since(self, earlier: Millis) -> u32 {
        self.0.wrapping_sub(earlier.0)
    }

    /// Timestamp `ms` milliseconds after `self`, wrapping
    pub const fn add(self, ms: u32) -> Millis {
        Millis(self.0.wrapping_add(ms))
    }
}

/// Timing bookkeeping shared by the state machine and the scheduler
///
/// The state machine records command and transition times; the scheduler
/// only ever flips `visual` and restarts `last_transition` when it does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimingState {
    /// Last mode change or visual toggle
    pub last_transition: Millis,
    /// Last successfully applied command
    pub last_command: Millis,
    /// An arm or disarm sequence is still running
    pub arming_in_progress: bool,
    /// Current blink / status indicator level
    pub visual: bool,
}

impl TimingState {
    /// Safe baseline at power up
    pub const fn new(now: Millis) -> Self {
        Self {
            last_transition: now,
            last_command: now,
            arming_in_progress: false,
            visual: false,
        }
    }

    /// Restarts the visual phase high, as on entering a new mode
    pub fn restart_visual(&mut self, now: Millis) {
        self.visual = true;
        self.last_transition = now;
    }

    /// Flips the visual level and returns the new one
    pub fn toggle_visual(&mut self, now: Millis) -> bool {
        self.visual = !self.visual;
        self.last_transition = now;
        self.visual
    }
}
