//! Actuator families
//!
//! The LED dimmer and the ESC throttle run the same state machine. What
//! differs between them lives behind [`Actuator`]: the mode enumeration, the
//! legal command set, the outputs a mode produces and its timing behaviour.

use super::command::Command;
use super::event::ControlError;
use super::output::{Channel, Writes};
use super::pwm::Clamped;
use super::timing::Millis;
use crate::LogFormat;

/// One device variant of the state machine
pub trait Actuator {
    /// Mutually exclusive modes of this family
    type Mode: Copy + PartialEq + LogFormat;

    /// Current mode
    fn mode(&self) -> Self::Mode;

    /// Returns to the safe baseline, off / disarmed with zero output
    fn reset(&mut self);

    /// Applies a logical command
    ///
    /// On error the state must be unchanged. A clamped parameter is not an
    /// error, it is reported alongside success.
    fn apply(&mut self, command: Command, now: Millis) -> Result<Option<Clamped>, ControlError>;

    /// Completes a pending sub-state once its time is up
    ///
    /// Returns the command that started the sub-state.
    fn advance(&mut self, _now: Millis) -> Option<Command> {
        None
    }

    /// An arm or disarm sequence is running
    fn in_transition(&self) -> bool {
        false
    }

    /// Actuator is producing output that the inactivity timeout guards
    fn is_running(&self) -> bool {
        false
    }

    fn inactivity_timeout_ms(&self) -> Option<u32> {
        None
    }

    /// Time between visual toggles in the current mode, if it blinks
    fn visual_interval_ms(&self) -> Option<u32>;

    /// Channel the visual toggles are written to
    fn visual_channel(&self) -> Channel;

    /// Steady state outputs of the current mode
    fn outputs(&self, visual: bool, writes: &mut Writes);
}
