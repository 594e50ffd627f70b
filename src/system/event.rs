//! Transition reports and control errors
//!
//! Nothing here is fatal. A rejected command leaves the state untouched and
//! the loop goes back to polling; a successful one is described by a
//! [`Transition`] that the diagnostics log picks up.

use super::command::Command;
use super::pwm::Clamped;
use core::fmt;

/// Why a command was not applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlError {
    /// Code is not in the command table
    UnknownCommand(u32),
    /// Command has no meaning for this device
    Unsupported(Command),
    /// Throttle command while the ESC is not armed
    NotArmed,
    AlreadyArmed,
    AlreadyDisarmed,
    /// The opposite arm/disarm sequence is still running
    TransitionInProgress,
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlError::UnknownCommand(code) => write!(f, "unknown command code {:#010x}", code),
            ControlError::Unsupported(command) => {
                write!(f, "{:?} not supported by this device", command)
            }
            ControlError::NotArmed => write!(f, "not armed"),
            ControlError::AlreadyArmed => write!(f, "already armed"),
            ControlError::AlreadyDisarmed => write!(f, "already disarmed"),
            ControlError::TransitionInProgress => write!(f, "arm/disarm sequence in progress"),
        }
    }
}

/// Origin of a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Cause {
    /// Command from the remote
    Remote,
    /// Safety stop after the inactivity timeout
    InactivityTimeout,
    /// An arm or disarm sequence finished
    Sequence,
}

/// A successfully applied command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transition<M> {
    pub from: M,
    pub to: M,
    pub command: Command,
    pub cause: Cause,
    /// Set when a parameter was limited to its bound
    pub clamped: Option<Clamped>,
}

impl<M: PartialEq> Transition<M> {
    /// Mode actually changed
    pub fn changed(&self) -> bool {
        self.from != self.to
    }

    /// Stop forced by the scheduler rather than asked for
    pub fn is_safety_stop(&self) -> bool {
        self.cause == Cause::InactivityTimeout
    }
}
