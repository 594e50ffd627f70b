//! ESC arming sequence
//!
//! `Disarmed -> Arming -> Armed` and back through `Disarming`. Both
//! directions are timed sub-states advanced from the scheduler tick, so the
//! polling loop never blocks while the ESC registers its stop pulse.

use super::config::MotorConfig;
use super::event::ControlError;
use super::timing::Millis;

/// Arming handshake state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ArmState {
    Disarmed,
    /// Stop pulse held since `since`, throttle not accepted yet
    Arming { since: Millis },
    Armed,
    /// Stop pulse written at `since`, waiting for the ESC to settle
    Disarming { since: Millis },
}

impl ArmState {
    pub const fn is_armed(&self) -> bool {
        matches!(self, ArmState::Armed)
    }

    pub const fn in_transition(&self) -> bool {
        matches!(self, ArmState::Arming { .. } | ArmState::Disarming { .. })
    }

    /// Starts arming from disarmed
    pub fn begin_arm(&mut self, now: Millis) -> Result<(), ControlError> {
        match self {
            ArmState::Disarmed => {
                *self = ArmState::Arming { since: now };
                Ok(())
            }
            ArmState::Armed | ArmState::Arming { .. } => Err(ControlError::AlreadyArmed),
            ArmState::Disarming { .. } => Err(ControlError::TransitionInProgress),
        }
    }

    /// Starts disarming from armed
    pub fn begin_disarm(&mut self, now: Millis) -> Result<(), ControlError> {
        match self {
            ArmState::Armed => {
                *self = ArmState::Disarming { since: now };
                Ok(())
            }
            ArmState::Disarmed | ArmState::Disarming { .. } => Err(ControlError::AlreadyDisarmed),
            ArmState::Arming { .. } => Err(ControlError::TransitionInProgress),
        }
    }

    /// Finishes a sequence whose time is up, returning the settled state
    pub fn advance(&mut self, now: Millis, config: &MotorConfig) -> Option<ArmState> {
        let next = match *self {
            ArmState::Arming { since } if now.since(since) >= config.arming_hold_ms => {
                ArmState::Armed
            }
            ArmState::Disarming { since } if now.since(since) >= config.disarm_settle_ms => {
                ArmState::Disarmed
            }
            _ => return None,
        };
        *self = next;
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arm_then_disarm() {
        let config = MotorConfig::default();
        let mut state = ArmState::Disarmed;

        state.begin_arm(Millis(0)).unwrap();
        assert!(state.in_transition());
        assert_eq!(state.advance(Millis(1_999), &config), None);
        assert_eq!(state.advance(Millis(2_000), &config), Some(ArmState::Armed));
        assert!(state.is_armed());

        state.begin_disarm(Millis(3_000)).unwrap();
        assert_eq!(state.advance(Millis(3_050), &config), None);
        assert_eq!(state.advance(Millis(3_100), &config), Some(ArmState::Disarmed));
        assert_eq!(state.advance(Millis(9_000), &config), None);
    }

    #[test]
    fn test_redundant_requests() {
        let mut state = ArmState::Disarmed;
        assert_eq!(state.begin_disarm(Millis(0)), Err(ControlError::AlreadyDisarmed));

        state.begin_arm(Millis(0)).unwrap();
        assert_eq!(state.begin_arm(Millis(5)), Err(ControlError::AlreadyArmed));
        assert_eq!(
            state.begin_disarm(Millis(5)),
            Err(ControlError::TransitionInProgress)
        );
        // rejected requests leave the sequence running from its start
        assert_eq!(state, ArmState::Arming { since: Millis(0) });

        state = ArmState::Disarming { since: Millis(10) };
        assert_eq!(state.begin_arm(Millis(20)), Err(ControlError::TransitionInProgress));
        assert_eq!(state.begin_disarm(Millis(20)), Err(ControlError::AlreadyDisarmed));
    }

    #[test]
    fn test_arming_across_counter_wrap() {
        let config = MotorConfig::default();
        let start = Millis(u32::MAX - 500);
        let mut state = ArmState::Disarmed;
        state.begin_arm(start).unwrap();

        assert_eq!(state.advance(start.add(1_000), &config), None);
        assert_eq!(state.advance(start.add(2_000), &config), Some(ArmState::Armed));
    }
}
