//! Actuator State Machine
//!
//! Owns the current mode (through the [`Actuator`]), the command table, the
//! timing state and the output stage. Every mode change goes through
//! [`StateMachine::apply`], whether it came from the remote or from the
//! scheduler, so there is a single place where outputs are pushed and
//! transitions are logged.
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut machine = StateMachine::new(LedActuator::default(), driver, CommandMapping::led(), now);
//! match machine.apply_command(code, now) {
//!     Ok(transition) => { /* outputs already written */ }
//!     Err(e) => { /* state unchanged */ }
//! }
//! machine.tick(now);
//! ```

use super::actuator::Actuator;
use super::command::{Command, CommandMapping};
use super::event::{Cause, ControlError, Transition};
use super::output::{OutputDriver, OutputStage, Write, Writes};
use super::pwm::Clamped;
use super::scheduler;
use super::timing::{Millis, TimingState};

/// Generic actuator state machine
pub struct StateMachine<A, D> {
    actuator: A,
    output: OutputStage<D>,
    mapping: CommandMapping,
    timing: TimingState,
}

impl<A: Actuator, D: OutputDriver> StateMachine<A, D> {
    /// Creates the machine at its safe baseline and writes the baseline outputs
    pub fn new(mut actuator: A, driver: D, mapping: CommandMapping, now: Millis) -> Self {
        actuator.reset();
        let mut machine = Self {
            actuator,
            output: OutputStage::new(driver),
            mapping,
            timing: TimingState::new(now),
        };
        log_info!("actuator ready in {:?}", machine.mode());
        machine.push_outputs();
        machine
    }

    pub fn mode(&self) -> A::Mode {
        self.actuator.mode()
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    pub fn timing(&self) -> &TimingState {
        &self.timing
    }

    pub fn mapping(&self) -> &CommandMapping {
        &self.mapping
    }

    /// Code table, replaceable while running
    pub fn mapping_mut(&mut self) -> &mut CommandMapping {
        &mut self.mapping
    }

    pub fn driver(&self) -> &D {
        self.output.driver()
    }

    pub fn driver_mut(&mut self) -> &mut D {
        self.output.driver_mut()
    }

    /// An arm or disarm sequence is running
    pub fn in_transition(&self) -> bool {
        self.timing.arming_in_progress
    }

    /// Looks up a raw remote code and applies it
    pub fn apply_command(
        &mut self,
        code: u32,
        now: Millis,
    ) -> Result<Transition<A::Mode>, ControlError> {
        match self.mapping.lookup(code) {
            Command::Unrecognized => {
                log_warn!("ignoring unknown command code {:#x}", code);
                Err(ControlError::UnknownCommand(code))
            }
            command => self.apply(command, Cause::Remote, now),
        }
    }

    /// Applies a logical command
    ///
    /// On success the new outputs are already written and the command time
    /// recorded; on error nothing changed.
    pub fn apply(
        &mut self,
        command: Command,
        cause: Cause,
        now: Millis,
    ) -> Result<Transition<A::Mode>, ControlError> {
        let from = self.mode();
        let clamped = match self.actuator.apply(command, now) {
            Ok(clamped) => clamped,
            Err(e) => {
                log_warn!("{:?} rejected in {:?}: {:?}", command, from, e);
                return Err(e);
            }
        };
        self.timing.last_command = now;
        Ok(self.settle(from, command, cause, clamped, now))
    }

    /// Runs the scheduler for this pass
    pub fn tick(&mut self, now: Millis) -> Option<Transition<A::Mode>> {
        scheduler::tick(self, now)
    }

    /// Completes a pending arm/disarm sequence if it is due
    pub(crate) fn advance(&mut self, now: Millis) -> Option<Transition<A::Mode>> {
        let from = self.mode();
        let command = self.actuator.advance(now)?;
        Some(self.settle(from, command, Cause::Sequence, None, now))
    }

    /// Safety stop through the regular command path
    pub(crate) fn force_stop(&mut self, cause: Cause, now: Millis) -> Option<Transition<A::Mode>> {
        self.apply(Command::EmergencyStop, cause, now).ok()
    }

    /// Flips the blink / status level and writes it straight to the pin
    pub(crate) fn toggle_visual(&mut self, now: Millis) {
        let high = self.timing.toggle_visual(now);
        let channel = self.actuator.visual_channel();
        self.output.push(&[Write::Level { channel, high }]);
    }

    fn settle(
        &mut self,
        from: A::Mode,
        command: Command,
        cause: Cause,
        clamped: Option<Clamped>,
        now: Millis,
    ) -> Transition<A::Mode> {
        let to = self.mode();
        if from != to {
            self.timing.restart_visual(now);
        }
        self.timing.arming_in_progress = self.actuator.in_transition();
        self.push_outputs();

        match cause {
            Cause::InactivityTimeout => {
                log_warn!("safety stop after inactivity: {:?} -> {:?}", from, to)
            }
            _ if from != to => log_info!("{:?} -> {:?} on {:?}", from, to, command),
            _ => log_debug!("{:?} kept {:?}", command, to),
        }
        if let Some(c) = clamped {
            log_warn!(
                "{:?} clamped to {} (requested {})",
                c.parameter,
                c.applied,
                c.requested
            );
        }

        Transition {
            from,
            to,
            command,
            cause,
            clamped,
        }
    }

    fn push_outputs(&mut self) {
        let mut writes = Writes::new();
        self.actuator.outputs(self.timing.visual, &mut writes);
        self.output.push(&writes);
    }
}
