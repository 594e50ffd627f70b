//! Polling loop pass
//!
//! One pass takes at most one code from the decoder, applies it and
//! acknowledges it, then runs the scheduler. A command arriving in the same
//! pass as a due timeout is handled first and can keep the motor running.
//!
//! Remotes auto-repeat while a key is held. Cumulative commands (duty,
//! frequency and speed steps) keep applying on repeats; anything else that
//! repeats within [`DUPLICATE_WINDOW_MS`] is acknowledged and dropped so a
//! held power key cannot toggle twice.

use super::actuator::Actuator;
use super::command::NEC_REPEAT;
use super::decoder::CommandDecoder;
use super::event::{ControlError, Transition};
use super::machine::StateMachine;
use super::output::OutputDriver;
use super::timing::Millis;

/// Window in which a repeated non-cumulative code is ignored
pub const DUPLICATE_WINDOW_MS: u32 = 200;

/// What happened during one pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pass<M> {
    /// Result of the code taken from the decoder, if one was applied
    pub command: Option<Result<Transition<M>, ControlError>>,
    /// Transition caused by the scheduler
    pub scheduled: Option<Transition<M>>,
}

/// Polling loop state kept between passes
#[derive(Debug, Clone)]
pub struct ControlLoop {
    last_code: Option<(u32, Millis)>,
    window_ms: u32,
}

impl ControlLoop {
    pub const fn new() -> Self {
        Self::with_window(DUPLICATE_WINDOW_MS)
    }

    pub const fn with_window(window_ms: u32) -> Self {
        Self {
            last_code: None,
            window_ms,
        }
    }

    /// Runs one pass of the loop
    ///
    /// The decoder is not polled while an arm or disarm sequence is in
    /// flight, codes stay queued until it completes.
    pub fn run_pass<A, D, C>(
        &mut self,
        machine: &mut StateMachine<A, D>,
        decoder: &mut C,
        now: Millis,
    ) -> Pass<A::Mode>
    where
        A: Actuator,
        D: OutputDriver,
        C: CommandDecoder,
    {
        let mut command = None;
        if !machine.in_transition() {
            if let Some(code) = decoder.poll() {
                if let Some(code) = self.filter(machine, code, now) {
                    command = Some(machine.apply_command(code, now));
                }
                decoder.resume();
            }
        }
        let scheduled = machine.tick(now);
        Pass { command, scheduled }
    }

    /// Resolves repeats and drops duplicates, returning the code to apply
    fn filter<A: Actuator, D: OutputDriver>(
        &mut self,
        machine: &StateMachine<A, D>,
        code: u32,
        now: Millis,
    ) -> Option<u32> {
        let recent = self
            .last_code
            .filter(|(_, at)| now.since(*at) <= self.window_ms)
            .map(|(last, _)| last);

        if code == NEC_REPEAT {
            let Some(last) = recent else {
                log_debug!("stale repeat frame dropped");
                return None;
            };
            self.last_code = Some((last, now));
            return machine.mapping().lookup(last).is_cumulative().then_some(last);
        }

        let cumulative = machine.mapping().lookup(code).is_cumulative();
        self.last_code = Some((code, now));
        if recent == Some(code) && !cumulative {
            log_debug!("duplicate code {:#x} dropped", code);
            return None;
        }
        Some(code)
    }
}

impl Default for ControlLoop {
    fn default() -> Self {
        Self::new()
    }
}
