//! Time-Based Output Scheduler
//!
//! Called once per pass of the polling loop, after any command of that pass
//! has been applied. It never blocks and never sets a mode on its own: due
//! sequences and the inactivity stop go back through the state machine, and
//! the only thing it writes directly is the blink / status level.

use super::actuator::Actuator;
use super::event::{Cause, Transition};
use super::machine::StateMachine;
use super::output::OutputDriver;
use super::timing::Millis;

/// Evaluates every deadline for this pass
///
/// In order: a finished arm/disarm sequence, the inactivity timeout, then
/// the visual toggle. Returns the mode transition the pass caused, if any.
pub fn tick<A: Actuator, D: OutputDriver>(
    machine: &mut StateMachine<A, D>,
    now: Millis,
) -> Option<Transition<A::Mode>> {
    if let Some(transition) = machine.advance(now) {
        return Some(transition);
    }
    if let Some(transition) = check_inactivity(machine, now) {
        return Some(transition);
    }
    update_visual(machine, now);
    None
}

/// Forces a stop when running without a command for longer than the timeout
fn check_inactivity<A: Actuator, D: OutputDriver>(
    machine: &mut StateMachine<A, D>,
    now: Millis,
) -> Option<Transition<A::Mode>> {
    let limit = machine.actuator().inactivity_timeout_ms()?;
    if !machine.actuator().is_running() {
        return None;
    }
    let idle = now.since(machine.timing().last_command);
    if idle <= limit {
        return None;
    }
    log_warn!("no command for {} ms while running, stopping", idle);
    machine.force_stop(Cause::InactivityTimeout, now)
}

fn update_visual<A: Actuator, D: OutputDriver>(machine: &mut StateMachine<A, D>, now: Millis) {
    let Some(interval) = machine.actuator().visual_interval_ms() else {
        return;
    };
    if now.since(machine.timing().last_transition) >= interval {
        machine.toggle_visual(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::command::{keys, Command, CommandMapping};
    use crate::system::led::{LedActuator, LedMode};
    use crate::system::mock::{DriverCall, RecordingDriver};
    use crate::system::motor::{MotorActuator, MotorMode};
    use crate::system::output::Channel;

    fn led_at(now: Millis) -> StateMachine<LedActuator, RecordingDriver> {
        StateMachine::new(
            LedActuator::default(),
            RecordingDriver::default(),
            CommandMapping::led(),
            now,
        )
    }

    /// Armed at `speed` percent, last command at `now`
    fn motor_running(now: Millis, speed: u8) -> StateMachine<MotorActuator, RecordingDriver> {
        let start = Millis(now.0.wrapping_sub(2_000));
        let mut machine = StateMachine::new(
            MotorActuator::default(),
            RecordingDriver::default(),
            CommandMapping::motor(),
            start,
        );
        machine.apply(Command::Arm, Cause::Remote, start).unwrap();
        tick(&mut machine, start.add(2_000)).unwrap();
        machine
            .apply(Command::SelectPreset(speed / 10), Cause::Remote, now)
            .unwrap();
        machine.driver_mut().clear();
        machine
    }

    /// Times at which the level on `channel` was written, ticking every 1ms
    fn toggle_times<A: Actuator>(
        machine: &mut StateMachine<A, RecordingDriver>,
        channel: Channel,
        from: Millis,
        ms: u32,
    ) -> Vec<u32> {
        let mut times = Vec::new();
        for t in 1..=ms {
            machine.driver_mut().clear();
            tick(machine, from.add(t));
            if machine
                .driver()
                .calls
                .iter()
                .any(|call| matches!(call, DriverCall::Level(c, _) if *c == channel))
            {
                times.push(t);
            }
        }
        times
    }

    #[test]
    fn test_blink_period_for_every_rate() {
        for rate in 1..=9u8 {
            let mut machine = led_at(Millis(0));
            machine.apply_command(keys::DIGITS[rate as usize], Millis(0)).unwrap();

            let times = toggle_times(&mut machine, Channel::Actuator, Millis(0), 3_000);
            let half = 1_000.0 / (rate as f32 * 2.0);
            assert!(times.len() >= 4);
            let mut previous = 0;
            for t in times {
                let period = (t - previous) as f32;
                assert!((period - half).abs() <= 1.0, "rate {rate}: {period} vs {half}");
                previous = t;
            }
        }
    }

    #[test]
    fn test_scenario_b_blink_at_rate_three() {
        let mut machine = led_at(Millis(0));
        machine.apply_command(keys::CH_MINUS, Millis(0)).unwrap();
        let transition = machine.apply_command(keys::DIGITS[3], Millis(40)).unwrap();
        assert_eq!(transition.from, LedMode::SolidOn);
        assert_eq!(transition.to, LedMode::Blinking { rate_hz: 3 });

        let times = toggle_times(&mut machine, Channel::Actuator, Millis(40), 700);
        assert_eq!(times, vec![166, 332, 498, 664]);
        // started high, four toggles later it is high again
        assert_eq!(machine.driver().level(Channel::Actuator), None);
        assert!(machine.timing().visual);
    }

    #[test]
    fn test_blink_across_counter_wrap() {
        let start = Millis(u32::MAX - 100);
        let mut machine = led_at(start);
        machine.apply_command(keys::DIGITS[2], start).unwrap();

        let times = toggle_times(&mut machine, Channel::Actuator, start, 800);
        assert_eq!(times, vec![250, 500, 750]);
    }

    #[test]
    fn test_scenario_e_inactivity_stop() {
        let mut machine = motor_running(Millis(50_000), 50);
        assert_eq!(machine.mode(), MotorMode::Armed { speed_percent: 50 });

        assert_eq!(tick(&mut machine, Millis(60_000)), None);
        let stop = tick(&mut machine, Millis(60_100)).unwrap();
        assert_eq!(stop.from, MotorMode::Armed { speed_percent: 50 });
        assert_eq!(stop.to, MotorMode::Armed { speed_percent: 0 });
        assert_eq!(stop.command, Command::EmergencyStop);
        assert!(stop.is_safety_stop());
        assert_eq!(machine.actuator().pulse_width_us(), 1_000);
        assert_eq!(machine.driver().duty(Channel::Actuator), Some(3_276));

        // stays stopped and armed, no second stop
        assert_eq!(tick(&mut machine, Millis(80_000)), None);
        assert_eq!(machine.mode(), MotorMode::Armed { speed_percent: 0 });
    }

    #[test]
    fn test_timeout_boundary_is_exclusive() {
        let mut machine = motor_running(Millis(1_000_000), 30);
        assert_eq!(tick(&mut machine, Millis(1_010_000)), None);
        assert!(tick(&mut machine, Millis(1_010_001)).is_some());
    }

    #[test]
    fn test_inactivity_across_counter_wrap() {
        let last = Millis(u32::MAX - 4_000);
        let mut machine = motor_running(last, 20);

        assert_eq!(tick(&mut machine, last.add(9_000)), None);
        let stop = tick(&mut machine, last.add(10_100)).unwrap();
        assert_eq!(stop.cause, Cause::InactivityTimeout);
        assert!(last.add(10_100).0 < last.0);
    }

    #[test]
    fn test_speed_command_resets_timeout() {
        let mut machine = motor_running(Millis(10_000), 40);
        machine
            .apply_command(keys::VOL_PLUS, Millis(19_000))
            .unwrap();
        assert_eq!(tick(&mut machine, Millis(20_500)), None);
        assert_eq!(machine.mode(), MotorMode::Armed { speed_percent: 45 });
        assert!(tick(&mut machine, Millis(29_001)).is_some());
    }

    #[test]
    fn test_status_blink_only_armed_at_zero() {
        let mut machine = motor_running(Millis(5_000), 0);
        assert_eq!(machine.mode(), MotorMode::Armed { speed_percent: 0 });
        let times = toggle_times(&mut machine, Channel::Indicator, Millis(5_000), 3_500);
        assert_eq!(times, vec![1_000, 2_000, 3_000]);

        machine.apply_command(keys::VOL_PLUS, Millis(8_600)).unwrap();
        let times = toggle_times(&mut machine, Channel::Indicator, Millis(8_600), 3_000);
        assert!(times.is_empty());
    }

    #[test]
    fn test_arming_flashes_indicator() {
        let mut machine = StateMachine::new(
            MotorActuator::default(),
            RecordingDriver::default(),
            CommandMapping::motor(),
            Millis(0),
        );
        machine.apply_command(keys::CH_MINUS, Millis(0)).unwrap();
        let times = toggle_times(&mut machine, Channel::Indicator, Millis(0), 1_999);
        assert_eq!(times.len(), 19);
        assert_eq!(times[0], 100);
        assert_eq!(machine.mode(), MotorMode::Arming);
    }
}
