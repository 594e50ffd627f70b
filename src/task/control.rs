//! Control task
//!
//! Owns the state machine and runs the polling loop: one pass every
//! [`PASS_PERIOD`], taking codes from the IR receiver as they arrive.
//! Which actuator is built depends on the `esc` feature.

use defmt::{info, warn};
use embassy_time::{Duration, Instant, Timer};
use ir_actuator::system::actuator::Actuator;
use ir_actuator::system::command::CommandMapping;
use ir_actuator::system::control::ControlLoop;
use ir_actuator::system::decoder::ChannelDecoder;
use ir_actuator::system::machine::StateMachine;
use ir_actuator::system::timing::Millis;

#[cfg(not(feature = "esc"))]
use ir_actuator::system::led::LedActuator;
#[cfg(feature = "esc")]
use ir_actuator::system::motor::MotorActuator;

use super::ir_receive::IR_CODES;
use super::pwm_output::RpPwmDriver;
use super::resources::OutputResources;

/// Time between two passes of the loop
const PASS_PERIOD: Duration = Duration::from_millis(1);

/// LED dimmer / blinker
#[cfg(not(feature = "esc"))]
#[embassy_executor::task]
pub async fn control(r: OutputResources) {
    let machine = StateMachine::new(
        LedActuator::default(),
        RpPwmDriver::new(r),
        CommandMapping::led(),
        now(),
    );
    info!("LED device ready");
    run(machine).await;
}

/// ESC throttle
#[cfg(feature = "esc")]
#[embassy_executor::task]
pub async fn control(r: OutputResources) {
    let machine = StateMachine::new(
        MotorActuator::default(),
        RpPwmDriver::new(r),
        CommandMapping::motor(),
        now(),
    );
    info!("ESC device ready, disarmed");
    run(machine).await;
}

async fn run<A: Actuator>(mut machine: StateMachine<A, RpPwmDriver>) {
    let mut decoder = ChannelDecoder::new(&IR_CODES);
    let mut control = ControlLoop::new();

    loop {
        let pass = control.run_pass(&mut machine, &mut decoder, now());
        if let Some(Err(e)) = pass.command {
            info!("command not applied: {}", e);
        }
        if let Some(stop) = pass.scheduled.filter(|t| t.is_safety_stop()) {
            warn!("inactivity stop, now {}", stop.to);
        }
        Timer::after(PASS_PERIOD).await;
    }
}

fn now() -> Millis {
    Millis(Instant::now().as_millis() as u32)
}
