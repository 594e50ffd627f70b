//! Board Resource Assignment
//!
//! Pins and PWM slices handed to each task. GPIO 2 is PWM slice 1 output A,
//! the on-board LED on GPIO 25 is slice 4 output B.
//!
//! # Resource Groups
//! - IR receiver: demodulated output of a VS1838B style receiver
//! - Outputs: the actuator pin (LED or ESC signal) and the status indicator

use assign_resources::assign_resources;
use embassy_rp::peripherals;

assign_resources! {
    /// Active-low IR receiver output
    ir_receiver: IrReceiverResources {
        ir_pin: PIN_5,
    },
    /// PWM outputs driven by the control task
    outputs: OutputResources {
        actuator_slice: PWM_SLICE1,
        actuator_pin: PIN_2,
        indicator_slice: PWM_SLICE4,
        indicator_pin: PIN_25,
    },
}
