pub mod control;
pub mod ir_receive;
pub mod pwm_output;
pub mod resources;
