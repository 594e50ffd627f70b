//! IR actuator firmware entry point
//!
//! Initializes the board and spawns the IR receive and control tasks.

#![no_std]
#![no_main]

use crate::task::{control::control, ir_receive::ir_receive};
use embassy_executor::Spawner;
use embassy_rp::block::ImageDef;
use embassy_rp::config::Config;
use task::resources::{AssignedResources, IrReceiverResources, OutputResources};
use {defmt_rtt as _, panic_probe as _};

/// Firmware image type for bootloader
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = ImageDef::secure_exe();

/// Task implementations
mod task;

/// Firmware entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Config::default());

    // Split the resources into separate groups for each task
    let r = split_resources!(p);

    // Receiver first so no frame is missed once the outputs are live
    spawner.spawn(ir_receive(r.ir_receiver)).unwrap();
    spawner.spawn(control(r.outputs)).unwrap();
}
