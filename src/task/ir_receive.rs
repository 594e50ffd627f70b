//! NEC IR receiver
//!
//! Times the demodulated output of the IR receiver with GPIO edges and
//! decodes NEC frames. The receiver idles high and pulls low while it sees
//! the 38kHz carrier.
//!
//! Frame: 9ms mark, 4.5ms space, then 32 bits as a 562µs mark followed by a
//! 562µs (0) or 1687µs (1) space. A held key sends repeat frames (9ms mark,
//! 2.25ms space) every ~108ms, reported as [`NEC_REPEAT`].
//!
//! Bits are shifted in first-bit-first, which gives the `0x00FFxxxx` codes
//! printed on most cheap remotes.

use defmt::{debug, info};
use embassy_futures::select::{select, Either};
use embassy_rp::gpio::{Input, Level, Pull};
use embassy_sync::channel::Channel;
use embassy_time::{Duration, Instant, Timer};
use ir_actuator::system::command::NEC_REPEAT;
use ir_actuator::system::decoder::{offer, CodeChannel};

use super::resources::IrReceiverResources;

/// Codes waiting for the control task
pub static IR_CODES: CodeChannel<8> = Channel::new();

/// Longest pulse inside a frame before it is abandoned
const PULSE_TIMEOUT: Duration = Duration::from_millis(12);

const LEADER_MARK_US: u64 = 9_000;
const LEADER_SPACE_US: u64 = 4_500;
const REPEAT_SPACE_US: u64 = 2_250;
const BIT_MARK_US: u64 = 562;
const ZERO_SPACE_US: u64 = 562;
const ONE_SPACE_US: u64 = 1_687;

/// IR receive task
#[embassy_executor::task]
pub async fn ir_receive(r: IrReceiverResources) {
    let mut pin = Input::new(r.ir_pin, Pull::Up);
    info!("IR receiver ready");

    loop {
        pin.wait_for_falling_edge().await;
        match read_frame(&mut pin).await {
            Some(code) => {
                debug!("IR code {:#x}", code);
                offer(&IR_CODES, code);
            }
            None => debug!("malformed IR frame"),
        }
    }
}

/// Decodes one frame, starting right after the leading falling edge
async fn read_frame(pin: &mut Input<'static>) -> Option<u32> {
    let mark = pulse(pin, Level::Low).await?;
    if !near(mark, LEADER_MARK_US) {
        return None;
    }
    let space = pulse(pin, Level::High).await?;
    if near(space, REPEAT_SPACE_US) {
        return Some(NEC_REPEAT);
    }
    if !near(space, LEADER_SPACE_US) {
        return None;
    }

    let mut code = 0u32;
    for _ in 0..32 {
        let mark = pulse(pin, Level::Low).await?;
        if !near(mark, BIT_MARK_US) {
            return None;
        }
        let space = pulse(pin, Level::High).await?;
        let bit = if near(space, ONE_SPACE_US) {
            1
        } else if near(space, ZERO_SPACE_US) {
            0
        } else {
            return None;
        };
        code = (code << 1) | bit;
    }
    Some(code)
}

/// Time in µs until the pin leaves `level`
async fn pulse(pin: &mut Input<'static>, level: Level) -> Option<u64> {
    let start = Instant::now();
    let edge = async {
        match level {
            Level::Low => pin.wait_for_high().await,
            Level::High => pin.wait_for_low().await,
        }
    };
    match select(edge, Timer::after(PULSE_TIMEOUT)).await {
        Either::First(()) => Some(start.elapsed().as_micros()),
        Either::Second(()) => None,
    }
}

/// Within 25% of `expected_us`
fn near(actual_us: u64, expected_us: u64) -> bool {
    let tolerance = expected_us / 4;
    actual_us.abs_diff(expected_us) <= tolerance
}
