//! Command decoder seam
//!
//! The IR receiver runs in its own task and drops decoded codes into a
//! bounded channel. The control loop drains it one code at a time through
//! [`CommandDecoder`]: after a code is handed out nothing more comes until
//! the consumer calls [`CommandDecoder::resume`].

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

/// Queue between the IR receiver and the control loop
pub type CodeChannel<const N: usize> = Channel<CriticalSectionRawMutex, u32, N>;

/// Source of raw remote codes
pub trait CommandDecoder {
    /// Next code, if one arrived and the previous one was acknowledged
    fn poll(&mut self) -> Option<u32>;

    /// Acknowledges the last code so the next one can be delivered
    fn resume(&mut self);
}

/// Offers a freshly decoded code to the control loop
///
/// Never waits; when the queue is full the code is dropped, the remote
/// will send it again.
pub fn offer<const N: usize>(channel: &CodeChannel<N>, code: u32) -> bool {
    match channel.try_send(code) {
        Ok(()) => true,
        Err(_) => {
            log_warn!("command queue full, dropping code {:#x}", code);
            false
        }
    }
}

/// [`CommandDecoder`] reading from a [`CodeChannel`]
pub struct ChannelDecoder<'a, const N: usize> {
    channel: &'a CodeChannel<N>,
    paused: bool,
}

impl<'a, const N: usize> ChannelDecoder<'a, N> {
    pub const fn new(channel: &'a CodeChannel<N>) -> Self {
        Self {
            channel,
            paused: false,
        }
    }
}

impl<const N: usize> CommandDecoder for ChannelDecoder<'_, N> {
    fn poll(&mut self) -> Option<u32> {
        if self.paused {
            return None;
        }
        let code = self.channel.try_receive().ok()?;
        self.paused = true;
        Some(code)
    }

    fn resume(&mut self) {
        self.paused = false;
    }
}
