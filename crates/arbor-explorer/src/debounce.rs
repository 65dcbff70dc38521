// ABOUTME: Single-slot debounced call holding the coalesced argument
// ABOUTME: Re-arming replaces the argument and aborts the previous timer instead of queueing

use std::time::Duration;
use tokio::task::JoinHandle;

/// A call waiting for its quiet period to elapse
#[derive(Debug)]
struct PendingCall<T> {
    argument: T,
    timer: Option<JoinHandle<()>>,
    epoch: u64,
}

/// Debounced trigger with at most one outstanding timer.
///
/// The debouncer owns the argument; the timer task only carries the epoch
/// it was armed for and hands it back through [`Debouncer::take_if_current`]
/// when it wakes, so a timer that lost a race with a newer call finds
/// nothing to fire.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<PendingCall<T>>,
    epoch: u64,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            epoch: 0,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replace the pending argument and return the epoch the caller must arm a timer for
    pub fn schedule(&mut self, argument: T) -> u64 {
        self.cancel();
        self.epoch += 1;
        self.pending = Some(PendingCall {
            argument,
            timer: None,
            epoch: self.epoch,
        });
        self.epoch
    }

    /// Attach the timer armed for `epoch`. A stale timer is aborted immediately.
    pub fn attach_timer(&mut self, epoch: u64, timer: JoinHandle<()>) {
        match self.pending.as_mut() {
            Some(call) if call.epoch == epoch => {
                if let Some(previous) = call.timer.replace(timer) {
                    previous.abort();
                }
            }
            _ => timer.abort(),
        }
    }

    /// Take the pending argument if it is still the one armed for `epoch`
    pub fn take_if_current(&mut self, epoch: u64) -> Option<T> {
        if self.pending.as_ref().map(|call| call.epoch) != Some(epoch) {
            return None;
        }
        // The timer calling this is the one finishing, nothing to abort
        self.pending.take().map(|call| call.argument)
    }

    /// Take the pending argument now, aborting its timer
    pub fn take(&mut self) -> Option<T> {
        let call = self.pending.take()?;
        if let Some(timer) = call.timer {
            timer.abort();
        }
        Some(call.argument)
    }

    /// Cancel any pending debounced call
    pub fn cancel(&mut self) {
        drop(self.take());
    }

    /// Check if there's a pending call
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    #[cfg(test)]
    fn peek(&self) -> Option<&T> {
        self.pending.as_ref().map(|call| &call.argument)
    }

    /// Change the wait. The pending call keeps its argument and gets a new epoch;
    /// the caller re-arms a timer for the returned epoch.
    pub fn set_delay(&mut self, delay: Duration) -> Option<u64> {
        self.delay = delay;
        let argument = self.take()?;
        Some(self.schedule(argument))
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(timer) = self.pending.as_mut().and_then(|call| call.timer.take()) {
            timer.abort();
        }
    }
}
