//! Backoff - The only suspension point of a retrieval
//!
//! The retry loop never sleeps on its own. It hands the delay to a
//! `Backoff`, which lets tests swap in one that records delays instead
//! of waiting.

use std::time::Duration;

use crate::model::context::{CallContext, Interrupt};

/// Wait between two attempts
pub trait Backoff: Send + Sync {
    /// Suspend the caller for `delay`
    ///
    /// Returns `Err` when `ctx` is cancelled or its deadline passes
    /// before or during the wait.
    fn wait(&self, delay: Duration, ctx: &CallContext) -> Result<(), Interrupt>;
}

impl<T: Backoff + ?Sized> Backoff for std::sync::Arc<T> {
    fn wait(&self, delay: Duration, ctx: &CallContext) -> Result<(), Interrupt> {
        (**self).wait(delay, ctx)
    }
}

/// Blocking wait on the caller's thread
///
/// With an unbounded context this is exactly `thread::sleep(delay)`.
/// A cancel token turns the sleep into a condvar wait that wakes on
/// cancel; a deadline shortens the wait and then reports
/// `DeadlineExceeded`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockingBackoff;

impl BlockingBackoff {
    pub fn new() -> Self {
        Self
    }
}

impl Backoff for BlockingBackoff {
    fn wait(&self, delay: Duration, ctx: &CallContext) -> Result<(), Interrupt> {
        ctx.check()?;
        if delay.is_zero() {
            return Ok(());
        }

        let (wait_for, clipped) = match ctx.remaining() {
            Some(remaining) if remaining < delay => (remaining, true),
            _ => (delay, false),
        };

        match ctx.cancel_token() {
            Some(token) => {
                if token.wait_timeout(wait_for) {
                    return Err(Interrupt::Cancelled);
                }
            }
            None => std::thread::sleep(wait_for),
        }

        if clipped {
            return Err(Interrupt::DeadlineExceeded);
        }
        Ok(())
    }
}
