//! Input source abstraction.
//!
//! The core is invoked once per available batch; whether the source underneath
//! blocks, polls, or waits on readiness is its own business.

use crate::error::Result;
use crate::event::KeyEvent;
use async_trait::async_trait;

/// Lazy, unbounded producer of raw key events.
#[async_trait]
pub trait InputSource: Send {
    /// Wait for the next non-empty batch of key events.
    ///
    /// Returns `Ok(None)` once the source is closed for good. Having no data
    /// ready is not an error; the future simply stays pending.
    ///
    /// Implementations must be cancel-safe: dropping the future must not lose
    /// events already read from the device.
    async fn next_batch(&mut self) -> Result<Option<Vec<KeyEvent>>>;

    /// Human-readable name for logs.
    fn name(&self) -> &str;
}

#[async_trait]
impl<I: InputSource + ?Sized> InputSource for Box<I> {
    async fn next_batch(&mut self) -> Result<Option<Vec<KeyEvent>>> {
        (**self).next_batch().await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
