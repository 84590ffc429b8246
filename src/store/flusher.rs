//! Debounced background writer.
//!
//! Mutations bump a generation counter and poke a [`Notify`]. One task per
//! store waits for the poke, sleeps through the debounce window so bursts
//! collapse into a single write, then flushes. Every flush, whether from
//! this task or an explicit [`Store::flush`](super::Store::flush), goes
//! through the same async mutex, so writes never interleave and a later
//! write always carries a newer snapshot than an earlier one.

use log::{debug, error};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use super::Shared;

pub(crate) async fn run(shared: Arc<Shared>, debounce: Duration) {
    debug!("Store flusher started for {}", shared.path.display());
    loop {
        shared.dirty.notified().await;
        if shared.closing.load(Ordering::Acquire) {
            break;
        }
        if !debounce.is_zero() {
            tokio::time::sleep(debounce).await;
        }
        if let Err(e) = shared.flush().await {
            // In-memory state stays authoritative; the next mutation retries.
            error!("Failed to save bot data to {}: {}", shared.path.display(), e);
        }
    }
    debug!("Store flusher stopped for {}", shared.path.display());
}
