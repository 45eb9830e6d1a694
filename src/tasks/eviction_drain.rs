//! Eviction Drain Task
//!
//! Background task that consumes eviction notifications published by the cache.

use std::sync::mpsc::Receiver;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::Eviction;

/// Spawns a blocking task that drains the eviction channel.
///
/// Each eviction is logged at debug level. The task ends once every sender
/// (i.e. the cache holding the [`ChannelSink`](crate::cache::ChannelSink)) is
/// dropped, and yields the number of events it consumed.
///
/// # Example
/// ```ignore
/// let (sink, receiver) = ChannelSink::bounded(1024);
/// let drain = spawn_eviction_drain(receiver);
/// // build the cache with `sink`, serve, then drop the cache:
/// let consumed = drain.await?;
/// ```
pub fn spawn_eviction_drain(receiver: Receiver<Eviction>) -> JoinHandle<u64> {
    tokio::task::spawn_blocking(move || {
        info!("Starting eviction drain task");

        let mut consumed = 0u64;
        for eviction in receiver {
            consumed += 1;
            debug!(key = %eviction.key, fields = eviction.value.len(), "entry evicted");
        }

        info!("Eviction drain stopped after {} events", consumed);
        consumed
    })
}
