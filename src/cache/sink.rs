//! Eviction Sink Module
//!
//! Destination for `(key, value)` pairs removed by capacity eviction.
//!
//! How the cache delivers to a sink is fixed at construction time by a
//! [`BackpressurePolicy`]. The policy decides whether a slow consumer can
//! stall the cache (`Block`), lose events (`Drop`), or only delay the `set`
//! call that triggered the eviction (`Deferred`).

use std::fmt;
use std::str::FromStr;
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};

use serde::Serialize;

use crate::cache::{CompositeKey, Content};
use crate::error::{ConfigError, SinkError};

// == Eviction ==
/// A single entry removed for capacity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Eviction {
    pub key: CompositeKey,
    pub value: Content,
}

// == Eviction Sink ==
/// Observer of capacity evictions.
pub trait EvictionSink: Send + Sync {
    /// Delivers an event, waiting for room if the sink is bounded.
    fn publish(&self, eviction: Eviction) -> Result<(), SinkError>;

    /// Delivers an event only if it can be accepted immediately.
    fn try_publish(&self, eviction: Eviction) -> Result<(), SinkError>;
}

// == Backpressure Policy ==
/// How evictions reach an attached sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackpressurePolicy {
    /// `publish` while holding the cache lock. A full sink stalls every caller.
    Block,
    /// `try_publish` while holding the cache lock. Undeliverable events are
    /// discarded and counted.
    Drop,
    /// Buffer evicted pairs, release the lock, then `publish` them. Only the
    /// `set` that triggered the eviction waits on the sink.
    #[default]
    Deferred,
}

impl fmt::Display for BackpressurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackpressurePolicy::Block => "block",
            BackpressurePolicy::Drop => "drop",
            BackpressurePolicy::Deferred => "deferred",
        };
        f.write_str(name)
    }
}

impl FromStr for BackpressurePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "block" => Ok(BackpressurePolicy::Block),
            "drop" => Ok(BackpressurePolicy::Drop),
            "deferred" => Ok(BackpressurePolicy::Deferred),
            _ => Err(ConfigError::InvalidValue {
                var: "EVICTION_BACKPRESSURE",
                value: s.to_string(),
            }),
        }
    }
}

// == Channel Sink ==
/// Sink backed by a bounded standard-library channel.
///
/// The receiving half can be drained from any thread, including a
/// `spawn_blocking` task.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: SyncSender<Eviction>,
}

impl ChannelSink {
    /// Creates a sink holding at most `bound` undelivered events.
    pub fn bounded(bound: usize) -> (Self, Receiver<Eviction>) {
        let (sender, receiver) = mpsc::sync_channel(bound);
        (Self { sender }, receiver)
    }
}

impl EvictionSink for ChannelSink {
    fn publish(&self, eviction: Eviction) -> Result<(), SinkError> {
        self.sender
            .send(eviction)
            .map_err(|_| SinkError::Disconnected)
    }

    fn try_publish(&self, eviction: Eviction) -> Result<(), SinkError> {
        self.sender.try_send(eviction).map_err(|err| match err {
            TrySendError::Full(_) => SinkError::Full,
            TrySendError::Disconnected(_) => SinkError::Disconnected,
        })
    }
}
