//! In-memory pub/sub for single-node deployments.

use dashmap::DashMap;
use futures::StreamExt;
use tokio::sync::broadcast;
use tracing::warn;

use roomkey_core::traits::MessageStream;

/// In-memory pub/sub built on `tokio::sync::broadcast`.
///
/// Channels are created on first subscribe and live as long as the
/// provider; resetting the keyspace does not drop subscriptions.
#[derive(Debug)]
pub struct MemoryPubSub {
    /// Channel name → broadcast sender
    channels: DashMap<String, broadcast::Sender<String>>,
    /// Buffer size for channels
    buffer_size: usize,
}

impl MemoryPubSub {
    /// Create a new in-memory pub/sub
    pub fn new(buffer_size: usize) -> Self {
        Self {
            channels: DashMap::new(),
            buffer_size: buffer_size.max(1),
        }
    }

    /// Publish a payload, returning how many subscribers received it
    pub fn publish(&self, channel: &str, payload: &str) -> u64 {
        match self.channels.get(channel) {
            Some(tx) => tx.send(payload.to_string()).map_or(0, |n| n as u64),
            None => 0,
        }
    }

    /// Subscribe to a channel as a stream of payloads
    pub fn subscribe(&self, channel: &str) -> MessageStream {
        let rx = self
            .channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(self.buffer_size).0)
            .subscribe();

        let channel = channel.to_string();
        futures::stream::unfold((rx, channel), |(mut rx, channel)| async move {
            loop {
                match rx.recv().await {
                    Ok(payload) => return Some((payload, (rx, channel))),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(channel = %channel, skipped, "Subscriber lagged, messages dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        })
        .boxed()
    }
}
