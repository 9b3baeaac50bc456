//! Subscribing side of the bus.

use crate::config::BusConfig;
use crate::error::{BusError, BusResult};
use futures_util::StreamExt;
use redis::aio::PubSub;
use redis::Client;
use tokio::time::timeout;
use tracing::info;

/// A message delivered on a subscribed channel.
#[derive(Debug, Clone)]
pub struct BusMessage {
    /// The channel the message arrived on.
    pub channel: String,
    /// The raw payload bytes, uninterpreted.
    pub payload: Vec<u8>,
}

/// A long-lived subscription over its own pub/sub connection.
///
/// Pub/sub delivery only reaches connected subscribers; the owner of this
/// value is expected to reconnect when [`Subscription::next_message`]
/// starts returning `None`.
pub struct Subscription {
    pubsub: PubSub,
    channels: Vec<String>,
}

impl Subscription {
    /// Dial the bus and register on the given channels.
    pub async fn connect(config: &BusConfig, channels: &[&str]) -> BusResult<Self> {
        let client = Client::open(config.url.as_str())?;
        let mut pubsub = timeout(config.connect_timeout, client.get_async_pubsub())
            .await
            .map_err(|_| BusError::Timeout {
                operation: "connect",
                after: config.connect_timeout,
            })??;

        for channel in channels {
            timeout(config.operation_timeout, pubsub.subscribe(*channel))
                .await
                .map_err(|_| BusError::Timeout {
                    operation: "subscribe",
                    after: config.operation_timeout,
                })??;
        }

        info!(channels = ?channels, "Subscribed to bus channels");
        Ok(Self {
            pubsub,
            channels: channels.iter().map(|c| c.to_string()).collect(),
        })
    }

    /// The channels this subscription registered on.
    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    /// Wait for the next message on any subscribed channel.
    ///
    /// Returns `None` when the connection is gone; there is no partial
    /// delivery state to recover, so the caller simply reconnects.
    pub async fn next_message(&mut self) -> Option<BusMessage> {
        let msg = self.pubsub.on_message().next().await?;
        Some(BusMessage {
            channel: msg.get_channel_name().to_string(),
            payload: msg.get_payload_bytes().to_vec(),
        })
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("channels", &self.channels)
            .finish_non_exhaustive()
    }
}
