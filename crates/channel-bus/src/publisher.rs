//! Publishing side of the bus.

use crate::config::BusConfig;
use crate::error::{BusError, BusResult};
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Publisher over one long-lived, reused bus connection.
///
/// The connection is dialed lazily on first publish and shared by every
/// subsequent call. When a publish fails the cached connection is
/// discarded, so the next call redials instead of reusing a dead socket.
/// Failures still propagate to the caller; nothing is retried here.
pub struct ChannelPublisher {
    client: Client,
    config: BusConfig,
    conn: Mutex<Option<MultiplexedConnection>>,
}

impl ChannelPublisher {
    /// Create a publisher. Validates the URL but does not connect yet.
    pub fn new(config: BusConfig) -> BusResult<Self> {
        let client = Client::open(config.url.as_str())?;
        Ok(Self {
            client,
            config,
            conn: Mutex::new(None),
        })
    }

    /// Get the shared connection, dialing it if needed.
    async fn connection(&self) -> BusResult<MultiplexedConnection> {
        let mut guard = self.conn.lock().await;
        if let Some(conn) = guard.as_ref() {
            return Ok(conn.clone());
        }

        info!("Connecting to channel bus");
        let conn = timeout(
            self.config.connect_timeout,
            self.client.get_multiplexed_async_connection(),
        )
        .await
        .map_err(|_| BusError::Timeout {
            operation: "connect",
            after: self.config.connect_timeout,
        })??;

        *guard = Some(conn.clone());
        Ok(conn)
    }

    /// Emit a payload on a channel.
    ///
    /// Returns once the bus has accepted the message; never waits for any
    /// subscriber to process it.
    pub async fn publish(&self, channel: &str, payload: &[u8]) -> BusResult<()> {
        let mut conn = self.connection().await?;

        let outcome: Result<i64, redis::RedisError> = match timeout(
            self.config.operation_timeout,
            conn.publish(channel, payload),
        )
        .await
        {
            Ok(outcome) => outcome,
            Err(_) => {
                self.discard_connection().await;
                return Err(BusError::Timeout {
                    operation: "publish",
                    after: self.config.operation_timeout,
                });
            }
        };

        match outcome {
            Ok(receivers) => {
                debug!(channel, receivers, "Published message");
                Ok(())
            }
            Err(e) => {
                warn!(channel, error = %e, "Publish failed, discarding cached connection");
                self.discard_connection().await;
                Err(e.into())
            }
        }
    }

    async fn discard_connection(&self) {
        *self.conn.lock().await = None;
    }
}

impl std::fmt::Debug for ChannelPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelPublisher").finish_non_exhaustive()
    }
}
