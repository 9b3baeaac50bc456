//! Main worker loop orchestration.

use crate::config::WorkerConfig;
use crate::dispatch::{DeadLetter, DeadLetterSink, MutationDispatcher};
use crate::engine::ApplyEngine;
use crate::error::WorkerResult;
use channel_bus::{ChannelPublisher, Subscription};
use expense_protocol_types::MutationChannel;
use expense_store::ExpenseStore;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Capacity of the in-memory dead-letter queue.
const DEAD_LETTER_QUEUE_CAPACITY: usize = 256;

/// Dead-letter sink that republishes failed messages on the bus.
///
/// Enqueue is non-blocking; a spawned forwarder task owns the actual
/// publishing so a slow bus can't stall the dispatch path.
pub struct RedisDeadLetterSink {
    sender: mpsc::Sender<DeadLetter>,
}

impl RedisDeadLetterSink {
    /// Spawn the forwarder task and return the sink handle.
    pub fn start(publisher: Arc<ChannelPublisher>, channel: String) -> Self {
        let (sender, mut receiver) = mpsc::channel::<DeadLetter>(DEAD_LETTER_QUEUE_CAPACITY);

        tokio::spawn(async move {
            while let Some(letter) = receiver.recv().await {
                match serde_json::to_vec(&letter) {
                    Ok(payload) => {
                        if let Err(e) = publisher.publish(&channel, &payload).await {
                            error!(
                                channel = %channel,
                                source_channel = %letter.channel,
                                error = %e,
                                "Failed to publish dead letter, entry lost"
                            );
                        }
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to serialize dead letter");
                    }
                }
            }
        });

        Self { sender }
    }
}

impl DeadLetterSink for RedisDeadLetterSink {
    fn enqueue(&self, letter: DeadLetter) {
        if let Err(e) = self.sender.try_send(letter) {
            warn!(error = %e, "Dead-letter queue full or closed, entry dropped");
        }
    }
}

/// The apply worker process.
///
/// Owns the store, the dispatcher, and the subscription lifecycle. Runs
/// until the process is shut down.
pub struct ApplyWorker {
    config: WorkerConfig,
    dispatcher: MutationDispatcher,
}

impl ApplyWorker {
    /// Open the store, wire the dead-letter path, and build the
    /// dispatcher. Does not subscribe yet.
    pub async fn new(config: WorkerConfig) -> WorkerResult<Self> {
        let store = ExpenseStore::open(&config.database_path).await?;
        let publisher = Arc::new(ChannelPublisher::new(config.bus_config())?);
        let dead_letter = Arc::new(RedisDeadLetterSink::start(
            publisher,
            config.dead_letter_channel.clone(),
        ));
        let dispatcher =
            MutationDispatcher::new(ApplyEngine::new(store), config.retry.clone(), dead_letter);

        Ok(Self { config, dispatcher })
    }

    /// Run the subscribe/dispatch loop.
    ///
    /// This loop:
    /// 1. Dials the bus and subscribes to the three mutation channels
    /// 2. Dispatches each delivered message (decode → apply → retry/DLQ)
    /// 3. On subscription loss, waits and redials
    pub async fn run(&mut self) -> WorkerResult<()> {
        let channels: Vec<&str> = MutationChannel::ALL.iter().map(|c| c.name()).collect();
        info!(
            redis_url = %self.config.redis_url,
            database = %self.config.database_path.display(),
            channels = ?channels,
            "Starting apply worker loop"
        );

        loop {
            match Subscription::connect(&self.config.bus_config(), &channels).await {
                Ok(mut subscription) => {
                    info!("Subscribed, applying mutations");
                    while let Some(message) = subscription.next_message().await {
                        self.dispatcher
                            .dispatch(&message.channel, &message.payload)
                            .await;
                    }
                    // Messages published while we are down are not
                    // redelivered; pub/sub only reaches connected
                    // subscribers.
                    warn!("Bus subscription lost, reconnecting...");
                }
                Err(e) => {
                    error!(error = %e, "Failed to subscribe to bus");
                }
            }
            tokio::time::sleep(self.config.reconnect_delay).await;
        }
    }
}
