//! Redis pub/sub wiring for the expense mutation pipeline.
//!
//! The bus is an external collaborator: named channels, at-least-once
//! delivery to connected subscribers, no ordering guarantee across
//! channels, best-effort FIFO within a channel from a single publisher
//! connection. This crate only wires connections; it never interprets
//! payloads.
//!
//! # Core Invariants
//!
//! 1. **One long-lived publisher connection**: [`ChannelPublisher`] dials
//!    lazily and reuses the same multiplexed connection across publishes.
//!    Any failure discards it so the next call redials.
//! 2. **Errors propagate**: a failed publish is the caller's problem to
//!    surface; there is no retry queue at this layer.
//! 3. **Bounded waits**: connects and publishes run under timeouts instead
//!    of hanging on a wedged broker.

pub mod config;
pub mod error;
pub mod publisher;
pub mod subscriber;

pub use config::BusConfig;
pub use error::{BusError, BusResult};
pub use publisher::ChannelPublisher;
pub use subscriber::{BusMessage, Subscription};
