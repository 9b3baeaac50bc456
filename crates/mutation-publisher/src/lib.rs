//! API-facing publisher for expense mutations.
//!
//! The HTTP tier hands a raw draft to [`ExpensePublisher`]; this crate
//! validates it, assigns identity for creates, encodes the intent, and
//! emits it on the bus. Publishing is fire-and-forget: the caller gets
//! control back (and answers its client) as soon as the bus accepts the
//! message, whether or not the apply worker ever persists it.
//!
//! A failed publish means the intent is lost: errors propagate to the
//! caller for a 500-class response and nothing is queued locally for
//! retry.

mod error;
mod publisher;

pub use error::PublishError;
pub use publisher::ExpensePublisher;
