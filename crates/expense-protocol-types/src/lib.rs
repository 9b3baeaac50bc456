//! Pure wire and domain types for the expense mutation pipeline.
//!
//! Everything the publisher and the apply worker exchange over the channel
//! bus is defined here: the expense record, the three mutation intents, the
//! channel names, and the JSON codec. No I/O, no async.
//!
//! # Core Invariants
//!
//! 1. **Stable identity**: an [`ExpenseId`] is assigned once, at creation
//!    time, and is the sole correlation key between a mutation intent and
//!    its target record. It is independent of any storage-assigned key.
//! 2. **Channel selects variant**: payloads carry no discriminant of their
//!    own; the channel a message arrives on determines which intent it
//!    decodes to.
//! 3. **Owner-scoped targets**: update and delete intents always carry the
//!    owner alongside the expense id, so applying them can never cross
//!    owner boundaries.

pub mod channel;
pub mod error;
pub mod intent;
pub mod record;
pub mod validate;

pub use channel::{
    MutationChannel, CREATE_EXPENSE_CHANNEL, DEAD_LETTER_CHANNEL, DELETE_EXPENSE_CHANNEL,
    UPDATE_EXPENSE_CHANNEL,
};
pub use error::ProtocolError;
pub use intent::{CreateExpense, DeleteExpense, MutationIntent, UpdateExpense};
pub use record::{EntryType, ExpenseId, ExpenseRecord, OwnerId};
pub use validate::{ExpenseDraft, ValidatedExpense, ValidationError};
