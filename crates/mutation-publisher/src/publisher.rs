//! The publisher itself.

use crate::error::PublishError;
use channel_bus::{BusConfig, ChannelPublisher};
use chrono::Utc;
use expense_protocol_types::{
    CreateExpense, DeleteExpense, ExpenseDraft, ExpenseId, MutationIntent, OwnerId, UpdateExpense,
    ValidatedExpense,
};
use tracing::info;

/// Validates drafts and emits mutation intents on the bus.
///
/// One instance is shared by the whole API process; the underlying bus
/// connection is reused across calls.
pub struct ExpensePublisher {
    bus: ChannelPublisher,
}

impl ExpensePublisher {
    /// Create a publisher over a fresh bus connection.
    pub fn new(config: BusConfig) -> Result<Self, PublishError> {
        Ok(Self {
            bus: ChannelPublisher::new(config)?,
        })
    }

    /// Create a publisher over an existing bus handle.
    pub fn with_bus(bus: ChannelPublisher) -> Self {
        Self { bus }
    }

    /// Validate a draft, assign a fresh identity, and publish the Create
    /// intent.
    ///
    /// Returns the assigned [`ExpenseId`] so the API layer can echo it to
    /// the client; the client targets the same logical record with it in
    /// later update/delete requests.
    pub async fn publish_create(
        &self,
        owner: OwnerId,
        draft: &ExpenseDraft,
    ) -> Result<ExpenseId, PublishError> {
        let validated = draft.validate()?;
        let expense_id = ExpenseId::generate();
        let intent = MutationIntent::Create(create_intent(expense_id.clone(), owner, validated));
        self.send(&intent).await?;
        Ok(expense_id)
    }

    /// Validate a draft and publish the full replacement field set for an
    /// existing record.
    pub async fn publish_update(
        &self,
        expense_id: ExpenseId,
        owner: OwnerId,
        draft: &ExpenseDraft,
    ) -> Result<(), PublishError> {
        let validated = draft.validate()?;
        let intent = MutationIntent::Update(update_intent(expense_id, owner, validated));
        self.send(&intent).await
    }

    /// Publish a tombstone request for an existing record.
    pub async fn publish_delete(
        &self,
        expense_id: ExpenseId,
        owner: OwnerId,
    ) -> Result<(), PublishError> {
        let intent = MutationIntent::Delete(DeleteExpense {
            user_id: owner,
            expense_id,
        });
        self.send(&intent).await
    }

    async fn send(&self, intent: &MutationIntent) -> Result<(), PublishError> {
        let payload = intent.encode()?;
        self.bus.publish(intent.channel().name(), &payload).await?;
        info!(
            channel = %intent.channel(),
            expense_id = %intent.expense_id(),
            "Published mutation intent"
        );
        Ok(())
    }
}

fn create_intent(expense_id: ExpenseId, owner: OwnerId, fields: ValidatedExpense) -> CreateExpense {
    CreateExpense {
        expense_id,
        title: fields.title,
        description: fields.description,
        amount: fields.amount,
        date: fields.date,
        entry_type: fields.entry_type,
        user: owner,
    }
}

fn update_intent(expense_id: ExpenseId, owner: OwnerId, fields: ValidatedExpense) -> UpdateExpense {
    UpdateExpense {
        expense_id,
        user_id: owner,
        title: fields.title,
        description: fields.description,
        amount: fields.amount,
        date: fields.date,
        entry_type: fields.entry_type,
        updated_on: Some(Utc::now()),
    }
}

impl std::fmt::Debug for ExpensePublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpensePublisher").finish_non_exhaustive()
    }
}
