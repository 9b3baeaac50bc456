//! Mutation intents and their JSON codec.
//!
//! One tagged union, three wire shapes. The JSON field names match the
//! payloads the HTTP tier has always published (`expenseId`, `type`,
//! `user`/`userId`), so the worker can consume messages from either tier
//! during a rollout.

use crate::channel::MutationChannel;
use crate::error::ProtocolError;
use crate::record::{EntryType, ExpenseId, OwnerId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Full record payload for a new expense.
///
/// Carries the freshly generated [`ExpenseId`]; the apply engine inserts
/// the document exactly as given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpense {
    pub expense_id: ExpenseId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub amount: f64,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub user: OwnerId,
}

/// Full replacement field set for an existing expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExpense {
    pub expense_id: ExpenseId,
    pub user_id: OwnerId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub amount: f64,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    /// Publish-side timestamp. Informational only: the apply side stamps
    /// the stored `updated_on` itself.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_on: Option<DateTime<Utc>>,
}

/// Tombstone request. The apply engine sets `is_deleted`, nothing is
/// physically removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteExpense {
    pub user_id: OwnerId,
    pub expense_id: ExpenseId,
}

/// A mutation in flight between the publisher and the apply engine.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationIntent {
    Create(CreateExpense),
    Update(UpdateExpense),
    Delete(DeleteExpense),
}

impl MutationIntent {
    /// The channel this intent travels on.
    pub fn channel(&self) -> MutationChannel {
        match self {
            Self::Create(_) => MutationChannel::Create,
            Self::Update(_) => MutationChannel::Update,
            Self::Delete(_) => MutationChannel::Delete,
        }
    }

    /// The record this intent targets.
    pub fn expense_id(&self) -> &ExpenseId {
        match self {
            Self::Create(c) => &c.expense_id,
            Self::Update(u) => &u.expense_id,
            Self::Delete(d) => &d.expense_id,
        }
    }

    /// The owner the mutation is scoped to.
    pub fn owner(&self) -> &OwnerId {
        match self {
            Self::Create(c) => &c.user,
            Self::Update(u) => &u.user_id,
            Self::Delete(d) => &d.user_id,
        }
    }

    /// Serialize the intent to its channel payload.
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        let bytes = match self {
            Self::Create(c) => serde_json::to_vec(c)?,
            Self::Update(u) => serde_json::to_vec(u)?,
            Self::Delete(d) => serde_json::to_vec(d)?,
        };
        Ok(bytes)
    }

    /// Decode a channel payload into the variant that channel carries.
    pub fn decode(channel: MutationChannel, payload: &[u8]) -> Result<Self, ProtocolError> {
        match channel {
            MutationChannel::Create => Ok(Self::Create(serde_json::from_slice(payload)?)),
            MutationChannel::Update => Ok(Self::Update(serde_json::from_slice(payload)?)),
            MutationChannel::Delete => Ok(Self::Delete(serde_json::from_slice(payload)?)),
        }
    }

    /// Decode by channel name, as messages come off the bus.
    pub fn decode_named(channel_name: &str, payload: &[u8]) -> Result<Self, ProtocolError> {
        let channel = MutationChannel::from_name(channel_name)
            .ok_or_else(|| ProtocolError::UnknownChannel(channel_name.to_string()))?;
        Self::decode(channel, payload)
    }
}
