//! Channel names for the mutation pipeline.

/// Channel carrying Create intents.
pub const CREATE_EXPENSE_CHANNEL: &str = "create-expense";

/// Channel carrying Update intents.
pub const UPDATE_EXPENSE_CHANNEL: &str = "update-expense";

/// Channel carrying Delete intents.
pub const DELETE_EXPENSE_CHANNEL: &str = "delete-expense";

/// Channel the apply worker routes poison messages to after retries are
/// exhausted.
pub const DEAD_LETTER_CHANNEL: &str = "dead-letter-expense";

/// The closed set of mutation channels.
///
/// The bus gives no ordering guarantee across these channels; a delete for
/// an id may be delivered before its create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationChannel {
    Create,
    Update,
    Delete,
}

impl MutationChannel {
    /// All mutation channels, in the order the worker subscribes to them.
    pub const ALL: [MutationChannel; 3] = [Self::Create, Self::Update, Self::Delete];

    pub fn name(self) -> &'static str {
        match self {
            Self::Create => CREATE_EXPENSE_CHANNEL,
            Self::Update => UPDATE_EXPENSE_CHANNEL,
            Self::Delete => DELETE_EXPENSE_CHANNEL,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            CREATE_EXPENSE_CHANNEL => Some(Self::Create),
            UPDATE_EXPENSE_CHANNEL => Some(Self::Update),
            DELETE_EXPENSE_CHANNEL => Some(Self::Delete),
            _ => None,
        }
    }
}

impl std::fmt::Display for MutationChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
