use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Cents, EntryKind, UserId};

pub type TransactionId = Uuid;

/// A recorded income or expense.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    pub user_id: UserId,
    pub description: String,
    /// Always positive; `kind` carries the sign.
    #[serde(with = "super::units")]
    pub amount: Cents,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub category: String,
    /// Planned but not yet settled.
    pub is_future: bool,
}

impl Transaction {
    pub fn new(
        user_id: UserId,
        description: String,
        amount: Cents,
        date: NaiveDate,
        kind: EntryKind,
        category: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            description,
            amount,
            date,
            kind,
            category,
            is_future: false,
        }
    }

    pub fn with_future(mut self, is_future: bool) -> Self {
        self.is_future = is_future;
        self
    }

    /// Effect of this transaction on the user's net balance.
    pub fn signed_amount(&self) -> Cents {
        self.kind.signed(self.amount)
    }
}
