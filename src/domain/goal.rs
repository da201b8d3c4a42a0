use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Cents, UserId};

pub type GoalId = Uuid;

pub const DEFAULT_GOAL_CATEGORY: &str = "Other";

/// A savings target and how much has been put aside so far.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: GoalId,
    pub user_id: UserId,
    pub name: String,
    #[serde(with = "super::units")]
    pub current: Cents,
    #[serde(with = "super::units")]
    pub target: Cents,
    pub category: String,
}

impl Goal {
    pub fn new(user_id: UserId, name: String, current: Cents, target: Cents) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name,
            current,
            target,
            category: DEFAULT_GOAL_CATEGORY.to_string(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Percentage of the target reached, capped at 100.
    pub fn progress(&self) -> f64 {
        if self.target <= 0 {
            return 0.0;
        }
        (self.current as f64 / self.target as f64 * 100.0).min(100.0)
    }
}
