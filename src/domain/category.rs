use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserId;

pub type CategoryId = Uuid;

/// A user-defined label with a display color (e.g. `#ff5500`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub user_id: UserId,
    pub name: String,
    pub color: String,
}

impl Category {
    pub fn new(user_id: UserId, name: String, color: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name,
            color,
        }
    }
}
