use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// A direct message about one product. Immutable once stored.
#[derive(Debug, Clone, Serialize, FromRow, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub product_id: String,
    pub from_user_id: String,
    pub to_user_id: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// The participant on the other side of this message from `user_id`.
    pub fn counterpart_of(&self, user_id: &str) -> Option<&str> {
        if self.from_user_id == user_id {
            Some(&self.to_user_id)
        } else if self.to_user_id == user_id {
            Some(&self.from_user_id)
        } else {
            None
        }
    }

    /// True if the message was exchanged between `a` and `b`, in either direction.
    pub fn is_between(&self, a: &str, b: &str) -> bool {
        (self.from_user_id == a && self.to_user_id == b)
            || (self.from_user_id == b && self.to_user_id == a)
    }
}
