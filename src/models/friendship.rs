use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::user::Profile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum LinkStatus {
    Pending,
    Accepted,
}

impl LinkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkStatus::Pending => "pending",
            LinkStatus::Accepted => "accepted",
        }
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Friendship {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub status: LinkStatus,
    pub created_at: DateTime<Utc>,
}

impl Friendship {
    pub fn involves(&self, user_uuid: &str) -> bool {
        self.sender_id == user_uuid || self.receiver_id == user_uuid
    }

    pub fn other_party(&self, user_uuid: &str) -> &str {
        if self.sender_id == user_uuid {
            &self.receiver_id
        } else {
            &self.sender_id
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Friend {
    pub friendship_id: String,
    pub profile: Profile,
}

#[derive(Debug, Clone, Serialize)]
pub struct FriendRequest {
    pub friendship_id: String,
    pub sender: Profile,
    pub created_at: DateTime<Utc>,
}
