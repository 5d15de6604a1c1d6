use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{friendship::LinkStatus, user::Profile};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TripCollaborator {
    pub id: String,
    pub trip_id: String,
    pub user_id: String,
    pub status: LinkStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollaboratorEntry {
    pub id: String,
    pub status: LinkStatus,
    pub user: Profile,
}

#[derive(Debug, Clone, Serialize)]
pub struct TripInvite {
    pub collaborator_id: String,
    pub trip_id: String,
    pub trip_title: String,
    pub owner: Profile,
}
