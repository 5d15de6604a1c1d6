use serde::Serialize;

use crate::{
    error::AppError,
    models::{collaborator::TripCollaborator, friendship::LinkStatus, trip::Trip},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TripAccess {
    Owner,
    Collaborator,
    Invited,
    None,
}

impl TripAccess {
    pub fn resolve(trip: &Trip, user_uuid: &str, membership: Option<&TripCollaborator>) -> Self {
        if trip.is_owned_by(user_uuid) {
            return TripAccess::Owner;
        }
        match membership.filter(|row| row.user_id == user_uuid && row.trip_id == trip.id) {
            Some(row) if row.status == LinkStatus::Accepted => TripAccess::Collaborator,
            Some(_) => TripAccess::Invited,
            None => TripAccess::None,
        }
    }

    pub fn can_view(&self) -> bool {
        matches!(self, TripAccess::Owner | TripAccess::Collaborator)
    }

    pub fn can_edit_activities(&self) -> bool {
        self.can_view()
    }

    pub fn can_manage(&self) -> bool {
        matches!(self, TripAccess::Owner)
    }

    pub fn require_view(self) -> Result<Self, AppError> {
        if self.can_view() {
            Ok(self)
        } else {
            Err(AppError::Forbidden)
        }
    }

    pub fn require_edit_activities(self) -> Result<Self, AppError> {
        if self.can_edit_activities() {
            Ok(self)
        } else {
            Err(AppError::Forbidden)
        }
    }

    pub fn require_manage(self) -> Result<Self, AppError> {
        if self.can_manage() {
            Ok(self)
        } else {
            Err(AppError::Forbidden)
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn trip() -> Trip {
        Trip {
            id: "trip".into(),
            owner_id: "alice".into(),
            title: "Lisbon".into(),
            destination: "Lisbon".into(),
            start_date: "2025-05-01".parse().unwrap(),
            end_date: "2025-05-04".parse().unwrap(),
            lodging_name: None,
            arrival_info: None,
            image_url: None,
            collection_id: None,
            position: None,
            created_at: Utc::now(),
        }
    }

    fn membership(user: &str, status: LinkStatus) -> TripCollaborator {
        TripCollaborator {
            id: "c1".into(),
            trip_id: "trip".into(),
            user_id: user.into(),
            status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn owner_can_do_everything() {
        let access = TripAccess::resolve(&trip(), "alice", None);
        assert_eq!(access, TripAccess::Owner);
        assert!(access.can_manage() && access.can_edit_activities());
    }

    #[test]
    fn accepted_collaborator_edits_activities_but_cannot_manage() {
        let row = membership("bob", LinkStatus::Accepted);
        let access = TripAccess::resolve(&trip(), "bob", Some(&row));
        assert_eq!(access, TripAccess::Collaborator);
        assert!(access.can_edit_activities());
        assert!(access.require_manage().is_err());
    }

    #[test]
    fn pending_invite_grants_nothing_yet() {
        let row = membership("bob", LinkStatus::Pending);
        let access = TripAccess::resolve(&trip(), "bob", Some(&row));
        assert_eq!(access, TripAccess::Invited);
        assert!(!access.can_view());
    }

    #[test]
    fn membership_of_someone_else_is_ignored() {
        let row = membership("carol", LinkStatus::Accepted);
        assert_eq!(TripAccess::resolve(&trip(), "bob", Some(&row)), TripAccess::None);
    }
}
